//! Result types of a processed page.

use super::assembler::AssembledPage;
use crate::domain::{CharCapacityBucket, DetectedBox, RecognitionResult};
use crate::processors::BoundingBox;
use serde::Serialize;
use std::fmt;

/// One recognized text line.
///
/// Bounding boxes are in the coordinate system of the input image.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextLineResult {
    /// Index of the line among the page's recognized lines, in detection order.
    pub index: usize,
    /// Rank of the line in reading order.
    pub read_order: usize,
    /// Block the line was grouped into.
    pub block: usize,
    /// The recognized text.
    pub text: String,
    /// Detection confidence of the line.
    pub confidence: f32,
    #[serde(rename = "box")]
    pub bounding_box: BoundingBox,
    /// The line is taller than wide.
    pub is_vertical: bool,
    /// Bucket the line was routed by.
    pub char_capacity_bucket: CharCapacityBucket,
}

/// Result of processing one page.
#[derive(Debug, Clone, Serialize)]
pub struct PageResult {
    /// Source file, when the page was loaded from disk.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input_path: Option<String>,
    pub image_width: u32,
    pub image_height: u32,
    /// Recognized lines in reading order.
    pub lines: Vec<TextLineResult>,
    /// Non-text layout regions, in detection order.
    pub regions: Vec<DetectedBox>,
    /// Page text assembled from `lines`.
    pub page: AssembledPage,
}

impl PageResult {
    /// The assembled page text.
    pub fn text(&self) -> String {
        self.page.text()
    }

    /// `(original_index, text)` pairs, sorted by index.
    pub fn recognitions(&self) -> Vec<RecognitionResult> {
        let mut results: Vec<RecognitionResult> = self
            .lines
            .iter()
            .map(|line| RecognitionResult {
                original_index: line.index,
                text: line.text.clone(),
            })
            .collect();
        results.sort_by_key(|r| r.original_index);
        results
    }

    /// Number of lines read vertically.
    pub fn vertical_line_count(&self) -> usize {
        self.lines.iter().filter(|line| line.is_vertical).count()
    }
}

impl fmt::Display for PageResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(path) = &self.input_path {
            writeln!(f, "Input path: {path}")?;
        }
        writeln!(
            f,
            "Image dimensions: [{}, {}]",
            self.image_width, self.image_height
        )?;
        writeln!(
            f,
            "Text lines: {} ({} vertical), layout regions: {}",
            self.lines.len(),
            self.vertical_line_count(),
            self.regions.len()
        )?;
        writeln!(
            f,
            "Block order: {}",
            if self.page.reversed { "reversed" } else { "as read" }
        )?;

        for line in &self.lines {
            let b = &line.bounding_box;
            writeln!(
                f,
                "  Line {} [{}, {}, {}, {}] -> '{}' (confidence: {:.3})",
                line.read_order + 1,
                b.x_min,
                b.y_min,
                b.x_max,
                b.y_max,
                line.text,
                line.confidence
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(index: usize, read_order: usize, text: &str) -> TextLineResult {
        TextLineResult {
            index,
            read_order,
            block: 0,
            text: text.to_string(),
            confidence: 0.8,
            bounding_box: BoundingBox::new(0, 0, 10, 40),
            is_vertical: true,
            char_capacity_bucket: CharCapacityBucket::Large,
        }
    }

    #[test]
    fn test_recognitions_sorted_by_index() {
        let page = PageResult {
            input_path: None,
            image_width: 100,
            image_height: 200,
            lines: vec![line(2, 0, "c"), line(0, 1, "a"), line(1, 2, "b")],
            regions: Vec::new(),
            page: AssembledPage::default(),
        };
        let indices: Vec<_> = page
            .recognitions()
            .into_iter()
            .map(|r| (r.original_index, r.text))
            .collect();
        assert_eq!(
            indices,
            vec![(0, "a".to_string()), (1, "b".to_string()), (2, "c".to_string())]
        );
        assert_eq!(page.vertical_line_count(), 3);
    }

    #[test]
    fn test_serializes_box_field() {
        let value = serde_json::to_value(line(0, 0, "字")).unwrap();
        assert_eq!(value["box"]["x_max"], 10);
        assert_eq!(value["char_capacity_bucket"], "large");
    }
}
