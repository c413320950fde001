//! Reading-order resolution.
//!
//! Choosing the layout algorithm is left to the caller: the engine only asks a
//! [`ReadingOrderResolver`] for the position and block of every text line.

use crate::core::OCRError;
use crate::domain::DetectedBox;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// Position of one text line in the page's reading order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LineOrder {
    /// Rank in reading order. Over a page these form a permutation of `0..n`.
    pub read_order: usize,
    /// Block (paragraph or column) the line belongs to.
    pub block: usize,
}

/// Assigns a reading-order position to every text line of a page.
pub trait ReadingOrderResolver: Send + Sync + Debug {
    /// Returns one [`LineOrder`] per entry of `lines`, in the same order.
    ///
    /// `regions` holds the page's non-text detections, which layout-aware
    /// resolvers may use to find columns and blocks.
    fn resolve(
        &self,
        lines: &[DetectedBox],
        regions: &[DetectedBox],
    ) -> Result<Vec<LineOrder>, OCRError>;
}

/// Keeps lines in detection order, all in a single block.
#[derive(Debug, Clone, Copy, Default)]
pub struct DetectionOrder;

impl ReadingOrderResolver for DetectionOrder {
    fn resolve(
        &self,
        lines: &[DetectedBox],
        _regions: &[DetectedBox],
    ) -> Result<Vec<LineOrder>, OCRError> {
        Ok((0..lines.len())
            .map(|read_order| LineOrder {
                read_order,
                block: 0,
            })
            .collect())
    }
}

/// Checks that `orders` has `line_count` entries whose `read_order` values are
/// a permutation of `0..line_count`.
pub fn validate_line_orders(orders: &[LineOrder], line_count: usize) -> Result<(), OCRError> {
    if orders.len() != line_count {
        return Err(OCRError::invalid_input(format!(
            "reading order has {} entries for {} lines",
            orders.len(),
            line_count
        )));
    }
    let mut seen = vec![false; line_count];
    for order in orders {
        match seen.get_mut(order.read_order) {
            Some(slot) if !*slot => *slot = true,
            Some(_) => {
                return Err(OCRError::invalid_input(format!(
                    "read order {} is assigned twice",
                    order.read_order
                )));
            }
            None => {
                return Err(OCRError::invalid_input(format!(
                    "read order {} is out of range for {} lines",
                    order.read_order, line_count
                )));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CharCapacityBucket, RegionClass};
    use crate::processors::BoundingBox;

    fn text_line() -> DetectedBox {
        DetectedBox {
            bounds: BoundingBox::new(0, 0, 10, 2),
            confidence: 0.9,
            class: RegionClass::TextLine,
            class_name: None,
            pred_char_count: 100.0,
            char_capacity_bucket: CharCapacityBucket::Large,
        }
    }

    fn order(read_order: usize) -> LineOrder {
        LineOrder {
            read_order,
            block: 0,
        }
    }

    #[test]
    fn test_detection_order_is_identity() {
        let lines = vec![text_line(), text_line(), text_line()];
        let orders = DetectionOrder.resolve(&lines, &[]).unwrap();
        assert_eq!(orders, vec![order(0), order(1), order(2)]);
        assert!(validate_line_orders(&orders, 3).is_ok());
    }

    #[test]
    fn test_validate_rejects_duplicates_gaps_and_wrong_length() {
        assert!(validate_line_orders(&[order(1), order(0)], 2).is_ok());
        assert!(validate_line_orders(&[order(0), order(0)], 2).is_err());
        assert!(validate_line_orders(&[order(0), order(2)], 2).is_err());
        assert!(validate_line_orders(&[order(0)], 2).is_err());
        assert!(validate_line_orders(&[], 0).is_ok());
    }
}
