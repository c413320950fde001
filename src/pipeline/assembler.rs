//! Page text assembly from ordered lines.

use super::reading_order::LineOrder;
use crate::processors::BoundingBox;
use serde::Serialize;

/// A recognized line with its place in reading order.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderedLine {
    pub text: String,
    pub bounds: BoundingBox,
    pub order: LineOrder,
}

/// Page text grouped into blocks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AssembledPage {
    /// Block texts in final order, lines joined by `\n`.
    pub blocks: Vec<String>,
    /// More than half of the lines are taller than wide.
    pub vertical_majority: bool,
    /// The block order was reversed.
    pub reversed: bool,
}

impl AssembledPage {
    /// The whole page, blocks joined by newlines.
    pub fn text(&self) -> String {
        self.blocks.join("\n")
    }
}

/// Orders lines by `read_order`, groups them by block and applies the
/// writing-direction rule.
///
/// Blocks appear in the order their first line is read. They are reversed when
/// the vertical lines are a strict majority, and also for a page without lines.
pub fn assemble(lines: &[OrderedLine]) -> AssembledPage {
    let mut sorted: Vec<&OrderedLine> = lines.iter().collect();
    sorted.sort_by_key(|line| line.order.read_order);

    let mut block_ids: Vec<usize> = Vec::new();
    let mut blocks: Vec<Vec<&str>> = Vec::new();
    for line in &sorted {
        let slot = match block_ids.iter().position(|&id| id == line.order.block) {
            Some(slot) => slot,
            None => {
                block_ids.push(line.order.block);
                blocks.push(Vec::new());
                blocks.len() - 1
            }
        };
        blocks[slot].push(line.text.as_str());
    }

    let vertical = lines.iter().filter(|l| l.bounds.is_vertical()).count();
    let vertical_majority = !lines.is_empty() && vertical * 2 > lines.len();
    let reversed = lines.is_empty() || vertical_majority;

    let mut blocks: Vec<String> = blocks.into_iter().map(|b| b.join("\n")).collect();
    if reversed {
        blocks.reverse();
    }

    AssembledPage {
        blocks,
        vertical_majority,
        reversed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(text: &str, read_order: usize, block: usize, vertical: bool) -> OrderedLine {
        let bounds = if vertical {
            BoundingBox::new(0, 0, 10, 100)
        } else {
            BoundingBox::new(0, 0, 100, 10)
        };
        OrderedLine {
            text: text.to_string(),
            bounds,
            order: LineOrder { read_order, block },
        }
    }

    #[test]
    fn test_single_vertical_line_among_three_is_not_reversed() {
        let page = assemble(&[
            line("一", 0, 0, false),
            line("二", 1, 1, true),
            line("三", 2, 2, false),
        ]);
        assert!(!page.reversed);
        assert!(!page.vertical_majority);
        assert_eq!(page.text(), "一\n二\n三");
    }

    #[test]
    fn test_vertical_majority_reverses_blocks() {
        let page = assemble(&[
            line("右", 0, 0, true),
            line("中", 1, 1, true),
            line("左", 2, 2, false),
        ]);
        assert!(page.reversed);
        assert_eq!(page.blocks, vec!["左", "中", "右"]);
    }

    #[test]
    fn test_exact_half_vertical_keeps_order() {
        let page = assemble(&[line("a", 0, 0, true), line("b", 1, 1, false)]);
        assert!(!page.reversed);
    }

    #[test]
    fn test_empty_page_is_reversed_and_empty() {
        let page = assemble(&[]);
        assert!(page.reversed);
        assert!(!page.vertical_majority);
        assert!(page.blocks.is_empty());
        assert_eq!(page.text(), "");
    }

    #[test]
    fn test_lines_sorted_and_grouped_by_block() {
        let page = assemble(&[
            line("c", 2, 0, false),
            line("a", 0, 0, false),
            line("b", 1, 5, false),
            line("d", 3, 5, false),
        ]);
        assert_eq!(page.blocks, vec!["a\nc", "b\nd"]);
    }
}
