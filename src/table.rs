//! Buffering of table runs.

use crate::block::Block;
use crate::inline::strip_markers;

/// A line shaped like a table row: it starts and ends with `|`.
pub fn is_table_row(line: &str) -> bool {
    let line = line.trim();
    line.starts_with('|') && line.ends_with('|')
}

/// Split a table row into trimmed cells with emphasis markers removed.
///
/// Only the empty pieces produced by the leading and trailing `|` are
/// discarded; an empty cell in the middle of a row is kept.
pub fn split_cells(line: &str) -> Vec<String> {
    let pieces: Vec<&str> = line.trim().split('|').collect();
    if pieces.len() < 2 {
        return Vec::new();
    }
    pieces[1..pieces.len() - 1]
        .iter()
        .map(|cell| strip_markers(cell.trim()))
        .collect()
}

/// What a table-shaped line contributed to the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowKind {
    Header,
    Data,
    /// Separator rows (`|---|---|`) and rows whose cells are all empty.
    Skipped,
}

/// Collects the rows of one table run until it is flushed.
#[derive(Debug, Default)]
pub struct TableAccumulator {
    header: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl TableAccumulator {
    /// Add one table-shaped line. The first non-separator row becomes the
    /// header; the rest are data rows in arrival order.
    pub fn push_row(&mut self, line: &str) -> RowKind {
        let cells = split_cells(line);
        if cells.iter().all(String::is_empty) {
            return RowKind::Skipped;
        }
        match cells.first() {
            None => RowKind::Skipped,
            Some(first) if first.contains("---") => RowKind::Skipped,
            Some(_) if self.header.is_empty() => {
                self.header = cells;
                RowKind::Header
            }
            Some(_) => {
                self.rows.push(cells);
                RowKind::Data
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.header.is_empty() && self.rows.is_empty()
    }

    /// Emit the buffered run as one table. A run without a header (only
    /// separator rows) produces nothing.
    pub fn finish(self) -> Option<Block> {
        if self.header.is_empty() {
            return None;
        }
        Some(Block::Table {
            header: self.header,
            rows: self.rows,
        })
    }
}

/// Fit a data row to the header width: pad short rows with empty cells,
/// drop cells beyond the header.
pub fn normalize_row(row: &[String], columns: usize) -> Vec<String> {
    (0..columns)
        .map(|i| row.get(i).cloned().unwrap_or_default())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_row_shape() {
        assert!(is_table_row("| A | B |"));
        assert!(is_table_row("  |x|  "));
        assert!(!is_table_row("| A | B"));
        assert!(!is_table_row("A | B |"));
        assert!(!is_table_row(""));
    }

    #[test]
    fn cells_are_trimmed_and_unbolded() {
        assert_eq!(split_cells("| **ID** |  Name |"), vec!["ID", "Name"]);
        assert_eq!(split_cells("| A || C |"), vec!["A", "", "C"]);
        assert!(split_cells("|").is_empty());
        assert_eq!(split_cells("||"), vec![""]);
    }

    #[test]
    fn rows_without_content_are_skipped() {
        let mut acc = TableAccumulator::default();
        assert_eq!(acc.push_row("||"), RowKind::Skipped);
        assert_eq!(acc.push_row("|  |  |"), RowKind::Skipped);
        assert!(acc.is_empty());
        assert_eq!(acc.finish(), None);

        let mut acc = TableAccumulator::default();
        assert_eq!(acc.push_row("| A || C |"), RowKind::Header);
        assert_eq!(
            acc.finish(),
            Some(Block::Table {
                header: vec!["A".into(), "".into(), "C".into()],
                rows: vec![],
            })
        );
    }

    #[test]
    fn separator_never_contributes() {
        let mut acc = TableAccumulator::default();
        assert_eq!(acc.push_row("| --- | --- |"), RowKind::Skipped);
        assert!(acc.is_empty());
        assert_eq!(acc.push_row("| A | B |"), RowKind::Header);
        assert_eq!(acc.push_row("|:---|---:|"), RowKind::Skipped);
        assert_eq!(acc.push_row("| 1 | 2 |"), RowKind::Data);
        assert_eq!(
            acc.finish(),
            Some(Block::Table {
                header: vec!["A".into(), "B".into()],
                rows: vec![vec!["1".into(), "2".into()]],
            })
        );
    }

    #[test]
    fn header_only_table() {
        let mut acc = TableAccumulator::default();
        acc.push_row("| Only | Header |");
        assert_eq!(
            acc.finish(),
            Some(Block::Table {
                header: vec!["Only".into(), "Header".into()],
                rows: vec![],
            })
        );
    }

    #[test]
    fn separators_alone_emit_nothing() {
        let mut acc = TableAccumulator::default();
        acc.push_row("|---|");
        assert_eq!(acc.finish(), None);
    }

    #[test]
    fn rows_keep_arrival_order() {
        let mut acc = TableAccumulator::default();
        for line in ["| H |", "| 3 |", "| 1 |", "| 2 |"] {
            acc.push_row(line);
        }
        let Some(Block::Table { rows, .. }) = acc.finish() else {
            panic!("expected a table");
        };
        assert_eq!(rows, vec![vec!["3"], vec!["1"], vec!["2"]]);
    }

    #[test]
    fn normalize_pads_and_truncates() {
        let short = vec!["a".to_string()];
        assert_eq!(normalize_row(&short, 3), vec!["a", "", ""]);
        let long: Vec<String> = ["a", "b", "c", "d"].iter().map(|s| s.to_string()).collect();
        assert_eq!(normalize_row(&long, 2), vec!["a", "b"]);
    }
}
