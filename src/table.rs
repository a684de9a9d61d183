use tracing::trace;

use crate::columns::{COLUMNS, Cell, project};
use crate::record::UserRecord;

pub const COLUMN_WIDTH_MARGIN: usize = 1;

#[derive(Debug, Clone, PartialEq)]
pub struct RenderedRow {
    pub cells: Vec<Cell>,
}

/// A table built from one record sequence. It is never patched: a new search
/// result or a reset builds a fresh one which replaces the old one in the region.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedTable {
    pub header: Vec<&'static str>,
    pub rows: Vec<RenderedRow>,
}

impl RenderedTable {
    pub fn nrows(&self) -> usize {
        self.rows.len()
    }

    pub fn cell(&self, row: usize, column: usize) -> Option<&Cell> {
        self.rows.get(row).and_then(|r| r.cells.get(column))
    }

    /// Width of every column: the widest of header and cells plus a margin, capped
    /// at `max_column_width`.
    pub fn column_widths(&self, max_column_width: usize) -> Vec<usize> {
        self.header
            .iter()
            .enumerate()
            .map(|(cidx, name)| {
                let max_width = self
                    .rows
                    .iter()
                    .filter_map(|row| row.cells.get(cidx))
                    .map(|cell| cell.text().chars().count())
                    .max()
                    .unwrap_or(0);
                let width = std::cmp::max(name.chars().count(), max_width) + COLUMN_WIDTH_MARGIN;
                std::cmp::min(width, max_column_width)
            })
            .collect()
    }
}

pub fn render(records: &[UserRecord], date_format: &str) -> RenderedTable {
    let header = COLUMNS.iter().map(|c| c.label).collect();
    let rows = records
        .iter()
        .map(|record| RenderedRow {
            cells: project(record, date_format),
        })
        .collect::<Vec<_>>();
    trace!("Rendered table with {} rows", rows.len());
    RenderedTable { header, rows }
}

/// Shorten `name` to `width` characters, marking the cut with "...".
pub fn get_visible_name(name: &str, width: usize) -> String {
    if width < 3 {
        return "".to_string();
    }
    if name.chars().count() > width {
        let mut reduced_name = name.chars().take(width - 3).collect::<String>();
        reduced_name.push_str("...");
        reduced_name
    } else {
        name.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::parse_payload;

    fn users() -> Vec<UserRecord> {
        parse_payload(include_str!("../tests/fixtures/users.json")).unwrap()
    }

    #[test]
    fn one_header_and_one_row_per_record() {
        let users = users();
        let table = render(&users, "%d.%m.%Y");
        assert_eq!(table.header.len(), COLUMNS.len());
        assert_eq!(
            table.header,
            vec!["Name", "Picture", "Location", "Email", "Phone", "Registered date"]
        );
        assert_eq!(table.nrows(), users.len());
        for (row, user) in table.rows.iter().zip(users.iter()) {
            assert_eq!(row.cells.len(), COLUMNS.len());
            assert_eq!(row.cells[0].text(), user.full_name());
        }
    }

    #[test]
    fn rendering_is_pure() {
        let users = users();
        assert_eq!(render(&users, "%d.%m.%Y"), render(&users, "%d.%m.%Y"));
    }

    #[test]
    fn empty_input_still_has_header() {
        let table = render(&[], "%d.%m.%Y");
        assert_eq!(table.header.len(), COLUMNS.len());
        assert_eq!(table.nrows(), 0);
        assert_eq!(table.cell(0, 0), None);
    }

    #[test]
    fn column_widths_fit_content_and_cap() {
        let table = render(&users()[..2], "%d.%m.%Y");
        let widths = table.column_widths(40);
        // "Registered date" is wider than any formatted date
        assert_eq!(widths[5], "Registered date".len() + COLUMN_WIDTH_MARGIN);
        assert_eq!(widths[0], "Anna Smith".len() + COLUMN_WIDTH_MARGIN);
        assert!(table.column_widths(8).iter().all(|&w| w <= 8));
    }

    #[test]
    fn visible_name_is_shortened() {
        assert_eq!(get_visible_name("Registered date", 10), "Registe...");
        assert_eq!(get_visible_name("Name", 10), "Name");
        assert_eq!(get_visible_name("Name", 2), "");
    }
}
