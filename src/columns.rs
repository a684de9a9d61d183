use std::fmt::Write;

use chrono::{DateTime, Utc};

use crate::record::UserRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Name,
    Picture,
    Location,
    Email,
    Phone,
    Registered,
}

#[derive(Debug, Clone, Copy)]
pub struct ColumnSpec {
    pub label: &'static str,
    pub field: Field,
}

pub const COLUMNS: [ColumnSpec; 6] = [
    ColumnSpec { label: "Name", field: Field::Name },
    ColumnSpec { label: "Picture", field: Field::Picture },
    ColumnSpec { label: "Location", field: Field::Location },
    ColumnSpec { label: "Email", field: Field::Email },
    ColumnSpec { label: "Phone", field: Field::Phone },
    ColumnSpec { label: "Registered date", field: Field::Registered },
];

#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    // The large picture is never drawn in the table, it only feeds the hover overlay.
    Thumbnail { src: String, tooltip_url: String },
}

impl Cell {
    pub fn text(&self) -> String {
        match self {
            Cell::Text(s) => s.clone(),
            Cell::Thumbnail { src, .. } => thumbnail_label(src),
        }
    }

    pub fn tooltip_url(&self) -> Option<&str> {
        match self {
            Cell::Thumbnail { tooltip_url, .. } => Some(tooltip_url),
            Cell::Text(_) => None,
        }
    }
}

impl Field {
    pub fn project(&self, record: &UserRecord, date_format: &str) -> Cell {
        match self {
            Field::Name => Cell::Text(record.full_name()),
            Field::Picture => Cell::Thumbnail {
                src: record.picture.thumbnail.clone(),
                tooltip_url: record.picture.large.clone(),
            },
            Field::Location => Cell::Text(
                format!("{} {}", record.location.state, record.location.city)
                    .trim()
                    .to_string(),
            ),
            Field::Email => Cell::Text(record.email.clone()),
            Field::Phone => Cell::Text(record.phone.clone()),
            Field::Registered => Cell::Text(format_date(&record.registered.date, date_format)),
        }
    }
}

pub fn picture_column() -> usize {
    COLUMNS
        .iter()
        .position(|c| c.field == Field::Picture)
        .unwrap_or(1)
}

/// Project one record into its cells, in `COLUMNS` order.
pub fn project(record: &UserRecord, date_format: &str) -> Vec<Cell> {
    COLUMNS
        .iter()
        .map(|column| column.field.project(record, date_format))
        .collect()
}

pub fn format_date(raw: &str, date_format: &str) -> String {
    let Ok(date) = DateTime::parse_from_rfc3339(raw) else {
        return String::new();
    };
    let mut out = String::new();
    match write!(out, "{}", date.with_timezone(&Utc).format(date_format)) {
        Ok(_) => out,
        Err(_) => String::new(),
    }
}

// Terminals can't show the image itself, so the cell shows the tail of its path
// (e.g. "women/12.jpg").
fn thumbnail_label(src: &str) -> String {
    if src.is_empty() {
        return String::new();
    }
    let parts: Vec<&str> = src.rsplitn(3, '/').collect();
    match parts.as_slice() {
        [file, folder, _] => format!("▣ {folder}/{file}"),
        _ => format!("▣ {src}"),
    }
}
