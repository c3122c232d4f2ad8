//! Sheet layout shared by every reader and writer.
//!
//! Records are stored positionally. The column maps below are the single
//! source of truth for those positions; bump [`SCHEMA_VERSION`] whenever one
//! of them changes.

use sipkl_sheets::CellValue;
use sipkl_sheets::cell::TEXT_MARKER;

pub const SCHEMA_VERSION: u32 = 1;

/// Sheet holding one row per login account.
pub const ACCOUNTS_SHEET: &str = "users";

/// Column positions of the accounts sheet.
pub mod accounts {
    pub const IDENTIFIER: usize = 0;
    pub const PASSWORD_HASH: usize = 1;
    pub const ROLE: usize = 2;
    pub const DEPARTMENT: usize = 3;
    pub const NAME: usize = 4;
    pub const TOKEN: usize = 5;

    pub const HEADER: [&str; 6] = ["Identifier", "Password", "Role", "Department", "Name", "Token"];
}

/// Column positions of a department sheet.
pub mod profiles {
    pub const IDENTIFIER: usize = 0;
    pub const NAME: usize = 1;
    pub const ADDRESS: usize = 2;
    pub const STUDENT_PHONE: usize = 3;
    pub const GUARDIAN_PHONE: usize = 4;
    pub const PHOTO_ID: usize = 5;
    pub const PHOTO_PREVIEW: usize = 6;
    pub const YEAR: usize = 7;

    pub const HEADER: [&str; 8] = [
        "Identifier",
        "Name",
        "Address",
        "Student Phone",
        "Guardian Phone",
        "Photo Id",
        "Photo Preview",
        "Year",
    ];
}

pub fn header(columns: &[&str]) -> Vec<String> {
    columns.iter().map(|c| c.to_string()).collect()
}

/// Canonical form of an identifier read from a cell or a request.
///
/// Strips surrounding whitespace and a leftover text marker.
pub fn normalize_identifier(raw: &str) -> String {
    let trimmed = raw.trim();
    trimmed
        .strip_prefix(TEXT_MARKER)
        .unwrap_or(trimmed)
        .trim()
        .to_string()
}

/// Prefix a value with the text marker so the store keeps it verbatim.
///
/// Empty values stay empty.
pub fn marked(value: &str) -> String {
    if value.is_empty() || value.starts_with(TEXT_MARKER) {
        value.to_string()
    } else {
        format!("{}{}", TEXT_MARKER, value)
    }
}

/// Anything a row can be decoded from: stored cells or rendered strings.
pub trait CellText {
    fn cell_text(&self) -> String;
}

impl CellText for CellValue {
    fn cell_text(&self) -> String {
        self.as_text()
    }
}

impl CellText for String {
    fn cell_text(&self) -> String {
        self.clone()
    }
}

/// Text at `col`, or an empty string when the row is short.
pub fn text_at<C: CellText>(row: &[C], col: usize) -> String {
    row.get(col).map(CellText::cell_text).unwrap_or_default()
}
