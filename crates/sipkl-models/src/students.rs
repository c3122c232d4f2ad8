//! Student profiles, one row per student in the sheet of their department.

use serde::Serialize;
use utoipa::ToSchema;

use crate::schema::{CellText, marked, normalize_identifier, profiles as col, text_at};

#[derive(Clone, Debug, Default, PartialEq)]
pub struct StudentProfile {
    pub identifier: String,
    pub name: String,
    pub address: String,
    pub student_phone: String,
    pub guardian_phone: String,
    /// Blob storage key of the photo.
    pub photo_id: String,
    /// `=IMAGE(...)` formula; renders as nothing in display rows.
    pub photo_preview: String,
    pub year: String,
}

impl StudentProfile {
    /// A freshly enrolled student: only identity and year are known.
    pub fn enrollment(identifier: &str, name: &str, year: &str) -> Self {
        Self {
            identifier: identifier.to_string(),
            name: name.to_string(),
            year: year.to_string(),
            ..Self::default()
        }
    }

    pub fn from_row<C: CellText>(row: &[C]) -> Self {
        Self {
            identifier: normalize_identifier(&text_at(row, col::IDENTIFIER)),
            name: text_at(row, col::NAME),
            address: text_at(row, col::ADDRESS),
            student_phone: text_at(row, col::STUDENT_PHONE),
            guardian_phone: text_at(row, col::GUARDIAN_PHONE),
            photo_id: text_at(row, col::PHOTO_ID),
            photo_preview: text_at(row, col::PHOTO_PREVIEW),
            year: text_at(row, col::YEAR).trim().to_string(),
        }
    }

    pub fn to_row(&self) -> Vec<String> {
        vec![
            marked(&self.identifier),
            marked(&self.name),
            marked(&self.address),
            marked(&self.student_phone),
            marked(&self.guardian_phone),
            marked(&self.photo_id),
            self.photo_preview.clone(),
            self.year.clone(),
        ]
    }

    /// Storage key of the photo, if one was ever uploaded.
    pub fn photo_key(&self) -> Option<&str> {
        let key = self.photo_id.trim();
        if key.is_empty() || key.to_ascii_lowercase().contains("undefined") {
            None
        } else {
            Some(key)
        }
    }
}

/// Preview formula the grid renders as an inline image.
pub fn image_formula(url: &str) -> String {
    format!("=IMAGE(\"{}\")", url)
}

/// What a student sees of their own profile.
#[derive(Serialize, Debug, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfileView {
    pub name: String,
    pub address: String,
    pub student_phone: String,
    pub guardian_phone: String,
    pub photo_id: String,
    pub photo_url: Option<String>,
    pub year: String,
}

/// One profile opened for editing by an admin.
#[derive(Serialize, Debug, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DetailView {
    pub identifier: String,
    pub name: String,
    pub address: String,
    pub student_phone: String,
    pub guardian_phone: String,
    pub photo_id: String,
    pub year: String,
}

impl From<StudentProfile> for DetailView {
    fn from(p: StudentProfile) -> Self {
        Self {
            identifier: p.identifier,
            name: p.name,
            address: p.address,
            student_phone: p.student_phone,
            guardian_phone: p.guardian_phone,
            photo_id: p.photo_id,
            year: p.year,
        }
    }
}

/// A row of the admin student table.
#[derive(Serialize, Debug, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StudentListItem {
    pub identifier: String,
    pub name: String,
    pub address: String,
    pub student_phone: String,
    pub guardian_phone: String,
    pub photo_url: String,
    pub year: String,
}
