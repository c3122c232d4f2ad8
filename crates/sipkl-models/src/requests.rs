//! Action payloads.
//!
//! Clients send identifiers, phone numbers, and years sometimes as strings
//! and sometimes as numbers, so those fields go through the lenient
//! deserializers of `sipkl_core::serde`.

use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use sipkl_core::serde::{deserialize_optional_text, deserialize_text};

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[serde(deserialize_with = "deserialize_text")]
    #[validate(length(min = 1, message = "Identifier is required"))]
    #[schema(example = "00123")]
    pub identifier: String,
    #[schema(example = "123456")]
    pub password: String,
}

/// Self sign-up form, also used by admins creating a student account.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct RegisterRequest {
    #[serde(deserialize_with = "deserialize_text")]
    #[validate(length(min = 1, max = 64, message = "Identifier is required"))]
    #[schema(example = "00123")]
    pub identifier: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
    #[serde(default)]
    #[validate(length(max = 200))]
    #[schema(example = "budi santoso")]
    pub name: String,
    #[serde(default, deserialize_with = "deserialize_optional_text")]
    #[schema(example = "tjkt")]
    pub department: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_text")]
    #[schema(example = "2025")]
    pub year: Option<String>,
}

/// Fields a student edits on their own profile.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfileForm {
    #[serde(default, deserialize_with = "deserialize_optional_text")]
    #[validate(length(max = 200))]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_text")]
    #[validate(length(max = 500))]
    pub address: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_text")]
    #[validate(length(max = 32))]
    pub student_phone: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_text")]
    #[validate(length(max = 32))]
    pub guardian_phone: Option<String>,
    /// Key returned by `uploadPhoto`; absent keeps the stored photo.
    #[serde(default, deserialize_with = "deserialize_optional_text")]
    pub photo_id: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_text")]
    pub year: Option<String>,
}

/// Base64 image, with or without a `data:<mime>;base64,` prefix.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PhotoUpload {
    #[validate(length(min = 1, message = "Photo data is empty"))]
    pub file_data: String,
    #[serde(default)]
    #[schema(example = "image/jpeg")]
    pub file_type: Option<String>,
}

/// Admin edit of another student's profile.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DetailForm {
    #[serde(deserialize_with = "deserialize_text")]
    #[validate(length(min = 1, message = "Identifier is required"))]
    pub identifier: String,
    #[serde(default, deserialize_with = "deserialize_optional_text")]
    pub department: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_text")]
    #[validate(length(max = 200))]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_text")]
    #[validate(length(max = 500))]
    pub address: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_text")]
    #[validate(length(max = 32))]
    pub student_phone: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_text")]
    #[validate(length(max = 32))]
    pub guardian_phone: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_text")]
    pub year: Option<String>,
    #[serde(default)]
    #[validate(nested)]
    pub photo: Option<PhotoUpload>,
}

/// Payload naming one account, optionally with its department.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct IdentifierRequest {
    #[serde(deserialize_with = "deserialize_text")]
    #[validate(length(min = 1, message = "Identifier is required"))]
    pub identifier: String,
    #[serde(default, deserialize_with = "deserialize_optional_text")]
    pub department: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TransferRequest {
    #[serde(deserialize_with = "deserialize_text")]
    #[validate(length(min = 1, message = "Identifier is required"))]
    pub identifier: String,
    #[serde(default, deserialize_with = "deserialize_optional_text")]
    pub old_department: Option<String>,
    #[serde(deserialize_with = "deserialize_text")]
    #[validate(length(min = 1, message = "New department is required"))]
    pub new_department: String,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    #[validate(length(min = 1, message = "New password is required"))]
    pub new_password: String,
}

/// Admin change of their own login. Blank fields are left unchanged.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CredentialsUpdate {
    #[serde(default, deserialize_with = "deserialize_optional_text")]
    #[validate(length(max = 64))]
    pub new_identifier: Option<String>,
    #[serde(default)]
    pub new_password: Option<String>,
}

/// Department plus optional year filter used by listings and exports.
///
/// A year of `""`, `Semua`, or `All` means every year.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct DepartmentQuery {
    #[serde(default, deserialize_with = "deserialize_optional_text")]
    pub department: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_text")]
    pub year: Option<String>,
}

impl DepartmentQuery {
    pub fn year_filter(&self) -> Option<&str> {
        year_filter(self.year.as_deref())
    }
}

/// Normalize a year filter; the "every year" spellings become `None`.
pub fn year_filter(year: Option<&str>) -> Option<&str> {
    year.map(str::trim)
        .filter(|y| !y.is_empty() && !y.eq_ignore_ascii_case("semua") && !y.eq_ignore_ascii_case("all"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_accepts_numeric_identifier_and_year() {
        let req: RegisterRequest = serde_json::from_str(
            r#"{"identifier": 123, "password": "x", "name": "a", "department": "tjkt", "year": 2025}"#,
        )
        .unwrap();
        assert_eq!(req.identifier, "123");
        assert_eq!(req.year.as_deref(), Some("2025"));
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_register_requires_password() {
        let req: RegisterRequest =
            serde_json::from_str(r#"{"identifier": "00123", "password": ""}"#).unwrap();
        assert!(req.validate().is_err());
        assert_eq!(req.department, None);
    }

    #[test]
    fn test_profile_form_camel_case() {
        let form: ProfileForm = serde_json::from_str(
            r#"{"name": "budi", "studentPhone": "0812", "guardianPhone": 852, "photoId": ""}"#,
        )
        .unwrap();
        assert_eq!(form.student_phone.as_deref(), Some("0812"));
        assert_eq!(form.guardian_phone.as_deref(), Some("852"));
        assert_eq!(form.photo_id, None);
        assert_eq!(form.address, None);
    }

    #[test]
    fn test_detail_form_nested_photo_is_validated() {
        let form: DetailForm = serde_json::from_str(
            r#"{"identifier": "1", "photo": {"fileData": "", "fileType": "image/png"}}"#,
        )
        .unwrap();
        assert!(form.validate().is_err());
    }

    #[test]
    fn test_year_filter() {
        assert_eq!(year_filter(None), None);
        assert_eq!(year_filter(Some("")), None);
        assert_eq!(year_filter(Some("Semua")), None);
        assert_eq!(year_filter(Some("All")), None);
        assert_eq!(year_filter(Some(" 2025 ")), Some("2025"));
    }
}
