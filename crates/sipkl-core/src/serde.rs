//! Lenient deserializers for form fields that browsers send either as JSON
//! strings or as numbers (identifiers, years, phone numbers).

use serde::{Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum TextOrNumber {
    Text(String),
    Int(i64),
    Float(f64),
}

impl TextOrNumber {
    fn into_string(self) -> String {
        match self {
            Self::Text(s) => s,
            Self::Int(n) => n.to_string(),
            Self::Float(f) => f.to_string(),
        }
    }
}

/// Accept a string or a number; numbers are rendered as text.
pub fn deserialize_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(TextOrNumber::deserialize(deserializer)?.into_string())
}

/// Like [`deserialize_text`], but null, missing or blank values become `None`.
pub fn deserialize_optional_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt: Option<TextOrNumber> = Option::deserialize(deserializer)?;
    Ok(opt
        .map(TextOrNumber::into_string)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Form {
        #[serde(deserialize_with = "deserialize_text")]
        id: String,
        #[serde(default, deserialize_with = "deserialize_optional_text")]
        year: Option<String>,
    }

    #[test]
    fn test_numbers_and_strings() {
        let form: Form = serde_json::from_str(r#"{"id": 123, "year": 2025}"#).unwrap();
        assert_eq!(form.id, "123");
        assert_eq!(form.year.as_deref(), Some("2025"));

        let form: Form = serde_json::from_str(r#"{"id": "00123", "year": "  "}"#).unwrap();
        assert_eq!(form.id, "00123");
        assert_eq!(form.year, None);
    }

    #[test]
    fn test_missing_optional_field() {
        let form: Form = serde_json::from_str(r#"{"id": "a"}"#).unwrap();
        assert_eq!(form.year, None);
    }
}
