use anyhow::anyhow;
use serde::de::DeserializeOwned;
use serde_json::Value;
use sipkl_core::errors::AppError;
use validator::{Validate, ValidationErrors, ValidationErrorsKind};

fn collect_messages(errors: &ValidationErrors, out: &mut Vec<String>) {
    for (field, kind) in errors.errors() {
        match kind {
            ValidationErrorsKind::Field(errors) => {
                out.extend(errors.iter().map(|error| {
                    error
                        .message
                        .as_ref()
                        .map(|msg| msg.to_string())
                        .unwrap_or_else(|| format!("{} is invalid", field))
                }));
            }
            ValidationErrorsKind::Struct(inner) => collect_messages(inner, out),
            ValidationErrorsKind::List(items) => {
                for inner in items.values() {
                    collect_messages(inner, out);
                }
            }
        }
    }
}

fn format_errors(errors: &ValidationErrors) -> String {
    let mut messages = Vec::new();
    collect_messages(errors, &mut messages);
    messages.sort();
    messages.join(", ")
}

fn deserialize_error(e: serde_json::Error) -> AppError {
    let text = e.to_string();

    if text.contains("missing field") {
        let field = text
            .split("missing field `")
            .nth(1)
            .and_then(|s| s.split('`').next())
            .unwrap_or("unknown");
        return AppError::bad_request(anyhow!("{} is required", field));
    }

    if text.contains("invalid type") {
        return AppError::bad_request(anyhow!("Invalid field type in request"));
    }

    AppError::bad_request(anyhow!("Invalid request payload"))
}

/// Decode an action payload and run its validation rules.
pub fn parse_payload<T>(payload: Value) -> Result<T, AppError>
where
    T: DeserializeOwned + Validate,
{
    let value: T = serde_json::from_value(payload).map_err(deserialize_error)?;
    value
        .validate()
        .map_err(|errors| AppError::unprocessable(anyhow!("{}", format_errors(&errors))))?;
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize, Validate)]
    struct Form {
        #[validate(length(min = 1, message = "Name is required"))]
        name: String,
        #[validate(length(min = 3))]
        code: String,
    }

    #[test]
    fn test_missing_field_names_the_field() {
        let err = parse_payload::<Form>(json!({"name": "x"})).unwrap_err();
        assert_eq!(err.message(), "code is required");
    }

    #[test]
    fn test_validation_messages() {
        let err = parse_payload::<Form>(json!({"name": "", "code": "abcd"})).unwrap_err();
        assert_eq!(err.message(), "Name is required");

        let err = parse_payload::<Form>(json!({"name": "a", "code": "ab"})).unwrap_err();
        assert_eq!(err.message(), "code is invalid");
    }

    #[test]
    fn test_wrong_type() {
        let err = parse_payload::<Form>(json!({"name": 1, "code": "abc"})).unwrap_err();
        assert_eq!(err.message(), "Invalid field type in request");
    }
}
