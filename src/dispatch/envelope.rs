use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sipkl_core::errors::AppError;
use utoipa::ToSchema;

pub const SESSION_EXPIRED: &str = "Session expired. Please log in again.";

/// Body of `POST /api/rpc`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct RpcRequest {
    #[schema(example = "login")]
    pub action: String,
    #[serde(default)]
    #[schema(value_type = Object)]
    pub payload: Value,
}

/// `{ "success": true, ...fields }` or `{ "success": false, "error": ... }`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub session_expired: bool,
    /// The first of two related writes succeeded, the second did not.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub partial: bool,
    /// Action-specific fields, serialized next to `success`.
    #[serde(flatten)]
    #[schema(ignore)]
    pub data: Map<String, Value>,
}

impl ApiResponse {
    /// Success carrying the fields of `data`. Non-object values are wrapped
    /// under a `data` key.
    pub fn ok(data: Value) -> Self {
        let data = match data {
            Value::Object(map) => map,
            Value::Null => Map::new(),
            other => {
                let mut map = Map::new();
                map.insert("data".to_string(), other);
                map
            }
        };
        Self {
            success: true,
            error: None,
            session_expired: false,
            partial: false,
            data,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(message.into()),
            session_expired: false,
            partial: false,
            data: Map::new(),
        }
    }

    pub fn failure(error: &AppError) -> Self {
        Self {
            partial: error.is_partial(),
            ..Self::error(error.message())
        }
    }

    pub fn session_expired() -> Self {
        Self {
            session_expired: true,
            ..Self::error(SESSION_EXPIRED)
        }
    }
}
