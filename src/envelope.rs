use axum::Json;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

/// Success side of the response convention: `{ success, message, ...data }`.
///
/// `data` is flattened, so it must serialize as a map (a struct with named
/// fields, or [`NoData`]).
#[derive(Debug, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub success: bool,
    pub message: String,
    #[serde(flatten)]
    pub data: T,
}

/// Payload for message-only responses.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct NoData {}

impl<T> Envelope<T> {
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data,
        }
    }
}

impl Envelope<NoData> {
    pub fn message(message: impl Into<String>) -> Self {
        Self::ok(message, NoData {})
    }
}

pub type ApiResult<T> = Result<Json<Envelope<T>>, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    struct Donars {
        donars: Vec<String>,
    }

    #[test]
    fn flattens_payload_next_to_success() {
        let v = serde_json::to_value(Envelope::ok("done", Donars { donars: vec![] })).unwrap();
        assert_eq!(
            v,
            serde_json::json!({"success": true, "message": "done", "donars": []})
        );
    }

    #[test]
    fn message_only() {
        let v = serde_json::to_value(Envelope::message("Welcome user")).unwrap();
        assert_eq!(v, serde_json::json!({"success": true, "message": "Welcome user"}));
    }
}
