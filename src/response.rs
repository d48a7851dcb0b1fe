//! The `{code, message, data?}` envelope every JSON response is wrapped in.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::users::repo_types::User;

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub timestamp: String,
}

/// Everything that can travel in `data`. `None` is omitted from the JSON.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum Payload {
    None,
    User(User),
    Users(Vec<User>),
    Health(HealthStatus),
}

impl Payload {
    pub fn is_none(&self) -> bool {
        matches!(self, Payload::None)
    }
}

#[derive(Debug, Serialize)]
pub struct ApiResponse {
    pub code: u16,
    pub message: String,
    #[serde(skip_serializing_if = "Payload::is_none")]
    pub data: Payload,
}

impl ApiResponse {
    pub fn new(status: StatusCode, message: impl Into<String>, data: Payload) -> Self {
        Self {
            code: status.as_u16(),
            message: message.into(),
            data,
        }
    }

    pub fn ok(message: impl Into<String>, data: Payload) -> Self {
        Self::new(StatusCode::OK, message, data)
    }
}

impl IntoResponse for ApiResponse {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use time::macros::datetime;

    fn sample_user() -> User {
        User {
            id: 7,
            name: "Li".into(),
            email: "li@x.com".into(),
            age: 30,
            created_at: datetime!(2024-05-01 10:00:00 UTC),
            updated_at: datetime!(2024-05-01 10:00:00 UTC),
        }
    }

    #[test]
    fn empty_payload_omits_data_key() {
        let v = serde_json::to_value(ApiResponse::ok("user deleted", Payload::None)).unwrap();
        assert_eq!(v, json!({"code": 200, "message": "user deleted"}));
        assert!(v.get("data").is_none());
        // Clients treating `data` as optional read it the same as a null.
        assert!(v.get("data").and_then(Value::as_object).is_none());
    }

    #[test]
    fn single_user_payload_uses_wire_field_names() {
        let v = serde_json::to_value(ApiResponse::ok("user fetched", Payload::User(sample_user())))
            .unwrap();
        assert_eq!(
            v["data"],
            json!({
                "id": 7,
                "name": "Li",
                "email": "li@x.com",
                "age": 30,
                "created_at": "2024-05-01T10:00:00Z",
                "updated_at": "2024-05-01T10:00:00Z"
            })
        );
    }

    #[test]
    fn list_payload_is_array_even_when_empty() {
        let v = serde_json::to_value(ApiResponse::ok("users fetched", Payload::Users(vec![])))
            .unwrap();
        assert_eq!(v["data"], json!([]));
    }

    #[test]
    fn status_code_drives_http_status() {
        let resp = ApiResponse::new(StatusCode::CREATED, "user created", Payload::None).into_response();
        assert_eq!(resp.status(), StatusCode::CREATED);
    }
}
