//! Connect unary protocol pieces shared by the server and the client:
//! error codes, their HTTP status mapping and the JSON error envelope.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Header carrying the Connect protocol version.
pub const CONNECT_PROTOCOL_VERSION: &str = "connect-protocol-version";

/// The only protocol version this service speaks.
pub const PROTOCOL_VERSION: &str = "1";

/// Connect error code. On the wire it is the string from [`Code::as_str`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Code {
    Canceled,
    Unknown,
    InvalidArgument,
    DeadlineExceeded,
    NotFound,
    AlreadyExists,
    PermissionDenied,
    ResourceExhausted,
    FailedPrecondition,
    Aborted,
    OutOfRange,
    Unimplemented,
    Internal,
    Unavailable,
    DataLoss,
    Unauthenticated,
}

impl Code {
    pub const ALL: [Code; 16] = [
        Code::Canceled,
        Code::Unknown,
        Code::InvalidArgument,
        Code::DeadlineExceeded,
        Code::NotFound,
        Code::AlreadyExists,
        Code::PermissionDenied,
        Code::ResourceExhausted,
        Code::FailedPrecondition,
        Code::Aborted,
        Code::OutOfRange,
        Code::Unimplemented,
        Code::Internal,
        Code::Unavailable,
        Code::DataLoss,
        Code::Unauthenticated,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Code::Canceled => "canceled",
            Code::Unknown => "unknown",
            Code::InvalidArgument => "invalid_argument",
            Code::DeadlineExceeded => "deadline_exceeded",
            Code::NotFound => "not_found",
            Code::AlreadyExists => "already_exists",
            Code::PermissionDenied => "permission_denied",
            Code::ResourceExhausted => "resource_exhausted",
            Code::FailedPrecondition => "failed_precondition",
            Code::Aborted => "aborted",
            Code::OutOfRange => "out_of_range",
            Code::Unimplemented => "unimplemented",
            Code::Internal => "internal",
            Code::Unavailable => "unavailable",
            Code::DataLoss => "data_loss",
            Code::Unauthenticated => "unauthenticated",
        }
    }

    /// HTTP status a server answers with for this code.
    pub fn http_status(&self) -> u16 {
        match self {
            Code::Canceled => 499,
            Code::Unknown => 500,
            Code::InvalidArgument => 400,
            Code::DeadlineExceeded => 504,
            Code::NotFound => 404,
            Code::AlreadyExists => 409,
            Code::PermissionDenied => 403,
            Code::ResourceExhausted => 429,
            Code::FailedPrecondition => 400,
            Code::Aborted => 409,
            Code::OutOfRange => 400,
            Code::Unimplemented => 501,
            Code::Internal => 500,
            Code::Unavailable => 503,
            Code::DataLoss => 500,
            Code::Unauthenticated => 401,
        }
    }

    /// Code a client infers from a bare HTTP status when no error envelope came back.
    pub fn from_http_status(status: u16) -> Self {
        match status {
            400 => Code::Internal,
            401 => Code::Unauthenticated,
            403 => Code::PermissionDenied,
            404 => Code::Unimplemented,
            429 | 502 | 503 | 504 => Code::Unavailable,
            _ => Code::Unknown,
        }
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown error code: {0}")]
pub struct ParseCodeError(String);

impl FromStr for Code {
    type Err = ParseCodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Code::ALL
            .into_iter()
            .find(|code| code.as_str() == s)
            .ok_or_else(|| ParseCodeError(s.to_string()))
    }
}

impl Serialize for Code {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Code {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        name.parse().map_err(de::Error::custom)
    }
}

/// Protocol-level failure of a call. Serializes as the Connect error envelope.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{code}: {message}")]
pub struct RpcError {
    pub code: Code,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub message: String,
}

impl RpcError {
    pub fn new(code: Code, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::new(Code::InvalidArgument, message)
    }

    /// Rebuilds the error from a non-2xx response.
    pub fn from_http_response(status: u16, body: &[u8]) -> Self {
        if let Ok(error) = serde_json::from_slice::<RpcError>(body) {
            return error;
        }

        let message = if body.is_empty() {
            StatusCode::from_u16(status)
                .ok()
                .and_then(|s| s.canonical_reason())
                .map(str::to_string)
                .unwrap_or_else(|| format!("HTTP status {}", status))
        } else {
            String::from_utf8_lossy(body).into_owned()
        };

        Self::new(Code::from_http_status(status), message)
    }
}

impl IntoResponse for RpcError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.code.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_code_serializes_snake_case() {
        assert_eq!(
            serde_json::to_value(Code::InvalidArgument).unwrap(),
            json!("invalid_argument")
        );
        assert_eq!(serde_json::to_value(Code::Canceled).unwrap(), json!("canceled"));
        assert_eq!(Code::DeadlineExceeded.to_string(), "deadline_exceeded");
    }

    #[test]
    fn test_every_code_reads_back() {
        for code in Code::ALL {
            let value = serde_json::to_value(code).unwrap();
            assert_eq!(value, json!(code.as_str()));
            assert_eq!(serde_json::from_value::<Code>(value).unwrap(), code);
        }
        assert!(serde_json::from_value::<Code>(json!("teapot")).is_err());
        assert!("InvalidArgument".parse::<Code>().is_err());
    }

    #[test]
    fn test_invalid_argument_maps_to_bad_request() {
        assert_eq!(Code::InvalidArgument.http_status(), 400);
        assert_eq!(Code::Unimplemented.http_status(), 501);
        assert_eq!(Code::Canceled.http_status(), 499);
    }

    #[test]
    fn test_envelope_shape() {
        let error = RpcError::invalid_argument("unknown operation: 99");
        assert_eq!(
            serde_json::to_value(&error).unwrap(),
            json!({"code": "invalid_argument", "message": "unknown operation: 99"})
        );
        assert_eq!(error.to_string(), "invalid_argument: unknown operation: 99");
    }

    #[test]
    fn test_from_http_response_prefers_envelope() {
        let body = br#"{"code":"invalid_argument","message":"bad op"}"#;
        let error = RpcError::from_http_response(400, body);
        assert_eq!(error, RpcError::invalid_argument("bad op"));
    }

    #[test]
    fn test_from_http_response_falls_back_to_status() {
        let error = RpcError::from_http_response(503, b"");
        assert_eq!(error.code, Code::Unavailable);
        assert_eq!(error.message, "Service Unavailable");

        let error = RpcError::from_http_response(404, b"404 page not found");
        assert_eq!(error.code, Code::Unimplemented);
        assert_eq!(error.message, "404 page not found");
    }

    #[test]
    fn test_into_response_status() {
        let response = RpcError::invalid_argument("nope").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            response.headers()["content-type"],
            "application/json"
        );
    }
}
