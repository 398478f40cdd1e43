use crate::domain::validator::Checker;
use crate::error::CatalogError;
use crate::transport::http::types::ApiResponse;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::error;

pub const NOT_FOUND_MESSAGE: &str = "the requested resource could not be found";
pub const EDIT_CONFLICT_MESSAGE: &str =
    "unable to update the record due to an edit conflict, please try again";
pub const SERVER_ERROR_MESSAGE: &str =
    "the server encountered a problem and could not process your request";

/// Wraps `data` in a successful envelope.
pub fn ok_json<T: Serialize>(status: StatusCode, data: &T) -> Response {
    match serde_json::to_value(data) {
        Ok(value) => (status, Json(ApiResponse::ok(value))).into_response(),
        Err(e) => {
            error!(error = %e, "failed to encode response");
            server_error()
        }
    }
}

pub fn not_found() -> Response {
    (StatusCode::NOT_FOUND, Json(ApiResponse::err(NOT_FOUND_MESSAGE))).into_response()
}

pub fn server_error() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ApiResponse::err(SERVER_ERROR_MESSAGE)),
    )
        .into_response()
}

pub fn bad_request(message: impl Into<String>) -> Response {
    (StatusCode::BAD_REQUEST, Json(ApiResponse::err(message))).into_response()
}

pub fn json_400(err: JsonRejection) -> Response {
    bad_request(format!("invalid JSON body: {}", err.body_text()))
}

/// Maps a catalog failure onto its outward status. Store causes are logged, not echoed.
pub fn catalog_error_response(err: CatalogError) -> Response {
    match err {
        CatalogError::ValidationFailed(errors) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(ApiResponse {
                success: false,
                data: Some(serde_json::json!({ "errors": errors })),
                error: Some("failed validation".to_string()),
            }),
        )
            .into_response(),
        CatalogError::InvalidFormat(e) => bad_request(e.to_string()),
        CatalogError::NotFound => not_found(),
        CatalogError::EditConflict => (
            StatusCode::CONFLICT,
            Json(ApiResponse::err(EDIT_CONFLICT_MESSAGE)),
        )
            .into_response(),
        CatalogError::Store(e) => {
            error!(error = %e, "catalog store failure");
            server_error()
        }
    }
}

/// Parses a path id. Anything that is not an integer is treated as a missing record.
pub fn parse_id(raw: &str) -> Option<i64> {
    raw.trim().parse::<i64>().ok()
}

pub fn read_string(value: Option<&str>, default: &str) -> String {
    match value {
        Some(s) if !s.is_empty() => s.to_string(),
        _ => default.to_string(),
    }
}

/// Splits a comma-separated value, dropping blank entries.
pub fn read_csv(value: Option<&str>) -> Vec<String> {
    match value {
        Some(s) if !s.is_empty() => s
            .split(',')
            .map(|part| part.trim())
            .filter(|part| !part.is_empty())
            .map(|part| part.to_string())
            .collect(),
        _ => Vec::new(),
    }
}

/// Parses an integer parameter, recording "must be an integer value" under `key`
/// and falling back to `default` when it does not parse.
pub fn read_int<C: Checker>(value: Option<&str>, key: &str, default: i64, v: &mut C) -> i64 {
    match value {
        Some(s) if !s.is_empty() => match s.parse::<i64>() {
            Ok(n) => n,
            Err(_) => {
                v.add_error(key, "must be an integer value");
                default
            }
        },
        _ => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::validator::Validator;

    #[test]
    fn csv_parsing() {
        assert_eq!(read_csv(None), Vec::<String>::new());
        assert_eq!(read_csv(Some("")), Vec::<String>::new());
        assert_eq!(
            read_csv(Some("seasoning, pickling,,")),
            vec!["seasoning".to_string(), "pickling".to_string()]
        );
    }

    #[test]
    fn int_parsing_records_errors() {
        let mut v = Validator::new();
        assert_eq!(read_int(Some("3"), "page", 1, &mut v), 3);
        assert_eq!(read_int(None, "page", 1, &mut v), 1);
        assert!(v.valid());
        assert_eq!(read_int(Some("three"), "page_size", 20, &mut v), 20);
        assert_eq!(v.errors().get("page_size"), Some("must be an integer value"));
    }

    #[test]
    fn ids() {
        assert_eq!(parse_id("12"), Some(12));
        assert_eq!(parse_id("-3"), Some(-3));
        assert_eq!(parse_id("abc"), None);
    }

    #[test]
    fn status_mapping() {
        assert_eq!(
            catalog_error_response(CatalogError::NotFound).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            catalog_error_response(CatalogError::EditConflict).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            catalog_error_response(CatalogError::ValidationFailed(Default::default())).status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            catalog_error_response(crate::domain::price::PriceFormatError.into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            catalog_error_response(sqlx::Error::PoolTimedOut.into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
