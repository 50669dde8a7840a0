use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use invoicer_core::DomainError;
use invoicer_invoicing::{InvoiceId, InvoicingError, RepositoryError};

pub fn invoicing_error_to_response(err: InvoicingError) -> Response {
    match err {
        InvoicingError::NotFound(_) | InvoicingError::NotSendable { .. } => json_error(
            StatusCode::BAD_REQUEST,
            "cannot_send",
            "Invoice cannot be sent",
        ),
        InvoicingError::NotificationRejected(id) => json_error(
            StatusCode::BAD_GATEWAY,
            "notification_rejected",
            format!("notification for invoice {id} was rejected"),
        ),
        InvoicingError::Repository(e) => repository_error_to_response(e),
    }
}

pub fn repository_error_to_response(err: RepositoryError) -> Response {
    match err {
        RepositoryError::Conflict { .. } => {
            json_error(StatusCode::CONFLICT, "conflict", err.to_string())
        }
        RepositoryError::Missing(_) => json_error(StatusCode::NOT_FOUND, "not_found", "not found"),
        RepositoryError::Unavailable(msg) => {
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "store_error", msg)
        }
    }
}

pub fn domain_error_to_response(err: DomainError) -> Response {
    match err {
        DomainError::Validation(msg) => json_error(StatusCode::BAD_REQUEST, "validation_error", msg),
        DomainError::InvalidId(msg) => json_error(StatusCode::BAD_REQUEST, "invalid_id", msg),
    }
}

pub fn json_error(status: StatusCode, code: &'static str, message: impl Into<String>) -> Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

pub fn parse_invoice_id(raw: &str) -> Result<InvoiceId, Response> {
    raw.parse::<InvoiceId>()
        .map_err(|_| json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid invoice id"))
}
