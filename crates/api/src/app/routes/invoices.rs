use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_invoice))
        .route("/:id", get(get_invoice))
        .route("/:id/send", post(send_invoice))
}

pub async fn create_invoice(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::CreateInvoiceRequest>,
) -> Response {
    if let Err(e) = body.validate() {
        return errors::domain_error_to_response(e);
    }
    let (customer_name, customer_email, lines) = body.into_lines();

    match services
        .invoices
        .create_invoice(customer_name, customer_email, lines)
    {
        Ok(invoice) => (StatusCode::CREATED, Json(dto::invoice_to_json(&invoice))).into_response(),
        Err(e) => errors::invoicing_error_to_response(e),
    }
}

pub async fn get_invoice(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> Response {
    let invoice_id = match errors::parse_invoice_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.invoices.get_invoice(invoice_id) {
        Ok(Some(invoice)) => (StatusCode::OK, Json(dto::invoice_to_json(&invoice))).into_response(),
        Ok(None) => errors::json_error(StatusCode::NOT_FOUND, "not_found", "invoice not found"),
        Err(e) => errors::invoicing_error_to_response(e),
    }
}

/// Hands the invoice to the notification driver. Returns as soon as the
/// driver has accepted it; confirmation arrives later.
pub async fn send_invoice(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> Response {
    let invoice_id = match errors::parse_invoice_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.invoices.send_invoice(invoice_id) {
        Ok(()) => (
            StatusCode::OK,
            Json(serde_json::json!({ "message": "Invoice sent" })),
        )
            .into_response(),
        Err(e) => {
            tracing::warn!(invoice_id = %invoice_id, error = %e, "send failed");
            errors::invoicing_error_to_response(e)
        }
    }
}
