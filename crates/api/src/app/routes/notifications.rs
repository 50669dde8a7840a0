//! Provider webhook. The provider calls back with an action and the reference
//! it was given at hand-off (the invoice id).

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};

use invoicer_events::DeliveryAction;
use invoicer_invoicing::{DeliveryCallback, DeliveryOutcome};

use crate::app::errors;
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new().route("/hook/:action/:reference", get(notification_hook))
}

pub async fn notification_hook(
    Extension(services): Extension<Arc<AppServices>>,
    Path((action, reference)): Path<(String, String)>,
) -> Response {
    let action = DeliveryAction::from(action.as_str());
    if !action.is_delivered() {
        tracing::debug!(action = %action, reference = %reference, "notification hook ignored");
        return ack("ignored");
    }

    match services.confirmations.delivered(&reference) {
        Ok(DeliveryOutcome::Confirmed) => ack("confirmed"),
        Ok(DeliveryOutcome::Ignored(_)) => ack("ignored"),
        Ok(DeliveryOutcome::UnknownInvoice) => ack("unknown"),
        Err(e) => {
            tracing::warn!(reference = %reference, error = %e, "notification hook failed");
            errors::json_error(StatusCode::INTERNAL_SERVER_ERROR, "store_error", e.to_string())
        }
    }
}

fn ack(status: &'static str) -> Response {
    (StatusCode::OK, Json(serde_json::json!({ "status": status }))).into_response()
}
