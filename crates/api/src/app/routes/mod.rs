use axum::Router;

pub mod invoices;
pub mod notifications;
pub mod system;

/// Router for all domain endpoints.
pub fn router() -> Router {
    Router::new()
        .nest("/invoices", invoices::router())
        .nest("/notification", notifications::router())
}
