use axum::Router;

pub mod expenses;
pub mod invoices;
pub mod partners;
pub mod payments;
pub mod products;
pub mod reports;
pub mod system;

pub fn router() -> Router {
    Router::new()
        .nest("/products", products::router())
        .nest("/partners", partners::router())
        .nest("/invoices", invoices::router())
        .nest("/payments", payments::router())
        .nest("/reports", reports::router())
        .nest("/expenses", expenses::router())
}
