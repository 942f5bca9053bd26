use axum::{Router, extract::DefaultBodyLimit};
use tower_http::limit::RequestBodyLimitLayer;

use crate::state::AppState;

pub mod custom_orders;
pub mod doc;
pub mod health;
pub mod orders;
pub mod params;
pub mod partners;
pub mod products;
pub mod users;

const JSON_BODY_LIMIT: usize = 1024 * 1024;
/// Product payloads may carry base64 images.
const MEDIA_BODY_LIMIT: usize = 10 * 1024 * 1024;

// Build the API router without binding state; it will be provided at the top level.
pub fn create_api_router() -> Router<AppState> {
    let catalog = Router::new()
        .nest("/products", products::router())
        .layer(DefaultBodyLimit::max(MEDIA_BODY_LIMIT))
        .layer(RequestBodyLimitLayer::new(MEDIA_BODY_LIMIT));

    Router::new()
        .nest("/users", users::router())
        .nest("/orders", orders::router())
        .nest("/custom-orders", custom_orders::router())
        .nest("/partners", partners::router())
        .layer(RequestBodyLimitLayer::new(JSON_BODY_LIMIT))
        .merge(catalog)
}
