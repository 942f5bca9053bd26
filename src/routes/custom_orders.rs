use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    routing::{get, post},
};
use serde_json::Value;
use uuid::Uuid;

use crate::{
    dto::orders::{CreateCustomOrderRequest, CustomOrderList, UpdateCustomOrderRequest},
    error::AppResult,
    extract::{AppJson, AppPath},
    middleware::auth::AuthUser,
    models::CustomOrder,
    response::ApiResponse,
    routes::params::PageQuery,
    services::custom_order_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_custom_order).get(list_custom_orders))
        .route(
            "/{id}",
            get(get_custom_order)
                .put(update_custom_order)
                .delete(delete_custom_order),
        )
}

/// Guest checkout; no token required.
#[utoipa::path(
    post,
    path = "/api/v1/custom-orders",
    request_body = CreateCustomOrderRequest,
    responses(
        (status = 201, description = "Order created", body = ApiResponse<CustomOrder>),
        (status = 400, description = "Invalid colors or customer"),
        (status = 404, description = "Unknown product")
    ),
    tag = "Custom orders"
)]
pub async fn create_custom_order(
    State(state): State<AppState>,
    AppJson(body): AppJson<Value>,
) -> AppResult<(StatusCode, Json<ApiResponse<CustomOrder>>)> {
    let resp = custom_order_service::create_custom_order(&state, body).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    get,
    path = "/api/v1/custom-orders",
    params(PageQuery),
    responses(
        (status = 200, description = "List custom orders", body = ApiResponse<CustomOrderList>),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Custom orders"
)]
pub async fn list_custom_orders(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<ApiResponse<CustomOrderList>>> {
    let resp = custom_order_service::list_custom_orders(&state, &user, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/v1/custom-orders/{id}",
    params(("id" = Uuid, Path, description = "Custom order id")),
    responses(
        (status = 200, description = "Custom order", body = ApiResponse<CustomOrder>),
        (status = 404, description = "Not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Custom orders"
)]
pub async fn get_custom_order(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath(id): AppPath<Uuid>,
) -> AppResult<Json<ApiResponse<CustomOrder>>> {
    let resp = custom_order_service::get_custom_order(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/v1/custom-orders/{id}",
    params(("id" = Uuid, Path, description = "Custom order id")),
    request_body = UpdateCustomOrderRequest,
    responses(
        (status = 200, description = "Custom order updated", body = ApiResponse<CustomOrder>),
        (status = 404, description = "Not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Custom orders"
)]
pub async fn update_custom_order(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath(id): AppPath<Uuid>,
    AppJson(body): AppJson<Value>,
) -> AppResult<Json<ApiResponse<CustomOrder>>> {
    let resp = custom_order_service::update_custom_order(&state, &user, id, body).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/v1/custom-orders/{id}",
    params(("id" = Uuid, Path, description = "Custom order id")),
    responses(
        (status = 200, description = "Custom order deleted"),
        (status = 404, description = "Not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Custom orders"
)]
pub async fn delete_custom_order(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath(id): AppPath<Uuid>,
) -> AppResult<Json<ApiResponse<()>>> {
    let resp = custom_order_service::delete_custom_order(&state, &user, id).await?;
    Ok(Json(resp))
}
