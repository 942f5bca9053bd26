use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    routing::{get, post},
};
use serde_json::Value;
use uuid::Uuid;

use crate::{
    dto::partners::{CreatePartnerRequest, PartnerList, UpdatePartnerRequest},
    error::AppResult,
    extract::{AppJson, AppPath},
    middleware::auth::AuthUser,
    models::Partner,
    response::ApiResponse,
    routes::params::PageQuery,
    services::partner_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_partner).get(list_partners))
        .route(
            "/{id}",
            get(get_partner).put(update_partner).delete(delete_partner),
        )
}

#[utoipa::path(
    post,
    path = "/api/v1/partners",
    request_body = CreatePartnerRequest,
    responses(
        (status = 201, description = "Partner created", body = ApiResponse<Partner>),
        (status = 403, description = "Platform admins only")
    ),
    security(("bearer_auth" = [])),
    tag = "Partners"
)]
pub async fn create_partner(
    State(state): State<AppState>,
    user: AuthUser,
    AppJson(payload): AppJson<CreatePartnerRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Partner>>)> {
    let resp = partner_service::create_partner(&state, &user, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    get,
    path = "/api/v1/partners",
    params(PageQuery),
    responses(
        (status = 200, description = "List partners", body = ApiResponse<PartnerList>)
    ),
    security(("bearer_auth" = [])),
    tag = "Partners"
)]
pub async fn list_partners(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<ApiResponse<PartnerList>>> {
    let resp = partner_service::list_partners(&state, &user, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/v1/partners/{id}",
    params(("id" = Uuid, Path, description = "Partner id")),
    responses(
        (status = 200, description = "Partner", body = ApiResponse<Partner>),
        (status = 404, description = "Not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Partners"
)]
pub async fn get_partner(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath(id): AppPath<Uuid>,
) -> AppResult<Json<ApiResponse<Partner>>> {
    let resp = partner_service::get_partner(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/v1/partners/{id}",
    params(("id" = Uuid, Path, description = "Partner id")),
    request_body = UpdatePartnerRequest,
    responses(
        (status = 200, description = "Partner updated", body = ApiResponse<Partner>),
        (status = 403, description = "Platform admins only"),
        (status = 404, description = "Not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Partners"
)]
pub async fn update_partner(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath(id): AppPath<Uuid>,
    AppJson(body): AppJson<Value>,
) -> AppResult<Json<ApiResponse<Partner>>> {
    let resp = partner_service::update_partner(&state, &user, id, body).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/v1/partners/{id}",
    params(("id" = Uuid, Path, description = "Partner id")),
    responses(
        (status = 200, description = "Partner and its products tombstoned"),
        (status = 403, description = "Platform admins only"),
        (status = 404, description = "Not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Partners"
)]
pub async fn delete_partner(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath(id): AppPath<Uuid>,
) -> AppResult<Json<ApiResponse<()>>> {
    let resp = partner_service::delete_partner(&state, &user, id).await?;
    Ok(Json(resp))
}
