use axum::{extract::State, http::StatusCode};
use partner_shop_api::{config::AppConfig, routes::health::health_check, state::AppState};
use sea_orm::{DatabaseBackend, MockDatabase};

#[tokio::test]
async fn health_check_returns_ok() {
    let orm = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
    let state = AppState::new(orm, AppConfig::for_tests("mock://", "secret")).expect("state");

    let (status, response) = health_check(State(state)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(response.0.message, "Health check");
    assert!(response.0.data.is_some());
}
