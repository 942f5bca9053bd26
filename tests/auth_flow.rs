use partner_shop_api::{
    config::AppConfig,
    db::{create_pool, orm_from_pool, run_migrations},
    dto::auth::{
        ForgotPasswordRequest, LoginRequest, ResetPasswordRequest, SignupRequest,
        VerifyCodeRequest,
    },
    entity::{
        sea_orm_active_enums::{ActiveUnactive, Role},
        users::{Column as UserCol, Entity as Users},
    },
    error::AppError,
    services::auth_service,
    state::AppState,
};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
use uuid::Uuid;

async fn setup_state() -> anyhow::Result<Option<AppState>> {
    let Ok(database_url) =
        std::env::var("TEST_DATABASE_URL").or_else(|_| std::env::var("DATABASE_URL"))
    else {
        eprintln!("Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run auth flow tests.");
        return Ok(None);
    };

    let pool = create_pool(&database_url).await?;
    run_migrations(&pool).await?;
    let state = AppState::new(
        orm_from_pool(&pool),
        AppConfig::for_tests(database_url, "integration-secret"),
    )?;
    Ok(Some(state))
}

fn sample_signup(email: &str) -> SignupRequest {
    SignupRequest {
        firstname: Some("Ada".into()),
        lastname: Some("Lovelace".into()),
        email: Some(email.to_string()),
        password: Some("correct horse battery".into()),
        role: Some(Role::Customer),
        active_unactive: Some(ActiveUnactive::Active),
        country: Some("BE".into()),
        city: Some("Brussels".into()),
        postal_code: Some("1000".into()),
        ..Default::default()
    }
}

#[tokio::test]
async fn signup_returns_token_and_sanitized_user() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };
    let email = format!("ada+{}@example.com", Uuid::new_v4());

    let resp = auth_service::signup(&state, sample_signup(&email)).await?;
    let data = resp.data.expect("auth data");
    assert!(!data.token.is_empty());

    let body = serde_json::to_value(data.user.expect("user"))?;
    assert_eq!(body["email"], email.as_str());
    assert!(body.get("passwordHash").is_none());
    assert!(body.get("resetCode").is_none());

    let err = auth_service::signup(&state, sample_signup(&email))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));
    Ok(())
}

#[tokio::test]
async fn password_reset_flow() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };
    let email = format!("reset+{}@example.com", Uuid::new_v4());
    auth_service::signup(&state, sample_signup(&email)).await?;

    auth_service::forgot_password(
        &state,
        ForgotPasswordRequest {
            email: Some(email.clone()),
        },
    )
    .await?;

    let stored = Users::find()
        .filter(UserCol::Email.eq(email.as_str()))
        .one(state.db())
        .await?
        .expect("user");
    let code = stored.reset_code.clone().expect("code issued");
    assert_eq!(code.len(), 6);

    let wrong = auth_service::verify_code(
        &state,
        VerifyCodeRequest {
            email: Some(email.clone()),
            code: Some("000000".into()),
        },
    )
    .await;
    assert!(wrong.is_err());

    auth_service::verify_code(
        &state,
        VerifyCodeRequest {
            email: Some(email.clone()),
            code: Some(code.clone()),
        },
    )
    .await?;

    auth_service::reset_password(
        &state,
        ResetPasswordRequest {
            email: Some(email.clone()),
            new_password: Some("a brand new secret".into()),
        },
    )
    .await?;

    let cleared = Users::find()
        .filter(UserCol::Email.eq(email.as_str()))
        .one(state.db())
        .await?
        .expect("user");
    assert!(cleared.reset_code.is_none());
    assert!(cleared.reset_code_expires_at.is_none());
    assert!(!cleared.reset_code_verified);

    let again = auth_service::reset_password(
        &state,
        ResetPasswordRequest {
            email: Some(email.clone()),
            new_password: Some("yet another".into()),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(again, AppError::BadRequest(_)));

    let login = auth_service::login(
        &state,
        LoginRequest {
            email: Some(email),
            password: Some("a brand new secret".into()),
        },
    )
    .await?;
    assert!(login.data.is_some());
    Ok(())
}

#[tokio::test]
async fn reset_without_verifying_the_code_fails() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };
    let email = format!("victim+{}@example.com", Uuid::new_v4());
    auth_service::signup(&state, sample_signup(&email)).await?;

    auth_service::forgot_password(
        &state,
        ForgotPasswordRequest {
            email: Some(email.clone()),
        },
    )
    .await?;

    let err = auth_service::reset_password(
        &state,
        ResetPasswordRequest {
            email: Some(email.clone()),
            new_password: Some("not yours".into()),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    let login = auth_service::login(
        &state,
        LoginRequest {
            email: Some(email),
            password: Some("correct horse battery".into()),
        },
    )
    .await?;
    assert!(login.data.is_some());
    Ok(())
}
