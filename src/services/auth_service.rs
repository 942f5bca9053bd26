use argon2::{
    Argon2, PasswordHasher,
    password_hash::{PasswordHash, PasswordVerifier, SaltString},
};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use password_hash::rand_core::OsRng;
use rand::Rng;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, EntityTrait, QueryFilter, Set,
};
use secrecy::ExposeSecret;
use uuid::Uuid;

use crate::{
    audit,
    config::AppConfig,
    dto::auth::{
        AuthResponse, Claims, ForgotPasswordRequest, LoginRequest, ResetPasswordRequest,
        SignupRequest, VerifyCodeRequest,
    },
    entity::{
        sea_orm_active_enums::{ActiveUnactive, Role},
        users::{ActiveModel as UserActive, Column as UserCol, Entity as Users, Model as UserModel},
    },
    error::{AppError, AppResult},
    models::User,
    response::{ApiResponse, Meta},
    state::AppState,
    validation::{ensure_email, required},
};

pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))?
        .to_string();
    Ok(hash)
}

pub fn verify_password(password: &str, password_hash: &str) -> AppResult<bool> {
    let parsed_hash = PasswordHash::new(password_hash)
        .map_err(|_| AppError::Internal(anyhow::anyhow!("Invalid password hash")))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

pub fn issue_token(config: &AppConfig, user: &UserModel) -> AppResult<String> {
    let now = Utc::now();
    let expiration = now
        .checked_add_signed(Duration::seconds(config.token_ttl_secs))
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to set expiration")))?;

    let claims = Claims {
        user_id: user.id,
        firstname: user.firstname.clone(),
        lastname: user.lastname.clone(),
        role: user.role,
        company_id: user.company_id,
        iat: now.timestamp() as usize,
        exp: expiration.timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.expose_secret().as_bytes()),
    )
    .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))
}

pub fn decode_token(config: &AppConfig, token: &str) -> AppResult<Claims> {
    let mut validation = Validation::default();
    validation.leeway = 0;

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret.expose_secret().as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|_| AppError::Unauthorized("Invalid or expired token".into()))
}

/// Where a user stands in the password reset flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetState {
    NoResetPending,
    CodeIssued,
    CodeVerified,
    Expired,
}

pub fn reset_state(user: &UserModel, now: DateTime<Utc>) -> ResetState {
    match (&user.reset_code, user.reset_code_expires_at) {
        (Some(_), Some(expires_at)) if now > expires_at.with_timezone(&Utc) => ResetState::Expired,
        (Some(_), Some(_)) if user.reset_code_verified => ResetState::CodeVerified,
        (Some(_), Some(_)) => ResetState::CodeIssued,
        _ => ResetState::NoResetPending,
    }
}

/// Check a submitted code. A verified code stays valid for further checks
/// unless `invalidate_on_verify` is set.
pub fn check_reset_code(
    user: &UserModel,
    code: &str,
    now: DateTime<Utc>,
    invalidate_on_verify: bool,
) -> AppResult<()> {
    match reset_state(user, now) {
        ResetState::NoResetPending => {
            return Err(AppError::bad_request("No reset code is pending"));
        }
        ResetState::Expired => return Err(AppError::bad_request("Reset code has expired")),
        ResetState::CodeVerified if invalidate_on_verify => {
            return Err(AppError::bad_request("Reset code has already been used"));
        }
        ResetState::CodeIssued | ResetState::CodeVerified => {}
    }

    if user.reset_code.as_deref() != Some(code.trim()) {
        return Err(AppError::bad_request("Invalid reset code"));
    }
    Ok(())
}

/// A new password is only accepted once the pending code has been verified.
pub fn ensure_code_verified(user: &UserModel, now: DateTime<Utc>) -> AppResult<()> {
    match reset_state(user, now) {
        ResetState::CodeVerified => Ok(()),
        ResetState::CodeIssued => Err(AppError::bad_request("Reset code has not been verified")),
        ResetState::Expired => Err(AppError::bad_request("Reset code has expired")),
        ResetState::NoResetPending => Err(AppError::bad_request("No reset code is pending")),
    }
}

fn ensure_active(user: &UserModel) -> AppResult<()> {
    if user.active_unactive == ActiveUnactive::Inactive {
        return Err(AppError::Unauthorized("Account is inactive".into()));
    }
    Ok(())
}

pub fn generate_reset_code() -> String {
    rand::thread_rng().gen_range(100_000..1_000_000).to_string()
}

async fn find_by_email(state: &AppState, email: &str) -> AppResult<Option<UserModel>> {
    Ok(Users::find()
        .filter(UserCol::Email.eq(email))
        .one(state.db())
        .await?)
}

pub async fn signup(state: &AppState, payload: SignupRequest) -> AppResult<ApiResponse<AuthResponse>> {
    let firstname = required("firstname", payload.firstname)?;
    let lastname = required("lastname", payload.lastname)?;
    let email = required("email", payload.email)?;
    let password = required("password", payload.password)?;
    let role = payload
        .role
        .ok_or_else(|| AppError::bad_request("role is required"))?;
    let active_unactive = payload
        .active_unactive
        .ok_or_else(|| AppError::bad_request("activeUnactive is required"))?;
    ensure_email("email", &email)?;

    if role == Role::PlatformAdmin {
        return Err(AppError::Forbidden);
    }

    if find_by_email(state, &email).await?.is_some() {
        return Err(AppError::bad_request("Email is already in use"));
    }

    let password_hash = hash_password(&password)?;

    let user = UserActive {
        id: Set(Uuid::new_v4()),
        firstname: Set(firstname),
        lastname: Set(lastname),
        email: Set(email),
        password_hash: Set(password_hash),
        role: Set(role),
        active_unactive: Set(active_unactive),
        company_id: Set(None),
        country: Set(payload.country.unwrap_or_default()),
        city: Set(payload.city.unwrap_or_default()),
        postal_code: Set(payload.postal_code.unwrap_or_default()),
        profile_image: Set(payload.profile_image.unwrap_or_default()),
        bio: Set(payload.bio.unwrap_or_default()),
        reset_code: Set(None),
        reset_code_expires_at: Set(None),
        reset_code_verified: Set(false),
        created_at: NotSet,
    }
    .insert(state.db())
    .await
    .map_err(|err| match err.sql_err() {
        Some(sea_orm::SqlErr::UniqueConstraintViolation(_)) => {
            AppError::bad_request("Email is already in use")
        }
        _ => AppError::OrmError(err),
    })?;

    let token = issue_token(&state.config, &user)?;
    audit::record(
        state.db(),
        Some(user.id),
        "user_signup",
        "users",
        serde_json::json!({ "user_id": user.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "User created",
        AuthResponse {
            token,
            user: Some(User::from(user)),
        },
        Some(Meta::empty()),
    ))
}

pub async fn login(state: &AppState, payload: LoginRequest) -> AppResult<ApiResponse<AuthResponse>> {
    let (Some(email), Some(password)) = (payload.email, payload.password) else {
        return Err(AppError::bad_request("Email and password are required"));
    };

    let invalid = || AppError::Unauthorized("Invalid email or password".into());
    let user = find_by_email(state, email.trim()).await?.ok_or_else(invalid)?;

    if !verify_password(&password, &user.password_hash)? {
        return Err(invalid());
    }
    if user.active_unactive == ActiveUnactive::Inactive {
        return Err(invalid());
    }

    let token = issue_token(&state.config, &user)?;
    audit::record(
        state.db(),
        Some(user.id),
        "user_login",
        "users",
        serde_json::json!({ "user_id": user.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Logged in",
        AuthResponse { token, user: None },
        Some(Meta::empty()),
    ))
}

pub async fn forgot_password(
    state: &AppState,
    payload: ForgotPasswordRequest,
) -> AppResult<ApiResponse<()>> {
    let email = required("email", payload.email)?;
    let user = find_by_email(state, &email)
        .await?
        .ok_or_else(|| AppError::not_found("User"))?;

    let code = generate_reset_code();
    let expires_at = Utc::now() + Duration::seconds(state.config.reset_code_ttl_secs);

    let user_id = user.id;
    let mut active: UserActive = user.into();
    active.reset_code = Set(Some(code.clone()));
    active.reset_code_expires_at = Set(Some(expires_at.into()));
    active.reset_code_verified = Set(false);
    active.update(state.db()).await?;

    state
        .mailer
        .send_reset_code(&email, &code, state.config.reset_code_ttl_secs)
        .await?;
    tracing::info!(user_id = %user_id, "password reset code issued");

    Ok(ApiResponse::message("Reset code sent"))
}

pub async fn verify_code(
    state: &AppState,
    payload: VerifyCodeRequest,
) -> AppResult<ApiResponse<AuthResponse>> {
    let email = required("email", payload.email)?;
    let code = required("code", payload.code)?;
    let user = find_by_email(state, &email)
        .await?
        .ok_or_else(|| AppError::not_found("User"))?;

    check_reset_code(&user, &code, Utc::now(), state.config.invalidate_on_verify)?;
    ensure_active(&user)?;

    let user = if user.reset_code_verified {
        user
    } else {
        let mut active: UserActive = user.into();
        active.reset_code_verified = Set(true);
        active.update(state.db()).await?
    };

    let token = issue_token(&state.config, &user)?;
    Ok(ApiResponse::success(
        "Code verified",
        AuthResponse { token, user: None },
        Some(Meta::empty()),
    ))
}

pub async fn reset_password(
    state: &AppState,
    payload: ResetPasswordRequest,
) -> AppResult<ApiResponse<()>> {
    let email = required("email", payload.email)?;
    let new_password = required("newPassword", payload.new_password)?;
    let user = find_by_email(state, &email)
        .await?
        .ok_or_else(|| AppError::not_found("User"))?;

    ensure_code_verified(&user, Utc::now())?;

    let user_id = user.id;
    let mut active: UserActive = user.into();
    active.password_hash = Set(hash_password(&new_password)?);
    active.reset_code = Set(None);
    active.reset_code_expires_at = Set(None);
    active.reset_code_verified = Set(false);
    active.update(state.db()).await?;

    audit::record(
        state.db(),
        Some(user_id),
        "password_reset",
        "users",
        serde_json::json!({ "user_id": user_id }),
    )
    .await;

    Ok(ApiResponse::message("Password has been reset"))
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    fn user_with_code(code: Option<&str>, expires_in: Option<Duration>, verified: bool) -> UserModel {
        let now = Utc::now();
        UserModel {
            id: Uuid::new_v4(),
            firstname: "A".into(),
            lastname: "B".into(),
            email: "a@b.com".into(),
            password_hash: String::new(),
            role: Role::Customer,
            active_unactive: ActiveUnactive::Active,
            company_id: None,
            country: String::new(),
            city: String::new(),
            postal_code: String::new(),
            profile_image: String::new(),
            bio: String::new(),
            reset_code: code.map(str::to_string),
            reset_code_expires_at: expires_in.map(|d| (now + d).into()),
            reset_code_verified: verified,
            created_at: now.into(),
        }
    }

    #[test]
    fn token_round_trip_carries_claims() {
        let config = AppConfig::for_tests("postgres://unused", "test-secret");
        let mut user = user_with_code(None, None, false);
        user.role = Role::PartnerOwner;
        user.company_id = Some(Uuid::new_v4());

        let token = issue_token(&config, &user).unwrap();
        let claims = decode_token(&config, &token).unwrap();

        assert_eq!(claims.user_id, user.id);
        assert_eq!(claims.firstname, "A");
        assert_eq!(claims.role, Role::PartnerOwner);
        assert_eq!(claims.company_id, user.company_id);
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn token_signed_with_another_key_is_rejected() {
        let issuer = AppConfig::for_tests("postgres://unused", "one-secret");
        let verifier = AppConfig::for_tests("postgres://unused", "other-secret");
        let token = issue_token(&issuer, &user_with_code(None, None, false)).unwrap();

        assert!(matches!(
            decode_token(&verifier, &token),
            Err(AppError::Unauthorized(_))
        ));
    }

    #[test]
    fn expired_token_is_rejected() {
        let mut config = AppConfig::for_tests("postgres://unused", "test-secret");
        config.token_ttl_secs = -10;
        let token = issue_token(&config, &user_with_code(None, None, false)).unwrap();

        assert!(decode_token(&config, &token).is_err());
    }

    #[test]
    fn password_hash_round_trip() {
        let hash = hash_password("pw").unwrap();
        assert_ne!(hash, "pw");
        assert!(verify_password("pw", &hash).unwrap());
        assert!(!verify_password("other", &hash).unwrap());
    }

    #[test]
    fn reset_code_is_six_digits() {
        for _ in 0..100 {
            let code = generate_reset_code();
            assert_eq!(code.len(), 6);
            assert!(code.chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn reset_states() {
        let now = Utc::now();
        assert_eq!(
            reset_state(&user_with_code(None, None, false), now),
            ResetState::NoResetPending
        );
        assert_eq!(
            reset_state(&user_with_code(Some("123456"), Some(Duration::hours(1)), false), now),
            ResetState::CodeIssued
        );
        assert_eq!(
            reset_state(&user_with_code(Some("123456"), Some(Duration::hours(1)), true), now),
            ResetState::CodeVerified
        );
        assert_eq!(
            reset_state(&user_with_code(Some("123456"), Some(Duration::seconds(-1)), false), now),
            ResetState::Expired
        );
    }

    #[test]
    fn matching_code_is_rejected_after_expiry() {
        let user = user_with_code(Some("123456"), Some(Duration::seconds(-1)), false);
        let err = check_reset_code(&user, "123456", Utc::now(), false).unwrap_err();
        assert!(matches!(err, AppError::BadRequest(msg) if msg.contains("expired")));
    }

    #[test]
    fn code_must_match_exactly() {
        let user = user_with_code(Some("123456"), Some(Duration::hours(1)), false);
        assert!(check_reset_code(&user, "123456", Utc::now(), false).is_ok());
        assert!(check_reset_code(&user, "123457", Utc::now(), false).is_err());
        assert!(check_reset_code(&user, "12345", Utc::now(), false).is_err());
    }

    #[test]
    fn verified_code_can_be_reused_unless_configured_otherwise() {
        let user = user_with_code(Some("123456"), Some(Duration::hours(1)), true);
        assert!(check_reset_code(&user, "123456", Utc::now(), false).is_ok());
        assert!(check_reset_code(&user, "123456", Utc::now(), true).is_err());
    }

    #[test]
    fn reset_requires_a_verified_code() {
        let now = Utc::now();
        assert!(ensure_code_verified(&user_with_code(None, None, false), now).is_err());
        assert!(
            ensure_code_verified(&user_with_code(Some("1"), Some(Duration::seconds(-5)), true), now)
                .is_err()
        );
        assert!(
            ensure_code_verified(&user_with_code(Some("1"), Some(Duration::hours(1)), true), now)
                .is_ok()
        );
    }

    #[test]
    fn issued_but_unverified_code_cannot_reset() {
        let user = user_with_code(Some("482913"), Some(Duration::hours(1)), false);
        let err = ensure_code_verified(&user, Utc::now()).unwrap_err();
        assert!(matches!(err, AppError::BadRequest(msg) if msg.contains("not been verified")));
    }

    #[test]
    fn inactive_accounts_get_no_token_from_a_valid_code() {
        let mut user = user_with_code(Some("482913"), Some(Duration::hours(1)), false);
        user.active_unactive = ActiveUnactive::Inactive;
        assert!(check_reset_code(&user, "482913", Utc::now(), false).is_ok());
        assert!(matches!(ensure_active(&user), Err(AppError::Unauthorized(_))));
    }

    #[tokio::test]
    async fn verify_code_refuses_inactive_accounts() {
        use sea_orm::{DatabaseBackend, MockDatabase};

        let mut user = user_with_code(Some("482913"), Some(Duration::hours(1)), false);
        user.active_unactive = ActiveUnactive::Inactive;
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![user.clone()]])
            .into_connection();
        let state = AppState::new(db, AppConfig::for_tests("mock://", "secret")).unwrap();

        let err = verify_code(
            &state,
            VerifyCodeRequest {
                email: Some(user.email.clone()),
                code: Some("482913".into()),
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn reset_without_verification_is_rejected() {
        use sea_orm::{DatabaseBackend, MockDatabase};

        let user = user_with_code(Some("482913"), Some(Duration::hours(1)), false);
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![user.clone()]])
            .into_connection();
        let state = AppState::new(db, AppConfig::for_tests("mock://", "secret")).unwrap();

        let err = reset_password(
            &state,
            ResetPasswordRequest {
                email: Some(user.email.clone()),
                new_password: Some("taken over".into()),
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
        // Only the lookup ran; the password row was never written.
        assert_eq!(state.into_orm().expect("sole owner").into_transaction_log().len(), 1);
    }
}
