use std::{env, fmt, str::FromStr};

use secrecy::SecretString;

/// Outbound SMTP settings. Absent when `SMTP_HOST` is not set, in which case
/// mail is written to the log instead of being delivered.
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: SecretString,
    pub from_address: String,
}

/// Cloudinary upload credentials.
#[derive(Debug, Clone)]
pub struct MediaConfig {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: SecretString,
    pub upload_concurrency: usize,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub jwt_secret: SecretString,
    pub token_ttl_secs: i64,
    pub reset_code_ttl_secs: i64,
    /// When set, a reset code can only be verified once.
    pub invalidate_on_verify: bool,
    pub smtp: Option<SmtpConfig>,
    pub media: Option<MediaConfig>,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env::var("DATABASE_URL")?;
        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = parse_env("APP_PORT", 3000)?;

        let jwt_secret = env::var("JWT_SECRET")
            .map_err(|_| anyhow::anyhow!("JWT_SECRET is not set"))?;
        if jwt_secret.trim().is_empty() {
            anyhow::bail!("JWT_SECRET must not be empty");
        }

        let smtp = match env::var("SMTP_HOST") {
            Ok(host) if !host.is_empty() => Some(SmtpConfig {
                host,
                port: parse_env("SMTP_PORT", 587)?,
                username: env::var("SMTP_USERNAME").unwrap_or_default(),
                password: SecretString::from(env::var("SMTP_PASSWORD").unwrap_or_default()),
                from_address: env::var("SMTP_FROM")
                    .map_err(|_| anyhow::anyhow!("SMTP_FROM is required when SMTP_HOST is set"))?,
            }),
            _ => None,
        };

        let media = match (
            env::var("CLOUDINARY_CLOUD_NAME"),
            env::var("CLOUDINARY_API_KEY"),
            env::var("CLOUDINARY_API_SECRET"),
        ) {
            (Ok(cloud_name), Ok(api_key), Ok(api_secret)) => Some(MediaConfig {
                cloud_name,
                api_key,
                api_secret: SecretString::from(api_secret),
                upload_concurrency: parse_env("MEDIA_UPLOAD_CONCURRENCY", 4_usize)?.max(1),
            }),
            _ => None,
        };

        Ok(Self {
            database_url,
            host,
            port,
            jwt_secret: SecretString::from(jwt_secret),
            token_ttl_secs: parse_env("TOKEN_TTL_SECS", 3600)?,
            reset_code_ttl_secs: parse_env("RESET_CODE_TTL_SECS", 3600)?,
            invalidate_on_verify: parse_env("RESET_INVALIDATE_ON_VERIFY", false)?,
            smtp,
            media,
        })
    }

    /// Configuration for tests and tooling that never touch the network.
    pub fn for_tests(database_url: impl Into<String>, jwt_secret: &str) -> Self {
        Self {
            database_url: database_url.into(),
            host: "127.0.0.1".to_string(),
            port: 0,
            jwt_secret: SecretString::from(jwt_secret.to_string()),
            token_ttl_secs: 3600,
            reset_code_ttl_secs: 3600,
            invalidate_on_verify: false,
            smtp: None,
            media: None,
        }
    }
}

fn parse_env<T>(key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    parse_setting(key, env::var(key).ok(), default)
}

/// Unset or empty falls back to `default`; anything else must parse.
fn parse_setting<T>(key: &str, raw: Option<String>, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(default),
        Some(value) => value
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("{key} has an invalid value {value:?}: {e}")),
    }
}
