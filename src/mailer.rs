use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::header::ContentType,
    transport::smtp::authentication::Credentials,
};
use secrecy::ExposeSecret;

use crate::{
    config::SmtpConfig,
    error::{AppError, AppResult},
};

/// Outbound mail. Without SMTP settings messages are only logged, which keeps
/// local development and tests off the network.
#[derive(Clone)]
pub enum Mailer {
    Smtp {
        transport: AsyncSmtpTransport<Tokio1Executor>,
        from_address: String,
    },
    Log,
}

impl Mailer {
    pub fn from_config(config: Option<&SmtpConfig>) -> anyhow::Result<Self> {
        let Some(config) = config else {
            return Ok(Mailer::Log);
        };

        let credentials = Credentials::new(
            config.username.clone(),
            config.password.expose_secret().to_string(),
        );
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)?
            .port(config.port)
            .credentials(credentials)
            .build();

        Ok(Mailer::Smtp {
            transport,
            from_address: config.from_address.clone(),
        })
    }

    pub async fn send_reset_code(&self, to: &str, code: &str, ttl_secs: i64) -> AppResult<()> {
        self.send(to, "Your password reset code", reset_code_body(code, ttl_secs))
            .await
    }

    async fn send(&self, to: &str, subject: &str, body: String) -> AppResult<()> {
        match self {
            Mailer::Log => {
                tracing::info!(to = %to, subject = %subject, "smtp not configured, mail not sent");
                Ok(())
            }
            Mailer::Smtp {
                transport,
                from_address,
            } => {
                let email = Message::builder()
                    .from(
                        from_address
                            .parse()
                            .map_err(|_| AppError::Upstream(format!("invalid sender {from_address}")))?,
                    )
                    .to(to
                        .parse()
                        .map_err(|_| AppError::bad_request(format!("Invalid email address {to}")))?)
                    .subject(subject)
                    .header(ContentType::TEXT_PLAIN)
                    .body(body)
                    .map_err(|e| AppError::Upstream(e.to_string()))?;

                transport
                    .send(email)
                    .await
                    .map_err(|e| AppError::Upstream(e.to_string()))?;
                tracing::debug!(to = %to, "mail delivered");
                Ok(())
            }
        }
    }
}

fn describe_ttl(ttl_secs: i64) -> String {
    let minutes = (ttl_secs.max(0) + 59) / 60;
    match minutes {
        m if m >= 60 && m % 60 == 0 => match m / 60 {
            1 => "one hour".to_string(),
            h => format!("{h} hours"),
        },
        1 => "one minute".to_string(),
        m => format!("{m} minutes"),
    }
}

fn reset_code_body(code: &str, ttl_secs: i64) -> String {
    format!(
        "Your password reset code is {code}.\n\nThe code expires in {}. \
         If you did not request a reset you can ignore this message.",
        describe_ttl(ttl_secs)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reset_mail_states_the_configured_lifetime() {
        assert!(reset_code_body("123456", 3600).contains("expires in one hour"));
        assert!(reset_code_body("123456", 900).contains("expires in 15 minutes"));
        assert!(reset_code_body("123456", 7200).contains("expires in 2 hours"));
        assert!(reset_code_body("123456", 90).contains("expires in 2 minutes"));
        assert!(reset_code_body("123456", 60).contains("123456"));
    }
}
