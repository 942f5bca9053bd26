use std::sync::Arc;

use crate::{config::AppConfig, db::OrmConn, mailer::Mailer, media::MediaClient};

#[derive(Clone)]
pub struct AppState {
    pub orm: Arc<OrmConn>,
    pub config: Arc<AppConfig>,
    pub mailer: Mailer,
    pub media: Option<MediaClient>,
}

impl AppState {
    pub fn new(orm: OrmConn, config: AppConfig) -> anyhow::Result<Self> {
        let mailer = Mailer::from_config(config.smtp.as_ref())?;
        let media = config.media.clone().map(MediaClient::new);
        Ok(Self {
            orm: Arc::new(orm),
            config: Arc::new(config),
            mailer,
            media,
        })
    }

    pub fn db(&self) -> &OrmConn {
        &self.orm
    }

    /// Take the connection back, e.g. to read a mock's transaction log.
    #[cfg(test)]
    pub fn into_orm(self) -> Option<OrmConn> {
        Arc::try_unwrap(self.orm).ok()
    }
}
