use async_trait::async_trait;
use redis::{AsyncCommands, Client as RedisClient};
use tracing::debug;
use uuid::Uuid;

use crate::errors::AppError;
use crate::store::TemplateStore;

const KEY_PREFIX: &str = "proposal:template:";

pub fn template_key(session: Uuid) -> String {
    format!("{KEY_PREFIX}{session}")
}

/// Redis-backed store. Each save refreshes the session's TTL.
#[derive(Clone)]
pub struct RedisTemplateStore {
    client: RedisClient,
    ttl_secs: u64,
}

impl RedisTemplateStore {
    pub fn new(client: RedisClient, ttl_secs: u64) -> Self {
        Self { client, ttl_secs }
    }
}

#[async_trait]
impl TemplateStore for RedisTemplateStore {
    async fn load_raw(&self, session: Uuid) -> Result<Option<String>, AppError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let raw: Option<String> = conn.get(template_key(session)).await?;
        debug!(%session, found = raw.is_some(), "Loaded template blob");
        Ok(raw)
    }

    async fn save_raw(&self, session: Uuid, raw: String) -> Result<(), AppError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        conn.set_ex::<_, _, ()>(template_key(session), raw, self.ttl_secs)
            .await?;
        Ok(())
    }

    async fn clear(&self, session: Uuid) -> Result<(), AppError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        conn.del::<_, ()>(template_key(session)).await?;
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "redis"
    }
}
