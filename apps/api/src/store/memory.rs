use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::errors::AppError;
use crate::store::TemplateStore;

/// In-process store used when no Redis URL is configured, and in tests. Nothing expires.
#[derive(Debug, Default)]
pub struct MemoryTemplateStore {
    blobs: RwLock<HashMap<Uuid, String>>,
}

#[async_trait]
impl TemplateStore for MemoryTemplateStore {
    async fn load_raw(&self, session: Uuid) -> Result<Option<String>, AppError> {
        Ok(self.blobs.read().await.get(&session).cloned())
    }

    async fn save_raw(&self, session: Uuid, raw: String) -> Result<(), AppError> {
        self.blobs.write().await.insert(session, raw);
        Ok(())
    }

    async fn clear(&self, session: Uuid) -> Result<(), AppError> {
        self.blobs.write().await.remove(&session);
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_clear_removes_blob() {
        let store = MemoryTemplateStore::default();
        let session = Uuid::new_v4();
        store.save_raw(session, "{}".to_string()).await.unwrap();
        assert_eq!(store.load_raw(session).await.unwrap().as_deref(), Some("{}"));
        store.clear(session).await.unwrap();
        assert!(store.load_raw(session).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_sessions_are_isolated() {
        let store = MemoryTemplateStore::default();
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        store.save_raw(a, "a".to_string()).await.unwrap();
        assert!(store.load_raw(b).await.unwrap().is_none());
    }
}
