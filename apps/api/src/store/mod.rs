//! Template persistence: one JSON blob per session.
//!
//! Backends only move strings. Decoding (and recovery from corrupt blobs) happens once, here,
//! so every backend reloads templates the same way.

pub mod memory;
pub mod redis_store;

use async_trait::async_trait;
use tracing::warn;
use uuid::Uuid;

use crate::errors::AppError;
use crate::template::models::Template;

pub use memory::MemoryTemplateStore;
pub use redis_store::RedisTemplateStore;

/// Carried in `AppState` as `Arc<dyn TemplateStore>`.
#[async_trait]
pub trait TemplateStore: Send + Sync {
    async fn load_raw(&self, session: Uuid) -> Result<Option<String>, AppError>;

    async fn save_raw(&self, session: Uuid, raw: String) -> Result<(), AppError>;

    async fn clear(&self, session: Uuid) -> Result<(), AppError>;

    /// Short name for logs (`redis`, `memory`).
    fn backend(&self) -> &'static str;

    /// The session's template, or the empty template when nothing is stored yet.
    async fn load(&self, session: Uuid) -> Result<Template, AppError> {
        Ok(self
            .load_raw(session)
            .await?
            .map(|raw| decode_template(&raw))
            .unwrap_or_default())
    }

    async fn save(&self, session: Uuid, template: &Template) -> Result<(), AppError> {
        let raw = serde_json::to_string(template)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to encode template: {e}")))?;
        self.save_raw(session, raw).await
    }
}

/// Parses a persisted blob onto the default template shape. Missing fields take their
/// defaults; an unparseable or wrongly-shaped blob yields the empty template.
pub fn decode_template(raw: &str) -> Template {
    let value: serde_json::Value = match serde_json::from_str(raw) {
        Ok(value) => value,
        Err(e) => {
            warn!(error = %e, "Stored template is not valid JSON, starting from empty template");
            return Template::empty();
        }
    };
    Template::from_default_shape(&value).unwrap_or_else(|| {
        warn!("Stored template has an incompatible shape, starting from empty template");
        Template::empty()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::{json, Value};

    use crate::template::fallback::{fallback_analysis, fallback_company, fallback_design};
    use crate::template::fields::set_field;
    use crate::template::models::{BusinessItem, EmployeeCount, TEMPLATE_VERSION};
    use crate::workflow::proposal::render_proposal;
    use crate::workflow::steps::{
        merge_step1, merge_step2, merge_step3, merge_step4, Origin, Step3Input,
    };

    #[test]
    fn test_decode_partial_blob_fills_defaults() {
        let t = decode_template(r#"{"companyProfile": {"name": "Acme K.K."}}"#);
        assert_eq!(t.company_profile.name, "Acme K.K.");
        assert!(t.company_profile.employee_count == EmployeeCount::Unknown);
        assert_eq!(t.metadata.version, TEMPLATE_VERSION);
    }

    #[test]
    fn test_decode_corrupt_blob_yields_empty_template() {
        assert_eq!(decode_template("{not json"), Template::empty());
        assert_eq!(
            decode_template(r#"{"companyProfile": {"industry": 42}}"#),
            Template::empty()
        );
    }

    #[test]
    fn test_decode_null_fields_take_defaults() {
        let t = decode_template(r#"{"companyProfile": {"name": null, "establishedYear": null}}"#);
        assert_eq!(t.company_profile.name, "");
        assert_eq!(t.company_profile.established_year, None);
    }

    #[tokio::test]
    async fn test_save_then_load_round_trips() {
        let store = MemoryTemplateStore::default();
        let session = Uuid::new_v4();
        let mut t = Template::empty();
        t.company_profile.name = "株式会社テスト".to_string();
        t.company_profile.employee_count = EmployeeCount::UpTo50;

        store.save(session, &t).await.unwrap();
        assert_eq!(store.load(session).await.unwrap(), t);
    }

    #[tokio::test]
    async fn test_template_after_all_steps_round_trips() {
        let now = Utc::now();
        let memo = "株式会社テストはSaaSのクラウド製品を提供。従業員数は約40名。";
        let t = merge_step1(&Template::empty(), fallback_company(memo), memo, Origin::Fallback, now)
            .template;
        let situation = "急成長中だが採用が追いつかない";
        let t = merge_step2(&t, fallback_analysis(situation), situation, Origin::Fallback, now)
            .template;
        let input = Step3Input {
            selected_business_items: vec![BusinessItem {
                category: "人事".to_string(),
                phase: "実行".to_string(),
                title: "採用支援".to_string(),
                working_hours: 30,
            }],
            notes: String::new(),
            talent_count: None,
        };
        let design = fallback_design(&t, &input.selected_business_items);
        let t = merge_step3(&t, design, &input, Origin::Fallback, now).template;
        let t = merge_step4(&t, render_proposal(&t, now), now).template;

        let store = MemoryTemplateStore::default();
        let session = Uuid::new_v4();
        store.save(session, &t).await.unwrap();
        let back = store.load(session).await.unwrap();

        assert_eq!(back, t);
        assert_eq!(back.metadata.analysis_history.len(), 4);
        assert_eq!(
            back.metadata.analysis_history[2].input_data.get("talentCount"),
            Some(&Value::Null)
        );
        assert!(set_field(&back, "companyProfile", "headquarters", json!("東京都")).is_ok());
    }

    #[tokio::test]
    async fn test_load_missing_session_is_empty() {
        let store = MemoryTemplateStore::default();
        assert_eq!(store.load(Uuid::new_v4()).await.unwrap(), Template::empty());
    }
}
