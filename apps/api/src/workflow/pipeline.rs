//! Runs one workflow step end to end: prompt → text generation → extraction → merge.
//!
//! The generator is the only fallible part. A failed call, a timeout, an empty completion or a
//! completion with no recognised labels all take the deterministic fallback path instead; the
//! caller always gets a merged template back.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::llm_client::prompts::LABELED_OUTPUT_SYSTEM;
use crate::llm_client::TextGenerator;
use crate::template::fallback::{fallback_analysis, fallback_company, fallback_design};
use crate::template::models::Template;
use crate::template::rules::{
    extract_analysis, extract_company, extract_design, recognizes_analysis, recognizes_company,
    recognizes_design,
};
use crate::workflow::prompts::{build_step1_prompt, build_step2_prompt, build_step3_prompt};
use crate::workflow::proposal::render_proposal;
use crate::workflow::steps::{
    merge_step1, merge_step2, merge_step3, merge_step4, Origin, Step3Input, StepMerge,
};

#[derive(Clone)]
pub struct Pipeline {
    generator: Arc<dyn TextGenerator>,
    timeout: Duration,
}

impl Pipeline {
    pub fn new(generator: Arc<dyn TextGenerator>, timeout: Duration) -> Self {
        Self { generator, timeout }
    }

    pub fn backend(&self) -> &'static str {
        self.generator.backend()
    }

    /// One bounded generation call. `None` means "use the fallback".
    async fn generate(&self, step: u8, prompt: &str) -> Option<String> {
        let backend = self.generator.backend();
        let call = self.generator.complete(prompt, LABELED_OUTPUT_SYSTEM);
        match tokio::time::timeout(self.timeout, call).await {
            Ok(Ok(text)) if !text.trim().is_empty() => {
                debug!(step, backend, chars = text.chars().count(), "Generation succeeded");
                Some(text)
            }
            Ok(Ok(_)) => {
                warn!(step, backend, "Generation returned empty text, using fallback");
                None
            }
            Ok(Err(e)) => {
                warn!(step, backend, error = %e, "Generation failed, using fallback");
                None
            }
            Err(_) => {
                warn!(
                    step,
                    backend,
                    timeout_secs = self.timeout.as_secs(),
                    "Generation timed out, using fallback"
                );
                None
            }
        }
    }

    /// Generates and parses, or falls back. Returns the parsed value and where it came from.
    async fn generate_or_fallback<T>(
        &self,
        step: u8,
        prompt: &str,
        recognizes: fn(&str) -> bool,
        extract: fn(&str) -> T,
        fallback: impl FnOnce() -> T,
    ) -> (T, Origin) {
        match self.generate(step, prompt).await {
            Some(text) if recognizes(&text) => (extract(&text), Origin::Ai),
            Some(_) => {
                warn!(step, "Generated text carried no recognised labels, using fallback");
                (fallback(), Origin::Fallback)
            }
            None => (fallback(), Origin::Fallback),
        }
    }

    /// Step 1: company research from the user's memo.
    pub async fn run_step1(&self, previous: &Template, memo: &str, now: DateTime<Utc>) -> StepMerge {
        let prompt = build_step1_prompt(memo);
        let (extracted, origin) = self
            .generate_or_fallback(1, &prompt, recognizes_company, extract_company, || {
                fallback_company(memo)
            })
            .await;
        merge_step1(previous, extracted, memo, origin, now)
    }

    /// Step 2: current-state analysis from the hearing notes.
    pub async fn run_step2(
        &self,
        previous: &Template,
        situation: &str,
        now: DateTime<Utc>,
    ) -> StepMerge {
        let prompt = build_step2_prompt(previous, situation);
        let (extracted, origin) = self
            .generate_or_fallback(2, &prompt, recognizes_analysis, extract_analysis, || {
                fallback_analysis(situation)
            })
            .await;
        merge_step2(previous, extracted, situation, origin, now)
    }

    /// Step 3: project design around the selected business items.
    pub async fn run_step3(
        &self,
        previous: &Template,
        input: &Step3Input,
        now: DateTime<Utc>,
    ) -> StepMerge {
        let prompt = build_step3_prompt(previous, input);
        let (extracted, origin) = self
            .generate_or_fallback(3, &prompt, recognizes_design, extract_design, || {
                fallback_design(previous, &input.selected_business_items)
            })
            .await;
        merge_step3(previous, extracted, input, origin, now)
    }

    /// Step 4: deterministic render; never calls the generator.
    pub fn run_step4(&self, previous: &Template, now: DateTime<Utc>) -> StepMerge {
        merge_step4(previous, render_proposal(previous, now), now)
    }
}
