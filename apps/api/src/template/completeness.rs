use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::template::models::{Template, INSUFFICIENT_INFO, UNKNOWN};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ImportanceCategory {
    BusinessCritical,
    Core,
    Supplementary,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FieldWeight {
    /// Top-level template key (`companyProfile`).
    pub section: String,
    /// Key inside the section; dotted for nested records (`budget.monthlyBudget`).
    pub field: String,
    pub weight: u32,
    pub label: String,
    pub category: ImportanceCategory,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CompletenessReport {
    pub score: u8,
    pub present_weight: u32,
    pub total_weight: u32,
    pub missing_fields: Vec<FieldWeight>,
    pub sorted_by_impact: bool,
}

impl CompletenessReport {
    /// The `n` missing fields whose addition would raise the score the most.
    pub fn top_suggestions(&self, n: usize) -> Vec<&FieldWeight> {
        self.missing_fields.iter().take(n).collect()
    }

    pub fn can_proceed(&self, threshold: u8) -> bool {
        self.score >= threshold
    }
}

/// Weighted field table. Product policy, so it is injectable rather than hardcoded at call sites.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScoringTable {
    pub entries: Vec<FieldWeight>,
}

const DEFAULT_WEIGHTS: &[(&str, &str, u32, &str, ImportanceCategory)] = &[
    ("metadata", "selectedBusinessItems", 15, "選択した業務メニュー", ImportanceCategory::BusinessCritical),
    ("companyProfile", "name", 10, "企業名", ImportanceCategory::BusinessCritical),
    ("currentAnalysis", "challengeCategories", 10, "課題カテゴリ", ImportanceCategory::BusinessCritical),
    ("projectDesign", "challengeSummary", 8, "課題サマリー", ImportanceCategory::Core),
    ("companyProfile", "industry", 6, "業界", ImportanceCategory::Core),
    ("companyProfile", "businessDescription", 6, "事業内容", ImportanceCategory::Core),
    ("projectDesign", "targetState", 6, "3ヶ月後の状態", ImportanceCategory::Core),
    ("companyProfile", "employeeCount", 5, "従業員数", ImportanceCategory::Core),
    ("currentAnalysis", "businessPhase", 5, "事業フェーズ", ImportanceCategory::Core),
    ("projectDesign", "successMetrics.quantitative", 5, "定量指標", ImportanceCategory::Core),
    ("projectDesign", "phases", 5, "実施フェーズ", ImportanceCategory::Core),
    ("projectDesign", "budget.monthlyBudget", 4, "月額予算", ImportanceCategory::Core),
    ("currentAnalysis", "teamComposition", 3, "チーム構成", ImportanceCategory::Supplementary),
    ("currentAnalysis", "readiness", 3, "受け入れ体制", ImportanceCategory::Supplementary),
    ("researchData", "hypothesis", 3, "仮説", ImportanceCategory::Supplementary),
    ("companyProfile", "revenue", 2, "売上規模", ImportanceCategory::Supplementary),
    ("companyProfile", "customerDescription", 2, "主要顧客", ImportanceCategory::Supplementary),
    ("companyProfile", "headquarters", 2, "本社所在地", ImportanceCategory::Supplementary),
];

impl Default for ScoringTable {
    fn default() -> Self {
        Self {
            entries: DEFAULT_WEIGHTS
                .iter()
                .map(|(section, field, weight, label, category)| FieldWeight {
                    section: section.to_string(),
                    field: field.to_string(),
                    weight: *weight,
                    label: label.to_string(),
                    category: *category,
                })
                .collect(),
        }
    }
}

impl ScoringTable {
    pub fn total_weight(&self) -> u32 {
        self.entries.iter().map(|e| e.weight).sum()
    }

    pub fn from_json_str(raw: &str) -> Result<Self> {
        let table: ScoringTable =
            serde_json::from_str(raw).context("Scoring table is not valid JSON")?;
        if table.total_weight() == 0 {
            bail!("Scoring table must contain at least one positive weight");
        }
        Ok(table)
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read scoring table '{}'", path.display()))?;
        Self::from_json_str(&raw)
    }
}

/// Whether a JSON value carries real content.
pub fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(false),
        Value::String(s) => {
            let s = s.trim();
            !s.is_empty() && s != UNKNOWN && !s.contains(INSUFFICIENT_INFO)
        }
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => map.values().any(is_present),
    }
}

fn lookup<'a>(root: &'a Value, section: &str, field: &str) -> Option<&'a Value> {
    field
        .split('.')
        .try_fold(root.get(section)?, |node, key| node.get(key))
}

/// Scores the template against the weight table. Pure; safe to call on every edit.
pub fn compute_completeness(template: &Template, table: &ScoringTable) -> CompletenessReport {
    let root = template.to_value();
    let total_weight = table.total_weight();

    let mut present_weight = 0u32;
    let mut missing_fields = Vec::new();

    for entry in &table.entries {
        let present = lookup(&root, &entry.section, &entry.field)
            .map(is_present)
            .unwrap_or(false);
        if present {
            present_weight += entry.weight;
        } else {
            missing_fields.push(entry.clone());
        }
    }

    // Stable: ties keep table order.
    missing_fields.sort_by(|a, b| b.weight.cmp(&a.weight));

    let score = if total_weight > 0 {
        ((present_weight as f64 / total_weight as f64) * 100.0)
            .round()
            .clamp(0.0, 100.0) as u8
    } else {
        0
    };

    CompletenessReport {
        score,
        present_weight,
        total_weight,
        missing_fields,
        sorted_by_impact: true,
    }
}
