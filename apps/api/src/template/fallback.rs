//! Fallback Generators: deterministic stand-ins for the text-generation service.
//!
//! Every function is total: any input, including the empty string, yields a valid section.
//! Values are drawn only from the input text and fixed keyword tables.

use crate::template::extract::{detect_company_name, detect_headcount, detect_industries};
use crate::template::merge::dedup_by_value;
use crate::template::models::{
    BusinessItem, BusinessPhase, CompanyProfile, CurrentAnalysis, EmployeeCount, Phase,
    ProjectDesign, ResearchData, Scope, SuccessMetrics, Template, WorkingHours,
};
use crate::template::rules::CompanyExtraction;

/// Challenge keyword table: needles → challenge category tag.
const CHALLENGE_KEYWORDS: &[(&str, &[&str])] = &[
    ("採用・人材確保", &["採用", "人材不足", "人手不足", "hiring"]),
    ("DX推進", &["dx", "デジタル", "システム化", "it化"]),
    ("営業強化", &["営業", "売上", "商談", "sales"]),
    ("マーケティング", &["マーケ", "集客", "広告", "ブランド"]),
    ("業務効率化", &["効率", "業務改善", "属人", "残業"]),
    ("組織開発", &["組織", "離職", "評価制度", "マネジメント"]),
    ("新規事業", &["新規事業", "新サービス", "事業開発"]),
    ("データ活用", &["データ", "分析", "kpi"]),
];

const MAX_FALLBACK_CHALLENGES: usize = 3;

const PHASE_KEYWORDS: &[(&str, BusinessPhase)] = &[
    ("創業", BusinessPhase::Startup),
    ("スタートアップ", BusinessPhase::Startup),
    ("急成長", BusinessPhase::Growth),
    ("成長", BusinessPhase::Growth),
    ("拡大", BusinessPhase::Expansion),
    ("多角化", BusinessPhase::Expansion),
    ("老舗", BusinessPhase::Mature),
    ("成熟", BusinessPhase::Mature),
];

/// Best-effort company profile from the raw memo. Research summaries stay empty: there is no
/// reliable way to produce them offline.
pub fn fallback_company(raw: &str) -> CompanyExtraction {
    let profile = CompanyProfile {
        name: detect_company_name(raw).unwrap_or_default(),
        industry: if raw.trim().is_empty() {
            Vec::new()
        } else {
            detect_industries(raw)
        },
        employee_count: EmployeeCount::from_headcount(detect_headcount(raw)),
        ..CompanyProfile::default()
    };

    CompanyExtraction {
        profile,
        research: ResearchData::default(),
    }
}

/// Challenge categories and business phase from keyword tables.
pub fn fallback_analysis(raw: &str) -> CurrentAnalysis {
    let lowered = raw.to_lowercase();

    let challenge_categories: Vec<String> = CHALLENGE_KEYWORDS
        .iter()
        .filter(|(_, needles)| needles.iter().any(|n| lowered.contains(n)))
        .map(|(category, _)| category.to_string())
        .take(MAX_FALLBACK_CHALLENGES)
        .collect();

    let business_phase = PHASE_KEYWORDS
        .iter()
        .find(|(needle, _)| lowered.contains(needle))
        .map(|(_, phase)| *phase)
        .unwrap_or(BusinessPhase::Unknown);

    CurrentAnalysis {
        business_phase,
        challenge_categories,
        ..CurrentAnalysis::default()
    }
}

/// Total monthly hours of a business-menu selection.
pub fn selection_hours(selection: &[BusinessItem]) -> u32 {
    selection
        .iter()
        .fold(0u32, |acc, item| acc.saturating_add(item.working_hours))
}

/// A standard three-phase plan scoped to the selected business items.
pub fn fallback_design(template: &Template, selection: &[BusinessItem]) -> ProjectDesign {
    let titles: Vec<String> = dedup_by_value(
        selection
            .iter()
            .map(|item| item.title.trim().to_string())
            .filter(|title| !title.is_empty())
            .collect(),
    );

    let challenges = &template.current_analysis.challenge_categories;
    let challenge_summary = if challenges.is_empty() {
        String::new()
    } else {
        format!("{}に関する課題の解決", challenges.join("・"))
    };

    let phases = if titles.is_empty() {
        Vec::new()
    } else {
        vec![
            Phase {
                name: "現状把握".to_string(),
                period: "1ヶ月目".to_string(),
                goal: "課題と優先順位の明確化".to_string(),
                main_activities: vec!["関係者ヒアリング".to_string(), "現状データの整理".to_string()],
            },
            Phase {
                name: "施策設計・実行".to_string(),
                period: "2ヶ月目".to_string(),
                goal: "選定施策の立ち上げ".to_string(),
                main_activities: titles.iter().take(5).cloned().collect(),
            },
            Phase {
                name: "定着・振り返り".to_string(),
                period: "3ヶ月目".to_string(),
                goal: "成果の確認と次期計画".to_string(),
                main_activities: vec!["効果測定".to_string(), "改善提案".to_string()],
            },
        ]
    };

    ProjectDesign {
        challenge_summary,
        success_metrics: SuccessMetrics::default(),
        deliverables: titles.iter().map(|t| format!("{t} 実施報告書")).collect(),
        scope: Scope {
            included: titles,
            excluded: Vec::new(),
        },
        phases,
        working_hours: WorkingHours::from_hours(selection_hours(selection)),
        ..ProjectDesign::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::models::Sentinel;

    fn item(title: &str, hours: u32) -> BusinessItem {
        BusinessItem {
            category: "営業".to_string(),
            phase: "実行".to_string(),
            title: title.to_string(),
            working_hours: hours,
        }
    }

    #[test]
    fn test_fallback_company_from_memo() {
        let e = fallback_company("株式会社テストはSaaSのクラウド製品を提供。従業員数は約40名。");
        assert_eq!(e.profile.name, "株式会社テスト");
        assert_eq!(e.profile.industry, vec!["IT"]);
        assert_eq!(e.profile.employee_count, EmployeeCount::UpTo50);
        assert!(e.research.deep_research_memo.is_empty());
    }

    #[test]
    fn test_fallback_company_empty_input_is_all_unknown() {
        let e = fallback_company("");
        assert_eq!(e.profile.name, "");
        assert!(e.profile.industry.is_empty());
        assert!(e.profile.employee_count.is_unknown());
        assert!(e.profile.revenue.is_unknown());
    }

    #[test]
    fn test_fallback_company_unmatched_industry_defaults_to_other() {
        let e = fallback_company("地域密着の老舗です");
        assert_eq!(e.profile.industry, vec!["その他"]);
    }

    #[test]
    fn test_fallback_analysis() {
        let a = fallback_analysis("急成長中だが採用が追いつかず、営業も属人化している");
        assert_eq!(a.business_phase, BusinessPhase::Growth);
        assert_eq!(
            a.challenge_categories,
            vec!["採用・人材確保", "営業強化", "業務効率化"]
        );
    }

    #[test]
    fn test_fallback_analysis_empty() {
        let a = fallback_analysis("");
        assert!(a.challenge_categories.is_empty());
        assert!(a.business_phase.is_unknown());
    }

    #[test]
    fn test_fallback_design_from_selection() {
        let mut t = Template::empty();
        t.current_analysis.challenge_categories = vec!["営業強化".to_string()];
        let d = fallback_design(&t, &[item("営業プロセス設計", 20), item("KPI設計", 15)]);
        assert_eq!(d.challenge_summary, "営業強化に関する課題の解決");
        assert_eq!(d.phases.len(), 3);
        assert_eq!(d.scope.included, vec!["営業プロセス設計", "KPI設計"]);
        assert_eq!(d.working_hours, WorkingHours::From20To40);
        assert_eq!(d.budget.monthly_budget, 0);
    }

    #[test]
    fn test_fallback_design_empty_selection() {
        let d = fallback_design(&Template::empty(), &[]);
        assert!(d.phases.is_empty());
        assert!(d.working_hours.is_unknown());
        assert!(d.challenge_summary.is_empty());
    }

    #[test]
    fn test_selection_hours_saturates() {
        assert_eq!(selection_hours(&[item("a", u32::MAX), item("b", 5)]), u32::MAX);
    }
}
