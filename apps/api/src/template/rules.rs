//! Declarative extraction rules.
//!
//! Each section owns a `&'static [Rule]` table. A single dispatcher, `extract`, turns one rule
//! into one `Extracted` value; `extract_section` folds a whole table into a JSON object keyed by
//! the template's wire names and decodes it into the typed section.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::template::extract::{
    bool_value, bracketed_section, contains_label, detect_company_name, labeled_value_any,
    list_value, map_enum, normalize_digits, parse_amount, parse_count, pipe_rows, split_list,
    year_value,
};
use crate::template::merge::Confirmable;
use crate::template::models::{
    CompanyProfile, CurrentAnalysis, EmployeeCount, Phase, ProjectDesign, ResearchData,
    Sentinel, TeamMember, WorkingHours, UNKNOWN,
};

/// Needle → canonical wire value. Order matters: the first contained needle wins.
pub type EnumTable = &'static [(&'static str, &'static str)];

#[derive(Debug, Clone, Copy)]
pub enum RuleKind {
    Text,
    List { cap: usize },
    Enum(EnumTable),
    Year,
    Bool {
        positives: &'static [&'static str],
        negatives: &'static [&'static str],
    },
    /// First integer in the value.
    Count,
    /// Yen amount with 万/億 suffixes.
    Amount,
}

#[derive(Debug, Clone, Copy)]
pub struct Rule {
    /// Wire path inside the section, dotted for nested records (`budget.monthlyBudget`).
    pub field: &'static str,
    pub labels: &'static [&'static str],
    pub kind: RuleKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Extracted {
    Text(Option<String>),
    List(Vec<String>),
    /// Canonical wire value; `"unknown"` on a miss.
    Enum(&'static str),
    Year(Option<i32>),
    Bool(Option<bool>),
    Number(Option<u64>),
}

impl Extracted {
    pub fn is_found(&self) -> bool {
        match self {
            Extracted::Text(v) => v.is_some(),
            Extracted::List(v) => !v.is_empty(),
            Extracted::Enum(v) => *v != UNKNOWN,
            Extracted::Year(v) => v.is_some(),
            Extracted::Bool(v) => v.is_some(),
            Extracted::Number(v) => v.is_some(),
        }
    }

    fn into_json(self) -> Option<Value> {
        match self {
            Extracted::Text(v) => v.map(Value::String),
            Extracted::List(v) if v.is_empty() => None,
            Extracted::List(v) => Some(Value::from(v)),
            Extracted::Enum(v) => Some(Value::from(v)),
            Extracted::Year(v) => v.map(Value::from),
            Extracted::Bool(v) => v.map(Value::from),
            Extracted::Number(v) => v.map(Value::from),
        }
    }
}

fn normalize_range(value: &str) -> String {
    normalize_digits(value).replace(['～', '〜', '－', '~'], "-")
}

/// Runs one rule against `text`.
pub fn extract(text: &str, rule: &Rule) -> Extracted {
    match rule.kind {
        RuleKind::Text => Extracted::Text(labeled_value_any(text, rule.labels)),
        RuleKind::List { cap } => Extracted::List(list_value(text, rule.labels, cap)),
        RuleKind::Enum(table) => Extracted::Enum(
            labeled_value_any(text, rule.labels)
                .and_then(|v| map_enum(&normalize_range(&v), table))
                .unwrap_or(UNKNOWN),
        ),
        RuleKind::Year => Extracted::Year(year_value(text, rule.labels)),
        RuleKind::Bool {
            positives,
            negatives,
        } => Extracted::Bool(bool_value(text, rule.labels, positives, negatives)),
        RuleKind::Count => {
            Extracted::Number(labeled_value_any(text, rule.labels).and_then(|v| parse_count(&v)))
        }
        RuleKind::Amount => {
            Extracted::Number(labeled_value_any(text, rule.labels).and_then(|v| parse_amount(&v)))
        }
    }
}

fn insert_path(root: &mut Map<String, Value>, path: &str, value: Value) {
    match path.split_once('.') {
        Some((head, rest)) => {
            let child = root
                .entry(head.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if let Value::Object(child) = child {
                insert_path(child, rest, value);
            }
        }
        None => {
            root.insert(path.to_string(), value);
        }
    }
}

/// Applies every rule and decodes the result into the section type. Misses keep the section's
/// default (empty string, empty list, unknown enum).
pub fn extract_section<T: DeserializeOwned + Default>(text: &str, rules: &[Rule]) -> T {
    let mut root = Map::new();
    for rule in rules {
        let extracted = extract(text, rule);
        if !extracted.is_found() {
            continue;
        }
        if let Some(value) = extracted.into_json() {
            insert_path(&mut root, rule.field, value);
        }
    }
    serde_json::from_value(Value::Object(root)).unwrap_or_default()
}

/// True when the text carries at least one recognised label or section heading.
pub fn recognizes(text: &str, rules: &[Rule], headings: &[&str]) -> bool {
    rules.iter().any(|rule| contains_label(text, rule.labels))
        || headings
            .iter()
            .any(|heading| text.contains(&format!("【{heading}】")))
}

// ────────────────────────────────────────────────────────────────────────────
// Enumeration tables
// ────────────────────────────────────────────────────────────────────────────

pub const EMPLOYEE_COUNT_TABLE: EnumTable = &[
    ("1001", "1001+"),
    ("1000名以上", "1001+"),
    ("1000人以上", "1001+"),
    ("301-1000", "301-1000"),
    ("101-300", "101-300"),
    ("51-100", "51-100"),
    ("11-50", "11-50"),
    ("1-10", "1-10"),
];

pub const REVENUE_TABLE: EnumTable = &[
    ("1億円未満", "under_100m"),
    ("1億未満", "under_100m"),
    ("1-10億", "100m-1b"),
    ("10-100億", "1b-10b"),
    ("100億円以上", "10b+"),
    ("100億以上", "10b+"),
];

pub const BUSINESS_PHASE_TABLE: EnumTable = &[
    ("創業", "startup"),
    ("スタートアップ", "startup"),
    ("シード", "startup"),
    ("startup", "startup"),
    ("成長", "growth"),
    ("growth", "growth"),
    ("拡大", "expansion"),
    ("expansion", "expansion"),
    ("成熟", "mature"),
    ("安定", "mature"),
    ("mature", "mature"),
];

pub const TALENT_EXPERIENCE_TABLE: EnumTable = &[
    ("豊富", "extensive"),
    ("extensive", "extensive"),
    ("未経験", "none"),
    ("ありません", "none"),
    ("なし", "none"),
    ("ない", "none"),
    ("no experience", "none"),
    ("あり", "some"),
    ("一部", "some"),
    ("some", "some"),
];

pub const READINESS_TABLE: EnumTable = &[
    ("未整備", "not_ready"),
    ("整っていない", "not_ready"),
    ("不可", "not_ready"),
    ("not ready", "not_ready"),
    ("not_ready", "not_ready"),
    ("一部", "partial"),
    ("部分", "partial"),
    ("partial", "partial"),
    ("整っている", "ready"),
    ("整備済", "ready"),
    ("可能", "ready"),
    ("ready", "ready"),
];

pub const DECISION_PROCESS_TABLE: EnumTable = &[
    ("トップダウン", "top_down"),
    ("top-down", "top_down"),
    ("top down", "top_down"),
    ("社長", "top_down"),
    ("経営者", "top_down"),
    ("稟議", "approval_chain"),
    ("承認", "approval_chain"),
    ("合議", "consensus"),
    ("合意", "consensus"),
    ("consensus", "consensus"),
];

pub const WORKING_HOURS_TABLE: EnumTable = &[
    ("80時間以上", "80_plus"),
    ("80+", "80_plus"),
    ("40-80", "40_80"),
    ("20-40", "20_40"),
    ("20時間未満", "under_20"),
];

// ────────────────────────────────────────────────────────────────────────────
// Rule tables
// ────────────────────────────────────────────────────────────────────────────

const COMPANY_NAME_LABELS: &[&str] = &["企業名", "会社名", "Company"];
const EMPLOYEE_COUNT_LABELS: &[&str] = &["従業員数", "従業員規模", "社員数", "Employees"];
const WORKING_HOURS_LABELS: &[&str] = &["稼働時間", "想定稼働"];

pub const COMPANY_RULES: &[Rule] = &[
    Rule {
        field: "name",
        labels: COMPANY_NAME_LABELS,
        kind: RuleKind::Text,
    },
    Rule {
        field: "industry",
        labels: &["業界", "業種", "Industry"],
        kind: RuleKind::List { cap: 3 },
    },
    Rule {
        field: "employeeCount",
        labels: EMPLOYEE_COUNT_LABELS,
        kind: RuleKind::Enum(EMPLOYEE_COUNT_TABLE),
    },
    Rule {
        field: "revenue",
        labels: &["売上規模", "売上高", "年商", "Revenue"],
        kind: RuleKind::Enum(REVENUE_TABLE),
    },
    Rule {
        field: "headquarters",
        labels: &["本社所在地", "本社", "所在地", "Headquarters"],
        kind: RuleKind::Text,
    },
    Rule {
        field: "establishedYear",
        labels: &["設立年", "設立", "創業年", "Founded"],
        kind: RuleKind::Year,
    },
    Rule {
        field: "isListed",
        labels: &["上場区分", "上場状況", "株式公開", "Listed"],
        kind: RuleKind::Bool {
            positives: &["上場", "listed", "public"],
            negatives: &["非上場", "未上場", "unlisted", "not listed", "private"],
        },
    },
    Rule {
        field: "businessDescription",
        labels: &["事業内容", "事業概要", "Business"],
        kind: RuleKind::Text,
    },
    Rule {
        field: "customerDescription",
        labels: &["主要顧客", "顧客層", "顧客", "Customers"],
        kind: RuleKind::Text,
    },
];

pub const RESEARCH_RULES: &[Rule] = &[
    Rule {
        field: "recentNews",
        labels: &["最近のニュース", "最新ニュース", "ニュース", "News"],
        kind: RuleKind::Text,
    },
    Rule {
        field: "organizationCulture",
        labels: &["組織文化", "企業文化", "社風", "Culture"],
        kind: RuleKind::Text,
    },
    Rule {
        field: "hypothesis",
        labels: &["仮説", "インサイト", "Hypothesis"],
        kind: RuleKind::Text,
    },
    Rule {
        field: "meetingCheckpoints",
        labels: &["確認事項", "面談で確認すべき事項", "Checkpoints"],
        kind: RuleKind::List { cap: 5 },
    },
];

pub const ANALYSIS_RULES: &[Rule] = &[
    Rule {
        field: "businessPhase",
        labels: &["事業フェーズ", "成長ステージ"],
        kind: RuleKind::Enum(BUSINESS_PHASE_TABLE),
    },
    Rule {
        field: "challengeCategories",
        labels: &["課題カテゴリ", "課題分類", "主な課題"],
        kind: RuleKind::List { cap: 5 },
    },
    Rule {
        field: "previousEfforts",
        labels: &["過去の取り組み", "これまでの取り組み"],
        kind: RuleKind::Text,
    },
    Rule {
        field: "failureReasons",
        labels: &["うまくいかなかった理由", "失敗要因", "失敗理由"],
        kind: RuleKind::Text,
    },
    Rule {
        field: "missingSkills",
        labels: &["不足スキル", "不足している人材", "不足人材"],
        kind: RuleKind::List { cap: 5 },
    },
    Rule {
        field: "externalTalentExperience",
        labels: &["外部人材活用経験", "外部人材の活用経験", "副業人材活用"],
        kind: RuleKind::Enum(TALENT_EXPERIENCE_TABLE),
    },
    Rule {
        field: "readiness",
        labels: &["受け入れ体制", "受入体制"],
        kind: RuleKind::Enum(READINESS_TABLE),
    },
    Rule {
        field: "readinessDetail",
        labels: &["受け入れ体制詳細", "受け入れ体制の詳細"],
        kind: RuleKind::Text,
    },
    Rule {
        field: "decisionProcess",
        labels: &["意思決定プロセス", "意思決定"],
        kind: RuleKind::Enum(DECISION_PROCESS_TABLE),
    },
    Rule {
        field: "barriers",
        labels: &["導入障壁", "障壁", "懸念事項"],
        kind: RuleKind::List { cap: 5 },
    },
];

pub const DESIGN_RULES: &[Rule] = &[
    Rule {
        field: "challengeSummary",
        labels: &["課題サマリー", "課題の要約", "課題概要"],
        kind: RuleKind::Text,
    },
    Rule {
        field: "urgencyReason",
        labels: &["緊急性", "今取り組むべき理由"],
        kind: RuleKind::Text,
    },
    Rule {
        field: "riskIfIgnored",
        labels: &["放置した場合のリスク", "放置リスク"],
        kind: RuleKind::Text,
    },
    Rule {
        field: "targetState",
        labels: &["3ヶ月後の状態", "3ヶ月後の目標", "目標状態"],
        kind: RuleKind::Text,
    },
    Rule {
        field: "successMetrics.quantitative",
        labels: &["定量指標", "定量的な成功指標"],
        kind: RuleKind::List { cap: 5 },
    },
    Rule {
        field: "successMetrics.qualitative",
        labels: &["定性指標", "定性的な成功指標"],
        kind: RuleKind::List { cap: 5 },
    },
    Rule {
        field: "deliverables",
        labels: &["成果物", "アウトプット"],
        kind: RuleKind::List { cap: 5 },
    },
    Rule {
        field: "scope.included",
        labels: &["対象範囲", "スコープ"],
        kind: RuleKind::List { cap: 5 },
    },
    Rule {
        field: "scope.excluded",
        labels: &["対象外", "スコープ外"],
        kind: RuleKind::List { cap: 5 },
    },
    Rule {
        field: "workingHours",
        labels: WORKING_HOURS_LABELS,
        kind: RuleKind::Enum(WORKING_HOURS_TABLE),
    },
    Rule {
        field: "budget.monthlyBudget",
        labels: &["月額予算", "月額費用"],
        kind: RuleKind::Amount,
    },
    Rule {
        field: "budget.duration",
        labels: &["契約期間", "期間"],
        kind: RuleKind::Count,
    },
    Rule {
        field: "budget.totalBudget",
        labels: &["総予算", "総額"],
        kind: RuleKind::Amount,
    },
];

pub const TEAM_HEADING: &str = "チーム構成";
pub const PHASES_HEADING: &str = "実施フェーズ";

// ────────────────────────────────────────────────────────────────────────────
// Section extractors
// ────────────────────────────────────────────────────────────────────────────

/// Step 1 output: the company profile and the research summaries.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompanyExtraction {
    pub profile: CompanyProfile,
    pub research: ResearchData,
}

pub fn extract_company(text: &str) -> CompanyExtraction {
    let mut profile: CompanyProfile = extract_section(text, COMPANY_RULES);

    if !profile.name.is_confirmed() {
        profile.name = detect_company_name(text).unwrap_or_default();
    }
    if profile.employee_count.is_unknown() {
        // "約120名" has no table needle; bucket the number instead.
        profile.employee_count = labeled_value_any(text, EMPLOYEE_COUNT_LABELS)
            .and_then(|v| parse_count(&v))
            .map(EmployeeCount::from_headcount)
            .unwrap_or(EmployeeCount::Unknown);
    }

    let mut research: ResearchData = extract_section(text, RESEARCH_RULES);
    // Never produced by extraction.
    research.deep_research_memo.clear();

    CompanyExtraction { profile, research }
}

pub fn recognizes_company(text: &str) -> bool {
    recognizes(text, COMPANY_RULES, &[]) || recognizes(text, RESEARCH_RULES, &[])
}

fn parse_team_rows(section: &str) -> Vec<TeamMember> {
    pipe_rows(section, 2)
        .into_iter()
        .map(|cells| TeamMember {
            department: cells[0].clone(),
            headcount: cells
                .get(1)
                .and_then(|c| parse_count(c))
                .and_then(|n| u32::try_from(n).ok())
                .unwrap_or(0),
            main_role: cells.get(2).cloned().unwrap_or_default(),
        })
        .filter(|member| !member.department.is_empty())
        .collect()
}

pub fn extract_analysis(text: &str) -> CurrentAnalysis {
    let mut analysis: CurrentAnalysis = extract_section(text, ANALYSIS_RULES);
    analysis.team_composition = bracketed_section(text, TEAM_HEADING)
        .map(parse_team_rows)
        .unwrap_or_default();
    analysis
}

pub fn recognizes_analysis(text: &str) -> bool {
    recognizes(text, ANALYSIS_RULES, &[TEAM_HEADING])
}

fn strip_phase_prefix(name: &str) -> String {
    let trimmed = name.trim();
    let rest = trimmed
        .strip_prefix("フェーズ")
        .or_else(|| trimmed.strip_prefix("Phase"))
        .map(|r| r.trim_start_matches(|c: char| c.is_ascii_digit() || c.is_whitespace() || ('０'..='９').contains(&c)))
        .map(|r| r.trim_start_matches([':', '：', '.', '、']).trim());
    match rest {
        Some(r) if !r.is_empty() => r.to_string(),
        _ => trimmed.to_string(),
    }
}

fn parse_phase_rows(section: &str) -> Vec<Phase> {
    pipe_rows(section, 2)
        .into_iter()
        .map(|cells| Phase {
            name: strip_phase_prefix(&cells[0]),
            period: cells.get(1).cloned().unwrap_or_default(),
            goal: cells.get(2).cloned().unwrap_or_default(),
            main_activities: cells
                .get(3)
                .map(|c| split_list(c, 5))
                .unwrap_or_default(),
        })
        .filter(|phase| !phase.name.is_empty())
        .collect()
}

pub fn extract_design(text: &str) -> ProjectDesign {
    let mut design: ProjectDesign = extract_section(text, DESIGN_RULES);
    design.phases = bracketed_section(text, PHASES_HEADING)
        .map(parse_phase_rows)
        .unwrap_or_default();
    if design.working_hours.is_unknown() {
        design.working_hours = labeled_value_any(text, WORKING_HOURS_LABELS)
            .and_then(|v| parse_count(&v))
            .and_then(|n| u32::try_from(n).ok())
            .map(WorkingHours::from_hours)
            .unwrap_or(WorkingHours::Unknown);
    }
    design
}

pub fn recognizes_design(text: &str) -> bool {
    recognizes(text, DESIGN_RULES, &[PHASES_HEADING])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::models::{
        BusinessPhase, DecisionProcess, Readiness, RevenueScale, TalentExperience,
        INSUFFICIENT_INFO,
    };

    const SCENARIO: &str = "株式会社テスト\n業界：IT\n従業員数：11-50名";

    const STEP1_OUTPUT: &str = "\
企業名：サンプル商事株式会社
業界：EC、小売
従業員数：51-100名
売上規模：10-100億円
本社所在地：東京都渋谷区
設立年：2012年
上場区分：非上場
事業内容：アパレルのEC運営
主要顧客：20-30代女性
最近のニュース：物流センターを新設
組織文化：若手中心で意思決定が速い
仮説：データ活用人材が不足している
確認事項：
- 予算規模、決裁者、開始時期
";

    #[test]
    fn test_scenario_company_name_industry_employee_count() {
        let extraction = extract_company(SCENARIO);
        assert_eq!(extraction.profile.name, "株式会社テスト");
        assert_eq!(extraction.profile.industry, vec!["IT"]);
        assert_eq!(extraction.profile.employee_count, EmployeeCount::UpTo50);
    }

    #[test]
    fn test_missing_industry_label_yields_empty_list() {
        let extraction = extract_company("株式会社テスト\n従業員数：11-50名");
        assert!(extraction.profile.industry.is_empty());
    }

    #[test]
    fn test_full_step1_output() {
        let e = extract_company(STEP1_OUTPUT);
        assert_eq!(e.profile.name, "サンプル商事株式会社");
        assert_eq!(e.profile.industry, vec!["EC", "小売"]);
        assert_eq!(e.profile.employee_count, EmployeeCount::UpTo100);
        assert_eq!(e.profile.revenue, RevenueScale::UpTo10B);
        assert_eq!(e.profile.headquarters, "東京都渋谷区");
        assert_eq!(e.profile.established_year, Some(2012));
        assert_eq!(e.profile.is_listed, Some(false));
        assert_eq!(e.research.hypothesis, "データ活用人材が不足している");
        assert!(e.research.deep_research_memo.is_empty());
        assert!(recognizes_company(STEP1_OUTPUT));
    }

    #[test]
    fn test_headcount_number_is_bucketed() {
        let e = extract_company("従業員数：約120名");
        assert_eq!(e.profile.employee_count, EmployeeCount::UpTo300);
    }

    #[test]
    fn test_sentinel_maps_to_empty_for_every_kind() {
        let text = format!(
            "企業名：{s}\n従業員数：{s}\n設立年：{s}\n上場区分：{s}\n業界：{s}\n月額予算：{s}",
            s = INSUFFICIENT_INFO
        );
        let by_field = |field: &str| {
            COMPANY_RULES
                .iter()
                .chain(DESIGN_RULES)
                .find(|r| r.field == field)
                .map(|r| extract(&text, r))
                .unwrap()
        };
        assert_eq!(by_field("name"), Extracted::Text(None));
        assert_eq!(by_field("employeeCount"), Extracted::Enum(UNKNOWN));
        assert_eq!(by_field("establishedYear"), Extracted::Year(None));
        assert_eq!(by_field("isListed"), Extracted::Bool(None));
        assert_eq!(by_field("industry"), Extracted::List(vec![]));
        assert_eq!(by_field("budget.monthlyBudget"), Extracted::Number(None));

        let profile = extract_company(&text).profile;
        assert_eq!(profile.name, "");
        assert!(profile.employee_count.is_unknown());
    }

    #[test]
    fn test_unrecognized_enum_text_is_unknown() {
        let analysis = extract_analysis("事業フェーズ：よくわからない");
        assert_eq!(analysis.business_phase, BusinessPhase::Unknown);
    }

    #[test]
    fn test_extract_analysis() {
        let text = "\
事業フェーズ：成長期
課題カテゴリ：採用、DX推進、営業効率化
過去の取り組み：営業支援ツールを導入した
失敗要因：現場に定着しなかった
不足スキル：データ分析、プロジェクト管理
外部人材活用経験：活用したことはない
受け入れ体制：一部整っている
受け入れ体制詳細：担当者1名をアサイン可能
意思決定プロセス：社長によるトップダウン
障壁：予算、社内理解

【チーム構成】
営業部 | 8名 | 新規開拓
開発部 | 3名 | 自社EC保守
";
        let a = extract_analysis(text);
        assert_eq!(a.business_phase, BusinessPhase::Growth);
        assert_eq!(a.challenge_categories, vec!["採用", "DX推進", "営業効率化"]);
        assert_eq!(a.external_talent_experience, TalentExperience::NoExperience);
        assert_eq!(a.readiness, Readiness::Partial);
        assert_eq!(a.readiness_detail, "担当者1名をアサイン可能");
        assert_eq!(a.decision_process, DecisionProcess::TopDown);
        assert_eq!(a.team_composition.len(), 2);
        assert_eq!(a.team_composition[0].headcount, 8);
        assert_eq!(a.team_composition[1].main_role, "自社EC保守");
        assert!(recognizes_analysis(text));
    }

    #[test]
    fn test_extract_design() {
        let text = "\
課題サマリー：営業プロセスの属人化
3ヶ月後の状態：商談化率を可視化できている
定量指標：商談化率20%向上、リード数1.5倍
定性指標：営業ナレッジの共有
成果物：営業プロセス設計書、KPIダッシュボード
対象範囲：インサイドセールス
対象外：採用活動
稼働時間：月30時間
月額予算：50万円
契約期間：6ヶ月
総予算：情報不足

【実施フェーズ】
フェーズ1：現状把握 | 1ヶ月目 | 課題の特定 | ヒアリング、データ分析
フェーズ2：設計 | 2ヶ月目 | プロセス設計 | KPI設計
【備考】
なし
";
        let d = extract_design(text);
        assert_eq!(d.challenge_summary, "営業プロセスの属人化");
        assert_eq!(d.success_metrics.quantitative.len(), 2);
        assert_eq!(d.scope.excluded, vec!["採用活動"]);
        assert_eq!(d.working_hours, WorkingHours::From20To40);
        assert_eq!(d.budget.monthly_budget, 500_000);
        assert_eq!(d.budget.duration, 6);
        assert_eq!(d.budget.total_budget, 0);
        assert_eq!(d.phases.len(), 2);
        assert_eq!(d.phases[0].name, "現状把握");
        assert_eq!(d.phases[0].main_activities, vec!["ヒアリング", "データ分析"]);
        assert!(recognizes_design(text));
    }

    #[test]
    fn test_unparseable_text_is_not_recognized() {
        let prose = "申し訳ありませんが、その依頼にはお応えできません。";
        assert!(!recognizes_company(prose));
        assert!(!recognizes_analysis(prose));
        assert!(!recognizes_design(prose));
    }
}
