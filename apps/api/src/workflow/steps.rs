//! Step Mergers: combine extraction output with the previous template state.
//!
//! Per-field priority:
//! 1. a confirmed previous value (non-empty, non-sentinel) is kept;
//! 2. otherwise a confirmed extracted value is taken;
//! 3. otherwise the previous (empty) value stays.
//!
//! Tag lists are unioned. Record lists (team rows, phases) are kept once non-empty.
//! `selectedBusinessItems` is the exception: the user's current selection replaces the old one.
//! Each merger sets only its own completion flag and appends exactly one history record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::template::extract::DEFAULT_INDUSTRY;
use crate::template::fallback::selection_hours;
use crate::template::merge::{
    dedup_by_value, keep_confirmed_list, prefer_confirmed, prefer_known, union_dedup,
};
use crate::template::models::{
    AnalysisRecord, AnalysisType, Budget, BusinessItem, CompanyProfile, CurrentAnalysis,
    ProjectDesign, ProposalDraft, ResearchData, Scope, Sentinel, SuccessMetrics, Template,
    WorkingHours,
};
use crate::template::rules::CompanyExtraction;

/// Where a step's content came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Origin {
    Ai,
    Fallback,
}

impl Origin {
    fn analysis_type(self) -> AnalysisType {
        match self {
            Origin::Ai => AnalysisType::Ai,
            Origin::Fallback => AnalysisType::Fallback,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StepMerge {
    pub template: Template,
    /// Whether the step's completion flag is now set by this merge.
    pub completed: bool,
    pub used_fallback: bool,
}

/// User input accompanying Step 3.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Step3Input {
    pub selected_business_items: Vec<BusinessItem>,
    pub notes: String,
    pub talent_count: Option<u32>,
}

fn record_history(
    template: &mut Template,
    step: u8,
    analysis_type: AnalysisType,
    input_data: Value,
    output_data: Value,
    now: DateTime<Utc>,
) {
    template.metadata.analysis_history.push(AnalysisRecord {
        step,
        timestamp: now,
        analysis_type,
        input_data,
        output_data,
    });
    if analysis_type == AnalysisType::Fallback && !template.metadata.fallback_steps.contains(&step)
    {
        template.metadata.fallback_steps.push(step);
    }
    template.touch(now);
}

fn to_json<T: Serialize>(value: &T) -> Value {
    serde_json::to_value(value).unwrap_or(Value::Null)
}

// ────────────────────────────────────────────────────────────────────────────
// Step 1: company research
// ────────────────────────────────────────────────────────────────────────────

/// The catch-all tag only stands in while nothing more specific is known.
fn without_default_industry(industry: Vec<String>) -> Vec<String> {
    if industry.iter().any(|tag| tag != DEFAULT_INDUSTRY) {
        industry
            .into_iter()
            .filter(|tag| tag != DEFAULT_INDUSTRY)
            .collect()
    } else {
        industry
    }
}

fn merge_profile(previous: CompanyProfile, extracted: CompanyProfile) -> CompanyProfile {
    CompanyProfile {
        name: prefer_confirmed(previous.name, extracted.name),
        industry: without_default_industry(union_dedup(previous.industry, extracted.industry)),
        employee_count: prefer_known(previous.employee_count, extracted.employee_count),
        revenue: prefer_known(previous.revenue, extracted.revenue),
        headquarters: prefer_confirmed(previous.headquarters, extracted.headquarters),
        established_year: prefer_confirmed(previous.established_year, extracted.established_year),
        is_listed: prefer_confirmed(previous.is_listed, extracted.is_listed),
        business_description: prefer_confirmed(
            previous.business_description,
            extracted.business_description,
        ),
        customer_description: prefer_confirmed(
            previous.customer_description,
            extracted.customer_description,
        ),
    }
}

fn merge_research(previous: ResearchData, extracted: ResearchData, raw_memo: &str) -> ResearchData {
    let memo = raw_memo.trim();
    ResearchData {
        // The memo is the user's own text; extraction never writes it.
        deep_research_memo: if memo.is_empty() {
            previous.deep_research_memo
        } else {
            memo.to_string()
        },
        recent_news: prefer_confirmed(previous.recent_news, extracted.recent_news),
        organization_culture: prefer_confirmed(
            previous.organization_culture,
            extracted.organization_culture,
        ),
        hypothesis: prefer_confirmed(previous.hypothesis, extracted.hypothesis),
        meeting_checkpoints: union_dedup(
            previous.meeting_checkpoints,
            extracted.meeting_checkpoints,
        ),
    }
}

pub fn merge_step1(
    previous: &Template,
    extracted: CompanyExtraction,
    raw_memo: &str,
    origin: Origin,
    now: DateTime<Utc>,
) -> StepMerge {
    let output = json!({
        "companyProfile": to_json(&extracted.profile),
        "researchData": to_json(&extracted.research),
    });

    let mut next = previous.clone();
    next.company_profile = merge_profile(previous.company_profile.clone(), extracted.profile);
    next.research_data = merge_research(
        previous.research_data.clone(),
        extracted.research,
        raw_memo,
    );
    next.metadata.mark_step_completed(1);
    record_history(
        &mut next,
        1,
        origin.analysis_type(),
        json!({ "memo": raw_memo }),
        output,
        now,
    );

    StepMerge {
        template: next,
        completed: true,
        used_fallback: origin == Origin::Fallback,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Step 2: current-state analysis
// ────────────────────────────────────────────────────────────────────────────

fn merge_analysis(previous: CurrentAnalysis, extracted: CurrentAnalysis) -> CurrentAnalysis {
    CurrentAnalysis {
        business_phase: prefer_known(previous.business_phase, extracted.business_phase),
        challenge_categories: union_dedup(
            previous.challenge_categories,
            extracted.challenge_categories,
        ),
        previous_efforts: prefer_confirmed(previous.previous_efforts, extracted.previous_efforts),
        failure_reasons: prefer_confirmed(previous.failure_reasons, extracted.failure_reasons),
        team_composition: keep_confirmed_list(
            previous.team_composition,
            extracted.team_composition,
        ),
        missing_skills: union_dedup(previous.missing_skills, extracted.missing_skills),
        external_talent_experience: prefer_known(
            previous.external_talent_experience,
            extracted.external_talent_experience,
        ),
        readiness: prefer_known(previous.readiness, extracted.readiness),
        readiness_detail: prefer_confirmed(previous.readiness_detail, extracted.readiness_detail),
        decision_process: prefer_known(previous.decision_process, extracted.decision_process),
        barriers: union_dedup(previous.barriers, extracted.barriers),
    }
}

pub fn merge_step2(
    previous: &Template,
    extracted: CurrentAnalysis,
    raw_input: &str,
    origin: Origin,
    now: DateTime<Utc>,
) -> StepMerge {
    let output = to_json(&extracted);

    let mut next = previous.clone();
    next.current_analysis = merge_analysis(previous.current_analysis.clone(), extracted);
    next.metadata.mark_step_completed(2);
    record_history(
        &mut next,
        2,
        origin.analysis_type(),
        json!({ "situation": raw_input }),
        output,
        now,
    );

    StepMerge {
        template: next,
        completed: true,
        used_fallback: origin == Origin::Fallback,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Step 3: project design and business-menu selection
// ────────────────────────────────────────────────────────────────────────────

fn merge_budget(previous: Budget, extracted: Budget) -> Budget {
    let mut budget = Budget {
        monthly_budget: prefer_confirmed(previous.monthly_budget, extracted.monthly_budget),
        duration: prefer_confirmed(previous.duration, extracted.duration),
        total_budget: prefer_confirmed(previous.total_budget, extracted.total_budget),
    };
    if budget.total_budget == 0 {
        budget.total_budget = budget.monthly_budget.saturating_mul(budget.duration);
    }
    budget
}

fn merge_design(previous: ProjectDesign, extracted: ProjectDesign) -> ProjectDesign {
    ProjectDesign {
        challenge_summary: prefer_confirmed(previous.challenge_summary, extracted.challenge_summary),
        urgency_reason: prefer_confirmed(previous.urgency_reason, extracted.urgency_reason),
        risk_if_ignored: prefer_confirmed(previous.risk_if_ignored, extracted.risk_if_ignored),
        target_state: prefer_confirmed(previous.target_state, extracted.target_state),
        success_metrics: SuccessMetrics {
            quantitative: union_dedup(
                previous.success_metrics.quantitative,
                extracted.success_metrics.quantitative,
            ),
            qualitative: union_dedup(
                previous.success_metrics.qualitative,
                extracted.success_metrics.qualitative,
            ),
        },
        deliverables: union_dedup(previous.deliverables, extracted.deliverables),
        scope: Scope {
            included: union_dedup(previous.scope.included, extracted.scope.included),
            excluded: union_dedup(previous.scope.excluded, extracted.scope.excluded),
        },
        phases: keep_confirmed_list(previous.phases, extracted.phases),
        working_hours: prefer_known(previous.working_hours, extracted.working_hours),
        budget: merge_budget(previous.budget, extracted.budget),
    }
}

/// `actualWorkingHours` and the hours bucket follow the selection. A previous value that differs
/// from what the previous selection implied was set by hand and is kept.
fn apply_selection_hours(previous: &Template, next: &mut Template, selected_hours: u32) {
    let previous_hours = previous.metadata.actual_working_hours;
    let hours_follow_selection = previous_hours
        .map(|hours| hours == selection_hours(&previous.metadata.selected_business_items))
        .unwrap_or(true);
    let derived_hours = (selected_hours > 0).then_some(selected_hours);
    next.metadata.actual_working_hours = if hours_follow_selection && derived_hours.is_some() {
        derived_hours
    } else {
        prefer_confirmed(previous_hours, derived_hours)
    };

    let previous_bucket = previous.project_design.working_hours;
    let bucket_follows_hours = !previous_bucket.is_unknown()
        && previous_bucket == WorkingHours::from_hours(previous_hours.unwrap_or(0));
    let hours_changed = next.metadata.actual_working_hours != previous_hours;
    if next.project_design.working_hours.is_unknown() || (bucket_follows_hours && hours_changed) {
        next.project_design.working_hours =
            WorkingHours::from_hours(next.metadata.actual_working_hours.unwrap_or(0));
    }
}

/// An empty selection still merges the design but leaves `step3Completed` untouched: the step
/// is not done until at least one business item is chosen.
pub fn merge_step3(
    previous: &Template,
    extracted: ProjectDesign,
    input: &Step3Input,
    origin: Origin,
    now: DateTime<Utc>,
) -> StepMerge {
    let output = to_json(&extracted);
    let selection = dedup_by_value(input.selected_business_items.clone());
    let selected_hours = selection_hours(&selection);

    let mut next = previous.clone();
    next.project_design = merge_design(previous.project_design.clone(), extracted);
    next.metadata.selected_business_items = selection;

    apply_selection_hours(previous, &mut next, selected_hours);
    if input.talent_count.is_some() {
        next.metadata.talent_count = input.talent_count;
    }

    let completed = !next.metadata.selected_business_items.is_empty();
    if completed {
        next.metadata.mark_step_completed(3);
    }
    record_history(
        &mut next,
        3,
        origin.analysis_type(),
        to_json(input),
        output,
        now,
    );

    StepMerge {
        template: next,
        completed,
        used_fallback: origin == Origin::Fallback,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Step 4: proposal
// ────────────────────────────────────────────────────────────────────────────

/// The rendered proposal replaces any earlier draft.
pub fn merge_step4(previous: &Template, draft: ProposalDraft, now: DateTime<Utc>) -> StepMerge {
    let completed = !draft.tabs.is_empty();
    let titles: Vec<&str> = draft.tabs.iter().map(|t| t.title.as_str()).collect();
    let output = json!({ "tabs": titles });

    let mut next = previous.clone();
    next.proposal = draft;
    if completed {
        next.metadata.mark_step_completed(4);
    }
    record_history(&mut next, 4, AnalysisType::Render, Value::Null, output, now);

    StepMerge {
        template: next,
        completed,
        used_fallback: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::models::{
        EmployeeCount, Phase, ProposalTab, Readiness, TeamMember, INSUFFICIENT_INFO,
    };
    use crate::template::fallback::fallback_company;
    use crate::template::rules::{extract_analysis, extract_company};

    fn now() -> DateTime<Utc> {
        Utc::now()
    }

    fn item(title: &str, hours: u32) -> BusinessItem {
        BusinessItem {
            category: "営業".to_string(),
            phase: "実行".to_string(),
            title: title.to_string(),
            working_hours: hours,
        }
    }

    #[test]
    fn test_confirmed_company_name_is_never_overwritten() {
        let mut prev = Template::empty();
        prev.company_profile.name = "Acme K.K.".to_string();
        let extracted = extract_company("企業名：別会社株式会社\n業界：IT");
        let merged = merge_step1(&prev, extracted, "", Origin::Ai, now()).template;
        assert_eq!(merged.company_profile.name, "Acme K.K.");
        assert_eq!(merged.company_profile.industry, vec!["IT"]);
    }

    #[test]
    fn test_default_industry_gives_way_to_specific_tags() {
        let offline = merge_step1(
            &Template::empty(),
            fallback_company("地域密着の老舗です"),
            "地域密着の老舗です",
            Origin::Fallback,
            now(),
        )
        .template;
        assert_eq!(offline.company_profile.industry, vec!["その他"]);

        let extracted = extract_company("業界：IT");
        let merged = merge_step1(&offline, extracted, "", Origin::Ai, now()).template;
        assert_eq!(merged.company_profile.industry, vec!["IT"]);
    }

    #[test]
    fn test_later_step_does_not_touch_company_profile() {
        let mut prev = Template::empty();
        prev.company_profile.name = "Acme K.K.".to_string();
        let extracted = extract_analysis("企業名：Other Inc.\n事業フェーズ：成熟期");
        let merged = merge_step2(&prev, extracted, "", Origin::Ai, now()).template;
        assert_eq!(merged.company_profile.name, "Acme K.K.");
    }

    #[test]
    fn test_empty_or_sentinel_previous_value_is_replaced() {
        let mut prev = Template::empty();
        prev.company_profile.headquarters = INSUFFICIENT_INFO.to_string();
        let extracted = extract_company("本社所在地：大阪市");
        let merged = merge_step1(&prev, extracted, "", Origin::Ai, now()).template;
        assert_eq!(merged.company_profile.headquarters, "大阪市");
    }

    #[test]
    fn test_industry_union_without_duplicates() {
        let mut prev = Template::empty();
        prev.company_profile.industry = vec!["SaaS".to_string()];
        let extracted = extract_company("業界：SaaS、EC");
        let merged = merge_step1(&prev, extracted, "", Origin::Ai, now()).template;
        assert_eq!(merged.company_profile.industry, vec!["SaaS", "EC"]);
    }

    #[test]
    fn test_known_enum_survives_extraction() {
        let mut prev = Template::empty();
        prev.company_profile.employee_count = EmployeeCount::UpTo10;
        let extracted = extract_company("従業員数：101-300名");
        let merged = merge_step1(&prev, extracted, "", Origin::Ai, now()).template;
        assert_eq!(merged.company_profile.employee_count, EmployeeCount::UpTo10);
    }

    #[test]
    fn test_memo_is_written_only_from_user_input() {
        let mut prev = Template::empty();
        prev.research_data.deep_research_memo = "旧メモ".to_string();
        let extracted = extract_company("企業名：A社");
        let kept = merge_step1(&prev, extracted.clone(), "  ", Origin::Ai, now()).template;
        assert_eq!(kept.research_data.deep_research_memo, "旧メモ");
        let replaced = merge_step1(&prev, extracted, "新メモ", Origin::Ai, now()).template;
        assert_eq!(replaced.research_data.deep_research_memo, "新メモ");
    }

    #[test]
    fn test_step_sets_only_its_own_flag() {
        let merged = merge_step2(
            &Template::empty(),
            CurrentAnalysis::default(),
            "",
            Origin::Ai,
            now(),
        );
        let m = &merged.template.metadata;
        assert!(m.step2_completed);
        assert!(!m.step1_completed && !m.step3_completed && !m.step4_completed);
    }

    #[test]
    fn test_flags_never_reset() {
        let mut prev = Template::empty();
        prev.metadata.step3_completed = true;
        let merged = merge_step3(
            &prev,
            ProjectDesign::default(),
            &Step3Input::default(),
            Origin::Ai,
            now(),
        );
        assert!(!merged.completed);
        assert!(merged.template.metadata.step3_completed);
    }

    #[test]
    fn test_history_is_append_only() {
        let t = merge_step1(
            &Template::empty(),
            CompanyExtraction::default(),
            "memo",
            Origin::Ai,
            now(),
        )
        .template;
        let first = t.metadata.analysis_history[0].clone();
        let t = merge_step2(&t, CurrentAnalysis::default(), "", Origin::Fallback, now()).template;
        assert_eq!(t.metadata.analysis_history.len(), 2);
        assert_eq!(t.metadata.analysis_history[0], first);
        assert_eq!(t.metadata.analysis_history[1].step, 2);
        assert_eq!(
            t.metadata.analysis_history[1].analysis_type,
            AnalysisType::Fallback
        );
        assert!(t.metadata.last_updated.is_some());
    }

    #[test]
    fn test_fallback_marker() {
        let merged = merge_step2(
            &Template::empty(),
            CurrentAnalysis::default(),
            "",
            Origin::Fallback,
            now(),
        );
        assert!(merged.used_fallback);
        assert_eq!(merged.template.metadata.fallback_steps, vec![2]);
        let again = merge_step2(
            &merged.template,
            CurrentAnalysis::default(),
            "",
            Origin::Fallback,
            now(),
        );
        assert_eq!(again.template.metadata.fallback_steps, vec![2]);
    }

    #[test]
    fn test_team_rows_kept_once_confirmed() {
        let mut prev = Template::empty();
        prev.current_analysis.team_composition = vec![TeamMember {
            department: "営業部".to_string(),
            headcount: 5,
            main_role: "新規開拓".to_string(),
        }];
        prev.current_analysis.readiness = Readiness::Ready;
        let extracted = CurrentAnalysis {
            team_composition: vec![TeamMember {
                department: "開発部".to_string(),
                headcount: 2,
                main_role: "保守".to_string(),
            }],
            readiness: Readiness::NotReady,
            ..CurrentAnalysis::default()
        };
        let merged = merge_step2(&prev, extracted, "", Origin::Ai, now()).template;
        assert_eq!(merged.current_analysis.team_composition.len(), 1);
        assert_eq!(merged.current_analysis.team_composition[0].department, "営業部");
        assert_eq!(merged.current_analysis.readiness, Readiness::Ready);
    }

    #[test]
    fn test_step3_empty_selection_does_not_complete() {
        let merged = merge_step3(
            &Template::empty(),
            ProjectDesign {
                challenge_summary: "属人化".to_string(),
                ..ProjectDesign::default()
            },
            &Step3Input::default(),
            Origin::Ai,
            now(),
        );
        assert!(!merged.completed);
        assert!(!merged.template.metadata.step3_completed);
        assert_eq!(merged.template.project_design.challenge_summary, "属人化");
        assert_eq!(merged.template.metadata.analysis_history.len(), 1);
    }

    #[test]
    fn test_step3_selection_replaces_previous() {
        let mut prev = Template::empty();
        prev.metadata.selected_business_items = vec![item("旧メニュー", 10)];
        let input = Step3Input {
            selected_business_items: vec![item("KPI設計", 20), item("KPI設計", 20), item("研修", 10)],
            notes: String::new(),
            talent_count: Some(2),
        };
        let merged = merge_step3(&prev, ProjectDesign::default(), &input, Origin::Ai, now());
        assert!(merged.completed);
        let m = &merged.template.metadata;
        assert!(m.step3_completed);
        assert_eq!(m.selected_business_items.len(), 2);
        assert_eq!(m.selected_business_items[0].title, "KPI設計");
        assert_eq!(m.actual_working_hours, Some(30));
        assert_eq!(m.talent_count, Some(2));
        assert_eq!(
            merged.template.project_design.working_hours,
            WorkingHours::From20To40
        );
    }

    #[test]
    fn test_step3_reselection_recomputes_hours() {
        let first = Step3Input {
            selected_business_items: vec![item("A", 10)],
            ..Step3Input::default()
        };
        let t = merge_step3(&Template::empty(), ProjectDesign::default(), &first, Origin::Ai, now())
            .template;
        assert_eq!(t.metadata.actual_working_hours, Some(10));
        assert_eq!(t.project_design.working_hours, WorkingHours::Under20);

        let second = Step3Input {
            selected_business_items: vec![item("B", 60), item("C", 40)],
            ..Step3Input::default()
        };
        let t = merge_step3(&t, ProjectDesign::default(), &second, Origin::Ai, now()).template;
        assert_eq!(t.metadata.actual_working_hours, Some(100));
        assert_eq!(t.project_design.working_hours, WorkingHours::Over80);
    }

    #[test]
    fn test_step3_keeps_hand_set_hours() {
        let mut prev = Template::empty();
        prev.metadata.selected_business_items = vec![item("A", 10)];
        prev.metadata.actual_working_hours = Some(50);
        prev.project_design.working_hours = WorkingHours::From20To40;
        let input = Step3Input {
            selected_business_items: vec![item("B", 60)],
            ..Step3Input::default()
        };
        let t = merge_step3(&prev, ProjectDesign::default(), &input, Origin::Ai, now()).template;
        assert_eq!(t.metadata.actual_working_hours, Some(50));
        assert_eq!(t.project_design.working_hours, WorkingHours::From20To40);
    }

    #[test]
    fn test_step3_budget_total_is_derived() {
        let extracted = ProjectDesign {
            budget: Budget {
                monthly_budget: 500_000,
                duration: 6,
                total_budget: 0,
            },
            ..ProjectDesign::default()
        };
        let input = Step3Input {
            selected_business_items: vec![item("KPI設計", 20)],
            ..Step3Input::default()
        };
        let merged = merge_step3(&Template::empty(), extracted, &input, Origin::Ai, now());
        assert_eq!(merged.template.project_design.budget.total_budget, 3_000_000);
    }

    #[test]
    fn test_step3_phases_and_lists() {
        let mut prev = Template::empty();
        prev.project_design.deliverables = vec!["設計書".to_string()];
        let extracted = ProjectDesign {
            deliverables: vec!["設計書".to_string(), "ダッシュボード".to_string()],
            phases: vec![Phase {
                name: "現状把握".to_string(),
                ..Phase::default()
            }],
            ..ProjectDesign::default()
        };
        let input = Step3Input {
            selected_business_items: vec![item("KPI設計", 20)],
            ..Step3Input::default()
        };
        let merged = merge_step3(&prev, extracted, &input, Origin::Ai, now()).template;
        assert_eq!(merged.project_design.deliverables, vec!["設計書", "ダッシュボード"]);
        assert_eq!(merged.project_design.phases.len(), 1);
    }

    #[test]
    fn test_step4_replaces_proposal() {
        let draft = ProposalDraft {
            tabs: vec![ProposalTab {
                title: "企業概要".to_string(),
                body: "本文".to_string(),
            }],
            generated_at: Some(now()),
        };
        let merged = merge_step4(&Template::empty(), draft.clone(), now());
        assert!(merged.completed);
        assert!(merged.template.metadata.step4_completed);
        assert_eq!(merged.template.proposal, draft);
        assert_eq!(
            merged.template.metadata.analysis_history[0].analysis_type,
            AnalysisType::Render
        );
    }
}
