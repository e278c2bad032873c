//! Step 4: renders the accumulated template into a five-tab proposal draft.
//!
//! Rendering is deterministic: the same template and timestamp always produce the same draft.
//! Empty fields render as a placeholder line rather than being dropped, so reviewers see what
//! is still missing.

use chrono::{DateTime, Utc};

use crate::template::merge::dedup_by_value;
use crate::template::models::{ProposalDraft, ProposalTab, Template, INSUFFICIENT_INFO};

pub const TAB_TITLES: [&str; 5] = ["企業概要", "現状分析", "課題と目標", "実施計画", "体制と費用"];

fn text_or_placeholder(value: &str) -> &str {
    let trimmed = value.trim();
    if trimmed.is_empty() || trimmed.contains(INSUFFICIENT_INFO) {
        "（未記入）"
    } else {
        trimmed
    }
}

fn bullets(items: &[String]) -> String {
    let items: Vec<&str> = dedup_by_value(
        items
            .iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .collect(),
    );
    if items.is_empty() {
        return "- （未記入）".to_string();
    }
    items
        .iter()
        .map(|s| format!("- {s}"))
        .collect::<Vec<_>>()
        .join("\n")
}

fn yen(amount: u64) -> String {
    if amount == 0 {
        return "（未定）".to_string();
    }
    let digits = amount.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    format!("{out}円")
}

fn company_tab(t: &Template) -> String {
    let p = &t.company_profile;
    let r = &t.research_data;
    let established = p
        .established_year
        .map(|y| format!("{y}年"))
        .unwrap_or_else(|| "（未記入）".to_string());
    let listed = match p.is_listed {
        Some(true) => "上場",
        Some(false) => "非上場",
        None => "（未記入）",
    };
    format!(
        "## 企業概要\n\n\
         - 企業名：{}\n\
         - 業界：{}\n\
         - 従業員数：{}\n\
         - 売上規模：{}\n\
         - 本社所在地：{}\n\
         - 設立：{}\n\
         - 上場区分：{}\n\n\
         ### 事業内容\n{}\n\n\
         ### 主要顧客\n{}\n\n\
         ### 仮説\n{}",
        text_or_placeholder(&p.name),
        text_or_placeholder(&dedup_by_value(p.industry.clone()).join("、")),
        p.employee_count.label(),
        p.revenue.label(),
        text_or_placeholder(&p.headquarters),
        established,
        listed,
        text_or_placeholder(&p.business_description),
        text_or_placeholder(&p.customer_description),
        text_or_placeholder(&r.hypothesis),
    )
}

fn analysis_tab(t: &Template) -> String {
    let a = &t.current_analysis;
    let team = if a.team_composition.is_empty() {
        "- （未記入）".to_string()
    } else {
        dedup_by_value(a.team_composition.iter().collect::<Vec<_>>())
            .iter()
            .map(|m| {
                format!(
                    "- {}：{}名（{}）",
                    m.department,
                    m.headcount,
                    text_or_placeholder(&m.main_role)
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    };
    format!(
        "## 現状分析\n\n\
         - 事業フェーズ：{}\n\
         - 外部人材活用経験：{}\n\
         - 受け入れ体制：{}\n\
         - 意思決定プロセス：{}\n\n\
         ### 課題カテゴリ\n{}\n\n\
         ### これまでの取り組み\n{}\n\n\
         ### チーム構成\n{}\n\n\
         ### 不足スキル\n{}\n\n\
         ### 導入障壁\n{}",
        a.business_phase.label(),
        a.external_talent_experience.label(),
        a.readiness.label(),
        a.decision_process.label(),
        bullets(&a.challenge_categories),
        text_or_placeholder(&a.previous_efforts),
        team,
        bullets(&a.missing_skills),
        bullets(&a.barriers),
    )
}

fn goals_tab(t: &Template) -> String {
    let d = &t.project_design;
    format!(
        "## 課題と目標\n\n\
         ### 課題サマリー\n{}\n\n\
         ### 今取り組むべき理由\n{}\n\n\
         ### 放置した場合のリスク\n{}\n\n\
         ### 3ヶ月後の状態\n{}\n\n\
         ### 定量指標\n{}\n\n\
         ### 定性指標\n{}",
        text_or_placeholder(&d.challenge_summary),
        text_or_placeholder(&d.urgency_reason),
        text_or_placeholder(&d.risk_if_ignored),
        text_or_placeholder(&d.target_state),
        bullets(&d.success_metrics.quantitative),
        bullets(&d.success_metrics.qualitative),
    )
}

fn plan_tab(t: &Template) -> String {
    let d = &t.project_design;
    let phases = if d.phases.is_empty() {
        "（未記入）".to_string()
    } else {
        d.phases
            .iter()
            .enumerate()
            .map(|(i, phase)| {
                format!(
                    "### フェーズ{}：{}（{}）\nゴール：{}\n{}",
                    i + 1,
                    phase.name,
                    text_or_placeholder(&phase.period),
                    text_or_placeholder(&phase.goal),
                    bullets(&phase.main_activities),
                )
            })
            .collect::<Vec<_>>()
            .join("\n\n")
    };
    format!(
        "## 実施計画\n\n\
         {}\n\n\
         ### 対象範囲\n{}\n\n\
         ### 対象外\n{}\n\n\
         ### 成果物\n{}",
        phases,
        bullets(&d.scope.included),
        bullets(&d.scope.excluded),
        bullets(&d.deliverables),
    )
}

fn team_and_cost_tab(t: &Template) -> String {
    let d = &t.project_design;
    let m = &t.metadata;
    let items = if m.selected_business_items.is_empty() {
        "- （未選択）".to_string()
    } else {
        m.selected_business_items
            .iter()
            .map(|item| format!("- {}（{}、月{}時間）", item.title, item.category, item.working_hours))
            .collect::<Vec<_>>()
            .join("\n")
    };
    let actual_hours = m
        .actual_working_hours
        .map(|h| format!("月{h}時間"))
        .unwrap_or_else(|| d.working_hours.label().to_string());
    let talent = m
        .talent_count
        .map(|n| format!("{n}名"))
        .unwrap_or_else(|| "（未定）".to_string());
    let duration = if d.budget.duration == 0 {
        "（未定）".to_string()
    } else {
        format!("{}ヶ月", d.budget.duration)
    };
    format!(
        "## 体制と費用\n\n\
         ### 業務メニュー\n{}\n\n\
         - 想定稼働：{}\n\
         - 人材数：{}\n\
         - 月額費用：{}\n\
         - 契約期間：{}\n\
         - 総額：{}",
        items,
        actual_hours,
        talent,
        yen(d.budget.monthly_budget),
        duration,
        yen(d.budget.total_budget),
    )
}

pub fn render_proposal(template: &Template, now: DateTime<Utc>) -> ProposalDraft {
    let bodies = [
        company_tab(template),
        analysis_tab(template),
        goals_tab(template),
        plan_tab(template),
        team_and_cost_tab(template),
    ];
    ProposalDraft {
        tabs: TAB_TITLES
            .iter()
            .zip(bodies)
            .map(|(title, body)| ProposalTab {
                title: title.to_string(),
                body,
            })
            .collect(),
        generated_at: Some(now),
    }
}

/// Single markdown document for export. Tab bodies already open with their own heading.
pub fn proposal_markdown(draft: &ProposalDraft, company_name: &str) -> String {
    let title = if company_name.trim().is_empty() {
        "# ご提案書".to_string()
    } else {
        format!("# {} 様 ご提案書", company_name.trim())
    };
    let mut out = vec![title];
    if let Some(at) = draft.generated_at {
        out.push(format!("作成日：{}", at.format("%Y-%m-%d")));
    }
    out.extend(draft.tabs.iter().map(|tab| tab.body.clone()));
    out.join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::models::{BusinessItem, EmployeeCount, Phase};
    use chrono::TimeZone;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 4, 1, 9, 0, 0).unwrap()
    }

    fn sample() -> Template {
        let mut t = Template::empty();
        t.company_profile.name = "株式会社テスト".to_string();
        t.company_profile.industry = vec!["IT".to_string(), "IT".to_string()];
        t.company_profile.employee_count = EmployeeCount::UpTo50;
        t.project_design.phases = vec![Phase {
            name: "現状把握".to_string(),
            period: "1ヶ月目".to_string(),
            goal: "課題の明確化".to_string(),
            main_activities: vec!["ヒアリング".to_string()],
        }];
        t.project_design.budget.monthly_budget = 500_000;
        t.project_design.budget.duration = 3;
        t.project_design.budget.total_budget = 1_500_000;
        t.metadata.selected_business_items = vec![BusinessItem {
            category: "営業".to_string(),
            phase: "設計".to_string(),
            title: "KPI設計".to_string(),
            working_hours: 20,
        }];
        t
    }

    #[test]
    fn test_render_has_five_tabs_in_order() {
        let draft = render_proposal(&sample(), fixed_now());
        let titles: Vec<&str> = draft.tabs.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, TAB_TITLES);
        assert_eq!(draft.generated_at, Some(fixed_now()));
    }

    #[test]
    fn test_render_is_deterministic() {
        assert_eq!(
            render_proposal(&sample(), fixed_now()),
            render_proposal(&sample(), fixed_now())
        );
    }

    #[test]
    fn test_render_content() {
        let draft = render_proposal(&sample(), fixed_now());
        assert!(draft.tabs[0].body.contains("企業名：株式会社テスト"));
        assert!(draft.tabs[0].body.contains("業界：IT\n"));
        assert!(draft.tabs[0].body.contains("従業員数：11-50名"));
        assert!(draft.tabs[3].body.contains("### フェーズ1：現状把握（1ヶ月目）"));
        assert!(draft.tabs[4].body.contains("月額費用：500,000円"));
        assert!(draft.tabs[4].body.contains("総額：1,500,000円"));
        assert!(draft.tabs[4].body.contains("- KPI設計（営業、月20時間）"));
    }

    #[test]
    fn test_empty_template_renders_placeholders() {
        let draft = render_proposal(&Template::empty(), fixed_now());
        assert_eq!(draft.tabs.len(), 5);
        assert!(draft.tabs[0].body.contains("企業名：（未記入）"));
        assert!(draft.tabs[4].body.contains("- （未選択）"));
        assert!(draft.tabs[4].body.contains("月額費用：（未定）"));
    }

    #[test]
    fn test_bullets_dedup_and_skip_blanks() {
        let items = vec!["A".to_string(), " ".to_string(), "A".to_string(), "B".to_string()];
        assert_eq!(bullets(&items), "- A\n- B");
    }

    #[test]
    fn test_yen_grouping() {
        assert_eq!(yen(1_234_567), "1,234,567円");
        assert_eq!(yen(500), "500円");
        assert_eq!(yen(0), "（未定）");
    }

    #[test]
    fn test_markdown_export() {
        let draft = render_proposal(&sample(), fixed_now());
        let md = proposal_markdown(&draft, "株式会社テスト");
        assert!(md.starts_with("# 株式会社テスト 様 ご提案書\n\n作成日：2026-04-01"));
        assert!(md.contains("## 体制と費用"));
        assert_eq!(proposal_markdown(&ProposalDraft::default(), ""), "# ご提案書");
    }
}
