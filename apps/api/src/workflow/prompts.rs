// Prompt templates for the four proposal steps.
// Reuses cross-cutting fragments from llm_client::prompts. Every label listed here must also
// appear in the matching rule table in template/rules.rs, otherwise the answer is not parsed.

use crate::llm_client::prompts::insufficient_info_instruction;
use crate::template::models::Template;
use crate::workflow::steps::Step3Input;

/// Step 1 prompt. Replace: {insufficient_info}, {memo}
pub const STEP1_PROMPT_TEMPLATE: &str = r#"以下の企業調査メモを読み、企業情報を整理してください。

{insufficient_info}

出力形式（この形式以外は出力しない）：
企業名：（正式名称）
業界：（カンマ区切り、最大3件）
従業員数：（1-10 / 11-50 / 51-100 / 101-300 / 301-1000 / 1001以上 のいずれか）
売上規模：（1億未満 / 1-10億 / 10-100億 / 100億以上 のいずれか）
本社所在地：
設立年：（西暦4桁）
上場区分：（上場 / 非上場）
事業内容：
主要顧客：
最近のニュース：
組織文化：
仮説：（この企業が抱えていそうな課題の仮説）
確認事項：（面談で確認すべき事項、カンマ区切り、最大5件）

企業調査メモ：
{memo}"#;

/// Step 2 prompt. Replace: {insufficient_info}, {company}, {situation}
pub const STEP2_PROMPT_TEMPLATE: &str = r#"以下の企業情報とヒアリング内容から、現状分析を行ってください。

{insufficient_info}

出力形式（この形式以外は出力しない）：
事業フェーズ：（創業 / 成長 / 拡大 / 成熟 のいずれか）
課題カテゴリ：（カンマ区切り、最大5件）
過去の取り組み：
うまくいかなかった理由：
不足スキル：（カンマ区切り、最大5件）
外部人材活用経験：（なし / あり / 豊富 のいずれか）
受け入れ体制：（整っている / 一部 / 未整備 のいずれか）
受け入れ体制詳細：
意思決定プロセス：（トップダウン / 合議 / 稟議 のいずれか）
導入障壁：（カンマ区切り、最大5件）

【チーム構成】
（1行に1部署、「部署名 | 人数 | 主な役割」の形式）

企業情報：
{company}

ヒアリング内容：
{situation}"#;

/// Step 3 prompt. Replace: {insufficient_info}, {company}, {analysis}, {items}, {notes}
pub const STEP3_PROMPT_TEMPLATE: &str = r#"以下の情報をもとに、3ヶ月間のプロジェクトを設計してください。

{insufficient_info}

出力形式（この形式以外は出力しない）：
課題サマリー：
緊急性：（今取り組むべき理由）
放置した場合のリスク：
3ヶ月後の状態：
定量指標：（カンマ区切り、最大5件）
定性指標：（カンマ区切り、最大5件）
成果物：（カンマ区切り、最大5件）
対象範囲：（カンマ区切り）
対象外：（カンマ区切り）
稼働時間：（20時間未満 / 20-40 / 40-80 / 80時間以上 のいずれか、月あたり）
月額予算：（例：50万円）
契約期間：（月数）
総予算：（分かる場合のみ）

【実施フェーズ】
（1行に1フェーズ、「フェーズ1：名称 | 期間 | ゴール | 主な活動（カンマ区切り）」の形式）

企業情報：
{company}

現状分析：
{analysis}

選択された業務メニュー：
{items}

補足事項：
{notes}"#;

fn or_none(value: &str) -> &str {
    if value.trim().is_empty() {
        "（なし）"
    } else {
        value
    }
}

fn company_context(template: &Template) -> String {
    let p = &template.company_profile;
    format!(
        "企業名：{}\n業界：{}\n従業員数：{}\n事業内容：{}",
        or_none(&p.name),
        or_none(&p.industry.join("、")),
        p.employee_count.label(),
        or_none(&p.business_description),
    )
}

fn analysis_context(template: &Template) -> String {
    let a = &template.current_analysis;
    format!(
        "事業フェーズ：{}\n課題カテゴリ：{}\n不足スキル：{}\n受け入れ体制：{}",
        a.business_phase.label(),
        or_none(&a.challenge_categories.join("、")),
        or_none(&a.missing_skills.join("、")),
        a.readiness.label(),
    )
}

pub fn build_step1_prompt(memo: &str) -> String {
    STEP1_PROMPT_TEMPLATE
        .replace("{insufficient_info}", &insufficient_info_instruction())
        .replace("{memo}", or_none(memo))
}

pub fn build_step2_prompt(template: &Template, situation: &str) -> String {
    STEP2_PROMPT_TEMPLATE
        .replace("{insufficient_info}", &insufficient_info_instruction())
        .replace("{company}", &company_context(template))
        .replace("{situation}", or_none(situation))
}

pub fn build_step3_prompt(template: &Template, input: &Step3Input) -> String {
    let items = input
        .selected_business_items
        .iter()
        .map(|item| {
            format!(
                "- {}（{} / {}、月{}時間）",
                item.title, item.category, item.phase, item.working_hours
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    STEP3_PROMPT_TEMPLATE
        .replace("{insufficient_info}", &insufficient_info_instruction())
        .replace("{company}", &company_context(template))
        .replace("{analysis}", &analysis_context(template))
        .replace("{items}", or_none(&items))
        .replace("{notes}", or_none(&input.notes))
}
