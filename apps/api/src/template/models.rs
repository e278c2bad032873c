use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Phrase the generator emits when it has nothing reliable to say about a field.
/// Extractors normalise any value carrying it to the empty/unknown representation.
pub const INSUFFICIENT_INFO: &str = "情報不足";

/// Wire value shared by every enumeration's "unknown" variant.
pub const UNKNOWN: &str = "unknown";

pub const TEMPLATE_VERSION: &str = "1.0.0";

/// Enumerations with an explicit "unknown" state distinct from an empty string.
pub trait Sentinel {
    fn is_unknown(&self) -> bool;
}

macro_rules! impl_sentinel {
    ($($ty:ident),* $(,)?) => {
        $(
            impl Sentinel for $ty {
                fn is_unknown(&self) -> bool {
                    matches!(self, $ty::Unknown)
                }
            }
        )*
    };
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum EmployeeCount {
    #[serde(rename = "1-10")]
    UpTo10,
    #[serde(rename = "11-50")]
    UpTo50,
    #[serde(rename = "51-100")]
    UpTo100,
    #[serde(rename = "101-300")]
    UpTo300,
    #[serde(rename = "301-1000")]
    UpTo1000,
    #[serde(rename = "1001+")]
    Over1000,
    #[default]
    #[serde(rename = "unknown")]
    Unknown,
}

impl EmployeeCount {
    /// Buckets a concrete head count.
    pub fn from_headcount(count: u64) -> Self {
        match count {
            0 => EmployeeCount::Unknown,
            1..=10 => EmployeeCount::UpTo10,
            11..=50 => EmployeeCount::UpTo50,
            51..=100 => EmployeeCount::UpTo100,
            101..=300 => EmployeeCount::UpTo300,
            301..=1000 => EmployeeCount::UpTo1000,
            _ => EmployeeCount::Over1000,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            EmployeeCount::UpTo10 => "1-10名",
            EmployeeCount::UpTo50 => "11-50名",
            EmployeeCount::UpTo100 => "51-100名",
            EmployeeCount::UpTo300 => "101-300名",
            EmployeeCount::UpTo1000 => "301-1000名",
            EmployeeCount::Over1000 => "1001名以上",
            EmployeeCount::Unknown => "不明",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RevenueScale {
    #[serde(rename = "under_100m")]
    Under100M,
    #[serde(rename = "100m-1b")]
    UpTo1B,
    #[serde(rename = "1b-10b")]
    UpTo10B,
    #[serde(rename = "10b+")]
    Over10B,
    #[default]
    #[serde(rename = "unknown")]
    Unknown,
}

impl RevenueScale {
    pub fn label(&self) -> &'static str {
        match self {
            RevenueScale::Under100M => "1億円未満",
            RevenueScale::UpTo1B => "1-10億円",
            RevenueScale::UpTo10B => "10-100億円",
            RevenueScale::Over10B => "100億円以上",
            RevenueScale::Unknown => "不明",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BusinessPhase {
    Startup,
    Growth,
    Expansion,
    Mature,
    #[default]
    Unknown,
}

impl BusinessPhase {
    pub fn label(&self) -> &'static str {
        match self {
            BusinessPhase::Startup => "創業期",
            BusinessPhase::Growth => "成長期",
            BusinessPhase::Expansion => "拡大期",
            BusinessPhase::Mature => "成熟期",
            BusinessPhase::Unknown => "不明",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TalentExperience {
    #[serde(rename = "none")]
    NoExperience,
    #[serde(rename = "some")]
    Limited,
    Extensive,
    #[default]
    Unknown,
}

impl TalentExperience {
    pub fn label(&self) -> &'static str {
        match self {
            TalentExperience::NoExperience => "活用経験なし",
            TalentExperience::Limited => "一部活用経験あり",
            TalentExperience::Extensive => "豊富な活用経験あり",
            TalentExperience::Unknown => "不明",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Readiness {
    Ready,
    Partial,
    NotReady,
    #[default]
    Unknown,
}

impl Readiness {
    pub fn label(&self) -> &'static str {
        match self {
            Readiness::Ready => "受け入れ体制あり",
            Readiness::Partial => "一部整備済み",
            Readiness::NotReady => "未整備",
            Readiness::Unknown => "不明",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionProcess {
    TopDown,
    Consensus,
    ApprovalChain,
    #[default]
    Unknown,
}

impl DecisionProcess {
    pub fn label(&self) -> &'static str {
        match self {
            DecisionProcess::TopDown => "トップダウン",
            DecisionProcess::Consensus => "合議制",
            DecisionProcess::ApprovalChain => "稟議制",
            DecisionProcess::Unknown => "不明",
        }
    }
}

/// Monthly working-hours bucket for the engagement.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum WorkingHours {
    #[serde(rename = "under_20")]
    Under20,
    #[serde(rename = "20_40")]
    From20To40,
    #[serde(rename = "40_80")]
    From40To80,
    #[serde(rename = "80_plus")]
    Over80,
    #[default]
    #[serde(rename = "unknown")]
    Unknown,
}

impl WorkingHours {
    pub fn from_hours(hours: u32) -> Self {
        match hours {
            0 => WorkingHours::Unknown,
            1..=19 => WorkingHours::Under20,
            20..=39 => WorkingHours::From20To40,
            40..=79 => WorkingHours::From40To80,
            _ => WorkingHours::Over80,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            WorkingHours::Under20 => "月20時間未満",
            WorkingHours::From20To40 => "月20-40時間",
            WorkingHours::From40To80 => "月40-80時間",
            WorkingHours::Over80 => "月80時間以上",
            WorkingHours::Unknown => "未定",
        }
    }
}

impl_sentinel!(
    EmployeeCount,
    RevenueScale,
    BusinessPhase,
    TalentExperience,
    Readiness,
    DecisionProcess,
    WorkingHours,
);

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CompanyProfile {
    pub name: String,
    pub industry: Vec<String>,
    pub employee_count: EmployeeCount,
    pub revenue: RevenueScale,
    pub headquarters: String,
    pub established_year: Option<i32>,
    pub is_listed: Option<bool>,
    pub business_description: String,
    pub customer_description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ResearchData {
    /// Verbatim user input. Written only from the user's own memo.
    pub deep_research_memo: String,
    pub recent_news: String,
    pub organization_culture: String,
    pub hypothesis: String,
    pub meeting_checkpoints: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TeamMember {
    pub department: String,
    pub headcount: u32,
    pub main_role: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CurrentAnalysis {
    pub business_phase: BusinessPhase,
    pub challenge_categories: Vec<String>,
    pub previous_efforts: String,
    pub failure_reasons: String,
    pub team_composition: Vec<TeamMember>,
    pub missing_skills: Vec<String>,
    pub external_talent_experience: TalentExperience,
    pub readiness: Readiness,
    pub readiness_detail: String,
    pub decision_process: DecisionProcess,
    pub barriers: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SuccessMetrics {
    pub quantitative: Vec<String>,
    pub qualitative: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Scope {
    pub included: Vec<String>,
    pub excluded: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Phase {
    pub name: String,
    pub period: String,
    pub goal: String,
    pub main_activities: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Budget {
    /// Yen per month.
    pub monthly_budget: u64,
    /// Months.
    pub duration: u64,
    pub total_budget: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProjectDesign {
    pub challenge_summary: String,
    pub urgency_reason: String,
    pub risk_if_ignored: String,
    /// Target state three months in.
    pub target_state: String,
    pub success_metrics: SuccessMetrics,
    pub deliverables: Vec<String>,
    pub scope: Scope,
    pub phases: Vec<Phase>,
    pub working_hours: WorkingHours,
    pub budget: Budget,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BusinessItem {
    pub category: String,
    pub phase: String,
    pub title: String,
    pub working_hours: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisType {
    Ai,
    Fallback,
    Render,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRecord {
    pub step: u8,
    pub timestamp: DateTime<Utc>,
    pub analysis_type: AnalysisType,
    #[serde(default)]
    pub input_data: Value,
    #[serde(default)]
    pub output_data: Value,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProposalTab {
    pub title: String,
    pub body: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProposalDraft {
    pub tabs: Vec<ProposalTab>,
    pub generated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Metadata {
    pub step1_completed: bool,
    pub step2_completed: bool,
    pub step3_completed: bool,
    pub step4_completed: bool,
    pub selected_business_items: Vec<BusinessItem>,
    pub analysis_history: Vec<AnalysisRecord>,
    /// Steps whose latest content came from the offline fallback generator.
    pub fallback_steps: Vec<u8>,
    pub last_updated: Option<DateTime<Utc>>,
    pub version: String,
    pub actual_working_hours: Option<u32>,
    pub talent_count: Option<u32>,
}

impl Default for Metadata {
    fn default() -> Self {
        Self {
            step1_completed: false,
            step2_completed: false,
            step3_completed: false,
            step4_completed: false,
            selected_business_items: Vec::new(),
            analysis_history: Vec::new(),
            fallback_steps: Vec::new(),
            last_updated: None,
            version: TEMPLATE_VERSION.to_string(),
            actual_working_hours: None,
            talent_count: None,
        }
    }
}

impl Metadata {
    pub fn step_completed(&self, step: u8) -> bool {
        match step {
            1 => self.step1_completed,
            2 => self.step2_completed,
            3 => self.step3_completed,
            4 => self.step4_completed,
            _ => false,
        }
    }

    /// Flags only ever move false -> true.
    pub fn mark_step_completed(&mut self, step: u8) {
        match step {
            1 => self.step1_completed = true,
            2 => self.step2_completed = true,
            3 => self.step3_completed = true,
            4 => self.step4_completed = true,
            _ => {}
        }
    }
}

/// The single record accumulating everything known about one engagement.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Template {
    pub company_profile: CompanyProfile,
    pub research_data: ResearchData,
    pub current_analysis: CurrentAnalysis,
    pub project_design: ProjectDesign,
    pub proposal: ProposalDraft,
    pub metadata: Metadata,
}

/// Top-level JSON keys of [`Template`], in display order.
pub const SECTIONS: &[&str] = &[
    "companyProfile",
    "researchData",
    "currentAnalysis",
    "projectDesign",
    "proposal",
    "metadata",
];

impl Template {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.metadata.last_updated = Some(now);
    }
}
