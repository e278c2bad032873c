//! Field Extractors: label-anchored pattern search over generated or user-supplied text.
//!
//! Every function here is total: a miss is `None`, an empty list, or the enum's unknown
//! variant. Nothing panics and nothing guesses past the documented heuristics.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::template::models::INSUFFICIENT_INFO;

/// Pieces longer than this are treated as prose, not list items.
pub const MAX_LIST_ITEM_CHARS: usize = 100;

/// Delimiters that always separate list items.
const LIST_DELIMITERS: &[char] = &[',', '、', '，', '\n', '・', '•', '/', '／', ';', '；'];

/// Markers stripped from the start of each list item.
const BULLET_MARKERS: &[char] = &['-', '*', '＊', '・', '•', '●', '○', '■', '□', '―', 'ー'];

static YEAR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d{4}").expect("static regex"));
static INTEGER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d[\d,]*(?:\.\d+)?").expect("static regex"));
static HEADCOUNT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:従業員|社員|スタッフ|employees?)[^\d\n]{0,12}(\d[\d,]*)|(\d[\d,]*)\s*(?:名|人|employees)")
        .expect("static regex")
});
static AMOUNT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\d[\d,]*(?:\.\d+)?)\s*(億|千万|百万|万|千)?").expect("static regex")
});

/// Japanese legal-entity forms, prefix and suffix placement, plus common English forms.
static LEGAL_ENTITY_RES: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"[^\s、。,，「」『』（）()：:はがを]{1,30}(?:株式会社|有限会社|合同会社|合資会社|合名会社)",
        r"(?:株式会社|有限会社|合同会社|合資会社|合名会社|\(株\)|（株）)[^\s、。,，「」『』（）()：:はがを]{1,30}",
        r"[A-Z][A-Za-z0-9&.\-]*(?: [A-Z][A-Za-z0-9&.\-]*){0,4},? (?:Inc\.|Co\., ?Ltd\.|Ltd\.|LLC|Corporation|Corp\.)",
    ]
    .iter()
    .filter_map(|p| Regex::new(p).ok())
    .collect()
});

/// Keyword table for offline industry detection. Needles are matched case-insensitively.
const INDUSTRY_KEYWORDS: &[(&str, &[&str])] = &[
    (
        "IT",
        &[
            "ソフトウェア",
            "software",
            "saas",
            "システム開発",
            "クラウド",
            "cloud",
            "アプリ",
            "it企業",
            "itサービス",
            "情報通信",
            "dx支援",
        ],
    ),
    ("EC", &["ecサイト", "ec事業", "通販", "eコマース", "e-commerce", "オンラインショップ"]),
    ("製造", &["製造", "メーカー", "工場", "manufactur"]),
    ("小売", &["小売", "店舗", "retail"]),
    ("金融", &["金融", "銀行", "保険", "証券", "fintech", "bank"]),
    ("医療・ヘルスケア", &["医療", "病院", "クリニック", "ヘルスケア", "介護", "healthcare"]),
    ("不動産", &["不動産", "real estate"]),
    ("建設", &["建設", "建築", "工務店", "construction"]),
    ("物流", &["物流", "運送", "倉庫", "logistics"]),
    ("飲食", &["飲食", "レストラン", "カフェ", "restaurant"]),
    ("教育", &["教育", "学習", "スクール", "education"]),
    ("人材", &["人材", "採用支援", "派遣", "recruit"]),
    ("広告・マーケティング", &["広告", "マーケティング支援", "advertising"]),
    ("コンサルティング", &["コンサル", "consulting"]),
];

pub const DEFAULT_INDUSTRY: &str = "その他";
pub const MAX_DETECTED_INDUSTRIES: usize = 3;

/// Converts full-width digits to ASCII so numeric patterns see one alphabet.
pub fn normalize_digits(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '０'..='９' => char::from_u32(c as u32 - '０' as u32 + '0' as u32).unwrap_or(c),
            '，' => ',',
            '．' => '.',
            _ => c,
        })
        .collect()
}

/// True when the value is the generator's "insufficient information" marker.
pub fn signals_insufficient(value: &str) -> bool {
    value.contains(INSUFFICIENT_INFO)
}

fn label_regex(label: &str) -> Option<Regex> {
    // `label`, optional markdown emphasis, then a half- or full-width colon.
    Regex::new(&format!(
        r"(?i){}[ \t*＊]*[:：][ \t]*([^\r\n]*)",
        regex::escape(label)
    ))
    .ok()
}

/// Position and raw (trimmed, unnormalised) value of the first `label:` occurrence.
fn find_label(text: &str, label: &str) -> Option<(usize, String)> {
    let re = label_regex(label)?;
    let caps = re.captures(text)?;
    let whole = caps.get(0)?;
    let value = caps
        .get(1)
        .map(|m| m.as_str())
        .unwrap_or_default()
        .trim()
        .trim_matches(|c: char| c == '*' || c == '＊')
        .trim();
    Some((whole.start(), value.to_string()))
}

/// Resolves the earliest match across `labels`. Sentinel and empty values are misses.
pub fn labeled_value_any(text: &str, labels: &[&str]) -> Option<String> {
    let (_, value) = labels
        .iter()
        .filter_map(|label| find_label(text, label))
        .min_by_key(|(pos, _)| *pos)?;
    if value.is_empty() || signals_insufficient(&value) {
        None
    } else {
        Some(value)
    }
}

/// True when any of `labels` appears with a separator, whatever its value.
pub fn contains_label(text: &str, labels: &[&str]) -> bool {
    labels.iter().any(|label| find_label(text, label).is_some())
}

/// Text strictly between the first `start` marker and the next `end` marker (or end of text).
pub fn bounded_section<'a>(text: &'a str, start: &str, end: Option<&str>) -> Option<&'a str> {
    let begin = text.find(start)? + start.len();
    let rest = &text[begin..];
    match end.filter(|e| !e.is_empty()).and_then(|e| rest.find(e)) {
        Some(stop) => Some(&rest[..stop]),
        None => Some(rest),
    }
}

/// Section following a `【heading】` marker, up to the next `【`.
pub fn bracketed_section<'a>(text: &'a str, heading: &str) -> Option<&'a str> {
    let marker = format!("【{heading}】");
    bounded_section(text, &marker, Some("【"))
}

fn strip_bullet(piece: &str) -> &str {
    piece
        .trim()
        .trim_start_matches(|c: char| BULLET_MARKERS.contains(&c) || c.is_whitespace())
        .trim()
}

/// Splits a value into list items, preserving encounter order.
pub fn split_list(value: &str, cap: usize) -> Vec<String> {
    let mut items: Vec<String> = Vec::new();
    for piece in value.split(|c: char| LIST_DELIMITERS.contains(&c)) {
        if items.len() >= cap {
            break;
        }
        let piece = strip_bullet(piece);
        if piece.is_empty()
            || piece.chars().count() > MAX_LIST_ITEM_CHARS
            || signals_insufficient(piece)
        {
            continue;
        }
        if !items.iter().any(|existing| existing == piece) {
            items.push(piece.to_string());
        }
    }
    items
}

pub fn list_value(text: &str, labels: &[&str], cap: usize) -> Vec<String> {
    labeled_value_any(text, labels)
        .map(|v| split_list(&v, cap))
        .unwrap_or_default()
}

/// Canonical value of the first needle (in table order) contained in `value`.
pub fn map_enum<T: Copy>(value: &str, table: &[(&str, T)]) -> Option<T> {
    if signals_insufficient(value) {
        return None;
    }
    let lowered = value.to_lowercase();
    table
        .iter()
        .find(|(needle, _)| lowered.contains(&needle.to_lowercase()))
        .map(|(_, canonical)| *canonical)
}

pub fn year_value(text: &str, labels: &[&str]) -> Option<i32> {
    let value = normalize_digits(&labeled_value_any(text, labels)?);
    YEAR_RE.find(&value)?.as_str().parse().ok()
}

/// `Some(false)` for a negative keyword, `Some(true)` for a positive one. Negatives are checked
/// first since they usually contain the positive word (`非上場` / `上場`).
pub fn bool_value(
    text: &str,
    labels: &[&str],
    positives: &[&str],
    negatives: &[&str],
) -> Option<bool> {
    let lowered = labeled_value_any(text, labels)?.to_lowercase();
    if negatives.iter().any(|n| lowered.contains(&n.to_lowercase())) {
        Some(false)
    } else if positives.iter().any(|p| lowered.contains(&p.to_lowercase())) {
        Some(true)
    } else {
        None
    }
}

/// First integer in the value (`6ヶ月` → 6, `1,200名` → 1200).
pub fn parse_count(value: &str) -> Option<u64> {
    let value = normalize_digits(value);
    let digits: String = INTEGER_RE
        .find(&value)?
        .as_str()
        .chars()
        .take_while(|c| *c != '.')
        .filter(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}

/// Yen amount with Japanese magnitude suffixes (`50万円` → 500000, `1.2億` → 120000000).
pub fn parse_amount(value: &str) -> Option<u64> {
    let value = normalize_digits(value);
    let caps = AMOUNT_RE.captures(&value)?;
    let number: f64 = caps.get(1)?.as_str().replace(',', "").parse().ok()?;
    let multiplier = match caps.get(2).map(|m| m.as_str()) {
        Some("億") => 100_000_000.0,
        Some("千万") => 10_000_000.0,
        Some("百万") => 1_000_000.0,
        Some("万") => 10_000.0,
        Some("千") => 1_000.0,
        _ => 1.0,
    };
    let amount = (number * multiplier).round();
    if amount.is_finite() && amount >= 0.0 {
        Some(amount as u64)
    } else {
        None
    }
}

/// Head count from free text (`従業員数 120名`, `約30人`), 0 when none is stated.
pub fn detect_headcount(text: &str) -> u64 {
    let text = normalize_digits(text);
    HEADCOUNT_RE
        .captures(&text)
        .and_then(|caps| caps.get(1).or_else(|| caps.get(2)))
        .and_then(|m| m.as_str().replace(',', "").parse().ok())
        .unwrap_or(0)
}

/// Earliest legal-entity-shaped name in the text.
pub fn detect_company_name(text: &str) -> Option<String> {
    LEGAL_ENTITY_RES
        .iter()
        .filter_map(|re| re.find(text))
        .min_by_key(|m| (m.start(), std::cmp::Reverse(m.end())))
        .map(|m| m.as_str().trim().to_string())
        .filter(|name| !signals_insufficient(name))
}

/// Keyword-table industry detection, capped and de-duplicated; `["その他"]` when nothing hits.
pub fn detect_industries(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    let mut found: Vec<String> = INDUSTRY_KEYWORDS
        .iter()
        .filter(|(_, needles)| needles.iter().any(|n| lowered.contains(n)))
        .map(|(category, _)| category.to_string())
        .take(MAX_DETECTED_INDUSTRIES)
        .collect();
    if found.is_empty() {
        found.push(DEFAULT_INDUSTRY.to_string());
    }
    found
}

/// Rows of a `|`-separated block, bullets stripped. Rows with fewer than `min_cells` cells are
/// skipped.
pub fn pipe_rows(section: &str, min_cells: usize) -> Vec<Vec<String>> {
    section
        .lines()
        .map(strip_bullet)
        .filter(|line| !line.is_empty())
        .map(|line| {
            line.split(['|', '｜'])
                .map(|cell| cell.trim().to_string())
                .collect::<Vec<_>>()
        })
        .filter(|cells| cells.len() >= min_cells && !cells.iter().all(|c| c.is_empty()))
        .collect()
}
