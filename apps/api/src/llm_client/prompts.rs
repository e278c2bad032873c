// Shared prompt fragments. Each workflow step builds its own prompt in workflow/prompts.rs;
// this file holds the cross-cutting pieces every step reuses.

use crate::template::models::INSUFFICIENT_INFO;

/// System prompt enforcing the labelled plain-text answer format the extractors parse.
pub const LABELED_OUTPUT_SYSTEM: &str = "あなたは法人向け提案書の作成を支援するコンサルタントです。\
    回答は指定されたラベル付きの形式（「ラベル：値」を1行に1つ）のみで出力してください。\
    前置き、説明、謝罪、Markdownのコードブロックは含めないでください。";

/// Instruction telling the model how to mark fields it cannot support from the input.
pub fn insufficient_info_instruction() -> String {
    format!(
        "入力から判断できない項目は推測せず、値を「{INSUFFICIENT_INFO}」としてください。\
         選択肢が指定された項目は、必ず選択肢のいずれかを記載してください。"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insufficient_info_instruction_names_sentinel() {
        assert!(insufficient_info_instruction().contains(INSUFFICIENT_INFO));
    }
}
