//! プロンプトの組み立て

use std::fmt::Write as _;

use super::TranslationRequest;
use crate::normalize::{
    CLOSE_SENTINEL,
    OPEN_SENTINEL,
};

/// system メッセージ
pub const SYSTEM_PROMPT: &str = "You are a professional translator with expertise in localization.";

/// user メッセージを組み立てる
///
/// 原文は `❮` と `❯` で囲み、訳文も同じ記号で囲んで返すよう指示する。
#[must_use]
pub fn build_prompt(request: &TranslationRequest<'_>) -> String {
    let mut prompt = format!(
        "Translate the following text from {source} to {target}.

IMPORTANT RULES:
1. Preserve ALL whitespace exactly as in the original text, including:
   - Leading spaces
   - Trailing spaces
   - Multiple consecutive spaces
   - Newlines
2. Keep ALL format specifiers exactly as they appear (e.g. %@, %lld, %1$@, etc.)
3. Do not add or remove any whitespace
4. Reply with ONLY the translated text wrapped in {OPEN_SENTINEL} and {CLOSE_SENTINEL}, no quotes or explanations

Text to translate ({OPEN_SENTINEL} and {CLOSE_SENTINEL} show text boundaries):
{OPEN_SENTINEL}{text}{CLOSE_SENTINEL}",
        source = request.source_language,
        target = request.target_language,
        text = request.text,
    );

    if let Some(context) = request.context.filter(|context| !context.is_empty()) {
        let _ = write!(prompt, "\n\nContext or notes for translation: {context}");
    }

    prompt
}
