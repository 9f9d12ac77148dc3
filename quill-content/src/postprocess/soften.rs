//! Promotional phrasing softener

use std::sync::LazyLock;

use regex::Regex;

/// Pushy call-to-action patterns and their replacement (`None` deletes)
const SOFTENING_RULES: &[(&str, Option<&str>)] = &[
    (r"(?i)\bsign up (?:now|today)[!！]?", Some("learn more")),
    (r"(?i)\bdon['’]t miss out[!！]?", None),
    (r"(?i)\bact now[!！]?", None),
    (r"(?i)\blimited[- ]time offer[!！]?", None),
    (
        r"今すぐ(?:登録|申し込み|申込み?)(?:しましょう|してください|を)?[!！]?",
        Some("詳しくは公式サイトをご覧ください。"),
    ),
    (r"お見逃しなく[!！。]?", None),
    (r"今だけの(?:チャンス|特典)[!！]?", None),
    (r"絶対に損(?:しません|はさせません)[!！。]?", Some("無理なく検討できます。")),
    (r"急いでください[!！。]?", None),
];

static COMPILED_RULES: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    SOFTENING_RULES
        .iter()
        .map(|(pattern, replacement)| {
            (
                Regex::new(pattern).expect("Invalid softening regex"),
                replacement.unwrap_or(""),
            )
        })
        .collect()
});

static TRAILING_SPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[ \t　]+\n").expect("Invalid trailing space regex"));

static EXTRA_BLANK_LINES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n{3,}").expect("Invalid blank line regex"));

/// Remove or soften pushy calls-to-action, then collapse the blank lines the
/// removals leave behind.
///
/// Returns the new text and the number of phrases changed.
pub fn soften_promotional_phrasing(content: &str) -> (String, usize) {
    let mut text = content.to_string();
    let mut changed = 0;

    for (regex, replacement) in COMPILED_RULES.iter() {
        let hits = regex.find_iter(&text).count();
        if hits > 0 {
            changed += hits;
            text = regex.replace_all(&text, *replacement).into_owned();
        }
    }

    if changed > 0 {
        text = TRAILING_SPACE.replace_all(&text, "\n").into_owned();
        text = EXTRA_BLANK_LINES.replace_all(&text, "\n\n").into_owned();
        text = text.trim_end().to_string();
    }

    (text, changed)
}
