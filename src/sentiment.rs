use serde::Serialize;

const NEGATIVE_KEYWORDS: &[&str] = &[
    "sad",
    "unhappy",
    "depressed",
    "lonely",
    "anxious",
    "worried",
    "stressed",
    "scared",
    "afraid",
    "hurt",
    "pain",
    "angry",
    "frustrated",
    "upset",
    "tired",
    "exhausted",
    "hopeless",
    "helpless",
    "overwhelmed",
    "lost",
    "alone",
    "empty",
    "broken",
    "struggling",
    "suffering",
    "cry",
    "crying",
    "miserable",
    "terrible",
    "awful",
    "bad",
    "difficult",
    "hard",
    "tough",
    "desperate",
    "weak",
    "sick",
    "ill",
    "unwell",
];

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct SentimentResult {
    pub is_negative: bool,
    pub detected_keyword: Option<&'static str>,
    pub original_text: Option<String>,
}

impl SentimentResult {
    fn neutral() -> Self {
        Self {
            is_negative: false,
            detected_keyword: None,
            original_text: None,
        }
    }
}

/// Flags text containing a negative keyword; the first keyword in list order wins.
///
/// Matching is plain substring, so "ill" also fires inside "will".
pub fn detect_sentiment(text: &str) -> SentimentResult {
    if text.is_empty() {
        return SentimentResult::neutral();
    }

    let lowered = text.to_lowercase();
    NEGATIVE_KEYWORDS
        .iter()
        .copied()
        .find(|keyword| lowered.contains(keyword))
        .map(|keyword| SentimentResult {
            is_negative: true,
            detected_keyword: Some(keyword),
            original_text: Some(text.to_string()),
        })
        .unwrap_or_else(SentimentResult::neutral)
}
