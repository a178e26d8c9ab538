//! Local checks for generated listing copy.
//!
//! The listing schema asks the model to respect marketplace limits, but
//! nothing enforces them remotely. These checks report where a generated
//! listing breaks those limits so callers can warn or regenerate.

use crate::models::ListingAnalysis;
use std::collections::BTreeMap;
use std::fmt;

pub const TITLE_MIN_CHARS: usize = 150;
pub const TITLE_MAX_CHARS: usize = 200;
pub const BULLET_COUNT: usize = 5;
pub const BULLET_MIN_CHARS: usize = 160;
pub const BULLET_MAX_CHARS: usize = 199;
pub const DESCRIPTION_MAX_CHARS: usize = 1500;
/// Backend search terms must stay strictly below this.
pub const BACKEND_KEYWORDS_LIMIT: usize = 200;
pub const TITLE_WORD_MAX_REPEATS: usize = 2;

const TITLE_PUNCTUATION: &[char] = &[',', '.', '-', '\'', '(', ')'];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CopyIssue {
    TitleLength { chars: usize },
    TitleSymbols { symbols: Vec<char> },
    TitleWordRepeated { word: String, count: usize },
    BulletCount { count: usize },
    BulletLength { index: usize, chars: usize },
    DescriptionTooLong { chars: usize },
    BackendKeywordsTooLong { chars: usize },
    BackendKeywordsHaveCommas,
    BackendKeywordRepeated { word: String },
}

impl fmt::Display for CopyIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CopyIssue::TitleLength { chars } => write!(
                f,
                "title is {} characters (expected {}-{})",
                chars, TITLE_MIN_CHARS, TITLE_MAX_CHARS
            ),
            CopyIssue::TitleSymbols { symbols } => {
                let symbols: String = symbols.iter().collect();
                write!(f, "title contains symbols or emoji: {}", symbols)
            }
            CopyIssue::TitleWordRepeated { word, count } => write!(
                f,
                "title repeats '{}' {} times (max {})",
                word, count, TITLE_WORD_MAX_REPEATS
            ),
            CopyIssue::BulletCount { count } => {
                write!(f, "{} bullets (expected {})", count, BULLET_COUNT)
            }
            CopyIssue::BulletLength { index, chars } => write!(
                f,
                "bullet {} is {} characters (expected {}-{})",
                index + 1,
                chars,
                BULLET_MIN_CHARS,
                BULLET_MAX_CHARS
            ),
            CopyIssue::DescriptionTooLong { chars } => write!(
                f,
                "description is {} characters (max {})",
                chars, DESCRIPTION_MAX_CHARS
            ),
            CopyIssue::BackendKeywordsTooLong { chars } => write!(
                f,
                "backend keywords are {} characters (must be under {})",
                chars, BACKEND_KEYWORDS_LIMIT
            ),
            CopyIssue::BackendKeywordsHaveCommas => {
                write!(f, "backend keywords contain commas")
            }
            CopyIssue::BackendKeywordRepeated { word } => {
                write!(f, "backend keywords repeat '{}'", word)
            }
        }
    }
}

impl ListingAnalysis {
    /// Every rule the generated copy breaks, in field order.
    pub fn check_copy(&self) -> Vec<CopyIssue> {
        let mut issues = Vec::new();
        check_title(&self.title, &mut issues);
        check_bullets(&self.bullets, &mut issues);

        let chars = self.description.chars().count();
        if chars > DESCRIPTION_MAX_CHARS {
            issues.push(CopyIssue::DescriptionTooLong { chars });
        }

        check_backend_keywords(&self.backend_keywords, &mut issues);
        issues
    }
}

fn check_title(title: &str, issues: &mut Vec<CopyIssue>) {
    let chars = title.chars().count();
    if !(TITLE_MIN_CHARS..=TITLE_MAX_CHARS).contains(&chars) {
        issues.push(CopyIssue::TitleLength { chars });
    }

    let mut symbols: Vec<char> = Vec::new();
    for c in title.chars() {
        let allowed = c.is_alphanumeric() || c.is_whitespace() || TITLE_PUNCTUATION.contains(&c);
        if !allowed && !symbols.contains(&c) {
            symbols.push(c);
        }
    }
    if !symbols.is_empty() {
        issues.push(CopyIssue::TitleSymbols { symbols });
    }

    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for word in title
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
    {
        *counts.entry(word.to_lowercase()).or_default() += 1;
    }
    for (word, count) in counts {
        if count > TITLE_WORD_MAX_REPEATS {
            issues.push(CopyIssue::TitleWordRepeated { word, count });
        }
    }
}

fn check_bullets(bullets: &[String], issues: &mut Vec<CopyIssue>) {
    if bullets.len() != BULLET_COUNT {
        issues.push(CopyIssue::BulletCount {
            count: bullets.len(),
        });
    }

    for (index, bullet) in bullets.iter().enumerate() {
        let chars = bullet.chars().count();
        if !(BULLET_MIN_CHARS..=BULLET_MAX_CHARS).contains(&chars) {
            issues.push(CopyIssue::BulletLength { index, chars });
        }
    }
}

fn check_backend_keywords(keywords: &str, issues: &mut Vec<CopyIssue>) {
    let chars = keywords.chars().count();
    if chars >= BACKEND_KEYWORDS_LIMIT {
        issues.push(CopyIssue::BackendKeywordsTooLong { chars });
    }

    if keywords.contains(',') {
        issues.push(CopyIssue::BackendKeywordsHaveCommas);
    }

    let mut seen: Vec<String> = Vec::new();
    let mut reported: Vec<String> = Vec::new();
    for word in keywords
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|w| !w.is_empty())
    {
        let word = word.to_lowercase();
        if seen.contains(&word) {
            if !reported.contains(&word) {
                issues.push(CopyIssue::BackendKeywordRepeated { word: word.clone() });
                reported.push(word);
            }
        } else {
            seen.push(word);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn text_of_len(seed: &str, len: usize) -> String {
        let words: Vec<String> = (0..len).map(|n| format!("{}{}", seed, n)).collect();
        let mut text: String = words.join(" ").chars().take(len).collect();
        if text.ends_with(' ') {
            text.pop();
            text.push('x');
        }
        text
    }

    fn valid_listing() -> ListingAnalysis {
        ListingAnalysis {
            title: text_of_len("Title", 170),
            bullets: (0..5).map(|i| text_of_len(&format!("b{}w", i), 180)).collect(),
            keywords: vec!["girls dress".to_string()],
            description: "A soft cotton dress.".to_string(),
            backend_keywords: "red cotton midi twirl party".to_string(),
            fabric_guess: None,
            style_type: None,
            recommendations: vec![],
        }
    }

    #[test]
    fn test_helper_builds_exact_lengths() {
        assert_eq!(text_of_len("Title", 170).chars().count(), 170);
        assert_eq!(text_of_len("b1w", 180).chars().count(), 180);
    }

    #[test]
    fn test_valid_listing_has_no_issues() {
        assert_eq!(valid_listing().check_copy(), vec![]);
    }

    #[test]
    fn test_title_length_bounds() {
        let mut listing = valid_listing();
        listing.title = text_of_len("Title", 149);
        assert_eq!(
            listing.check_copy(),
            vec![CopyIssue::TitleLength { chars: 149 }]
        );

        listing.title = text_of_len("Title", 150);
        assert!(listing.check_copy().is_empty());

        listing.title = text_of_len("Title", 201);
        assert_eq!(
            listing.check_copy(),
            vec![CopyIssue::TitleLength { chars: 201 }]
        );
    }

    #[test]
    fn test_title_symbols_and_emoji() {
        let mut listing = valid_listing();
        listing.title = format!("{} ★ & 🎀 ★", text_of_len("Title", 160));
        let issues = listing.check_copy();
        assert!(issues.contains(&CopyIssue::TitleSymbols {
            symbols: vec!['★', '&', '🎀'],
        }));
    }

    #[test]
    fn test_title_word_repeated_more_than_twice() {
        let mut listing = valid_listing();
        listing.title = format!("{} Dress dress DRESS", text_of_len("Title", 150));
        let issues = listing.check_copy();
        assert!(issues.contains(&CopyIssue::TitleWordRepeated {
            word: "dress".to_string(),
            count: 3,
        }));
    }

    #[test]
    fn test_bullet_count_and_lengths() {
        let mut listing = valid_listing();
        listing.bullets.pop();
        listing.bullets[1] = "Too short".to_string();

        assert_eq!(
            listing.check_copy(),
            vec![
                CopyIssue::BulletCount { count: 4 },
                CopyIssue::BulletLength { index: 1, chars: 9 },
            ]
        );
    }

    #[test]
    fn test_bullet_upper_bound_is_199() {
        let mut listing = valid_listing();
        listing.bullets[0] = text_of_len("b0w", 199);
        assert!(listing.check_copy().is_empty());

        listing.bullets[0] = text_of_len("b0w", 200);
        assert_eq!(
            listing.check_copy(),
            vec![CopyIssue::BulletLength { index: 0, chars: 200 }]
        );
    }

    #[test]
    fn test_description_limit() {
        let mut listing = valid_listing();
        listing.description = "a".repeat(1500);
        assert!(listing.check_copy().is_empty());

        listing.description = "a".repeat(1501);
        assert_eq!(
            listing.check_copy(),
            vec![CopyIssue::DescriptionTooLong { chars: 1501 }]
        );
    }

    #[test]
    fn test_backend_keywords_rules() {
        let mut listing = valid_listing();
        listing.backend_keywords = "red, cotton red Cotton red".to_string();
        assert_eq!(
            listing.check_copy(),
            vec![
                CopyIssue::BackendKeywordsHaveCommas,
                CopyIssue::BackendKeywordRepeated {
                    word: "red".to_string()
                },
                CopyIssue::BackendKeywordRepeated {
                    word: "cotton".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_backend_keywords_must_be_under_limit() {
        let mut listing = valid_listing();
        listing.backend_keywords = "a".repeat(199);
        assert!(listing.check_copy().is_empty());

        listing.backend_keywords = "a".repeat(200);
        assert_eq!(
            listing.check_copy(),
            vec![CopyIssue::BackendKeywordsTooLong { chars: 200 }]
        );
    }

    #[test]
    fn test_issue_messages() {
        assert_eq!(
            CopyIssue::BulletLength { index: 0, chars: 12 }.to_string(),
            "bullet 1 is 12 characters (expected 160-199)"
        );
        assert_eq!(
            CopyIssue::BackendKeywordsTooLong { chars: 250 }.to_string(),
            "backend keywords are 250 characters (must be under 200)"
        );
    }
}
