pub mod normalize;
pub mod rewards;

use serde::Deserialize;
use tracing::debug;

pub use rewards::RewardRecord;

/// Where a category label stops.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum CategoryBoundary {
    /// Run up to the next `N% CASH BACK` marker or end of text.
    #[default]
    NextMarker,
    /// Same end point, but a label containing a digit voids the whole offer.
    FirstDigit,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ExtractOptions {
    pub boundary: CategoryBoundary,
}

/// Two-pass pipeline: strip marker glyphs → scan reward blocks.
pub fn extract(text: &str) -> Vec<RewardRecord> {
    extract_with(text, &ExtractOptions::default())
}

pub fn extract_with(text: &str, opts: &ExtractOptions) -> Vec<RewardRecord> {
    let cleaned = normalize::strip_markers(text);
    let records = rewards::scan(&cleaned, opts.boundary);
    debug!(
        chars = cleaned.len(),
        records = records.len(),
        boundary = ?opts.boundary,
        "extracted reward records"
    );
    records
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    fn fixture() -> String {
        std::fs::read_to_string("tests/fixtures/blue_cash_everyday.txt").unwrap()
    }

    #[test]
    fn blue_cash_everyday_rewards() {
        let rewards = extract(&fixture());
        let pairs: Vec<(&str, &str)> = rewards
            .iter()
            .map(|r| (r.reward_percent.as_str(), r.category.as_str()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("3", "U.S. Supermarkets on up to $6,000 per year in purchases, then 1%."),
                ("3", "U.S. Online Retail Purchases on up to $6,000 per year in purchases, then 1%."),
                ("3", "U.S. Gas Stations on up to $6,000 per year in purchases, then 1%."),
                ("1", "Other Purchases. Terms Apply."),
            ]
        );
        assert!(rewards[..3].iter().all(|r| r.limit.as_deref() == Some("6,000")));
        assert_eq!(rewards[3].limit, None);
    }

    #[test]
    fn fixture_markers_never_leak_into_records() {
        for r in extract(&fixture()) {
            for field in [&r.category, &r.full_text] {
                assert!(!field.contains('¤'));
                assert!(!field.contains('‡'));
                assert!(!field.contains('♦'));
            }
        }
    }

    #[test]
    fn glyph_before_percent_is_removed() {
        let rewards = extract("¤ 3% CASH BACK On Gas");
        assert_eq!(rewards.len(), 1);
        assert_eq!(rewards[0].reward_percent, "3");
        assert_eq!(rewards[0].category, "Gas");
        assert_eq!(rewards[0].full_text, "3% CASH BACK On Gas");
    }

    #[test]
    fn glyph_glued_to_percent_is_removed() {
        let rewards = extract("‡3%♦\u{FE0E} CASH BACK On Transit¤");
        assert_eq!(rewards.len(), 1);
        assert_eq!(rewards[0].category, "Transit");
        assert!(!rewards[0].full_text.contains('♦'));
    }

    #[test]
    fn empty_input_yields_nothing() {
        assert!(extract("").is_empty());
    }

    #[test]
    fn extraction_is_repeatable() {
        let text = fixture();
        assert_eq!(extract(&text), extract(&text));
    }

    #[test]
    fn pairs_are_unique() {
        let block = "3% CASH BACK On Gas 2% CASH BACK On Transit 1% CASH BACK On Other";
        let text = format!("{0} {0} 3% CASH BACK On Gas", block);
        let rewards = extract(&text);
        let unique: HashSet<_> = rewards
            .iter()
            .map(|r| (r.reward_percent.clone(), r.category.clone()))
            .collect();
        assert_eq!(unique.len(), rewards.len());
        assert_eq!(rewards, extract(block));
    }

    #[test]
    fn first_digit_boundary_option() {
        let opts = ExtractOptions {
            boundary: CategoryBoundary::FirstDigit,
        };
        let rewards = extract_with(&fixture(), &opts);
        let pairs: Vec<(&str, &str)> = rewards
            .iter()
            .map(|r| (r.reward_percent.as_str(), r.category.as_str()))
            .collect();
        // Every "up to $6,000" offer carries digits in its label
        assert_eq!(pairs, vec![("1", "Other Purchases. Terms Apply.")]);
        assert_eq!(rewards[0].limit, None);
    }
}
