use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use super::normalize::collapse_whitespace;
use super::CategoryBoundary;

/// `<digits>% CASH BACK On ` up to where the category label starts.
static OFFER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(\d+)%\s*CASH\s+BACK\s+On\s+").unwrap());
/// Any reward marker, with or without the trailing "On"; ends the current category.
static NEXT_MARKER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\d+%\s*CASH\s+BACK").unwrap());
static LIMIT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)up\s+to\s+\$([\d,]+)").unwrap());

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RewardRecord {
    pub category: String,
    pub reward_percent: String,
    pub limit: Option<String>,
    pub full_text: String,
}

/// Scan normalized text for reward blocks, keeping the first record per
/// (percent, category) pair in source order.
pub fn scan(text: &str, boundary: CategoryBoundary) -> Vec<RewardRecord> {
    let mut records = Vec::new();
    let mut seen: HashSet<(String, String)> = HashSet::new();
    let mut pos = 0;

    while let Some(caps) = OFFER_RE.captures_at(text, pos) {
        let Some(head) = caps.get(0) else { break };
        let category_start = head.end();
        let Some(category_end) = find_category_end(text, category_start, boundary) else {
            pos = category_start;
            continue;
        };

        let category = collapse_whitespace(&text[category_start..category_end]);
        if category.is_empty() {
            // Marker directly followed by another marker
            pos = category_start;
            continue;
        }
        pos = category_end;

        let reward_percent = caps[1].trim().to_string();
        if !seen.insert((reward_percent.clone(), category.clone())) {
            continue;
        }

        let full_text = text[head.start()..category_end].trim().to_string();
        let limit = find_limit(&full_text);

        records.push(RewardRecord {
            category,
            reward_percent,
            limit,
            full_text,
        });
    }

    records
}

/// Byte offset where the category starting at `start` ends, or `None` when
/// the boundary mode rejects the whole segment.
fn find_category_end(text: &str, start: usize, boundary: CategoryBoundary) -> Option<usize> {
    let next_marker = NEXT_MARKER_RE
        .find_at(text, start)
        .map_or(text.len(), |m| m.start());

    match boundary {
        CategoryBoundary::NextMarker => Some(next_marker),
        CategoryBoundary::FirstDigit => {
            let has_digit = text[start..next_marker].contains(|c: char| c.is_ascii_digit());
            (!has_digit).then_some(next_marker)
        }
    }
}

/// Spending cap from an "up to $6,000" clause, digits and commas only.
fn find_limit(segment: &str) -> Option<String> {
    let caps = LIMIT_RE.captures(segment)?;
    // "up to $6,000, then 1%" captures "6,000,"; the trailing comma is
    // punctuation, not part of the amount, so "6,000" is returned.
    let amount = caps[1].trim_end_matches(',');
    if amount.is_empty() {
        None
    } else {
        Some(amount.to_string())
    }
}

// ── Tests ──
