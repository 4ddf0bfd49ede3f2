/// Decorative glyphs that sit next to percentages in card marketing copy.
/// The two-char diamond sequence must be replaced before the bare diamond.
const MARKER_GLYPHS: &[&str] = &["¤", "‡", "†", "♦\u{FE0E}", "♦"];

/// Replace each known clutter glyph with a single space.
pub fn strip_markers(text: &str) -> String {
    let mut cleaned = text.to_string();
    for glyph in MARKER_GLYPHS {
        if cleaned.contains(glyph) {
            cleaned = cleaned.replace(glyph, " ");
        }
    }
    cleaned
}

/// Trim and collapse every whitespace run to one space.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

// ── Tests ──
