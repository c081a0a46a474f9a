//! Greedy line breaking for the export surface.
//!
//! Field values wrap to the width of their mapped rectangle before being
//! drawn. Break opportunities come from the UAX#14 line breaking algorithm;
//! the fitting itself is greedy: take characters until the next one would
//! overflow, then cut at the last opportunity seen. A single unbreakable
//! run wider than the line force-splits at character granularity rather
//! than overflowing.
//!
//! Hard newlines in the value are respected as paragraph breaks. No
//! hyphenation.

use unicode_linebreak::linebreaks;

/// Split `text` into lines no wider than `max_width`, measuring with
/// `measure` (a width in whatever unit the caller draws in).
pub fn split_to_width<F>(text: &str, max_width: f64, measure: F) -> Vec<String>
where
    F: Fn(char) -> f64,
{
    if text.is_empty() {
        return vec![String::new()];
    }

    let mut lines = Vec::new();
    for paragraph in text.split('\n') {
        let paragraph = paragraph.strip_suffix('\r').unwrap_or(paragraph);
        wrap_paragraph(paragraph, max_width, &measure, &mut lines);
    }
    lines
}

fn wrap_paragraph<F>(paragraph: &str, max_width: f64, measure: &F, out: &mut Vec<String>)
where
    F: Fn(char) -> f64,
{
    if paragraph.is_empty() {
        out.push(String::new());
        return;
    }

    let chars: Vec<char> = paragraph.chars().collect();
    let widths: Vec<f64> = chars.iter().map(|&ch| measure(ch)).collect();
    let can_break = break_opportunities(paragraph, chars.len());

    let mut start = 0;
    while start < chars.len() {
        let mut width = 0.0;
        let mut last_break = None;
        let mut end = start;
        while end < chars.len() {
            if end > start && can_break[end] {
                last_break = Some(end);
            }
            // Spaces are allowed to overhang the line end; they get trimmed
            // away and must not force a break on their own.
            let overflows = chars[end] != ' ' && width + widths[end] > max_width;
            if overflows && end > start {
                break;
            }
            width += widths[end];
            end += 1;
        }

        if end == chars.len() {
            out.push(trim_line(&chars[start..]));
            return;
        }

        let cut = last_break.unwrap_or(end);
        out.push(trim_line(&chars[start..cut]));
        start = cut;
        while start < chars.len() && chars[start] == ' ' {
            start += 1;
        }
    }
}

/// "Can a line break before char `i`?", indexed by char position.
///
/// `linebreaks` yields byte offsets of the position *after* each break
/// opportunity, i.e. the start of the next segment; those get converted to
/// char indices here. Index 0 is never a break.
fn break_opportunities(text: &str, char_count: usize) -> Vec<bool> {
    let mut char_index_at_byte = vec![0usize; text.len() + 1];
    for (char_idx, (byte_idx, _)) in text.char_indices().enumerate() {
        char_index_at_byte[byte_idx] = char_idx;
    }
    char_index_at_byte[text.len()] = char_count;

    let mut result = vec![false; char_count];
    for (byte_offset, _) in linebreaks(text) {
        let char_idx = char_index_at_byte[byte_offset];
        if char_idx > 0 && char_idx < char_count {
            result[char_idx] = true;
        }
    }
    result
}

fn trim_line(chars: &[char]) -> String {
    let line: String = chars.iter().collect();
    line.trim_end().to_string()
}
