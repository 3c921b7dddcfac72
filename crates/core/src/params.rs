//! Parameter-count heuristic.
//!
//! Model ids and tags often carry the size as free text (`llama-2-7b`,
//! `13.5B`). This scans for the first `<number>[ ]b` token that ends at a
//! word boundary. It is a guess: `mixtral-8x7b` reads as 7, and an id with no
//! such token says nothing about the real size.

use crate::models::CandidateRecord;

/// First `<digits>[.<digits>]<spaces>(b|B)` followed by a non-word character
/// or the end of the text.
pub fn parse_size_b(text: &str) -> Option<f64> {
    let bytes = text.as_bytes();
    (0..bytes.len())
        .filter(|&i| bytes[i].is_ascii_digit())
        .find_map(|start| match_at(text, start))
}

/// Size from the id, else from the first tag that carries one.
pub fn candidate_size_b(record: &CandidateRecord) -> Option<f64> {
    parse_size_b(&record.id).or_else(|| record.tags.iter().find_map(|t| parse_size_b(t)))
}

fn match_at(text: &str, start: usize) -> Option<f64> {
    let bytes = text.as_bytes();
    let int_end = digits_end(bytes, start);

    // greedy fraction first, then the bare integer
    let mut ends = Vec::with_capacity(2);
    if bytes.get(int_end) == Some(&b'.') {
        let frac_end = digits_end(bytes, int_end + 1);
        if frac_end > int_end + 1 {
            ends.push(frac_end);
        }
    }
    ends.push(int_end);

    ends.into_iter()
        .find(|&end| has_b_suffix(text, end))
        .and_then(|end| text[start..end].parse().ok())
}

fn digits_end(bytes: &[u8], from: usize) -> usize {
    let mut end = from;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    end
}

fn has_b_suffix(text: &str, from: usize) -> bool {
    let rest = text[from..].trim_start();
    let mut chars = rest.chars();
    match chars.next() {
        Some('b') | Some('B') => {}
        _ => return false,
    }
    !chars
        .next()
        .is_some_and(|c| c.is_alphanumeric() || c == '_')
}
