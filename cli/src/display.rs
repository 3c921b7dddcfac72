//! Result list and detail rendering.

use hfscout_core::ScoredResult;

/// Parsed answer to a numbered prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    Back,
    /// Zero-based index into the listed items
    Item(usize),
    NotANumber,
    OutOfRange,
}

/// `0` goes back, `1..=len` picks an item.
pub fn parse_selection(input: &str, len: usize) -> Selection {
    let input = input.trim();
    if input.is_empty() || !input.chars().all(|c| c.is_ascii_digit()) {
        return Selection::NotANumber;
    }
    match input.parse::<usize>() {
        Ok(0) => Selection::Back,
        Ok(n) if n <= len => Selection::Item(n - 1),
        _ => Selection::OutOfRange,
    }
}

pub fn format_number(n: u64) -> String {
    if n >= 1_000_000 {
        format!("{:.1}M", n as f64 / 1_000_000.0)
    } else if n >= 1_000 {
        format!("{:.1}K", n as f64 / 1_000.0)
    } else {
        n.to_string()
    }
}

pub fn result_line(rank: usize, result: &ScoredResult) -> String {
    let mut extras = Vec::new();
    if result.metrics.has_weights() {
        extras.push(format!("weights:{}", result.metrics.weight_label()));
    }
    extras.push(format!("likes:{}", result.metrics.likes));

    format!(
        "{}. {} - downloads: {} - tag: {} ({})",
        rank,
        result.record.id,
        format_number(result.display_metric),
        result.record.primary_tag(),
        extras.join("; ")
    )
}

pub fn print_results(results: &[ScoredResult]) {
    if results.is_empty() {
        println!("No models found.");
        return;
    }

    println!("\nTop models:");
    for (i, result) in results.iter().enumerate() {
        println!("{}", result_line(i + 1, result));
    }
}

pub fn detail_lines(result: &ScoredResult) -> Vec<String> {
    let record = &result.record;
    let metrics = &result.metrics;
    let last_modified = metrics
        .last_modified
        .map(|ts| ts.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .or_else(|| record.last_modified.clone())
        .unwrap_or_default();

    vec![
        format!("ID: {}", record.id),
        format!("Downloads: {}", result.display_metric),
        format!("Type: {}", record.model_type.as_deref().unwrap_or("")),
        format!("Tags: {}", record.tags.join(", ")),
        format!("Pipeline tag: {}", record.pipeline_tag.as_deref().unwrap_or("")),
        format!("Likes: {}", metrics.likes),
        format!("Weight types: {}", metrics.weight_label().replace(',', ", ")),
        format!("Owner: {}", metrics.owner),
        format!("Last modified: {}", last_modified),
        format!("Score: {:.3}", result.score),
    ]
}

pub fn print_detail(result: &ScoredResult) {
    println!("\n--- Model Detail ---");
    for line in detail_lines(result) {
        println!("{}", line);
    }
    println!("--- End ---");
}
