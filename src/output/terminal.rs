// Colored terminal output for screening reports and topic tables.
//
// All terminal-specific formatting lives here: colors, aligned columns,
// percentage bars. The main.rs command handlers delegate to these
// functions instead of printing inline.

use std::collections::BTreeMap;

use colored::Colorize;
use serde_json::Value;

use crate::dictionary::{flag_is_set, FLAG_COLUMN};
use crate::table::{cell_text, Table};
use crate::topics::analyzer::{
    COUNT, DOCUMENT_ID, DOMINANT_TOPIC, PERCENTAGE, TOPIC, TOPIC_KEYWORDS, TOPIC_PROB,
};

/// Display the flagged rows of a screened table. When `matched_terms`
/// is given (keyed by row index), the terms that fired are listed next
/// to each row.
pub fn display_screened(
    table: &Table,
    text_field: &str,
    matched_terms: Option<&BTreeMap<usize, Vec<String>>>,
) {
    let flagged: Vec<(usize, &crate::table::Row)> = table
        .rows()
        .iter()
        .enumerate()
        .filter(|(_, row)| flag_is_set(row, FLAG_COLUMN))
        .collect();

    println!(
        "\n{}",
        format!("=== Screening Report ({} rows) ===", table.len()).bold()
    );
    println!();

    if flagged.is_empty() {
        println!("  {} no rows matched the term dictionary", "ok".green());
        println!();
        return;
    }

    for (index, row) in &flagged {
        let preview = truncate_chars(cell_text(row, text_field), 100);
        match matched_terms.and_then(|terms| terms.get(index)) {
            Some(terms) => println!(
                "  {:>5}  {}  [{}]",
                index,
                preview,
                terms.join(", ").red()
            ),
            None => println!("  {:>5}  {}", index, preview),
        }
    }

    println!();
    println!(
        "  {} {} of {} rows flagged",
        "!!".red().bold(),
        flagged.len(),
        table.len()
    );
    println!();
}

/// Display the terms a single text matched, or a quiet note when clean.
pub fn display_matched_terms(matches: Option<&[String]>) {
    match matches {
        Some(terms) => {
            println!(
                "\n{}",
                format!("=== Matched Terms ({}) ===", terms.len()).bold()
            );
            println!();
            for term in terms {
                println!("  {} {}", "!".red().bold(), term);
            }
        }
        None => println!("\n  {}", "No dictionary terms matched.".dimmed()),
    }
    println!();
}

/// Display the top terms of each trained topic.
pub fn display_topic_summary(topics: &[(usize, Vec<String>)]) {
    println!(
        "\n{}",
        format!("=== Topics ({}) ===", topics.len()).bold()
    );
    println!();
    for (topic, terms) in topics {
        println!("  Topic {:<3} {}", topic, terms.join(", "));
    }
    println!();
}

/// Display the per-document assignment table. Sentinel documents show
/// dashes instead of a topic id and probability.
pub fn display_topic_details(details: &Table) {
    println!(
        "\n{}",
        format!("=== Topic Assignments ({} documents) ===", details.len()).bold()
    );
    println!();
    println!(
        "  {:>5}  {:>6}  {:>6}  {}",
        "Doc".dimmed(),
        "Topic".dimmed(),
        "Prob".dimmed(),
        "Keywords".dimmed(),
    );
    println!("  {}", "-".repeat(72).dimmed());

    for row in details.rows() {
        let doc = row.get(DOCUMENT_ID).and_then(Value::as_u64).unwrap_or(0);
        let topic = row
            .get(DOMINANT_TOPIC)
            .and_then(Value::as_f64)
            .unwrap_or(-1.0);
        let prob = row.get(TOPIC_PROB).and_then(Value::as_f64).unwrap_or(0.0);
        let keywords = truncate_chars(cell_text(row, TOPIC_KEYWORDS), 48);

        if topic < 0.0 {
            println!(
                "  {:>5}  {:>6}  {:>6}  {}",
                doc,
                "-",
                "-",
                keywords.dimmed()
            );
        } else {
            println!("  {:>5}  {:>6.0}  {:>6.3}  {}", doc, topic, prob, keywords);
        }
    }
    println!();
}

/// Display the dominant-topic distribution as a percentage bar chart.
pub fn display_topic_distribution(distribution: &Table) {
    println!("\n{}", "=== Topic Distribution ===".bold());
    println!();

    for row in distribution.rows() {
        let topic = row.get(TOPIC).and_then(Value::as_f64).unwrap_or(-1.0);
        let count = row.get(COUNT).and_then(Value::as_u64).unwrap_or(0);
        let pct = row.get(PERCENTAGE).and_then(Value::as_f64).unwrap_or(0.0);

        let bar_len = (pct / 100.0 * 30.0).round() as usize;
        let bar = "=".repeat(bar_len.min(30));
        let label = if topic < 0.0 {
            "none".to_string()
        } else {
            format!("{topic:.0}")
        };
        println!(
            "  {:>6}  [{:<30}] {:>5.1}%  {} docs",
            label, bar, pct, count
        );
    }
    println!();
}

/// Truncate to at most `max_chars` characters, appending "..." when cut.
/// Counts characters rather than bytes so multi-byte text never splits
/// mid-character.
fn truncate_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let truncated: String = text.chars().take(max_chars).collect();
        format!("{truncated}...")
    }
}
