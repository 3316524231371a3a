//! Table and JSON rendering for note listings.

use comfy_table::{presets::UTF8_FULL, Table};
use sealnote_core::storage::{DecryptedNote, NoteSummary};

pub fn print_summaries(summaries: &[NoteSummary], json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(summaries)?);
        return Ok(());
    }

    if summaries.is_empty() {
        println!("No notes.");
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["ID", "Header", "Modified", "Encrypted"]);
    for summary in summaries {
        table.add_row(vec![
            summary.id.to_string(),
            truncate(&summary.header, 40),
            summary.modified_at.format("%Y-%m-%d %H:%M").to_string(),
            if summary.encrypted { "yes" } else { "" }.to_string(),
        ]);
    }
    println!("{table}");
    Ok(())
}

pub fn print_note(note: &DecryptedNote, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(note)?);
        return Ok(());
    }

    println!("{}", note.header);
    println!("{}", "-".repeat(note.header.len().max(8)));
    println!("{}", note.content);
    println!();
    println!(
        "created {}  modified {}",
        note.created_at.format("%Y-%m-%d %H:%M"),
        note.modified_at.format("%Y-%m-%d %H:%M")
    );
    Ok(())
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max_chars - 1).collect();
        format!("{cut}…")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("exactly-10", 10), "exactly-10");
        assert_eq!(truncate("rather-long-header", 10), "rather-lo…");
    }
}
