//! Terminal output for blocks and reviews

use colored::Colorize;
use lectern_editor::{Block, Document, MetadataField, MetadataSource};
use lectern_metadata::{options, Decision, SanityReview};
use serde_json::Value;

const PREVIEW_CHARS: usize = 60;

pub fn print_document(document: &Document) {
    println!(
        "📄 {} {} ({} blocks)",
        "Page".bright_blue().bold(),
        document.page_id,
        document.len()
    );
    println!();
    for block in document.blocks() {
        print_block(block);
    }
}

pub fn print_block(block: &Block) {
    let saved = if block.saved_to_db {
        "●".green()
    } else {
        "○".yellow()
    };
    println!(
        "  {} {:>3}  {}  {:<24} {}",
        saved,
        block.position(),
        block.id.dimmed(),
        block.block_type().to_string().cyan(),
        preview(&block.plain_text())
    );

    if let (Some(markers), Some(list)) = (block.content.list_markers(), block.content.as_list()) {
        for (item, marker) in list.items.iter().zip(markers) {
            println!("          {} {}", marker.marker, preview(&item.body));
            for (child, child_marker) in item.children.iter().flatten().zip(marker.children) {
                println!("              {} {}", child_marker, preview(&child.body));
            }
        }
    }

    if !block.metadata.is_empty() {
        println!("          {}", describe_metadata(block).dimmed());
    }
}

pub fn print_metadata(block: &Block) {
    for field in MetadataField::ALL {
        let value = block.metadata.get(field);
        let source = match block.metadata.field_source(field) {
            Some(MetadataSource::Ai) => "ai".magenta(),
            Some(MetadataSource::Human) => "human".blue(),
            None => "-".dimmed(),
        };
        println!(
            "    {:<16} {:<28} {}",
            field.as_str(),
            display_value(field, &value),
            source
        );
    }
}

pub fn print_review(review: &SanityReview) {
    for (field, item) in &review.fields {
        let decision = match item.decision {
            Decision::Accept => "accept".green(),
            Decision::Ignore => "ignore".yellow(),
        };
        let confidence = item
            .confidence
            .map(|c| format!(" ({:.0}%)", c * 100.0))
            .unwrap_or_default();
        println!(
            "    {:<16} {} → {}  [{}]{}",
            field.as_str(),
            display_value(*field, &item.original_value),
            display_value(*field, &item.suggested_value).bold(),
            decision,
            confidence
        );
        if !item.reason.is_empty() {
            println!("    {:<16} {}", "", item.reason.dimmed());
        }
    }
}

fn describe_metadata(block: &Block) -> String {
    MetadataField::ALL
        .iter()
        .filter(|f| block.metadata.is_populated(**f))
        .map(|f| format!("{}={}", f.as_str(), display_value(*f, &block.metadata.get(*f))))
        .collect::<Vec<_>>()
        .join(" ")
}

fn display_value(field: MetadataField, value: &Value) -> String {
    match value {
        Value::Null => "-".to_string(),
        Value::String(s) => options::label_for(field, s)
            .map(str::to_string)
            .unwrap_or_else(|| s.clone()),
        other => other.to_string(),
    }
}

fn preview(text: &str) -> String {
    if text.chars().count() <= PREVIEW_CHARS {
        return text.to_string();
    }
    let cut: String = text.chars().take(PREVIEW_CHARS).collect();
    format!("{}…", cut)
}
