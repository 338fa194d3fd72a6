// src/report.rs
// =============================================================================
// Terminal output for `page-inspector analyze`.
//
// Either pretty JSON ({ "url": ..., "data": {...} }) or a human-readable
// summary followed by a table of every link.
// =============================================================================

use crate::analyzers::{FactValue, HeadingGroup};
use crate::links::{LinkRecord, LinkType, STATUS_UNREACHABLE};
use crate::service::AnalysisReport;
use anyhow::Result;
use serde_json::json;

pub fn print_report(report: &AnalysisReport, json: bool) -> Result<()> {
    if json {
        let output = json!({ "url": report.url, "data": report.data() });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        print_summary(report);
        if let Some(links) = report.links() {
            print_link_table(&links.link_records);
        }
    }
    Ok(())
}

fn print_summary(report: &AnalysisReport) {
    println!("📄 {}", report.url);
    println!("{}", "=".repeat(105));

    let mut facts: Vec<_> = report.facts.iter().collect();
    facts.sort_by(|a, b| a.key.cmp(&b.key));

    for fact in facts {
        let line = match (&fact.value, &fact.error) {
            (_, Some(error)) => format!("⚠️  error: {}", error),
            (Some(value), None) => describe(value),
            (None, None) => String::new(),
        };
        println!("{:<15} {}", fact.key, line);
    }
    println!();
}

fn describe(value: &FactValue) -> String {
    match value {
        FactValue::Text(text) if text.is_empty() => "(empty)".to_string(),
        FactValue::Text(text) => text.clone(),
        FactValue::Flag(true) => "yes".to_string(),
        FactValue::Flag(false) => "no".to_string(),
        FactValue::Headings(groups) => describe_headings(groups),
        FactValue::Links(links) => format!(
            "{} total ({} internal, {} external, {} unknown)",
            links.total_count, links.internal_count, links.external_count, links.unknown_count
        ),
    }
}

fn describe_headings(groups: &[HeadingGroup]) -> String {
    if groups.is_empty() {
        return "none".to_string();
    }
    groups
        .iter()
        .map(|g| format!("{}×{}", g.tag_name, g.tag_count))
        .collect::<Vec<_>>()
        .join(", ")
}

fn print_link_table(records: &[LinkRecord]) {
    if records.is_empty() {
        println!("✅ No links found");
        return;
    }

    println!("{:<60} {:<10} {:<18} {:>10}", "URL", "TYPE", "STATUS", "LATENCY");
    println!("{}", "=".repeat(105));

    for record in records {
        // Truncate URL if too long for display
        let url_display = if record.url.chars().count() > 57 {
            format!("{}...", record.url.chars().take(57).collect::<String>())
        } else {
            record.url.clone()
        };

        println!(
            "{:<60} {:<10} {:<18} {:>8}ms",
            url_display,
            link_type_label(record.link_type),
            format_status(record.status_code),
            record.latency_millis
        );
    }

    println!();
    let broken = records.iter().filter(|r| r.is_broken()).count();
    println!("📊 Summary:");
    println!("   ✅ OK: {}", records.len() - broken);
    println!("   ❌ Broken: {}", broken);
    println!("   📋 Total: {}", records.len());
}

fn link_type_label(link_type: LinkType) -> &'static str {
    match link_type {
        LinkType::Internal => "internal",
        LinkType::External => "external",
        LinkType::Unknown => "unknown",
    }
}

fn format_status(status_code: u16) -> String {
    match status_code {
        STATUS_UNREACHABLE => "❌ UNREACHABLE".to_string(),
        200..=299 => format!("✅ {}", status_code),
        300..=399 => format!("🔀 {}", status_code),
        _ => format!("❌ {}", status_code),
    }
}
