//! Model read-back command handlers

use std::path::Path;

use anyhow::{Context, Result};
use colored::*;
use vepi_client::EtlClient;
use vepi_core::domain::export::{HierarchyMember, IntersectionTable, cell_text};

/// Export every intersection, writing JSON to `output` or printing a preview
pub async fn export(
    client: &EtlClient,
    page_size: usize,
    output: Option<&Path>,
    limit: usize,
) -> Result<()> {
    let table = client
        .export_intersections(page_size)
        .await
        .context("Export failed")?;

    if let Some(path) = output {
        let json = serde_json::to_vec_pretty(&table)?;
        tokio::fs::write(path, json)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?;

        println!(
            "{} Wrote {} record(s) to {}",
            "✓".green(),
            table.len(),
            path.display()
        );
        return Ok(());
    }

    print_table_preview(&table, limit);
    Ok(())
}

/// Show every hierarchy member, grouped by dimension in server order
pub async fn hierarchy(client: &EtlClient) -> Result<()> {
    let members = client
        .get_dimension_hierarchy()
        .await
        .context("Failed to get dimension hierarchy")?;

    if members.is_empty() {
        println!("{}", "No hierarchy members found.".yellow());
        return Ok(());
    }

    let mut current: Option<&str> = None;
    for member in &members {
        let dimension = member.dimension.as_deref();
        if dimension != current {
            println!("\n{}", dimension.unwrap_or("(no dimension)").bold());
            current = dimension;
        }
        print_member(member);
    }

    Ok(())
}

fn print_table_preview(table: &IntersectionTable, limit: usize) {
    if table.is_empty() {
        println!("{}", "No intersections found.".yellow());
        return;
    }

    println!("{}", format!("Fetched {} record(s)", table.len()).bold());
    println!("{}", table.headers.join(" | ").cyan());
    println!("{}", "─".repeat(80).dimmed());

    for row in table.rows.iter().take(limit) {
        let cells: Vec<String> = row.iter().map(cell_text).collect();
        println!("{}", cells.join(" | "));
    }

    if table.len() > limit {
        println!(
            "{}",
            format!("... {} more (use --output to save all)", table.len() - limit).dimmed()
        );
    }
}

fn print_member(member: &HierarchyMember) {
    let mut line = format!("  {} {}", "▸".cyan(), member.name);
    if let Some(alias) = &member.alias {
        line.push_str(&format!(" ({})", alias));
    }
    if let Some(parent) = &member.parent {
        line.push_str(&format!(" {} {}", "←".dimmed(), parent.dimmed()));
    }
    if let Some(operator) = &member.operator {
        line.push_str(&format!(" [{}]", operator));
    }
    println!("{}", line);
}
