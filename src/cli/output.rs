//! Terminal output formatting with colors
//!
//! Respects NO_COLOR, CLICOLOR, CLICOLOR_FORCE automatically.

use colored::Colorize;

use crate::application::services::MindMapSummary;
use crate::application::surgery::DeleteReport;
use crate::domain::Statistics;

/// Print error (red bold "error:" prefix) to stderr
pub fn error(msg: &(impl std::fmt::Display + ?Sized)) {
    eprintln!("{}: {}", "error".red().bold(), msg);
}

/// Print warning (yellow "Warning:" prefix) to stderr
pub fn warning(msg: &(impl std::fmt::Display + ?Sized)) {
    eprintln!("{}: {}", "Warning".yellow(), msg);
}

/// Print success status (green checkmark)
pub fn success(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{} {}", "✓".green(), msg);
}

/// Print completed action (green label)
pub fn action(label: &str, msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{}: {}", label.green(), msg);
}

/// Print section header (cyan bold)
pub fn header(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{}", msg.to_string().cyan().bold());
}

pub fn diff_add(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("  {} {}", "+".green(), msg);
}

pub fn diff_remove(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("  {} {}", "-".red(), msg);
}

/// Print indented detail (no color)
pub fn detail(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("  {}", msg);
}

/// Print plain output (no color, for exported data)
pub fn info(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{}", msg);
}

/// One line per stored map: id, title, counts, last update.
pub fn summaries(maps: &[MindMapSummary]) {
    if maps.is_empty() {
        detail("(no mind maps)");
        return;
    }
    for m in maps {
        println!(
            "{}  {}  {}",
            m.id.to_string().dimmed(),
            m.title.bold(),
            format!(
                "{} nodes, {} edges, updated {}",
                m.node_count,
                m.edge_count,
                m.updated_at.format("%Y-%m-%d %H:%M")
            )
            .dimmed()
        );
    }
}

pub fn delete_report(report: &DeleteReport) {
    for id in &report.removed_nodes {
        diff_remove(&format!("node {id}"));
    }
    for id in &report.removed_edges {
        diff_remove(&format!("edge {id}"));
    }
    for id in &report.created_edges {
        diff_add(&format!("edge {id}"));
    }
    for id in &report.protected {
        warning(&format!("root node {id} is protected and was kept"));
    }
}

pub fn statistics(stats: &Statistics) {
    let root = stats
        .root_node_id
        .as_ref()
        .map(ToString::to_string)
        .unwrap_or_else(|| "-".to_string());
    let rows = [
        ("nodes", stats.total_nodes.to_string()),
        ("edges", stats.total_edges.to_string()),
        ("root", root),
        ("max depth", stats.max_depth.to_string()),
        ("avg children", format!("{:.2}", stats.average_children)),
        ("created", stats.created_at.to_rfc3339()),
        ("updated", stats.updated_at.to_rfc3339()),
    ];
    for (label, value) in rows {
        println!("{:>13}: {}", label.cyan(), value);
    }
}
