use crate::export::PopulateSummary;
use crate::ui::{Icons, stats_table, theme};
use owo_colors::OwoColorize;

pub fn header(text: &str) {
    println!("{} {}", Icons::SNAKE, text.style(theme().header.clone()));
}

pub fn success(label: &str) {
    println!("{} {}", Icons::CHECK, label.style(theme().success.clone()));
}

pub fn error(label: &str) {
    eprintln!("{} {}", Icons::CROSS, label.style(theme().error.clone()));
}

pub fn warn(label: &str) {
    eprintln!("{} {}", Icons::WARN, label.style(theme().warn.clone()));
}

pub fn info(label: &str, value: &str) {
    println!(
        "{} {}: {}",
        Icons::INFO.style(theme().info.clone()),
        label.style(theme().dim.clone()),
        value.style(theme().value.clone())
    );
}

pub fn section(title: &str) {
    println!();
    println!("━{}━", title.style(theme().header.clone()));
}

pub fn timing(elapsed: &str) {
    println!("{} {}", Icons::CLOCK.style(theme().dim.clone()), elapsed);
}

pub fn summary_row(label: &str, value: &str) {
    println!("  {} {}", label.style(theme().dim.clone()), value);
}

/// Report of a `load` run
pub fn graph_updated(summary: &PopulateSummary) {
    success("Graph successfully updated.");
    let nodes = summary.nodes_added.to_string();
    let edges = summary.edges_added.to_string();
    println!(
        "{}",
        stats_table(&[
            ("graph name", summary.graph_name.as_str()),
            ("nodes added", nodes.as_str()),
            ("edges added", edges.as_str()),
        ])
    );
}
