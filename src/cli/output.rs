//! Terminal output formatting with colors
//!
//! Respects NO_COLOR, CLICOLOR, CLICOLOR_FORCE automatically.

use colored::Colorize;
use itertools::Itertools;

use crate::domain::Category;

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

/// Print labelled detail, indented
pub fn field(label: &str, value: &(impl std::fmt::Display + ?Sized)) {
    println!("  {:<12} {}", format!("{label}:").dimmed(), value);
}

/// Print plain output (no color, for data)
pub fn info(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{}", msg);
}

/// One-line listing: name, sort order, inactive marker.
pub fn category_line(category: &Category) -> String {
    let mut line = format!("{}  {}", category.name, format_sort(category.sort_order).dimmed());
    if !category.active {
        line.push_str(&format!("  {}", "(inactive)".yellow()));
    }
    line
}

/// Tree node label; inactive categories are dimmed.
pub fn tree_label(category: &Category) -> String {
    if category.active {
        category.name.clone()
    } else {
        format!("{} {}", category.name.dimmed(), "(inactive)".yellow())
    }
}

/// Ancestor chain rendered root first: `Fashion > Women's Wear`.
pub fn breadcrumb<'a>(chain: impl DoubleEndedIterator<Item = &'a Category>) -> String {
    chain.rev().map(|c| c.name.as_str()).join(" > ")
}

fn format_sort(sort_order: f64) -> String {
    format!("[{sort_order}]")
}
