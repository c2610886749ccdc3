use encyclodiff_core::{ComparisonResult, SimilarityCategory};
use owo_colors::OwoColorize;

use crate::VERSION;

/// Print a styled banner for verbose mode
pub fn print_banner() {
    eprintln!("\n{} {} {}", "Encyclodiff".bold().bright_blue(), "v".dimmed(), VERSION.dimmed());
    eprintln!("{}", "Compare encyclopedia pages across sources\n".dimmed());
}

/// Print a styled step message
pub fn print_step(step: usize, total: usize, message: &str) {
    eprintln!("{} {}", format!("[{}/{}]", step, total).dimmed(), message.bright_cyan());
}

/// Print a success message
pub fn print_success(message: &str) {
    eprintln!("{} {}", "✓".green(), message.bright_green());
}

/// Print an info message
pub fn print_info(message: &str) {
    eprintln!("{} {}", "ℹ".blue(), message.bright_blue());
}

/// Print a warning message
pub fn print_warning(message: &str) {
    eprintln!("{} {}", "⚠".yellow(), message.bright_yellow());
}

/// Print a labelled value, indented under the current step
pub fn print_detail(label: &str, value: &str) {
    eprintln!("  {} {}", format!("{}:", label).dimmed(), value.bright_white());
}

/// Print one comparison with its similarity color coded by category
pub fn print_comparison(result: &ComparisonResult) {
    let similarity = format!("{:.2}%", result.text_similarity * 100.0);
    let similarity = match result.similarity_category {
        SimilarityCategory::High => similarity.bright_green().to_string(),
        SimilarityCategory::Medium => similarity.bright_yellow().to_string(),
        SimilarityCategory::Low => similarity.bright_red().to_string(),
    };

    eprintln!(
        "  {} {} ({})",
        format!("{}:", result.topic).dimmed(),
        similarity,
        result.similarity_category.as_str().dimmed()
    );
}

/// Print elapsed time for a stage
pub fn print_timing(label: &str, duration: std::time::Duration) {
    eprintln!("  {} {:>8.2}s", format!("{}:", label).dimmed(), duration.as_secs_f64());
}

/// Print a horizontal section header
pub fn print_header(title: &str) {
    eprintln!("\n{}", "═".repeat(60).dimmed());
    eprintln!("{}", title.bold().cyan());
    eprintln!("{}", "═".repeat(60).dimmed());
}

/// Format file size for display
pub fn format_size(bytes: usize) -> String {
    const KB: usize = 1024;
    const MB: usize = 1024 * KB;

    if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}
