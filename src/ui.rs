//! Terminal output for startup

use colored::*;
use crossterm::terminal::size;

/// Display startup banner
pub fn display_banner(loaded: bool, chunks: usize, url: &str) {
    let terminal_width = size().map(|(w, _)| w as usize).unwrap_or(80);
    let banner_width = std::cmp::min(60, terminal_width.saturating_sub(4)).max(30);

    let top_border = format!("┌{}┐", "─".repeat(banner_width - 2));
    let bottom_border = format!("└{}┘", "─".repeat(banner_width - 2));

    let index_line = if loaded {
        format!("✅ Loaded index ({} chunks)", chunks)
    } else {
        format!("🆕 Built new index ({} chunks)", chunks)
    };

    println!();
    println!("{}", top_border.blue());
    println!("  {}", "📚 DocQA - Document Question Answering".blue().bold());
    println!("  {}", index_line);
    println!("  {} {}", "🌐".cyan(), url.underline());
    println!("{}", bottom_border.blue());
    println!("{}", "Press Ctrl-C to stop.".dimmed());
    println!();
}
