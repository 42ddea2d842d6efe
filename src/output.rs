//! Colored output for gig
//!
//! Uses owo-colors for terminal colors. Progress bars live in
//! [`crate::acquire::progress`].

use owo_colors::OwoColorize;

/// Print an action header (blue, bold)
/// Example: "==> Fetching zlib-1.3.1"
pub fn action(message: &str) {
    println!("{} {}", "==>".blue().bold(), message.bold());
}

/// Print a sub-action (cyan arrow)
/// Example: "  -> verify"
pub fn sub_action(phase: &str) {
    println!("  {} {}", "->".cyan(), phase);
}

/// Print a detail line (dimmed)
/// Example: "     downloading https://..."
pub fn detail(message: &str) {
    println!("     {}", message.dimmed());
}

/// Print a success message (green)
pub fn success(message: &str) {
    println!("{} {}", "==>".green().bold(), message.green());
}

/// Print an info message (cyan)
pub fn info(message: &str) {
    println!("{} {}", "::".cyan(), message);
}

/// Print a warning message (yellow)
pub fn warning(message: &str) {
    eprintln!("{} {}", "warning:".yellow().bold(), message.yellow());
}

/// Print an error message (red)
pub fn error(message: &str) {
    eprintln!("{} {}", "error:".red().bold(), message.red());
}

/// Print a `key: value` line for `gig info`
pub fn field(key: &str, value: &str) {
    println!("  {:<14} {}", format!("{}:", key).bold(), value);
}

/// Print a search hit
pub fn list_item(name: &str, location: &str) {
    println!("  {} {}", name.green(), location.dimmed());
}
