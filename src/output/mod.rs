//! Terminal output styling for migrate-import
//!
//! Every line the importer prints goes through one of these helpers so the
//! hook output stays readable inside the dependency manager's own log.

use owo_colors::OwoColorize;

/// Print a success message with a green checkmark
pub fn success(message: &str) {
    // Pastel mint green: RGB(152, 225, 152)
    println!(
        "{} {}",
        "✓".truecolor(152, 225, 152).bold(),
        message.bright_white()
    );
}

/// Print an error message with a red X
pub fn error(message: &str) {
    // Pastel coral/salmon: RGB(255, 160, 160)
    eprintln!(
        "{} {}",
        "✗".truecolor(255, 160, 160).bold(),
        message.truecolor(255, 160, 160)
    );
}

/// Print a warning message with a yellow warning symbol
pub fn warning(message: &str) {
    // Pastel cream/yellow: RGB(255, 230, 160)
    println!(
        "{} {}",
        "⚠".truecolor(255, 230, 160).bold(),
        message.bright_white()
    );
}

/// Print an info message with a blue info symbol
pub fn info(message: &str) {
    // Pastel sky blue: RGB(160, 200, 255)
    println!(
        "{} {}",
        "ℹ".truecolor(160, 200, 255).bold(),
        message.bright_white()
    );
}

/// Print a section header with a separator line
pub fn section(title: &str) {
    // Pastel lavender: RGB(181, 174, 254)
    println!("\n{}", title.truecolor(181, 174, 254).bold());
    println!("{}", "─".repeat(50).truecolor(160, 160, 160));
}

/// Print a key-value pair with styled key and value
pub fn key_value(key: &str, value: &str) {
    println!(
        "  {} {}",
        format!("{}:", key).truecolor(160, 160, 160),
        value.bright_white()
    );
}

/// Print dimmed text (for progress lines and secondary information)
pub fn dimmed(message: &str) {
    println!("{}", message.truecolor(160, 160, 160));
}

/// Print captured command output, indented, optionally highlighted as a failure
pub fn command_output(text: &str, failed: bool) {
    for line in text.lines() {
        if failed {
            eprintln!("    {}", line.truecolor(255, 160, 160));
        } else {
            println!("    {}", line.truecolor(160, 160, 160));
        }
    }
}

/// Print a blank line
pub fn blank() {
    println!();
}
