//! Human-facing output for pathrun
//!
//! Styled status lines for summaries and listings. Structured events go
//! through `tracing`; this is only what a person reads at the end of a command.

use console::style;

/// Output handler for consistent CLI formatting
pub struct Output {
    quiet: bool,
}

impl Output {
    pub fn new(quiet: bool) -> Self {
        Self { quiet }
    }

    pub fn success(&self, message: &str) {
        if !self.quiet {
            println!("{} {}", style("✔").green(), message);
        }
    }

    /// Errors are always shown, even in quiet mode
    pub fn error(&self, message: &str) {
        eprintln!("{} {}", style("✖").red(), message);
    }

    pub fn warning(&self, message: &str) {
        if !self.quiet {
            println!("{} {}", style("⚠").yellow(), message);
        }
    }

    pub fn info(&self, message: &str) {
        if !self.quiet {
            println!("{} {}", style("ℹ").blue(), message);
        }
    }

    /// Print a section header with enhanced styling
    pub fn section_header(&self, title: &str) {
        if !self.quiet {
            println!("\n{}", style(title).bold().cyan());
        }
    }

    /// Print a key-value pair with consistent styling
    pub fn key_value(&self, key: &str, value: &str, highlight: bool) {
        if !self.quiet {
            let styled_value = if highlight {
                style(value).green().bold()
            } else {
                style(value).white()
            };
            println!("  {:<10} {}", style(key).dim(), styled_value);
        }
    }

    /// Print a job outcome line, green when every command succeeded
    pub fn job_result(&self, name: &str, detail: &str, success: bool) {
        if !self.quiet {
            let (icon, styled_name) = if success {
                (style("✓").green().bold(), style(name).green().bold())
            } else {
                (style("✗").red().bold(), style(name).red().bold())
            };
            println!("{} {} {}", icon, styled_name, style(detail).dim());
        }
    }
}
