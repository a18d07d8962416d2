//! Terminal output for no-push-oops
//!
//! Consistent, styled progress lines for the check run: banners, per-command
//! start and result lines, and captured error output.

use console::style;

const BANNER_RULE: &str = "========";

/// Output handler for consistent CLI formatting
#[derive(Debug, Clone, Copy, Default)]
pub struct Output {
    quiet: bool,
}

impl Output {
    /// Create a new output handler
    pub fn new(quiet: bool) -> Self {
        Self { quiet }
    }

    /// Output handler that only prints errors
    pub fn quiet() -> Self {
        Self::new(true)
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        if !self.quiet {
            println!("{} {}", style("✔").green(), style(message).green());
        }
    }

    /// Print an error message
    pub fn error(&self, message: &str) {
        // Errors are always shown, even in quiet mode
        eprintln!("{} {}", style("✖").red(), style(message).red());
    }

    /// Print a warning message
    pub fn warning(&self, message: &str) {
        if !self.quiet {
            println!("{} {}", style("⚠").yellow(), style(message).yellow());
        }
    }

    /// Print an info message
    pub fn info(&self, message: &str) {
        if !self.quiet {
            println!("{} {}", style("ℹ").blue(), message);
        }
    }

    /// Print a step in a process
    pub fn step(&self, step: &str) {
        if !self.quiet {
            println!("{} {}", style("❯").cyan(), style(step).blue());
        }
    }

    /// Print the banner that opens a check run
    pub fn banner(&self, message: &str) {
        if !self.quiet {
            println!(
                "\n{}\n",
                style(format!("{BANNER_RULE} {message} {BANNER_RULE}")).cyan().bold()
            );
        }
    }

    /// Print the closing banner of a check run
    pub fn verdict_banner(&self, message: &str, passed: bool) {
        let line = format!("{BANNER_RULE} {message} {BANNER_RULE}");
        if passed {
            if !self.quiet {
                println!("\n{}", style(line).green().bold());
            }
        } else {
            eprintln!("\n{}", style(line).red().bold());
        }
    }

    /// Print captured stderr of a failed command, indented
    pub fn captured(&self, text: &str) {
        for line in text.trim_end().lines() {
            eprintln!("    {}", style(line).red());
        }
    }

    /// Print a section header
    pub fn header(&self, title: &str) {
        if !self.quiet {
            println!("\n{}", style(title).bold().underlined());
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
            println!("  {:<18} {}", style(key).dim(), styled_value);
        }
    }

    /// Print a list item
    pub fn list_item(&self, item: &str) {
        if !self.quiet {
            println!("    • {item}");
        }
    }
}
