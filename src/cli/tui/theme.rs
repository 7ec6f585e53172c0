use console::style;
use inquire::ui::{Attributes, Color, RenderConfig, StyleSheet, Styled};

pub fn ragline_theme() -> RenderConfig<'static> {
    RenderConfig {
        prompt_prefix: Styled::new("?").with_fg(Color::LightCyan),
        answer: StyleSheet::new().with_fg(Color::LightCyan),
        help_message: StyleSheet::new()
            .with_fg(Color::DarkGrey)
            .with_attr(Attributes::ITALIC),
        ..Default::default()
    }
}

pub fn print_banner(documents: usize) {
    println!();
    println!("  {}  {}", style("💬").cyan(), style("ragline").cyan().bold());
    println!(
        "  {}",
        style(format!("{} document(s) indexed. Empty line or Esc to quit.", documents)).dim()
    );
    println!();
}

pub fn print_error(message: &str) {
    println!("  {} {}", style("✗").red(), message);
}
