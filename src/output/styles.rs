//! Output styles using the owo-colors stylesheet pattern.
//!
//! `Styles::default()` renders everything unstyled; `colorize()` switches
//! the sheet to the colored variant. `OutputContext` decides which one a
//! run gets, so color policy lives in exactly one place.

use owo_colors::Style;

/// Stylesheet for every glyph and label the CLI prints.
#[derive(Default, Clone)]
pub struct Styles {
    /// `✓` lines for completed steps (green).
    pub success: Style,
    /// `⚠` lines for degraded-but-continuing steps (yellow).
    pub warning: Style,
    /// `✗` lines on stderr when the pipeline aborts (red).
    pub error: Style,
    /// `ℹ` notices such as the dry-run banner (blue).
    pub info: Style,
    /// Secondary text: summary keys and verbose detail lines.
    pub dim: Style,
    /// Section headers and the live `→` step arrows (bold cyan).
    pub header: Style,
}

impl Styles {
    /// Apply colors to the stylesheet.
    pub fn colorize(&mut self) {
        self.success = Style::new().green();
        self.warning = Style::new().yellow();
        self.error = Style::new().red();
        self.info = Style::new().blue();
        self.dim = Style::new().dimmed();
        self.header = Style::new().bold().cyan();
    }
}
