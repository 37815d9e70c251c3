//! Presentation layer. Everything here is a pure function of a `WorkflowState`
//! snapshot plus the injected `DisplayOptions`; the controller never sees either.

pub mod notice;
pub mod progress;
pub mod render;

use clap::ValueEnum;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn done_mark(self) -> &'static str {
        match self {
            Theme::Light => "[x]",
            Theme::Dark => "●",
        }
    }

    pub fn todo_mark(self) -> &'static str {
        match self {
            Theme::Light => "[ ]",
            Theme::Dark => "○",
        }
    }

    pub fn rule(self) -> &'static str {
        match self {
            Theme::Light => "----------------------------------------",
            Theme::Dark => "════════════════════════════════════════",
        }
    }
}

/// Presentation settings, built once at startup and passed to every renderer.
#[derive(Debug, Clone)]
pub struct DisplayOptions {
    pub theme: Theme,
    /// Show step descriptions and progress percentages.
    pub show_details: bool,
    /// Snippets longer than this many characters are cut with an ellipsis.
    pub snippet_width: usize,
}

impl Default for DisplayOptions {
    fn default() -> Self {
        Self {
            theme: Theme::Light,
            show_details: false,
            snippet_width: 160,
        }
    }
}
