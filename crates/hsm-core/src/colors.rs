//! ANSI color codes for terminal output.
//!
//! - Blue: section headers, state names
//! - Green: ids and hashes
//! - Yellow: warnings, conflicts
//! - Red: errors
//! - Dim: structure and secondary fields

/// ANSI color palette shared by the dump, diagnostics and trace renderers.
///
/// Standard 16-color codes only, so output reads the same on light and
/// dark terminals.
#[derive(Clone, Copy, Debug)]
pub struct Colors {
    pub blue: &'static str,
    pub green: &'static str,
    pub yellow: &'static str,
    pub red: &'static str,
    pub dim: &'static str,
    pub reset: &'static str,
}

impl Default for Colors {
    fn default() -> Self {
        Self::OFF
    }
}

impl Colors {
    pub const ON: Self = Self {
        blue: "\x1b[34m",
        green: "\x1b[32m",
        yellow: "\x1b[33m",
        red: "\x1b[31m",
        dim: "\x1b[2m",
        reset: "\x1b[0m",
    };

    pub const OFF: Self = Self {
        blue: "",
        green: "",
        yellow: "",
        red: "",
        dim: "",
        reset: "",
    };

    pub fn new(enabled: bool) -> Self {
        if enabled { Self::ON } else { Self::OFF }
    }

    pub fn is_enabled(&self) -> bool {
        !self.reset.is_empty()
    }

    /// Wrap `text` in `color` and reset.
    pub fn paint(&self, color: &'static str, text: impl std::fmt::Display) -> String {
        format!("{color}{text}{}", self.reset)
    }
}
