//! Binary light/dark theme value.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    /// The other theme. There is no third state.
    pub fn opposite(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    /// Maps the `(prefers-color-scheme: dark)` signal to a theme.
    pub fn from_prefers_dark(dark: bool) -> Self {
        if dark { Theme::Dark } else { Theme::Light }
    }

    /// Reads the applied theme from the root attribute.
    ///
    /// Only an exact `"dark"` counts as dark; a missing or foreign value
    /// reads as light, so toggling from it lands on dark.
    pub fn from_attribute(value: Option<&str>) -> Self {
        match value {
            Some("dark") => Theme::Dark,
            _ => Theme::Light,
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string is neither `"light"` nor `"dark"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseThemeError {
    pub value: String,
}

impl fmt::Display for ParseThemeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown theme '{}' (expected 'light' or 'dark')", self.value)
    }
}

impl std::error::Error for ParseThemeError {}

impl FromStr for Theme {
    type Err = ParseThemeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            other => Err(ParseThemeError {
                value: other.to_string(),
            }),
        }
    }
}
