//! The platform's `(prefers-color-scheme: dark)` signal.

use dark_light::{Mode as OsThemeMode, detect as detect_os_theme};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;

use crate::app::events::{Event, SystemEvent};

pub const COLOR_SCHEME_QUERY: &str = "(prefers-color-scheme: dark)";

/// Answers whether the color-scheme media query currently matches.
pub trait ColorScheme {
    fn prefers_dark(&self) -> bool;
}

/// Asks the operating system on every query.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemColorScheme;

impl ColorScheme for SystemColorScheme {
    fn prefers_dark(&self) -> bool {
        matches!(detect_os_theme(), OsThemeMode::Dark)
    }
}

/// A signal pinned by config or the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedColorScheme(pub bool);

impl ColorScheme for FixedColorScheme {
    fn prefers_dark(&self) -> bool {
        self.0
    }
}

/// Where the color-scheme signal comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ColorSchemeSource {
    #[default]
    Auto,
    Dark,
    Light,
}

impl ColorSchemeSource {
    pub fn into_scheme(self) -> Box<dyn ColorScheme> {
        match self {
            ColorSchemeSource::Auto => Box::new(SystemColorScheme),
            ColorSchemeSource::Dark => Box::new(FixedColorScheme(true)),
            ColorSchemeSource::Light => Box::new(FixedColorScheme(false)),
        }
    }
}

/// Remembers the last answer and reports only changes.
#[derive(Debug)]
pub struct ColorSchemeWatcher<C> {
    scheme: C,
    last: bool,
}

impl<C: ColorScheme> ColorSchemeWatcher<C> {
    /// Takes the current answer as the baseline.
    pub fn new(scheme: C) -> Self {
        let last = scheme.prefers_dark();
        Self { scheme, last }
    }

    /// `Some(dark)` when the answer differs from the previous check.
    pub fn check(&mut self) -> Option<bool> {
        let dark = self.scheme.prefers_dark();
        if dark == self.last {
            return None;
        }
        self.last = dark;
        Some(dark)
    }
}

/// Watches the OS color scheme for the life of the page.
///
/// dark-light has no change notification, so the OS is asked again every
/// `period` and an event is sent only when the answer flips. The baseline
/// is read before this returns.
pub fn spawn_color_scheme_task<C>(tx: mpsc::Sender<Event>, scheme: C, period: Duration)
where
    C: ColorScheme + Send + 'static,
{
    let mut watcher = ColorSchemeWatcher::new(scheme);
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            let Some(dark) = watcher.check() else {
                continue;
            };
            tracing::debug!(dark, query = COLOR_SCHEME_QUERY, "color scheme changed");
            let ev = Event::System(SystemEvent::ColorSchemeChanged { dark });
            if tx.send(ev).await.is_err() {
                break;
            }
        }
    });
}
