//! Decides, applies, persists and flips the page theme.

use serde_json::json;

use crate::dom::{CustomEvent, Document, ElementId};
use crate::storage::PreferenceStore;
use crate::system::{COLOR_SCHEME_QUERY, ColorScheme};
use crate::theme::Theme;

pub const STORAGE_KEY: &str = "theme";
pub const THEME_ATTRIBUTE: &str = "data-theme";
pub const THEME_CHANGED_EVENT: &str = "themeChanged";
pub const TOGGLE_CLASS: &str = "theme-toggle";
pub const SUN_ICON_CLASS: &str = "fa-sun";
pub const MOON_ICON_CLASS: &str = "fa-moon";
pub const ACTIVE_CLASS: &str = "active";

/// The clickable container plus its two optional icons.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToggleControl {
    pub container: ElementId,
    pub sun: Option<ElementId>,
    pub moon: Option<ElementId>,
}

impl ToggleControl {
    /// Icons are only looked up inside the container.
    pub fn locate(doc: &Document) -> Option<Self> {
        let container = doc.query_selector(TOGGLE_CLASS)?;
        Some(Self {
            container,
            sun: doc.query_selector_within(container, SUN_ICON_CLASS),
            moon: doc.query_selector_within(container, MOON_ICON_CLASS),
        })
    }

    /// Dark marks the sun active, light marks the moon.
    pub fn sync_icons(&self, doc: &mut Document, theme: Theme) {
        let (on, off) = match theme {
            Theme::Dark => (self.sun, self.moon),
            Theme::Light => (self.moon, self.sun),
        };
        if let Some(el) = on {
            doc.add_class(el, ACTIVE_CLASS);
        }
        if let Some(el) = off {
            doc.remove_class(el, ACTIVE_CLASS);
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ControllerOptions {
    /// Re-sync icons when an OS change is applied. Off keeps the icons
    /// showing whatever the last init or toggle set.
    pub sync_icons_on_os_change: bool,
}

pub struct ThemeController<S> {
    store: S,
    options: ControllerOptions,
    toggle: Option<ToggleControl>,
}

impl<S: PreferenceStore> ThemeController<S> {
    pub fn new(store: S, options: ControllerOptions) -> Self {
        Self {
            store,
            options,
            toggle: None,
        }
    }

    /// Page-ready step: pick the initial theme, apply it and wire the
    /// toggle control if the page has one.
    pub fn initialize(&mut self, doc: &mut Document, scheme: &dyn ColorScheme) -> Theme {
        self.toggle = ToggleControl::locate(doc);
        if self.toggle.is_none() {
            tracing::debug!("no .{TOGGLE_CLASS} on page; click handling disabled");
        }

        let theme = match self.persisted_preference() {
            Some(theme) => {
                tracing::debug!(%theme, "initial theme from stored preference");
                theme
            }
            None => {
                let theme = Theme::from_prefers_dark(scheme.prefers_dark());
                tracing::debug!(
                    %theme,
                    query = COLOR_SCHEME_QUERY,
                    "initial theme from color scheme"
                );
                theme
            }
        };

        apply_theme(doc, theme);
        if let Some(toggle) = &self.toggle {
            toggle.sync_icons(doc, theme);
        }
        theme
    }

    /// Routes a click. Only clicks landing on the wired control, or inside
    /// it, toggle; everything else is ignored.
    pub fn on_click(&mut self, doc: &mut Document, target: ElementId) -> Option<Theme> {
        let toggle = self.toggle?;
        if !doc.contains(toggle.container, target) {
            return None;
        }
        Some(self.flip(doc, toggle))
    }

    fn flip(&mut self, doc: &mut Document, toggle: ToggleControl) -> Theme {
        let current = Theme::from_attribute(doc.root_attribute(THEME_ATTRIBUTE));
        let next = current.opposite();

        apply_theme(doc, next);
        if let Err(e) = self.store.set(STORAGE_KEY, next.as_str()) {
            tracing::warn!("persist theme preference: {e:#}");
        }
        toggle.sync_icons(doc, next);

        let event = CustomEvent::new(THEME_CHANGED_EVENT, json!({ "theme": next }));
        let observers = doc.dispatch_event(&event);
        tracing::info!(from = %current, to = %next, observers, "theme toggled");
        next
    }

    /// Follows the OS signal until the user has chosen explicitly.
    pub fn on_color_scheme_change(&mut self, doc: &mut Document, dark: bool) -> Option<Theme> {
        if let Some(stored) = self.persisted_preference() {
            tracing::debug!(%stored, dark, "color scheme change ignored; preference stored");
            return None;
        }

        let theme = Theme::from_prefers_dark(dark);
        apply_theme(doc, theme);
        if self.options.sync_icons_on_os_change
            && let Some(toggle) = &self.toggle
        {
            toggle.sync_icons(doc, theme);
        }
        tracing::info!(%theme, "theme follows color scheme change");
        Some(theme)
    }

    /// The stored explicit choice. Unreadable or unknown values count as no
    /// choice.
    pub fn persisted_preference(&self) -> Option<Theme> {
        let raw = match self.store.get(STORAGE_KEY) {
            Ok(raw) => raw?,
            Err(e) => {
                tracing::warn!("read theme preference: {e:#}");
                return None;
            }
        };
        match raw.parse::<Theme>() {
            Ok(theme) => Some(theme),
            Err(e) => {
                tracing::warn!("ignoring stored preference: {e}");
                None
            }
        }
    }

    pub fn toggle_control(&self) -> Option<ToggleControl> {
        self.toggle
    }

    #[cfg(test)]
    pub fn store(&self) -> &S {
        &self.store
    }
}

fn apply_theme(doc: &mut Document, theme: Theme) {
    doc.set_root_attribute(THEME_ATTRIBUTE, theme.as_str());
}

/// Theme currently on the root element, if any valid one is set.
pub fn applied_theme(doc: &Document) -> Option<Theme> {
    doc.root_attribute(THEME_ATTRIBUTE)?.parse().ok()
}
