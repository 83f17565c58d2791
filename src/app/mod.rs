pub mod controller;
pub mod events;
pub mod page;

use crate::config::Config;
use crate::dom::Document;
use crate::storage::PreferenceStore;
use crate::system::ColorScheme;
use crate::theme::Theme;
use controller::{ACTIVE_CLASS, ControllerOptions, STORAGE_KEY, ThemeController};
use events::{Event, InputEvent, SystemEvent};
use std::fmt;
use std::ops::ControlFlow;
use tokio::sync::mpsc;

/// Snapshot of what the page currently shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    pub theme: Option<Theme>,
    pub stored: Option<Theme>,
    pub toggle_present: bool,
    pub sun_active: bool,
    pub moon_active: bool,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let opt = |t: Option<Theme>| t.map(Theme::as_str).unwrap_or("-");
        write!(f, "theme={} stored={}", opt(self.theme), opt(self.stored))?;
        if self.toggle_present {
            let icon = |active: bool| if active { "on" } else { "off" };
            write!(f, " sun={} moon={}", icon(self.sun_active), icon(self.moon_active))?;
        } else {
            write!(f, " toggle=absent")?;
        }
        Ok(())
    }
}

pub struct App<S> {
    doc: Document,
    controller: ThemeController<S>,
    scheme: Box<dyn ColorScheme>,
}

impl<S: PreferenceStore> App<S> {
    pub fn new(cfg: &Config, store: S, scheme: Box<dyn ColorScheme>) -> Self {
        let doc = page::build_document(&cfg.page);
        let options = ControllerOptions {
            sync_icons_on_os_change: cfg.behavior.sync_icons_on_os_change,
        };
        Self {
            doc,
            controller: ThemeController::new(store, options),
            scheme,
        }
    }

    /// For registering observers before the page starts.
    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.doc
    }

    /// Page-ready.
    pub fn start(&mut self) -> Theme {
        self.controller.initialize(&mut self.doc, self.scheme.as_ref())
    }

    pub fn handle_event(&mut self, ev: Event) -> ControlFlow<()> {
        match ev {
            Event::Input(InputEvent::Click { class }) => match self.doc.query_selector(&class) {
                Some(target) => {
                    if self.controller.on_click(&mut self.doc, target).is_none() {
                        tracing::debug!(%class, "click had no theme effect");
                    }
                }
                None => tracing::debug!(%class, "click target not on page"),
            },
            Event::Input(InputEvent::Status) => println!("{}", self.status()),
            Event::Input(InputEvent::Quit) => return ControlFlow::Break(()),
            Event::System(SystemEvent::ColorSchemeChanged { dark }) => {
                self.controller.on_color_scheme_change(&mut self.doc, dark);
            }
        }
        ControlFlow::Continue(())
    }

    /// Handles events until quit or until every sender is gone.
    pub async fn run(&mut self, mut rx: mpsc::Receiver<Event>) {
        while let Some(ev) = rx.recv().await {
            if self.handle_event(ev).is_break() {
                break;
            }
        }
    }

    pub fn status(&self) -> Status {
        let toggle = self.controller.toggle_control();
        let active = |el: Option<crate::dom::ElementId>| {
            el.is_some_and(|el| self.doc.has_class(el, ACTIVE_CLASS))
        };
        Status {
            theme: controller::applied_theme(&self.doc),
            stored: self.controller.persisted_preference(),
            toggle_present: toggle.is_some(),
            sun_active: active(toggle.and_then(|t| t.sun)),
            moon_active: active(toggle.and_then(|t| t.moon)),
        }
    }

    #[cfg(test)]
    pub fn store(&self) -> &S {
        self.controller.store()
    }
}

/// Removes the stored explicit choice so the page follows the OS again.
pub fn forget_preference(store: &mut dyn PreferenceStore) -> anyhow::Result<()> {
    store.remove(STORAGE_KEY)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PageConfig;
    use crate::storage::{MemoryStore, Storage};
    use crate::system::FixedColorScheme;
    use super::controller::THEME_CHANGED_EVENT;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn click_toggle() -> Event {
        Event::Input(InputEvent::Click {
            class: controller::TOGGLE_CLASS.to_string(),
        })
    }

    fn os(dark: bool) -> Event {
        Event::System(SystemEvent::ColorSchemeChanged { dark })
    }

    fn app(cfg: &Config, store: MemoryStore, dark: bool) -> App<MemoryStore> {
        App::new(cfg, store, Box::new(FixedColorScheme(dark)))
    }

    #[test]
    fn test_start_and_toggle_through_events() {
        let cfg = Config::default();
        let mut app = app(&cfg, MemoryStore::new(), true);
        assert_eq!(app.start(), Theme::Dark);
        assert_eq!(
            app.status(),
            Status {
                theme: Some(Theme::Dark),
                stored: None,
                toggle_present: true,
                sun_active: true,
                moon_active: false,
            }
        );

        assert!(app.handle_event(click_toggle()).is_continue());
        let status = app.status();
        assert_eq!(status.theme, Some(Theme::Light));
        assert_eq!(status.stored, Some(Theme::Light));
        assert!(status.moon_active && !status.sun_active);
    }

    #[test]
    fn test_click_on_icon_class_toggles() {
        let cfg = Config::default();
        let mut app = app(&cfg, MemoryStore::new(), false);
        app.start();

        let _ = app.handle_event(Event::Input(InputEvent::Click {
            class: controller::SUN_ICON_CLASS.to_string(),
        }));
        assert_eq!(app.status().theme, Some(Theme::Dark));
    }

    #[test]
    fn test_click_on_unknown_or_outside_element() {
        let cfg = Config::default();
        let mut app = app(&cfg, MemoryStore::new(), false);
        app.start();

        for class in ["nope", "content"] {
            let _ = app.handle_event(Event::Input(InputEvent::Click {
                class: class.to_string(),
            }));
        }
        assert_eq!(app.status().theme, Some(Theme::Light));
        assert_eq!(app.status().stored, None);
    }

    #[test]
    fn test_os_changes_until_user_chooses() {
        let cfg = Config::default();
        let mut app = app(&cfg, MemoryStore::new(), false);
        app.start();

        let _ = app.handle_event(os(true));
        assert_eq!(app.status().theme, Some(Theme::Dark));
        // Icons stay where init left them.
        assert!(app.status().moon_active);

        let _ = app.handle_event(click_toggle());
        assert_eq!(app.status().theme, Some(Theme::Light));

        let _ = app.handle_event(os(true));
        assert_eq!(app.status().theme, Some(Theme::Light));
    }

    #[test]
    fn test_os_change_syncs_icons_with_flag() {
        let mut cfg = Config::default();
        cfg.behavior.sync_icons_on_os_change = true;
        let mut app = app(&cfg, MemoryStore::new(), false);
        app.start();

        let _ = app.handle_event(os(true));
        let status = app.status();
        assert!(status.sun_active && !status.moon_active);
    }

    #[test]
    fn test_page_without_toggle() {
        let mut cfg = Config::default();
        cfg.page = PageConfig {
            toggle: false,
            sun_icon: true,
            moon_icon: true,
        };
        let mut app = app(&cfg, MemoryStore::new(), true);
        assert_eq!(app.start(), Theme::Dark);

        let _ = app.handle_event(click_toggle());
        let status = app.status();
        assert_eq!(status.theme, Some(Theme::Dark));
        assert!(!status.toggle_present);
        assert_eq!(status.to_string(), "theme=dark stored=- toggle=absent");
    }

    #[test]
    fn test_quit_breaks() {
        let cfg = Config::default();
        let mut app = app(&cfg, MemoryStore::new(), true);
        app.start();
        assert!(app.handle_event(Event::Input(InputEvent::Quit)).is_break());
    }

    #[test]
    fn test_status_display() {
        let status = Status {
            theme: Some(Theme::Light),
            stored: Some(Theme::Light),
            toggle_present: true,
            sun_active: false,
            moon_active: true,
        };
        assert_eq!(status.to_string(), "theme=light stored=light sun=off moon=on");
    }

    #[test]
    fn test_preference_persists_across_page_loads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.sqlite3");
        let cfg = Config::default();

        {
            let store = Storage::open(&path).unwrap();
            let mut app = App::new(&cfg, store, Box::new(FixedColorScheme(true)));
            app.start();
            let _ = app.handle_event(click_toggle());
        }

        let store = Storage::open(&path).unwrap();
        let mut app = App::new(&cfg, store, Box::new(FixedColorScheme(true)));
        assert_eq!(app.start(), Theme::Light);
    }

    #[test]
    fn test_forget_preference() {
        let mut store = MemoryStore::new();
        store.set(STORAGE_KEY, "dark").unwrap();
        forget_preference(&mut store).unwrap();

        let cfg = Config::default();
        let mut app = app(&cfg, store, false);
        assert_eq!(app.start(), Theme::Light);
    }

    #[tokio::test]
    async fn test_run_consumes_channel_and_notifies() {
        let cfg = Config::default();
        let mut app = app(&cfg, MemoryStore::new(), true);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let s = seen.clone();
        app.document_mut().add_event_listener(THEME_CHANGED_EVENT, move |e| {
            s.borrow_mut().push(e.detail.clone())
        });
        app.start();

        let (tx, rx) = mpsc::channel(8);
        tx.send(click_toggle()).await.unwrap();
        tx.send(click_toggle()).await.unwrap();
        tx.send(os(false)).await.unwrap();
        drop(tx);

        app.run(rx).await;
        assert_eq!(app.status().theme, Some(Theme::Dark));
        assert_eq!(app.store().get(STORAGE_KEY).unwrap().as_deref(), Some("dark"));
        assert_eq!(
            *seen.borrow(),
            vec![
                serde_json::json!({ "theme": "light" }),
                serde_json::json!({ "theme": "dark" }),
            ]
        );
    }

    #[tokio::test]
    async fn test_run_stops_at_quit() {
        let cfg = Config::default();
        let mut app = app(&cfg, MemoryStore::new(), true);
        app.start();

        let (tx, rx) = mpsc::channel(8);
        tx.send(Event::Input(InputEvent::Quit)).await.unwrap();
        tx.send(click_toggle()).await.unwrap();

        app.run(rx).await;
        assert_eq!(app.status().theme, Some(Theme::Dark));
    }
}
