//! The simulated page the controller runs against.

use super::controller::{MOON_ICON_CLASS, SUN_ICON_CLASS, TOGGLE_CLASS};
use crate::config::PageConfig;
use crate::dom::Document;

/// Builds a small page: a header holding the toggle control (when enabled)
/// and a content area.
pub fn build_document(page: &PageConfig) -> Document {
    let mut doc = Document::new();
    let body = doc.body();
    let header = doc.append_element(body, &["site-header"]);

    if page.toggle {
        let toggle = doc.append_element(header, &[TOGGLE_CLASS]);
        if page.sun_icon {
            doc.append_element(toggle, &["fas", SUN_ICON_CLASS]);
        }
        if page.moon_icon {
            doc.append_element(toggle, &["fas", MOON_ICON_CLASS]);
        }
    }

    doc.append_element(body, &["content"]);
    doc
}
