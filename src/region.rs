use std::time::Instant;

use tracing::{debug, trace};

use crate::table::RenderedTable;
use crate::tooltip::Overlay;

pub const LOADING_TEXT: &str = "Loading...";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertKind {
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Alert {
    pub kind: AlertKind,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Spinner {
    pub started: Instant,
}

impl Spinner {
    pub fn frame(&self, now: Instant) -> char {
        const FRAMES: [char; 8] = ['⣾', '⣽', '⣻', '⢿', '⡿', '⣟', '⣯', '⣷'];
        let step = now.saturating_duration_since(self.started).as_millis() / 100;
        FRAMES[(step % FRAMES.len() as u128) as usize]
    }
}

/// The area below the search bar. Every kind of content has a single slot, so
/// there is never more than one indicator, message, table or overlay in it.
#[derive(Debug, Default)]
pub struct DisplayRegion {
    spinner: Option<Spinner>,
    message: Option<Alert>,
    table: Option<RenderedTable>,
    overlay: Option<Overlay>,
}

impl DisplayRegion {
    pub fn show_spinner(&mut self) {
        self.spinner = Some(Spinner {
            started: Instant::now(),
        });
    }

    /// Returns false if there was no indicator to remove.
    pub fn remove_spinner(&mut self) -> bool {
        self.spinner.take().is_some()
    }

    /// Show `text` unless a message is already visible. Returns whether it was shown.
    pub fn show_message(&mut self, kind: AlertKind, text: impl Into<String>) -> bool {
        if self.message.is_some() {
            trace!("A message is already visible, not adding another one");
            return false;
        }
        let alert = Alert {
            kind,
            text: text.into(),
        };
        debug!("Showing {:?} message \"{}\"", alert.kind, alert.text);
        self.message = Some(alert);
        true
    }

    pub fn clear_message(&mut self) {
        self.message = None;
    }

    /// Install `table`, dropping the previous table and any overlay that was
    /// anchored in it.
    pub fn replace_table(&mut self, table: RenderedTable) {
        self.remove_table();
        self.table = Some(table);
    }

    pub fn remove_table(&mut self) {
        self.overlay = None;
        self.table = None;
    }

    pub fn set_overlay(&mut self, overlay: Overlay) {
        self.overlay = Some(overlay);
    }

    pub fn remove_overlay(&mut self) -> Option<Overlay> {
        self.overlay.take()
    }

    pub fn spinner(&self) -> Option<&Spinner> {
        self.spinner.as_ref()
    }

    pub fn message(&self) -> Option<&Alert> {
        self.message.as_ref()
    }

    pub fn table(&self) -> Option<&RenderedTable> {
        self.table.as_ref()
    }

    pub fn overlay(&self) -> Option<&Overlay> {
        self.overlay.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::render;
    use ratatui::layout::Rect;
    use std::time::Duration;

    #[test]
    fn spinner_is_removed_once() {
        let mut region = DisplayRegion::default();
        region.show_spinner();
        assert!(region.spinner().is_some());
        assert!(region.remove_spinner());
        assert!(!region.remove_spinner());
        assert!(region.spinner().is_none());
    }

    #[test]
    fn messages_do_not_stack() {
        let mut region = DisplayRegion::default();
        assert!(region.show_message(AlertKind::Info, "first"));
        assert!(!region.show_message(AlertKind::Error, "second"));
        let alert = region.message().unwrap();
        assert_eq!(alert.text, "first");
        assert_eq!(alert.kind, AlertKind::Info);

        region.clear_message();
        assert!(region.message().is_none());
        assert!(region.show_message(AlertKind::Error, "second"));
    }

    #[test]
    fn replacing_table_drops_the_overlay() {
        let mut region = DisplayRegion::default();
        region.replace_table(render(&[], "%d.%m.%Y"));
        region.set_overlay(Overlay {
            row: 0,
            url: "u".into(),
            anchor: Rect::new(0, 0, 1, 1),
        });
        region.replace_table(render(&[], "%d.%m.%Y"));
        assert!(region.table().is_some());
        assert!(region.overlay().is_none());
    }

    #[test]
    fn spinner_frames_advance() {
        let spinner = Spinner {
            started: Instant::now(),
        };
        let first = spinner.frame(spinner.started);
        let later = spinner.frame(spinner.started + Duration::from_millis(100));
        assert_ne!(first, later);
        assert_eq!(first, spinner.frame(spinner.started + Duration::from_millis(800)));
    }
}
