use std::sync::Arc;
use std::time::{Duration, Instant};

use ratatui::crossterm::event::KeyEvent;
use tracing::{debug, error, info, trace};

use crate::domain::{HELP_TEXT, Message, NO_MATCH_MESSAGE, RosterConfig, RosterError};
use crate::filter::{Debouncer, filter};
use crate::inputter::{InputResult, Inputter};
use crate::record::UserRecord;
use crate::region::{AlertKind, DisplayRegion};
use crate::table::render;
use crate::tooltip::{self, HoverTarget};

#[derive(Debug, PartialEq)]
pub enum Status {
    LOADING,
    READY,
    FAILED,
    QUITTING,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Modus {
    TABLE,
    SEARCH,
    POPUP,
}

/// All application state. Every change goes through `update`.
pub struct Model {
    config: RosterConfig,
    pub status: Status,
    modus: Modus,
    previous_modus: Modus,
    records: Option<Arc<Vec<UserRecord>>>,
    region: DisplayRegion,
    input: Inputter,
    last_input: InputResult,
    debouncer: Debouncer,
    popup_message: Option<String>,
    status_message: String,
}

impl Model {
    pub fn init(config: &RosterConfig) -> Self {
        let mut region = DisplayRegion::default();
        region.show_spinner();
        Self {
            config: config.clone(),
            status: Status::LOADING,
            modus: Modus::TABLE,
            previous_modus: Modus::TABLE,
            records: None,
            region,
            input: Inputter::default(),
            last_input: InputResult::default(),
            debouncer: Debouncer::new(Duration::from_millis(config.debounce_ms)),
            popup_message: None,
            status_message: "Loading users ...".to_string(),
        }
    }

    pub fn update(&mut self, message: Message) -> Result<(), RosterError> {
        match (self.modus, message) {
            (_, Message::Quit) => self.quit(),
            (_, Message::Loaded(result)) => self.loaded(result),
            (_, Message::Tick(now)) => self.tick(now),
            (_, Message::Hover(target)) => self.hover(target),
            (_, Message::Reset) => self.reset(),
            (Modus::POPUP, Message::Exit) => self.close_popup(),
            (Modus::POPUP, _) => {}
            (_, Message::Help) => self.show_help(),
            (_, Message::FocusSearch) => self.focus_search(),
            (Modus::SEARCH, Message::RawKey(key)) => self.raw_input(key),
            (Modus::SEARCH, Message::Exit) => self.blur_search(),
            (Modus::TABLE, _) => {}
        }
        Ok(())
    }

    pub fn quit(&mut self) {
        self.status = Status::QUITTING;
    }

    /// Whether key events go straight to the search box.
    pub fn raw_keyevents(&self) -> bool {
        self.modus == Modus::SEARCH
    }

    pub fn region(&self) -> &DisplayRegion {
        &self.region
    }

    pub fn search_input(&self) -> &InputResult {
        &self.last_input
    }

    pub fn popup_message(&self) -> Option<&str> {
        self.popup_message.as_deref()
    }

    pub fn status_message(&self) -> &str {
        &self.status_message
    }

    pub fn config(&self) -> &RosterConfig {
        &self.config
    }

    pub fn filter_pending(&self) -> bool {
        self.debouncer.is_pending()
    }

    fn set_status_message(&mut self, message: impl Into<String>) {
        self.status_message = message.into();
    }

    // -------------------- Control handling functions ---------------------- //

    fn loaded(&mut self, result: Result<Vec<UserRecord>, RosterError>) {
        if self.status != Status::LOADING {
            error!("Received a second fetch result, ignoring it");
            return;
        }
        self.region.remove_spinner();
        match result {
            Ok(records) => {
                info!("Loaded {} users", records.len());
                self.input.clear();
                self.last_input = self.input.get();
                let records = Arc::new(records);
                self.region
                    .replace_table(render(&records, &self.config.date_format));
                self.records = Some(records);
                self.status = Status::READY;
                self.set_status_message(format!("Loaded {} users", self.nrecords()));
            }
            Err(e) => {
                error!("Loading users failed: {e}");
                self.region.show_message(AlertKind::Error, e.to_string());
                self.status = Status::FAILED;
                self.set_status_message("Loading users failed");
            }
        }
    }

    fn nrecords(&self) -> usize {
        self.records.as_ref().map(|r| r.len()).unwrap_or(0)
    }

    fn tick(&mut self, now: Instant) {
        if self.debouncer.fire(now) {
            let query = self.last_input.input.clone();
            self.apply_filter(&query);
        }
    }

    fn hover(&mut self, target: Option<HoverTarget>) {
        tooltip::on_hover(&mut self.region, target);
    }

    fn apply_filter(&mut self, query: &str) {
        let Some(records) = self.records.clone() else {
            return;
        };
        let start_time = Instant::now();
        self.region.remove_table();
        let filtered = filter(&records, query);
        debug!(
            "Filtering for \"{}\" took {}ms",
            query,
            start_time.elapsed().as_millis()
        );

        if filtered.is_empty() {
            self.region.show_message(AlertKind::Info, NO_MATCH_MESSAGE);
            self.set_status_message(format!("No users match \"{}\"", query.trim()));
        } else {
            self.region.clear_message();
            self.region
                .replace_table(render(&filtered, &self.config.date_format));
            self.set_status_message(format!(
                "Showing {}/{} users",
                filtered.len(),
                records.len()
            ));
        }
    }

    fn reset(&mut self) {
        let Some(records) = self.records.clone() else {
            trace!("Nothing to reset, no users loaded");
            return;
        };
        self.debouncer.cancel();
        self.input.clear();
        self.last_input = self.input.get();
        if self.modus == Modus::SEARCH {
            self.blur_search();
        }
        self.region.clear_message();
        self.region
            .replace_table(render(&records, &self.config.date_format));
        self.set_status_message(format!("Showing all {} users", records.len()));
    }

    fn show_help(&mut self) {
        self.previous_modus = self.modus;
        self.modus = Modus::POPUP;
        self.popup_message = Some(HELP_TEXT.to_string());
    }

    fn close_popup(&mut self) {
        trace!("Close popup ...");
        self.modus = self.previous_modus;
        self.previous_modus = Modus::POPUP;
        self.popup_message = None;
    }

    fn focus_search(&mut self) {
        if self.records.is_none() {
            trace!("Search is not available before users are loaded");
            return;
        }
        trace!("Entering search ...");
        self.previous_modus = self.modus;
        self.modus = Modus::SEARCH;
        self.last_input = self.input.get();
    }

    fn blur_search(&mut self) {
        trace!("Leaving search ...");
        self.previous_modus = Modus::SEARCH;
        self.modus = Modus::TABLE;
        self.last_input.finished = false;
    }

    fn raw_input(&mut self, key: KeyEvent) {
        self.last_input = self.input.read(key);
        if self.last_input.changed {
            self.debouncer.schedule(Instant::now());
        }
        if self.last_input.finished {
            self.blur_search();
        }
    }
}
