use std::fmt;
use std::io::Error;
use std::path::PathBuf;
use std::time::Instant;

use derive_setters::Setters;
use ratatui::crossterm::event::KeyEvent;

use crate::record::UserRecord;
use crate::tooltip::HoverTarget;

pub const DEFAULT_URL: &str = "https://randomuser.me/api/";
pub const DEFAULT_RESULTS: usize = 15;
pub const DEFAULT_DATE_FORMAT: &str = "%d.%m.%Y";

pub const NO_MATCH_MESSAGE: &str = "There is not such user";

pub const HELP_TEXT: &str = "Keys
  /        Focus the search box
  Esc      Leave the search box / close this popup
  Enter    Leave the search box
  r        Reset the search and show all users
  Ctrl+r   Reset while typing
  ?        Show this help
  q        Quit

Mouse
  Hover a picture to show the large version
  Click [ Reset ] to show all users";

#[derive(Debug)]
pub enum RosterError {
    IoError(Error),
    HttpError(reqwest::Error),
    DecodeError(serde_json::Error),
    FileNotFound(PathBuf),
    PermissionDenied(PathBuf),
    InvalidConfig(String),
    LoggingFailed(String),
    FetchInterrupted,
}

impl fmt::Display for RosterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RosterError::IoError(e) => write!(f, "{e}"),
            RosterError::HttpError(e) => write!(f, "{e}"),
            RosterError::DecodeError(e) => write!(f, "Invalid response: {e}"),
            RosterError::FileNotFound(path) => write!(f, "File not found: {}", path.display()),
            RosterError::PermissionDenied(path) => {
                write!(f, "Permission denied: {}", path.display())
            }
            RosterError::InvalidConfig(msg) => write!(f, "Invalid configuration: {msg}"),
            RosterError::LoggingFailed(msg) => write!(f, "Could not set up logging: {msg}"),
            RosterError::FetchInterrupted => write!(f, "Loading users stopped without a result"),
        }
    }
}

impl std::error::Error for RosterError {}

impl From<Error> for RosterError {
    fn from(err: Error) -> Self {
        RosterError::IoError(err)
    }
}

impl From<reqwest::Error> for RosterError {
    fn from(err: reqwest::Error) -> Self {
        RosterError::HttpError(err)
    }
}

impl From<serde_json::Error> for RosterError {
    fn from(err: serde_json::Error) -> Self {
        RosterError::DecodeError(err)
    }
}

#[derive(Debug)]
pub enum Message {
    Quit,
    Help,
    Exit,
    FocusSearch,
    Reset,
    RawKey(KeyEvent),
    Hover(Option<HoverTarget>),
    Loaded(Result<Vec<UserRecord>, RosterError>),
    Tick(Instant),
}

#[derive(Debug, Clone, Setters)]
pub struct RosterConfig {
    pub url: String,
    pub results: usize,
    pub file: Option<PathBuf>,
    pub debounce_ms: u64,
    pub event_poll_time: u64,
    pub date_format: String,
    pub timeout_secs: u64,
    pub max_column_width: usize,
}

impl Default for RosterConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.to_string(),
            results: DEFAULT_RESULTS,
            file: None,
            debounce_ms: 1000,
            event_poll_time: 100,
            date_format: DEFAULT_DATE_FORMAT.to_string(),
            timeout_secs: 10,
            max_column_width: 40,
        }
    }
}

impl RosterConfig {
    pub fn validate(self) -> Result<Self, RosterError> {
        use chrono::format::{Item, StrftimeItems};

        if StrftimeItems::new(&self.date_format).any(|item| matches!(item, Item::Error)) {
            return Err(RosterError::InvalidConfig(format!(
                "bad date format \"{}\"",
                self.date_format
            )));
        }
        if self.results == 0 {
            return Err(RosterError::InvalidConfig("results must be at least 1".into()));
        }
        if self.max_column_width < 8 {
            return Err(RosterError::InvalidConfig(
                "max column width must be at least 8".into(),
            ));
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let cfg = RosterConfig::default().validate().unwrap();
        assert_eq!(cfg.results, 15);
        assert_eq!(cfg.debounce_ms, 1000);
    }

    #[test]
    fn rejects_broken_date_format() {
        let err = RosterConfig::default()
            .date_format("%d.%Q".to_string())
            .validate()
            .unwrap_err();
        assert!(matches!(err, RosterError::InvalidConfig(_)));
    }

    #[test]
    fn rejects_zero_results() {
        let err = RosterConfig::default().results(0).validate().unwrap_err();
        assert!(err.to_string().contains("results"));
    }
}
