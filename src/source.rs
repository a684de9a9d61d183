use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};

use tracing::{error, info, instrument};

use crate::domain::{RosterConfig, RosterError};
use crate::record::{UserRecord, parse_payload};

pub type FetchResult = Result<Vec<UserRecord>, RosterError>;

/// Where the user records come from. Fetching happens once per session.
pub trait RecordSource: Send {
    fn fetch(&self) -> FetchResult;
    fn describe(&self) -> String;
}

pub struct HttpRecordSource {
    url: String,
    results: usize,
    client: reqwest::blocking::Client,
}

impl HttpRecordSource {
    pub fn new(url: &str, results: usize, timeout: Duration) -> Result<Self, RosterError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()?;
        Ok(Self {
            url: url.to_string(),
            results,
            client,
        })
    }
}

impl RecordSource for HttpRecordSource {
    #[instrument(skip(self), fields(url = %self.url))]
    fn fetch(&self) -> FetchResult {
        let body = self
            .client
            .get(&self.url)
            .query(&[("results", self.results)])
            .send()?
            .error_for_status()?
            .text()?;
        parse_payload(&body)
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}

pub struct FileRecordSource {
    path: PathBuf,
}

impl FileRecordSource {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl RecordSource for FileRecordSource {
    #[instrument(skip(self), fields(path = %self.path.display()))]
    fn fetch(&self) -> FetchResult {
        let body = fs::read_to_string(&self.path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => RosterError::FileNotFound(self.path.clone()),
            ErrorKind::PermissionDenied => RosterError::PermissionDenied(self.path.clone()),
            _ => RosterError::IoError(e),
        })?;
        parse_payload(&body)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

pub fn from_config(cfg: &RosterConfig) -> Result<Box<dyn RecordSource>, RosterError> {
    match &cfg.file {
        Some(path) => Ok(Box::new(FileRecordSource::new(path.clone()))),
        None => Ok(Box::new(HttpRecordSource::new(
            &cfg.url,
            cfg.results,
            Duration::from_secs(cfg.timeout_secs),
        )?)),
    }
}

/// Run the one fetch of the session on a worker thread. The result arrives on the
/// returned channel exactly once.
pub fn spawn_fetch(source: Box<dyn RecordSource>) -> flume::Receiver<FetchResult> {
    let (tx, rx) = flume::bounded(1);
    thread::spawn(move || {
        let start_time = Instant::now();
        let result = source.fetch();
        let fetch_duration = start_time.elapsed().as_millis();
        match &result {
            Ok(records) => info!(
                "Fetched {} records from {} in {fetch_duration}ms",
                records.len(),
                source.describe()
            ),
            Err(e) => error!("Fetching from {} failed: {e}", source.describe()),
        }
        if tx.send(result).is_err() {
            error!("Fetch result was dropped, the receiver is gone");
        }
    });
    rx
}

/// Non-blocking check for the fetch result. A worker that went away without
/// sending counts as a failed fetch.
pub fn poll_fetch(pending: &flume::Receiver<FetchResult>) -> Option<FetchResult> {
    match pending.try_recv() {
        Ok(result) => Some(result),
        Err(flume::TryRecvError::Empty) => None,
        Err(flume::TryRecvError::Disconnected) => {
            error!("Fetch worker ended without a result");
            Some(Err(RosterError::FetchInterrupted))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const FIXTURE: &str = include_str!("../tests/fixtures/users.json");

    async fn fetch_blocking(url: String) -> FetchResult {
        tokio::task::spawn_blocking(move || {
            HttpRecordSource::new(&url, 15, Duration::from_secs(5))?.fetch()
        })
        .await
        .unwrap()
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn http_source_requests_fifteen_results() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/"))
            .and(query_param("results", "15"))
            .respond_with(ResponseTemplate::new(200).set_body_string(FIXTURE))
            .expect(1)
            .mount(&mock_server)
            .await;

        let users = fetch_blocking(format!("{}/api/", mock_server.uri()))
            .await
            .unwrap();
        assert_eq!(users.len(), 15);
        assert_eq!(users[1].full_name(), "Bob Jones");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn http_error_status_is_a_failure() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&mock_server)
            .await;

        let err = fetch_blocking(format!("{}/api/", mock_server.uri()))
            .await
            .unwrap_err();
        assert!(matches!(err, RosterError::HttpError(_)));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn non_json_body_is_a_failure() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&mock_server)
            .await;

        let err = fetch_blocking(format!("{}/api/", mock_server.uri()))
            .await
            .unwrap_err();
        assert!(matches!(err, RosterError::DecodeError(_)));
    }

    #[test]
    fn file_source_reads_payload() {
        let source = FileRecordSource::new(PathBuf::from(concat!(
            env!("CARGO_MANIFEST_DIR"),
            "/tests/fixtures/users.json"
        )));
        assert_eq!(source.fetch().unwrap().len(), 15);
    }

    #[test]
    fn missing_file_is_reported() {
        let source = FileRecordSource::new(PathBuf::from("/does/not/exist.json"));
        assert!(matches!(source.fetch(), Err(RosterError::FileNotFound(_))));
    }

    #[test]
    fn spawned_fetch_delivers_once() {
        let source = FileRecordSource::new(PathBuf::from(concat!(
            env!("CARGO_MANIFEST_DIR"),
            "/tests/fixtures/users.json"
        )));
        let rx = spawn_fetch(Box::new(source));
        let result = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(result.unwrap().len(), 15);
        assert!(rx.recv_timeout(Duration::from_millis(200)).is_err());
    }

    #[test]
    fn poll_reports_nothing_while_pending() {
        let (_tx, rx) = flume::bounded::<FetchResult>(1);
        assert!(poll_fetch(&rx).is_none());
    }

    #[test]
    fn poll_turns_a_vanished_worker_into_an_error() {
        let (tx, rx) = flume::bounded::<FetchResult>(1);
        thread::spawn(move || drop(tx)).join().unwrap();
        assert!(matches!(
            poll_fetch(&rx),
            Some(Err(RosterError::FetchInterrupted))
        ));
    }
}
