use std::time::{Duration, Instant};

use tracing::trace;

use crate::record::UserRecord;

/// A record matches when the trimmed, lowercased query is a prefix of its
/// lowercased "<first> <last>", the same text the Name column shows.
pub fn matches(record: &UserRecord, needle: &str) -> bool {
    record.full_name().to_lowercase().starts_with(needle)
}

pub fn normalize_query(query: &str) -> String {
    query.trim().to_lowercase()
}

/// Keep the records matching `query`, in their original order.
pub fn filter(records: &[UserRecord], query: &str) -> Vec<UserRecord> {
    let needle = normalize_query(query);
    let filtered: Vec<UserRecord> = records
        .iter()
        .filter(|record| matches(record, &needle))
        .cloned()
        .collect();
    trace!(
        "Filter \"{}\" kept {}/{} records",
        needle,
        filtered.len(),
        records.len()
    );
    filtered
}

/// Holds at most one pending run. Scheduling again moves the deadline, so only
/// the run of the last keystroke ever fires.
#[derive(Debug)]
pub struct Debouncer {
    delay: Duration,
    deadline: Option<Instant>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    pub fn schedule(&mut self, now: Instant) {
        self.deadline = Some(now + self.delay);
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// Returns true exactly once per schedule, as soon as `now` passed the deadline.
    pub fn fire(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{Name, parse_payload};

    fn person(first: &str, last: &str) -> UserRecord {
        UserRecord {
            name: Name {
                first: first.into(),
                last: last.into(),
            },
            ..Default::default()
        }
    }

    fn names(records: &[UserRecord]) -> Vec<String> {
        records.iter().map(|r| r.full_name()).collect()
    }

    #[test]
    fn prefix_match_on_full_name() {
        let records = vec![person("Anna", "Smith"), person("Bob", "Jones")];
        assert_eq!(names(&filter(&records, "an")), vec!["Anna Smith"]);
        assert_eq!(names(&filter(&records, "  ANNA S ")), vec!["Anna Smith"]);
        assert_eq!(names(&filter(&records, "bob j")), vec!["Bob Jones"]);
        assert!(filter(&records, "zz").is_empty());
        // last name alone is not a prefix
        assert!(filter(&records, "smith").is_empty());
    }

    #[test]
    fn padded_names_match_what_is_displayed() {
        let records = vec![person(" Anna", "Smith "), person("", "Jones")];
        assert_eq!(names(&filter(&records, "anna")), vec!["Anna Smith"]);
        assert_eq!(names(&filter(&records, "jo")), vec!["Jones"]);
    }

    #[test]
    fn empty_query_keeps_everything_in_order() {
        let records = parse_payload(include_str!("../tests/fixtures/users.json")).unwrap();
        assert_eq!(filter(&records, ""), records);
        assert_eq!(filter(&records, "   "), records);
    }

    #[test]
    fn result_is_an_ordered_subsequence() {
        let records = vec![
            person("Mia", "Novak"),
            person("Anna", "Smith"),
            person("Mia", "Lund"),
            person("Mike", "Berg"),
        ];
        for query in ["m", "mi", "mia", "mia n", "a", "x", ""] {
            let kept = filter(&records, query);
            let needle = normalize_query(query);
            let mut cursor = records.iter();
            for record in kept.iter() {
                assert!(matches(record, &needle));
                assert!(cursor.any(|r| r == record), "order broken for {query}");
            }
            let dropped = records.iter().filter(|r| !kept.contains(r));
            for record in dropped {
                assert!(!matches(record, &needle));
            }
        }
        assert_eq!(names(&filter(&records, "mi")), vec!["Mia Novak", "Mia Lund", "Mike Berg"]);
    }

    #[test]
    fn debouncer_fires_once_after_quiet_period() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(Duration::from_millis(1000));
        assert!(!debouncer.fire(start));

        debouncer.schedule(start);
        assert!(debouncer.is_pending());
        assert!(!debouncer.fire(start + Duration::from_millis(999)));
        assert!(debouncer.fire(start + Duration::from_millis(1000)));
        assert!(!debouncer.fire(start + Duration::from_millis(5000)));
    }

    #[test]
    fn later_keystroke_supersedes_pending_run() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(Duration::from_millis(1000));
        debouncer.schedule(start);
        debouncer.schedule(start + Duration::from_millis(600));
        assert!(!debouncer.fire(start + Duration::from_millis(1200)));
        assert!(debouncer.fire(start + Duration::from_millis(1600)));
        assert!(!debouncer.is_pending());
    }

    #[test]
    fn cancel_drops_pending_run() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(Duration::from_millis(10));
        debouncer.schedule(start);
        debouncer.cancel();
        assert!(!debouncer.fire(start + Duration::from_secs(1)));
    }
}
