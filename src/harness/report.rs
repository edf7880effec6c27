use crate::harness::check::{Check, Outcome};
use chrono::{DateTime, Local};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    id: String,
    description: String,
    outcome: Outcome,
    duration: Duration,
}

/// The result of one run. Entries are in registration order no matter in
/// which order the checks finished.
#[derive(Debug, Clone)]
pub struct Report {
    run: uuid::Uuid,
    name: String,
    base_url: String,
    started_at: DateTime<Local>,
    duration: Duration,
    planned: usize,
    aborted: bool,
    entries: Vec<Entry>,
}

impl Entry {
    pub fn new(check: &Check, outcome: Outcome, duration: Duration) -> Self {
        Self {
            id: check.id().to_owned(),
            description: check.description().to_owned(),
            outcome,
            duration,
        }
    }

    #[inline]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[inline]
    pub fn description(&self) -> &str {
        &self.description
    }

    #[inline]
    pub fn outcome(&self) -> &Outcome {
        &self.outcome
    }

    #[inline]
    pub fn duration(&self) -> Duration {
        self.duration
    }
}

impl Report {
    pub(crate) fn new(
        name: String,
        base_url: String,
        started_at: DateTime<Local>,
        planned: usize,
    ) -> Self {
        Self {
            run: uuid::Uuid::new_v4(),
            name,
            base_url,
            started_at,
            duration: Duration::default(),
            planned,
            aborted: false,
            entries: Vec::with_capacity(planned),
        }
    }

    pub(crate) fn finalize(mut self, entries: Vec<Entry>, duration: Duration, aborted: bool) -> Self {
        self.entries = entries;
        self.duration = duration;
        self.aborted = aborted;
        self
    }

    #[inline]
    pub fn run(&self) -> uuid::Uuid {
        self.run
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    #[inline]
    pub fn started_at(&self) -> DateTime<Local> {
        self.started_at
    }

    #[inline]
    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Checks registered for the run; more than `total()` when it stopped early.
    #[inline]
    pub fn planned(&self) -> usize {
        self.planned
    }

    #[inline]
    pub fn aborted(&self) -> bool {
        self.aborted
    }

    #[inline]
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    #[inline]
    pub fn total(&self) -> usize {
        self.entries.len()
    }

    pub fn passed(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Passed))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Failed(_)))
    }

    pub fn errored(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Errored(_)))
    }

    /// True only when every planned check ran and passed.
    pub fn is_success(&self) -> bool {
        !self.aborted && self.total() == self.planned && self.passed() == self.total()
    }

    fn count<F: Fn(&Outcome) -> bool>(&self, predicate: F) -> usize {
        self.entries.iter().filter(|e| predicate(e.outcome())).count()
    }
}

#[cfg(test)]
pub(crate) fn sample() -> Report {
    use crate::harness::context::Target;
    use crate::harness::error::Error;

    let noop = |_: &Target| -> Result<(), Error> { Ok(()) };
    let entries = vec![
        Entry::new(
            &Check::new("homepage", "Home page loads", noop),
            Outcome::Passed,
            Duration::from_millis(412),
        ),
        Entry::new(
            &Check::new("title", "Title is fixed", noop),
            Outcome::Failed("title \"Vite App\" does not contain \"StoryWeaver\"".to_owned()),
            Duration::from_millis(38),
        ),
        Entry::new(
            &Check::new("backend", "", noop),
            Outcome::Errored("transport error: connection refused".to_owned()),
            Duration::from_millis(2),
        ),
    ];
    Report::new(
        "storyweaver".to_owned(),
        "http://localhost:5174/".to_owned(),
        Local::now(),
        3,
    )
    .finalize(entries, Duration::from_millis(455), false)
}
