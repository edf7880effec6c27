use crate::harness::check::{Check, Outcome};
use crate::harness::context::Target;
use crate::harness::error::Error;
use crate::harness::options::RunOptions;
use crate::harness::report::{Entry, Report};
use chrono::Local;
use std::any::Any;
use std::collections::HashSet;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::mpsc;
use std::thread;
use std::time::Instant;

/// Runs a plan of checks against one target and keeps the last report.
#[derive(Debug)]
pub struct Harness {
    name: String,
    checks: Vec<Check>,
    ids: HashSet<String>,
    report: Option<Report>,
}

impl Harness {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            checks: Vec::new(),
            ids: HashSet::new(),
            report: None,
        }
    }

    pub fn register(&mut self, check: Check) -> Result<(), Error> {
        if !self.ids.insert(check.id().to_owned()) {
            return Err(Error::Configuration(format!(
                "check '{}' is registered twice",
                check.id()
            )));
        }
        self.checks.push(check);
        Ok(())
    }

    #[inline]
    pub fn amount(&self) -> usize {
        self.checks.len()
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Executes every registered check. Only configuration problems fail the
    /// run itself, and they do so before anything is sent.
    pub fn run(&mut self, base_url: &str, options: &RunOptions) -> Result<&Report, Error> {
        options.validate()?;
        let target = Target::parse(base_url, &options.headers, options.timeout)?;
        for check in &self.checks {
            check.resolve(&target)?;
        }
        info!(
            "Starting smoke run '{}' against {} with {} checks",
            self.name,
            target.base_url(),
            self.checks.len()
        );

        let report = Report::new(
            self.name.clone(),
            target.base_url().to_string(),
            Local::now(),
            self.checks.len(),
        );
        let now = Instant::now();
        let workers = options.concurrency.min(self.checks.len());
        let (entries, aborted) = if workers > 1 {
            self.run_parallel(&target, options, workers)
        } else {
            self.run_sequential(&target, options)
        };
        if aborted {
            warn!(
                "Run aborted after {} of {} checks",
                entries.len(),
                self.checks.len()
            );
        }
        let report = report.finalize(entries, now.elapsed(), aborted);
        info!(
            "Finished smoke run '{}': {} passed, {} failed, {} errored in {} ms",
            report.name(),
            report.passed(),
            report.failed(),
            report.errored(),
            report.duration().as_millis()
        );
        let report: &Report = self.report.insert(report);
        Ok(report)
    }

    /// The report of the last completed run.
    #[inline]
    pub fn report(&self) -> Option<&Report> {
        self.report.as_ref()
    }

    fn run_sequential(&self, target: &Target, options: &RunOptions) -> (Vec<Entry>, bool) {
        let mut entries = Vec::with_capacity(self.checks.len());
        for check in &self.checks {
            if options.aborted() {
                return (entries, true);
            }
            let entry = execute(check, target);
            let halt = !entry.outcome().is_passed() && !options.continue_on_failure;
            entries.push(entry);
            if halt {
                warn!("Check '{}' did not pass, stopping", check.id());
                break;
            }
        }
        (entries, false)
    }

    /// Workers pull the next unclaimed check; results are put back into
    /// registration order afterwards.
    fn run_parallel(
        &self,
        target: &Target,
        options: &RunOptions,
        workers: usize,
    ) -> (Vec<Entry>, bool) {
        let next = AtomicUsize::new(0);
        let halted = AtomicBool::new(false);
        let interrupted = AtomicBool::new(false);
        let (sender, receiver) = mpsc::channel::<(usize, Entry)>();
        debug!("Spawning {} workers", workers);

        thread::scope(|scope| {
            for _ in 0..workers {
                let sender = sender.clone();
                let (next, halted, interrupted) = (&next, &halted, &interrupted);
                scope.spawn(move || loop {
                    if halted.load(Ordering::SeqCst) {
                        break;
                    }
                    if options.aborted() {
                        interrupted.store(true, Ordering::SeqCst);
                        break;
                    }
                    let index = next.fetch_add(1, Ordering::SeqCst);
                    let check = match self.checks.get(index) {
                        Some(check) => check,
                        None => break,
                    };
                    let entry = execute(check, target);
                    if !entry.outcome().is_passed() && !options.continue_on_failure {
                        warn!("Check '{}' did not pass, stopping", check.id());
                        halted.store(true, Ordering::SeqCst);
                    }
                    if sender.send((index, entry)).is_err() {
                        break;
                    }
                });
            }
        });
        drop(sender);

        let mut collected: Vec<(usize, Entry)> = receiver.into_iter().collect();
        collected.sort_by_key(|(index, _)| *index);
        let entries: Vec<Entry> = collected.into_iter().map(|(_, entry)| entry).collect();
        let aborted = interrupted.load(Ordering::SeqCst) && entries.len() < self.checks.len();
        (entries, aborted)
    }
}

/// Runs one check in isolation: a panicking action is recorded like any other error.
fn execute(check: &Check, target: &Target) -> Entry {
    let now = Instant::now();
    let outcome = catch_unwind(AssertUnwindSafe(|| check.perform(target)))
        .unwrap_or_else(|panic| Outcome::Errored(format!("check panicked: {}", describe(&*panic))));
    let elapsed = now.elapsed();
    match &outcome {
        Outcome::Passed => info!("Check '{}' passed in {} ms", check.id(), elapsed.as_millis()),
        Outcome::Failed(reason) => warn!("Check '{}' failed: {}", check.id(), reason),
        Outcome::Errored(cause) => error!("Check '{}' errored: {}", check.id(), cause),
    }
    Entry::new(check, outcome, elapsed)
}

fn describe(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown cause".to_owned()
    }
}
