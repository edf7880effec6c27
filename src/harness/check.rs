use crate::harness::context::Target;
use crate::harness::error::Error;
use derivative::*;

/// What running a single check amounted to.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Passed,
    /// The check ran but an assertion did not hold.
    Failed(String),
    /// The check could not complete.
    Errored(String),
}

/// The work behind a check. Any error other than an assertion mismatch marks
/// the check as errored.
pub trait Action: Send + Sync {
    fn perform(&self, target: &Target) -> Result<(), Error>;

    /// The path this action will load, if it loads one.
    fn path(&self) -> Option<&str> {
        None
    }
}

impl<F> Action for F
where
    F: Fn(&Target) -> Result<(), Error> + Send + Sync,
{
    fn perform(&self, target: &Target) -> Result<(), Error> {
        self(target)
    }
}

#[derive(Derivative)]
#[derivative(Debug)]
pub struct Check {
    id: String,
    description: String,
    #[derivative(Debug = "ignore")]
    action: Box<dyn Action>,
}

impl Check {
    pub fn new<A>(id: impl Into<String>, description: impl Into<String>, action: A) -> Self
    where
        A: Action + 'static,
    {
        Self {
            id: id.into(),
            description: description.into(),
            action: Box::new(action),
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

    /// Fails when the check's path cannot be turned into a url under `target`.
    pub fn resolve(&self, target: &Target) -> Result<(), Error> {
        match self.action.path() {
            Some(path) => target.url(path).map(|_| ()).map_err(|e| {
                Error::Configuration(format!("check '{}': {}", self.id, e))
            }),
            None => Ok(()),
        }
    }

    pub fn perform(&self, target: &Target) -> Outcome {
        Outcome::from(self.action.perform(target))
    }
}

impl Outcome {
    #[inline]
    pub fn is_passed(&self) -> bool {
        matches!(self, Outcome::Passed)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Outcome::Passed => "passed",
            Outcome::Failed(_) => "failed",
            Outcome::Errored(_) => "errored",
        }
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            Outcome::Passed => None,
            Outcome::Failed(message) | Outcome::Errored(message) => Some(message),
        }
    }
}

impl From<Result<(), Error>> for Outcome {
    fn from(result: Result<(), Error>) -> Self {
        match result {
            Ok(()) => Outcome::Passed,
            Err(Error::AssertionMismatch(reason)) => Outcome::Failed(reason),
            Err(cause) => Outcome::Errored(cause.to_string()),
        }
    }
}
