use std::fmt;

use log::{error, info};
use xconn::{ErrorKind, Outcome};

use crate::scenario::Scenario;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Acceptor,
    Client,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Acceptor => write!(f, "acceptor"),
            Side::Client => write!(f, "client"),
        }
    }
}

/// What a call is expected to report. Messages are not compared, only the
/// byte count and the error kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Expectation {
    pub bytes: usize,
    pub error: Option<ErrorKind>,
}

impl Expectation {
    pub fn ok(bytes: usize) -> Self {
        Self { bytes, error: None }
    }

    /// A call that transfers nothing and fails with `kind`.
    pub fn failed(kind: ErrorKind) -> Self {
        Self {
            bytes: 0,
            error: Some(kind),
        }
    }

    pub fn matches(&self, outcome: &Outcome) -> bool {
        self.bytes == outcome.bytes && self.error == outcome.error
    }
}

impl fmt::Display for Expectation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.error {
            Some(kind) => write!(f, "({}, {})", self.bytes, kind),
            None => write!(f, "({}, none)", self.bytes),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Observation {
    pub side: Side,
    pub step: &'static str,
    pub expected: Expectation,
    pub actual: Outcome,
}

impl Observation {
    pub fn passed(&self) -> bool {
        self.expected.matches(&self.actual)
    }
}

impl fmt::Display for Observation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}: expected {}, got {}",
            self.side, self.step, self.expected, self.actual
        )
    }
}

/// Everything one scenario run checked.
#[derive(Debug, Clone)]
pub struct Report {
    pub scenario: Scenario,
    pub observations: Vec<Observation>,
}

impl Report {
    pub fn new(scenario: Scenario) -> Self {
        Self {
            scenario,
            observations: Vec::new(),
        }
    }

    pub fn record(&mut self, side: Side, step: &'static str, expected: Expectation, actual: Outcome) {
        let observation = Observation {
            side,
            step,
            expected,
            actual,
        };
        if observation.passed() {
            info!("[{}] {}", self.scenario, observation);
        } else {
            error!("[{}] MISMATCH {}", self.scenario, observation);
        }
        self.observations.push(observation);
    }

    /// The observation for `side` and `step`, if recorded.
    pub fn get(&self, side: Side, step: &str) -> Option<&Observation> {
        self.observations
            .iter()
            .find(|o| o.side == side && o.step == step)
    }

    pub fn passed(&self) -> bool {
        !self.observations.is_empty() && self.observations.iter().all(Observation::passed)
    }

    pub fn failures(&self) -> impl Iterator<Item = &Observation> {
        self.observations.iter().filter(|o| !o.passed())
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verdict = if self.passed() { "ok" } else { "FAILED" };
        write!(f, "scenario {} ... {}", self.scenario, verdict)?;
        for failure in self.failures() {
            write!(f, "\n    {}", failure)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use xconn::{Error, Op};

    #[test]
    fn test_expectation_ignores_message() {
        let err = Error::ClosedHandle { op: Op::Read };
        let outcome = Outcome::failed(0, &err);
        assert!(Expectation::failed(ErrorKind::ClosedHandle).matches(&outcome));
        assert!(!Expectation::failed(ErrorKind::EndOfStream).matches(&outcome));
        assert!(!Expectation::ok(0).matches(&outcome));
    }

    #[test]
    fn test_byte_count_must_match() {
        assert!(Expectation::ok(5).matches(&Outcome::ok(5)));
        assert!(!Expectation::ok(5).matches(&Outcome::ok(3)));
    }

    #[test]
    fn test_report_verdict() {
        let mut report = Report::new(Scenario::CloseByServer);
        assert!(!report.passed(), "an empty report checks nothing");

        report.record(Side::Client, "first write", Expectation::ok(5), Outcome::ok(5));
        assert!(report.passed());

        report.record(
            Side::Client,
            "second write",
            Expectation::failed(ErrorKind::Reset),
            Outcome::ok(5),
        );
        assert!(!report.passed());
        assert_eq!(report.failures().count(), 1);
        assert_eq!(report.get(Side::Client, "second write").map(|o| o.passed()), Some(false));
        assert!(report.to_string().contains("FAILED"));
    }
}
