//! Reproduces the three ways a TCP connection ends (client close, server
//! close, close while a read is pending) and checks what each side observes.

pub mod acceptor;
pub mod client;
pub mod config;
pub mod error;
pub mod report;
pub mod scenario;

pub use config::HarnessConfig;
pub use error::{HarnessError, Result};
pub use report::{Expectation, Observation, Report, Side};
pub use scenario::{run_suite, Scenario, ScenarioRunner};
