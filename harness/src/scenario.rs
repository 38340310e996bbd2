use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;

use log::*;
use xconn::{ErrorKind, Listener};

use crate::acceptor::Acceptor;
use crate::client::Client;
use crate::config::HarnessConfig;
use crate::error::{HarnessError, Result};
use crate::report::{Expectation, Report, Side};

/// The ways a connection can end that the harness reproduces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scenario {
    /// The dialing side closes without writing; the acceptor's pending read
    /// sees end-of-stream.
    CloseByClient,
    /// The acceptor closes first; the client's first write is buffered
    /// locally and the second surfaces the reset.
    CloseByServer,
    /// The acceptor closes its handle while its own read is pending; that
    /// read fails locally while the client sees end-of-stream.
    CloseWhileReading,
}

impl Scenario {
    pub const ALL: [Scenario; 3] = [
        Scenario::CloseByClient,
        Scenario::CloseByServer,
        Scenario::CloseWhileReading,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Scenario::CloseByClient => "close-by-client",
            Scenario::CloseByServer => "close-by-server",
            Scenario::CloseWhileReading => "close-while-reading",
        }
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Scenario {
    type Err = HarnessError;

    fn from_str(s: &str) -> Result<Self> {
        Scenario::ALL
            .into_iter()
            .find(|scenario| scenario.name() == s)
            .ok_or_else(|| HarnessError::UnknownScenario(s.to_string()))
    }
}

/// Owns the listener and configuration for exactly one scenario run.
pub struct ScenarioRunner {
    config: HarnessConfig,
    listener: Listener,
}

impl ScenarioRunner {
    pub async fn start(config: HarnessConfig) -> Result<Self> {
        let listener = Listener::bind(config.bind_addr).await?;
        Ok(Self { config, listener })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.listener.local_addr()
    }

    pub async fn run(self, scenario: Scenario) -> Result<Report> {
        info!("=== {} ===", scenario);
        match scenario {
            Scenario::CloseByClient => self.close_by_client().await,
            Scenario::CloseByServer => self.close_by_server().await,
            Scenario::CloseWhileReading => self.close_while_reading().await,
        }
    }

    async fn close_by_client(self) -> Result<Report> {
        let mut report = Report::new(Scenario::CloseByClient);
        let target = self.local_addr();
        let acceptor = Acceptor::new(self.listener).spawn_reader(self.config.read_buf_size);

        let client = Client::connect(target).await?;
        report.record(Side::Client, "close", Expectation::ok(0), client.close());

        report.record(
            Side::Acceptor,
            "read",
            Expectation::failed(ErrorKind::EndOfStream),
            acceptor.outcome().await?,
        );
        Ok(report)
    }

    async fn close_by_server(self) -> Result<Report> {
        let mut report = Report::new(Scenario::CloseByServer);
        let target = self.local_addr();
        let acceptor = Acceptor::new(self.listener).spawn_closer();

        let client = Client::connect(target).await?;
        // Writing before the server close is known to have happened could
        // succeed twice.
        acceptor.closed().await?;

        let payload = &self.config.payload;
        report.record(
            Side::Client,
            "first write",
            Expectation::ok(payload.len()),
            client.write(payload).await,
        );
        report.record(
            Side::Client,
            "second write",
            Expectation::failed(ErrorKind::Reset),
            client.write(payload).await,
        );
        Ok(report)
    }

    async fn close_while_reading(self) -> Result<Report> {
        let mut report = Report::new(Scenario::CloseWhileReading);
        let target = self.local_addr();
        let buf_size = self.config.read_buf_size;
        let acceptor =
            Acceptor::new(self.listener).spawn_racing_reader(buf_size, self.config.settle_delay);

        let client = Client::connect(target).await?;
        let (client_read, acceptor_read) =
            futures::join!(client.read(buf_size), acceptor.outcome());

        report.record(
            Side::Acceptor,
            "read",
            Expectation::failed(ErrorKind::ClosedHandle),
            acceptor_read?,
        );
        report.record(
            Side::Client,
            "read",
            Expectation::failed(ErrorKind::EndOfStream),
            client_read,
        );
        Ok(report)
    }
}

/// Runs `scenarios` in order, each on a fresh runner. The first setup
/// failure aborts the whole suite.
pub async fn run_suite(config: &HarnessConfig, scenarios: &[Scenario]) -> Result<Vec<Report>> {
    let mut reports = Vec::with_capacity(scenarios.len());
    for &scenario in scenarios {
        let runner = ScenarioRunner::start(config.clone()).await?;
        reports.push(runner.run(scenario).await?);
    }
    Ok(reports)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_round_trip() {
        for scenario in Scenario::ALL {
            assert_eq!(scenario.name().parse::<Scenario>().unwrap(), scenario);
        }
    }

    #[test]
    fn test_unknown_name() {
        let err = "close-by-nobody".parse::<Scenario>().unwrap_err();
        assert!(matches!(err, HarnessError::UnknownScenario(ref name) if name == "close-by-nobody"));
        assert!(!err.is_setup());
    }
}
