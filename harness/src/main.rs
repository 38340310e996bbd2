use std::process::ExitCode;

use harness::{run_suite, HarnessConfig, Scenario};
use log::*;

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let scenarios = match std::env::args()
        .skip(1)
        .map(|arg| arg.parse::<Scenario>())
        .collect::<Result<Vec<_>, _>>()
    {
        Ok(named) if named.is_empty() => Scenario::ALL.to_vec(),
        Ok(named) => named,
        Err(e) => {
            error!("{}", e);
            let known: Vec<_> = Scenario::ALL.iter().map(|s| s.name()).collect();
            error!("Known scenarios: {}", known.join(", "));
            return ExitCode::from(2);
        }
    };

    let config = HarnessConfig::from_env();
    info!("Settle delay: {:?}", config.settle_delay);

    match run_suite(&config, &scenarios).await {
        Ok(reports) => {
            for report in &reports {
                println!("{}", report);
            }
            let failed = reports.iter().filter(|r| !r.passed()).count();
            println!("{} passed; {} failed", reports.len() - failed, failed);
            if failed == 0 {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
