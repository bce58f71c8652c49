use anyhow::Context;
use clap::Parser;
use plotkit::{init_logging, load_settings, run_scenario, BUILD_DATE, VERSION};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "plotkit", version, about = "Run a plot scenario on the headless host")]
struct Cli {
    /// Scenario file (JSON)
    scenario: PathBuf,
    /// Plot settings file (TOML or JSON); defaults apply when omitted
    settings: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    init_logging()?;

    tracing::info!(version = VERSION, build = BUILD_DATE, "plotkit starting");

    let settings = load_settings(cli.settings.as_deref()).context("loading plot settings")?;
    let report = run_scenario(&cli.scenario, &settings)
        .with_context(|| format!("running {}", cli.scenario.display()))?;

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_takes_scenario_and_optional_settings() {
        let cli = Cli::try_parse_from(["plotkit", "plan.json"]).unwrap();
        assert_eq!(cli.scenario, PathBuf::from("plan.json"));
        assert!(cli.settings.is_none());

        let cli = Cli::try_parse_from(["plotkit", "plan.json", "plot.toml"]).unwrap();
        assert_eq!(cli.settings, Some(PathBuf::from("plot.toml")));
    }

    #[test]
    fn test_cli_requires_scenario() {
        assert!(Cli::try_parse_from(["plotkit"]).is_err());
    }
}
