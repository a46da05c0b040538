//! Configuration and CLI argument handling

use std::path::PathBuf;

use clap::Parser;

use crate::state::Durations;

/// Longest interval accepted on the command line
pub const MAX_INTERVAL_MINUTES: u64 = 24 * 60;

/// CLI argument parsing structure
#[derive(Parser, Debug)]
#[command(name = "focus-timer")]
#[command(about = "A durable work/break countdown daemon for detached displays")]
#[command(version)]
pub struct Config {
    /// Port to bind the observer API to
    #[arg(short, long, default_value = "20554")]
    pub port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// JSON file holding the durable timer state
    #[arg(short, long, default_value = "focus-timer-state.json")]
    pub state_file: PathBuf,

    /// Work interval length in minutes (at most a day)
    #[arg(long, default_value = "25", value_parser = clap::value_parser!(u64).range(1..=MAX_INTERVAL_MINUTES))]
    pub work_minutes: u64,

    /// Break interval length in minutes (at most a day)
    #[arg(long, default_value = "5", value_parser = clap::value_parser!(u64).range(1..=MAX_INTERVAL_MINUTES))]
    pub break_minutes: u64,

    /// Switch mode and restart automatically whenever a countdown finishes
    #[arg(long)]
    pub autoplay: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Get the server address as a formatted string
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }

    /// Interval lengths for the lifetime of the process
    pub fn durations(&self) -> Durations {
        Durations::from_minutes(self.work_minutes, self.break_minutes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_classic_cycle() {
        let config = Config::parse_from(["focus-timer"]);
        assert_eq!(config.address(), "127.0.0.1:20554");
        assert_eq!(config.log_level(), "info");
        assert!(!config.autoplay);

        let durations = config.durations();
        assert_eq!(durations.work_ms, 1_500_000);
        assert_eq!(durations.break_ms, 300_000);
    }

    #[test]
    fn custom_durations_and_verbose() {
        let config = Config::parse_from([
            "focus-timer",
            "--work-minutes",
            "50",
            "--break-minutes",
            "10",
            "-v",
            "--autoplay",
        ]);
        assert_eq!(config.durations().work_ms, 3_000_000);
        assert_eq!(config.durations().break_ms, 600_000);
        assert_eq!(config.log_level(), "debug");
        assert!(config.autoplay);
    }

    #[test]
    fn zero_minute_interval_is_rejected() {
        let result = Config::try_parse_from(["focus-timer", "--work-minutes", "0"]);
        assert!(result.is_err());
    }

    #[test]
    fn intervals_longer_than_a_day_are_rejected() {
        assert!(Config::try_parse_from(["focus-timer", "--break-minutes", "1441"]).is_err());
        assert!(Config::try_parse_from(["focus-timer", "--work-minutes", "18446744073709551"]).is_err());

        let config = Config::try_parse_from(["focus-timer", "--work-minutes", "1440"]).unwrap();
        assert_eq!(config.durations().work_ms, 86_400_000);
    }
}
