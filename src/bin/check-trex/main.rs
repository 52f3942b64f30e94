//! Check the health of a T-Rex GPU miner
//!
//! Queries the miner's `/summary` endpoint once, applies the configured
//! thresholds, prints a nagios-style status line with performance data, and
//! exits 0/1/2/3.
//!
//! Any failure to reach or parse the api (timeout, refused connection,
//! non-2xx response, bad json) is reported as UNKNOWN.

extern crate env_logger;
#[macro_use]
extern crate log;
extern crate reqwest;
extern crate serde;
#[macro_use]
extern crate serde_derive;
extern crate serde_json;
#[macro_use]
extern crate structopt;

extern crate trex_plugins;

mod args;
mod trex;

use std::io::Write;

use structopt::StructOpt;

use trex_plugins::check::{evaluate, perf_data, problems, worst, Context};
use trex_plugins::Status;

use args::Args;
use trex::fetch_summary;

/// The thresholds for every metric the miner can report
fn contexts(args: &Args) -> Vec<Context> {
    vec![
        Context::boolean("success", true, Status::Ok),
        Context::boolean("paused", false, args.paused_mismatch()),
        Context::below("hashrate", args.hashrate_warning, args.hashrate_critical),
        Context::below("uptime", args.uptime_warning, args.uptime_critical),
        Context::above(
            "temperature",
            Some(args.temperature_warning),
            Some(args.temperature_critical),
        ),
        Context::above(
            "memory_temperature",
            Some(args.memory_temperature_warning),
            Some(args.memory_temperature_critical),
        ),
    ]
}

#[cfg_attr(test, allow(dead_code))]
fn init_logging(args: &Args) {
    env_logger::Builder::new()
        .format(|buf, record| writeln!(buf, "{}: {}", record.level(), record.args()))
        .filter(None, args.log_level())
        .init();
}

fn status_line(status: Status, problems: &str, perf: &str) -> String {
    let mut line = format!("TREX {}", status);
    if !problems.is_empty() {
        line.push_str(": ");
        line.push_str(problems);
    }
    if !perf.is_empty() {
        line.push_str(" | ");
        line.push_str(perf);
    }
    line
}

#[cfg_attr(test, allow(dead_code))]
fn main() {
    let args = Args::from_args();
    init_logging(&args);

    let summary = match fetch_summary(&args.url, args.timeout) {
        Ok(summary) => summary,
        Err(e) => {
            println!("Failed to execute check: {}", e.short_display());
            debug!("{}", e);
            Status::Unknown.exit();
        }
    };

    let contexts = contexts(&args);
    let metrics = trex::metrics_from(&summary);
    let results = evaluate(&contexts, &metrics);

    let status = worst(&results);
    let perf = perf_data(&contexts, &metrics)
        .iter()
        .map(|token| token.to_string())
        .collect::<Vec<_>>()
        .join(" ");
    println!("{}", status_line(status, &problems(&results), &perf));
    status.exit();
}

#[cfg(test)]
mod test {
    use super::*;

    use structopt::StructOpt;

    use trex_plugins::check::Metric;

    fn run(args: &[&str], metrics: &[Metric]) -> (Status, String) {
        let args = Args::from_iter(args.into_iter());
        let contexts = contexts(&args);
        let results = evaluate(&contexts, metrics);
        let status = worst(&results);
        let perf = perf_data(&contexts, metrics)
            .iter()
            .map(|token| token.to_string())
            .collect::<Vec<_>>()
            .join(" ");
        (status, status_line(status, &problems(&results), &perf))
    }

    #[test]
    fn slow_hashrate_goes_critical() {
        let (status, line) = run(
            &["check-trex", "--hashrate-critical=600"],
            &[Metric::scalar("hashrate", 500.0)],
        );
        assert_eq!(status, Status::Critical);
        assert_eq!(
            line,
            "TREX CRITICAL: hashrate critical: 500<=600 | hashrate=500;;600"
        );
    }

    #[test]
    fn paused_warns_when_asked_to() {
        let (status, line) = run(
            &["check-trex", "--paused-warning"],
            &[Metric::boolean("paused", true)],
        );
        assert_eq!(status, Status::Warning);
        assert_eq!(line, "TREX WARNING: paused warning: paused is not false");
    }

    #[test]
    fn paused_is_harmless_by_default() {
        let (status, _) = run(&["check-trex"], &[Metric::boolean("paused", true)]);
        assert_eq!(status, Status::Ok);
    }

    #[test]
    fn hot_gpu_goes_critical_on_default_thresholds() {
        let (status, line) = run(&["check-trex"], &[Metric::scalar("temperature", 95.0)]);
        assert_eq!(status, Status::Critical);
        assert_eq!(
            line,
            "TREX CRITICAL: temperature critical: 95>=90 | temperature=95;70;90"
        );
    }

    #[test]
    fn everything_quiet_is_okay() {
        let (status, line) = run(
            &["check-trex", "--hashrate-critical=600"],
            &[
                Metric::scalar("hashrate", 650.0),
                Metric::boolean("success", true),
                Metric::scalar("temperature", 60.0),
            ],
        );
        assert_eq!(status, Status::Ok);
        assert_eq!(line, "TREX OK | hashrate=650;;600 temperature=60;70;90");
    }

    #[test]
    fn no_metrics_at_all_is_okay() {
        let (status, line) = run(&["check-trex"], &[]);
        assert_eq!(status, Status::Ok);
        assert_eq!(line, "TREX OK");
    }
}
