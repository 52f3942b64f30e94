use log::LevelFilter;
use structopt::StructOpt;

use trex_plugins::Status;

/// Check the health of a T-Rex GPU miner via its local HTTP api.
#[derive(StructOpt, Debug)]
#[structopt(
    name = "check-trex (part of trex-plugins)",
    raw(setting = "structopt::clap::AppSettings::ColoredHelp"),
    after_help = "Examples:

    Go critical when the whole rig hashes slower than 60 MH/s:

        check-trex --hashrate-critical 60000000

    Warn when the miner has restarted in the last five minutes, or is paused:

        check-trex --uptime-warning 300 --paused-warning"
)]
pub(crate) struct Args {
    #[structopt(
        long = "url",
        default_value = "http://127.0.0.1:4067",
        help = "API URL of the T-Rex miner"
    )]
    pub url: String,
    #[structopt(
        long = "timeout",
        name = "SECONDS",
        default_value = "3",
        help = "Timeout when requesting the T-Rex API"
    )]
    pub timeout: u64,

    #[structopt(
        long = "hashrate-warning",
        name = "HASHRATE_WARN",
        help = "Raise warning if the hashrate goes below this threshold"
    )]
    pub hashrate_warning: Option<f64>,
    #[structopt(
        long = "hashrate-critical",
        name = "HASHRATE_CRIT",
        help = "Raise critical if the hashrate goes below this threshold"
    )]
    pub hashrate_critical: Option<f64>,

    #[structopt(
        long = "uptime-warning",
        name = "UPTIME_WARN",
        help = "Raise warning if the uptime goes below this threshold"
    )]
    pub uptime_warning: Option<f64>,
    #[structopt(
        long = "uptime-critical",
        name = "UPTIME_CRIT",
        help = "Raise critical if the uptime goes below this threshold"
    )]
    pub uptime_critical: Option<f64>,

    #[structopt(long = "paused-warning", help = "Raise warning when the miner is paused")]
    pub paused_warning: bool,
    #[structopt(long = "paused-critical", help = "Raise critical when the miner is paused")]
    pub paused_critical: bool,

    #[structopt(
        long = "temperature-warning",
        name = "TEMP_WARN",
        default_value = "70",
        help = "Raise warning if a GPU temperature goes over this threshold"
    )]
    pub temperature_warning: f64,
    #[structopt(
        long = "temperature-critical",
        name = "TEMP_CRIT",
        default_value = "90",
        help = "Raise critical if a GPU temperature goes over this threshold"
    )]
    pub temperature_critical: f64,

    #[structopt(
        long = "memory-temperature-warning",
        name = "MEM_TEMP_WARN",
        default_value = "90",
        help = "Raise warning if a GPU memory temperature goes over this threshold"
    )]
    pub memory_temperature_warning: f64,
    #[structopt(
        long = "memory-temperature-critical",
        name = "MEM_TEMP_CRIT",
        default_value = "110",
        help = "Raise critical if a GPU memory temperature goes over this threshold"
    )]
    pub memory_temperature_critical: f64,

    #[structopt(short = "v", long = "verbose", help = "Print more output")]
    pub verbose: bool,
    #[structopt(short = "d", long = "debug", help = "Print even more output")]
    pub debug: bool,
}

impl Args {
    pub fn log_level(&self) -> LevelFilter {
        if self.debug {
            LevelFilter::Debug
        } else if self.verbose {
            LevelFilter::Info
        } else {
            LevelFilter::Warn
        }
    }

    /// The status to report when the miner turns out to be paused
    pub fn paused_mismatch(&self) -> Status {
        if self.paused_critical {
            Status::Critical
        } else if self.paused_warning {
            Status::Warning
        } else {
            Status::Ok
        }
    }
}
