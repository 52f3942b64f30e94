//! Nagios-style checks for the T-Rex GPU miner
//!
//! The `check-trex` binary queries the miner's local HTTP api, compares the
//! telemetry it gets back against configured thresholds, and turns the whole
//! thing into a standard check result: one status line, performance data for
//! the dashboards, and an exit code of 0/1/2/3 for
//! OK/WARNING/CRITICAL/UNKNOWN.
//!
//! The machinery for evaluating metrics against thresholds lives in
//! [`check`](check/index.html) and is independent of anything T-Rex-shaped.

use std::fmt;
use std::process;

pub mod check;

/// The status of a check, in increasing order of badness
///
/// `Unknown` sorts as the worst status, so folding a pile of results with
/// `std::cmp::max` gives the status the overall check should exit with.
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Status {
    Ok,
    Warning,
    Critical,
    Unknown,
}

impl Status {
    /// Exit the process with the nagios-standard code for this status
    pub fn exit(self) -> ! {
        use Status::*;
        match self {
            Ok => process::exit(0),
            Warning => process::exit(1),
            Critical => process::exit(2),
            Unknown => process::exit(3),
        }
    }

    /// The lowercase name, as it appears inside a summary line
    pub fn label(self) -> &'static str {
        use Status::*;
        match self {
            Ok => "ok",
            Warning => "warning",
            Critical => "critical",
            Unknown => "unknown",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use Status::*;
        let name = match *self {
            Ok => "OK",
            Warning => "WARNING",
            Critical => "CRITICAL",
            Unknown => "UNKNOWN",
        };
        write!(f, "{}", name)
    }
}

#[cfg(test)]
mod test {
    use std::cmp::max;

    use super::Status;

    #[test]
    fn badness_orders_correctly() {
        assert!(Status::Ok < Status::Warning);
        assert!(Status::Warning < Status::Critical);
        assert!(Status::Critical < Status::Unknown);
        assert_eq!(max(Status::Warning, Status::Critical), Status::Critical);
    }

    #[test]
    fn labels() {
        assert_eq!(Status::Critical.label(), "critical");
        assert_eq!(Status::Critical.to_string(), "CRITICAL");
    }
}
