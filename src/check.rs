//! Evaluate metrics against thresholds
//!
//! A check collects a pile of [`Metric`]s from whatever it is probing and a
//! list of [`Context`]s describing what values are acceptable. Each context
//! knows how to judge the metrics that share its name and how to render them
//! as performance data.
//!
//! There are two kinds of threshold policy:
//!
//! * scalar contexts compare a number against optional warning/critical
//!   bounds, in one of two directions: `Below` alerts when the value drops
//!   to or under a bound (hashrate, uptime), `Above` alerts when it climbs
//!   to or over one (temperatures)
//! * boolean contexts compare an observed flag against an expected one, and
//!   report a configurable status on mismatch

use std::cmp::max;
use std::fmt;

use Status;

/// The value a probe observed for one metric
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MetricValue {
    Scalar(f64),
    Boolean(bool),
}

/// A single named observation
#[derive(Debug, Clone, PartialEq)]
pub struct Metric {
    pub name: &'static str,
    pub value: MetricValue,
    /// Unit of measure for the performance data, e.g. `"C"` or `"s"`
    pub uom: Option<&'static str>,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl Metric {
    pub fn scalar(name: &'static str, value: f64) -> Metric {
        Metric {
            name: name,
            value: MetricValue::Scalar(value),
            uom: None,
            min: None,
            max: None,
        }
    }

    pub fn boolean(name: &'static str, value: bool) -> Metric {
        Metric {
            name: name,
            value: MetricValue::Boolean(value),
            uom: None,
            min: None,
            max: None,
        }
    }
}

/// Which way a scalar threshold triggers
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Direction {
    /// Alert when the value is at or below a bound
    Below,
    /// Alert when the value is at or above a bound
    Above,
}

/// Warning/critical bounds for a numeric metric
///
/// An unset bound means that tier never triggers. A bound of zero is still a
/// bound: `--hashrate-critical 0` goes critical when the hashrate is 0.
#[derive(Debug, Clone, PartialEq)]
pub struct ScalarContext {
    pub warning: Option<f64>,
    pub critical: Option<f64>,
    pub direction: Direction,
}

impl ScalarContext {
    fn evaluate(&self, value: f64) -> (Status, Option<String>) {
        match self.direction {
            Direction::Below => {
                if let Some(critical) = self.critical {
                    if value <= critical {
                        return (Status::Critical, Some(format!("{}<={}", value, critical)));
                    }
                }
                if let Some(warning) = self.warning {
                    if value <= warning {
                        return (Status::Warning, Some(format!("{}<={}", value, warning)));
                    }
                }
            }
            Direction::Above => {
                if let Some(critical) = self.critical {
                    if value >= critical {
                        return (Status::Critical, Some(format!("{}>={}", value, critical)));
                    }
                }
                if let Some(warning) = self.warning {
                    if value >= warning {
                        return (Status::Warning, Some(format!("{}>={}", value, warning)));
                    }
                }
            }
        }
        (Status::Ok, None)
    }
}

/// Expected value for a boolean metric
#[derive(Debug, Clone, PartialEq)]
pub struct BooleanContext {
    pub expected: bool,
    /// Status to report when the observed value is not the expected one
    pub mismatch: Status,
}

impl BooleanContext {
    fn evaluate(&self, name: &str, value: bool) -> (Status, Option<String>) {
        if value != self.expected {
            (
                self.mismatch,
                Some(format!("{} is not {}", name, self.expected)),
            )
        } else {
            (Status::Ok, None)
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Policy {
    Scalar(ScalarContext),
    Boolean(BooleanContext),
}

/// The threshold policy for all metrics sharing one name
#[derive(Debug, Clone, PartialEq)]
pub struct Context {
    pub name: &'static str,
    pub policy: Policy,
}

impl Context {
    /// A scalar context that alerts when the value drops to or under a bound
    pub fn below(name: &'static str, warning: Option<f64>, critical: Option<f64>) -> Context {
        Context {
            name: name,
            policy: Policy::Scalar(ScalarContext {
                warning: warning,
                critical: critical,
                direction: Direction::Below,
            }),
        }
    }

    /// A scalar context that alerts when the value climbs to or over a bound
    pub fn above(name: &'static str, warning: Option<f64>, critical: Option<f64>) -> Context {
        Context {
            name: name,
            policy: Policy::Scalar(ScalarContext {
                warning: warning,
                critical: critical,
                direction: Direction::Above,
            }),
        }
    }

    pub fn boolean(name: &'static str, expected: bool, mismatch: Status) -> Context {
        Context {
            name: name,
            policy: Policy::Boolean(BooleanContext {
                expected: expected,
                mismatch: mismatch,
            }),
        }
    }

    pub fn evaluate(&self, metric: &Metric) -> CheckResult {
        let (status, hint) = match (&self.policy, metric.value) {
            (&Policy::Scalar(ref ctx), MetricValue::Scalar(value)) => ctx.evaluate(value),
            (&Policy::Boolean(ref ctx), MetricValue::Boolean(value)) => {
                ctx.evaluate(self.name, value)
            }
            _ => (
                Status::Unknown,
                Some(format!("unexpected value type for {}", self.name)),
            ),
        };
        CheckResult {
            status: status,
            metric: self.name,
            hint: hint,
        }
    }

    /// Render a metric as performance data, if it is the graphable kind
    pub fn perf_data(&self, metric: &Metric) -> Option<PerfData> {
        match (&self.policy, metric.value) {
            (&Policy::Scalar(ref ctx), MetricValue::Scalar(value)) => Some(PerfData {
                label: metric.name,
                value: value,
                uom: metric.uom,
                warning: ctx.warning,
                critical: ctx.critical,
                min: metric.min,
                max: metric.max,
            }),
            _ => None,
        }
    }
}

/// What one context decided about one metric
#[derive(Debug, Clone, PartialEq)]
pub struct CheckResult {
    pub status: Status,
    pub metric: &'static str,
    pub hint: Option<String>,
}

/// One `label=value;warn;crit;min;max` token of performance data
#[derive(Debug, Clone, PartialEq)]
pub struct PerfData {
    pub label: &'static str,
    pub value: f64,
    pub uom: Option<&'static str>,
    pub warning: Option<f64>,
    pub critical: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl fmt::Display for PerfData {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}={}{}", self.label, self.value, self.uom.unwrap_or(""))?;
        let mut tail: Vec<String> = [self.warning, self.critical, self.min, self.max]
            .iter()
            .map(|bound| bound.map_or(String::new(), |v| v.to_string()))
            .collect();
        while tail.last().map_or(false, |part| part.is_empty()) {
            tail.pop();
        }
        for part in &tail {
            write!(f, ";{}", part)?;
        }
        Ok(())
    }
}

/// Judge every metric that has a matching context
///
/// Metrics may repeat a name (one temperature per GPU); each occurrence gets
/// its own result. Metrics with no matching context are ignored.
pub fn evaluate(contexts: &[Context], metrics: &[Metric]) -> Vec<CheckResult> {
    metrics
        .iter()
        .filter_map(|metric| {
            contexts
                .iter()
                .find(|ctx| ctx.name == metric.name)
                .map(|ctx| ctx.evaluate(metric))
        })
        .collect()
}

/// The performance data tokens for every graphable metric
pub fn perf_data(contexts: &[Context], metrics: &[Metric]) -> Vec<PerfData> {
    metrics
        .iter()
        .filter_map(|metric| {
            contexts
                .iter()
                .find(|ctx| ctx.name == metric.name)
                .and_then(|ctx| ctx.perf_data(metric))
        })
        .collect()
}

/// The status the overall check should report: the worst individual one
pub fn worst(results: &[CheckResult]) -> Status {
    results
        .iter()
        .fold(Status::Ok, |acc, result| max(acc, result.status))
}

/// Comma-joined descriptions of everything that is not OK
pub fn problems(results: &[CheckResult]) -> String {
    results
        .iter()
        .filter(|result| result.status != Status::Ok)
        .map(|result| match result.hint {
            Some(ref hint) => format!("{} {}: {}", result.metric, result.status.label(), hint),
            None => format!("{} {}", result.metric, result.status.label()),
        })
        .collect::<Vec<_>>()
        .join(", ")
}
