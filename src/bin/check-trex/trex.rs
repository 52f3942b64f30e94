//! Talk to the T-Rex miner
//!
//! This module defines the wire format of the miner's `/summary` endpoint,
//! the function that fetches it, and the conversion from one parsed summary
//! into the flat list of metrics that the thresholds get applied to.
//!
//! Every field we care about is optional: a summary that omits one simply
//! produces no metric for it.

use std::fmt;
use std::io::{self, Read};
use std::time::Duration;

use reqwest;
use reqwest::Error as ReqwestError;
use serde::{Deserialize, Deserializer};
use serde_json;

use trex_plugins::check::Metric;

/// The parts of the `/summary` response that we check
#[derive(Debug, Deserialize)]
pub struct Summary {
    pub hashrate: Option<f64>,
    #[serde(default, deserialize_with = "truthy")]
    pub success: Option<bool>,
    #[serde(default, deserialize_with = "truthy")]
    pub paused: Option<bool>,
    /// Seconds since the miner started
    pub uptime: Option<f64>,
    #[serde(default)]
    pub gpus: Vec<Gpu>,
}

#[derive(Debug, Deserialize)]
pub struct Gpu {
    pub gpu_id: u32,
    pub name: String,
    pub temperature: Option<f64>,
    pub memory_temperature: Option<f64>,
}

/// Deserialize a flag the miner may report as a bool or as a number
///
/// The api reports `"success": 1`, not `true`.
fn truthy<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Null => None,
        serde_json::Value::Bool(b) => Some(b),
        serde_json::Value::Number(n) => Some(n.as_f64().map_or(false, |n| n != 0.0)),
        serde_json::Value::String(s) => Some(!s.is_empty()),
        serde_json::Value::Array(a) => Some(!a.is_empty()),
        serde_json::Value::Object(o) => Some(!o.is_empty()),
    })
}

pub enum TrexError {
    Http(ReqwestError),
    Json(String),
    Io(String),
}

impl TrexError {
    /// A one-line version suitable for the check's output line
    pub fn short_display(&self) -> String {
        match *self {
            TrexError::Http(ref e) => e.to_string(),
            TrexError::Json(_) => "Error parsing json".to_owned(),
            TrexError::Io(_) => "Error reading response from the miner".to_owned(),
        }
    }
}

impl From<ReqwestError> for TrexError {
    fn from(e: ReqwestError) -> Self {
        TrexError::Http(e)
    }
}

impl From<io::Error> for TrexError {
    fn from(e: io::Error) -> Self {
        TrexError::Io(e.to_string())
    }
}

impl fmt::Display for TrexError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            TrexError::Http(ref e) => e.fmt(f),
            TrexError::Json(ref e) => write!(f, "{}", e),
            TrexError::Io(ref e) => write!(f, "{}", e),
        }
    }
}

/// Fetch and parse `{url}/summary`
///
/// A timeout, a connection error, a non-2xx response, and unparseable json
/// are all errors. One attempt, no retries: the scheduler that runs this
/// check will be back soon enough.
pub fn fetch_summary(url: &str, timeout: u64) -> Result<Summary, TrexError> {
    let full_path = format!("{}/summary", url);
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout))
        .build()?;
    info!("querying {}", full_path);
    let mut response = client.get(&full_path).send()?.error_for_status()?;
    let mut body = String::new();
    response.read_to_string(&mut body)?;
    debug!("response: {}", body.trim());
    serde_json::from_str(&body)
        .map_err(|e| TrexError::Json(format!("invalid json from {}: {}", full_path, e)))
}

/// Flatten a summary into the metrics that are actually present
pub fn metrics_from(summary: &Summary) -> Vec<Metric> {
    let mut metrics = Vec::new();

    if let Some(hashrate) = summary.hashrate {
        debug!("hashrate is {}", hashrate);
        metrics.push(Metric::scalar("hashrate", hashrate));
    }

    if let Some(success) = summary.success {
        if success {
            debug!("the miner started successfully");
        } else {
            debug!("the miner did not start successfully");
        }
        metrics.push(Metric::boolean("success", success));
    }

    if let Some(paused) = summary.paused {
        if paused {
            debug!("the miner is paused");
        } else {
            debug!("the miner is not paused");
        }
        metrics.push(Metric::boolean("paused", paused));
    }

    if let Some(uptime) = summary.uptime {
        let unit = if uptime > 1.0 { "seconds" } else { "second" };
        debug!("uptime is {} {}", uptime, unit);
        metrics.push(Metric::scalar("uptime", uptime));
    }

    for gpu in &summary.gpus {
        if let Some(temperature) = gpu.temperature {
            debug!(
                "temperature of {} ({}) is {}C",
                gpu.name, gpu.gpu_id, temperature
            );
            metrics.push(Metric::scalar("temperature", temperature));
        }

        if let Some(memory_temperature) = gpu.memory_temperature {
            debug!(
                "memory temperature of {} ({}) is {}C",
                gpu.name, gpu.gpu_id, memory_temperature
            );
            metrics.push(Metric::scalar("memory_temperature", memory_temperature));
        }
    }

    metrics
}

#[cfg(test)]
mod test {
    use super::*;

    use serde_json;

    use trex_plugins::check::MetricValue;

    fn full_summary() -> &'static str {
        r#"{
            "hashrate": 61500000,
            "success": 1,
            "paused": false,
            "uptime": 86450,
            "gpus": [
                {
                    "gpu_id": 0,
                    "name": "GeForce RTX 3080",
                    "temperature": 63,
                    "memory_temperature": 84
                },
                {
                    "gpu_id": 1,
                    "name": "GeForce RTX 3070",
                    "temperature": 58
                }
            ]
        }"#
    }

    #[test]
    fn deserializes_a_full_summary() {
        let summary: Summary = serde_json::from_str(full_summary()).unwrap();
        assert_eq!(summary.hashrate, Some(61_500_000.0));
        assert_eq!(summary.success, Some(true));
        assert_eq!(summary.paused, Some(false));
        assert_eq!(summary.uptime, Some(86_450.0));
        assert_eq!(summary.gpus.len(), 2);
        assert_eq!(summary.gpus[0].memory_temperature, Some(84.0));
        assert_eq!(summary.gpus[1].memory_temperature, None);
    }

    #[test]
    fn numeric_flags_coerce_to_booleans() {
        let summary: Summary =
            serde_json::from_str(r#"{"success": 0, "paused": true}"#).unwrap();
        assert_eq!(summary.success, Some(false));
        assert_eq!(summary.paused, Some(true));
    }

    #[test]
    fn an_empty_summary_is_fine() {
        let summary: Summary = serde_json::from_str("{}").unwrap();
        assert_eq!(summary.hashrate, None);
        assert_eq!(summary.success, None);
        assert_eq!(summary.paused, None);
        assert_eq!(summary.uptime, None);
        assert!(summary.gpus.is_empty());
        assert!(metrics_from(&summary).is_empty());
    }

    #[test]
    fn each_gpu_contributes_its_own_temperatures() {
        let summary: Summary = serde_json::from_str(full_summary()).unwrap();
        let metrics = metrics_from(&summary);
        let names: Vec<_> = metrics.iter().map(|m| m.name).collect();
        assert_eq!(
            names,
            [
                "hashrate",
                "success",
                "paused",
                "uptime",
                "temperature",
                "memory_temperature",
                "temperature",
            ]
        );
    }

    #[test]
    fn missing_fields_produce_no_metrics() {
        let summary: Summary =
            serde_json::from_str(r#"{"hashrate": 500, "gpus": []}"#).unwrap();
        let metrics = metrics_from(&summary);
        assert_eq!(metrics.len(), 1);
        assert_eq!(metrics[0].name, "hashrate");
        assert_eq!(metrics[0].value, MetricValue::Scalar(500.0));
    }
}
