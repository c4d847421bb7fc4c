use keylock::Result;
use serde::Serialize;
use std::time::Duration;

#[derive(Debug, Serialize)]
pub struct StressReport<'a> {
    pub key: &'a str,
    pub acquisitions: usize,
    pub peak_holders: usize,
    pub tracked_keys: usize,
    pub elapsed_ms: u64,
}

#[derive(Debug, Serialize)]
pub struct ExpireReport<'a> {
    pub key: &'a str,
    pub acquired: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub holder_released: Option<bool>,
    pub elapsed_ms: u64,
}

pub fn millis(elapsed: Duration) -> u64 {
    u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
}

/// Print `report` as a single JSON line on stdout
pub fn print_json<T: Serialize>(report: &T) -> Result<()> {
    println!("{}", serde_json::to_string(report)?);
    Ok(())
}
