//! Consumers of the raw result stream

use crate::error::LoadTestError;
use crate::result::UserResult;
use serde::Serialize;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupKind {
    Batch,
    Period,
    Level,
}

/// The batch, period or sweep level a slice of results belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GroupInfo {
    pub kind: GroupKind,
    pub index: u32,
    pub load: u32,
    pub size: usize,
}

/// Receives every group's results once its barrier has passed.
///
/// Results arrive ordered by `user_id`. An error from a sink is logged and
/// the run carries on.
pub trait ResultSink: Send {
    fn record(&mut self, group: &GroupInfo, results: &[UserResult]) -> Result<(), LoadTestError>;

    /// Called once after the last group
    fn finish(&mut self) -> Result<(), LoadTestError> {
        Ok(())
    }
}

/// Logs one line per user at `info`
#[derive(Debug, Default)]
pub struct TracingSink;

impl ResultSink for TracingSink {
    fn record(&mut self, group: &GroupInfo, results: &[UserResult]) -> Result<(), LoadTestError> {
        for result in results {
            let payload = result
                .payload()
                .map(|form| serde_json::to_string(form).unwrap_or_default())
                .unwrap_or_default();
            let response = result.response().map(|r| r.to_string()).unwrap_or_default();
            let statuses: Vec<String> = result
                .status_codes()
                .into_iter()
                .map(|s| s.map_or_else(|| "-".to_string(), |code| code.to_string()))
                .collect();

            info!(
                group = ?group.kind,
                index = group.index,
                load = group.load,
                user_id = result.user_id(),
                action = %result.action(),
                result = if result.overall_succeeded() { "PASS" } else { "FAIL" },
                total_ms = result.total_latency().as_secs_f64() * 1000.0,
                statuses = %statuses.join(","),
                payload = %payload,
                response = %response,
                error = result.error().unwrap_or(""),
                "User finished"
            );
        }
        Ok(())
    }
}
