use serde::{Deserialize, Serialize};

use crate::{InstanceRecord, InstanceState, LifecycleMode};

/// Aggregate outcome of one orchestrated run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunResult {
    pub mode: LifecycleMode,

    /// Records in processing order; specs never reached are absent
    pub records: Vec<InstanceRecord>,

    /// Reason the run stopped early, if a fatal error occurred
    pub aborted: Option<String>,
}

impl RunResult {
    pub fn new(mode: LifecycleMode) -> Self {
        Self {
            mode,
            records: Vec::new(),
            aborted: None,
        }
    }

    /// False if any instance failed or the run aborted early
    pub fn success(&self) -> bool {
        self.aborted.is_none() && self.records.iter().all(|r| r.state().is_success())
    }

    pub fn is_aborted(&self) -> bool {
        self.aborted.is_some()
    }

    pub fn succeeded(&self) -> impl Iterator<Item = &InstanceRecord> {
        self.records.iter().filter(|r| r.state().is_success())
    }

    pub fn failed(&self) -> impl Iterator<Item = &InstanceRecord> {
        self.records
            .iter()
            .filter(|r| r.state() == InstanceState::Failed)
    }

    pub fn record(&self, instance_id: &str) -> Option<&InstanceRecord> {
        self.records.iter().find(|r| r.instance_id == instance_id)
    }

    /// Distinct type names in first-seen order
    pub fn type_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for record in &self.records {
            if !names.contains(&record.type_name.as_str()) {
                names.push(&record.type_name);
            }
        }
        names
    }

    /// One line per instance, for the operator summary
    pub fn summary_lines(&self) -> Vec<String> {
        let mut lines: Vec<String> = self
            .records
            .iter()
            .map(|r| {
                let mut line = format!("{}/{}: {}", r.type_name, r.instance_id, r.state());
                if !r.address().is_empty() {
                    line.push_str(&format!(" at {}", r.address()));
                }
                if let Some(reason) = r.failure() {
                    line.push_str(&format!(" ({reason})"));
                }
                line
            })
            .collect();

        if let Some(reason) = &self.aborted {
            lines.push(format!("run aborted: {reason}"));
        }
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn deployed(id: &str) -> InstanceRecord {
        let mut record = InstanceRecord::new("NFTMinter", id);
        record.transition(InstanceState::Creating).unwrap();
        record.set_address("0x01").unwrap();
        record.transition(InstanceState::Created).unwrap();
        record.transition(InstanceState::Deployed).unwrap();
        record
    }

    #[test]
    fn test_empty_run_is_successful() {
        assert!(RunResult::new(LifecycleMode::Bootstrap).success());
    }

    #[test]
    fn test_failed_instance_clears_success() {
        let mut result = RunResult::new(LifecycleMode::CreateConfigure);
        result.records.push(deployed("a"));
        assert!(result.success());

        let mut failed = InstanceRecord::new("NFTMinter", "b");
        failed.transition(InstanceState::Creating).unwrap();
        failed.mark_failed("retries exhausted").unwrap();
        result.records.push(failed);

        assert!(!result.success());
        assert_eq!(result.failed().count(), 1);
        assert_eq!(result.succeeded().count(), 1);
    }

    #[test]
    fn test_abort_clears_success() {
        let mut result = RunResult::new(LifecycleMode::CreateConfigure);
        result.records.push(deployed("a"));
        result.aborted = Some("postcondition failed".to_string());
        assert!(!result.success());
        assert_eq!(
            result.summary_lines().last().unwrap(),
            "run aborted: postcondition failed"
        );
    }

    #[test]
    fn test_summary_line_format() {
        let mut result = RunResult::new(LifecycleMode::Bootstrap);
        result.records.push(deployed("tom_and_jerry"));
        assert_eq!(
            result.summary_lines(),
            vec!["NFTMinter/tom_and_jerry: DEPLOYED at 0x01".to_string()]
        );
        assert_eq!(result.type_names(), vec!["NFTMinter"]);
    }
}
