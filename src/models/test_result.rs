//! Test result models
//!
//! Result tree accumulated while a test configuration runs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::script::{HierarchyLevel, TestConfigElement};
use crate::engine::{ClientInteraction, InteractionStatus};

/// Lifecycle of a whole test configuration run
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfigurationStatus {
    Initialized,
    Running,
    Finished,
    Cancelled,
}

/// Outcome of a single configuration element
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestStatus {
    Pass,
    Fail,
    Skip,
    Error,
    Cancelled,
}

impl TestStatus {
    pub fn symbol(&self) -> &'static str {
        match self {
            TestStatus::Pass => "✓",
            TestStatus::Fail => "✗",
            TestStatus::Skip => "○",
            TestStatus::Error => "!",
            TestStatus::Cancelled => "■",
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, TestStatus::Pass)
    }
}

impl fmt::Display for TestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TestStatus::Pass => write!(f, "PASS"),
            TestStatus::Fail => write!(f, "FAIL"),
            TestStatus::Skip => write!(f, "SKIP"),
            TestStatus::Error => write!(f, "ERROR"),
            TestStatus::Cancelled => write!(f, "CANCELLED"),
        }
    }
}

impl From<InteractionStatus> for TestStatus {
    fn from(status: InteractionStatus) -> Self {
        match status {
            InteractionStatus::Passed => TestStatus::Pass,
            InteractionStatus::Failed => TestStatus::Fail,
            InteractionStatus::Skipped => TestStatus::Skip,
        }
    }
}

/// Result of one configuration element, with nested child results
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TestResult {
    pub element_id: u64,
    pub element_name: String,
    pub level: Option<HierarchyLevel>,
    pub status: TestStatus,
    pub duration_ms: u64,
    pub message: Option<String>,
    pub order_index: usize,
    #[serde(default)]
    pub results: Vec<TestResult>,
}

impl TestResult {
    /// New results start out passed until something fails; skipped
    /// elements start out skipped
    pub fn for_element(element: &TestConfigElement) -> Self {
        let status = if element.is_skipped() {
            TestStatus::Skip
        } else {
            TestStatus::Pass
        };
        Self {
            element_id: element.id,
            element_name: element.name.clone(),
            level: element.level,
            status,
            duration_ms: 0,
            message: None,
            order_index: 0,
            results: Vec::new(),
        }
    }

    /// Result of an element as reported by an external client
    pub fn from_interaction(element: &TestConfigElement, interaction: &ClientInteraction) -> Self {
        let mut result = Self::for_element(element);
        result.status = interaction.status.into();
        result.message = interaction.message.clone();
        result
    }

    pub fn fail(mut self, message: impl Into<String>) -> Self {
        self.status = TestStatus::Fail;
        self.message = Some(message.into());
        self
    }

    pub fn error(mut self, error: impl fmt::Display) -> Self {
        self.status = TestStatus::Error;
        self.message = Some(error.to_string());
        self
    }

    pub fn skip(mut self, reason: impl Into<String>) -> Self {
        self.status = TestStatus::Skip;
        self.message = Some(reason.into());
        self
    }

    pub fn cancelled(mut self) -> Self {
        self.status = TestStatus::Cancelled;
        self
    }

    pub fn with_duration(mut self, duration_ms: u64) -> Self {
        self.duration_ms = duration_ms;
        self
    }

    /// Append a child result at the next order index
    pub fn add_result(&mut self, mut result: TestResult) {
        result.order_index = self.results.len();
        self.results.push(result);
    }

    /// Remove a child result, re-indexing the remaining children
    pub fn remove_result(&mut self, result: &TestResult) -> Option<TestResult> {
        remove_indexed(&mut self.results, result)
    }
}

impl fmt::Display for TestResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} [{}ms]",
            self.status.symbol(),
            self.element_name,
            self.duration_ms
        )?;
        if let Some(msg) = &self.message {
            write!(f, " - {msg}")?;
        }
        Ok(())
    }
}

/// Root of the result tree for one test configuration run
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TestConfigurationResult {
    pub identification_key: String,
    pub status: ConfigurationStatus,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub results: Vec<TestResult>,
}

impl TestConfigurationResult {
    pub fn new() -> Self {
        Self {
            identification_key: String::new(),
            status: ConfigurationStatus::Initialized,
            started_at: None,
            finished_at: None,
            results: Vec::new(),
        }
    }

    pub fn start(&mut self) {
        self.status = ConfigurationStatus::Running;
        self.started_at = Some(Utc::now());
    }

    pub fn finish(&mut self, status: ConfigurationStatus) {
        self.status = status;
        self.finished_at = Some(Utc::now());
    }

    /// Append a top-level result at the next order index
    pub fn add_result(&mut self, mut result: TestResult) {
        result.order_index = self.results.len();
        self.results.push(result);
    }

    pub fn remove_result(&mut self, result: &TestResult) -> Option<TestResult> {
        remove_indexed(&mut self.results, result)
    }

    pub fn count(&self, status: TestStatus) -> usize {
        self.results.iter().filter(|r| r.status == status).count()
    }

    pub fn pass_rate(&self) -> f64 {
        if self.results.is_empty() {
            0.0
        } else {
            (self.count(TestStatus::Pass) as f64 / self.results.len() as f64) * 100.0
        }
    }
}

impl Default for TestConfigurationResult {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TestConfigurationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Test configuration {:?}", self.status)?;
        for result in &self.results {
            writeln!(f, "  {result}")?;
        }
        writeln!(
            f,
            "Total: {} | Pass: {} | Fail: {} | Error: {} | Cancelled: {}",
            self.results.len(),
            self.count(TestStatus::Pass),
            self.count(TestStatus::Fail),
            self.count(TestStatus::Error),
            self.count(TestStatus::Cancelled)
        )
    }
}

fn remove_indexed(results: &mut Vec<TestResult>, result: &TestResult) -> Option<TestResult> {
    let position = results.iter().position(|r| r == result)?;
    let removed = results.remove(position);
    for (index, remaining) in results.iter_mut().enumerate() {
        remaining.order_index = index;
    }
    Some(removed)
}
