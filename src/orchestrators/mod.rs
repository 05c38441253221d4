//! Orchestration vocabulary: per-step outcomes and their aggregation.
//!
//! Orchestrators drive several independently-failing remote operations to
//! one aggregate outcome. Adapters report failures as values; the policy
//! on an [`AggregateResult`] decides whether a failed step is advisory or
//! fatal to the whole request.

pub mod delete;
pub mod resize;

use crate::adapters::object_store::ObjectLocation;
use crate::models::PhotoKey;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepStatus {
    Succeeded,
    Failed,
    Skipped,
}

/// Undo handle recorded on a successful step. Nothing executes these
/// today; a saga-style coordinator could run them in reverse order on
/// abort. Until one exists, an aborted pipeline leaves the effects of
/// earlier stages in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompensatingAction {
    /// Delete a stored object.
    RemoveObject(ObjectLocation),
    /// Delete a stored object together with its metadata row.
    RemoveUpload { location: ObjectLocation, key: String },
}

/// Result of one remote step. Immutable once produced, always a returned
/// value rather than a propagated error.
#[derive(Debug, Clone)]
pub struct StepOutcome {
    pub status: StepStatus,
    pub detail: Option<String>,
    pub count: Option<u64>,
    pub error: Option<String>,
    pub compensation: Option<CompensatingAction>,
}

impl StepOutcome {
    pub fn succeeded(detail: impl Into<String>) -> Self {
        Self {
            status: StepStatus::Succeeded,
            detail: Some(detail.into()),
            count: None,
            error: None,
            compensation: None,
        }
    }

    pub fn succeeded_with_count(count: u64) -> Self {
        Self {
            status: StepStatus::Succeeded,
            detail: None,
            count: Some(count),
            error: None,
            compensation: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            status: StepStatus::Failed,
            detail: None,
            count: None,
            error: Some(error.into()),
            compensation: None,
        }
    }

    pub fn skipped() -> Self {
        Self {
            status: StepStatus::Skipped,
            detail: None,
            count: None,
            error: None,
            compensation: None,
        }
    }

    pub fn with_compensation(mut self, action: CompensatingAction) -> Self {
        self.compensation = Some(action);
        self
    }

    pub fn is_success(&self) -> bool {
        self.status == StepStatus::Succeeded
    }

    /// Human-readable summary for response bodies: the success detail or
    /// the failure description.
    pub fn message(&self) -> String {
        self.detail
            .clone()
            .or_else(|| self.error.clone())
            .unwrap_or_default()
    }
}

/// How step failures roll up into the overall status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregatePolicy {
    /// Step failures are advisory; the aggregate still succeeds and the
    /// caller reads the per-step flags.
    Advisory,
    /// The first failed step fails the aggregate.
    FailFast,
}

/// Ordered mapping from step name to outcome, plus the derived overall
/// status. Lives for one request cycle only.
#[derive(Debug)]
pub struct AggregateResult {
    policy: AggregatePolicy,
    steps: Vec<(&'static str, StepOutcome)>,
}

impl AggregateResult {
    pub fn new(policy: AggregatePolicy) -> Self {
        Self {
            policy,
            steps: Vec::new(),
        }
    }

    pub fn record(&mut self, name: &'static str, outcome: StepOutcome) {
        self.steps.push((name, outcome));
    }

    pub fn step(&self, name: &str) -> Option<&StepOutcome> {
        self.steps
            .iter()
            .find(|(step_name, _)| *step_name == name)
            .map(|(_, outcome)| outcome)
    }

    pub fn succeeded(&self) -> bool {
        match self.policy {
            AggregatePolicy::Advisory => true,
            AggregatePolicy::FailFast => self
                .steps
                .iter()
                .all(|(_, outcome)| outcome.status == StepStatus::Succeeded),
        }
    }

    pub fn first_failure(&self) -> Option<(&'static str, &StepOutcome)> {
        self.steps
            .iter()
            .find(|(_, outcome)| outcome.status == StepStatus::Failed)
            .map(|(name, outcome)| (*name, outcome))
    }
}

/// Bucket layout shared by both orchestrators. The derived location is
/// deterministic: fixed prefix plus the original key.
#[derive(Debug, Clone)]
pub struct StorageLayout {
    pub original_bucket: String,
    pub derived_bucket: String,
}

impl StorageLayout {
    pub fn new(original_bucket: impl Into<String>, derived_bucket: impl Into<String>) -> Self {
        Self {
            original_bucket: original_bucket.into(),
            derived_bucket: derived_bucket.into(),
        }
    }

    pub fn original_location(&self, key: &PhotoKey) -> ObjectLocation {
        ObjectLocation::new(&self.original_bucket, key.as_str())
    }

    pub fn derived_location(&self, key: &PhotoKey) -> ObjectLocation {
        ObjectLocation::new(&self.derived_bucket, key.derived())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advisory_aggregate_succeeds_despite_failed_steps() {
        let mut result = AggregateResult::new(AggregatePolicy::Advisory);
        result.record("db", StepOutcome::failed("row store unavailable"));
        result.record("storage-original", StepOutcome::succeeded("deleted"));
        assert!(result.succeeded());
        assert_eq!(result.first_failure().map(|(name, _)| name), Some("db"));
    }

    #[test]
    fn fail_fast_aggregate_fails_on_first_failed_step() {
        let mut result = AggregateResult::new(AggregatePolicy::FailFast);
        result.record("store-original", StepOutcome::failed("storage rejected"));
        result.record("derive-thumbnail", StepOutcome::skipped());
        assert!(!result.succeeded());
        let (name, outcome) = result.first_failure().unwrap();
        assert_eq!(name, "store-original");
        assert_eq!(outcome.status, StepStatus::Failed);
    }

    #[test]
    fn fail_fast_aggregate_succeeds_when_all_steps_do() {
        let mut result = AggregateResult::new(AggregatePolicy::FailFast);
        result.record("store-original", StepOutcome::succeeded("stored"));
        result.record("derive-thumbnail", StepOutcome::succeeded("derived"));
        assert!(result.succeeded());
        assert!(result.first_failure().is_none());
    }

    #[test]
    fn step_message_prefers_detail_over_error() {
        assert_eq!(StepOutcome::succeeded("done").message(), "done");
        assert_eq!(StepOutcome::failed("broken").message(), "broken");
        assert_eq!(StepOutcome::skipped().message(), "");
    }

    #[test]
    fn derived_location_uses_fixed_prefix() {
        let layout = StorageLayout::new("originals", "thumbnails");
        let key = PhotoKey::parse("cat.png").unwrap();
        let derived = layout.derived_location(&key);
        assert_eq!(derived.bucket, "thumbnails");
        assert_eq!(derived.key, "resized-cat.png");
    }
}
