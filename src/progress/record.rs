//! Progress record definitions
//!
//! A [`ProgressLog`] describes one façade call; its [`StepRecord`]s describe
//! the units of sub-work (one category, one pagination stream) inside it.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

/// One unit of sub-work inside an operation
#[derive(Debug, Clone, Serialize)]
pub struct StepRecord {
    /// Type label, e.g. `filming dates` or `reviews`
    pub kind: String,

    /// Partition label, e.g. a connection category
    pub parameter: Option<String>,

    pub finished_requests: u32,

    /// Known or estimated number of requests; may grow while paginating
    pub total_requests: u32,

    /// Fraction in [0, 1]. Exactly 1 means the step is drained.
    pub progress: f64,

    pub start: DateTime<Utc>,
    pub end: Option<DateTime<Utc>>,
}

impl StepRecord {
    pub(crate) fn new(kind: &str, parameter: Option<&str>, total_requests: u32) -> Self {
        Self {
            kind: kind.to_string(),
            parameter: parameter.map(str::to_string),
            finished_requests: 0,
            total_requests,
            progress: 0.0,
            start: Utc::now(),
            end: None,
        }
    }

    /// Returns true once the step has reported its final request
    pub fn is_drained(&self) -> bool {
        self.progress >= 1.0
    }

    /// Elapsed time of a finished step
    pub fn duration(&self) -> Option<Duration> {
        self.end.map(|end| end - self.start)
    }

    /// Applies a (finished, total) report; progress never moves backwards
    pub(crate) fn apply(&mut self, finished: u32, total: u32) {
        let total = total.max(finished);
        self.finished_requests = self.finished_requests.max(finished);
        self.total_requests = total.max(self.finished_requests);

        let fraction = if self.total_requests == 0 {
            1.0
        } else {
            f64::from(self.finished_requests) / f64::from(self.total_requests)
        };
        self.progress = self.progress.max(fraction).min(1.0);

        if self.is_drained() && self.end.is_none() {
            self.end = Some(Utc::now());
        }
    }
}

/// One façade call and its steps
#[derive(Debug, Clone, Serialize)]
pub struct ProgressLog {
    pub id: u64,
    pub entity_id: String,
    pub description: String,
    pub start: DateTime<Utc>,

    /// Set once the final step slot completes
    pub end: Option<DateTime<Utc>>,

    pub steps: Vec<StepRecord>,

    /// Slots reported finished by the owner, independent of step records
    pub finished_steps: u32,

    /// Known or estimated number of step slots
    pub total_steps: u32,

    /// Weighted overall fraction in [0, 1]
    pub progress: f64,
}

impl ProgressLog {
    pub(crate) fn new(id: u64, entity_id: &str, description: &str, total_steps: u32) -> Self {
        Self {
            id,
            entity_id: entity_id.to_string(),
            description: description.to_string(),
            start: Utc::now(),
            end: None,
            steps: Vec::new(),
            finished_steps: 0,
            total_steps: total_steps.max(1),
            progress: 0.0,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.end.is_some()
    }

    /// Elapsed time of a finished operation
    pub fn duration(&self) -> Option<Duration> {
        self.end.map(|end| end - self.start)
    }

    /// Recomputes the weighted progress
    ///
    /// Every finished slot contributes `1 / total_steps`; the active (last,
    /// undrained) step contributes its own progress times `1 / total_steps`.
    pub(crate) fn recompute(&mut self) {
        let slots = self.total_steps.max(self.steps.len() as u32).max(1);
        self.total_steps = slots;

        let drained = self.steps.iter().filter(|step| step.is_drained()).count() as u32;
        let finished = self.finished_steps.max(drained).min(slots);

        let active = match self.steps.last() {
            Some(step) if !step.is_drained() && finished < slots => step.progress,
            _ => 0.0,
        };

        let computed = ((f64::from(finished) + active) / f64::from(slots)).min(1.0);
        self.progress = self.progress.max(computed);

        if finished >= slots && self.end.is_none() {
            self.progress = 1.0;
            self.end = Some(Utc::now());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_progress_fraction() {
        let mut step = StepRecord::new("news", None, 4);
        step.apply(1, 4);
        assert_eq!(step.progress, 0.25);
        assert!(!step.is_drained());
        assert!(step.end.is_none());
    }

    #[test]
    fn test_step_finished_never_exceeds_total() {
        let mut step = StepRecord::new("news", None, 1);
        step.apply(3, 2);
        assert_eq!(step.finished_requests, 3);
        assert_eq!(step.total_requests, 3);
        assert!(step.is_drained());
    }

    #[test]
    fn test_step_progress_does_not_regress_when_total_grows() {
        let mut step = StepRecord::new("reviews", None, 2);
        step.apply(1, 2);
        step.apply(1, 10);
        assert_eq!(step.progress, 0.5);
    }

    #[test]
    fn test_drained_step_has_duration() {
        let mut step = StepRecord::new("news", None, 1);
        assert!(step.duration().is_none());
        step.apply(1, 1);
        assert!(step.duration().unwrap() >= Duration::zero());
    }

    #[test]
    fn test_empty_step_is_drained() {
        let mut step = StepRecord::new("awards", None, 0);
        step.apply(0, 0);
        assert!(step.is_drained());
    }
}
