use crate::progress::record::{ProgressLog, StepRecord};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

/// Callback receiving an operation snapshot after every update
pub type Observer = Arc<dyn Fn(&ProgressLog) + Send + Sync>;

/// Handle returned by [`ProgressTree::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

/// Handle to an operation started on a [`ProgressTree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OperationHandle {
    id: u64,
}

impl OperationHandle {
    pub fn id(&self) -> u64 {
        self.id
    }
}

/// Handle to a step inside an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StepHandle {
    operation: OperationHandle,
    index: usize,
}

impl StepHandle {
    pub fn operation(&self) -> OperationHandle {
        self.operation
    }
}

/// Two-level progress hierarchy with an append-only operation history
///
/// Observers are called synchronously, outside the internal lock, with a
/// snapshot of the mutated operation. Operations are never removed, so the
/// full history stays queryable for diagnostics.
#[derive(Default)]
pub struct ProgressTree {
    log: Mutex<Vec<ProgressLog>>,
    observers: Mutex<Vec<(ObserverId, Observer)>>,
    next_observer: AtomicU64,
}

impl std::fmt::Debug for ProgressTree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgressTree")
            .field("operations", &self.lock_log().len())
            .finish()
    }
}

impl ProgressTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an observer
    pub fn subscribe<F>(&self, observer: F) -> ObserverId
    where
        F: Fn(&ProgressLog) + Send + Sync + 'static,
    {
        let id = ObserverId(self.next_observer.fetch_add(1, Ordering::Relaxed));
        self.observers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((id, Arc::new(observer)));
        id
    }

    /// Removes an observer, returning false if it was not registered
    pub fn unsubscribe(&self, id: ObserverId) -> bool {
        let mut observers = self
            .observers
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let before = observers.len();
        observers.retain(|(existing, _)| *existing != id);
        observers.len() != before
    }

    /// Allocates a new operation record
    ///
    /// # Arguments
    ///
    /// * `entity_id` - Catalog key the operation works on
    /// * `description` - Human readable description
    /// * `total_steps` - Known or estimated number of steps (at least 1)
    pub fn start_operation(
        &self,
        entity_id: &str,
        description: &str,
        total_steps: u32,
    ) -> OperationHandle {
        let (handle, snapshot) = {
            let mut log = self.lock_log();
            let id = log.len() as u64;
            let record = ProgressLog::new(id, entity_id, description, total_steps);
            log.push(record.clone());
            (OperationHandle { id }, record)
        };

        tracing::info!(
            entity = %entity_id,
            operation = %description,
            steps = total_steps,
            "Operation started"
        );
        self.publish(&snapshot);
        handle
    }

    /// Appends a step to an operation
    pub fn start_step(
        &self,
        operation: OperationHandle,
        kind: &str,
        parameter: Option<&str>,
        total_requests: u32,
    ) -> StepHandle {
        let (index, snapshot) = self.mutate(operation, |record| {
            record.steps.push(StepRecord::new(kind, parameter, total_requests));
            record.recompute();
            record.steps.len() - 1
        });

        tracing::debug!(
            operation = operation.id,
            step = %kind,
            parameter = parameter.unwrap_or("-"),
            "Step started"
        );
        if let Some(snapshot) = snapshot {
            self.publish(&snapshot);
        }
        StepHandle {
            operation,
            index: index.unwrap_or(usize::MAX),
        }
    }

    /// Reports (finished, total) request counts for a step
    ///
    /// `finished == total` marks the step drained. Totals may grow between
    /// calls; reported progress never moves backwards.
    pub fn update_step(&self, step: StepHandle, finished: u32, total: u32) {
        let (_, snapshot) = self.mutate(step.operation, |record| {
            if let Some(target) = record.steps.get_mut(step.index) {
                target.apply(finished, total);
            }
            record.recompute();
        });
        self.finish_update(snapshot);
    }

    /// Reports (finished, total) step counts for an operation
    pub fn update_operation(
        &self,
        operation: OperationHandle,
        finished_steps: u32,
        total_steps: u32,
    ) {
        let (_, snapshot) = self.mutate(operation, |record| {
            record.total_steps = total_steps.max(1);
            record.finished_steps = record.finished_steps.max(finished_steps);
            record.recompute();
        });
        self.finish_update(snapshot);
    }

    /// Marks every remaining slot of an operation finished
    pub fn finish_operation(&self, operation: OperationHandle) {
        let (_, snapshot) = self.mutate(operation, |record| {
            record.finished_steps = record.total_steps.max(record.steps.len() as u32);
            record.recompute();
        });
        self.finish_update(snapshot);
    }

    /// Snapshot of one operation
    pub fn operation(&self, operation: OperationHandle) -> Option<ProgressLog> {
        self.lock_log().get(operation.id as usize).cloned()
    }

    /// Snapshot of one step
    pub fn step(&self, step: StepHandle) -> Option<StepRecord> {
        self.lock_log()
            .get(step.operation.id as usize)
            .and_then(|record| record.steps.get(step.index))
            .cloned()
    }

    /// Snapshot of every operation started so far, oldest first
    pub fn history(&self) -> Vec<ProgressLog> {
        self.lock_log().clone()
    }

    fn lock_log(&self) -> std::sync::MutexGuard<'_, Vec<ProgressLog>> {
        self.log.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn mutate<R>(
        &self,
        operation: OperationHandle,
        change: impl FnOnce(&mut ProgressLog) -> R,
    ) -> (Option<R>, Option<ProgressLog>) {
        let mut log = self.lock_log();
        match log.get_mut(operation.id as usize) {
            Some(record) => {
                let result = change(record);
                (Some(result), Some(record.clone()))
            }
            None => {
                tracing::warn!(operation = operation.id, "Update for unknown operation");
                (None, None)
            }
        }
    }

    fn finish_update(&self, snapshot: Option<ProgressLog>) {
        let Some(snapshot) = snapshot else {
            return;
        };

        tracing::trace!(
            operation = snapshot.id,
            progress = snapshot.progress,
            "Progress updated"
        );
        self.publish(&snapshot);
    }

    fn publish(&self, snapshot: &ProgressLog) {
        let observers: Vec<Observer> = self
            .observers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(_, observer)| observer.clone())
            .collect();

        for observer in observers {
            observer(snapshot);
        }
    }
}
