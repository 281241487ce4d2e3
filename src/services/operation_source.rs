//! Seam to the collaborator that owns and stores operations.

use std::time::{Duration, Instant};

use crate::errors::{FiscalError, Result};
use crate::fiscal::{recognition_date, Operation, Period};

/// Supplies the operations relevant to a set of periods.
///
/// An operation is relevant to a period when it was invoiced in it or is recognized in it.
/// Implementations must fail rather than return a partial or empty list on transport problems.
pub trait OperationSource: Send + Sync {
    fn operations_for(&self, periods: &[Period]) -> Result<Vec<Operation>>;
}

/// Operations held in memory, returned in insertion order.
#[derive(Debug, Clone, Default)]
pub struct InMemoryOperations {
    operations: Vec<Operation>,
}

impl InMemoryOperations {
    pub fn new(operations: Vec<Operation>) -> Self {
        Self { operations }
    }

    pub fn push(&mut self, operation: Operation) {
        self.operations.push(operation);
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }
}

impl FromIterator<Operation> for InMemoryOperations {
    fn from_iter<I: IntoIterator<Item = Operation>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl OperationSource for InMemoryOperations {
    fn operations_for(&self, periods: &[Period]) -> Result<Vec<Operation>> {
        let relevant = |op: &Operation| {
            periods.iter().any(|period| {
                period.contains(op.invoice_date)
                    || recognition_date(op).is_some_and(|date| period.contains(date))
            })
        };
        Ok(self
            .operations
            .iter()
            .filter(|op| relevant(*op))
            .cloned()
            .collect())
    }
}

/// Rejects answers that arrive after `budget`.
///
/// The inner call is not interrupted; a late answer is discarded and reported as
/// [`FiscalError::SourceTimeout`] so it can never be mistaken for an empty period.
#[derive(Debug, Clone)]
pub struct DeadlineSource<S> {
    inner: S,
    budget: Duration,
}

impl<S: OperationSource> DeadlineSource<S> {
    pub fn new(inner: S, budget: Duration) -> Self {
        Self { inner, budget }
    }
}

impl<S: OperationSource> OperationSource for DeadlineSource<S> {
    fn operations_for(&self, periods: &[Period]) -> Result<Vec<Operation>> {
        let started = Instant::now();
        let operations = self.inner.operations_for(periods)?;
        let elapsed = started.elapsed();
        if elapsed > self.budget {
            let elapsed_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);
            tracing::warn!(elapsed_ms, budget_ms = ?self.budget, "operation source timed out");
            return Err(FiscalError::SourceTimeout { elapsed_ms });
        }
        Ok(operations)
    }
}
