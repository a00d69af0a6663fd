//! Partitioning of the identifier list into display batches.

use crate::input::Identifier;

/// One contiguous chunk of the identifier list.
/// `start` and `end` are 1-based and inclusive, as shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Batch {
    /// 1-based batch number.
    pub number: usize,
    pub start: usize,
    pub end: usize,
}

impl Batch {
    /// Number of identifiers in the batch; never zero.
    pub fn count(&self) -> usize {
        self.end + 1 - self.start
    }

    /// The identifiers this batch covers.
    pub fn slice<'a>(&self, identifiers: &'a [Identifier]) -> &'a [Identifier] {
        &identifiers[self.start - 1..self.end]
    }

    /// "{start} - {end}"
    pub fn display_range(&self) -> String {
        format!("{} - {}", self.start, self.end)
    }
}

/// Split `identifiers` into chunks of at most `batch_size`, in input order.
/// Yields `ceil(len / batch_size)` batches whose ranges cover `1..=len`.
///
/// # Panics
/// If `batch_size` is 0; config validation and the run's validating step
/// both reject that value first.
pub fn partition(identifiers: &[Identifier], batch_size: usize) -> Vec<Batch> {
    assert!(batch_size > 0, "batch_size must be non-zero");
    let total = identifiers.len();
    (0..total)
        .step_by(batch_size)
        .enumerate()
        .map(|(i, offset)| Batch {
            number: i + 1,
            start: offset + 1,
            end: (offset + batch_size).min(total),
        })
        .collect()
}
