//! `"i of N"` position labels written on split requests.

use std::fmt::{Display, Formatter};

/// 1-based position of one atomic request within its original request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TaskPosition {
    index: usize,
    total: usize,
}

impl TaskPosition {
    /// Returns `None` unless `1 <= index <= total`.
    pub fn new(index: usize, total: usize) -> Option<Self> {
        (index >= 1 && index <= total).then_some(Self { index, total })
    }

    /// `1 of total` through `total of total`, in order.
    pub fn sequence(total: usize) -> impl Iterator<Item = TaskPosition> {
        (1..=total).map(move |index| Self { index, total })
    }
}

impl Display for TaskPosition {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} of {}", self.index, self.total)
    }
}
