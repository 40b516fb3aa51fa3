//! One pass over the metric catalog against a single live link.

use crate::catalog::MetricCatalog;
use crate::link::{DeviceLink, LinkError};
use crate::reporter::{PollEvent, Reporter};

/// How a poll pass ended.
#[derive(Debug, Clone, PartialEq)]
pub enum PassOutcome {
    /// Every entry was read or skipped.
    Completed { readings: usize, skipped: usize },
    /// A read failed; the pass stopped at `label` and the link must be dropped.
    ReadFailed {
        label: &'static str,
        error: LinkError,
    },
}

impl PassOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, PassOutcome::Completed { .. })
    }
}

/// Walks a [`MetricCatalog`] in order, one read at a time.
pub struct PollExecutor<Op> {
    catalog: MetricCatalog<Op>,
}

impl<Op: Copy + Send + Sync + 'static> PollExecutor<Op> {
    pub fn new(catalog: MetricCatalog<Op>) -> Self {
        Self { catalog }
    }

    /// Run one pass.
    ///
    /// Unbound entries are reported as unavailable and skipped. The first
    /// failing read is reported and ends the pass; nothing after it is read.
    pub async fn run_pass<L, R>(&self, link: &mut L, reporter: &mut R) -> PassOutcome
    where
        L: DeviceLink<Op = Op>,
        R: Reporter + ?Sized,
    {
        let mut readings = 0;
        let mut skipped = 0;

        for descriptor in self.catalog.iter() {
            let Some(op) = descriptor.op else {
                reporter.report(PollEvent::Unavailable {
                    label: descriptor.label,
                });
                skipped += 1;
                continue;
            };

            match link.read(op).await {
                Ok(value) => {
                    reporter.report(PollEvent::Reading {
                        label: descriptor.label,
                        value,
                    });
                    readings += 1;
                }
                Err(error) => {
                    reporter.report(PollEvent::ReadFailed {
                        label: descriptor.label,
                        error: error.clone(),
                    });
                    return PassOutcome::ReadFailed {
                        label: descriptor.label,
                        error,
                    };
                }
            }
        }

        reporter.report(PollEvent::PassCompleted { readings, skipped });
        PassOutcome::Completed { readings, skipped }
    }
}
