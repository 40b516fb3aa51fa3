//! The ordered table of metrics a poll pass walks through.

use std::collections::HashSet;

use thiserror::Error;

/// Catalog construction errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    #[error("Duplicate metric label '{0}'")]
    DuplicateLabel(String),
    #[error("Unknown metric label '{0}'")]
    UnknownLabel(String),
}

/// One polled quantity: a reporting label and the read that produces it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricDescriptor<Op> {
    /// Reporting identity, unique within a catalog.
    pub label: &'static str,
    /// `None` when the quantity cannot be read; it is reported as unavailable.
    pub op: Option<Op>,
}

impl<Op> MetricDescriptor<Op> {
    /// A descriptor bound to a read operation.
    pub const fn new(label: &'static str, op: Op) -> Self {
        Self { label, op: Some(op) }
    }

    /// A descriptor with no read operation.
    pub const fn unbound(label: &'static str) -> Self {
        Self { label, op: None }
    }
}

/// Fixed, ordered list of metrics. Order is the reporting order.
#[derive(Debug, Clone)]
pub struct MetricCatalog<Op> {
    entries: Vec<MetricDescriptor<Op>>,
}

impl<Op: Copy> MetricCatalog<Op> {
    /// Build a catalog, rejecting duplicate labels.
    pub fn new(
        entries: impl IntoIterator<Item = MetricDescriptor<Op>>,
    ) -> Result<Self, CatalogError> {
        let entries: Vec<_> = entries.into_iter().collect();
        let mut seen = HashSet::with_capacity(entries.len());
        for entry in &entries {
            if !seen.insert(entry.label) {
                return Err(CatalogError::DuplicateLabel(entry.label.to_string()));
            }
        }
        Ok(Self { entries })
    }

    /// Unbind the read operation of each named entry.
    ///
    /// Entries keep their position, so the reporting order is unchanged.
    pub fn disable<'a>(
        mut self,
        labels: impl IntoIterator<Item = &'a str>,
    ) -> Result<Self, CatalogError> {
        for label in labels {
            let entry = self
                .entries
                .iter_mut()
                .find(|e| e.label == label)
                .ok_or_else(|| CatalogError::UnknownLabel(label.to_string()))?;
            entry.op = None;
        }
        Ok(self)
    }

    pub fn iter(&self) -> impl Iterator<Item = &MetricDescriptor<Op>> {
        self.entries.iter()
    }

    pub fn labels(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|e| e.label)
    }

    pub fn contains(&self, label: &str) -> bool {
        self.entries.iter().any(|e| e.label == label)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
