//! Generation report types: per-artifact outcomes and their aggregation.

use std::path::PathBuf;

use crate::error::EmitError;
use crate::mapping::ArtifactKind;

/// The result of producing one artifact.
#[derive(Debug)]
pub struct Outcome {
    /// Dimension the artifact belongs to; `None` for the umbrella header.
    pub dimension: Option<String>,
    /// Which artifact.
    pub artifact: ArtifactKind,
    /// Output path relative to the output root.
    pub path: PathBuf,
    /// Why the artifact was not produced, if it wasn't.
    pub error: Option<EmitError>,
}

impl Outcome {
    /// Creates a success outcome.
    pub fn written(dimension: Option<&str>, artifact: ArtifactKind, path: PathBuf) -> Self {
        Self {
            dimension: dimension.map(str::to_string),
            artifact,
            path,
            error: None,
        }
    }

    /// Creates a failure outcome.
    pub fn failed(
        dimension: Option<&str>,
        artifact: ArtifactKind,
        path: PathBuf,
        error: EmitError,
    ) -> Self {
        Self {
            dimension: dimension.map(str::to_string),
            artifact,
            path,
            error: Some(error),
        }
    }

    /// Returns true if the artifact was not produced.
    pub fn is_failure(&self) -> bool {
        self.error.is_some()
    }
}

/// Aggregated outcomes of one generation run, in generation order.
#[derive(Debug, Default)]
pub struct GenerationReport {
    /// Every attempted artifact.
    pub outcomes: Vec<Outcome>,
}

impl GenerationReport {
    /// Appends an outcome.
    pub fn push(&mut self, outcome: Outcome) {
        self.outcomes.push(outcome);
    }

    /// Outcomes that failed.
    pub fn failures(&self) -> impl Iterator<Item = &Outcome> {
        self.outcomes.iter().filter(|o| o.is_failure())
    }

    /// Returns the count of written artifacts.
    pub fn success_count(&self) -> usize {
        self.outcomes.len() - self.failure_count()
    }

    /// Returns the count of failed artifacts.
    pub fn failure_count(&self) -> usize {
        self.failures().count()
    }

    /// Returns true if every attempted artifact was written.
    pub fn all_succeeded(&self) -> bool {
        self.failure_count() == 0
    }

    /// True if `artifact` for `dimension` was written.
    pub fn wrote(&self, dimension: &str, artifact: ArtifactKind) -> bool {
        self.outcomes.iter().any(|o| {
            o.artifact == artifact && !o.is_failure() && o.dimension.as_deref() == Some(dimension)
        })
    }
}
