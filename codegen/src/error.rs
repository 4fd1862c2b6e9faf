//! Error types for template loading and per-artifact emission.

use std::path::PathBuf;

use thiserror::Error;

/// A template could not be loaded. Fatal for the whole run.
#[derive(Debug, Error)]
pub enum TemplateError {
    /// The template file does not exist.
    #[error("template {} does not exist", path.display())]
    Missing {
        /// Expected location of the template.
        path: PathBuf,
    },
    /// The template file exists but could not be read.
    #[error("failed to read template {}", path.display())]
    Unreadable {
        /// Location of the template.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The template text does not parse.
    #[error("template {name} is invalid")]
    Invalid {
        /// Template file name.
        name: &'static str,
        /// Parser error.
        #[source]
        source: Box<handlebars::TemplateError>,
    },
}

/// A single artifact could not be produced. The run continues.
#[derive(Debug, Error)]
pub enum EmitError {
    /// A derived definition names a dimension that is not defined.
    #[error("`{dimension}` references undefined dimension `{reference}`")]
    UnresolvedReference {
        /// The dimension being generated.
        dimension: String,
        /// The missing dimension name.
        reference: String,
    },
    /// A derived definition reaches itself through its references.
    #[error("`{dimension}` has a cyclic definition: {}", path.join(" -> "))]
    CyclicDefinition {
        /// The dimension being generated.
        dimension: String,
        /// The reference chain that closes the cycle.
        path: Vec<String>,
    },
    /// Expanding the definition overflows the exponent range.
    #[error("`{dimension}` overflows exponent arithmetic while expanding `{reference}`")]
    ExponentOverflow {
        /// The dimension being generated.
        dimension: String,
        /// The derived dimension whose expansion overflowed.
        reference: String,
    },
    /// An integral exponent would need more template parameters than allowed.
    #[error("`{dimension}` raises `{reference}` to {exponent}; at most {limit} parameters per term")]
    ExponentTooLarge {
        /// The dimension being generated.
        dimension: String,
        /// The referenced dimension.
        reference: String,
        /// The exponent as written, reduced.
        exponent: String,
        /// The per-term parameter limit.
        limit: u64,
    },
    /// Two dimensions map to the same output file.
    #[error("`{dimension}` writes to the same file as `{existing}`")]
    PathCollision {
        /// The dimension that was skipped.
        dimension: String,
        /// The dimension that already claimed the path.
        existing: String,
    },
    /// A named unit's component does not name a known unit.
    #[error("unit `{named_unit}` of `{dimension}` uses unknown unit `{unit}`")]
    UnresolvedUnit {
        /// The dimension being generated.
        dimension: String,
        /// The named output unit containing the component.
        named_unit: String,
        /// The unresolved component unit.
        unit: String,
    },
    /// The template engine rejected the parameter set.
    #[error("failed to render {template}")]
    Render {
        /// Template file name.
        template: &'static str,
        /// Engine error.
        #[source]
        source: Box<handlebars::RenderError>,
    },
    /// The rendered text could not be written.
    #[error("failed to write {}", path.display())]
    Write {
        /// Target path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}
