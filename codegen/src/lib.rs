//! dimgen code generator.
//!
//! Takes the aggregated dimension set from `dimgen_spec` and renders the
//! unit-safe C++ headers: two per fundamental dimension, two per derived
//! dimension, and one umbrella header including every unit header.
//!
//! Generation is resilient to single-item failure. A derived dimension with
//! an unresolved reference, an exponent overflow, a render error or an
//! unwritable target fails only its own artifacts; everything else is still
//! written, and each attempt is recorded in the returned [`GenerationReport`].
//!
//! ```no_run
//! use std::path::Path;
//!
//! let load = dimgen_spec::loader::load_files(&["metadata/FundamentalUnits.json"])?;
//! let all = dimgen_spec::aggregate(load.dimensions);
//! let templates = dimgen_codegen::TemplateSet::builtin()?;
//! let report = dimgen_codegen::generate(&all, &templates, Path::new("out"));
//! assert!(report.all_succeeded());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    missing_docs,
    clippy::missing_errors_doc
)]

pub mod emit;
pub mod error;
pub mod mapping;
pub mod numbering;
pub mod params;
pub mod report;
pub mod templates;

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Serialize;

use dimgen_spec::{AllDimensions, DimensionKind};

pub use error::{EmitError, TemplateError};
pub use mapping::ArtifactKind;
pub use report::{GenerationReport, Outcome};
pub use templates::TemplateSet;

/// Generates every artifact for `all` under `out_dir`.
///
/// Fundamentals are emitted first, then deriveds, each in aggregate order,
/// then the umbrella header listing the unit headers that were written.
/// Never aborts early; inspect the returned report for failures.
///
/// Two dimensions whose names map to the same file (`MassFlowRate` and
/// `mass_flow_rate`) are not both written: the later one fails with
/// [`EmitError::PathCollision`].
pub fn generate(all: &AllDimensions, templates: &TemplateSet, out_dir: &Path) -> GenerationReport {
    let mut report = GenerationReport::default();
    let mut written: Vec<(&str, DimensionKind)> = Vec::new();
    let mut claimed: HashMap<PathBuf, &str> = HashMap::new();

    for (name, dim) in all.fundamentals() {
        if !claim(&mut claimed, &mut report, name, DimensionKind::Fundamental) {
            continue;
        }
        let params = params::fundamental(dim);
        tracing::debug!(dimension = %name, units = params.units.len(), "fundamental parameters");
        emit_pair(
            &mut report,
            templates,
            out_dir,
            name,
            DimensionKind::Fundamental,
            Ok(params),
        );
        if report.wrote(name, ArtifactKind::FundamentalUnit) {
            written.push((name.as_str(), DimensionKind::Fundamental));
        }
    }

    for (name, dim) in all.deriveds() {
        if !claim(&mut claimed, &mut report, name, DimensionKind::Derived) {
            continue;
        }
        let params = params::derived(dim, all);
        if let Ok(p) = &params {
            tracing::debug!(
                dimension = %name,
                numerator = %p.numerator_types,
                denominator = %p.denominator_types,
                "derived parameters"
            );
        }
        emit_pair(
            &mut report,
            templates,
            out_dir,
            name,
            DimensionKind::Derived,
            params,
        );
        if report.wrote(name, ArtifactKind::DerivedUnit) {
            written.push((name.as_str(), DimensionKind::Derived));
        }
    }

    let umbrella = params::umbrella(written);
    let path = mapping::umbrella_path();
    report.push(emit_one(templates, out_dir, None, ArtifactKind::Umbrella, path, &umbrella));

    report
}

/// Reserves the output paths of `name`, recording a failure if another
/// dimension already holds them.
fn claim<'a>(
    claimed: &mut HashMap<PathBuf, &'a str>,
    report: &mut GenerationReport,
    name: &'a str,
    kind: DimensionKind,
) -> bool {
    let (impl_kind, _) = artifact_kinds(kind);
    let impl_path = mapping::impl_header_path(name, kind);
    if let Some(existing) = claimed.get(&impl_path) {
        let error = EmitError::PathCollision {
            dimension: name.to_string(),
            existing: (*existing).to_string(),
        };
        tracing::error!(dimension = %name, existing = %existing, path = %impl_path.display(), "output path collision");
        report.push(Outcome::failed(Some(name), impl_kind, impl_path, error));
        return false;
    }
    claimed.insert(impl_path, name);
    true
}

fn artifact_kinds(kind: DimensionKind) -> (ArtifactKind, ArtifactKind) {
    match kind {
        DimensionKind::Fundamental => (ArtifactKind::FundamentalDimension, ArtifactKind::FundamentalUnit),
        DimensionKind::Derived => (ArtifactKind::DerivedDimension, ArtifactKind::DerivedUnit),
    }
}

/// Emits the implementation and unit headers of one dimension.
///
/// A parameter-set failure is recorded once, against the implementation
/// header, and the unit header is not attempted.
fn emit_pair<T: Serialize>(
    report: &mut GenerationReport,
    templates: &TemplateSet,
    out_dir: &Path,
    name: &str,
    kind: DimensionKind,
    params: Result<T, EmitError>,
) {
    let (impl_kind, unit_kind) = artifact_kinds(kind);
    let impl_path = mapping::impl_header_path(name, kind);
    let params = match params {
        Ok(p) => p,
        Err(error) => {
            tracing::error!(dimension = %name, error = %error, "skipping dimension");
            report.push(Outcome::failed(Some(name), impl_kind, impl_path, error));
            return;
        }
    };
    report.push(emit_one(templates, out_dir, Some(name), impl_kind, impl_path, &params));
    let unit_path = mapping::unit_header_path(name, kind);
    report.push(emit_one(templates, out_dir, Some(name), unit_kind, unit_path, &params));
}

fn emit_one<T: Serialize>(
    templates: &TemplateSet,
    out_dir: &Path,
    dimension: Option<&str>,
    artifact: ArtifactKind,
    path: PathBuf,
    params: &T,
) -> Outcome {
    let result = templates
        .render(artifact, params)
        .and_then(|text| emit::write_file(&out_dir.join(&path), &text));
    match result {
        Ok(()) => {
            tracing::info!(artifact = artifact.as_str(), path = %path.display(), "wrote");
            Outcome::written(dimension, artifact, path)
        }
        Err(error) => {
            tracing::error!(artifact = artifact.as_str(), path = %path.display(), error = %error, "failed");
            Outcome::failed(dimension, artifact, path, error)
        }
    }
}
