//! Template loading and rendering.
//!
//! Every artifact kind has one Handlebars template. The built-in set is
//! embedded at compile time with [`include_str!`]; a directory of
//! replacements may be loaded instead with [`TemplateSet::from_dir`], in
//! which case all five files must be present.
//!
//! The registry runs in strict mode with escaping disabled: a template that
//! names a missing parameter is a render error, and the C++ text is emitted
//! verbatim.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use handlebars::Handlebars;
use serde::Serialize;

use crate::error::{EmitError, TemplateError};
use crate::mapping::ArtifactKind;

const FUNDAMENTAL_DIMENSION: &str = include_str!("../templates/FundamentalDimension.hbs");
const FUNDAMENTAL_UNIT: &str = include_str!("../templates/FundamentalUnit.hbs");
const DERIVED_DIMENSION: &str = include_str!("../templates/DerivedDimension.hbs");
const DERIVED_UNIT: &str = include_str!("../templates/DerivedUnit.hbs");
const UMBRELLA: &str = include_str!("../templates/all_dimensions.hbs");

/// The five templates, compiled and ready to render.
pub struct TemplateSet {
    registry: Handlebars<'static>,
}

impl std::fmt::Debug for TemplateSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<&str> = self.registry.get_templates().keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("TemplateSet").field("templates", &names).finish()
    }
}

impl TemplateSet {
    /// The templates shipped with this crate.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError::Invalid`] if an embedded template does not
    /// parse.
    pub fn builtin() -> Result<Self, TemplateError> {
        Self::from_sources(ArtifactKind::ALL.iter().map(|&kind| (kind, builtin_source(kind).to_string())))
    }

    /// Loads every template from `dir`, by file name.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError::Missing`] or [`TemplateError::Unreadable`]
    /// for the first template that cannot be read, and
    /// [`TemplateError::Invalid`] for one that does not parse.
    pub fn from_dir(dir: &Path) -> Result<Self, TemplateError> {
        let mut sources = Vec::with_capacity(ArtifactKind::ALL.len());
        for kind in ArtifactKind::ALL {
            let path = dir.join(kind.template_file());
            let text = fs::read_to_string(&path).map_err(|source| {
                if source.kind() == ErrorKind::NotFound {
                    TemplateError::Missing { path: path.clone() }
                } else {
                    TemplateError::Unreadable {
                        path: path.clone(),
                        source,
                    }
                }
            })?;
            tracing::debug!(template = kind.template_file(), path = %path.display(), "loaded template");
            sources.push((kind, text));
        }
        Self::from_sources(sources)
    }

    fn from_sources<I>(sources: I) -> Result<Self, TemplateError>
    where
        I: IntoIterator<Item = (ArtifactKind, String)>,
    {
        let mut registry = Handlebars::new();
        registry.set_strict_mode(true);
        registry.register_escape_fn(handlebars::no_escape);
        for (kind, text) in sources {
            let name = kind.template_file();
            registry
                .register_template_string(name, text)
                .map_err(|source| TemplateError::Invalid {
                    name,
                    source: Box::new(source),
                })?;
        }
        Ok(Self { registry })
    }

    /// Renders the template for `kind` against `params`.
    ///
    /// # Errors
    ///
    /// Returns [`EmitError::Render`] if the template references a parameter
    /// that `params` does not provide, or rendering otherwise fails.
    pub fn render<T: Serialize>(&self, kind: ArtifactKind, params: &T) -> Result<String, EmitError> {
        let template = kind.template_file();
        self.registry
            .render(template, params)
            .map_err(|source| EmitError::Render {
                template,
                source: Box::new(source),
            })
    }
}

fn builtin_source(kind: ArtifactKind) -> &'static str {
    match kind {
        ArtifactKind::FundamentalDimension => FUNDAMENTAL_DIMENSION,
        ArtifactKind::FundamentalUnit => FUNDAMENTAL_UNIT,
        ArtifactKind::DerivedDimension => DERIVED_DIMENSION,
        ArtifactKind::DerivedUnit => DERIVED_UNIT,
        ArtifactKind::Umbrella => UMBRELLA,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn builtin() -> TemplateSet {
        TemplateSet::builtin().unwrap()
    }

    #[test]
    fn builtin_templates_parse() {
        let set = builtin();
        assert_eq!(set.registry.get_templates().len(), ArtifactKind::ALL.len());
    }

    #[test]
    fn missing_directory_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        match TemplateSet::from_dir(&dir.path().join("nope")) {
            Err(TemplateError::Missing { path }) => {
                assert!(path.ends_with("FundamentalDimension.hbs"));
            }
            other => unreachable!("{other:?}"),
        }
    }

    #[test]
    fn partial_directory_names_first_missing_template() {
        let dir = tempfile::tempdir().unwrap();
        for kind in &ArtifactKind::ALL[..2] {
            std::fs::write(dir.path().join(kind.template_file()), "x").unwrap();
        }
        match TemplateSet::from_dir(dir.path()) {
            Err(TemplateError::Missing { path }) => {
                assert!(path.ends_with("DerivedDimension.hbs"));
            }
            other => unreachable!("{other:?}"),
        }
    }

    #[test]
    fn invalid_template_is_reported_by_name() {
        let dir = tempfile::tempdir().unwrap();
        for kind in ArtifactKind::ALL {
            std::fs::write(dir.path().join(kind.template_file()), "ok").unwrap();
        }
        std::fs::write(dir.path().join("DerivedUnit.hbs"), "{{#each units}}").unwrap();
        match TemplateSet::from_dir(dir.path()) {
            Err(TemplateError::Invalid { name, .. }) => assert_eq!(name, "DerivedUnit.hbs"),
            other => unreachable!("{other:?}"),
        }
    }

    #[test]
    fn custom_directory_overrides_builtins() {
        let dir = tempfile::tempdir().unwrap();
        for kind in ArtifactKind::ALL {
            std::fs::write(dir.path().join(kind.template_file()), "// {{guard}}\n").unwrap();
        }
        let set = TemplateSet::from_dir(dir.path()).unwrap();
        let out = set
            .render(ArtifactKind::Umbrella, &json!({ "guard": "G_H" }))
            .unwrap();
        assert_eq!(out, "// G_H\n");
    }

    #[test]
    fn strict_mode_rejects_missing_parameters() {
        let set = builtin();
        match set.render(ArtifactKind::Umbrella, &json!({ "entries": [] })) {
            Err(EmitError::Render { template, .. }) => assert_eq!(template, "all_dimensions.hbs"),
            other => unreachable!("{other:?}"),
        }
    }

    #[test]
    fn output_is_not_html_escaped() {
        let set = builtin();
        let out = set
            .render(
                ArtifactKind::Umbrella,
                &json!({
                    "guard": "STATIC_DIMENSION_DIMENSIONS_H",
                    "entries": [ { "name": "Length", "kind": "fundamental", "include": "fundamental/length_dimension.h" } ]
                }),
            )
            .unwrap();
        assert!(out.contains("#include \"fundamental/length_dimension.h\""));
        assert!(out.starts_with("#ifndef STATIC_DIMENSION_DIMENSIONS_H"));
    }
}
