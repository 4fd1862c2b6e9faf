//! Dimension → output artifact mapping tables.
//!
//! Deterministic mappings from dimension names and kinds to file paths,
//! include paths, header guards and C++ type tags.

use std::path::PathBuf;

use dimgen_spec::DimensionKind;

/// Root directory of every generated header, relative to the output root.
pub const OUTPUT_ROOT: &str = "Dimension";

/// Suffix appended to a dimension name to form its type tag (`LengthType`).
pub const TYPE_TAG_SUFFIX: &str = "Type";

/// The five kinds of generated artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtifactKind {
    /// Implementation header for a fundamental dimension.
    FundamentalDimension,
    /// Unit declarations for a fundamental dimension.
    FundamentalUnit,
    /// Implementation header for a derived dimension.
    DerivedDimension,
    /// Named-unit declarations for a derived dimension.
    DerivedUnit,
    /// Umbrella header including every unit header.
    Umbrella,
}

impl ArtifactKind {
    /// All kinds, in generation order.
    pub const ALL: [ArtifactKind; 5] = [
        ArtifactKind::FundamentalDimension,
        ArtifactKind::FundamentalUnit,
        ArtifactKind::DerivedDimension,
        ArtifactKind::DerivedUnit,
        ArtifactKind::Umbrella,
    ];

    /// File name of the template used for this kind.
    #[must_use]
    pub fn template_file(self) -> &'static str {
        match self {
            ArtifactKind::FundamentalDimension => "FundamentalDimension.hbs",
            ArtifactKind::FundamentalUnit => "FundamentalUnit.hbs",
            ArtifactKind::DerivedDimension => "DerivedDimension.hbs",
            ArtifactKind::DerivedUnit => "DerivedUnit.hbs",
            ArtifactKind::Umbrella => "all_dimensions.hbs",
        }
    }

    /// Short label for reports.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ArtifactKind::FundamentalDimension => "fundamental-dimension",
            ArtifactKind::FundamentalUnit => "fundamental-unit",
            ArtifactKind::DerivedDimension => "derived-dimension",
            ArtifactKind::DerivedUnit => "derived-unit",
            ArtifactKind::Umbrella => "umbrella",
        }
    }
}

/// Relative output path of the implementation header for a dimension.
///
/// E.g. `("AngularSpeed", Derived)` →
/// `Dimension/Dimension_Impl/DerivedDimensions/angular_speed_dimension_Impl.h`
#[must_use]
pub fn impl_header_path(name: &str, kind: DimensionKind) -> PathBuf {
    let category = match kind {
        DimensionKind::Fundamental => "FundamentalDimensions",
        DimensionKind::Derived => "DerivedDimensions",
    };
    PathBuf::from(OUTPUT_ROOT)
        .join("Dimension_Impl")
        .join(category)
        .join(format!("{}_dimension_Impl.h", to_snake_case(name)))
}

/// Relative output path of the unit header for a dimension.
///
/// E.g. `("Length", Fundamental)` → `Dimension/dimensions/fundamental/length_dimension.h`
#[must_use]
pub fn unit_header_path(name: &str, kind: DimensionKind) -> PathBuf {
    PathBuf::from(OUTPUT_ROOT)
        .join("dimensions")
        .join(kind.as_str())
        .join(format!("{}_dimension.h", to_snake_case(name)))
}

/// Relative output path of the umbrella header.
#[must_use]
pub fn umbrella_path() -> PathBuf {
    PathBuf::from(OUTPUT_ROOT).join("dimensions").join("dimensions.h")
}

/// Include path of a unit header as seen from an implementation header.
#[must_use]
pub fn include_from_impl(name: &str, kind: DimensionKind) -> String {
    format!(
        "../../dimensions/{}/{}_dimension.h",
        kind.as_str(),
        to_snake_case(name)
    )
}

/// Include path of an implementation header as seen from `Dimension/`.
#[must_use]
pub fn include_from_root(name: &str, kind: DimensionKind) -> String {
    let category = match kind {
        DimensionKind::Fundamental => "FundamentalDimensions",
        DimensionKind::Derived => "DerivedDimensions",
    };
    format!(
        "Dimension_Impl/{category}/{}_dimension_Impl.h",
        to_snake_case(name)
    )
}

/// Include path of a unit header as seen from the umbrella header.
#[must_use]
pub fn include_from_umbrella(name: &str, kind: DimensionKind) -> String {
    format!("{}/{}_dimension.h", kind.as_str(), to_snake_case(name))
}

/// Header guard macro, e.g. `STATIC_DIMENSION_ANGULAR_SPEED_IMPL_H`.
#[must_use]
pub fn header_guard(name: &str, suffix: &str) -> String {
    let mut guard = format!("STATIC_DIMENSION_{}", to_snake_case(name).to_uppercase());
    if !suffix.is_empty() {
        guard.push('_');
        guard.push_str(suffix);
    }
    guard.push_str("_H");
    guard
}

/// The C++ type tag for a dimension, e.g. `Length` → `LengthType`.
#[must_use]
pub fn type_tag(name: &str) -> String {
    format!("{name}{TYPE_TAG_SUFFIX}")
}

/// Converts a PascalCase or camelCase dimension name into snake_case.
///
/// Runs of capitals stay together (`SIUnit` → `si_unit`), and existing
/// underscores are kept.
pub fn to_snake_case(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    let mut result = String::with_capacity(s.len() + 4);
    for (i, &ch) in chars.iter().enumerate() {
        if ch.is_uppercase() {
            if i > 0 {
                let prev = chars[i - 1];
                let next_is_lower = chars.get(i + 1).is_some_and(|c| c.is_lowercase());
                let boundary = prev.is_lowercase()
                    || prev.is_ascii_digit()
                    || (prev.is_uppercase() && next_is_lower);
                if boundary && !result.ends_with('_') {
                    result.push('_');
                }
            }
            result.extend(ch.to_lowercase());
        } else {
            result.push(ch);
        }
    }
    result
}
