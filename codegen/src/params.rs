//! Rendering parameter sets.
//!
//! Each artifact is rendered from a serializable parameter set built here.
//! Fundamental dimensions need little more than their name and base unit.
//! Derived dimensions carry numbered numerator/denominator parameter lists,
//! the type-equality checks over them, one include per referenced dimension,
//! and a documentation block.

use indexmap::{IndexMap, IndexSet};
use serde::Serialize;

use dimgen_spec::{
    AllDimensions, DerivedDimension, DimensionExponent, DimensionKind, FundamentalDimension,
    RationalExponent, ResolveError, Unit,
};

use crate::error::EmitError;
use crate::mapping::{
    header_guard, include_from_impl, include_from_root, include_from_umbrella, type_tag,
};
use crate::numbering::{number, NumberedIdent, NumberedList};

/// Separator placed between type-equality checks.
pub const CHECK_SEPARATOR: &str = " &&\n        ";

/// Most template parameters a single definition term may expand to.
pub const MAX_REPEAT: u64 = 64;

/// A unit as presented to a template.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnitParams {
    /// Mapping key, used as the C++ type name.
    pub key: String,
    /// Dimension the unit measures.
    pub dimension: String,
    /// Human-readable name.
    pub name: String,
    /// Abbreviation.
    pub abbreviation: String,
    /// Whether SI-prefixed variants are declared.
    pub si_prefixes: bool,
    /// True for the dimension's base unit.
    pub is_base: bool,
}

/// One conversion specialisation, `Conversion<from_unit, to_unit>`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConversionParams {
    /// Source unit key.
    pub from_unit: String,
    /// Target unit key.
    pub to_unit: String,
    /// Scale factor, exactly as written in the specification.
    pub factor: String,
}

/// Parameters for both fundamental artifacts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FundamentalParams {
    /// Dimension name.
    pub name: String,
    /// Base unit key.
    pub base_unit: String,
    /// Whether hand-written extras accompany the header.
    pub has_extras: bool,
    /// Type tag, e.g. `LengthType`.
    pub tag: String,
    /// Guard of the implementation header.
    pub guard: String,
    /// Guard of the unit header.
    pub unit_guard: String,
    /// Include path of the implementation header from the unit header.
    pub impl_include: String,
    /// Units in document order.
    pub units: Vec<UnitParams>,
    /// Conversion specialisations in document order.
    pub conversions: Vec<ConversionParams>,
}

/// One numbered template parameter of a derived dimension.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypeParam {
    /// Rendered identifier, e.g. `Length2`.
    pub ident: String,
    /// Referenced dimension, e.g. `Length`.
    pub base: String,
    /// Occurrence of `base` on its side.
    pub occurrence: usize,
    /// Type tag of `base`, e.g. `LengthType`.
    pub tag: String,
    /// `std::is_same_v<typename Length2::Dim, LengthType>`.
    pub check: String,
}

/// A dimension exponent as presented to a template.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExponentParams {
    /// Referenced dimension.
    pub dimension: String,
    /// Its type tag.
    pub tag: String,
    /// Reduced numerator.
    pub numerator: i64,
    /// Reduced denominator.
    pub denominator: i64,
    /// Display form, `n` or `n/d`.
    pub exponent: String,
    /// True when the denominator is one.
    pub is_integer: bool,
}

/// One component of a named derived unit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComponentParams {
    /// Unit key.
    pub unit: String,
    /// Dimension owning that unit.
    pub dimension: String,
    /// Reduced numerator.
    pub numerator: i64,
    /// Reduced denominator.
    pub denominator: i64,
}

/// A named derived unit, e.g. `knots = nautical_miles / hours`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NamedUnitParams {
    /// Name of the unit.
    pub name: String,
    /// Ordered components.
    pub components: Vec<ComponentParams>,
}

/// Parameters for both derived artifacts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DerivedParams {
    /// Dimension name.
    pub name: String,
    /// Whether hand-written extras accompany the header.
    pub has_extras: bool,
    /// Type tag, e.g. `SpeedType`.
    pub tag: String,
    /// Guard of the implementation header.
    pub guard: String,
    /// Guard of the unit header.
    pub unit_guard: String,
    /// Include path of the implementation header from the unit header.
    pub impl_include: String,
    /// Numbered numerator parameters.
    pub numerator: Vec<TypeParam>,
    /// Numbered denominator parameters.
    pub denominator: Vec<TypeParam>,
    /// Numerator parameters followed by denominator parameters.
    pub parameters: Vec<TypeParam>,
    /// Numerator references before numbering.
    pub numerator_raw: Vec<String>,
    /// Denominator references before numbering.
    pub denominator_raw: Vec<String>,
    /// `Length1, Length2`
    pub numerator_types: String,
    /// `Time1`
    pub denominator_types: String,
    /// `typename Length1, typename Length2`
    pub numerator_template_types: String,
    /// `typename Time1`
    pub denominator_template_types: String,
    /// `Length1, Length2, Time1`
    pub types: String,
    /// `typename Length1, typename Length2, typename Time1`
    pub template_types: String,
    /// Number of numerator parameters.
    pub num_size: usize,
    /// Number of denominator parameters.
    pub den_size: usize,
    /// All type-equality checks joined with `&&`; `true` when there are none.
    pub dimension_checks: String,
    /// One `#include` directive per referenced dimension.
    pub includes: Vec<String>,
    /// One `/// @tparam` line per numbered parameter, joined by newlines.
    pub doc_tparams: String,
    /// The definition as written, exponents reduced.
    pub definition: Vec<ExponentParams>,
    /// The definition expanded to fundamental dimensions.
    pub composition: Vec<ExponentParams>,
    /// Named output units.
    pub units: Vec<NamedUnitParams>,
    /// Helper units.
    pub helper_units: Vec<UnitParams>,
    /// Conversions declared on helper units.
    pub helper_conversions: Vec<ConversionParams>,
}

/// One entry of the umbrella header.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UmbrellaEntry {
    /// Dimension name.
    pub name: String,
    /// `fundamental` or `derived`.
    pub kind: &'static str,
    /// Include path relative to the umbrella header.
    pub include: String,
}

/// Parameters for the umbrella header.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UmbrellaParams {
    /// Header guard.
    pub guard: String,
    /// Included unit headers, fundamentals first.
    pub entries: Vec<UmbrellaEntry>,
}

/// Builds the parameter set of a fundamental dimension.
#[must_use]
pub fn fundamental(dim: &FundamentalDimension) -> FundamentalParams {
    FundamentalParams {
        name: dim.name.clone(),
        base_unit: dim.base_unit.clone(),
        has_extras: dim.has_extras,
        tag: type_tag(&dim.name),
        guard: header_guard(&dim.name, "IMPL"),
        unit_guard: header_guard(&dim.name, ""),
        impl_include: include_from_root(&dim.name, DimensionKind::Fundamental),
        units: unit_params(&dim.units, Some(dim.base_unit.as_str())),
        conversions: conversion_params(&dim.units),
    }
}

/// Splits a definition into numerator and denominator reference lists.
///
/// A positive exponent puts the dimension on the numerator side and a
/// negative one on the denominator side. Integral exponents repeat the
/// reference `|n|` times; a fractional exponent contributes one reference.
///
/// # Errors
///
/// Returns [`EmitError::ExponentTooLarge`] if a term would repeat more than
/// [`MAX_REPEAT`] times.
pub fn split_sides(
    dimension: &str,
    definition: &[DimensionExponent],
) -> Result<(Vec<String>, Vec<String>), EmitError> {
    let mut numerator = Vec::new();
    let mut denominator = Vec::new();
    for term in definition {
        let side = if term.exponent.is_positive() {
            &mut numerator
        } else if term.exponent.is_negative() {
            &mut denominator
        } else {
            continue;
        };
        let exp = term.exponent.reduced();
        let repeat = if exp.denominator() == 1 {
            exp.numerator().unsigned_abs()
        } else {
            1
        };
        if repeat > MAX_REPEAT {
            return Err(EmitError::ExponentTooLarge {
                dimension: dimension.to_string(),
                reference: term.dimension.clone(),
                exponent: exp.to_string(),
                limit: MAX_REPEAT,
            });
        }
        for _ in 0..repeat {
            side.push(term.dimension.clone());
        }
    }
    Ok((numerator, denominator))
}

/// Builds the parameter set of a derived dimension.
///
/// Every definition reference is resolved first; an unresolved one fails
/// this dimension only.
///
/// # Errors
///
/// Returns [`EmitError::UnresolvedReference`], [`EmitError::CyclicDefinition`],
/// [`EmitError::ExponentOverflow`], [`EmitError::ExponentTooLarge`] or
/// [`EmitError::UnresolvedUnit`].
pub fn derived(dim: &DerivedDimension, all: &AllDimensions) -> Result<DerivedParams, EmitError> {
    let mut kinds: IndexMap<&str, DimensionKind> = IndexMap::new();
    for term in &dim.definition {
        let resolved = all
            .resolve(&term.dimension)
            .map_err(|e| resolve_failure(&dim.name, e))?;
        kinds.insert(term.dimension.as_str(), resolved.kind());
    }
    let composition = all
        .flatten(&dim.name)
        .map_err(|e| resolve_failure(&dim.name, e))?;

    let (num_refs, den_refs) = split_sides(&dim.name, &dim.definition)?;
    let num = number(num_refs);
    let den = number(den_refs);

    let numerator = type_params(&num);
    let denominator = type_params(&den);

    let checks: Vec<&str> = numerator
        .iter()
        .chain(&denominator)
        .map(|p| p.check.as_str())
        .collect();
    let dimension_checks = if checks.is_empty() {
        "true".to_string()
    } else {
        checks.join(CHECK_SEPARATOR)
    };

    let bases: IndexSet<&String> = num.unique_bases.iter().chain(&den.unique_bases).collect();
    let includes = bases
        .into_iter()
        .filter_map(|base| {
            kinds
                .get(base.as_str())
                .map(|kind| format!("#include \"{}\"", include_from_impl(base, *kind)))
        })
        .collect();

    let doc_tparams = doc_block(&num.numbered, "numerator")
        .into_iter()
        .chain(doc_block(&den.numbered, "denominator"))
        .collect::<Vec<_>>()
        .join("\n");

    let mut units = Vec::with_capacity(dim.units.len());
    for (unit_name, components) in &dim.units {
        let mut rendered = Vec::with_capacity(components.len());
        for component in components {
            let owner = dim
                .helper_units
                .get(&component.unit)
                .map(|u| u.dimension.clone())
                .or_else(|| all.find_unit(&component.unit).map(|(d, _)| d.name.clone()))
                .ok_or_else(|| EmitError::UnresolvedUnit {
                    dimension: dim.name.clone(),
                    named_unit: unit_name.clone(),
                    unit: component.unit.clone(),
                })?;
            let exp = component.exponent.reduced();
            rendered.push(ComponentParams {
                unit: component.unit.clone(),
                dimension: owner,
                numerator: exp.numerator(),
                denominator: exp.denominator(),
            });
        }
        units.push(NamedUnitParams {
            name: unit_name.clone(),
            components: rendered,
        });
    }

    let parameters: Vec<TypeParam> = numerator.iter().chain(&denominator).cloned().collect();
    let types = parameters
        .iter()
        .map(|p| p.ident.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    let template_types = parameters
        .iter()
        .map(|p| format!("typename {}", p.ident))
        .collect::<Vec<_>>()
        .join(", ");

    Ok(DerivedParams {
        name: dim.name.clone(),
        has_extras: dim.has_extras,
        tag: type_tag(&dim.name),
        guard: header_guard(&dim.name, "IMPL"),
        unit_guard: header_guard(&dim.name, ""),
        impl_include: include_from_root(&dim.name, DimensionKind::Derived),
        numerator_types: join_idents(&num, ""),
        denominator_types: join_idents(&den, ""),
        numerator_template_types: join_idents(&num, "typename "),
        denominator_template_types: join_idents(&den, "typename "),
        num_size: num.len(),
        den_size: den.len(),
        numerator_raw: num.raw,
        denominator_raw: den.raw,
        numerator,
        denominator,
        parameters,
        types,
        template_types,
        dimension_checks,
        includes,
        doc_tparams,
        definition: dim
            .definition
            .iter()
            .map(|t| exponent_params(&t.dimension, t.exponent))
            .collect(),
        composition: composition
            .iter()
            .map(|t| exponent_params(&t.dimension, t.exponent))
            .collect(),
        units,
        helper_units: unit_params(&dim.helper_units, None),
        helper_conversions: conversion_params(&dim.helper_units),
    })
}

/// Builds the umbrella parameter set from the dimensions whose unit headers exist.
#[must_use]
pub fn umbrella<'a, I>(generated: I) -> UmbrellaParams
where
    I: IntoIterator<Item = (&'a str, DimensionKind)>,
{
    UmbrellaParams {
        guard: "STATIC_DIMENSION_DIMENSIONS_H".to_string(),
        entries: generated
            .into_iter()
            .map(|(name, kind)| UmbrellaEntry {
                name: name.to_string(),
                kind: kind.as_str(),
                include: include_from_umbrella(name, kind),
            })
            .collect(),
    }
}

fn resolve_failure(dimension: &str, err: ResolveError) -> EmitError {
    match err {
        ResolveError::NotFound { name } => EmitError::UnresolvedReference {
            dimension: dimension.to_string(),
            reference: name,
        },
        ResolveError::Cycle { path } => EmitError::CyclicDefinition {
            dimension: dimension.to_string(),
            path,
        },
        ResolveError::Overflow { name } => EmitError::ExponentOverflow {
            dimension: dimension.to_string(),
            reference: name,
        },
    }
}

fn type_params(list: &NumberedList) -> Vec<TypeParam> {
    list.numbered
        .iter()
        .map(|n| {
            let ident = n.ident();
            let tag = type_tag(&n.base);
            TypeParam {
                check: format!("std::is_same_v<typename {ident}::Dim, {tag}>"),
                ident,
                base: n.base.clone(),
                occurrence: n.occurrence,
                tag,
            }
        })
        .collect()
}

fn join_idents(list: &NumberedList, prefix: &str) -> String {
    list.numbered
        .iter()
        .map(|n| format!("{prefix}{n}"))
        .collect::<Vec<_>>()
        .join(", ")
}

fn doc_block(numbered: &[NumberedIdent], side: &str) -> Vec<String> {
    numbered
        .iter()
        .map(|n| {
            format!(
                "/// @tparam {n} {} unit for occurrence {} of {} in the {side}",
                n.base, n.occurrence, n.base
            )
        })
        .collect()
}

fn exponent_params(dimension: &str, exponent: RationalExponent) -> ExponentParams {
    let r = exponent.reduced();
    ExponentParams {
        dimension: dimension.to_string(),
        tag: type_tag(dimension),
        numerator: r.numerator(),
        denominator: r.denominator(),
        exponent: r.to_string(),
        is_integer: r.denominator() == 1,
    }
}

fn unit_params(units: &IndexMap<String, Unit>, base: Option<&str>) -> Vec<UnitParams> {
    units
        .iter()
        .map(|(key, u)| UnitParams {
            key: key.clone(),
            dimension: u.dimension.clone(),
            name: u.name.clone(),
            abbreviation: u.abbreviation.clone(),
            si_prefixes: u.si_prefixes,
            is_base: base == Some(key.as_str()),
        })
        .collect()
}

/// `To` entries become `Conversion<unit, sibling>`, `From` entries
/// `Conversion<sibling, unit>`.
fn conversion_params(units: &IndexMap<String, Unit>) -> Vec<ConversionParams> {
    let mut out = Vec::new();
    for (key, unit) in units {
        for (sibling, factor) in &unit.conversions.to {
            out.push(ConversionParams {
                from_unit: key.clone(),
                to_unit: sibling.clone(),
                factor: factor.to_string(),
            });
        }
        for (sibling, factor) in &unit.conversions.from {
            out.push(ConversionParams {
                from_unit: sibling.clone(),
                to_unit: key.clone(),
                factor: factor.to_string(),
            });
        }
    }
    out
}
