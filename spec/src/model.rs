//! Core dimension model types.
//!
//! These types represent a unit-system specification as typed Rust data: units,
//! unit and dimension exponents, and the closed [`Dimension`] variant over
//! fundamental and derived dimensions. All instances are owned and built once
//! by the [`loader`](crate::loader); nothing mutates them afterwards.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::exponent::RationalExponent;

/// Fundamental/derived classification of a dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DimensionKind {
    /// A base quantity not defined in terms of others (`Length`, `Time`).
    Fundamental,
    /// A rational-exponent product of other dimensions (`Speed`).
    Derived,
}

impl DimensionKind {
    /// Returns the lowercase name used in output categories and diagnostics.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            DimensionKind::Fundamental => "fundamental",
            DimensionKind::Derived => "derived",
        }
    }
}

impl fmt::Display for DimensionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single conversion scale factor, carried through generation unmodified.
///
/// Factors may be written as JSON numbers (`0.3048`) or as expression text
/// (`"(1250.0 / 381.0)"`); either way the written spelling is preserved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConversionFactor {
    /// A numeric literal, kept in its source representation.
    Number(serde_json::Number),
    /// A textual expression emitted verbatim.
    Expression(String),
}

impl fmt::Display for ConversionFactor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConversionFactor::Number(n) => write!(f, "{n}"),
            ConversionFactor::Expression(s) => f.write_str(s),
        }
    }
}

/// Conversion tables between a unit and its sibling units.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Conversions {
    /// Factors converting *from* the named sibling unit into this unit.
    pub from: IndexMap<String, ConversionFactor>,
    /// Factors converting from this unit *to* the named sibling unit.
    pub to: IndexMap<String, ConversionFactor>,
}

/// A named unit of measurement belonging to exactly one dimension.
#[derive(Debug, Clone, PartialEq)]
pub struct Unit {
    /// Name of the owning dimension.
    pub dimension: String,
    /// Human-readable unit name (e.g. `"Feet"`).
    pub name: String,
    /// Abbreviation (e.g. `"ft"`).
    pub abbreviation: String,
    /// Whether SI-prefixed variants (`kilo`, `milli`, ...) are generated.
    pub si_prefixes: bool,
    /// Conversion tables to and from sibling units.
    pub conversions: Conversions,
}

/// A unit raised to a rational power, referenced by unit name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitExponent {
    /// Name (mapping key) of the referenced unit.
    pub unit: String,
    /// The power.
    pub exponent: RationalExponent,
}

/// A dimension raised to a rational power, referenced by dimension name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DimensionExponent {
    /// Name of the referenced dimension.
    pub dimension: String,
    /// The power.
    pub exponent: RationalExponent,
}

/// A fundamental dimension: a base unit plus its unit table.
#[derive(Debug, Clone, PartialEq)]
pub struct FundamentalDimension {
    /// Dimension name (e.g. `"Length"`).
    pub name: String,
    /// Whether hand-written extras accompany the generated header.
    pub has_extras: bool,
    /// Key of the primary unit in [`units`](Self::units).
    pub base_unit: String,
    /// Units keyed by identifier, in document order.
    pub units: IndexMap<String, Unit>,
}

/// A derived dimension defined as a product of other dimensions.
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedDimension {
    /// Dimension name (e.g. `"Speed"`).
    pub name: String,
    /// Whether hand-written extras accompany the generated header.
    pub has_extras: bool,
    /// Ordered algebraic definition, e.g. `[Length^1, Time^-1]`.
    pub definition: Vec<DimensionExponent>,
    /// Named output units, each an ordered product of unit exponents.
    pub units: IndexMap<String, Vec<UnitExponent>>,
    /// Units needed only to spell the named output units.
    pub helper_units: IndexMap<String, Unit>,
}

/// A parsed dimension record.
#[derive(Debug, Clone, PartialEq)]
pub enum Dimension {
    /// See [`FundamentalDimension`].
    Fundamental(FundamentalDimension),
    /// See [`DerivedDimension`].
    Derived(DerivedDimension),
}

impl Dimension {
    /// The dimension's name.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Dimension::Fundamental(d) => &d.name,
            Dimension::Derived(d) => &d.name,
        }
    }

    /// Whether hand-written extras accompany this dimension.
    #[must_use]
    pub fn has_extras(&self) -> bool {
        match self {
            Dimension::Fundamental(d) => d.has_extras,
            Dimension::Derived(d) => d.has_extras,
        }
    }

    /// Fundamental or derived.
    #[must_use]
    pub fn kind(&self) -> DimensionKind {
        match self {
            Dimension::Fundamental(_) => DimensionKind::Fundamental,
            Dimension::Derived(_) => DimensionKind::Derived,
        }
    }
}

/// A borrowed view of a dimension held by [`AllDimensions`](crate::AllDimensions).
#[derive(Debug, Clone, Copy)]
pub enum DimensionRef<'a> {
    /// A fundamental dimension.
    Fundamental(&'a FundamentalDimension),
    /// A derived dimension.
    Derived(&'a DerivedDimension),
}

impl<'a> DimensionRef<'a> {
    /// The referenced dimension's name.
    #[must_use]
    pub fn name(self) -> &'a str {
        match self {
            DimensionRef::Fundamental(d) => &d.name,
            DimensionRef::Derived(d) => &d.name,
        }
    }

    /// Fundamental or derived.
    #[must_use]
    pub fn kind(self) -> DimensionKind {
        match self {
            DimensionRef::Fundamental(_) => DimensionKind::Fundamental,
            DimensionRef::Derived(_) => DimensionKind::Derived,
        }
    }
}
