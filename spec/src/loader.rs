//! Specification loading: JSON documents → [`Dimension`] records.
//!
//! Documents are JSON arrays of dimension records. Records from every
//! document are concatenated in document order, then parsed one at a time.
//! A malformed record is reported in [`LoadReport::diagnostics`] and skipped;
//! only an unreadable or unparseable document fails the load.

use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::exponent::{ExponentError, RationalExponent};
use crate::model::{
    ConversionFactor, Conversions, DerivedDimension, Dimension, DimensionExponent,
    FundamentalDimension, Unit, UnitExponent,
};

/// Errors that prevent a document from being read at all. Fatal for a run.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The document could not be read from disk.
    #[error("failed to read specification {}", path.display())]
    Io {
        /// Path of the document.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The document is not valid JSON.
    #[error("specification {source_name} is not valid JSON")]
    Json {
        /// Path or label of the document.
        source_name: String,
        /// Underlying parse error.
        #[source]
        source: serde_json::Error,
    },
    /// The document parsed but its top level is not an array of records.
    #[error("specification {source_name} must be a JSON array of dimension records")]
    NotASequence {
        /// Path or label of the document.
        source_name: String,
    },
}

/// Why a single record was rejected. Recovered locally: the record is skipped.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RecordError {
    /// The record is not a JSON object.
    #[error("record is not an object")]
    NotAnObject,
    /// The `Dimension` name field is absent or not a string.
    #[error("missing `Dimension` name")]
    MissingName,
    /// `Fundamental` is present but not a boolean.
    #[error("`Fundamental` must be a boolean")]
    InvalidDiscriminator,
    /// A field required by the record's kind is absent or mistyped.
    #[error("invalid {kind} record: {message}")]
    Invalid {
        /// `"fundamental"` or `"derived"`.
        kind: &'static str,
        /// Deserializer message naming the offending field.
        message: String,
    },
    /// An exponent pair has a zero denominator.
    #[error("exponent of `{reference}` has a zero denominator")]
    ZeroDenominator {
        /// The unit or dimension the exponent applies to.
        reference: String,
    },
    /// An exponent component is too large to work with.
    #[error("exponent of `{reference}` is out of range")]
    ExponentOutOfRange {
        /// The unit or dimension the exponent applies to.
        reference: String,
    },
    /// `BaseUnit` does not name one of the dimension's `Units`.
    #[error("base unit `{base_unit}` is not among the dimension's units")]
    UnknownBaseUnit {
        /// The offending base unit name.
        base_unit: String,
    },
}

/// A raw record tagged with where it came from.
#[derive(Debug, Clone)]
pub struct RawRecord {
    /// Path or label of the originating document.
    pub source: String,
    /// Zero-based position within that document.
    pub index: usize,
    /// The record itself.
    pub value: Value,
}

/// A record that was skipped, with the reason.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordDiagnostic {
    /// Path or label of the originating document.
    pub source: String,
    /// Zero-based position within that document.
    pub index: usize,
    /// The record's `Dimension` name, when one could be read.
    pub name: Option<String>,
    /// Why it was rejected.
    pub error: RecordError,
}

/// Result of loading: parsed dimensions in record order plus skipped records.
#[derive(Debug, Default)]
pub struct LoadReport {
    /// Successfully parsed dimensions, in concatenated document order.
    pub dimensions: Vec<Dimension>,
    /// One entry per malformed record.
    pub diagnostics: Vec<RecordDiagnostic>,
}

/// Reads every document and parses the concatenated records.
///
/// # Errors
///
/// Returns [`LoadError`] if any document cannot be read or is not a JSON array.
pub fn load_files<P: AsRef<Path>>(paths: &[P]) -> Result<LoadReport, LoadError> {
    let mut records = Vec::new();
    for path in paths {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        records.extend(read_records(&path.display().to_string(), &text)?);
    }
    Ok(parse_records(records))
}

/// Splits one document's text into raw records.
///
/// # Errors
///
/// Returns [`LoadError::Json`] for invalid JSON and [`LoadError::NotASequence`]
/// if the top level is not an array.
pub fn read_records(source_name: &str, text: &str) -> Result<Vec<RawRecord>, LoadError> {
    let value: Value = serde_json::from_str(text).map_err(|source| LoadError::Json {
        source_name: source_name.to_string(),
        source,
    })?;
    let Value::Array(items) = value else {
        return Err(LoadError::NotASequence {
            source_name: source_name.to_string(),
        });
    };
    Ok(items
        .into_iter()
        .enumerate()
        .map(|(index, value)| RawRecord {
            source: source_name.to_string(),
            index,
            value,
        })
        .collect())
}

/// Parses each raw record, skipping and reporting malformed ones.
pub fn parse_records(records: Vec<RawRecord>) -> LoadReport {
    let mut report = LoadReport::default();
    for record in records {
        match parse_record(&record.value) {
            Ok(dim) => {
                tracing::debug!(name = dim.name(), kind = %dim.kind(), "parsed dimension record");
                report.dimensions.push(dim);
            }
            Err(error) => {
                let name = record
                    .value
                    .get("Dimension")
                    .and_then(Value::as_str)
                    .map(str::to_string);
                tracing::warn!(
                    source = %record.source,
                    index = record.index,
                    name = name.as_deref().unwrap_or("<unnamed>"),
                    %error,
                    "skipping malformed dimension record"
                );
                report.diagnostics.push(RecordDiagnostic {
                    source: record.source,
                    index: record.index,
                    name,
                    error,
                });
            }
        }
    }
    report
}

/// Parses a single record, dispatching on the `Fundamental` discriminator.
///
/// An absent (or `null`) discriminator means derived.
///
/// # Errors
///
/// Returns [`RecordError`] describing the first problem found.
pub fn parse_record(value: &Value) -> Result<Dimension, RecordError> {
    let obj = value.as_object().ok_or(RecordError::NotAnObject)?;
    if !obj.get("Dimension").is_some_and(Value::is_string) {
        return Err(RecordError::MissingName);
    }
    let fundamental = match obj.get("Fundamental") {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(_) => return Err(RecordError::InvalidDiscriminator),
    };
    if fundamental {
        let raw: RawFundamental =
            serde_json::from_value(value.clone()).map_err(|e| RecordError::Invalid {
                kind: "fundamental",
                message: e.to_string(),
            })?;
        raw.into_dimension().map(Dimension::Fundamental)
    } else {
        let raw: RawDerived =
            serde_json::from_value(value.clone()).map_err(|e| RecordError::Invalid {
                kind: "derived",
                message: e.to_string(),
            })?;
        raw.into_dimension().map(Dimension::Derived)
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RawFundamental {
    dimension: String,
    #[serde(default)]
    has_extras: bool,
    base_unit: String,
    #[serde(default)]
    units: IndexMap<String, RawUnit>,
}

impl RawFundamental {
    fn into_dimension(self) -> Result<FundamentalDimension, RecordError> {
        if !self.units.contains_key(&self.base_unit) {
            return Err(RecordError::UnknownBaseUnit {
                base_unit: self.base_unit,
            });
        }
        let units = into_units(self.units, &self.dimension);
        Ok(FundamentalDimension {
            name: self.dimension,
            has_extras: self.has_extras,
            base_unit: self.base_unit,
            units,
        })
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RawDerived {
    dimension: String,
    #[serde(default)]
    has_extras: bool,
    #[serde(default)]
    definition: Vec<RawDimensionExponent>,
    #[serde(default)]
    units: IndexMap<String, Vec<RawUnitExponent>>,
    #[serde(default)]
    helper_units: IndexMap<String, RawUnit>,
}

impl RawDerived {
    fn into_dimension(self) -> Result<DerivedDimension, RecordError> {
        let definition = self
            .definition
            .into_iter()
            .map(|d| {
                let exponent = d.exponent.to_exponent(&d.dimension)?;
                Ok(DimensionExponent {
                    dimension: d.dimension,
                    exponent,
                })
            })
            .collect::<Result<Vec<_>, RecordError>>()?;

        let mut units = IndexMap::with_capacity(self.units.len());
        for (unit_name, components) in self.units {
            let components = components
                .into_iter()
                .map(|c| {
                    let exponent = c.exponent.to_exponent(&c.unit)?;
                    Ok(UnitExponent {
                        unit: c.unit,
                        exponent,
                    })
                })
                .collect::<Result<Vec<_>, RecordError>>()?;
            units.insert(unit_name, components);
        }

        let helper_units = into_units(self.helper_units, &self.dimension);
        Ok(DerivedDimension {
            name: self.dimension,
            has_extras: self.has_extras,
            definition,
            units,
            helper_units,
        })
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RawDimensionExponent {
    dimension: String,
    exponent: RawExponent,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RawUnitExponent {
    unit: String,
    exponent: RawExponent,
}

/// `Exponent` is either an integer or a `[numerator, denominator]` pair.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawExponent {
    Integer(i64),
    Pair([i64; 2]),
}

impl RawExponent {
    fn to_exponent(&self, reference: &str) -> Result<RationalExponent, RecordError> {
        let (n, d) = match *self {
            RawExponent::Integer(n) => (n, 1),
            RawExponent::Pair([n, d]) => (n, d),
        };
        RationalExponent::new(n, d).map_err(|e| match e {
            ExponentError::ZeroDenominator { .. } => RecordError::ZeroDenominator {
                reference: reference.to_string(),
            },
            ExponentError::OutOfRange { .. } => RecordError::ExponentOutOfRange {
                reference: reference.to_string(),
            },
        })
    }
}

#[derive(Deserialize)]
struct RawUnit {
    #[serde(rename = "Dimension", default)]
    dimension: String,
    #[serde(rename = "Name", default)]
    name: Option<String>,
    #[serde(rename = "Abbreviation")]
    abbreviation: String,
    #[serde(rename = "SI_Prefixes", default)]
    si_prefixes: bool,
    #[serde(rename = "Conversions", default)]
    conversions: RawConversions,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "PascalCase")]
struct RawConversions {
    #[serde(default)]
    from: IndexMap<String, ConversionFactor>,
    #[serde(default)]
    to: IndexMap<String, ConversionFactor>,
}

/// Converts raw unit records, filling an empty `Dimension` with the owner
/// and an absent `Name` with the mapping key.
fn into_units(raw: IndexMap<String, RawUnit>, owner: &str) -> IndexMap<String, Unit> {
    raw.into_iter()
        .map(|(key, u)| {
            let dimension = if u.dimension.is_empty() {
                owner.to_string()
            } else {
                u.dimension
            };
            let unit = Unit {
                dimension,
                name: u.name.unwrap_or_else(|| key.clone()),
                abbreviation: u.abbreviation,
                si_prefixes: u.si_prefixes,
                conversions: Conversions {
                    from: u.conversions.from,
                    to: u.conversions.to,
                },
            };
            (key, unit)
        })
        .collect()
}
