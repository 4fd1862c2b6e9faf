//! Physical dimension specifications encoded as typed Rust data.
//!
//! The `dimgen-spec` crate reads declarative descriptions of fundamental
//! dimensions (`Length`, `Mass`, `Time`) and derived dimensions
//! (`Speed = Length / Time`) from JSON documents, and aggregates them into a
//! name-keyed [`AllDimensions`] that resolves cross-references.
//!
//! # Entry Point
//!
//! ```
//! let text = r#"[
//!     { "Dimension": "Length", "Fundamental": true, "BaseUnit": "meters",
//!       "Units": { "meters": { "Name": "Meters", "Abbreviation": "m" } } },
//!     { "Dimension": "Time", "Fundamental": true, "BaseUnit": "seconds",
//!       "Units": { "seconds": { "Name": "Seconds", "Abbreviation": "s" } } },
//!     { "Dimension": "Speed",
//!       "Definition": [ { "Dimension": "Length", "Exponent": 1 },
//!                       { "Dimension": "Time", "Exponent": -1 } ] }
//! ]"#;
//! let records = dimgen_spec::loader::read_records("inline", text).unwrap();
//! let loaded = dimgen_spec::loader::parse_records(records);
//! let all = dimgen_spec::aggregate(loaded.dimensions);
//! assert_eq!(all.fundamentals().len(), 2);
//! assert!(all.resolve("Speed").is_ok());
//! ```

#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    missing_docs,
    clippy::missing_errors_doc
)]

pub mod aggregate;
pub mod exponent;
pub mod loader;
pub mod model;

pub use aggregate::{aggregate, AllDimensions, Overwrite, ResolveError};
pub use exponent::{ExponentError, RationalExponent, MAX_COMPONENT};
pub use loader::{LoadError, LoadReport, RecordDiagnostic, RecordError};
pub use model::{
    ConversionFactor, Conversions, DerivedDimension, Dimension, DimensionExponent, DimensionKind,
    DimensionRef, FundamentalDimension, Unit, UnitExponent,
};
