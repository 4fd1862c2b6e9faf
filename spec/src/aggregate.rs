//! Cross-reference aggregation.
//!
//! [`AllDimensions`] partitions parsed dimensions into name-keyed fundamental
//! and derived mappings and resolves references by name. It is built once per
//! run and is read-only afterwards.

use std::collections::HashMap;

use indexmap::IndexMap;
use thiserror::Error;

use crate::exponent::RationalExponent;
use crate::model::{
    DerivedDimension, Dimension, DimensionExponent, DimensionKind, DimensionRef,
    FundamentalDimension, Unit,
};

/// Fundamental dimension name → summed exponent, in first-appearance order.
type Composition = IndexMap<String, RationalExponent>;

/// Failure to resolve a dimension reference.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    /// No fundamental or derived dimension has this name.
    #[error("dimension `{name}` is not defined")]
    NotFound {
        /// The unresolved name.
        name: String,
    },
    /// Expanding the named dimension multiplies or sums exponents past the
    /// representable range.
    #[error("exponents overflow while expanding `{name}`")]
    Overflow {
        /// The derived dimension whose expansion overflowed.
        name: String,
    },
    /// A derived definition refers back to itself, directly or transitively.
    #[error("cyclic dimension definition: {}", path.join(" -> "))]
    Cycle {
        /// The reference chain, starting and ending at the same dimension.
        path: Vec<String>,
    },
}

/// A later record replaced an earlier one with the same name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Overwrite {
    /// The duplicated dimension name.
    pub name: String,
    /// Kind of the record that was discarded.
    pub previous: DimensionKind,
    /// Kind of the record that survives.
    pub current: DimensionKind,
}

/// All dimensions of one generation run, keyed by name.
#[derive(Debug, Default)]
pub struct AllDimensions {
    fundamentals: IndexMap<String, FundamentalDimension>,
    deriveds: IndexMap<String, DerivedDimension>,
    overwrites: Vec<Overwrite>,
}

/// Builds the aggregate from parsed dimensions in record order.
///
/// A name seen again replaces the earlier entry (last wins) and is recorded
/// in [`AllDimensions::overwrites`]. When the later record is of the other
/// kind the earlier entry is removed, so a name lives in exactly one mapping.
pub fn aggregate<I>(dimensions: I) -> AllDimensions
where
    I: IntoIterator<Item = Dimension>,
{
    let mut all = AllDimensions::default();
    for dim in dimensions {
        let name = dim.name().to_string();
        let current = dim.kind();
        let previous = match dim {
            Dimension::Fundamental(d) => {
                let replaced = all.fundamentals.insert(name.clone(), d).map(|_| current);
                replaced.or_else(|| {
                    all.deriveds
                        .shift_remove(&name)
                        .map(|_| DimensionKind::Derived)
                })
            }
            Dimension::Derived(d) => {
                let replaced = all.deriveds.insert(name.clone(), d).map(|_| current);
                replaced.or_else(|| {
                    all.fundamentals
                        .shift_remove(&name)
                        .map(|_| DimensionKind::Fundamental)
                })
            }
        };
        if let Some(previous) = previous {
            tracing::warn!(
                name = %name,
                previous = %previous,
                current = %current,
                "duplicate dimension name; the later record replaces the earlier one"
            );
            all.overwrites.push(Overwrite {
                name,
                previous,
                current,
            });
        }
    }
    all
}

impl AllDimensions {
    /// Fundamental dimensions keyed by name, in first-insertion order.
    #[must_use]
    pub fn fundamentals(&self) -> &IndexMap<String, FundamentalDimension> {
        &self.fundamentals
    }

    /// Derived dimensions keyed by name, in first-insertion order.
    #[must_use]
    pub fn deriveds(&self) -> &IndexMap<String, DerivedDimension> {
        &self.deriveds
    }

    /// Every duplicate-name replacement made while aggregating.
    #[must_use]
    pub fn overwrites(&self) -> &[Overwrite] {
        &self.overwrites
    }

    /// Total number of dimensions held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fundamentals.len() + self.deriveds.len()
    }

    /// True when no dimensions are held.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Looks up a dimension by name in either mapping.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::NotFound`] if neither mapping holds `name`.
    pub fn resolve(&self, name: &str) -> Result<DimensionRef<'_>, ResolveError> {
        if let Some(d) = self.fundamentals.get(name) {
            return Ok(DimensionRef::Fundamental(d));
        }
        if let Some(d) = self.deriveds.get(name) {
            return Ok(DimensionRef::Derived(d));
        }
        Err(ResolveError::NotFound {
            name: name.to_string(),
        })
    }

    /// Finds a unit by key among all fundamental dimensions' unit tables.
    ///
    /// Returns the owning dimension with the unit. The first fundamental
    /// dimension (in mapping order) that defines the key wins.
    #[must_use]
    pub fn find_unit(&self, key: &str) -> Option<(&FundamentalDimension, &Unit)> {
        self.fundamentals
            .values()
            .find_map(|d| d.units.get(key).map(|u| (d, u)))
    }

    /// Expands `name` into fundamental dimensions with summed exponents.
    ///
    /// Nested derived definitions are multiplied through. Entries whose
    /// exponents cancel to zero are dropped; the rest keep first-appearance
    /// order. A fundamental dimension flattens to itself with exponent one.
    /// Each derived dimension is expanded once per call, however many paths
    /// reach it.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::NotFound`] for any undefined reference,
    /// [`ResolveError::Cycle`] if a definition reaches itself, and
    /// [`ResolveError::Overflow`] if the combined exponents leave the
    /// representable range.
    pub fn flatten(&self, name: &str) -> Result<Vec<DimensionExponent>, ResolveError> {
        let mut memo = HashMap::new();
        let mut stack = Vec::new();
        let composition = self.composition(name, &mut memo, &mut stack)?;
        Ok(composition
            .into_iter()
            .filter(|(_, e)| !e.is_zero())
            .map(|(dimension, exponent)| DimensionExponent {
                dimension,
                exponent,
            })
            .collect())
    }

    fn composition(
        &self,
        name: &str,
        memo: &mut HashMap<String, Composition>,
        stack: &mut Vec<String>,
    ) -> Result<Composition, ResolveError> {
        if let Some(done) = memo.get(name) {
            return Ok(done.clone());
        }
        let mut acc = Composition::new();
        match self.resolve(name)? {
            DimensionRef::Fundamental(d) => {
                acc.insert(d.name.clone(), RationalExponent::ONE);
            }
            DimensionRef::Derived(d) => {
                if stack.iter().any(|s| s == name) {
                    let mut path = stack.clone();
                    path.push(name.to_string());
                    return Err(ResolveError::Cycle { path });
                }
                stack.push(name.to_string());
                let overflow = || ResolveError::Overflow {
                    name: name.to_string(),
                };
                for term in &d.definition {
                    let inner = self.composition(&term.dimension, memo, stack)?;
                    for (base, exponent) in inner {
                        let scaled = exponent.checked_mul(term.exponent).ok_or_else(overflow)?;
                        let slot = acc.entry(base).or_insert(RationalExponent::ZERO);
                        *slot = slot.checked_add(scaled).ok_or_else(overflow)?;
                    }
                }
                stack.pop();
            }
        }
        memo.insert(name.to_string(), acc.clone());
        Ok(acc)
    }
}
