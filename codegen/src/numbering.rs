//! Occurrence numbering for repeated type references.
//!
//! A template parameter list needs one distinct identifier per occurrence,
//! even when two occurrences denote the same dimension (`Length * Length`).
//! [`number`] walks a reference list once and pairs every element with its
//! 1-based occurrence count, giving `[Length, Time, Length]` →
//! `[Length1, Time1, Length2]`.
//!
//! The base name and the count are kept as separate fields of
//! [`NumberedIdent`], so nothing ever has to split a rendered identifier
//! back apart.

use std::collections::HashMap;
use std::fmt;

use indexmap::IndexSet;
use serde::Serialize;

/// One numbered occurrence of a base name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct NumberedIdent {
    /// The reference as written (`"Length"`).
    pub base: String,
    /// How many times `base` has appeared so far in this list, counting this one.
    pub occurrence: usize,
}

impl NumberedIdent {
    /// The rendered identifier, `base` followed by `occurrence`.
    #[must_use]
    pub fn ident(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for NumberedIdent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.base, self.occurrence)
    }
}

/// One numerator or denominator side of a derived dimension, numbered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NumberedList {
    /// The references as given.
    pub raw: Vec<String>,
    /// `raw[i]` paired with its running occurrence count.
    pub numbered: Vec<NumberedIdent>,
    /// Distinct references in first-appearance order.
    pub unique_bases: IndexSet<String>,
}

impl NumberedList {
    /// Number of references on this side.
    #[must_use]
    pub fn len(&self) -> usize {
        self.raw.len()
    }

    /// True when this side has no references.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Rendered identifiers, in order.
    #[must_use]
    pub fn idents(&self) -> Vec<String> {
        self.numbered.iter().map(NumberedIdent::ident).collect()
    }
}

/// Numbers a sequence of references.
///
/// Counts start fresh on every call, so numbering a numerator and a
/// denominator separately never shares state. An empty input gives an empty
/// list.
pub fn number<I, S>(refs: I) -> NumberedList
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut counts: HashMap<String, usize> = HashMap::new();
    let mut list = NumberedList::default();
    for item in refs {
        let base: String = item.into();
        let count = counts.entry(base.clone()).or_insert(0);
        *count += 1;
        list.numbered.push(NumberedIdent {
            base: base.clone(),
            occurrence: *count,
        });
        list.unique_bases.insert(base.clone());
        list.raw.push(base);
    }
    list
}
