//! Label-sequence representation for a single tensor operand.

use std::collections::HashMap;
use std::fmt;

use crate::error::{EinsumError, EinsumResult};

/// The ordered index labels attached to one tensor in an expression.
///
/// A label is a single `char`. Labels may repeat within one `Subscript` only
/// to express a trace/diagonal over those axes (spec.md §3, §9 "self
/// contraction").
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Subscript {
    labels: Vec<char>,
}

impl Subscript {
    /// Creates an empty subscript (rank 0 / scalar).
    pub fn new() -> Self {
        Self { labels: Vec::new() }
    }

    /// Creates a subscript from a sequence of label characters.
    pub fn from_chars(chars: impl IntoIterator<Item = char>) -> Self {
        Self { labels: chars.into_iter().collect() }
    }

    /// Parses a subscript from a label string such as `"ijk"`.
    ///
    /// Each non-whitespace character becomes one label; whitespace is
    /// ignored so `"i j k"` and `"ijk"` are equivalent.
    pub fn parse(s: &str) -> EinsumResult<Self> {
        let mut labels = Vec::with_capacity(s.len());
        for c in s.chars() {
            if c.is_whitespace() {
                continue;
            }
            if !c.is_alphabetic() {
                return Err(EinsumError::label(format!(
                    "invalid label character '{c}': labels must be alphabetic"
                )));
            }
            labels.push(c);
        }
        Ok(Self { labels })
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn as_slice(&self) -> &[char] {
        &self.labels
    }

    pub fn iter(&self) -> impl Iterator<Item = char> + '_ {
        self.labels.iter().copied()
    }

    /// Returns the distinct labels in this subscript, each paired with the
    /// positions (axes) at which it occurs.
    pub fn occurrences(&self) -> HashMap<char, Vec<usize>> {
        let mut map: HashMap<char, Vec<usize>> = HashMap::new();
        for (axis, &c) in self.labels.iter().enumerate() {
            map.entry(c).or_default().push(axis);
        }
        map
    }

    pub fn contains(&self, c: char) -> bool {
        self.labels.contains(&c)
    }

    pub fn count(&self, c: char) -> usize {
        self.labels.iter().filter(|&&x| x == c).count()
    }

    pub fn position(&self, c: char) -> Option<usize> {
        self.labels.iter().position(|&x| x == c)
    }

    /// True if every label in this subscript occurs exactly once
    /// (no internal trace/diagonal).
    pub fn is_simple(&self) -> bool {
        self.occurrences().values().all(|v| v.len() == 1)
    }
}

impl fmt::Display for Subscript {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for c in &self.labels {
            write!(f, "{c}")?;
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a Subscript {
    type Item = char;
    type IntoIter = std::iter::Copied<std::slice::Iter<'a, char>>;

    fn into_iter(self) -> Self::IntoIter {
        self.labels.iter().copied()
    }
}
