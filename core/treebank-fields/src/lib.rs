#![no_std]

#[macro_use]
extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

use alloc::string::{String, ToString};
use alloc::vec::Vec;

use treebank_protocol::{Deprel, UNDERSCORE};

use core::fmt;

/// Characters that separate the parts of a composite column.
const DELIMITERS: [char; 3] = ['|', ':', '='];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldError {
    /// Tabs and line breaks would split the CoNLL-U line.
    ForbiddenCharacter { column: &'static str, ch: char },
    MalformedFeature(String),
    MalformedDependency(String),
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldError::ForbiddenCharacter { column, ch } => {
                write!(f, "{} may not contain {:?}", column, ch)
            }
            FieldError::MalformedFeature(item) => {
                write!(f, "feature '{}' is not of the form Attribute=Value", item)
            }
            FieldError::MalformedDependency(item) => {
                write!(f, "dependency '{}' is not of the form HEAD:DEPREL", item)
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for FieldError {}

/// One `HEAD:DEPREL` pair of the DEPS column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnhancedDep<'a> {
    pub head: u32,
    /// Set when the head is an empty node (`5.1` gives head 5, node 1).
    pub node: Option<u32>,
    pub deprel: &'a str,
}

/// Rejects values that cannot live inside a single tab-separated column.
pub fn check_column(column: &'static str, value: &str) -> Result<(), FieldError> {
    match value.chars().find(|c| matches!(c, '\t' | '\n' | '\r')) {
        Some(ch) => Err(FieldError::ForbiddenCharacter { column, ch }),
        None => Ok(()),
    }
}

/// Removes the whitespace operators tend to type around `|`, `:` and `=`
/// (`"Number=Sing | Person=1"` becomes `"Number=Sing|Person=1"`).
/// An empty value becomes `_`.
pub fn normalize_composite(value: &str) -> String {
    let value = value.trim();
    if value.is_empty() {
        return UNDERSCORE.to_string();
    }

    let mut out = String::with_capacity(value.len());
    let mut pending_space = String::new();

    for c in value.chars() {
        if c.is_whitespace() {
            pending_space.push(c);
            continue;
        }

        // Keep interior whitespace only when neither neighbour is a delimiter
        let after_delimiter = out.chars().last().map_or(true, |p| DELIMITERS.contains(&p));
        if !pending_space.is_empty() && !after_delimiter && !DELIMITERS.contains(&c) {
            out.push_str(&pending_space);
        }
        pending_space.clear();
        out.push(c);
    }

    out
}

/// Normalizes FEATS.
pub fn normalize_feats(value: &str) -> String {
    normalize_composite(value)
}

/// Normalizes MISC.
pub fn normalize_misc(value: &str) -> String {
    normalize_composite(value)
}

/// Normalizes DEPS. A value that only repeats the basic `HEAD:DEPREL`
/// relation carries no enhanced information and collapses to `_`.
pub fn normalize_deps(value: &str, head: u32, deprel: Deprel) -> String {
    let normalized = normalize_composite(value);
    if normalized == format!("{}:{}", head, deprel) {
        UNDERSCORE.to_string()
    } else {
        normalized
    }
}

/// Splits FEATS into `(attribute, value)` pairs. `_` yields no pairs.
pub fn parse_feats(value: &str) -> Result<Vec<(&str, &str)>, FieldError> {
    if value == UNDERSCORE {
        return Ok(Vec::new());
    }

    value
        .split('|')
        .map(|item| match item.split_once('=') {
            Some((attr, val)) if !attr.is_empty() && !val.is_empty() => Ok((attr, val)),
            _ => Err(FieldError::MalformedFeature(item.to_string())),
        })
        .collect()
}

/// Splits DEPS into its `HEAD:DEPREL` pairs. `_` yields no pairs.
///
/// The deprel part is kept as text: enhanced labels may carry extra
/// subtypes (`obl:in`) outside the basic vocabulary.
pub fn parse_deps(value: &str) -> Result<Vec<EnhancedDep<'_>>, FieldError> {
    if value == UNDERSCORE {
        return Ok(Vec::new());
    }

    value
        .split('|')
        .map(|item| {
            let malformed = || FieldError::MalformedDependency(item.to_string());
            let (head, deprel) = item.split_once(':').ok_or_else(malformed)?;
            let (head, node) = match head.split_once('.') {
                Some((word, node)) => (word, Some(node.parse::<u32>().map_err(|_| malformed())?)),
                None => (head, None),
            };
            let head = head.parse::<u32>().map_err(|_| malformed())?;
            if deprel.is_empty() {
                return Err(malformed());
            }
            Ok(EnhancedDep { head, node, deprel })
        })
        .collect()
}
