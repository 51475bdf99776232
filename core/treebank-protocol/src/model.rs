use alloc::string::{String, ToString};

use crate::ids::TokenId;
use crate::tagset::{Deprel, Upos};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Placeholder for an unspecified CoNLL-U column.
pub const UNDERSCORE: &str = "_";

/// A surface token of the sentence under annotation.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Deserialize, Serialize))]
pub struct Token {
    pub id: TokenId,
    pub form: String,
}

impl Token {
    pub fn new(id: TokenId, form: impl Into<String>) -> Self {
        Self {
            id,
            form: form.into(),
        }
    }
}

/// One tagged token: the ten CoNLL-U columns.
///
/// Columns left empty (for instance when a row arrives from a form that
/// only filled the mandatory fields) are filled with their defaults by the
/// store before the row is accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Deserialize, Serialize))]
pub struct AnnotationRow {
    pub id: TokenId,
    pub form: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub lemma: String,
    pub upos: Upos,
    #[cfg_attr(feature = "serde", serde(default))]
    pub xpos: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub feats: String,
    pub head: u32,
    pub deprel: Deprel,
    #[cfg_attr(feature = "serde", serde(default))]
    pub deps: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub misc: String,
}

impl AnnotationRow {
    /// Builds a row with the default LEMMA (lowercased FORM) and `_` in the
    /// free-text columns.
    pub fn new(id: u32, form: &str, upos: Upos, head: u32, deprel: Deprel) -> Self {
        Self {
            id: TokenId::new(id),
            form: form.to_string(),
            lemma: form.to_lowercase(),
            upos,
            xpos: UNDERSCORE.to_string(),
            feats: UNDERSCORE.to_string(),
            head,
            deprel,
            deps: UNDERSCORE.to_string(),
            misc: UNDERSCORE.to_string(),
        }
    }

    pub fn with_lemma(mut self, lemma: impl Into<String>) -> Self {
        self.lemma = lemma.into();
        self
    }

    pub fn with_xpos(mut self, xpos: impl Into<String>) -> Self {
        self.xpos = xpos.into();
        self
    }

    pub fn with_feats(mut self, feats: impl Into<String>) -> Self {
        self.feats = feats.into();
        self
    }

    pub fn with_deps(mut self, deps: impl Into<String>) -> Self {
        self.deps = deps.into();
        self
    }

    pub fn with_misc(mut self, misc: impl Into<String>) -> Self {
        self.misc = misc.into();
        self
    }

    pub fn is_root(&self) -> bool {
        self.deprel.is_root()
    }

    /// The free-text columns paired with their CoNLL-U column names.
    pub fn text_columns(&self) -> [(&'static str, &str); 6] {
        [
            ("FORM", self.form.as_str()),
            ("LEMMA", self.lemma.as_str()),
            ("XPOS", self.xpos.as_str()),
            ("FEATS", self.feats.as_str()),
            ("DEPS", self.deps.as_str()),
            ("MISC", self.misc.as_str()),
        ]
    }
}
