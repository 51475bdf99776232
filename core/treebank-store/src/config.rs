use treebank_parser::{IsolatingSet, Tokenizer};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Settings for one annotation session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Deserialize, Serialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SessionConfig {
    /// Written to the `# ANNOTATOR` comment; `None` means anonymous.
    pub annotator: Option<String>,
    /// Characters split off as tokens on top of the built-in set.
    pub extra_isolating: String,
    /// Refuse to serialize sentences whose dependency tree is malformed.
    pub strict_tree: bool,
}

impl SessionConfig {
    pub fn tokenizer(&self) -> Tokenizer {
        Tokenizer::new(IsolatingSet::with_extra(&self.extra_isolating))
    }
}
