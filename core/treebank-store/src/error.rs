use thiserror::Error;
use treebank_fields::FieldError;
use treebank_parser::ParseError;
use treebank_protocol::TokenId;
use treebank_validator::TreeIssue;

/// Which half of `HEAD == 0 <=> DEPREL == root` was broken.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RootHeadViolation {
    #[error("token {id} is tagged root, so its HEAD must be 0 (got {head})")]
    RootWithHead { id: TokenId, head: u32 },
    #[error("only the root may have HEAD 0, but token {id} is tagged {deprel}")]
    NonRootWithZeroHead { id: TokenId, deprel: &'static str },
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AnnotationError {
    #[error("there is nothing to annotate: the sentence is empty")]
    EmptyInput,
    #[error("there is nothing to tag: enter a sentence first")]
    NoSentence,
    #[error("this sentence has already been converted; enter a new sentence")]
    AlreadySerialized,
    #[error("ID {id} is outside the sentence (1..={token_count})")]
    IdOutOfRange { id: TokenId, token_count: usize },
    #[error("ID {id} and FORM do not match: token {id} is '{expected}', not '{found}'")]
    Mismatch { id: TokenId, expected: String, found: String },
    #[error(transparent)]
    RootHead(#[from] RootHeadViolation),
    #[error("HEAD {head} of token {id} is outside the sentence (0..={token_count})")]
    HeadOutOfRange { id: TokenId, head: u32, token_count: usize },
    #[error("token {id}: {source}")]
    InvalidField {
        id: TokenId,
        #[source]
        source: FieldError,
    },
    #[error("some tokens are not tagged yet (missing: {}; unexpected: {})", join(.missing), join(.unexpected))]
    Incomplete { missing: Vec<TokenId>, unexpected: Vec<TokenId> },
    #[error("the dependency tree is malformed: {}", describe(.0))]
    MalformedTree(Vec<TreeIssue>),
    #[error("refusing to store a block that does not read back: {0}")]
    Corrupted(ParseError),
}

fn join(ids: &[TokenId]) -> String {
    if ids.is_empty() {
        return "none".to_string();
    }
    ids.iter().map(|id| id.to_string()).collect::<Vec<_>>().join(", ")
}

fn describe(issues: &[TreeIssue]) -> String {
    issues.iter().map(|issue| issue.to_string()).collect::<Vec<_>>().join("; ")
}
