use std::collections::BTreeMap;

use treebank_protocol::{AnnotationRow, Token, TokenId};

use crate::error::AnnotationError;
use crate::systems::validation::validate_row;

/// Where a sentence is in its tagging lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum SessionState {
    Empty,
    Tokenized,
    PartiallyTagged,
    FullyTagged,
    Serialized,
}

/// How the tagged row IDs compare to the tokens of the sentence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Coverage {
    pub token_count: usize,
    pub missing: Vec<TokenId>,
    pub unexpected: Vec<TokenId>,
}

impl Coverage {
    /// Computes coverage of `1..=token_count` by `ids`. Duplicate IDs count
    /// as unexpected.
    pub fn of(ids: impl IntoIterator<Item = TokenId>, token_count: usize) -> Self {
        let mut seen = vec![false; token_count];
        let mut unexpected = Vec::new();

        for id in ids {
            match id.index().filter(|&idx| idx < token_count) {
                Some(idx) if !seen[idx] => seen[idx] = true,
                _ => unexpected.push(id),
            }
        }

        let missing = seen
            .iter()
            .enumerate()
            .filter(|(_, tagged)| !**tagged)
            .map(|(idx, _)| TokenId::new(idx as u32 + 1))
            .collect();

        Self {
            token_count,
            missing,
            unexpected,
        }
    }

    /// Every token tagged exactly once, and there is at least one token.
    pub fn is_complete(&self) -> bool {
        self.token_count > 0 && self.missing.is_empty() && self.unexpected.is_empty()
    }
}

/// True iff the IDs of `rows` are exactly `1..=tokens.len()`.
pub fn can_serialize(rows: &[AnnotationRow], tokens: &[Token]) -> bool {
    Coverage::of(rows.iter().map(|row| row.id), tokens.len()).is_complete()
}

/// One sentence under annotation: its text, its tokens and the rows tagged
/// so far, kept in ID order.
#[derive(Debug, Clone)]
pub struct SentenceDocument {
    text: String,
    tokens: Vec<Token>,
    rows: BTreeMap<TokenId, AnnotationRow>,
    serialized: bool,
}

impl SentenceDocument {
    pub fn new(text: impl Into<String>, tokens: Vec<Token>) -> Self {
        Self {
            text: text.into(),
            tokens,
            rows: BTreeMap::new(),
            serialized: false,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Rows in ascending ID order.
    pub fn rows(&self) -> impl Iterator<Item = &AnnotationRow> {
        self.rows.values()
    }

    pub fn row(&self, id: TokenId) -> Option<&AnnotationRow> {
        self.rows.get(&id)
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_serialized(&self) -> bool {
        self.serialized
    }

    /// Validates and stores `row`, replacing any row with the same ID.
    /// Returns the replaced row.
    pub fn add_row(&mut self, row: AnnotationRow) -> Result<Option<AnnotationRow>, AnnotationError> {
        if self.serialized {
            return Err(AnnotationError::AlreadySerialized);
        }
        let row = validate_row(&row, &self.tokens)?;
        Ok(self.rows.insert(row.id, row))
    }

    pub fn remove_row(&mut self, id: TokenId) -> Option<AnnotationRow> {
        self.rows.remove(&id)
    }

    pub fn coverage(&self) -> Coverage {
        Coverage::of(self.rows.keys().copied(), self.tokens.len())
    }

    pub fn can_serialize(&self) -> bool {
        !self.serialized && self.coverage().is_complete()
    }

    pub fn state(&self) -> SessionState {
        if self.serialized {
            SessionState::Serialized
        } else if self.rows.is_empty() {
            SessionState::Tokenized
        } else if self.coverage().is_complete() {
            SessionState::FullyTagged
        } else {
            SessionState::PartiallyTagged
        }
    }

    /// Clears the rows once the block is in the output buffer.
    pub(crate) fn mark_serialized(&mut self) {
        self.rows.clear();
        self.serialized = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use treebank_protocol::{Deprel, Upos};

    fn doc(forms: &[&str]) -> SentenceDocument {
        let tokens = forms
            .iter()
            .enumerate()
            .map(|(i, form)| Token::new(TokenId::new(i as u32 + 1), *form))
            .collect();
        SentenceDocument::new(forms.join(" "), tokens)
    }

    fn ids(ids: &[u32]) -> Vec<TokenId> {
        ids.iter().map(|&id| TokenId::new(id)).collect()
    }

    #[test]
    fn test_coverage() {
        let coverage = Coverage::of(ids(&[1, 3, 3, 5]), 3);
        assert_eq!(coverage.missing, ids(&[2]));
        assert_eq!(coverage.unexpected, ids(&[3, 5]));
        assert!(!coverage.is_complete());

        assert!(Coverage::of(ids(&[2, 1, 3]), 3).is_complete());
        assert!(!Coverage::of(ids(&[]), 0).is_complete());
        assert!(!Coverage::of(ids(&[0, 1]), 1).is_complete());
    }

    #[test]
    fn test_can_serialize_over_rows() {
        let tokens = vec![Token::new(TokenId::new(1), "a"), Token::new(TokenId::new(2), "b")];
        let mut rows = vec![AnnotationRow::new(1, "a", Upos::Noun, 0, Deprel::Root)];
        assert!(!can_serialize(&rows, &tokens));
        rows.push(AnnotationRow::new(2, "b", Upos::Noun, 1, Deprel::Nmod));
        assert!(can_serialize(&rows, &tokens));
        rows.push(AnnotationRow::new(2, "b", Upos::Noun, 1, Deprel::Nmod));
        assert!(!can_serialize(&rows, &tokens));
    }

    #[test]
    fn test_state_transitions_and_overwrite() {
        let mut doc = doc(&["I", "run", "."]);
        assert_eq!(doc.state(), SessionState::Tokenized);

        doc.add_row(AnnotationRow::new(1, "I", Upos::Pron, 2, Deprel::Nsubj)).unwrap();
        assert_eq!(doc.state(), SessionState::PartiallyTagged);

        // Same ID again replaces in place
        let replaced = doc
            .add_row(AnnotationRow::new(1, "I", Upos::Pron, 2, Deprel::NsubjPass))
            .unwrap();
        assert_eq!(replaced.map(|r| r.deprel), Some(Deprel::Nsubj));
        assert_eq!(doc.row_count(), 1);

        doc.add_row(AnnotationRow::new(3, ".", Upos::Punct, 2, Deprel::Punct)).unwrap();
        doc.add_row(AnnotationRow::new(2, "run", Upos::Verb, 0, Deprel::Root)).unwrap();
        assert_eq!(doc.state(), SessionState::FullyTagged);
        assert!(doc.can_serialize());

        let order: Vec<u32> = doc.rows().map(|r| r.id.get()).collect();
        assert_eq!(order, vec![1, 2, 3]);

        doc.mark_serialized();
        assert_eq!(doc.state(), SessionState::Serialized);
        assert_eq!(doc.row_count(), 0);
        assert_eq!(
            doc.add_row(AnnotationRow::new(1, "I", Upos::Pron, 2, Deprel::Nsubj)),
            Err(AnnotationError::AlreadySerialized)
        );
    }

    #[test]
    fn test_rejected_row_leaves_document_untouched() {
        let mut doc = doc(&["The", "cat", "sat"]);
        let err = doc.add_row(AnnotationRow::new(2, "dog", Upos::Noun, 3, Deprel::Nsubj));
        assert!(matches!(err, Err(AnnotationError::Mismatch { .. })));
        assert_eq!(doc.state(), SessionState::Tokenized);

        doc.add_row(AnnotationRow::new(2, "cat", Upos::Noun, 3, Deprel::Nsubj)).unwrap();
        assert_eq!(doc.remove_row(TokenId::new(2)).map(|r| r.form), Some("cat".to_string()));
        assert_eq!(doc.state(), SessionState::Tokenized);
    }
}
