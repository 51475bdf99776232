use treebank_fields::{check_column, normalize_deps, normalize_feats, normalize_misc};
use treebank_protocol::{AnnotationRow, Token, UNDERSCORE};

use crate::error::{AnnotationError, RootHeadViolation};

/// Checks one submitted row against the sentence's tokens and returns it
/// with its free-text columns normalized.
pub fn validate_row(row: &AnnotationRow, tokens: &[Token]) -> Result<AnnotationRow, AnnotationError> {
    // 1. ID -> FORM correspondence
    check_form(row, tokens)?;

    // 2. HEAD == 0 <=> DEPREL == root
    check_root_head(row)?;

    // 3. HEAD must name a token of this sentence
    if row.head as usize > tokens.len() {
        return Err(AnnotationError::HeadOutOfRange {
            id: row.id,
            head: row.head,
            token_count: tokens.len(),
        });
    }

    // 4. Nothing that would break the tab-separated line
    for (column, value) in row.text_columns() {
        check_column(column, value).map_err(|source| AnnotationError::InvalidField { id: row.id, source })?;
    }

    Ok(normalize_row(row))
}

fn check_form(row: &AnnotationRow, tokens: &[Token]) -> Result<(), AnnotationError> {
    let token = row
        .id
        .index()
        .and_then(|idx| tokens.get(idx))
        .ok_or(AnnotationError::IdOutOfRange {
            id: row.id,
            token_count: tokens.len(),
        })?;

    if token.form != row.form {
        return Err(AnnotationError::Mismatch {
            id: row.id,
            expected: token.form.clone(),
            found: row.form.clone(),
        });
    }
    Ok(())
}

fn check_root_head(row: &AnnotationRow) -> Result<(), RootHeadViolation> {
    match (row.is_root(), row.head) {
        (true, 0) => Ok(()),
        (true, head) => Err(RootHeadViolation::RootWithHead { id: row.id, head }),
        (false, 0) => Err(RootHeadViolation::NonRootWithZeroHead {
            id: row.id,
            deprel: row.deprel.as_str(),
        }),
        (false, _) => Ok(()),
    }
}

fn or_underscore(value: &str) -> String {
    let value = value.trim();
    if value.is_empty() {
        UNDERSCORE.to_string()
    } else {
        value.to_string()
    }
}

fn normalize_row(row: &AnnotationRow) -> AnnotationRow {
    let lemma = match row.lemma.trim() {
        "" => row.form.to_lowercase(),
        lemma => lemma.to_string(),
    };

    AnnotationRow {
        id: row.id,
        form: row.form.clone(),
        lemma,
        upos: row.upos,
        xpos: or_underscore(&row.xpos),
        feats: normalize_feats(&row.feats),
        head: row.head,
        deprel: row.deprel,
        deps: normalize_deps(&row.deps, row.head, row.deprel),
        misc: normalize_misc(&row.misc),
    }
}
