//! CoNLL-U emission.
//!
//! A sentence block is two header comments, one line per row with the ten
//! columns separated by [`DELIMITER`], and a terminating blank line:
//!
//! ```text
//! # ANNOTATOR = <identity or ANONYMOUS>
//! # Text = <sentence text>
//! 1	I	i	PRON	_	_	2	nsubj	_	_
//! ...
//!
//! ```

use std::fmt::{self, Write};

use treebank_parser::{parse_document, Comment, ParsedSentence, SentenceLine};
use treebank_protocol::AnnotationRow;

use crate::document::SentenceDocument;
use crate::error::AnnotationError;

/// Column separator, as the CoNLL-U format prescribes.
pub const DELIMITER: char = '\t';

/// Identity written when the operator has not registered a name.
pub const ANONYMOUS: &str = "ANONYMOUS";

/// Comment values live on one line.
fn single_line(value: &str) -> String {
    value.split(['\r', '\n']).map(str::trim).filter(|s| !s.is_empty()).collect::<Vec<_>>().join(" ")
}

pub fn write_row(out: &mut impl Write, row: &AnnotationRow) -> fmt::Result {
    write_columns(out, row, row.deprel.as_str())
}

/// Like [`write_row`], with the DEPREL column given as text.
fn write_columns(out: &mut impl Write, row: &AnnotationRow, deprel: &str) -> fmt::Result {
    let head = row.head.to_string();
    let id = row.id.to_string();
    let columns: [&str; 10] = [
        &id,
        &row.form,
        &row.lemma,
        row.upos.as_str(),
        &row.xpos,
        &row.feats,
        &head,
        deprel,
        &row.deps,
        &row.misc,
    ];

    for (i, column) in columns.iter().enumerate() {
        if i > 0 {
            out.write_char(DELIMITER)?;
        }
        out.write_str(column)?;
    }
    out.write_char('\n')
}

/// Writes a complete sentence block. `rows` must already be in ID order.
pub fn write_sentence<'a>(
    out: &mut impl Write,
    text: &str,
    annotator: Option<&str>,
    rows: impl IntoIterator<Item = &'a AnnotationRow>,
) -> fmt::Result {
    let annotator = annotator.map(single_line).filter(|name| !name.is_empty());
    writeln!(out, "# ANNOTATOR = {}", annotator.as_deref().unwrap_or(ANONYMOUS))?;
    writeln!(out, "# Text = {}", single_line(text))?;
    for row in rows {
        write_row(out, row)?;
    }
    out.write_char('\n')
}

/// Re-emits an imported sentence with its own comments. Ranges and empty
/// nodes are copied as they were read.
pub fn write_parsed(out: &mut impl Write, sentence: &ParsedSentence) -> fmt::Result {
    for comment in &sentence.comments {
        match comment {
            Comment::Meta { key, value } => writeln!(out, "# {} = {}", key, value)?,
            Comment::Note(note) => writeln!(out, "# {}", note)?,
        }
    }
    for line in &sentence.lines {
        match line {
            SentenceLine::Word { row, deprel } => write_columns(out, row, deprel)?,
            SentenceLine::Range(raw) | SentenceLine::EmptyNode(raw) => writeln!(out, "{}", raw)?,
        }
    }
    out.write_char('\n')
}

/// Renders a fully tagged document as a CoNLL-U block.
///
/// Refuses incomplete documents, and refuses any block that the reader
/// would not accept back.
pub fn serialize(document: &SentenceDocument, annotator: Option<&str>) -> Result<String, AnnotationError> {
    let coverage = document.coverage();
    if !coverage.is_complete() {
        return Err(AnnotationError::Incomplete {
            missing: coverage.missing,
            unexpected: coverage.unexpected,
        });
    }

    let mut block = String::new();
    // Writing into a String cannot fail
    let _ = write_sentence(&mut block, document.text(), annotator, document.rows());

    parse_document(&block).map_err(AnnotationError::Corrupted)?;
    Ok(block)
}

/// Renders an imported sentence in canonical form.
pub fn render_parsed(sentence: &ParsedSentence) -> String {
    let mut block = String::new();
    let _ = write_parsed(&mut block, sentence);
    block
}
