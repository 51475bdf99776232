use nom::{
    bytes::complete::{take_till, take_while1},
    character::complete::{char, space0},
    combinator::rest,
    multi::separated_list1,
    sequence::{separated_pair, tuple},
    IResult,
};
use thiserror::Error;
use treebank_protocol::{AnnotationRow, Deprel, TokenId, UnknownTag, Upos};

/// Number of tab-separated columns on a token line.
pub const COLUMN_COUNT: usize = 10;

const COLUMNS: [&str; COLUMN_COUNT] = [
    "ID", "FORM", "LEMMA", "UPOS", "XPOS", "FEATS", "HEAD", "DEPREL", "DEPS", "MISC",
];

const BOM: char = '\u{feff}';

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("no sentence found")]
    Empty,
    #[error("line {line}: expected 10 tab-separated columns, found {found}")]
    ColumnCount { line: usize, found: usize },
    #[error("line {line}: column {column} is empty")]
    EmptyColumn { line: usize, column: &'static str },
    #[error("line {line}: '{id}' is not a valid token ID")]
    InvalidId { line: usize, id: String },
    #[error("line {line}: expected token ID {expected}, found {found}")]
    UnexpectedId { line: usize, expected: u32, found: u32 },
    #[error("line {line}: '{head}' is not a valid HEAD")]
    InvalidHead { line: usize, head: String },
    #[error("line {line}: HEAD {head} points outside a sentence of {token_count} tokens")]
    HeadOutOfRange { line: usize, head: u32, token_count: usize },
    #[error("line {line}: {source}")]
    UnknownTag {
        line: usize,
        #[source]
        source: UnknownTag,
    },
    #[error("line {line}: comment after the first token line of a sentence")]
    MisplacedComment { line: usize },
    #[error("line {line}: comment block is not followed by any token line")]
    DanglingComments { line: usize },
}

/// A sentence-level comment line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Comment {
    /// `# key = value`
    Meta { key: String, value: String },
    /// Any other comment, without the leading `#`.
    Note(String),
}

/// One token line of a sentence block, in file order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SentenceLine {
    /// A word line. `deprel` is the DEPREL column as written; it may carry a
    /// subtype finer than `row.deprel`.
    Word { row: AnnotationRow, deprel: String },
    /// A multiword token range (`2-3`), kept verbatim.
    Range(String),
    /// An empty node (`5.1`), kept verbatim.
    EmptyNode(String),
}

impl SentenceLine {
    pub fn row(&self) -> Option<&AnnotationRow> {
        match self {
            SentenceLine::Word { row, .. } => Some(row),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedSentence {
    pub comments: Vec<Comment>,
    pub lines: Vec<SentenceLine>,
}

impl ParsedSentence {
    /// Looks up a `# key = value` comment; keys compare case-insensitively.
    pub fn meta(&self, key: &str) -> Option<&str> {
        self.comments.iter().find_map(|comment| match comment {
            Comment::Meta { key: k, value } if k.eq_ignore_ascii_case(key) => Some(value.as_str()),
            _ => None,
        })
    }

    pub fn text(&self) -> Option<&str> {
        self.meta("text")
    }

    pub fn annotator(&self) -> Option<&str> {
        self.meta("annotator")
    }

    /// The word rows `1..N`, skipping ranges and empty nodes.
    pub fn rows(&self) -> impl Iterator<Item = &AnnotationRow> {
        self.lines.iter().filter_map(SentenceLine::row)
    }

    pub fn word_count(&self) -> usize {
        self.rows().count()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedDocument {
    pub sentences: Vec<ParsedSentence>,
}

impl ParsedDocument {
    pub fn token_count(&self) -> usize {
        self.sentences.iter().map(ParsedSentence::word_count).sum()
    }
}

/// Sentence block under construction.
#[derive(Default)]
struct Block {
    first_line: usize,
    comments: Vec<Comment>,
    lines: Vec<(usize, SentenceLine)>,
    words: u32,
}

impl Block {
    fn is_empty(&self) -> bool {
        self.comments.is_empty() && self.lines.is_empty()
    }

    fn finish(self) -> Result<ParsedSentence, ParseError> {
        if self.words == 0 {
            return Err(ParseError::DanglingComments { line: self.first_line });
        }

        let token_count = self.words as usize;
        for (line, entry) in &self.lines {
            if let Some(row) = entry.row() {
                if row.head as usize > token_count {
                    return Err(ParseError::HeadOutOfRange {
                        line: *line,
                        head: row.head,
                        token_count,
                    });
                }
            }
        }

        Ok(ParsedSentence {
            comments: self.comments,
            lines: self.lines.into_iter().map(|(_, entry)| entry).collect(),
        })
    }
}

/// Reads CoNLL-U text: blank-line separated blocks of `#` comments followed
/// by ten-column token lines. Words are numbered `1..N`; multiword ranges
/// and empty nodes may sit between them.
pub fn parse_document(input: &str) -> Result<ParsedDocument, ParseError> {
    let input = input.strip_prefix(BOM).unwrap_or(input);
    let mut doc = ParsedDocument::default();
    let mut block = Block::default();

    for (idx, raw) in input.lines().enumerate() {
        let line = idx + 1;

        if raw.trim().is_empty() {
            if !block.is_empty() {
                doc.sentences.push(std::mem::take(&mut block).finish()?);
            }
            continue;
        }

        if block.is_empty() {
            block.first_line = line;
        }

        if raw.starts_with('#') {
            if !block.lines.is_empty() {
                return Err(ParseError::MisplacedComment { line });
            }
            block.comments.push(parse_comment(raw));
            continue;
        }

        let entry = parse_token_line(raw, line, block.words + 1)?;
        if entry.row().is_some() {
            block.words += 1;
        }
        block.lines.push((line, entry));
    }

    if !block.is_empty() {
        doc.sentences.push(block.finish()?);
    }

    if doc.sentences.is_empty() {
        return Err(ParseError::Empty);
    }

    Ok(doc)
}

fn meta_pair(input: &str) -> IResult<&str, (&str, &str)> {
    separated_pair(
        take_while1(|c: char| !c.is_whitespace() && c != '='),
        tuple((space0, char('='), space0)),
        rest,
    )(input)
}

fn parse_comment(raw: &str) -> Comment {
    let body = raw['#'.len_utf8()..].trim();
    match meta_pair(body) {
        Ok((_, (key, value))) => Comment::Meta {
            key: key.to_string(),
            value: value.trim_end().to_string(),
        },
        Err(_) => Comment::Note(body.to_string()),
    }
}

fn columns(input: &str) -> IResult<&str, Vec<&str>> {
    separated_list1(char('\t'), take_till(|c: char| c == '\t'))(input)
}

fn parse_id_part(part: &str, line: usize, id: &str) -> Result<u32, ParseError> {
    part.parse::<u32>()
        .map_err(|_| ParseError::InvalidId { line, id: id.to_string() })
}

/// Resolves a DEPREL label. A subtype outside the vocabulary (`obl:npmod`)
/// falls back to its universal relation.
fn parse_deprel(label: &str, line: usize) -> Result<Deprel, ParseError> {
    match label.parse::<Deprel>() {
        Ok(deprel) => Ok(deprel),
        Err(source) => label
            .split_once(':')
            .filter(|(_, subtype)| !subtype.is_empty())
            .and_then(|(universal, _)| universal.parse::<Deprel>().ok())
            .ok_or(ParseError::UnknownTag { line, source }),
    }
}

/// `expected` is the ID the next word line must carry.
fn parse_token_line(raw: &str, line: usize, expected: u32) -> Result<SentenceLine, ParseError> {
    let cols = match columns(raw) {
        Ok((_, cols)) => cols,
        Err(_) => return Err(ParseError::ColumnCount { line, found: 0 }),
    };

    if cols.len() != COLUMN_COUNT {
        return Err(ParseError::ColumnCount { line, found: cols.len() });
    }

    if let Some(pos) = cols.iter().position(|c| c.trim().is_empty()) {
        return Err(ParseError::EmptyColumn { line, column: COLUMNS[pos] });
    }

    let id = cols[0];

    // A range covers the words that follow it
    if let Some((start, end)) = id.split_once('-') {
        let start = parse_id_part(start, line, id)?;
        let end = parse_id_part(end, line, id)?;
        if start == 0 || end < start {
            return Err(ParseError::InvalidId { line, id: id.to_string() });
        }
        if start != expected {
            return Err(ParseError::UnexpectedId { line, expected, found: start });
        }
        return Ok(SentenceLine::Range(raw.to_string()));
    }

    // An empty node follows the word it is numbered after (0.1 before word 1)
    if let Some((word, node)) = id.split_once('.') {
        let word = parse_id_part(word, line, id)?;
        if parse_id_part(node, line, id)? == 0 {
            return Err(ParseError::InvalidId { line, id: id.to_string() });
        }
        if word + 1 != expected {
            return Err(ParseError::UnexpectedId { line, expected: expected - 1, found: word });
        }
        return Ok(SentenceLine::EmptyNode(raw.to_string()));
    }

    let id = match id.parse::<u32>() {
        Ok(0) | Err(_) => return Err(ParseError::InvalidId { line, id: id.to_string() }),
        Ok(n) => n,
    };
    if id != expected {
        return Err(ParseError::UnexpectedId { line, expected, found: id });
    }

    let upos: Upos = cols[3].parse().map_err(|source| ParseError::UnknownTag { line, source })?;
    let head = cols[6]
        .parse::<u32>()
        .map_err(|_| ParseError::InvalidHead { line, head: cols[6].to_string() })?;
    let deprel = parse_deprel(cols[7], line)?;

    let row = AnnotationRow {
        id: TokenId::new(id),
        form: cols[1].to_string(),
        lemma: cols[2].to_string(),
        upos,
        xpos: cols[4].to_string(),
        feats: cols[5].to_string(),
        head,
        deprel,
        deps: cols[8].to_string(),
        misc: cols[9].to_string(),
    };
    Ok(SentenceLine::Word {
        row,
        deprel: cols[7].to_string(),
    })
}
