use nom::{
    branch::alt,
    bytes::complete::{take_while, take_while1},
    character::complete::satisfy,
    combinator::map,
    IResult,
};
use crate::token::Span;

/// Symbols split off in addition to ASCII punctuation: currency signs,
/// comparison operators, trademark and registered marks.
pub const SYMBOLS: &[char] = &[
    '£', '¢', '©', '¥', '≤', 'ϵ', '≥', '™', '≠', 'ꓯ', '÷', '®', '₦', '№', '℗',
];

/// The characters that always become one-character tokens.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IsolatingSet {
    extra: Vec<char>,
}

impl IsolatingSet {
    /// ASCII punctuation plus [`SYMBOLS`].
    pub fn new() -> Self {
        Self::default()
    }

    /// The default set extended with the characters of `extra`.
    /// Whitespace in `extra` is ignored: it always separates tokens.
    pub fn with_extra(extra: &str) -> Self {
        let mut set = Self::default();
        for c in extra.chars() {
            if !c.is_whitespace() && !set.contains(c) {
                set.extra.push(c);
            }
        }
        set
    }

    pub fn contains(&self, c: char) -> bool {
        c.is_ascii_punctuation() || SYMBOLS.contains(&c) || self.extra.contains(&c)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawToken<'a> {
    Word(&'a str),
    Isolated(char),
}

pub fn parse_with_spans<'a>(original_input: &'a str, isolating: &IsolatingSet) -> Vec<(Span, RawToken<'a>)> {
    let mut input = original_input;
    let mut result = Vec::new();

    loop {
        // 1. Skip whitespace (any Unicode whitespace separates runs)
        let (next_input, _) = match take_while::<_, &str, nom::error::Error<&str>>(char::is_whitespace)(input) {
            Ok(res) => res,
            Err(_) => break,
        };
        input = next_input;

        if input.is_empty() {
            break;
        }

        // 2. Either a single isolating character or a run of word characters
        let parse_res: IResult<&str, RawToken> = alt((
            map(satisfy(|c| isolating.contains(c)), RawToken::Isolated),
            map(
                take_while1(|c: char| !c.is_whitespace() && !isolating.contains(c)),
                RawToken::Word,
            ),
        ))(input);

        match parse_res {
            Ok((next_input, token)) => {
                // 'input' is a suffix of 'original_input', so the offset is the length difference
                let len = input.len() - next_input.len();
                let start = original_input.len() - input.len();

                result.push((Span::new(start, start + len), token));
                input = next_input;
            }
            Err(_) => {
                // Skip one char to recover; the two branches cover every non-space char
                if let Some(c) = input.chars().next() {
                    input = &input[c.len_utf8()..];
                } else {
                    break;
                }
            }
        }
    }

    result
}
