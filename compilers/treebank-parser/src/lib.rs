pub mod conllu;
pub mod parser;
pub mod token;

use treebank_protocol::TokenId;
use crate::parser::{parse_with_spans, RawToken};
use crate::token::{Token, TokenKind};

pub use crate::conllu::{parse_document, Comment, ParseError, ParsedDocument, ParsedSentence, SentenceLine};
pub use crate::parser::IsolatingSet;

/// Splits sentence text into words and isolated punctuation/symbol tokens.
#[derive(Debug, Clone, Default)]
pub struct Tokenizer {
    isolating: IsolatingSet,
}

impl Tokenizer {
    pub fn new(isolating: IsolatingSet) -> Self {
        Self { isolating }
    }

    /// Primary entry point: Text -> Tokens with spans. Never fails.
    pub fn tokenize<'a>(&self, input: &'a str) -> Vec<Token<'a>> {
        parse_with_spans(input, &self.isolating)
            .into_iter()
            .map(|(span, raw)| {
                let text = &input[span.start..span.end];
                let kind = match raw {
                    RawToken::Isolated(c) => TokenKind::Isolated(c),
                    RawToken::Word(_) => TokenKind::Word,
                };
                Token { span, text, kind }
            })
            .collect()
    }

    /// Owned tokens numbered from 1, ready for annotation.
    pub fn surface_tokens(&self, input: &str) -> Vec<treebank_protocol::Token> {
        self.tokenize(input)
            .iter()
            .enumerate()
            .map(|(i, token)| token.to_surface(TokenId::new(i as u32 + 1)))
            .collect()
    }
}

/// Tokenizes with the default isolating set and returns the surface forms.
pub fn tokenize(text: &str) -> Vec<&str> {
    Tokenizer::default()
        .tokenize(text)
        .into_iter()
        .map(|token| token.text)
        .collect()
}
