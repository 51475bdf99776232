use treebank_protocol::TokenId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// A run of characters outside the isolating set
    Word,
    /// A punctuation or symbol character split off on its own
    Isolated(char),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<'a> {
    pub span: Span,
    pub text: &'a str,
    pub kind: TokenKind,
}

impl<'a> Token<'a> {
    /// Detaches the token from the input, giving it its CoNLL-U ID.
    pub fn to_surface(&self, id: TokenId) -> treebank_protocol::Token {
        treebank_protocol::Token::new(id, self.text)
    }
}
