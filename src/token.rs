#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // Literals
    Integer(u64),
    Decimal(f64),
    Ident(String),

    // Keywords
    Ed,
    Limit,

    // Punctuation
    Minus, // -

    // Structural
    EOF,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn range(&self) -> std::ops::Range<usize> {
        self.start..self.end
    }
}

#[derive(Debug, Clone)]
pub struct Spanned {
    pub token: Token,
    pub span: Span,
}

/// Convert a token back to its approximate source representation.
pub fn token_to_string(token: &Token) -> String {
    match token {
        Token::Integer(n) => format!("{n}"),
        Token::Decimal(n) => format!("{n}"),
        Token::Ident(s) => s.clone(),
        Token::Ed => "ed".into(),
        Token::Limit => "limit".into(),
        Token::Minus => "-".into(),
        Token::EOF => "end of descriptor".into(),
    }
}
