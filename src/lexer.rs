use crate::error::DescriptorError;
use crate::token::{Span, Spanned, Token};

/// Tokenizer for tuning descriptors such as `19ed2` or `7-limit`.
///
/// The caller trims the descriptor first; whitespace inside it is not part
/// of the grammar and is rejected like any other stray character.
pub struct Lexer {
    chars: Vec<char>,
    /// Precomputed byte offset for each char index.
    /// `byte_offsets[chars.len()]` = total byte length (sentinel for EOF).
    byte_offsets: Vec<usize>,
    pos: usize,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        let chars: Vec<char> = input.chars().collect();
        let mut byte_offsets = Vec::with_capacity(chars.len() + 1);
        let mut offset = 0;
        for ch in &chars {
            byte_offsets.push(offset);
            offset += ch.len_utf8();
        }
        byte_offsets.push(offset); // sentinel for EOF
        Lexer {
            chars,
            byte_offsets,
            pos: 0,
        }
    }

    pub fn tokenize(&mut self) -> Result<Vec<Spanned>, DescriptorError> {
        let mut tokens = Vec::new();
        loop {
            let spanned = self.next_token()?;
            let is_eof = spanned.token == Token::EOF;
            tokens.push(spanned);
            if is_eof {
                break;
            }
        }
        Ok(tokens)
    }

    fn byte_pos_of(&self, char_idx: usize) -> usize {
        self.byte_offsets[char_idx.min(self.chars.len())]
    }

    fn spanned(&self, token: Token, start: usize) -> Spanned {
        Spanned {
            token,
            span: Span {
                start: self.byte_pos_of(start),
                end: self.byte_pos_of(self.pos),
            },
        }
    }

    fn take_while(&mut self, pred: impl Fn(char) -> bool) -> String {
        let start = self.pos;
        while self.pos < self.chars.len() && pred(self.chars[self.pos]) {
            self.pos += 1;
        }
        self.chars[start..self.pos].iter().collect()
    }

    fn next_token(&mut self) -> Result<Spanned, DescriptorError> {
        let start = self.pos;
        let Some(&ch) = self.chars.get(self.pos) else {
            return Ok(self.spanned(Token::EOF, start));
        };

        match ch {
            '-' => {
                self.pos += 1;
                Ok(self.spanned(Token::Minus, start))
            }
            c if c.is_ascii_digit() || c == '.' => self.lex_number(start),
            c if c.is_ascii_alphabetic() => self.lex_word(start),
            _ => Err(DescriptorError::UnexpectedChar { ch, pos: self.byte_pos_of(start) }),
        }
    }

    /// Numbers are runs of digits and dots, as in `[\d.]+`. A run without a
    /// dot is an integer unless it overflows `u64`, in which case it is read as
    /// a real like any other run.
    fn lex_number(&mut self, start: usize) -> Result<Spanned, DescriptorError> {
        let text = self.take_while(|c| c.is_ascii_digit() || c == '.');
        let invalid = || DescriptorError::InvalidNumber {
            text: text.clone(),
            span: Span {
                start: self.byte_pos_of(start),
                end: self.byte_pos_of(self.pos),
            },
        };
        let token = match text.parse::<u64>() {
            Ok(n) if !text.contains('.') => Token::Integer(n),
            _ => Token::Decimal(text.parse().map_err(|_| invalid())?),
        };
        Ok(self.spanned(token, start))
    }

    fn lex_word(&mut self, start: usize) -> Result<Spanned, DescriptorError> {
        let text = self.take_while(|c| c.is_ascii_alphabetic()).to_ascii_lowercase();
        let token = match text.as_str() {
            "ed" => Token::Ed,
            "limit" => Token::Limit,
            _ => Token::Ident(text),
        };
        Ok(self.spanned(token, start))
    }
}
