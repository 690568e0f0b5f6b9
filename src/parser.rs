use crate::error::DescriptorError;
use crate::token::{Span, Spanned, Token};
use crate::tuning::{MAX_DIVISIONS, MAX_LIMIT, Tuning};

/// Parser for the descriptor grammar:
///
/// ```text
/// descriptor := INTEGER "ed" (INTEGER | DECIMAL)
///             | INTEGER "-" "limit"
/// ```
pub struct Parser {
    tokens: Vec<Spanned>,
    pos: usize,
}

impl Parser {
    pub fn new(tokens: Vec<Spanned>) -> Self {
        Parser { tokens, pos: 0 }
    }

    // ── Helpers ──────────────────────────────────────────────

    fn peek(&self) -> &Spanned {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn advance(&mut self) -> Spanned {
        let s = self.peek().clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        s
    }

    fn check(&self, expected: &Token) -> bool {
        std::mem::discriminant(&self.peek().token) == std::mem::discriminant(expected)
    }

    fn unexpected(&self, expected: &str) -> DescriptorError {
        let current = self.peek();
        match current.token {
            Token::EOF => DescriptorError::UnexpectedEnd {
                expected: expected.into(),
                pos: current.span.start,
            },
            _ => DescriptorError::UnexpectedToken {
                expected: expected.into(),
                found: current.token.clone(),
                span: current.span,
            },
        }
    }

    fn expect(&mut self, expected: &Token, what: &str) -> Result<Spanned, DescriptorError> {
        if self.check(expected) {
            Ok(self.advance())
        } else {
            Err(self.unexpected(what))
        }
    }

    fn expect_integer(&mut self, what: &str) -> Result<(u64, Span), DescriptorError> {
        match self.peek().token.clone() {
            Token::Integer(n) => Ok((n, self.advance().span)),
            // Digit runs past u64 arrive as reals.
            Token::Decimal(x) if x.fract() == 0.0 && x >= u64::MAX as f64 => {
                Err(DescriptorError::InvalidNumber {
                    text: format!("{x}"),
                    span: self.peek().span,
                })
            }
            _ => Err(self.unexpected(what)),
        }
    }

    // ── Grammar ──────────────────────────────────────────────

    pub fn parse_tuning(&mut self) -> Result<Tuning, DescriptorError> {
        let (count, count_span) = self.expect_integer("a step count or limit")?;
        let tuning = if self.check(&Token::Ed) {
            self.advance();
            self.parse_equal_division(count, count_span)?
        } else if self.check(&Token::Minus) {
            self.advance();
            self.expect(&Token::Limit, "'limit'")?;
            self.parse_limit(count, count_span)?
        } else {
            return Err(self.unexpected("'ed' or '-limit'"));
        };
        self.expect(&Token::EOF, "end of descriptor")?;
        Ok(tuning)
    }

    fn parse_equal_division(&mut self, count: u64, count_span: Span) -> Result<Tuning, DescriptorError> {
        if count == 0 {
            return Err(DescriptorError::ZeroDivisions { span: count_span });
        }
        if count > MAX_DIVISIONS {
            return Err(DescriptorError::TooManyDivisions {
                divisions: count,
                max: MAX_DIVISIONS,
                span: count_span,
            });
        }
        // Bounded by MAX_DIVISIONS above.
        let divisions = count as u32;

        let (interval, span) = match self.peek().token.clone() {
            Token::Integer(n) => (n as f64, self.advance().span),
            Token::Decimal(x) => (x, self.advance().span),
            _ => return Err(self.unexpected("the divided interval")),
        };

        Tuning::equal_division(divisions, interval)
            .ok_or(DescriptorError::InvalidInterval { value: interval, span })
    }

    fn parse_limit(&mut self, limit: u64, span: Span) -> Result<Tuning, DescriptorError> {
        if limit < 3 {
            return Err(DescriptorError::LimitTooSmall { limit, span });
        }
        if limit % 2 == 0 {
            return Err(DescriptorError::EvenLimit { limit, span });
        }
        if limit > MAX_LIMIT {
            return Err(DescriptorError::LimitTooLarge {
                limit,
                max: MAX_LIMIT,
                span,
            });
        }
        // Bounded by MAX_LIMIT above.
        Tuning::z_limit(limit as u32).ok_or(DescriptorError::EvenLimit { limit, span })
    }
}
