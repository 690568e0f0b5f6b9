use crate::token::{Span, Token, token_to_string};
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum XenboardError {
    InvalidTuningDescriptor(DescriptorError),
    InvalidNumericInput(InputError),
}

/// Why a tuning descriptor was rejected. Positions are byte offsets into the
/// trimmed descriptor.
#[derive(Debug, Clone, PartialEq)]
pub enum DescriptorError {
    UnexpectedChar { ch: char, pos: usize },
    InvalidNumber { text: String, span: Span },
    UnexpectedToken { expected: String, found: Token, span: Span },
    UnexpectedEnd { expected: String, pos: usize },
    ZeroDivisions { span: Span },
    TooManyDivisions { divisions: u64, max: u64, span: Span },
    InvalidInterval { value: f64, span: Span },
    EvenLimit { limit: u64, span: Span },
    LimitTooSmall { limit: u64, span: Span },
    LimitTooLarge { limit: u64, max: u64, span: Span },
}

#[derive(Debug, Clone, PartialEq)]
pub enum InputError {
    NotANumber { field: &'static str, text: String },
    NonPositive { field: &'static str },
    InvalidMappingEntry { text: String },
    TooManyKeys { rows: usize, columns: usize, max: usize },
}

impl DescriptorError {
    /// The part of the descriptor this error points at.
    pub fn span(&self) -> Span {
        match self {
            DescriptorError::UnexpectedChar { ch, pos } => Span {
                start: *pos,
                end: pos + ch.len_utf8(),
            },
            DescriptorError::UnexpectedEnd { pos, .. } => Span {
                start: *pos,
                end: *pos,
            },
            DescriptorError::InvalidNumber { span, .. }
            | DescriptorError::UnexpectedToken { span, .. }
            | DescriptorError::ZeroDivisions { span }
            | DescriptorError::TooManyDivisions { span, .. }
            | DescriptorError::InvalidInterval { span, .. }
            | DescriptorError::EvenLimit { span, .. }
            | DescriptorError::LimitTooSmall { span, .. }
            | DescriptorError::LimitTooLarge { span, .. } => *span,
        }
    }
}

impl fmt::Display for XenboardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            XenboardError::InvalidTuningDescriptor(e) => write!(f, "Invalid tuning descriptor: {e}"),
            XenboardError::InvalidNumericInput(e) => write!(f, "Invalid numeric input: {e}"),
        }
    }
}

impl std::error::Error for XenboardError {}

impl fmt::Display for DescriptorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DescriptorError::UnexpectedChar { ch, pos } => write!(f, "Unexpected char '{ch}' at pos {pos}"),
            DescriptorError::InvalidNumber { text, span } => {
                write!(f, "Invalid number '{text}' at pos {}", span.start)
            }
            DescriptorError::UnexpectedToken { expected, found, span } => write!(
                f,
                "Expected {expected}, found '{}' at pos {}",
                token_to_string(found),
                span.start
            ),
            DescriptorError::UnexpectedEnd { expected, .. } => {
                write!(f, "Unexpected end of descriptor, expected {expected}")
            }
            DescriptorError::ZeroDivisions { .. } => write!(f, "Number of divisions must be at least 1"),
            DescriptorError::TooManyDivisions { divisions, max, .. } => {
                write!(f, "{divisions} divisions exceed the largest supported count {max}")
            }
            DescriptorError::InvalidInterval { value, .. } => {
                write!(f, "Divided interval must be a positive ratio, got {value}")
            }
            DescriptorError::EvenLimit { limit, .. } => write!(f, "Limit {limit} is even, expected an odd limit"),
            DescriptorError::LimitTooSmall { limit, .. } => write!(f, "Limit {limit} is below the smallest limit 3"),
            DescriptorError::LimitTooLarge { limit, max, .. } => {
                write!(f, "Limit {limit} exceeds the largest supported limit {max}")
            }
        }
    }
}

impl std::error::Error for DescriptorError {}

impl fmt::Display for InputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputError::NotANumber { field, text } => write!(f, "{field} '{text}' is not a number"),
            InputError::NonPositive { field } => write!(f, "{field} must be greater than zero"),
            InputError::InvalidMappingEntry { text } => {
                write!(f, "Key mapping entry '{text}' is not an integer")
            }
            InputError::TooManyKeys { rows, columns, max } => {
                write!(f, "Keyboard of {rows}x{columns} keys exceeds the largest supported size of {max} keys")
            }
        }
    }
}

impl std::error::Error for InputError {}

impl From<DescriptorError> for XenboardError {
    fn from(e: DescriptorError) -> Self {
        XenboardError::InvalidTuningDescriptor(e)
    }
}

impl From<InputError> for XenboardError {
    fn from(e: InputError) -> Self {
        XenboardError::InvalidNumericInput(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unexpected_char_span_covers_multibyte_char() {
        let err = DescriptorError::UnexpectedChar { ch: '¢', pos: 2 };
        assert_eq!(err.span(), Span { start: 2, end: 4 });
    }

    #[test]
    fn test_error_display_names_kind() {
        let err: XenboardError = DescriptorError::EvenLimit {
            limit: 4,
            span: Span { start: 0, end: 1 },
        }
        .into();
        assert_eq!(
            err.to_string(),
            "Invalid tuning descriptor: Limit 4 is even, expected an odd limit"
        );

        let err: XenboardError = InputError::NonPositive { field: "Rows" }.into();
        assert_eq!(err.to_string(), "Invalid numeric input: Rows must be greater than zero");
    }
}
