//! Human-readable reports for rejected tuning descriptors.

use ariadne::{Config, IndexType, Label, Report, ReportKind, Source};

use crate::error::{DescriptorError, XenboardError};

const GRAMMAR_NOTE: &str = "expected `<steps>ed<interval>` such as `19ed2`, or `<odd limit>-limit` such as `7-limit`";

/// Render `error` against the descriptor it came from, pointing at the
/// offending span. `descriptor` is the untrimmed user input.
pub fn render_descriptor_error(descriptor: &str, error: &DescriptorError) -> String {
    let source = descriptor.trim();
    if source.is_empty() {
        return format!("{error}\n{GRAMMAR_NOTE}");
    }

    let span = error.span();
    // End-of-input errors point at the last character.
    let range = if span.start == span.end {
        span.start.saturating_sub(1).min(source.len() - 1)..span.end.min(source.len())
    } else {
        span.range()
    };

    let mut out = Vec::new();
    let written = Report::build(ReportKind::Error, range.clone())
        .with_config(
            Config::default()
                .with_color(false)
                .with_index_type(IndexType::Byte),
        )
        .with_message("invalid tuning descriptor")
        .with_label(Label::new(range).with_message(error.to_string()))
        .with_note(GRAMMAR_NOTE)
        .finish()
        .write(Source::from(source), &mut out);

    match written {
        Ok(()) => String::from_utf8_lossy(&out).into_owned(),
        Err(_) => format!("{error}\n{GRAMMAR_NOTE}"),
    }
}

impl XenboardError {
    /// Message for the UI. Descriptor errors get a source report; `descriptor`
    /// is ignored for other kinds.
    pub fn render(&self, descriptor: &str) -> String {
        match self {
            XenboardError::InvalidTuningDescriptor(e) => render_descriptor_error(descriptor, e),
            XenboardError::InvalidNumericInput(_) => self.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse_tuning;

    fn report(descriptor: &str) -> String {
        let err = parse_tuning(descriptor).unwrap_err();
        err.render(descriptor)
    }

    #[test]
    fn test_report_labels_error() {
        let text = report("4-limit");
        assert!(text.contains("invalid tuning descriptor"), "{text}");
        assert!(text.contains("Limit 4 is even"), "{text}");
        assert!(text.contains("4-limit"), "{text}");
        assert!(text.contains("7-limit"), "{text}");
    }

    #[test]
    fn test_report_for_truncated_descriptor() {
        let text = report("  12ed ");
        assert!(text.contains("Unexpected end of descriptor"), "{text}");
        assert!(text.contains("12ed"), "{text}");
    }

    #[test]
    fn test_report_for_empty_descriptor() {
        let text = report("   ");
        assert!(text.starts_with("Unexpected end of descriptor"), "{text}");
    }

    #[test]
    fn test_numeric_errors_render_plainly() {
        let err: XenboardError = crate::error::InputError::NonPositive { field: "Rows" }.into();
        assert_eq!(err.render("12ed2"), "Invalid numeric input: Rows must be greater than zero");
    }
}
