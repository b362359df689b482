//! Translation of parser failures into positional diagnostics
//!
//! Pure functions only; emitting to the sink and logging stay with the job.

use crate::diagnostics::Diagnostic;
use crate::engine::ParseFailure;

/// How many characters of input after the failure offset are quoted back in
/// a syntax-error message.
pub(crate) const LOOKAHEAD_CHARS: usize = 20;

const UNICODE_NOTE: &str =
    " NOTE: unrecognized characters occur at \\u followed by a hexadecimal number";

/// What the job should do with a classified failure.
#[derive(Debug, PartialEq)]
pub(crate) enum Translated {
    /// Surface this diagnostic to the editor.
    Report(Diagnostic),
    /// Best-effort policy: nothing for the editor, log and move on.
    LogOnly(&'static str),
}

pub(crate) fn translate(failure: &ParseFailure, input: &str) -> Translated {
    match failure {
        ParseFailure::Syntax {
            offset,
            length,
            begin_line,
            begin_column,
            end_line,
            end_column,
            ..
        } => {
            let input_len = input.chars().count();
            let mut offset = *offset;
            // An error one past the end belongs on the last character, not
            // on an out-of-bounds offset.
            if offset > 0 && offset == input_len {
                offset -= 1;
            }
            let (window, has_escapes) = lookahead_window(input, offset);
            let mut message = format!("{failure} FOLLOWED BY: {window}");
            if has_escapes {
                message.push_str(UNICODE_NOTE);
            }
            Translated::Report(Diagnostic {
                offset,
                length: *length,
                begin_line: begin_line + 1,
                begin_column: *begin_column,
                end_line: end_line + 1,
                end_column: *end_column,
                message,
            })
        }
        ParseFailure::Static {
            location: Some(span),
            message,
        } => Translated::Report(Diagnostic::positioned(span, message.clone())),
        ParseFailure::Static { location: None, .. } => {
            Translated::LogOnly("static error without position info during parsing")
        }
        ParseFailure::Runtime { location, message } => {
            Translated::Report(Diagnostic::positioned(location, message.clone()))
        }
        ParseFailure::Ambiguity {
            location, message, ..
        } => Translated::Report(Diagnostic::positioned(location, message.clone())),
        ParseFailure::Internal { .. } => Translated::LogOnly("unclassified parser failure"),
    }
}

/// Quote up to [`LOOKAHEAD_CHARS`] characters starting at `offset`, escaping
/// any Unicode space character other than plain space/tab/CR/LF so invisible
/// characters become visible in the message. Returns the window and whether
/// an escape occurred.
fn lookahead_window(input: &str, offset: usize) -> (String, bool) {
    let mut window = String::new();
    let mut has_escapes = false;
    for c in input.chars().skip(offset).take(LOOKAHEAD_CHARS) {
        if is_invisible_space(c) {
            has_escapes = true;
            let code = c as u32;
            if code <= 0xFFFF {
                window.push_str(&format!("\\u{:04x}", code));
            } else {
                window.push_str(&format!("\\U{:06x}", code));
            }
        } else {
            window.push(c);
        }
    }
    (window, has_escapes)
}

fn is_invisible_space(c: char) -> bool {
    c.is_whitespace() && !matches!(c, ' ' | '\t' | '\r' | '\n')
}
