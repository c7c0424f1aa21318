//! Log line formatting and placeholder interpolation.

use time::OffsetDateTime;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;

use crate::{Context, Level, Result};

/// Timestamp prefix of every log line, e.g. `2026-01-09T14:03:27.041`.
const LINE_TIMESTAMP_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:3]");

/// Key whose value must be an error object to be substituted.
const EXCEPTION_KEY: &str = "exception";

/// Current wall-clock time, in the local offset when it can be determined.
pub fn now() -> OffsetDateTime {
    OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc())
}

/// Format a complete log line: `<timestamp>\t<LEVEL>\t<message>\n`.
pub fn format_line(
    at: OffsetDateTime,
    level: Level,
    message: &str,
    context: &Context,
) -> Result<String> {
    let timestamp = at.format(LINE_TIMESTAMP_FORMAT)?;
    Ok(format!(
        "{}\t{}\t{}\n",
        timestamp,
        level.as_upper(),
        interpolate(message, context)
    ))
}

/// Replace `{key}` tokens in `message` with rendered context values.
///
/// Tokens whose key is missing, whose value is a container or an object
/// without a string form, or that name `exception` without holding an error,
/// are left verbatim. Substituted text is never scanned again.
pub fn interpolate(message: &str, context: &Context) -> String {
    if context.is_empty() {
        return message.to_string();
    }

    let mut out = String::with_capacity(message.len());
    let mut rest = message;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let tail = &rest[open..];

        let replacement = tail[1..]
            .find('}')
            .and_then(|close| substitution(&tail[1..=close], context).map(|s| (s, close + 2)));

        match replacement {
            Some((text, consumed)) => {
                out.push_str(&text);
                rest = &tail[consumed..];
            }
            None => {
                out.push('{');
                rest = &tail[1..];
            }
        }
    }

    out.push_str(rest);
    out
}

fn substitution(key: &str, context: &Context) -> Option<String> {
    let value = context.get(key)?;
    if key == EXCEPTION_KEY && !value.is_error() {
        return None;
    }
    value.render()
}
