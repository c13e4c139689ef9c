//! Output cleaning: turns the raw text captured for one command into its result.
//!
//! The raw capture starts with the device's echo of the command and ends
//! with the prompt it returned to. Cleaning removes color escapes, that
//! echo, prompt-only lines and blank lines. It is a pure function of its
//! inputs.

use std::ops::Range;

use once_cell::sync::Lazy;
use regex::Regex;

use super::response::CommandOutput;
use crate::dialect::EchoStripMode;

static ANSI_ESCAPE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\x1b\[[0-9;]*[mK]").expect("built-in ANSI pattern"));

static BLANK_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").expect("built-in pattern"));

/// Clean raw command output using the default echo heuristic.
///
/// `strip` matches a line that is nothing but a prompt.
pub fn clean(raw: &str, command: &str, strip: &Regex) -> CommandOutput {
    clean_with_mode(raw, command, strip, EchoStripMode::Substring)
}

/// Clean raw command output with an explicit echo recognition mode.
pub fn clean_with_mode(
    raw: &str,
    command: &str,
    strip: &Regex,
    mode: EchoStripMode,
) -> CommandOutput {
    let text = ANSI_ESCAPE.replace_all(raw, "");
    let lines: Vec<&str> = text.lines().map(str::trim_end).collect();
    let echo = find_echo(&lines, command.trim(), mode);

    let kept: Vec<&str> = lines
        .iter()
        .enumerate()
        .filter(|(index, _)| !echo.as_ref().is_some_and(|range| range.contains(index)))
        .map(|(_, line)| *line)
        .filter(|line| !strip.is_match(line))
        .filter(|line| !line.is_empty())
        .collect();

    let joined = kept.join("\n");
    let collapsed = BLANK_RUN.replace_all(joined.trim(), "\n\n");

    if collapsed.is_empty() {
        CommandOutput::Empty
    } else {
        CommandOutput::Text(collapsed.into_owned())
    }
}

/// Locate the echo and its skip line. At most one echo is ever reported.
///
/// The line after the echo is absorbed when it is blank (a CR/wrap
/// artifact). A command wrapped by the terminal starts on one line and
/// finishes on the next; both lines are then the echo.
fn find_echo(lines: &[&str], command: &str, mode: EchoStripMode) -> Option<Range<usize>> {
    if command.is_empty() {
        return None;
    }

    for (index, line) in lines.iter().enumerate() {
        let next = lines.get(index + 1).copied();

        if is_echo(line, command, mode) {
            let end = match next {
                Some(next) if next.trim().is_empty() => index + 2,
                _ => index + 1,
            };
            return Some(index..end);
        }

        if let Some(next) = next {
            if wraps_into(line, next, command, mode) {
                return Some(index..index + 2);
            }
        }
    }

    None
}

fn is_echo(line: &str, command: &str, mode: EchoStripMode) -> bool {
    match mode {
        EchoStripMode::Substring => line.contains(command) || line.trim().starts_with(command),
        EchoStripMode::Exact => {
            let line = line.trim();
            line == command
                || line.strip_suffix(command).is_some_and(|prefix| {
                    prefix.ends_with(['#', '>', ']']) && !prefix.contains(char::is_whitespace)
                })
        }
    }
}

/// True when `command` begins in `line` and is completed by `next`.
fn wraps_into(line: &str, next: &str, command: &str, mode: EchoStripMode) -> bool {
    if line.is_empty() || next.is_empty() || is_echo(next, command, mode) {
        return false;
    }

    let joined = format!("{line}{next}");
    match mode {
        EchoStripMode::Substring => joined
            .find(command)
            .is_some_and(|start| start < line.len()),
        EchoStripMode::Exact => is_echo(&joined, command, mode),
    }
}
