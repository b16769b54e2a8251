//! Whitespace tokenization of a raw command line.
//!
//! The shell's grammar is deliberately flat: a command is a sequence of
//! whitespace-separated tokens, possibly ending in redirection clauses
//! and/or the background marker `&`. Quoting and expansion are out of scope.

/// The background marker token.
pub const BACKGROUND_MARKER: &str = "&";

/// Split one command line into owned tokens.
pub fn tokenize(line: &str) -> Vec<String> {
    line.split_ascii_whitespace().map(str::to_owned).collect()
}

/// If the command ends with the background marker, strip it and return true.
/// The dispatcher classifies the marker before the supervisor is invoked, so
/// the launcher only ever sees plain arguments and redirections.
pub fn strip_background_marker(tokens: &mut Vec<String>) -> bool {
    if tokens.last().is_some_and(|tok| tok == BACKGROUND_MARKER) {
        tokens.pop();
        true
    } else {
        false
    }
}
