//! This file supports specifying and parsing redirections.
//!
//! A redirection clause is a two-token pair: an operator (`<`, `>`, `>>`)
//! followed by a filename. Clauses may only appear at the end of a command;
//! the first operator token marks the split between arguments and
//! redirections.

use nix::fcntl::OFlag;
use nix::sys::stat::Mode;
use std::os::fd::RawFd;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RedirectionMode {
    /// Input redirection: < file.txt. The file must exist.
    Input,
    /// Normal output redirection: > file.txt.
    Overwrite,
    /// Appending output redirection: >> file.txt.
    Append,
}

impl RedirectionMode {
    /// Recognize a redirection operator token.
    pub fn from_token(tok: &str) -> Option<RedirectionMode> {
        match tok {
            "<" => Some(RedirectionMode::Input),
            ">" => Some(RedirectionMode::Overwrite),
            ">>" => Some(RedirectionMode::Append),
            _ => None,
        }
    }

    /// The open flags for this redirection mode.
    pub fn oflags(self) -> OFlag {
        match self {
            RedirectionMode::Append => OFlag::O_CREAT | OFlag::O_APPEND | OFlag::O_WRONLY,
            RedirectionMode::Overwrite => OFlag::O_CREAT | OFlag::O_WRONLY | OFlag::O_TRUNC,
            RedirectionMode::Input => OFlag::O_RDONLY,
        }
    }

    /// Creation mode for output files: owner read/write only.
    pub fn file_creation_mode(self) -> Mode {
        Mode::S_IRUSR | Mode::S_IWUSR
    }

    /// The standard stream the opened file is dup2'd onto.
    pub fn target_fd(self) -> RawFd {
        match self {
            RedirectionMode::Input => libc::STDIN_FILENO,
            RedirectionMode::Overwrite | RedirectionMode::Append => libc::STDOUT_FILENO,
        }
    }
}

/// A redirection specification from the user: purely textual, the file is
/// not opened until the child applies it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RedirectionSpec {
    pub mode: RedirectionMode,
    /// The filename following the operator.
    pub target: String,
}

/// A malformed redirection tail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RedirectionError {
    /// A non-operator token appeared where an operator was required.
    ExpectedOperator(String),
    /// An operator with no filename after it.
    MissingTarget(String),
}

impl std::fmt::Display for RedirectionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RedirectionError::ExpectedOperator(tok) => {
                write!(f, "expected redirection operator, got '{tok}'")
            }
            RedirectionError::MissingTarget(op) => {
                write!(f, "redirection '{op}' is missing a filename")
            }
        }
    }
}

/// Partition a token sequence into the leading run of plain arguments and
/// the trailing run of redirection clauses. The split point is the first
/// operator token; everything from there on must parse as operator/filename
/// pairs.
pub fn partition_tokens(
    tokens: &[String],
) -> Result<(&[String], Vec<RedirectionSpec>), RedirectionError> {
    let split = tokens
        .iter()
        .position(|tok| RedirectionMode::from_token(tok).is_some())
        .unwrap_or(tokens.len());
    let (args, tail) = tokens.split_at(split);

    let mut specs = Vec::new();
    let mut iter = tail.iter();
    while let Some(op) = iter.next() {
        let Some(mode) = RedirectionMode::from_token(op) else {
            return Err(RedirectionError::ExpectedOperator(op.clone()));
        };
        let Some(target) = iter.next() else {
            return Err(RedirectionError::MissingTarget(op.clone()));
        };
        specs.push(RedirectionSpec {
            mode,
            target: target.clone(),
        });
    }
    Ok((args, specs))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::tokenize;

    #[test]
    fn test_partition_no_redirections() {
        let tokens = tokenize("ls -l");
        let (args, specs) = partition_tokens(&tokens).unwrap();
        assert_eq!(args, tokens.as_slice());
        assert!(specs.is_empty());
    }

    #[test]
    fn test_partition_output_redirection() {
        let tokens = tokenize("echo hi > out.txt");
        let (args, specs) = partition_tokens(&tokens).unwrap();
        assert_eq!(args, &tokens[..2]);
        assert_eq!(
            specs,
            vec![RedirectionSpec {
                mode: RedirectionMode::Overwrite,
                target: "out.txt".to_owned(),
            }]
        );
    }

    #[test]
    fn test_partition_multiple_clauses() {
        let tokens = tokenize("sort < in.txt >> out.txt");
        let (args, specs) = partition_tokens(&tokens).unwrap();
        assert_eq!(args, &tokens[..1]);
        assert_eq!(specs.len(), 2);
        assert_eq!(specs[0].mode, RedirectionMode::Input);
        assert_eq!(specs[0].target, "in.txt");
        assert_eq!(specs[1].mode, RedirectionMode::Append);
        assert_eq!(specs[1].target, "out.txt");
    }

    #[test]
    fn test_partition_malformed() {
        // Argument after the first operator.
        let tokens = tokenize("echo > out.txt hi");
        assert_eq!(
            partition_tokens(&tokens),
            Err(RedirectionError::ExpectedOperator("hi".to_owned()))
        );
        // Trailing operator with no filename.
        let tokens = tokenize("echo hi >");
        assert_eq!(
            partition_tokens(&tokens),
            Err(RedirectionError::MissingTarget(">".to_owned()))
        );
    }

    #[test]
    fn test_oflags() {
        assert_eq!(RedirectionMode::Input.oflags(), OFlag::O_RDONLY);
        assert!(RedirectionMode::Overwrite
            .oflags()
            .contains(OFlag::O_CREAT | OFlag::O_TRUNC | OFlag::O_WRONLY));
        assert!(RedirectionMode::Append
            .oflags()
            .contains(OFlag::O_CREAT | OFlag::O_APPEND | OFlag::O_WRONLY));
        assert_eq!(
            RedirectionMode::Input.target_fd(),
            libc::STDIN_FILENO
        );
        assert_eq!(
            RedirectionMode::Append.target_fd(),
            libc::STDOUT_FILENO
        );
    }
}
