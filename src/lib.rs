//! swish is a small interactive shell built around POSIX job control:
//! foreground and background launches, suspending and resuming jobs, and
//! arbitrating ownership of the controlling terminal between the shell and
//! its children.

pub mod builtins;
pub mod common;
pub mod exec;
pub mod flog;
pub mod fork_exec;
pub mod null_terminated_array;
pub mod proc;
pub mod reader;
pub mod redirection;
pub mod signal;
pub mod tokenizer;
pub mod tty_handoff;
