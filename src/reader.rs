//! The prompt and read-eval loop.
//!
//! Line reading is deliberately simple: one line per command, no editing or
//! history. The loop blocks on line input between commands and inside the
//! supervisor's waits during foreground execution; those are the only
//! points where the shell is unresponsive, by design.

use crate::builtins::{self, Outcome};
use crate::flog::flog;
use crate::proc::JobTable;
use crate::tokenizer::tokenize;
use std::io::{BufRead, Write};

const PROMPT: &str = "@> ";

/// Run the interactive loop until `exit` or EOF. Returns the shell's exit
/// status.
pub fn run() -> i32 {
    let mut jobs = JobTable::new();
    let stdin = std::io::stdin();
    let mut line = String::new();

    loop {
        {
            let mut stdout = std::io::stdout().lock();
            let _ = stdout.write_all(PROMPT.as_bytes());
            let _ = stdout.flush();
        }

        line.clear();
        match stdin.lock().read_line(&mut line) {
            Ok(0) => break, // EOF
            Ok(_) => {}
            Err(err) => {
                flog!(error, "error reading command line:", err);
                jobs.clear();
                return 1;
            }
        }

        let mut tokens = tokenize(&line);
        if tokens.is_empty() {
            continue;
        }

        match builtins::dispatch(&mut jobs, &mut tokens) {
            Ok(Outcome::Continue) => {}
            Ok(Outcome::Exit) => break,
            Err(err) if err.is_fatal() => {
                // An OS primitive failed; the terminal and process-group
                // invariants can no longer be trusted. Tear down and exit.
                flog!(error, err);
                jobs.clear();
                return 1;
            }
            Err(err) => {
                // User error: report, abort this command, keep the loop.
                eprintln!("{err}");
            }
        }
    }

    // Tracked children are freed, not signaled, on exit.
    jobs.clear();
    0
}
