//! Category-gated logging.
//!
//! Each category is a static with an atomic enabled flag so that the check
//! is cheap at every call site and usable from any context. Categories are
//! activated from the `SWISH_DEBUG` environment variable at startup, as a
//! comma-separated list; a leading `-` disables, and underscores are
//! accepted in place of dashes.

use libc::c_int;
use std::sync::atomic::{AtomicI32, Ordering};

#[allow(non_upper_case_globals)]
pub mod categories {
    use std::sync::atomic::AtomicBool;

    pub struct Category {
        pub name: &'static str,
        pub description: &'static str,
        pub enabled: AtomicBool,
    }

    macro_rules! declare_category {
        (($var:ident, $name:literal, $description:literal, $enabled:expr)) => {
            pub static $var: Category = Category {
                name: $name,
                description: $description,
                enabled: AtomicBool::new($enabled),
            };
        };
        (($var:ident, $name:literal, $description:literal)) => {
            declare_category!(($var, $name, $description, false));
        };
    }

    macro_rules! category_name {
        (($var:ident, $($rest:tt)*)) => {
            $var
        };
    }

    macro_rules! categories {
        ( $($cats:tt);* $(;)? ) => {
            $(
                declare_category!($cats);
            )*

            /// All categories, for name matching during activation.
            pub fn all_categories() -> Vec<&'static Category> {
                vec![
                    $(
                        &category_name!($cats),
                    )*
                ]
            }
        };
    }

    categories!(
        (error, "error", "Serious unexpected errors (on by default)", true);
        (warning, "warning", "Warnings (on by default)", true);
        (exec, "exec", "Errors reported by exec (on by default)", true);
        (proc_pgroup, "proc-pgroup", "Process groups");
        (proc_termowner, "proc-termowner", "Terminal ownership events");
        (proc_job_run, "proc-job-run", "Jobs getting started or continued");
        (proc_reap, "proc-reap", "Reaping forked processes");
    );
}

/// Write one preformatted line to the flog fd.
pub fn flog_impl(s: &str) {
    let fd = get_flog_file_fd();
    if fd < 0 {
        return;
    }
    // We don't use locking, so the newline is already part of the buffer to
    // keep this a single write.
    unsafe {
        let _ = libc::write(fd, s.as_ptr() as *const libc::c_void, s.len());
    }
}

/// The entry point for logging. Arguments are space-joined.
#[macro_export]
macro_rules! flog {
    ($category:ident, $($elem:expr),+ $(,)?) => {
        if $crate::flog::categories::$category.enabled.load(std::sync::atomic::Ordering::Relaxed) {
            let mut vs = vec![format!("{}:", $crate::flog::categories::$category.name)];
            $(
                vs.push(format!("{}", $elem));
            )+
            let mut v = vs.join(" ");
            v.push('\n');
            $crate::flog::flog_impl(&v);
        }
    };
}

pub use flog;

/// For each name in the comma-separated `spec`, set the matching category's
/// enabled flag. `all` matches every category.
pub fn activate_flog_categories_by_pattern(spec: &str) {
    for part in spec.split(',') {
        if part.is_empty() {
            continue;
        }
        let (sense, name) = match part.strip_prefix('-') {
            Some(rest) => (false, rest),
            None => (true, part),
        };
        // Allow the user to be sloppy about underscores vs dashes.
        let name = name.replace('_', "-");
        let mut match_found = false;
        for cat in categories::all_categories() {
            if name == "all" || cat.name == name {
                cat.enabled.store(sense, Ordering::Relaxed);
                match_found = true;
            }
        }
        if !match_found {
            eprintln!("Failed to match debug category: {name}");
        }
    }
}

/// The flog output fd. Defaults to stderr. A value < 0 disables flog.
static FLOG_FD: AtomicI32 = AtomicI32::new(libc::STDERR_FILENO);

pub fn set_flog_file_fd(fd: c_int) {
    FLOG_FD.store(fd, Ordering::Relaxed);
}

#[inline]
pub fn get_flog_file_fd() -> c_int {
    FLOG_FD.load(Ordering::Relaxed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_activation() {
        assert!(!categories::proc_pgroup.enabled.load(Ordering::Relaxed));
        activate_flog_categories_by_pattern("proc_pgroup,proc-reap");
        assert!(categories::proc_pgroup.enabled.load(Ordering::Relaxed));
        assert!(categories::proc_reap.enabled.load(Ordering::Relaxed));
        activate_flog_categories_by_pattern("-proc-pgroup,-proc-reap");
        assert!(!categories::proc_pgroup.enabled.load(Ordering::Relaxed));
        assert!(!categories::proc_reap.enabled.load(Ordering::Relaxed));
    }
}
