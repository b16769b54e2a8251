//! The swish binary: install the shell's signal policy, then hand control
//! to the read-eval loop.

fn main() {
    if let Ok(spec) = std::env::var("SWISH_DEBUG") {
        swish::flog::activate_flog_categories_by_pattern(&spec);
    }
    swish::signal::signal_set_handlers();
    let status = swish::reader::run();
    std::process::exit(status);
}
