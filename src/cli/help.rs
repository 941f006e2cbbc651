//! Log level selection for the CLI

/// Get the log level description based on verbosity
pub fn get_log_level(verbose: u8) -> &'static str {
    match verbose {
        0 => "info",
        1 => "debug",
        2 => "trace",
        _ => "trace,tokio=debug,runtime=debug",
    }
}

/// Verbosity after applying a job's `debug` flag
///
/// `debug: true` raises the default level to debug; an explicit `-v`
/// count above that wins.
pub fn effective_verbosity(verbose: u8, debug: bool) -> u8 {
    if debug {
        verbose.max(1)
    } else {
        verbose
    }
}
