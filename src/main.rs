use catcorr::cli::{effective_verbosity, execute_command, get_log_level, Cli};
use catcorr::config::{apply_env_overrides, load_job_config};
use catcorr::error::CatcorrError;
use clap::Parser;
use tracing::{debug, error, trace};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // The job's `debug` flag is only a default; load failures surface later
    // when the command loads the configuration for real.
    let debug_flag = match cli.command.config_path() {
        Some(path) => match load_job_config(path).await {
            Ok(mut config) => apply_env_overrides(&mut config).map(|_| config.debug).unwrap_or(false),
            Err(_) => false,
        },
        None => false,
    };
    let verbosity = effective_verbosity(cli.verbose, debug_flag);

    tracing_subscriber::fmt()
        .with_env_filter(get_log_level(verbosity))
        .with_writer(std::io::stderr)
        .with_target(verbosity >= 2)
        .with_thread_ids(verbosity >= 3)
        .with_line_number(verbosity >= 3)
        .init();

    debug!("catcorr started with verbosity level: {}", verbosity);
    trace!("Full CLI args: {:?}", std::env::args().collect::<Vec<_>>());

    if let Err(e) = execute_command(cli.command).await {
        error!("Fatal error: {:#}", e);
        let exit_code = match e.downcast_ref::<CatcorrError>() {
            Some(catcorr_error) => {
                eprintln!("Error [E{:04}]: {}", catcorr_error.code(), catcorr_error.user_message());
                catcorr_error.exit_code()
            }
            None => {
                eprintln!("Error: {:#}", e);
                1
            }
        };
        std::process::exit(exit_code);
    }
}
