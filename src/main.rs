//! `hostprep` binary.
use std::process::ExitCode;
use std::sync::Arc;

use hostprep_cli::cli::Cli;
use hostprep_cli::commands::provision::{self, Services};
use hostprep_cli::logging::{self, ExitNotice, Log, Logger};
use hostprep_cli::platform::Platform;

fn main() -> ExitCode {
    let _ = enable_ansi_support::enable_ansi_support();
    let args = match Cli::parse_args(std::env::args_os()) {
        Ok(Some(args)) => args,
        Ok(None) => return ExitCode::SUCCESS,
        Err(e) => {
            // Console only; no option from a rejected command line is honoured.
            let _ = logging::init_subscriber(false, None);
            let logger: Arc<dyn Log> = Arc::new(Logger::new(None));
            let _notice = ExitNotice::new(Arc::clone(&logger), provision::FINISHED);
            logger.error(&e.to_string());
            return ExitCode::FAILURE;
        }
    };

    let open_error = logging::init_subscriber(args.verbose, args.log_file.as_deref()).err();
    let log_file = if open_error.is_none() {
        args.log_file.clone()
    } else {
        None
    };
    let logger = Arc::new(Logger::new(log_file));
    if let (Some(e), Some(path)) = (open_error, &args.log_file) {
        logger.error(&format!(
            "cannot open log file {}: {e}; continuing without it",
            path.display()
        ));
    }

    let platform = Platform::detect(&args.root);
    let services = Services::system(logger);
    ExitCode::from(provision::execute(&args, platform, &services))
}
