//! redchat entry point
//!
//! Run with:
//! ```bash
//! cargo run -p redchat-client -- -r redis://localhost:6379 antirez
//! ```

use clap::Parser;
use redchat_client::Cli;
use redchat_common::{load_dotenv, try_init_tracing_with_config, TracingConfig};
use tracing::{error, info};

#[tokio::main]
async fn main() {
    load_dotenv();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // --help and --version land here too
            let code = i32::from(e.use_stderr());
            let _ = e.print();
            std::process::exit(code);
        }
    };

    let tracing_config = if cli.debug {
        TracingConfig::debug()
    } else {
        TracingConfig::from_env()
    };
    if let Err(e) = try_init_tracing_with_config(tracing_config) {
        eprintln!("Warning: Failed to initialize tracing: {e}");
    }

    let result = match cli.into_config() {
        Ok(config) => redchat_client::run(config).await,
        Err(e) => Err(e),
    };

    // Heartbeat failure and /exit both end here with status 0
    let code = match result {
        Ok(reason) => {
            info!(reason = %reason, "Chat ended");
            0
        }
        Err(e) => {
            error!(code = e.error_code(), error = %e, "Chat failed");
            println!("{e}");
            if e.shows_usage() {
                println!("{}", Cli::usage());
            }
            e.exit_code()
        }
    };

    std::process::exit(code);
}
