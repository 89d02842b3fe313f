//! Binary-protocol TCP server over the matching engine.
//!
//! Usage: `server [port]` (default 9000). Ctrl-C requests cooperative
//! shutdown; a failed bind exits with status 1.

use std::process::ExitCode;

use tracing::error;

use matchbook::server;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt().with_env_filter("info").init();

    let port = match std::env::args().nth(1) {
        Some(arg) => match arg.parse() {
            Ok(port) => port,
            Err(_) => {
                error!("invalid port '{arg}'");
                return ExitCode::from(1);
            }
        },
        None => server::DEFAULT_PORT,
    };

    if let Err(e) = server::run(port).await {
        error!(error = %e, "server failed");
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}
