use clap::{Args, Parser, Subcommand};
use pushbeat_core::config::{DEFAULT_INTERVAL_SECS, DEFAULT_TIMEOUT_SECS};
use pushbeat_core::{BodyFormat, PingMode, PushStatus};

mod commands;
mod util;

#[derive(Parser)]
#[command(
    name = "pushbeat",
    version,
    about = "Pushbeat: sends heartbeats to a push-based uptime monitor"
)]
struct Cli {
    /// Push URL of the monitor (e.g. https://status.example.com/api/push)
    #[arg(long, env = "PUSH_URL")]
    url: String,

    /// Push token, sent as X-Push-Token. Without it the push is a GET and
    /// the token must already be part of the URL path.
    #[arg(long, env = "PUSH_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Request timeout in seconds
    #[arg(long, env = "PUSH_TIMEOUT", default_value_t = DEFAULT_TIMEOUT_SECS)]
    timeout: u64,

    /// Body encoding for token pushes: form or json
    #[arg(long, env = "PUSH_FORMAT", default_value = "form")]
    format: BodyFormat,

    /// Emit logs as JSON lines
    #[arg(long, env = "PUSHBEAT_LOG_JSON")]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct PayloadArgs {
    /// Status to report: up or down
    #[arg(long, env = "PUSH_STATUS", default_value = "up")]
    status: PushStatus,

    /// Message sent with every push
    #[arg(long, env = "PUSH_MSG", default_value = "OK")]
    msg: String,

    /// Fixed ping value in milliseconds (sent empty when omitted)
    #[arg(long)]
    ping: Option<u64>,
}

#[derive(Subcommand)]
enum Commands {
    /// Push on a fixed interval until interrupted
    Run {
        #[command(flatten)]
        payload: PayloadArgs,

        /// Seconds between pushes
        #[arg(long, env = "PUSH_INTERVAL", default_value_t = DEFAULT_INTERVAL_SECS)]
        interval: u64,

        /// Report the previous push's round-trip time as ping
        #[arg(long, conflicts_with = "ping")]
        measure_ping: bool,

        /// Stop after this many pushes
        #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
        count: Option<u64>,

        /// Exit on the first failed push instead of continuing
        #[arg(long)]
        fail_fast: bool,
    },
    /// Send a single push and print the collector's reply
    Once {
        #[command(flatten)]
        payload: PayloadArgs,
    },
}

impl PayloadArgs {
    fn ping_mode(&self, measure_ping: bool) -> PingMode {
        match (measure_ping, self.ping) {
            (true, _) => PingMode::Measured,
            (false, Some(ms)) => PingMode::Fixed(ms),
            (false, None) => PingMode::Empty,
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();
    util::init_tracing(cli.log_json);

    let config = match util::build_config(&cli.url, cli.token, cli.timeout, cli.format) {
        Ok(config) => config,
        Err(err) => std::process::exit(util::fail(&err)),
    };

    let code = match cli.command {
        Commands::Run {
            payload,
            interval,
            measure_ping,
            count,
            fail_fast,
        } => {
            let ping_mode = payload.ping_mode(measure_ping);
            commands::run::run(
                config,
                interval,
                payload.status,
                payload.msg,
                ping_mode,
                count,
                fail_fast,
            )
            .await
        }
        Commands::Once { payload } => {
            commands::once::run(config, payload.status, payload.msg, payload.ping).await
        }
    };

    std::process::exit(code);
}
