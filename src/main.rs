mod error;
mod probe;

use std::time::Duration;

use clap::Parser;

use crate::error::ProbeError;
use crate::probe::ProbeConfig;

#[derive(Parser, Debug)]
#[command(
    name = "frame-probe",
    about = "Send one frame request over a websocket and print the reply"
)]
struct Cli {
    #[arg(long, env = "FRAME_PROBE_URL", default_value = probe::DEFAULT_URL)]
    url: String,

    #[arg(long, env = "FRAME_PROBE_FRAME_ID", default_value = probe::DEFAULT_FRAME_ID)]
    frame_id: String,

    #[arg(
        long,
        env = "FRAME_PROBE_CONNECT_TIMEOUT_SECS",
        default_value_t = probe::DEFAULT_CONNECT_TIMEOUT.as_secs(),
        help = "Seconds to wait for the opening handshake, or 0 to wait forever"
    )]
    connect_timeout_secs: u64,

    #[arg(
        long,
        env = "FRAME_PROBE_REPLY_TIMEOUT_SECS",
        help = "Seconds to wait for the reply; waits forever when unset or 0"
    )]
    reply_timeout_secs: Option<u64>,
}

impl Cli {
    fn into_config(self) -> ProbeConfig {
        ProbeConfig {
            url: self.url,
            frame_id: self.frame_id,
            connect_timeout: secs(Some(self.connect_timeout_secs)),
            reply_timeout: secs(self.reply_timeout_secs),
        }
    }
}

fn secs(value: Option<u64>) -> Option<Duration> {
    value.filter(|&n| n > 0).map(Duration::from_secs)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), ProbeError> {
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let config = Cli::parse().into_config();
    tracing::debug!(?config, "probe starting");

    println!("{}", reply_line(&config).await?);
    Ok(())
}

/// The only stdout output of a run; failures yield no line at all.
async fn reply_line(config: &ProbeConfig) -> Result<String, ProbeError> {
    let reply = probe::run(config).await?;
    Ok(reply.line())
}

#[cfg(test)]
#[path = "main_test.rs"]
mod tests;
