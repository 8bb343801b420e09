//! `novade-global-touch`: switch the touchscreen on or off, or watch every touch
//! event, through the compositor's `weston_global_touch` global.

use anyhow::{Context, Result};
use clap::Parser;
use novade_global_touch::client::{Command, GlobalTouchClient};
use novade_global_touch::logging;
use wayland_client::Connection;

#[derive(Parser, Debug)]
#[command(author, version, about = "Control and monitor compositor-wide touch input")]
struct Cli {
    #[arg(value_enum)]
    command: Command,
}

fn main() -> Result<()> {
    // Argument errors exit here, before any connection is made.
    let cli = Cli::parse();
    logging::init_minimal_logging();

    let conn = Connection::connect_to_env().context("failed to connect to the Wayland display")?;
    let mut queue = conn.new_event_queue();
    let qh = queue.handle();
    let _registry = conn.display().get_registry(&qh, ());

    let mut app = match cli.command {
        Command::Monitor => GlobalTouchClient::printing(),
        Command::Enable | Command::Disable => GlobalTouchClient::new(),
    };
    queue.roundtrip(&mut app).context("initial roundtrip failed")?;

    if !app.send(cli.command) {
        eprintln!("weston-global-touch protocol isn't supported!");
        return Ok(());
    }

    match cli.command {
        Command::Monitor => loop {
            if let Err(err) = queue.blocking_dispatch(&mut app) {
                tracing::debug!(error = %err, "Connection ended");
                break;
            }
        },
        Command::Enable | Command::Disable => {
            queue.roundtrip(&mut app).context("roundtrip failed")?;
        }
    }

    app.release();
    let _ = conn.flush();
    Ok(())
}
