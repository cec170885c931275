use std::time::Duration;

use anyhow::Result;
use tokio::{
    io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt},
    select,
    sync::mpsc,
    time::timeout,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::{HostCommand, HostEvent};

/// How long a pending write may take once shutdown was requested.
const SHUTDOWN_WRITE_GRACE: Duration = Duration::from_secs(2);

/// Reads host commands line by line and forwards them to the tracker. A shutdown command or the
/// end of input cancels `shutdown`, since the host closing our stdin means it went away.
pub async fn read_commands(
    reader: impl AsyncBufRead + Unpin,
    commands: mpsc::Sender<HostCommand>,
    shutdown: CancellationToken,
) -> Result<()> {
    let mut lines = reader.lines();
    loop {
        let line = select! {
            _ = shutdown.cancelled() => return Ok(()),
            line = lines.next_line() => line,
        };

        let line = match line {
            Ok(Some(line)) => line,
            Ok(None) => {
                info!("Host closed the input, shutting down");
                shutdown.cancel();
                return Ok(());
            }
            Err(e) => {
                shutdown.cancel();
                return Err(e.into());
            }
        };

        if line.trim().is_empty() {
            continue;
        }

        match serde_json::from_str::<HostCommand>(&line) {
            Ok(HostCommand::Shutdown) => {
                info!("Host requested shutdown");
                shutdown.cancel();
                return Ok(());
            }
            Ok(command) => {
                debug!("Received {command:?}");
                if commands.send(command).await.is_err() {
                    // Tracker is gone, nobody is left to answer.
                    return Ok(());
                }
            }
            Err(e) => {
                warn!("Ignoring malformed host message {line:?}: {e}");
            }
        }
    }
}

/// Writes tracker events to the host, one JSON object per line. Stops once the tracker drops its
/// sender, or on shutdown after the already queued events were written.
pub async fn write_events(
    mut writer: impl AsyncWrite + Unpin,
    mut events: mpsc::Receiver<HostEvent>,
    shutdown: CancellationToken,
) -> Result<()> {
    loop {
        let event = select! {
            biased;
            event = events.recv() => event,
            _ = shutdown.cancelled() => None,
        };
        let Some(event) = event else {
            writer.flush().await?;
            return Ok(());
        };

        let mut line = serde_json::to_vec(&event)?;
        line.push(b'\n');

        let write = write_line(&mut writer, &line);
        tokio::pin!(write);
        select! {
            biased;
            result = &mut write => result?,
            // A host that stopped reading must not keep the process alive after shutdown, but
            // one that still reads gets the rest of the queue.
            _ = shutdown.cancelled() => {
                match timeout(SHUTDOWN_WRITE_GRACE, write).await {
                    Ok(result) => result?,
                    Err(_) => {
                        warn!("Host stopped reading, dropping remaining events");
                        return Ok(());
                    }
                }
            }
        }
    }
}

async fn write_line(writer: &mut (impl AsyncWrite + Unpin), line: &[u8]) -> Result<()> {
    writer.write_all(line).await?;
    writer.flush().await?;
    Ok(())
}
