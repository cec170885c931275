use std::{path::PathBuf, time::Duration};

use anyhow::Result;
use processing::{local_save::LocalSaver, FlushModule, FlushRequest};
use session::SessionTracker;
use storage::session_storage::{JsonFileStorage, SessionStorage};
use tokio::{
    io::{AsyncBufRead, AsyncWrite, BufReader},
    sync::mpsc,
};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::{
    host::{
        bridge::{read_commands, write_events},
        HostCommand, HostEvent,
    },
    utils::clock::{Clock, DefaultClock},
};

use accumulator::{SessionAccumulator, DEFAULT_FLUSH_EVERY_SECONDS};

pub mod accumulator;
pub mod args;
pub mod processing;
pub mod query;
pub mod session;
pub mod shutdown;
pub mod storage;

pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_secs(1);
pub const DEFAULT_DATA_FILE: &str = "screen-time-data.json";

#[derive(Debug, Clone)]
pub struct TrackerConfig {
    pub data_path: PathBuf,
    pub tick_interval: Duration,
    /// Focused seconds of the current day between periodic saves.
    pub flush_every: u64,
    /// The host window is assumed focused when the tracker starts.
    pub start_focused: bool,
}

impl TrackerConfig {
    pub fn new(dir: PathBuf, file: &str) -> Self {
        Self {
            data_path: dir.join(file),
            tick_interval: DEFAULT_TICK_INTERVAL,
            flush_every: DEFAULT_FLUSH_EVERY_SECONDS,
            start_focused: true,
        }
    }
}

/// Represents the starting point for the tracker. Talks to the host through stdin and stdout.
pub async fn start_tracker(config: TrackerConfig) -> Result<()> {
    let shutdown_token = CancellationToken::new();

    let (_, result) = tokio::join!(
        shutdown::detect_shutdown(shutdown_token.clone()),
        run_tracker(
            config,
            BufReader::new(tokio::io::stdin()),
            tokio::io::stdout(),
            DefaultClock,
            shutdown_token.clone(),
        ),
    );

    result
}

/// Loads the store, then runs the host bridge, the tracker and the flush pipeline until shutdown.
/// Returns only after the final save went through the pipeline.
pub async fn run_tracker(
    config: TrackerConfig,
    reader: impl AsyncBufRead + Unpin,
    writer: impl AsyncWrite + Unpin,
    clock: impl Clock,
    shutdown_token: CancellationToken,
) -> Result<()> {
    let storage = JsonFileStorage::new(config.data_path.clone())?;
    let store = storage.load().await;
    info!(
        "Tracking into {:?} with {} known days",
        storage.path(),
        store.len()
    );

    let (command_sender, command_receiver) = mpsc::channel::<HostCommand>(16);
    let (event_sender, event_receiver) = mpsc::channel::<HostEvent>(64);
    let (flush_sender, flush_receiver) = mpsc::channel::<FlushRequest>(4);

    let tracker = create_tracker(
        SessionAccumulator::new(store, config.start_focused).with_flush_every(config.flush_every),
        command_receiver,
        event_sender,
        flush_sender,
        &shutdown_token,
        config.tick_interval,
        clock,
    );
    let flusher = create_flusher(flush_receiver, storage);

    let (reader_result, writer_result, tracker_result, flush_result) = tokio::join!(
        read_commands(reader, command_sender, shutdown_token.clone()),
        write_events(writer, event_receiver, shutdown_token.clone()),
        tracker.run(),
        flusher.run(),
    );

    if let Err(e) = reader_result {
        error!("Host reader got an error {e:?}");
    }

    if let Err(e) = writer_result {
        error!("Host writer got an error {e:?}");
    }

    if let Err(e) = flush_result {
        error!("Flush module got an error {e:?}");
    }

    tracker_result.inspect_err(|e| error!("Tracker got an error {e:?}"))
}

fn create_tracker(
    accumulator: SessionAccumulator,
    commands: mpsc::Receiver<HostCommand>,
    events: mpsc::Sender<HostEvent>,
    flushes: mpsc::Sender<FlushRequest>,
    shutdown_token: &CancellationToken,
    tick_interval: Duration,
    clock: impl Clock,
) -> SessionTracker {
    SessionTracker::new(
        accumulator,
        commands,
        events,
        flushes,
        shutdown_token.clone(),
        tick_interval,
        Box::new(clock),
    )
}

fn create_flusher<S: SessionStorage>(
    receiver: mpsc::Receiver<FlushRequest>,
    storage: S,
) -> FlushModule<LocalSaver<S>> {
    FlushModule::new(receiver, LocalSaver::new(storage))
}
