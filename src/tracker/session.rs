use std::time::Duration;

use anyhow::Result;
use tokio::{sync::mpsc, time::Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use crate::{
    host::{HostCommand, HostEvent},
    utils::{
        clock::Clock,
        time::{format_elapsed, parse_day_key},
    },
};

use super::{
    accumulator::{SessionAccumulator, TickOutcome},
    processing::{FlushReason, FlushRequest},
    query::{current_week, hourly_breakdown},
};

/// The single owner of the session state. Ticks, focus changes and view requests are all handled
/// by [SessionTracker::run], so there is never more than one mutator.
pub struct SessionTracker {
    accumulator: SessionAccumulator,
    commands: mpsc::Receiver<HostCommand>,
    commands_open: bool,
    events: mpsc::Sender<HostEvent>,
    flushes: mpsc::Sender<FlushRequest>,
    shutdown: CancellationToken,
    tick_interval: Duration,
    clock: Box<dyn Clock>,
    started_at: Instant,
}

impl SessionTracker {
    pub fn new(
        accumulator: SessionAccumulator,
        commands: mpsc::Receiver<HostCommand>,
        events: mpsc::Sender<HostEvent>,
        flushes: mpsc::Sender<FlushRequest>,
        shutdown: CancellationToken,
        tick_interval: Duration,
        clock: Box<dyn Clock>,
    ) -> Self {
        let started_at = clock.instant();
        Self {
            accumulator,
            commands,
            commands_open: true,
            events,
            flushes,
            shutdown,
            tick_interval,
            clock,
            started_at,
        }
    }

    /// Executes the tracker event loop. Returns after shutdown, once the final snapshot was
    /// queued for saving.
    pub async fn run(mut self) -> Result<()> {
        let mut tick_point = self.clock.instant();
        loop {
            tick_point += self.tick_interval;

            loop {
                tokio::select! {
                    // Shutdown is only observed between ticks, a tick is never interrupted.
                    _ = self.shutdown.cancelled() => {
                        return self.finish().await;
                    }
                    command = self.commands.recv(), if self.commands_open => {
                        match command {
                            Some(command) => self.handle_command(command),
                            None => self.commands_open = false,
                        }
                    }
                    _ = self.clock.sleep_until(tick_point) => break,
                }
            }

            self.tick();
        }
    }

    fn tick(&mut self) {
        let now = self.clock.local_time();
        let outcome = self.accumulator.tick(now);
        if outcome == TickOutcome::Inactive {
            return;
        }

        let text = format_elapsed(
            chrono::Duration::from_std(self.clock.instant() - self.started_at)
                .unwrap_or_else(|_| chrono::Duration::zero()),
        );
        trace!("Status {text}");
        self.emit(HostEvent::Status { text });

        if outcome.flush_due() {
            self.request_flush();
        }
    }

    fn handle_command(&mut self, command: HostCommand) {
        match command {
            HostCommand::Focus { focused } => {
                if self.accumulator.is_active() == focused {
                    debug!("Window focus is already {focused}");
                } else {
                    info!("Window focus changed to {focused}");
                    self.accumulator.set_active(focused);
                }
            }
            HostCommand::GetWeekData => {
                let today = self.clock.local_time().date();
                let data = current_week(self.accumulator.store(), today);
                self.emit(HostEvent::WeekData { data });
            }
            HostCommand::GetDayData { date } => {
                if let Err(e) = parse_day_key(&date) {
                    // Still answered, an unknown day simply has no data.
                    warn!("Requested day {date:?} isn't a YYYY-MM-DD day-key: {e}");
                }
                let data = hourly_breakdown(self.accumulator.store(), &date);
                self.emit(HostEvent::DayData { date, data });
            }
            HostCommand::Shutdown => self.shutdown.cancel(),
        }
    }

    /// Events are dropped rather than stalling the tick when the host doesn't keep up.
    fn emit(&self, event: HostEvent) {
        if let Err(e) = self.events.try_send(event) {
            debug!("Dropped host event: {e}");
        }
    }

    /// Periodic flushes are fire-and-forget. If the queue is full a write is already pending and
    /// the next minute supersedes this snapshot anyway.
    fn request_flush(&self) {
        let request = FlushRequest {
            store: self.accumulator.store().clone(),
            reason: FlushReason::Periodic,
        };
        if let Err(e) = self.flushes.try_send(request) {
            warn!("Skipping periodic flush: {e}");
        }
    }

    async fn finish(self) -> Result<()> {
        info!("Stopping tracker, queueing final save");
        let request = FlushRequest {
            store: self.accumulator.store().clone(),
            reason: FlushReason::Shutdown,
        };
        self.flushes.send(request).await?;
        Ok(())
    }
}
