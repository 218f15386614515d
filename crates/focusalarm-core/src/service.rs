//! Engine service: the single-threaded owner of escalation state.
//!
//! One tokio task owns the [`EscalationMachine`], both timer loops, and
//! the ports. Everything that can mutate state - user commands, beep
//! ticks, level ticks, single-beep steps - arrives as a message on one
//! mpsc queue, so ticks and commands are totally ordered and no lock is
//! needed. [`EscalationHandle`] is the marshaling boundary: it can be
//! cloned and used from any thread.
//!
//! ## Lifecycle
//!
//! ```ignore
//! let handle = EscalationService::spawn(config, audio, status);
//! handle.start(false);
//! // ... user drags to confirm ...
//! handle.acknowledge();
//! handle.terminated().await;
//! ```

use std::ops::ControlFlow;

use chrono::Utc;
use tokio::sync::{broadcast, mpsc, watch};
use tracing::{debug, info, warn};

use crate::config::EscalationConfig;
use crate::error::AudioError;
use crate::events::{BeepSkipReason, Event, TerminationCause};
use crate::machine::{
    AckOutcome, BeepOutcome, Command, EscalationMachine, LevelOutcome, MIN_LEVEL,
};
use crate::ports::{SharedAudio, SharedStatus};
use crate::scheduler::{schedule_once, schedule_repeating, TimerHandle};

/// Everything the engine task processes, in arrival order.
#[derive(Debug, Clone, Copy)]
enum Msg {
    Command(Command),
    BeepTick,
    LevelTick,
    /// Play the one-shot beep. `retried` is set when the backoff for a
    /// not-yet-loaded sound has already elapsed.
    SingleBeepFire { retried: bool },
    /// Settle delay after the one-shot beep elapsed; tear down.
    SingleBeepSettle,
}

const COMMAND_QUEUE_CAPACITY: usize = 64;
const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Cloneable front door to a running engine task.
///
/// Sends are non-blocking; commands aimed at a terminated engine are
/// silently dropped, matching the no-op semantics of commands in a
/// terminal phase.
#[derive(Debug, Clone)]
pub struct EscalationHandle {
    tx: mpsc::Sender<Msg>,
    events: broadcast::Sender<Event>,
    terminated: watch::Receiver<bool>,
}

impl EscalationHandle {
    /// Entry point invoked after an alarm fires. `single_beep` selects the
    /// one-shot path instead of a full escalation episode.
    pub fn start(&self, single_beep: bool) {
        self.send(Msg::Command(Command::Start { single_beep }));
    }

    /// "I noticed": quiets the current cycle, or terminates when the
    /// engine is already at max urgency.
    pub fn acknowledge(&self) {
        self.send(Msg::Command(Command::Acknowledge));
    }

    /// "Fully stop": terminal for the episode.
    pub fn cancel(&self) {
        self.send(Msg::Command(Command::Cancel));
    }

    /// Subscribe to engine events.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.events.subscribe()
    }

    pub fn is_terminated(&self) -> bool {
        *self.terminated.borrow()
    }

    /// Resolves once the engine has torn down, so the host can release
    /// any foreground or keep-alive state it holds.
    pub async fn terminated(&self) {
        let mut rx = self.terminated.clone();
        while !*rx.borrow_and_update() {
            if rx.changed().await.is_err() {
                break;
            }
        }
    }

    fn send(&self, msg: Msg) {
        if self.tx.try_send(msg).is_err() {
            debug!("Engine gone or queue full; dropping command as a no-op");
        }
    }
}

/// The engine task. Constructed and spawned via [`EscalationService::spawn`].
pub struct EscalationService {
    machine: EscalationMachine,
    config: EscalationConfig,
    audio: SharedAudio,
    status: SharedStatus,
    tx: mpsc::Sender<Msg>,
    rx: mpsc::Receiver<Msg>,
    events: broadcast::Sender<Event>,
    terminated: watch::Sender<bool>,
    beep_timer: Option<TimerHandle>,
    level_timer: Option<TimerHandle>,
    oneshot_timer: Option<TimerHandle>,
}

impl EscalationService {
    /// Spawn the engine task and return its handle.
    pub fn spawn(
        config: EscalationConfig,
        audio: SharedAudio,
        status: SharedStatus,
    ) -> EscalationHandle {
        let (tx, rx) = mpsc::channel(COMMAND_QUEUE_CAPACITY);
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let (terminated_tx, terminated_rx) = watch::channel(false);

        let handle = EscalationHandle {
            tx: tx.clone(),
            events: events.clone(),
            terminated: terminated_rx,
        };

        let service = Self {
            machine: EscalationMachine::new(),
            config,
            audio,
            status,
            tx,
            rx,
            events,
            terminated: terminated_tx,
            beep_timer: None,
            level_timer: None,
            oneshot_timer: None,
        };
        tokio::spawn(service.run());

        handle
    }

    async fn run(mut self) {
        while let Some(msg) = self.rx.recv().await {
            if self.handle_msg(msg).is_break() {
                break;
            }
        }
    }

    fn handle_msg(&mut self, msg: Msg) -> ControlFlow<()> {
        match msg {
            Msg::Command(Command::Start { single_beep: false }) => self.handle_start(),
            Msg::Command(Command::Start { single_beep: true }) => self.handle_start_single_beep(),
            Msg::Command(Command::Acknowledge) => return self.handle_acknowledge(),
            Msg::Command(Command::Cancel) => return self.handle_cancel(),
            Msg::BeepTick => self.handle_beep_tick(),
            Msg::LevelTick => self.handle_level_tick(),
            Msg::SingleBeepFire { retried } => self.handle_single_beep_fire(retried),
            Msg::SingleBeepSettle => return self.teardown(TerminationCause::SingleBeepDone),
        }
        ControlFlow::Continue(())
    }

    // ── Commands ─────────────────────────────────────────────────────

    fn handle_start(&mut self) {
        if !self.machine.start() {
            debug!("Start ignored: engine not idle");
            return;
        }
        info!("Escalation started at urgency level {MIN_LEVEL}");
        self.status.show(MIN_LEVEL);
        self.emit(Event::EscalationStarted { at: Utc::now() });

        // Beep loop fires immediately, then every beep interval. The level
        // loop waits one full cycle before its first fire.
        self.beep_timer = Some(schedule_repeating(
            &self.tx,
            std::time::Duration::ZERO,
            self.config.beep_interval(),
            Msg::BeepTick,
        ));
        self.level_timer = Some(schedule_repeating(
            &self.tx,
            self.config.level_duration(),
            self.config.level_duration(),
            Msg::LevelTick,
        ));
    }

    fn handle_start_single_beep(&mut self) {
        if !self.machine.start_single_beep() {
            debug!("Single beep ignored: engine not idle");
            return;
        }
        self.status.show(MIN_LEVEL);
        self.emit(Event::SingleBeepStarted { at: Utc::now() });

        if self.audio.is_ready(MIN_LEVEL) {
            self.handle_single_beep_fire(false);
        } else {
            debug!("Sound for level {MIN_LEVEL} not ready; delaying single beep");
            self.oneshot_timer = Some(schedule_once(
                &self.tx,
                self.config.single_beep_retry(),
                Msg::SingleBeepFire { retried: true },
            ));
        }
    }

    fn handle_acknowledge(&mut self) -> ControlFlow<()> {
        match self.machine.acknowledge() {
            AckOutcome::Quieted { level } => {
                info!("Alarm acknowledged at level {level}; beeping halted until next cycle");
                self.emit(Event::Acknowledged {
                    level,
                    at: Utc::now(),
                });
                ControlFlow::Continue(())
            }
            AckOutcome::Terminal => {
                info!("Alarm acknowledged at max level; acting as cancel");
                self.teardown(TerminationCause::AcknowledgedAtMax)
            }
            AckOutcome::Ignored => {
                debug!("Acknowledge ignored: no running escalation");
                ControlFlow::Continue(())
            }
        }
    }

    fn handle_cancel(&mut self) -> ControlFlow<()> {
        if self.machine.cancel() {
            self.teardown(TerminationCause::Cancelled)
        } else {
            debug!("Cancel ignored: engine idle or already cancelled");
            ControlFlow::Continue(())
        }
    }

    // ── Timer ticks ──────────────────────────────────────────────────

    fn handle_beep_tick(&mut self) {
        match self.machine.beep_tick() {
            BeepOutcome::Play { level } => self.play_beep(level),
            BeepOutcome::Suppressed { level } => {
                self.emit(Event::BeepSkipped {
                    level,
                    reason: BeepSkipReason::Acknowledged,
                    at: Utc::now(),
                });
            }
            BeepOutcome::Stopped => {}
        }
    }

    fn handle_level_tick(&mut self) {
        match self.machine.level_tick() {
            LevelOutcome::Cycle { level, escalated } => {
                // Stop the previous cycle's sound before the new one starts.
                self.audio.stop_all();
                if escalated {
                    info!("Escalated to urgency level {level}");
                } else {
                    info!("At maximum urgency level {level}; maintaining cycles");
                }
                self.status.show(level);
                self.emit(Event::LevelCycled {
                    level,
                    escalated,
                    at: Utc::now(),
                });
            }
            LevelOutcome::Stopped => {}
        }
    }

    fn handle_single_beep_fire(&mut self, retried: bool) {
        if self.machine.is_terminal() {
            return;
        }
        if retried && !self.audio.is_ready(MIN_LEVEL) {
            // Backoff elapsed and the asset is still loading: skip the
            // sound but still run the bounded teardown.
            warn!("Sound for level {MIN_LEVEL} not loaded; skipping single beep");
        } else {
            match self.audio.play_level(MIN_LEVEL) {
                Ok(()) => {
                    info!("Playing single beep");
                    self.emit(Event::SingleBeepPlayed { at: Utc::now() });
                }
                Err(e) => warn!("Single beep failed: {e}"),
            }
        }
        self.oneshot_timer = Some(schedule_once(
            &self.tx,
            self.config.single_beep_settle(),
            Msg::SingleBeepSettle,
        ));
    }

    // ── Side effects ─────────────────────────────────────────────────

    fn play_beep(&mut self, level: u8) {
        if !self.audio.is_ready(level) {
            debug!("Sound for urgency level {level} not loaded; skipping beep");
            self.emit(Event::BeepSkipped {
                level,
                reason: BeepSkipReason::SoundUnavailable,
                at: Utc::now(),
            });
            return;
        }
        match self.audio.play_level(level) {
            Ok(()) => {
                debug!("Playing sound for urgency level {level}");
                self.emit(Event::BeepPlayed {
                    level,
                    at: Utc::now(),
                });
            }
            Err(e) => {
                warn!("Beep at urgency level {level} failed: {e}");
                self.emit(Event::BeepSkipped {
                    level,
                    reason: BeepSkipReason::SoundUnavailable,
                    at: Utc::now(),
                });
            }
        }
    }

    /// Terminal teardown: release timers, stop and release audio, clear
    /// the status surface, signal termination, stop the engine task.
    fn teardown(&mut self, cause: TerminationCause) -> ControlFlow<()> {
        if let Some(t) = self.beep_timer.take() {
            t.cancel();
        }
        if let Some(t) = self.level_timer.take() {
            t.cancel();
        }
        if let Some(t) = self.oneshot_timer.take() {
            t.cancel();
        }
        // The machine is already terminal except on the single-beep settle
        // path, which tears down without a prior cancel command.
        self.machine.cancel();

        self.audio.stop_all();
        match self.audio.release() {
            Ok(()) => {}
            Err(AudioError::AlreadyReleased) => {
                debug!("Audio resources already released");
            }
            Err(e) => warn!("Audio release failed: {e}"),
        }
        self.status.clear();

        info!("Escalation ended: {cause:?}");
        self.emit(Event::Terminated {
            cause,
            at: Utc::now(),
        });
        let _ = self.terminated.send(true);
        ControlFlow::Break(())
    }

    fn emit(&self, event: Event) {
        // No subscribers is fine; events are advisory.
        let _ = self.events.send(event);
    }
}
