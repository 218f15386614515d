//! # Focusalarm Core Library
//!
//! Escalating alarm notification engine. Once an alarm fires, the engine
//! keeps alerting with increasing urgency (levels 1..=4) until the user
//! acknowledges or cancels, while tolerating races between asynchronous
//! user commands, timer ticks, and slow sound-asset loading.
//!
//! ## Architecture
//!
//! - **Machine**: a pure state machine over `Idle / Running / SingleBeep /
//!   Cancelled`; transitions report required side effects, never perform them
//! - **Service**: one tokio task owning the machine, the timers, and the
//!   ports; a single mpsc queue totally orders ticks and commands
//! - **Scheduler**: cancellable delayed message delivery; repeating timers
//!   are self-rescheduling one-shots
//! - **Ports**: injected traits for audio playback and the persistent
//!   urgency status readout
//!
//! The engine is scoped to one alarm-ringing episode: it decides nothing
//! about when alarms fire, persists nothing, and renders no UI.
//!
//! ## Key Components
//!
//! - [`EscalationService`]: spawns the engine task
//! - [`EscalationHandle`]: thread-safe command entry and event stream
//! - [`EscalationMachine`]: the pure state machine
//! - [`EscalationConfig`]: TOML-backed timing configuration

pub mod config;
pub mod error;
pub mod events;
pub mod machine;
pub mod ports;
pub mod scheduler;
pub mod service;

pub use config::EscalationConfig;
pub use error::{AudioError, ConfigError, EngineError};
pub use events::{BeepSkipReason, Event, TerminationCause};
pub use machine::{Command, EscalationMachine, Phase, MAX_LEVEL, MIN_LEVEL};
pub use ports::{status_text, AudioSink, SharedAudio, SharedStatus, StatusSurface};
pub use scheduler::TimerHandle;
pub use service::{EscalationHandle, EscalationService};
