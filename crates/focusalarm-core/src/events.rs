use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Every observable state change in the engine produces an Event.
/// Hosts subscribe via [`EscalationHandle::subscribe`](crate::service::EscalationHandle::subscribe).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    /// Escalation episode began at level 1.
    EscalationStarted {
        at: DateTime<Utc>,
    },
    /// A beep for the current level was played.
    BeepPlayed {
        level: u8,
        at: DateTime<Utc>,
    },
    /// A beep tick passed without sound (acknowledged, or asset missing).
    BeepSkipped {
        level: u8,
        reason: BeepSkipReason,
        at: DateTime<Utc>,
    },
    /// A new level-cycle began. `escalated` is false once the level
    /// holds at max.
    LevelCycled {
        level: u8,
        escalated: bool,
        at: DateTime<Utc>,
    },
    /// User acknowledged below max level; beeping quiets for this cycle.
    Acknowledged {
        level: u8,
        at: DateTime<Utc>,
    },
    /// Single-beep episode began.
    SingleBeepStarted {
        at: DateTime<Utc>,
    },
    /// The one-shot beep actually played.
    SingleBeepPlayed {
        at: DateTime<Utc>,
    },
    /// Terminal: timers released, audio stopped, status cleared.
    Terminated {
        cause: TerminationCause,
        at: DateTime<Utc>,
    },
}

/// Why a beep tick stayed silent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BeepSkipReason {
    Acknowledged,
    SoundUnavailable,
}

/// What ended the episode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TerminationCause {
    Cancelled,
    /// Acknowledge arrived at max level, which is defined as a cancel.
    AcknowledgedAtMax,
    /// Single-beep episode ran its course.
    SingleBeepDone,
}
