//! Escalation state machine.
//!
//! The machine is a pure state holder. It does not own timers or ports -
//! the [`service`](crate::service) drives it and executes the side effects
//! each transition reports.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Running(level, acknowledged) -> Cancelled
//! Idle -> SingleBeep -> Cancelled
//! ```
//!
//! `Running` carries its level (1..=4) and acknowledged flag directly so
//! invalid combinations (running without a level, level 0) cannot exist.
//! `Cancelled` is terminal: every command and tick afterwards is a no-op.

use serde::{Deserialize, Serialize};

/// Lowest urgency tier.
pub const MIN_LEVEL: u8 = 1;
/// Highest urgency tier. Level cycles repeat here; there is no tier 5.
pub const MAX_LEVEL: u8 = 4;

/// Engine lifecycle phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "lowercase")]
pub enum Phase {
    Idle,
    Running { level: u8, acknowledged: bool },
    /// One-shot beep episode, disjoint from `Running`.
    SingleBeep,
    Cancelled,
}

/// Command from a collaborator (UI gesture, alarm trigger).
/// Produced outside the engine, consumed at most once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "lowercase")]
pub enum Command {
    Start { single_beep: bool },
    Acknowledge,
    Cancel,
}

/// Result of [`EscalationMachine::acknowledge`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AckOutcome {
    /// Beeping goes quiet until the next level cycle resets the flag.
    Quieted { level: u8 },
    /// Acknowledged at max level: defined as a full cancel.
    Terminal,
    /// Not running (or already acknowledged): nothing to do.
    Ignored,
}

/// Result of a beep-loop tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BeepOutcome {
    Play { level: u8 },
    /// Acknowledged for this cycle; tick passes silently.
    Suppressed { level: u8 },
    /// Terminal phase reached; the loop must stop rescheduling.
    Stopped,
}

/// Result of a level-loop tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelOutcome {
    /// A new cycle began. `level` is unchanged when already at max.
    Cycle { level: u8, escalated: bool },
    /// Terminal phase reached; the loop must stop rescheduling.
    Stopped,
}

/// Pure escalation state machine.
///
/// All mutation happens through the transition methods below; each returns
/// what the caller must now do (play, suppress, stop) without performing
/// any side effect itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EscalationMachine {
    phase: Phase,
}

impl EscalationMachine {
    pub fn new() -> Self {
        Self { phase: Phase::Idle }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Current urgency level, if an escalation episode is running.
    pub fn level(&self) -> Option<u8> {
        match self.phase {
            Phase::Running { level, .. } => Some(level),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.phase == Phase::Cancelled
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// `Idle -> Running(1, false)`. Returns `false` when not idle.
    pub fn start(&mut self) -> bool {
        match self.phase {
            Phase::Idle => {
                self.phase = Phase::Running {
                    level: MIN_LEVEL,
                    acknowledged: false,
                };
                true
            }
            _ => false,
        }
    }

    /// `Idle -> SingleBeep`. Returns `false` when not idle.
    pub fn start_single_beep(&mut self) -> bool {
        match self.phase {
            Phase::Idle => {
                self.phase = Phase::SingleBeep;
                true
            }
            _ => false,
        }
    }

    /// Acknowledge the alarm. Below max level this only quiets the current
    /// cycle; at max level the user has definitively engaged and the
    /// acknowledge acts as a cancel (the caller must run its teardown).
    pub fn acknowledge(&mut self) -> AckOutcome {
        match self.phase {
            Phase::Running { level, .. } if level >= MAX_LEVEL => {
                self.phase = Phase::Cancelled;
                AckOutcome::Terminal
            }
            Phase::Running { level, acknowledged: false } => {
                self.phase = Phase::Running {
                    level,
                    acknowledged: true,
                };
                AckOutcome::Quieted { level }
            }
            Phase::Running { level, acknowledged: true } => {
                // Repeat acknowledge within one cycle changes nothing.
                AckOutcome::Quieted { level }
            }
            _ => AckOutcome::Ignored,
        }
    }

    /// Move to the terminal phase. Returns `true` if this call performed
    /// the transition, `false` when idle or already cancelled (idempotent).
    pub fn cancel(&mut self) -> bool {
        match self.phase {
            Phase::Running { .. } | Phase::SingleBeep => {
                self.phase = Phase::Cancelled;
                true
            }
            Phase::Idle | Phase::Cancelled => false,
        }
    }

    // ── Timer ticks ──────────────────────────────────────────────────

    /// Beep-loop tick. Liveness is checked here, at the start of the tick,
    /// so a cancel that lands mid-interval silences the queued tick.
    pub fn beep_tick(&mut self) -> BeepOutcome {
        match self.phase {
            Phase::Running { level, acknowledged: false } => BeepOutcome::Play { level },
            Phase::Running { level, acknowledged: true } => BeepOutcome::Suppressed { level },
            _ => BeepOutcome::Stopped,
        }
    }

    /// Level-loop tick: begin a new cycle. Resets the acknowledged flag,
    /// advances the level, holds at [`MAX_LEVEL`] without wrapping.
    pub fn level_tick(&mut self) -> LevelOutcome {
        match self.phase {
            Phase::Running { level, .. } => {
                let escalated = level < MAX_LEVEL;
                let level = if escalated { level + 1 } else { level };
                self.phase = Phase::Running {
                    level,
                    acknowledged: false,
                };
                LevelOutcome::Cycle { level, escalated }
            }
            _ => LevelOutcome::Stopped,
        }
    }
}

impl Default for EscalationMachine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn running_machine() -> EscalationMachine {
        let mut m = EscalationMachine::new();
        assert!(m.start());
        m
    }

    /// Drive the machine to a given level via level ticks.
    fn at_level(target: u8) -> EscalationMachine {
        let mut m = running_machine();
        while m.level() != Some(target) {
            m.level_tick();
        }
        m
    }

    #[test]
    fn start_enters_level_one_unacknowledged() {
        let m = running_machine();
        assert_eq!(
            m.phase(),
            Phase::Running {
                level: 1,
                acknowledged: false
            }
        );
    }

    #[test]
    fn start_is_noop_unless_idle() {
        let mut m = running_machine();
        assert!(!m.start());
        m.cancel();
        assert!(!m.start());
        assert!(!m.start_single_beep());
    }

    #[test]
    fn beep_tick_plays_current_level() {
        let mut m = running_machine();
        assert_eq!(m.beep_tick(), BeepOutcome::Play { level: 1 });
    }

    #[test]
    fn acknowledge_below_max_suppresses_until_next_cycle() {
        let mut m = running_machine();
        assert_eq!(m.acknowledge(), AckOutcome::Quieted { level: 1 });
        assert_eq!(m.beep_tick(), BeepOutcome::Suppressed { level: 1 });

        // Next cycle resets the flag and beeping resumes.
        assert_eq!(
            m.level_tick(),
            LevelOutcome::Cycle {
                level: 2,
                escalated: true
            }
        );
        assert_eq!(m.beep_tick(), BeepOutcome::Play { level: 2 });
    }

    #[test]
    fn acknowledge_at_max_is_terminal() {
        let mut m = at_level(MAX_LEVEL);
        assert_eq!(m.acknowledge(), AckOutcome::Terminal);
        assert!(m.is_terminal());
        assert_eq!(m.beep_tick(), BeepOutcome::Stopped);
        assert_eq!(m.level_tick(), LevelOutcome::Stopped);
    }

    #[test]
    fn level_holds_at_max_without_wrapping() {
        let mut m = at_level(MAX_LEVEL);
        assert_eq!(
            m.level_tick(),
            LevelOutcome::Cycle {
                level: MAX_LEVEL,
                escalated: false
            }
        );
        assert_eq!(m.level(), Some(MAX_LEVEL));
    }

    #[test]
    fn level_cycle_resets_acknowledged() {
        // Acknowledge at max is terminal, so quiet the machine one level
        // below max and ride a cycle into it: beeping must resume.
        let mut m = at_level(MAX_LEVEL - 1);
        m.acknowledge();
        assert_eq!(m.beep_tick(), BeepOutcome::Suppressed { level: 3 });
        m.level_tick();
        assert_eq!(m.beep_tick(), BeepOutcome::Play { level: 4 });
    }

    #[test]
    fn cancel_is_terminal_and_idempotent() {
        let mut m = running_machine();
        assert!(m.cancel());
        assert!(!m.cancel());
        assert_eq!(m.acknowledge(), AckOutcome::Ignored);
        assert_eq!(m.beep_tick(), BeepOutcome::Stopped);
        assert_eq!(m.level_tick(), LevelOutcome::Stopped);
    }

    #[test]
    fn commands_while_idle_are_noops() {
        let mut m = EscalationMachine::new();
        assert_eq!(m.acknowledge(), AckOutcome::Ignored);
        assert!(!m.cancel());
        assert_eq!(m.beep_tick(), BeepOutcome::Stopped);
        assert_eq!(m.level_tick(), LevelOutcome::Stopped);
    }

    #[test]
    fn single_beep_is_disjoint_from_running() {
        let mut m = EscalationMachine::new();
        assert!(m.start_single_beep());
        assert_eq!(m.phase(), Phase::SingleBeep);
        // Escalation ticks have no meaning in this phase.
        assert_eq!(m.beep_tick(), BeepOutcome::Stopped);
        assert_eq!(m.level_tick(), LevelOutcome::Stopped);
        assert_eq!(m.acknowledge(), AckOutcome::Ignored);
        // Teardown is the ordinary cancel.
        assert!(m.cancel());
        assert!(m.is_terminal());
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        #[derive(Debug, Clone, Copy)]
        enum Op {
            Start,
            Acknowledge,
            Cancel,
            BeepTick,
            LevelTick,
        }

        fn op_strategy() -> impl Strategy<Value = Op> {
            prop_oneof![
                Just(Op::Start),
                Just(Op::Acknowledge),
                Just(Op::Cancel),
                Just(Op::BeepTick),
                Just(Op::LevelTick),
            ]
        }

        proptest! {
            /// For every operation sequence, the level never decreases and
            /// stays within [MIN_LEVEL, MAX_LEVEL].
            #[test]
            fn level_is_monotonic_and_bounded(ops in proptest::collection::vec(op_strategy(), 0..64)) {
                let mut m = EscalationMachine::new();
                let mut last_level = 0u8;
                for op in ops {
                    match op {
                        Op::Start => { m.start(); }
                        Op::Acknowledge => { m.acknowledge(); }
                        Op::Cancel => { m.cancel(); }
                        Op::BeepTick => { m.beep_tick(); }
                        Op::LevelTick => { m.level_tick(); }
                    }
                    if let Some(level) = m.level() {
                        prop_assert!((MIN_LEVEL..=MAX_LEVEL).contains(&level));
                        prop_assert!(level >= last_level);
                        last_level = level;
                    }
                }
            }

            /// Once cancelled, no tick ever reports a playable outcome again.
            #[test]
            fn terminal_phase_absorbs_everything(ops in proptest::collection::vec(op_strategy(), 0..64)) {
                let mut m = EscalationMachine::new();
                m.start();
                m.cancel();
                for op in ops {
                    match op {
                        Op::Start => { m.start(); }
                        Op::Acknowledge => { prop_assert_eq!(m.acknowledge(), AckOutcome::Ignored); }
                        Op::Cancel => { prop_assert!(!m.cancel()); }
                        Op::BeepTick => { prop_assert_eq!(m.beep_tick(), BeepOutcome::Stopped); }
                        Op::LevelTick => { prop_assert_eq!(m.level_tick(), LevelOutcome::Stopped); }
                    }
                    prop_assert!(m.is_terminal());
                }
            }
        }
    }
}
