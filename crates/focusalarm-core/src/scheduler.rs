//! Delayed message delivery.
//!
//! Timers here do not run callbacks. Each scheduled timer is a task that
//! sleeps and then *sends a message* into the engine's single command
//! queue, so every tick is processed on the engine task in total order
//! with user commands. A repeating timer is a self-rescheduling one-shot:
//! it commits to the next period only after checking it is still alive,
//! and the receiver re-checks engine state at the start of every tick.
//!
//! [`TimerHandle::cancel`] guarantees no further message is sent on behalf
//! of that handle, even when a sleep has already elapsed: the flag is
//! checked after waking and the task is aborted. A tick that was already
//! *queued* is the receiver's problem, which is why tick handlers check
//! the terminal phase first.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Handle to a scheduled timer. Dropping the handle cancels the timer,
/// so an owner that goes away cannot leak ticks.
#[derive(Debug)]
pub struct TimerHandle {
    alive: Arc<AtomicBool>,
    task: JoinHandle<()>,
}

impl TimerHandle {
    /// Stop the timer. No message is sent for this handle afterwards.
    /// Idempotent.
    pub fn cancel(&self) {
        self.alive.store(false, Ordering::SeqCst);
        self.task.abort();
    }

    pub fn is_cancelled(&self) -> bool {
        !self.alive.load(Ordering::SeqCst)
    }
}

impl Drop for TimerHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Send `msg` once after `delay`.
pub fn schedule_once<M: Send + 'static>(
    tx: &mpsc::Sender<M>,
    delay: Duration,
    msg: M,
) -> TimerHandle {
    let alive = Arc::new(AtomicBool::new(true));
    let task = tokio::spawn({
        let alive = Arc::clone(&alive);
        let tx = tx.clone();
        async move {
            tokio::time::sleep(delay).await;
            if alive.load(Ordering::SeqCst) {
                let _ = tx.send(msg).await;
            }
        }
    });
    TimerHandle { alive, task }
}

/// Send `msg` after `initial_delay`, then again every `period`, until the
/// handle is cancelled or the receiver goes away.
pub fn schedule_repeating<M: Clone + Send + 'static>(
    tx: &mpsc::Sender<M>,
    initial_delay: Duration,
    period: Duration,
    msg: M,
) -> TimerHandle {
    let alive = Arc::new(AtomicBool::new(true));
    let task = tokio::spawn({
        let alive = Arc::clone(&alive);
        let tx = tx.clone();
        async move {
            let mut delay = initial_delay;
            loop {
                tokio::time::sleep(delay).await;
                if !alive.load(Ordering::SeqCst) {
                    break;
                }
                if tx.send(msg.clone()).await.is_err() {
                    break;
                }
                delay = period;
            }
        }
    });
    TimerHandle { alive, task }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn once_fires_after_delay() {
        let (tx, mut rx) = mpsc::channel::<u32>(8);
        let _handle = schedule_once(&tx, Duration::from_secs(5), 7);
        assert_eq!(rx.recv().await, Some(7));
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_once_never_fires() {
        let (tx, mut rx) = mpsc::channel::<u32>(8);
        let handle = schedule_once(&tx, Duration::from_secs(5), 7);
        handle.cancel();
        drop(tx);
        assert_eq!(rx.recv().await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn repeating_fires_on_schedule() {
        let (tx, mut rx) = mpsc::channel::<&'static str>(8);
        let handle = schedule_repeating(
            &tx,
            Duration::ZERO,
            Duration::from_secs(3),
            "tick",
        );
        assert_eq!(rx.recv().await, Some("tick"));
        assert_eq!(rx.recv().await, Some("tick"));
        assert_eq!(rx.recv().await, Some("tick"));
        handle.cancel();
        drop(tx);
        assert_eq!(rx.recv().await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn drop_cancels() {
        let (tx, mut rx) = mpsc::channel::<u32>(8);
        let handle = schedule_repeating(&tx, Duration::ZERO, Duration::from_secs(1), 1);
        assert_eq!(rx.recv().await, Some(1));
        drop(handle);
        drop(tx);
        assert_eq!(rx.recv().await, None);
    }
}
