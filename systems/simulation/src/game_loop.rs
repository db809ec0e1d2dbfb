//! Fixed real-time driver for the simulation.

use std::{
    ops::ControlFlow,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    thread,
    time::{Duration, Instant},
};

#[derive(Debug, Default)]
struct Flags {
    paused: AtomicBool,
    cancelled: AtomicBool,
}

/// Shareable pause and cancel handle for a [`GameLoop`].
#[derive(Clone, Debug, Default)]
pub struct LoopControl {
    flags: Arc<Flags>,
}

impl LoopControl {
    /// Creates a running, unpaused handle.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Suspends stepping; the loop keeps its cadence.
    pub fn pause(&self) {
        self.flags.paused.store(true, Ordering::SeqCst);
    }

    /// Resumes stepping.
    pub fn resume(&self) {
        self.flags.paused.store(false, Ordering::SeqCst);
    }

    /// Reports whether stepping is suspended.
    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.flags.paused.load(Ordering::SeqCst)
    }

    /// Makes the loop return before its next step.
    pub fn cancel(&self) {
        self.flags.cancelled.store(true, Ordering::SeqCst);
    }

    /// Reports whether the loop was cancelled.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.flags.cancelled.load(Ordering::SeqCst)
    }
}

/// Calls a step closure once per interval of wall-clock time.
#[derive(Debug)]
pub struct GameLoop {
    interval: Duration,
    control: LoopControl,
}

impl GameLoop {
    /// Creates a loop with the given step interval.
    #[must_use]
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            control: LoopControl::new(),
        }
    }

    /// Handle that pauses or cancels this loop from another thread.
    #[must_use]
    pub fn control(&self) -> LoopControl {
        self.control.clone()
    }

    /// Runs until cancelled or until `step` breaks. Returns the number of
    /// steps taken.
    ///
    /// Late steps are not replayed; the next deadline is rebased on the
    /// current time when the loop falls behind.
    pub fn run<F>(&self, mut step: F) -> u64
    where
        F: FnMut() -> ControlFlow<()>,
    {
        let mut steps = 0_u64;
        let mut deadline = Instant::now();
        while !self.control.is_cancelled() {
            if !self.control.is_paused() {
                steps += 1;
                if step().is_break() {
                    break;
                }
            }
            deadline += self.interval;
            let now = Instant::now();
            if deadline > now {
                thread::sleep(deadline - now);
            } else {
                deadline = now;
            }
        }
        log::debug!("game loop finished after {steps} steps");
        steps
    }
}

#[cfg(test)]
mod tests {
    use super::GameLoop;
    use std::{ops::ControlFlow, time::Duration};

    #[test]
    fn stops_when_the_step_breaks() {
        let game_loop = GameLoop::new(Duration::from_millis(1));
        let mut remaining = 3;
        let steps = game_loop.run(|| {
            remaining -= 1;
            if remaining == 0 {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        });
        assert_eq!(steps, 3);
    }

    #[test]
    fn cancelled_loop_never_steps() {
        let game_loop = GameLoop::new(Duration::from_millis(1));
        game_loop.control().cancel();
        assert_eq!(game_loop.run(|| ControlFlow::Continue(())), 0);
    }

    #[test]
    fn paused_loop_skips_steps_until_cancelled() {
        let game_loop = GameLoop::new(Duration::from_millis(1));
        let control = game_loop.control();
        control.pause();
        let canceller = std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(30));
            control.cancel();
        });
        let mut calls = 0;
        let steps = game_loop.run(|| {
            calls += 1;
            ControlFlow::Continue(())
        });
        canceller.join().expect("canceller thread");
        assert_eq!(steps, 0);
        assert_eq!(calls, 0);
    }
}
