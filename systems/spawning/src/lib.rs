#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Concurrent spawn scheduler.
//!
//! Every enabled enemy kind of a wave gets its own worker thread. Workers
//! never touch the enemy arena: they push [`Command::SpawnEnemy`] proposals
//! into a channel that the simulation thread drains once per tick. Each
//! proposal carries the wave it was made for, so the world can discard
//! stragglers that arrive after a wave boundary.

use std::{
    f32::consts::TAU,
    sync::{
        atomic::{AtomicBool, Ordering},
        mpsc::{self, Receiver, RecvTimeoutError, Sender},
        Arc, Condvar, Mutex, PoisonError, RwLock,
    },
    thread::{self, JoinHandle},
    time::{Duration, Instant},
};

use arena_siege_core::{BossKind, Command, EnemyKind, EnemyRoster, SpawnRate, SpawnTuning, Viewport};
use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use thiserror::Error;

/// Failures reported by the spawn scheduler.
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// Workers for a previous wave are still running.
    #[error("spawn workers for wave {wave} are still running")]
    AlreadyRunning {
        /// Wave the running workers belong to.
        wave: u32,
    },
    /// A worker thread could not be started.
    #[error("failed to start spawn worker for {kind:?}")]
    Spawn {
        /// Kind the worker would have produced.
        kind: EnemyKind,
        /// Underlying operating-system error.
        #[source]
        source: std::io::Error,
    },
    /// The simulation side of the proposal channel is gone.
    #[error("spawn proposal channel disconnected")]
    Disconnected,
    /// Some workers did not acknowledge the stop request in time.
    #[error("{stragglers} spawn workers did not stop within {timeout:?}")]
    ShutdownTimedOut {
        /// Workers left detached.
        stragglers: usize,
        /// Timeout that elapsed.
        timeout: Duration,
    },
}

/// Picks a point on the annulus just outside the viewport.
///
/// The inner radius is the viewport half-diagonal plus `margin`, so every
/// returned point lies outside the visible area.
pub fn spawn_point_on_ring<R: Rng>(viewport: &Viewport, margin: f32, depth: f32, rng: &mut R) -> Vec2 {
    let inner = viewport.half_diagonal() + margin.max(0.0);
    let radius = if depth > 0.0 {
        rng.gen_range(inner..inner + depth)
    } else {
        inner
    };
    let angle = rng.gen_range(0.0..TAU);
    viewport.center() + Vec2::from_angle(angle) * radius
}

/// State shared between the scheduler and the workers of one wave.
#[derive(Debug, Default)]
struct Control {
    stopped: Mutex<bool>,
    wake: Condvar,
}

impl Control {
    fn is_stopped(&self) -> bool {
        *self.stopped.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn stop(&self) {
        *self.stopped.lock().unwrap_or_else(PoisonError::into_inner) = true;
        self.wake.notify_all();
    }

    /// Sleeps until `deadline` or a stop request; returns `true` when stopped.
    fn sleep_until(&self, deadline: Instant) -> bool {
        let guard = self.stopped.lock().unwrap_or_else(PoisonError::into_inner);
        let timeout = deadline.saturating_duration_since(Instant::now());
        let (guard, _) = self
            .wake
            .wait_timeout_while(guard, timeout, |stopped| {
                !*stopped && Instant::now() < deadline
            })
            .unwrap_or_else(PoisonError::into_inner);
        *guard
    }
}

#[derive(Debug)]
struct Worker {
    kind: EnemyKind,
    handle: JoinHandle<()>,
}

#[derive(Debug)]
struct Run {
    wave: u32,
    control: Arc<Control>,
    workers: Vec<Worker>,
    finished: Receiver<EnemyKind>,
}

/// Everything a worker thread needs, moved into the thread on start.
struct WorkerContext {
    kind: EnemyKind,
    wave: u32,
    interval: Duration,
    margin: f32,
    depth: f32,
    rng: ChaCha8Rng,
    proposals: Sender<Command>,
    finished: Sender<EnemyKind>,
    viewport: Arc<RwLock<Viewport>>,
    paused: Arc<AtomicBool>,
    control: Arc<Control>,
}

impl WorkerContext {
    fn run(mut self) {
        log::trace!("{:?} worker for wave {} started", self.kind, self.wave);
        let mut deadline = Instant::now();
        loop {
            if self.control.is_stopped() {
                break;
            }
            if !self.paused.load(Ordering::Acquire) {
                let viewport = *self.viewport.read().unwrap_or_else(PoisonError::into_inner);
                let position = spawn_point_on_ring(&viewport, self.margin, self.depth, &mut self.rng);
                let proposal = Command::SpawnEnemy {
                    kind: self.kind,
                    position,
                    wave: self.wave,
                };
                if self.proposals.send(proposal).is_err() {
                    log::debug!("{:?} worker lost its channel", self.kind);
                    break;
                }
            }
            deadline += self.interval;
            if self.control.sleep_until(deadline) {
                break;
            }
        }
        let _ = self.finished.send(self.kind);
    }
}

/// Spawns regular enemies on background workers and bosses on demand.
#[derive(Debug)]
pub struct SpawnScheduler {
    proposals: Sender<Command>,
    tuning: SpawnTuning,
    seed: u64,
    viewport: Arc<RwLock<Viewport>>,
    paused: Arc<AtomicBool>,
    rng: ChaCha8Rng,
    run: Option<Run>,
}

impl SpawnScheduler {
    /// Creates an idle scheduler that sends proposals through `proposals`.
    #[must_use]
    pub fn new(proposals: Sender<Command>, tuning: SpawnTuning, seed: u64) -> Self {
        Self {
            proposals,
            tuning,
            seed,
            viewport: Arc::new(RwLock::new(Viewport::default())),
            paused: Arc::new(AtomicBool::new(false)),
            rng: ChaCha8Rng::seed_from_u64(seed ^ 0xb055),
            run: None,
        }
    }

    /// Replaces the view bounds workers place proposals around.
    pub fn set_viewport(&self, viewport: Viewport) {
        *self.viewport.write().unwrap_or_else(PoisonError::into_inner) = viewport;
    }

    /// Starts one worker per enabled rate for `wave`.
    ///
    /// Boss kinds and non-positive rates are skipped.
    pub fn start(&mut self, wave: u32, rates: &[SpawnRate]) -> Result<(), SchedulerError> {
        if let Some(run) = &self.run {
            return Err(SchedulerError::AlreadyRunning { wave: run.wave });
        }

        let control = Arc::new(Control::default());
        let (finished_tx, finished_rx) = mpsc::channel();
        let mut run = Run {
            wave,
            control: Arc::clone(&control),
            workers: Vec::new(),
            finished: finished_rx,
        };

        for rate in rates {
            if rate.kind.is_boss() {
                log::warn!("ignoring worker rate for boss kind {:?}", rate.kind);
                continue;
            }
            let Some(interval) = rate.interval() else {
                continue;
            };
            let context = WorkerContext {
                kind: rate.kind,
                wave,
                interval,
                margin: self.tuning.ring_margin,
                depth: self.tuning.ring_depth,
                rng: ChaCha8Rng::seed_from_u64(self.worker_seed(wave, rate.kind)),
                proposals: self.proposals.clone(),
                finished: finished_tx.clone(),
                viewport: Arc::clone(&self.viewport),
                paused: Arc::clone(&self.paused),
                control: Arc::clone(&control),
            };
            let spawned = thread::Builder::new()
                .name(format!("spawn-{:?}", rate.kind).to_lowercase())
                .spawn(move || context.run());
            match spawned {
                Ok(handle) => run.workers.push(Worker {
                    kind: rate.kind,
                    handle,
                }),
                Err(source) => {
                    self.run = Some(run);
                    if let Err(error) = self.stop() {
                        log::warn!("failed to stop partially started workers: {error}");
                    }
                    return Err(SchedulerError::Spawn {
                        kind: rate.kind,
                        source,
                    });
                }
            }
        }

        log::debug!("started {} spawn workers for wave {wave}", run.workers.len());
        self.run = Some(run);
        Ok(())
    }

    /// Suspends proposals without terminating workers.
    pub fn pause(&self) {
        self.paused.store(true, Ordering::Release);
    }

    /// Lets workers propose again.
    pub fn resume(&self) {
        self.paused.store(false, Ordering::Release);
    }

    /// Reports whether proposals are suspended.
    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::Acquire)
    }

    /// Reports whether workers are running.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.run.is_some()
    }

    /// Number of workers started for the active wave.
    #[must_use]
    pub fn worker_count(&self) -> usize {
        self.run.as_ref().map_or(0, |run| run.workers.len())
    }

    /// Interrupts every worker and waits for them up to the shutdown timeout.
    ///
    /// The scheduler is idle and reusable afterwards even when some workers
    /// had to be left detached.
    pub fn stop(&mut self) -> Result<(), SchedulerError> {
        let Some(run) = self.run.take() else {
            return Ok(());
        };
        run.control.stop();

        let timeout = self.tuning.shutdown_timeout;
        let deadline = Instant::now() + timeout;
        let mut pending = run.workers.len();
        while pending > 0 {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match run.finished.recv_timeout(remaining) {
                Ok(kind) => {
                    log::trace!("{kind:?} worker for wave {} finished", run.wave);
                    pending -= 1;
                }
                Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => break,
            }
        }

        if pending > 0 {
            log::warn!("{pending} spawn workers for wave {} did not stop within {timeout:?}", run.wave);
            return Err(SchedulerError::ShutdownTimedOut {
                stragglers: pending,
                timeout,
            });
        }

        for worker in run.workers {
            if worker.handle.join().is_err() {
                log::warn!("{:?} spawn worker panicked", worker.kind);
            }
        }
        log::debug!("spawn workers for wave {} stopped", run.wave);
        Ok(())
    }

    /// Proposes a single boss near `player` with hit points scaled by `wave`.
    pub fn spawn_boss(
        &mut self,
        kind: BossKind,
        wave: u32,
        player: Vec2,
        roster: &EnemyRoster,
    ) -> Result<(), SchedulerError> {
        let profile = roster.profile(EnemyKind::from(kind));
        let hit_points = boss_hit_points(profile.hit_points, wave);
        let angle = self.rng.gen_range(0.0..TAU);
        let position = player + Vec2::from_angle(angle) * self.tuning.boss_offset;
        log::info!("proposing boss {kind:?} for wave {wave} with {hit_points:.0} hit points");
        self.proposals
            .send(Command::SpawnBoss {
                kind,
                position,
                hit_points,
                wave,
            })
            .map_err(|_| SchedulerError::Disconnected)
    }

    fn worker_seed(&self, wave: u32, kind: EnemyKind) -> u64 {
        self.seed
            .wrapping_add(u64::from(wave).wrapping_mul(0x9e37_79b9_7f4a_7c15))
            .rotate_left(kind as u32 * 7 + 1)
    }
}

impl Drop for SpawnScheduler {
    fn drop(&mut self) {
        if let Err(error) = self.stop() {
            log::warn!("spawn scheduler dropped uncleanly: {error}");
        }
    }
}

/// Boss hit points for `wave`: the base value times the wave number.
#[must_use]
pub fn boss_hit_points(base: f32, wave: u32) -> f32 {
    base * wave.max(1) as f32
}
