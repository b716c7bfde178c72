//! Rhythm Engine
//!
//! [`RhythmState`] is the pure per-kind state machine: one call to
//! `activate` when a track starts, then one `tick` per elapsed period.
//! [`RhythmEngine`] owns the periodic driver that feeds ticks into a
//! transport. It holds at most one driver; starting a new one or calling
//! `invalidate` cancels the previous one first.

use crate::error::{PlaybackError, Result};
use crate::transport::{lock_transport, AudioTransport, SharedTransport};
use crate::types::{RhythmConfig, StitchMode};
use rhythmic_core::RhythmKind;
use std::f64::consts::TAU;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::debug;

/// Callback receiving `current_time / duration` on every tick
pub type ProgressObserver = Arc<dyn Fn(f64) + Send + Sync>;

/// Mutation produced by a rhythm step
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RhythmChange {
    Pan(f32),
    Volume(f32),
}

impl RhythmChange {
    pub fn apply(self, transport: &mut dyn AudioTransport) {
        match self {
            RhythmChange::Pan(pan) => transport.set_pan(pan),
            RhythmChange::Volume(volume) => transport.set_volume(volume),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Left,
    Right,
}

impl Side {
    fn opposite(self) -> Self {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }

    fn sign(self) -> f32 {
        match self {
            Side::Left => -1.0,
            Side::Right => 1.0,
        }
    }
}

/// Per-track rhythm state machine
#[derive(Debug, Clone)]
pub struct RhythmState {
    kind: RhythmKind,
    config: RhythmConfig,
    pan: f32,
    volume: f32,
    /// Hard side most recently visited by Crosspan
    last_side: Side,
    /// Crosspan sits in its center phase
    centered: bool,
    /// Stitch sine phase in radians
    wavelength: f64,
    ticks: u64,
}

impl RhythmState {
    pub fn new(kind: RhythmKind, config: RhythmConfig) -> Self {
        Self {
            kind,
            config,
            pan: 0.0,
            volume: 1.0,
            last_side: Side::Left,
            centered: false,
            wavelength: 0.0,
            ticks: 0,
        }
    }

    pub fn kind(&self) -> RhythmKind {
        self.kind
    }

    /// Last pan value produced
    pub fn pan(&self) -> f32 {
        self.pan
    }

    /// Last volume value produced
    pub fn volume(&self) -> f32 {
        self.volume
    }

    /// Ticks since activation
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Initial value applied when playback starts
    pub fn activate(&mut self) -> RhythmChange {
        self.ticks = 0;
        match self.kind {
            RhythmKind::Bilateral => self.set_pan(-1.0),
            RhythmKind::Crosspan => {
                self.last_side = Side::Left;
                self.centered = false;
                self.set_pan(-self.config.crosspan_bias)
            }
            RhythmKind::Synthesis => self.set_pan(0.0),
            RhythmKind::Stitch => match self.config.stitch_mode {
                StitchMode::Sine => {
                    self.wavelength = 0.0;
                    self.set_volume(sine_volume(0.0))
                }
                StitchMode::Gate => self.set_volume(1.0),
            },
        }
    }

    /// Advance one period; `None` means nothing to apply this tick
    pub fn tick(&mut self) -> Option<RhythmChange> {
        self.ticks += 1;
        match self.kind {
            RhythmKind::Bilateral => Some(self.set_pan(-self.pan)),
            RhythmKind::Crosspan => {
                let pan = if self.centered {
                    self.last_side = self.last_side.opposite();
                    self.last_side.sign() * self.config.crosspan_bias
                } else {
                    self.config.crosspan_center
                };
                self.centered = !self.centered;
                Some(self.set_pan(pan))
            }
            RhythmKind::Synthesis => None,
            RhythmKind::Stitch => match self.config.stitch_mode {
                StitchMode::Sine => {
                    self.wavelength = (self.wavelength + self.config.stitch_step) % TAU;
                    let wave = self.wavelength.sin();
                    (wave.abs() < self.config.stitch_clamp)
                        .then(|| self.set_volume(sine_volume(wave)))
                }
                StitchMode::Gate => {
                    let volume = if self.volume >= 1.0 {
                        self.config.stitch_floor
                    } else {
                        1.0
                    };
                    Some(self.set_volume(volume))
                }
            },
        }
    }

    fn set_pan(&mut self, pan: f32) -> RhythmChange {
        self.pan = pan;
        RhythmChange::Pan(pan)
    }

    fn set_volume(&mut self, volume: f32) -> RhythmChange {
        self.volume = volume;
        RhythmChange::Volume(volume)
    }
}

/// Map a sine sample in [-1, 1] onto volume in [0, 1]
fn sine_volume(wave: f64) -> f32 {
    ((1.0 + wave) / 2.0) as f32
}

/// Running periodic driver; dropping it cancels the task
struct RhythmDriver {
    kind: RhythmKind,
    interval: Duration,
    cancelled: Arc<AtomicBool>,
    task: JoinHandle<()>,
}

impl Drop for RhythmDriver {
    fn drop(&mut self) {
        self.cancelled.store(true, Ordering::SeqCst);
        self.task.abort();
    }
}

/// Owner of the single periodic rhythm driver
pub struct RhythmEngine {
    config: RhythmConfig,
    driver: Option<RhythmDriver>,
    progress: Arc<Mutex<Option<ProgressObserver>>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl RhythmEngine {
    pub fn new(config: RhythmConfig) -> Self {
        Self {
            config,
            driver: None,
            progress: Arc::new(Mutex::new(None)),
        }
    }

    pub fn config(&self) -> &RhythmConfig {
        &self.config
    }

    /// Install or clear the progress observer, including for a running driver
    pub fn set_progress_observer(&self, observer: Option<ProgressObserver>) {
        *lock(&self.progress) = observer;
    }

    /// Apply `kind`'s initial value to `transport` and tick every `interval`
    ///
    /// Any running driver is invalidated first. The first tick fires one
    /// full interval after the call.
    ///
    /// # Errors
    /// `InvalidPeriod` for a zero interval, `NoRuntime` outside tokio
    pub fn start(
        &mut self,
        kind: RhythmKind,
        interval: Duration,
        transport: SharedTransport,
    ) -> Result<()> {
        self.invalidate();

        if interval.is_zero() {
            return Err(PlaybackError::InvalidPeriod(interval.as_secs_f64()));
        }
        let runtime = tokio::runtime::Handle::try_current().map_err(|_| PlaybackError::NoRuntime)?;

        let mut state = RhythmState::new(kind, self.config.clone());
        state.activate().apply(&mut **lock_transport(&transport));

        let cancelled = Arc::new(AtomicBool::new(false));
        let task = runtime.spawn(drive(
            state,
            Instant::now() + interval,
            interval,
            transport,
            self.progress.clone(),
            cancelled.clone(),
        ));

        debug!(?kind, interval_ms = interval.as_millis() as u64, "Rhythm started");
        self.driver = Some(RhythmDriver {
            kind,
            interval,
            cancelled,
            task,
        });
        Ok(())
    }

    /// Cancel the running driver; `false` if none was running
    pub fn invalidate(&mut self) -> bool {
        match self.driver.take() {
            Some(driver) => {
                debug!(kind = ?driver.kind, "Rhythm invalidated");
                true
            }
            None => false,
        }
    }

    pub fn is_running(&self) -> bool {
        self.driver.is_some()
    }

    pub fn kind(&self) -> Option<RhythmKind> {
        self.driver.as_ref().map(|d| d.kind)
    }

    pub fn interval(&self) -> Option<Duration> {
        self.driver.as_ref().map(|d| d.interval)
    }
}

impl fmt::Debug for RhythmEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RhythmEngine")
            .field("config", &self.config)
            .field("kind", &self.kind())
            .field("interval", &self.interval())
            .finish()
    }
}

async fn drive(
    mut state: RhythmState,
    first_tick: Instant,
    interval: Duration,
    transport: SharedTransport,
    progress: Arc<Mutex<Option<ProgressObserver>>>,
    cancelled: Arc<AtomicBool>,
) {
    let mut ticker = time::interval_at(first_tick, interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;

        let fraction = {
            let mut transport = lock_transport(&transport);
            // Checked under the transport lock so an invalidated driver never writes
            if cancelled.load(Ordering::SeqCst) {
                return;
            }
            if let Some(change) = state.tick() {
                change.apply(&mut **transport);
            }
            progress_fraction(&**transport)
        };

        let observer = lock(&progress).clone();
        if let Some(observer) = observer {
            observer(fraction);
        }
    }
}

fn progress_fraction(transport: &dyn AudioTransport) -> f64 {
    let duration = transport.duration();
    if duration.is_zero() {
        return 0.0;
    }
    transport.current_time().as_secs_f64() / duration.as_secs_f64()
}
