use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use log::{debug, warn};
use tokio::runtime::Handle;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use super::render_device::RenderDevice;
use crate::camera::{CameraTransform, SharedCamera};
use crate::error::FrameError;
use crate::frame::{EncodedFrame, FrameInfo};
use crate::protocol::ServerMessage;
use crate::scene::Scene;
use crate::traits::FrameCodec;

/// Default tick period: 10 frames per second
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(100);

/// Result of asking the pipeline for one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Work was handed to a blocking worker
    Started(FrameInfo),
    /// The previous tick is still in flight
    Skipped,
    /// No loop is running
    NotRunning,
}

/// Counters since the pipeline was created
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineStats {
    pub started: u64,
    pub skipped: u64,
    pub delivered: u64,
    pub failed: u64,
    /// Encoded but not delivered: channel full or closed, or the loop was stopped
    pub dropped: u64,
}

#[derive(Default)]
struct Counters {
    started: AtomicU64,
    skipped: AtomicU64,
    delivered: AtomicU64,
    failed: AtomicU64,
    dropped: AtomicU64,
}

impl Counters {
    fn snapshot(&self) -> PipelineStats {
        PipelineStats {
            started: self.started.load(Ordering::Relaxed),
            skipped: self.skipped.load(Ordering::Relaxed),
            delivered: self.delivered.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
        }
    }
}

/// State of one start..stop span
struct RunningLoop {
    generation: u64,
    scene: Arc<Scene>,
    camera: SharedCamera,
    cancel: CancellationToken,
    runtime: Handle,
}

struct Inner {
    device: Arc<RenderDevice>,
    codec: Arc<dyn FrameCodec>,
    outbound: mpsc::Sender<ServerMessage>,
    /// Outlives individual runs so a restart cannot overlap a tick of the previous run
    in_flight: AtomicBool,
    generations: AtomicU64,
    counters: Counters,
    running: Mutex<Option<RunningLoop>>,
}

/// Timer-driven render, readback, encode and deliver loop for one session
///
/// At most one tick is in flight at a time. A tick that comes due while the
/// previous one is still working is skipped, never queued. Once [`stop`]
/// returns no further frame reaches the outbound channel.
///
/// [`stop`]: FramePipeline::stop
pub struct FramePipeline {
    inner: Arc<Inner>,
}

impl FramePipeline {
    pub fn new(
        device: Arc<RenderDevice>,
        codec: Arc<dyn FrameCodec>,
        outbound: mpsc::Sender<ServerMessage>,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                device,
                codec,
                outbound,
                in_flight: AtomicBool::new(false),
                generations: AtomicU64::new(0),
                counters: Counters::default(),
                running: Mutex::new(None),
            }),
        }
    }

    /// Start ticking every `interval`, replacing any loop already running.
    ///
    /// The first tick fires one interval after this call. Must be called from
    /// within a tokio runtime.
    pub fn start(&self, scene: Arc<Scene>, camera: SharedCamera, interval: Duration) {
        let period = interval.max(Duration::from_millis(1));
        let generation = self.inner.generations.fetch_add(1, Ordering::Relaxed) + 1;
        let cancel = CancellationToken::new();
        let runtime = Handle::current();

        {
            let mut running = self.inner.lock_running();
            if let Some(previous) = running.take() {
                previous.cancel.cancel();
            }
            debug!(
                "Starting frame loop {generation} for scene '{}' every {period:?}",
                scene.name()
            );
            *running = Some(RunningLoop {
                generation,
                scene,
                camera,
                cancel: cancel.clone(),
                runtime: runtime.clone(),
            });
        }

        runtime.spawn(run_timer(Arc::downgrade(&self.inner), generation, cancel, period));
    }

    /// Cancel the timer. Safe to call repeatedly and from any thread.
    ///
    /// A tick already in flight finishes its work but its frame is discarded.
    pub fn stop(&self) {
        if let Some(stopped) = self.inner.lock_running().take() {
            stopped.cancel.cancel();
            debug!("Stopped frame loop {}", stopped.generation);
        }
    }

    /// Run one tick now, as the timer would
    pub fn fire(&self) -> TickOutcome {
        self.inner.fire(None)
    }

    pub fn is_running(&self) -> bool {
        self.inner.lock_running().is_some()
    }

    /// Whether a tick is currently rendering or encoding
    pub fn is_busy(&self) -> bool {
        self.inner.in_flight.load(Ordering::Acquire)
    }

    pub fn stats(&self) -> PipelineStats {
        self.inner.counters.snapshot()
    }
}

impl Drop for FramePipeline {
    fn drop(&mut self) {
        self.stop();
    }
}

impl Inner {
    fn lock_running(&self) -> MutexGuard<'_, Option<RunningLoop>> {
        self.running.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// `generation` pins a timer to the run that spawned it; `None` fires whatever is running
    fn fire(self: &Arc<Self>, generation: Option<u64>) -> TickOutcome {
        let running = self.lock_running();
        let Some(active) = running.as_ref() else {
            return TickOutcome::NotRunning;
        };
        if generation.is_some_and(|g| g != active.generation) {
            return TickOutcome::NotRunning;
        }

        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            self.counters.skipped.fetch_add(1, Ordering::Relaxed);
            debug!("Tick skipped, previous frame still in flight");
            return TickOutcome::Skipped;
        }

        let claim = InFlight(self.clone());
        let info = FrameInfo {
            number: self.counters.started.fetch_add(1, Ordering::Relaxed),
        };
        let camera = active
            .camera
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .transform();

        let tick = Tick {
            claim,
            generation: active.generation,
            scene: active.scene.clone(),
            camera,
            info,
        };
        active.runtime.spawn_blocking(move || tick.run());

        TickOutcome::Started(info)
    }

    fn produce(&self, scene: &Scene, camera: &CameraTransform, info: FrameInfo) -> Result<EncodedFrame, FrameError> {
        let bitmap = self.device.capture(scene, camera)?;
        let bytes = self.codec.encode(&bitmap)?;
        Ok(EncodedFrame { info, bytes })
    }

    fn deliver(&self, generation: u64, frame: EncodedFrame) {
        // Holding the run lock across try_send orders delivery against stop()
        let running = self.lock_running();
        if !running.as_ref().is_some_and(|r| r.generation == generation) {
            self.counters.dropped.fetch_add(1, Ordering::Relaxed);
            debug!("Discarding frame {} from a stopped loop", frame.info.number);
            return;
        }

        match self.outbound.try_send(ServerMessage::Image(frame.bytes)) {
            Ok(()) => {
                self.counters.delivered.fetch_add(1, Ordering::Relaxed);
            }
            Err(TrySendError::Full(_)) => {
                self.counters.dropped.fetch_add(1, Ordering::Relaxed);
                debug!("Outbound channel full, dropping frame {}", frame.info.number);
            }
            Err(TrySendError::Closed(_)) => {
                self.counters.dropped.fetch_add(1, Ordering::Relaxed);
                debug!("Outbound channel closed, dropping frame {}", frame.info.number);
            }
        }
    }
}

/// Work for one tick, run on a blocking worker
///
/// Owns the in-flight claim, so the flag clears when the tick is dropped,
/// whether it ran, panicked or was discarded by a shutting down runtime.
struct Tick {
    claim: InFlight,
    generation: u64,
    scene: Arc<Scene>,
    camera: CameraTransform,
    info: FrameInfo,
}

impl Tick {
    fn run(self) {
        let pipeline = &self.claim.0;
        match pipeline.produce(&self.scene, &self.camera, self.info) {
            Ok(frame) => pipeline.deliver(self.generation, frame),
            Err(err) => {
                pipeline.counters.failed.fetch_add(1, Ordering::Relaxed);
                warn!("Frame {} failed: {err}", self.info.number);
            }
        }
    }
}

/// Claim on the pipeline's single in-flight slot
struct InFlight(Arc<Inner>);

impl Drop for InFlight {
    fn drop(&mut self) {
        self.0.in_flight.store(false, Ordering::Release);
    }
}

async fn run_timer(pipeline: Weak<Inner>, generation: u64, cancel: CancellationToken, period: Duration) {
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {
                let Some(pipeline) = pipeline.upgrade() else { break };
                if pipeline.fire(Some(generation)) == TickOutcome::NotRunning {
                    break;
                }
            }
        }
    }
    debug!("Frame timer {generation} exited");
}
