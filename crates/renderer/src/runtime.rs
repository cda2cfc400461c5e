use std::time::{Duration, Instant};

/// High-level behaviour requested by the caller.
///
/// The render policy decides whether frames should animate continuously or be
/// evaluated once at a fixed timestamp.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderPolicy {
    /// Run the render loop continuously, optionally clamping the frame rate.
    Animate {
        /// Optional requested frames-per-second cap.
        target_fps: Option<f32>,
    },
    /// Render a single still frame at an optional timestamp.
    Still {
        /// Specific timestamp to evaluate the shader at (seconds).
        time: Option<f32>,
    },
}

impl Default for RenderPolicy {
    fn default() -> Self {
        Self::Animate { target_fps: None }
    }
}

/// File formats supported by the still export path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Png,
}

/// Snapshot of the time state supplied to the shader uniforms.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeSample {
    /// Elapsed wall-clock or simulated time in seconds.
    pub seconds: f32,
    /// Monotonic frame counter for the running session.
    pub frame_index: u64,
}

impl TimeSample {
    pub fn new(seconds: f32, frame_index: u64) -> Self {
        Self {
            seconds,
            frame_index,
        }
    }
}

/// Abstraction over where time values originate from.
pub trait TimeSource: Send {
    /// Produces a time sample for the next frame.
    fn sample(&mut self) -> TimeSample;
}

/// Time source backed by the system monotonic clock.
///
/// The origin is captured lazily on the first sample so the clock starts at
/// the first frame rather than at window creation.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemTimeSource {
    origin: Option<Instant>,
    frame: u64,
}

impl SystemTimeSource {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TimeSource for SystemTimeSource {
    fn sample(&mut self) -> TimeSample {
        let origin = *self.origin.get_or_insert_with(Instant::now);
        let sample = TimeSample::new(origin.elapsed().as_secs_f32(), self.frame);
        self.frame = self.frame.saturating_add(1);
        sample
    }
}

/// Time source that always reports a fixed timestamp.
#[derive(Debug, Clone, Copy)]
pub struct FixedTimeSource {
    time: f32,
    frame: u64,
}

impl FixedTimeSource {
    pub fn new(time: f32) -> Self {
        Self { time, frame: 0 }
    }
}

impl TimeSource for FixedTimeSource {
    fn sample(&mut self) -> TimeSample {
        let sample = TimeSample::new(self.time, self.frame);
        self.frame = self.frame.saturating_add(1);
        sample
    }
}

pub type BoxedTimeSource = Box<dyn TimeSource + Send>;

/// Builds a time source suited to the requested render policy.
pub fn time_source_for_policy(policy: &RenderPolicy) -> BoxedTimeSource {
    match policy {
        RenderPolicy::Animate { .. } => Box::new(SystemTimeSource::new()),
        RenderPolicy::Still { time } => Box::new(FixedTimeSource::new(time.unwrap_or(0.0))),
    }
}

/// Decides when the next redraw should be requested.
///
/// Uncapped animation asks for a frame on every event-loop turn and lets the
/// presentation mode pace it; a frame cap spaces redraws by `1 / fps`; still
/// policies render exactly once.
#[derive(Debug, Clone)]
pub struct FrameScheduler {
    policy: RenderPolicy,
    last_render: Option<Instant>,
}

impl FrameScheduler {
    pub fn new(policy: RenderPolicy) -> Self {
        Self {
            policy,
            last_render: None,
        }
    }

    /// Minimum spacing between frames, if the policy caps the frame rate.
    pub fn frame_interval(&self) -> Option<Duration> {
        match self.policy {
            RenderPolicy::Animate {
                target_fps: Some(fps),
            } if fps > 0.0 && fps.is_finite() => Some(Duration::from_secs_f32(1.0 / fps)),
            _ => None,
        }
    }

    pub fn ready_for_frame(&self, now: Instant) -> bool {
        match (&self.policy, self.last_render) {
            (_, None) => true,
            (RenderPolicy::Still { .. }, Some(_)) => false,
            (RenderPolicy::Animate { .. }, Some(last)) => match self.frame_interval() {
                Some(interval) => now.saturating_duration_since(last) >= interval,
                None => true,
            },
        }
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        let last = self.last_render?;
        match self.policy {
            RenderPolicy::Still { .. } => None,
            RenderPolicy::Animate { .. } => self.frame_interval().map(|interval| last + interval),
        }
    }

    pub fn mark_rendered(&mut self) {
        self.mark_rendered_at(Instant::now());
    }

    pub fn mark_rendered_at(&mut self, now: Instant) {
        self.last_render = Some(now);
    }

    /// Forgets the last rendered frame so the next check is ready again.
    ///
    /// Still policies rely on this to redraw their single frame after the
    /// surface changes size.
    pub fn invalidate(&mut self) {
        self.last_render = None;
    }
}
