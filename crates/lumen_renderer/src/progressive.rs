//! Progressive, cooperative, cancellable rendering.
//!
//! A [`RenderTask`] renders the frame in interlaced passes: the first pass
//! visits every `initial_stride`-th pixel of every `initial_stride`-th row,
//! and each following pass halves the stride until it reaches zero. The
//! task runs in bounded steps of `pixels_per_yield` pixels, either driven
//! by hand through [`RenderTask::step`] or as a future via
//! [`RenderTask::run`] that yields to its executor between steps.
//!
//! Cancellation goes through a shared [`RenderHandle`]. It is checked
//! before every pixel, so once it is observed no further pixels reach
//! the sink.

use crate::image_buffer::PixelSink;
use crate::renderer::{render_pixel, RenderConfig};
use crate::{Camera, Hittable};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::{Duration, Instant};

/// Shared cancellation flag for one render.
#[derive(Debug, Clone, Default)]
pub struct RenderHandle {
    cancelled: Arc<AtomicBool>,
}

impl RenderHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask the render to stop. Safe to call from any thread, any number of times.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}

/// How a render ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderStatus {
    Completed,
    Cancelled,
}

/// Completion report, produced whether or not the render was cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderSummary {
    pub status: RenderStatus,
    pub pixels_written: u64,
    /// Full-frame passes finished before the render stopped
    pub passes_completed: u32,
    pub elapsed: Duration,
}

/// Result of one bounded unit of work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// More work remains; call `step` again.
    Pending,
    Finished(RenderSummary),
}

/// In-flight progressive render of one frame.
pub struct RenderTask<'a> {
    camera: &'a Camera,
    world: &'a dyn Hittable,
    config: RenderConfig,
    handle: RenderHandle,
    rng: StdRng,

    /// Current pass stride; zero once every pass is done
    stride: u32,
    x: u32,
    y: u32,

    pixels_written: u64,
    passes_completed: u32,
    started: Option<Instant>,
    finished: Option<RenderSummary>,
}

impl<'a> RenderTask<'a> {
    pub fn new(camera: &'a Camera, world: &'a dyn Hittable, config: RenderConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let stride = config.initial_stride.max(1);

        Self {
            camera,
            world,
            config,
            handle: RenderHandle::new(),
            rng,
            stride,
            x: 0,
            y: 0,
            pixels_written: 0,
            passes_completed: 0,
            started: None,
            finished: None,
        }
    }

    /// Handle that cancels this task.
    pub fn handle(&self) -> RenderHandle {
        self.handle.clone()
    }

    /// Stride of the pass in progress, zero after the last pass.
    pub fn stride(&self) -> u32 {
        self.stride
    }

    /// Render up to `pixels_per_yield` pixels.
    ///
    /// Once finished, further calls return the same summary without
    /// doing any work.
    pub fn step(&mut self, sink: &mut dyn PixelSink) -> Step {
        if let Some(summary) = self.finished {
            return Step::Finished(summary);
        }

        let started = *self.started.get_or_insert_with(|| {
            log::info!(
                "Rendering {}x{} at {} spp, max depth {}",
                self.camera.width(),
                self.camera.height(),
                self.camera.samples_per_pixel(),
                self.camera.max_depth()
            );
            Instant::now()
        });

        let (width, height) = (self.camera.width(), self.camera.height());
        let mut budget = self.config.pixels_per_yield.max(1);

        while budget > 0 {
            if self.handle.is_cancelled() {
                return self.finish(RenderStatus::Cancelled, started);
            }
            if self.stride == 0 {
                return self.finish(RenderStatus::Completed, started);
            }

            if self.y >= height {
                self.passes_completed += 1;
                log::debug!(
                    "Pass {} (stride {}) done after {:.2?}",
                    self.passes_completed,
                    self.stride,
                    started.elapsed()
                );
                self.stride /= 2;
                self.x = 0;
                self.y = 0;
                continue;
            }

            let color = render_pixel(
                self.camera,
                self.world,
                self.x,
                self.y,
                &self.config,
                &mut self.rng,
            );

            // Cancelled from another thread while this pixel was in flight
            if self.handle.is_cancelled() {
                return self.finish(RenderStatus::Cancelled, started);
            }

            sink.put_pixel(self.x, self.y, color);
            self.pixels_written += 1;
            budget -= 1;

            self.x += self.stride;
            if self.x >= width {
                self.x = 0;
                self.y += self.stride;
            }
        }

        Step::Pending
    }

    /// Drive the task to completion, yielding to the executor between steps.
    pub async fn run(&mut self, sink: &mut dyn PixelSink) -> RenderSummary {
        loop {
            match self.step(sink) {
                Step::Finished(summary) => return summary,
                Step::Pending => yield_now().await,
            }
        }
    }

    fn finish(&mut self, status: RenderStatus, started: Instant) -> Step {
        let summary = RenderSummary {
            status,
            pixels_written: self.pixels_written,
            passes_completed: self.passes_completed,
            elapsed: started.elapsed(),
        };

        match status {
            RenderStatus::Completed => log::info!(
                "Render complete: {} pixels in {:.2?}",
                summary.pixels_written,
                summary.elapsed
            ),
            RenderStatus::Cancelled => log::info!(
                "Render cancelled after {} pixels ({} passes) in {:.2?}",
                summary.pixels_written,
                summary.passes_completed,
                summary.elapsed
            ),
        }

        self.finished = Some(summary);
        Step::Finished(summary)
    }
}

impl Camera {
    /// Start a progressive render of `world` through this camera.
    pub fn render<'a>(&'a self, world: &'a dyn Hittable, config: RenderConfig) -> RenderTask<'a> {
        RenderTask::new(self, world, config)
    }
}

/// Keeps at most one render live: starting a new one cancels the last.
#[derive(Debug, Default)]
pub struct RenderSession {
    current: Option<RenderHandle>,
}

impl RenderSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancel any previous render, then start a new one.
    pub fn begin<'a>(
        &mut self,
        camera: &'a Camera,
        world: &'a dyn Hittable,
        config: RenderConfig,
    ) -> RenderTask<'a> {
        self.cancel();
        let task = camera.render(world, config);
        self.current = Some(task.handle());
        task
    }

    /// Cancel the current render, if any.
    pub fn cancel(&mut self) {
        if let Some(handle) = self.current.take() {
            if !handle.is_cancelled() {
                log::info!("Cancelling in-flight render");
            }
            handle.cancel();
        }
    }
}

/// Future that is pending exactly once, waking itself immediately.
struct YieldNow {
    yielded: bool,
}

impl Future for YieldNow {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        if self.yielded {
            Poll::Ready(())
        } else {
            self.yielded = true;
            cx.waker().wake_by_ref();
            Poll::Pending
        }
    }
}

/// Give the executor a chance to run other work.
pub fn yield_now() -> impl Future<Output = ()> {
    YieldNow { yielded: false }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        Background, CameraConfig, Color, HittableList, ImageBuffer, Lambertian, Sphere,
    };
    use lumen_math::Vec3;
    use std::collections::HashSet;

    fn scene() -> HittableList {
        let mut world = HittableList::new();
        world.push(Sphere::new(
            Vec3::new(0.0, 0.0, -1.0),
            0.5,
            Arc::new(Lambertian::new(Color::splat(0.5))),
        ));
        world
    }

    fn camera(width: u32, height: u32) -> Camera {
        Camera::new(
            &CameraConfig::default()
                .with_size(width, height)
                .with_quality(1, 3),
        )
        .unwrap()
    }

    fn config() -> RenderConfig {
        RenderConfig::default().with_seed(9).with_pixels_per_yield(7)
    }

    #[test]
    fn test_progressive_pass_order() {
        let world = scene();
        let camera = camera(7, 5);
        let mut task = camera.render(&world, config().with_initial_stride(3));

        let mut visited = Vec::new();
        let mut sink = |x: u32, y: u32, _c: Color| visited.push((x, y));
        let summary = pollster::block_on(task.run(&mut sink));

        assert_eq!(summary.status, RenderStatus::Completed);
        assert_eq!(summary.passes_completed, 2);

        // Stride 3: columns 0,3,6 of rows 0,3; then stride 1: every pixel
        let coarse: Vec<(u32, u32)> = vec![(0, 0), (3, 0), (6, 0), (0, 3), (3, 3), (6, 3)];
        assert_eq!(&visited[..6], &coarse[..]);
        assert_eq!(visited.len(), 6 + 35);
        assert_eq!(summary.pixels_written, 41);

        let full: HashSet<_> = visited[6..].iter().copied().collect();
        assert_eq!(full.len(), 35);
        assert_eq!(visited[6], (0, 0));
        assert_eq!(visited[7], (1, 0));
    }

    #[test]
    fn test_stride_halving() {
        let world = scene();
        let camera = camera(8, 8);
        let mut task = camera.render(&world, config().with_initial_stride(4));
        let mut image = ImageBuffer::new(8, 8);

        let summary = pollster::block_on(task.run(&mut image));
        // Strides 4, 2, 1
        assert_eq!(summary.passes_completed, 3);
        assert_eq!(summary.pixels_written, 4 + 16 + 64);
        assert_eq!(task.stride(), 0);
    }

    #[test]
    fn test_step_respects_pixel_quota() {
        let world = scene();
        let camera = camera(6, 6);
        let mut task = camera.render(&world, config().with_initial_stride(1));

        let mut count = 0;
        let mut sink = |_x: u32, _y: u32, _c: Color| count += 1;

        let mut steps = 0;
        let summary = loop {
            match task.step(&mut sink) {
                Step::Pending => steps += 1,
                Step::Finished(summary) => break summary,
            }
        };

        // 36 pixels in quotas of 7; the sixth step renders the last one and finishes
        assert_eq!(steps, 5);
        assert_eq!(summary.pixels_written, 36);

        // Finished tasks stay finished
        assert_eq!(task.step(&mut sink), Step::Finished(summary));
        assert_eq!(count, 36);
    }

    #[test]
    fn test_cancel_after_n_pixels_stops_output() {
        let world = scene();
        let camera = camera(16, 16);
        let mut task = camera.render(&world, config());
        let handle = task.handle();

        let mut calls = 0;
        let mut sink = |_x: u32, _y: u32, _c: Color| {
            calls += 1;
            if calls == 10 {
                handle.cancel();
            }
        };

        let summary = pollster::block_on(task.run(&mut sink));
        assert_eq!(calls, 10);
        assert_eq!(summary.status, RenderStatus::Cancelled);
        assert_eq!(summary.pixels_written, 10);
        assert_eq!(summary.passes_completed, 0);
    }

    #[test]
    fn test_cancel_before_start() {
        let world = scene();
        let camera = camera(4, 4);
        let mut task = camera.render(&world, config());
        task.handle().cancel();

        let mut calls = 0;
        let summary = pollster::block_on(task.run(&mut |_x: u32, _y: u32, _c: Color| calls += 1));
        assert_eq!(calls, 0);
        assert_eq!(summary.status, RenderStatus::Cancelled);
    }

    #[test]
    fn test_cancel_from_another_thread() {
        let world = scene();
        let camera = camera(64, 64);
        let mut task = camera.render(&world, config().with_initial_stride(1));
        let handle = task.handle();

        let mut image = ImageBuffer::new(64, 64);
        let written = std::thread::scope(|s| {
            s.spawn(|| handle.cancel());
            pollster::block_on(task.run(&mut image)).pixels_written
        });
        assert!(written <= 64 * 64);
        assert!(handle.is_cancelled());
    }

    #[test]
    fn test_session_cancels_previous_render() {
        let world = scene();
        let camera = camera(8, 8);
        let mut session = RenderSession::new();

        let mut first = session.begin(&camera, &world, config());
        let first_handle = first.handle();
        let mut image = ImageBuffer::new(8, 8);
        assert_eq!(first.step(&mut image), Step::Pending);

        let mut second = session.begin(&camera, &world, config());
        assert!(first_handle.is_cancelled());
        assert!(!second.handle().is_cancelled());

        match first.step(&mut image) {
            Step::Finished(summary) => {
                assert_eq!(summary.status, RenderStatus::Cancelled);
                assert_eq!(summary.pixels_written, 7);
            }
            Step::Pending => panic!("cancelled render kept going"),
        }

        let summary = pollster::block_on(second.run(&mut image));
        assert_eq!(summary.status, RenderStatus::Completed);
    }

    #[test]
    fn test_seeded_renders_are_reproducible() {
        let world = scene();
        let camera = camera(6, 4);
        let config = config().with_background(Background::Solid { color: Color::ONE });

        let render = || {
            let mut image = ImageBuffer::new(6, 4);
            pollster::block_on(camera.render(&world, config.clone()).run(&mut image));
            image
        };

        assert_eq!(render().pixels(), render().pixels());
    }

    #[test]
    fn test_yield_now_is_pending_once() {
        let summary = pollster::block_on(async {
            yield_now().await;
            yield_now().await;
            3
        });
        assert_eq!(summary, 3);
    }
}
