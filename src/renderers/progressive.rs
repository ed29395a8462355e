// Copyright @yucwang 2026

use crate::core::integrator::Integrator;
use crate::core::scene::Scene;
use crate::core::sensor::Sensor;
use crate::math::constants::{Float, Vector3f};
use crate::renderers::film::{Film, SampleStats};
use crate::renderers::splat::SplatQueue;
use crate::renderers::tile::{make_tiles, render_tile, PassParams, Tile, TileOutcome};
use crossbeam_channel::bounded;
use indicatif::{ProgressBar, ProgressStyle};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

/// Configuration consumed (not owned) by the progressive renderer.
#[derive(Debug, Clone)]
pub struct RenderSettings {
    pub tile_size: usize,
    /// Target of the first pass, kept tiny for an instant preview.
    pub initial_spp: u32,
    /// Total per-pixel budget after the final pass.
    pub max_spp: u32,
    pub passes: u32,
    /// 0 selects the machine's available parallelism.
    pub workers: usize,
    pub min_sample_fraction: Float,
    pub error_threshold: Float,
    /// When set, every finished pass is dumped as an OpenEXR image here.
    pub snapshot_dir: Option<PathBuf>,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            tile_size: 32,
            initial_spp: 1,
            max_spp: 64,
            passes: 4,
            workers: 0,
            min_sample_fraction: 0.1,
            error_threshold: 0.02,
            snapshot_dir: None,
        }
    }
}

#[derive(Debug)]
pub enum RenderError {
    /// Cooperative cancellation observed at a pass boundary.
    Cancelled,
    /// A tile task failed; the whole render aborts.
    Worker(String),
}

impl std::fmt::Display for RenderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RenderError::Cancelled => write!(f, "render cancelled"),
            RenderError::Worker(message) => write!(f, "worker failed: {}", message),
        }
    }
}

impl std::error::Error for RenderError {}

pub struct RenderResult {
    pub image: Vec<Vector3f>,
    pub stats: SampleStats,
    pub passes: u32,
}

/// Incremental progress surface for the orchestration layer. Tile events
/// carry the tile's coordinates, its current image estimate and the pass
/// progress counters.
pub trait RenderObserver: Send + Sync {
    fn tile_finished(&self, _pass: u32, _tile: &Tile, _samples: u64,
                     _tile_image: &[Vector3f], _completed: usize, _total: usize) {}
    fn pass_finished(&self, _pass: u32, _target_spp: u32,
                     _stats: &SampleStats, _image: &[Vector3f]) {}
}

/// Cumulative per-pass sample targets: a near-instant preview pass, an even
/// split of the remaining budget, and a final pass absorbing the remainder.
pub fn pass_schedule(initial_spp: u32, max_spp: u32, passes: u32) -> Vec<u32> {
    let passes = passes.max(1);
    let max_spp = max_spp.max(1);
    let first = initial_spp.max(1).min(max_spp);

    if passes == 1 {
        return vec![max_spp];
    }

    let remaining = max_spp - first;
    let step = remaining / (passes - 1);
    let mut schedule = Vec::with_capacity(passes as usize);
    schedule.push(first);
    for i in 1..passes - 1 {
        schedule.push(first + step * i);
    }
    schedule.push(max_spp);
    schedule
}

struct TileTask {
    tile: Tile,
    pass: PassParams,
}

pub struct ProgressiveRenderer {
    integrator: Box<dyn Integrator>,
    settings: RenderSettings,
}

impl ProgressiveRenderer {
    pub fn new(integrator: Box<dyn Integrator>, settings: RenderSettings) -> Self {
        Self { integrator, settings }
    }

    pub fn render(&self,
                  scene: &Scene,
                  sensor: &dyn Sensor,
                  cancel: &AtomicBool,
                  observer: Option<&dyn RenderObserver>)
                  -> Result<RenderResult, RenderError> {
        let width = sensor.width();
        let height = sensor.height();
        let tiles = make_tiles(width, height, self.settings.tile_size);
        let schedule = pass_schedule(self.settings.initial_spp,
                                     self.settings.max_spp,
                                     self.settings.passes);

        let worker_count = if self.settings.workers > 0 {
            self.settings.workers
        } else {
            thread::available_parallelism().map(|n| n.get()).unwrap_or(1)
        };
        log::info!("progressive render: {}x{}, {} tiles, {} passes, {} workers",
                   width, height, tiles.len(), schedule.len(), worker_count);

        let mut film = Film::new(width, height);
        let stats_view = film.view();
        let splats = SplatQueue::with_capacity((width * height / 4).max(64));

        // one slot per tile so a full pass enqueues without blocking
        let (task_tx, task_rx) = bounded::<TileTask>(tiles.len().max(1));
        let (result_tx, result_rx) = bounded::<TileOutcome>(tiles.len().max(1));

        let mut completed_passes = 0u32;
        let integrator = self.integrator.as_ref();
        let settings = &self.settings;
        let tiles = &tiles;
        let splats = &splats;
        let film = &mut film;

        let failure: Option<RenderError> = thread::scope(|scope| {
            for _ in 0..worker_count {
                let task_rx = task_rx.clone();
                let result_tx = result_tx.clone();
                scope.spawn(move || {
                    // each worker owns an independent integrator instance
                    let integrator = integrator.box_clone();
                    while let Ok(task) = task_rx.recv() {
                        let tile = task.tile;
                        let outcome = catch_unwind(AssertUnwindSafe(|| {
                            render_tile(&tile, scene, sensor, integrator.as_ref(),
                                        stats_view, splats, &task.pass)
                        })).unwrap_or_else(|payload| TileOutcome {
                            tile_id: tile.id,
                            samples: 0,
                            error: Some(panic_message(payload)),
                        });
                        if result_tx.send(outcome).is_err() {
                            break;
                        }
                    }
                });
            }

            let mut failure: Option<RenderError> = None;
            for (pass_index, target) in schedule.iter().enumerate() {
                if cancel.load(Ordering::Relaxed) {
                    failure = Some(RenderError::Cancelled);
                    break;
                }

                let params = PassParams {
                    index: pass_index as u32,
                    target_spp: *target,
                    min_sample_fraction: settings.min_sample_fraction,
                    error_threshold: settings.error_threshold,
                };

                let progress = ProgressBar::new(tiles.len() as u64);
                progress.set_style(
                    ProgressStyle::with_template(
                        "[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} tiles")
                        .unwrap_or_else(|_| ProgressStyle::default_bar()),
                );

                let mut submitted = 0usize;
                for tile in tiles.iter() {
                    if task_tx.send(TileTask { tile: *tile, pass: params }).is_err() {
                        break;
                    }
                    submitted += 1;
                }

                // exactly one result per submitted task before the next pass
                let mut pass_error: Option<String> = None;
                for drained in 0..submitted {
                    match result_rx.recv() {
                        Ok(outcome) => {
                            progress.inc(1);
                            if let Some(e) = outcome.error {
                                pass_error = Some(e);
                            } else if let Some(observer) = observer {
                                let tile = &tiles[outcome.tile_id];
                                // the finished tile is quiescent, reading it
                                // does not race the other workers
                                let tile_image = film.region_mean(
                                    tile.x0, tile.y0, tile.x1, tile.y1);
                                observer.tile_finished(
                                    params.index, tile, outcome.samples,
                                    &tile_image, drained + 1, tiles.len());
                            }
                        }
                        Err(_) => {
                            pass_error = Some(String::from("result queue disconnected"));
                            break;
                        }
                    }
                }
                progress.finish_and_clear();

                if submitted < tiles.len() && pass_error.is_none() {
                    pass_error = Some(String::from("task queue disconnected"));
                }
                if let Some(message) = pass_error {
                    failure = Some(RenderError::Worker(message));
                    break;
                }

                // all tiles of the pass are done, consume the splat channel
                let batch = splats.snapshot();
                film.add_splats(&batch);
                splats.clear();

                completed_passes += 1;
                let stats = film.sample_stats();
                log::info!(
                    "pass {}/{}: target {} spp, total {} samples, {}..{} per pixel, avg {:.2}",
                    pass_index + 1, schedule.len(), target,
                    stats.total_samples, stats.min_samples, stats.max_samples,
                    stats.average_samples);

                if observer.is_some() || settings.snapshot_dir.is_some() {
                    let image = film.snapshot();
                    if let Some(observer) = observer {
                        observer.pass_finished(params.index, *target, &stats, &image);
                    }
                    if let Some(dir) = &settings.snapshot_dir {
                        write_pass_snapshot(dir, pass_index as u32, &image, width, height);
                    }
                }
            }

            drop(task_tx);
            failure
        });

        match failure {
            Some(error) => Err(error),
            None => Ok(RenderResult {
                image: film.snapshot(),
                stats: film.sample_stats(),
                passes: completed_passes,
            }),
        }
    }
}

fn panic_message(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        return String::from(*message);
    }
    if let Some(message) = payload.downcast_ref::<String>() {
        return message.clone();
    }
    String::from("tile worker panicked")
}

fn write_pass_snapshot(dir: &PathBuf, pass: u32, image: &[Vector3f],
                       width: usize, height: usize) {
    if let Err(e) = std::fs::create_dir_all(dir) {
        log::error!("snapshot dir {:?}: {}", dir, e);
        return;
    }
    let path = dir.join(format!("pass_{:03}.exr", pass));
    let path = match path.to_str() {
        Some(path) => path.to_string(),
        None => return,
    };
    crate::io::exr_utils::write_exr_to_file(image, width, height, &path);
}

/* Tests for the progressive controller */

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::integrator::Integrator;
    use crate::core::light::Light;
    use crate::core::rng::LcgRng;
    use crate::core::scene::SceneObject;
    use crate::integrators::path::PathIntegrator;
    use crate::lights::quad::QuadLight;
    use crate::materials::diffuse_light::DiffuseLightMaterial;
    use crate::materials::lambertian::LambertianMaterial;
    use crate::math::constants::{Vector2f, FLOAT_MAX};
    use crate::math::spectrum::RGBSpectrum;
    use crate::sensors::perspective::PerspectiveCamera;
    use crate::shapes::quad::Quad;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Arc;

    fn panel() -> Quad {
        // facing down toward the floor
        Quad::new(Vector3f::new(-0.5, 2.0, -0.5),
                  Vector3f::new(1.0, 0.0, 0.0),
                  Vector3f::new(0.0, 0.0, 1.0))
    }

    fn test_scene() -> Scene {
        let emission = RGBSpectrum::splat(12.0);
        let floor = Quad::new(Vector3f::new(-20.0, 0.0, -20.0),
                              Vector3f::new(0.0, 0.0, 40.0),
                              Vector3f::new(40.0, 0.0, 0.0));
        let objects = vec![
            SceneObject::new(Arc::new(floor),
                             Arc::new(LambertianMaterial::new(RGBSpectrum::splat(0.5)))),
            SceneObject::new(Arc::new(panel()),
                             Arc::new(DiffuseLightMaterial::new(emission))),
        ];
        let lights: Vec<Box<dyn Light>> = vec![
            Box::new(QuadLight::new(panel(), emission)),
        ];
        Scene::new(objects, lights)
    }

    fn test_camera(width: usize, height: usize) -> PerspectiveCamera {
        PerspectiveCamera::new(
            Vector3f::new(0.0, 1.0, 4.0),
            Vector3f::new(0.0, 0.5, 0.0),
            Vector3f::new(0.0, 1.0, 0.0),
            std::f32::consts::FRAC_PI_2,
            width, height, 1e-3, FLOAT_MAX)
    }

    fn test_settings() -> RenderSettings {
        RenderSettings {
            tile_size: 8,
            initial_spp: 1,
            max_spp: 4,
            passes: 2,
            workers: 2,
            min_sample_fraction: 1.0,
            error_threshold: 0.05,
            snapshot_dir: None,
        }
    }

    #[test]
    fn test_pass_schedule_shapes() {
        assert_eq!(pass_schedule(1, 64, 1), vec![64]);
        assert_eq!(pass_schedule(1, 64, 4), vec![1, 22, 43, 64]);
        assert_eq!(pass_schedule(1, 4, 2), vec![1, 4]);
        assert_eq!(pass_schedule(8, 4, 3), vec![4, 4, 4]);

        for (initial, max, passes) in [(1u32, 100u32, 7u32), (2, 9, 3), (1, 1, 5)].iter() {
            let schedule = pass_schedule(*initial, *max, *passes);
            assert_eq!(schedule.len(), *passes as usize);
            assert_eq!(*schedule.last().unwrap(), (*max).max(1));
            for window in schedule.windows(2) {
                assert!(window[0] <= window[1], "schedule not monotone: {:?}", schedule);
            }
        }
    }

    struct CountingObserver {
        tiles: AtomicUsize,
        passes: AtomicUsize,
    }

    impl RenderObserver for CountingObserver {
        fn tile_finished(&self, _pass: u32, tile: &Tile, _samples: u64,
                         tile_image: &[Vector3f], _completed: usize, _total: usize) {
            assert_eq!(tile_image.len(), tile.width() * tile.height());
            self.tiles.fetch_add(1, Ordering::Relaxed);
        }

        fn pass_finished(&self, _pass: u32, _target_spp: u32,
                         _stats: &SampleStats, image: &[Vector3f]) {
            assert!(!image.is_empty());
            self.passes.fetch_add(1, Ordering::Relaxed);
        }
    }

    #[test]
    fn test_progressive_render_completes() {
        let scene = test_scene();
        let camera = test_camera(16, 16);
        let renderer = ProgressiveRenderer::new(
            Box::new(PathIntegrator::new(4)), test_settings());
        let cancel = AtomicBool::new(false);
        let observer = CountingObserver {
            tiles: AtomicUsize::new(0),
            passes: AtomicUsize::new(0),
        };

        let result = renderer.render(&scene, &camera, &cancel, Some(&observer)).unwrap();

        assert_eq!(result.passes, 2);
        assert_eq!(result.image.len(), 16 * 16);
        assert_eq!(result.stats.pixels, 16 * 16);
        // min fraction 1.0 forces every pixel to the full budget
        assert_eq!(result.stats.min_samples, 4);
        assert_eq!(result.stats.max_samples, 4);
        assert_eq!(result.stats.total_samples, 4 * 16 * 16);

        // one event per tile per pass, one per pass
        let tile_count = make_tiles(16, 16, 8).len();
        assert_eq!(observer.tiles.load(Ordering::Relaxed), tile_count * 2);
        assert_eq!(observer.passes.load(Ordering::Relaxed), 2);

        for color in result.image.iter() {
            assert!(color.x.is_finite() && color.x >= 0.0);
        }
    }

    #[test]
    fn test_progressive_render_reports_cancellation() {
        let scene = test_scene();
        let camera = test_camera(8, 8);
        let renderer = ProgressiveRenderer::new(
            Box::new(PathIntegrator::new(2)), test_settings());
        let cancel = AtomicBool::new(true);

        let result = renderer.render(&scene, &camera, &cancel, None);
        assert!(matches!(result, Err(RenderError::Cancelled)));
    }

    struct PanickingIntegrator;

    impl Integrator for PanickingIntegrator {
        fn trace(&self, _scene: &Scene, _sensor: &dyn Sensor, _pixel: Vector2f,
                 _rng: &mut LcgRng, _splats: &SplatQueue) -> RGBSpectrum {
            panic!("synthetic failure");
        }

        fn box_clone(&self) -> Box<dyn Integrator> {
            Box::new(PanickingIntegrator)
        }
    }

    #[test]
    fn test_progressive_render_aborts_on_worker_failure() {
        let scene = test_scene();
        let camera = test_camera(8, 8);
        let renderer = ProgressiveRenderer::new(
            Box::new(PanickingIntegrator), test_settings());
        let cancel = AtomicBool::new(false);

        let result = renderer.render(&scene, &camera, &cancel, None);
        match result {
            Err(RenderError::Worker(message)) => {
                assert!(message.contains("synthetic failure"));
            }
            other => panic!("expected worker error, got {:?}", other.map(|_| ())),
        }
    }
}
