// Copyright @yucwang 2026

use crate::core::integrator::Integrator;
use crate::core::rng::LcgRng;
use crate::core::scene::Scene;
use crate::core::sensor::Sensor;
use crate::math::constants::{Float, Vector2f};
use crate::renderers::film::StatsView;
use crate::renderers::splat::SplatQueue;

const LUMINANCE_EPSILON: Float = 1e-4;

/// One rectangle of the tile grid. Pixel bounds are half-open:
/// `x0 <= x < x1`, `y0 <= y < y1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tile {
    pub id: usize,
    pub x0: usize,
    pub y0: usize,
    pub x1: usize,
    pub y1: usize,
}

impl Tile {
    pub fn width(&self) -> usize {
        self.x1 - self.x0
    }

    pub fn height(&self) -> usize {
        self.y1 - self.y0
    }

    pub fn contains(&self, x: usize, y: usize) -> bool {
        x >= self.x0 && x < self.x1 && y >= self.y0 && y < self.y1
    }
}

/// Ceiling-division grid over the image, clipped at the edges. Every pixel
/// lands in exactly one tile.
pub fn make_tiles(width: usize, height: usize, tile_size: usize) -> Vec<Tile> {
    let tile_size = tile_size.max(1);
    let tiles_x = (width + tile_size - 1) / tile_size;
    let tiles_y = (height + tile_size - 1) / tile_size;

    let mut tiles = Vec::with_capacity(tiles_x * tiles_y);
    for ty in 0..tiles_y {
        for tx in 0..tiles_x {
            let x0 = tx * tile_size;
            let y0 = ty * tile_size;
            tiles.push(Tile {
                id: tiles.len(),
                x0,
                y0,
                x1: (x0 + tile_size).min(width),
                y1: (y0 + tile_size).min(height),
            });
        }
    }
    tiles
}

/// Deterministic per-tile stream seed. The rng constructor scrambles it, so
/// adjacent tiles and passes decorrelate.
pub fn tile_stream_seed(tile_id: usize, pass_index: u32) -> u64 {
    ((pass_index as u64) << 40) | (tile_id as u64)
}

/// Per-pass sampling parameters consumed by the tile workers.
#[derive(Debug, Clone, Copy)]
pub struct PassParams {
    pub index: u32,
    /// Cumulative target sample count after this pass.
    pub target_spp: u32,
    pub min_sample_fraction: Float,
    pub error_threshold: Float,
}

impl PassParams {
    /// Floor below which the stopping rule is not consulted: the configured
    /// fraction of the pass target, never below one sample.
    pub fn min_samples(&self) -> u32 {
        let floor = (self.min_sample_fraction * self.target_spp as Float).ceil() as u32;
        floor.max(1).min(self.target_spp)
    }
}

pub struct TileOutcome {
    pub tile_id: usize,
    pub samples: u64,
    pub error: Option<String>,
}

/// Run the adaptive sampling loop over one tile. Writes go straight into
/// the shared stats array; the disjoint tile grid makes that race-free.
pub fn render_tile(tile: &Tile,
                   scene: &Scene,
                   sensor: &dyn Sensor,
                   integrator: &dyn Integrator,
                   stats: StatsView,
                   splats: &SplatQueue,
                   pass: &PassParams) -> TileOutcome {
    let width = sensor.width() as Float;
    let height = sensor.height() as Float;
    let min_samples = pass.min_samples();
    let mut rng = LcgRng::new(tile_stream_seed(tile.id, pass.index));
    let mut samples: u64 = 0;

    for y in tile.y0..tile.y1 {
        for x in tile.x0..tile.x1 {
            let pixel = unsafe { stats.pixel_mut(x, y) };

            while pixel.count < pass.target_spp {
                if pixel.count >= min_samples && converged(pixel, pass) {
                    break;
                }

                let uv = Vector2f::new(
                    (x as Float + rng.next_f32()) / width,
                    (y as Float + rng.next_f32()) / height,
                );
                let color = integrator.trace(scene, sensor, uv, &mut rng, splats);
                pixel.add_sample(color);
                samples += 1;
            }
        }
    }

    log::debug!("tile {} pass {}: {} samples", tile.id, pass.index, samples);
    TileOutcome { tile_id: tile.id, samples, error: None }
}

fn converged(pixel: &crate::renderers::film::PixelStats, pass: &PassParams) -> bool {
    if pixel.mean_luminance() <= LUMINANCE_EPSILON {
        return true;
    }
    match pixel.coefficient_of_variation() {
        Some(cv) => cv < pass.error_threshold,
        None => false,
    }
}

/* Tests for the tile grid and the adaptive loop */
