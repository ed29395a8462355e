// Copyright @yucwang 2026

use crate::math::constants::{Float, Vector3f};
use crate::math::spectrum::{RGBSpectrum, Spectrum};
use crate::renderers::splat::SplatXY;

/// Per-pixel running accumulators. The luminance moments drive the adaptive
/// stopping rule; everything persists across passes.
#[derive(Debug, Clone, Copy, Default)]
pub struct PixelStats {
    pub color: Vector3f,
    pub luminance: Float,
    pub luminance_sq: Float,
    pub count: u32,
}

impl PixelStats {
    pub fn add_sample(&mut self, sample: RGBSpectrum) {
        let lum = sample.value();
        self.color += sample.to_vector();
        self.luminance += lum;
        self.luminance_sq += lum * lum;
        self.count += 1;
    }

    pub fn mean(&self) -> Vector3f {
        if self.count == 0 {
            return Vector3f::zeros();
        }
        self.color / (self.count as Float)
    }

    pub fn mean_luminance(&self) -> Float {
        if self.count == 0 {
            return 0.0;
        }
        self.luminance / (self.count as Float)
    }

    /// sqrt(variance) / mean of the accumulated luminance. None until two
    /// samples exist or when the mean is (near) zero.
    pub fn coefficient_of_variation(&self) -> Option<Float> {
        if self.count < 2 {
            return None;
        }
        let n = self.count as Float;
        let mean = self.luminance / n;
        if mean <= 0.0 {
            return None;
        }
        let variance = ((self.luminance_sq - self.luminance * self.luminance / n)
                        / (n - 1.0)).max(0.0);
        Some(variance.sqrt() / mean)
    }
}

/// Aggregate sample counters reported after each pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleStats {
    pub pixels: usize,
    pub total_samples: u64,
    pub min_samples: u32,
    pub max_samples: u32,
    pub average_samples: Float,
}

/// Shared pixel state of a progressive render: the stats array plus the
/// folded-in splat channel.
pub struct Film {
    width: usize,
    height: usize,
    stats: Vec<PixelStats>,
    splat: Vec<Vector3f>,
}

impl Film {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            stats: vec![PixelStats::default(); width * height],
            splat: vec![Vector3f::zeros(); width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn stats(&self, x: usize, y: usize) -> &PixelStats {
        &self.stats[x + self.width * y]
    }

    /// Raw view handed to the tile workers. The film itself must not be
    /// touched while worker writes are in flight.
    pub fn view(&mut self) -> StatsView {
        StatsView {
            ptr: self.stats.as_mut_ptr(),
            width: self.width,
            height: self.height,
        }
    }

    pub fn add_splats(&mut self, batch: &[SplatXY]) {
        for splat in batch {
            let x = splat.x as usize;
            let y = splat.y as usize;
            if x < self.width && y < self.height {
                self.splat[x + self.width * y] += splat.color;
            }
        }
    }

    /// Current image estimate: per-pixel mean plus the splat channel scaled
    /// by the average sample count.
    pub fn snapshot(&self) -> Vec<Vector3f> {
        let stats = self.sample_stats();
        let splat_scale = if stats.average_samples > 0.0 {
            1.0 / stats.average_samples
        } else {
            0.0
        };

        let mut image = Vec::with_capacity(self.stats.len());
        for (stats, splat) in self.stats.iter().zip(self.splat.iter()) {
            image.push(stats.mean() + splat * splat_scale);
        }
        image
    }

    /// Mean colors of a pixel rectangle, row-major. Used for per-tile
    /// completion events; the splat channel is not folded in because it is
    /// only consumed at pass boundaries.
    pub fn region_mean(&self, x0: usize, y0: usize, x1: usize, y1: usize) -> Vec<Vector3f> {
        let x1 = x1.min(self.width);
        let y1 = y1.min(self.height);
        let mut region = Vec::with_capacity((x1 - x0) * (y1 - y0));
        for y in y0..y1 {
            for x in x0..x1 {
                region.push(self.stats[x + self.width * y].mean());
            }
        }
        region
    }

    pub fn sample_stats(&self) -> SampleStats {
        let mut total: u64 = 0;
        let mut min = u32::MAX;
        let mut max = 0u32;
        for stats in self.stats.iter() {
            total += stats.count as u64;
            min = min.min(stats.count);
            max = max.max(stats.count);
        }
        let pixels = self.stats.len();
        SampleStats {
            pixels,
            total_samples: total,
            min_samples: if pixels == 0 { 0 } else { min },
            max_samples: max,
            average_samples: if pixels == 0 {
                0.0
            } else {
                (total as Float) / (pixels as Float)
            },
        }
    }
}

/// Raw pointer view over the film's stats array. Workers of a pass write
/// through it without locking; safety rests entirely on tile disjointness,
/// a pixel belongs to exactly one tile and one worker per pass.
#[derive(Clone, Copy)]
pub struct StatsView {
    ptr: *mut PixelStats,
    width: usize,
    height: usize,
}

unsafe impl Send for StatsView {}
unsafe impl Sync for StatsView {}

impl StatsView {
    /// Caller must own the tile containing (x, y) for the current pass.
    pub unsafe fn pixel_mut(&self, x: usize, y: usize) -> &mut PixelStats {
        debug_assert!(x < self.width && y < self.height);
        &mut *self.ptr.add(x + self.width * y)
    }
}

/* Tests for Film */
