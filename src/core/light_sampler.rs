// Copyright @yucwang 2026

use crate::core::light::Light;
use crate::math::constants::{Float, Vector3f};
use std::sync::Arc;

/// Discrete distribution over the scene's lights, shared by direct-lighting
/// and light-path-emission sampling.
pub struct LightSampler {
    lights: Vec<Arc<dyn Light>>,
    pmf: Vec<Float>,
    cmf: Vec<Float>,
}

impl LightSampler {
    pub fn uniform(lights: Vec<Arc<dyn Light>>) -> Self {
        let n = lights.len();
        let p = if n > 0 { 1.0 / (n as Float) } else { 0.0 };
        let pmf = vec![p; n];
        let cmf = build_cmf(&pmf);
        Self { lights, pmf, cmf }
    }

    pub fn with_weights(lights: Vec<Arc<dyn Light>>,
                        weights: &[Float]) -> Result<Self, String> {
        if lights.len() != weights.len() {
            return Err(format!(
                "light sampler: {} lights but {} weights",
                lights.len(), weights.len()));
        }
        if let Some(w) = weights.iter().find(|w| !w.is_finite() || **w < 0.0) {
            return Err(format!("light sampler: invalid weight {}", w));
        }

        let total: Float = weights.iter().sum();
        if total <= 0.0 {
            log::warn!("light sampler: all weights are zero, falling back to uniform");
            return Ok(Self::uniform(lights));
        }

        let pmf: Vec<Float> = weights.iter().map(|w| w / total).collect();
        let cmf = build_cmf(&pmf);
        Ok(Self { lights, pmf, cmf })
    }

    pub fn len(&self) -> usize {
        self.lights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lights.is_empty()
    }

    pub fn lights(&self) -> &[Arc<dyn Light>] {
        &self.lights
    }

    /// Select a light for direct illumination of the given shading point.
    /// Returns the light, its selection probability and its index.
    pub fn sample_light(&self, _p: &Vector3f, _n: &Vector3f, u: Float)
        -> Option<(&Arc<dyn Light>, Float, usize)> {
        let index = self.select(u)?;
        Some((&self.lights[index], self.pmf[index], index))
    }

    /// The probability `sample_light` would have assigned to `index`.
    pub fn light_probability(&self, index: usize, _p: &Vector3f, _n: &Vector3f) -> Float {
        self.pmf.get(index).copied().unwrap_or(0.0)
    }

    /// Shading-point-independent selection for light-path generation.
    pub fn sample_light_emission(&self, u: Float)
        -> Option<(&Arc<dyn Light>, Float, usize)> {
        let index = self.select(u)?;
        Some((&self.lights[index], self.pmf[index], index))
    }

    fn select(&self, u: Float) -> Option<usize> {
        if self.lights.is_empty() {
            return None;
        }

        for (i, threshold) in self.cmf.iter().enumerate() {
            if u < *threshold {
                return Some(i);
            }
        }

        // u == 1.0 lands past the last threshold
        Some(self.lights.len() - 1)
    }
}

fn build_cmf(pmf: &[Float]) -> Vec<Float> {
    let mut cmf = Vec::with_capacity(pmf.len());
    let mut sum = 0.0;
    for p in pmf {
        sum += p;
        cmf.push(sum);
    }
    cmf
}

/* Tests for LightSampler */

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::rng::LcgRng;
    use crate::lights::quad::QuadLight;
    use crate::math::spectrum::RGBSpectrum;
    use crate::shapes::quad::Quad;

    fn test_light() -> Arc<dyn Light> {
        let quad = Quad::new(
            Vector3f::new(0.0, 2.0, 0.0),
            Vector3f::new(1.0, 0.0, 0.0),
            Vector3f::new(0.0, 0.0, 1.0),
        );
        Arc::new(QuadLight::new(quad, RGBSpectrum::splat(1.0)))
    }

    #[test]
    fn test_weight_length_mismatch_is_fatal() {
        let lights = vec![test_light(), test_light()];
        assert!(LightSampler::with_weights(lights, &[1.0]).is_err());
    }

    #[test]
    fn test_all_zero_weights_fall_back_to_uniform() {
        let lights = vec![test_light(), test_light()];
        let sampler = LightSampler::with_weights(lights, &[0.0, 0.0]).unwrap();
        let p = Vector3f::zeros();
        assert!((sampler.light_probability(0, &p, &p) - 0.5).abs() < 1e-6);
        assert!((sampler.light_probability(1, &p, &p) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_probabilities_sum_to_one() {
        let lights = vec![test_light(), test_light(), test_light()];
        let sampler = LightSampler::with_weights(lights, &[0.2, 0.5, 1.3]).unwrap();
        let p = Vector3f::zeros();
        let sum: f32 = (0..sampler.len())
            .map(|i| sampler.light_probability(i, &p, &p))
            .sum();
        assert!((sum - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_weighted_boundary() {
        let lights = vec![test_light(), test_light()];
        let sampler = LightSampler::with_weights(lights, &[0.3, 0.7]).unwrap();
        let p = Vector3f::zeros();

        let (_, prob, index) = sampler.sample_light(&p, &p, 0.29).unwrap();
        assert_eq!(index, 0);
        assert!((prob - 0.3).abs() < 1e-6);

        let (_, prob, index) = sampler.sample_light(&p, &p, 0.31).unwrap();
        assert_eq!(index, 1);
        assert!((prob - 0.7).abs() < 1e-6);
    }

    #[test]
    fn test_uniform_selection_frequencies() {
        let lights = vec![test_light(), test_light()];
        let sampler = LightSampler::uniform(lights);
        let p = Vector3f::zeros();
        let mut rng = LcgRng::new(99);

        let mut counts = [0usize; 2];
        for _ in 0..1000 {
            let (_, prob, index) = sampler.sample_light(&p, &p, rng.next_f32()).unwrap();
            assert!((prob - 0.5).abs() < 1e-6);
            counts[index] += 1;
        }

        assert!(counts[0] > 400 && counts[0] < 600, "counts: {:?}", counts);
        assert_eq!(counts[0] + counts[1], 1000);
    }

    #[test]
    fn test_empty_sampler() {
        let sampler = LightSampler::uniform(Vec::new());
        let p = Vector3f::zeros();
        assert!(sampler.sample_light(&p, &p, 0.5).is_none());
        assert!(sampler.sample_light_emission(0.5).is_none());
    }
}
