use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::landmark::VECTOR_LEN;
use crate::template_store::GestureTemplate;

pub const DEFAULT_MATCH_THRESHOLD: f32 = 0.15;

/// Euclidean distance, or `+inf` when the vectors cannot be compared.
///
/// Mismatched or zero lengths are "infinitely far" so they can never be accepted.
pub fn euclidean_distance(a: &[f32], b: &[f32]) -> f32 {
    if a.is_empty() || a.len() != b.len() {
        return f32::INFINITY;
    }

    a.iter()
        .zip(b)
        .map(|(left, right)| {
            let delta = left - right;
            delta * delta
        })
        .sum::<f32>()
        .sqrt()
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct GestureMatch {
    pub name: String,
    pub index: usize,
    pub distance: f32,
}

/// Nearest template strictly closer than `threshold`.
///
/// Ties keep the first template in iteration order.
pub fn best_match(
    live: &[f32],
    templates: &[GestureTemplate],
    threshold: f32,
) -> Option<GestureMatch> {
    let mut best: Option<(usize, f32)> = None;
    for (index, template) in templates.iter().enumerate() {
        let distance = euclidean_distance(live, &template.vector);
        match best {
            Some((_, best_distance)) if distance >= best_distance => {}
            _ if distance.is_finite() => best = Some((index, distance)),
            _ => {}
        }
    }

    best.filter(|(_, distance)| *distance < threshold)
        .map(|(index, distance)| GestureMatch {
            name: templates[index].name.clone(),
            index,
            distance,
        })
}

pub fn match_gesture(
    live: &[f32],
    templates: &[GestureTemplate],
    threshold: f32,
) -> Option<String> {
    best_match(live, templates, threshold).map(|found| found.name)
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct MatcherConfig {
    pub threshold: f32,
    pub vector_len: usize,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_MATCH_THRESHOLD,
            vector_len: VECTOR_LEN,
        }
    }
}

impl MatcherConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.threshold.is_finite() || self.threshold <= 0.0 {
            return Err(ConfigError::InvalidThreshold(self.threshold));
        }
        if self.vector_len == 0 {
            return Err(ConfigError::EmptyVectorLength);
        }
        Ok(())
    }
}

/// Matcher bound to a validated configuration.
#[derive(Debug, Clone, Copy)]
pub struct GestureMatcher {
    config: MatcherConfig,
}

impl GestureMatcher {
    pub fn new(config: MatcherConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> MatcherConfig {
        self.config
    }

    pub fn best_match(
        &self,
        live: &[f32],
        templates: &[GestureTemplate],
    ) -> Option<GestureMatch> {
        if live.len() != self.config.vector_len {
            return None;
        }
        best_match(live, templates, self.config.threshold)
    }

    pub fn match_vector(&self, live: &[f32], templates: &[GestureTemplate]) -> Option<String> {
        self.best_match(live, templates).map(|found| found.name)
    }
}
