use crate::error::RecordError;
use crate::landmark::{vectorize_hand, HandLandmark, LandmarkVector, HAND_LANDMARK_COUNT};
use crate::runtime_log::current_unix_ms;
use crate::template_store::GestureTemplate;

pub const DEFAULT_RECORDING_DURATION_MS: u64 = 3_000;
pub const DEFAULT_SAMPLE_INTERVAL_MS: u64 = 100;

/// Elementwise arithmetic mean of equal-length sample vectors.
pub fn average_vectors(samples: &[LandmarkVector]) -> Result<LandmarkVector, RecordError> {
    let first = samples.first().ok_or(RecordError::NoSamples)?;
    let expected = first.len();

    let mut sums = vec![0.0_f64; expected];
    for (index, sample) in samples.iter().enumerate() {
        if sample.len() != expected {
            return Err(RecordError::RaggedSamples {
                index,
                expected,
                actual: sample.len(),
            });
        }
        for (sum, value) in sums.iter_mut().zip(sample) {
            *sum += f64::from(*value);
        }
    }

    let count = samples.len() as f64;
    Ok(sums.into_iter().map(|sum| (sum / count) as f32).collect())
}

pub fn record_template_at(
    name: &str,
    samples: &[LandmarkVector],
    created_at_unix_ms: u128,
) -> Result<GestureTemplate, RecordError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(RecordError::EmptyName);
    }

    let vector = average_vectors(samples)?;
    Ok(GestureTemplate {
        name: name.to_string(),
        vector,
        sample_count: samples.len(),
        created_at_unix_ms,
    })
}

pub fn record_template(
    name: &str,
    samples: &[LandmarkVector],
) -> Result<GestureTemplate, RecordError> {
    record_template_at(name, samples, current_unix_ms().unwrap_or(0))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordingConfig {
    pub duration_ms: u64,
    pub sample_interval_ms: u64,
    pub landmark_count: usize,
}

impl Default for RecordingConfig {
    fn default() -> Self {
        Self {
            duration_ms: DEFAULT_RECORDING_DURATION_MS,
            sample_interval_ms: DEFAULT_SAMPLE_INTERVAL_MS,
            landmark_count: HAND_LANDMARK_COUNT,
        }
    }
}

/// Collects landmark frames for one named gesture over a fixed capture window.
#[derive(Debug, Clone)]
pub struct RecordingSession {
    name: String,
    config: RecordingConfig,
    started_at_ms: u128,
    last_sample_at_ms: Option<u128>,
    samples: Vec<LandmarkVector>,
}

impl RecordingSession {
    pub fn start(
        name: &str,
        config: RecordingConfig,
        started_at_ms: u128,
    ) -> Result<Self, RecordError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(RecordError::EmptyName);
        }

        Ok(Self {
            name: name.to_string(),
            config,
            started_at_ms,
            last_sample_at_ms: None,
            samples: Vec::new(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }

    pub fn is_expired(&self, now_ms: u128) -> bool {
        now_ms.saturating_sub(self.started_at_ms) >= u128::from(self.config.duration_ms)
    }

    /// Offers one camera frame. Returns whether it was kept as a sample.
    ///
    /// Frames without a hand, with a malformed hand, arriving faster than the
    /// sample interval, or after the window closed are dropped.
    pub fn offer_frame(&mut self, landmarks: Option<&[HandLandmark]>, now_ms: u128) -> bool {
        if self.is_expired(now_ms) {
            return false;
        }

        if let Some(last) = self.last_sample_at_ms {
            if now_ms.saturating_sub(last) < u128::from(self.config.sample_interval_ms) {
                return false;
            }
        }

        let Some(landmarks) = landmarks else {
            return false;
        };

        match vectorize_hand(landmarks, self.config.landmark_count) {
            Ok(vector) => {
                self.samples.push(vector);
                self.last_sample_at_ms = Some(now_ms);
                true
            }
            Err(_) => false,
        }
    }

    /// Closes the session. Yields `None` when no hand was ever captured.
    pub fn finish(self, now_ms: u128) -> Option<GestureTemplate> {
        if self.samples.is_empty() {
            return None;
        }
        record_template_at(&self.name, &self.samples, now_ms).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::landmark::{sample_hand, VECTOR_LEN};

    #[test]
    fn single_sample_is_returned_unchanged() {
        let sample = vec![0.25, 0.5, -0.125, 0.75];
        let template =
            record_template("X", &[sample.clone()]).expect("single sample should record");
        assert_eq!(template.vector, sample);
        assert_eq!(template.sample_count, 1);
        assert_eq!(template.name, "X");
    }

    #[test]
    fn averages_samples_per_dimension() {
        let template = record_template("X", &[vec![0.0, 0.0, 0.0], vec![2.0, 2.0, 2.0]])
            .expect("two samples should record");
        assert_eq!(template.vector, vec![1.0, 1.0, 1.0]);
        assert_eq!(template.sample_count, 2);
    }

    #[test]
    fn rejects_empty_inputs() {
        assert_eq!(record_template("X", &[]), Err(RecordError::NoSamples));
        assert_eq!(
            record_template("   ", &[vec![1.0]]),
            Err(RecordError::EmptyName)
        );
    }

    #[test]
    fn rejects_ragged_samples() {
        let result = record_template("X", &[vec![1.0, 2.0], vec![1.0]]);
        assert_eq!(
            result,
            Err(RecordError::RaggedSamples {
                index: 1,
                expected: 2,
                actual: 1
            })
        );
    }

    #[test]
    fn stamps_creation_time() {
        let template =
            record_template_at("Hello", &[vec![0.5]], 1_234).expect("template should record");
        assert_eq!(template.created_at_unix_ms, 1_234);
    }

    #[test]
    fn session_samples_at_interval_and_skips_empty_frames() {
        let hand = sample_hand(0.0);
        let mut session = RecordingSession::start("Hello", RecordingConfig::default(), 0)
            .expect("session should start");

        assert!(session.offer_frame(Some(&hand), 0));
        assert!(!session.offer_frame(Some(&hand), 50));
        assert!(!session.offer_frame(None, 100));
        assert!(session.offer_frame(Some(&hand), 120));
        assert!(!session.offer_frame(Some(&hand[..10]), 300));
        assert_eq!(session.sample_count(), 2);
    }

    #[test]
    fn session_stops_accepting_after_window() {
        let hand = sample_hand(0.0);
        let mut session = RecordingSession::start("Hello", RecordingConfig::default(), 1_000)
            .expect("session should start");

        assert!(session.offer_frame(Some(&hand), 3_999));
        assert!(session.is_expired(4_000));
        assert!(!session.offer_frame(Some(&hand), 4_100));
        assert_eq!(session.sample_count(), 1);
    }

    #[test]
    fn session_finish_averages_captured_frames() {
        let mut session = RecordingSession::start("Wave", RecordingConfig::default(), 0)
            .expect("session should start");
        session.offer_frame(Some(&sample_hand(0.0)), 0);
        session.offer_frame(Some(&sample_hand(0.1)), 100);

        let template = session.finish(3_000).expect("captured frames should save");
        assert_eq!(template.name, "Wave");
        assert_eq!(template.sample_count, 2);
        assert_eq!(template.vector.len(), VECTOR_LEN);
        assert!((template.vector[0] - 0.35).abs() < 1e-6);
    }

    #[test]
    fn session_without_frames_saves_nothing() {
        let session = RecordingSession::start("Wave", RecordingConfig::default(), 0)
            .expect("session should start");
        assert!(session.finish(3_000).is_none());
    }
}
