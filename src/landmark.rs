use serde::{Deserialize, Serialize};

use crate::error::LandmarkError;

pub const HAND_LANDMARK_COUNT: usize = 21;
pub const COORDS_PER_LANDMARK: usize = 3;
pub const VECTOR_LEN: usize = HAND_LANDMARK_COUNT * COORDS_PER_LANDMARK;

/// One tracked hand joint in normalized image coordinates.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct HandLandmark {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl HandLandmark {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

pub type LandmarkVector = Vec<f32>;

/// Flattens landmarks as `x0, y0, z0, x1, y1, z1, ...`.
///
/// The same ordering is used when recording templates and when matching live
/// frames, which is what makes the Euclidean distance between them meaningful.
pub fn vectorize(landmarks: &[HandLandmark]) -> LandmarkVector {
    let mut vector = Vec::with_capacity(landmarks.len() * COORDS_PER_LANDMARK);
    for landmark in landmarks {
        vector.extend_from_slice(&[landmark.x, landmark.y, landmark.z]);
    }
    vector
}

/// Vectorizes a single hand after checking it has exactly `expected_count` finite points.
pub fn vectorize_hand(
    landmarks: &[HandLandmark],
    expected_count: usize,
) -> Result<LandmarkVector, LandmarkError> {
    if landmarks.len() != expected_count {
        return Err(LandmarkError::CountMismatch {
            expected: expected_count,
            actual: landmarks.len(),
        });
    }

    if let Some(index) = landmarks.iter().position(|landmark| !landmark.is_finite()) {
        return Err(LandmarkError::NonFinite { index });
    }

    Ok(vectorize(landmarks))
}

#[cfg(test)]
pub(crate) fn sample_hand(offset: f32) -> Vec<HandLandmark> {
    (0..HAND_LANDMARK_COUNT)
        .map(|i| {
            let step = i as f32 * 0.01;
            HandLandmark::new(0.3 + step + offset, 0.6 - step + offset, -0.01 * step)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flattens_points_in_xyz_order() {
        let landmarks = vec![
            HandLandmark::new(0.1, 0.2, 0.3),
            HandLandmark::new(0.4, 0.5, -0.6),
        ];
        assert_eq!(vectorize(&landmarks), vec![0.1, 0.2, 0.3, 0.4, 0.5, -0.6]);
    }

    #[test]
    fn empty_input_yields_empty_vector() {
        assert!(vectorize(&[]).is_empty());
    }

    #[test]
    fn full_hand_produces_canonical_length() {
        let vector = vectorize_hand(&sample_hand(0.0), HAND_LANDMARK_COUNT)
            .expect("full hand should vectorize");
        assert_eq!(vector.len(), VECTOR_LEN);
    }

    #[test]
    fn rejects_partial_hand() {
        let partial = &sample_hand(0.0)[..20];
        assert_eq!(
            vectorize_hand(partial, HAND_LANDMARK_COUNT),
            Err(LandmarkError::CountMismatch {
                expected: 21,
                actual: 20
            })
        );
    }

    #[test]
    fn rejects_non_finite_coordinates() {
        let mut hand = sample_hand(0.0);
        hand[4].y = f32::NAN;
        assert_eq!(
            vectorize_hand(&hand, HAND_LANDMARK_COUNT),
            Err(LandmarkError::NonFinite { index: 4 })
        );
    }
}
