use serde::Serialize;

use crate::landmark::{HandLandmark, HAND_LANDMARK_COUNT};

const THUMB_IP: usize = 3;
const THUMB_TIP: usize = 4;
const INDEX_PIP: usize = 6;
const INDEX_TIP: usize = 8;
const MIDDLE_PIP: usize = 10;
const MIDDLE_TIP: usize = 12;
const RING_PIP: usize = 14;
const RING_TIP: usize = 16;
const PINKY_PIP: usize = 18;
const PINKY_TIP: usize = 20;

/// Minimum horizontal thumb spread for the thumb to count as raised.
const THUMB_SPREAD_MIN: f32 = 0.02;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BuiltinGesture {
    Fist,
    ThumbsUp,
    Peace,
    Wave,
    Point,
    Unknown,
}

impl BuiltinGesture {
    pub fn label(self) -> &'static str {
        match self {
            BuiltinGesture::Fist => "FIST",
            BuiltinGesture::ThumbsUp => "THUMBS_UP",
            BuiltinGesture::Peace => "PEACE",
            BuiltinGesture::Wave => "WAVE",
            BuiltinGesture::Point => "POINT",
            BuiltinGesture::Unknown => "UNKNOWN",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FingerState {
    thumb: bool,
    index: bool,
    middle: bool,
    ring: bool,
    pinky: bool,
}

fn finger_state(landmarks: &[HandLandmark]) -> FingerState {
    // Image y grows downwards, so a raised tip has the smaller y.
    let is_up = |tip: usize, pip: usize| landmarks[tip].y < landmarks[pip].y;
    let thumb = landmarks[THUMB_TIP].y < landmarks[THUMB_IP].y
        && (landmarks[THUMB_TIP].x - landmarks[THUMB_IP].x).abs() > THUMB_SPREAD_MIN;

    FingerState {
        thumb,
        index: is_up(INDEX_TIP, INDEX_PIP),
        middle: is_up(MIDDLE_TIP, MIDDLE_PIP),
        ring: is_up(RING_TIP, RING_PIP),
        pinky: is_up(PINKY_TIP, PINKY_PIP),
    }
}

pub fn classify(landmarks: &[HandLandmark]) -> BuiltinGesture {
    if landmarks.len() < HAND_LANDMARK_COUNT {
        return BuiltinGesture::Unknown;
    }

    let FingerState {
        thumb,
        index,
        middle,
        ring,
        pinky,
    } = finger_state(landmarks);
    let no_fingers = !index && !middle && !ring && !pinky;

    if no_fingers && !thumb {
        return BuiltinGesture::Fist;
    }
    if thumb && no_fingers {
        return BuiltinGesture::ThumbsUp;
    }
    if index && middle && !ring && !pinky && !thumb {
        return BuiltinGesture::Peace;
    }
    if thumb && index && middle && ring && pinky {
        return BuiltinGesture::Wave;
    }
    if index && !middle && !ring && !pinky && !thumb {
        return BuiltinGesture::Point;
    }
    BuiltinGesture::Unknown
}
