pub mod controller;
pub mod engine;

pub use controller::PlaybackController;
pub use engine::PlaybackEngine;

use crate::core::HighlightEvent;

/// Shortest delay between two animation steps
pub const MIN_SPEED_MS: u64 = 100;
/// Longest delay between two animation steps
pub const MAX_SPEED_MS: u64 = 2000;
pub const DEFAULT_SPEED_MS: u64 = 1000;
/// Granularity of the speed slider
pub const SPEED_STEP_MS: u64 = 100;

/// Playback position and transport flags
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaybackState {
    pub current_index: usize,
    pub is_playing: bool,
    pub speed_ms: u64,
}

/// Everything the presentation layer needs to draw one frame
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackSnapshot {
    pub state: PlaybackState,
    pub len: usize,
    pub event: Option<HighlightEvent>,
}

pub fn clamp_speed(ms: u64) -> u64 {
    ms.clamp(MIN_SPEED_MS, MAX_SPEED_MS)
}

/// Map a speed slider position to a step delay. Higher slider, shorter delay.
pub fn slider_to_speed(slider: u64) -> u64 {
    clamp_speed(MIN_SPEED_MS + MAX_SPEED_MS - clamp_speed(slider))
}

pub fn speed_to_slider(speed_ms: u64) -> u64 {
    MIN_SPEED_MS + MAX_SPEED_MS - clamp_speed(speed_ms)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slider_mapping_is_inverted_and_bounded() {
        assert_eq!(slider_to_speed(100), 2000);
        assert_eq!(slider_to_speed(2000), 100);
        assert_eq!(slider_to_speed(1100), 1000);
        assert_eq!(slider_to_speed(0), 2000);
        assert_eq!(slider_to_speed(9000), 100);

        let mut last = u64::MAX;
        for slider in (MIN_SPEED_MS..=MAX_SPEED_MS).step_by(SPEED_STEP_MS as usize) {
            let speed = slider_to_speed(slider);
            assert!(speed < last);
            assert_eq!(speed_to_slider(speed), slider);
            last = speed;
        }
    }
}
