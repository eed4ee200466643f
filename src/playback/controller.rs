use crate::core::{HighlightEvent, HighlightSequence};
use crate::playback::{clamp_speed, PlaybackSnapshot, PlaybackState, DEFAULT_SPEED_MS};
use std::time::Duration;

/// Transport state machine over a highlight sequence.
///
/// Holds no timer itself: [`PlaybackController::pending_delay`] tells the owner
/// when a tick is due and [`PlaybackController::advance`] applies it. After
/// every index change `is_playing` is cleared once the last event is reached,
/// so playback never wraps.
#[derive(Debug, Clone)]
pub struct PlaybackController {
    sequence: HighlightSequence,
    current_index: usize,
    is_playing: bool,
    speed_ms: u64,
}

impl Default for PlaybackController {
    fn default() -> Self {
        Self::new()
    }
}

impl PlaybackController {
    pub fn new() -> Self {
        Self::with_speed(DEFAULT_SPEED_MS)
    }

    pub fn with_speed(speed_ms: u64) -> Self {
        Self {
            sequence: Vec::new(),
            current_index: 0,
            is_playing: false,
            speed_ms: clamp_speed(speed_ms),
        }
    }

    /// Replace the sequence and rewind. Speed is kept.
    pub fn load(&mut self, sequence: HighlightSequence) {
        self.sequence = sequence;
        self.current_index = 0;
        self.is_playing = false;
    }

    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }

    pub fn last_index(&self) -> usize {
        if self.is_empty() {
            0
        } else {
            self.sequence.len() - 1
        }
    }

    fn can_advance(&self) -> bool {
        self.current_index < self.last_index()
    }

    fn settle(&mut self) {
        self.is_playing = self.is_playing && self.can_advance();
    }

    /// Start playing. Returns whether playback is now running.
    pub fn play(&mut self) -> bool {
        if self.can_advance() {
            self.is_playing = true;
        }
        self.is_playing
    }

    pub fn pause(&mut self) {
        self.is_playing = false;
    }

    pub fn toggle(&mut self) -> bool {
        if self.is_playing {
            self.pause();
            false
        } else {
            self.play()
        }
    }

    /// Returns true if the index moved
    pub fn step_forward(&mut self) -> bool {
        self.seek(self.current_index + 1)
    }

    /// Returns true if the index moved
    pub fn step_backward(&mut self) -> bool {
        self.seek(self.current_index.saturating_sub(1))
    }

    /// Jump to `index`, clamped to the last event. Returns true if the index moved.
    pub fn seek(&mut self, index: usize) -> bool {
        let target = index.min(self.last_index());
        let moved = target != self.current_index;
        self.current_index = target;
        self.settle();
        moved
    }

    pub fn reset(&mut self) {
        self.current_index = 0;
        self.is_playing = false;
    }

    /// Store a new step delay, clamped to the allowed range
    pub fn set_speed(&mut self, speed_ms: u64) -> u64 {
        self.speed_ms = clamp_speed(speed_ms);
        self.speed_ms
    }

    pub fn speed_ms(&self) -> u64 {
        self.speed_ms
    }

    pub fn is_playing(&self) -> bool {
        self.is_playing
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn current_event(&self) -> Option<&HighlightEvent> {
        self.sequence.get(self.current_index)
    }

    /// Delay until the next automatic step, if one is due
    pub fn pending_delay(&self) -> Option<Duration> {
        (self.is_playing && self.can_advance()).then(|| Duration::from_millis(self.speed_ms))
    }

    /// Apply one timer tick: move forward exactly one event
    pub fn advance(&mut self) -> bool {
        if !self.is_playing || !self.can_advance() {
            self.settle();
            return false;
        }
        self.current_index += 1;
        self.settle();
        true
    }

    pub fn state(&self) -> PlaybackState {
        PlaybackState {
            current_index: self.current_index,
            is_playing: self.is_playing,
            speed_ms: self.speed_ms,
        }
    }

    pub fn snapshot(&self) -> PlaybackSnapshot {
        PlaybackSnapshot {
            state: self.state(),
            len: self.len(),
            event: self.current_event().cloned(),
        }
    }
}
