//! Playback time control
//!
//! Time is stored as a ratio in the unit interval, as expected by the
//! sampler. The controller converts caller frame deltas into that ratio
//! according to playback speed, play state and loop mode.

/// Normalized playback cursor advanced once per tick
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde-support", derive(serde::Serialize, serde::Deserialize))]
pub struct PlaybackController {
    /// Current time ratio, 0 is the start of the animation and 1 the end
    time_ratio: f32,
    /// Time ratio before the last update
    previous_time_ratio: f32,
    /// Playback speed, negative values play backward
    playback_speed: f32,
    playing: bool,
    looping: bool,
}

impl PlaybackController {
    /// Create a controller at ratio 0, playing forward at speed 1 in loop mode
    pub fn new() -> Self {
        Self {
            time_ratio: 0.0,
            previous_time_ratio: 0.0,
            playback_speed: 1.0,
            playing: true,
            looping: true,
        }
    }

    /// Advance time by `dt` seconds for an animation lasting `duration` seconds
    ///
    /// The ratio is refreshed even while paused so that
    /// [`previous_time_ratio`](Self::previous_time_ratio) always describes the
    /// last frame. `duration` must be positive.
    pub fn update(&mut self, duration: f32, dt: f32) {
        let mut new_ratio = self.time_ratio;

        if self.playing {
            new_ratio = self.time_ratio + dt * self.playback_speed / duration;
        }

        self.set_time_ratio(new_ratio);
    }

    /// Jump to a time ratio, wrapping or clamping it into the unit interval
    pub fn set_time_ratio(&mut self, ratio: f32) {
        self.previous_time_ratio = self.time_ratio;
        if self.looping {
            // floor keeps negative ratios wrapping forward; tiny negatives
            // round up to exactly 1.0, which belongs to the next loop
            let wrapped = ratio - ratio.floor();
            self.time_ratio = if wrapped >= 1.0 { 0.0 } else { wrapped };
        } else {
            self.time_ratio = ratio.clamp(0.0, 1.0);
        }
    }

    pub fn time_ratio(&self) -> f32 {
        self.time_ratio
    }

    /// Time ratio before the last update or seek
    pub fn previous_time_ratio(&self) -> f32 {
        self.previous_time_ratio
    }

    /// Current time in seconds for an animation of the given duration
    pub fn time_seconds(&self, duration: f32) -> f32 {
        self.time_ratio * duration
    }

    pub fn set_playback_speed(&mut self, speed: f32) {
        self.playback_speed = speed;
    }

    pub fn playback_speed(&self) -> f32 {
        self.playback_speed
    }

    pub fn set_loop(&mut self, looping: bool) {
        self.looping = looping;
    }

    pub fn looping(&self) -> bool {
        self.looping
    }

    pub fn set_playing(&mut self, playing: bool) {
        self.playing = playing;
    }

    pub fn play(&mut self) {
        self.playing = true;
    }

    pub fn pause(&mut self) {
        self.playing = false;
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Restore time, speed and play state to their defaults; loop mode is kept
    pub fn reset(&mut self) {
        self.time_ratio = 0.0;
        self.previous_time_ratio = 0.0;
        self.playback_speed = 1.0;
        self.playing = true;
    }
}

impl Default for PlaybackController {
    fn default() -> Self {
        Self::new()
    }
}
