//! Per-instance animator configuration

use crate::skinning::SkinningOptions;

/// Configuration applied when an [`Animator`](crate::Animator) is created
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde-support", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde-support", serde(default))]
pub struct AnimatorConfig {
    /// Initial playback speed, negative values play backward
    pub playback_speed: f32,
    /// Whether playback wraps around at the ends
    pub looping: bool,
    /// Whether playback starts immediately
    pub autoplay: bool,
    /// Reject meshes whose stored weights sum above `1 + tolerance`
    /// (None = accept any weights)
    pub weight_tolerance: Option<f32>,
    /// Options forwarded to every skinning job
    pub skinning: SkinningOptions,
}

impl Default for AnimatorConfig {
    fn default() -> Self {
        Self {
            playback_speed: 1.0,
            looping: true,
            autoplay: true,
            weight_tolerance: None,
            skinning: SkinningOptions::default(),
        }
    }
}

impl AnimatorConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the initial playback speed
    pub fn playback_speed(mut self, speed: f32) -> Self {
        self.playback_speed = speed;
        self
    }

    /// Set whether playback loops
    pub fn looping(mut self, looping: bool) -> Self {
        self.looping = looping;
        self
    }

    /// Set whether playback starts immediately
    pub fn autoplay(mut self, autoplay: bool) -> Self {
        self.autoplay = autoplay;
        self
    }

    /// Enable weight validation when meshes are attached
    pub fn weight_tolerance(mut self, tolerance: f32) -> Self {
        self.weight_tolerance = Some(tolerance);
        self
    }

    /// Set the skinning options
    pub fn skinning(mut self, options: SkinningOptions) -> Self {
        self.skinning = options;
        self
    }
}
