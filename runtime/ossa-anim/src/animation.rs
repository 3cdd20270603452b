//! Keyframe animation data
//!
//! An animation stores one [`JointTrack`] per skeleton joint. Each track holds
//! three sparse curves (translation, rotation, scale) whose keyframes are
//! timestamped by ratio in the unit interval of the animation duration.

use glam::{Quat, Vec3};

use crate::error::{AnimError, Result};

/// A single keyframe of a curve
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde-support", derive(serde::Serialize, serde::Deserialize))]
pub struct Keyframe<T> {
    /// Time of the key as a ratio of the animation duration, in [0, 1]
    pub ratio: f32,
    pub value: T,
}

impl<T> Keyframe<T> {
    pub const fn new(ratio: f32, value: T) -> Self {
        Self { ratio, value }
    }
}

/// Translation, rotation and scale curves of one joint
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde-support", derive(serde::Serialize, serde::Deserialize))]
pub struct JointTrack {
    pub translations: Vec<Keyframe<Vec3>>,
    pub rotations: Vec<Keyframe<Quat>>,
    pub scales: Vec<Keyframe<Vec3>>,
}

impl JointTrack {
    /// Track holding a constant transform
    pub fn constant(translation: Vec3, rotation: Quat, scale: Vec3) -> Self {
        Self {
            translations: vec![Keyframe::new(0.0, translation)],
            rotations: vec![Keyframe::new(0.0, rotation)],
            scales: vec![Keyframe::new(0.0, scale)],
        }
    }

    /// Check if any curve of this track has keyframes
    pub fn has_data(&self) -> bool {
        !self.translations.is_empty() || !self.rotations.is_empty() || !self.scales.is_empty()
    }

    /// Total number of keyframes across the three curves
    pub fn keyframe_count(&self) -> usize {
        self.translations.len() + self.rotations.len() + self.scales.len()
    }
}

/// Immutable animation clip
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde-support", derive(serde::Serialize, serde::Deserialize))]
pub struct Animation {
    name: String,
    /// Duration in seconds
    duration: f32,
    tracks: Vec<JointTrack>,
}

impl Animation {
    /// Create an animation, validating duration and keyframe ordering
    pub fn new(name: impl Into<String>, duration: f32, tracks: Vec<JointTrack>) -> Result<Self> {
        let animation = Self {
            name: name.into(),
            duration,
            tracks,
        };
        animation.validate()?;
        Ok(animation)
    }

    /// Check duration and that every curve is sorted within [0, 1]
    pub fn validate(&self) -> Result<()> {
        if !self.duration.is_finite() || self.duration <= 0.0 {
            return Err(AnimError::InvalidAnimation(format!(
                "'{}' has duration {}, must be finite and positive",
                self.name, self.duration
            )));
        }

        for (index, track) in self.tracks.iter().enumerate() {
            check_curve(&track.translations, index, "translation")?;
            check_curve(&track.rotations, index, "rotation")?;
            check_curve(&track.scales, index, "scale")?;
        }

        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Duration in seconds
    pub fn duration(&self) -> f32 {
        self.duration
    }

    /// Number of joint tracks
    pub fn num_tracks(&self) -> usize {
        self.tracks.len()
    }

    pub fn tracks(&self) -> &[JointTrack] {
        &self.tracks
    }

    /// Total number of keyframes in all tracks
    pub fn keyframe_count(&self) -> usize {
        self.tracks.iter().map(JointTrack::keyframe_count).sum()
    }
}

fn check_curve<T>(keys: &[Keyframe<T>], track: usize, curve: &str) -> Result<()> {
    let mut previous = 0.0f32;
    for (index, key) in keys.iter().enumerate() {
        if !key.ratio.is_finite() || !(0.0..=1.0).contains(&key.ratio) {
            return Err(AnimError::InvalidAnimation(format!(
                "track {track} {curve} key {index} has ratio {} outside [0, 1]",
                key.ratio
            )));
        }
        if key.ratio < previous {
            return Err(AnimError::InvalidAnimation(format!(
                "track {track} {curve} key {index} is out of order ({} < {previous})",
                key.ratio
            )));
        }
        previous = key.ratio;
    }
    Ok(())
}
