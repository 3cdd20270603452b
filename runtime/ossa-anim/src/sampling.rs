//! Keyframe sampling into per-joint local transforms

use glam::{Quat, Vec3};

use crate::animation::{Animation, Keyframe};
use crate::error::{AnimError, Result};
use crate::types::{Lerp, Transform};

/// Keys scanned forward from the cached cursor before falling back to a
/// binary search
const MAX_FORWARD_STEPS: usize = 4;

/// Per-instance sampling cursors
///
/// Caches the index of the last bracketing keyframe of every curve, so that
/// playback advancing a little each tick finds its keys without searching.
/// Cursors are only hints; a stale cursor costs a search but never produces
/// a wrong result.
#[derive(Debug, Clone, Default)]
pub struct SamplingContext {
    translation_cursors: Vec<usize>,
    rotation_cursors: Vec<usize>,
    scale_cursors: Vec<usize>,
}

impl SamplingContext {
    /// Create a context able to sample animations of up to `max_tracks` tracks
    pub fn new(max_tracks: usize) -> Self {
        let mut context = Self::default();
        context.resize(max_tracks);
        context
    }

    /// Resize for a different track count; all cursors are reset
    pub fn resize(&mut self, max_tracks: usize) {
        self.translation_cursors.clear();
        self.translation_cursors.resize(max_tracks, 0);
        self.rotation_cursors.clear();
        self.rotation_cursors.resize(max_tracks, 0);
        self.scale_cursors.clear();
        self.scale_cursors.resize(max_tracks, 0);
    }

    /// Forget cached cursors, e.g. after switching animation
    pub fn invalidate(&mut self) {
        self.translation_cursors.fill(0);
        self.rotation_cursors.fill(0);
        self.scale_cursors.fill(0);
    }

    /// Number of tracks this context can sample
    pub fn max_tracks(&self) -> usize {
        self.translation_cursors.len()
    }
}

/// Sample an animation at `ratio` into one local transform per track
///
/// The ratio is clamped to [0, 1]. Fails without writing if `output` does
/// not match the animation's track count or the context is too small.
pub fn sample(
    animation: &Animation,
    ratio: f32,
    context: &mut SamplingContext,
    output: &mut [Transform],
) -> Result<()> {
    let num_tracks = animation.num_tracks();

    if output.len() != num_tracks {
        return Err(AnimError::BufferSize {
            buffer: "local transforms",
            expected: num_tracks,
            actual: output.len(),
        });
    }
    if context.max_tracks() < num_tracks {
        return Err(AnimError::BufferSize {
            buffer: "sampling context",
            expected: num_tracks,
            actual: context.max_tracks(),
        });
    }
    if ratio.is_nan() {
        return Err(AnimError::InvalidParameter(
            "sampling ratio is NaN".to_string(),
        ));
    }

    let ratio = ratio.clamp(0.0, 1.0);

    for (index, (track, local)) in animation.tracks().iter().zip(output.iter_mut()).enumerate() {
        local.translation = sample_curve(
            &track.translations,
            ratio,
            &mut context.translation_cursors[index],
            Vec3::ZERO,
        );
        local.rotation = sample_curve(
            &track.rotations,
            ratio,
            &mut context.rotation_cursors[index],
            Quat::IDENTITY,
        );
        local.scale = sample_curve(
            &track.scales,
            ratio,
            &mut context.scale_cursors[index],
            Vec3::ONE,
        );
    }

    Ok(())
}

/// Interpolate one curve, updating its cursor
pub fn sample_curve<T: Lerp>(
    keys: &[Keyframe<T>],
    ratio: f32,
    cursor: &mut usize,
    default: T,
) -> T {
    let (Some(first), Some(last)) = (keys.first(), keys.last()) else {
        return default;
    };

    if ratio <= first.ratio {
        *cursor = 0;
        return first.value;
    }
    if ratio > last.ratio {
        *cursor = keys.len() - 1;
        return last.value;
    }

    let index = seek_keyframe(keys, ratio, *cursor);
    *cursor = index;

    // Keys sharing a ratio: the earliest one wins
    if keys[index].ratio == ratio {
        return keys[first_tied(keys, index)].value;
    }

    // first.ratio < ratio < last.ratio, so index + 1 is in range
    let from = &keys[index];
    let to = &keys[index + 1];
    let span = to.ratio - from.ratio;
    let t = if span > 0.0 {
        ((ratio - from.ratio) / span).clamp(0.0, 1.0)
    } else {
        0.0
    };

    from.value.lerp(&to.value, t)
}

fn first_tied<T>(keys: &[Keyframe<T>], mut index: usize) -> usize {
    while index > 0 && keys[index - 1].ratio == keys[index].ratio {
        index -= 1;
    }
    index
}

/// Index of the last key at or before `ratio`, starting the search at `hint`
///
/// Returns the index of the earlier keyframe in the bracketing pair, so the
/// caller interpolates between `[index]` and `[index + 1]`.
pub fn seek_keyframe<T>(keys: &[Keyframe<T>], ratio: f32, hint: usize) -> usize {
    if keys.len() < 2 {
        return 0;
    }

    let last_index = keys.len() - 1;
    let brackets = |i: usize| keys[i].ratio <= ratio && (i == last_index || ratio < keys[i + 1].ratio);

    let mut index = hint.min(last_index);
    if keys[index].ratio <= ratio {
        for _ in 0..MAX_FORWARD_STEPS {
            if brackets(index) {
                return index;
            }
            index += 1;
        }
        if brackets(index) {
            return index;
        }
    }

    // Binary search for the largest index where keys[index].ratio <= ratio
    let mut low = 0;
    let mut high = last_index;

    while low < high {
        let mid = (low + high).div_ceil(2);
        if keys[mid].ratio <= ratio {
            low = mid;
        } else {
            high = mid - 1;
        }
    }

    low
}
