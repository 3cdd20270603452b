// parallel.rs - Stepping many animator instances at once

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::animator::Animator;
use crate::error::Result;

/// Update every animator by `dt` seconds in parallel
///
/// Instances share no state, so one failing does not stop the others.
/// Results are returned in the order of `animators`.
#[cfg(feature = "parallel")]
pub fn update_all(animators: &mut [Animator], dt: f32) -> Vec<Result<()>> {
    animators
        .par_iter_mut()
        .map(|animator| animator.update(dt))
        .collect()
}

/// Update every animator by `dt` seconds sequentially
///
/// Instances share no state, so one failing does not stop the others.
/// Results are returned in the order of `animators`.
#[cfg(not(feature = "parallel"))]
pub fn update_all(animators: &mut [Animator], dt: f32) -> Vec<Result<()>> {
    animators
        .iter_mut()
        .map(|animator| animator.update(dt))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::{Animation, JointTrack, Keyframe};
    use crate::config::AnimatorConfig;
    use crate::skeleton::{NO_PARENT, Skeleton};
    use crate::types::Transform;
    use glam::Vec3;

    fn animator(speed: f32) -> Animator {
        let skeleton = Skeleton::new(vec![NO_PARENT], vec!["root".into()], vec![Transform::IDENTITY]).unwrap();
        let track = JointTrack {
            translations: vec![Keyframe::new(0.0, Vec3::ZERO), Keyframe::new(1.0, Vec3::X)],
            ..Default::default()
        };
        let animation = Animation::new("move", 1.0, vec![track]).unwrap();
        Animator::new(skeleton, animation, AnimatorConfig::new().playback_speed(speed)).unwrap()
    }

    #[test]
    fn test_update_all_steps_every_instance() {
        let mut animators: Vec<Animator> = (1..=4).map(|i| animator(i as f32 * 0.1)).collect();

        let results = update_all(&mut animators, 1.0);

        assert_eq!(results.len(), 4);
        assert!(results.iter().all(Result::is_ok));
        for (i, animator) in animators.iter().enumerate() {
            let expected = (i + 1) as f32 * 0.1;
            assert!((animator.controller().time_ratio() - expected).abs() < 1e-6);
        }
    }

    #[test]
    fn test_failure_is_isolated_per_instance() {
        let mut animators = vec![animator(1.0), animator(1.0)];
        animators[1].controller_mut().set_playback_speed(f32::INFINITY);

        let results = update_all(&mut animators, 0.25);

        assert!(results[0].is_ok());
        assert!(results[1].is_err());
        assert!((animators[0].controller().time_ratio() - 0.25).abs() < 1e-6);
    }
}
