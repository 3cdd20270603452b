//! CPU skeletal animation and skinning runtime
//!
//! This crate animates skinned characters entirely on the CPU. Each tick it
//! advances playback time, samples a keyframe animation into per-joint local
//! transforms, propagates them down the joint hierarchy into model-space
//! matrices, builds per-mesh skinning matrices through a joint remap table and
//! finally deforms mesh positions and normals into a caller-owned buffer.
//!
//! ## Features
//!
//! - Looping or clamped playback with signed playback speed
//! - Cached keyframe cursors, O(1) per curve for monotonic playback
//! - Single-pass, parents-first hierarchy propagation
//! - Skinning specialized for 1, 2 and 4 influences per vertex
//! - Interleaved or separate output attributes
//! - Serde support for all data types (with `serde-support` feature)
//! - Parallel stepping of many instances (with `parallel` feature)
//!
//! ## Example
//!
//! ```
//! use glam::{Quat, Vec3};
//! use ossa_anim::{
//!     Animation, Animator, AnimatorConfig, JointTrack, Keyframe, Skeleton, Transform,
//!     NO_PARENT,
//! };
//!
//! # fn main() -> Result<(), ossa_anim::AnimError> {
//! let skeleton = Skeleton::new(
//!     vec![NO_PARENT, 0],
//!     vec!["root".into(), "tip".into()],
//!     vec![Transform::IDENTITY, Transform::from_translation(Vec3::X)],
//! )?;
//!
//! let spin = JointTrack {
//!     rotations: vec![
//!         Keyframe::new(0.0, Quat::IDENTITY),
//!         Keyframe::new(0.5, Quat::from_rotation_z(std::f32::consts::FRAC_PI_2)),
//!         Keyframe::new(1.0, Quat::from_rotation_z(std::f32::consts::PI)),
//!     ],
//!     ..Default::default()
//! };
//! let hold = JointTrack::constant(Vec3::X, Quat::IDENTITY, Vec3::ONE);
//! let animation = Animation::new("spin", 1.0, vec![spin, hold])?;
//!
//! let mut animator = Animator::new(skeleton, animation, AnimatorConfig::default())?;
//! animator.update(0.5)?;
//!
//! let tip = animator.models()[1].transform_point3(Vec3::ZERO);
//! assert!((tip - Vec3::Y).length() < 1e-5);
//! # Ok(())
//! # }
//! ```

pub mod animation;
pub mod animator;
pub mod bounds;
pub mod config;
pub mod error;
pub mod hierarchy;
pub mod mesh;
pub mod parallel;
pub mod playback;
pub mod sampling;
pub mod skeleton;
pub mod skinning;
pub mod skinning_matrices;
pub mod types;

// Re-export common types
pub use animation::{Animation, JointTrack, Keyframe};
pub use animator::{Animator, PipelineStage};
pub use bounds::Aabb;
pub use config::AnimatorConfig;
pub use error::{AnimError, Result};
pub use hierarchy::{local_to_model, local_to_model_with_root};
pub use mesh::{Mesh, MeshPart};
pub use playback::PlaybackController;
pub use sampling::{SamplingContext, sample};
pub use skeleton::{MAX_JOINTS, NO_PARENT, Skeleton};
pub use skinning::{AttributeSlot, SkinningJob, SkinningOptions, VertexLayout, skin_mesh};
pub use skinning_matrices::build_skinning_matrices;
pub use types::{Lerp, Transform};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
