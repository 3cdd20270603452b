//! Local-to-model transform propagation
//!
//! Composes each joint's local transform with its parent's model-space matrix.
//! Joints are stored parents-first, so one forward pass over the skeleton is
//! enough and no joint is visited twice.

use glam::Mat4;

use crate::error::{AnimError, Result};
use crate::skeleton::{NO_PARENT, Skeleton};
use crate::types::Transform;

/// Compute model-space matrices from local transforms
pub fn local_to_model(skeleton: &Skeleton, locals: &[Transform], models: &mut [Mat4]) -> Result<()> {
    local_to_model_with_root(skeleton, &Mat4::IDENTITY, locals, models)
}

/// Compute model-space matrices, pre-multiplying root joints by `root`
pub fn local_to_model_with_root(
    skeleton: &Skeleton,
    root: &Mat4,
    locals: &[Transform],
    models: &mut [Mat4],
) -> Result<()> {
    let count = skeleton.num_joints();

    if locals.len() != count {
        return Err(AnimError::BufferSize {
            buffer: "local transforms",
            expected: count,
            actual: locals.len(),
        });
    }
    if models.len() != count {
        return Err(AnimError::BufferSize {
            buffer: "model matrices",
            expected: count,
            actual: models.len(),
        });
    }

    for (index, &parent) in skeleton.joint_parents().iter().enumerate() {
        let local = locals[index].to_matrix();

        models[index] = if parent == NO_PARENT {
            *root * local
        } else {
            // Parent index is smaller than index, already computed this pass
            models[parent as usize] * local
        };
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{Quat, Vec3};

    fn skeleton(parents: Vec<i16>) -> Skeleton {
        let count = parents.len();
        Skeleton::new(
            parents,
            (0..count).map(|i| format!("j{i}")).collect(),
            vec![Transform::IDENTITY; count],
        )
        .unwrap()
    }

    #[test]
    fn test_root_identity() {
        let skeleton = skeleton(vec![NO_PARENT]);
        let mut models = vec![Mat4::ZERO; 1];

        local_to_model(&skeleton, &[Transform::IDENTITY], &mut models).unwrap();
        assert_eq!(models[0], Mat4::IDENTITY);
    }

    #[test]
    fn test_parent_chain() {
        // Root translates by (1,0,0), child translates by (0,1,0)
        let skeleton = skeleton(vec![NO_PARENT, 0]);
        let locals = [
            Transform::from_translation(Vec3::X),
            Transform::from_translation(Vec3::Y),
        ];
        let mut models = vec![Mat4::IDENTITY; 2];

        local_to_model(&skeleton, &locals, &mut models).unwrap();

        let p = models[1].transform_point3(Vec3::ZERO);
        assert!((p - Vec3::new(1.0, 1.0, 0.0)).length() < 1e-6);
    }

    #[test]
    fn test_parent_rotation_applies_to_child_offset() {
        let skeleton = skeleton(vec![NO_PARENT, 0, 1]);
        let locals = [
            Transform::from_rotation(Quat::from_rotation_z(std::f32::consts::FRAC_PI_2)),
            Transform::from_translation(Vec3::X),
            Transform::from_translation(Vec3::X),
        ];
        let mut models = vec![Mat4::IDENTITY; 3];

        local_to_model(&skeleton, &locals, &mut models).unwrap();

        let p = models[2].transform_point3(Vec3::ZERO);
        assert!((p - Vec3::new(0.0, 2.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn test_root_matrix_applies_to_every_root() {
        let skeleton = skeleton(vec![NO_PARENT, NO_PARENT]);
        let root = Mat4::from_translation(Vec3::Z);
        let mut models = vec![Mat4::IDENTITY; 2];

        local_to_model_with_root(&skeleton, &root, &[Transform::IDENTITY; 2], &mut models).unwrap();

        assert_eq!(models[0], root);
        assert_eq!(models[1], root);
    }

    #[test]
    fn test_size_mismatch_rejected() {
        let skeleton = skeleton(vec![NO_PARENT, 0]);
        let mut models = vec![Mat4::IDENTITY; 1];

        let result = local_to_model(&skeleton, &[Transform::IDENTITY; 2], &mut models);
        assert!(matches!(result, Err(AnimError::BufferSize { .. })));
    }
}
