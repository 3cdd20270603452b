//! Skinning matrix construction
//!
//! A skinning matrix takes a vertex from bind-pose mesh space to the current
//! animated model space: `models[joint_remaps[i]] * inverse_bind_poses[i]`.
//! One matrix is built per remapped joint, so the output is indexed by the
//! mesh-local joint indices stored in mesh parts.

use glam::Mat4;

use crate::error::{AnimError, Result};
use crate::mesh::Mesh;

/// Build the skinning matrices of `mesh` from model-space joint matrices
///
/// # Arguments
///
/// * `models` - Model-space matrix of every skeleton joint
/// * `mesh` - Mesh providing joint remaps and inverse bind poses
/// * `output` - Destination, at least `mesh.joint_remaps.len()` long
///
/// # Returns
///
/// Returns the number of matrices written. Nothing is written on error.
pub fn build_skinning_matrices(models: &[Mat4], mesh: &Mesh, output: &mut [Mat4]) -> Result<usize> {
    let count = mesh.joint_remaps.len();

    if mesh.inverse_bind_poses.len() != count {
        return Err(AnimError::InvalidMesh(format!(
            "{} inverse bind poses for {count} joint remaps",
            mesh.inverse_bind_poses.len()
        )));
    }
    if output.len() < count {
        return Err(AnimError::BufferSize {
            buffer: "skinning matrices",
            expected: count,
            actual: output.len(),
        });
    }
    if let Some(joint) = mesh.highest_joint_index().filter(|&j| j >= models.len()) {
        return Err(AnimError::BufferSize {
            buffer: "model matrices",
            expected: joint + 1,
            actual: models.len(),
        });
    }

    for ((matrix, &joint), inverse_bind) in output
        .iter_mut()
        .zip(&mesh.joint_remaps)
        .zip(&mesh.inverse_bind_poses)
    {
        *matrix = models[joint as usize] * *inverse_bind;
    }

    Ok(count)
}
