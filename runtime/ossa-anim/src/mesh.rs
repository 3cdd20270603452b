//! Skinned mesh data model
//!
//! A mesh is subdivided into parts that group vertices by their number of
//! joint influences. Triangle indices are shared across all parts, and joint
//! indices stored in parts are mesh-local: they index `joint_remaps`, which in
//! turn holds the skeleton joint indices actually used by the mesh.

use glam::Mat4;

use crate::error::{AnimError, Result};
use crate::skeleton::Skeleton;

/// Portion of a mesh whose vertices share the same influence count
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde-support", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde-support", serde(default))]
pub struct MeshPart {
    pub positions: Vec<f32>,
    pub normals: Vec<f32>,
    pub tangents: Vec<f32>,
    pub uvs: Vec<f32>,
    pub colors: Vec<u8>,
    /// Stride equals `influences_count()`
    pub joint_indices: Vec<u16>,
    /// Stride equals `influences_count() - 1`, the last weight is implied
    pub joint_weights: Vec<f32>,
}

impl MeshPart {
    /// x, y, z components
    pub const POSITION_COMPONENTS: usize = 3;
    /// x, y, z components
    pub const NORMAL_COMPONENTS: usize = 3;
    /// x, y, z, handedness
    pub const TANGENT_COMPONENTS: usize = 4;
    /// u, v components
    pub const UV_COMPONENTS: usize = 2;
    /// r, g, b, a components
    pub const COLOR_COMPONENTS: usize = 4;

    pub fn vertex_count(&self) -> usize {
        self.positions.len() / Self::POSITION_COMPONENTS
    }

    pub fn normal_count(&self) -> usize {
        self.normals.len() / Self::NORMAL_COMPONENTS
    }

    pub fn uv_count(&self) -> usize {
        self.uvs.len() / Self::UV_COMPONENTS
    }

    /// Number of joints influencing each vertex, 0 for an empty part
    pub fn influences_count(&self) -> usize {
        let vertex_count = self.vertex_count();
        if vertex_count == 0 {
            return 0;
        }
        self.joint_indices.len() / vertex_count
    }

    /// Whether the part carries one normal per vertex
    pub fn has_normals(&self) -> bool {
        self.normal_count() == self.vertex_count() && self.normals.len() % Self::NORMAL_COMPONENTS == 0
    }

    /// Check attribute array sizes and joint indices against `num_joints`
    pub fn validate(&self, num_joints: usize) -> Result<()> {
        if self.positions.len() % Self::POSITION_COMPONENTS != 0 {
            return Err(AnimError::InvalidMesh(format!(
                "{} position components is not a multiple of {}",
                self.positions.len(),
                Self::POSITION_COMPONENTS
            )));
        }

        let vertex_count = self.vertex_count();
        if vertex_count == 0 {
            return Ok(());
        }

        let influences = self.influences_count();
        if influences == 0 || self.joint_indices.len() != vertex_count * influences {
            return Err(AnimError::InvalidMesh(format!(
                "{} joint indices for {vertex_count} vertices",
                self.joint_indices.len()
            )));
        }

        let expected_weights = vertex_count * (influences - 1);
        if self.joint_weights.len() != expected_weights {
            return Err(AnimError::InvalidMesh(format!(
                "{} joint weights for {vertex_count} vertices with {influences} influences, expected {expected_weights}",
                self.joint_weights.len()
            )));
        }

        if let Some(&index) = self.joint_indices.iter().find(|&&j| j as usize >= num_joints) {
            return Err(AnimError::InvalidMesh(format!(
                "joint index {index} is outside the mesh's {num_joints} remapped joints"
            )));
        }

        Ok(())
    }

    /// First vertex whose stored weights sum above `1 + tolerance`
    ///
    /// Returns the vertex index and its stored weight sum. Such a vertex gets
    /// a negative implied last weight when skinned.
    pub fn find_overweight_vertex(&self, tolerance: f32) -> Option<(usize, f32)> {
        let stride = self.influences_count().checked_sub(1)?;
        if stride == 0 {
            return None;
        }

        self.joint_weights
            .chunks_exact(stride)
            .map(|weights| weights.iter().sum::<f32>())
            .enumerate()
            .find(|&(_, sum)| sum > 1.0 + tolerance)
    }
}

/// Immutable skinned mesh
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde-support", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde-support", serde(default))]
pub struct Mesh {
    pub parts: Vec<MeshPart>,
    /// Triangle indices, shared across all parts
    pub triangle_indices: Vec<u16>,
    /// Skeleton joint used by each mesh-local joint index, sorted
    pub joint_remaps: Vec<u16>,
    /// Inverse bind-pose matrix of each remapped joint
    pub inverse_bind_poses: Vec<Mat4>,
}

impl Mesh {
    pub fn triangle_index_count(&self) -> usize {
        self.triangle_indices.len()
    }

    /// Number of vertices for all mesh parts
    pub fn vertex_count(&self) -> usize {
        self.parts.iter().map(MeshPart::vertex_count).sum()
    }

    /// Number of normals for all mesh parts
    pub fn normal_count(&self) -> usize {
        self.parts.iter().map(MeshPart::normal_count).sum()
    }

    /// Number of texture coordinates for all mesh parts
    pub fn uv_count(&self) -> usize {
        self.parts.iter().map(MeshPart::uv_count).sum()
    }

    /// Maximum number of joint influences for all mesh parts
    pub fn max_influences_count(&self) -> usize {
        self.parts
            .iter()
            .map(MeshPart::influences_count)
            .max()
            .unwrap_or(0)
    }

    /// Whether the mesh has skinning information
    pub fn is_skinned(&self) -> bool {
        !self.inverse_bind_poses.is_empty()
    }

    /// Number of joints used to skin the mesh
    pub fn num_joints(&self) -> usize {
        self.inverse_bind_poses.len()
    }

    /// Highest skeleton joint used by the mesh
    pub fn highest_joint_index(&self) -> Option<usize> {
        // joint_remaps is sorted
        self.joint_remaps.last().map(|&j| j as usize)
    }

    /// Check internal consistency of remaps, bind poses, parts and indices
    pub fn validate(&self) -> Result<()> {
        if self.inverse_bind_poses.len() != self.joint_remaps.len() {
            return Err(AnimError::InvalidMesh(format!(
                "{} inverse bind poses for {} joint remaps",
                self.inverse_bind_poses.len(),
                self.joint_remaps.len()
            )));
        }

        if let Some(pair) = self.joint_remaps.windows(2).find(|pair| pair[0] >= pair[1]) {
            return Err(AnimError::InvalidMesh(format!(
                "joint remaps must be strictly increasing, found {} before {}",
                pair[0], pair[1]
            )));
        }

        for (index, part) in self.parts.iter().enumerate() {
            part.validate(self.joint_remaps.len())
                .map_err(|e| AnimError::InvalidMesh(format!("part {index}: {e}")))?;
        }

        let vertex_count = self.vertex_count();
        if let Some(&index) = self
            .triangle_indices
            .iter()
            .find(|&&i| i as usize >= vertex_count)
        {
            return Err(AnimError::InvalidMesh(format!(
                "triangle index {index} is outside the mesh's {vertex_count} vertices"
            )));
        }

        Ok(())
    }

    /// Check that every remapped joint exists in `skeleton`
    ///
    /// `mesh_index` is only used to label the error.
    pub fn validate_against(&self, skeleton: &Skeleton, mesh_index: usize) -> Result<()> {
        let joint_count = skeleton.num_joints();
        match self.highest_joint_index() {
            Some(joint) if joint >= joint_count => Err(AnimError::JointOutOfRange {
                mesh: mesh_index,
                joint,
                joint_count,
            }),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::skeleton::NO_PARENT;
    use crate::types::Transform;

    fn part(vertex_count: usize, influences: usize) -> MeshPart {
        MeshPart {
            positions: vec![0.0; vertex_count * 3],
            normals: vec![0.0; vertex_count * 3],
            joint_indices: vec![0; vertex_count * influences],
            joint_weights: vec![0.5; vertex_count * influences.saturating_sub(1)],
            ..Default::default()
        }
    }

    fn mesh(parts: Vec<MeshPart>) -> Mesh {
        Mesh {
            parts,
            triangle_indices: vec![0, 1, 2],
            joint_remaps: vec![0, 3],
            inverse_bind_poses: vec![Mat4::IDENTITY; 2],
        }
    }

    #[test]
    fn test_part_counts() {
        let part = part(4, 2);
        assert_eq!(part.vertex_count(), 4);
        assert_eq!(part.normal_count(), 4);
        assert_eq!(part.influences_count(), 2);
        assert!(part.has_normals());
        assert_eq!(MeshPart::default().influences_count(), 0);
    }

    #[test]
    fn test_mesh_counts() {
        let mesh = mesh(vec![part(2, 1), part(3, 2), part(1, 4)]);

        assert_eq!(mesh.vertex_count(), 6);
        assert_eq!(mesh.max_influences_count(), 4);
        assert_eq!(mesh.highest_joint_index(), Some(3));
        assert_eq!(mesh.num_joints(), 2);
        assert!(mesh.is_skinned());
        mesh.validate().unwrap();
    }

    #[test]
    fn test_unsorted_remaps_rejected() {
        let mut mesh = mesh(vec![part(3, 1)]);
        mesh.joint_remaps = vec![3, 0];
        assert!(matches!(mesh.validate(), Err(AnimError::InvalidMesh(_))));
    }

    #[test]
    fn test_bind_pose_count_mismatch_rejected() {
        let mut mesh = mesh(vec![part(3, 1)]);
        mesh.inverse_bind_poses.pop();
        assert!(matches!(mesh.validate(), Err(AnimError::InvalidMesh(_))));
    }

    #[test]
    fn test_joint_index_beyond_remaps_rejected() {
        let mut bad = part(3, 1);
        bad.joint_indices[2] = 2;
        let mesh = mesh(vec![bad]);
        assert!(matches!(mesh.validate(), Err(AnimError::InvalidMesh(_))));
    }

    #[test]
    fn test_weight_stride_mismatch_rejected() {
        let mut bad = part(3, 2);
        bad.joint_weights.push(0.1);
        assert!(bad.validate(2).is_err());
    }

    #[test]
    fn test_triangle_index_out_of_range_rejected() {
        let mut mesh = mesh(vec![part(2, 1)]);
        mesh.triangle_indices = vec![0, 1, 2];
        assert!(matches!(mesh.validate(), Err(AnimError::InvalidMesh(_))));
    }

    #[test]
    fn test_validate_against_skeleton() {
        let mesh = mesh(vec![part(3, 1)]);
        let small = Skeleton::new(
            vec![NO_PARENT, 0, 1],
            vec!["a".into(), "b".into(), "c".into()],
            vec![Transform::IDENTITY; 3],
        )
        .unwrap();

        assert_eq!(
            mesh.validate_against(&small, 7),
            Err(AnimError::JointOutOfRange {
                mesh: 7,
                joint: 3,
                joint_count: 3
            })
        );
    }

    #[test]
    fn test_find_overweight_vertex() {
        let mut heavy = part(3, 3);
        heavy.joint_weights = vec![0.2, 0.3, 0.7, 0.6, 0.1, 0.1];

        let (vertex, sum) = heavy.find_overweight_vertex(0.01).unwrap();
        assert_eq!(vertex, 1);
        assert!((sum - 1.3).abs() < 0.001);
        assert_eq!(part(3, 1).find_overweight_vertex(0.0), None);
    }
}
