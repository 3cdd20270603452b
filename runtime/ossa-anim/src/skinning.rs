//! CPU vertex skinning
//!
//! Deforms bind-pose positions and normals by blending the skinning matrices
//! of every joint influencing a vertex. Stored weights cover all influences
//! but the last one, whose weight is implied as one minus the others.
//!
//! Output goes into a single caller-owned `f32` buffer. Each attribute is
//! described by an [`AttributeSlot`] (offset and stride in floats), which
//! covers both interleaved vertex buffers and separate attribute regions.
//!
//! # Example
//!
//! ```rust
//! use glam::{Mat4, Vec3};
//! use ossa_anim::skinning::{AttributeSlot, SkinningJob, SkinningOptions};
//!
//! let matrices = [Mat4::IDENTITY, Mat4::from_translation(Vec3::X)];
//! let job = SkinningJob {
//!     vertex_count: 1,
//!     influences_count: 2,
//!     joint_matrices: &matrices,
//!     joint_indices: &[0, 1],
//!     joint_weights: &[0.3],
//!     in_positions: &[0.0, 0.0, 0.0],
//!     in_normals: None,
//!     options: SkinningOptions::default(),
//! };
//!
//! let mut out = [0.0f32; 3];
//! job.run(&mut out, AttributeSlot::packed(0), None)?;
//! assert!((out[0] - 0.7).abs() < 1e-6);
//! # Ok::<(), ossa_anim::AnimError>(())
//! ```

use glam::{Mat4, Vec3};

use crate::error::{AnimError, Result};
use crate::mesh::{Mesh, MeshPart};

/// Normal written for vertices of parts that carry no normals
pub const DEFAULT_NORMAL: Vec3 = Vec3::Y;

/// Floats in one xyz attribute
const VEC3_LEN: usize = 3;

/// Options for controlling the skinning behavior
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde-support", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde-support", serde(default))]
pub struct SkinningOptions {
    /// Clamp the implied last weight to [0, 1]
    ///
    /// When false the implied weight is used as computed, so stored weights
    /// summing above one give the last influence a negative weight.
    pub clamp_implied_weight: bool,
}

impl SkinningOptions {
    pub fn clamp_implied_weight(mut self, clamp: bool) -> Self {
        self.clamp_implied_weight = clamp;
        self
    }
}

/// Placement of one xyz attribute inside an output buffer, in floats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AttributeSlot {
    /// Index of the first component of vertex 0
    pub offset: usize,
    /// Distance between two consecutive vertices
    pub stride: usize,
}

impl AttributeSlot {
    pub const fn new(offset: usize, stride: usize) -> Self {
        Self { offset, stride }
    }

    /// Tightly packed xyz triples starting at `offset`
    pub const fn packed(offset: usize) -> Self {
        Self::new(offset, VEC3_LEN)
    }

    /// Slot shifted forward by `vertices` vertices
    pub const fn advance(self, vertices: usize) -> Self {
        Self::new(self.offset + vertices * self.stride, self.stride)
    }

    /// Buffer length needed to write `vertex_count` vertices
    pub const fn required_len(&self, vertex_count: usize) -> usize {
        if vertex_count == 0 {
            0
        } else {
            self.offset + (vertex_count - 1) * self.stride + VEC3_LEN
        }
    }

    const fn start(&self, vertex: usize) -> usize {
        self.offset + vertex * self.stride
    }
}

/// Skinning of one run of vertices sharing the same influence count
#[derive(Debug, Clone, Copy)]
pub struct SkinningJob<'a> {
    pub vertex_count: usize,
    /// Joints influencing each vertex, at least 1
    pub influences_count: usize,
    /// Skinning matrices indexed by `joint_indices`
    pub joint_matrices: &'a [Mat4],
    /// `influences_count` indices per vertex
    pub joint_indices: &'a [u16],
    /// `influences_count - 1` weights per vertex
    pub joint_weights: &'a [f32],
    /// Packed xyz bind-pose positions
    pub in_positions: &'a [f32],
    /// Packed xyz bind-pose normals, skinned only when given
    pub in_normals: Option<&'a [f32]>,
    pub options: SkinningOptions,
}

impl<'a> SkinningJob<'a> {
    /// Job skinning all vertices of a mesh part
    pub fn from_part(part: &'a MeshPart, joint_matrices: &'a [Mat4], options: SkinningOptions) -> Self {
        Self {
            vertex_count: part.vertex_count(),
            influences_count: part.influences_count(),
            joint_matrices,
            joint_indices: &part.joint_indices,
            joint_weights: &part.joint_weights,
            in_positions: &part.positions,
            in_normals: part.has_normals().then_some(part.normals.as_slice()),
            options,
        }
    }

    /// Check every precondition of [`run`](Self::run) without writing
    ///
    /// # Arguments
    ///
    /// * `output_len` - Length of the destination buffer
    /// * `positions` - Where skinned positions are written
    /// * `normals` - Where skinned normals are written, if any
    pub fn validate(
        &self,
        output_len: usize,
        positions: AttributeSlot,
        normals: Option<AttributeSlot>,
    ) -> Result<()> {
        let normals = normals.filter(|_| self.in_normals.is_some());
        check_slots(self.vertex_count, output_len, positions, normals)?;

        if self.vertex_count == 0 {
            return Ok(());
        }

        let influences = self.influences_count;
        if influences == 0 {
            return Err(AnimError::InvalidParameter(
                "skinning requires at least one influence per vertex".to_string(),
            ));
        }

        check_input("joint indices", self.joint_indices.len(), self.vertex_count * influences)?;
        check_input("joint weights", self.joint_weights.len(), self.vertex_count * (influences - 1))?;
        check_input("input positions", self.in_positions.len(), self.vertex_count * VEC3_LEN)?;
        if let Some(in_normals) = self.in_normals {
            check_input("input normals", in_normals.len(), self.vertex_count * VEC3_LEN)?;
        }

        let joint_count = self.joint_matrices.len();
        if let Some(&joint) = self.joint_indices[..self.vertex_count * influences]
            .iter()
            .find(|&&j| j as usize >= joint_count)
        {
            return Err(AnimError::InvalidParameter(format!(
                "joint index {joint} is outside the {joint_count} skinning matrices"
            )));
        }

        Ok(())
    }

    /// Skin positions, and normals when both input and slot are given
    ///
    /// Validation runs before the first write, so `output` is untouched on
    /// error. Floats outside the two slots are never written.
    pub fn run(
        &self,
        output: &mut [f32],
        positions: AttributeSlot,
        normals: Option<AttributeSlot>,
    ) -> Result<()> {
        self.validate(output.len(), positions, normals)?;
        self.execute(output, positions, normals);
        Ok(())
    }

    fn execute(&self, output: &mut [f32], positions: AttributeSlot, normals: Option<AttributeSlot>) {
        if self.vertex_count == 0 {
            return;
        }

        let normals = normals.zip(self.in_normals);
        match self.influences_count {
            1 => self.skin_fixed::<1, 0>(output, positions, normals),
            2 => self.skin_fixed::<2, 1>(output, positions, normals),
            4 => self.skin_fixed::<4, 3>(output, positions, normals),
            influences => self.skin_vertices(influences, output, positions, normals),
        }
    }

    /// Skinning loop for `N` influences and `W = N - 1` stored weights
    ///
    /// Indices and weights are read as fixed-size arrays, so the blend has
    /// compile-time bounds for every instance.
    fn skin_fixed<const N: usize, const W: usize>(
        &self,
        output: &mut [f32],
        positions: AttributeSlot,
        normals: Option<(AttributeSlot, &[f32])>,
    ) {
        debug_assert_eq!(N, W + 1);
        let (vertex_indices, _) = self.joint_indices[..self.vertex_count * N].as_chunks::<N>();

        for (vertex, indices) in vertex_indices.iter().enumerate() {
            // Sizes are checked by validate before execution
            let Some(weights) = self.joint_weights[vertex * W..].first_chunk::<W>() else {
                return;
            };
            let matrix = self.blend_fixed(indices, weights);
            self.write_vertex(vertex, &matrix, output, positions, normals);
        }
    }

    fn skin_vertices(
        &self,
        influences: usize,
        output: &mut [f32],
        positions: AttributeSlot,
        normals: Option<(AttributeSlot, &[f32])>,
    ) {
        let weight_stride = influences - 1;

        for vertex in 0..self.vertex_count {
            let indices = &self.joint_indices[vertex * influences..][..influences];
            let weights = &self.joint_weights[vertex * weight_stride..][..weight_stride];
            let matrix = self.blend(indices, weights);
            self.write_vertex(vertex, &matrix, output, positions, normals);
        }
    }

    #[inline(always)]
    fn write_vertex(
        &self,
        vertex: usize,
        matrix: &Mat4,
        output: &mut [f32],
        positions: AttributeSlot,
        normals: Option<(AttributeSlot, &[f32])>,
    ) {
        let position = read_vec3(self.in_positions, vertex);
        write_vec3(output, positions.start(vertex), matrix.transform_point3(position));

        if let Some((slot, in_normals)) = normals {
            let normal = read_vec3(in_normals, vertex);
            write_vec3(output, slot.start(vertex), matrix.transform_vector3(normal));
        }
    }

    #[inline(always)]
    fn blend_fixed<const N: usize, const W: usize>(&self, indices: &[u16; N], weights: &[f32; W]) -> Mat4 {
        let mut matrix = Mat4::ZERO;
        let mut sum = 0.0f32;

        for k in 0..W {
            matrix += self.joint_matrices[indices[k] as usize] * weights[k];
            sum += weights[k];
        }

        matrix + self.joint_matrices[indices[N - 1] as usize] * self.implied_weight(sum)
    }

    /// Weighted sum of the influencing matrices
    fn blend(&self, indices: &[u16], weights: &[f32]) -> Mat4 {
        let mut matrix = Mat4::ZERO;
        let mut sum = 0.0f32;

        for (&joint, &weight) in indices.iter().zip(weights) {
            matrix += self.joint_matrices[joint as usize] * weight;
            sum += weight;
        }

        // indices is never empty, validated by the caller
        let last = indices[indices.len() - 1] as usize;
        matrix + self.joint_matrices[last] * self.implied_weight(sum)
    }

    /// Weight of the last influence, `1 - sum` of the stored ones
    #[inline(always)]
    fn implied_weight(&self, sum: f32) -> f32 {
        let implied = 1.0 - sum;
        if self.options.clamp_implied_weight {
            implied.clamp(0.0, 1.0)
        } else {
            implied
        }
    }
}

/// Interleaving of positions and normals in a vertex buffer, in floats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde-support", derive(serde::Serialize, serde::Deserialize))]
pub struct VertexLayout {
    /// Floats per vertex
    pub stride: usize,
    pub position_offset: usize,
    /// Normals are not written when `None`
    pub normal_offset: Option<usize>,
}

impl VertexLayout {
    /// Position only, packed xyz
    pub const fn positions_only() -> Self {
        Self {
            stride: VEC3_LEN,
            position_offset: 0,
            normal_offset: None,
        }
    }

    /// Position followed by normal, six floats per vertex
    pub const fn interleaved() -> Self {
        Self {
            stride: 2 * VEC3_LEN,
            position_offset: 0,
            normal_offset: Some(VEC3_LEN),
        }
    }

    pub const fn position_slot(&self) -> AttributeSlot {
        AttributeSlot::new(self.position_offset, self.stride)
    }

    pub fn normal_slot(&self) -> Option<AttributeSlot> {
        self.normal_offset
            .map(|offset| AttributeSlot::new(offset, self.stride))
    }

    /// Buffer length needed to hold `vertex_count` vertices
    pub fn required_len(&self, vertex_count: usize) -> usize {
        let positions = self.position_slot().required_len(vertex_count);
        let normals = self
            .normal_slot()
            .map_or(0, |slot| slot.required_len(vertex_count));
        positions.max(normals)
    }
}

impl Default for VertexLayout {
    fn default() -> Self {
        Self::interleaved()
    }
}

/// Skin every part of a mesh into one vertex buffer
///
/// Parts are written back to back in mesh order. Parts without normals get
/// [`DEFAULT_NORMAL`] when the layout has a normal slot. Every part is
/// validated before anything is written.
///
/// # Arguments
///
/// * `mesh` - Mesh to deform
/// * `matrices` - Skinning matrices of the mesh, one per joint remap
/// * `output` - Destination vertex buffer
/// * `layout` - Placement of positions and normals in `output`
/// * `options` - Skinning options
///
/// # Returns
///
/// Returns the number of vertices written
pub fn skin_mesh(
    mesh: &Mesh,
    matrices: &[Mat4],
    output: &mut [f32],
    layout: &VertexLayout,
    options: SkinningOptions,
) -> Result<usize> {
    let positions = layout.position_slot();
    let normals = layout.normal_slot();
    check_slots(mesh.vertex_count(), output.len(), positions, normals)?;

    let mut processed = 0;
    for (index, part) in mesh.parts.iter().enumerate() {
        let job = SkinningJob::from_part(part, matrices, options);
        job.validate(output.len(), positions.advance(processed), normals.map(|s| s.advance(processed)))
            .map_err(|e| match e {
                AnimError::InvalidParameter(message) => {
                    AnimError::InvalidParameter(format!("part {index}: {message}"))
                }
                other => other,
            })?;
        processed += job.vertex_count;
    }

    let mut processed = 0;
    for part in mesh.parts.iter().filter(|p| p.vertex_count() > 0) {
        let job = SkinningJob::from_part(part, matrices, options);
        let part_positions = positions.advance(processed);
        let part_normals = normals.map(|s| s.advance(processed));

        job.execute(output, part_positions, part_normals);

        if let (Some(slot), None) = (part_normals, job.in_normals) {
            for vertex in 0..job.vertex_count {
                write_vec3(output, slot.start(vertex), DEFAULT_NORMAL);
            }
        }

        processed += job.vertex_count;
    }

    Ok(processed)
}

/// Check stride, overlap and output size of the position and normal slots
fn check_slots(
    vertex_count: usize,
    output_len: usize,
    positions: AttributeSlot,
    normals: Option<AttributeSlot>,
) -> Result<()> {
    for slot in std::iter::once(positions).chain(normals) {
        if slot.stride < VEC3_LEN {
            return Err(AnimError::InvalidParameter(format!(
                "stride {} is smaller than one xyz attribute",
                slot.stride
            )));
        }

        let required = slot.required_len(vertex_count);
        if output_len < required {
            return Err(AnimError::BufferSize {
                buffer: "skinned vertices",
                expected: required,
                actual: output_len,
            });
        }
    }

    match normals {
        Some(normals) if vertex_count > 0 && slots_overlap(vertex_count, positions, normals) => {
            Err(AnimError::InvalidParameter(format!(
                "position slot {positions:?} overlaps normal slot {normals:?}"
            )))
        }
        _ => Ok(()),
    }
}

/// Whether two slots write a common float for `vertex_count` vertices
fn slots_overlap(vertex_count: usize, a: AttributeSlot, b: AttributeSlot) -> bool {
    let a_end = a.required_len(vertex_count);
    let b_end = b.required_len(vertex_count);
    if a_end <= b.offset || b_end <= a.offset {
        return false;
    }

    if a.stride != b.stride {
        return true;
    }

    // Same stride: interleaved windows must not collide inside one vertex
    let gap = a.offset.abs_diff(b.offset) % a.stride;
    !(gap >= VEC3_LEN && gap + VEC3_LEN <= a.stride)
}

fn check_input(buffer: &'static str, actual: usize, expected: usize) -> Result<()> {
    if actual < expected {
        return Err(AnimError::BufferSize {
            buffer,
            expected,
            actual,
        });
    }
    Ok(())
}

fn read_vec3(input: &[f32], vertex: usize) -> Vec3 {
    Vec3::from_slice(&input[vertex * VEC3_LEN..][..VEC3_LEN])
}

fn write_vec3(output: &mut [f32], start: usize, value: Vec3) {
    value.write_to_slice(&mut output[start..][..VEC3_LEN]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Quat;

    fn job<'a>(
        influences: usize,
        matrices: &'a [Mat4],
        indices: &'a [u16],
        weights: &'a [f32],
        positions: &'a [f32],
    ) -> SkinningJob<'a> {
        SkinningJob {
            vertex_count: positions.len() / 3,
            influences_count: influences,
            joint_matrices: matrices,
            joint_indices: indices,
            joint_weights: weights,
            in_positions: positions,
            in_normals: None,
            options: SkinningOptions::default(),
        }
    }

    #[test]
    fn test_single_influence() {
        let matrices = [Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0))];
        let positions = [0.0, 0.0, 0.0, 1.0, 1.0, 1.0];
        let mut out = [0.0f32; 6];

        job(1, &matrices, &[0, 0], &[], &positions)
            .run(&mut out, AttributeSlot::packed(0), None)
            .unwrap();

        assert_eq!(out, [1.0, 2.0, 3.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_two_influences_implied_weight() {
        let matrices = [Mat4::IDENTITY, Mat4::from_translation(Vec3::X)];
        let mut out = [0.0f32; 3];

        job(2, &matrices, &[0, 1], &[0.3], &[0.0, 0.0, 0.0])
            .run(&mut out, AttributeSlot::packed(0), None)
            .unwrap();

        assert!((out[0] - 0.7).abs() < 1e-6);
        assert_eq!(out[1], 0.0);
        assert_eq!(out[2], 0.0);
    }

    #[test]
    fn test_overweight_gives_negative_implied_weight() {
        let matrices = [Mat4::IDENTITY, Mat4::from_translation(Vec3::X)];
        let mut out = [0.0f32; 3];

        let mut skin = job(2, &matrices, &[1, 0], &[1.2], &[0.0, 0.0, 0.0]);
        skin.run(&mut out, AttributeSlot::packed(0), None).unwrap();
        // 1.2 * (1,0,0) + (-0.2) * (0,0,0)
        assert!((out[0] - 1.2).abs() < 1e-6);

        let matrices = [Mat4::from_translation(Vec3::X), Mat4::from_translation(Vec3::Y)];
        skin.joint_matrices = &matrices;
        skin.run(&mut out, AttributeSlot::packed(0), None).unwrap();
        // 1.2 * (0,1,0) + (-0.2) * (1,0,0)
        assert!((out[0] + 0.2).abs() < 1e-6);
        assert!((out[1] - 1.2).abs() < 1e-6);

        skin.options = SkinningOptions::default().clamp_implied_weight(true);
        skin.run(&mut out, AttributeSlot::packed(0), None).unwrap();
        assert!(out[0].abs() < 1e-6);
        assert!((out[1] - 1.2).abs() < 1e-6);
    }

    #[test]
    fn test_four_and_three_influences() {
        let matrices = [
            Mat4::from_translation(Vec3::X),
            Mat4::from_translation(Vec3::Y),
            Mat4::from_translation(Vec3::Z),
            Mat4::from_translation(-Vec3::X),
        ];
        let mut out = [0.0f32; 3];

        job(4, &matrices, &[0, 1, 2, 3], &[0.4, 0.3, 0.2], &[0.0, 0.0, 0.0])
            .run(&mut out, AttributeSlot::packed(0), None)
            .unwrap();
        // 0.4 X + 0.3 Y + 0.2 Z - 0.1 X
        assert!((Vec3::from_slice(&out) - Vec3::new(0.3, 0.3, 0.2)).length() < 1e-6);

        job(3, &matrices, &[0, 1, 2], &[0.5, 0.25], &[0.0, 0.0, 0.0])
            .run(&mut out, AttributeSlot::packed(0), None)
            .unwrap();
        assert!((Vec3::from_slice(&out) - Vec3::new(0.5, 0.25, 0.25)).length() < 1e-6);
    }

    #[test]
    fn test_fixed_kernels_match_dynamic_path() {
        let matrices: Vec<Mat4> = (0..5)
            .map(|i| Mat4::from_rotation_translation(Quat::from_rotation_y(i as f32 * 0.4), Vec3::splat(i as f32)))
            .collect();
        let positions = [0.5, -1.0, 2.0, 3.0, 0.0, -0.25, 1.0, 1.0, 1.0];
        let normals = [0.0, 1.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0];
        let slots = (AttributeSlot::new(0, 6), Some(AttributeSlot::new(3, 6)));

        for (influences, indices, weights) in [
            (1, vec![4u16, 0, 2], vec![]),
            (2, vec![0u16, 1, 3, 2, 4, 4], vec![0.25, 0.6, 0.5]),
            (4, vec![0u16, 1, 2, 3, 4, 3, 2, 1, 0, 0, 4, 4], vec![0.1, 0.2, 0.3, 0.5, 0.25, 0.125, 0.4, 0.4, 0.1]),
        ] {
            let mut skin = job(influences, &matrices, &indices, &weights, &positions);
            skin.in_normals = Some(&normals);
            let mut fixed = [0.0f32; 18];
            let mut dynamic = [0.0f32; 18];

            skin.run(&mut fixed, slots.0, slots.1).unwrap();
            skin.skin_vertices(influences, &mut dynamic, slots.0, slots.1.zip(skin.in_normals));

            for (a, b) in fixed.iter().zip(&dynamic) {
                assert!((a - b).abs() < 1e-5, "{influences} influences: {fixed:?} != {dynamic:?}");
            }
        }
    }

    #[test]
    fn test_normals_ignore_translation() {
        let matrices = [Mat4::from_rotation_translation(
            Quat::from_rotation_z(std::f32::consts::FRAC_PI_2),
            Vec3::new(5.0, 5.0, 5.0),
        )];
        let normals = [1.0, 0.0, 0.0];
        let mut skin = job(1, &matrices, &[0], &[], &[0.0, 0.0, 0.0]);
        skin.in_normals = Some(&normals);
        let mut out = [0.0f32; 6];

        skin.run(&mut out, AttributeSlot::new(0, 6), Some(AttributeSlot::new(3, 6)))
            .unwrap();

        assert!((Vec3::from_slice(&out[0..3]) - Vec3::splat(5.0)).length() < 1e-5);
        assert!((Vec3::from_slice(&out[3..6]) - Vec3::Y).length() < 1e-6);
    }

    #[test]
    fn test_interleaved_leaves_padding_untouched() {
        let matrices = [Mat4::IDENTITY];
        let positions = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let mut out = [-1.0f32; 16];

        // 8 floats per vertex, position at 1, padding elsewhere
        job(1, &matrices, &[0, 0], &[], &positions)
            .run(&mut out, AttributeSlot::new(1, 8), None)
            .unwrap();

        assert_eq!(&out[1..4], &[1.0, 2.0, 3.0]);
        assert_eq!(&out[9..12], &[4.0, 5.0, 6.0]);
        assert_eq!(out[0], -1.0);
        assert!(out[4..9].iter().all(|&v| v == -1.0));
        assert!(out[12..].iter().all(|&v| v == -1.0));
    }

    #[test]
    fn test_normals_skipped_without_input() {
        let matrices = [Mat4::IDENTITY];
        let mut out = [-1.0f32; 6];

        job(1, &matrices, &[0], &[], &[1.0, 1.0, 1.0])
            .run(&mut out, AttributeSlot::new(0, 6), Some(AttributeSlot::new(3, 6)))
            .unwrap();

        assert_eq!(&out[3..6], &[-1.0, -1.0, -1.0]);
    }

    #[test]
    fn test_overlapping_slots_rejected() {
        let matrices = [Mat4::IDENTITY];
        let normals = [0.0, 1.0, 0.0, 0.0, 1.0, 0.0];
        let positions = [0.0; 6];
        let mut skin = job(1, &matrices, &[0, 0], &[], &positions);
        skin.in_normals = Some(&normals);
        let mut out = [0.0f32; 12];

        let result = skin.run(&mut out, AttributeSlot::new(0, 6), Some(AttributeSlot::new(2, 6)));
        assert!(matches!(result, Err(AnimError::InvalidParameter(_))));

        let result = skin.run(&mut out, AttributeSlot::packed(0), Some(AttributeSlot::packed(3)));
        assert!(matches!(result, Err(AnimError::InvalidParameter(_))));

        // Separate regions
        skin.run(&mut out, AttributeSlot::packed(0), Some(AttributeSlot::packed(6)))
            .unwrap();
    }

    #[test]
    fn test_failed_run_writes_nothing() {
        let matrices = [Mat4::from_translation(Vec3::X)];
        let positions = [0.0; 6];
        let mut out = [9.0f32; 5];

        // Needs 6 floats for two packed vertices
        let result = job(1, &matrices, &[0, 0], &[], &positions).run(&mut out, AttributeSlot::packed(0), None);
        assert!(matches!(result, Err(AnimError::BufferSize { .. })));
        assert!(out.iter().all(|&v| v == 9.0));

        // Second vertex references a missing matrix
        let mut out = [9.0f32; 6];
        let result = job(1, &matrices, &[0, 1], &[], &positions).run(&mut out, AttributeSlot::packed(0), None);
        assert!(matches!(result, Err(AnimError::InvalidParameter(_))));
        assert!(out.iter().all(|&v| v == 9.0));
    }

    #[test]
    fn test_invalid_parameters_rejected() {
        let matrices = [Mat4::IDENTITY];
        let mut out = [0.0f32; 6];

        let result = job(0, &matrices, &[], &[], &[0.0; 3]).run(&mut out, AttributeSlot::packed(0), None);
        assert!(matches!(result, Err(AnimError::InvalidParameter(_))));

        let result = job(1, &matrices, &[0], &[], &[0.0; 3]).run(&mut out, AttributeSlot::new(0, 2), None);
        assert!(matches!(result, Err(AnimError::InvalidParameter(_))));
    }

    #[test]
    fn test_minimum_output_length_for_interleaved_normals() {
        let matrices = [Mat4::IDENTITY];
        let normals = [0.0, 1.0, 0.0, 0.0, 1.0, 0.0];
        let positions = [0.0; 6];
        let mut skin = job(1, &matrices, &[0, 0], &[], &positions);
        skin.in_normals = Some(&normals);

        // Last normal ends at 3 + 6 + 3 = 12
        let mut out = [0.0f32; 12];
        skin.run(&mut out, AttributeSlot::new(0, 6), Some(AttributeSlot::new(3, 6)))
            .unwrap();
        assert_eq!(&out[9..12], &[0.0, 1.0, 0.0]);
    }

    fn two_part_mesh() -> Mesh {
        Mesh {
            parts: vec![
                MeshPart {
                    positions: vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0],
                    normals: vec![1.0, 0.0, 0.0, 1.0, 0.0, 0.0],
                    joint_indices: vec![0, 0],
                    ..Default::default()
                },
                MeshPart::default(),
                MeshPart {
                    positions: vec![0.0, 1.0, 0.0],
                    joint_indices: vec![0, 1],
                    joint_weights: vec![0.5],
                    ..Default::default()
                },
            ],
            triangle_indices: vec![0, 1, 2],
            joint_remaps: vec![0, 1],
            inverse_bind_poses: vec![Mat4::IDENTITY; 2],
        }
    }

    #[test]
    fn test_skin_mesh_parts_back_to_back() {
        let mesh = two_part_mesh();
        let matrices = [Mat4::IDENTITY, Mat4::from_translation(Vec3::new(0.0, 0.0, 2.0))];
        let layout = VertexLayout::interleaved();
        let mut out = vec![0.0f32; layout.required_len(mesh.vertex_count())];

        let written = skin_mesh(&mesh, &matrices, &mut out, &layout, SkinningOptions::default()).unwrap();

        assert_eq!(written, mesh.vertex_count());
        assert_eq!(&out[6..12], &[1.0, 0.0, 0.0, 1.0, 0.0, 0.0]);
        // Third vertex blends halfway to the translated joint
        assert!((Vec3::from_slice(&out[12..15]) - Vec3::new(0.0, 1.0, 1.0)).length() < 1e-6);
        // Part two has no normals
        assert_eq!(&out[15..18], &[0.0, 1.0, 0.0]);
    }

    #[test]
    fn test_skin_mesh_validates_all_parts_first() {
        let mut mesh = two_part_mesh();
        mesh.parts[2].joint_indices = vec![0, 5];
        let matrices = [Mat4::IDENTITY; 2];
        let layout = VertexLayout::positions_only();
        let mut out = vec![7.0f32; 9];

        let result = skin_mesh(&mesh, &matrices, &mut out, &layout, SkinningOptions::default());

        assert!(matches!(result, Err(AnimError::InvalidParameter(_))));
        assert!(out.iter().all(|&v| v == 7.0));
    }

    #[test]
    fn test_layout_required_len() {
        assert_eq!(VertexLayout::positions_only().required_len(4), 12);
        assert_eq!(VertexLayout::interleaved().required_len(4), 24);
        assert_eq!(VertexLayout::interleaved().required_len(0), 0);
    }
}
