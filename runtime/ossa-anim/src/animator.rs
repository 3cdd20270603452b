//! Per-instance animation pipeline
//!
//! An [`Animator`] owns one skeleton, one animation, any number of meshes and
//! every buffer the pipeline writes. Each tick runs
//!
//! 1. playback: advance the time ratio
//! 2. sampling: evaluate the animation into local transforms
//! 3. local-to-model: propagate the hierarchy into model matrices
//!
//! and each [`Animator::skin_mesh`] call then runs
//!
//! 4. skinning matrix build for that mesh
//! 5. skinning into the caller's vertex buffer
//!
//! All buffers are allocated when the animator is created or meshes are
//! attached, and reused every tick.

use std::fmt;

use glam::Mat4;

use crate::animation::Animation;
use crate::bounds::Aabb;
use crate::config::AnimatorConfig;
use crate::error::{AnimError, Result};
use crate::hierarchy::local_to_model;
use crate::mesh::Mesh;
use crate::playback::PlaybackController;
use crate::sampling::{SamplingContext, sample};
use crate::skeleton::Skeleton;
use crate::skinning::{self, VertexLayout};
use crate::skinning_matrices::build_skinning_matrices;
use crate::types::Transform;

/// Last pipeline stage that completed for an instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PipelineStage {
    Idle,
    TimeAdvanced,
    LocalsSampled,
    ModelsPropagated,
    SkinningMatricesBuilt,
    VerticesSkinned,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::TimeAdvanced => "playback",
            Self::LocalsSampled => "sampling",
            Self::ModelsPropagated => "local-to-model",
            Self::SkinningMatricesBuilt => "skinning matrix build",
            Self::VerticesSkinned => "skinning",
        };
        f.write_str(name)
    }
}

/// One animated, skinned character instance
#[derive(Debug, Clone)]
pub struct Animator {
    skeleton: Skeleton,
    animation: Animation,
    meshes: Vec<Mesh>,
    controller: PlaybackController,
    context: SamplingContext,
    locals: Vec<Transform>,
    models: Vec<Mat4>,
    /// Sized for the mesh with the most joint remaps
    skinning_matrices: Vec<Mat4>,
    /// Matrices written by the last skinning matrix build
    skinning_matrix_count: usize,
    config: AnimatorConfig,
    stage: PipelineStage,
}

impl Animator {
    /// Create an instance playing `animation` on `skeleton`
    ///
    /// Model matrices start out in the skeleton's rest pose.
    ///
    /// # Arguments
    /// * `skeleton` - Joint hierarchy
    /// * `animation` - Animation with one track per joint
    /// * `config` - Initial playback and skinning configuration
    pub fn new(skeleton: Skeleton, animation: Animation, config: AnimatorConfig) -> Result<Self> {
        skeleton.validate()?;
        animation.validate()?;

        let joints = skeleton.num_joints();
        let tracks = animation.num_tracks();
        if joints != tracks {
            return Err(AnimError::TrackCountMismatch { joints, tracks });
        }

        let mut controller = PlaybackController::new();
        controller.set_playback_speed(config.playback_speed);
        controller.set_loop(config.looping);
        controller.set_playing(config.autoplay);

        let locals = skeleton.rest_poses().to_vec();
        let mut models = vec![Mat4::IDENTITY; joints];
        local_to_model(&skeleton, &locals, &mut models)?;

        log::debug!(
            "Created animator for '{}': {} joints, {} keyframes, {:.3}s",
            animation.name(),
            joints,
            animation.keyframe_count(),
            animation.duration()
        );

        Ok(Self {
            skeleton,
            animation,
            meshes: Vec::new(),
            controller,
            context: SamplingContext::new(tracks),
            locals,
            models,
            skinning_matrices: Vec::new(),
            skinning_matrix_count: 0,
            config,
            stage: PipelineStage::Idle,
        })
    }

    /// Attach meshes, consuming and returning the animator
    pub fn with_meshes(mut self, meshes: Vec<Mesh>) -> Result<Self> {
        self.add_meshes(meshes)?;
        Ok(self)
    }

    /// Attach meshes after validating them against the skeleton
    ///
    /// Either every mesh is attached or, on error, none is.
    pub fn add_meshes(&mut self, meshes: Vec<Mesh>) -> Result<()> {
        let first_index = self.meshes.len();

        for (offset, mesh) in meshes.iter().enumerate() {
            let index = first_index + offset;
            mesh.validate().map_err(|e| match e {
                AnimError::InvalidMesh(message) => {
                    AnimError::InvalidMesh(format!("mesh {index}: {message}"))
                }
                other => other,
            })?;
            mesh.validate_against(&self.skeleton, index)?;

            if let Some(tolerance) = self.config.weight_tolerance {
                check_weights(mesh, index, tolerance)?;
            }
        }

        let required = meshes
            .iter()
            .map(|mesh| mesh.joint_remaps.len())
            .max()
            .unwrap_or(0);
        if required > self.skinning_matrices.len() {
            self.skinning_matrices.resize(required, Mat4::IDENTITY);
        }

        log::debug!(
            "Attached {} meshes ({} vertices) to '{}', skinning buffer holds {} matrices",
            meshes.len(),
            meshes.iter().map(Mesh::vertex_count).sum::<usize>(),
            self.animation.name(),
            self.skinning_matrices.len()
        );

        self.meshes.extend(meshes);
        Ok(())
    }

    /// Replace the animation, restarting playback at ratio 0
    pub fn set_animation(&mut self, animation: Animation) -> Result<()> {
        animation.validate()?;

        let joints = self.skeleton.num_joints();
        let tracks = animation.num_tracks();
        if joints != tracks {
            return Err(AnimError::TrackCountMismatch { joints, tracks });
        }

        log::debug!(
            "Switching animation '{}' -> '{}'",
            self.animation.name(),
            animation.name()
        );

        self.animation = animation;
        self.context.invalidate();
        self.controller.set_time_ratio(0.0);
        self.stage = PipelineStage::Idle;
        Ok(())
    }

    /// Advance by `dt` seconds and refresh local transforms and model matrices
    ///
    /// On error the rest of the tick is skipped and buffers keep the values
    /// of the last stage that completed.
    pub fn update(&mut self, dt: f32) -> Result<()> {
        self.stage = PipelineStage::Idle;

        if !dt.is_finite() {
            return Err(self.fail(
                PipelineStage::TimeAdvanced,
                AnimError::InvalidParameter(format!("time delta {dt} is not finite")),
            ));
        }
        self.controller.update(self.animation.duration(), dt);
        self.stage = PipelineStage::TimeAdvanced;

        let ratio = self.controller.time_ratio();
        if let Err(e) = sample(&self.animation, ratio, &mut self.context, &mut self.locals) {
            return Err(self.fail(PipelineStage::LocalsSampled, e));
        }
        self.stage = PipelineStage::LocalsSampled;

        if let Err(e) = local_to_model(&self.skeleton, &self.locals, &mut self.models) {
            return Err(self.fail(PipelineStage::ModelsPropagated, e));
        }
        self.stage = PipelineStage::ModelsPropagated;

        log::trace!("'{}' at ratio {ratio:.4}", self.animation.name());
        Ok(())
    }

    /// Skin attached mesh `index` into `output`
    ///
    /// Rebuilds the shared skinning matrix buffer for this mesh, then skins
    /// every part. Returns the number of vertices written.
    pub fn skin_mesh(&mut self, index: usize, output: &mut [f32], layout: &VertexLayout) -> Result<usize> {
        // Skinning stages reported by a previous call do not carry over
        if matches!(
            self.stage,
            PipelineStage::SkinningMatricesBuilt | PipelineStage::VerticesSkinned
        ) {
            self.stage = PipelineStage::ModelsPropagated;
        }

        let count = self.meshes.len();
        let mesh = self
            .meshes
            .get(index)
            .ok_or(AnimError::MeshIndex { index, count })?;

        let matrices = match build_skinning_matrices(&self.models, mesh, &mut self.skinning_matrices) {
            Ok(matrices) => matrices,
            Err(e) => return Err(stage_failed(&self.animation, PipelineStage::SkinningMatricesBuilt, e)),
        };
        self.skinning_matrix_count = matrices;
        self.stage = PipelineStage::SkinningMatricesBuilt;

        let skinning_matrices = &self.skinning_matrices[..matrices];
        match skinning::skin_mesh(mesh, skinning_matrices, output, layout, self.config.skinning) {
            Ok(vertices) => {
                self.stage = PipelineStage::VerticesSkinned;
                Ok(vertices)
            }
            Err(e) => Err(stage_failed(&self.animation, PipelineStage::VerticesSkinned, e)),
        }
    }

    /// Skin attached mesh `index` using a caller-owned matrix buffer
    ///
    /// Leaves the animator untouched, so several meshes of one instance can
    /// be skinned concurrently with one scratch buffer each.
    pub fn skin_mesh_with_scratch(
        &self,
        index: usize,
        scratch: &mut [Mat4],
        output: &mut [f32],
        layout: &VertexLayout,
    ) -> Result<usize> {
        let mesh = self.mesh(index)?;

        let matrices = build_skinning_matrices(&self.models, mesh, scratch)
            .map_err(|e| stage_failed(&self.animation, PipelineStage::SkinningMatricesBuilt, e))?;

        skinning::skin_mesh(mesh, &scratch[..matrices], output, layout, self.config.skinning)
            .map_err(|e| stage_failed(&self.animation, PipelineStage::VerticesSkinned, e))
    }

    /// Output length needed to skin mesh `index` with `layout`
    pub fn vertex_buffer_len(&self, index: usize, layout: &VertexLayout) -> Option<usize> {
        self.meshes
            .get(index)
            .map(|mesh| layout.required_len(mesh.vertex_count()))
    }

    /// Bounds of the joint origins in model space
    pub fn joint_bounds(&self) -> Option<Aabb> {
        Aabb::from_translations(&self.models)
    }

    /// Bounds of the translations of the last built skinning matrices
    pub fn skinning_bounds(&self) -> Option<Aabb> {
        Aabb::from_translations(self.skinning_matrices())
    }

    pub fn controller(&self) -> &PlaybackController {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut PlaybackController {
        &mut self.controller
    }

    /// Local transforms of the last sampling
    pub fn locals(&self) -> &[Transform] {
        &self.locals
    }

    /// Model-space matrices of the last hierarchy pass
    pub fn models(&self) -> &[Mat4] {
        &self.models
    }

    /// Skinning matrices of the last mesh skinned with [`skin_mesh`](Self::skin_mesh)
    pub fn skinning_matrices(&self) -> &[Mat4] {
        &self.skinning_matrices[..self.skinning_matrix_count]
    }

    /// Capacity of the shared skinning matrix buffer
    pub fn skinning_buffer_len(&self) -> usize {
        self.skinning_matrices.len()
    }

    pub fn meshes(&self) -> &[Mesh] {
        &self.meshes
    }

    /// Attached mesh by index
    pub fn mesh(&self, index: usize) -> Result<&Mesh> {
        self.meshes.get(index).ok_or(AnimError::MeshIndex {
            index,
            count: self.meshes.len(),
        })
    }

    pub fn skeleton(&self) -> &Skeleton {
        &self.skeleton
    }

    pub fn animation(&self) -> &Animation {
        &self.animation
    }

    pub fn config(&self) -> &AnimatorConfig {
        &self.config
    }

    /// Last pipeline stage that completed
    pub fn stage(&self) -> PipelineStage {
        self.stage
    }

    fn fail(&self, stage: PipelineStage, error: AnimError) -> AnimError {
        stage_failed(&self.animation, stage, error)
    }
}

fn stage_failed(animation: &Animation, stage: PipelineStage, error: AnimError) -> AnimError {
    log::warn!("'{}': {stage} failed: {error}", animation.name());
    error.at_stage(stage)
}

fn check_weights(mesh: &Mesh, index: usize, tolerance: f32) -> Result<()> {
    for (part_index, part) in mesh.parts.iter().enumerate() {
        if let Some((vertex, sum)) = part.find_overweight_vertex(tolerance) {
            return Err(AnimError::WeightOverflow {
                mesh: index,
                part: part_index,
                vertex,
                sum,
            });
        }
    }
    Ok(())
}
