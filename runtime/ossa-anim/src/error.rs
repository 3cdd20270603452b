use thiserror::Error;

use crate::animator::PipelineStage;

/// Error types for loading rigs and running the animation pipeline
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnimError {
    /// Skeleton and animation do not correspond joint for joint
    #[error("Track count mismatch: skeleton has {joints} joints, animation has {tracks} tracks")]
    TrackCountMismatch { joints: usize, tracks: usize },

    /// A mesh remaps to a joint the skeleton does not have
    #[error("Mesh {mesh} references joint {joint} but the skeleton only has {joint_count} joints")]
    JointOutOfRange {
        mesh: usize,
        joint: usize,
        joint_count: usize,
    },

    /// Skeleton hierarchy is malformed
    #[error("Invalid skeleton: {0}")]
    InvalidSkeleton(String),

    /// Animation curves are malformed
    #[error("Invalid animation: {0}")]
    InvalidAnimation(String),

    /// Mesh geometry or skinning data is malformed
    #[error("Invalid mesh: {0}")]
    InvalidMesh(String),

    /// A buffer handed to a pipeline stage has the wrong size
    #[error("Buffer size mismatch for {buffer}: expected {expected}, got {actual}")]
    BufferSize {
        buffer: &'static str,
        expected: usize,
        actual: usize,
    },

    /// A job parameter is out of its valid range
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Mesh index does not name an attached mesh
    #[error("Mesh index {index} out of range ({count} meshes attached)")]
    MeshIndex { index: usize, count: usize },

    /// Stored weights of a vertex exceed the configured tolerance
    #[error("Mesh {mesh} part {part} vertex {vertex}: stored weights sum to {sum}")]
    WeightOverflow {
        mesh: usize,
        part: usize,
        vertex: usize,
        sum: f32,
    },

    /// A pipeline stage failed; the remaining stages of the tick were skipped
    #[error("{stage} failed: {source}")]
    Stage {
        stage: PipelineStage,
        source: Box<AnimError>,
    },
}

impl AnimError {
    /// Wrap this error with the pipeline stage it came from
    pub fn at_stage(self, stage: PipelineStage) -> Self {
        Self::Stage {
            stage,
            source: Box::new(self),
        }
    }

    /// The innermost error, looking through stage wrappers
    pub fn root_cause(&self) -> &Self {
        match self {
            Self::Stage { source, .. } => source.root_cause(),
            other => other,
        }
    }
}

/// Result type using AnimError
pub type Result<T> = std::result::Result<T, AnimError>;
