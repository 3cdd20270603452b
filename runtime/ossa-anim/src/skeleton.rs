//! Joint hierarchy stored as a flat, parent-sorted array

use crate::error::{AnimError, Result};
use crate::types::Transform;

/// Parent index of root joints
pub const NO_PARENT: i16 = -1;

/// Maximum number of joints a skeleton can hold
pub const MAX_JOINTS: usize = i16::MAX as usize;

/// Immutable joint hierarchy
///
/// Joints are ordered so that every parent comes before its children. This
/// makes local-to-model propagation a single forward pass.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde-support", derive(serde::Serialize, serde::Deserialize))]
pub struct Skeleton {
    /// Parent index per joint, `NO_PARENT` for roots
    joint_parents: Vec<i16>,
    /// Joint names, same order as `joint_parents`
    joint_names: Vec<String>,
    /// Rest pose local transforms
    rest_poses: Vec<Transform>,
}

impl Skeleton {
    /// Create a skeleton, validating the hierarchy
    ///
    /// # Arguments
    /// * `joint_parents` - Parent index for each joint (`NO_PARENT` for roots)
    /// * `joint_names` - Name of each joint
    /// * `rest_poses` - Rest pose local transform of each joint
    pub fn new(
        joint_parents: Vec<i16>,
        joint_names: Vec<String>,
        rest_poses: Vec<Transform>,
    ) -> Result<Self> {
        let skeleton = Self {
            joint_parents,
            joint_names,
            rest_poses,
        };
        skeleton.validate()?;
        Ok(skeleton)
    }

    /// Check array sizes and the topological ordering of joints
    pub fn validate(&self) -> Result<()> {
        let count = self.joint_parents.len();

        if count > MAX_JOINTS {
            return Err(AnimError::InvalidSkeleton(format!(
                "{count} joints exceeds the limit of {MAX_JOINTS}"
            )));
        }
        if self.joint_names.len() != count {
            return Err(AnimError::InvalidSkeleton(format!(
                "{} names for {count} joints",
                self.joint_names.len()
            )));
        }
        if self.rest_poses.len() != count {
            return Err(AnimError::InvalidSkeleton(format!(
                "{} rest poses for {count} joints",
                self.rest_poses.len()
            )));
        }

        for (index, &parent) in self.joint_parents.iter().enumerate() {
            if parent == NO_PARENT {
                continue;
            }
            if parent < 0 || parent as usize >= index {
                return Err(AnimError::InvalidSkeleton(format!(
                    "joint {index} ('{}') has parent {parent}, parents must precede their children",
                    self.joint_names[index]
                )));
            }
        }

        Ok(())
    }

    /// Number of joints
    pub fn num_joints(&self) -> usize {
        self.joint_parents.len()
    }

    pub fn joint_parents(&self) -> &[i16] {
        &self.joint_parents
    }

    pub fn joint_names(&self) -> &[String] {
        &self.joint_names
    }

    pub fn rest_poses(&self) -> &[Transform] {
        &self.rest_poses
    }

    /// Parent of a joint, `None` for roots and out-of-range indices
    pub fn parent(&self, joint: usize) -> Option<usize> {
        match self.joint_parents.get(joint) {
            Some(&parent) if parent != NO_PARENT => Some(parent as usize),
            _ => None,
        }
    }

    pub fn is_root(&self, joint: usize) -> bool {
        self.joint_parents.get(joint) == Some(&NO_PARENT)
    }

    /// Find a joint by name
    pub fn find_joint(&self, name: &str) -> Option<usize> {
        self.joint_names.iter().position(|n| n == name)
    }

    /// Direct children of a joint, in skeleton order
    pub fn children(&self, joint: usize) -> impl Iterator<Item = usize> + '_ {
        self.joint_parents
            .iter()
            .enumerate()
            .skip(joint + 1)
            .filter(move |&(_, &parent)| parent >= 0 && parent as usize == joint)
            .map(|(index, _)| index)
    }

    /// Number of parent links between a joint and its root
    pub fn depth(&self, joint: usize) -> usize {
        let mut depth = 0;
        let mut current = joint;
        while let Some(parent) = self.parent(current) {
            depth += 1;
            current = parent;
        }
        depth
    }
}
