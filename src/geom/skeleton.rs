//! Skeleton definition and per-frame joint poses.
//!
//! The definition (joint names, parent indices, neutral pose) is decoded once
//! per loop epoch. Joint poses are decoded every frame into a reused
//! [`SkeletonFrame`] that is parallel to the definition's joint list.

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::stream::ByteCursor;
use crate::util::{Error, Result, Transform};

/// Parent index marking a root joint.
pub const NO_PARENT: i32 = -1;

/// Joint count of the body-tracking rig.
pub const BODY_JOINT_COUNT: usize = 21;

/// Upper bound on speculative preallocation for count-prefixed sections.
fn capacity_hint(count: usize, cursor: &ByteCursor, min_record: usize) -> usize {
    count.min(cursor.available() / min_record.max(1))
}

/// Static skeleton description.
///
/// Invariant for well-formed input: the three vectors have equal length and
/// every parent index is either [`NO_PARENT`] or refers to an earlier joint.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SkeletonDefinition {
    pub joint_names: Vec<String>,
    pub parent_indices: Vec<i32>,
    pub neutral_transforms: Vec<Transform>,
}

impl SkeletonDefinition {
    /// Decode `jointCount names parentCount parents neutral-matrices`.
    ///
    /// Stops early once the cursor overflows; the result is then partial.
    pub fn read(cursor: &mut ByteCursor) -> Self {
        let joint_count = cursor.read_i32().max(0) as usize;

        let mut joint_names = Vec::with_capacity(capacity_hint(joint_count, cursor, 4));
        for _ in 0..joint_count {
            if cursor.has_overflow() {
                break;
            }
            joint_names.push(cursor.read_string());
        }

        let parent_count = cursor.read_i32().max(0) as usize;
        let mut parent_indices = Vec::with_capacity(capacity_hint(parent_count, cursor, 4));
        for _ in 0..parent_count {
            if cursor.has_overflow() {
                break;
            }
            parent_indices.push(cursor.read_i32());
        }

        let mut neutral_transforms = Vec::with_capacity(capacity_hint(joint_count, cursor, 64));
        for _ in 0..joint_count {
            if cursor.has_overflow() {
                break;
            }
            neutral_transforms.push(cursor.read_transform());
        }

        debug!(
            joints = joint_names.len(),
            parents = parent_indices.len(),
            overflow = cursor.has_overflow(),
            "decoded skeleton definition"
        );

        Self { joint_names, parent_indices, neutral_transforms }
    }

    /// Number of joints.
    #[inline]
    pub fn joint_count(&self) -> usize {
        self.joint_names.len()
    }

    /// Check if the skeleton has no joints.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.joint_names.is_empty()
    }

    /// Parent of joint `index`, `None` for roots and unknown joints.
    pub fn parent(&self, index: usize) -> Option<usize> {
        match self.parent_indices.get(index) {
            Some(&p) if p >= 0 => Some(p as usize),
            _ => None,
        }
    }

    /// Find a joint by name.
    pub fn joint_index(&self, name: &str) -> Option<usize> {
        self.joint_names.iter().position(|n| n == name)
    }

    /// Direct children of joint `index`.
    pub fn children(&self, index: usize) -> impl Iterator<Item = usize> + '_ {
        self.parent_indices
            .iter()
            .enumerate()
            .filter(move |(_, &p)| p >= 0 && p as usize == index)
            .map(|(i, _)| i)
    }

    /// Joints without a parent.
    pub fn roots(&self) -> impl Iterator<Item = usize> + '_ {
        self.parent_indices
            .iter()
            .enumerate()
            .filter(|(_, &p)| p == NO_PARENT)
            .map(|(i, _)| i)
    }

    /// Verify the structural invariants: parallel lengths, unique names and
    /// a tree ordered parents-first.
    pub fn validate(&self) -> Result<()> {
        let n = self.joint_count();
        if self.parent_indices.len() != n || self.neutral_transforms.len() != n {
            return Err(Error::invalid_skeleton(format!(
                "{} names, {} parents, {} neutral transforms",
                n,
                self.parent_indices.len(),
                self.neutral_transforms.len()
            )));
        }

        for (i, name) in self.joint_names.iter().enumerate() {
            if self.joint_names[..i].contains(name) {
                return Err(Error::invalid_skeleton(format!("duplicate joint name '{}'", name)));
            }
        }

        for (i, &p) in self.parent_indices.iter().enumerate() {
            if p != NO_PARENT && !(0..i as i32).contains(&p) {
                return Err(Error::invalid_skeleton(format!(
                    "joint {} ('{}') has parent {}",
                    i, self.joint_names[i], p
                )));
            }
        }
        Ok(())
    }

    /// Reject parent indices at or above a consumer's rig size.
    pub fn check_rig_limit(&self, limit: usize) -> Result<()> {
        for (joint, &parent) in self.parent_indices.iter().enumerate() {
            check_parent(joint, parent, Some(limit))?;
        }
        Ok(())
    }
}

fn check_parent(joint: usize, parent: i32, limit: Option<usize>) -> Result<()> {
    if parent < NO_PARENT {
        return Err(Error::invalid_skeleton(format!("joint {} has parent {}", joint, parent)));
    }
    if let Some(limit) = limit {
        if parent >= 0 && parent as usize >= limit {
            return Err(Error::JointLimitExceeded { joint, parent, limit });
        }
    }
    Ok(())
}

/// Joint poses of one frame, reused across ticks.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SkeletonFrame {
    transforms: Vec<Transform>,
    instance_count: u32,
}

impl SkeletonFrame {
    /// A frame of `joint_count` identity poses.
    pub fn with_joints(joint_count: usize) -> Self {
        Self { transforms: vec![Transform::IDENTITY; joint_count], instance_count: 0 }
    }

    /// Reset to `joint_count` identity poses.
    pub fn resize(&mut self, joint_count: usize) {
        self.transforms.clear();
        self.transforms.resize(joint_count, Transform::IDENTITY);
        self.instance_count = 0;
    }

    /// Decode one skeleton record in place: instance count, then one matrix
    /// per joint. Only a single tracked skeleton is decoded per record.
    pub fn read_from(&mut self, cursor: &mut ByteCursor) {
        self.instance_count = cursor.read_u32();
        if self.instance_count > 1 {
            debug!(instances = self.instance_count, "decoding first of several skeletons");
        }
        for t in self.transforms.iter_mut() {
            if cursor.has_overflow() {
                break;
            }
            let decoded = cursor.read_transform();
            if !cursor.has_overflow() {
                *t = decoded;
            }
        }
        trace!(joints = self.transforms.len(), offset = cursor.tell(), "decoded skeleton frame");
    }

    /// Skeleton instance count stored in the last record.
    #[inline]
    pub fn instance_count(&self) -> u32 {
        self.instance_count
    }

    /// Joint poses in definition order.
    #[inline]
    pub fn transforms(&self) -> &[Transform] {
        &self.transforms
    }

    /// Pose of one joint.
    #[inline]
    pub fn get(&self, index: usize) -> Option<&Transform> {
        self.transforms.get(index)
    }

    /// Number of joints.
    #[inline]
    pub fn len(&self) -> usize {
        self.transforms.len()
    }

    /// Check if the frame has no joints.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.transforms.is_empty()
    }

    /// Every joint expressed in its parent's space (`child * parent⁻¹`).
    ///
    /// Roots are relative to identity. `max_joints` caps parent indices the
    /// way a fixed-size consumer rig does.
    pub fn relative_transforms(
        &self,
        definition: &SkeletonDefinition,
        max_joints: Option<usize>,
    ) -> Result<Vec<Transform>> {
        let mut out = Vec::with_capacity(self.transforms.len());
        for (i, child) in self.transforms.iter().enumerate() {
            let parent = *definition.parent_indices.get(i).ok_or_else(|| {
                Error::invalid_skeleton(format!("joint {} has no parent entry", i))
            })?;
            check_parent(i, parent, max_joints)?;

            let parent_t = if parent == NO_PARENT {
                Transform::IDENTITY
            } else {
                *self.transforms.get(parent as usize).ok_or(Error::JointOutOfBounds {
                    index: parent as usize,
                    count: self.transforms.len(),
                })?
            };
            out.push(child.relative_to(&parent_t));
        }
        Ok(out)
    }
}

/// Joints of the 21-joint body-tracking rig, in skeleton index order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum JointIndex {
    Root,
    Pelvis,
    Spine01,
    Spine02,
    Spine03,
    Neck01,
    Head,
    ClavicleL,
    UpperarmL,
    LowerarmL,
    HandL,
    ClavicleR,
    UpperarmR,
    LowerarmR,
    HandR,
    ThighL,
    CalfL,
    FootL,
    ThighR,
    CalfR,
    FootR,
}

impl JointIndex {
    /// All joints in index order.
    pub const ALL: [JointIndex; BODY_JOINT_COUNT] = [
        Self::Root, Self::Pelvis, Self::Spine01, Self::Spine02, Self::Spine03,
        Self::Neck01, Self::Head, Self::ClavicleL, Self::UpperarmL, Self::LowerarmL,
        Self::HandL, Self::ClavicleR, Self::UpperarmR, Self::LowerarmR, Self::HandR,
        Self::ThighL, Self::CalfL, Self::FootL, Self::ThighR, Self::CalfR, Self::FootR,
    ];

    /// Joint at skeleton index `i`.
    pub fn from_index(i: usize) -> Option<Self> {
        Self::ALL.get(i).copied()
    }

    /// Skeleton index of this joint.
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Rig bone name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Root => "root",
            Self::Pelvis => "pelvis",
            Self::Spine01 => "spine_01",
            Self::Spine02 => "spine_02",
            Self::Spine03 => "spine_03",
            Self::Neck01 => "neck_01",
            Self::Head => "head",
            Self::ClavicleL => "clavicle_l",
            Self::UpperarmL => "upperarm_l",
            Self::LowerarmL => "lowerarm_l",
            Self::HandL => "hand_l",
            Self::ClavicleR => "clavicle_r",
            Self::UpperarmR => "upperarm_r",
            Self::LowerarmR => "lowerarm_r",
            Self::HandR => "hand_r",
            Self::ThighL => "thigh_l",
            Self::CalfL => "calf_l",
            Self::FootL => "foot_l",
            Self::ThighR => "thigh_r",
            Self::CalfR => "calf_r",
            Self::FootR => "foot_r",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::{Quat, Vec3};

    fn chain(names: &[&str], parents: &[i32]) -> SkeletonDefinition {
        SkeletonDefinition {
            joint_names: names.iter().map(|s| s.to_string()).collect(),
            parent_indices: parents.to_vec(),
            neutral_transforms: vec![Transform::IDENTITY; names.len()],
        }
    }

    #[test]
    fn test_hierarchy_queries() {
        let def = chain(&["root", "hips", "spine", "leg"], &[-1, 0, 1, 1]);
        assert!(def.validate().is_ok());
        assert_eq!(def.parent(0), None);
        assert_eq!(def.parent(3), Some(1));
        assert_eq!(def.joint_index("spine"), Some(2));
        assert_eq!(def.children(1).collect::<Vec<_>>(), vec![2, 3]);
        assert_eq!(def.roots().collect::<Vec<_>>(), vec![0]);
    }

    #[test]
    fn test_validate_rejects_forward_parent() {
        let def = chain(&["a", "b"], &[1, -1]);
        assert!(matches!(def.validate(), Err(Error::InvalidSkeleton(_))));

        let def = chain(&["a", "b"], &[-1, 1]);
        assert!(def.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_mismatch_and_duplicates() {
        let mut def = chain(&["a", "b"], &[-1, 0]);
        def.parent_indices.pop();
        assert!(def.validate().is_err());

        let def = chain(&["a", "a"], &[-1, 0]);
        assert!(def.validate().is_err());
    }

    #[test]
    fn test_rig_limit() {
        let def = chain(&["a", "b", "c"], &[-1, 0, 1]);
        assert!(def.check_rig_limit(21).is_ok());
        assert!(matches!(
            def.check_rig_limit(1),
            Err(Error::JointLimitExceeded { joint: 2, parent: 1, limit: 1 })
        ));
    }

    #[test]
    fn test_relative_transforms() {
        let def = chain(&["root", "child"], &[-1, 0]);
        let mut frame = SkeletonFrame::with_joints(2);
        frame.transforms[0] = Transform::new(Vec3::new(10.0, 0.0, 0.0), Quat::IDENTITY);
        frame.transforms[1] = Transform::new(Vec3::new(10.0, 5.0, 0.0), Quat::from_rotation_z(0.5));

        let rel = frame.relative_transforms(&def, Some(BODY_JOINT_COUNT)).unwrap();
        assert_eq!(rel[0], frame.transforms[0]);
        assert!((rel[1].translation - Vec3::new(0.0, 5.0, 0.0)).length() < 1.0e-5);
        assert!(rel[1].rotation.abs_diff_eq(Quat::from_rotation_z(0.5), 1.0e-6));
    }

    #[test]
    fn test_relative_transforms_rejects_bad_parent() {
        let def = chain(&["root", "child"], &[-1, 5]);
        let frame = SkeletonFrame::with_joints(2);
        assert!(matches!(
            frame.relative_transforms(&def, None),
            Err(Error::JointOutOfBounds { index: 5, count: 2 })
        ));
        assert!(matches!(
            frame.relative_transforms(&def, Some(3)),
            Err(Error::JointLimitExceeded { .. })
        ));
    }

    #[test]
    fn test_resize_resets_to_identity() {
        let mut frame = SkeletonFrame::with_joints(1);
        frame.transforms[0] = Transform::from_translation(Vec3::ONE);
        frame.resize(3);
        assert_eq!(frame.len(), 3);
        assert!(frame.transforms().iter().all(|t| *t == Transform::IDENTITY));
    }

    #[test]
    fn test_joint_index() {
        assert_eq!(JointIndex::ALL.len(), BODY_JOINT_COUNT);
        for (i, j) in JointIndex::ALL.iter().enumerate() {
            assert_eq!(j.index(), i);
            assert_eq!(JointIndex::from_index(i), Some(*j));
        }
        assert_eq!(JointIndex::FootR.index(), 20);
        assert_eq!(JointIndex::Head.name(), "head");
        assert_eq!(JointIndex::from_index(21), None);
    }
}
