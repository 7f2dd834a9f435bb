//! Pixel-space joint snapshot and per-frame metric extraction.

use crate::pose::{LandmarkIndex, LandmarkSet};

use super::angle::interior_angle;
use super::symmetry::{angle_symmetry, y_symmetry};
use super::{MetricName, MetricSample};

/// A 2D point in pixel space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pt {
    pub x: f64,
    pub y: f64,
}

impl Pt {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// The joints of one body side, in pixel space.
#[derive(Debug, Clone, Copy)]
pub struct SideJoints {
    pub shoulder: Pt,
    pub elbow: Pt,
    pub wrist: Pt,
    pub hip: Pt,
    pub knee: Pt,
    pub ankle: Pt,
    pub heel: Pt,
    pub foot_index: Pt,
}

/// Per-frame geometric snapshot. Only constructible when every required
/// joint landmark clears the visibility gate; a frame without one is
/// rendered and encoded but produces no metrics.
#[derive(Debug, Clone, Copy)]
pub struct JointFrame {
    pub left: SideJoints,
    pub right: SideJoints,
}

impl JointFrame {
    /// Denormalizes the 16 joint landmarks to pixel space.
    ///
    /// Returns `None` if any of them is below `min_visibility`.
    pub fn from_landmarks(
        set: &LandmarkSet,
        width: u32,
        height: u32,
        min_visibility: f32,
    ) -> Option<Self> {
        let pixel = |index: LandmarkIndex| -> Option<Pt> {
            let lm = set.get_visible(index, min_visibility)?;
            let (x, y) = lm.to_pixel(width, height);
            Some(Pt::new(x, y))
        };

        Some(Self {
            left: SideJoints {
                shoulder: pixel(LandmarkIndex::LeftShoulder)?,
                elbow: pixel(LandmarkIndex::LeftElbow)?,
                wrist: pixel(LandmarkIndex::LeftWrist)?,
                hip: pixel(LandmarkIndex::LeftHip)?,
                knee: pixel(LandmarkIndex::LeftKnee)?,
                ankle: pixel(LandmarkIndex::LeftAnkle)?,
                heel: pixel(LandmarkIndex::LeftHeel)?,
                foot_index: pixel(LandmarkIndex::LeftFootIndex)?,
            },
            right: SideJoints {
                shoulder: pixel(LandmarkIndex::RightShoulder)?,
                elbow: pixel(LandmarkIndex::RightElbow)?,
                wrist: pixel(LandmarkIndex::RightWrist)?,
                hip: pixel(LandmarkIndex::RightHip)?,
                knee: pixel(LandmarkIndex::RightKnee)?,
                ankle: pixel(LandmarkIndex::RightAnkle)?,
                heel: pixel(LandmarkIndex::RightHeel)?,
                foot_index: pixel(LandmarkIndex::RightFootIndex)?,
            },
        })
    }
}

/// The flat metric map of one frame: four joint angles merged with five
/// bilateral symmetry scores.
#[derive(Debug, Clone, Copy)]
pub struct FrameMetrics {
    pub angle_arm_r: Option<f64>,
    pub angle_arm_l: Option<f64>,
    pub angle_leg_r: Option<f64>,
    pub angle_leg_l: Option<f64>,
    pub symmetry_angle_arm: Option<f64>,
    pub symmetry_angle_leg: Option<f64>,
    pub symmetry_shoulder_y: f64,
    pub symmetry_elbow_y: f64,
    pub symmetry_knee_y: f64,
}

impl FrameMetrics {
    pub fn from_joints(joints: &JointFrame) -> Self {
        let l = &joints.left;
        let r = &joints.right;

        let angle_arm_r = interior_angle(r.shoulder, r.elbow, r.wrist);
        let angle_arm_l = interior_angle(l.shoulder, l.elbow, l.wrist);
        let angle_leg_r = interior_angle(r.hip, r.knee, r.ankle);
        let angle_leg_l = interior_angle(l.hip, l.knee, l.ankle);

        Self {
            angle_arm_r,
            angle_arm_l,
            angle_leg_r,
            angle_leg_l,
            symmetry_angle_arm: angle_symmetry(angle_arm_l, angle_arm_r),
            symmetry_angle_leg: angle_symmetry(angle_leg_l, angle_leg_r),
            symmetry_shoulder_y: y_symmetry(l.shoulder.y, r.shoulder.y),
            symmetry_elbow_y: y_symmetry(l.elbow.y, r.elbow.y),
            symmetry_knee_y: y_symmetry(l.knee.y, r.knee.y),
        }
    }

    /// The frame's metrics as the fixed sample list crossing the storage
    /// boundary.
    pub fn samples(&self) -> [MetricSample; 9] {
        [
            MetricSample::new(MetricName::AngleArmR, self.angle_arm_r),
            MetricSample::new(MetricName::AngleArmL, self.angle_arm_l),
            MetricSample::new(MetricName::AngleLegR, self.angle_leg_r),
            MetricSample::new(MetricName::AngleLegL, self.angle_leg_l),
            MetricSample::new(MetricName::SymmetryAngleArm, self.symmetry_angle_arm),
            MetricSample::new(MetricName::SymmetryAngleLeg, self.symmetry_angle_leg),
            MetricSample::new(MetricName::SymmetryShoulderY, Some(self.symmetry_shoulder_y)),
            MetricSample::new(MetricName::SymmetryElbowY, Some(self.symmetry_elbow_y)),
            MetricSample::new(MetricName::SymmetryKneeY, Some(self.symmetry_knee_y)),
        ]
    }
}
