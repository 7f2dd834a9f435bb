//! Per-frame biomechanical metrics.
//!
//! The metric set is a closed enum rather than a free-form map, so the
//! storage schema is statically known and each metric carries its unit as
//! data instead of being inferred from its name.

pub mod accumulator;
pub mod angle;
pub mod joints;
pub mod symmetry;

pub use accumulator::{MetricAccumulator, MetricSummary};
pub use joints::{FrameMetrics, JointFrame, Pt};

/// Unit of a scalar metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unit {
    Degrees,
    Pixels,
}

impl Unit {
    pub fn as_str(&self) -> &'static str {
        match self {
            Unit::Degrees => "degrees",
            Unit::Pixels => "pixels",
        }
    }
}

/// The nine per-frame metrics produced by the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MetricName {
    AngleArmR,
    AngleArmL,
    AngleLegR,
    AngleLegL,
    SymmetryAngleArm,
    SymmetryAngleLeg,
    SymmetryShoulderY,
    SymmetryElbowY,
    SymmetryKneeY,
}

impl MetricName {
    pub const ALL: [MetricName; 9] = [
        MetricName::AngleArmR,
        MetricName::AngleArmL,
        MetricName::AngleLegR,
        MetricName::AngleLegL,
        MetricName::SymmetryAngleArm,
        MetricName::SymmetryAngleLeg,
        MetricName::SymmetryShoulderY,
        MetricName::SymmetryElbowY,
        MetricName::SymmetryKneeY,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MetricName::AngleArmR => "angle_arm_r",
            MetricName::AngleArmL => "angle_arm_l",
            MetricName::AngleLegR => "angle_leg_r",
            MetricName::AngleLegL => "angle_leg_l",
            MetricName::SymmetryAngleArm => "symmetry_angle_arm",
            MetricName::SymmetryAngleLeg => "symmetry_angle_leg",
            MetricName::SymmetryShoulderY => "symmetry_shoulder_y",
            MetricName::SymmetryElbowY => "symmetry_elbow_y",
            MetricName::SymmetryKneeY => "symmetry_knee_y",
        }
    }

    /// Unit attached at the point of definition, not inferred from the name.
    pub fn unit(&self) -> Unit {
        match self {
            MetricName::AngleArmR
            | MetricName::AngleArmL
            | MetricName::AngleLegR
            | MetricName::AngleLegL
            | MetricName::SymmetryAngleArm
            | MetricName::SymmetryAngleLeg => Unit::Degrees,
            MetricName::SymmetryShoulderY
            | MetricName::SymmetryElbowY
            | MetricName::SymmetryKneeY => Unit::Pixels,
        }
    }
}

/// One scalar observation. `None` means the metric could not be computed
/// on this frame (e.g. one side of a symmetry pair was missing).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricSample {
    pub name: MetricName,
    pub value: Option<f64>,
}

impl MetricSample {
    pub fn new(name: MetricName, value: Option<f64>) -> Self {
        Self { name, value }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_tags() {
        assert_eq!(MetricName::AngleArmR.unit(), Unit::Degrees);
        assert_eq!(MetricName::SymmetryAngleLeg.unit(), Unit::Degrees);
        assert_eq!(MetricName::SymmetryKneeY.unit(), Unit::Pixels);
        assert_eq!(MetricName::SymmetryShoulderY.unit(), Unit::Pixels);
    }

    #[test]
    fn test_names_are_unique() {
        let mut names: Vec<&str> = MetricName::ALL.iter().map(|m| m.as_str()).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), MetricName::ALL.len());
    }
}
