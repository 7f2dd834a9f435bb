//! Session-lifetime metric accumulation and aggregation.

use std::collections::BTreeMap;

use super::{MetricName, MetricSample, Unit};

/// Aggregate of one metric series at session close.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricSummary {
    pub name: MetricName,
    pub unit: Unit,
    pub min: f64,
    pub max: f64,
    pub range: f64,
}

/// Collects every clean metric value observed during a session.
///
/// All frames feed the accumulator, independent of whether the frame's
/// raw data was persisted by the sampler. NaN and infinite values are
/// discarded on entry and never reach aggregation.
#[derive(Debug, Default)]
pub struct MetricAccumulator {
    series: BTreeMap<MetricName, Vec<f64>>,
}

impl MetricAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, sample: MetricSample) {
        let Some(value) = sample.value else { return };
        if !value.is_finite() {
            return;
        }
        self.series.entry(sample.name).or_default().push(value);
    }

    pub fn record_all(&mut self, samples: &[MetricSample]) {
        for sample in samples {
            self.record(*sample);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.series.values().all(|v| v.is_empty())
    }

    /// Number of clean values recorded for one metric.
    pub fn len(&self, name: MetricName) -> usize {
        self.series.get(&name).map_or(0, |v| v.len())
    }

    /// {min, max, range} per metric. Metrics with zero clean samples are
    /// omitted entirely.
    pub fn summaries(&self) -> Vec<MetricSummary> {
        self.series
            .iter()
            .filter(|(_, values)| !values.is_empty())
            .map(|(name, values)| {
                let min = values.iter().copied().fold(f64::INFINITY, f64::min);
                let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
                MetricSummary {
                    name: *name,
                    unit: name.unit(),
                    min,
                    max,
                    range: max - min,
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(name: MetricName, value: f64) -> MetricSample {
        MetricSample::new(name, Some(value))
    }

    #[test]
    fn test_min_max_range() {
        let mut acc = MetricAccumulator::new();
        for v in [10.0, 20.0, 15.0] {
            acc.record(sample(MetricName::AngleArmR, v));
        }

        let summaries = acc.summaries();
        assert_eq!(summaries.len(), 1);
        let s = &summaries[0];
        assert_eq!(s.min, 10.0);
        assert_eq!(s.max, 20.0);
        assert_eq!(s.range, 10.0);
        assert_eq!(s.unit, Unit::Degrees);
    }

    #[test]
    fn test_nan_and_inf_discarded() {
        let mut acc = MetricAccumulator::new();
        acc.record(sample(MetricName::AngleLegL, f64::NAN));
        acc.record(sample(MetricName::AngleLegL, f64::INFINITY));
        acc.record(sample(MetricName::AngleLegL, 90.0));

        assert_eq!(acc.len(MetricName::AngleLegL), 1);
        let summaries = acc.summaries();
        assert_eq!(summaries[0].min, 90.0);
        assert_eq!(summaries[0].max, 90.0);
    }

    #[test]
    fn test_all_dirty_series_omitted() {
        let mut acc = MetricAccumulator::new();
        acc.record(sample(MetricName::SymmetryElbowY, f64::NAN));
        acc.record(sample(MetricName::SymmetryElbowY, f64::NEG_INFINITY));

        assert!(acc.is_empty());
        assert!(acc.summaries().is_empty());
    }

    #[test]
    fn test_none_values_ignored() {
        let mut acc = MetricAccumulator::new();
        acc.record(MetricSample::new(MetricName::SymmetryAngleArm, None));
        assert!(acc.is_empty());
    }

    #[test]
    fn test_symmetry_summary_carries_pixel_unit() {
        let mut acc = MetricAccumulator::new();
        acc.record(sample(MetricName::SymmetryKneeY, 4.0));
        acc.record(sample(MetricName::SymmetryKneeY, 9.0));

        let summaries = acc.summaries();
        assert_eq!(summaries[0].unit, Unit::Pixels);
        assert_eq!(summaries[0].range, 5.0);
    }

    #[test]
    fn test_independent_series() {
        let mut acc = MetricAccumulator::new();
        acc.record(sample(MetricName::AngleArmR, 30.0));
        acc.record(sample(MetricName::AngleArmL, 60.0));
        acc.record(sample(MetricName::AngleArmR, 50.0));

        assert_eq!(acc.len(MetricName::AngleArmR), 2);
        assert_eq!(acc.len(MetricName::AngleArmL), 1);
        assert_eq!(acc.summaries().len(), 2);
    }
}
