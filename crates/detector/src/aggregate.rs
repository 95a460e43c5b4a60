use crate::classes::DefectClass;
use crate::errors::DetectError;
use crate::processing::post::Detection;

/// Per-class detection counters for a single inference response.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DetectionCounts {
    counts: [usize; DefectClass::ALL.len()],
}

impl DetectionCounts {
    pub fn get(&self, class: DefectClass) -> usize {
        self.counts[class as usize]
    }

    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }
}

/// One display unit: a pathology that was actually found, how often, and its
/// catalog of likely causes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    pub class: DefectClass,
    pub count: usize,
    pub causes: &'static [&'static str; 3],
}

/// Aggregation outcome for one inference response. Zero detections is a
/// distinguished, valid outcome, never an empty finding list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetectionSummary {
    NoDetections,
    Findings(Vec<Finding>),
}

/// Count detections per class in one pass. A detection whose class id does
/// not resolve fails the whole pass.
pub fn tally(detections: &[Detection]) -> Result<DetectionCounts, DetectError> {
    let mut counts = DetectionCounts::default();

    for detection in detections {
        let class = DefectClass::from_id(detection.class_id)?;
        counts.counts[class as usize] += 1;
    }

    Ok(counts)
}

/// Produce the display summary: one finding per class with a non-zero count,
/// in class declaration order, or the no-detections sentinel.
pub fn summarize(detections: &[Detection]) -> Result<DetectionSummary, DetectError> {
    let counts = tally(detections)?;

    if counts.total() == 0 {
        return Ok(DetectionSummary::NoDetections);
    }

    let findings = DefectClass::ALL
        .iter()
        .filter(|class| counts.get(**class) > 0)
        .map(|class| Finding {
            class: *class,
            count: counts.get(*class),
            causes: class.causes(),
        })
        .collect();

    Ok(DetectionSummary::Findings(findings))
}
