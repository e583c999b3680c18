//! Pipeline soundness checks: frame ranges, coverage and overlaps.

use super::config::{ModelingMethod, PipelineConfig, SimulationJob};

/// Outcome of validating a [`PipelineConfig`].
///
/// Validation never fails as an operation; problems are reported through
/// `errors` (fatal) and `warnings` (informative). Consumers gate execution
/// on `is_valid`.
#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    pub is_valid: bool,
    /// Frames in `[1, totalFrames]` not covered by any enabled job, sorted
    /// ascending.
    pub uncovered_frames: Vec<i32>,
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
}

/// Validates a pipeline configuration.
pub fn validate(config: &PipelineConfig) -> ValidationReport {
    let mut report = ValidationReport {
        errors: validate_job_ranges(config.total_frames, &config.jobs),
        ..Default::default()
    };

    // An invalid range makes coverage meaningless, so range errors
    // short-circuit the coverage check.
    if report.errors.is_empty() {
        report.uncovered_frames = find_uncovered_frames(config.total_frames, &config.jobs);
        if !report.uncovered_frames.is_empty() {
            let list = report
                .uncovered_frames
                .iter()
                .map(|f| f.to_string())
                .collect::<Vec<_>>()
                .join(", ");
            report.errors.push(format!("Uncovered frames: {list}"));
        }
    }

    report.warnings = check_overlaps(&config.jobs);

    if config.step0.method == ModelingMethod::Sigmoid {
        report.warnings.push(
            "Modeling method 'sigmoid' has no generator yet; step 0 produces a flat terrain"
                .to_string(),
        );
    }

    report.is_valid = report.errors.is_empty() && report.uncovered_frames.is_empty();
    report
}

fn validate_job_ranges(total_frames: i32, jobs: &[SimulationJob]) -> Vec<String> {
    let mut errors = Vec::new();

    for job in jobs {
        if job.start_frame < 1 {
            errors.push(format!(
                "Job '{}' has invalid startFrame {} (must be >= 1)",
                job.name, job.start_frame
            ));
        }
        if job.end_frame > total_frames {
            errors.push(format!(
                "Job '{}' has endFrame {} exceeding totalFrames {}",
                job.name, job.end_frame, total_frames
            ));
        }
        if job.start_frame > job.end_frame {
            errors.push(format!(
                "Job '{}' has startFrame {} > endFrame {}",
                job.name, job.start_frame, job.end_frame
            ));
        }
    }

    errors
}

fn find_uncovered_frames(total_frames: i32, jobs: &[SimulationJob]) -> Vec<i32> {
    if total_frames < 1 {
        return Vec::new();
    }
    let mut covered = vec![false; total_frames as usize + 1];

    for job in jobs.iter().filter(|j| j.enabled) {
        let from = job.start_frame.max(1);
        let to = job.end_frame.min(total_frames);
        for frame in from..=to {
            covered[frame as usize] = true;
        }
    }

    (1..=total_frames)
        .filter(|&frame| !covered[frame as usize])
        .collect()
}

fn check_overlaps(jobs: &[SimulationJob]) -> Vec<String> {
    let mut warnings = Vec::new();

    for (i, a) in jobs.iter().enumerate() {
        if !a.enabled {
            continue;
        }
        for b in jobs.iter().skip(i + 1) {
            if !b.enabled {
                continue;
            }
            let overlap_start = a.start_frame.max(b.start_frame);
            let overlap_end = a.end_frame.min(b.end_frame);
            if overlap_start <= overlap_end {
                warnings.push(format!(
                    "Jobs '{}' and '{}' overlap on frames {}-{}",
                    a.name, b.name, overlap_start, overlap_end
                ));
            }
        }
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::config::{HydraulicJobConfig, JobSpec, ModelingSpec};

    fn hydraulic_job(id: &str, start: i32, end: i32) -> SimulationJob {
        SimulationJob {
            id: id.to_string(),
            name: id.to_string(),
            start_frame: start,
            end_frame: end,
            spec: JobSpec::Hydraulic(HydraulicJobConfig::default()),
            enabled: true,
        }
    }

    fn pipeline(total_frames: i32, jobs: Vec<SimulationJob>) -> PipelineConfig {
        PipelineConfig {
            total_frames,
            step0: ModelingSpec::default(),
            jobs,
        }
    }

    #[test]
    fn test_valid_full_coverage() {
        let config = pipeline(5, vec![hydraulic_job("a", 1, 5)]);
        let report = validate(&config);
        assert!(report.is_valid);
        assert!(report.uncovered_frames.is_empty());
        assert!(report.errors.is_empty());
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn test_gap_is_reported() {
        let config = pipeline(5, vec![hydraulic_job("a", 1, 2), hydraulic_job("b", 4, 5)]);
        let report = validate(&config);
        assert!(!report.is_valid);
        assert_eq!(report.uncovered_frames, vec![3]);
        assert!(report
            .errors
            .iter()
            .any(|e| e.contains("Uncovered frames: 3")));
    }

    #[test]
    fn test_overlap_reported_once_with_window() {
        let config = pipeline(5, vec![hydraulic_job("a", 1, 3), hydraulic_job("b", 2, 5)]);
        let report = validate(&config);
        assert!(report.is_valid);
        assert_eq!(report.warnings.len(), 1);
        assert!(report.warnings[0].contains("'a'"));
        assert!(report.warnings[0].contains("'b'"));
        assert!(report.warnings[0].contains("2-3"));
    }

    #[test]
    fn test_inverted_range_is_error() {
        let config = pipeline(5, vec![hydraulic_job("a", 4, 2), hydraulic_job("b", 1, 5)]);
        let report = validate(&config);
        assert!(!report.is_valid);
        assert!(report
            .errors
            .iter()
            .any(|e| e.contains("startFrame") && e.contains("endFrame")));
        // Range errors short-circuit the coverage check.
        assert!(report.uncovered_frames.is_empty());
    }

    #[test]
    fn test_start_frame_below_one_is_error() {
        let config = pipeline(5, vec![hydraulic_job("a", 0, 5)]);
        let report = validate(&config);
        assert!(!report.is_valid);
        assert!(report.errors.iter().any(|e| e.contains("must be >= 1")));
    }

    #[test]
    fn test_end_frame_beyond_total_is_error() {
        let config = pipeline(5, vec![hydraulic_job("a", 1, 9)]);
        let report = validate(&config);
        assert!(!report.is_valid);
        assert!(report
            .errors
            .iter()
            .any(|e| e.contains("exceeding totalFrames")));
    }

    #[test]
    fn test_disabled_jobs_do_not_cover_or_overlap() {
        let mut disabled = hydraulic_job("b", 1, 5);
        disabled.enabled = false;
        let config = pipeline(5, vec![hydraulic_job("a", 1, 3), disabled]);
        let report = validate(&config);
        assert!(!report.is_valid);
        assert_eq!(report.uncovered_frames, vec![4, 5]);
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn test_no_jobs_leaves_all_frames_uncovered() {
        let config = pipeline(3, vec![]);
        let report = validate(&config);
        assert!(!report.is_valid);
        assert_eq!(report.uncovered_frames, vec![1, 2, 3]);
    }

    #[test]
    fn test_sigmoid_step0_warns() {
        let mut config = pipeline(2, vec![hydraulic_job("a", 1, 2)]);
        config.step0.method = ModelingMethod::Sigmoid;
        let report = validate(&config);
        assert!(report.is_valid);
        assert!(report.warnings.iter().any(|w| w.contains("sigmoid")));
    }
}
