use std::path::Path;
use std::time::Duration;

use tokio::fs;
use tracing::warn;
use uuid::Uuid;

use crate::error::{EngineError, Result};
use crate::fallback;
use crate::infer::{ChapterInference, InferenceError};
use crate::sample::{render_sample, sample_segments};
use crate::snap::snap_candidates;
use crate::types::{ChapterSource, GenerationReport, Layout, Transcript};

pub const MIN_CHAPTERS: usize = 1;
pub const MAX_CHAPTERS: usize = 200;

/// Tunables for one generation run, fixed at construction time. Nothing in
/// the pipeline reads the environment.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Upper bound on transcript segments shown to the inference provider.
    pub max_sample_segments: usize,
    /// Budget for the single external inference call.
    pub inference_timeout: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_sample_segments: 400,
            inference_timeout: Duration::from_secs(120),
        }
    }
}

/// Reject layouts outside the supported bounds before any work happens.
pub fn validate_layout(layout: Layout) -> Result<()> {
    if let Layout::Structured { questions } = layout {
        if questions == 0 {
            return Err(EngineError::InvalidRequest {
                reason: "structured layout needs at least one question".to_string(),
            });
        }
    }
    let total = layout.total();
    if !(MIN_CHAPTERS..=MAX_CHAPTERS).contains(&total) {
        return Err(EngineError::InvalidRequest {
            reason: format!(
                "chapter count {} outside supported range {}..={}",
                total, MIN_CHAPTERS, MAX_CHAPTERS
            ),
        });
    }
    Ok(())
}

/// Run the full alignment pipeline for one transcript.
///
/// Stages run strictly in order: sample, infer, snap. The inference call is
/// the only suspension point and is bounded by the configured timeout. Any
/// inference failure (transport, timeout, malformed payload) switches the
/// run to the deterministic partitioner instead of aborting; only an invalid
/// request or an empty transcript is fatal.
pub async fn generate_chapters(
    transcript: &Transcript,
    layout: Layout,
    inference: &dyn ChapterInference,
    config: &EngineConfig,
) -> Result<GenerationReport> {
    validate_layout(layout)?;
    if transcript.is_empty() {
        return Err(EngineError::EmptyTranscript);
    }

    let run_id = Uuid::new_v4();
    let mut warnings = Vec::new();

    let sampled = sample_segments(transcript, config.max_sample_segments);
    let sample_text = render_sample(&sampled);

    let outcome = tokio::time::timeout(
        config.inference_timeout,
        inference.propose(&sample_text, layout),
    )
    .await
    .unwrap_or(Err(InferenceError::Timeout));

    let (chapters, source) = match outcome {
        Ok(candidates) => {
            let requested = layout.total();
            if candidates.len() != requested {
                warnings.push(format!(
                    "inference returned {} chapters, requested {}; extra candidates are dropped after alignment",
                    candidates.len(),
                    requested
                ));
            }
            (
                snap_candidates(&candidates, transcript, requested),
                ChapterSource::Inferred,
            )
        }
        Err(err) => {
            warn!(%run_id, error = %err, "chapter inference failed, using deterministic fallback");
            warnings.push(format!("AI-based chapters unavailable: {err}"));
            (
                fallback::partition(transcript, transcript.duration(), layout),
                ChapterSource::Fallback,
            )
        }
    };

    Ok(GenerationReport {
        run_id,
        chapters,
        source,
        warnings,
    })
}

/// Load a cached parsed transcript
pub async fn load_transcript(path: &Path) -> Result<Transcript> {
    let json_content = fs::read_to_string(path).await?;
    let transcript: Transcript = serde_json::from_str(&json_content)?;
    Ok(transcript)
}

/// Save a parsed transcript for reuse by later runs
pub async fn save_transcript(transcript: &Transcript, path: &Path) -> Result<()> {
    let pretty_json = serde_json::to_string_pretty(transcript)?;
    fs::write(path, &pretty_json).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ChapterCandidate, Segment};
    use async_trait::async_trait;

    fn transcript() -> Transcript {
        Transcript::new(vec![
            Segment {
                start: 0.0,
                text: "intro".to_string(),
            },
            Segment {
                start: 60.0,
                text: "topic a".to_string(),
            },
            Segment {
                start: 125.0,
                text: "topic b".to_string(),
            },
            Segment {
                start: 300.0,
                text: "outro".to_string(),
            },
        ])
    }

    struct StubInference {
        candidates: Vec<ChapterCandidate>,
    }

    #[async_trait]
    impl ChapterInference for StubInference {
        async fn propose(
            &self,
            _sample: &str,
            _layout: Layout,
        ) -> std::result::Result<Vec<ChapterCandidate>, InferenceError> {
            Ok(self.candidates.clone())
        }
    }

    struct FailingInference;

    #[async_trait]
    impl ChapterInference for FailingInference {
        async fn propose(
            &self,
            _sample: &str,
            _layout: Layout,
        ) -> std::result::Result<Vec<ChapterCandidate>, InferenceError> {
            Err(InferenceError::NoJson)
        }
    }

    struct HangingInference;

    #[async_trait]
    impl ChapterInference for HangingInference {
        async fn propose(
            &self,
            _sample: &str,
            _layout: Layout,
        ) -> std::result::Result<Vec<ChapterCandidate>, InferenceError> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(Vec::new())
        }
    }

    fn candidate(timestamp: &str, title: &str) -> ChapterCandidate {
        ChapterCandidate {
            timestamp: timestamp.to_string(),
            title: title.to_string(),
        }
    }

    #[tokio::test]
    async fn successful_inference_routes_through_the_snapper() {
        let inference = StubInference {
            candidates: vec![
                candidate("00:01:10", "Topic A"),
                candidate("00:01:10", "Topic A Dup"),
                candidate("00:05:10", "Outro"),
            ],
        };
        let report = generate_chapters(
            &transcript(),
            Layout::Flat { count: 3 },
            &inference,
            &EngineConfig::default(),
        )
        .await
        .unwrap();

        assert_eq!(report.source, ChapterSource::Inferred);
        assert_eq!(report.chapters.len(), 2);
        assert_eq!(report.chapters[0].time, 60.0);
        assert_eq!(report.chapters[1].time, 300.0);
        // three candidates against a requested count of three: no warning
        assert!(report.warnings.is_empty());
    }

    #[tokio::test]
    async fn count_mismatch_is_a_warning_not_a_failure() {
        let inference = StubInference {
            candidates: vec![candidate("00:00:00", "Intro")],
        };
        let report = generate_chapters(
            &transcript(),
            Layout::Flat { count: 3 },
            &inference,
            &EngineConfig::default(),
        )
        .await
        .unwrap();

        assert_eq!(report.source, ChapterSource::Inferred);
        assert_eq!(report.warnings.len(), 1);
        assert!(report.warnings[0].contains("returned 1"));
    }

    #[tokio::test]
    async fn inference_failure_falls_back_deterministically() {
        let report = generate_chapters(
            &transcript(),
            Layout::Flat { count: 3 },
            &FailingInference,
            &EngineConfig::default(),
        )
        .await
        .unwrap();

        assert_eq!(report.source, ChapterSource::Fallback);
        assert_eq!(report.chapters.len(), 3);
        assert!(report.chapters.windows(2).all(|w| w[0].time < w[1].time));
        assert!(report.warnings[0].contains("AI-based chapters unavailable"));
    }

    #[tokio::test]
    async fn slow_inference_is_cut_off_and_falls_back() {
        let config = EngineConfig {
            inference_timeout: Duration::from_millis(20),
            ..EngineConfig::default()
        };
        let report = generate_chapters(
            &transcript(),
            Layout::Flat { count: 2 },
            &HangingInference,
            &config,
        )
        .await
        .unwrap();

        assert_eq!(report.source, ChapterSource::Fallback);
        assert_eq!(report.chapters.len(), 2);
    }

    #[tokio::test]
    async fn empty_transcript_aborts_the_run() {
        let result = generate_chapters(
            &Transcript::default(),
            Layout::Flat { count: 3 },
            &FailingInference,
            &EngineConfig::default(),
        )
        .await;

        assert!(matches!(result, Err(EngineError::EmptyTranscript)));
    }

    #[tokio::test]
    async fn out_of_bounds_counts_are_rejected_before_any_work() {
        for layout in [Layout::Flat { count: 0 }, Layout::Flat { count: 201 }] {
            let result = generate_chapters(
                &transcript(),
                layout,
                &FailingInference,
                &EngineConfig::default(),
            )
            .await;
            assert!(matches!(result, Err(EngineError::InvalidRequest { .. })));
        }
    }

    #[test]
    fn structured_layouts_need_at_least_one_question() {
        assert!(validate_layout(Layout::Structured { questions: 0 }).is_err());
        assert!(validate_layout(Layout::Structured { questions: 1 }).is_ok());
        assert!(validate_layout(Layout::Structured { questions: 198 }).is_ok());
        assert!(validate_layout(Layout::Structured { questions: 199 }).is_err());
    }
}
