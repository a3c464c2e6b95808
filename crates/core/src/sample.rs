use crate::format::format_timestamp;
use crate::types::{Segment, Transcript};

/// Reduce a transcript to an evenly spread subset of segments.
///
/// Keeps every `stride`-th segment starting at index 0, with
/// `stride = max(1, total / max_segments)`, so the first segment is always
/// retained and coverage stays roughly even across the full duration. Order
/// is preserved; nothing else is dropped or merged.
///
/// Sampling only thins the evidence shown to the inference provider; every
/// duration-derived decision elsewhere uses the full transcript.
pub fn sample_segments(transcript: &Transcript, max_segments: usize) -> Vec<&Segment> {
    let total = transcript.segments.len();
    let stride = (total / max_segments.max(1)).max(1);
    transcript.segments.iter().step_by(stride).collect()
}

/// Render retained segments for the inference request, one
/// `[HH:MM:SS] text` line per segment.
pub fn render_sample(segments: &[&Segment]) -> String {
    segments
        .iter()
        .map(|seg| format!("[{}] {}", format_timestamp(seg.start), seg.text.trim()))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transcript_of(n: usize) -> Transcript {
        Transcript::new(
            (0..n)
                .map(|i| Segment {
                    start: i as f64 * 10.0,
                    text: format!("segment {}", i),
                })
                .collect(),
        )
    }

    #[test]
    fn keeps_everything_when_under_budget() {
        let transcript = transcript_of(5);
        let sampled = sample_segments(&transcript, 10);
        assert_eq!(sampled.len(), 5);
    }

    #[test]
    fn output_is_an_ordered_subsequence_including_the_first_segment() {
        let transcript = transcript_of(1000);
        let sampled = sample_segments(&transcript, 100);

        assert_eq!(sampled[0].start, 0.0);
        let starts: Vec<f64> = sampled.iter().map(|s| s.start).collect();
        assert!(starts.windows(2).all(|w| w[0] < w[1]));
        for seg in &sampled {
            assert!(transcript.segments.iter().any(|s| s == *seg));
        }
    }

    #[test]
    fn stride_thins_large_transcripts() {
        let transcript = transcript_of(1000);
        // stride 1000 / 400 = 2 -> every other segment
        let sampled = sample_segments(&transcript, 400);
        assert_eq!(sampled.len(), 500);
        assert_eq!(sampled[1].start, 20.0);
    }

    #[test]
    fn empty_transcript_samples_to_nothing() {
        let transcript = Transcript::default();
        assert!(sample_segments(&transcript, 400).is_empty());
    }

    #[test]
    fn renders_one_line_per_segment() {
        let transcript = transcript_of(3);
        let sampled = sample_segments(&transcript, 10);
        let rendered = render_sample(&sampled);
        assert_eq!(
            rendered,
            "[00:00:00] segment 0\n[00:00:10] segment 1\n[00:00:20] segment 2"
        );
    }
}
