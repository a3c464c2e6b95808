use crate::types::{Chapter, Layout, Segment, Transcript};

/// YouTube rejects descriptions with more than 100 chapter lines.
pub const PLATFORM_MAX_CHAPTERS: usize = 100;

const INTRO_TITLE: &str = "Introduction";
const CLOSING_TITLE: &str = "Closing Remarks";
const FALLBACK_TITLE_LEN: usize = 100;

/// Deterministic chapter layout used when inference is unavailable.
///
/// Needs nothing beyond the transcript and its duration, and always yields
/// exactly the number of chapters the layout asks for (capped at the
/// platform maximum for flat layouts) when the duration is positive.
pub fn partition(transcript: &Transcript, duration: f64, layout: Layout) -> Vec<Chapter> {
    match layout {
        Layout::Flat { count } => partition_flat(transcript, duration, count),
        Layout::Structured { questions } => partition_structured(duration, questions),
    }
}

/// Equal-width slices of `[0, duration)`, each snapped to the nearest
/// transcript segment and titled with the leading text of that segment.
fn partition_flat(transcript: &Transcript, duration: f64, count: usize) -> Vec<Chapter> {
    let target = count.min(PLATFORM_MAX_CHAPTERS);
    if target == 0 {
        return Vec::new();
    }

    let slice = duration / target as f64;
    let mut chapters = Vec::with_capacity(target);
    chapters.push(Chapter {
        time: 0.0,
        title: INTRO_TITLE.to_string(),
    });

    for i in 1..target {
        let Some(nearest) = nearest_segment(transcript, i as f64 * slice) else {
            break;
        };
        let title: String = nearest.text.trim().chars().take(FALLBACK_TITLE_LEN).collect();
        chapters.push(Chapter {
            time: nearest.start,
            title,
        });
    }

    chapters
}

/// Introduction, evenly sliced question slots, closing remarks.
///
/// The question boundaries are raw slice times rather than segment starts;
/// with no inference-derived anchor there is nothing in the transcript to
/// validate them against.
fn partition_structured(duration: f64, questions: usize) -> Vec<Chapter> {
    let intro_end = (duration * 0.05).min(120.0);
    let closing_start = (duration - 60.0).max(duration * 0.95);
    let slice = (closing_start - intro_end) / questions.max(1) as f64;

    let mut chapters = Vec::with_capacity(questions + 2);
    chapters.push(Chapter {
        time: 0.0,
        title: INTRO_TITLE.to_string(),
    });
    for i in 0..questions {
        chapters.push(Chapter {
            time: intro_end + i as f64 * slice,
            title: format!("Q{}: Topic {}", i + 1, i + 1),
        });
    }
    chapters.push(Chapter {
        time: closing_start,
        title: CLOSING_TITLE.to_string(),
    });

    chapters
}

/// Segment whose start is closest to `time`; earliest wins a tie.
fn nearest_segment(transcript: &Transcript, time: f64) -> Option<&Segment> {
    transcript
        .segments
        .iter()
        .fold(None, |best: Option<&Segment>, seg| match best {
            Some(b) if (b.start - time).abs() <= (seg.start - time).abs() => Some(b),
            _ => Some(seg),
        })
}
