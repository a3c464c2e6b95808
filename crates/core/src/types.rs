use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One timed unit of transcript text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub start: f64,
    pub text: String,
}

/// Ordered sequence of segments for a single video.
///
/// Built once by the parser (or loaded from cache) and read-only afterwards.
/// Segment starts are trusted to be non-decreasing in sequence order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Transcript {
    pub segments: Vec<Segment>,
}

impl Transcript {
    pub fn new(segments: Vec<Segment>) -> Self {
        Self { segments }
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Duration in seconds, taken from the last segment's start offset.
    pub fn duration(&self) -> f64 {
        self.segments.last().map(|s| s.start).unwrap_or(0.0)
    }
}

/// Raw chapter proposal coming back from the inference provider.
///
/// The timestamp is whatever text the model produced; it only becomes a real
/// video offset after snapping against the transcript.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChapterCandidate {
    pub timestamp: String,
    pub title: String,
}

/// A published chapter marker: a video offset plus a short title.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chapter {
    pub time: f64,
    pub title: String,
}

/// Requested chapter structure, fixed for the duration of one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// N freely placed chapters.
    Flat { count: usize },
    /// One introduction, `questions` topic slots, one closing.
    Structured { questions: usize },
}

impl Layout {
    /// Total number of chapters this layout asks for.
    pub fn total(&self) -> usize {
        match self {
            Layout::Flat { count } => *count,
            Layout::Structured { questions } => questions + 2,
        }
    }
}

/// Which strategy produced the final chapter set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChapterSource {
    Inferred,
    Fallback,
}

/// Outcome of one generation run.
#[derive(Debug, Clone)]
pub struct GenerationReport {
    pub run_id: Uuid,
    pub chapters: Vec<Chapter>,
    pub source: ChapterSource,
    pub warnings: Vec<String>,
}
