use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use crate::format::parse_timestamp;
use crate::types::{Chapter, ChapterCandidate, Transcript};

const MAX_TITLE_LEN: usize = 120;
const DEFAULT_TITLE: &str = "Chapter";

static TITLE_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Za-z0-9'\-]+").expect("title word pattern"));

/// Keep only alphanumeric/apostrophe/hyphen word tokens, rejoin with single
/// spaces, cap the length. Titles that sanitize to nothing get a generic
/// placeholder.
fn sanitize_title(raw: &str) -> String {
    let mut title = TITLE_WORD
        .find_iter(raw)
        .map(|m| m.as_str())
        .collect::<Vec<_>>()
        .join(" ");
    title.truncate(MAX_TITLE_LEN);

    let title = title.trim();
    if title.is_empty() {
        DEFAULT_TITLE.to_string()
    } else {
        title.to_string()
    }
}

/// Map inference candidates onto real segment boundaries.
///
/// Each candidate time (malformed timestamps read as 0) snaps to the
/// rightmost segment start at or before it, clamping to the first segment
/// when the candidate precedes the whole transcript. The first candidate to
/// claim a snapped time wins and later claimants are dropped, which absorbs
/// over-generation and near-duplicate proposals. The result is sorted
/// ascending and truncated to `limit`, so every output time is an exact
/// segment start and times strictly increase.
pub fn snap_candidates(
    candidates: &[ChapterCandidate],
    transcript: &Transcript,
    limit: usize,
) -> Vec<Chapter> {
    let starts: Vec<f64> = transcript.segments.iter().map(|s| s.start).collect();

    let mut claimed: HashSet<u64> = HashSet::new();
    let mut chapters = Vec::new();

    for candidate in candidates {
        let proposed = parse_timestamp(&candidate.timestamp).unwrap_or(0.0);
        let time = match starts.partition_point(|&s| s <= proposed) {
            0 => starts.first().copied().unwrap_or(0.0),
            idx => starts[idx - 1],
        };
        if !claimed.insert(time.to_bits()) {
            continue;
        }
        chapters.push(Chapter {
            time,
            title: sanitize_title(&candidate.title),
        });
    }

    chapters.sort_by(|a, b| a.time.total_cmp(&b.time));
    chapters.truncate(limit);
    chapters
}
