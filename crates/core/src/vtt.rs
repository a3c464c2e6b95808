use std::sync::LazyLock;

use regex::Regex;

use crate::types::{Segment, Transcript};

static MARKUP_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]+>").expect("markup tag pattern"));

/// Parse WebVTT-style timed text into a transcript.
///
/// Cue blocks are blank-line separated: a time-range line (`start --> end`)
/// followed by one or more text lines. Markup tags are stripped and multiple
/// text lines are joined with a single space. Malformed blocks are skipped;
/// an input with no valid cues yields an empty transcript. Cue order is
/// preserved as-is and trusted to already be time-ascending.
pub fn parse_vtt(content: &str) -> Transcript {
    let normalized = content.replace("\r\n", "\n");
    let mut segments = Vec::new();

    for block in normalized.trim().split("\n\n") {
        let lines: Vec<&str> = block.trim().lines().collect();
        if lines.len() < 2 || !lines[0].contains("-->") {
            continue;
        }

        let Some(start_raw) = lines[0].split("-->").next() else {
            continue;
        };
        let Some(start) = parse_cue_time(start_raw.trim()) else {
            continue;
        };

        let joined = lines[1..].join(" ");
        let text = MARKUP_TAG.replace_all(&joined, "").into_owned();
        segments.push(Segment { start, text });
    }

    Transcript::new(segments)
}

/// Accepts `H:MM:SS.mmm` and `MM:SS.mmm` range starts; millis optional.
fn parse_cue_time(raw: &str) -> Option<f64> {
    let parts: Vec<&str> = raw.split(':').collect();
    let (h, m, s) = match parts.as_slice() {
        [h, m, s] => (h.parse::<u32>().ok()?, m.parse::<u32>().ok()?, parse_seconds(s)?),
        [m, s] => (0, m.parse::<u32>().ok()?, parse_seconds(s)?),
        _ => return None,
    };
    Some(f64::from(h) * 3600.0 + f64::from(m) * 60.0 + s)
}

fn parse_seconds(raw: &str) -> Option<f64> {
    let value: f64 = raw.parse().ok()?;
    (value.is_finite() && value >= 0.0).then_some(value)
}
