use crate::types::Chapter;

/// Format seconds as a zero-padded HH:MM:SS timestamp.
///
/// Hours grow without bound; a 30-hour stream renders as `30:00:05`, never
/// wrapped.
pub fn format_timestamp(seconds: f64) -> String {
    let total = seconds.max(0.0) as u64;
    let h = total / 3600;
    let m = (total % 3600) / 60;
    let s = total % 60;
    format!("{:02}:{:02}:{:02}", h, m, s)
}

/// Parse an `HH:MM:SS` timestamp back into whole seconds.
pub fn parse_timestamp(ts: &str) -> Option<f64> {
    let mut parts = ts.trim().splitn(3, ':');
    let h: u64 = parts.next()?.parse().ok()?;
    let m: u64 = parts.next()?.parse().ok()?;
    let s: u64 = parts.next()?.parse().ok()?;
    Some((h * 3600 + m * 60 + s) as f64)
}

/// Assembled publishing document: optional upload-title suggestions, the
/// chapter list, optional hashtag line.
#[derive(Debug, Clone, Default)]
pub struct ChaptersDocument {
    pub titles: Vec<String>,
    pub chapters: Vec<Chapter>,
    pub tags: Option<String>,
}

/// Render the document consumed by the publishing tooling.
///
/// Block layout is fixed: `SUGGESTED TITLES:` with numbered lines,
/// `CHAPTERS:` with one `HH:MM:SS Title` line per chapter, `YOUTUBE TAGS:`
/// with a single hashtag line. Blocks are separated by exactly two newlines.
pub fn format_chapters_document(doc: &ChaptersDocument) -> String {
    let mut out = String::new();

    if !doc.titles.is_empty() {
        out.push_str("SUGGESTED TITLES:\n");
        for (i, title) in doc.titles.iter().enumerate() {
            out.push_str(&format!("{}. {}\n", i + 1, title));
        }
        out.push_str("\n\n");
    }

    out.push_str("CHAPTERS:\n");
    for chapter in &doc.chapters {
        out.push_str(&format!(
            "{} {}\n",
            format_timestamp(chapter.time),
            chapter.title
        ));
    }

    if let Some(tags) = &doc.tags {
        out.push_str(&format!("\n\nYOUTUBE TAGS:\n{}\n", tags));
    }

    out
}
