use std::{
    hash::{DefaultHasher, Hash, Hasher},
    path::{Path, PathBuf},
};

use crate::provider::Provider;
use crate::types::Layout;

pub fn get_root_cache_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("/tmp"))
        .join("glavki")
}

/// Per-source cache directory, keyed by a hash of the source identifier.
pub fn get_cache_dir(source: &str) -> PathBuf {
    let mut hasher = DefaultHasher::new();
    source.hash(&mut hasher);
    get_root_cache_dir().join(hasher.finish().to_string())
}

/// Get the path for a cached parsed transcript
pub fn get_transcript_path(cache_dir: &Path) -> PathBuf {
    cache_dir.join("transcript.json")
}

/// Get the path for a cached chapters document (provider and layout aware)
pub fn get_document_path(cache_dir: &Path, provider: &Provider, layout: &Layout) -> PathBuf {
    let provider_name = match provider {
        Provider::Grok => "grok",
        Provider::Openai => "openai",
        Provider::Gemini => "gemini",
    };
    let layout_tag = match layout {
        Layout::Flat { count } => format!("flat{}", count),
        Layout::Structured { questions } => format!("q{}", questions),
    };
    cache_dir.join(format!("chapters_{}_{}.txt", provider_name, layout_tag))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_source_hashes_to_the_same_directory() {
        assert_eq!(get_cache_dir("talk.vtt"), get_cache_dir("talk.vtt"));
        assert_ne!(get_cache_dir("talk.vtt"), get_cache_dir("other.vtt"));
    }

    #[test]
    fn artifact_paths_live_under_the_cache_dir() {
        let dir = get_cache_dir("talk.vtt");
        assert!(get_transcript_path(&dir).starts_with(&dir));
        assert_eq!(
            get_document_path(&dir, &Provider::Openai, &Layout::Flat { count: 10 })
                .file_name()
                .unwrap(),
            "chapters_openai_flat10.txt"
        );
        assert_eq!(
            get_document_path(&dir, &Provider::Grok, &Layout::Structured { questions: 4 })
                .file_name()
                .unwrap(),
            "chapters_grok_q4.txt"
        );
    }
}
