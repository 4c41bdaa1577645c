//! Scores and music files shipped with the assets. Rendering and playback are
//! handed to the platform's default application.

use std::fs;
use std::path::Path;

use open::that as open_with_system;
use thiserror::Error;

use crate::models::MediaItem;

pub const SCORE_EXTENSIONS: &[&str] = &["pdf"];
pub const MUSIC_EXTENSIONS: &[&str] = &["mp3", "ogg", "m4a", "wav", "flac"];

#[derive(Debug, Error)]
pub enum MediaError {
    #[error("failed to list {path}: {source}")]
    List {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to open {path}: {source}")]
    Open {
        path: String,
        source: std::io::Error,
    },
}

/// Files in `dir` with one of `extensions`, sorted by title. A missing
/// directory yields an empty list.
pub fn list_media(dir: &Path, extensions: &[&str]) -> Result<Vec<MediaItem>, MediaError> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }
    let entries = fs::read_dir(dir).map_err(|source| MediaError::List {
        path: dir.display().to_string(),
        source,
    })?;

    let mut items = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| MediaError::List {
            path: dir.display().to_string(),
            source,
        })?;
        let path = entry.path();
        let matches = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| extensions.iter().any(|want| want.eq_ignore_ascii_case(ext)))
            .unwrap_or(false);
        if !matches || !path.is_file() {
            continue;
        }
        let Some(id) = path.file_name().and_then(|name| name.to_str()).map(str::to_string) else {
            continue;
        };
        let title = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .map(title_from_stem)
            .unwrap_or_else(|| id.clone());
        items.push(MediaItem { id, title, path });
    }

    items.sort_by(|a, b| a.title.to_lowercase().cmp(&b.title.to_lowercase()));
    Ok(items)
}

fn title_from_stem(stem: &str) -> String {
    stem.replace(['_', '-'], " ").trim().to_string()
}

/// Hand the file to the platform's default viewer or player.
pub fn open_media(item: &MediaItem) -> Result<(), MediaError> {
    log::info!("opening {}", item.path.display());
    open_with_system(&item.path).map_err(|source| MediaError::Open {
        path: item.path.display().to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn titles_replace_separators() {
        assert_eq!(title_from_stem("castelo_forte-coral"), "castelo forte coral");
    }

    #[test]
    fn lists_matching_files_sorted() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b_hino.pdf", "A_Hino.PDF", "notes.txt"] {
            fs::write(dir.path().join(name), b"x").unwrap();
        }
        let items = list_media(dir.path(), SCORE_EXTENSIONS).unwrap();
        let ids: Vec<&str> = items.iter().map(|item| item.id.as_str()).collect();
        assert_eq!(ids, vec!["A_Hino.PDF", "b_hino.pdf"]);
        assert_eq!(items[0].title, "A Hino");
    }

    #[test]
    fn missing_directory_is_empty() {
        let items = list_media(Path::new("/definitely/not/here"), MUSIC_EXTENSIONS).unwrap();
        assert!(items.is_empty());
    }
}
