//! The bundled hymnal: a JSON list of numbered hymns.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::models::Hymn;

#[derive(Debug, Error)]
pub enum HymnalError {
    #[error("failed to read hymnal {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse hymnal {path}: {source}")]
    Parse {
        path: String,
        source: serde_json::Error,
    },
}

/// Load hymns sorted by number. A missing file is an empty hymnal.
pub fn load_hymns(path: &Path) -> Result<Vec<Hymn>, HymnalError> {
    if !path.exists() {
        log::info!("no hymnal at {}", path.display());
        return Ok(Vec::new());
    }
    let raw = fs::read_to_string(path).map_err(|source| HymnalError::Read {
        path: path.display().to_string(),
        source,
    })?;
    let mut hymns: Vec<Hymn> = serde_json::from_str(&raw).map_err(|source| HymnalError::Parse {
        path: path.display().to_string(),
        source,
    })?;
    hymns.sort_by_key(|hymn| hymn.number);
    Ok(hymns)
}

/// Case-insensitive match on title or number.
pub fn search<'a>(hymns: &'a [Hymn], query: &str) -> Vec<&'a Hymn> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return hymns.iter().collect();
    }
    hymns
        .iter()
        .filter(|hymn| {
            hymn.title.to_lowercase().contains(&query) || hymn.number.to_string() == query
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hymn(number: u32, title: &str) -> Hymn {
        Hymn {
            number,
            title: title.to_string(),
            lyrics: String::new(),
        }
    }

    #[test]
    fn search_matches_title_and_number() {
        let hymns = vec![hymn(1, "Antífona"), hymn(15, "Castelo Forte"), hymn(151, "Grandioso És Tu")];
        let by_title: Vec<u32> = search(&hymns, "castelo").iter().map(|h| h.number).collect();
        assert_eq!(by_title, vec![15]);
        let by_number: Vec<u32> = search(&hymns, "151").iter().map(|h| h.number).collect();
        assert_eq!(by_number, vec![151]);
        assert_eq!(search(&hymns, "  ").len(), 3);
    }

    #[test]
    fn missing_file_is_empty_hymnal() {
        let hymns = load_hymns(Path::new("/definitely/not/here/hymns.json")).unwrap();
        assert!(hymns.is_empty());
    }
}
