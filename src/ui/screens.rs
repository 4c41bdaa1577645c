use std::collections::BTreeSet;

use crate::models::{Hymn, MediaItem};
use crate::prefs::FavoriteKind;
use crate::session::VerseView;

/// Cursor into a list whose length may change underneath it.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Selection {
    pub(crate) index: usize,
}

impl Selection {
    pub(crate) fn move_by(&mut self, offset: isize, len: usize) {
        if len == 0 {
            self.index = 0;
            return;
        }
        let max = len as isize - 1;
        self.index = (self.index as isize + offset).clamp(0, max) as usize;
    }

    pub(crate) fn clamp(&mut self, len: usize) {
        if len == 0 {
            self.index = 0;
        } else if self.index >= len {
            self.index = len - 1;
        }
    }

    pub(crate) fn select(&mut self, index: usize, len: usize) {
        self.index = index;
        self.clamp(len);
    }

    pub(crate) fn current<'a, T>(&self, items: &'a [T]) -> Option<&'a T> {
        items.get(self.index)
    }
}

/// Where the Bible tab currently is in its drill-down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BibleScreen {
    Translations,
    Books,
    Chapters,
    Reading,
}

/// Hymn list with an optional title/number filter, plus the hymn opened for
/// reading.
pub(crate) struct HymnScreen {
    pub(crate) hymns: Vec<Hymn>,
    pub(crate) filtered: Vec<usize>,
    pub(crate) filter: Option<String>,
    pub(crate) selection: Selection,
    pub(crate) open: Option<usize>,
    pub(crate) scroll: u16,
}

impl HymnScreen {
    pub(crate) fn new(hymns: Vec<Hymn>) -> Self {
        let mut screen = Self {
            filtered: Vec::new(),
            hymns,
            filter: None,
            selection: Selection::default(),
            open: None,
            scroll: 0,
        };
        screen.apply_filter();
        screen
    }

    pub(crate) fn apply_filter(&mut self) {
        let query = self
            .filter
            .as_deref()
            .map(|q| q.trim().to_lowercase())
            .unwrap_or_default();
        self.filtered = self
            .hymns
            .iter()
            .enumerate()
            .filter(|(_, hymn)| {
                query.is_empty()
                    || hymn.title.to_lowercase().contains(&query)
                    || hymn.number.to_string() == query
            })
            .map(|(idx, _)| idx)
            .collect();
        self.selection.clamp(self.filtered.len());
    }

    pub(crate) fn set_filter(&mut self, filter: Option<String>) {
        self.filter = filter;
        self.apply_filter();
    }

    pub(crate) fn current(&self) -> Option<&Hymn> {
        self.selection
            .current(&self.filtered)
            .and_then(|idx| self.hymns.get(*idx))
    }

    pub(crate) fn opened(&self) -> Option<&Hymn> {
        self.open.and_then(|idx| self.hymns.get(idx))
    }

    pub(crate) fn open_current(&mut self) -> bool {
        match self.selection.current(&self.filtered) {
            Some(idx) => {
                self.open = Some(*idx);
                self.scroll = 0;
                true
            }
            None => false,
        }
    }

    pub(crate) fn find_by_id(&self, id: &str) -> Option<usize> {
        self.hymns.iter().position(|hymn| hymn.favorite_id() == id)
    }
}

/// One row of the favorites tab.
#[derive(Debug, Clone)]
pub(crate) enum FavoriteEntry {
    Verse(VerseView),
    Hymn(Hymn),
    Score(MediaItem),
    Music(MediaItem),
}

impl FavoriteEntry {
    pub(crate) fn kind(&self) -> FavoriteKind {
        match self {
            FavoriteEntry::Verse(_) => FavoriteKind::Verse,
            FavoriteEntry::Hymn(_) => FavoriteKind::Hymn,
            FavoriteEntry::Score(_) => FavoriteKind::Score,
            FavoriteEntry::Music(_) => FavoriteKind::Music,
        }
    }

    pub(crate) fn id(&self) -> String {
        match self {
            FavoriteEntry::Verse(view) => view.reference.clone(),
            FavoriteEntry::Hymn(hymn) => hymn.favorite_id(),
            FavoriteEntry::Score(item) | FavoriteEntry::Music(item) => item.id.clone(),
        }
    }

    pub(crate) fn label(&self) -> String {
        match self {
            FavoriteEntry::Verse(view) => format!("{}  {}", view.citation(), view.verse.text),
            FavoriteEntry::Hymn(hymn) => hymn.display_title(),
            FavoriteEntry::Score(item) | FavoriteEntry::Music(item) => item.title.clone(),
        }
    }
}

/// Pick the favorite media items out of a listing, preserving its order.
pub(crate) fn favorite_media<'a>(
    items: &'a [MediaItem],
    ids: &'a BTreeSet<String>,
) -> impl Iterator<Item = &'a MediaItem> {
    items.iter().filter(move |item| ids.contains(&item.id))
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
    fn selection_stays_in_bounds() {
        let mut selection = Selection::default();
        selection.move_by(-3, 5);
        assert_eq!(selection.index, 0);
        selection.move_by(10, 5);
        assert_eq!(selection.index, 4);
        selection.clamp(2);
        assert_eq!(selection.index, 1);
        selection.move_by(1, 0);
        assert_eq!(selection.index, 0);
    }

    #[test]
    fn hymn_filter_narrows_and_clamps() {
        let mut screen = HymnScreen::new(vec![
            hymn(1, "Santo, Santo, Santo"),
            hymn(2, "Castelo Forte"),
            hymn(3, "Sou Feliz"),
        ]);
        screen.selection.select(2, 3);
        screen.set_filter(Some("castelo".to_string()));
        assert_eq!(screen.filtered, vec![1]);
        assert_eq!(screen.current().map(|h| h.number), Some(2));

        screen.set_filter(None);
        assert_eq!(screen.filtered.len(), 3);
    }

    #[test]
    fn open_current_tracks_the_filtered_row() {
        let mut screen = HymnScreen::new(vec![hymn(10, "A"), hymn(20, "B")]);
        screen.set_filter(Some("20".to_string()));
        assert!(screen.open_current());
        assert_eq!(screen.opened().map(|h| h.number), Some(20));
        assert_eq!(screen.find_by_id("10"), Some(0));
    }

    #[test]
    fn favorite_media_keeps_listing_order() {
        let item = |id: &str| MediaItem {
            id: id.to_string(),
            title: id.to_string(),
            path: std::path::PathBuf::from(id),
        };
        let items = vec![item("a.pdf"), item("b.pdf"), item("c.pdf")];
        let ids: BTreeSet<String> = ["c.pdf", "a.pdf", "z.pdf"]
            .into_iter()
            .map(String::from)
            .collect();

        let picked: Vec<&str> = favorite_media(&items, &ids)
            .map(|item| item.id.as_str())
            .collect();
        assert_eq!(picked, vec!["a.pdf", "c.pdf"]);
    }
}
