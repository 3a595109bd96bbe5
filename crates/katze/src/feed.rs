//! View models for the two list screens

use katzestore::{CatRecord, Favorites};

/// One rendered row: a record and the state of its heart
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatCell {
    pub record: CatRecord,
    pub is_favorite: bool,
}

impl CatCell {
    pub fn heart(&self) -> char {
        if self.is_favorite {
            '♥'
        } else {
            '♡'
        }
    }
}

/// All cats fetched so far, in page order
#[derive(Debug, Default)]
pub struct CatsFeed {
    items: Vec<CatRecord>,
}

impl CatsFeed {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a fetched page
    pub fn extend(&mut self, page: Vec<CatRecord>) {
        self.items.extend(page);
    }

    /// Whether displaying row `index` should trigger the next page load.
    ///
    /// Only the last row triggers; an empty feed is loaded on open instead.
    pub fn needs_next_page(&self, index: usize) -> bool {
        !self.items.is_empty() && index == self.items.len() - 1
    }

    pub fn cell(&self, index: usize, favorites: &Favorites) -> Option<CatCell> {
        self.items.get(index).map(|record| CatCell {
            is_favorite: favorites.contains_id(&record.id),
            record: record.clone(),
        })
    }

    pub fn items(&self) -> &[CatRecord] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Snapshot of the favorites list shown on the favorites screen
#[derive(Debug, Default)]
pub struct FavoritesFeed {
    items: Vec<CatRecord>,
}

impl FavoritesFeed {
    pub fn new(favorites: &Favorites) -> Self {
        Self {
            items: favorites.list(),
        }
    }

    pub fn refresh(&mut self, favorites: &Favorites) {
        self.items = favorites.list();
    }

    /// Placeholder text is shown instead of rows when empty
    pub fn shows_placeholder(&self) -> bool {
        self.items.is_empty()
    }

    /// Rows on this screen always carry a filled heart
    pub fn cell(&self, index: usize) -> Option<CatCell> {
        self.items.get(index).map(|record| CatCell {
            record: record.clone(),
            is_favorite: true,
        })
    }

    /// Heart tap on row `index`: unfavorite it and refresh the snapshot
    pub fn remove_at(&mut self, index: usize, favorites: &Favorites) -> katzestore::Result<bool> {
        let Some(record) = self.items.get(index).cloned() else {
            return Ok(false);
        };
        favorites.remove(&record)?;
        self.refresh(favorites);
        Ok(true)
    }

    pub fn items(&self) -> &[CatRecord] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }
}
