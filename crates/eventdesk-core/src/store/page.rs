// ── Paginated sequence state ──
//
// The persisted half of a store: items in server page order, the next
// page cursor, and whether the server may have more.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::PageItem;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageState<T> {
    pub items: Vec<T>,
    pub next_page: u32,
    pub has_more: bool,
}

impl<T> Default for PageState<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            next_page: 0,
            has_more: true,
        }
    }
}

impl<T: PageItem> PageState<T> {
    /// Merge one fetched page: placeholders the page supersedes are
    /// replaced in place, unseen ids are appended, known ids are skipped.
    /// Returns how many items were appended.
    pub(crate) fn merge_page(&mut self, incoming: Vec<T>) -> usize {
        let mut seen: HashSet<T::Id> = self.items.iter().map(PageItem::id).collect();
        let mut appended = 0;

        for item in incoming {
            if seen.contains(&item.id()) {
                continue;
            }
            seen.insert(item.id());
            if let Some(slot) = self.items.iter_mut().find(|e| item.supersedes(e)) {
                *slot = item;
                continue;
            }
            self.items.push(item);
            appended += 1;
        }
        appended
    }

    /// Insert at the head, dropping any existing copy of the same id.
    pub(crate) fn prepend(&mut self, item: T) {
        let id = item.id();
        self.items.retain(|e| e.id() != id);
        self.items.insert(0, item);
    }

    pub(crate) fn patch<F: Fn(&mut T)>(&mut self, id: T::Id, f: &F) -> bool {
        let mut hit = false;
        for item in self.items.iter_mut().filter(|e| e.id() == id) {
            f(item);
            hit = true;
        }
        hit
    }

    pub(crate) fn remove(&mut self, id: T::Id) -> bool {
        let before = self.items.len();
        self.items.retain(|e| e.id() != id);
        self.items.len() != before
    }

    pub(crate) fn contains(&self, id: T::Id) -> bool {
        self.items.iter().any(|e| e.id() == id)
    }
}

/// Accepted cache encodings: the current state object, or a bare item
/// array written by older clients.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum CachedPage<T> {
    State(PageState<T>),
    Legacy(Vec<T>),
}

impl<T: PageItem> CachedPage<T> {
    /// Normalize to a `PageState`. An empty legacy array carries no
    /// cursor information and counts as a miss.
    pub(crate) fn into_state(self, page_size: u32) -> Option<PageState<T>> {
        match self {
            Self::State(state) => Some(state),
            Self::Legacy(items) if items.is_empty() => None,
            Self::Legacy(items) => {
                let mut state = PageState::default();
                state.merge_page(items);
                let len = u32::try_from(state.items.len()).unwrap_or(u32::MAX);
                state.next_page = len.div_ceil(page_size.max(1));
                Some(state)
            }
        }
    }
}
