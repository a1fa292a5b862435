use crate::item::{Continuation, Item};

/// One shelf or grid of a browse response.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Group {
    pub items: Vec<Item>,
    pub continuation: Option<Continuation>,
}

/// Result of a single fetch.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Page {
    pub title: Option<String>,
    pub groups: Vec<Group>,
}

impl Page {
    /// Continuation of the last group.  Continuations of earlier groups point
    /// into shelves we don't page through, so they are ignored.
    pub fn continuation(&self) -> Option<&Continuation> {
        self.groups.last()?.continuation.as_ref()
    }

    pub fn item_count(&self) -> usize {
        self.groups.iter().map(|group| group.items.len()).sum()
    }

    /// Splits the page into its title, all items of all groups in order, and
    /// the trailing continuation.
    pub fn into_parts(self) -> (Option<String>, Vec<Item>, Option<Continuation>) {
        let continuation = self.continuation().cloned();
        let mut items = Vec::with_capacity(self.item_count());
        for group in self.groups {
            items.extend(group.items);
        }
        (self.title, items, continuation)
    }

    #[cfg(test)]
    pub fn into_items(self) -> Vec<Item> {
        self.into_parts().1
    }
}
