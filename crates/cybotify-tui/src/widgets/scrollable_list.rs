//! Generic scrollable list with an index-based projection.

pub struct ScrollableList<T> {
    pub items: Vec<T>,
    /// Positions into `items`, in display order.
    pub visible_indices: Vec<usize>,
    pub selected: usize,
    pub scroll_offset: usize,
}

impl<T> ScrollableList<T> {
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            visible_indices: Vec::new(),
            selected: 0,
            scroll_offset: 0,
        }
    }

    pub fn set_items(&mut self, items: Vec<T>) {
        self.visible_indices = (0..items.len()).collect();
        self.items = items;
        self.clamp();
    }

    /// Keep only items accepted by `keep`, preserving original order.
    pub fn retain_visible(&mut self, keep: impl Fn(&T) -> bool) {
        self.visible_indices = self
            .items
            .iter()
            .enumerate()
            .filter(|(_, item)| keep(item))
            .map(|(i, _)| i)
            .collect();
        self.clamp();
    }

    fn clamp(&mut self) {
        if self.selected >= self.visible_indices.len() {
            self.selected = self.visible_indices.len().saturating_sub(1);
        }
        if self.scroll_offset > self.selected {
            self.scroll_offset = self.selected;
        }
    }

    pub fn select_up(&mut self, n: usize) {
        self.selected = self.selected.saturating_sub(n);
    }

    pub fn select_down(&mut self, n: usize) {
        if self.visible_indices.is_empty() {
            return;
        }
        self.selected = (self.selected + n).min(self.visible_indices.len() - 1);
    }

    pub fn select_first(&mut self) {
        self.selected = 0;
        self.scroll_offset = 0;
    }

    pub fn select_last(&mut self) {
        self.selected = self.visible_indices.len().saturating_sub(1);
    }

    pub fn selected_item(&self) -> Option<&T> {
        let idx = self.visible_indices.get(self.selected)?;
        self.items.get(*idx)
    }

    /// Returns (display_row, &item) pairs visible in `height` rows.
    /// Call ensure_visible first to update scroll_offset.
    pub fn visible_items(&self, height: usize) -> Vec<(usize, &T)> {
        if height == 0 || self.visible_indices.is_empty() {
            return Vec::new();
        }
        let end = (self.scroll_offset + height).min(self.visible_indices.len());
        (self.scroll_offset..end)
            .map(|row| (row, &self.items[self.visible_indices[row]]))
            .collect()
    }

    pub fn ensure_visible(&mut self, height: usize) {
        if height == 0 {
            return;
        }
        if self.selected < self.scroll_offset {
            self.scroll_offset = self.selected;
        } else if self.selected >= self.scroll_offset + height {
            self.scroll_offset = self.selected.saturating_sub(height - 1);
        }
    }

    /// Display row under a relative screen row, if any.
    pub fn row_at(&self, rel_row: usize) -> Option<usize> {
        let target = self.scroll_offset + rel_row;
        (target < self.visible_indices.len()).then_some(target)
    }

    /// Handle a click at `rel_row` within the rendered area.
    /// Returns true if selection changed.
    pub fn handle_click(&mut self, rel_row: usize) -> bool {
        match self.row_at(rel_row) {
            Some(row) if row != self.selected => {
                self.selected = row;
                true
            }
            _ => false,
        }
    }

    pub fn len(&self) -> usize {
        self.visible_indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.visible_indices.is_empty()
    }

    pub fn total_len(&self) -> usize {
        self.items.len()
    }
}

impl<T> Default for ScrollableList<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selection_is_clamped_after_retain() {
        let mut list = ScrollableList::new();
        list.set_items(vec![1, 2, 3, 4, 5]);
        list.select_last();
        assert_eq!(list.selected_item(), Some(&5));
        list.retain_visible(|n| n % 2 == 0);
        assert_eq!(list.len(), 2);
        assert_eq!(list.selected_item(), Some(&4));
        list.select_down(10);
        assert_eq!(list.selected, 1);
    }

    #[test]
    fn test_scrolling_window() {
        let mut list = ScrollableList::new();
        list.set_items((0..20).collect());
        list.select_down(12);
        list.ensure_visible(5);
        assert_eq!(list.scroll_offset, 8);
        let rows: Vec<usize> = list.visible_items(5).iter().map(|(r, _)| *r).collect();
        assert_eq!(rows, vec![8, 9, 10, 11, 12]);
        assert_eq!(list.row_at(2), Some(10));
        assert_eq!(list.row_at(40), None);
    }
}
