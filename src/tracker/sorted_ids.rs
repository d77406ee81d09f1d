//! Lazily sorted multiset of prim paths.
//!
//! Inserts are appended to an unsorted tail and merged into the sorted
//! head on the next read. Removals of neighbouring sorted entries are
//! collected into one pending range and excised together, so removing a
//! whole subtree one path at a time costs a single shift.

use crate::util::ScenePath;

/// A multiset of paths, sorted on read.
#[derive(Clone, Debug, Default)]
pub struct SortedIds {
    ids: Vec<ScenePath>,
    /// `ids[..sorted_end]` is sorted.
    sorted_end: usize,
    /// Sorted-head indices `[start, end)` removed but not yet excised.
    pending: Option<(usize, usize)>,
}

impl SortedIds {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one entry. Duplicates are independent entries.
    pub fn insert(&mut self, id: ScenePath) {
        self.ids.push(id);
    }

    /// Remove one entry equal to `id`; no-op when absent.
    pub fn remove(&mut self, id: &ScenePath) {
        if self.remove_sorted(id) {
            return;
        }
        if let Some(pos) = self.ids[self.sorted_end..].iter().position(|x| x == id) {
            self.ids.remove(self.sorted_end + pos);
            return;
        }
        tracing::debug!(%id, "SortedIds::remove: id not present");
    }

    /// Remove entries `start..=end` of the sorted view.
    pub fn remove_range(&mut self, start: usize, end: usize) {
        self.sync();
        if start > end || end >= self.ids.len() {
            tracing::warn!(start, end, len = self.ids.len(), "SortedIds::remove_range: invalid range");
            return;
        }
        self.ids.drain(start..=end);
        self.sorted_end = self.ids.len();
    }

    /// Sorted entries.
    pub fn ids(&mut self) -> &[ScenePath] {
        self.sync();
        &self.ids
    }

    pub fn len(&self) -> usize {
        let pending = self.pending.map_or(0, |(s, e)| e - s);
        self.ids.len() - pending
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&mut self) {
        self.ids.clear();
        self.sorted_end = 0;
        self.pending = None;
    }

    /// Remove from the sorted head, growing the pending range when the
    /// removed entry borders it.
    fn remove_sorted(&mut self, id: &ScenePath) -> bool {
        let (lo, hi) = self.equal_run(id);
        if lo == hi {
            return false;
        }

        match self.pending {
            None => {
                self.pending = Some((lo, lo + 1));
                true
            }
            Some((ps, pe)) => {
                if (lo..hi).contains(&pe) {
                    self.pending = Some((ps, pe + 1));
                    return true;
                }
                if ps > 0 && (lo..hi).contains(&(ps - 1)) {
                    self.pending = Some((ps - 1, pe));
                    return true;
                }
                if lo >= ps && hi <= pe {
                    // every equal entry is already pending
                    return false;
                }
                self.flush_pending();
                let (lo, _) = self.equal_run(id);
                self.pending = Some((lo, lo + 1));
                true
            }
        }
    }

    /// Index range of entries equal to `id` in the sorted head.
    fn equal_run(&self, id: &ScenePath) -> (usize, usize) {
        let head = &self.ids[..self.sorted_end];
        let lo = head.partition_point(|x| x < id);
        let hi = lo + head[lo..].partition_point(|x| x == id);
        (lo, hi)
    }

    fn flush_pending(&mut self) {
        if let Some((start, end)) = self.pending.take() {
            self.ids.drain(start..end);
            self.sorted_end -= end - start;
        }
    }

    fn sync(&mut self) {
        self.flush_pending();
        if self.sorted_end == self.ids.len() {
            return;
        }

        let mut tail = self.ids.split_off(self.sorted_end);
        tail.sort();
        if self.ids.last().map_or(true, |last| *last <= tail[0]) {
            self.ids.extend(tail);
        } else {
            let head = std::mem::take(&mut self.ids);
            self.ids = merge_sorted(head, tail);
        }
        self.sorted_end = self.ids.len();
    }
}

/// Stable merge of two sorted vectors.
fn merge_sorted(a: Vec<ScenePath>, b: Vec<ScenePath>) -> Vec<ScenePath> {
    let mut out = Vec::with_capacity(a.len() + b.len());
    let mut a = a.into_iter().peekable();
    let mut b = b.into_iter().peekable();
    loop {
        let take_a = match (a.peek(), b.peek()) {
            (Some(x), Some(y)) => x <= y,
            (Some(_), None) => true,
            (None, Some(_)) => false,
            (None, None) => break,
        };
        let next = if take_a { a.next() } else { b.next() };
        out.extend(next);
    }
    out
}
