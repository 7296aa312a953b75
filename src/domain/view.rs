//! Read-only indexed view over a length and an indexer function.

pub struct IndexedView<F> {
    len: usize,
    getter: F,
}

impl<T, F> IndexedView<F>
where
    F: Fn(usize) -> T,
{
    pub fn new(len: usize, getter: F) -> Self {
        Self { len, getter }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// `None` when `index` is out of range; the getter is never called then.
    pub fn get(&self, index: usize) -> Option<T> {
        (index < self.len).then(|| (self.getter)(index))
    }

    pub fn iter(&self) -> impl Iterator<Item = T> + '_ {
        (0..self.len).map(&self.getter)
    }

    /// A view of the last `n` items (all items when `n` exceeds the length).
    pub fn tail(&self, n: usize) -> IndexedView<impl Fn(usize) -> T + '_> {
        let offset = self.len.saturating_sub(n);
        IndexedView::new(self.len - offset, move |i| (self.getter)(offset + i))
    }
}
