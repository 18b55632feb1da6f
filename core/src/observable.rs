//! Ordered collection that reports membership changes to an observer.

use serde::{Deserialize, Serialize};

/// Structured membership change reported by an [`ObservableVec`].
///
/// Indices refer to the collection as it stood when the change was applied,
/// so a renderer replaying the changes in order reproduces the same sequence.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SequenceChange {
    /// An element was inserted at the provided index.
    Inserted {
        /// Position the element occupies after insertion.
        index: usize,
    },
    /// An element was removed from the provided index.
    Removed {
        /// Position the element occupied before removal.
        index: usize,
    },
}

/// Receives membership notifications from an [`ObservableVec`].
pub trait SequenceObserver<T> {
    /// Called after `item` was inserted at `index`.
    fn inserted(&mut self, index: usize, item: &T);

    /// Called after `item` was removed from `index`.
    fn removed(&mut self, index: usize, item: &T);
}

impl<T> SequenceObserver<T> for Vec<SequenceChange> {
    fn inserted(&mut self, index: usize, _item: &T) {
        self.push(SequenceChange::Inserted { index });
    }

    fn removed(&mut self, index: usize, _item: &T) {
        self.push(SequenceChange::Removed { index });
    }
}

/// Observer that discards every notification.
#[derive(Clone, Copy, Debug, Default)]
pub struct IgnoreChanges;

impl<T> SequenceObserver<T> for IgnoreChanges {
    fn inserted(&mut self, _index: usize, _item: &T) {}

    fn removed(&mut self, _index: usize, _item: &T) {}
}

/// Vector whose insertions and removals are individually announced.
///
/// Element mutation through [`ObservableVec::iter_mut`] or
/// [`ObservableVec::get_mut`] does not change membership and is not reported.
#[derive(Clone, Debug)]
pub struct ObservableVec<T> {
    items: Vec<T>,
}

impl<T> Default for ObservableVec<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<T> ObservableVec<T> {
    /// Creates an empty collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of elements currently held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Reports whether the collection holds no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Element stored at `index`, if any.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    /// Mutable access to the element stored at `index`, if any.
    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.items.get_mut(index)
    }

    /// Index of the first element matching `predicate`.
    pub fn position<P>(&self, predicate: P) -> Option<usize>
    where
        P: FnMut(&T) -> bool,
    {
        self.items.iter().position(predicate)
    }

    /// Iterator over the elements in order.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }

    /// Mutable iterator over the elements in order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.items.iter_mut()
    }

    /// Appends `item`, notifying the observer, and returns its index.
    pub fn push<O>(&mut self, item: T, observer: &mut O) -> usize
    where
        O: SequenceObserver<T> + ?Sized,
    {
        let index = self.items.len();
        self.items.push(item);
        observer.inserted(index, &self.items[index]);
        index
    }

    /// Removes the element at `index`, notifying the observer.
    pub fn remove<O>(&mut self, index: usize, observer: &mut O) -> Option<T>
    where
        O: SequenceObserver<T> + ?Sized,
    {
        if index >= self.items.len() {
            return None;
        }

        let item = self.items.remove(index);
        observer.removed(index, &item);
        Some(item)
    }

    /// Removes every element for which `keep` returns false, front to back.
    ///
    /// Returns the number of removed elements.
    pub fn retain<F, O>(&mut self, mut keep: F, observer: &mut O) -> usize
    where
        F: FnMut(&T) -> bool,
        O: SequenceObserver<T> + ?Sized,
    {
        let mut removed = 0;
        let mut index = 0;
        while index < self.items.len() {
            if keep(&self.items[index]) {
                index += 1;
                continue;
            }

            let item = self.items.remove(index);
            observer.removed(index, &item);
            removed += 1;
        }
        removed
    }

    /// Removes every element back to front, notifying the observer for each.
    pub fn clear<O>(&mut self, observer: &mut O)
    where
        O: SequenceObserver<T> + ?Sized,
    {
        while let Some(item) = self.items.pop() {
            observer.removed(self.items.len(), &item);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_reports_trailing_index() {
        let mut values = ObservableVec::new();
        let mut changes = Vec::new();

        assert_eq!(values.push('a', &mut changes), 0);
        assert_eq!(values.push('b', &mut changes), 1);

        assert_eq!(
            changes,
            vec![
                SequenceChange::Inserted { index: 0 },
                SequenceChange::Inserted { index: 1 },
            ]
        );
    }

    #[test]
    fn retain_reports_indices_valid_at_time_of_removal() {
        let mut values = ObservableVec::new();
        for value in [1, 2, 3, 4, 5] {
            let _ = values.push(value, &mut IgnoreChanges);
        }
        let mut changes = Vec::new();

        let removed = values.retain(|value| value % 2 == 1, &mut changes);

        assert_eq!(removed, 2);
        assert_eq!(values.iter().copied().collect::<Vec<_>>(), vec![1, 3, 5]);
        assert_eq!(
            changes,
            vec![
                SequenceChange::Removed { index: 1 },
                SequenceChange::Removed { index: 2 },
            ]
        );
    }

    #[test]
    fn remove_out_of_range_is_silent() {
        let mut values: ObservableVec<u8> = ObservableVec::new();
        let mut changes = Vec::new();

        assert!(values.remove(3, &mut changes).is_none());
        assert!(changes.is_empty());
    }

    #[test]
    fn clear_removes_back_to_front() {
        let mut values = ObservableVec::new();
        for value in 0..3 {
            let _ = values.push(value, &mut IgnoreChanges);
        }
        let mut changes = Vec::new();

        values.clear(&mut changes);

        assert!(values.is_empty());
        assert_eq!(
            changes,
            vec![
                SequenceChange::Removed { index: 2 },
                SequenceChange::Removed { index: 1 },
                SequenceChange::Removed { index: 0 },
            ]
        );
    }
}
