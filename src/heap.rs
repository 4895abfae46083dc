use core::fmt;
use std::cmp::Ordering;

/// A min-heap, with a custom comparator.
///
/// There is no way to remove an arbitrary element. Entries that become stale are left in place
/// and skipped by whoever pops them.
pub struct Heap<T, F> {
    data: Vec<T>,
    cmp: F,
}
impl<T, F: Fn(&T, &T) -> Ordering> Heap<T, F> {
    #[cfg(test)]
    pub fn new(cmp: F) -> Self {
        Self::with_capacity(0, cmp)
    }

    pub fn with_capacity(capacity: usize, cmp: F) -> Self {
        Heap {
            data: Vec::with_capacity(capacity),
            cmp,
        }
    }

    /// The elements in heap order (not sorted).
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    pub fn push(&mut self, value: T) {
        self.data.push(value);
        self.sift_up(self.data.len() - 1);
    }

    pub fn pop(&mut self) -> Option<T> {
        if self.data.is_empty() {
            return None;
        }
        let ret = self.data.swap_remove(0);
        self.sift_down(0);
        Some(ret)
    }

    #[cfg(test)]
    pub fn peek(&self) -> Option<&T> {
        self.data.first()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    fn less(&self, a: usize, b: usize) -> bool {
        (self.cmp)(&self.data[a], &self.data[b]) == Ordering::Less
    }

    fn sift_up(&mut self, mut i: usize) {
        while i > 0 {
            let p = (i - 1) / 2;
            if self.less(i, p) {
                self.data.swap(i, p);
                i = p;
            } else {
                break;
            }
        }
    }

    fn sift_down(&mut self, mut i: usize) {
        while 2 * i + 1 < self.data.len() {
            let l = 2 * i + 1;
            let r = 2 * i + 2;
            let mut j = l;
            if r < self.data.len() && self.less(r, l) {
                j = r;
            }
            if self.less(j, i) {
                self.data.swap(i, j);
                i = j;
            } else {
                break;
            }
        }
    }
}

impl<T: fmt::Debug, F> fmt::Debug for Heap<T, F> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:?}", self.data)
    }
}
