use crate::PageId;
use serde::Serialize;
use std::ops::Index;

/// The `FrameSet` struct simulates the finite pool of physical frames. Each slot holds either a
/// page identifier or nothing. Slot order matters: it is the frame number shown to observers and
/// the tie-breaker used by the replacement policies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FrameSet(Vec<Option<PageId>>);

impl FrameSet {
    /// Create a new `FrameSet` with `capacity` empty slots.
    ///
    /// # Arguments
    ///
    /// * `capacity` - number of physical frames available.
    pub fn build(capacity: usize) -> Self {
        Self(vec![None; capacity])
    }

    pub fn capacity(&self) -> usize {
        self.0.len()
    }

    /// Search the frames for the requested page and return the slot holding it. A `None` value
    /// implies a page fault.
    pub fn find(&self, page: PageId) -> Option<usize> {
        self.0.iter().position(|slot| *slot == Some(page))
    }

    pub fn contains(&self, page: PageId) -> bool {
        self.find(page).is_some()
    }

    /// Lowest-indexed empty slot, if any remain.
    pub fn first_empty(&self) -> Option<usize> {
        self.0.iter().position(Option::is_none)
    }

    pub fn is_full(&self) -> bool {
        self.first_empty().is_none()
    }

    /// Load `page` into `slot` and return whatever page previously occupied it.
    ///
    /// # Panics
    ///
    /// Panics if `slot` is out of bounds.
    pub fn place(&mut self, slot: usize, page: PageId) -> Option<PageId> {
        self.0[slot].replace(page)
    }

    /// Iterate over the occupied slots as `(slot, page)` pairs in slot order.
    pub fn residents(&self) -> impl Iterator<Item = (usize, PageId)> + '_ {
        self.0
            .iter()
            .enumerate()
            .filter_map(|(slot, page)| page.map(|page| (slot, page)))
    }

    pub fn as_slice(&self) -> &[Option<PageId>] {
        &self.0
    }
}

impl Index<usize> for FrameSet {
    type Output = Option<PageId>;

    fn index(&self, index: usize) -> &Self::Output {
        &self.0[index]
    }
}

impl std::fmt::Display for FrameSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let cells = self
            .0
            .iter()
            .map(|slot| match slot {
                Some(page) => format!("{:>3}", page),
                None => String::from("  -"),
            })
            .collect::<Vec<String>>()
            .join(" ");
        write!(f, "[{}]", cells)
    }
}

#[cfg(test)]
mod tests {

    use super::*;

    #[cfg(test)]
    mod frame_set_tests {

        use super::*;
        const TEST_CAPACITY: usize = 3;

        fn make_standard_set() -> FrameSet {
            let mut frames = FrameSet::build(TEST_CAPACITY);
            frames.place(0, 7);
            frames.place(2, 1);
            frames
        }

        #[test]
        fn build() {
            let frames = FrameSet::build(TEST_CAPACITY);
            assert_eq!(frames.capacity(), TEST_CAPACITY);
            assert!(frames.as_slice().iter().all(Option::is_none));
            assert_eq!(frames.first_empty(), Some(0));
        }

        #[test]
        fn find() {
            let frames = make_standard_set();
            assert_eq!(frames.find(7), Some(0));
            assert_eq!(frames.find(1), Some(2));
            assert_eq!(frames.find(0), None);
            assert!(!frames.contains(0));
        }

        #[test]
        fn first_empty_and_full() {
            let mut frames = make_standard_set();
            assert_eq!(frames.first_empty(), Some(1));
            assert!(!frames.is_full());
            frames.place(1, 0);
            assert_eq!(frames.first_empty(), None);
            assert!(frames.is_full());
        }

        #[test]
        fn place_returns_evicted() {
            let mut frames = make_standard_set();
            assert_eq!(frames.place(1, 4), None);
            assert_eq!(frames.place(0, 5), Some(7));
            assert_eq!(frames[0], Some(5));
        }

        #[test]
        fn residents() {
            let frames = make_standard_set();
            let residents: Vec<(usize, PageId)> = frames.residents().collect();
            assert_eq!(residents, vec![(0, 7), (2, 1)]);
        }

        #[test]
        fn to_string() {
            let frames = make_standard_set();
            assert_eq!(frames.to_string(), "[  7   -   1]");
        }
    }
}
