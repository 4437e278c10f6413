use crate::frames::FrameSet;
use crate::reference::ReferenceSequence;
use crate::PageId;
use clap::ValueEnum;
use linked_hash_map::LinkedHashMap;
use serde::Serialize;
use std::collections::{HashMap, VecDeque};

/// The replacement policy used to pick a victim frame once every frame is occupied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum, Serialize)]
pub enum Policy {
    /// First in, first out.
    Fifo,
    /// Least recently used.
    Lru,
    /// Belady's clairvoyant policy: evict the page needed furthest in the future.
    Optimal,
}

impl Policy {
    pub const ALL: [Policy; 3] = [Policy::Fifo, Policy::Lru, Policy::Optimal];

    /// Construct fresh victimization bookkeeping for a single simulation run. Nothing is shared
    /// between runs.
    ///
    /// # Arguments
    ///
    /// * `references` - the complete reference stream, required for the optimal policy's
    /// foresight.
    /// * `capacity` - the number of frames being simulated.
    pub fn victimizer(
        &self,
        references: &ReferenceSequence,
        capacity: usize,
    ) -> Box<dyn Victimizer> {
        match self {
            Policy::Fifo => Box::new(FifoVictimizer::build(capacity)),
            Policy::Lru => Box::new(LruVictimizer::build()),
            Policy::Optimal => Box::new(OptimalVictimizer::build(references)),
        }
    }
}

impl std::fmt::Display for Policy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Policy::Fifo => "FIFO",
            Policy::Lru => "LRU",
            Policy::Optimal => "Optimal",
        };
        write!(f, "{}", name)
    }
}

/// The victimization interface shared by every policy. The engine reports each reference as it
/// is consumed and asks for a victim only when a fault occurs with every frame occupied.
pub trait Victimizer {
    /// Record that `page` was referenced at `position`. Called for every reference, hit or miss,
    /// before any victim is selected for it.
    fn reference(&mut self, _position: usize, _page: PageId) {}

    /// Choose the slot to evict. `frames` is guaranteed to be full.
    fn select(&mut self, frames: &FrameSet, position: usize) -> usize;

    /// Human-readable account of an eviction decided by `select`.
    fn explain(&self, slot: usize, victim: PageId, page: PageId) -> String;
}

/// FIFO keeps a circular insertion cursor. The victim is always the slot under the cursor, no
/// matter which pages were hit in the meantime.
pub struct FifoVictimizer {
    capacity: usize,
    cursor: usize,
}

impl FifoVictimizer {
    pub fn build(capacity: usize) -> Self {
        Self {
            capacity,
            cursor: 0,
        }
    }
}

impl Victimizer for FifoVictimizer {
    fn select(&mut self, _frames: &FrameSet, _position: usize) -> usize {
        let slot = self.cursor;
        self.cursor = (self.cursor + 1) % self.capacity;
        slot
    }

    fn explain(&self, slot: usize, victim: PageId, page: PageId) -> String {
        format!(
            "Page fault! Replaced page {} in frame {} (first in) with page {}",
            victim, slot, page
        )
    }
}

/// LRU remembers the position of every page's latest reference. Entries are kept in recency
/// order, so the front of the map is always the least recently used page.
pub struct LruVictimizer {
    recency: LinkedHashMap<PageId, usize>,
}

impl LruVictimizer {
    pub fn build() -> Self {
        Self {
            recency: LinkedHashMap::new(),
        }
    }

    pub fn last_used(&self, page: PageId) -> Option<usize> {
        self.recency.get(&page).copied()
    }
}

impl Victimizer for LruVictimizer {
    fn reference(&mut self, position: usize, page: PageId) {
        self.recency.remove(&page);
        self.recency.insert(page, position);
    }

    fn select(&mut self, frames: &FrameSet, _position: usize) -> usize {
        // positions are unique per page, so the first resident in recency order is the minimum
        self.recency
            .keys()
            .find_map(|page| frames.find(*page))
            .unwrap_or(0)
    }

    fn explain(&self, slot: usize, victim: PageId, page: PageId) -> String {
        format!(
            "Page fault! Replaced least recently used page {} in frame {} with page {}",
            victim, slot, page
        )
    }
}

/// When a resident page will next be referenced. `Never` ranks above every finite position and
/// equal to any other `Never`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum NextUse {
    At(usize),
    Never,
}

impl std::fmt::Display for NextUse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NextUse::At(position) => write!(f, "{}", position),
            NextUse::Never => write!(f, "never"),
        }
    }
}

/// The optimal policy looks ahead in the reference stream. Every page maps to the queue of
/// positions at which it will still be referenced; consumed positions are dropped as the run
/// advances, so the front of a queue is always that page's next use.
pub struct OptimalVictimizer {
    upcoming: HashMap<PageId, VecDeque<usize>>,
}

impl OptimalVictimizer {
    pub fn build(references: &ReferenceSequence) -> Self {
        let mut upcoming: HashMap<PageId, VecDeque<usize>> = HashMap::new();
        references.iter().enumerate().for_each(|(position, page)| {
            upcoming.entry(*page).or_default().push_back(position);
        });
        Self { upcoming }
    }

    /// Next position at which `page` is referenced, strictly after everything already reported
    /// through `reference`.
    pub fn next_use(&self, page: PageId) -> NextUse {
        match self.upcoming.get(&page).and_then(|queue| queue.front()) {
            Some(position) => NextUse::At(*position),
            None => NextUse::Never,
        }
    }
}

impl Victimizer for OptimalVictimizer {
    fn reference(&mut self, position: usize, page: PageId) {
        if let Some(queue) = self.upcoming.get_mut(&page) {
            while queue.front().is_some_and(|front| *front <= position) {
                queue.pop_front();
            }
        }
    }

    fn select(&mut self, frames: &FrameSet, _position: usize) -> usize {
        let mut victim: Option<(usize, NextUse)> = None;
        for (slot, page) in frames.residents() {
            let next_use = self.next_use(page);
            // strictly greater keeps the lowest slot on ties
            if victim.map_or(true, |(_, furthest)| next_use > furthest) {
                victim = Some((slot, next_use));
            }
        }
        victim.map_or(0, |(slot, _)| slot)
    }

    fn explain(&self, slot: usize, victim: PageId, page: PageId) -> String {
        format!(
            "Page fault! Replaced page {} in frame {} with page {} (next use: {})",
            victim,
            slot,
            page,
            self.next_use(victim)
        )
    }
}

#[cfg(test)]
mod tests {

    use super::*;

    fn full_frames(pages: &[PageId]) -> FrameSet {
        let mut frames = FrameSet::build(pages.len());
        pages.iter().enumerate().for_each(|(slot, page)| {
            frames.place(slot, *page);
        });
        frames
    }

    #[cfg(test)]
    mod policy_tests {

        use super::*;

        #[test]
        fn to_string() {
            assert_eq!(Policy::Fifo.to_string(), "FIFO");
            assert_eq!(Policy::Lru.to_string(), "LRU");
            assert_eq!(Policy::Optimal.to_string(), "Optimal");
        }

        #[test]
        fn value_enum() {
            assert_eq!(Policy::from_str("lru", true), Ok(Policy::Lru));
            assert_eq!(Policy::from_str("OPTIMAL", true), Ok(Policy::Optimal));
            assert!(Policy::from_str("clock", true).is_err());
        }
    }

    #[cfg(test)]
    mod fifo_tests {

        use super::*;

        #[test]
        fn cursor_wraps() {
            let frames = full_frames(&[1, 2, 3]);
            let mut fifo = FifoVictimizer::build(3);
            let picks: Vec<usize> = (0..5).map(|i| fifo.select(&frames, i)).collect();
            assert_eq!(picks, vec![0, 1, 2, 0, 1]);
        }

        #[test]
        fn ignores_hits() {
            let frames = full_frames(&[1, 2]);
            let mut fifo = FifoVictimizer::build(2);
            fifo.reference(0, 1);
            fifo.reference(1, 1);
            assert_eq!(fifo.select(&frames, 2), 0);
        }
    }

    #[cfg(test)]
    mod lru_tests {

        use super::*;

        #[test]
        fn reference_refreshes() {
            let mut lru = LruVictimizer::build();
            lru.reference(0, 1);
            lru.reference(1, 2);
            lru.reference(2, 1);
            assert_eq!(lru.last_used(1), Some(2));
            assert_eq!(lru.last_used(2), Some(1));
            assert_eq!(lru.recency.front().unwrap().0, &2);
        }

        #[test]
        fn select_least_recent_resident() {
            let frames = full_frames(&[1, 2, 3]);
            let mut lru = LruVictimizer::build();
            [1, 2, 3, 1, 2].iter().enumerate().for_each(|(i, page)| lru.reference(i, *page));
            lru.reference(5, 4);
            assert_eq!(lru.select(&frames, 5), 2);
        }

        #[test]
        fn select_skips_evicted_pages() {
            let frames = full_frames(&[2, 3]);
            let mut lru = LruVictimizer::build();
            [1, 2, 3].iter().enumerate().for_each(|(i, page)| lru.reference(i, *page));
            assert_eq!(lru.select(&frames, 3), 0);
        }
    }

    #[cfg(test)]
    mod optimal_tests {

        use super::*;

        #[test]
        fn next_use_ordering() {
            assert!(NextUse::At(usize::MAX) < NextUse::Never);
            assert!(NextUse::At(3) < NextUse::At(4));
            assert_eq!(NextUse::Never, NextUse::Never);
        }

        #[test]
        fn next_use_advances() {
            let references = ReferenceSequence::from(vec![1, 2, 1, 3]);
            let mut optimal = OptimalVictimizer::build(&references);
            assert_eq!(optimal.next_use(1), NextUse::At(0));
            optimal.reference(0, 1);
            assert_eq!(optimal.next_use(1), NextUse::At(2));
            optimal.reference(2, 1);
            assert_eq!(optimal.next_use(1), NextUse::Never);
            assert_eq!(optimal.next_use(9), NextUse::Never);
        }

        #[test]
        fn select_furthest() {
            let references = ReferenceSequence::from(vec![1, 2, 3, 4, 1, 2, 5, 1, 2, 3, 4, 5]);
            let mut optimal = OptimalVictimizer::build(&references);
            (0..4).for_each(|i| optimal.reference(i, references[i]));
            let frames = full_frames(&[1, 2, 3]);
            assert_eq!(optimal.select(&frames, 3), 2);
        }

        #[test]
        fn select_tie_lowest_slot() {
            let references = ReferenceSequence::from(vec![1, 2, 3, 4]);
            let mut optimal = OptimalVictimizer::build(&references);
            (0..4).for_each(|i| optimal.reference(i, references[i]));
            let frames = full_frames(&[1, 2, 3]);
            assert_eq!(optimal.select(&frames, 3), 0);
        }

        #[test]
        fn explain_never() {
            let references = ReferenceSequence::from(vec![1, 2]);
            let optimal = OptimalVictimizer::build(&references);
            assert_eq!(
                optimal.explain(0, 5, 2),
                "Page fault! Replaced page 5 in frame 0 with page 2 (next use: never)"
            );
        }
    }
}
