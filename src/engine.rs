use crate::frames::FrameSet;
use crate::policy::Policy;
use crate::reference::ReferenceSequence;
use crate::PageId;
use serde::Serialize;
use std::ops::Index;

/// The `SimulationStep` records the decision taken for a single reference: the page requested,
/// the frames as they stand after servicing it, whether it was a hit, the page evicted (if any)
/// and a human-readable rationale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SimulationStep {
    reference: PageId,
    frames: FrameSet,
    is_hit: bool,
    replaced: Option<PageId>,
    details: String,
}

impl SimulationStep {
    pub fn reference(&self) -> PageId {
        self.reference
    }

    /// Frame contents after the reference was serviced.
    pub fn frames(&self) -> &FrameSet {
        &self.frames
    }

    pub fn is_hit(&self) -> bool {
        self.is_hit
    }

    /// The page evicted to make room, `None` for hits and for placements into an empty frame.
    pub fn replaced(&self) -> Option<PageId> {
        self.replaced
    }

    pub fn details(&self) -> &str {
        &self.details
    }

    pub fn is_fault(&self) -> bool {
        !self.is_hit
    }
}

/// The complete, ordered record of one simulation run. A trace is never patched: whenever the
/// references, the capacity or the policy change, a new trace is computed from scratch.
/// Steps are only reachable through shared references, so a trace cannot be edited after
/// `simulate` returns it.
///
/// ```compile_fail
/// use page_replacement_sim::engine::simulate;
/// use page_replacement_sim::policy::Policy;
/// use page_replacement_sim::reference::ReferenceSequence;
///
/// let mut trace = simulate(Policy::Lru, &ReferenceSequence::parse("1,2,1"), 2);
/// trace.steps.clear();
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SimulationTrace {
    policy: Policy,
    capacity: usize,
    steps: Vec<SimulationStep>,
}

impl SimulationTrace {
    pub fn empty(policy: Policy, capacity: usize) -> Self {
        Self {
            policy,
            capacity,
            steps: Vec::new(),
        }
    }

    pub fn policy(&self) -> Policy {
        self.policy
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn steps(&self) -> &[SimulationStep] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&SimulationStep> {
        self.steps.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SimulationStep> {
        self.steps.iter()
    }

    /// Index of the final step, `None` for an empty trace.
    pub fn last_index(&self) -> Option<usize> {
        self.steps.len().checked_sub(1)
    }

    pub fn faults(&self) -> usize {
        self.steps.iter().filter(|step| step.is_fault()).count()
    }
}

impl Index<usize> for SimulationTrace {
    type Output = SimulationStep;

    fn index(&self, index: usize) -> &Self::Output {
        &self.steps[index]
    }
}

/// Run `policy` over `references` with `capacity` frames and return the fully annotated trace.
///
/// The function is pure and deterministic: identical inputs always yield identical traces. A
/// zero capacity or an empty reference stream is not an error; it simply produces an empty
/// trace.
///
/// # Arguments
///
/// * `policy` - replacement policy used once every frame is occupied.
/// * `references` - the page reference stream to service.
/// * `capacity` - number of physical frames.
///
/// # Examples
///
/// ```
/// use page_replacement_sim::engine::simulate;
/// use page_replacement_sim::policy::Policy;
/// use page_replacement_sim::reference::ReferenceSequence;
///
/// let references = ReferenceSequence::parse("1,2,3,4");
/// let trace = simulate(Policy::Fifo, &references, 2);
/// assert_eq!(trace.len(), 4);
/// assert_eq!(trace[2].replaced(), Some(1));
/// ```
pub fn simulate(
    policy: Policy,
    references: &ReferenceSequence,
    capacity: usize,
) -> SimulationTrace {
    if references.is_empty() || capacity == 0 {
        return SimulationTrace::empty(policy, capacity);
    }

    let mut frames = FrameSet::build(capacity);
    let mut victimizer = policy.victimizer(references, capacity);
    let mut steps = Vec::with_capacity(references.len());

    for (position, &page) in references.iter().enumerate() {
        victimizer.reference(position, page);

        let step = if frames.contains(page) {
            SimulationStep {
                reference: page,
                frames: frames.clone(),
                is_hit: true,
                replaced: None,
                details: format!("Page hit! Page {} is already resident", page),
            }
        } else if let Some(slot) = frames.first_empty() {
            frames.place(slot, page);
            SimulationStep {
                reference: page,
                frames: frames.clone(),
                is_hit: false,
                replaced: None,
                details: format!("Page fault! Placed page {} in empty frame {}", page, slot),
            }
        } else {
            let slot = victimizer.select(&frames, position);
            let replaced = frames.place(slot, page);
            let details = match replaced {
                Some(victim) => victimizer.explain(slot, victim, page),
                None => format!("Page fault! Placed page {} in empty frame {}", page, slot),
            };
            SimulationStep {
                reference: page,
                frames: frames.clone(),
                is_hit: false,
                replaced,
                details,
            }
        };
        steps.push(step);
    }

    SimulationTrace {
        policy,
        capacity,
        steps,
    }
}

impl std::fmt::Display for SimulationStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let replaced = match self.replaced {
            Some(page) => page.to_string(),
            None => String::from("-"),
        };
        write!(
            f,
            "{:>4}  {}  {:<5} {:>8}",
            self.reference,
            self.frames,
            if self.is_hit { "hit" } else { "miss" },
            replaced,
        )
    }
}
