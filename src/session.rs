use crate::engine::{simulate, SimulationTrace};
use crate::playback::PlaybackController;
use crate::policy::Policy;
use crate::reference::ReferenceSequence;
use std::rc::Rc;

/// The three inputs a trace is computed from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inputs {
    pub references: ReferenceSequence,
    pub capacity: usize,
    pub policy: Policy,
}

/// A `Session` owns the simulation inputs, the trace computed from them and the controller
/// observing that trace. Every change to the inputs goes through [`Session::update`], which
/// recomputes the trace and stops playback in one step so the two can never disagree.
#[derive(Debug)]
pub struct Session {
    inputs: Inputs,
    trace: Rc<SimulationTrace>,
    controller: PlaybackController,
}

impl Session {
    pub fn build(inputs: Inputs) -> Self {
        let trace = Rc::new(simulate(inputs.policy, &inputs.references, inputs.capacity));
        Self {
            controller: PlaybackController::new(Rc::clone(&trace)),
            inputs,
            trace,
        }
    }

    /// Apply `edit` to the inputs, then replace the trace and force the controller back to
    /// `Stopped`, cancelling any pending timer.
    pub fn update<F: FnOnce(&mut Inputs)>(&mut self, edit: F) {
        edit(&mut self.inputs);
        self.trace = Rc::new(simulate(
            self.inputs.policy,
            &self.inputs.references,
            self.inputs.capacity,
        ));
        self.controller.replace_trace(Rc::clone(&self.trace));
    }

    /// Parse `text` as the new reference string. Malformed text yields an empty trace.
    pub fn set_references(&mut self, text: &str) {
        let references = ReferenceSequence::parse(text);
        self.update(|inputs| inputs.references = references);
    }

    pub fn set_capacity(&mut self, capacity: usize) {
        self.update(|inputs| inputs.capacity = capacity);
    }

    pub fn set_policy(&mut self, policy: Policy) {
        self.update(|inputs| inputs.policy = policy);
    }

    pub fn inputs(&self) -> &Inputs {
        &self.inputs
    }

    pub fn trace(&self) -> &SimulationTrace {
        &self.trace
    }

    pub fn controller(&self) -> &PlaybackController {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut PlaybackController {
        &mut self.controller
    }
}
