use crate::engine::{simulate, SimulationTrace};
use crate::policy::Policy;
use crate::reference::ReferenceSequence;
use crate::stattrack::Summary;
use serde::Serialize;
use std::io::{self, Write};

/// JSON document emitted for a single trace.
#[derive(Serialize)]
pub struct TraceReport<'a> {
    pub references: &'a ReferenceSequence,
    pub trace: &'a SimulationTrace,
    pub summary: Summary,
}

impl<'a> TraceReport<'a> {
    pub fn new(references: &'a ReferenceSequence, trace: &'a SimulationTrace) -> Self {
        Self {
            references,
            trace,
            summary: Summary::from(trace),
        }
    }
}

/// Write `trace` as a table, one row per reference, followed by the summary.
///
/// # Arguments
///
/// * `out` - destination of the table.
/// * `trace` - the trace to print.
/// * `details` - whether to include each step's rationale.
pub fn write_trace<W: Write>(
    out: &mut W,
    trace: &SimulationTrace,
    details: bool,
) -> io::Result<()> {
    if trace.is_empty() {
        writeln!(out, "nothing to simulate: enter a valid reference string")?;
        return Ok(());
    }
    writeln!(out, "{:>4}  {:>4}  frames", "step", "page")?;
    for (index, step) in trace.iter().enumerate() {
        match details {
            true => writeln!(out, "{:>4}  {}  {}", index + 1, step, step.details())?,
            false => writeln!(out, "{:>4}  {}", index + 1, step)?,
        }
    }
    writeln!(out, "{}", Summary::from(trace))
}

/// Summaries of every policy over the same references and capacity.
pub fn compare(references: &ReferenceSequence, capacity: usize) -> Vec<Summary> {
    Policy::ALL
        .iter()
        .map(|policy| Summary::from(&simulate(*policy, references, capacity)))
        .collect()
}

pub fn write_comparison<W: Write>(out: &mut W, summaries: &[Summary]) -> io::Result<()> {
    writeln!(
        out,
        "{:<8} {:>6} {:>10} {:>6} {:>6} {:>12}",
        "policy", "frames", "references", "hits", "faults", "fault ratio"
    )?;
    for summary in summaries {
        writeln!(
            out,
            "{:<8} {:>6} {:>10} {:>6} {:>6} {:>11.2}%",
            summary.policy.to_string(),
            summary.capacity,
            summary.references,
            summary.hits,
            summary.faults,
            summary.fault_ratio,
        )?;
    }
    Ok(())
}
