//! Run statistics reported by the synthesis engines.

use std::fmt::{Display, Formatter};
use std::time::Duration;

#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct EmbedStatistics {
    pub runtime: Duration,
}

#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct TbsStatistics {
    pub runtime: Duration,
    /// Distinct rows that needed at least one gate (symbolic variants only).
    pub assignment_count: Option<usize>,
    /// Time spent inside the SAT solver.
    pub solving_time: Option<Duration>,
    pub num_gates: usize,
}

#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct ExactStatistics {
    pub runtime: Duration,
    /// Largest depth that was checked.
    pub depth: usize,
    /// Nodes allocated in the manager at the end of the search.
    pub bdd_nodes: usize,
}

impl Display for EmbedStatistics {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "runtime: {:.3} s", self.runtime.as_secs_f64())
    }
}

impl Display for TbsStatistics {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "gates: {}, runtime: {:.3} s",
            self.num_gates,
            self.runtime.as_secs_f64()
        )?;
        if let Some(count) = self.assignment_count {
            write!(f, ", assignments: {}", count)?;
        }
        if let Some(solving) = self.solving_time {
            write!(f, ", solving: {:.3} s", solving.as_secs_f64())?;
        }
        Ok(())
    }
}

impl Display for ExactStatistics {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "depth: {}, nodes: {}, runtime: {:.3} s",
            self.depth,
            self.bdd_nodes,
            self.runtime.as_secs_f64()
        )
    }
}
