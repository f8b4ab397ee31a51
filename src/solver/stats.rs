use std::fmt::{self, Display, Formatter};

use separator::Separatable;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Stats {
    /// States taken out of the search (IDA* nodes, annealing candidates).
    pub explored: u64,
    /// Pruned because the state was already reached as cheaply in this iteration.
    pub duplicates: u64,
    /// Pruned because the heuristic was infinite.
    pub dead: u64,
    pub iterations: u32,
    pub reinits: u32,
}

impl Stats {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Display for Stats {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "States explored: {}", self.explored.separated_string())?;
        writeln!(f, "Reached duplicates: {}", self.duplicates.separated_string())?;
        writeln!(f, "Dead states: {}", self.dead.separated_string())?;
        writeln!(f, "Iterations: {}", self.iterations.separated_string())?;
        writeln!(f, "Reinitializations: {}", self.reinits.separated_string())
    }
}
