use std::fmt::{self, Display, Formatter};
use std::time::Duration;

use log::debug;

use crate::map::Map;
use crate::moves::Moves;
use crate::state::State;

use super::expand::apply_move;
use super::stats::Stats;
use super::SolverErr;

#[derive(Debug, Clone, PartialEq)]
pub struct Solution {
    pub moves: Moves,
    pub stats: Stats,
    pub elapsed: Duration,
}

impl Solution {
    pub fn new(moves: Moves, stats: Stats, elapsed: Duration) -> Self {
        Solution {
            moves,
            stats,
            elapsed,
        }
    }

    pub fn move_cnt(&self) -> usize {
        self.moves.move_cnt()
    }

    pub fn pull_cnt(&self) -> usize {
        self.moves.pull_cnt()
    }

    pub fn explored(&self) -> u64 {
        self.stats.explored
    }

    /// Fewer pulls, then fewer moves.
    pub fn is_better_than(&self, other: &Solution) -> bool {
        (self.pull_cnt(), self.move_cnt()) < (other.pull_cnt(), other.move_cnt())
    }

    /// Every state along the solution, `initial` included.
    ///
    /// `None` if some move is illegal where it's played.
    pub fn replay_states(&self, map: &Map, initial: &State) -> Option<Vec<State>> {
        let mut states = vec![initial.clone()];
        for &mov in &self.moves {
            let next = apply_move(map, states.last()?, mov)?;
            states.push(next);
        }
        Some(states)
    }

    /// The state the solution ends in.
    pub fn replay(&self, map: &Map, initial: &State) -> Option<State> {
        let mut cur = initial.clone();
        for &mov in &self.moves {
            cur = apply_move(map, &cur, mov)?;
        }
        Some(cur)
    }
}

impl Display for Solution {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.moves)?;
        writeln!(f, "Moves: {}", self.move_cnt())?;
        writeln!(f, "Pulls: {}", self.pull_cnt())
    }
}

/// Keeps the best solution one search run has found.
#[derive(Debug, Clone, Default)]
pub struct SolutionTracker {
    best: Option<Solution>,
    recorded: u32,
}

impl SolutionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Offers a solution found from `initial`. Returns whether it became the best one.
    ///
    /// The moves are replayed first. If they don't lead to a solved state
    /// the search has a bug and the solution is rejected.
    pub fn record(
        &mut self,
        map: &Map,
        initial: &State,
        solution: Solution,
    ) -> Result<bool, SolverErr> {
        let end = solution.replay(map, initial).ok_or_else(|| {
            SolverErr::InternalInconsistency(format!("illegal move in {}", solution.moves))
        })?;
        if !end.is_solved(map) {
            return Err(SolverErr::InternalInconsistency(format!(
                "{} doesn't end in a solved state",
                solution.moves
            )));
        }

        self.recorded += 1;
        debug!(
            "Recorded solution #{}: {} moves, {} pulls",
            self.recorded,
            solution.move_cnt(),
            solution.pull_cnt()
        );
        Ok(self.offer(solution))
    }

    fn offer(&mut self, solution: Solution) -> bool {
        let better = match self.best {
            None => true,
            Some(ref best) => solution.is_better_than(best),
        };
        if better {
            self.best = Some(solution);
        }
        better
    }

    /// Number of solutions recorded, including the ones that weren't better.
    pub fn recorded(&self) -> u32 {
        self.recorded
    }

    pub fn best(&self) -> Option<&Solution> {
        self.best.as_ref()
    }

    pub fn into_best(self) -> Option<Solution> {
        self.best
    }

    /// Takes over the other tracker's solution if it's better.
    pub fn merge(&mut self, other: SolutionTracker) {
        self.recorded += other.recorded;
        if let Some(solution) = other.best {
            self.offer(solution);
        }
    }
}
