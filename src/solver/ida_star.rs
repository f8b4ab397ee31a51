use std::f64;
use std::time::Instant;

use fnv::FnvHashMap;
use log::{debug, info, trace};

use crate::config::CostMetric;
use crate::map::Map;
use crate::moves::Moves;
use crate::state::{CanonicalKey, State};

use super::expand::expand;
use super::heuristic::Heuristic;
use super::stats::Stats;
use super::tracker::{Solution, SolutionTracker};
use super::{SearchStrategy, SolverErr};

/// Lowest cost each state was reached with during one deepening iteration.
type VisitedRegistry = FnvHashMap<CanonicalKey, u32>;

/// Iterative deepening A*.
///
/// Each iteration is a depth first search cut off where `g + h` exceeds the threshold.
/// The next threshold is the smallest value that was cut off.
///
/// When minimizing pulls the heuristic only prunes dead states, the distances it estimates
/// are in moves and would overestimate the pulls left.
#[derive(Debug, Clone)]
pub struct IdaStar {
    cost: CostMetric,
    max_iterations: u32,
    solution_limit: u32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Bound {
    /// Enough solutions found, unwind.
    Stop,
    /// Smallest `f` that exceeded the threshold, infinite if nothing did.
    Exceeded(f64),
}

impl IdaStar {
    pub fn new(cost: CostMetric, max_iterations: u32, solution_limit: u32) -> Self {
        IdaStar {
            cost,
            max_iterations,
            solution_limit: solution_limit.max(1),
        }
    }
}

impl SearchStrategy for IdaStar {
    fn solve(
        &mut self,
        map: &Map,
        initial: &State,
        heuristic: &dyn Heuristic,
    ) -> Result<Solution, SolverErr> {
        let mut search = Search {
            map,
            initial,
            heuristic,
            cost: self.cost,
            solution_limit: self.solution_limit,
            path: Moves::default(),
            tracker: SolutionTracker::new(),
            stats: Stats::new(),
            started: Instant::now(),
        };

        let mut threshold = search.estimate(initial);
        if threshold.is_infinite() {
            debug!("Initial state is dead");
            return Err(SolverErr::UnsolvableState);
        }

        for iteration in 1..=self.max_iterations {
            search.stats.iterations = iteration;
            let mut visited = VisitedRegistry::default();
            let bound = search.bounded(initial, 0, threshold, &mut visited)?;
            debug!(
                "Iteration {}: threshold {}, explored {}, visited {}",
                iteration,
                threshold,
                search.stats.explored,
                visited.len()
            );

            if search.tracker.recorded() > 0 {
                return search.finish().ok_or_else(|| {
                    SolverErr::InternalInconsistency("recorded solution went missing".to_owned())
                });
            }
            match bound {
                Bound::Exceeded(next) if next.is_infinite() => {
                    info!("Search space exhausted after {} iterations", iteration);
                    return Err(SolverErr::UnsolvableState);
                }
                Bound::Exceeded(next) => threshold = next,
                Bound::Stop => {
                    return Err(SolverErr::InternalInconsistency(
                        "search stopped without a solution".to_owned(),
                    ));
                }
            }
        }

        info!("Reached {} iterations", self.max_iterations);
        Err(SolverErr::IterationLimitExceeded {
            best: search.finish(),
        })
    }
}

struct Search<'a> {
    map: &'a Map,
    initial: &'a State,
    heuristic: &'a dyn Heuristic,
    cost: CostMetric,
    solution_limit: u32,
    path: Moves,
    tracker: SolutionTracker,
    stats: Stats,
    started: Instant,
}

impl<'a> Search<'a> {
    fn bounded(
        &mut self,
        state: &State,
        g: u32,
        threshold: f64,
        visited: &mut VisitedRegistry,
    ) -> Result<Bound, SolverErr> {
        self.stats.explored += 1;

        if cfg!(debug_assertions) && !state.is_consistent(self.map) {
            return Err(SolverErr::InternalInconsistency(format!(
                "reached invalid state after {}:\n{}",
                self.path,
                self.map.format_with_state(state)
            )));
        }

        if state.is_solved(self.map) {
            // the last move cost more than the threshold allowed
            if f64::from(g) > threshold {
                return Ok(Bound::Exceeded(f64::from(g)));
            }
            return self.found_goal();
        }

        let key = state.key();
        if let Some(&prev_g) = visited.get(&key) {
            if prev_g <= g {
                self.stats.duplicates += 1;
                return Ok(Bound::Exceeded(f64::INFINITY));
            }
        }
        visited.insert(key, g);

        let h = self.estimate(state);
        if h.is_infinite() {
            self.stats.dead += 1;
            return Ok(Bound::Exceeded(f64::INFINITY));
        }
        let f = f64::from(g) + h;
        if f > threshold {
            return Ok(Bound::Exceeded(f));
        }

        let mut min = f64::INFINITY;
        for (mov, new_state) in expand(self.map, state) {
            self.path.add(mov);
            let new_g = g + self.cost.cost(mov.is_pull());
            let res = self.bounded(&new_state, new_g, threshold, visited);
            self.path.pop();

            match res? {
                Bound::Stop => return Ok(Bound::Stop),
                Bound::Exceeded(bound) => {
                    if bound < min {
                        min = bound;
                    }
                }
            }
        }
        Ok(Bound::Exceeded(min))
    }

    /// Remaining cost in units of the cost metric.
    fn estimate(&self, state: &State) -> f64 {
        let h = self.heuristic.estimate(self.map, state);
        match self.cost {
            CostMetric::Moves => h,
            CostMetric::Pulls if h.is_infinite() => h,
            CostMetric::Pulls => 0.0,
        }
    }

    fn found_goal(&mut self) -> Result<Bound, SolverErr> {
        trace!("Found goal: {}", self.path);
        let solution = Solution::new(
            self.path.clone(),
            self.stats.clone(),
            self.started.elapsed(),
        );
        self.tracker.record(self.map, self.initial, solution)?;

        let no_pulls_needed = self.cost == CostMetric::Pulls
            && self.tracker.best().map_or(false, |best| best.pull_cnt() == 0);
        if self.tracker.recorded() >= self.solution_limit || no_pulls_needed {
            Ok(Bound::Stop)
        } else {
            Ok(Bound::Exceeded(f64::INFINITY))
        }
    }

    /// The best solution with the stats of the whole run.
    fn finish(self) -> Option<Solution> {
        let stats = self.stats;
        let elapsed = self.started.elapsed();
        self.tracker.into_best().map(|mut best| {
            best.stats = stats;
            best.elapsed = elapsed;
            best
        })
    }
}
