pub mod annealing;
pub mod deadlock;
pub mod expand;
pub mod heuristic;
pub mod ida_star;
pub mod stats;
pub mod tracker;

mod assignment;

use log::{debug, info};
use thiserror::Error;

use crate::config::{ConfigErr, Method, SolverConfig};
use crate::level::{self, Level, LevelErr};
use crate::map::Map;
use crate::state::State;
use crate::Solve;

use self::annealing::Annealing;
use self::heuristic::Heuristic;
use self::ida_star::IdaStar;
use self::tracker::Solution;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SolverErr {
    #[error("Invalid level: {0}")]
    InvalidLevel(#[from] LevelErr),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(#[from] ConfigErr),
    #[error("No solution exists")]
    UnsolvableState,
    #[error("Iteration limit exceeded")]
    IterationLimitExceeded { best: Option<Solution> },
    #[error("Internal inconsistency: {0}")]
    InternalInconsistency(String),
}

/// A way of searching for a solution.
pub trait SearchStrategy {
    fn solve(
        &mut self,
        map: &Map,
        initial: &State,
        heuristic: &dyn Heuristic,
    ) -> Result<Solution, SolverErr>;
}

#[derive(Debug)]
pub enum Solver {
    IdaStar(IdaStar),
    Annealing(Annealing),
}

impl Solver {
    pub fn new(config: &SolverConfig) -> Result<Self, ConfigErr> {
        Ok(match config.method {
            Method::IdaStar => Solver::IdaStar(IdaStar::new(
                config.cost,
                config.max_iterations,
                config.solution_limit,
            )),
            Method::Annealing => Solver::Annealing(Annealing::new(
                config.annealing,
                config.max_iterations,
                config.solution_limit,
            )?),
        })
    }
}

impl SearchStrategy for Solver {
    fn solve(
        &mut self,
        map: &Map,
        initial: &State,
        heuristic: &dyn Heuristic,
    ) -> Result<Solution, SolverErr> {
        match self {
            Solver::IdaStar(solver) => solver.solve(map, initial, heuristic),
            Solver::Annealing(solver) => solver.solve(map, initial, heuristic),
        }
    }
}

impl Solve for Level {
    fn solve(&self, config: &SolverConfig) -> Result<Solution, SolverErr> {
        solve(self, config)
    }
}

fn solve(level: &Level, config: &SolverConfig) -> Result<Solution, SolverErr> {
    // fields are public so the level could have been changed after loading
    level::validate(&level.map, &level.state)?;

    let heuristic = heuristic::build(config.heuristic, config.deadlock_aware);
    info!(
        "Solving using {} with {} heuristic{}, minimizing {}",
        config.method,
        heuristic.name(),
        if config.deadlock_aware {
            " and deadlock detection"
        } else {
            ""
        },
        config.cost
    );

    let mut solver = Solver::new(config)?;
    let res = solver.solve(&level.map, &level.state, heuristic.as_ref());
    match res {
        Ok(ref solution) => debug!(
            "Solved: {} moves, {} pulls, {} states explored",
            solution.move_cnt(),
            solution.pull_cnt(),
            solution.explored()
        ),
        Err(ref err) => debug!("Not solved: {}", err),
    }
    res
}
