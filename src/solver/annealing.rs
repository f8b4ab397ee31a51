use std::f64;
use std::time::Instant;

use log::{debug, info, trace};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::config::{AnnealingConfig, ConfigErr, EnergyWeights};
use crate::map::Map;
use crate::moves::Moves;
use crate::state::State;

use super::expand::expand;
use super::heuristic::Heuristic;
use super::stats::Stats;
use super::tracker::{Solution, SolutionTracker};
use super::{SearchStrategy, SolverErr};

/// Random walk over states which prefers lower energy and cools down over time.
///
/// No optimality guarantee. Every goal it walks into is recorded and the best one is returned.
#[derive(Debug, Clone)]
pub struct Annealing<R: Rng = ChaCha8Rng> {
    config: AnnealingConfig,
    max_iterations: u32,
    solution_limit: u32,
    rng: R,
    last_stats: Stats,
}

impl Annealing<ChaCha8Rng> {
    /// Seeded from `config.seed`.
    pub fn new(
        config: AnnealingConfig,
        max_iterations: u32,
        solution_limit: u32,
    ) -> Result<Self, ConfigErr> {
        let rng = ChaCha8Rng::seed_from_u64(config.seed);
        Self::with_rng(config, max_iterations, solution_limit, rng)
    }
}

impl<R: Rng> Annealing<R> {
    pub fn with_rng(
        config: AnnealingConfig,
        max_iterations: u32,
        solution_limit: u32,
        rng: R,
    ) -> Result<Self, ConfigErr> {
        config.validate()?;
        Ok(Annealing {
            config,
            max_iterations,
            solution_limit: solution_limit.max(1),
            rng,
            last_stats: Stats::new(),
        })
    }

    /// Stats of the most recent run, also when it ended without a solution.
    pub fn last_stats(&self) -> &Stats {
        &self.last_stats
    }

    /// Part of the way back up to the initial temperature.
    fn reheat(&self, temperature: f64) -> f64 {
        temperature + (self.config.initial_temperature - temperature) * self.config.reheat_fraction
    }

    /// Index of the next candidate - half the time the best one, otherwise drawn from
    /// a Boltzmann distribution. At least one energy must be finite.
    fn select(&mut self, energies: &[f64], temperature: f64) -> usize {
        let (best_idx, min) = energies
            .iter()
            .cloned()
            .enumerate()
            .fold((0, f64::INFINITY), |(bi, be), (i, e)| {
                if e < be {
                    (i, e)
                } else {
                    (bi, be)
                }
            });

        if self.rng.random::<f64>() < 0.5 {
            return best_idx;
        }

        // shifted by the minimum so the exponentials don't underflow to all zeros
        let weights: Vec<f64> = energies
            .iter()
            .map(|&e| {
                if e.is_infinite() {
                    0.0
                } else {
                    (-(e - min) / temperature).exp()
                }
            })
            .collect();
        let total: f64 = weights.iter().sum();

        let r = self.rng.random::<f64>() * total;
        let mut acc = 0.0;
        let mut last_finite = best_idx;
        for (i, &w) in weights.iter().enumerate() {
            if w <= 0.0 {
                continue;
            }
            acc += w;
            last_finite = i;
            if r < acc {
                return i;
            }
        }
        last_finite
    }

    fn accept(&mut self, delta: f64, temperature: f64) -> bool {
        if delta < 0.0 {
            true
        } else {
            self.rng.random::<f64>() < (-delta / temperature).exp()
        }
    }
}

/// `pull * pulls + heuristic * h + moves * moves`, infinite if `h` is.
pub fn energy(weights: &EnergyWeights, h: f64, state: &State) -> f64 {
    if h.is_infinite() {
        return f64::INFINITY;
    }
    weights.pull * f64::from(state.pulls)
        + weights.heuristic * h
        + weights.moves * f64::from(state.moves)
}

impl<R: Rng> SearchStrategy for Annealing<R> {
    fn solve(
        &mut self,
        map: &Map,
        initial: &State,
        heuristic: &dyn Heuristic,
    ) -> Result<Solution, SolverErr> {
        let started = Instant::now();
        let mut stats = Stats::new();
        self.last_stats = Stats::new();

        if initial.is_solved(map) {
            return Ok(Solution::new(Moves::default(), stats, started.elapsed()));
        }

        let weights = self.config.weights;
        let state_energy =
            |state: &State| energy(&weights, heuristic.estimate(map, state), state);

        let mut current = initial.clone();
        let mut path = Moves::default();
        let mut current_energy = state_energy(&current);
        if current_energy.is_infinite() {
            debug!("Initial state is dead");
            return Err(SolverErr::UnsolvableState);
        }

        let mut best = (current.clone(), path.clone(), current_energy);
        let mut tracker = SolutionTracker::new();
        let mut temperature = self.config.initial_temperature;
        let mut stagnation = 0;

        for iteration in 1..=self.max_iterations {
            if temperature < self.config.min_temperature {
                debug!("Frozen after {} iterations", iteration - 1);
                break;
            }
            stats.iterations = iteration;

            let neighbors = expand(map, &current);
            let energies: Vec<f64> = neighbors.iter().map(|(_, s)| state_energy(s)).collect();
            stats.explored += neighbors.len() as u64;
            stats.dead += energies.iter().filter(|e| e.is_infinite()).count() as u64;

            if stagnation > self.config.stagnation_limit
                || energies.iter().all(|e| e.is_infinite())
            {
                // also covers no moves at all
                current = best.0.clone();
                path = best.1.clone();
                current_energy = best.2;
                temperature = self.reheat(temperature);
                stagnation = 0;
                stats.reinits += 1;
                trace!(
                    "Reinitialized to energy {} at temperature {}",
                    current_energy,
                    temperature
                );
            } else {
                let idx = self.select(&energies, temperature);
                let delta = energies[idx] - current_energy;
                if self.accept(delta, temperature) {
                    if delta < 0.0 {
                        stagnation = 0;
                    } else {
                        stagnation += 1;
                    }

                    let (mov, next) = neighbors.into_iter().nth(idx).ok_or_else(|| {
                        SolverErr::InternalInconsistency("selected missing neighbor".to_owned())
                    })?;
                    path.add(mov);
                    current = next;
                    current_energy = energies[idx];
                    if current_energy < best.2 {
                        best = (current.clone(), path.clone(), current_energy);
                    }

                    if current.is_solved(map) {
                        let solution =
                            Solution::new(path.clone(), stats.clone(), started.elapsed());
                        tracker.record(map, initial, solution)?;
                        if tracker.recorded() >= self.solution_limit {
                            break;
                        }
                    }
                }
            }

            temperature *= self.config.cooling;
        }

        info!(
            "Annealing finished: {} iterations, {} reinitializations, {} solutions",
            stats.iterations,
            stats.reinits,
            tracker.recorded()
        );
        self.last_stats = stats.clone();
        let elapsed = started.elapsed();
        match tracker.into_best() {
            Some(mut best) => {
                best.stats = stats;
                best.elapsed = elapsed;
                Ok(best)
            }
            None => Err(SolverErr::IterationLimitExceeded { best: None }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rand::RngCore;

    use crate::config::HeuristicKind;
    use crate::data::Pos;
    use crate::level::Level;
    use crate::solver::heuristic::{self, DeadlockAware, Manhattan};

    /// Every draw is 0.0.
    struct ZeroRng;

    impl RngCore for ZeroRng {
        fn next_u32(&mut self) -> u32 {
            0
        }

        fn next_u64(&mut self) -> u64 {
            0
        }

        fn fill_bytes(&mut self, dst: &mut [u8]) {
            for byte in dst {
                *byte = 0;
            }
        }
    }

    fn parse(xsb: &str) -> Level {
        xsb.parse().unwrap()
    }

    fn run(
        level: &Level,
        config: AnnealingConfig,
        h: &dyn Heuristic,
    ) -> Result<Solution, SolverErr> {
        Annealing::new(config, 100_000, 1)
            .unwrap()
            .solve(&level.map, &level.state, h)
    }

    fn summary(res: Result<Solution, SolverErr>) -> Result<(Moves, Stats), SolverErr> {
        res.map(|s| (s.moves, s.stats))
    }

    #[test]
    fn only_move_solves() {
        let level = parse(
            r"
#####
#@$.#
#####
",
        );
        for seed in 0..5 {
            let config = AnnealingConfig {
                seed,
                ..AnnealingConfig::default()
            };
            let solution = run(&level, config, &DeadlockAware(Manhattan)).unwrap();
            assert_eq!(solution.moves.to_string(), "R");
            assert_eq!(solution.stats.iterations, 1);
        }
    }

    #[test]
    fn already_solved() {
        let level = parse(
            r"
#####
#@* #
#####
",
        );
        let solution = run(&level, AnnealingConfig::default(), &Manhattan).unwrap();
        assert!(solution.moves.is_empty());
    }

    #[test]
    fn dead_start() {
        let level = parse(
            r"
#####
#$@.#
#####
",
        );
        let res = run(&level, AnnealingConfig::default(), &DeadlockAware(Manhattan));
        assert_eq!(res, Err(SolverErr::UnsolvableState));
    }

    #[test]
    fn gives_up() {
        let level = parse(
            r"
#######
#@$ #.#
#######
",
        );
        let res = Annealing::new(AnnealingConfig::default(), 300, 1)
            .unwrap()
            .solve(&level.map, &level.state, &Manhattan);
        assert_eq!(res, Err(SolverErr::IterationLimitExceeded { best: None }));
    }

    #[test]
    fn same_seed_same_result() {
        let level = parse(
            r"
#######
#     #
# $.$ #
#  @  #
# .   #
#######
",
        );
        let h = heuristic::build(HeuristicKind::Hungarian, true);
        let config = AnnealingConfig {
            seed: 42,
            ..AnnealingConfig::default()
        };
        let first = run(&level, config, h.as_ref());
        let second = run(&level, config, h.as_ref());
        assert_eq!(summary(first.clone()), summary(second));

        if let Ok(solution) = first {
            let end = solution.replay(&level.map, &level.state).unwrap();
            assert!(end.is_solved(&level.map));
        }
    }

    #[test]
    fn open_map() {
        let level = parse(
            r"
----
-+--
-$--
----
",
        );
        let solution = run(&level, AnnealingConfig::default(), &DeadlockAware(Manhattan)).unwrap();
        let end = solution.replay(&level.map, &level.state).unwrap();
        assert!(end.is_solved(&level.map));
        assert_eq!(end.pulls as usize, solution.pull_cnt());
    }

    #[test]
    fn injected_rng() {
        let level = parse(
            r"
#####
#@$.#
#####
",
        );
        // greedy selection, every move accepted
        let mut solver =
            Annealing::with_rng(AnnealingConfig::default(), 10, 1, ZeroRng).unwrap();
        let solution = solver
            .solve(&level.map, &level.state, &Manhattan)
            .unwrap();
        assert_eq!(solution.moves.to_string(), "R");
    }

    #[test]
    fn restarts_from_best_when_stagnating() {
        let level = parse(
            r"
######
#@$ .#
######
",
        );
        // every step back is followed by a restart from the state after the first push
        let mut restarted = 0;
        for seed in 0..40 {
            let config = AnnealingConfig {
                stagnation_limit: 0,
                seed,
                ..AnnealingConfig::default()
            };
            let mut solver = Annealing::new(config, 1000, 1).unwrap();
            let solution = solver
                .solve(&level.map, &level.state, &DeadlockAware(Manhattan))
                .unwrap();
            assert_eq!(solution.moves.to_string(), "RR");
            assert_eq!(&solution.stats, solver.last_stats());
            assert!(solution.stats.iterations >= 2 + 2 * solution.stats.reinits);
            if solution.stats.reinits > 0 {
                restarted += 1;
            }

            let again = Annealing::new(config, 1000, 1)
                .unwrap()
                .solve(&level.map, &level.state, &DeadlockAware(Manhattan))
                .unwrap();
            assert_eq!(again.stats, solution.stats);
        }
        assert!(restarted > 0);
    }

    #[test]
    fn restarts_when_every_neighbor_is_dead() {
        // the only move corners the box, the goal is walled off
        let level = parse(
            r"
#####
# $@#
#####
#.  #
#####
",
        );
        let mut solver = Annealing::new(AnnealingConfig::default(), 20, 1).unwrap();
        let res = solver.solve(&level.map, &level.state, &DeadlockAware(Manhattan));
        assert_eq!(res, Err(SolverErr::IterationLimitExceeded { best: None }));

        let stats = solver.last_stats();
        assert_eq!(stats.iterations, 20);
        assert_eq!(stats.reinits, 20);
        assert_eq!(stats.explored, 20);
        assert_eq!(stats.dead, 20);
    }

    #[test]
    fn reheating() {
        let config = AnnealingConfig::default();
        let solver = Annealing::new(config, 10, 1).unwrap();
        for &temperature in &[0.1, 1.0, 350.0, 699.0] {
            let reheated = solver.reheat(temperature);
            assert!(reheated > temperature);
            assert!(reheated < config.initial_temperature);
        }
    }

    #[test]
    fn invalid_schedule() {
        let config = AnnealingConfig {
            reheat_fraction: 1.0,
            ..AnnealingConfig::default()
        };
        assert!(Annealing::new(config, 10, 1).is_err());

        let config = AnnealingConfig {
            cooling: 1.5,
            ..AnnealingConfig::default()
        };
        assert!(Annealing::new(config, 10, 1).is_err());
    }

    #[test]
    fn energies() {
        let weights = EnergyWeights::default();
        let state = State::with_counts(Pos::new(0, 0), vec![], 10, 2);
        assert!((energy(&weights, 3.0, &state) - 6.0).abs() < 1e-9);
        assert_eq!(energy(&weights, f64::INFINITY, &state), f64::INFINITY);
    }
}
