use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigErr {
    #[error("Unknown {kind}: {value}")]
    Unknown { kind: &'static str, value: String },
    #[error("{name} must be {range}, got {value}")]
    OutOfRange {
        name: &'static str,
        range: &'static str,
        value: f64,
    },
}

impl ConfigErr {
    fn new(kind: &'static str, value: &str) -> Self {
        ConfigErr::Unknown {
            kind,
            value: value.to_owned(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Method {
    IdaStar,
    Annealing,
}

impl Display for Method {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match *self {
            Method::IdaStar => write!(f, "ida"),
            Method::Annealing => write!(f, "annealing"),
        }
    }
}

impl FromStr for Method {
    type Err = ConfigErr;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ida" | "ida*" | "ida-star" => Ok(Method::IdaStar),
            "annealing" | "sa" => Ok(Method::Annealing),
            _ => Err(ConfigErr::new("method", s)),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HeuristicKind {
    Manhattan,
    Euclidean,
    Hungarian,
    Efficient,
    DirectPath,
}

impl HeuristicKind {
    pub fn all() -> [HeuristicKind; 5] {
        [
            HeuristicKind::Manhattan,
            HeuristicKind::Euclidean,
            HeuristicKind::Hungarian,
            HeuristicKind::Efficient,
            HeuristicKind::DirectPath,
        ]
    }
}

impl Display for HeuristicKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match *self {
            HeuristicKind::Manhattan => write!(f, "manhattan"),
            HeuristicKind::Euclidean => write!(f, "euclidean"),
            HeuristicKind::Hungarian => write!(f, "hungarian"),
            HeuristicKind::Efficient => write!(f, "efficient"),
            HeuristicKind::DirectPath => write!(f, "direct-path"),
        }
    }
}

impl FromStr for HeuristicKind {
    type Err = ConfigErr;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        HeuristicKind::all()
            .iter()
            .cloned()
            .find(|kind| kind.to_string() == s)
            .ok_or_else(|| ConfigErr::new("heuristic", s))
    }
}

/// What the searches minimize.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CostMetric {
    /// Every move costs 1.
    Moves,
    /// Pulls cost 1, steps and pushes are free.
    Pulls,
}

impl CostMetric {
    pub fn cost(self, is_pull: bool) -> u32 {
        match self {
            CostMetric::Moves => 1,
            CostMetric::Pulls => u32::from(is_pull),
        }
    }
}

impl Display for CostMetric {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match *self {
            CostMetric::Moves => write!(f, "moves"),
            CostMetric::Pulls => write!(f, "pulls"),
        }
    }
}

impl FromStr for CostMetric {
    type Err = ConfigErr;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "moves" => Ok(CostMetric::Moves),
            "pulls" => Ok(CostMetric::Pulls),
            _ => Err(ConfigErr::new("cost metric", s)),
        }
    }
}

/// Weights of the annealing energy: `pull * pulls + heuristic * h + moves * moves`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnergyWeights {
    pub pull: f64,
    pub heuristic: f64,
    pub moves: f64,
}

impl Default for EnergyWeights {
    fn default() -> Self {
        EnergyWeights {
            pull: 1.0,
            heuristic: 1.0,
            moves: 0.1,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AnnealingConfig {
    pub initial_temperature: f64,
    /// Multiplies the temperature after every step, between 0 and 1.
    pub cooling: f64,
    pub min_temperature: f64,
    /// Accepted non-improving steps in a row before restarting from the best state.
    pub stagnation_limit: u32,
    /// How far back towards the initial temperature a restart goes.
    pub reheat_fraction: f64,
    pub weights: EnergyWeights,
    pub seed: u64,
}

impl Default for AnnealingConfig {
    fn default() -> Self {
        AnnealingConfig {
            initial_temperature: 700.0,
            cooling: 0.9999,
            min_temperature: 0.1,
            stagnation_limit: 200,
            reheat_fraction: 0.7,
            weights: EnergyWeights::default(),
            seed: 0,
        }
    }
}

impl AnnealingConfig {
    /// Rejects schedules which never cool down or reheat all the way to the initial temperature.
    ///
    /// NaN fails every comparison so it's rejected too.
    pub fn validate(&self) -> Result<(), ConfigErr> {
        let positive = |value: f64| value > 0.0;
        let fraction = |value: f64| value > 0.0 && value < 1.0;

        check("initial_temperature", "positive", self.initial_temperature, positive)?;
        check("min_temperature", "positive", self.min_temperature, positive)?;
        check("cooling", "between 0 and 1", self.cooling, fraction)?;
        check("reheat_fraction", "between 0 and 1", self.reheat_fraction, fraction)
    }
}

fn check<F>(name: &'static str, range: &'static str, value: f64, ok: F) -> Result<(), ConfigErr>
where
    F: Fn(f64) -> bool,
{
    if ok(value) {
        Ok(())
    } else {
        Err(ConfigErr::OutOfRange { name, range, value })
    }
}

pub const DEFAULT_IDA_ITERATIONS: u32 = 200;
pub const DEFAULT_ANNEALING_ITERATIONS: u32 = 100_000;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SolverConfig {
    pub method: Method,
    pub heuristic: HeuristicKind,
    pub deadlock_aware: bool,
    pub cost: CostMetric,
    /// Deepening iterations for IDA*, steps for annealing.
    pub max_iterations: u32,
    /// Stop after finding this many goals.
    pub solution_limit: u32,
    pub annealing: AnnealingConfig,
}

impl SolverConfig {
    pub fn new(method: Method) -> Self {
        let max_iterations = match method {
            Method::IdaStar => DEFAULT_IDA_ITERATIONS,
            Method::Annealing => DEFAULT_ANNEALING_ITERATIONS,
        };
        SolverConfig {
            method,
            heuristic: HeuristicKind::Manhattan,
            deadlock_aware: true,
            cost: CostMetric::Moves,
            max_iterations,
            solution_limit: 1,
            annealing: AnnealingConfig::default(),
        }
    }
}

impl Default for SolverConfig {
    fn default() -> Self {
        SolverConfig::new(Method::IdaStar)
    }
}
