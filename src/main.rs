// Opt in to warnings about new 2018 idioms
#![warn(rust_2018_idioms)]
#![warn(trivial_casts)]
#![warn(trivial_numeric_casts)]
#![warn(unused)]
#![warn(clippy::all)]

use std::process;
use std::str::FromStr;

use clap::{App, Arg, ArgMatches};
use log::debug;
use prettytable::{Cell, Row, Table};
use separator::Separatable;

use sokoban_pull_solver::config::{CostMetric, HeuristicKind, Method, SolverConfig};
use sokoban_pull_solver::level::Level;
use sokoban_pull_solver::solver::tracker::Solution;
use sokoban_pull_solver::solver::SolverErr;
use sokoban_pull_solver::{LoadLevel, Solve};

fn main() {
    env_logger::init();

    let matches = App::new("sokoban-pull-solver")
        .author("martin-t")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Solves Sokoban levels where the player can also pull boxes")
        .arg(
            Arg::with_name("method")
                .short("m")
                .long("method")
                .takes_value(true)
                .possible_values(&["ida", "annealing"])
                .default_value("ida")
                .help("search method"),
        )
        .arg(
            Arg::with_name("heuristic")
                .long("heuristic")
                .takes_value(true)
                .possible_values(&[
                    "manhattan",
                    "euclidean",
                    "hungarian",
                    "efficient",
                    "direct-path",
                ])
                .default_value("manhattan")
                .help("distance estimate guiding the search"),
        )
        .arg(
            Arg::with_name("no-deadlocks")
                .long("no-deadlocks")
                .help("don't prune states with boxes stuck in corners or frozen in place"),
        )
        .arg(
            Arg::with_name("cost")
                .short("c")
                .long("cost")
                .takes_value(true)
                .possible_values(&["moves", "pulls"])
                .default_value("moves")
                .help("what IDA* minimizes"),
        )
        .arg(
            Arg::with_name("max-iterations")
                .short("i")
                .long("max-iterations")
                .takes_value(true)
                .help("deepening iterations for IDA*, steps for annealing"),
        )
        .arg(
            Arg::with_name("solutions")
                .short("n")
                .long("solutions")
                .takes_value(true)
                .help("stop after finding this many solutions"),
        )
        .arg(
            Arg::with_name("seed")
                .short("s")
                .long("seed")
                .takes_value(true)
                .help("random seed for annealing"),
        )
        .arg(
            Arg::with_name("steps")
                .long("steps")
                .help("print every state along the solution"),
        )
        .arg(Arg::with_name("file").required(true))
        .get_matches();

    let config = build_config(&matches).unwrap_or_else(|err| {
        eprintln!("{}", err);
        process::exit(1);
    });
    debug!("{:?}", config);

    // required so clap makes sure it's present
    let path = matches.value_of("file").unwrap_or_default();
    let level = path.load_level().unwrap_or_else(|err| {
        eprintln!("Can't load level {}: {}", path, err);
        process::exit(1);
    });

    println!("Solving {}...", path);
    println!("{}", level);

    match level.solve(&config) {
        Ok(solution) => {
            print_solution(&level, &solution, matches.is_present("steps"));
        }
        Err(SolverErr::IterationLimitExceeded { best: Some(solution) }) => {
            println!("Iteration limit exceeded, best solution found:");
            print_solution(&level, &solution, matches.is_present("steps"));
            process::exit(2);
        }
        Err(err) => {
            println!("{}", err);
            process::exit(2);
        }
    }
}

fn build_config(matches: &ArgMatches<'_>) -> Result<SolverConfig, String> {
    let method: Method = parse_arg(matches, "method")?.unwrap_or(Method::IdaStar);
    let mut config = SolverConfig::new(method);

    if let Some(heuristic) = parse_arg::<HeuristicKind>(matches, "heuristic")? {
        config.heuristic = heuristic;
    }
    config.deadlock_aware = !matches.is_present("no-deadlocks");
    if let Some(cost) = parse_arg::<CostMetric>(matches, "cost")? {
        config.cost = cost;
    }
    if let Some(max_iterations) = parse_arg(matches, "max-iterations")? {
        config.max_iterations = max_iterations;
    }
    if let Some(solutions) = parse_arg(matches, "solutions")? {
        config.solution_limit = solutions;
    }
    if let Some(seed) = parse_arg(matches, "seed")? {
        config.annealing.seed = seed;
    }
    Ok(config)
}

fn parse_arg<T>(matches: &ArgMatches<'_>, name: &str) -> Result<Option<T>, String>
where
    T: FromStr,
    T::Err: ToString,
{
    match matches.value_of(name) {
        None => Ok(None),
        Some(value) => value
            .parse()
            .map(Some)
            .map_err(|err: T::Err| format!("Invalid --{} {}: {}", name, value, err.to_string())),
    }
}

fn print_solution(level: &Level, solution: &Solution, steps: bool) {
    if steps {
        if let Some(states) = solution.replay_states(&level.map, &level.state) {
            for state in &states {
                println!("{}", level.map.format_with_state(state));
            }
        }
    }

    print!("{}", solution);

    let stats = &solution.stats;
    let mut table = Table::new();
    let rows = [
        ("States explored", stats.explored.separated_string()),
        ("Reached duplicates", stats.duplicates.separated_string()),
        ("Dead states", stats.dead.separated_string()),
        ("Iterations", stats.iterations.separated_string()),
        ("Reinitializations", stats.reinits.separated_string()),
        (
            "Time (ms)",
            // separator doesn't support u128
            (solution.elapsed.as_millis() as u64).separated_string(),
        ),
    ];
    for (name, value) in &rows {
        table.add_row(Row::new(vec![Cell::new(name), Cell::new(value)]));
    }
    table.printstd();
}
