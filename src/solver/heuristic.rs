use std::f64;
use std::fmt::Debug;

use crate::config::HeuristicKind;
use crate::data::Pos;
use crate::map::Map;
use crate::state::State;

use super::assignment::min_cost_assignment;
use super::deadlock::is_deadlocked;

/// Estimated remaining cost of a state.
///
/// Never negative. `f64::INFINITY` means the goal can't be reached from the state.
pub trait Heuristic: Debug {
    fn name(&self) -> &'static str;

    fn estimate(&self, map: &Map, state: &State) -> f64;
}

/// Creates the heuristic used by both solvers.
pub fn build(kind: HeuristicKind, deadlock_aware: bool) -> Box<dyn Heuristic> {
    match (kind, deadlock_aware) {
        (HeuristicKind::Manhattan, false) => Box::new(Manhattan),
        (HeuristicKind::Manhattan, true) => Box::new(DeadlockAware(Manhattan)),
        (HeuristicKind::Euclidean, false) => Box::new(Euclidean),
        (HeuristicKind::Euclidean, true) => Box::new(DeadlockAware(Euclidean)),
        (HeuristicKind::Hungarian, false) => Box::new(Hungarian),
        (HeuristicKind::Hungarian, true) => Box::new(DeadlockAware(Hungarian)),
        (HeuristicKind::Efficient, false) => Box::new(Efficient),
        (HeuristicKind::Efficient, true) => Box::new(DeadlockAware(Efficient)),
        (HeuristicKind::DirectPath, false) => Box::new(DirectPath),
        (HeuristicKind::DirectPath, true) => Box::new(DeadlockAware(DirectPath)),
    }
}

fn nearest_goal<F>(map: &Map, box_pos: Pos, dist: F) -> f64
where
    F: Fn(Pos, Pos) -> f64,
{
    map.goals()
        .iter()
        .map(|&goal| dist(box_pos, goal))
        .fold(f64::INFINITY, f64::min)
}

/// Sum of distances from each box to its nearest goal.
#[derive(Debug, Clone, Copy)]
pub struct Manhattan;

impl Heuristic for Manhattan {
    fn name(&self) -> &'static str {
        "manhattan"
    }

    fn estimate(&self, map: &Map, state: &State) -> f64 {
        state
            .boxes
            .iter()
            .map(|&b| nearest_goal(map, b, |from, to| f64::from(from.dist(to))))
            .sum()
    }
}

/// Like `Manhattan` but with straight-line distances, each rounded up.
#[derive(Debug, Clone, Copy)]
pub struct Euclidean;

impl Heuristic for Euclidean {
    fn name(&self) -> &'static str {
        "euclidean"
    }

    fn estimate(&self, map: &Map, state: &State) -> f64 {
        state
            .boxes
            .iter()
            .map(|&b| nearest_goal(map, b, Pos::euclidean_dist).ceil())
            .sum()
    }
}

/// Optimal matching of boxes to goals, each goal used once.
#[derive(Debug, Clone, Copy)]
pub struct Hungarian;

impl Heuristic for Hungarian {
    fn name(&self) -> &'static str {
        "hungarian"
    }

    fn estimate(&self, map: &Map, state: &State) -> f64 {
        let costs: Vec<Vec<i64>> = state
            .boxes
            .iter()
            .map(|&b| {
                map.goals()
                    .iter()
                    .map(|&goal| i64::from(b.dist(goal)))
                    .collect()
            })
            .collect();
        match min_cost_assignment(&costs) {
            Some((total, _)) => total as f64,
            None => f64::INFINITY,
        }
    }
}

/// Twice the matching cost plus a penalty for boxes with blocked sides.
///
/// Can overestimate, it only steers the search.
#[derive(Debug, Clone, Copy)]
pub struct Efficient;

impl Heuristic for Efficient {
    fn name(&self) -> &'static str {
        "efficient"
    }

    fn estimate(&self, map: &Map, state: &State) -> f64 {
        2.0 * Hungarian.estimate(map, state) + mobility_penalty(map, state)
    }
}

const BLOCKED_SIDE_PENALTY: f64 = 0.6;

/// Penalty for every side of a box (not on a goal) that is a wall, the map edge or another box.
pub fn mobility_penalty(map: &Map, state: &State) -> f64 {
    let blocked_sides: usize = state
        .boxes
        .iter()
        .filter(|&&b| !map.is_goal(b))
        .map(|&b| {
            b.neighbors()
                .iter()
                .filter(|&&n| map.is_wall(n) || state.has_box(n))
                .count()
        })
        .sum();
    blocked_sides as f64 * BLOCKED_SIDE_PENALTY
}

/// Pairs each box with a free goal it could be pushed to in a straight line.
///
/// Boxes go in order, each takes the first goal (in map order) with a clear line to it.
/// Infinite if some box gets no goal, so it also prunes solvable states.
#[derive(Debug, Clone, Copy)]
pub struct DirectPath;

impl Heuristic for DirectPath {
    fn name(&self) -> &'static str {
        "direct-path"
    }

    fn estimate(&self, map: &Map, state: &State) -> f64 {
        let mut available: Vec<bool> = map.goals().iter().map(|&g| !state.has_box(g)).collect();

        let mut total = 0;
        for &b in state.boxes.iter().filter(|&&b| !map.is_goal(b)) {
            let found = map
                .goals()
                .iter()
                .enumerate()
                .find(|&(i, &goal)| available[i] && clear_line(map, state, b, goal));
            match found {
                Some((i, &goal)) => {
                    available[i] = false;
                    total += b.dist(goal);
                }
                None => return f64::INFINITY,
            }
        }
        f64::from(total)
    }
}

/// Same row or column with no wall or box (not on a goal) between `from` and `to`, `to` included.
fn clear_line(map: &Map, state: &State, from: Pos, to: Pos) -> bool {
    if from.r != to.r && from.c != to.c {
        return false;
    }
    let step = Pos::new((to.r - from.r).signum(), (to.c - from.c).signum());
    let mut cur = from;
    while cur != to {
        cur = Pos::new(cur.r + step.r, cur.c + step.c);
        if map.is_wall(cur) || (state.has_box(cur) && !map.is_goal(cur)) {
            return false;
        }
    }
    true
}

/// Infinite for deadlocked states, otherwise the wrapped heuristic.
#[derive(Debug, Clone, Copy)]
pub struct DeadlockAware<H>(pub H);

impl<H: Heuristic> Heuristic for DeadlockAware<H> {
    fn name(&self) -> &'static str {
        self.0.name()
    }

    fn estimate(&self, map: &Map, state: &State) -> f64 {
        if is_deadlocked(map, state) {
            f64::INFINITY
        } else {
            self.0.estimate(map, state)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::level::Level;

    fn parse(xsb: &str) -> Level {
        xsb.parse().unwrap()
    }

    fn open_4x4() -> Level {
        parse(
            r"
----
-+--
-$--
----
",
        )
    }

    #[test]
    fn one_box_next_to_goal() {
        let level = open_4x4();
        for kind in HeuristicKind::all() {
            let h = build(kind, true);
            let expected = match kind {
                HeuristicKind::Efficient => 2.0,
                _ => 1.0,
            };
            assert_eq!(h.estimate(&level.map, &level.state), expected, "{}", kind);
        }
        assert_eq!(Manhattan.estimate(&level.map, &level.state), 1.0);
        assert_eq!(Euclidean.estimate(&level.map, &level.state), 1.0);
    }

    #[test]
    fn solved_is_zero() {
        let level = parse(
            r"
#####
#@* #
#####
",
        );
        for kind in HeuristicKind::all() {
            for &deadlocks in &[false, true] {
                let h = build(kind, deadlocks);
                assert_eq!(h.estimate(&level.map, &level.state), 0.0, "{}", kind);
            }
        }
    }

    #[test]
    fn matching_beats_nearest() {
        // both boxes are nearest to the left goal
        let level = parse(
            r"
#########
#.$$   .#
#   @   #
#########
",
        );
        assert_eq!(Manhattan.estimate(&level.map, &level.state), 3.0);
        assert_eq!(Hungarian.estimate(&level.map, &level.state), 5.0);
        assert_eq!(Euclidean.estimate(&level.map, &level.state), 3.0);
    }

    #[test]
    fn euclidean_rounds_up_per_box() {
        let level = parse(
            r"
#######
#.    #
#  $  #
#  @  #
#######
",
        );
        // sqrt(1 + 4) rounded up
        assert_eq!(Euclidean.estimate(&level.map, &level.state), 3.0);
        assert_eq!(Manhattan.estimate(&level.map, &level.state), 3.0);
    }

    #[test]
    fn mobility() {
        let level = parse(
            r"
#######
#$$   #
#  @ .#
#    .#
#######
",
        );
        // (1,1): up, left, right box = 3; (1,2): up, left box = 2
        let penalty = mobility_penalty(&level.map, &level.state);
        assert!((penalty - 3.0).abs() < 1e-9);
        let hungarian = Hungarian.estimate(&level.map, &level.state);
        let efficient = Efficient.estimate(&level.map, &level.state);
        assert!((efficient - (2.0 * hungarian + penalty)).abs() < 1e-9);
    }

    #[test]
    fn mobility_ignores_boxes_on_goals() {
        let level = parse(
            r"
####
#*@#
####
",
        );
        assert_eq!(mobility_penalty(&level.map, &level.state), 0.0);
    }

    #[test]
    fn direct_path() {
        let level = parse(
            r"
#######
#.  $ #
#     #
#  @$.#
#######
",
        );
        // (1,4) -> (1,1) is 3, (3,4) -> (3,5) is 1
        assert_eq!(DirectPath.estimate(&level.map, &level.state), 4.0);
    }

    #[test]
    fn direct_path_blocked() {
        let level = parse(
            r"
#######
#.#$  #
#     #
# @ $.#
#######
",
        );
        // wall between (1,3) and the first goal, the second one is in another row and column
        assert_eq!(DirectPath.estimate(&level.map, &level.state), f64::INFINITY);
    }

    #[test]
    fn direct_path_blocked_by_box() {
        let level = parse(
            r"
######
#$   #
#$ @.#
#    #
#.   #
######
",
        );
        // (2,1) is in the way of (1,1) -> (4,1)
        assert_eq!(DirectPath.estimate(&level.map, &level.state), f64::INFINITY);
    }

    #[test]
    fn deadlock_aware() {
        let level = parse(
            r"
#####
#$  #
#  @#
#  .#
#####
",
        );
        assert_eq!(Manhattan.estimate(&level.map, &level.state), 4.0);
        assert_eq!(
            DeadlockAware(Manhattan).estimate(&level.map, &level.state),
            f64::INFINITY
        );
        for kind in HeuristicKind::all() {
            let h = build(kind, true);
            assert_eq!(h.estimate(&level.map, &level.state), f64::INFINITY);
        }
    }

    #[test]
    fn more_boxes_than_goals() {
        let map = open_4x4().map;
        let state = State::new(Pos::new(0, 0), vec![Pos::new(2, 1), Pos::new(2, 2)]);
        assert_eq!(Hungarian.estimate(&map, &state), f64::INFINITY);
        assert_eq!(Efficient.estimate(&map, &state), f64::INFINITY);
    }

    #[test]
    fn names() {
        for kind in HeuristicKind::all() {
            assert_eq!(build(kind, false).name(), kind.to_string());
            assert_eq!(build(kind, true).name(), kind.to_string());
        }
    }
}
