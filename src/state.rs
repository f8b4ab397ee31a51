use crate::data::Pos;
use crate::map::Map;

/// Identity of a state for search purposes - two states with equal keys are interchangeable
/// no matter how many moves it took to reach them.
///
/// Compared structurally, the hash is only used for bucketing.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CanonicalKey {
    player_pos: Pos,
    boxes: Vec<Pos>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct State {
    pub player_pos: Pos,
    /// Always sorted so equal box sets compare equal.
    pub boxes: Vec<Pos>,
    pub moves: u32,
    pub pulls: u32,
}

impl State {
    pub fn new(player_pos: Pos, mut boxes: Vec<Pos>) -> State {
        boxes.sort();
        State {
            player_pos,
            boxes,
            moves: 0,
            pulls: 0,
        }
    }

    pub(crate) fn with_counts(
        player_pos: Pos,
        mut boxes: Vec<Pos>,
        moves: u32,
        pulls: u32,
    ) -> State {
        boxes.sort();
        State {
            player_pos,
            boxes,
            moves,
            pulls,
        }
    }

    pub fn key(&self) -> CanonicalKey {
        CanonicalKey {
            player_pos: self.player_pos,
            boxes: self.boxes.clone(),
        }
    }

    pub fn has_box(&self, pos: Pos) -> bool {
        self.boxes.binary_search(&pos).is_ok()
    }

    pub fn is_solved(&self, map: &Map) -> bool {
        // all boxes on a goal, not all goals with a box
        self.boxes.iter().all(|&b| map.is_goal(b))
    }

    /// Checks the invariants every state reachable by legal moves keeps.
    pub fn is_consistent(&self, map: &Map) -> bool {
        let sorted_unique = self.boxes.windows(2).all(|w| w[0] < w[1]);
        sorted_unique
            && self.boxes.iter().all(|&b| !map.is_wall(b))
            && !map.is_wall(self.player_pos)
            && !self.has_box(self.player_pos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::data::MapCell::{Empty, Goal, Wall};

    #[test]
    fn key_ignores_box_order_and_counts() {
        let a = State::new(Pos::new(1, 1), vec![Pos::new(2, 2), Pos::new(1, 2)]);
        let b = State::with_counts(Pos::new(1, 1), vec![Pos::new(1, 2), Pos::new(2, 2)], 7, 3);
        assert_ne!(a, b);
        assert_eq!(a.key(), b.key());

        let c = State::new(Pos::new(1, 0), vec![Pos::new(1, 2), Pos::new(2, 2)]);
        assert_ne!(a.key(), c.key());
    }

    #[test]
    fn solved_and_consistent() {
        let map = Map::from_cells(&[vec![Wall, Empty, Goal, Goal]]);
        let solved = State::new(Pos::new(0, 1), vec![Pos::new(0, 3), Pos::new(0, 2)]);
        assert!(solved.is_solved(&map));
        assert!(solved.is_consistent(&map));
        assert!(solved.has_box(Pos::new(0, 2)));

        let unsolved = State::new(Pos::new(0, 3), vec![Pos::new(0, 1), Pos::new(0, 2)]);
        assert!(!unsolved.is_solved(&map));
        assert!(unsolved.is_consistent(&map));

        let on_wall = State::new(Pos::new(0, 1), vec![Pos::new(0, 0)]);
        assert!(!on_wall.is_consistent(&map));
        let overlapping = State::new(Pos::new(0, 1), vec![Pos::new(0, 2), Pos::new(0, 2)]);
        assert!(!overlapping.is_consistent(&map));
        let player_on_box = State::new(Pos::new(0, 2), vec![Pos::new(0, 2)]);
        assert!(!player_on_box.is_consistent(&map));
    }
}
