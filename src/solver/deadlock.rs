//! Static checks for boxes that can never reach a goal.
//!
//! Only boxes not on a goal are considered.

use crate::data::{Dir, Pos};
use crate::map::Map;
use crate::state::State;

pub fn is_deadlocked(map: &Map, state: &State) -> bool {
    let frozen = frozen_boxes(map, state);
    state
        .boxes
        .iter()
        .zip(frozen)
        .any(|(&b, frozen)| {
            !map.is_goal(b) && (frozen || is_corner_deadlock(map, state, b))
        })
}

/// Wall on at least one vertical side and one horizontal side.
pub fn is_corner_deadlock(map: &Map, _state: &State, box_pos: Pos) -> bool {
    if map.is_goal(box_pos) {
        return false;
    }
    let vertical = map.is_wall(box_pos + Dir::Up) || map.is_wall(box_pos + Dir::Down);
    let horizontal = map.is_wall(box_pos + Dir::Left) || map.is_wall(box_pos + Dir::Right);
    vertical && horizontal
}

/// Box blocked in both its row and its column by walls and other boxes which are stuck the same way.
pub fn is_line_deadlock(map: &Map, state: &State, box_pos: Pos) -> bool {
    if map.is_goal(box_pos) {
        return false;
    }
    match state.boxes.binary_search(&box_pos) {
        Ok(idx) => frozen_boxes(map, state)[idx],
        Err(_) => false,
    }
}

/// Marks boxes whose four neighbors are all walls or other marked boxes.
///
/// Pushing and pulling both need a free cell next to the box, so marked boxes never move.
/// Starts with every box marked and unmarks until nothing changes.
fn frozen_boxes(map: &Map, state: &State) -> Vec<bool> {
    let mut frozen = vec![true; state.boxes.len()];
    let mut changed = true;
    while changed {
        changed = false;
        for (i, &b) in state.boxes.iter().enumerate() {
            if !frozen[i] {
                continue;
            }
            let blocked = b.neighbors().iter().all(|&n| {
                map.is_wall(n)
                    || state
                        .boxes
                        .binary_search(&n)
                        .map_or(false, |other| frozen[other])
            });
            if !blocked {
                frozen[i] = false;
                changed = true;
            }
        }
    }
    frozen
}
