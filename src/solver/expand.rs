use crate::data::DIRECTIONS;
use crate::map::Map;
use crate::moves::{Move, MoveKind};
use crate::state::State;

/// All legal moves from `state` together with the states they lead to.
///
/// Directions come in `DIRECTIONS` order, within one direction the step or push
/// comes before the pull. Searches rely on this order being stable.
pub fn expand(map: &Map, state: &State) -> Vec<(Move, State)> {
    let mut new_states = Vec::new();

    for &dir in &DIRECTIONS {
        let new_player_pos = state.player_pos + dir;
        if map.is_wall(new_player_pos) {
            continue;
        }

        if state.has_box(new_player_pos) {
            let push_dest = new_player_pos + dir;
            if !map.is_wall(push_dest) && !state.has_box(push_dest) {
                let new_boxes = state
                    .boxes
                    .iter()
                    .map(|&b| if b == new_player_pos { push_dest } else { b })
                    .collect();
                new_states.push((
                    Move::new(dir, MoveKind::Push),
                    State::with_counts(new_player_pos, new_boxes, state.moves + 1, state.pulls),
                ));
            }
            continue;
        }

        new_states.push((
            Move::new(dir, MoveKind::Step),
            State::with_counts(
                new_player_pos,
                state.boxes.clone(),
                state.moves + 1,
                state.pulls,
            ),
        ));

        // the box behind the player follows into the cell the player just left
        let pulled = state.player_pos - dir;
        if state.has_box(pulled) {
            let new_boxes = state
                .boxes
                .iter()
                .map(|&b| if b == pulled { state.player_pos } else { b })
                .collect();
            new_states.push((
                Move::new(dir, MoveKind::Pull),
                State::with_counts(new_player_pos, new_boxes, state.moves + 1, state.pulls + 1),
            ));
        }
    }

    new_states
}

pub fn legal_moves(map: &Map, state: &State) -> Vec<Move> {
    expand(map, state).into_iter().map(|(mov, _)| mov).collect()
}

/// Returns `None` if the move is not legal in `state`.
pub fn apply_move(map: &Map, state: &State, mov: Move) -> Option<State> {
    expand(map, state)
        .into_iter()
        .find(|&(m, _)| m == mov)
        .map(|(_, new_state)| new_state)
}
