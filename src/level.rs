use std::fmt::{self, Debug, Display, Formatter};

use thiserror::Error;

use crate::data::Pos;
use crate::map::Map;
use crate::map_formatter::MapFormatter;
use crate::state::State;

/// Level rejected because it breaks the rules every state must obey.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LevelErr {
    #[error("Different number of boxes ({boxes}) and goals ({goals})")]
    BoxesGoals { boxes: usize, goals: usize },
    #[error("No goals")]
    NoGoals,
    #[error("Box on wall at {0}")]
    BoxOnWall(Pos),
    #[error("Boxes not sorted at {0}")]
    UnsortedBoxes(Pos),
    #[error("Multiple boxes at {0}")]
    OverlappingBoxes(Pos),
    #[error("Player on wall at {0}")]
    PlayerOnWall(Pos),
    #[error("Player on box at {0}")]
    PlayerOnBox(Pos),
}

#[derive(Clone, PartialEq, Eq)]
pub struct Level {
    pub map: Map,
    pub state: State,
}

impl Level {
    pub fn new(map: Map, state: State) -> Result<Self, LevelErr> {
        validate(&map, &state)?;
        Ok(Level { map, state })
    }

    pub fn xsb(&self) -> MapFormatter<'_> {
        self.map.format_with_state(&self.state)
    }
}

pub(crate) fn validate(map: &Map, state: &State) -> Result<(), LevelErr> {
    if map.goals().is_empty() {
        return Err(LevelErr::NoGoals);
    }
    if state.boxes.len() != map.goals().len() {
        return Err(LevelErr::BoxesGoals {
            boxes: state.boxes.len(),
            goals: map.goals().len(),
        });
    }
    // sorted so duplicates are neighbors
    for pair in state.boxes.windows(2) {
        if pair[0] > pair[1] {
            return Err(LevelErr::UnsortedBoxes(pair[1]));
        }
        if pair[0] == pair[1] {
            return Err(LevelErr::OverlappingBoxes(pair[0]));
        }
    }
    if let Some(&b) = state.boxes.iter().find(|&&b| map.is_wall(b)) {
        return Err(LevelErr::BoxOnWall(b));
    }
    if map.is_wall(state.player_pos) {
        return Err(LevelErr::PlayerOnWall(state.player_pos));
    }
    if state.has_box(state.player_pos) {
        return Err(LevelErr::PlayerOnBox(state.player_pos));
    }
    Ok(())
}

impl Display for Level {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.xsb())
    }
}

impl Debug for Level {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.xsb())
    }
}
