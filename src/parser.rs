use std::str::FromStr;

use thiserror::Error;

use crate::data::{MapCell, Pos, MAX_SIZE};
use crate::level::{Level, LevelErr};
use crate::map::Map;
use crate::state::State;
use crate::vec2d::Vec2d;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParserErr {
    #[error("Invalid cell at pos: [{0}, {1}]")]
    Pos(usize, usize),
    #[error("Map larger than {} rows/columns", MAX_SIZE)]
    TooLarge,
    #[error("More than one player")]
    MultiplePlayers,
    #[error("No player")]
    NoPlayer,
    #[error(transparent)]
    Level(#[from] LevelErr),
}

impl FromStr for Level {
    type Err = ParserErr;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse(s)
    }
}

/// Parses (a subset of) the format described [here](http://www.sokobano.de/wiki/index.php?title=Level_format)
pub(crate) fn parse(level: &str) -> Result<Level, ParserErr> {
    // trim so we can specify levels using raw strings more easily
    let level = level.trim_matches('\n').trim_end();

    let mut grid = Vec::new();
    let mut boxes = Vec::new();
    let mut player_pos = None;

    for (r, line) in level.lines().enumerate() {
        if r >= MAX_SIZE {
            return Err(ParserErr::TooLarge);
        }
        let mut line_tiles = Vec::new();
        for (c, cur_char) in line.chars().enumerate() {
            if c >= MAX_SIZE {
                return Err(ParserErr::TooLarge);
            }
            let pos = Pos::new(r as i32, c as i32);

            let tile = match cur_char {
                '#' => MapCell::Wall,
                'p' | '@' => {
                    if player_pos.is_some() {
                        return Err(ParserErr::MultiplePlayers);
                    }
                    player_pos = Some(pos);
                    MapCell::Empty
                }
                'P' | '+' => {
                    if player_pos.is_some() {
                        return Err(ParserErr::MultiplePlayers);
                    }
                    player_pos = Some(pos);
                    MapCell::Goal
                }
                'b' | '$' => {
                    boxes.push(pos);
                    MapCell::Empty
                }
                'B' | '*' => {
                    boxes.push(pos);
                    MapCell::Goal
                }
                '.' => MapCell::Goal,
                ' ' | '-' | '_' => MapCell::Empty,
                _ => return Err(ParserErr::Pos(r, c)),
            };
            line_tiles.push(tile);
        }
        grid.push(line_tiles);
    }

    let player_pos = player_pos.ok_or(ParserErr::NoPlayer)?;
    let grid = Vec2d::new(&grid);
    let goals = grid
        .positions()
        .filter(|&pos| grid[pos] == MapCell::Goal)
        .collect();

    Ok(Level::new(
        Map::new(grid, goals),
        State::new(player_pos, boxes),
    )?)
}
