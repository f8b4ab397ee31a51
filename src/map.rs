use std::fmt::{self, Debug, Display, Formatter};

use crate::data::{MapCell, Pos};
use crate::map_formatter::MapFormatter;
use crate::state::State;
use crate::vec2d::Vec2d;

/// The static part of a level - walls and goals.
///
/// Everything outside the grid counts as a wall so levels don't need a closed border.
#[derive(Clone, PartialEq, Eq)]
pub struct Map {
    grid: Vec2d<MapCell>,
    goals: Vec<Pos>,
}

impl Map {
    pub(crate) fn new(grid: Vec2d<MapCell>, goals: Vec<Pos>) -> Self {
        Map { grid, goals }
    }

    /// Builds a map from rows of cells. Goals are collected in row-major order.
    pub fn from_cells(cells: &[Vec<MapCell>]) -> Self {
        let grid = Vec2d::new(cells);
        let goals = grid
            .positions()
            .filter(|&pos| grid[pos] == MapCell::Goal)
            .collect();
        Map { grid, goals }
    }

    pub fn rows(&self) -> usize {
        self.grid.rows()
    }

    pub fn cols(&self) -> usize {
        self.grid.cols()
    }

    pub fn goals(&self) -> &[Pos] {
        &self.goals
    }

    pub fn cell(&self, pos: Pos) -> MapCell {
        self.grid.get(pos).cloned().unwrap_or(MapCell::Wall)
    }

    pub fn is_wall(&self, pos: Pos) -> bool {
        self.cell(pos) == MapCell::Wall
    }

    pub fn is_goal(&self, pos: Pos) -> bool {
        self.cell(pos) == MapCell::Goal
    }

    pub fn positions(&self) -> impl Iterator<Item = Pos> {
        self.grid.positions()
    }

    pub fn format_with_state<'a>(&'a self, state: &'a State) -> MapFormatter<'a> {
        MapFormatter::new(&self.grid, Some(state))
    }
}

impl Display for Map {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", MapFormatter::new(&self.grid, None))
    }
}

impl Debug for Map {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self)
    }
}
