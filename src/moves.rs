use std::fmt::{self, Debug, Display, Formatter};

use crate::data::Dir;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MoveKind {
    Step,
    Push,
    /// The player walks away from an adjacent box and drags it along.
    Pull,
}

#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Move {
    pub dir: Dir,
    pub kind: MoveKind,
}

impl Move {
    pub fn new(dir: Dir, kind: MoveKind) -> Self {
        Move { dir, kind }
    }

    pub fn is_pull(self) -> bool {
        self.kind == MoveKind::Pull
    }

    pub fn is_push(self) -> bool {
        self.kind == MoveKind::Push
    }
}

/// Steps are lowercase (`u`), pushes uppercase (`U`) and pulls uppercase with a mark (`U'`).
impl Display for Move {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self.kind {
            MoveKind::Step => write!(f, "{}", self.dir),
            MoveKind::Push => write!(f, "{}", self.dir.to_string().to_uppercase()),
            MoveKind::Pull => write!(f, "{}'", self.dir.to_string().to_uppercase()),
        }
    }
}

impl Debug for Move {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self)
    }
}

#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct Moves(Vec<Move>);

impl Moves {
    pub fn new(moves: Vec<Move>) -> Self {
        Moves(moves)
    }

    pub fn move_cnt(&self) -> usize {
        self.0.len()
    }

    pub fn push_cnt(&self) -> usize {
        self.0.iter().filter(|m| m.is_push()).count()
    }

    pub fn pull_cnt(&self) -> usize {
        self.0.iter().filter(|m| m.is_pull()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub(crate) fn add(&mut self, mov: Move) {
        self.0.push(mov);
    }

    pub(crate) fn pop(&mut self) -> Option<Move> {
        self.0.pop()
    }

    pub fn iter(&self) -> ::std::slice::Iter<'_, Move> {
        self.0.iter()
    }
}

impl IntoIterator for Moves {
    type Item = Move;
    type IntoIter = ::std::vec::IntoIter<Move>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Moves {
    type Item = &'a Move;
    type IntoIter = ::std::slice::Iter<'a, Move>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl Display for Moves {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for mov in self {
            write!(f, "{}", mov)?;
        }
        Ok(())
    }
}

impl Debug for Moves {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self)
    }
}
