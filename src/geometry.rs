use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Index, IndexMut};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const fn new(x: i32, y: i32) -> Position {
        Position { x, y }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Direction {
    Still,
    North,
    South,
    East,
    West,
}

impl Direction {
    /// Every choice a ship has in one turn, staying first.
    pub const ALL: [Direction; 5] = [Direction::Still, Direction::North, Direction::South, Direction::East, Direction::West];

    pub const CARDINALS: [Direction; 4] = [Direction::North, Direction::South, Direction::East, Direction::West];

    pub fn invert(self) -> Direction {
        match self {
            Direction::Still => Direction::Still,
            Direction::North => Direction::South,
            Direction::South => Direction::North,
            Direction::East => Direction::West,
            Direction::West => Direction::East,
        }
    }

    pub fn offset(self) -> (i32, i32) {
        match self {
            Direction::Still => (0, 0),
            Direction::North => (0, -1),
            Direction::South => (0, 1),
            Direction::East => (1, 0),
            Direction::West => (-1, 0),
        }
    }

    pub fn as_char(self) -> char {
        match self {
            Direction::Still => 'o',
            Direction::North => 'n',
            Direction::South => 's',
            Direction::East => 'e',
            Direction::West => 'w',
        }
    }
}

/// Wrap-around geometry for a map of fixed size.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Torus {
    pub width: i32,
    pub height: i32,
}

impl Torus {
    pub fn new(width: i32, height: i32) -> Torus {
        Torus { width, height }
    }

    pub fn area(&self) -> usize {
        (self.width * self.height) as usize
    }

    pub fn normalize(&self, pos: Position) -> Position {
        Position::new(pos.x.rem_euclid(self.width), pos.y.rem_euclid(self.height))
    }

    fn axis_delta(a: i32, b: i32, size: i32) -> i32 {
        let delta = (a - b).rem_euclid(size);

        delta.min(size - delta)
    }

    pub fn distance(&self, a: Position, b: Position) -> i32 {
        Self::axis_delta(a.x, b.x, self.width) + Self::axis_delta(a.y, b.y, self.height)
    }

    pub fn offset(&self, pos: Position, direction: Direction) -> Position {
        let (dx, dy) = direction.offset();

        self.normalize(Position::new(pos.x + dx, pos.y + dy))
    }

    pub fn neighbors(&self, pos: Position) -> [Position; 4] {
        Direction::CARDINALS.map(|direction| self.offset(pos, direction))
    }

    /// Direction of a single step from `from` to `to`. Returns `None` when the cells are not within one step.
    pub fn direction_to(&self, from: Position, to: Position) -> Option<Direction> {
        let to = self.normalize(to);

        Direction::ALL.into_iter().find(|direction| self.offset(from, *direction) == to)
    }

    /// The directions that each reduce the distance from `from` to `to`. Empty when the cells are equal.
    pub fn unsafe_directions(&self, from: Position, to: Position) -> Vec<Direction> {
        let current = self.distance(from, to);

        Direction::CARDINALS
            .into_iter()
            .filter(|direction| self.distance(self.offset(from, *direction), to) < current)
            .collect()
    }

    /// Every cell within `radius` of `center`, each exactly once.
    pub fn within_radius(&self, center: Position, radius: i32) -> Vec<Position> {
        let radius = radius.max(0);

        //
        // NOTE: Once the diamond is wider than the map the offsets alias, so fall back to a full scan.
        //
        if 2 * radius + 1 > self.width.min(self.height) {
            return self.positions().filter(|pos| self.distance(center, *pos) <= radius).collect();
        }

        (-radius..=radius)
            .flat_map(|dy| {
                let span = radius - dy.abs();

                (-span..=span).map(move |dx| (dx, dy))
            })
            .map(|(dx, dy)| self.normalize(Position::new(center.x + dx, center.y + dy)))
            .collect()
    }

    pub fn positions(&self) -> impl Iterator<Item = Position> {
        let width = self.width;

        (0..self.height).flat_map(move |y| (0..width).map(move |x| Position::new(x, y)))
    }
}

/// Dense per-cell storage in row-major order.
#[derive(Clone, Debug, PartialEq)]
pub struct Grid<T> {
    torus: Torus,
    cells: Vec<T>,
}

impl<T: Clone> Grid<T> {
    pub fn new(torus: Torus, value: T) -> Grid<T> {
        Grid {
            torus,
            cells: vec![value; torus.area()],
        }
    }
}

impl<T> Grid<T> {
    pub fn from_fn<F: FnMut(Position) -> T>(torus: Torus, mut generator: F) -> Grid<T> {
        Grid {
            torus,
            cells: torus.positions().map(&mut generator).collect(),
        }
    }

    pub fn torus(&self) -> Torus {
        self.torus
    }

    fn index_of(&self, pos: Position) -> usize {
        let pos = self.torus.normalize(pos);

        (pos.y * self.torus.width + pos.x) as usize
    }

    /// Cells with their positions in row-major scan order.
    pub fn iter(&self) -> impl Iterator<Item = (Position, &T)> + '_ {
        self.torus.positions().zip(self.cells.iter())
    }

    pub fn values(&self) -> impl Iterator<Item = &T> + '_ {
        self.cells.iter()
    }

    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut T> + '_ {
        self.cells.iter_mut()
    }
}

impl<T> Index<Position> for Grid<T> {
    type Output = T;

    fn index(&self, pos: Position) -> &T {
        &self.cells[self.index_of(pos)]
    }
}

impl<T> IndexMut<Position> for Grid<T> {
    fn index_mut(&mut self, pos: Position) -> &mut T {
        let index = self.index_of(pos);

        &mut self.cells[index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_wraps() {
        let torus = Torus::new(32, 32);

        assert_eq!(torus.distance(Position::new(0, 0), Position::new(31, 31)), 2);
        assert_eq!(torus.distance(Position::new(3, 4), Position::new(3, 4)), 0);
        assert_eq!(torus.distance(Position::new(0, 0), Position::new(16, 16)), 32);
    }

    #[test]
    fn offset_normalizes() {
        let torus = Torus::new(8, 8);

        assert_eq!(torus.offset(Position::new(0, 0), Direction::North), Position::new(0, 7));
        assert_eq!(torus.offset(Position::new(7, 3), Direction::East), Position::new(0, 3));

        for direction in Direction::ALL.iter() {
            let there = torus.offset(Position::new(2, 2), *direction);

            assert_eq!(torus.offset(there, direction.invert()), Position::new(2, 2));
        }
    }

    #[test]
    fn direction_to_adjacent_and_self() {
        let torus = Torus::new(8, 8);
        let origin = Position::new(0, 0);

        assert_eq!(torus.direction_to(origin, origin), Some(Direction::Still));
        assert_eq!(torus.direction_to(origin, Position::new(0, 7)), Some(Direction::North));
        assert_eq!(torus.direction_to(origin, Position::new(2, 0)), None);
    }

    #[test]
    fn within_radius_counts_each_cell_once() {
        let torus = Torus::new(32, 32);

        assert_eq!(torus.within_radius(Position::new(5, 5), 2).len(), 13);

        let small = Torus::new(3, 3);

        assert_eq!(small.within_radius(Position::new(1, 1), 5).len(), 9);
    }

    #[test]
    fn unsafe_directions_reduce_distance() {
        let torus = Torus::new(16, 16);
        let directions = torus.unsafe_directions(Position::new(0, 0), Position::new(15, 2));

        assert_eq!(directions, vec![Direction::South, Direction::West]);
    }

    #[test]
    fn grid_iterates_row_major() {
        let torus = Torus::new(3, 2);
        let grid = Grid::from_fn(torus, |pos| pos.y * 10 + pos.x);
        let order: Vec<i32> = grid.values().copied().collect();

        assert_eq!(order, vec![0, 1, 2, 10, 11, 12]);
        assert_eq!(grid[Position::new(-1, 0)], 2);
    }
}
