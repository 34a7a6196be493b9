//! Path representations driven by the search kernel

use crate::maze::{Direction, Point};

/// A deferred alternative: `point` is an unclaimed passable neighbor of the
/// cell reached by stepping `back` from it (the branch origin).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BranchPoint {
    pub point: Point,
    pub back: Direction,
}

impl BranchPoint {
    pub fn new(point: Point, back: Direction) -> Self {
        Self { point, back }
    }

    /// The cell on the path this branch leaves from.
    pub fn origin(&self) -> Point {
        self.point.neighbor(self.back)
    }
}

/// Operations the kernel needs from a "path so far".
pub trait PathTrace {
    /// Append a freshly claimed cell.
    fn extend(&mut self, point: Point);

    /// Drop everything after `origin`, which must still be on the path.
    fn rewind_to(&mut self, origin: Point);

    /// Most recently appended cell
    fn head(&self) -> Option<Point>;

    /// Points from the start to the head, inclusive.
    fn to_points(&self) -> Vec<Point>;
}

/// Ordered sequence of points; cheap to extend, forked by cloning.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinearPath {
    points: Vec<Point>,
}

impl LinearPath {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn into_points(self) -> Vec<Point> {
        self.points
    }
}

impl PathTrace for LinearPath {
    fn extend(&mut self, point: Point) {
        self.points.push(point);
    }

    fn rewind_to(&mut self, origin: Point) {
        while let Some(&last) = self.points.last() {
            if last == origin {
                break;
            }
            self.points.pop();
        }
    }

    fn head(&self) -> Option<Point> {
        self.points.last().copied()
    }

    fn to_points(&self) -> Vec<Point> {
        self.points.clone()
    }
}
