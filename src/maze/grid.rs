//! Immutable maze topology

use crate::maze::error::GridError;
use crate::maze::types::{Direction, Point};
use std::fmt;

/// Mask of all four passage flags.
pub const ALL_PASSAGES: u8 = 0b1111;

/// Maze topology: dimensions, endpoints and one passage bitmask per cell.
///
/// A bit set in a cell's mask means the cell can be left in that direction.
/// Two-way passages set opposite bits in both cells, so one-way passages are
/// representable by setting a bit in the source cell only. Solvers share the
/// grid read-only; mutation is reserved for whoever builds it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    width: usize,
    height: usize,
    start: Point,
    end: Point,
    passages: Vec<u8>,
}

impl Grid {
    /// Create a grid with every cell walled in.
    pub fn new(width: usize, height: usize, start: Point, end: Point) -> Result<Self, GridError> {
        if width == 0 || height == 0 {
            return Err(GridError::EmptyGrid { width, height });
        }
        if i32::try_from(width).is_err() || i32::try_from(height).is_err() {
            return Err(GridError::TooLarge { width, height });
        }
        let grid = Grid {
            width,
            height,
            start,
            end,
            passages: vec![0; width * height],
        };
        grid.check_endpoints()?;
        Ok(grid)
    }

    /// Rebuild a grid from raw parts, validating everything a stored grid could get wrong.
    pub fn from_parts(
        width: usize,
        height: usize,
        start: Point,
        end: Point,
        passages: Vec<u8>,
    ) -> Result<Self, GridError> {
        let mut grid = Grid::new(width, height, start, end)?;
        if passages.len() != grid.passages.len() {
            return Err(GridError::PassageCount {
                expected: grid.passages.len(),
                found: passages.len(),
            });
        }
        for (index, &mask) in passages.iter().enumerate() {
            if mask & !ALL_PASSAGES != 0 {
                return Err(GridError::InvalidMask {
                    point: grid.point_at(index),
                    mask,
                });
            }
        }
        grid.passages = passages;
        Ok(grid)
    }

    fn check_endpoints(&self) -> Result<(), GridError> {
        if !self.contains(self.start) {
            return Err(GridError::out_of_bounds("start", self.start, self.width, self.height));
        }
        if !self.contains(self.end) {
            return Err(GridError::out_of_bounds("end", self.end, self.width, self.height));
        }
        Ok(())
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn start(&self) -> Point {
        self.start
    }

    pub fn end(&self) -> Point {
        self.end
    }

    pub fn cell_count(&self) -> usize {
        self.passages.len()
    }

    /// Raw passage masks in row-major order
    pub fn passages(&self) -> &[u8] {
        &self.passages
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= 0 && p.y >= 0 && (p.x as usize) < self.width && (p.y as usize) < self.height
    }

    /// Row-major cell index (`y * width + x`), `None` outside the grid.
    pub fn index_of(&self, p: Point) -> Option<usize> {
        if self.contains(p) {
            Some(p.y as usize * self.width + p.x as usize)
        } else {
            None
        }
    }

    fn point_at(&self, index: usize) -> Point {
        Point::new((index % self.width) as i32, (index / self.width) as i32)
    }

    /// Passage mask of a cell; cells outside the grid have none.
    pub fn passages_at(&self, p: Point) -> u8 {
        self.index_of(p).map_or(0, |i| self.passages[i])
    }

    /// Whether the cell can be left in `direction` into another cell of the grid.
    pub fn is_open(&self, from: Point, direction: Direction) -> bool {
        self.passages_at(from) & direction.bit() != 0 && self.contains(from.neighbor(direction))
    }

    /// Whether `to` is adjacent to `from` and reachable through an open passage.
    pub fn has_passage(&self, from: Point, to: Point) -> bool {
        match Direction::between(from, to) {
            Some(direction) => self.is_open(from, direction),
            None => false,
        }
    }

    /// Open a two-way passage between `from` and its neighbor in `direction`.
    pub fn open_passage(&mut self, from: Point, direction: Direction) -> Result<(), GridError> {
        let to = from.neighbor(direction);
        let from_index = self
            .index_of(from)
            .ok_or_else(|| GridError::out_of_bounds("passage source", from, self.width, self.height))?;
        let to_index = self
            .index_of(to)
            .ok_or_else(|| GridError::out_of_bounds("passage target", to, self.width, self.height))?;
        self.passages[from_index] |= direction.bit();
        self.passages[to_index] |= direction.opposite().bit();
        Ok(())
    }

    /// Open a passage that can only be traversed from `from` towards `direction`.
    pub fn open_one_way(&mut self, from: Point, direction: Direction) -> Result<(), GridError> {
        let to = from.neighbor(direction);
        if !self.contains(to) {
            return Err(GridError::out_of_bounds("passage target", to, self.width, self.height));
        }
        let index = self
            .index_of(from)
            .ok_or_else(|| GridError::out_of_bounds("passage source", from, self.width, self.height))?;
        self.passages[index] |= direction.bit();
        Ok(())
    }

    /// Open two-way passages along consecutive cells of `route`.
    pub fn carve_route(&mut self, route: &[Point]) -> Result<(), GridError> {
        for pair in route.windows(2) {
            match Direction::between(pair[0], pair[1]) {
                Some(direction) => self.open_passage(pair[0], direction)?,
                None => {
                    return Err(GridError::out_of_bounds(
                        "non-adjacent route step",
                        pair[1],
                        self.width,
                        self.height,
                    ))
                }
            }
        }
        Ok(())
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        render(self, None, f)
    }
}

/// ASCII view of a grid with path cells marked `*`.
pub struct PathView<'a> {
    grid: &'a Grid,
    on_path: Vec<bool>,
}

/// Render a grid with `path` drawn into it.
pub fn render_path<'a>(grid: &'a Grid, path: &[Point]) -> PathView<'a> {
    let mut on_path = vec![false; grid.cell_count()];
    for p in path {
        if let Some(i) = grid.index_of(*p) {
            on_path[i] = true;
        }
    }
    PathView { grid, on_path }
}

impl fmt::Display for PathView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        render(self.grid, Some(&self.on_path), f)
    }
}

fn render(grid: &Grid, on_path: Option<&[bool]>, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    for y in 0..grid.height {
        // north edges
        for x in 0..grid.width {
            let mask = grid.passages[y * grid.width + x];
            f.write_str(if mask & Direction::North.bit() == 0 { "+---" } else { "+   " })?;
        }
        writeln!(f, "+")?;
        // west edges and cell contents
        for x in 0..grid.width {
            let index = y * grid.width + x;
            let mask = grid.passages[index];
            let here = Point::new(x as i32, y as i32);
            let mark = if here == grid.start {
                'S'
            } else if here == grid.end {
                'E'
            } else if on_path.is_some_and(|cells| cells[index]) {
                '*'
            } else {
                ' '
            };
            let wall = if mask & Direction::West.bit() == 0 { '|' } else { ' ' };
            write!(f, "{wall} {mark} ")?;
        }
        writeln!(f, "|")?;
    }
    for _ in 0..grid.width {
        f.write_str("+---")?;
    }
    writeln!(f, "+")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corridor() -> Grid {
        let mut grid = Grid::new(3, 1, Point::new(0, 0), Point::new(2, 0)).unwrap();
        grid.open_passage(Point::new(0, 0), Direction::East).unwrap();
        grid.open_passage(Point::new(1, 0), Direction::East).unwrap();
        grid
    }

    #[test]
    fn test_rejects_empty_and_outside_endpoints() {
        assert!(matches!(
            Grid::new(0, 3, Point::new(0, 0), Point::new(0, 0)),
            Err(GridError::EmptyGrid { .. })
        ));
        assert!(matches!(
            Grid::new(2, 2, Point::new(0, 0), Point::new(2, 0)),
            Err(GridError::OutOfBounds { what: "end", .. })
        ));
        assert!(matches!(
            Grid::new(2, 2, Point::new(-1, 0), Point::new(1, 1)),
            Err(GridError::OutOfBounds { what: "start", .. })
        ));
    }

    #[test]
    fn test_index_is_row_major() {
        let grid = Grid::new(4, 3, Point::new(0, 0), Point::new(3, 2)).unwrap();
        assert_eq!(grid.index_of(Point::new(0, 0)), Some(0));
        assert_eq!(grid.index_of(Point::new(3, 0)), Some(3));
        assert_eq!(grid.index_of(Point::new(0, 1)), Some(4));
        assert_eq!(grid.index_of(Point::new(3, 2)), Some(11));
        assert_eq!(grid.index_of(Point::new(4, 0)), None);
        assert_eq!(grid.index_of(Point::new(0, -1)), None);
    }

    #[test]
    fn test_two_way_passages() {
        let grid = corridor();
        assert!(grid.has_passage(Point::new(0, 0), Point::new(1, 0)));
        assert!(grid.has_passage(Point::new(1, 0), Point::new(0, 0)));
        assert!(grid.has_passage(Point::new(2, 0), Point::new(1, 0)));
        assert!(!grid.has_passage(Point::new(0, 0), Point::new(2, 0)));
        assert!(!grid.has_passage(Point::new(0, 0), Point::new(0, 1)));
    }

    #[test]
    fn test_one_way_passage() {
        let mut grid = Grid::new(2, 1, Point::new(0, 0), Point::new(1, 0)).unwrap();
        grid.open_one_way(Point::new(0, 0), Direction::East).unwrap();
        assert!(grid.has_passage(Point::new(0, 0), Point::new(1, 0)));
        assert!(!grid.has_passage(Point::new(1, 0), Point::new(0, 0)));
    }

    #[test]
    fn test_passage_leaving_grid_is_rejected() {
        let mut grid = Grid::new(2, 2, Point::new(0, 0), Point::new(1, 1)).unwrap();
        assert!(grid.open_passage(Point::new(0, 0), Direction::North).is_err());
        assert!(grid.open_one_way(Point::new(1, 1), Direction::East).is_err());
        assert_eq!(grid.passages_at(Point::new(0, 0)), 0);
    }

    #[test]
    fn test_from_parts_validation() {
        let grid = corridor();
        let rebuilt = Grid::from_parts(3, 1, grid.start(), grid.end(), grid.passages().to_vec()).unwrap();
        assert_eq!(rebuilt, grid);

        assert!(matches!(
            Grid::from_parts(3, 1, grid.start(), grid.end(), vec![0, 0]),
            Err(GridError::PassageCount { expected: 3, found: 2 })
        ));
        assert!(matches!(
            Grid::from_parts(3, 1, grid.start(), grid.end(), vec![0, 16, 0]),
            Err(GridError::InvalidMask { .. })
        ));
    }

    #[test]
    fn test_carve_route() {
        let mut grid = Grid::new(2, 2, Point::new(0, 0), Point::new(1, 1)).unwrap();
        grid.carve_route(&[Point::new(0, 0), Point::new(0, 1), Point::new(1, 1)])
            .unwrap();
        assert!(grid.has_passage(Point::new(0, 0), Point::new(0, 1)));
        assert!(grid.has_passage(Point::new(0, 1), Point::new(1, 1)));
        assert!(grid
            .carve_route(&[Point::new(0, 0), Point::new(1, 1)])
            .is_err());
    }

    #[test]
    fn test_ascii_rendering() {
        let grid = corridor();
        let expected = format!("+---+---+---+\n| S{}E |\n+---+---+---+\n", " ".repeat(7));
        assert_eq!(grid.to_string(), expected);

        let path = [Point::new(0, 0), Point::new(1, 0), Point::new(2, 0)];
        let drawn = render_path(&grid, &path).to_string();
        assert!(drawn.contains("| S   *   E |"));
    }
}
