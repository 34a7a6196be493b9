//! JSON persistence for grids

use crate::maze::error::GridError;
use crate::maze::grid::Grid;
use crate::maze::types::Point;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// On-disk layout of a grid. Passage masks are stored row-major.
#[derive(Debug, Serialize, Deserialize)]
struct StoredGrid {
    width: usize,
    height: usize,
    start: Point,
    end: Point,
    passages: Vec<u8>,
}

impl From<&Grid> for StoredGrid {
    fn from(grid: &Grid) -> Self {
        StoredGrid {
            width: grid.width(),
            height: grid.height(),
            start: grid.start(),
            end: grid.end(),
            passages: grid.passages().to_vec(),
        }
    }
}

pub fn to_json(grid: &Grid) -> Result<String, GridError> {
    Ok(serde_json::to_string(&StoredGrid::from(grid))?)
}

/// Parse and validate a stored grid.
pub fn from_json(json: &str) -> Result<Grid, GridError> {
    let stored: StoredGrid = serde_json::from_str(json)?;
    Grid::from_parts(
        stored.width,
        stored.height,
        stored.start,
        stored.end,
        stored.passages,
    )
}

pub fn save_grid(path: &Path, grid: &Grid) -> Result<(), GridError> {
    let json = to_json(grid)?;
    fs::write(path, json).map_err(|source| GridError::WriteFile {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!(path = %path.display(), "saved grid");
    Ok(())
}

pub fn load_grid(path: &Path) -> Result<Grid, GridError> {
    let json = fs::read_to_string(path).map_err(|source| GridError::ReadFile {
        path: path.to_path_buf(),
        source,
    })?;
    let grid = from_json(&json)?;
    tracing::debug!(
        path = %path.display(),
        width = grid.width(),
        height = grid.height(),
        "loaded grid"
    );
    Ok(grid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::maze::generate::{GeneratorConfig, generate};

    #[test]
    fn test_json_preserves_grid() {
        let grid = generate(&GeneratorConfig::new(6, 4).with_seed(9)).unwrap();
        let restored = from_json(&to_json(&grid).unwrap()).unwrap();
        assert_eq!(restored, grid);
    }

    #[test]
    fn test_rejects_inconsistent_json() {
        let json = r#"{"width":2,"height":1,"start":{"x":0,"y":0},"end":{"x":1,"y":0},"passages":[4]}"#;
        assert!(matches!(
            from_json(json),
            Err(GridError::PassageCount { expected: 2, found: 1 })
        ));

        let json = r#"{"width":2,"height":1,"start":{"x":0,"y":0},"end":{"x":5,"y":0},"passages":[4,8]}"#;
        assert!(matches!(from_json(json), Err(GridError::OutOfBounds { .. })));

        assert!(matches!(from_json("not json"), Err(GridError::Json(_))));
    }

    #[test]
    fn test_save_and_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("grid.json");
        let grid = generate(&GeneratorConfig::new(5, 5).with_seed(2)).unwrap();
        save_grid(&path, &grid).unwrap();
        assert_eq!(load_grid(&path).unwrap(), grid);

        let missing = dir.path().join("missing.json");
        assert!(matches!(load_grid(&missing), Err(GridError::ReadFile { .. })));
    }
}
