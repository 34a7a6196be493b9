//! Maze model and the collaborators around the search engine
//!
//! - `types`: points and compass directions
//! - `grid`: the immutable topology handed to every solver, plus ASCII rendering
//! - `generate`: randomized depth-first construction
//! - `store`: JSON persistence
//! - `verify`: independent checking of a returned path

pub mod error;
pub mod generate;
pub mod grid;
pub mod store;
pub mod types;
pub mod verify;

pub use error::GridError;
pub use generate::{GenerateError, GeneratorConfig, generate};
pub use grid::{Grid, PathView, render_path};
pub use store::{load_grid, save_grid};
pub use types::{Direction, Point};
pub use verify::{PathDefect, verify_path};
