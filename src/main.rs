use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use maze_solver::maze::{GeneratorConfig, Grid, generate, load_grid, render_path, save_grid, verify_path};
use maze_solver::search::{SolverConfig, Strategy, solver_for};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Mazes up to this size are drawn on the terminal.
const RENDER_LIMIT: usize = 60;

// --- Command Line Arguments ---

#[derive(Parser)]
#[command(name = "maze-solver")]
#[command(about = "maze-solver - concurrent depth-first maze search")]
#[command(version)]
#[command(subcommand_required = true)]
#[command(arg_required_else_help = true)]
struct Args {
    /// Log search lifecycle and progress
    #[arg(long, short, global = true)]
    verbose: bool,
    /// Log everything down to debug level
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

/// CLI strategy selection
#[derive(Clone, Copy, Debug, ValueEnum)]
enum CliStrategy {
    /// Single-threaded depth-first search
    #[value(alias = "seq")]
    Sequential,
    /// Fork a task for every deferred branch
    #[value(alias = "par")]
    Fork,
    /// Fork only while permits are available
    #[value(alias = "parlim")]
    BoundedFork,
    /// Persistent worker pool with local and shared queues
    #[value(alias = "thread")]
    WorkStealing,
}

impl From<CliStrategy> for Strategy {
    fn from(cli: CliStrategy) -> Self {
        match cli {
            CliStrategy::Sequential => Strategy::Sequential,
            CliStrategy::Fork => Strategy::Fork,
            CliStrategy::BoundedFork => Strategy::BoundedFork,
            CliStrategy::WorkStealing => Strategy::WorkStealing,
        }
    }
}

/// Options describing a generated maze
#[derive(ClapArgs, Debug)]
struct MazeOptions {
    /// Maze width in cells
    #[arg(long, default_value = "50")]
    width: usize,
    /// Maze height in cells
    #[arg(long, default_value = "50")]
    height: usize,
    /// Probability of opening an extra passage into an already carved cell
    #[arg(long, default_value = "0.01")]
    cycle_probability: f64,
    /// Random seed for reproducibility
    #[arg(long)]
    seed: Option<u64>,
}

impl MazeOptions {
    fn generator_config(&self) -> GeneratorConfig {
        GeneratorConfig::new(self.width, self.height)
            .with_cycle_probability(self.cycle_probability)
            .with_seed_option(self.seed)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Solve a generated or stored maze
    Solve {
        /// Load the maze from a JSON file instead of generating one
        #[arg(long, short)]
        input: Option<PathBuf>,
        /// Write the solved maze to a JSON file
        #[arg(long)]
        save: Option<PathBuf>,
        #[command(flatten)]
        maze: MazeOptions,

        // --- Strategy selection ---
        /// Search strategy to use
        #[arg(long, short, value_enum, default_value = "sequential")]
        strategy: CliStrategy,
        /// Task pool threads for the fork strategies
        #[arg(long, short = 'j')]
        threads: Option<usize>,
        /// Live task budget of the bounded fork strategy
        #[arg(long)]
        permits: Option<usize>,
        /// Worker threads of the work-stealing pool
        #[arg(long)]
        workers: Option<usize>,
        /// Local queue depth before work spills to the shared queue
        #[arg(long)]
        local_threshold: Option<usize>,
        /// Timeout in seconds for concurrent searches
        #[arg(long)]
        timeout: Option<u64>,

        // --- Output ---
        /// Never draw the maze
        #[arg(long)]
        no_render: bool,
        /// Print search statistics
        #[arg(long)]
        stats: bool,
    },
    /// Generate a maze and write it to a JSON file
    Generate {
        /// Destination file
        #[arg(long, short)]
        output: PathBuf,
        #[command(flatten)]
        maze: MazeOptions,
        /// Also draw the maze
        #[arg(long)]
        print: bool,
    },
}

/// Options for one solve run
struct SolveOptions {
    config: SolverConfig,
    render: bool,
    stats: bool,
}

// --- Commands ---

fn load_or_generate(input: Option<&Path>, maze: &MazeOptions) -> Result<Grid, Box<dyn std::error::Error>> {
    match input {
        Some(path) => Ok(load_grid(path)?),
        None => Ok(generate(&maze.generator_config())?),
    }
}

fn fits_terminal(grid: &Grid) -> bool {
    grid.width() <= RENDER_LIMIT && grid.height() <= RENDER_LIMIT
}

fn run_solve(grid: Grid, options: &SolveOptions) -> Result<(), Box<dyn std::error::Error>> {
    println!(
        "Maze: {}x{}, start {}, end {}",
        grid.width(),
        grid.height(),
        grid.start(),
        grid.end()
    );
    let render = options.render && fits_terminal(&grid);
    if render {
        print!("{}", grid);
    }

    let grid = Arc::new(grid);
    let solver = solver_for(&options.config)?;
    println!("Strategy: {}", solver.strategy());
    let result = solver.solve(Arc::clone(&grid))?;

    match &result.path {
        Some(path) => {
            println!(
                "Path found: {} cells in {:.2?}",
                path.len(),
                result.statistics.elapsed_time
            );
            verify_path(&grid, path).map_err(|defect| format!("Returned path is invalid: {defect}"))?;
            println!("Path verified.");
            if render {
                print!("{}", render_path(&grid, path));
            }
        }
        None => println!("No path found in {:.2?}", result.statistics.elapsed_time),
    }

    if options.stats {
        println!("\n{}", result.statistics.format_summary());
    }
    Ok(())
}

fn run_generate(output: &Path, maze: &MazeOptions, print: bool) -> Result<(), Box<dyn std::error::Error>> {
    let grid = generate(&maze.generator_config())?;
    save_grid(output, &grid)?;
    println!(
        "Generated {}x{} maze (start {}, end {}) -> {}",
        grid.width(),
        grid.height(),
        grid.start(),
        grid.end(),
        output.display()
    );
    if print {
        print!("{}", grid);
    }
    Ok(())
}

fn init_tracing(verbose: bool, debug: bool) {
    // --debug > --verbose > RUST_LOG > "warn"
    let filter = if debug {
        EnvFilter::new("debug")
    } else if verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let args = Args::parse();
    init_tracing(args.verbose, args.debug);

    let outcome = match args.command {
        Commands::Solve {
            input,
            save,
            maze,
            strategy,
            threads,
            permits,
            workers,
            local_threshold,
            timeout,
            no_render,
            stats,
        } => {
            let mut config = SolverConfig::new(strategy.into())
                .with_timeout_option(timeout.map(Duration::from_secs));
            if let Some(threads) = threads {
                config = config.with_threads(threads);
            }
            if let Some(permits) = permits {
                config = config.with_permits(permits);
            }
            if let Some(workers) = workers {
                config = config.with_workers(workers);
            }
            if let Some(threshold) = local_threshold {
                config = config.with_local_queue_threshold(threshold);
            }
            let options = SolveOptions {
                config,
                render: !no_render,
                stats,
            };

            load_or_generate(input.as_deref(), &maze).and_then(|grid| {
                if let Some(path) = &save {
                    save_grid(path, &grid)?;
                    println!("Saved maze to {}", path.display());
                }
                run_solve(grid, &options)
            })
        }
        Commands::Generate { output, maze, print } => run_generate(&output, &maze, print),
    };

    if let Err(e) = outcome {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
