use maze_solver::maze::{GeneratorConfig, generate, verify_path};
use maze_solver::search::{
    MazeSolver, SequentialSolver, SolverConfig, Strategy, VisitedRegistry, solver_for,
};
use proptest::prelude::*;
use std::sync::Arc;
use std::time::Duration;

fn strategy_from_index(index: usize) -> Strategy {
    Strategy::ALL[index % Strategy::ALL.len()]
}

fn solver_config(strategy: Strategy, pool: usize, threshold: usize) -> SolverConfig {
    SolverConfig::new(strategy)
        .with_threads(pool)
        .with_workers(pool)
        .with_permits(pool * 2)
        .with_local_queue_threshold(threshold)
        .with_task_stack_size(16 * 1024 * 1024)
        .with_timeout(Duration::from_secs(60))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    /// Generated mazes are connected, so every strategy returns a valid route.
    #[test]
    fn prop_returned_path_is_valid(
        width in 1usize..24,
        height in 1usize..24,
        seed in any::<u64>(),
        cycle_probability in 0.0f64..0.5,
        strategy_index in 0usize..4,
        pool in 1usize..5,
        threshold in 0usize..5,
    ) {
        let grid = Arc::new(
            generate(
                &GeneratorConfig::new(width, height)
                    .with_seed(seed)
                    .with_cycle_probability(cycle_probability),
            )
            .unwrap(),
        );
        let strategy = strategy_from_index(strategy_index);
        let solver = solver_for(&solver_config(strategy, pool, threshold)).unwrap();
        let registry = Arc::new(VisitedRegistry::with_probe(&grid));
        let result = solver.solve_with_registry(Arc::clone(&grid), Arc::clone(&registry)).unwrap();

        let path = result.path.expect("generated mazes are connected");
        prop_assert_eq!(verify_path(&grid, &path), Ok(()));
        prop_assert!(
            registry.probe_counts().unwrap().iter().all(|&count| count <= 1),
            "{} claimed a cell twice", strategy
        );
        prop_assert!(result.statistics.cells_claimed as usize >= path.len());
    }

    /// The sequential search is a pure function of the grid.
    #[test]
    fn prop_sequential_is_deterministic(
        width in 2usize..30,
        height in 2usize..30,
        seed in any::<u64>(),
        cycle_probability in 0.0f64..0.5,
    ) {
        let grid = Arc::new(
            generate(
                &GeneratorConfig::new(width, height)
                    .with_seed(seed)
                    .with_cycle_probability(cycle_probability),
            )
            .unwrap(),
        );
        let first = SequentialSolver.solve(Arc::clone(&grid)).unwrap();
        let second = SequentialSolver.solve(Arc::clone(&grid)).unwrap();
        prop_assert_eq!(first.path, second.path);
        prop_assert_eq!(first.statistics.cells_claimed, second.statistics.cells_claimed);
        prop_assert_eq!(first.statistics.dead_ends, second.statistics.dead_ends);
    }

    /// Without cycles the route is unique, so concurrent strategies agree with
    /// the sequential one.
    #[test]
    fn prop_perfect_mazes_agree_across_strategies(
        width in 2usize..20,
        height in 2usize..20,
        seed in any::<u64>(),
        strategy_index in 1usize..4,
    ) {
        let grid = Arc::new(
            generate(&GeneratorConfig::new(width, height).with_seed(seed).with_cycle_probability(0.0)).unwrap(),
        );
        let expected = SequentialSolver.solve(Arc::clone(&grid)).unwrap().path;
        let strategy = strategy_from_index(strategy_index);
        let solver = solver_for(&solver_config(strategy, 3, 3)).unwrap();
        let result = solver.solve(grid).unwrap();
        prop_assert_eq!(result.path, expected, "{}", strategy);
    }
}
