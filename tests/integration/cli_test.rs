use std::path::PathBuf;
use std::process::{Command, Output};

fn get_binary_path() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_maze-solver"))
}

fn run(args: &[&str]) -> Output {
    Command::new(get_binary_path())
        .args(args)
        .output()
        .expect("Failed to execute maze-solver")
}

fn assert_success(output: &Output) -> String {
    if !output.status.success() {
        panic!(
            "Command failed with status: {:?}\nstderr: {}\nstdout: {}",
            output.status,
            String::from_utf8_lossy(&output.stderr),
            String::from_utf8_lossy(&output.stdout)
        );
    }
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn test_solve_generated_maze_with_every_strategy() {
    for strategy in ["seq", "par", "parlim", "thread"] {
        let output = run(&[
            "solve",
            "--width",
            "20",
            "--height",
            "15",
            "--seed",
            "42",
            "--strategy",
            strategy,
            "--threads",
            "2",
            "--workers",
            "2",
        ]);
        let stdout = assert_success(&output);
        assert!(stdout.contains("Maze: 20x15"), "{strategy}: {stdout}");
        assert!(stdout.contains("Path found"), "{strategy}: {stdout}");
        assert!(stdout.contains("Path verified."), "{strategy}: {stdout}");
        // small mazes are drawn, path cells marked
        assert!(stdout.contains('*') || stdout.contains("+---"), "{strategy}");
    }
}

#[test]
fn test_stats_flag_prints_summary() {
    let output = run(&[
        "solve",
        "--width",
        "30",
        "--height",
        "30",
        "--seed",
        "7",
        "--strategy",
        "work-stealing",
        "--workers",
        "3",
        "--no-render",
        "--stats",
    ]);
    let stdout = assert_success(&output);
    assert!(stdout.contains("Strategy: work-stealing"));
    assert!(stdout.contains("Cells claimed:"));
    assert!(stdout.contains("Tree nodes:"));
    assert!(!stdout.contains("+---"), "--no-render must suppress the maze");
}

#[test]
fn test_generate_then_solve_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let maze_path = dir.path().join("maze.json");
    let maze_arg = maze_path.to_str().unwrap();

    let output = run(&[
        "generate", "--width", "12", "--height", "9", "--seed", "3", "--output", maze_arg,
    ]);
    let stdout = assert_success(&output);
    assert!(stdout.contains("Generated 12x9 maze"));
    assert!(maze_path.exists());

    let output = run(&["solve", "--input", maze_arg, "--strategy", "bounded-fork", "--permits", "2"]);
    let stdout = assert_success(&output);
    assert!(stdout.contains("Maze: 12x9"));
    assert!(stdout.contains("Path verified."));
}

#[test]
fn test_invalid_configuration_fails() {
    let output = run(&["solve", "--width", "5", "--height", "5", "--strategy", "thread", "--workers", "0"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("workers must be at least 1"), "{stderr}");
}

#[test]
fn test_missing_input_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope.json");
    let output = run(&["solve", "--input", missing.to_str().unwrap()]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Error:"));
}

#[test]
fn test_bad_cycle_probability_fails() {
    let output = run(&["generate", "--output", "unused.json", "--cycle-probability", "1.5"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("cycle probability"));
}
