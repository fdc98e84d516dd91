use anyhow::{Context, Result, bail};
use clap::Parser;
use flexi_logger::Logger;
use memory_planner::{
    action::{Action, describe_action, format_actions},
    autoplay::{ActionSource, Agent, turn_limit},
    board::{Board, DEFAULT_SIZE},
    game::Game,
    solver::{
        DEFAULT_BRANCH_CAP, DEFAULT_MAX_EXPANSIONS, Planner, PlannerConfig, SearchState,
        SolveResult,
    },
};
use rand::{SeedableRng, rngs::StdRng};

use std::{
    io::{IsTerminal, Read, Write, stderr, stdin},
    path::PathBuf,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::{Duration, Instant},
};

#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
    /// Board size (N for an N×N board, must be even)
    #[arg(short = 'n', long, default_value_t = DEFAULT_SIZE, value_name = "NUM")]
    size: usize,
    /// Seed for dealing a random board
    #[arg(long, value_name = "SEED")]
    seed: Option<u64>,
    /// Seed for the fallback policy's random picks
    #[arg(long, default_value_t = 0, value_name = "SEED")]
    rng_seed: u64,
    /// Max nodes the planner may expand per plan
    #[arg(short = 's', long, default_value_t = DEFAULT_MAX_EXPANSIONS, value_name = "NUM")]
    max_expansions: usize,
    /// Unseen cards (and partners per card) tried per search node
    #[arg(short = 'k', long, default_value_t = DEFAULT_BRANCH_CAP, value_name = "NUM")]
    branch_cap: usize,
    /// Print a single plan for the initial board instead of playing
    #[arg(long)]
    plan_only: bool,
    /// Preview the board without solving
    #[arg(short, long)]
    preview: bool,
    /// Log planner and agent decisions
    #[arg(short, long)]
    verbose: bool,
    /// Path to a board file to solve (rows of whitespace-separated values)
    file: Option<PathBuf>,
}

fn main() -> Result<()> {
    let Cli {
        size,
        seed,
        rng_seed,
        max_expansions,
        branch_cap,
        plan_only,
        preview,
        verbose,
        file,
    } = Cli::parse();

    let _logger = Logger::try_with_env_or_str(if verbose { "debug" } else { "warn" })?
        .format(flexi_logger::colored_default_format)
        .start()?;

    if branch_cap == 0 {
        bail!("Branch cap must be at least 1.");
    }

    let mut content = String::new();
    if let Some(file) = file {
        content = std::fs::read_to_string(file)?;
    } else if seed.is_none() && !stdin().is_terminal() {
        stdin()
            .read_to_string(&mut content)
            .context("Failed to read from stdin")?;
    }
    let board = if !content.trim().is_empty() {
        Board::parse(&content).context("Failed to parse board")?
    } else {
        Board::new_from_seed(size, seed.unwrap_or_else(rand::random))?
    };
    if preview {
        println!("{}", board.pretty_print());
        return Ok(());
    }

    let config = PlannerConfig {
        max_expansions,
        branch_cap,
    };
    if plan_only {
        let actions = do_plan(board, config)?;
        println!("{}", format_actions(&actions));
        return Ok(());
    }
    do_play(board, config, rng_seed)
}

fn do_plan(board: Board, config: PlannerConfig) -> Result<Vec<Action>> {
    println!("{}\n", board.pretty_print());
    let SolveResult {
        status,
        actions,
        expansions,
        states,
        elapsed,
    } = with_spinner("Planning...", || {
        Planner::new(&board, config).search(&SearchState::default())
    });
    let elapsed = format_elapsed(elapsed);
    let Some(actions) = actions else {
        bail!("No plan found ({status:?}); expanded {expansions} nodes in {elapsed}.");
    };
    println!(
        "{}\n",
        plan_summary(actions.len(), &elapsed, expansions, states)
    );
    Ok(actions)
}

fn do_play(board: Board, config: PlannerConfig, rng_seed: u64) -> Result<()> {
    println!("{}\n", board.pretty_print());
    let game = Game::new(board);
    let limit = turn_limit(&game);
    let total_pairs = game.board().total_pairs();
    let mut agent = Agent::new(game, config, StdRng::seed_from_u64(rng_seed));
    let timer = Instant::now();

    let mut played = 0;
    while played < limit {
        let before = agent.game().clone();
        let Some(record) = agent.step() else {
            break;
        };
        played += 1;
        let source = match record.source {
            ActionSource::Plan => "plan",
            ActionSource::Fallback => "fallback",
        };
        println!(
            "{played:03} {:<32} {source:<8} {:>3}/{total_pairs}",
            describe_action(&before, &record.action),
            agent.game().matched_pairs()
        );
    }

    let elapsed = format_elapsed(timer.elapsed());
    let game = agent.game();
    println!("\n{}\n", game.pretty_print());
    if !game.is_finished() {
        bail!("Gave up after {played} turns.");
    }
    println!(
        "{}",
        play_summary(
            game.moves(),
            &elapsed,
            agent.plans(),
            agent.fallbacks(),
            agent.replans()
        )
    );
    Ok(())
}

fn plan_summary(turns: usize, elapsed: &str, expansions: usize, states: usize) -> String {
    format!("✓ Planned {turns} turns. Time: {elapsed}, Expansions: {expansions}, States: {states}")
}

fn play_summary(
    turns: usize,
    elapsed: &str,
    plans: usize,
    fallbacks: usize,
    replans: usize,
) -> String {
    format!(
        "✓ Finished in {turns} turns. Time: {elapsed}, Plans: {plans}, Fallbacks: {fallbacks}, Re-plans: {replans}"
    )
}

fn with_spinner<T, F: FnOnce() -> T>(message: &str, f: F) -> T {
    if stderr().is_terminal() {
        let spinning = Arc::new(AtomicBool::new(true));
        let spinning_clone = Arc::clone(&spinning);
        let message = message.to_string();

        let handle = std::thread::spawn(move || {
            let spinner_chars = ['|', '/', '-', '\\'];
            let mut i = 0;
            let stderr = stderr();
            let mut handle = stderr.lock();

            let _ = write!(handle, "\x1b[?25l"); // hide cursor
            let _ = handle.flush();

            while spinning_clone.load(Ordering::Relaxed) {
                let spinner_char = spinner_chars[i % spinner_chars.len()];
                let _ = write!(handle, "\r{spinner_char} {message}",);
                let _ = handle.flush();
                std::thread::sleep(Duration::from_millis(100));
                i += 1;
            }

            let _ = write!(handle, "\r\x1b[2K\r\x1b[?25h"); // clear line and show cursor
            let _ = handle.flush();
        });

        let result = f();
        spinning.store(false, Ordering::Relaxed);
        let _ = handle.join();
        result
    } else {
        f()
    }
}

fn format_elapsed(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    if secs < 90 {
        let ms = elapsed.subsec_millis();
        format!("{secs}.{ms:03}s")
    } else {
        let minutes = secs / 60;
        let secs = secs % 60;
        format!("{minutes}m {secs}s")
    }
}
