use clap::Parser;
use scribbler::{
    config::{Config, ConfigStore, FileConfigStore},
    difficulty::{Accuracy, Confidence, TimeLimit},
    replay::{ScriptedClassifier, SimulatedClassifier},
    sample::BlankCanvas,
    Classifier, SessionController, SessionSnapshot, Status, Trend,
};
use std::{error::Error, path::PathBuf, thread, time::Duration};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const POLL_MS: u64 = 20;

const SIMULATED_LABELS: &[&str] = &[
    "airplane", "apple", "bicycle", "bird", "car", "cat", "clock", "dog", "fish", "house", "sun",
    "tree",
];

/// draw a word against a live classifier
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Runs a timed drawing-guessing session headlessly: a classifier inspects the drawing every tick and the game ends when the word is recognised or time runs out."
)]
pub struct Cli {
    /// word to draw
    word: String,

    /// how high in the ranking the word must appear
    #[clap(short = 'a', long, value_enum)]
    accuracy: Option<Accuracy>,

    /// minimum confidence in percent
    #[clap(short = 'c', long, value_enum)]
    confidence: Option<Confidence>,

    /// time budget in seconds
    #[clap(short = 't', long = "time", value_enum)]
    time_limit: Option<TimeLimit>,

    /// length of one tick in milliseconds
    #[clap(long)]
    tick_ms: Option<u64>,

    /// replay classifier output from a JSON script instead of simulating it
    #[clap(short = 's', long, conflicts_with = "simulate")]
    script: Option<PathBuf>,

    /// simulate a classifier that slowly recognises the word (default)
    #[clap(long)]
    simulate: bool,

    /// print snapshots as JSON lines
    #[clap(long)]
    json: bool,

    /// persist the selected difficulty as the new default
    #[clap(long)]
    save_config: bool,
}

impl Cli {
    fn apply(&self, mut cfg: Config) -> Config {
        if let Some(accuracy) = self.accuracy {
            cfg.accuracy = accuracy;
        }
        if let Some(confidence) = self.confidence {
            cfg.confidence = confidence;
        }
        if let Some(time_limit) = self.time_limit {
            cfg.time_limit = time_limit;
        }
        if let Some(tick_ms) = self.tick_ms {
            cfg.tick_interval_ms = tick_ms;
        }
        cfg
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(env_filter)
        .init();
}

fn main() -> Result<(), Box<dyn Error>> {
    init_tracing();
    let cli = Cli::parse();

    let store = FileConfigStore::new();
    let cfg = cli.apply(store.load());
    if cli.save_config {
        store.save(&cfg)?;
        tracing::info!(path = %store.path().display(), "config saved");
    }

    match &cli.script {
        Some(path) if !cli.simulate => run(&cli, &cfg, ScriptedClassifier::from_path(path)?),
        _ => run(
            &cli,
            &cfg,
            SimulatedClassifier::new(&cli.word, SIMULATED_LABELS),
        ),
    }
}

fn run<C: Classifier>(cli: &Cli, cfg: &Config, classifier: C) -> Result<(), Box<dyn Error>> {
    let controller = SessionController::with_interval(
        BlankCanvas::default(),
        classifier,
        Duration::from_millis(cfg.tick_interval_ms),
    );
    controller.start(&cli.word, cfg.game_config())?;

    let mut last: Option<SessionSnapshot> = None;
    let done = loop {
        let snapshot = controller
            .current_snapshot()
            .ok_or("session disappeared")?;
        if last.as_ref().map_or(true, |prev| changed(prev, &snapshot)) {
            print_snapshot(&snapshot, cli.json)?;
        }
        if snapshot.is_terminal() {
            break snapshot;
        }
        last = Some(snapshot);
        thread::sleep(Duration::from_millis(POLL_MS));
    };

    if let Some(stats) = controller.stats() {
        tracing::info!(?stats, "scheduler stats");
    }
    if !cli.json {
        println!("{}", outcome_line(&done));
    }
    Ok(())
}

fn changed(prev: &SessionSnapshot, next: &SessionSnapshot) -> bool {
    prev.remaining_seconds != next.remaining_seconds
        || prev.status != next.status
        || prev.history.len() != next.history.len()
}

fn print_snapshot(snapshot: &SessionSnapshot, json: bool) -> Result<(), Box<dyn Error>> {
    if json {
        println!("{}", serde_json::to_string(snapshot)?);
        return Ok(());
    }

    let arrow = match snapshot.trend {
        Trend::Up => "↑",
        Trend::Down => "↓",
        Trend::Flat => "·",
    };
    let rank = snapshot
        .target_rank
        .map_or_else(|| "-".to_string(), |r| (r + 1).to_string());
    let top = snapshot
        .top_guesses
        .iter()
        .take(snapshot.top_k.max(3))
        .map(|g| format!("{} {:.2}", g.label, g.probability))
        .collect::<Vec<_>>()
        .join(", ");

    println!(
        "{:>3}s {} {} p={:.2} rank={} [{}]",
        snapshot.remaining_seconds,
        arrow,
        snapshot.target_word,
        snapshot.last_target_probability,
        rank,
        top
    );
    Ok(())
}

fn outcome_line(snapshot: &SessionSnapshot) -> String {
    match snapshot.status {
        Status::Won => format!(
            "recognised \"{}\" with {}s left",
            snapshot.target_word, snapshot.remaining_seconds
        ),
        Status::TimedOut => format!("time's up, \"{}\" was not recognised", snapshot.target_word),
        Status::Lost => format!("gave up on \"{}\"", snapshot.target_word),
        Status::InProgress => format!("\"{}\" still in progress", snapshot.target_word),
    }
}
