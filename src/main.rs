//! hand-replay - feed recorded hand frames through a `SimpleHand`
//!
//! Reads JSON lines of `{"head": Pose, "frame": HandFrame}` and prints
//! every event the hand raises as an s-expression.

use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use serde::Deserialize;
use tracing::{debug, info};

use hand_input::{
    FrameServices, HandConfig, HandFrame, Handedness, NoVelocity, Pose, RecordingSink,
    SimpleHand,
};

#[derive(Parser, Debug)]
#[command(name = "hand-replay", about = "Replay recorded hand frames and print input events")]
struct Cli {
    /// JSON-lines frame recording (default: stdin)
    #[arg(long)]
    input: Option<PathBuf>,

    /// Which hand the recording belongs to: left or right
    #[arg(long, default_value = "right")]
    hand: String,

    /// JSON hand configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print the hand status after every frame
    #[arg(long)]
    status: bool,
}

/// One recorded line.
#[derive(Debug, Deserialize)]
struct ReplayRecord {
    #[serde(default)]
    head: Pose,
    frame: HandFrame,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "hand_input=info,hand_replay=info".into()),
        )
        .init();

    let handedness = match cli.hand.as_str() {
        "left" => Handedness::Left,
        "right" => Handedness::Right,
        other => anyhow::bail!("unknown hand: {other}. Use: left or right"),
    };

    let config = match &cli.config {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("failed to open config {:?}", path))?;
            serde_json::from_reader(BufReader::new(file))
                .with_context(|| format!("invalid config {:?}", path))?
        }
        None => HandConfig::default(),
    };

    let reader: Box<dyn BufRead> = match &cli.input {
        Some(path) => Box::new(BufReader::new(
            File::open(path).with_context(|| format!("failed to open recording {:?}", path))?,
        )),
        None => Box::new(BufReader::new(io::stdin())),
    };

    info!("hand-replay v{} ({})", env!("CARGO_PKG_VERSION"), handedness.as_str());
    let stdout = io::stdout();
    let frames = replay(
        reader,
        &mut stdout.lock(),
        SimpleHand::new(handedness, config),
        cli.status,
    )?;
    info!("replayed {} frames", frames);
    Ok(())
}

/// Drive `hand` with every record in `reader`, writing event lines to `out`.
/// Returns the number of frames.
fn replay(
    reader: impl BufRead,
    out: &mut impl Write,
    mut hand: SimpleHand,
    status: bool,
) -> anyhow::Result<usize> {
    let mut velocity = NoVelocity;
    let mut sink = RecordingSink::new();
    let mut frames = 0;

    for (i, line) in reader.lines().enumerate() {
        let line_no = i + 1;
        let line = line.with_context(|| format!("failed to read line {line_no}"))?;
        if line.trim().is_empty() {
            continue;
        }
        let record: ReplayRecord = serde_json::from_str(&line)
            .with_context(|| format!("line {line_no}: malformed record"))?;

        let mut services = FrameServices::new(&record.head, &mut velocity, &mut sink);
        hand.update(&record.frame, &mut services)
            .with_context(|| format!("line {line_no}: rejected frame"))?;

        let events = sink.drain();
        debug!("line {}: {} events", line_no, events.len());
        for event in events {
            writeln!(out, "{}", event.to_sexp())?;
        }
        if status {
            writeln!(out, "{}", hand.status_sexp())?;
        }
        frames += 1;
    }

    Ok(frames)
}
