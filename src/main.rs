//! Terminal runner (default binary).
//!
//! A line-oriented driver for the puzzle session: prints the grid with
//! crossterm colours and reads one command per line from stdin.
//!
//! Commands:
//!
//! ```text
//! r <row> <amount>   shift a row (positive = right)
//! c <col> <amount>   shift a column (positive = down)
//! h                  hint
//! g y|n              score a species guess
//! l                  new location with random weights
//! s                  print a JSON snapshot
//! q                  quit
//! ```
//!
//! Configuration comes from `SPECIES_MATCH_*` environment variables; log
//! verbosity from `RUST_LOG` (default `warn`).

use std::io::{self, BufRead, Write};

use anyhow::{Context, Result};
use crossterm::{
    style::{Attribute, Color, Print, ResetColor, SetAttribute, SetForegroundColor},
    QueueableCommand,
};
use tracing_subscriber::EnvFilter;

use species_match::core::{
    CategoryWeights, ClueAmount, ClueBatch, ClueSource, GameConfig, GameEvent, PuzzleSession,
    SimpleRng, TurnReport,
};
use species_match::engine::{hint_for, reshuffle_if_dead};
use species_match::types::{ClueCategory, MoveAction, TileCategory, CATEGORY_COUNT};

/// Clues per category in the demo content
const DEMO_CLUES_PER_CATEGORY: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Move(MoveAction),
    Hint,
    Guess(bool),
    Location,
    Snapshot,
    Quit,
}

fn parse_command(line: &str) -> Option<Command> {
    let mut parts = line.split_whitespace();
    let head = parts.next()?;
    let cmd = match head {
        "r" | "c" => {
            let index: i32 = parts.next()?.parse().ok()?;
            let amount: i32 = parts.next()?.parse().ok()?;
            if head == "r" {
                Command::Move(MoveAction::row(index, amount))
            } else {
                Command::Move(MoveAction::col(index, amount))
            }
        }
        "h" => Command::Hint,
        "g" => match parts.next()? {
            "y" => Command::Guess(true),
            "n" => Command::Guess(false),
            _ => return None,
        },
        "l" => Command::Location,
        "s" => Command::Snapshot,
        "q" => Command::Quit,
        _ => return None,
    };
    Some(cmd)
}

/// Numbered placeholder clues; each category runs dry after a few reveals
#[derive(Debug, Default)]
struct DemoClues {
    shown: [u32; CATEGORY_COUNT],
}

impl DemoClues {
    fn reset(&mut self) {
        self.shown = [0; CATEGORY_COUNT];
    }
}

impl ClueSource for DemoClues {
    fn request_clues(&mut self, category: ClueCategory, amount: ClueAmount) -> ClueBatch {
        let shown = &mut self.shown[category.index()];
        let left = DEMO_CLUES_PER_CATEGORY.saturating_sub(*shown);
        let n = match amount {
            ClueAmount::Count(n) => n.min(left),
            ClueAmount::All => left,
        };
        let clues = (*shown..*shown + n)
            .map(|i| format!("{} clue #{}", category.as_str(), i + 1))
            .collect();
        *shown += n;
        ClueBatch {
            clues,
            exhausted: *shown >= DEMO_CLUES_PER_CATEGORY,
        }
    }
}

fn tile_color(category: TileCategory) -> Color {
    match category {
        TileCategory::Red => Color::Red,
        TileCategory::Orange => Color::Rgb {
            r: 255,
            g: 140,
            b: 0,
        },
        TileCategory::Yellow => Color::Yellow,
        TileCategory::Green => Color::Green,
        TileCategory::Blue => Color::Blue,
        TileCategory::Purple => Color::Magenta,
        TileCategory::Pink => Color::Rgb {
            r: 255,
            g: 105,
            b: 180,
        },
        TileCategory::White => Color::White,
    }
}

/// Grid plus status line, built as a crossterm command sequence
fn render(session: &PuzzleSession, out: &mut Vec<u8>) -> io::Result<()> {
    let grid = session.grid();

    out.queue(SetAttribute(Attribute::Dim))?;
    out.queue(Print("    "))?;
    for x in 0..grid.width() {
        out.queue(Print(format!("{:>2}", x)))?;
    }
    out.queue(Print("\r\n"))?;
    out.queue(SetAttribute(Attribute::Reset))?;

    for y in 0..grid.height() {
        out.queue(SetAttribute(Attribute::Dim))?;
        out.queue(Print(format!("{:>3} ", y)))?;
        out.queue(SetAttribute(Attribute::Reset))?;
        for x in 0..grid.width() {
            match grid.category_at(x, y) {
                Some(category) => {
                    out.queue(SetForegroundColor(tile_color(category)))?;
                    out.queue(Print(" ●"))?;
                }
                None => {
                    out.queue(ResetColor)?;
                    out.queue(Print(" ·"))?;
                }
            }
        }
        out.queue(ResetColor)?;
        out.queue(Print("\r\n"))?;
    }

    let snap = session.snapshot();
    out.queue(Print(format!(
        "score {}  moves {}/{}  streak {} (x{:.2})\r\n",
        snap.score, snap.moves_used, snap.max_moves, snap.streak, snap.multiplier
    )))?;
    Ok(())
}

fn report_turn(report: &TurnReport, out: &mut impl Write) -> io::Result<()> {
    if !report.is_committed() {
        writeln!(out, "no match, snapped back ({:?})", report.outcome)?;
        return Ok(());
    }
    writeln!(
        out,
        "+{} ({} base x{:.2}), {} phase(s), largest run {}",
        report.score.final_score,
        report.summary.base_score,
        report.score.multiplier,
        report.summary.phases,
        report.summary.largest_match
    )?;
    for revealed in &report.revealed {
        for clue in &revealed.clues {
            writeln!(out, "  clue: {}", clue)?;
        }
    }
    Ok(())
}

fn random_weights(rng: &mut SimpleRng) -> Result<CategoryWeights> {
    let weights = CategoryWeights::from_pairs(
        TileCategory::ALL
            .iter()
            .map(|&category| (category, 0.25 + rng.next_f64())),
    )?;
    Ok(weights)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let config = GameConfig::from_env().context("loading configuration")?;
    let mut rng = SimpleRng::new(config.seed.wrapping_add(1));
    let mut session = PuzzleSession::new(config).context("starting session")?;
    let events = session.subscribe();
    let mut clues = DemoClues::default();

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut frame = Vec::with_capacity(4 * 1024);

    loop {
        reshuffle_if_dead(&mut session);

        frame.clear();
        render(&session, &mut frame)?;
        stdout.write_all(&frame)?;
        write!(stdout, "> ")?;
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let Some(command) = parse_command(&line) else {
            writeln!(stdout, "commands: r <row> <amt> | c <col> <amt> | h | g y|n | l | s | q")?;
            continue;
        };

        match command {
            Command::Move(action) => {
                let report = session.play_move(action, &mut clues);
                report_turn(&report, &mut stdout)?;
            }
            Command::Hint => match hint_for(&session) {
                Ok(hint) => writeln!(
                    stdout,
                    "try {} {} by {} (run of {})",
                    hint.action.axis.as_str(),
                    hint.action.index,
                    hint.action.amount,
                    hint.largest_match
                )?,
                Err(e) => writeln!(stdout, "{}: {}", e.code(), e.message())?,
            },
            Command::Guess(correct) => {
                let bonus = session.guess(correct);
                if correct {
                    clues.reset();
                }
                writeln!(stdout, "guess scored {}", bonus)?;
            }
            Command::Location => {
                session.change_location(Some(random_weights(&mut rng)?));
                clues.reset();
            }
            Command::Snapshot => {
                let json = serde_json::json!({
                    "score": session.snapshot(),
                    "grid": session.grid_snapshot(),
                });
                writeln!(stdout, "{}", serde_json::to_string_pretty(&json)?)?;
            }
            Command::Quit => break,
        }

        for event in events.try_iter() {
            if let GameEvent::GameOver { score } = event {
                writeln!(stdout, "out of moves, final score {} (l for a new location)", score)?;
            }
        }
    }

    Ok(())
}
