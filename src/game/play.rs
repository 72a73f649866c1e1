//! Plays a session in the terminal, one command per line.

use std::io::Write;

use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use super::{Baseline, Game, GameSession, GuessResult, Outcome, ReadingSource};
use crate::towns::Region;

fn describe(pm25: Option<f64>) -> String {
    pm25.map_or_else(|| "No data".to_owned(), |pm25| format!("{pm25:.1} µg/m³"))
}

fn outcome_message(result: &GuessResult, reference: &str) -> String {
    match result.outcome() {
        Outcome::Worse => format!("{} is worse than {reference}!", result.name()),
        Outcome::NotWorse => format!("{} is better than {reference}.", result.name()),
        Outcome::Unknown => "Data missing for this comparison.".to_owned(),
    }
}

fn print_candidates(session: &GameSession, output: &mut impl Write) -> std::io::Result<()> {
    for region in session.unlocked() {
        let towns: Vec<_> = session
            .candidates()
            .filter(|town| town.region == region && !session.has_guessed(town))
            .map(|town| town.name)
            .collect();

        writeln!(output, "{region}: {}", towns.join(", "))?;
    }

    Ok(())
}

fn print_summary(session: &GameSession, output: &mut impl Write) -> std::io::Result<()> {
    writeln!(
        output,
        "Game over! You found {} of {} towns with worse air than {}.",
        session.score(),
        session.settings().max_guesses,
        session.reference().name,
    )?;

    for guess in session.history() {
        writeln!(output, "  {}: {}", guess.name(), describe(guess.pm25()))?;
    }

    writeln!(output, "Type `reset` to play again, or `quit` to stop.")
}

/// Runs until `quit` or the end of `input`.
///
/// Any other line is a guess, apart from `towns` (list what can be guessed)
/// and `reset` (start over).
pub async fn run<S, R, W>(game: &Game<S>, input: R, output: &mut W) -> std::io::Result<()>
where
    S: ReadingSource,
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let reference = game.with_session(GameSession::reference);

    writeln!(output, "Loading the air in {}...", reference.name)?;
    output.flush()?;

    let baseline = game.start_session().await;
    match baseline {
        Baseline::Known(pm25) => writeln!(output, "{}: {}", reference.name, describe(Some(pm25)))?,
        Baseline::Loading | Baseline::Unavailable => writeln!(
            output,
            "{}: No data. Every comparison will be unknown.",
            reference.name
        )?,
    }

    writeln!(
        output,
        "Which towns have worse air than {}? Guess one of:",
        reference.name
    )?;
    game.with_session(|session| print_candidates(session, output))?;

    let mut lines = input.lines();

    while let Some(line) = lines.next_line().await? {
        match line.trim() {
            "" => continue,
            "quit" => break,
            "towns" => game.with_session(|session| print_candidates(session, output))?,
            "reset" => {
                game.reset_session();
                writeln!(output, "Starting over.")?;
                game.with_session(|session| print_candidates(session, output))?;
            }
            town => {
                let unlocked_before = game.with_session(|session| session.unlocked().count());

                match game.submit_guess(town).await {
                    Ok(result) => {
                        writeln!(
                            output,
                            "{} {}",
                            describe(result.pm25()),
                            outcome_message(&result, reference.name)
                        )?;
                        game.clear_notification();

                        game.with_session(|session| -> std::io::Result<()> {
                            if session.unlocked().count() > unlocked_before {
                                let region = session.unlocked().last().unwrap_or(Region::first());
                                writeln!(output, "Unlocked {region}!")?;
                            }

                            if session.is_finished() {
                                print_summary(session, output)
                            } else {
                                writeln!(output, "{} guesses left.", session.guesses_left())
                            }
                        })?;
                    }
                    Err(rejection) => writeln!(output, "Can't guess that: {rejection}.")?,
                }
            }
        }

        output.flush()?;
    }

    Ok(())
}
