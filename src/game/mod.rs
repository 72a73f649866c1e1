//! The guessing game: find towns with worse air than the reference town.
//!
//! [`GameSession`] holds the rules and the state. [`Game`] drives a session
//! against a [`ReadingSource`], one guess at a time.

use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument};

use crate::towns::Town;

mod guess;
pub use guess::{GuessResult, Outcome};

mod session;
pub use session::{Baseline, GameSession, PendingGuess, Rejection, Settings};

mod source;
pub use source::{ProxySource, ReadingSource};

pub mod play;

#[cfg(test)]
mod fake;

#[derive(Debug, thiserror::Error, thisslime::TracingError)]
pub enum Error {
    #[error("couldn't build http client: {0}")]
    #[event(level = ERROR)]
    Client(#[from] reqwest::Error),

    #[error("invalid proxy url: {0}")]
    #[event(level = ERROR)]
    Url(#[from] url::ParseError),
}

#[derive(Debug)]
struct State {
    session: GameSession,
    /// Cancelled on reset. Replaced with a fresh token each time.
    cancel: CancellationToken,
}

/// Abandons its guess on drop unless the guess was completed.
struct GuessGuard<'g, S: ReadingSource> {
    game: &'g Game<S>,
    town: &'static Town,
    pending: Option<PendingGuess>,
}

impl<'g, S: ReadingSource> GuessGuard<'g, S> {
    fn new(game: &'g Game<S>, pending: PendingGuess) -> Self {
        Self {
            game,
            town: pending.town(),
            pending: Some(pending),
        }
    }

    fn complete(mut self, pm25: Option<f64>) -> Result<GuessResult, Rejection> {
        let pending = self.pending.take().ok_or(Rejection::Cancelled)?;
        self.game.state().session.complete_guess(pending, pm25)
    }
}

impl<S: ReadingSource> Drop for GuessGuard<'_, S> {
    fn drop(&mut self) {
        if let Some(pending) = self.pending.take() {
            debug!(town = self.town.name, "abandoning unfinished guess");
            self.game.state().session.abandon_guess(pending);
        }
    }
}

/// A session plus the source its readings come from.
#[derive(Debug)]
pub struct Game<S> {
    source: S,
    state: Mutex<State>,
}

impl<S: ReadingSource> Game<S> {
    pub fn new(source: S, settings: Settings) -> Self {
        Self {
            source,
            state: Mutex::new(State {
                session: GameSession::new(settings),
                cancel: CancellationToken::new(),
            }),
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Read-only access to the current session.
    pub fn with_session<T>(&self, f: impl FnOnce(&GameSession) -> T) -> T {
        f(&self.state().session)
    }

    /// Fetches the reference town's reading. Guesses are turned away until
    /// this finishes.
    #[instrument(skip(self))]
    pub async fn start_session(&self) -> Baseline {
        let reference = {
            let mut state = self.state();
            state.session.begin_baseline();
            state.session.reference()
        };

        let pm25 = self.source.reading(reference).await;

        let mut state = self.state();
        state.session.set_baseline(pm25);
        info!(town = reference.name, ?pm25, "baseline loaded");

        state.session.baseline()
    }

    /// Fetches a candidate's reading and records the guess.
    ///
    /// A reset while the fetch is running cancels it. The guess is then
    /// dropped without counting, as it is if this future is dropped.
    #[instrument(skip(self))]
    pub async fn submit_guess(&self, town: &str) -> Result<GuessResult, Rejection> {
        let (guard, cancel) = {
            let mut state = self.state();
            match state.session.begin_guess(town) {
                Ok(pending) => (GuessGuard::new(self, pending), state.cancel.clone()),
                Err(rejection) => {
                    info!(%rejection, "guess rejected");
                    return Err(rejection);
                }
            }
        };

        let pm25 = tokio::select! {
            biased;

            () = cancel.cancelled() => {
                info!("guess cancelled");
                return Err(Rejection::Cancelled);
            }

            pm25 = self.source.reading(guard.town) => pm25,
        };

        let result = guard.complete(pm25)?;
        info!(pm25 = ?result.pm25(), outcome = %result.outcome(), "guess recorded");

        Ok(result)
    }

    /// Starts over. Cancels any guess in flight; keeps the baseline.
    #[instrument(skip(self))]
    pub fn reset_session(&self) {
        let mut state = self.state();
        state.cancel.cancel();
        state.cancel = CancellationToken::new();
        state.session.reset();
        info!("session reset");
    }

    /// The latest guess, while it's still due to be shown.
    pub fn latest_notification(&self) -> Option<GuessResult> {
        self.state()
            .session
            .notification(Instant::now())
            .copied()
    }

    pub fn clear_notification(&self) {
        self.state().session.clear_notification();
    }
}

#[cfg(test)]
mod tests {
    use std::{sync::Arc, time::Duration};

    use pretty_assertions::assert_eq;
    use tokio::sync::Notify;

    use super::{fake::FakeSource, Baseline, Game, Outcome, Rejection, Settings};
    use crate::towns::Region;

    async fn started(source: FakeSource) -> Game<FakeSource> {
        let game = Game::new(source, Settings::default());
        game.start_session().await;
        game
    }

    #[tokio::test]
    async fn plays_a_round() {
        let game = started(FakeSource::new(&[
            ("Ennis", 25.0),
            ("Dublin", 40.0),
            ("Cork", 20.0),
        ]))
        .await;

        assert_eq!(game.with_session(|session| session.baseline()), Baseline::Known(25.0));

        let dublin = game.submit_guess("Dublin").await.expect("dublin is a candidate");
        assert_eq!(dublin.outcome(), Outcome::Worse);

        let cork = game.submit_guess("Cork").await.expect("cork is a candidate");
        assert_eq!(cork.outcome(), Outcome::NotWorse);

        // no reading for galway
        let galway = game.submit_guess("Galway").await.expect("galway is a candidate");
        assert_eq!(galway.outcome(), Outcome::Unknown);

        game.with_session(|session| {
            assert_eq!(session.score(), 1);
            assert_eq!(session.history().len(), 3);
            assert!(session.is_unlocked(Region::Uk));
        });
        assert_eq!(game.source().calls(), vec!["Ennis", "Dublin", "Cork", "Galway"]);
    }

    #[tokio::test]
    async fn missing_baseline() {
        let game = started(FakeSource::new(&[("Galway", 10.0)])).await;

        assert_eq!(game.with_session(|session| session.baseline()), Baseline::Unavailable);

        let galway = game.submit_guess("Galway").await.expect("galway is a candidate");
        assert_eq!(galway.outcome(), Outcome::Unknown);
        assert_eq!(galway.pm25(), Some(10.0));
    }

    #[tokio::test]
    async fn rejected_guess_makes_no_call() {
        let game = started(FakeSource::new(&[("Ennis", 25.0)])).await;

        let err = game.submit_guess("Tokyo").await.expect_err("tokyo starts locked");

        assert!(matches!(err, Rejection::Locked { .. }));
        assert_eq!(game.source().calls(), vec!["Ennis"]);
    }

    #[tokio::test]
    async fn one_guess_at_a_time() {
        let gate = Arc::new(Notify::new());
        let game = started(
            FakeSource::new(&[("Ennis", 25.0), ("Dublin", 40.0)]).gate("Dublin", gate.clone()),
        )
        .await;

        let (first, second) = tokio::join!(game.submit_guess("Dublin"), async {
            tokio::task::yield_now().await;
            let second = game.submit_guess("Cork").await;
            gate.notify_one();
            second
        });

        assert_eq!(first.expect("dublin should finish").pm25(), Some(40.0));
        assert_eq!(second.expect_err("dublin was in flight"), Rejection::InFlight);
        assert_eq!(game.with_session(|session| session.history().len()), 1);
    }

    #[tokio::test]
    async fn reset_cancels_guess_in_flight() {
        let gate = Arc::new(Notify::new());
        let game = started(
            FakeSource::new(&[("Ennis", 25.0), ("Dublin", 40.0), ("Cork", 30.0)])
                .gate("Dublin", gate),
        )
        .await;

        let (dublin, ()) = tokio::join!(game.submit_guess("Dublin"), async {
            tokio::task::yield_now().await;
            game.reset_session();
        });

        assert_eq!(dublin.expect_err("reset should cancel"), Rejection::Cancelled);
        game.with_session(|session| {
            assert!(session.history().is_empty());
            assert!(session.in_flight().is_none());
            assert_eq!(session.baseline(), Baseline::Known(25.0));
        });

        let cork = game.submit_guess("Cork").await.expect("session should still work");
        assert_eq!(cork.outcome(), Outcome::Worse);
    }

    #[tokio::test(start_paused = true)]
    async fn dropped_guess_frees_the_session() {
        let gate = Arc::new(Notify::new());
        let game = started(
            FakeSource::new(&[("Ennis", 25.0), ("Dublin", 40.0), ("Cork", 30.0)])
                .gate("Dublin", gate),
        )
        .await;

        tokio::time::timeout(Duration::from_millis(20), game.submit_guess("Dublin"))
            .await
            .expect_err("dublin is held back");

        game.with_session(|session| {
            assert!(session.in_flight().is_none());
            assert!(session.history().is_empty());
        });

        let cork = game.submit_guess("Cork").await.expect("session should not be stuck");
        assert_eq!(cork.outcome(), Outcome::Worse);
        assert_eq!(game.with_session(|session| session.history().len()), 1);
    }

    #[tokio::test]
    async fn reset_keeps_baseline_without_refetching() {
        let game = started(FakeSource::new(&[("Ennis", 25.0), ("Cork", 30.0)])).await;
        game.submit_guess("Cork").await.expect("cork is a candidate");

        game.reset_session();
        game.submit_guess("Cork").await.expect("cork can be guessed again");

        assert_eq!(game.source().calls(), vec!["Ennis", "Cork", "Cork"]);
        assert_eq!(game.with_session(|session| session.score()), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn notification_lasts_its_duration() {
        let game = started(FakeSource::new(&[("Ennis", 25.0), ("Cork", 20.0)])).await;
        game.submit_guess("Cork").await.expect("cork is a candidate");

        let latest = game.latest_notification().expect("cork was just guessed");
        assert_eq!(latest.name(), "Cork");

        tokio::time::advance(Duration::from_secs(2)).await;
        assert!(game.latest_notification().is_some());

        tokio::time::advance(Duration::from_secs(1)).await;
        assert!(game.latest_notification().is_none());
    }

    #[tokio::test]
    async fn notification_can_be_cleared() {
        let game = started(FakeSource::new(&[("Ennis", 25.0), ("Cork", 20.0)])).await;
        game.submit_guess("Cork").await.expect("cork is a candidate");

        game.clear_notification();

        assert!(game.latest_notification().is_none());
    }
}
