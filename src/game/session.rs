use std::time::Duration;

use tokio::time::Instant;

use super::guess::GuessResult;
use crate::towns::{Region, Town, TOWNS};

#[derive(Copy, Clone, Debug)]
pub struct Settings {
    /// The town every guess is compared against.
    pub reference: &'static Town,
    pub max_guesses: usize,
    /// How long the latest guess stays readable as a notification.
    pub notification_duration: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            reference: &TOWNS[0],
            max_guesses: 5,
            notification_duration: Duration::from_secs(3),
        }
    }
}

/// The reference town's reading.
#[derive(Copy, Clone, Debug, PartialEq, Default)]
pub enum Baseline {
    #[default]
    Loading,
    Known(f64),
    /// The fetch finished without a value. Every comparison is unknown.
    Unavailable,
}

impl Baseline {
    pub fn value(self) -> Option<f64> {
        match self {
            Self::Known(value) => Some(value),
            Self::Loading | Self::Unavailable => None,
        }
    }

    pub fn is_loading(self) -> bool {
        matches!(self, Self::Loading)
    }
}

impl From<Option<f64>> for Baseline {
    fn from(value: Option<f64>) -> Self {
        value.map_or(Self::Unavailable, Self::Known)
    }
}

/// Why a guess was turned away. A rejected guess changes nothing.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum Rejection {
    #[error("no guesses left")]
    Finished,

    #[error("{0} has already been guessed")]
    AlreadyGuessed(&'static str),

    #[error("already waiting on a guess")]
    InFlight,

    #[error("still loading the reference reading")]
    Loading,

    #[error("{0} can't be guessed")]
    NotACandidate(String),

    #[error("{town} is in {region}, which hasn't been unlocked yet")]
    Locked { town: &'static str, region: Region },

    #[error("the session was reset before the guess finished")]
    Cancelled,
}

/// Handed out when a guess starts, and given back when its reading arrives.
#[derive(Debug)]
#[must_use]
pub struct PendingGuess {
    town: &'static Town,
    generation: u64,
}

impl PendingGuess {
    pub fn town(&self) -> &'static Town {
        self.town
    }
}

#[derive(Copy, Clone, Debug)]
struct Notification {
    result: GuessResult,
    expires_at: Instant,
}

/// One player's game. Owns every piece of session state; nothing here
/// touches the network.
#[derive(Debug)]
pub struct GameSession {
    settings: Settings,
    baseline: Baseline,
    /// The last unlocked region. Every region before it is unlocked too.
    tier: Region,
    history: Vec<GuessResult>,
    score: usize,
    in_flight: Option<&'static Town>,
    /// Bumped on reset so completions from before it can be told apart.
    generation: u64,
    notification: Option<Notification>,
}

impl GameSession {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            baseline: Baseline::Loading,
            tier: Region::first(),
            history: Vec::with_capacity(settings.max_guesses),
            score: 0,
            in_flight: None,
            generation: 0,
            notification: None,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn reference(&self) -> &'static Town {
        self.settings.reference
    }

    pub fn baseline(&self) -> Baseline {
        self.baseline
    }

    pub fn history(&self) -> &[GuessResult] {
        &self.history
    }

    pub fn score(&self) -> usize {
        self.score
    }

    pub fn guesses_left(&self) -> usize {
        self.settings.max_guesses.saturating_sub(self.history.len())
    }

    pub fn is_finished(&self) -> bool {
        self.history.len() >= self.settings.max_guesses
    }

    pub fn in_flight(&self) -> Option<&'static Town> {
        self.in_flight
    }

    /// The regions a guess may come from, in unlock order.
    pub fn unlocked(&self) -> impl Iterator<Item = Region> + '_ {
        Region::ALL.into_iter().filter(|region| self.is_unlocked(*region))
    }

    pub fn is_unlocked(&self, region: Region) -> bool {
        region <= self.tier
    }

    /// Every town in an unlocked region, apart from the reference town.
    pub fn candidates(&self) -> impl Iterator<Item = &'static Town> + '_ {
        TOWNS.iter().filter(|town| {
            self.is_unlocked(town.region) && town.name != self.settings.reference.name
        })
    }

    pub fn has_guessed(&self, town: &Town) -> bool {
        self.history.iter().any(|guess| guess.name() == town.name)
    }

    pub fn begin_baseline(&mut self) {
        self.baseline = Baseline::Loading;
    }

    pub fn set_baseline(&mut self, pm25: Option<f64>) {
        self.baseline = Baseline::from(pm25);
    }

    /// Checks a guess and, if it's allowed, marks it as in flight.
    pub fn begin_guess(&mut self, name: &str) -> Result<PendingGuess, Rejection> {
        if self.is_finished() {
            return Err(Rejection::Finished);
        }

        if self.in_flight.is_some() {
            return Err(Rejection::InFlight);
        }

        if self.baseline.is_loading() {
            return Err(Rejection::Loading);
        }

        let town = Town::find(name)
            .filter(|town| town.name != self.settings.reference.name)
            .ok_or_else(|| Rejection::NotACandidate(name.to_owned()))?;

        if !self.is_unlocked(town.region) {
            return Err(Rejection::Locked {
                town: town.name,
                region: town.region,
            });
        }

        if self.has_guessed(town) {
            return Err(Rejection::AlreadyGuessed(town.name));
        }

        self.in_flight = Some(town);

        Ok(PendingGuess {
            town,
            generation: self.generation,
        })
    }

    /// Records the reading for a guess started with [`begin_guess`](Self::begin_guess).
    ///
    /// A failed fetch is recorded as a missing reading and still uses up a guess.
    pub fn complete_guess(
        &mut self,
        pending: PendingGuess,
        pm25: Option<f64>,
    ) -> Result<GuessResult, Rejection> {
        if pending.generation != self.generation {
            return Err(Rejection::Cancelled);
        }

        self.in_flight = None;

        let result = GuessResult::new(pending.town, pm25, self.baseline.value());
        self.history.push(result);

        if result.outcome().is_worse() {
            self.score += 1;
            if let Some(next) = self.tier.next() {
                self.tier = next;
            }
        }

        self.notification = Some(Notification {
            result,
            expires_at: Instant::now() + self.settings.notification_duration,
        });

        Ok(result)
    }

    /// Drops a guess that never got a reading. It doesn't count.
    pub fn abandon_guess(&mut self, pending: PendingGuess) {
        if pending.generation == self.generation {
            self.in_flight = None;
        }
    }

    /// Starts over with the same baseline. Any guess still in flight is
    /// forgotten, and its reading will be discarded when it arrives.
    pub fn reset(&mut self) {
        self.generation += 1;
        self.tier = Region::first();
        self.history.clear();
        self.score = 0;
        self.in_flight = None;
        self.notification = None;
    }

    /// The latest guess, until its display time has run out.
    pub fn notification(&self, now: Instant) -> Option<&GuessResult> {
        self.notification
            .as_ref()
            .filter(|notification| now < notification.expires_at)
            .map(|notification| &notification.result)
    }

    pub fn clear_notification(&mut self) {
        self.notification = None;
    }
}
