//! An in-memory reading source, for tests.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use tokio::sync::Notify;

use super::ReadingSource;
use crate::towns::Town;

#[derive(Default)]
pub struct FakeSource {
    readings: HashMap<&'static str, f64>,
    /// A town whose reading is held back until the gate opens.
    gated: Option<(&'static str, Arc<Notify>)>,
    calls: Mutex<Vec<&'static str>>,
}

impl FakeSource {
    pub fn new(readings: &[(&'static str, f64)]) -> Self {
        Self {
            readings: readings.iter().copied().collect(),
            ..Self::default()
        }
    }

    pub fn gate(mut self, town: &'static str, gate: Arc<Notify>) -> Self {
        self.gated = Some((town, gate));
        self
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().expect("lock should not be poisoned").clone()
    }
}

impl ReadingSource for FakeSource {
    async fn reading(&self, town: &'static Town) -> Option<f64> {
        self.calls
            .lock()
            .expect("lock should not be poisoned")
            .push(town.name);

        if let Some((gated, gate)) = &self.gated {
            if *gated == town.name {
                gate.notified().await;
            }
        }

        self.readings.get(town.name).copied()
    }
}
