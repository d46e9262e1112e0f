//! Test doubles shared by the unit tests: an in-memory upstream and a clock
//! that only moves when told to.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::Mutex;

use crate::cache::Clock;
use crate::error::{ExporterError, Result};
use crate::upstream::Transport;

/// Serves canned bodies per URL and counts GETs.
#[derive(Default)]
pub struct StaticTransport {
    bodies: Mutex<HashMap<String, String>>,
    hits: Mutex<HashMap<String, usize>>,
}

impl StaticTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_body(self, url: &str, body: &str) -> Self {
        self.set_body(url, body);
        self
    }

    pub fn set_body(&self, url: &str, body: &str) {
        self.bodies
            .lock()
            .unwrap()
            .insert(url.to_string(), body.to_string());
    }

    pub fn remove(&self, url: &str) {
        self.bodies.lock().unwrap().remove(url);
    }

    pub fn hits(&self, url: &str) -> usize {
        self.hits.lock().unwrap().get(url).copied().unwrap_or(0)
    }

    pub fn total_hits(&self) -> usize {
        self.hits.lock().unwrap().values().sum()
    }
}

#[async_trait]
impl Transport for StaticTransport {
    async fn get(&self, url: &str) -> Result<Vec<u8>> {
        *self.hits.lock().unwrap().entry(url.to_string()).or_default() += 1;
        match self.bodies.lock().unwrap().get(url) {
            Some(body) => Ok(body.clone().into_bytes()),
            None => Err(ExporterError::Fetch {
                url: url.to_string(),
                reason: "upstream answered 404 Not Found".to_string(),
            }),
        }
    }
}

/// Clock pinned to a settable instant.
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new() -> Self {
        ManualClock {
            now: Mutex::new(DateTime::from_timestamp(1_700_000_000, 0).unwrap()),
        }
    }

    pub fn advance(&self, secs: i64) {
        *self.now.lock().unwrap() += Duration::seconds(secs);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}
