//! FAUST ctf-gameserver scoreboard, first generation.
//!
//! `scoreboard.json` carries the tick, team names and per-service scores;
//! `status.json` carries the service names.  The two are cached
//! independently.

pub mod models;

pub use models::{ScoreboardJson, StatusJson};

use async_trait::async_trait;
use std::sync::Arc;

use crate::cache::{CacheEntry, CacheSlot, Clock};
use crate::error::{ExporterError, Result};
use crate::scoreboard::{observe_rows, team_label, Exporter, MetricKind, Observation};
use crate::upstream::{fetch_document, Transport};

pub const PROTOCOL: &str = "faustv1";

const GAUGES: &[MetricKind] = &[
    MetricKind::Offense,
    MetricKind::Defense,
    MetricKind::Sla,
    MetricKind::Tick,
];

/// Resolved upstream document URLs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub scoreboard_url: String,
    pub status_url: String,
}

pub struct FaustV1Exporter {
    endpoints: Endpoints,
    transport: Arc<dyn Transport>,
    clock: Arc<dyn Clock>,
    scoreboard: CacheSlot<ScoreboardJson>,
    status: CacheSlot<StatusJson>,
}

impl FaustV1Exporter {
    pub fn new(endpoints: Endpoints, transport: Arc<dyn Transport>, clock: Arc<dyn Clock>) -> Self {
        FaustV1Exporter {
            endpoints,
            transport,
            clock,
            scoreboard: CacheSlot::new("scoreboard.json"),
            status: CacheSlot::new("status.json"),
        }
    }

    pub async fn scoreboard(&self) -> Result<CacheEntry<ScoreboardJson>> {
        let url = self.endpoints.scoreboard_url.as_str();
        self.scoreboard
            .get_or_refresh(self.clock.now(), (), || {
                fetch_document(self.transport.as_ref(), url)
            })
            .await
    }

    pub async fn status(&self) -> Result<CacheEntry<StatusJson>> {
        let url = self.endpoints.status_url.as_str();
        self.status
            .get_or_refresh(self.clock.now(), (), || {
                fetch_document(self.transport.as_ref(), url)
            })
            .await
    }

    /// The tick is embedded in the scoreboard document.
    pub async fn tick(&self) -> Result<i64> {
        Ok(self.scoreboard().await?.value.tick)
    }
}

#[async_trait]
impl Exporter for FaustV1Exporter {
    fn name(&self) -> &'static str {
        PROTOCOL
    }

    fn gauges(&self) -> &'static [MetricKind] {
        GAUGES
    }

    async fn observe(&self, kind: MetricKind) -> Result<Vec<Observation>> {
        match kind {
            MetricKind::Tick => Ok(vec![Observation::tick(self.tick().await?)]),
            MetricKind::Captures | MetricKind::Stolen => Err(ExporterError::Unsupported {
                protocol: PROTOCOL,
                metric: kind.metric_name(),
            }),
            MetricKind::Offense | MetricKind::Defense | MetricKind::Sla => {
                let scoreboard = self.scoreboard().await?;
                let status = self.status().await?;

                let names: Vec<&str> = status.value.services.iter().map(String::as_str).collect();
                let rows = scoreboard.value.teams.iter().map(|team| {
                    (
                        team_label(Some(team.name.as_str()), team.id),
                        team.services.as_slice(),
                    )
                });
                observe_rows(PROTOCOL, kind, &names, rows)
            }
        }
    }
}
