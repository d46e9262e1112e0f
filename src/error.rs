use thiserror::Error;

/// Result type alias for exporter operations
pub type Result<T, E = ExporterError> = std::result::Result<T, E>;

/// Errors that can occur while fetching, joining or exporting scoreboard data
#[derive(Error, Debug)]
pub enum ExporterError {
    /// Upstream could not be reached, or answered with a non-success status.
    #[error("GET {url} failed: {reason}")]
    Fetch { url: String, reason: String },

    /// The body was not valid JSON or did not match the expected document shape.
    #[error("failed to decode {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Join(#[from] JoinError),

    #[error("{protocol} scoreboard does not expose {metric}")]
    Unsupported {
        protocol: &'static str,
        metric: &'static str,
    },
}

/// Inconsistencies found while stitching upstream documents together.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum JoinError {
    #[error("team {team} reports {scores} service scores but {names} service names are known")]
    ServiceCountMismatch {
        team: String,
        scores: usize,
        names: usize,
    },

    #[error("more than one series labelled team={team} service={service}")]
    DuplicateSeries { team: String, service: String },
}
