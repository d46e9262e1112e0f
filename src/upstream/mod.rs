pub mod transport;

pub use transport::{HttpTransport, Transport};

use serde::de::{DeserializeOwned, Deserializer};
use serde::Deserialize;

use crate::error::{ExporterError, Result};

/// Placeholder substituted with the tick number in round-scoped URL templates.
pub const TICK_PLACEHOLDER: &str = "%d";

/// GET `url` through `transport` and decode the body as `T`.
///
/// No caching and no retry; callers go through a cache slot.
pub async fn fetch_document<T: DeserializeOwned>(transport: &dyn Transport, url: &str) -> Result<T> {
    let body = transport.get(url).await?;
    decode_document(url, &body)
}

/// Decode a fetched body, tagging failures with the URL it came from.
pub fn decode_document<T: DeserializeOwned>(url: &str, body: &[u8]) -> Result<T> {
    serde_json::from_slice(body).map_err(|source| ExporterError::Decode {
        url: url.to_string(),
        source,
    })
}

/// Field decoder that reads a JSON `null` as the type's default value.
///
/// Upstream emits `null` for empty strings and lists on optional fields.
pub fn nullable<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Expand a round URL template such as `.../scoreboard_round_%d.json`.
pub fn round_url(template: &str, tick: i64) -> String {
    template.replacen(TICK_PLACEHOLDER, &tick.to_string(), 1)
}
