use clap::{Args, Parser, Subcommand};
use url::Url;

use crate::error::{ExporterError, Result};
use crate::faustv1;
use crate::faustv2;
use crate::upstream::{round_url, TICK_PLACEHOLDER};

/// Prometheus exporter for attack-defense CTF scoreboards
#[derive(Parser, Debug, Clone)]
#[command(name = "adctf-scoreboard-exporter", version, about)]
pub struct Config {
    /// Address to serve /metrics on
    #[arg(long, env = "LISTEN_ADDR", default_value = "0.0.0.0:5001", global = true)]
    pub listen_addr: String,

    /// Accept self-signed or otherwise invalid upstream TLS certificates
    #[arg(long, env = "INSECURE_SKIP_VERIFY", default_value = "false", global = true)]
    pub insecure_skip_verify: bool,

    /// Upstream request timeout in seconds
    #[arg(long, env = "HTTP_TIMEOUT_SECS", default_value = "10", global = true)]
    pub http_timeout_secs: u64,

    #[command(subcommand)]
    pub protocol: Protocol,
}

/// Which scoreboard generation the gameserver publishes.
#[derive(Subcommand, Debug, Clone)]
pub enum Protocol {
    /// FAUST ctf-gameserver scoreboard.json + status.json
    Faustv1(FaustV1Args),
    /// FAUST ctf-gameserver scoreboard-v2 documents
    Faustv2(FaustV2Args),
}

#[derive(Args, Debug, Clone)]
pub struct FaustV1Args {
    /// Where the ctf-gameserver is hosted, e.g. http://localhost:5101
    #[arg(long, env = "BASE_URL")]
    pub base_url: Option<String>,

    /// scoreboard.json URL, defaults to <base-url>/competition/scoreboard.json
    #[arg(long, env = "SCOREBOARD_URL")]
    pub scoreboard_url: Option<String>,

    /// status.json URL, defaults to <base-url>/competition/status.json
    #[arg(long, env = "STATUS_URL")]
    pub status_url: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct FaustV2Args {
    /// Where the ctf-gameserver is hosted, e.g. http://localhost:5101
    #[arg(long, env = "BASE_URL")]
    pub base_url: Option<String>,

    /// Tick pointer URL, defaults to <base-url>/competition/scoreboard-v2/scoreboard_current.json
    #[arg(long, env = "CURRENT_URL")]
    pub current_url: Option<String>,

    /// Round URL template with %d for the tick, defaults to
    /// <base-url>/competition/scoreboard-v2/scoreboard_round_%d.json
    #[arg(long, env = "ROUND_URL")]
    pub round_url: Option<String>,

    /// Team directory URL, defaults to <base-url>/competition/scoreboard-v2/scoreboard_teams.json
    #[arg(long, env = "TEAMS_URL")]
    pub teams_url: Option<String>,
}

impl Config {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.http_timeout_secs == 0 {
            anyhow::bail!("http_timeout_secs must be positive");
        }
        match &self.protocol {
            Protocol::Faustv1(args) => args.endpoints().map(|_| ())?,
            Protocol::Faustv2(args) => args.endpoints().map(|_| ())?,
        }
        Ok(())
    }
}

impl FaustV1Args {
    pub fn endpoints(&self) -> Result<faustv1::Endpoints> {
        let base = self.base_url.as_deref();
        let scoreboard_url = resolve(
            "--scoreboard-url",
            self.scoreboard_url.as_deref(),
            base,
            "/competition/scoreboard.json",
        )?;
        let status_url = resolve(
            "--status-url",
            self.status_url.as_deref(),
            base,
            "/competition/status.json",
        )?;

        check_url(&scoreboard_url)?;
        check_url(&status_url)?;
        Ok(faustv1::Endpoints {
            scoreboard_url,
            status_url,
        })
    }
}

impl FaustV2Args {
    pub fn endpoints(&self) -> Result<faustv2::Endpoints> {
        let base = self.base_url.as_deref();
        let current_url = resolve(
            "--current-url",
            self.current_url.as_deref(),
            base,
            "/competition/scoreboard-v2/scoreboard_current.json",
        )?;
        let round_template = resolve(
            "--round-url",
            self.round_url.as_deref(),
            base,
            "/competition/scoreboard-v2/scoreboard_round_%d.json",
        )?;
        let teams_url = resolve(
            "--teams-url",
            self.teams_url.as_deref(),
            base,
            "/competition/scoreboard-v2/scoreboard_teams.json",
        )?;

        if round_template.matches(TICK_PLACEHOLDER).count() != 1 {
            return Err(ExporterError::Config(format!(
                "round URL {} must contain exactly one {} placeholder for the tick",
                round_template, TICK_PLACEHOLDER
            )));
        }

        check_url(&current_url)?;
        check_url(&round_url(&round_template, 0))?;
        check_url(&teams_url)?;
        Ok(faustv2::Endpoints {
            current_url,
            round_url: round_template,
            teams_url,
        })
    }
}

/// Explicit URL wins; otherwise derive it from the base URL.
fn resolve(flag: &str, explicit: Option<&str>, base: Option<&str>, path: &str) -> Result<String> {
    let explicit = explicit.map(str::trim).filter(|s| !s.is_empty());
    let base = base.map(str::trim).filter(|s| !s.is_empty());
    match (explicit, base) {
        (Some(url), _) => Ok(url.to_string()),
        (None, Some(base)) => Ok(format!("{}{}", base.trim_end_matches('/'), path)),
        (None, None) => Err(ExporterError::Config(format!(
            "set --base-url, or set {} explicitly",
            flag
        ))),
    }
}

fn check_url(raw: &str) -> Result<()> {
    let url = Url::parse(raw)
        .map_err(|e| ExporterError::Config(format!("invalid upstream URL {}: {}", raw, e)))?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(ExporterError::Config(format!(
            "unsupported scheme {} in upstream URL {}",
            other, raw
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Config {
        Config::try_parse_from(std::iter::once("adctf-scoreboard-exporter").chain(args.iter().copied()))
            .unwrap()
    }

    #[test]
    fn test_v1_urls_derive_from_base() {
        let config = parse(&["faustv1", "--base-url", "http://gs:5101/"]);
        let Protocol::Faustv1(args) = &config.protocol else {
            panic!("expected faustv1");
        };
        assert_eq!(
            args.endpoints().unwrap(),
            faustv1::Endpoints {
                scoreboard_url: "http://gs:5101/competition/scoreboard.json".to_string(),
                status_url: "http://gs:5101/competition/status.json".to_string(),
            }
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_v2_explicit_urls_override_base() {
        let config = parse(&[
            "faustv2",
            "--base-url",
            "http://gs",
            "--round-url",
            "http://mirror/rounds/%d.json",
        ]);
        let Protocol::Faustv2(args) = &config.protocol else {
            panic!("expected faustv2");
        };
        let endpoints = args.endpoints().unwrap();
        assert_eq!(endpoints.round_url, "http://mirror/rounds/%d.json");
        assert_eq!(
            endpoints.current_url,
            "http://gs/competition/scoreboard-v2/scoreboard_current.json"
        );
        assert_eq!(
            endpoints.teams_url,
            "http://gs/competition/scoreboard-v2/scoreboard_teams.json"
        );
    }

    #[test]
    fn test_v2_without_base_needs_every_url() {
        let config = parse(&[
            "faustv2",
            "--current-url",
            "http://gs/current.json",
            "--round-url",
            "http://gs/round_%d.json",
        ]);
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("--teams-url"), "{}", err);
    }

    #[test]
    fn test_no_urls_at_all_is_a_config_error() {
        let args = FaustV1Args {
            base_url: None,
            scoreboard_url: None,
            status_url: None,
        };
        assert!(matches!(args.endpoints(), Err(ExporterError::Config(_))));
    }

    #[test]
    fn test_round_template_requires_placeholder() {
        let args = FaustV2Args {
            base_url: None,
            current_url: Some("http://gs/current.json".to_string()),
            round_url: Some("http://gs/round.json".to_string()),
            teams_url: Some("http://gs/teams.json".to_string()),
        };
        assert!(matches!(args.endpoints(), Err(ExporterError::Config(_))));
    }

    #[test]
    fn test_non_http_url_is_rejected() {
        let args = FaustV1Args {
            base_url: Some("ftp://gs".to_string()),
            scoreboard_url: None,
            status_url: None,
        };
        assert!(matches!(args.endpoints(), Err(ExporterError::Config(_))));
    }

    #[test]
    fn test_global_flags_defaults() {
        let config = parse(&["faustv1", "--base-url", "http://gs"]);
        assert_eq!(config.listen_addr, "0.0.0.0:5001");
        assert!(!config.insecure_skip_verify);
        assert_eq!(config.http_timeout_secs, 10);

        let config = parse(&["--insecure-skip-verify", "faustv2", "--base-url", "https://gs"]);
        assert!(config.insecure_skip_verify);
    }
}
