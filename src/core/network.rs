use crate::assets::{ByteFetcher, FetchError};
use crate::game::platform::Platform;
use crate::game::stats::StatsSnapshot;
use log::{debug, info, warn};
use std::time::Duration;
use thiserror::Error;

const STATS_API_URL: &str = "https://api.gametools.network/bf6/stats/";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);
const STATS_MAX_BYTES: u64 = 10 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StatsError {
    #[error("请提供要查询的 EA ID。")]
    MissingPlayer,
    #[error("未知平台。可选：pc / ps / xbox。")]
    UnknownPlatform,
    #[error("未找到该玩家的战绩。")]
    NotFound,
    #[error("{0}")]
    Api(String),
    #[error("请求统计数据时出错。")]
    Request,
}

impl StatsError {
    fn api(message: &str) -> Self {
        let message = message.trim();
        if message.is_empty() {
            Self::Api("接口返回错误。".to_string())
        } else {
            Self::Api(message.to_string())
        }
    }
}

/// Shared agent for every outbound request. Non-2xx responses come back as
/// normal responses so their bodies can be inspected.
pub fn get_agent(timeout: Duration) -> ureq::Agent {
    ureq::Agent::config_builder()
        .timeout_global(Some(timeout))
        .http_status_as_error(false)
        .build()
        .into()
}

// --- Stats service ---

pub fn fetch_stats(player: &str, platform: Platform, lang: &str) -> Result<StatsSnapshot, StatsError> {
    let player = player.trim();
    if player.is_empty() {
        return Err(StatsError::MissingPlayer);
    }
    info!("Fetching stats for '{player}' on {platform}...");

    let agent = get_agent(REQUEST_TIMEOUT);
    let resp = agent
        .get(STATS_API_URL)
        .query("name", player)
        .query("platform", platform.api_code())
        .query("lang", lang)
        .call()
        .map_err(|e| {
            warn!("HTTP error fetching stats: {e}");
            StatsError::Request
        })?;

    let status = resp.status().as_u16();
    let body = resp
        .into_body()
        .with_config()
        .limit(STATS_MAX_BYTES)
        .read_to_string()
        .map_err(|e| {
            warn!("Failed to read stats response: {e}");
            StatsError::Request
        })?;
    interpret_response(status, &body)
}

/// Maps a raw stats response onto the command-level error taxonomy.
pub fn interpret_response(status: u16, body: &str) -> Result<StatsSnapshot, StatsError> {
    let parsed = if body.trim().is_empty() {
        None
    } else {
        match StatsSnapshot::from_json(body) {
            Ok(snap) => Some(snap),
            Err(e) => {
                debug!("Unparseable stats body (status {status}): {e}");
                None
            }
        }
    };
    let first_error = |snap: &StatsSnapshot| {
        snap.errors
            .as_ref()
            .and_then(|errs| errs.first())
            .map(|e| StatsError::api(e))
    };

    if !(200..300).contains(&status) {
        warn!("Stats service answered with HTTP {status}.");
        if let Some(err) = parsed.as_ref().and_then(first_error) {
            return Err(err);
        }
        return Err(if status == 404 {
            StatsError::NotFound
        } else {
            StatsError::Request
        });
    }

    let Some(snap) = parsed else {
        return Err(StatsError::NotFound);
    };
    if snap.has_results == Some(false) {
        return Err(StatsError::NotFound);
    }
    if let Some(err) = first_error(&snap) {
        return Err(err);
    }
    Ok(snap)
}

// --- Image bytes ---

/// `ByteFetcher` over a real HTTP agent.
pub struct UreqFetcher {
    agent: ureq::Agent,
}

impl UreqFetcher {
    pub fn new(timeout: Duration) -> Self {
        Self {
            agent: get_agent(timeout),
        }
    }
}

impl ByteFetcher for UreqFetcher {
    fn fetch(&self, url: &str, timeout: Duration, max_bytes: u64) -> Result<Vec<u8>, FetchError> {
        let resp = self
            .agent
            .get(url)
            .config()
            .timeout_global(Some(timeout))
            .build()
            .call()
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }
        resp.into_body()
            .with_config()
            .limit(max_bytes)
            .read_to_vec()
            .map_err(|e| match e {
                ureq::Error::BodyExceedsLimit(_) => FetchError::TooLarge { limit: max_bytes },
                other => FetchError::Transport(other.to_string()),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn successful_body_parses() {
        let snap = interpret_response(200, r#"{"userName":"Ghost","kills":"12"}"#).unwrap();
        assert_eq!(snap.user_name.as_deref(), Some("Ghost"));
        assert_eq!(snap.kills, Some(12.0));
    }

    #[test]
    fn missing_results_are_not_found() {
        assert_eq!(interpret_response(200, r#"{"hasResults":false}"#), Err(StatsError::NotFound));
        assert_eq!(interpret_response(200, ""), Err(StatsError::NotFound));
        assert_eq!(interpret_response(200, "<html>"), Err(StatsError::NotFound));
        assert_eq!(interpret_response(404, "not found"), Err(StatsError::NotFound));
    }

    #[test]
    fn service_errors_surface_their_first_message() {
        assert_eq!(
            interpret_response(200, r#"{"errors":["player is private","x"]}"#),
            Err(StatsError::Api("player is private".into()))
        );
        assert_eq!(
            interpret_response(422, r#"{"errors":["bad name"]}"#),
            Err(StatsError::Api("bad name".into()))
        );
        assert_eq!(
            interpret_response(200, r#"{"errors":[""]}"#).unwrap_err().to_string(),
            "接口返回错误。"
        );
    }

    #[test]
    fn other_failures_are_request_errors() {
        assert_eq!(interpret_response(500, "{}"), Err(StatsError::Request));
        assert_eq!(interpret_response(503, ""), Err(StatsError::Request));
    }

    #[test]
    fn blank_player_is_rejected_before_any_request() {
        assert_eq!(fetch_stats("  ", Platform::Pc, "zh-CN").unwrap_err(), StatsError::MissingPlayer);
    }
}
