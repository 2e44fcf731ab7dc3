//! Session resolution: trade a room identifier for its chat parameters.

use std::time::Duration;

use async_trait::async_trait;
use chat_protocol::RoomDescriptor;
use serde_json::Value;

use crate::error::ResolveError;

const RESOLVE_URL: &str = "https://live.sooplive.co.kr/afreeca/player_live_api.php";

/// Trades a room identifier for its `RoomDescriptor`, over whatever
/// transport an implementation chooses. The session state machine holds
/// one of these behind `Arc<dyn RoomResolver>` so its tests can inject a
/// canned resolver instead of making a real HTTP call.
#[async_trait]
pub trait RoomResolver: Send + Sync {
    async fn resolve(&self, room_id: &str) -> Result<RoomDescriptor, ResolveError>;
}

/// Production resolver: posts to the platform's live-status endpoint.
pub struct HttpResolver {
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpResolver {
    pub fn new(timeout: Duration) -> Self {
        HttpResolver {
            client: reqwest::Client::new(),
            timeout,
        }
    }
}

#[async_trait]
impl RoomResolver for HttpResolver {
    async fn resolve(&self, room_id: &str) -> Result<RoomDescriptor, ResolveError> {
        resolve(&self.client, room_id, self.timeout).await
    }
}

/// Resolve `room_id` into a `RoomDescriptor`.
///
/// Issues a form-encoded POST to the platform's live-status endpoint and
/// parses the `CHANNEL` object out of the JSON response. Missing string
/// fields default to `""`; missing numeric fields default to `0`.
/// `RESULT == 0` fails with `ResolveError::NotLive`.
pub async fn resolve(
    http: &reqwest::Client,
    room_id: &str,
    timeout: Duration,
) -> Result<RoomDescriptor, ResolveError> {
    let form: [(&str, &str); 10] = [
        ("bid", room_id),
        ("bno", ""),
        ("type", "live"),
        ("confirm_adult", "false"),
        ("player_type", "html5"),
        ("mode", "landing"),
        ("from_api", "0"),
        ("pwd", ""),
        ("stream_type", "common"),
        ("quality", "HD"),
    ];

    let response = http
        .post(RESOLVE_URL)
        .query(&[("bjid", room_id)])
        .form(&form)
        .timeout(timeout)
        .send()
        .await?
        .error_for_status()?;

    let body: Value = response.json().await?;
    let channel = body.get("CHANNEL").ok_or(ResolveError::InvalidShape)?;

    let result = channel_i64(channel, "RESULT");
    if result == 0 {
        return Err(ResolveError::NotLive);
    }

    Ok(RoomDescriptor {
        live: true,
        chat_host: channel_str(channel, "CHDOMAIN"),
        chat_port: channel_i64(channel, "CHPT") as u32,
        room_id: channel_str(channel, "CHATNO"),
        broadcaster_id: channel_str(channel, "BJID"),
        broadcaster_name: channel_str(channel, "BJNICK"),
        title: channel_str(channel, "TITLE"),
        geo_cc: channel_str(channel, "geo_cc"),
        geo_rc: channel_str(channel, "geo_rc"),
        accept_language: channel_str(channel, "acpt_lang"),
        service_language: channel_str(channel, "svc_lang"),
        quality_presets: channel
            .get("VIEWPRESET")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(|v| v.as_str().map(str::to_owned))
                    .collect()
            })
            .unwrap_or_default(),
    })
}

/// Read a field that may arrive as either a JSON string or a JSON number,
/// defaulting to `""` — the upstream API is not consistent about which.
fn channel_str(channel: &Value, field: &str) -> String {
    match channel.get(field) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

/// Read a field that may arrive as either a JSON number or a numeric
/// string, defaulting to `0`.
fn channel_i64(channel: &Value, field: &str) -> i64 {
    match channel.get(field) {
        Some(Value::Number(n)) => n.as_i64().unwrap_or(0),
        Some(Value::String(s)) => s.parse().unwrap_or(0),
        _ => 0,
    }
}
