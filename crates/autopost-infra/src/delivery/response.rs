use serde::{de, Deserialize, Deserializer, Serialize};

/// Success body returned by the webhook.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookMessage {
    #[serde(default, deserialize_with = "snowflake")]
    pub id: Option<u64>,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub url: String,
    pub width: u32,
    pub height: u32,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub proxy_url: Option<String>,
}

/// Message ids exceed the precision of a JSON double, so servers send them as
/// strings. Plain numbers are accepted too.
fn snowflake<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(u64),
    }

    match Option::<Raw>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Raw::Number(n)) => Ok(Some(n)),
        Some(Raw::Text(s)) => s.parse().map(Some).map_err(de::Error::custom),
    }
}
