//! Provider-specific sync steps.
//!
//! Each supported provider gets its own typed configuration, parsed out of the
//! integration's free-form config map, and its own [`SyncProvider`]. The wire
//! formats of the real third-party APIs are not pinned down yet, so the steps
//! build their payloads and hand them to the log instead of a network client.

use async_trait::async_trait;
use serde::de::{self, Unexpected};
use serde::{Deserialize, Deserializer};
use serde_json::json;
use std::collections::BTreeMap;
use std::time::Duration;
use thiserror::Error;

use crate::model::{ConfigMap, Integration, ProviderKind, TestCase};

/// Most issues pushed to Jira in one sync
pub const JIRA_BATCH_LIMIT: usize = 10;
/// Most cards pushed to Trello in one sync
pub const TRELLO_BATCH_LIMIT: usize = 8;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProviderError {
    #[error("Unsupported provider")]
    Unsupported(ProviderKind),

    #[error("Integration is inactive")]
    Inactive,

    #[error("Invalid {provider} configuration: {message}")]
    Config {
        provider: ProviderKind,
        message: String,
    },

    #[error("{provider} rejected the sync: {message}")]
    Rejected {
        provider: ProviderKind,
        message: String,
    },

    #[error("{provider} sync timed out after {timeout:?}")]
    Timeout {
        provider: ProviderKind,
        timeout: Duration,
    },

    #[error("{provider} sync step aborted unexpectedly")]
    Aborted { provider: ProviderKind },
}

/// Reads a config value as text. Numbers and booleans are stringified; arrays
/// and objects are rejected.
fn scalar_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        serde_json::Value::Bool(b) => Ok(b.to_string()),
        serde_json::Value::Null => Err(de::Error::invalid_type(Unexpected::Unit, &"a scalar")),
        serde_json::Value::Array(_) => Err(de::Error::invalid_type(Unexpected::Seq, &"a scalar")),
        serde_json::Value::Object(_) => Err(de::Error::invalid_type(Unexpected::Map, &"a scalar")),
    }
}

fn optional_scalar_string<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<String>, D::Error> {
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Null => Ok(None),
        value => scalar_string(value).map(Some).map_err(de::Error::custom),
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct JiraConfig {
    #[serde(default, deserialize_with = "optional_scalar_string")]
    pub url: Option<String>,
    #[serde(default = "default_project_key", deserialize_with = "scalar_string")]
    pub project_key: String,
    #[serde(default = "default_issue_type", deserialize_with = "scalar_string")]
    pub issue_type: String,
}

fn default_project_key() -> String {
    "TEST".to_string()
}

fn default_issue_type() -> String {
    "Task".to_string()
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TrelloConfig {
    #[serde(default, deserialize_with = "optional_scalar_string")]
    pub board_id: Option<String>,
    #[serde(default = "default_list_name", deserialize_with = "scalar_string")]
    pub list_name: String,
}

fn default_list_name() -> String {
    "To Do".to_string()
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SlackConfig {
    #[serde(default = "default_channel", deserialize_with = "scalar_string")]
    pub channel: String,
    #[serde(default, deserialize_with = "optional_scalar_string")]
    pub webhook_url: Option<String>,
}

fn default_channel() -> String {
    "#testing".to_string()
}

/// Provider selection with the configuration each provider needs.
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderConfig {
    Jira(JiraConfig),
    Trello(TrelloConfig),
    Slack(SlackConfig),
    Unsupported(ProviderKind),
}

fn parse_config<T: for<'de> Deserialize<'de>>(
    provider: ProviderKind,
    config: &ConfigMap,
) -> Result<T, ProviderError> {
    serde_json::from_value(serde_json::Value::Object(config.clone())).map_err(|e| {
        ProviderError::Config {
            provider,
            message: e.to_string(),
        }
    })
}

impl ProviderConfig {
    pub fn from_integration(integration: &Integration) -> Result<Self, ProviderError> {
        let provider = integration.provider;
        let config = &integration.config;
        Ok(match provider {
            ProviderKind::Jira => ProviderConfig::Jira(parse_config(provider, config)?),
            ProviderKind::Trello => ProviderConfig::Trello(parse_config(provider, config)?),
            ProviderKind::Slack => ProviderConfig::Slack(parse_config(provider, config)?),
            ProviderKind::Testrail
            | ProviderKind::Github
            | ProviderKind::Gitlab
            | ProviderKind::Jenkins
            | ProviderKind::Other => ProviderConfig::Unsupported(provider),
        })
    }
}

#[async_trait]
pub trait SyncProvider: Send + Sync {
    fn kind(&self) -> ProviderKind;

    /// Pushes `test_cases` to the provider and returns how many items it took.
    async fn sync(&self, test_cases: &[TestCase]) -> Result<usize, ProviderError>;

    fn success_message(&self, synced: usize) -> String {
        format!("Synced {} test cases to {}", synced, self.kind())
    }
}

/// Builds the provider step for an integration.
pub trait ProviderFactory: Send + Sync {
    fn build(&self, integration: &Integration) -> Result<Box<dyn SyncProvider>, ProviderError>;
}

/// Jira, Trello and Slack.
#[derive(Debug, Default, Clone, Copy)]
pub struct BuiltinProviders;

impl ProviderFactory for BuiltinProviders {
    fn build(&self, integration: &Integration) -> Result<Box<dyn SyncProvider>, ProviderError> {
        match ProviderConfig::from_integration(integration)? {
            ProviderConfig::Jira(config) => Ok(Box::new(JiraProvider { config })),
            ProviderConfig::Trello(config) => Ok(Box::new(TrelloProvider { config })),
            ProviderConfig::Slack(config) => Ok(Box::new(SlackProvider { config })),
            ProviderConfig::Unsupported(kind) => Err(ProviderError::Unsupported(kind)),
        }
    }
}

pub struct JiraProvider {
    config: JiraConfig,
}

#[async_trait]
impl SyncProvider for JiraProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Jira
    }

    async fn sync(&self, test_cases: &[TestCase]) -> Result<usize, ProviderError> {
        let issues: Vec<serde_json::Value> = test_cases
            .iter()
            .take(JIRA_BATCH_LIMIT)
            .map(|case| {
                json!({
                    "fields": {
                        "project": { "key": self.config.project_key },
                        "issuetype": { "name": self.config.issue_type },
                        "summary": format!("[{}] {}", case.id, case.title),
                        "description": case.description.clone().unwrap_or_default(),
                        "labels": ["testdeck", case.test_type.as_str(), case.status.as_str()],
                    }
                })
            })
            .collect();

        tracing::debug!(
            "Jira bulk create for {} on {}: {}",
            self.config.project_key,
            self.config.url.as_deref().unwrap_or("<unset>"),
            json!({ "issueUpdates": issues })
        );
        Ok(issues.len())
    }

    fn success_message(&self, synced: usize) -> String {
        format!(
            "Synced {} test cases to Jira project {}",
            synced, self.config.project_key
        )
    }
}

pub struct TrelloProvider {
    config: TrelloConfig,
}

#[async_trait]
impl SyncProvider for TrelloProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Trello
    }

    async fn sync(&self, test_cases: &[TestCase]) -> Result<usize, ProviderError> {
        let cards: Vec<serde_json::Value> = test_cases
            .iter()
            .take(TRELLO_BATCH_LIMIT)
            .map(|case| {
                json!({
                    "name": case.title,
                    "desc": case.expected_result.clone().unwrap_or_default(),
                    "idBoard": self.config.board_id,
                    "list": self.config.list_name,
                })
            })
            .collect();

        tracing::debug!("Trello cards for list {}: {:?}", self.config.list_name, cards);
        Ok(cards.len())
    }

    fn success_message(&self, synced: usize) -> String {
        format!(
            "Created {} Trello cards in {}",
            synced, self.config.list_name
        )
    }
}

pub struct SlackProvider {
    config: SlackConfig,
}

impl SlackProvider {
    fn summary(&self, test_cases: &[TestCase]) -> String {
        let mut by_status: BTreeMap<&'static str, usize> = BTreeMap::new();
        for case in test_cases {
            *by_status.entry(case.status.as_str()).or_insert(0) += 1;
        }
        let breakdown: Vec<String> = by_status
            .iter()
            .map(|(status, count)| format!("{}: {}", status, count))
            .collect();
        format!(
            "Test summary: {} test cases ({})",
            test_cases.len(),
            if breakdown.is_empty() {
                "none".to_string()
            } else {
                breakdown.join(", ")
            }
        )
    }
}

#[async_trait]
impl SyncProvider for SlackProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Slack
    }

    /// Always one item: the summary message.
    async fn sync(&self, test_cases: &[TestCase]) -> Result<usize, ProviderError> {
        let message = json!({
            "channel": self.config.channel,
            "text": self.summary(test_cases),
        });
        tracing::debug!("Slack message: {}", message);
        Ok(1)
    }

    fn success_message(&self, _synced: usize) -> String {
        format!("Sent test summary to Slack channel {}", self.config.channel)
    }
}
