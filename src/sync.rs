//! Integration sync coordination.
//!
//! Every call walks `in_progress -> {success, failed}` on a persisted
//! [`IntegrationSyncAttempt`]. The `in_progress` row is written before the
//! provider is touched and the terminal update is written whatever the
//! provider did. Provider failures never escape: they come back as a failed
//! [`SyncResult`].
//!
//! Calls for the same integration are not serialized; each one gets its own
//! attempt row.

pub mod providers;

use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use time::OffsetDateTime;

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::gateway::Gateway;
use crate::model::{
    Integration, IntegrationSyncAttempt, NewSyncAttempt, SyncAttemptUpdate, SyncStatus, TestCase,
};

pub use providers::{
    BuiltinProviders, JIRA_BATCH_LIMIT, ProviderConfig, ProviderError, ProviderFactory,
    SyncProvider, TRELLO_BATCH_LIMIT,
};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SyncResult {
    pub success: bool,
    pub synced_count: usize,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SyncResult {
    fn succeeded(synced_count: usize, message: String) -> Self {
        Self {
            success: true,
            synced_count,
            message,
            error: None,
        }
    }

    fn failed(integration: &Integration, error: &ProviderError) -> Self {
        Self {
            success: false,
            synced_count: 0,
            message: if integration.name.is_empty() {
                format!("Sync with {} failed", integration.provider)
            } else {
                format!("Sync with {} failed", integration.name)
            },
            error: Some(error.to_string()),
        }
    }
}

#[derive(Clone)]
pub struct SyncCoordinator {
    gateway: Arc<dyn Gateway>,
    providers: Arc<dyn ProviderFactory>,
    timeout: Duration,
}

impl SyncCoordinator {
    pub fn new(gateway: Arc<dyn Gateway>, config: &Config) -> Self {
        Self {
            gateway,
            providers: Arc::new(BuiltinProviders),
            timeout: config.sync_timeout,
        }
    }

    pub fn with_providers(mut self, providers: Arc<dyn ProviderFactory>) -> Self {
        self.providers = providers;
        self
    }

    pub async fn sync_integration(
        &self,
        integration_id: &str,
        test_cases: &[TestCase],
    ) -> AppResult<SyncResult> {
        let integration = self
            .gateway
            .get_integration(integration_id)
            .await
            .map_err(AppError::from_gateway)?;

        let attempt = self
            .gateway
            .insert_sync_attempt(NewSyncAttempt {
                integration_id: integration.id.clone(),
            })
            .await
            .map_err(AppError::from_gateway)?;

        let result = match self.run_provider(&integration, test_cases).await {
            Ok((synced, message)) => SyncResult::succeeded(synced, message),
            Err(e) => {
                tracing::warn!(
                    "Sync {} for integration {} ({}) failed: {}",
                    attempt.id,
                    integration.id,
                    integration.provider,
                    e
                );
                SyncResult::failed(&integration, &e)
            }
        };

        let completed_at = OffsetDateTime::now_utc();
        let update = SyncAttemptUpdate {
            sync_status: if result.success {
                SyncStatus::Success
            } else {
                SyncStatus::Failed
            },
            items_synced: result.synced_count,
            completed_at,
            error_message: result.error.clone(),
        };
        if let Err(e) = self.gateway.update_sync_attempt(&attempt.id, update).await {
            tracing::error!(
                "Sync {} for integration {} finished but could not be recorded: {}",
                attempt.id,
                integration.id,
                e
            );
            return Err(AppError::from_gateway(e));
        }

        if let Err(e) = self
            .gateway
            .touch_integration(&integration.id, completed_at)
            .await
        {
            tracing::warn!(
                "Could not update last sync time of integration {}: {}",
                integration.id,
                e
            );
        }

        tracing::info!(
            "Sync {} for integration {} ({}): success={} synced={}",
            attempt.id,
            integration.id,
            integration.provider,
            result.success,
            result.synced_count
        );
        Ok(result)
    }

    /// Attempts for one integration, newest first.
    pub async fn sync_history(&self, integration_id: &str) -> AppResult<Vec<IntegrationSyncAttempt>> {
        self.gateway
            .get_integration(integration_id)
            .await
            .map_err(AppError::from_gateway)?;
        Ok(self.gateway.list_sync_attempts(integration_id).await?)
    }

    /// Runs the provider step on its own task so a panic or a hang stays inside it.
    async fn run_provider(
        &self,
        integration: &Integration,
        test_cases: &[TestCase],
    ) -> Result<(usize, String), ProviderError> {
        if !integration.is_active() {
            return Err(ProviderError::Inactive);
        }

        let provider = self.providers.build(integration)?;
        let kind = provider.kind();
        let cases = test_cases.to_vec();

        let handle = tokio::spawn(async move {
            let synced = provider.sync(&cases).await?;
            Ok::<_, ProviderError>((synced, provider.success_message(synced)))
        });
        let abort = handle.abort_handle();

        match tokio::time::timeout(self.timeout, handle).await {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(join_error)) => {
                tracing::error!("{} sync task failed: {}", kind, join_error);
                Err(ProviderError::Aborted { provider: kind })
            }
            Err(_) => {
                abort.abort();
                Err(ProviderError::Timeout {
                    provider: kind,
                    timeout: self.timeout,
                })
            }
        }
    }
}
