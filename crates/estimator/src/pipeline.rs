//! Cost report pipeline - orchestrates subscribe, fetch, render, store and notify.
//!
//! Failure handling per step:
//!
//! | Step | On failure |
//! |------|-----------|
//! | ensure subscription | fatal |
//! | fetch costs | fatal, nothing downstream runs |
//! | render | cannot fail |
//! | local write | logged, run continues |
//! | upload | degraded: notify without links |
//! | access URLs | fatal, nothing is published |
//! | publish | logged, outcome unchanged |

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use estimator_cloud::{AccessUrl, ReportStore, StoreError, StoreOutcome};
use estimator_cost::{CostReport, CostSource, CostSourceError, ReportLayout};
use estimator_notify::{ChannelError, NotificationChannel, ReportNotice, TopicHandle};
use estimator_report::{render_preview, HtmlRenderer, RenderedReport};
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::clock::{Sleeper, TokioSleeper};
use crate::config::{self, NotifierConfig};
use crate::subscription::{ConfirmationError, ConfirmationPolicy, SubscriptionWaiter};

/// Errors that abort a run before any notification is published.
#[derive(Debug, Error)]
pub enum RunError {
    /// Topic creation or subscription request failed.
    #[error("Subscription setup failed: {0}")]
    Subscription(#[source] ChannelError),

    /// The recipient never confirmed, or the wait was interrupted.
    #[error(transparent)]
    Confirmation(#[from] ConfirmationError),

    /// Cost figures could not be fetched.
    #[error("Failed to fetch cost figures: {0}")]
    CostFetch(#[from] CostSourceError),

    /// The report was stored but no access link could be produced.
    #[error("Failed to generate access URL: {0}")]
    AccessUrl(#[source] StoreError),

    /// A dry run could not save its local copy.
    #[error("Failed to write report to {}: {source}", .path.display())]
    LocalWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl RunError {
    /// Process exit code for this failure class.
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::CostFetch(_) => 3,
            Self::AccessUrl(_) => 4,
            Self::Subscription(_) | Self::Confirmation(_) => 5,
            Self::LocalWrite { .. } => 1,
        }
    }
}

/// How the report reached the recipient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    /// Report stored and linked from the notification.
    Delivered {
        view: AccessUrl,
        download: AccessUrl,
        /// Whether the bucket-owner ACL was applied on upload.
        acl_applied: bool,
    },
    /// Upload failed; the notification carries no link.
    Degraded { reason: String },
}

/// Result of a completed run.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub delivery: Delivery,
    /// Whether the notification was accepted by the channel.
    pub notified: bool,
    pub topic: TopicHandle,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl RunOutcome {
    /// Process exit code: 0 when delivered with links, 2 when degraded.
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        match self.delivery {
            Delivery::Delivered { .. } => 0,
            Delivery::Degraded { .. } => 2,
        }
    }
}

/// Settings the pipeline needs beyond its collaborators.
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    /// Topic to create or reuse.
    pub topic_name: String,
    /// Recipient email address.
    pub email: String,
    /// Object key of the stored report.
    pub report_key: String,
    /// Local copy of the rendered report.
    pub local_file: PathBuf,
    /// Report sections and precisions.
    pub layout: ReportLayout,
    /// Confirmation polling policy.
    pub confirmation: ConfirmationPolicy,
}

impl PipelineSettings {
    /// Derive settings from a validated configuration.
    pub fn from_config(config: &NotifierConfig) -> Result<Self, config::ConfigError> {
        config.validate()?;
        Ok(Self {
            topic_name: config.topic_name.clone(),
            email: config.recipient()?.to_string(),
            report_key: config.report_key.clone(),
            local_file: config.local_file.clone(),
            layout: config.layout(),
            confirmation: config.confirmation_policy(),
        })
    }
}

/// Cost report pipeline orchestrator.
pub struct CostNotifier {
    settings: PipelineSettings,
    source: Arc<dyn CostSource>,
    renderer: HtmlRenderer,
    store: ReportStore,
    channel: Arc<dyn NotificationChannel>,
    sleeper: Arc<dyn Sleeper>,
    cancel: CancellationToken,
}

impl CostNotifier {
    /// Create a pipeline sleeping on the tokio timer.
    #[must_use]
    pub fn new(
        settings: PipelineSettings,
        source: Arc<dyn CostSource>,
        store: ReportStore,
        channel: Arc<dyn NotificationChannel>,
    ) -> Self {
        Self {
            renderer: HtmlRenderer::new(settings.layout.clone()),
            settings,
            source,
            store,
            channel,
            sleeper: Arc::new(TokioSleeper),
            cancel: CancellationToken::new(),
        }
    }

    /// Replace the sleeper used between confirmation checks.
    #[must_use]
    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    /// Use a cancellation token to interrupt the confirmation wait.
    #[must_use]
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Run the pipeline once.
    pub async fn run(&self) -> Result<RunOutcome, RunError> {
        let started_at = Utc::now();
        info!(
            topic = %self.settings.topic_name,
            report_key = %self.settings.report_key,
            "Starting cost report run"
        );

        let topic = self.ensure_subscription().await?;

        let report = match self.source.get_total_cost().await {
            Ok(report) => report,
            Err(e) => {
                error!(source = self.source.name(), error = %e, "Cost fetch failed, aborting run");
                return Err(RunError::CostFetch(e));
            }
        };
        if report.is_empty() {
            warn!(source = self.source.name(), "Cost source returned no figures, report shows zeros");
        } else {
            debug!(source = self.source.name(), fields = report.len(), "Cost figures fetched");
        }

        let (html, preview) = draft_report(&self.renderer, &report);
        for line in preview.lines() {
            info!("{line}");
        }
        let rendered = RenderedReport::new(
            self.settings.local_file.display().to_string(),
            self.settings.report_key.clone(),
            html,
        );

        if let Err(e) = write_local_copy(&self.settings.local_file, &rendered.html).await {
            warn!(path = %rendered.file_name, error = %e, "Failed to save report locally");
        }

        let delivery = match self.store.store(&rendered.storage_key, &rendered.html).await {
            StoreOutcome::Stored { acl_applied } => {
                self.obtain_access(&rendered.storage_key, acl_applied)
                    .await?
            }
            StoreOutcome::Failed(e) => {
                warn!(error = %e, "Skipping report links in notification due to upload failure");
                Delivery::Degraded {
                    reason: e.to_string(),
                }
            }
        };

        let notified = self.notify(&topic, &delivery).await;

        let outcome = RunOutcome {
            delivery,
            notified,
            topic,
            started_at,
            finished_at: Utc::now(),
        };
        info!(
            exit_code = outcome.exit_code(),
            notified = outcome.notified,
            elapsed_ms = (outcome.finished_at - outcome.started_at).num_milliseconds(),
            "Cost report run finished"
        );
        Ok(outcome)
    }

    /// Create the topic, subscribe the recipient and wait for confirmation.
    async fn ensure_subscription(&self) -> Result<TopicHandle, RunError> {
        let topic = self
            .channel
            .ensure_topic(&self.settings.topic_name)
            .await
            .map_err(RunError::Subscription)?;

        self.channel
            .subscribe(&topic, &self.settings.email)
            .await
            .map_err(RunError::Subscription)?;

        let waiter = SubscriptionWaiter::new(
            Arc::clone(&self.channel),
            Arc::clone(&self.sleeper),
            self.settings.confirmation,
            self.cancel.clone(),
        );
        waiter.wait_confirmed(&topic).await?;

        Ok(topic)
    }

    /// Mint the view and download links for a stored report.
    async fn obtain_access(&self, key: &str, acl_applied: bool) -> Result<Delivery, RunError> {
        let view = self.store.access_url(key, false).await.map_err(|e| {
            error!(key = %key, error = %e, "Failed to generate view URL, aborting run");
            RunError::AccessUrl(e)
        })?;

        let download = self.store.access_url(key, true).await.map_err(|e| {
            error!(key = %key, error = %e, "Failed to generate download URL, aborting run");
            RunError::AccessUrl(e)
        })?;

        Ok(Delivery::Delivered {
            view,
            download,
            acl_applied,
        })
    }

    /// Publish the final notice. Failures are logged and reported as `false`.
    async fn notify(&self, topic: &TopicHandle, delivery: &Delivery) -> bool {
        let notice = match delivery {
            Delivery::Delivered { view, download, .. } => ReportNotice::Available {
                view_url: view.url.clone(),
                download_url: download.url.clone(),
                sections: self
                    .settings
                    .layout
                    .section_titles()
                    .into_iter()
                    .map(ToString::to_string)
                    .collect(),
                valid_for_minutes: view.expires_in.as_secs() / 60,
            },
            Delivery::Degraded { .. } => ReportNotice::UploadFailed,
        };

        match self
            .channel
            .publish(topic, notice.subject(), &notice.body())
            .await
        {
            Ok(message_id) => {
                info!(
                    channel = self.channel.name(),
                    message_id = %message_id,
                    with_links = notice.has_links(),
                    "Report notification sent"
                );
                true
            }
            Err(e) => {
                error!(channel = self.channel.name(), error = %e, "Failed to publish report notification");
                false
            }
        }
    }
}

/// Result of a dry run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DryRunOutcome {
    /// Console preview of the rendered report.
    pub preview: String,
    /// Where the HTML copy was written.
    pub local_file: PathBuf,
}

/// Fetch and render a report and save it locally without storing or
/// notifying anything.
pub async fn dry_run(
    source: &dyn CostSource,
    layout: ReportLayout,
    local_file: &Path,
) -> Result<DryRunOutcome, RunError> {
    let report = source.get_total_cost().await?;
    let renderer = HtmlRenderer::new(layout);
    let (html, preview) = draft_report(&renderer, &report);

    write_local_copy(local_file, &html)
        .await
        .map_err(|e| RunError::LocalWrite {
            path: local_file.to_path_buf(),
            source: e,
        })?;

    info!(path = %local_file.display(), source = source.name(), "Dry run complete");
    Ok(DryRunOutcome {
        preview,
        local_file: local_file.to_path_buf(),
    })
}

/// Render the HTML document and its console preview.
fn draft_report(renderer: &HtmlRenderer, report: &CostReport) -> (String, String) {
    (
        renderer.render(report),
        render_preview(renderer.layout(), report),
    )
}

/// Write the local copy, creating parent directories as needed.
async fn write_local_copy(path: &Path, html: &str) -> std::io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, html.as_bytes()).await?;
    info!(path = %path.display(), "Report saved locally");
    Ok(())
}
