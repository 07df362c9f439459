//! Daily AWS cost report notifier.
//!
//! A run subscribes the operator to a notification topic, waits until the
//! subscription is confirmed, then fetches the current cost figures, renders
//! them into an HTML report, stores the report and emails links to it.
//!
//! The pipeline only talks to trait objects ([`CostSource`],
//! [`ObjectStore`], [`NotificationChannel`], [`Sleeper`]), so every step
//! can be exercised without AWS.
//!
//! [`CostSource`]: estimator_cost::CostSource
//! [`ObjectStore`]: estimator_cloud::ObjectStore
//! [`NotificationChannel`]: estimator_notify::NotificationChannel

pub mod clock;
pub mod config;
pub mod pipeline;
pub mod subscription;

pub use clock::{Sleeper, TokioSleeper};
pub use config::{ConfigError, CostSourceConfig, NotifierConfig};
pub use pipeline::{
    dry_run, CostNotifier, Delivery, DryRunOutcome, PipelineSettings, RunError, RunOutcome,
};
pub use subscription::{
    ConfirmationError, ConfirmationPolicy, ConfirmationReport, SubscriptionWaiter,
};
