//! Email notification of cost reports.
//!
//! Reports reach the operator through a topic-based channel with a single
//! email subscriber. The subscriber has to confirm the subscription once,
//! by clicking the link in the confirmation email, before anything is
//! delivered.
//!
//! # Architecture
//!
//! - [`NotificationChannel`] trait defines topic creation, subscription,
//!   confirmation polling and publishing
//! - [`SnsChannel`] implements it on AWS SNS
//! - [`ReportNotice`] is the message sent once a run finishes

#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod channels;
pub mod error;
pub mod notice;

pub use channels::sns::SnsChannel;
pub use channels::{
    ConfirmationState, NotificationChannel, SubscriptionInfo, TopicHandle, PENDING_CONFIRMATION,
};
pub use error::ChannelError;
pub use notice::ReportNotice;
