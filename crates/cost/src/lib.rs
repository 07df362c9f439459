//! AWS cost report model and cost sources.
//!
//! This crate owns the data that flows through a cost notification run:
//!
//! - [`CostReport`] - a flat mapping of named cost figures for the current
//!   billing period (absent fields read as zero)
//! - [`ReportLayout`] - an ordered table of [`CostField`] descriptors that
//!   decides which figures appear in a report and at what precision
//! - [`CostSource`] - the opaque collaborator that produces a report
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use estimator_cost::{CostSource, JsonFileSource, ReportLayout};
//!
//! let source = JsonFileSource::new("costs.json");
//! let report = source.get_total_cost().await?;
//!
//! for section in ReportLayout::standard().sections() {
//!     for field in &section.fields {
//!         println!("{}: {}", field.label, field.render_value(&report));
//!     }
//! }
//! ```
//!
//! ## Sources
//!
//! Cost computation is delegated. Two sources are provided:
//!
//! - [`JsonFileSource`] reads a JSON object from disk
//! - [`CommandSource`] runs an external pricing command and parses its stdout

pub mod report;
pub mod sources;

pub use report::{CostField, CostReport, CostSection, FieldFormat, ReportLayout, ReportLayoutBuilder};
pub use sources::{CommandSource, CostSource, CostSourceError, JsonFileSource};
