//! Core library for the company-unify data cleaning pipeline.
//!
//! Three business datasets (facebook, google, website) are normalised onto a
//! common schema, cleaned, checked for data quality, joined on their domain
//! name and consolidated into a single dataset. IO adapters live under
//! [`io`], the table representation in [`model`], the join in [`merge`], the
//! conflict resolution in [`consolidate`], and the stage orchestration in
//! [`pipeline`].

pub mod clean;
pub mod config;
pub mod consolidate;
pub mod distribution;
pub mod error;
pub mod io;
pub mod merge;
pub mod model;
pub mod normalize;
pub mod pipeline;
pub mod validate;

pub use error::{Result, ToolError};
