//! Core pipeline orchestration for songpress.
//!
//! Ties the provider fan-out, the merge oracle, the report parser, and the
//! document renderer into the end-to-end `publish` workflow.

pub mod pipeline;

pub use pipeline::{
    Delivery, FALLBACK_NOTICE, MISSING_CONTENT_MESSAGE, NOT_FOUND_MESSAGE, Outcome, publish,
};
