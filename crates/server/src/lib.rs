//! HTTP front end for the document translation pipeline.

pub mod api;
pub mod metrics;
pub mod state;
