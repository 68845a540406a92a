#![forbid(unsafe_code)]
#![allow(missing_docs)]

//! Monitoring: Prometheus metrics and log subscriber setup.

pub mod logging;
pub mod metrics;
