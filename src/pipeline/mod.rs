//! Derived-metric computation and weekly aggregation.
//!
//! This module takes cleaned sensor readings, derives the per-reading
//! efficiency ratio, groups readings into per-source calendar-week buckets,
//! and ranks sources by total aggregated output. Every stage consumes an
//! immutable input and produces a new value; nothing here touches I/O.

pub mod aggregate;
pub mod rank;
pub mod transform;
pub mod types;
pub mod utility;
