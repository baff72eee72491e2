#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Earthquake analytics engine.
//!
//! Pure, synchronous computations over events already loaded in memory:
//!
//! - [`risk`]: adaptive-radius proximity filter and risk classification
//! - [`cluster`]: greedy first-fit spatial clustering
//! - [`regions`]: per-region event counts via point-in-polygon
//! - [`summary`]: magnitude/depth averages for filtered searches
//!
//! None of these functions perform I/O or return errors. Callers fetch
//! candidates from storage and validate user input first.

pub mod cluster;
pub mod regions;
pub mod risk;
pub mod summary;

pub use cluster::{ClusterParams, cluster_events, greedy_clusters};
pub use regions::count_by_region;
pub use risk::{assess_risk, classify};
pub use summary::{round3, summarize};
