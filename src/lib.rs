//! «Zemlya Prosto» — demonstration backend for a civic land-plot service.
//!
//! Users register land-plot boundaries (drawn, coordinate-based or
//! imported), attach attribute cards, browse a catalog of ready parcels,
//! generate document packages, drive a simple multi-stage approval process
//! and publish accepted plots to a public map layer. A scripted assistant
//! offers canned next-step hints.
//!
//! The crate is layered bottom-up: [`util`] (IDs) → [`store`] (concurrent
//! in-memory persistence behind the [`store::PlotStore`] trait) →
//! [`business`] / [`layer`] / [`assistant`] (pure helpers) → [`service`]
//! (use-case orchestration). The optional `server` feature adds the axum
//! HTTP boundary ([`api`]) and the `zemlya_server` binary; everything else
//! is plain in-process typed calls.

pub mod assistant;
pub mod business;
pub mod config;
pub mod error;
pub mod layer;
pub mod model;
pub mod service;
pub mod store;
pub mod util;
pub mod workflow;

#[cfg(feature = "server")]
pub mod api;

pub use error::{Error, Result};
pub use service::PlotService;
pub use store::{MemoryStore, PlotStore};
