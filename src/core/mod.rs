//! The checkpoint engine: validators, board resolution, ticket rendering and
//! the per-app reconciler.
//!
//! Nothing in here talks to the network directly; probes, trackers and the
//! inventory are reached through the traits in [`validate`], [`ticket`] and
//! [`board`].

pub mod board;
pub mod config;
pub mod error;
pub mod model;
pub mod output;
pub mod reconcile;
pub mod render;
pub mod ticket;
pub mod validate;
