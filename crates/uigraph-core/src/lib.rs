//! Core model for uigraph.
//!
//! This crate provides the node model used to explore an application's UI as
//! a graph of abstract states connected by actions. It's used by the `uigraph`
//! CLI and can be embedded by any exploration driver.
//!
//! # Modules
//!
//! - [`hash`]: content hashing, hash combination and hash-derived ordering
//! - [`geometry`]: points, rectangles and the shared zero rectangle
//! - [`priority`]: priority capability and the action queue
//! - [`node`]: publish-once ids and visit counters
//! - [`widget`], [`state`], [`action`]: the concrete graph nodes
//! - [`graph`]: the registry of admitted states and indexed actions
//! - [`config`]: state-abstraction switches
//! - [`error`]: model error types with actionable suggestions
//! - [`util`]: string, JSON, time and randomness helpers
//!
//! # Identity
//!
//! Every node is content-addressed. Equal hash codes mean equal nodes:
//!
//! | Node | Identity from | Id prefix |
//! |------|---------------|-----------|
//! | **Widget** | class, resource id, capabilities, optionally text and index | none |
//! | **State** | activity and the combined widget identities | `g0s` |
//! | **Action** | action type, owning state and target widget | `g0a` |
//!
//! [`config::HashConfig`] decides how coarse these identities are.

pub mod action;
pub mod config;
pub mod error;
pub mod geometry;
pub mod graph;
pub mod hash;
pub mod node;
pub mod priority;
pub mod state;
pub mod util;
pub mod widget;
