//! # Minipoll Core Library
//!
//! Host-agnostic decision and state-evolution engine for autonomous
//! Minipoll creatures. Every agent owns five pieces of state, each with its
//! own module:
//!
//! - **Emotions** — intensities that decay toward a personal baseline
//!   ([`EmotionModel`])
//! - **Needs** — energy, hunger, social, fun and hygiene meters with
//!   edge-triggered threshold events ([`NeedsModel`])
//! - **Memory** — a learned experience ledger with significance scoring,
//!   forgetting and sharing ([`MemoryStore`])
//! - **Relationships** — trust / friendship / fear per peer and the derived
//!   relationship type ([`RelationshipLedger`])
//! - **Decisions** — weighted-random action selection over the current
//!   state ([`DecisionPolicy`])
//!
//! Interaction outcomes (world objects and peers) are computed by the pure
//! functions in [`interaction`]. Nothing in this crate touches rendering,
//! pathfinding or scheduling; the `minipoll-host` crate wires these models
//! to collaborators and a tick pump.
//!
//! ## Determinism
//!
//! All randomness flows through a caller-supplied [`rand::Rng`]. Given the
//! same seed, configuration and input sequence, every model evolves
//! identically.

#![deny(clippy::unwrap_used)]
#![deny(missing_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod decision;
pub mod emotion;
pub mod error;
pub mod events;
pub mod interaction;
pub mod interest;
pub mod memory;
pub mod needs;
pub mod relationship;
pub mod types;
pub mod weighted;

pub use config::MinipollConfig;
pub use decision::{DecisionContext, DecisionOption, DecisionPolicy};
pub use emotion::EmotionModel;
pub use error::MinipollError;
pub use events::EngineEvent;
pub use interaction::InteractionResult;
pub use memory::MemoryStore;
pub use needs::NeedsModel;
pub use relationship::RelationshipLedger;
pub use types::*;
