//! # minipoll-host — Host Integration for the Minipoll Engine
//!
//! This crate wires the host-agnostic models of `minipoll-core` to the
//! outside world: movement, visuals, world objects, a day/night clock and a
//! fixed-step tick pump.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │                 Population                   │
//! │   DayCycle ── tick(dt) ──► Minipoll (×N)     │
//! │                 │            │               │
//! │                 ▼            ▼               │
//! │             EventBus    Cadence timers       │
//! │                 │            │               │
//! │                 ▼            ▼               │
//! │            observers   ┌──────────────────┐  │
//! │                        │  minipoll-core   │  │
//! │                        └──────────────────┘  │
//! │   collaborators: MovementExecutor,           │
//! │   VisualExecutor, Interactable, Perception   │
//! └──────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - `agent` — the per-creature brain and its builder
//! - `collaborators` — traits the host implements (movement, visuals, objects)
//! - `schedule` — per-subsystem interval accumulators
//! - `clock` — the day/night cycle
//! - `events` — simulation events and the observer bus
//! - `interactable` — a profile-driven world object
//! - `population` — owns agents and objects, runs the tick
//! - `sandbox` — in-memory collaborators for headless runs and tests
//! - `config` — simulation run configuration

pub mod agent;
pub mod clock;
pub mod collaborators;
pub mod config;
pub mod events;
pub mod interactable;
pub mod population;
pub mod sandbox;
pub mod schedule;

pub use agent::{Minipoll, MinipollBuilder, SocialExchange};
pub use clock::DayCycle;
pub use config::SimulationConfig;
pub use events::{EventBus, SimEvent, SimRecord};
pub use population::{AgentSummary, Population};
