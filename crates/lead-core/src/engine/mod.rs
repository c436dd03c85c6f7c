//! Engine module for TransitionEngine
//!
//! Provides the facade consumed by UI widgets and its builder.

pub mod builder;
pub mod core;

pub use builder::EngineBuilder;
pub use self::core::TransitionEngine;
