// src/config/mod.rs

//! Configuration loading, validation and persistence.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load and save config files (`loader.rs`).
//! - Validate static invariants before anything is launched (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{load_and_validate, load_from_path, save_to_path, write_template};
pub use model::{BuildSection, ConfigFile, EnvironmentSection, RawConfigFile, SupervisorSection};
