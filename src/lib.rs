//! # fluxc
//!
//! fluxc is a Rust-based command-line client for InfluxDB (v1.x, InfluxQL).
//! It reads a YAML connection/profile config and a YAML library of canned
//! statements, opens a client handle to the database, executes a query and
//! prints the resulting rows.
//!
//! ## Features
//!
//! - **Profiles**: named credential sets (writer/reader/admin roles) stored
//!   alongside the connection settings in `~/.fluxc.conf`
//! - **Statement Library**: reusable InfluxQL statements in a YAML file, each
//!   addressable by its position-derived id
//! - **Self-Test**: a write/read/clean-up round trip against a sample
//!   measurement, exercising the writer, reader and admin profiles
//! - **Ad-hoc Queries**: run any InfluxQL statement straight from the
//!   command line
//!
//! ## Usage
//!
//! This library provides the modules behind the `fluxc` binary; for the
//! command-line surface see `src/main.rs`.
//!
//! ## Modules
//!
//! - `config`: connection settings, profile storage and resolution
//! - `library`: statement library loading and listing
//! - `db`: InfluxDB connection, query execution and row rendering
//! - `error`: fatal error kinds and their process exit codes

pub mod config;
pub mod db;
pub mod error;
pub mod library;

pub use config::Config;
pub use db::DatabaseConnection;
pub use error::FluxcError;
pub use library::Library;
