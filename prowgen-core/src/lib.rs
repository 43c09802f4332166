//! Prowgen Core
//!
//! Core types and rules for the Prow job generator.
//!
//! This crate contains:
//! - Domain types: job kinds, job definitions and cluster settings
//! - Defaulting rules: the pure functions that merge a job definition with
//!   environment defaults before rendering

pub mod defaults;
pub mod domain;

pub use domain::cluster::{ClusterProfile, ClusterSettings};
pub use domain::job::{EnvVar, JobDefinition, JobKind, JobSet, UnknownJobKind};
