//! Core domain types
//!
//! This module contains the structures shared by the job source, the
//! defaulting engine and the renderer: job kinds, job definitions and the
//! cluster settings jobs are routed to.

pub mod cluster;
pub mod job;
