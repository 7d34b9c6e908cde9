//! Vepi Core
//!
//! Core types for the Vena ETL client.
//!
//! This crate contains:
//! - Domain types: jobs, job statuses, exported intersections and hierarchies
//! - DTOs: request and response bodies exchanged with the public ETL API

pub mod domain;
pub mod dto;
