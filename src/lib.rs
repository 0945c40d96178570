//! Label Print Agent
//!
//! This library provides the core of the label print agent: a local process
//! that polls a remote print queue, prints each job's shipping labels (or
//! simulates them in test mode) and reports job status back to the queue.

pub mod app_state;
pub mod config;
pub mod context;
pub mod models;
pub mod routes;
pub mod services;
