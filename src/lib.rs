//! Payroll Engine
//!
//! This crate computes payroll for a period in the background: it pages
//! through the payroll-eligible employees, derives each one's pay from
//! attendance, overtime and reimbursement facts, and persists every line
//! of the period in a single transaction.
//!
//! The entry point is [`run::RunCoordinator`], which validates a request,
//! moves the period to `processing` and hands the job to a
//! [`run::RunWorkerPool`]. Storage sits behind the [`store::Backend`] trait.

#![warn(missing_docs)]

pub mod api;
pub mod batch;
pub mod calculation;
pub mod config;
pub mod error;
pub mod models;
pub mod run;
pub mod store;
pub mod telemetry;
