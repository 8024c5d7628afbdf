//! `lpc-weekly` library crate.
//!
//! Fetches the weekly fuel price survey spreadsheets ("resumo semanal LPC"),
//! keeps them unchanged in a bronze store, and reshapes them into one combined
//! silver CSV.
//!
//! The binary (`lpc`) is a thin wrapper around this library so the pipeline
//! can be exercised in tests with fake downloaders and parsers.

pub mod app;
pub mod cli;
pub mod config;
pub mod data;
pub mod domain;
pub mod error;
pub mod io;
pub mod report;
