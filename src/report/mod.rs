//! Human-readable rendering of processed reports.

pub mod generator;

pub use generator::write_report;
