//! Command line host for the converter

pub mod interactive;

pub use interactive::{confirm_disclaimer, print_banner, report_status, run_conversion, DestinationPolicy};
