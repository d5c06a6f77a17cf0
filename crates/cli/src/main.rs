//! Command-line interface for the `stride` application.
//!
//! This crate serves as the main entry point for the executable, delegating
//! its core functionality to the `stride-service` crate.

fn main() -> anyhow::Result<()> {
    stride_service::run()
}
