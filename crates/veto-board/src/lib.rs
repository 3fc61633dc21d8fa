// Library root: configuration and report building for the `veto-board`
// binary, exposed so integration tests can drive them directly.

pub mod config;
pub mod report;
