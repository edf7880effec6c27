//! Smoke-test harness: runs a plan of HTTP and browser checks against a
//! running web application and reports what passed, failed or errored.

#[macro_use]
extern crate log;

#[macro_use]
extern crate derive_builder;

pub mod configuration;
pub mod connection;
pub mod harness;
pub mod reporter;
pub mod time;
