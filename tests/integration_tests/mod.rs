//! Integration tests module
//!
//! End-to-end tests for kosen-web:
//! - Content pipeline from API payload to render plan
//! - Page rendering through the router against a mock content API
//! - Error handling for failing or malformed backends

pub mod error_scenarios;
pub mod fixtures;
pub mod pipeline_test;
pub mod site_test;
