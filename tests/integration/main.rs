//! Integration tests for Kakurizer
//!
//! These tests use wiremock to serve a fake puzzle site and exercise the
//! scan and enrichment passes end-to-end over real HTTP.

mod common;
mod enrich_tests;
mod scan_tests;
