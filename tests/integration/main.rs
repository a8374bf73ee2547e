//! Integration tests for udn-harvest
//!
//! These tests use wiremock to stand in for the news site and exercise
//! the fetch-and-extract pipeline and full crawl cycles end-to-end.

mod common;
mod crawl_tests;
mod pipeline_tests;
