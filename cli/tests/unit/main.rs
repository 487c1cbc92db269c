//! Unit tests for the spinwick library
//!
//! These tests exercise the public library surface without external I/O.

mod architecture;
mod property_tests;
