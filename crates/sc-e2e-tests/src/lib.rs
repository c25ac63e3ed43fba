//! End-to-end tests for the SmartCart NLP workspace.
//!
//! The tests live in `tests/`; this crate has no runtime code.
