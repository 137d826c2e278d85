//! Test suites for the daemon runtime.

mod support;
