//! Entry point for the integration test suite under `tests/suite/`. Cargo
//! only discovers files directly under `tests/`, so this file's `mod`
//! declarations are what make the contents of `tests/suite/*.rs` run.

#[path = "suite/algebra_tests.rs"]
mod algebra_tests;
#[path = "suite/chain_tests.rs"]
mod chain_tests;
#[path = "suite/integration_tests.rs"]
mod integration_tests;
#[path = "suite/optimization_tests.rs"]
mod optimization_tests;
#[path = "suite/pattern_tests.rs"]
mod pattern_tests;
