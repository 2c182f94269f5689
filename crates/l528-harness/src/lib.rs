//! Acceptance and differential test harness for the l528 toolchain.
//!
//! The toolchain binary is an external collaborator: one executable exposing
//! a tree-walking interpreter (`--exec`), a parse-only mode (`--parse`), and
//! an AOT compiler (`--comp-e2e`). The harness discovers a corpus of `.src`
//! programs, runs them through one or both backends, extracts test directives
//! embedded in program output, and judges each case. The acceptance suite
//! additionally verifies that both backends produce byte-identical output.

pub mod acceptance;
pub mod compare;
pub mod config;
pub mod corpus;
pub mod directive;
pub mod e2e;
pub mod integration;
pub mod judge;
pub mod report;
pub mod toolchain;
pub mod util;
