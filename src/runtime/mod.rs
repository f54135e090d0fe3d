//! The execution engine.
//!
//! - `objects`: runtime values, type tags and resolved annotations
//! - `environment`: the arena of scopes and the binding rules
//! - `runner`: scope management and the call engine
//! - `stack`: growing the host stack for deeply recursive programs
//! - `stmt` / `expr`: statement dispatch and expression evaluation
//! - `imports`: standard-library and local-file imports
//! - `stdlib`: the host standard library
//! - `driver`: end-to-end execution, diagnostics and exit codes

pub mod driver;
pub mod environment;
pub mod expr;
pub mod imports;
pub mod objects;
pub mod runner;
pub mod stack;
pub mod stdlib;
pub mod stmt;
