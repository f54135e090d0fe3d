//! Error types and error handling for the interpreter.
//!
//! This module defines the error types used from tokenizing through
//! execution. It includes:
//!
//! - Error structures with source position information
//! - Specific error variants for lexing, parsing and evaluation
//! - The error taxonomy the program driver maps to exit codes

pub mod errors;
