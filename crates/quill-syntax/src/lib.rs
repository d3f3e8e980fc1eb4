//! Quill language syntax definitions and abstract syntax tree.
//!
//! This crate provides the foundational syntax elements for the Quill
//! programming language: token definitions, abstract syntax tree (AST) nodes,
//! and the shared error type. All other crates in the Quill workspace depend
//! on these fundamental types.
//!
//! # Architecture
//!
//! The pipeline is a strictly forward data flow:
//!
//! ```text
//! ┌─────────────────────────────────────┐
//! │            Evaluator                │  <- Consumes AST, produces Values
//! ├─────────────────────────────────────┤
//! │              Parser                 │  <- Produces AST
//! ├─────────────────────────────────────┤
//! │               Lexer                 │  <- Produces Tokens
//! ├─────────────────────────────────────┤
//! │           Source Code               │  <- Raw text input
//! └─────────────────────────────────────┘
//! ```
//!
//! Each stage fails fast with a positioned [`error::Error`]; there is no
//! recovery.

/// Token types, lexical elements and source positions.
pub mod token;

/// Abstract syntax tree node definitions.
pub mod ast;

/// Error handling utilities and types.
pub mod error;

/// Indented AST dump for debugging and tooling.
pub mod dump;

pub use ast::*;
pub use error::{Error, ErrorKind, Result};
pub use token::{Pos, Token, TokenKind};
