//! Terminal front end for the course booking client.
//!
//! The binary is a thin stdin loop; everything it drives lives here so the
//! integration tests can run the same code against a mock backend.

pub mod command;
pub mod render;
pub mod shell;
