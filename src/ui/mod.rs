//! UI module - the web form
//!
//! Renders the task form and binds its button to the operator.

pub mod page;
pub mod server;

pub use server::{bind, router, serve, OperatorContext};
