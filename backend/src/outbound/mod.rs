//! Outbound adapters: implementations of the domain's ports against
//! external infrastructure.

pub mod persistence;
