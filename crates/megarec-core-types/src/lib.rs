//! Core types shared across megarec facilities
//!
//! This crate provides the canonical field keys and event names used by the
//! structured logging macros and by tests asserting on captured events.

pub mod schema;
