//! Core types and trait definitions for the carshop marketplace.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! It holds the entity model, the wire-level transfer objects, the explicit
//! unit-of-work [`session::Session`] and the repository traits that storage
//! backends implement.

// Trait methods spell out `Send` futures explicitly.
#![allow(async_fn_in_trait)]

pub mod car;
pub mod dto;
pub mod entity;
pub mod error;
pub mod images;
pub mod person;
pub mod seed;
pub mod session;
pub mod store;

pub use car::{Car, Owner};
pub use entity::{Entity, EntityKind};
pub use error::{Error, Result};
pub use person::Person;
