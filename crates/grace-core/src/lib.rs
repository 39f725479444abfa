//! Core types and trait definitions for the Grace metadata service.
//!
//! This crate is free of HTTP and database dependencies. Storage backends
//! implement [`store::FragmentStore`]; provider clients implement the
//! per-domain provider traits in [`book`], [`game`] and [`movie`]. The
//! fetch-or-create [`pipeline::Pipeline`] is written once and driven by a
//! [`domain::Domain`] descriptor.

// Native `async fn` in traits, with explicit `Send` futures where it matters.
#![allow(async_fn_in_trait)]

pub mod book;
pub mod domain;
pub mod error;
pub mod fragment;
pub mod game;
pub mod movie;
pub mod pipeline;
pub mod provider;
pub mod store;
pub mod text;

pub use error::{Error, Result};
