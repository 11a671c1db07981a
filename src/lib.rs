//! Core library for the gym-billing command line application.
//!
//! Storage adapters live under [`io`], the typed member and class tables in
//! [`model`], billing derivations in [`report`], and the operations that
//! change the tables in [`gym`] and [`checkin`]. The remaining modules are
//! the interactive surface: [`console`], [`auth`], [`menu`] and [`render`].

pub mod auth;
pub mod checkin;
pub mod console;
pub mod error;
pub mod gym;
pub mod io;
pub mod menu;
pub mod model;
pub mod render;
pub mod report;
pub mod validate;

pub use error::{GymError, Result, Warning};
