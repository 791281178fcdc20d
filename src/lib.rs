//! A remote provider which lets a CI host talk to a Trypod server, a small
//! Mercurial hosting service.
//!
//! The host only ever sees the [`Remote`] trait. Each configured platform is
//! registered into a [`Registry`] at startup (see [`register()`]) and the
//! host then looks it up by kind.

#[macro_use]
extern crate failure_derive;
#[macro_use]
extern crate log;

pub mod config;
pub mod errors;
pub mod http;
pub mod model;
mod register;
mod remote;
pub mod trypod;

pub use crate::config::{Config, General, TrypodConfig};
pub use crate::register::register;
pub use crate::remote::{Registry, Remote};
pub use crate::trypod::Trypod;
