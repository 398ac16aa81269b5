//! Catalog and media backend for a vehicle marketplace.
//!
//! The crate is organized around a small set of db-backed entities (cars,
//! categories, users, images) and an http surface exposing them. The one
//! piece of real business logic lives in [`gallery`], which maintains the
//! per-car image gallery invariants (bounded capacity, single primary image,
//! display ordering) on top of the record store.

#[macro_use]
extern crate serde_derive;

pub mod api;
pub mod auth;
pub mod car;
pub mod config;
pub mod db;
pub mod error;
pub mod gallery;
pub mod image;
pub mod init;
pub mod mock;
pub mod routes;
pub mod tracing;
pub mod user;
pub mod util;

#[cfg(feature = "axum")]
pub mod axum;

pub use crate::car::{Car, CarId, Category, CategoryId};
pub use crate::config::Config;
pub use crate::db::Database;
pub use crate::error::{Error, ErrorKind, Result};
pub use crate::gallery::{CarImage, CarImageId};
pub use crate::image::{Image, ImageId};
pub use crate::user::{User, UserId};

#[cfg(feature = "axum")]
pub use crate::axum::{router, Router};
