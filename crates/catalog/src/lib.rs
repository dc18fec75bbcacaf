//! Client for the CANAL+ video catalog.
//!
//! The catalog is a small XML REST API: a program list, per-program video
//! lists, free-text search and per-video media descriptors. Everything here
//! is a thin fetch-and-parse layer; the only decision made locally is which
//! stream URL of a descriptor is the best one.

pub mod client;
pub mod config;
pub mod error;
mod model;
pub mod program;
pub mod video;

pub use client::CatalogClient;
pub use config::{CatalogConfig, DEFAULT_BASE_URL, DEFAULT_TIMEOUT, DEFAULT_USER_AGENT};
pub use error::CatalogError;
pub use program::{Program, ProgramList, SearchQuery, Selection, VideoList};
pub use video::{MediaDescriptor, Video};
