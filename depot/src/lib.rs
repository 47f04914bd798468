//! Chunked, resumable file uploads with ranged downloads.
//!
//! A client initializes an upload, sends the file as independently framed chunks in
//! any order, asks the server to merge them, and later downloads the assembled file
//! in full or by byte range. See [`service::upload`] and [`service::download`] for the
//! core operations and [`api::create_router`] for the HTTP surface.

pub mod api;
pub mod config;
pub mod domain;
pub mod error;
pub mod service;
pub mod storage;
pub mod utils;
