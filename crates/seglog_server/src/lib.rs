//! # SegLog Server
//!
//! Transport-agnostic produce/consume service over the segmented log.
//!
//! This crate provides:
//! - Request/response message types (serde-derived, transport-ready)
//! - Request handlers for produce and consume
//! - A server facade with a pull-based consume stream
//!
//! No HTTP or RPC framework is bound here; a transport layer exposes
//! endpoints that call [`LogServer::produce`], [`LogServer::consume`], and
//! [`LogServer::consume_stream`].

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod handler;
mod messages;
mod server;

pub use error::{ServerError, ServerResult};
pub use handler::RequestHandler;
pub use messages::{
    ConsumeRequest, ConsumeResponse, ProduceRequest, ProduceResponse, RecordMessage,
};
pub use server::{ConsumeStream, LogServer};
