//! ctlinv-api: Wire types for the controller REST API
//!
//! Contains the query and response shapes for the inventory lookup,
//! inventory script and server config endpoints.

pub mod requests;
pub mod responses;
pub mod script;
