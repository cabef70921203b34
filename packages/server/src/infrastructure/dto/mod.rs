//! Data Transfer Objects
//!
//! - `websocket`: wire types for inbound requests and outbound events
//! - `conversion`: domain event → wire JSON

pub mod conversion;
pub mod websocket;

pub use conversion::{encode_event, message_to_dto};
pub use websocket::{ClientRequest, EventMethod};
