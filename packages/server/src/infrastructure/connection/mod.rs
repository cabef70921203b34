//! Connection Registry の実装
//!
//! The connection map is shared with the WebSocket message pusher: the
//! registry owns the entries, the pusher only reads their senders.

use std::{collections::HashMap, sync::Arc};

use tokio::sync::Mutex;

use crate::domain::{Connection, ConnectionId};

pub mod registry;

pub use registry::InMemoryConnectionRegistry;

/// ConnectionId → Connection
pub type ConnectionMap = Arc<Mutex<HashMap<ConnectionId, Connection>>>;
