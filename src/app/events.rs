//! Outbound application events.
//!
//! The [`AppService`](super::service::AppService) and the scheduler emit
//! these through the [`EventSink`](super::ports::EventSink) port.  Adapters
//! on the other side decide what to do with them — log to serial, forward
//! to a remote collector, etc.

use super::ports::StoreError;
use super::state::{ActuatorKind, RECORD_LEN};

/// Structured events emitted by the application core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    /// The service restored its state from the byte store.
    Started {
        fog: u8,
        pump: u8,
        light: u8,
        /// `false` when nothing usable was stored and defaults were used.
        from_store: bool,
    },

    /// An actuator's intensity changed.
    IntensityChanged {
        kind: ActuatorKind,
        from: u8,
        to: u8,
        previous: u8,
    },

    /// Dirty state was written and committed.
    StoreFlushed([u8; RECORD_LEN]),

    /// A flush failed; state stays dirty and is retried next tick.
    StoreFlushFailed(StoreError),

    /// Raw bytes read back on request (`None` = unreadable address).
    StoreDump([Option<u8>; RECORD_LEN]),

    /// An external command was serviced.
    CommandHandled {
        name: heapless::String<{ super::commands::MAX_NAME_LEN }>,
        result: i32,
    },

    /// The uptime ceiling was reached; the device is restarting.
    Restarting { uptime_secs: u64 },
}
