//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the ESP-IDF logger (which goes to UART / USB-CDC in production).

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;
use crate::app::state::ActuatorKind;

/// Adapter that logs every [`AppEvent`] to the serial console.
#[derive(Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started { fog, pump, light, from_store } => {
                info!(
                    "START | fog={}% pump={}% light={}% | source={}",
                    fog,
                    pump,
                    light,
                    if *from_store { "store" } else { "defaults" },
                );
            }
            AppEvent::IntensityChanged { kind, from, to, previous } => {
                info!("LEVEL | {} {}% -> {}% | previous={}%", kind, from, to, previous);
            }
            AppEvent::StoreFlushed(record) => {
                info!("STORE | flushed {:?}", record);
            }
            AppEvent::StoreFlushFailed(e) => {
                warn!("STORE | flush failed: {} | retry next tick", e);
            }
            AppEvent::StoreDump(bytes) => {
                for kind in ActuatorKind::ALL {
                    let cur = kind.current_address();
                    let prev = kind.previous_address();
                    info!(
                        "STORE | {:<5} [{}]={} [{}]={}",
                        kind.label(),
                        cur,
                        DumpByte(bytes[usize::from(cur)]),
                        prev,
                        DumpByte(bytes[usize::from(prev)]),
                    );
                }
            }
            AppEvent::CommandHandled { name, result } => {
                info!("CMD   | {} -> {}", name, result);
            }
            AppEvent::Restarting { uptime_secs } => {
                warn!("SYS   | restarting after {}s uptime", uptime_secs);
            }
        }
    }
}

/// Renders an unreadable store byte as `--`.
struct DumpByte(Option<u8>);

impl core::fmt::Display for DumpByte {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self.0 {
            Some(b) => write!(f, "{}", b),
            None => f.write_str("--"),
        }
    }
}
