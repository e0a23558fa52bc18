//! Port traits — the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ AppService (domain)
//! ```
//!
//! Driven adapters (PWM outputs, byte store, status display, console,
//! event sinks) implement these traits.  The
//! [`AppService`](super::service::AppService) and the
//! [`Scheduler`](crate::scheduler::Scheduler) consume them via generics, so
//! the domain core never touches hardware directly.

use crate::config::SystemConfig;

use super::commands::CommandRequest;
use super::state::ActuatorKind;

// ───────────────────────────────────────────────────────────────
// Actuator port (driven adapter: domain → hardware)
// ───────────────────────────────────────────────────────────────

/// Write-side port: the domain calls this to drive the three outputs.
pub trait ActuatorPort {
    /// Assert `percent` (0–100) on the actuator's signal line.  The adapter
    /// owns the scaling to its hardware resolution.
    fn set_output(&mut self, kind: ActuatorKind, percent: u8);

    /// Block for `ms` milliseconds between ramp steps.
    fn hold_ms(&mut self, ms: u32);

    /// Percent currently asserted on the actuator's line.
    fn output(&self, kind: ActuatorKind) -> u8;
}

// ───────────────────────────────────────────────────────────────
// Byte store port (driven adapter: domain ↔ EEPROM-style storage)
// ───────────────────────────────────────────────────────────────

/// Address-based byte storage that survives power loss.
///
/// Writes are staged until [`commit`](Self::commit); a commit either lands
/// every staged byte or reports failure.
pub trait ByteStorePort {
    /// Read one byte.  `Err(StoreError::NotFound)` when nothing was ever
    /// committed.
    fn read_byte(&self, address: u16) -> Result<u8, StoreError>;

    /// Stage one byte for the next commit.
    fn write_byte(&mut self, address: u16, value: u8) -> Result<(), StoreError>;

    /// Persist every staged byte.
    fn commit(&mut self) -> Result<(), StoreError>;
}

// ───────────────────────────────────────────────────────────────
// Status port (driven adapter: domain → display)
// ───────────────────────────────────────────────────────────────

/// Point-in-time view handed to the status renderer every tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusSnapshot {
    pub fog: u8,
    pub pump: u8,
    pub light: u8,
    pub any_active: bool,
    pub uptime_secs: u64,
}

/// Pull-style renderer.  Produces no feedback into the core.
pub trait StatusPort {
    fn render(&mut self, status: &StatusSnapshot);
}

// ───────────────────────────────────────────────────────────────
// Command port (driving adapter: outside world → domain)
// ───────────────────────────────────────────────────────────────

/// Source of external commands, polled once per tick.
pub trait CommandPort {
    /// Take the pending command, if any.  Never blocks.
    fn poll(&mut self) -> Option<CommandRequest>;

    /// Deliver the integer result for `request` back to its caller.
    fn reply(&mut self, request: &CommandRequest, result: i32);
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Configuration port (driven adapter: domain ↔ persistent config)
// ───────────────────────────────────────────────────────────────

/// Loads and persists system configuration.
///
/// Implementations MUST validate before persisting and reject invalid
/// ranges with [`ConfigError::ValidationFailed`] rather than clamping.
pub trait ConfigPort {
    /// Load configuration from persistent storage.
    /// Returns [`SystemConfig::default()`] if no stored config exists.
    fn load(&self) -> Result<SystemConfig, ConfigError>;

    /// Validate and persist configuration.
    fn save(&self, config: &SystemConfig) -> Result<(), ConfigError>;
}

// ───────────────────────────────────────────────────────────────
// System port (driven adapter: domain → chip control)
// ───────────────────────────────────────────────────────────────

/// Chip-level actions the scheduler may take.
pub trait SystemPort {
    /// Full device restart.  On hardware this does not return; host and
    /// test adapters return so the loop can carry on with uptime reset.
    fn restart(&mut self);
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from [`ConfigPort`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// Stored config failed integrity / deserialization check.
    Corrupted,
    /// A config field failed range validation.
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
    /// Generic I/O error from the storage backend.
    IoError,
}

/// Errors from [`ByteStorePort`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreError {
    /// Nothing has been committed yet.
    NotFound,
    /// Address outside the store.
    OutOfRange(u16),
    /// The backend rejected the commit.
    CommitFailed,
    /// Generic I/O error.
    IoError,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Corrupted => write!(f, "config corrupted"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}

impl core::fmt::Display for StoreError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotFound => write!(f, "nothing stored"),
            Self::OutOfRange(addr) => write!(f, "address {} out of range", addr),
            Self::CommitFailed => write!(f, "commit failed"),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}
