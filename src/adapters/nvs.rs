//! NVS (Non-Volatile Storage) adapter.
//!
//! Implements both [`ConfigPort`] and [`ByteStorePort`] for the prop.
//!
//! - The six intensity bytes live in one NVS blob (`fogprop::intensity`).
//!   Byte writes are staged in RAM and land together on `commit()`, which
//!   maps onto a single atomic `nvs_set_blob` + `nvs_commit`.
//! - The system configuration is a `postcard` blob (`fogprop::syscfg`),
//!   range-checked before it is persisted.
//!
//! On non-espidf targets an in-memory map stands in for the flash partition.

use log::{info, warn};

use crate::app::ports::{ByteStorePort, ConfigError, ConfigPort, StoreError};
use crate::app::state::RECORD_LEN;
use crate::config::SystemConfig;
use crate::drivers::watchdog::WATCHDOG_TIMEOUT_MS;

#[cfg(not(target_os = "espidf"))]
use std::collections::HashMap;

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

const NAMESPACE: &str = "fogprop";
const CONFIG_KEY: &str = "syscfg";
const RECORD_KEY: &str = "intensity";

const MAX_BLOB_SIZE: usize = 512;

/// Backend error: the raw ESP-IDF return code, or -1 in simulation.
type NvsResult<T> = Result<T, i32>;

pub struct NvsAdapter {
    /// Pending record, `None` until the first `write_byte` after a commit.
    staged: Option<[u8; RECORD_LEN]>,
    #[cfg(not(target_os = "espidf"))]
    store: std::cell::RefCell<HashMap<String, Vec<u8>>>,
}

impl NvsAdapter {
    /// Create a new NvsAdapter and initialise NVS flash.
    ///
    /// On first boot or after a version mismatch the NVS partition is
    /// erased and re-initialised automatically.
    pub fn new() -> Result<Self, ConfigError> {
        #[cfg(target_os = "espidf")]
        {
            // SAFETY: nvs_flash_init / nvs_flash_erase are called from the
            // single main-task context before any concurrent NVS access.
            let ret = unsafe { nvs_flash_init() };
            if ret == ESP_ERR_NVS_NO_FREE_PAGES as i32 || ret == ESP_ERR_NVS_NEW_VERSION_FOUND as i32 {
                warn!("NVS: erasing and re-initialising flash partition");
                if unsafe { nvs_flash_erase() } != ESP_OK as i32 {
                    return Err(ConfigError::IoError);
                }
                if unsafe { nvs_flash_init() } != ESP_OK as i32 {
                    return Err(ConfigError::IoError);
                }
            } else if ret != ESP_OK as i32 {
                return Err(ConfigError::IoError);
            }
            info!("NvsAdapter: ESP-IDF NVS initialised");
        }

        #[cfg(not(target_os = "espidf"))]
        info!("NvsAdapter: simulation backend");

        Ok(Self::unbacked())
    }

    /// An adapter with no flash behind it yet; used when init fails so the
    /// firmware keeps running without persistence.
    pub fn unbacked() -> Self {
        Self {
            staged: None,
            #[cfg(not(target_os = "espidf"))]
            store: std::cell::RefCell::new(HashMap::new()),
        }
    }

    fn read_record(&self) -> Result<[u8; RECORD_LEN], StoreError> {
        match self.read_blob(RECORD_KEY) {
            Ok(Some(bytes)) => bytes.try_into().map_err(|bytes: Vec<u8>| {
                warn!("NvsAdapter: intensity record has {} bytes, expected {}", bytes.len(), RECORD_LEN);
                StoreError::IoError
            }),
            Ok(None) => Err(StoreError::NotFound),
            Err(rc) => {
                warn!("NvsAdapter: intensity read error {}", rc);
                Err(StoreError::IoError)
            }
        }
    }

    // ── Blob backend ──────────────────────────────────────────

    #[cfg(not(target_os = "espidf"))]
    fn read_blob(&self, key: &str) -> NvsResult<Option<Vec<u8>>> {
        Ok(self.store.borrow().get(&composite_key(key)).cloned())
    }

    #[cfg(not(target_os = "espidf"))]
    fn write_blob(&self, key: &str, data: &[u8]) -> NvsResult<()> {
        self.store.borrow_mut().insert(composite_key(key), data.to_vec());
        Ok(())
    }

    #[cfg(target_os = "espidf")]
    fn read_blob(&self, key: &str) -> NvsResult<Option<Vec<u8>>> {
        let key_buf = c_name(key);
        let found = with_nvs_handle(false, |handle| {
            let mut size: usize = 0;
            // SAFETY: handle is open; a null buffer queries the blob size.
            let ret = unsafe {
                nvs_get_blob(handle, key_buf.as_ptr() as *const _, core::ptr::null_mut(), &mut size)
            };
            if ret == ESP_ERR_NVS_NOT_FOUND as i32 {
                return Ok(None);
            }
            if ret != ESP_OK as i32 || size == 0 || size > MAX_BLOB_SIZE {
                return Err(ret);
            }

            let mut buf = vec![0u8; size];
            // SAFETY: buf holds exactly `size` bytes.
            let ret = unsafe {
                nvs_get_blob(handle, key_buf.as_ptr() as *const _, buf.as_mut_ptr() as *mut _, &mut size)
            };
            if ret != ESP_OK as i32 {
                return Err(ret);
            }
            Ok(Some(buf))
        });
        // A namespace that was never written reads as "nothing stored".
        match found {
            Err(rc) if rc == ESP_ERR_NVS_NOT_FOUND as i32 => Ok(None),
            other => other,
        }
    }

    #[cfg(target_os = "espidf")]
    fn write_blob(&self, key: &str, data: &[u8]) -> NvsResult<()> {
        let key_buf = c_name(key);
        with_nvs_handle(true, |handle| {
            // SAFETY: handle is open read-write; data outlives the call.
            let ret = unsafe {
                nvs_set_blob(handle, key_buf.as_ptr() as *const _, data.as_ptr() as *const _, data.len())
            };
            if ret != ESP_OK as i32 {
                return Err(ret);
            }
            // SAFETY: same handle, still open.
            let ret = unsafe { nvs_commit(handle) };
            if ret != ESP_OK as i32 {
                return Err(ret);
            }
            Ok(())
        })
    }
}

#[cfg(not(target_os = "espidf"))]
fn composite_key(key: &str) -> String {
    format!("{}::{}", NAMESPACE, key)
}

/// NVS names are at most 15 bytes plus the terminator.
#[cfg(target_os = "espidf")]
fn c_name(name: &str) -> [u8; 16] {
    let mut buf = [0u8; 16];
    let bytes = name.as_bytes();
    let len = bytes.len().min(15);
    buf[..len].copy_from_slice(&bytes[..len]);
    buf
}

/// Open the crate namespace, execute a closure with the handle, then close.
#[cfg(target_os = "espidf")]
fn with_nvs_handle<F, T>(write: bool, f: F) -> NvsResult<T>
where
    F: FnOnce(nvs_handle_t) -> NvsResult<T>,
{
    let ns_buf = c_name(NAMESPACE);
    let mut handle: nvs_handle_t = 0;
    let mode = if write {
        nvs_open_mode_t_NVS_READWRITE
    } else {
        nvs_open_mode_t_NVS_READONLY
    };

    // SAFETY: ns_buf is null-terminated and outlives the call.
    let ret = unsafe { nvs_open(ns_buf.as_ptr() as *const _, mode, &mut handle) };
    if ret != ESP_OK as i32 {
        return Err(ret);
    }

    let result = f(handle);
    // SAFETY: handle was opened above and is closed exactly once.
    unsafe {
        nvs_close(handle);
    }
    result
}

// ── Byte store ────────────────────────────────────────────────

impl ByteStorePort for NvsAdapter {
    fn read_byte(&self, address: u16) -> Result<u8, StoreError> {
        let index = usize::from(address);
        if index >= RECORD_LEN {
            return Err(StoreError::OutOfRange(address));
        }
        Ok(self.read_record()?[index])
    }

    fn write_byte(&mut self, address: u16, value: u8) -> Result<(), StoreError> {
        let index = usize::from(address);
        if index >= RECORD_LEN {
            return Err(StoreError::OutOfRange(address));
        }
        let mut record = match self.staged {
            Some(record) => record,
            None => self.read_record().unwrap_or([0; RECORD_LEN]),
        };
        record[index] = value;
        self.staged = Some(record);
        Ok(())
    }

    fn commit(&mut self) -> Result<(), StoreError> {
        let Some(record) = self.staged else {
            return Ok(());
        };
        match self.write_blob(RECORD_KEY, &record) {
            Ok(()) => {
                self.staged = None;
                Ok(())
            }
            Err(rc) => {
                warn!("NvsAdapter: intensity commit error {}", rc);
                Err(StoreError::CommitFailed)
            }
        }
    }
}

// ── Configuration ─────────────────────────────────────────────

fn validate_config(cfg: &SystemConfig) -> Result<(), ConfigError> {
    if !(100..=5000).contains(&cfg.tick_interval_ms) {
        return Err(ConfigError::ValidationFailed(
            "tick_interval_ms must be 100–5000",
        ));
    }
    if !(1..=3600).contains(&cfg.flush_interval_ticks) {
        return Err(ConfigError::ValidationFailed(
            "flush_interval_ticks must be 1–3600",
        ));
    }
    if !(60..=604_800).contains(&cfg.restart_after_secs) {
        return Err(ConfigError::ValidationFailed(
            "restart_after_secs must be 60–604800",
        ));
    }
    if cfg.light_ramp_step_ms > 40 {
        return Err(ConfigError::ValidationFailed(
            "light_ramp_step_ms must be 0–40",
        ));
    }
    if cfg.heartbeat_step_ms > 40 {
        return Err(ConfigError::ValidationFailed(
            "heartbeat_step_ms must be 0–40",
        ));
    }
    if cfg.heartbeat_floor_percent > 99 {
        return Err(ConfigError::ValidationFailed(
            "heartbeat_floor_percent must be 0–99",
        ));
    }
    // A full ramp followed by a full heartbeat must not starve the watchdog.
    let worst_tick_ms = 100 * cfg.light_ramp_step_ms + 100 * cfg.heartbeat_step_ms + cfg.tick_interval_ms;
    if worst_tick_ms >= WATCHDOG_TIMEOUT_MS {
        return Err(ConfigError::ValidationFailed(
            "ramp + heartbeat + tick exceed the watchdog timeout",
        ));
    }
    Ok(())
}

impl ConfigPort for NvsAdapter {
    fn load(&self) -> Result<SystemConfig, ConfigError> {
        match self.read_blob(CONFIG_KEY) {
            Ok(Some(bytes)) => {
                let cfg: SystemConfig =
                    postcard::from_bytes(&bytes).map_err(|_| ConfigError::Corrupted)?;
                validate_config(&cfg)?;
                info!("NvsAdapter: loaded config ({} bytes)", bytes.len());
                Ok(cfg)
            }
            Ok(None) => {
                info!("NvsAdapter: no stored config, using defaults");
                Ok(SystemConfig::default())
            }
            Err(rc) => {
                warn!("NvsAdapter: config read error {}, using defaults", rc);
                Ok(SystemConfig::default())
            }
        }
    }

    fn save(&self, config: &SystemConfig) -> Result<(), ConfigError> {
        validate_config(config)?;
        let bytes = postcard::to_allocvec(config).map_err(|_| ConfigError::IoError)?;
        if bytes.len() > MAX_BLOB_SIZE {
            return Err(ConfigError::IoError);
        }
        match self.write_blob(CONFIG_KEY, &bytes) {
            Ok(()) => {
                info!("NvsAdapter: config saved ({} bytes)", bytes.len());
                Ok(())
            }
            Err(rc) => {
                warn!("NvsAdapter: config write error {}", rc);
                Err(ConfigError::IoError)
            }
        }
    }
}

impl Default for NvsAdapter {
    fn default() -> Self {
        Self::new().unwrap_or_else(|_| Self::unbacked())
    }
}
