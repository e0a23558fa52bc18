//! Fuzz target: console line → command dispatch
//!
//! Drives arbitrary text through `CommandRequest::parse_line` and the
//! dispatcher, asserting that intensities never leave 0..=100 and that a
//! result is always produced without panicking.
//!
//! cargo fuzz run fuzz_command_line

#![no_main]

use fogprop::app::events::AppEvent;
use fogprop::app::ports::{ActuatorPort, ByteStorePort, EventSink, StoreError};
use fogprop::app::service::AppService;
use fogprop::app::state::ActuatorKind;
use fogprop::app::commands::CommandRequest;
use fogprop::config::SystemConfig;
use libfuzzer_sys::fuzz_target;

struct Outputs([u8; 3]);

impl ActuatorPort for Outputs {
    fn set_output(&mut self, kind: ActuatorKind, percent: u8) {
        self.0[kind as usize] = percent;
    }
    fn hold_ms(&mut self, _ms: u32) {}
    fn output(&self, kind: ActuatorKind) -> u8 {
        self.0[kind as usize]
    }
}

struct NoStore;

impl ByteStorePort for NoStore {
    fn read_byte(&self, _address: u16) -> Result<u8, StoreError> {
        Err(StoreError::NotFound)
    }
    fn write_byte(&mut self, _address: u16, _value: u8) -> Result<(), StoreError> {
        Ok(())
    }
    fn commit(&mut self) -> Result<(), StoreError> {
        Ok(())
    }
}

struct Discard;

impl EventSink for Discard {
    fn emit(&mut self, _event: &AppEvent) {}
}

fuzz_target!(|data: &[u8]| {
    let Ok(text) = core::str::from_utf8(data) else {
        return;
    };
    let config = SystemConfig {
        light_ramp_step_ms: 0,
        heartbeat_step_ms: 0,
        ..Default::default()
    };
    let mut app = AppService::new(&config);
    let mut hw = Outputs([0; 3]);

    for line in text.lines() {
        let Some(request) = CommandRequest::parse_line(line) else {
            continue;
        };
        let result = app.dispatch(&request, &mut hw, &NoStore, &mut Discard);
        assert!((-1..=100).contains(&result), "result {result} out of range");
        for kind in ActuatorKind::ALL {
            assert!(app.intensity(kind) <= 100);
            assert_eq!(hw.output(kind), app.intensity(kind));
        }
    }
});
