//! Actuator state — the single owned aggregate behind every control path.
//!
//! Each actuator tracks its current intensity, the last strictly positive
//! intensity it held ("previous"), and a dirty flag that marks a pending
//! persistence write.  [`DeviceState`] owns all three and is itself owned
//! by [`AppService`](super::service::AppService); nothing else mutates it.

use core::fmt;

/// Highest accepted intensity.
pub const MAX_PERCENT: u8 = 100;

/// Number of bytes the persisted record occupies in the byte store.
pub const RECORD_LEN: usize = 6;

// ───────────────────────────────────────────────────────────────
// ActuatorKind
// ───────────────────────────────────────────────────────────────

/// The three physical outputs of the prop.  Fixed set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActuatorKind {
    /// Mist / fog generator.
    Fog,
    /// Water pump.
    Pump,
    /// Pulsing light strip.
    Light,
}

impl ActuatorKind {
    /// Every actuator, in persistence-address order.
    pub const ALL: [ActuatorKind; 3] = [Self::Fog, Self::Pump, Self::Light];

    const fn index(self) -> usize {
        match self {
            Self::Fog => 0,
            Self::Pump => 1,
            Self::Light => 2,
        }
    }

    /// Store address of the current intensity byte.
    pub const fn current_address(self) -> u16 {
        (self.index() * 2) as u16
    }

    /// Store address of the previous intensity byte.
    pub const fn previous_address(self) -> u16 {
        (self.index() * 2 + 1) as u16
    }

    /// Whether output changes on this actuator are ramped.
    pub const fn is_ramped(self) -> bool {
        matches!(self, Self::Light)
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Fog => "fog",
            Self::Pump => "pump",
            Self::Light => "light",
        }
    }
}

impl fmt::Display for ActuatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ───────────────────────────────────────────────────────────────
// ActuatorState
// ───────────────────────────────────────────────────────────────

/// Result of applying a new intensity to an [`ActuatorState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    /// Intensity before the change.
    pub from: u8,
    /// Intensity after the change.
    pub to: u8,
    /// Previous (last positive) intensity after the change.
    pub previous: u8,
}

impl Transition {
    pub fn changed(&self) -> bool {
        self.from != self.to
    }
}

/// Current / previous intensity for one actuator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActuatorState {
    current: u8,
    previous: u8,
    dirty: bool,
}

impl ActuatorState {
    /// Build a state from persisted bytes.
    ///
    /// Bytes outside `0..=100` are treated as corrupt and read as 0.  A
    /// positive current with a mismatched previous is repaired (previous
    /// always mirrors the last positive current) and marked dirty so the
    /// repaired record is written back on the next flush.
    pub fn restored(current: u8, previous: u8) -> Self {
        let current = sanitize(current);
        let previous = sanitize(previous);
        if current > 0 && previous != current {
            return Self {
                current,
                previous: current,
                dirty: true,
            };
        }
        Self {
            current,
            previous,
            dirty: false,
        }
    }

    /// Assign a new intensity (clamped to 100).
    ///
    /// A positive value also becomes the new previous intensity; zero
    /// leaves previous untouched.  Only a real change marks the state dirty.
    pub fn set(&mut self, percent: u8) -> Transition {
        let from = self.current;
        let to = percent.min(MAX_PERCENT);
        let previous_before = self.previous;

        self.current = to;
        if to > 0 {
            self.previous = to;
        }
        if from != to || previous_before != self.previous {
            self.dirty = true;
        }

        Transition {
            from,
            to,
            previous: self.previous,
        }
    }

    pub fn intensity(&self) -> u8 {
        self.current
    }

    pub fn previous_intensity(&self) -> u8 {
        self.previous
    }

    pub fn is_on(&self) -> bool {
        self.current > 0
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Level used when turning on without an explicit percent:
    /// the current level if already on, else the previous one, else full.
    pub fn resume_level(&self) -> u8 {
        if self.current > 0 {
            self.current
        } else if self.previous > 0 {
            self.previous
        } else {
            MAX_PERCENT
        }
    }

    fn mark_clean(&mut self) {
        self.dirty = false;
    }
}

fn sanitize(raw: u8) -> u8 {
    if raw > MAX_PERCENT { 0 } else { raw }
}

// ───────────────────────────────────────────────────────────────
// DeviceState
// ───────────────────────────────────────────────────────────────

/// The actuator set, one [`ActuatorState`] per [`ActuatorKind`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceState {
    actuators: [ActuatorState; 3],
}

impl DeviceState {
    /// Fresh state: everything off, nothing remembered, nothing dirty.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild the state from a persisted record in address order.
    pub fn from_record(record: &[u8; RECORD_LEN]) -> Self {
        let mut state = Self::new();
        for kind in ActuatorKind::ALL {
            *state.get_mut(kind) = ActuatorState::restored(
                record[kind.current_address() as usize],
                record[kind.previous_address() as usize],
            );
        }
        state
    }

    /// Serialise the state into its persisted record layout.
    pub fn to_record(&self) -> [u8; RECORD_LEN] {
        let mut record = [0u8; RECORD_LEN];
        for kind in ActuatorKind::ALL {
            let a = self.get(kind);
            record[kind.current_address() as usize] = a.intensity();
            record[kind.previous_address() as usize] = a.previous_intensity();
        }
        record
    }

    pub fn get(&self, kind: ActuatorKind) -> &ActuatorState {
        &self.actuators[kind.index()]
    }

    pub fn get_mut(&mut self, kind: ActuatorKind) -> &mut ActuatorState {
        &mut self.actuators[kind.index()]
    }

    /// Device-wide dirty flag: any actuator has an unpersisted change.
    pub fn is_dirty(&self) -> bool {
        self.actuators.iter().any(ActuatorState::is_dirty)
    }

    /// True iff any actuator is on.
    pub fn is_any_active(&self) -> bool {
        self.actuators.iter().any(ActuatorState::is_on)
    }

    /// Clear every dirty flag after a successful flush.
    pub fn mark_clean(&mut self) {
        for a in &mut self.actuators {
            a.mark_clean();
        }
    }
}
