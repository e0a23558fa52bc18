//! Output-level sequences for the light strip.
//!
//! Pure step generators: the service walks them, asserting each level on
//! the [`ActuatorPort`](super::ports::ActuatorPort) and holding for the
//! configured step delay in between.
//!
//! ```text
//!  ramp(0, 4)        0 ─ 1 ─ 2 ─ 3 ─ 4
//!  ramp(4, 0)        4 ─ 3 ─ 2 ─ 1 ─ 0
//!  heartbeat(8, 50)  7 ─ 6 ─ 5 ─ 4 ─ 5 ─ 6 ─ 7 ─ 8
//! ```

/// Monotonic one-percent steps from `from` to `to`, both ends inclusive.
pub fn ramp(from: u8, to: u8) -> impl Iterator<Item = u8> {
    let up = (from <= to).then(|| from..=to);
    let down = (from > to).then(|| (to..=from).rev());
    up.into_iter().flatten().chain(down.into_iter().flatten())
}

/// One triangular heartbeat sweep around `level`.
///
/// Walks down one step at a time to `level * floor_percent / 100` and back
/// up, finishing on `level` so the light is left exactly where it was.
/// The floor never drops below 1, so a lit light is never blacked out.
/// An off light (or a floor at or above the level) yields nothing.
pub fn heartbeat(level: u8, floor_percent: u8) -> impl Iterator<Item = u8> {
    let floor = ((u16::from(level) * u16::from(floor_percent.min(100)) / 100) as u8).max(1);
    let active = level > 0 && floor < level;
    let down = active.then(|| (floor..level).rev());
    let up = active.then(|| (floor + 1)..=level);
    down.into_iter().flatten().chain(up.into_iter().flatten())
}
