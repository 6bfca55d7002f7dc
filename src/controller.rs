//! Game Boy joypad input latch ($FF00, P1).
//!
//! Writes drive the two select lines (bits 4–5, active low); reads return the four key lines
//! (bits 0–3, active low) for whichever group is selected. A line driven low on bit 4 reads the
//! action buttons (A, B, Select, Start); bit 5 reads the directions (Right, Left, Up, Down).
//! Bits 6–7 always read as 1.

/// The eight logical keys of the handheld.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Right,
    Left,
    Up,
    Down,
    A,
    B,
    Select,
    Start,
}

impl Key {
    pub const ALL: [Key; 8] = [
        Key::Right,
        Key::Left,
        Key::Up,
        Key::Down,
        Key::A,
        Key::B,
        Key::Select,
        Key::Start,
    ];

    fn mask(self) -> u8 {
        1 << (self as u8)
    }
}

/// Host-side key state the latch samples once per emulated instruction.
pub trait KeySource {
    fn key_pressed(&self, key: Key) -> bool;
}

/// Snapshot of all eight keys, one bit per `Key` (1 = pressed).
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct KeyState {
    pressed: u8,
}

impl KeyState {
    pub fn set(&mut self, key: Key, pressed: bool) {
        if pressed {
            self.pressed |= key.mask();
        } else {
            self.pressed &= !key.mask();
        }
    }

    pub fn press(&mut self, key: Key) {
        self.set(key, true);
    }

    pub fn release(&mut self, key: Key) {
        self.set(key, false);
    }

    /// Sample every key from another source.
    pub fn capture(source: &dyn KeySource) -> Self {
        let mut state = Self::default();
        for key in Key::ALL {
            state.set(key, source.key_pressed(key));
        }
        state
    }
}

impl KeySource for KeyState {
    fn key_pressed(&self, key: Key) -> bool {
        self.pressed & key.mask() != 0
    }
}

const SELECT_ACTION: u8 = 0x10;
const SELECT_DIRECTION: u8 = 0x20;
const SELECT_MASK: u8 = SELECT_ACTION | SELECT_DIRECTION;

/// P1 register: select lines written by the CPU, key lines sampled from the host.
pub struct Controller {
    /// Bits 4–5 as last written; both high (nothing selected) at power-up.
    select: u8,
    /// Keys as of the last `step`.
    keys: KeyState,
}

impl Controller {
    /// Create a controller with nothing selected and no keys pressed; reads $FF.
    pub fn new() -> Self {
        Self {
            select: SELECT_MASK,
            keys: KeyState::default(),
        }
    }

    /// Sample host key state. Called once per emulated instruction, before the CPU step.
    pub fn step(&mut self, source: &dyn KeySource) {
        self.keys = KeyState::capture(source);
    }

    /// Read $FF00. Key bits are recomputed from the selected lines on every read.
    pub fn read(&self) -> u8 {
        0xC0 | self.select | self.key_lines()
    }

    /// Write $FF00. Only the select lines are latched.
    pub fn write(&mut self, data: u8) {
        self.select = data & SELECT_MASK;
    }

    fn key_lines(&self) -> u8 {
        let mut lines = 0x0F;
        if self.select & SELECT_ACTION == 0 {
            lines &= !self.group_bits([Key::A, Key::B, Key::Select, Key::Start]);
        }
        if self.select & SELECT_DIRECTION == 0 {
            lines &= !self.group_bits([Key::Right, Key::Left, Key::Up, Key::Down]);
        }
        lines
    }

    /// Pressed keys of one group mapped onto bits 0–3.
    fn group_bits(&self, group: [Key; 4]) -> u8 {
        group
            .iter()
            .enumerate()
            .filter(|(_, key)| self.keys.key_pressed(**key))
            .fold(0, |bits, (i, _)| bits | (1 << i))
    }
}

impl Default for Controller {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pressed(keys: &[Key]) -> KeyState {
        let mut state = KeyState::default();
        for &key in keys {
            state.press(key);
        }
        state
    }

    #[test]
    fn released_by_default() {
        let pad = Controller::new();
        assert_eq!(pad.read(), 0xFF);
    }

    #[test]
    fn action_line_reports_a() {
        let mut pad = Controller::new();
        pad.write(0xEF);
        pad.step(&pressed(&[Key::A]));
        let value = pad.read();
        assert_eq!(value & 0x01, 0);
        assert_eq!(value & 0x0E, 0x0E);
    }

    #[test]
    fn direction_line_reports_arrows() {
        let mut pad = Controller::new();
        pad.write(0xDF);
        pad.step(&pressed(&[Key::Up, Key::A]));
        assert_eq!(pad.read() & 0x0F, 0x0B);
    }

    #[test]
    fn unselected_groups_read_released() {
        let mut pad = Controller::new();
        pad.write(0x30);
        pad.step(&pressed(&[Key::A, Key::Down, Key::Start]));
        assert_eq!(pad.read() & 0x0F, 0x0F);
    }

    #[test]
    fn writes_never_latch_key_bits() {
        let mut pad = Controller::new();
        pad.write(0x20);
        assert_eq!(pad.read(), 0xEF);
    }

    #[test]
    fn key_release_is_seen_on_next_step() {
        let mut pad = Controller::new();
        pad.write(0xEF);
        let mut keys = pressed(&[Key::Start]);
        pad.step(&keys);
        assert_eq!(pad.read() & 0x08, 0);
        keys.release(Key::Start);
        pad.step(&keys);
        assert_eq!(pad.read() & 0x08, 0x08);
    }
}
