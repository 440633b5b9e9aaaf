use glam::Vec3;

/// Physical keys the scene reacts to, identified by DOM `KeyboardEvent.code`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    KeyW,
    KeyS,
    KeyA,
    KeyD,
    Space,
    ShiftLeft,
}

impl KeyCode {
    pub const ALL: [KeyCode; 10] = [
        KeyCode::ArrowUp,
        KeyCode::ArrowDown,
        KeyCode::ArrowLeft,
        KeyCode::ArrowRight,
        KeyCode::KeyW,
        KeyCode::KeyS,
        KeyCode::KeyA,
        KeyCode::KeyD,
        KeyCode::Space,
        KeyCode::ShiftLeft,
    ];

    /// Parse a DOM `code` string. Anything outside the control set is None.
    pub fn from_code(code: &str) -> Option<Self> {
        Some(match code {
            "ArrowUp" => KeyCode::ArrowUp,
            "ArrowDown" => KeyCode::ArrowDown,
            "ArrowLeft" => KeyCode::ArrowLeft,
            "ArrowRight" => KeyCode::ArrowRight,
            "KeyW" => KeyCode::KeyW,
            "KeyS" => KeyCode::KeyS,
            "KeyA" => KeyCode::KeyA,
            "KeyD" => KeyCode::KeyD,
            "Space" => KeyCode::Space,
            "ShiftLeft" => KeyCode::ShiftLeft,
            _ => return None,
        })
    }

    fn slot(self) -> usize {
        self as usize
    }
}

/// Logical controls, each bound to one or two physical keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlKey {
    Forward,
    Backward,
    Left,
    Right,
    StrafeLeft,
    StrafeRight,
    Up,
    Down,
}

impl ControlKey {
    /// Physical keys that drive this control.
    pub fn bindings(self) -> &'static [KeyCode] {
        match self {
            ControlKey::Forward => &[KeyCode::KeyW, KeyCode::ArrowUp],
            ControlKey::Backward => &[KeyCode::KeyS, KeyCode::ArrowDown],
            ControlKey::Left => &[KeyCode::ArrowLeft],
            ControlKey::Right => &[KeyCode::ArrowRight],
            ControlKey::StrafeLeft => &[KeyCode::KeyA],
            ControlKey::StrafeRight => &[KeyCode::KeyD],
            ControlKey::Up => &[KeyCode::Space],
            ControlKey::Down => &[KeyCode::ShiftLeft],
        }
    }
}

/// Lines of the on-screen controls overlay.
pub const CONTROL_HINTS: [&str; 4] = [
    "Navigation Controls:",
    "WASD or Arrow Keys: Move horizontally",
    "Space: Move up",
    "Shift: Move down",
];

/// Held state of every control key. Level-triggered: key repeat is harmless.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputState {
    held: [bool; KeyCode::ALL.len()],
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn press(&mut self, key: KeyCode) {
        self.held[key.slot()] = true;
    }

    pub fn release(&mut self, key: KeyCode) {
        self.held[key.slot()] = false;
    }

    pub fn is_key_held(&self, key: KeyCode) -> bool {
        self.held[key.slot()]
    }

    /// Whether any key bound to `control` is held.
    pub fn is_held(&self, control: ControlKey) -> bool {
        control.bindings().iter().any(|&k| self.is_key_held(k))
    }

    /// Release everything (e.g. on teardown).
    pub fn clear(&mut self) {
        self.held = [false; KeyCode::ALL.len()];
    }

    /// Direction to move in camera-local axes, each component in {-1, 0, 1}.
    /// Forward is -Z. Left/StrafeLeft (and Right/StrafeRight) share an axis and do not stack.
    pub fn movement(&self) -> Vec3 {
        let axis = |neg: bool, pos: bool| (pos as i8 - neg as i8) as f32;
        Vec3::new(
            axis(
                self.is_held(ControlKey::Left) || self.is_held(ControlKey::StrafeLeft),
                self.is_held(ControlKey::Right) || self.is_held(ControlKey::StrafeRight),
            ),
            axis(self.is_held(ControlKey::Down), self.is_held(ControlKey::Up)),
            axis(self.is_held(ControlKey::Forward), self.is_held(ControlKey::Backward)),
        )
    }
}
