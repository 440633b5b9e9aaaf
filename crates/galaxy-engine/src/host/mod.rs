//! Host environment seam: viewport, event listeners, frame scheduling.
//!
//! The host delivers events back to the scene as `HostEvent`s between frames;
//! there is a single logical thread of execution.

pub mod headless;

pub use headless::HeadlessHost;

use crate::error::GalaxyError;
use crate::input::keys::KeyCode;

/// Viewport size in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Width / height, or 1.0 for a degenerate viewport.
    pub fn aspect(&self) -> f32 {
        if self.width == 0 || self.height == 0 {
            1.0
        } else {
            self.width as f32 / self.height as f32
        }
    }
}

/// Event kinds the scene subscribes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListenerKind {
    KeyDown,
    KeyUp,
    Resize,
}

impl ListenerKind {
    /// DOM event name.
    pub fn event_name(self) -> &'static str {
        match self {
            ListenerKind::KeyDown => "keydown",
            ListenerKind::KeyUp => "keyup",
            ListenerKind::Resize => "resize",
        }
    }
}

/// Registration token returned by `Host::listen`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub u32);

/// Token of a scheduled frame callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameRequest(pub i32);

/// Events delivered by the host. Keys outside the control set never get this far.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostEvent {
    KeyDown(KeyCode),
    KeyUp(KeyCode),
    Resize(Viewport),
}

impl HostEvent {
    /// Translate a DOM key event. Returns None for codes outside the control set.
    pub fn key(code: &str, pressed: bool) -> Option<Self> {
        let key = KeyCode::from_code(code)?;
        Some(if pressed { HostEvent::KeyDown(key) } else { HostEvent::KeyUp(key) })
    }
}

/// Capabilities the scene needs from its host environment.
pub trait Host {
    /// Current viewport size.
    fn viewport(&self) -> Viewport;

    /// Start delivering events of `kind`.
    fn listen(&mut self, kind: ListenerKind) -> Result<ListenerId, GalaxyError>;

    /// Stop delivering events for a registration. Unknown ids are ignored.
    fn unlisten(&mut self, id: ListenerId);

    /// Schedule the frame callback for the next display refresh.
    fn request_frame(&mut self) -> Result<FrameRequest, GalaxyError>;

    /// Cancel a scheduled frame callback. Stale requests are ignored.
    fn cancel_frame(&mut self, request: FrameRequest);
}
