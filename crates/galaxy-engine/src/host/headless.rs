use std::collections::HashMap;
use super::{FrameRequest, Host, ListenerId, ListenerKind, Viewport};
use crate::error::GalaxyError;

/// In-memory host. Frames only run when the caller drives them, and every
/// registration is counted so tests can check teardown leaves nothing behind.
pub struct HeadlessHost {
    viewport: Viewport,
    listeners: HashMap<ListenerId, ListenerKind>,
    pending_frames: Vec<FrameRequest>,
    next_listener: u32,
    next_frame: i32,
    /// Fail the next `listen` call (exercises mount rollback).
    fail_next_listen: bool,
}

impl HeadlessHost {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            listeners: HashMap::new(),
            pending_frames: Vec::new(),
            next_listener: 1,
            next_frame: 1,
            fail_next_listen: false,
        }
    }

    /// Make the next `listen` call fail.
    pub fn fail_next_listen(&mut self) {
        self.fail_next_listen = true;
    }

    /// Number of active listener registrations.
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Number of active registrations of one kind.
    pub fn listeners_of(&self, kind: ListenerKind) -> usize {
        self.listeners.values().filter(|&&k| k == kind).count()
    }

    /// Frame callbacks scheduled and not yet fired or cancelled.
    pub fn pending_frames(&self) -> usize {
        self.pending_frames.len()
    }

    /// Consume one pending frame, as the display refresh would.
    /// Returns false when nothing was scheduled.
    pub fn fire_frame(&mut self) -> bool {
        if self.pending_frames.is_empty() {
            return false;
        }
        self.pending_frames.remove(0);
        true
    }
}

impl Default for HeadlessHost {
    fn default() -> Self {
        Self::new(Viewport::new(1280, 720))
    }
}

impl Host for HeadlessHost {
    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn listen(&mut self, kind: ListenerKind) -> Result<ListenerId, GalaxyError> {
        if self.fail_next_listen {
            self.fail_next_listen = false;
            return Err(GalaxyError::Host(format!("cannot listen for {}", kind.event_name())));
        }
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        self.listeners.insert(id, kind);
        Ok(id)
    }

    fn unlisten(&mut self, id: ListenerId) {
        self.listeners.remove(&id);
    }

    fn request_frame(&mut self) -> Result<FrameRequest, GalaxyError> {
        let request = FrameRequest(self.next_frame);
        self.next_frame += 1;
        self.pending_frames.push(request);
        Ok(request)
    }

    fn cancel_frame(&mut self, request: FrameRequest) {
        self.pending_frames.retain(|&r| r != request);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listen_and_unlisten() {
        let mut host = HeadlessHost::default();
        let a = host.listen(ListenerKind::KeyDown).unwrap();
        let _b = host.listen(ListenerKind::Resize).unwrap();
        assert_eq!(host.listener_count(), 2);
        host.unlisten(a);
        host.unlisten(a);
        assert_eq!(host.listener_count(), 1);
        assert_eq!(host.listeners_of(ListenerKind::Resize), 1);
    }

    #[test]
    fn cancel_removes_pending_frame() {
        let mut host = HeadlessHost::default();
        let req = host.request_frame().unwrap();
        assert_eq!(host.pending_frames(), 1);
        host.cancel_frame(req);
        assert_eq!(host.pending_frames(), 0);
        assert!(!host.fire_frame());
    }

    #[test]
    fn fail_next_listen_fails_once() {
        let mut host = HeadlessHost::default();
        host.fail_next_listen();
        assert!(host.listen(ListenerKind::KeyUp).is_err());
        assert!(host.listen(ListenerKind::KeyUp).is_ok());
    }
}
