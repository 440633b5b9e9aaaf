use std::collections::HashMap;
use std::rc::Rc;
use galaxy_engine::{FrameRequest, GalaxyError, Host, HostEvent, ListenerId, ListenerKind, Viewport};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Event, KeyboardEvent, Window};

type EventClosure = Closure<dyn FnMut(Event)>;

/// Browser host: window listeners and `requestAnimationFrame`.
///
/// Events and frames are forwarded through the two callbacks given at
/// construction; they run outside any engine borrow.
pub struct WebHost {
    window: Window,
    dispatch: Rc<dyn Fn(HostEvent)>,
    listeners: HashMap<ListenerId, (ListenerKind, EventClosure)>,
    frame_closure: Closure<dyn FnMut(f64)>,
    next_listener: u32,
}

fn js_error(context: &str, err: JsValue) -> GalaxyError {
    GalaxyError::Host(format!("{}: {:?}", context, err))
}

fn window_viewport(window: &Window) -> Viewport {
    let dimension = |value: Result<JsValue, JsValue>| {
        value.ok().and_then(|v| v.as_f64()).unwrap_or(0.0).max(0.0) as u32
    };
    Viewport::new(dimension(window.inner_width()), dimension(window.inner_height()))
}

impl WebHost {
    pub fn new(window: Window, dispatch: Rc<dyn Fn(HostEvent)>, on_frame: Rc<dyn Fn()>) -> Self {
        let frame_closure = Closure::<dyn FnMut(f64)>::new(move |_timestamp: f64| on_frame());
        Self {
            window,
            dispatch,
            listeners: HashMap::new(),
            frame_closure,
            next_listener: 1,
        }
    }

    fn event_closure(&self, kind: ListenerKind) -> EventClosure {
        let dispatch = Rc::clone(&self.dispatch);
        match kind {
            ListenerKind::KeyDown | ListenerKind::KeyUp => {
                let pressed = kind == ListenerKind::KeyDown;
                Closure::<dyn FnMut(Event)>::new(move |event: Event| {
                    let Some(key) = event.dyn_ref::<KeyboardEvent>() else {
                        return;
                    };
                    if let Some(host_event) = HostEvent::key(&key.code(), pressed) {
                        dispatch(host_event);
                    }
                })
            }
            ListenerKind::Resize => {
                let window = self.window.clone();
                Closure::<dyn FnMut(Event)>::new(move |_event: Event| {
                    dispatch(HostEvent::Resize(window_viewport(&window)));
                })
            }
        }
    }
}

impl Host for WebHost {
    fn viewport(&self) -> Viewport {
        window_viewport(&self.window)
    }

    fn listen(&mut self, kind: ListenerKind) -> Result<ListenerId, GalaxyError> {
        let closure = self.event_closure(kind);
        self.window
            .add_event_listener_with_callback(kind.event_name(), closure.as_ref().unchecked_ref())
            .map_err(|e| js_error("addEventListener", e))?;
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        self.listeners.insert(id, (kind, closure));
        Ok(id)
    }

    fn unlisten(&mut self, id: ListenerId) {
        let Some((kind, closure)) = self.listeners.remove(&id) else {
            return;
        };
        if let Err(err) = self
            .window
            .remove_event_listener_with_callback(kind.event_name(), closure.as_ref().unchecked_ref())
        {
            log::warn!("removeEventListener({}) failed: {:?}", kind.event_name(), err);
        }
    }

    fn request_frame(&mut self) -> Result<FrameRequest, GalaxyError> {
        self.window
            .request_animation_frame(self.frame_closure.as_ref().unchecked_ref())
            .map(FrameRequest)
            .map_err(|e| js_error("requestAnimationFrame", e))
    }

    fn cancel_frame(&mut self, request: FrameRequest) {
        if let Err(err) = self.window.cancel_animation_frame(request.0) {
            log::warn!("cancelAnimationFrame failed: {:?}", err);
        }
    }
}
