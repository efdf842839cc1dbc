//! Input aggregation: raw pointer, touch, wheel and keyboard events folded
//! into a per-frame gesture snapshot plus continuous key and cursor state.
//!
//! [`InputCore`] is the whole state machine and has no browser dependency.
//! [`InputManager`] owns the DOM listeners that feed it.
//!
//! ## Touch/click lifecycle
//!
//! | From | Event | To | Effect |
//! |------|-------|----|--------|
//! | Idle | primary mouse-down, first touch-start | Active | `just_touched_down` |
//! | Active | mouse-move, touch-move | Active | `touch_position` follows the primary contact |
//! | Active | primary mouse-up, primary touch-end or touch-cancel | Idle | `just_touched_up`, pinch baseline reset |
//!
//! One-frame fields (`just_*`) persist until [`InputCore::clear_one_frame_events`].

#[cfg(test)]
#[path = "aggregator_test.rs"]
mod aggregator_test;

use std::cell::{Ref, RefCell, RefMut};
use std::collections::HashSet;
use std::rc::Rc;

use web_sys::{HtmlCanvasElement, KeyboardEvent, MouseEvent, TouchEvent, TouchList, WheelEvent};

use crate::dom::{self, Listener};
use crate::error::Result;
use crate::geom::Point;
use crate::input::{
    Button, InputOptions, Key, Modifiers, PanGesture, TouchGesture, TouchPoint, Viewport, WheelDelta, ZoomGesture,
    accumulate,
};

/// Maps surface pixels to the coordinates callers want (e.g. world space).
pub type PositionTransform = Box<dyn Fn(Point) -> Point>;

/// Input state machine. Feed it events in delivery order; read it once per frame.
pub struct InputCore {
    options: InputOptions,
    viewport: Viewport,
    transform: PositionTransform,

    // Cursor
    raw_cursor_position: Point,
    cursor_position: Point,

    // Touch/click lifecycle
    initial_touch_position: Option<Point>,
    touch_position: Option<Point>,
    primary_id: Option<i32>,
    last_pinch_distance: Option<f64>,

    // One-frame events
    just_touched_down: Option<TouchGesture>,
    just_touched_up: Option<TouchGesture>,
    just_pan: Option<PanGesture>,
    just_zoom: Option<ZoomGesture>,
    just_pressed: HashSet<Key>,
    just_released: HashSet<Key>,

    held_keys: HashSet<Key>,
}

impl Default for InputCore {
    fn default() -> Self {
        Self::new(InputOptions::default())
    }
}

impl InputCore {
    #[must_use]
    pub fn new(options: InputOptions) -> Self {
        Self {
            options,
            viewport: Viewport::default(),
            transform: Box::new(|p| p),
            raw_cursor_position: Point::ZERO,
            cursor_position: Point::ZERO,
            initial_touch_position: None,
            touch_position: None,
            primary_id: None,
            last_pinch_distance: None,
            just_touched_down: None,
            just_touched_up: None,
            just_pan: None,
            just_zoom: None,
            just_pressed: HashSet::new(),
            just_released: HashSet::new(),
            held_keys: HashSet::new(),
        }
    }

    /// Builder form of [`Self::set_transform`].
    #[must_use]
    pub fn with_transform(mut self, transform: impl Fn(Point) -> Point + 'static) -> Self {
        self.transform = Box::new(transform);
        self
    }

    /// Replace the position transform applied after pixel-ratio scaling.
    pub fn set_transform(&mut self, transform: impl Fn(Point) -> Point + 'static) {
        self.transform = Box::new(transform);
    }

    /// Update the surface origin and pixel ratio used for the next events.
    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = Viewport::new(viewport.left, viewport.top, viewport.pixel_ratio);
    }

    #[must_use]
    pub fn options(&self) -> &InputOptions {
        &self.options
    }

    pub fn options_mut(&mut self) -> &mut InputOptions {
        &mut self.options
    }

    // --- Queries ---

    /// Last mouse position in device pixels, not relative to the surface.
    #[must_use]
    pub fn raw_cursor_position(&self) -> Point {
        self.raw_cursor_position
    }

    /// Last mouse position in transformed surface coordinates.
    #[must_use]
    pub fn cursor_position(&self) -> Point {
        self.cursor_position
    }

    #[must_use]
    pub fn initial_touch_position(&self) -> Option<Point> {
        self.initial_touch_position
    }

    #[must_use]
    pub fn touch_position(&self) -> Option<Point> {
        self.touch_position
    }

    #[must_use]
    pub fn is_touch_down(&self) -> bool {
        self.touch_position.is_some()
    }

    #[must_use]
    pub fn just_touched_down(&self) -> Option<TouchGesture> {
        self.just_touched_down
    }

    #[must_use]
    pub fn just_touched_up(&self) -> Option<TouchGesture> {
        self.just_touched_up
    }

    #[must_use]
    pub fn just_pan(&self) -> Option<PanGesture> {
        self.just_pan
    }

    #[must_use]
    pub fn just_zoom(&self) -> Option<ZoomGesture> {
        self.just_zoom
    }

    #[must_use]
    pub fn just_pressed(&self) -> &HashSet<Key> {
        &self.just_pressed
    }

    #[must_use]
    pub fn just_released(&self) -> &HashSet<Key> {
        &self.just_released
    }

    #[must_use]
    pub fn is_key_down(&self, key: &str) -> bool {
        self.held_keys.contains(key)
    }

    #[must_use]
    pub fn was_just_pressed(&self, key: &str) -> bool {
        self.just_pressed.contains(key)
    }

    #[must_use]
    pub fn was_just_released(&self, key: &str) -> bool {
        self.just_released.contains(key)
    }

    /// Reset every one-frame field. Held keys, cursor and touch state survive.
    pub fn clear_one_frame_events(&mut self) {
        self.just_touched_down = None;
        self.just_touched_up = None;
        self.just_pan = None;
        self.just_zoom = None;
        self.just_pressed.clear();
        self.just_released.clear();
    }

    // --- Pointer ---

    pub fn on_mouse_move(&mut self, client: Point) {
        self.raw_cursor_position = client * self.viewport.pixel_ratio;
        let position = self.to_logical(client);
        self.cursor_position = position;
        if let Some(touch) = &mut self.touch_position {
            *touch = position;
        }
    }

    pub fn on_mouse_down(&mut self, client: Point, button: Button) {
        if button != Button::Primary || self.is_touch_down() {
            return;
        }
        let position = self.to_logical(client);
        self.begin_touch(position);
    }

    pub fn on_mouse_up(&mut self, client: Point, button: Button) {
        if button != Button::Primary {
            return;
        }
        let position = self.to_logical(client);
        self.end_touch(position);
    }

    // --- Wheel ---

    /// Ctrl+wheel zooms; plain wheel pans. Both accumulate until cleared.
    pub fn on_wheel(&mut self, delta: WheelDelta, modifiers: Modifiers) {
        if modifiers.ctrl {
            let zoom = ZoomGesture { delta: delta.dy * self.options.zoom_sensitivity };
            accumulate(&mut self.just_zoom, zoom);
        } else {
            accumulate(&mut self.just_pan, PanGesture { offset: Point::new(delta.dx, delta.dy) });
        }
    }

    // --- Touch ---

    /// `touches` is every contact currently on the surface.
    pub fn on_touch_start(&mut self, touches: &[TouchPoint]) {
        let Some(primary) = self.primary_contact(touches) else {
            return;
        };
        let position = self.to_logical(primary.client);
        if self.is_touch_down() {
            // Another finger joined: restart pan offsets from here.
            self.initial_touch_position = Some(position);
            self.touch_position = Some(position);
            return;
        }
        self.primary_id = Some(primary.id);
        self.begin_touch(position);
    }

    /// `touches` is every contact currently on the surface.
    pub fn on_touch_move(&mut self, touches: &[TouchPoint]) {
        let Some(primary) = self.primary_contact(touches) else {
            return;
        };
        let position = self.to_logical(primary.client);
        if let Some(touch) = &mut self.touch_position {
            *touch = position;
        }

        if let Some(initial) = self.initial_touch_position
            && (touches.len() >= 2 || self.options.pan_with_single_finger)
        {
            self.just_pan = Some(PanGesture { offset: initial - position });
        }

        if let Some(other) = auxiliary_contact(touches, primary.id) {
            let distance = primary.client.distance_to(other.client);
            if let Some(last) = self.last_pinch_distance {
                let zoom = ZoomGesture { delta: (distance - last) * self.options.touch_zoom_sensitivity };
                accumulate(&mut self.just_zoom, zoom);
            }
            self.last_pinch_distance = Some(distance);
        }
    }

    /// `changed` is the contacts that lifted.
    ///
    /// Lifting only secondary contacts keeps the touch active; it just drops
    /// the pinch pair so the next move starts a fresh baseline.
    pub fn on_touch_end(&mut self, changed: &[TouchPoint]) {
        if let Some(id) = self.primary_id
            && !changed.is_empty()
            && changed.iter().all(|t| t.id != id)
        {
            self.last_pinch_distance = None;
            return;
        }

        let position = match self.primary_contact(changed) {
            Some(contact) => Some(self.to_logical(contact.client)),
            None => self.touch_position,
        };
        self.last_pinch_distance = None;
        if let Some(position) = position {
            self.end_touch(position);
        }
    }

    /// The platform aborted the touches; same as lifting them.
    pub fn on_touch_cancel(&mut self, changed: &[TouchPoint]) {
        self.on_touch_end(changed);
    }

    // --- Keyboard ---

    pub fn on_key_down(&mut self, key: Key) {
        self.held_keys.insert(key.clone());
        self.just_pressed.insert(key);
    }

    pub fn on_key_up(&mut self, key: Key) {
        self.held_keys.remove(&key);
        self.just_released.insert(key);
    }

    // --- Internals ---

    fn to_logical(&self, client: Point) -> Point {
        (self.transform)(self.viewport.to_surface(client))
    }

    fn begin_touch(&mut self, position: Point) {
        log::trace!("touch down at ({}, {})", position.x, position.y);
        self.just_touched_down = Some(TouchGesture::new(position));
        self.initial_touch_position = Some(position);
        self.touch_position = Some(position);
    }

    fn end_touch(&mut self, position: Point) {
        let Some(initial_position) = self.initial_touch_position.take() else {
            return;
        };
        log::trace!("touch up at ({}, {})", position.x, position.y);
        self.just_touched_up = Some(TouchGesture { position, initial_position });
        self.touch_position = None;
        self.primary_id = None;
        self.last_pinch_distance = None;
    }

    /// The tracked primary contact if present, else the lowest identifier.
    fn primary_contact(&self, touches: &[TouchPoint]) -> Option<TouchPoint> {
        self.primary_id
            .and_then(|id| touches.iter().find(|t| t.id == id))
            .or_else(|| touches.iter().min_by_key(|t| t.id))
            .copied()
    }
}

/// Lowest-identifier contact other than the primary.
fn auxiliary_contact(touches: &[TouchPoint], primary_id: i32) -> Option<TouchPoint> {
    touches.iter().filter(|t| t.id != primary_id).min_by_key(|t| t.id).copied()
}

// =============================================================
// DOM binding
// =============================================================

/// Shared handle to an [`InputCore`] fed by browser events.
///
/// Mouse-move and keyboard listeners sit on the window, everything else on
/// the canvas. All of them are removed when the manager is destroyed or dropped.
pub struct InputManager {
    core: Rc<RefCell<InputCore>>,
    listeners: Vec<Listener>,
}

impl InputManager {
    /// Start listening with an identity position transform.
    ///
    /// # Errors
    ///
    /// Returns `Err` if there is no window or a listener cannot be registered.
    /// Listeners registered before the failure are removed again.
    pub fn new(canvas: &HtmlCanvasElement, options: InputOptions) -> Result<Self> {
        Self::attach(canvas, InputCore::new(options))
    }

    /// Start listening, mapping every position through `transform`.
    ///
    /// # Errors
    ///
    /// Same as [`Self::new`].
    pub fn with_transform(
        canvas: &HtmlCanvasElement,
        options: InputOptions,
        transform: impl Fn(Point) -> Point + 'static,
    ) -> Result<Self> {
        Self::attach(canvas, InputCore::new(options).with_transform(transform))
    }

    fn attach(canvas: &HtmlCanvasElement, core: InputCore) -> Result<Self> {
        let window = dom::window()?;
        let core = Rc::new(RefCell::new(core));
        let on_canvas: &web_sys::EventTarget = canvas;
        let on_window: &web_sys::EventTarget = &window;

        let listeners = vec![
            Listener::new(on_window, "mousemove", true, dispatch(&core, canvas, |c, e: MouseEvent| {
                c.on_mouse_move(client_point(&e));
            }))?,
            Listener::new(on_canvas, "mousedown", true, dispatch(&core, canvas, |c, e: MouseEvent| {
                c.on_mouse_down(client_point(&e), Button::from_dom(e.button()));
            }))?,
            Listener::new(on_canvas, "mouseup", true, dispatch(&core, canvas, |c, e: MouseEvent| {
                c.on_mouse_up(client_point(&e), Button::from_dom(e.button()));
            }))?,
            Listener::new(on_canvas, "wheel", false, dispatch(&core, canvas, |c, e: WheelEvent| {
                e.prevent_default();
                let modifiers =
                    Modifiers { shift: e.shift_key(), ctrl: e.ctrl_key(), alt: e.alt_key(), meta: e.meta_key() };
                c.on_wheel(WheelDelta { dx: e.delta_x(), dy: e.delta_y() }, modifiers);
            }))?,
            Listener::new(on_window, "keydown", true, dispatch(&core, canvas, |c, e: KeyboardEvent| {
                c.on_key_down(Key(e.key()));
            }))?,
            Listener::new(on_window, "keyup", true, dispatch(&core, canvas, |c, e: KeyboardEvent| {
                c.on_key_up(Key(e.key()));
            }))?,
            Listener::new(on_canvas, "touchstart", false, dispatch(&core, canvas, |c, e: TouchEvent| {
                e.prevent_default();
                c.on_touch_start(&touch_points(&e.touches()));
            }))?,
            Listener::new(on_canvas, "touchmove", false, dispatch(&core, canvas, |c, e: TouchEvent| {
                e.prevent_default();
                c.on_touch_move(&touch_points(&e.touches()));
            }))?,
            Listener::new(on_canvas, "touchend", true, dispatch(&core, canvas, |c, e: TouchEvent| {
                c.on_touch_end(&touch_points(&e.changed_touches()));
            }))?,
            Listener::new(on_canvas, "touchcancel", true, dispatch(&core, canvas, |c, e: TouchEvent| {
                c.on_touch_cancel(&touch_points(&e.changed_touches()));
            }))?,
        ];

        Ok(Self { core, listeners })
    }

    /// Borrow the aggregated state.
    #[must_use]
    pub fn state(&self) -> Ref<'_, InputCore> {
        self.core.borrow()
    }

    /// Mutably borrow the aggregated state.
    #[must_use]
    pub fn state_mut(&self) -> RefMut<'_, InputCore> {
        self.core.borrow_mut()
    }

    /// A second owner of the state, for closures that outlive a borrow.
    #[must_use]
    pub fn handle(&self) -> Rc<RefCell<InputCore>> {
        Rc::clone(&self.core)
    }

    pub fn clear_one_frame_events(&self) {
        self.core.borrow_mut().clear_one_frame_events();
    }

    /// Remove every listener now. Dropping the manager does the same.
    pub fn destroy(mut self) {
        self.listeners.clear();
    }
}

/// Wrap a core handler so it refreshes the viewport before every event.
fn dispatch<E, F>(core: &Rc<RefCell<InputCore>>, canvas: &HtmlCanvasElement, handle: F) -> impl FnMut(E) + 'static
where
    E: 'static,
    F: Fn(&mut InputCore, E) + 'static,
{
    let core = Rc::clone(core);
    let canvas = canvas.clone();
    move |event: E| {
        let Ok(mut state) = core.try_borrow_mut() else {
            log::warn!("input state busy, dropping event");
            return;
        };
        let rect = canvas.get_bounding_client_rect();
        state.set_viewport(Viewport::new(rect.left(), rect.top(), dom::pixel_ratio()));
        handle(&mut *state, event);
    }
}

fn client_point(e: &MouseEvent) -> Point {
    Point::new(f64::from(e.client_x()), f64::from(e.client_y()))
}

fn touch_points(list: &TouchList) -> Vec<TouchPoint> {
    (0..list.length())
        .filter_map(|i| list.get(i))
        .map(|t| TouchPoint::new(t.identifier(), f64::from(t.client_x()), f64::from(t.client_y())))
        .collect()
}
