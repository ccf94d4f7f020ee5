//! The edit session: one aggregate owning the store, the view transform and
//! the interaction state machine.
//!
//! Hosts feed raw input events into [`EngineCore`] and get back a list of
//! [`Action`]s describing what changed. Nothing here touches a window, a
//! display server or an encoder directly; those arrive through the traits in
//! [`crate::collab`].

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

use std::path::Path;

use tracing::debug;

use crate::camera::Camera;
use crate::collab::{CanvasSource, CollabError, Encoder, RawImage, Recorder, RecordingEvent, Renderer};
use crate::config::OverlayConfig;
use crate::doc::{ActiveSlot, Annotation, AnnotationKind, AnnotationStore, Color, Freeform, Shape, Style, Text};
use crate::geometry::{Point, Size};
use crate::hit::topmost_hit_with;
use crate::input::{Button, EditMode, Gesture, Key, Modifiers, WheelDelta};

/// Actions returned from input handlers for the host to process.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    AnnotationAdded { kind: AnnotationKind, index: usize },
    AnnotationRemoved { kind: AnnotationKind, index: usize },
    TextEditStarted { index: usize },
    TextCommitted { index: usize },
    TextDiscarded,
    ColorPicked(Color),
    ModeChanged(EditMode),
    /// The live desktop should be captured and shown frozen from now on.
    CanvasFrozen,
    ZoomReset,
    Cleared,
    RenderNeeded,
}

/// Core session state. All logic that does not depend on a window.
#[derive(Debug)]
pub struct EngineCore {
    pub store: AnnotationStore,
    pub camera: Camera,
    config: OverlayConfig,
    mode: EditMode,
    draw_mode: AnnotationKind,
    style: Style,
    live_mode: bool,
    canvas: Option<RawImage>,
    gesture: Option<Gesture>,
    saved_color: Option<Color>,
}

impl Default for EngineCore {
    fn default() -> Self {
        Self::with_config(OverlayConfig::default())
    }
}

impl EngineCore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty live session tuned by `config`.
    #[must_use]
    pub fn with_config(config: OverlayConfig) -> Self {
        let camera = Camera { density_factor: config.density_factor, max_zoom: config.max_zoom, ..Camera::default() };
        Self {
            store: AnnotationStore::new(),
            camera,
            config,
            mode: EditMode::Idle,
            draw_mode: AnnotationKind::default(),
            style: Style { stroke_width: config.stroke_width, ..Style::default() },
            live_mode: true,
            canvas: None,
            gesture: None,
            saved_color: None,
        }
    }

    // --- Queries ---

    #[must_use]
    pub fn mode(&self) -> EditMode {
        self.mode
    }

    #[must_use]
    pub fn draw_mode(&self) -> AnnotationKind {
        self.draw_mode
    }

    #[must_use]
    pub fn style(&self) -> Style {
        self.style
    }

    /// Whether the overlay sits over the live desktop rather than a frozen raster.
    #[must_use]
    pub fn live_mode(&self) -> bool {
        self.live_mode
    }

    #[must_use]
    pub fn canvas(&self) -> Option<&RawImage> {
        self.canvas.as_ref()
    }

    /// The draw in progress, for previewing the uncommitted shape.
    #[must_use]
    pub fn gesture(&self) -> Option<Gesture> {
        self.gesture
    }

    #[must_use]
    pub fn config(&self) -> &OverlayConfig {
        &self.config
    }

    /// Index of the annotation of `kind` under the cursor, for hover feedback.
    #[must_use]
    pub fn hover_hit(&self, kind: AnnotationKind, screen_pt: Point) -> Option<usize> {
        topmost_hit_with(kind, screen_pt, &self.store, &self.camera, self.config.min_hit_edge)
    }

    // --- Settings ---

    pub fn set_draw_mode(&mut self, kind: AnnotationKind) {
        self.draw_mode = kind;
    }

    pub fn set_style(&mut self, style: Style) {
        self.style = style;
    }

    pub fn set_color(&mut self, color: Color) {
        self.style.color = color;
    }

    pub fn set_stroke_width(&mut self, width: u32) {
        self.style.stroke_width = width;
    }

    // --- Canvas / viewport ---

    /// Install a raster as the canvas and reset the view to it.
    pub fn set_canvas(&mut self, image: RawImage) {
        let density = self.config.density_factor;
        let original = image.size().scale(density, density);
        self.camera = Camera {
            max_zoom: self.config.max_zoom,
            ..Camera::new(original, self.camera.viewport_size, density)
        };
        debug!(width = image.width(), height = image.height(), "canvas installed");
        self.canvas = Some(image);
    }

    /// Resize the viewport. Without a canvas the view covers the viewport exactly.
    pub fn set_viewport(&mut self, size: Size) {
        self.camera.viewport_size = size;
        if self.canvas.is_none() {
            self.camera.canvas_original_size = size;
            self.camera.canvas_size = size.scale(self.camera.zoom_scale, self.camera.zoom_scale);
        }
        self.camera.clamp_pan();
    }

    /// Replace the whole session, as after restoring a saved file. The view
    /// always comes back at zoom 1.0.
    pub fn load(&mut self, store: AnnotationStore, canvas: Option<RawImage>, live_mode: bool) {
        let viewport = self.camera.viewport_size;
        self.store = store;
        self.store.clear_active();
        self.mode = EditMode::Idle;
        self.gesture = None;
        self.saved_color = None;
        self.live_mode = live_mode;
        match canvas {
            Some(image) => self.set_canvas(image),
            None => {
                self.canvas = None;
                self.camera.reset_zoom();
                self.set_viewport(viewport);
            }
        }
    }

    /// Capture the desktop and freeze it as the canvas.
    ///
    /// # Errors
    ///
    /// Propagates the capture failure; the session is left unchanged.
    pub fn freeze(&mut self, source: &mut impl CanvasSource) -> Result<Vec<Action>, CollabError> {
        let image = source.capture()?;
        self.set_canvas(image);
        self.live_mode = false;
        Ok(vec![Action::CanvasFrozen, Action::RenderNeeded])
    }

    /// Load an image file as a frozen canvas.
    ///
    /// # Errors
    ///
    /// Propagates the load failure; the session is left unchanged.
    pub fn load_canvas(&mut self, source: &mut impl CanvasSource, path: &Path) -> Result<Vec<Action>, CollabError> {
        let image = source.load_image(path)?;
        self.set_canvas(image);
        self.live_mode = false;
        Ok(vec![Action::RenderNeeded])
    }

    /// Hand the current state to a renderer.
    ///
    /// # Errors
    ///
    /// Propagates the renderer's failure.
    pub fn render(&self, renderer: &mut impl Renderer) -> Result<(), CollabError> {
        renderer.paint(self)
    }

    /// Start or stop recording at the viewport resolution.
    ///
    /// # Errors
    ///
    /// Propagates the encoder's failure.
    pub fn toggle_recording<E: Encoder>(&self, recorder: &mut Recorder<E>) -> Result<RecordingEvent, CollabError> {
        recorder.toggle(self.camera.viewport_size)
    }

    /// Push the current canvas to a running recording.
    ///
    /// # Errors
    ///
    /// Propagates the encoder's failure.
    pub fn record_frame<E: Encoder>(&self, recorder: &mut Recorder<E>) -> Result<(), CollabError> {
        match &self.canvas {
            Some(image) => recorder.push(image),
            None => Ok(()),
        }
    }

    // --- Pointer events ---

    pub fn on_pointer_down(&mut self, screen_pt: Point, button: Button, modifiers: Modifiers) -> Vec<Action> {
        if button != Button::Primary {
            return Vec::new();
        }
        match self.mode {
            EditMode::Idle => self.begin_gesture(screen_pt, modifiers),
            EditMode::TypingText => {
                let mut actions = self.finish_text();
                actions.extend(self.begin_gesture(screen_pt, modifiers));
                actions
            }
            EditMode::Deleting => self.delete_under(screen_pt),
            EditMode::PickingColor => self.pick_color(screen_pt),
            EditMode::Drawing => Vec::new(),
        }
    }

    pub fn on_pointer_move(&mut self, screen_pt: Point, _modifiers: Modifiers) -> Vec<Action> {
        if self.mode != EditMode::Drawing {
            return Vec::new();
        }
        let Some(gesture) = self.gesture.as_mut() else {
            return Vec::new();
        };
        let p = self.camera.screen_to_canvas(screen_pt);
        gesture.end = p;
        if gesture.kind == AnnotationKind::Freeform {
            let start = gesture.start;
            self.extend_freeform(start, p);
        }
        vec![Action::RenderNeeded]
    }

    pub fn on_pointer_up(&mut self, screen_pt: Point, button: Button, _modifiers: Modifiers) -> Vec<Action> {
        if button != Button::Primary || self.mode != EditMode::Drawing {
            return Vec::new();
        }
        let Some(mut gesture) = self.gesture.take() else {
            return self.set_mode(EditMode::Idle);
        };
        let p = self.camera.screen_to_canvas(screen_pt);
        if gesture.kind == AnnotationKind::Freeform {
            self.extend_freeform(gesture.start, p);
        }
        gesture.end = p;
        self.commit(gesture)
    }

    pub fn on_wheel(&mut self, screen_pt: Point, delta: WheelDelta, _modifiers: Modifiers) -> Vec<Action> {
        if delta.dy == 0.0 {
            return Vec::new();
        }
        let step = self.config.zoom_step;
        let factor = if delta.dy < 0.0 { 1.0 + step } else { 1.0 - step };
        self.camera.zoom_at(screen_pt, self.camera.zoom_scale * factor);
        self.camera.clamp_pan();
        debug!(zoom = self.camera.zoom_scale, "zoom");
        vec![Action::RenderNeeded]
    }

    /// Pan by a screen-space drag delta. Refused over the live desktop at
    /// zoom 1.0, where there is nothing to pan to.
    pub fn on_pan(&mut self, delta: Point) -> Vec<Action> {
        if self.live_mode && !self.camera.is_zoomed() {
            return Vec::new();
        }
        self.camera.pan(delta);
        self.camera.clamp_pan();
        vec![Action::RenderNeeded]
    }

    // --- Keyboard ---

    pub fn on_key_down(&mut self, key: &Key, modifiers: Modifiers) -> Vec<Action> {
        if self.mode == EditMode::TypingText {
            return self.type_key(key, modifiers);
        }
        if key.is(Key::ESCAPE) {
            return self.escape();
        }
        Vec::new()
    }

    // --- Commands ---

    /// Idle ⇄ Deleting.
    pub fn toggle_delete(&mut self) -> Vec<Action> {
        match self.mode {
            EditMode::Idle => self.set_mode(EditMode::Deleting),
            EditMode::Deleting => self.set_mode(EditMode::Idle),
            _ => Vec::new(),
        }
    }

    /// Idle ⇄ PickingColor. Leaving without a pick restores the prior color.
    pub fn toggle_picker(&mut self) -> Vec<Action> {
        match self.mode {
            EditMode::Idle => {
                self.saved_color = Some(self.style.color);
                self.set_mode(EditMode::PickingColor)
            }
            EditMode::PickingColor => self.cancel_picker(),
            _ => Vec::new(),
        }
    }

    /// Back out of the current modal state, or reset zoom if none is active.
    pub fn escape(&mut self) -> Vec<Action> {
        match self.mode {
            EditMode::PickingColor => self.cancel_picker(),
            EditMode::Deleting => self.set_mode(EditMode::Idle),
            EditMode::TypingText => self.finish_text(),
            EditMode::Drawing => {
                // Drop the gesture before the view changes under it.
                let mut actions = self.cancel_gesture();
                actions.extend(self.reset_zoom());
                actions
            }
            EditMode::Idle => self.reset_zoom(),
        }
    }

    /// Remove the most recent annotation of the current draw kind. If that
    /// was the record being drawn or typed, the edit ends with it.
    pub fn undo(&mut self) -> Vec<Action> {
        if self.mode.is_modal() {
            return Vec::new();
        }
        let kind = self.draw_mode;
        let Some(index) = self.store.count(kind).checked_sub(1) else {
            return Vec::new();
        };
        let was_active = self.store.active() == Some(ActiveSlot { kind, index });
        if self.store.remove_last(kind).is_none() {
            return Vec::new();
        }
        debug!(?kind, index, "undo");
        let mut actions = vec![Action::AnnotationRemoved { kind, index }, Action::RenderNeeded];
        if was_active {
            self.gesture = None;
            actions.extend(self.set_mode(EditMode::Idle));
        }
        actions
    }

    /// Empty every collection and abandon any edit in progress.
    pub fn clear_all(&mut self) -> Vec<Action> {
        if self.mode.is_modal() {
            return Vec::new();
        }
        self.store.clear_all();
        self.gesture = None;
        debug!("cleared all annotations");
        let mut actions = vec![Action::Cleared, Action::RenderNeeded];
        actions.extend(self.set_mode(EditMode::Idle));
        actions
    }

    // --- Internals ---

    fn reset_zoom(&mut self) -> Vec<Action> {
        if !self.camera.is_zoomed() {
            return Vec::new();
        }
        self.camera.reset_zoom();
        debug!("zoom reset");
        vec![Action::ZoomReset, Action::RenderNeeded]
    }

    /// Abandon the drag in progress. A freeform stroke being drawn goes too.
    fn cancel_gesture(&mut self) -> Vec<Action> {
        self.gesture = None;
        if let Some(slot) = self.store.active().filter(|s| s.kind == AnnotationKind::Freeform) {
            self.store.remove_at(slot.kind, slot.index);
        }
        self.store.clear_active();
        self.set_mode(EditMode::Idle)
    }

    fn set_mode(&mut self, mode: EditMode) -> Vec<Action> {
        if self.mode == mode {
            return Vec::new();
        }
        debug!(from = ?self.mode, to = ?mode, "mode change");
        self.mode = mode;
        vec![Action::ModeChanged(mode), Action::RenderNeeded]
    }

    fn begin_gesture(&mut self, screen_pt: Point, modifiers: Modifiers) -> Vec<Action> {
        if modifiers.ctrl {
            if let Some(index) = self.hover_hit(AnnotationKind::Text, screen_pt) {
                return self.reenter_text(index);
            }
        }
        let p = self.camera.screen_to_canvas(screen_pt);
        self.gesture = Some(Gesture::new(self.draw_mode, p, modifiers));
        self.set_mode(EditMode::Drawing)
    }

    fn reenter_text(&mut self, index: usize) -> Vec<Action> {
        let Some(index) = self.store.move_to_end(AnnotationKind::Text, index) else {
            return Vec::new();
        };
        self.store.set_active(AnnotationKind::Text, index);
        if let Some(text) = self.store.active_text_mut() {
            text.caret = text.char_len();
        }
        let mut actions = vec![Action::TextEditStarted { index }];
        actions.extend(self.set_mode(EditMode::TypingText));
        actions
    }

    /// Append `p` to the active freeform, creating one seeded with `start`
    /// if none is active. Repeated points are dropped.
    fn extend_freeform(&mut self, start: Point, p: Point) {
        if let Some(freeform) = self.store.active_freeform_mut() {
            if freeform.points.last() != Some(&p) {
                freeform.points.push(p);
            }
            return;
        }
        let mut points = vec![start];
        if p != start {
            points.push(p);
        }
        let index = self.store.push(Annotation::Freeform(Freeform { points, style: self.style }));
        self.store.set_active(AnnotationKind::Freeform, index);
    }

    fn commit(&mut self, gesture: Gesture) -> Vec<Action> {
        let shape = Shape::new(gesture.start, gesture.end, self.style);
        match gesture.kind {
            AnnotationKind::Text => {
                let index = self.store.push(Annotation::Text(Text::empty(shape)));
                self.store.set_active(AnnotationKind::Text, index);
                let mut actions = vec![Action::TextEditStarted { index }];
                if gesture.modifiers.ctrl && self.live_mode {
                    self.live_mode = false;
                    actions.push(Action::CanvasFrozen);
                }
                actions.extend(self.set_mode(EditMode::TypingText));
                actions
            }
            AnnotationKind::Freeform => {
                let mut actions = Vec::new();
                if let Some(slot) = self.store.active().filter(|s| s.kind == AnnotationKind::Freeform) {
                    let drawable = self.store.freeforms().get(slot.index).is_some_and(Freeform::is_drawable);
                    if drawable {
                        debug!(index = slot.index, "freeform committed");
                        actions.push(Action::AnnotationAdded { kind: slot.kind, index: slot.index });
                    } else {
                        self.store.remove_at(slot.kind, slot.index);
                    }
                    self.store.clear_active();
                }
                actions.extend(self.set_mode(EditMode::Idle));
                actions
            }
            kind => {
                let mut actions = Vec::new();
                if let Some(annotation) = Annotation::from_shape(kind, shape) {
                    let index = self.store.push(annotation);
                    debug!(?kind, index, "annotation committed");
                    actions.push(Action::AnnotationAdded { kind, index });
                }
                actions.extend(self.set_mode(EditMode::Idle));
                actions
            }
        }
    }

    fn type_key(&mut self, key: &Key, modifiers: Modifiers) -> Vec<Action> {
        if key.is(Key::ESCAPE) || (key.is(Key::ENTER) && !modifiers.shift && !modifiers.ctrl) {
            return self.finish_text();
        }
        let Some(text) = self.store.active_text_mut() else {
            return self.set_mode(EditMode::Idle);
        };
        if key.is(Key::ENTER) {
            text.insert('\n');
        } else if key.is(Key::BACKSPACE) {
            text.backspace();
        } else if key.is(Key::LEFT) {
            text.caret_left();
        } else if key.is(Key::RIGHT) {
            text.caret_right();
        } else if key.is(Key::UP) {
            text.caret_up();
        } else if key.is(Key::DOWN) {
            text.caret_down();
        } else if let Some(c) = key.printable() {
            if modifiers.ctrl || modifiers.meta {
                return Vec::new();
            }
            text.insert(c);
        } else {
            return Vec::new();
        }
        vec![Action::RenderNeeded]
    }

    /// Leave text entry. Empty text is discarded.
    fn finish_text(&mut self) -> Vec<Action> {
        let mut actions = Vec::new();
        if let Some(slot) = self.store.active().filter(|s| s.kind == AnnotationKind::Text) {
            let empty = self.store.texts().get(slot.index).is_none_or(|t| t.content.is_empty());
            if empty {
                self.store.remove_at(slot.kind, slot.index);
                actions.push(Action::TextDiscarded);
            } else {
                debug!(index = slot.index, "text committed");
                actions.push(Action::TextCommitted { index: slot.index });
            }
            self.store.clear_active();
        }
        actions.extend(self.set_mode(EditMode::Idle));
        actions
    }

    fn delete_under(&mut self, screen_pt: Point) -> Vec<Action> {
        let kind = self.draw_mode;
        let mut actions = Vec::new();
        if let Some(index) = self.hover_hit(kind, screen_pt) {
            if self.store.remove_at(kind, index).is_some() {
                debug!(?kind, index, "annotation deleted");
                actions.push(Action::AnnotationRemoved { kind, index });
            }
        }
        actions.extend(self.set_mode(EditMode::Idle));
        actions
    }

    fn pick_color(&mut self, screen_pt: Point) -> Vec<Action> {
        let p = self.camera.screen_to_canvas(screen_pt);
        let picked = self.canvas.as_ref().and_then(|image| image.pixel_at(p));
        let Some(color) = picked else {
            return self.cancel_picker();
        };
        self.style.color = color;
        self.saved_color = None;
        let mut actions = vec![Action::ColorPicked(color)];
        actions.extend(self.set_mode(EditMode::Idle));
        actions
    }

    fn cancel_picker(&mut self) -> Vec<Action> {
        if let Some(color) = self.saved_color.take() {
            self.style.color = color;
        }
        self.set_mode(EditMode::Idle)
    }
}
