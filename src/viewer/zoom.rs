//! Zoom and pan over the flipbook container

pub const ZOOM_MIN: f32 = 1.0;
pub const ZOOM_MAX: f32 = 2.5;
/// Toolbar button and keyboard increment
pub const ZOOM_STEP: f32 = 0.15;
/// Scale change per wheel delta unit with the modifier held
pub const WHEEL_SENSITIVITY: f32 = 0.0015;
/// Scales at or below `1 + ZOOMED_EPSILON` count as unzoomed
pub const ZOOMED_EPSILON: f32 = 0.001;

/// Current scale and translation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewTransform {
    pub scale: f32,
    pub x: f32,
    pub y: f32,
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self {
            scale: ZOOM_MIN,
            x: 0.0,
            y: 0.0,
        }
    }
}

impl ViewTransform {
    /// `--zs`, `--zx`, `--zy` custom properties for the zoom layer
    pub fn css_variables(&self) -> [(&'static str, String); 3] {
        [
            ("--zs", format!("{}", self.scale)),
            ("--zx", format!("{}px", self.x)),
            ("--zy", format!("{}px", self.y)),
        ]
    }

    /// Zoom slider value, two decimals
    pub fn slider_value(&self) -> String {
        format!("{:.2}", self.scale)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct DragAnchor {
    start_x: f32,
    start_y: f32,
}

/// Zoom/pan controller
///
/// Holds scale in `[ZOOM_MIN, ZOOM_MAX]` and keeps the translation within
/// the overflow the current scale creates over the container.
#[derive(Debug, Clone, Default)]
pub struct ZoomPan {
    transform: ViewTransform,
    container: (f32, f32),
    drag: Option<DragAnchor>,
}

impl ZoomPan {
    pub fn new(container_width: f32, container_height: f32) -> Self {
        Self {
            container: (container_width.max(0.0), container_height.max(0.0)),
            ..Default::default()
        }
    }

    pub fn transform(&self) -> ViewTransform {
        self.transform
    }

    pub fn scale(&self) -> f32 {
        self.transform.scale
    }

    pub fn is_zoomed(&self) -> bool {
        self.transform.scale > ZOOM_MIN + ZOOMED_EPSILON
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// Update the container size and re-clamp the translation
    pub fn set_container(&mut self, width: f32, height: f32) {
        self.container = (width.max(0.0), height.max(0.0));
        self.clamp_translation();
    }

    /// Largest allowed `|x|` and `|y|` at the current scale
    pub fn max_offset(&self) -> (f32, f32) {
        let overflow = self.transform.scale - 1.0;
        let (w, h) = self.container;
        ((w * overflow / 2.0).max(0.0), (h * overflow / 2.0).max(0.0))
    }

    /// Set the scale, clamped, rescaling the translation proportionally
    ///
    /// NaN is ignored.
    pub fn set_zoom(&mut self, scale: f32) {
        if scale.is_nan() {
            return;
        }

        let next = scale.clamp(ZOOM_MIN, ZOOM_MAX);
        let ratio = next / self.transform.scale;
        self.transform.scale = next;
        self.transform.x *= ratio;
        self.transform.y *= ratio;
        self.clamp_translation();
    }

    pub fn zoom_in(&mut self) {
        self.set_zoom(self.transform.scale + ZOOM_STEP);
    }

    pub fn zoom_out(&mut self) {
        self.set_zoom(self.transform.scale - ZOOM_STEP);
    }

    /// Keyboard digits: `d` selects `d * 10%` of the zoom range
    pub fn set_from_digit(&mut self, digit: u8) {
        if digit > 9 {
            return;
        }
        let fraction = digit as f32 / 10.0;
        self.set_zoom(ZOOM_MIN + (ZOOM_MAX - ZOOM_MIN) * fraction);
    }

    /// Wheel input; only handled while the zoom modifier is held
    ///
    /// Returns whether the event was consumed.
    pub fn wheel(&mut self, delta_y: f32, modifier: bool) -> bool {
        if !modifier {
            return false;
        }
        let factor = 1.0 + (-delta_y) * WHEEL_SENSITIVITY;
        self.set_zoom(self.transform.scale * factor);
        true
    }

    /// Translate by `(dx, dy)` within bounds; non-finite deltas are ignored
    pub fn pan(&mut self, dx: f32, dy: f32) {
        if !(dx.is_finite() && dy.is_finite()) {
            return;
        }
        self.transform.x += dx;
        self.transform.y += dy;
        self.clamp_translation();
    }

    /// Start dragging at pointer `(x, y)`; refused when not zoomed
    pub fn start_drag(&mut self, x: f32, y: f32) -> bool {
        if !self.is_zoomed() || !(x.is_finite() && y.is_finite()) {
            return false;
        }
        self.drag = Some(DragAnchor {
            start_x: x - self.transform.x,
            start_y: y - self.transform.y,
        });
        true
    }

    pub fn move_drag(&mut self, x: f32, y: f32) {
        let Some(anchor) = self.drag else {
            return;
        };
        if !(x.is_finite() && y.is_finite()) {
            return;
        }
        self.transform.x = x - anchor.start_x;
        self.transform.y = y - anchor.start_y;
        self.clamp_translation();
    }

    pub fn end_drag(&mut self) {
        self.drag = None;
    }

    /// Back to scale 1 with no translation
    pub fn reset(&mut self) {
        self.transform = ViewTransform::default();
        self.drag = None;
    }

    fn clamp_translation(&mut self) {
        let (max_x, max_y) = self.max_offset();
        self.transform.x = self.transform.x.clamp(-max_x, max_x);
        self.transform.y = self.transform.y.clamp(-max_y, max_y);
    }
}
