use crate::{core::Point, effect::Effect, overlay::Overlay, shape::Shape};

/// One stop in a spotlight sequence.
///
/// Immutable once handed to the engine; the next transition replaces it
/// wholesale rather than mutating it.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Target {
    pub anchor: Point,
    pub shape: Shape,
    pub effect: Effect,
    pub overlay: Overlay,
}

impl Target {
    pub fn new(anchor: Point, shape: Shape) -> Self {
        Self {
            anchor,
            shape,
            effect: Effect::Empty,
            overlay: Overlay::FullScreen,
        }
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effect = effect;
        self
    }

    pub fn with_overlay(mut self, overlay: Overlay) -> Self {
        self.overlay = overlay;
        self
    }
}
