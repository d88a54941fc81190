use crate::core::{Rect, SurfaceSize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Gravity {
    Top,
    Bottom,
}

/// How the host's auxiliary content attaches to the revealed region.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum Overlay {
    /// Content fills the whole render surface.
    FullScreen,
    /// Full-width content anchored above (`Top`) or below (`Bottom`) the
    /// target's fully-revealed bounds, offset by `margin`.
    Gravity { gravity: Gravity, margin: f64 },
}

/// Resolved placement handed to the host, in surface coordinates.
///
/// Margins follow the reference layout: a top-gravity overlay is pinned to the
/// surface's bottom edge by `bottom_margin`, so it must be recomputed when the
/// surface height changes.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum OverlayPlacement {
    FillSurface,
    /// Content's bottom edge sits `bottom_margin` above the surface bottom.
    AboveTarget { bottom_margin: f64 },
    /// Content's top edge sits `top_margin` below the surface top.
    BelowTarget { top_margin: f64 },
}

impl Overlay {
    pub fn layout(&self, surface: SurfaceSize, shape_bounds: Rect) -> OverlayPlacement {
        match *self {
            Self::FullScreen => OverlayPlacement::FillSurface,
            Self::Gravity { gravity, margin } => match gravity {
                Gravity::Top => OverlayPlacement::AboveTarget {
                    bottom_margin: f64::from(surface.height) - shape_bounds.y0 - margin,
                },
                Gravity::Bottom => OverlayPlacement::BelowTarget {
                    top_margin: shape_bounds.y1 + margin,
                },
            },
        }
    }
}
