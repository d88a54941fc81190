/// Time-fraction to progress-fraction curve.
///
/// Input is clamped to [0,1]; the output is used as-is and is allowed to
/// leave [0,1] (`Overshoot` does, on purpose).
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum Ease {
    Linear,
    InQuad,
    OutQuad,
    InOutQuad,
    InCubic,
    OutCubic,
    InOutCubic,
    /// Fast start, slow settle: `1 - (1 - t)^(2 * factor)`.
    Decelerate { factor: f64 },
    /// Accelerates past 1.0 before settling back.
    Overshoot { tension: f64 },
}

impl Ease {
    /// The decelerate curve the stock shapes and effects default to.
    pub const DEFAULT_DECELERATE: Self = Self::Decelerate { factor: 2.0 };

    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::InQuad => t * t,
            Self::OutQuad => 1.0 - (1.0 - t) * (1.0 - t),
            Self::InOutQuad => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - ((-2.0 * t + 2.0).powi(2) / 2.0)
                }
            }
            Self::InCubic => t * t * t,
            Self::OutCubic => 1.0 - (1.0 - t).powi(3),
            Self::InOutCubic => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - ((-2.0 * t + 2.0).powi(3) / 2.0)
                }
            }
            Self::Decelerate { factor } => 1.0 - (1.0 - t).powf(2.0 * factor.max(0.5)),
            Self::Overshoot { tension } => {
                let s = t - 1.0;
                s * s * ((tension + 1.0) * s + tension) + 1.0
            }
        }
    }
}
