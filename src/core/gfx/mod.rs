mod software;

pub use software::Canvas;

use thiserror::Error;

// --- Public Data Contract ---

#[derive(Debug, Error)]
pub enum SurfaceError {
    #[error("surface dimensions {0}x{1} are empty")]
    Empty(u32, u32),
    #[error("surface of {0}x{1} overflows the address space")]
    TooLarge(u32, u32),
    #[error("could not reserve {0} bytes for the surface")]
    Alloc(usize),
}

#[derive(Debug, Error)]
pub enum DrawError {
    #[error("invalid geometry in {0}")]
    InvalidGeometry(&'static str),
    #[error("png encoding failed: {0}")]
    Encode(#[from] image::ImageError),
}

/// Fill source for shapes. Gradients run along the segment `from -> to` and
/// clamp outside it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Paint {
    Solid([f32; 4]),
    Linear {
        from: [f32; 2],
        to: [f32; 2],
        start: [f32; 4],
        end: [f32; 4],
    },
}

impl Paint {
    pub const fn vertical(y0: f32, y1: f32, start: [f32; 4], end: [f32; 4]) -> Self {
        Self::Linear {
            from: [0.0, y0],
            to: [0.0, y1],
            start,
            end,
        }
    }

    pub const fn horizontal(x0: f32, x1: f32, start: [f32; 4], end: [f32; 4]) -> Self {
        Self::Linear {
            from: [x0, 0.0],
            to: [x1, 0.0],
            start,
            end,
        }
    }

    #[inline(always)]
    pub fn color_at(&self, px: f32, py: f32) -> [f32; 4] {
        match *self {
            Self::Solid(c) => c,
            Self::Linear {
                from,
                to,
                start,
                end,
            } => {
                let dx = to[0] - from[0];
                let dy = to[1] - from[1];
                let len_sq = dx.mul_add(dx, dy * dy);
                let t = if len_sq <= f32::EPSILON {
                    0.0
                } else {
                    ((px - from[0]).mul_add(dx, (py - from[1]) * dy) / len_sq).clamp(0.0, 1.0)
                };
                let lerp = |a: f32, b: f32| (b - a).mul_add(t, a);
                [
                    lerp(start[0], end[0]),
                    lerp(start[1], end[1]),
                    lerp(start[2], end[2]),
                    lerp(start[3], end[3]),
                ]
            }
        }
    }
}

/// Per-corner radii, clockwise from top-left.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CornerRadii {
    pub top_left: f32,
    pub top_right: f32,
    pub bottom_right: f32,
    pub bottom_left: f32,
}

impl CornerRadii {
    pub const fn all(r: f32) -> Self {
        Self {
            top_left: r,
            top_right: r,
            bottom_right: r,
            bottom_left: r,
        }
    }

    /// Rounded top edge, square bottom; used for the accent strip on panels.
    pub const fn top(r: f32) -> Self {
        Self {
            top_left: r,
            top_right: r,
            bottom_right: 0.0,
            bottom_left: 0.0,
        }
    }
}
