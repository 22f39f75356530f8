use super::{CornerRadii, DrawError, Paint, SurfaceError};
use crate::ui::layout::LayoutRect;
use image::{ImageFormat, RgbaImage, imageops};
use log::debug;
use std::io::Cursor;

/// CPU raster surface. Straight (non-premultiplied) RGBA8, source-over blending.
pub struct Canvas {
    image: RgbaImage,
}

impl Canvas {
    /// Allocates a transparent surface. Allocation failure is reported rather
    /// than aborting the process.
    pub fn new(width: u32, height: u32) -> Result<Self, SurfaceError> {
        if width == 0 || height == 0 {
            return Err(SurfaceError::Empty(width, height));
        }
        let len = (width as usize)
            .checked_mul(height as usize)
            .and_then(|n| n.checked_mul(4))
            .ok_or(SurfaceError::TooLarge(width, height))?;

        let mut buf: Vec<u8> = Vec::new();
        buf.try_reserve_exact(len)
            .map_err(|_| SurfaceError::Alloc(len))?;
        buf.resize(len, 0);
        let image = RgbaImage::from_raw(width, height, buf).ok_or(SurfaceError::Alloc(len))?;

        debug!("Allocated {width}x{height} canvas ({len} bytes).");
        Ok(Self { image })
    }

    #[inline(always)]
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    #[inline(always)]
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    #[cfg(test)]
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        self.image.get_pixel(x, y).0
    }

    /// Source-over blend of `color` scaled by `coverage` into one pixel.
    /// Out-of-bounds coordinates are ignored.
    #[inline(always)]
    pub fn blend_pixel(&mut self, x: i32, y: i32, color: [f32; 4], coverage: f32) {
        if x < 0 || y < 0 {
            return;
        }
        let (x, y) = (x as u32, y as u32);
        if x >= self.image.width() || y >= self.image.height() {
            return;
        }
        let sa = (color[3] * coverage).clamp(0.0, 1.0);
        if sa <= 0.0 {
            return;
        }
        let dst = self.image.get_pixel_mut(x, y);
        let [dr, dg, db, da] = dst.0.map(|c| f32::from(c) / 255.0);
        let sr = color[0].clamp(0.0, 1.0);
        let sg = color[1].clamp(0.0, 1.0);
        let sb = color[2].clamp(0.0, 1.0);

        let inv = 1.0 - sa;
        let out_a = sa + da * inv;
        let (out_r, out_g, out_b) = if out_a <= 0.0 {
            (0.0, 0.0, 0.0)
        } else {
            (
                sr.mul_add(sa, dr * da * inv) / out_a,
                sg.mul_add(sa, dg * da * inv) / out_a,
                sb.mul_add(sa, db * da * inv) / out_a,
            )
        };
        dst.0 = [
            unit_to_u8(out_r),
            unit_to_u8(out_g),
            unit_to_u8(out_b),
            unit_to_u8(out_a),
        ];
    }

    pub fn fill_rect(&mut self, rect: LayoutRect, paint: &Paint) -> Result<(), DrawError> {
        self.fill_rounded_rect(rect, CornerRadii::all(0.0), paint)
    }

    /// Anti-aliased rounded rectangle. Radii larger than half the shorter
    /// side are reduced to fit.
    pub fn fill_rounded_rect(
        &mut self,
        rect: LayoutRect,
        radii: CornerRadii,
        paint: &Paint,
    ) -> Result<(), DrawError> {
        if !check_rect(rect, "fill_rounded_rect")? {
            return Ok(());
        }
        let radii = fit_radii(rect, radii);
        let Some((x0, y0, x1, y1)) = self.clip_bounds(rect) else {
            return Ok(());
        };
        for y in y0..y1 {
            let py = y as f32 + 0.5;
            for x in x0..x1 {
                let px = x as f32 + 0.5;
                let coverage = rounded_rect_coverage(rect, radii, px, py);
                if coverage > 0.0 {
                    let color = paint.color_at(px, py);
                    self.blend_pixel(x, y, color, coverage);
                }
            }
        }
        Ok(())
    }

    pub fn fill_triangle(&mut self, points: [[f32; 2]; 3], color: [f32; 4]) -> Result<(), DrawError> {
        if points.iter().flatten().any(|v| !v.is_finite()) {
            return Err(DrawError::InvalidGeometry("fill_triangle"));
        }
        let [v0, v1, v2] = points;
        let denom = edge_function(v0[0], v0[1], v1[0], v1[1], v2[0], v2[1]);
        if denom == 0.0 {
            return Ok(());
        }
        let inv_denom = 1.0 / denom;

        let min_x = v0[0].min(v1[0]).min(v2[0]).floor().max(0.0) as i32;
        let max_x = v0[0].max(v1[0]).max(v2[0]).ceil().min(self.width() as f32) as i32;
        let min_y = v0[1].min(v1[1]).min(v2[1]).floor().max(0.0) as i32;
        let max_y = v0[1].max(v1[1]).max(v2[1]).ceil().min(self.height() as f32) as i32;

        for y in min_y..max_y {
            let py = y as f32 + 0.5;
            for x in min_x..max_x {
                let px = x as f32 + 0.5;
                let w0 = edge_function(v1[0], v1[1], v2[0], v2[1], px, py) * inv_denom;
                let w1 = edge_function(v2[0], v2[1], v0[0], v0[1], px, py) * inv_denom;
                let w2 = 1.0 - w0 - w1;
                if w0 < 0.0 || w1 < 0.0 || w2 < 0.0 {
                    continue;
                }
                self.blend_pixel(x, y, color, 1.0);
            }
        }
        Ok(())
    }

    /// Anti-aliased line segment of the given stroke width.
    pub fn stroke_line(
        &mut self,
        from: [f32; 2],
        to: [f32; 2],
        width: f32,
        color: [f32; 4],
    ) -> Result<(), DrawError> {
        if from.iter().chain(to.iter()).any(|v| !v.is_finite()) || !width.is_finite() {
            return Err(DrawError::InvalidGeometry("stroke_line"));
        }
        if width <= 0.0 {
            return Ok(());
        }
        let half = width * 0.5;
        let pad = half + 1.0;
        let min_x = (from[0].min(to[0]) - pad).floor().max(0.0) as i32;
        let max_x = (from[0].max(to[0]) + pad).ceil().min(self.width() as f32) as i32;
        let min_y = (from[1].min(to[1]) - pad).floor().max(0.0) as i32;
        let max_y = (from[1].max(to[1]) + pad).ceil().min(self.height() as f32) as i32;

        for y in min_y..max_y {
            let py = y as f32 + 0.5;
            for x in min_x..max_x {
                let px = x as f32 + 0.5;
                let d = distance_to_segment(from, to, px, py);
                let coverage = (half - d + 0.5).clamp(0.0, 1.0);
                if coverage > 0.0 {
                    self.blend_pixel(x, y, color, coverage);
                }
            }
        }
        Ok(())
    }

    /// Scales `src` into `rect` and composites it, optionally clipped to a
    /// rounded rectangle of `radius`.
    pub fn draw_image(
        &mut self,
        src: &RgbaImage,
        rect: LayoutRect,
        radius: f32,
    ) -> Result<(), DrawError> {
        if !check_rect(rect, "draw_image")? || src.width() == 0 || src.height() == 0 {
            return Ok(());
        }
        let dst_w = rect.width.round().max(1.0) as u32;
        let dst_h = rect.height.round().max(1.0) as u32;
        let scaled;
        let tex = if src.width() == dst_w && src.height() == dst_h {
            src
        } else {
            scaled = imageops::resize(src, dst_w, dst_h, imageops::FilterType::Triangle);
            &scaled
        };

        let origin_x = rect.x.round() as i32;
        let origin_y = rect.y.round() as i32;
        let clip = LayoutRect::new(origin_x as f32, origin_y as f32, dst_w as f32, dst_h as f32);
        let radii = fit_radii(clip, CornerRadii::all(radius.max(0.0)));

        for (tx, ty, p) in tex.enumerate_pixels() {
            let [r, g, b, a] = p.0;
            if a == 0 {
                continue;
            }
            let x = origin_x + tx as i32;
            let y = origin_y + ty as i32;
            let coverage = if radius > 0.0 {
                rounded_rect_coverage(clip, radii, x as f32 + 0.5, y as f32 + 0.5)
            } else {
                1.0
            };
            if coverage <= 0.0 {
                continue;
            }
            let color = [r, g, b, a].map(|c| f32::from(c) / 255.0);
            self.blend_pixel(x, y, color, coverage);
        }
        Ok(())
    }

    pub fn encode_png(&self) -> Result<Vec<u8>, DrawError> {
        let mut out = Vec::new();
        self.image
            .write_to(&mut Cursor::new(&mut out), ImageFormat::Png)?;
        Ok(out)
    }

    /// Pixel bounds of `rect` intersected with the surface, as half-open ranges.
    fn clip_bounds(&self, rect: LayoutRect) -> Option<(i32, i32, i32, i32)> {
        let x0 = rect.x.floor().max(0.0) as i32;
        let y0 = rect.y.floor().max(0.0) as i32;
        let x1 = rect.right().ceil().min(self.width() as f32) as i32;
        let y1 = rect.bottom().ceil().min(self.height() as f32) as i32;
        (x0 < x1 && y0 < y1).then_some((x0, y0, x1, y1))
    }
}

#[inline(always)]
fn unit_to_u8(v: f32) -> u8 {
    v.clamp(0.0, 1.0).mul_add(255.0, 0.5) as u8
}

/// `Ok(false)` for empty rects, an error for non-finite ones.
#[inline(always)]
fn check_rect(rect: LayoutRect, op: &'static str) -> Result<bool, DrawError> {
    let LayoutRect {
        x,
        y,
        width,
        height,
    } = rect;
    if !(x.is_finite() && y.is_finite() && width.is_finite() && height.is_finite()) {
        return Err(DrawError::InvalidGeometry(op));
    }
    Ok(width > 0.0 && height > 0.0)
}

fn fit_radii(rect: LayoutRect, radii: CornerRadii) -> CornerRadii {
    let limit = (rect.width.min(rect.height) * 0.5).max(0.0);
    let fit = |r: f32| r.clamp(0.0, limit);
    CornerRadii {
        top_left: fit(radii.top_left),
        top_right: fit(radii.top_right),
        bottom_right: fit(radii.bottom_right),
        bottom_left: fit(radii.bottom_left),
    }
}

/// Fraction of the pixel centered at (px, py) inside the rounded rect, with
/// a one-pixel linear ramp along the edge.
#[inline(always)]
fn rounded_rect_coverage(rect: LayoutRect, radii: CornerRadii, px: f32, py: f32) -> f32 {
    let left = rect.x;
    let top = rect.y;
    let right = rect.right();
    let bottom = rect.bottom();

    let corner = if px < left + radii.top_left && py < top + radii.top_left {
        Some((left + radii.top_left, top + radii.top_left, radii.top_left))
    } else if px > right - radii.top_right && py < top + radii.top_right {
        Some((right - radii.top_right, top + radii.top_right, radii.top_right))
    } else if px > right - radii.bottom_right && py > bottom - radii.bottom_right {
        Some((
            right - radii.bottom_right,
            bottom - radii.bottom_right,
            radii.bottom_right,
        ))
    } else if px < left + radii.bottom_left && py > bottom - radii.bottom_left {
        Some((
            left + radii.bottom_left,
            bottom - radii.bottom_left,
            radii.bottom_left,
        ))
    } else {
        None
    };

    if let Some((cx, cy, r)) = corner
        && r > 0.0
    {
        let d = (px - cx).hypot(py - cy);
        return (r - d + 0.5).clamp(0.0, 1.0);
    }

    let horizontal = ((px - left).min(right - px) + 0.5).clamp(0.0, 1.0);
    let vertical = ((py - top).min(bottom - py) + 0.5).clamp(0.0, 1.0);
    horizontal * vertical
}

#[inline(always)]
fn edge_function(x0: f32, y0: f32, x1: f32, y1: f32, px: f32, py: f32) -> f32 {
    (px - x0).mul_add(y1 - y0, -((py - y0) * (x1 - x0)))
}

#[inline(always)]
fn distance_to_segment(a: [f32; 2], b: [f32; 2], px: f32, py: f32) -> f32 {
    let dx = b[0] - a[0];
    let dy = b[1] - a[1];
    let len_sq = dx.mul_add(dx, dy * dy);
    let t = if len_sq <= f32::EPSILON {
        0.0
    } else {
        ((px - a[0]).mul_add(dx, (py - a[1]) * dy) / len_sq).clamp(0.0, 1.0)
    };
    let cx = t.mul_add(dx, a[0]);
    let cy = t.mul_add(dy, a[1]);
    (px - cx).hypot(py - cy)
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: [f32; 4] = [1.0, 0.0, 0.0, 1.0];

    #[test]
    fn empty_surface_is_rejected() {
        assert!(matches!(Canvas::new(0, 10), Err(SurfaceError::Empty(0, 10))));
        assert!(matches!(Canvas::new(10, 0), Err(SurfaceError::Empty(10, 0))));
    }

    #[test]
    fn solid_fill_is_opaque_inside_and_clipped_outside() {
        let mut canvas = Canvas::new(20, 20).unwrap();
        canvas
            .fill_rect(LayoutRect::new(-5.0, -5.0, 15.0, 15.0), &Paint::Solid(RED))
            .unwrap();
        assert_eq!(canvas.pixel(0, 0), [255, 0, 0, 255]);
        assert_eq!(canvas.pixel(9, 9), [255, 0, 0, 255]);
        assert_eq!(canvas.pixel(15, 15), [0, 0, 0, 0]);
    }

    #[test]
    fn rounded_corners_leave_the_corner_pixel_empty() {
        let mut canvas = Canvas::new(40, 40).unwrap();
        canvas
            .fill_rounded_rect(
                LayoutRect::new(0.0, 0.0, 40.0, 40.0),
                CornerRadii::all(12.0),
                &Paint::Solid(RED),
            )
            .unwrap();
        assert_eq!(canvas.pixel(0, 0)[3], 0);
        assert_eq!(canvas.pixel(20, 20), [255, 0, 0, 255]);
        assert_eq!(canvas.pixel(20, 0)[3], 255);
    }

    #[test]
    fn vertical_gradient_interpolates() {
        let mut canvas = Canvas::new(4, 100).unwrap();
        let paint = Paint::vertical(0.0, 100.0, [0.0, 0.0, 0.0, 1.0], [1.0, 1.0, 1.0, 1.0]);
        canvas
            .fill_rect(LayoutRect::new(0.0, 0.0, 4.0, 100.0), &paint)
            .unwrap();
        assert!(canvas.pixel(0, 0)[0] < 10);
        assert!(canvas.pixel(0, 99)[0] > 245);
        let mid = canvas.pixel(0, 50)[0];
        assert!((120..=135).contains(&mid), "mid gradient value {mid}");
    }

    #[test]
    fn non_finite_geometry_is_an_error() {
        let mut canvas = Canvas::new(8, 8).unwrap();
        let err = canvas.fill_rect(LayoutRect::new(f32::NAN, 0.0, 4.0, 4.0), &Paint::Solid(RED));
        assert!(matches!(err, Err(DrawError::InvalidGeometry(_))));
        let err = canvas.stroke_line([0.0, 0.0], [f32::INFINITY, 1.0], 1.0, RED);
        assert!(matches!(err, Err(DrawError::InvalidGeometry(_))));
    }

    #[test]
    fn triangle_fill_covers_interior_only() {
        let mut canvas = Canvas::new(20, 20).unwrap();
        canvas
            .fill_triangle([[0.0, 0.0], [20.0, 0.0], [20.0, 20.0]], RED)
            .unwrap();
        assert_eq!(canvas.pixel(18, 2), [255, 0, 0, 255]);
        assert_eq!(canvas.pixel(2, 18)[3], 0);
    }

    #[test]
    fn image_blit_scales_into_rect() {
        let src = RgbaImage::from_pixel(2, 2, image::Rgba([0, 0, 255, 255]));
        let mut canvas = Canvas::new(16, 16).unwrap();
        canvas
            .draw_image(&src, LayoutRect::new(4.0, 4.0, 8.0, 8.0), 0.0)
            .unwrap();
        assert_eq!(canvas.pixel(8, 8), [0, 0, 255, 255]);
        assert_eq!(canvas.pixel(2, 2)[3], 0);
        assert_eq!(canvas.pixel(13, 13)[3], 0);
    }

    #[test]
    fn encoded_png_round_trips_dimensions() {
        let canvas = Canvas::new(33, 17).unwrap();
        let png = canvas.encode_png().unwrap();
        let decoded = image::load_from_memory(&png).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (33, 17));
    }
}
