use std::sync::Arc;

use crate::foundation::core::{Canvas, Point, Rect, Rgba8};
use crate::foundation::error::{MathreelError, MathreelResult};
use crate::text::ShapedText;
use crate::transform::clip::clip_segment;

/// A rendered frame as RGBA8 pixels.
///
/// Frames are **premultiplied alpha**; the flag makes this explicit at API boundaries.
#[derive(Clone, Debug)]
pub struct FrameRGBA {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// RGBA8 bytes, tightly packed, row-major.
    pub data: Vec<u8>,
    /// Whether the `data` is premultiplied alpha.
    pub premultiplied: bool,
}

impl FrameRGBA {
    /// Premultiplied pixel at `(x, y)`, or `None` outside the frame.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        let px = self.data.get(i..i + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }
}

/// Margin around the canvas that line geometry is clipped to before rasterization.
const LINE_CLIP_MARGIN: f64 = 64.0;

/// Device-space drawing target for one frame, backed by `vello_cpu`.
///
/// Draw calls are recorded between [`FrameSurface::begin_frame`] and
/// [`FrameSurface::finish`]; `finish` rasterizes and reads back the pixels.
pub struct FrameSurface {
    canvas: Canvas,
    background: Rgba8,
    ctx: vello_cpu::RenderContext,
    pixmap: vello_cpu::Pixmap,
}

impl FrameSurface {
    /// Create a surface for `canvas`, cleared to `background` at the start of each frame.
    pub fn new(canvas: Canvas, background: Rgba8) -> MathreelResult<Self> {
        let (w, h) = raster_dims(canvas)?;
        Ok(Self {
            canvas,
            background,
            ctx: vello_cpu::RenderContext::new(w, h),
            pixmap: vello_cpu::Pixmap::new(w, h),
        })
    }

    /// Current canvas.
    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    /// Background color.
    pub fn background(&self) -> Rgba8 {
        self.background
    }

    /// Change the canvas size. Takes effect for the next frame.
    pub fn resize(&mut self, canvas: Canvas) -> MathreelResult<()> {
        if canvas == self.canvas {
            return Ok(());
        }
        let (w, h) = raster_dims(canvas)?;
        self.ctx = vello_cpu::RenderContext::new(w, h);
        self.pixmap = vello_cpu::Pixmap::new(w, h);
        self.canvas = canvas;
        Ok(())
    }

    /// Discard recorded draw calls and paint the background.
    pub fn begin_frame(&mut self) {
        self.ctx.reset();
        self.ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        self.ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        let bg = self.background;
        self.ctx
            .set_paint(vello_cpu::peniko::Color::from_rgba8(bg.r, bg.g, bg.b, bg.a));
        self.ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
            0.0,
            0.0,
            self.canvas.width_f64(),
            self.canvas.height_f64(),
        ));
    }

    /// Stroke a straight line between two device-space points.
    ///
    /// Segments with a NaN endpoint are skipped; infinite or huge coordinates are clipped to a
    /// band around the canvas.
    pub fn stroke_line(&mut self, a: Point, b: Point, width: f64, color: Rgba8) {
        if color.a == 0 || !(width > 0.0) {
            return;
        }
        let bounds = Rect::new(
            -LINE_CLIP_MARGIN,
            -LINE_CLIP_MARGIN,
            self.canvas.width_f64() + LINE_CLIP_MARGIN,
            self.canvas.height_f64() + LINE_CLIP_MARGIN,
        );
        let Some((a, b)) = clip_segment(a, b, bounds) else {
            return;
        };

        let mut path = vello_cpu::kurbo::BezPath::new();
        path.move_to(vello_cpu::kurbo::Point::new(a.x, a.y));
        path.line_to(vello_cpu::kurbo::Point::new(b.x, b.y));

        self.ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        self.ctx.set_stroke(
            vello_cpu::kurbo::Stroke::new(width).with_caps(vello_cpu::kurbo::Cap::Square),
        );
        self.ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
            color.r, color.g, color.b, color.a,
        ));
        self.ctx.stroke_path(&path);
    }

    /// Fill an alpha coverage mask of `width x height` at device position `origin`, tinted with
    /// `color` and scaled by `opacity`.
    pub fn fill_mask(
        &mut self,
        origin: Point,
        width: u32,
        height: u32,
        coverage: &[u8],
        color: Rgba8,
        opacity: f64,
    ) -> MathreelResult<()> {
        if width == 0 || height == 0 || !(opacity > 0.0) || color.a == 0 {
            return Ok(());
        }
        if coverage.len() != (width as usize).saturating_mul(height as usize) {
            return Err(MathreelError::render("mask coverage length mismatch"));
        }
        let alpha = (f64::from(color.a) * opacity.min(1.0)).round() as u16;
        let mut bytes = Vec::with_capacity(coverage.len() * 4);
        for &c in coverage {
            let a = crate::foundation::math::mul_div255_u16(u16::from(c), alpha);
            bytes.extend_from_slice(&Rgba8::new(color.r, color.g, color.b, a as u8).to_premul_array());
        }
        let img = rgba_premul_to_image(&bytes, width, height)?;

        self.ctx.set_transform(vello_cpu::kurbo::Affine::translate((
            origin.x.round(),
            origin.y.round(),
        )));
        self.ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        self.ctx.set_paint(img);
        self.ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
            0.0,
            0.0,
            f64::from(width),
            f64::from(height),
        ));
        self.ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        Ok(())
    }

    /// Fill shaped text with its baseline origin at device position `origin`.
    ///
    /// `paint` decides the color of each glyph pixel; see [`TextPaint`].
    pub fn fill_text(
        &mut self,
        origin: Point,
        text: &ShapedText,
        paint: &TextPaint,
    ) -> MathreelResult<()> {
        if text.glyphs.is_empty() {
            return Ok(());
        }
        let origin = vello_cpu::kurbo::Affine::translate((origin.x, origin.y));
        self.ctx.set_transform(origin);
        self.ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        match paint {
            TextPaint::Solid(c) => {
                if c.a == 0 {
                    self.ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
                    return Ok(());
                }
                self.ctx
                    .set_paint(vello_cpu::peniko::Color::from_rgba8(c.r, c.g, c.b, c.a));
            }
            TextPaint::HorizontalRamp { color, alpha } => {
                if alpha.is_empty() {
                    self.ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
                    return Ok(());
                }
                let mut bytes = Vec::with_capacity(alpha.len() * 4);
                for &a in alpha.iter() {
                    let a = crate::foundation::math::mul_div255_u8(u16::from(color.a), u16::from(a));
                    bytes.extend_from_slice(&color.with_alpha(a).to_premul_array());
                }
                let img = rgba_premul_to_image(&bytes, alpha.len() as u32, 1)?;
                self.ctx.set_paint(img);
            }
        }
        let glyphs = text.glyphs.iter().map(|g| vello_cpu::Glyph {
            id: g.id,
            x: g.x,
            y: g.y,
        });
        self.ctx
            .glyph_run(&text.font)
            .font_size(text.font_size)
            .fill_glyphs(glyphs);
        self.ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        Ok(())
    }

    /// Rasterize everything recorded since [`FrameSurface::begin_frame`] and read it back.
    pub fn finish(&mut self) -> FrameRGBA {
        self.ctx.flush();
        self.ctx.render_to_pixmap(&mut self.pixmap);
        FrameRGBA {
            width: self.canvas.width,
            height: self.canvas.height,
            data: self.pixmap.data_as_u8_slice().to_vec(),
            premultiplied: true,
        }
    }
}

/// How glyph pixels of a label are colored.
#[derive(Clone, Debug, PartialEq)]
pub enum TextPaint {
    /// One color.
    Solid(Rgba8),
    /// `color` with a per-column alpha; column `i` covers local x in `[i, i + 1)` and the last
    /// column extends to the right.
    HorizontalRamp {
        /// Base color.
        color: Rgba8,
        /// Alpha per device column, starting at the text origin.
        alpha: Arc<Vec<u8>>,
    },
}

fn raster_dims(canvas: Canvas) -> MathreelResult<(u16, u16)> {
    let w: u16 = canvas
        .width
        .try_into()
        .map_err(|_| MathreelError::validation("canvas width exceeds u16"))?;
    let h: u16 = canvas
        .height
        .try_into()
        .map_err(|_| MathreelError::validation("canvas height exceeds u16"))?;
    if w == 0 || h == 0 {
        return Err(MathreelError::validation("canvas width/height must be > 0"));
    }
    Ok((w, h))
}

pub(crate) fn pixmap_from_premul_bytes(
    bytes: &[u8],
    width: u32,
    height: u32,
) -> MathreelResult<vello_cpu::Pixmap> {
    let w: u16 = width
        .try_into()
        .map_err(|_| MathreelError::render("pixmap width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| MathreelError::render("pixmap height exceeds u16"))?;
    if bytes.len()
        != (width as usize)
            .saturating_mul(height as usize)
            .saturating_mul(4)
    {
        return Err(MathreelError::render("pixmap byte len mismatch"));
    }
    let pixels = bytes
        .chunks_exact(4)
        .map(|px| vello_cpu::peniko::color::PremulRgba8::from_u8_array([px[0], px[1], px[2], px[3]]))
        .collect::<Vec<_>>();
    Ok(vello_cpu::Pixmap::from_parts_with_opacity(
        pixels, w, h, true,
    ))
}

fn rgba_premul_to_image(
    bytes_premul: &[u8],
    width: u32,
    height: u32,
) -> MathreelResult<vello_cpu::Image> {
    let pixmap = pixmap_from_premul_bytes(bytes_premul, width, height)?;
    Ok(vello_cpu::Image {
        image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
        sampler: vello_cpu::peniko::ImageSampler::default(),
    })
}

#[cfg(test)]
#[path = "../../tests/unit/render/surface.rs"]
mod tests;
