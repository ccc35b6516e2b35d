//! Per-frame rendering context.
//!
//! A [`Frame`] owns the clip region and the list of recorded [`DrawCommand`]s.
//! Every draw call builds a [`Shape`] plus its padded bounds and hands both to a
//! single submission routine that culls, clamps and records them.

use glam::Vec2;

use crate::color::Color;
use crate::quad::{Quad, UvRect};
use crate::shape::Shape;
use crate::text::{layout_string, DrawStringOptions, TexturedFont};

/// Opaque handle to a texture owned by a rendering backend.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureId(pub u32);

/// One clipped quad ready for submission.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DrawCommand {
    /// Screen-space quad, already clamped to the clip region.
    pub quad: Quad,
    pub shape: Shape,
    pub color: Color,
    /// Set for images and glyphs.
    pub texture: Option<TextureId>,
}

/// Rendering context for a single frame.
#[derive(Clone, Debug)]
pub struct Frame {
    width: u32,
    height: u32,
    clip: Quad,
    clip_stack: Vec<Quad>,
    commands: Vec<DrawCommand>,
}

impl Frame {
    /// Start a frame for a `width` x `height` canvas. The clip covers the whole canvas.
    pub fn begin(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            clip: Quad::full_canvas(width, height),
            clip_stack: Vec::new(),
            commands: Vec::new(),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// The full-canvas clip quad.
    pub fn canvas(&self) -> Quad {
        Quad::full_canvas(self.width, self.height)
    }

    pub fn clip(&self) -> Quad {
        self.clip
    }

    /// Skip everything outside `clip` from now on.
    pub fn set_clip(&mut self, clip: Quad) {
        self.clip = clip;
    }

    pub fn reset_clip(&mut self) {
        self.clip = self.canvas();
    }

    /// Save the current clip and replace it with `clip`.
    pub fn push_clip(&mut self, clip: Quad) {
        self.clip_stack.push(self.clip);
        self.clip = clip;
    }

    /// Restore the clip saved by the matching [`Frame::push_clip`].
    ///
    /// Without a saved clip this resets to the full canvas.
    pub fn pop_clip(&mut self) {
        match self.clip_stack.pop() {
            Some(clip) => self.clip = clip,
            None => self.reset_clip(),
        }
    }

    pub fn fill_circle(&mut self, center: Vec2, radius: f32, color: Color) {
        let (shape, bounds) = Shape::fill_circle(center, radius);
        self.submit(shape, bounds, color, None);
    }

    /// Outline a circle. The line is centred on `radius`.
    pub fn draw_circle(&mut self, center: Vec2, radius: f32, line_width: f32, color: Color) {
        let (shape, bounds) = Shape::stroke_circle(center, radius, line_width);
        self.submit(shape, bounds, color, None);
    }

    pub fn draw_line(&mut self, from: Vec2, to: Vec2, line_width: f32, color: Color) {
        if let Some((shape, bounds)) = Shape::line(from, to, line_width) {
            self.submit(shape, bounds, color, None);
        }
    }

    pub fn fill_rectangle(&mut self, top_left: Vec2, size: Vec2, color: Color) {
        let (shape, bounds) = Shape::fill_rect(top_left, size);
        self.submit(shape, bounds, color, None);
    }

    pub fn draw_rectangle(&mut self, top_left: Vec2, size: Vec2, line_width: f32, color: Color) {
        let (shape, bounds) = Shape::stroke_rect(top_left, size, line_width);
        self.submit(shape, bounds, color, None);
    }

    /// Stretch the whole texture over `dst`.
    pub fn draw_image(&mut self, texture: TextureId, dst: Quad) {
        self.draw_colorized_image_src(texture, dst, UvRect::FULL, Color::WHITE);
    }

    pub fn draw_colorized_image(&mut self, texture: TextureId, dst: Quad, color: Color) {
        self.draw_colorized_image_src(texture, dst, UvRect::FULL, color);
    }

    /// Stretch the sub-image `src` of the texture over `dst`.
    pub fn draw_image_src(&mut self, texture: TextureId, dst: Quad, src: UvRect) {
        self.draw_colorized_image_src(texture, dst, src, Color::WHITE);
    }

    /// Texels are multiplied with `color`.
    pub fn draw_colorized_image_src(
        &mut self,
        texture: TextureId,
        dst: Quad,
        src: UvRect,
        color: Color,
    ) {
        self.submit(Shape::Textured { uv: src }, dst, color, Some(texture));
    }

    /// Draw `text` with its top-left corner at `pos` and return its measured size.
    ///
    /// Lines are aligned left.
    pub fn draw_string<F>(
        &mut self,
        text: &str,
        pos: Vec2,
        font: &F,
        color: Color,
        opts: DrawStringOptions,
    ) -> Vec2
    where
        F: TexturedFont + ?Sized,
    {
        let origin = if opts.round_pos { pos.round() } else { pos };
        let texture = font.texture();
        layout_string(text, font, opts, |glyph| {
            let dst = Quad::new(
                origin.x + glyph.quad.left,
                origin.x + glyph.quad.right,
                origin.y + glyph.quad.top,
                origin.y + glyph.quad.bottom,
            );
            self.submit(Shape::Textured { uv: glyph.uv }, dst, color, Some(texture));
        })
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Consume the frame and return its commands in submission order.
    pub fn finish(self) -> Vec<DrawCommand> {
        self.commands
    }

    fn submit(&mut self, shape: Shape, bounds: Quad, color: Color, texture: Option<TextureId>) {
        if bounds.width() < 0.0 || bounds.height() < 0.0 {
            return;
        }
        if !bounds.intersects(&self.clip) {
            return;
        }

        let quad = bounds.clamp_to(&self.clip);
        // empty or inverted clips pass `intersects`
        if quad.width() < 0.0 || quad.height() < 0.0 {
            return;
        }
        let shape = match shape {
            Shape::Textured { uv } => Shape::Textured {
                uv: bounds.clamp_uv(&self.clip, uv),
            },
            other => other,
        };

        self.commands.push(DrawCommand {
            quad,
            shape,
            color,
            texture,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::measure_string;
    use crate::text::test_font::TestFont;

    #[test]
    fn test_fill_rectangle_inside_clip_is_unclamped() {
        let mut frame = Frame::begin(801, 601);
        assert_eq!(frame.clip(), Quad::new(0.0, 800.0, 0.0, 600.0));
        frame.fill_rectangle(Vec2::new(10.0, 10.0), Vec2::new(10.0, 10.0), Color::RED);
        assert_eq!(frame.commands().len(), 1);
        assert_eq!(frame.commands()[0].quad, Quad::new(9.0, 21.0, 9.0, 21.0));
        assert_eq!(frame.commands()[0].texture, None);
    }

    #[test]
    fn test_fill_circle_clamped_to_clip() {
        let mut frame = Frame::begin(800, 600);
        frame.set_clip(Quad::new(5.0, 100.0, 0.0, 100.0));
        frame.fill_circle(Vec2::ZERO, 10.0, Color::WHITE);
        let cmds = frame.finish();
        assert_eq!(cmds.len(), 1);
        assert_eq!(cmds[0].quad.left, 5.0);
        assert_eq!(cmds[0].quad.right, 12.0);
        // the shape itself is not modified by clipping
        assert_eq!(
            cmds[0].shape,
            Shape::FillCircle {
                center: Vec2::splat(0.5),
                radius: 10.0
            }
        );
    }

    #[test]
    fn test_outside_clip_records_nothing() {
        let mut frame = Frame::begin(800, 600);
        frame.set_clip(Quad::new(100.0, 200.0, 100.0, 200.0));
        frame.fill_rectangle(Vec2::new(0.0, 0.0), Vec2::new(50.0, 50.0), Color::RED);
        frame.fill_circle(Vec2::new(300.0, 150.0), 20.0, Color::RED);
        frame.draw_line(Vec2::new(0.0, 300.0), Vec2::new(500.0, 300.0), 3.0, Color::RED);
        frame.draw_image(TextureId(1), Quad::new(250.0, 300.0, 0.0, 50.0));
        assert!(frame.is_empty());
    }

    #[test]
    fn test_degenerate_geometry_records_nothing() {
        let mut frame = Frame::begin(800, 600);
        frame.draw_line(Vec2::new(50.0, 50.0), Vec2::new(50.0, 50.0), 2.0, Color::RED);
        frame.fill_rectangle(Vec2::new(50.0, 50.0), Vec2::new(-30.0, 10.0), Color::RED);
        assert!(frame.is_empty());
    }

    #[test]
    fn test_empty_or_inverted_clip_records_nothing() {
        let mut frame = Frame::begin(0, 0);
        frame.fill_circle(Vec2::ZERO, 10.0, Color::WHITE);
        assert!(frame.is_empty());

        let mut frame = Frame::begin(800, 600);
        frame.set_clip(Quad::new(50.0, 40.0, 0.0, 600.0));
        frame.fill_rectangle(Vec2::new(30.0, 10.0), Vec2::new(30.0, 10.0), Color::RED);
        frame.draw_image(TextureId(1), Quad::new(0.0, 100.0, 0.0, 100.0));
        assert!(frame.is_empty());

        // a degenerate single-column clip is still drawable
        frame.set_clip(Quad::new(40.0, 40.0, 0.0, 600.0));
        frame.fill_rectangle(Vec2::new(30.0, 10.0), Vec2::new(30.0, 10.0), Color::RED);
        for cmd in frame.commands() {
            assert!(cmd.quad.left <= cmd.quad.right);
            assert!(cmd.quad.top <= cmd.quad.bottom);
        }
        assert_eq!(frame.commands().len(), 1);
    }

    #[test]
    fn test_clip_stack() {
        let mut frame = Frame::begin(100, 100);
        let outer = Quad::new(10.0, 90.0, 10.0, 90.0);
        let inner = Quad::new(20.0, 30.0, 20.0, 30.0);
        frame.push_clip(outer);
        frame.push_clip(inner);
        assert_eq!(frame.clip(), inner);
        frame.pop_clip();
        assert_eq!(frame.clip(), outer);
        frame.pop_clip();
        assert_eq!(frame.clip(), frame.canvas());
        frame.set_clip(inner);
        frame.pop_clip();
        assert_eq!(frame.clip(), frame.canvas());
    }

    #[test]
    fn test_clipped_image_reinterpolates_uv() {
        let mut frame = Frame::begin(800, 600);
        frame.set_clip(Quad::new(50.0, 800.0, 0.0, 600.0));
        frame.draw_colorized_image(TextureId(3), Quad::new(0.0, 100.0, 0.0, 100.0), Color::GRAY);
        let cmd = frame.commands()[0];
        assert_eq!(cmd.quad, Quad::new(50.0, 100.0, 0.0, 100.0));
        assert_eq!(cmd.texture, Some(TextureId(3)));
        assert_eq!(cmd.color, Color::GRAY);
        assert_eq!(
            cmd.shape,
            Shape::Textured {
                uv: UvRect::new(Vec2::new(0.5, 0.0), Vec2::ONE)
            }
        );
    }

    #[test]
    fn test_draw_image_src_keeps_sub_rect() {
        let mut frame = Frame::begin(800, 600);
        let src = UvRect::new(Vec2::new(0.25, 0.25), Vec2::new(0.5, 0.5));
        frame.draw_image_src(TextureId(2), Quad::new(10.0, 20.0, 10.0, 20.0), src);
        assert_eq!(frame.commands()[0].shape, Shape::Textured { uv: src });
        assert_eq!(frame.commands()[0].color, Color::WHITE);
    }

    #[test]
    fn test_draw_string_places_kerned_glyphs() {
        let font = TestFont::new(10.0, &[('A', 6.0), ('B', 7.0)]).with_kerning('A', 'B', -1.0);
        let mut frame = Frame::begin(800, 600);
        let size = frame.draw_string(
            "AB",
            Vec2::new(100.0, 50.0),
            &font,
            Color::WHITE,
            DrawStringOptions::default(),
        );
        assert_eq!(size, Vec2::new(12.0, 10.0));
        let cmds = frame.commands();
        assert_eq!(cmds.len(), 2);
        assert_eq!(cmds[0].quad, Quad::new(100.0, 106.0, 50.0, 60.0));
        assert_eq!(cmds[1].quad.left, 105.0);
        assert!(cmds.iter().all(|c| c.texture == Some(TextureId(7))));
    }

    #[test]
    fn test_draw_string_round_pos() {
        let font = TestFont::new(10.0, &[('A', 6.0)]);
        let mut frame = Frame::begin(800, 600);
        let opts = DrawStringOptions::default().with_round_pos(true);
        frame.draw_string("AA", Vec2::new(10.4, 20.6), &font, Color::WHITE, opts);
        assert_eq!(frame.commands()[0].quad.left, 10.0);
        assert_eq!(frame.commands()[0].quad.top, 21.0);
        assert_eq!(frame.commands()[1].quad.left, 16.0);
    }

    #[test]
    fn test_measure_matches_rendered_glyphs() {
        let font = TestFont::new(12.0, &[('a', 5.5), ('b', 6.25), ('c', 4.0), (' ', 3.0)])
            .with_kerning('a', 'b', -0.75)
            .with_kerning('b', 'c', 0.5);
        let opts = DrawStringOptions::default().with_tab_spaces(3).with_scale(1.5);
        let origin = Vec2::new(40.0, 40.0);

        for text in ["abc", "a\tbc\ncab", "ab ab\r\nc\tc\ta", "cc\n\nabcabc"] {
            let mut frame = Frame::begin(2000, 2000);
            let drawn = frame.draw_string(text, origin, &font, Color::WHITE, opts);
            let rendered_width = frame
                .commands()
                .iter()
                .map(|c| c.quad.right - origin.x)
                .fold(0.0f32, f32::max);
            let measured = measure_string(text, &font, opts);
            assert_eq!(measured, drawn, "{text:?}");
            assert!((measured.x - rendered_width).abs() < 1e-4, "{text:?}");
        }
    }
}
