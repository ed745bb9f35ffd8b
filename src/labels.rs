//! Text labels painted onto an RGBA canvas, used as sprite textures.
//!
//! Faces come from a system font located through `fontdb`. Glyphs are
//! rasterized to alpha masks with `swash` and blended into the canvas in the
//! label colour. When no suitable font is installed the canvas stays
//! transparent.

use image::{Rgba, RgbaImage};
use swash::{
    FontRef,
    scale::{Render, ScaleContext, Source},
    zeno::{Format, Vector},
};

/// Canvas and font settings for one label.
#[derive(Clone, Debug, PartialEq)]
pub struct LabelStyle {
    pub canvas_width: u32,
    pub canvas_height: u32,
    pub font_size: f32,
    pub bold: bool,
    pub color: [u8; 3],
    pub alpha: f32,
}

impl Default for LabelStyle {
    fn default() -> Self {
        // 256x128 canvas, bold 24px, rgba(0, 0, 0, 0.7), centred
        Self {
            canvas_width: 256,
            canvas_height: 128,
            font_size: 24.0,
            bold: true,
            color: [0, 0, 0],
            alpha: 0.7,
        }
    }
}

pub struct LabelPainter {
    fonts: fontdb::Database,
    families: Vec<String>,
}

impl LabelPainter {
    /// Painter backed by the fonts installed on this machine.
    pub fn system() -> Self {
        let mut fonts = fontdb::Database::new();
        fonts.load_system_fonts();
        log::debug!("label painter loaded {} font faces", fonts.len());
        Self {
            fonts,
            families: vec!["Arial".to_string(), "Helvetica".to_string()],
        }
    }

    /// Painter without any font: labels are blank canvases of the right size.
    pub fn without_fonts() -> Self {
        Self {
            fonts: fontdb::Database::new(),
            families: Vec::new(),
        }
    }

    pub fn load_font_data(&mut self, data: Vec<u8>) {
        self.fonts.load_font_data(data);
    }

    pub fn has_fonts(&self) -> bool {
        !self.fonts.is_empty()
    }

    /// Paints `text` centred horizontally on the canvas with its baseline at
    /// half the canvas height.
    pub fn paint(&self, text: &str, style: &LabelStyle) -> RgbaImage {
        let mut canvas = RgbaImage::from_pixel(
            style.canvas_width,
            style.canvas_height,
            Rgba([255, 255, 255, 0]),
        );
        let Some(id) = self.query(style) else {
            log::warn!("no font available for label '{}', leaving it blank", text);
            return canvas;
        };
        let painted = self.fonts.with_face_data(id, |data, index| {
            FontRef::from_index(data, index as usize)
                .map(|font| draw_text(&mut canvas, font, text, style))
        });
        if painted.flatten().is_none() {
            log::warn!("font face for label '{}' could not be parsed", text);
        }
        canvas
    }

    fn query(&self, style: &LabelStyle) -> Option<fontdb::ID> {
        let mut families: Vec<fontdb::Family> = self
            .families
            .iter()
            .map(|name| fontdb::Family::Name(name.as_str()))
            .collect();
        families.push(fontdb::Family::SansSerif);
        let weight = if style.bold {
            fontdb::Weight::BOLD
        } else {
            fontdb::Weight::NORMAL
        };
        self.fonts
            .query(&fontdb::Query {
                families: &families,
                weight,
                ..Default::default()
            })
            .or_else(|| self.fonts.faces().next().map(|face| face.id))
    }
}

fn draw_text(canvas: &mut RgbaImage, font: FontRef, text: &str, style: &LabelStyle) {
    let charmap = font.charmap();
    let metrics = font.glyph_metrics(&[]).scale(style.font_size);
    let glyphs: Vec<(u16, f32)> = text
        .chars()
        .map(|c| {
            let glyph = charmap.map(c);
            (glyph, metrics.advance_width(glyph))
        })
        .collect();

    let width: f32 = glyphs.iter().map(|(_, advance)| advance).sum();
    let mut pen_x = (style.canvas_width as f32 - width) / 2.0;
    let baseline = (style.canvas_height / 2) as i32;

    let mut context = ScaleContext::new();
    let mut scaler = context.builder(font).size(style.font_size).build();
    for (glyph, advance) in glyphs {
        let origin = pen_x.floor();
        let mask = Render::new(&[Source::Outline])
            .format(Format::Alpha)
            .offset(Vector::new(pen_x - origin, 0.0))
            .render(&mut scaler, glyph);
        if let Some(mask) = mask {
            let left = origin as i32 + mask.placement.left;
            let top = baseline - mask.placement.top;
            blend_mask(canvas, &mask.data, mask.placement.width, left, top, style);
        }
        pen_x += advance;
    }
}

/// Blends an 8-bit coverage mask whose top-left corner sits at `(left, top)`.
/// Overlapping glyphs keep the larger coverage, so no pixel exceeds the style
/// alpha.
fn blend_mask(
    canvas: &mut RgbaImage,
    mask: &[u8],
    mask_width: u32,
    left: i32,
    top: i32,
    style: &LabelStyle,
) {
    if mask_width == 0 {
        return;
    }
    let [r, g, b] = style.color;
    for (i, &coverage) in mask.iter().enumerate() {
        if coverage == 0 {
            continue;
        }
        let x = left + (i as u32 % mask_width) as i32;
        let y = top + (i as u32 / mask_width) as i32;
        if x < 0 || y < 0 || x >= canvas.width() as i32 || y >= canvas.height() as i32 {
            continue;
        }
        let alpha = (coverage as f32 / 255.0 * style.alpha.clamp(0.0, 1.0) * 255.0).round() as u8;
        let pixel = canvas.get_pixel_mut(x as u32, y as u32);
        if alpha > pixel.0[3] {
            *pixel = Rgba([r, g, b, alpha]);
        }
    }
}
