//! §4.H appearance-stream synthesis: the form XObjects a widget's `AP`
//! dictionary references, built by driving a synthetic content stream
//! (§4.D) the same way a page's content is built.
//!
//! Grounded in libharu's `HPDF_Page_CreateTextAnnotAppearance`-adjacent
//! check-box/radio drawing in `hpdf_annotation.c` and the `MK.R`
//! rotation-matrix table in spec §4.H step 3.

use crate::collab::Font;
use crate::config::DocumentConfig;
use crate::content::shapes::circle_quadrants;
use crate::content::stream::{ContentStream, PaintOp};
use crate::content::text_layout::{text_out, text_rect, Alignment};
use crate::error::PdfResult;
use crate::form::field::{Rect, Rotation};
use crate::graphics::state::Color;
use crate::pdf::object::{Arena, Dict, Object, ObjectId, Stream};

fn bbox_dims(rect: Rect, rotation: Rotation) -> (f32, f32) {
    let (w, h) = (rect.width(), rect.height());
    match rotation {
        Rotation::Deg90 | Rotation::Deg270 => (h, w),
        Rotation::None | Rotation::Deg180 => (w, h),
    }
}

/// §4.H step 3's rotation-matrix table.
fn rotation_matrix(rotation: Rotation, w: f32, h: f32) -> Option<[f32; 6]> {
    match rotation {
        Rotation::None => None,
        Rotation::Deg90 => Some([0.0, 1.0, -1.0, 0.0, h, 0.0]),
        Rotation::Deg180 => Some([-1.0, 0.0, 0.0, -1.0, w, h]),
        Rotation::Deg270 => Some([0.0, -1.0, 1.0, 0.0, 0.0, w]),
    }
}

fn store_form_xobject(arena: &mut Arena, width: f32, height: f32, matrix: Option<[f32; 6]>, resources: Dict, content: Vec<u8>) -> ObjectId {
    let mut dict = Dict::new();
    dict.set("Type", "XObject");
    dict.set("Subtype", "Form");
    dict.set("FormType", 1i64);
    dict.set("BBox", Object::Array(vec![0.0f32.into(), 0.0f32.into(), width.into(), height.into()]));
    if let Some(m) = matrix {
        dict.set("Matrix", Object::Array(m.iter().map(|&v| Object::Real(v)).collect()));
    }
    dict.set("Resources", resources);
    let id = arena.alloc();
    arena.set(id, Stream::new(dict, content));
    id
}

/// Build the resources dict a text appearance stream needs: a single
/// font entry under the local name the caller assigned it.
fn font_resources(font_local_name: &str, font_dict_ref: ObjectId) -> Dict {
    let mut fonts = Dict::new();
    fonts.set(font_local_name, font_dict_ref);
    let mut resources = Dict::new();
    resources.set("Font", fonts);
    resources
}

#[allow(clippy::too_many_arguments)]
pub fn text_field_appearance(
    arena: &mut Arena,
    config: &DocumentConfig,
    font: &dyn Font,
    font_local_name: &str,
    font_dict_ref: ObjectId,
    rect: Rect,
    rotation: Rotation,
    font_size: f32,
    color: Color,
    text: &str,
    align: Alignment,
    multiline: bool,
) -> PdfResult<ObjectId> {
    let (w, h) = bbox_dims(rect, rotation);
    let mut cs = ContentStream::new(config);
    cs.begin_marked_content("Tx")?;
    cs.set_fill_color(color)?;
    cs.begin_text()?;
    cs.set_font(font_local_name, font_size)?;
    if multiline {
        text_rect(&mut cs, font, 2.0, h - 2.0, w - 2.0, 2.0, text, align, true)?;
    } else {
        let (bbox_top, bbox_bottom) = font.bbox();
        let text_height = (bbox_top - bbox_bottom) * font_size / 1000.0;
        let y = ((h - text_height) / 2.0 - bbox_bottom * font_size / 1000.0).max(2.0);
        text_out(&mut cs, font, 2.0, y, text)?;
    }
    cs.end_text()?;
    cs.end_marked_content()?;

    let resources = font_resources(font_local_name, font_dict_ref);
    let matrix = rotation_matrix(rotation, w, h);
    Ok(store_form_xobject(arena, w, h, matrix, resources, cs.into_bytes()))
}

fn with_tx_wrapper(cs: &mut ContentStream, draw: impl FnOnce(&mut ContentStream) -> PdfResult<()>) -> PdfResult<()> {
    cs.begin_marked_content("Tx")?;
    draw(cs)?;
    cs.end_marked_content()
}

/// Check-boxes: `/Yes` draws the box outline plus an interior X; `/Off`
/// draws only the outline. Both share the same `BBox`.
pub fn check_box_appearances(arena: &mut Arena, config: &DocumentConfig, rect: Rect) -> PdfResult<(ObjectId, ObjectId)> {
    let (w, h) = (rect.width(), rect.height());
    let inset = (w.min(h) * 0.1).max(0.5);

    let mut off = ContentStream::new(config);
    with_tx_wrapper(&mut off, |cs| draw_box_outline(cs, w, h))?;
    let off_id = store_form_xobject(arena, w, h, None, Dict::new(), off.into_bytes());

    let mut on = ContentStream::new(config);
    with_tx_wrapper(&mut on, |cs| {
        draw_box_outline(cs, w, h)?;
        cs.move_to(inset, inset)?;
        cs.line_to(w - inset, h - inset)?;
        cs.move_to(inset, h - inset)?;
        cs.line_to(w - inset, inset)?;
        cs.paint(PaintOp::Stroke)
    })?;
    let on_id = store_form_xobject(arena, w, h, None, Dict::new(), on.into_bytes());

    Ok((on_id, off_id))
}

fn draw_box_outline(cs: &mut ContentStream, w: f32, h: f32) -> PdfResult<()> {
    cs.set_stroke_color(Color::Gray(0.0))?;
    cs.rectangle(0.5, 0.5, w - 1.0, h - 1.0)?;
    cs.paint(PaintOp::Stroke)?;
    Ok(())
}

/// Radio buttons: the outer circle is drawn in every appearance; the
/// selected appearance additionally fills an inner dot. `/Off` is the
/// outer circle alone.
pub fn radio_button_appearances(arena: &mut Arena, config: &DocumentConfig, rect: Rect) -> PdfResult<(ObjectId, ObjectId)> {
    let (w, h) = (rect.width(), rect.height());
    let (cx, cy) = (w / 2.0, h / 2.0);
    let r = (w.min(h) / 2.0 - 1.0).max(1.0);

    let mut off = ContentStream::new(config);
    with_tx_wrapper(&mut off, |cs| {
        draw_circle_path(cs, cx, cy, r)?;
        cs.set_stroke_color(Color::Gray(0.0))?;
        cs.paint(PaintOp::Stroke)
    })?;
    let off_id = store_form_xobject(arena, w, h, None, Dict::new(), off.into_bytes());

    let mut on = ContentStream::new(config);
    with_tx_wrapper(&mut on, |cs| {
        draw_circle_path(cs, cx, cy, r)?;
        cs.set_stroke_color(Color::Gray(0.0))?;
        cs.paint(PaintOp::Stroke)?;
        draw_circle_path(cs, cx, cy, r * 0.5)?;
        cs.set_fill_color(Color::Gray(0.0))?;
        cs.paint(PaintOp::Fill)
    })?;
    let on_id = store_form_xobject(arena, w, h, None, Dict::new(), on.into_bytes());

    Ok((on_id, off_id))
}

fn draw_circle_path(cs: &mut ContentStream, cx: f32, cy: f32, r: f32) -> PdfResult<()> {
    let quadrants = circle_quadrants(cx, cy, r);
    cs.move_to(quadrants[0].start.x, quadrants[0].start.y)?;
    for segment in &quadrants {
        cs.curve_to(
            segment.control1.x,
            segment.control1.y,
            segment.control2.x,
            segment.control2.y,
            segment.end.x,
            segment.end.y,
        )?;
    }
    cs.close_path()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collab::{ByteClass, Encoder, FontKind, WritingMode};
    use crate::pdf::object::Object;

    struct StubFont;
    impl Font for StubFont {
        fn bbox(&self) -> (f32, f32) {
            (750.0, -250.0)
        }
        fn descent(&self) -> f32 {
            -250.0
        }
        fn writing_mode(&self) -> WritingMode {
            WritingMode::Horizontal
        }
        fn kind(&self) -> FontKind {
            FontKind::Type1
        }
        fn encoder(&self) -> Option<&dyn Encoder> {
            None
        }
        fn local_resource_name(&self) -> &str {
            "F1"
        }
        fn measure_text(&self, text: &str, _max_width: f32, _wordwrap: bool) -> (usize, f32) {
            (text.len(), text.len() as f32 * 500.0)
        }
    }

    #[test]
    fn rotation_matrix_matches_table() {
        assert_eq!(rotation_matrix(Rotation::Deg90, 10.0, 20.0), Some([0.0, 1.0, -1.0, 0.0, 20.0, 0.0]));
        assert_eq!(rotation_matrix(Rotation::Deg180, 10.0, 20.0), Some([-1.0, 0.0, 0.0, -1.0, 10.0, 20.0]));
        assert_eq!(rotation_matrix(Rotation::Deg270, 10.0, 20.0), Some([0.0, -1.0, 1.0, 0.0, 0.0, 10.0]));
        assert_eq!(rotation_matrix(Rotation::None, 10.0, 20.0), None);
    }

    #[test]
    fn rotated_bbox_swaps_dimensions() {
        let rect = Rect { left: 0.0, bottom: 0.0, right: 100.0, top: 20.0 };
        assert_eq!(bbox_dims(rect, Rotation::None), (100.0, 20.0));
        assert_eq!(bbox_dims(rect, Rotation::Deg90), (20.0, 100.0));
    }

    #[test]
    fn text_field_appearance_wraps_in_tx_marked_content() {
        let mut arena = Arena::new();
        let config = DocumentConfig::default();
        let font_ref = arena.alloc();
        arena.set(font_ref, Dict::new());
        let rect = Rect { left: 0.0, bottom: 0.0, right: 100.0, top: 20.0 };
        let id = text_field_appearance(
            &mut arena,
            &config,
            &StubFont,
            "F1",
            font_ref,
            rect,
            Rotation::None,
            12.0,
            Color::Gray(0.0),
            "hello",
            Alignment::Left,
            false,
        )
        .unwrap();
        match arena.get(id) {
            Some(Object::Stream(stream)) => {
                let text = String::from_utf8(stream.data.clone()).unwrap();
                assert!(text.starts_with("/Tx BMC\n"));
                assert!(text.trim_end().ends_with("EMC"));
            }
            _ => panic!("expected stream"),
        }
    }

    #[test]
    fn check_box_on_appearance_draws_an_x() {
        let mut arena = Arena::new();
        let config = DocumentConfig::default();
        let rect = Rect { left: 0.0, bottom: 0.0, right: 20.0, top: 20.0 };
        let (on, off) = check_box_appearances(&mut arena, &config, rect).unwrap();
        let on_len = match arena.get(on) {
            Some(Object::Stream(s)) => s.data.len(),
            _ => panic!("expected stream"),
        };
        let off_len = match arena.get(off) {
            Some(Object::Stream(s)) => s.data.len(),
            _ => panic!("expected stream"),
        };
        assert!(on_len > off_len);
    }
}
