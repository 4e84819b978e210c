//! §4.F color & appearance serializer: color-space-aware fill/stroke
//! operator emission.

use crate::error::{PdfError, PdfResult};
use crate::graphics::state::Color;
use crate::pdf::format::format_real_default;

fn require_unit_range(op: &'static str, component: f32) -> PdfResult<()> {
    if (0.0..=1.0).contains(&component) {
        Ok(())
    } else {
        Err(PdfError::OutOfRange { op, detail: format!("color component {component} is not in [0, 1]") })
    }
}

/// Validate every component of `color`, per the numeric-limits table in
/// spec §6 ("color component [0, 1]").
pub fn validate(op: &'static str, color: Color) -> PdfResult<()> {
    match color {
        Color::Gray(g) => require_unit_range(op, g),
        Color::Rgb(r, g, b) => {
            require_unit_range(op, r)?;
            require_unit_range(op, g)?;
            require_unit_range(op, b)
        }
        Color::Cmyk(c, m, y, k) => {
            require_unit_range(op, c)?;
            require_unit_range(op, m)?;
            require_unit_range(op, y)?;
            require_unit_range(op, k)
        }
    }
}

fn push_real(out: &mut Vec<u8>, value: f32) {
    out.extend_from_slice(format_real_default(value).as_bytes());
}

/// Emit `color` as a fill-color operator (`g`/`rg`/`k`).
pub fn emit_fill(out: &mut Vec<u8>, color: Color) {
    emit(out, color, b'g', b"rg", b'k');
}

/// Emit `color` as a stroke-color operator (`G`/`RG`/`K`).
pub fn emit_stroke(out: &mut Vec<u8>, color: Color) {
    emit(out, color, b'G', b"RG", b'K');
}

fn emit(out: &mut Vec<u8>, color: Color, gray_op: u8, rgb_op: &[u8], cmyk_op: u8) {
    match color {
        Color::Gray(g) => {
            push_real(out, g);
            out.push(b' ');
            out.push(gray_op);
        }
        Color::Rgb(r, g, b) => {
            push_real(out, r);
            out.push(b' ');
            push_real(out, g);
            out.push(b' ');
            push_real(out, b);
            out.push(b' ');
            out.extend_from_slice(rgb_op);
        }
        Color::Cmyk(c, m, y, k) => {
            push_real(out, c);
            out.push(b' ');
            push_real(out, m);
            out.push(b' ');
            push_real(out, y);
            out.push(b' ');
            push_real(out, k);
            out.push(b' ');
            out.push(cmyk_op);
        }
    }
    out.push(b'\n');
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gray_fill_uses_lowercase_g() {
        let mut out = Vec::new();
        emit_fill(&mut out, Color::Gray(0.5));
        assert_eq!(out, b"0.5 g\n");
    }

    #[test]
    fn rgb_stroke_uses_rg_uppercase() {
        let mut out = Vec::new();
        emit_stroke(&mut out, Color::Rgb(1.0, 0.0, 0.0));
        assert_eq!(out, b"1 0 0 RG\n");
    }

    #[test]
    fn cmyk_fill_uses_k() {
        let mut out = Vec::new();
        emit_fill(&mut out, Color::Cmyk(0.0, 0.0, 0.0, 1.0));
        assert_eq!(out, b"0 0 0 1 k\n");
    }

    #[test]
    fn out_of_range_component_is_rejected() {
        assert!(validate("rg", Color::Rgb(1.5, 0.0, 0.0)).is_err());
        assert!(validate("g", Color::Gray(0.2)).is_ok());
    }
}
