//! SVG output.

use crate::adapter::{DrawStyle, RenderAdapter, RenderResult};
use komaink_core::elements::Transform;
use komaink_core::manipulation::{Handle, HandleType};
use kurbo::{BezPath, Rect, Size};
use peniko::Color;
use std::fmt::Write;

/// Side length of a square resize handle, in canvas units.
pub const HANDLE_SIZE: f64 = 8.0;

fn handle_color() -> Color {
    Color::from_rgba8(33, 150, 243, 255)
}

fn tail_handle_color() -> Color {
    Color::from_rgba8(255, 152, 0, 255)
}

fn hex(color: Color) -> String {
    let c = color.to_rgba8();
    format!("#{:02x}{:02x}{:02x}", c.r, c.g, c.b)
}

fn alpha(color: Color) -> f64 {
    f64::from(color.to_rgba8().a) / 255.0
}

fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c => out.push(c),
        }
    }
    out
}

/// Writes a page as a standalone SVG document.
#[derive(Debug, Clone)]
pub struct SvgAdapter {
    size: Size,
    background: Option<Color>,
    body: String,
    defs: String,
    clip_count: usize,
}

impl SvgAdapter {
    pub fn new(size: Size) -> Self {
        Self {
            size,
            background: None,
            body: String::new(),
            defs: String::new(),
            clip_count: 0,
        }
    }

    pub fn with_background(mut self, color: Color) -> Self {
        self.background = Some(color);
        self
    }

    /// Close the document and return the SVG text.
    pub fn finish(self) -> RenderResult<String> {
        let mut out = String::new();
        writeln!(
            out,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
            w = self.size.width,
            h = self.size.height
        )?;
        if !self.defs.is_empty() {
            writeln!(out, "<defs>\n{}</defs>", self.defs)?;
        }
        if let Some(bg) = self.background {
            writeln!(
                out,
                r#"<rect width="{}" height="{}" fill="{}"/>"#,
                self.size.width,
                self.size.height,
                hex(bg)
            )?;
        }
        out.push_str(&self.body);
        out.push_str("</svg>\n");
        Ok(out)
    }

    fn paint_attrs(&self, style: &DrawStyle) -> RenderResult<String> {
        let mut attrs = String::new();
        match style.fill {
            Some(fill) => {
                write!(attrs, r#" fill="{}" fill-rule="nonzero""#, hex(fill))?;
                if alpha(fill) < 1.0 {
                    write!(attrs, r#" fill-opacity="{}""#, alpha(fill))?;
                }
            }
            None => attrs.push_str(r#" fill="none""#),
        }
        if let Some(stroke) = style.stroke {
            write!(
                attrs,
                r#" stroke="{}" stroke-width="{}" stroke-linejoin="round""#,
                hex(stroke),
                style.stroke_width
            )?;
            if style.dashed {
                let dash = (style.stroke_width * 3.0).max(2.0);
                write!(attrs, r#" stroke-dasharray="{dash} {dash}""#)?;
            }
        }
        if style.opacity < 1.0 {
            write!(attrs, r#" opacity="{}""#, style.opacity)?;
        }
        Ok(attrs)
    }
}

impl RenderAdapter for SvgAdapter {
    fn draw_shape(&mut self, path: &BezPath, style: &DrawStyle) -> RenderResult<()> {
        if path.elements().is_empty() {
            return Ok(());
        }
        let attrs = self.paint_attrs(style)?;
        writeln!(self.body, r#"<path d="{}"{}/>"#, path.to_svg(), attrs)?;
        Ok(())
    }

    fn place_handles(&mut self, handles: &[Handle]) -> RenderResult<()> {
        if handles.is_empty() {
            return Ok(());
        }
        self.body.push_str("<g class=\"handles\">\n");
        for handle in handles {
            let p = handle.position;
            match handle.kind {
                HandleType::Move => {}
                HandleType::Tail => writeln!(
                    self.body,
                    r#"<circle cx="{}" cy="{}" r="{}" fill="{}" stroke="white"/>"#,
                    p.x,
                    p.y,
                    HANDLE_SIZE * 0.75,
                    hex(tail_handle_color())
                )?,
                HandleType::Rotate => writeln!(
                    self.body,
                    r#"<circle cx="{}" cy="{}" r="{}" fill="white" stroke="{}"/>"#,
                    p.x,
                    p.y,
                    HANDLE_SIZE / 2.0,
                    hex(handle_color())
                )?,
                _ => writeln!(
                    self.body,
                    r#"<rect x="{}" y="{}" width="{s}" height="{s}" fill="white" stroke="{}"/>"#,
                    p.x - HANDLE_SIZE / 2.0,
                    p.y - HANDLE_SIZE / 2.0,
                    hex(handle_color()),
                    s = HANDLE_SIZE
                )?,
            }
        }
        self.body.push_str("</g>\n");
        Ok(())
    }

    fn draw_label(&mut self, frame: Rect, text: &str, font_size: f64) -> RenderResult<()> {
        let lines: Vec<&str> = text.lines().collect();
        if lines.is_empty() {
            return Ok(());
        }
        let line_height = font_size * 1.2;
        let center = frame.center();
        let first_y = center.y - line_height * (lines.len() as f64 - 1.0) / 2.0;
        writeln!(
            self.body,
            r#"<text x="{}" font-size="{}" text-anchor="middle" dominant-baseline="middle" font-family="sans-serif">"#,
            center.x, font_size
        )?;
        for (i, line) in lines.iter().enumerate() {
            writeln!(
                self.body,
                r#"<tspan x="{}" y="{}">{}</tspan>"#,
                center.x,
                first_y + line_height * i as f64,
                escape_xml(line)
            )?;
        }
        self.body.push_str("</text>\n");
        Ok(())
    }

    fn draw_image(
        &mut self,
        transform: &Transform,
        source: &str,
        clip: Option<&BezPath>,
    ) -> RenderResult<()> {
        let mut attrs = String::new();
        if let Some(clip) = clip {
            self.clip_count += 1;
            let id = format!("clip{}", self.clip_count);
            writeln!(self.defs, r#"<clipPath id="{id}"><path d="{}"/></clipPath>"#, clip.to_svg())?;
            write!(attrs, r#" clip-path="url(#{id})""#)?;
        }
        if transform.rotation.abs() > f64::EPSILON {
            let c = transform.center();
            write!(
                attrs,
                r#" transform="rotate({} {} {})""#,
                transform.rotation.to_degrees(),
                c.x,
                c.y
            )?;
        }
        if transform.alpha < 1.0 {
            write!(attrs, r#" opacity="{}""#, transform.alpha.max(0.0))?;
        }
        writeln!(
            self.body,
            r#"<image href="{}" x="{}" y="{}" width="{}" height="{}" preserveAspectRatio="xMidYMid slice"{}/>"#,
            escape_xml(source),
            transform.x,
            transform.y,
            transform.width,
            transform.height,
            attrs
        )?;
        Ok(())
    }
}
