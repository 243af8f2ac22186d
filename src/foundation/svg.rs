use std::fmt::Write as _;

use crate::foundation::color::Rgba8;

/// Tiny append-only SVG fragment builder.
///
/// Renderers emit geometry as SVG elements into a fragment; the card
/// compositor concatenates fragments into one document and rasterizes it
/// with `resvg`. No element nesting beyond flat groups is needed here.
#[derive(Clone, Debug, Default)]
pub struct SvgFragment {
    buf: String,
}

impl SvgFragment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.buf
    }

    pub fn push_fragment(&mut self, other: &SvgFragment) {
        self.buf.push_str(&other.buf);
    }

    /// Raw element passthrough for one-off markup.
    pub fn push_raw(&mut self, markup: &str) {
        self.buf.push_str(markup);
        self.buf.push('\n');
    }

    pub fn open_group(&mut self, transform: Option<&str>) {
        match transform {
            Some(t) => {
                let _ = writeln!(self.buf, r#"<g transform="{t}">"#);
            }
            None => self.buf.push_str("<g>\n"),
        }
    }

    pub fn close_group(&mut self) {
        self.buf.push_str("</g>\n");
    }

    pub fn rect(&mut self, x: f64, y: f64, w: f64, h: f64, rx: f64, fill: Rgba8) {
        let _ = writeln!(
            self.buf,
            r#"<rect x="{x:.2}" y="{y:.2}" width="{w:.2}" height="{h:.2}" rx="{rx:.2}" fill="{}" fill-opacity="{:.4}"/>"#,
            fill.hex(),
            fill.opacity(),
        );
    }

    pub fn circle(&mut self, cx: f64, cy: f64, r: f64, fill: Rgba8) {
        let _ = writeln!(
            self.buf,
            r#"<circle cx="{cx:.2}" cy="{cy:.2}" r="{r:.2}" fill="{}" fill-opacity="{:.4}"/>"#,
            fill.hex(),
            fill.opacity(),
        );
    }

    pub fn ellipse(&mut self, cx: f64, cy: f64, rx: f64, ry: f64, fill: Rgba8) {
        let _ = writeln!(
            self.buf,
            r#"<ellipse cx="{cx:.2}" cy="{cy:.2}" rx="{rx:.2}" ry="{ry:.2}" fill="{}" fill-opacity="{:.4}"/>"#,
            fill.hex(),
            fill.opacity(),
        );
    }

    /// Stroked, unfilled path from an SVG path `d` string (round caps/joins).
    pub fn stroke_path(&mut self, d: &str, stroke: Rgba8, width: f64) {
        let _ = writeln!(
            self.buf,
            r#"<path d="{d}" fill="none" stroke="{}" stroke-opacity="{:.4}" stroke-width="{width:.2}" stroke-linecap="round" stroke-linejoin="round"/>"#,
            stroke.hex(),
            stroke.opacity(),
        );
    }

    /// Filled, unstroked path.
    pub fn fill_path(&mut self, d: &str, fill: Rgba8) {
        let _ = writeln!(
            self.buf,
            r#"<path d="{d}" fill="{}" fill-opacity="{:.4}" stroke="none"/>"#,
            fill.hex(),
            fill.opacity(),
        );
    }

    pub fn text(&mut self, x: f64, y: f64, size: f64, weight: u32, anchor: TextAnchor, fill: Rgba8, content: &str) {
        let _ = writeln!(
            self.buf,
            r#"<text x="{x:.2}" y="{y:.2}" font-family="sans-serif" font-size="{size:.1}" font-weight="{weight}" text-anchor="{}" fill="{}" fill-opacity="{:.4}">{}</text>"#,
            anchor.as_str(),
            fill.hex(),
            fill.opacity(),
            escape_text(content),
        );
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextAnchor {
    Start,
    Middle,
    End,
}

impl TextAnchor {
    fn as_str(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Middle => "middle",
            Self::End => "end",
        }
    }
}

/// Escape text node content (attribute values never carry user text here).
pub fn escape_text(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

/// Wrap fragments into a complete standalone SVG document.
pub fn document(width: u32, height: u32, body: &SvgFragment) -> String {
    format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\" \
         viewBox=\"0 0 {width} {height}\">\n{}</svg>\n",
        body.as_str(),
    )
}
