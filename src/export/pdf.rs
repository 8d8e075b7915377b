// src/export/pdf.rs — Minimal PDF 1.4 writer for chat transcripts
//
// Uses the standard Type1 Helvetica faces with WinAnsiEncoding, so no font
// data is embedded. Text widths are estimated from a per-face average
// glyph width, rounded up so wide capitals stay inside the margin.

use std::fmt::Write as _;

const PAGE_WIDTH: f32 = 595.0; // A4
const PAGE_HEIGHT: f32 = 842.0;
const MARGIN_LEFT: f32 = 72.0;
const MARGIN_RIGHT: f32 = 72.0;
const MARGIN_TOP: f32 = 72.0;
const MARGIN_BOTTOM: f32 = 18.0;
const LEADING: f32 = 1.2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Font {
    Regular,
    Bold,
    Oblique,
}

impl Font {
    fn resource(self) -> &'static str {
        match self {
            Font::Regular => "F1",
            Font::Bold => "F2",
            Font::Oblique => "F3",
        }
    }

    /// Conservative average advance in ems.
    fn glyph_width_em(self) -> f32 {
        match self {
            Font::Regular | Font::Oblique => 0.55,
            Font::Bold => 0.72,
        }
    }

    fn base_font(self) -> &'static str {
        match self {
            Font::Regular => "Helvetica",
            Font::Bold => "Helvetica-Bold",
            Font::Oblique => "Helvetica-Oblique",
        }
    }
}

const FONTS: [Font; 3] = [Font::Regular, Font::Bold, Font::Oblique];

#[derive(Debug, Clone, Copy)]
pub struct Style {
    pub font: Font,
    pub size: f32,
    pub indent: f32,
    pub color: (f32, f32, f32),
    pub space_after: f32,
    pub centered: bool,
}

impl Style {
    pub const fn new(font: Font, size: f32) -> Self {
        Self {
            font,
            size,
            indent: 0.0,
            color: (0.0, 0.0, 0.0),
            space_after: 0.0,
            centered: false,
        }
    }
}

/// Accumulates laid-out pages, then serialises them.
pub struct PdfBuilder {
    pages: Vec<String>,
    current: String,
    cursor_y: f32,
}

impl Default for PdfBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfBuilder {
    pub fn new() -> Self {
        Self {
            pages: Vec::new(),
            current: String::new(),
            cursor_y: PAGE_HEIGHT - MARGIN_TOP,
        }
    }

    /// Lay out `text` as one paragraph. Embedded newlines start new lines;
    /// blank lines leave a gap of one line.
    pub fn paragraph(&mut self, text: &str, style: Style) {
        let line_height = style.size * LEADING;
        let usable = PAGE_WIDTH - MARGIN_LEFT - MARGIN_RIGHT - style.indent;

        for source_line in text.split('\n') {
            let wrapped = wrap(source_line, usable, style.size, style.font);
            if wrapped.is_empty() {
                self.advance(line_height);
                continue;
            }
            for line in wrapped {
                self.ensure_room(line_height);
                self.cursor_y -= line_height;
                let x = if style.centered {
                    ((PAGE_WIDTH - text_width(&line, style.size, style.font)) / 2.0).max(MARGIN_LEFT)
                } else {
                    MARGIN_LEFT + style.indent
                };
                let (r, g, b) = style.color;
                let _ = writeln!(
                    self.current,
                    "BT /{} {:.1} Tf {:.3} {:.3} {:.3} rg {:.2} {:.2} Td ({}) Tj ET",
                    style.font.resource(),
                    style.size,
                    r,
                    g,
                    b,
                    x,
                    self.cursor_y,
                    escape_text(&line)
                );
            }
        }
        self.advance(style.space_after);
    }

    /// Vertical gap; never carries over onto a fresh page.
    pub fn spacer(&mut self, height: f32) {
        self.advance(height);
    }

    pub fn page_count(&self) -> usize {
        self.pages.len() + usize::from(!self.current.is_empty() || self.pages.is_empty())
    }

    fn advance(&mut self, height: f32) {
        self.cursor_y = (self.cursor_y - height).max(MARGIN_BOTTOM);
    }

    fn ensure_room(&mut self, height: f32) {
        if self.cursor_y - height < MARGIN_BOTTOM {
            self.pages.push(std::mem::take(&mut self.current));
            self.cursor_y = PAGE_HEIGHT - MARGIN_TOP;
        }
    }

    /// Serialise to PDF bytes.
    pub fn finish(mut self) -> Vec<u8> {
        if !self.current.is_empty() || self.pages.is_empty() {
            self.pages.push(std::mem::take(&mut self.current));
        }

        // Object numbering: 1 catalog, 2 page tree, 3..=5 fonts, then a
        // (page, content) pair per page.
        let first_page_obj = 3 + FONTS.len();
        let page_ids: Vec<usize> = (0..self.pages.len())
            .map(|i| first_page_obj + i * 2)
            .collect();

        let mut objects: Vec<String> = Vec::new();
        objects.push("<< /Type /Catalog /Pages 2 0 R >>".to_string());
        objects.push(format!(
            "<< /Type /Pages /Kids [{}] /Count {} >>",
            page_ids
                .iter()
                .map(|id| format!("{id} 0 R"))
                .collect::<Vec<_>>()
                .join(" "),
            page_ids.len()
        ));
        for font in FONTS {
            objects.push(format!(
                "<< /Type /Font /Subtype /Type1 /BaseFont /{} /Encoding /WinAnsiEncoding >>",
                font.base_font()
            ));
        }

        let font_resources = FONTS
            .iter()
            .enumerate()
            .map(|(i, f)| format!("/{} {} 0 R", f.resource(), 3 + i))
            .collect::<Vec<_>>()
            .join(" ");

        for (page_id, content) in page_ids.iter().zip(&self.pages) {
            objects.push(format!(
                "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {PAGE_WIDTH} {PAGE_HEIGHT}] \
                 /Resources << /Font << {font_resources} >> >> /Contents {} 0 R >>",
                page_id + 1
            ));
            objects.push(format!(
                "<< /Length {} >>\nstream\n{}endstream",
                content.len(),
                content
            ));
        }

        let mut out = String::from("%PDF-1.4\n");
        let mut offsets = Vec::with_capacity(objects.len());
        for (i, body) in objects.iter().enumerate() {
            offsets.push(out.len());
            let _ = write!(out, "{} 0 obj\n{}\nendobj\n", i + 1, body);
        }

        let xref_offset = out.len();
        let _ = write!(out, "xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1);
        for offset in offsets {
            let _ = write!(out, "{offset:010} 00000 n \n");
        }
        let _ = write!(
            out,
            "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
            objects.len() + 1,
            xref_offset
        );

        out.into_bytes()
    }
}

fn text_width(text: &str, size: f32, font: Font) -> f32 {
    text.chars().count() as f32 * size * font.glyph_width_em()
}

/// Greedy word wrap by estimated width. Words longer than a line are split.
pub fn wrap(text: &str, max_width: f32, size: f32, font: Font) -> Vec<String> {
    let max_chars = ((max_width / (size * font.glyph_width_em())).floor() as usize).max(1);
    let mut lines = Vec::new();
    let mut line = String::new();
    let mut line_chars = 0;

    for word in text.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();
        while word.len() > max_chars {
            if !line.is_empty() {
                lines.push(std::mem::take(&mut line));
                line_chars = 0;
            }
            let rest = word.split_off(max_chars);
            lines.push(word.into_iter().collect());
            word = rest;
        }

        let needed = if line.is_empty() { word.len() } else { word.len() + 1 };
        if line_chars + needed > max_chars && !line.is_empty() {
            lines.push(std::mem::take(&mut line));
            line_chars = 0;
        }
        if !line.is_empty() {
            line.push(' ');
            line_chars += 1;
        }
        line.extend(word.iter());
        line_chars += word.len();
    }

    if !line.is_empty() {
        lines.push(line);
    }
    lines
}

/// Escape for a PDF literal string in WinAnsiEncoding. Output is ASCII.
pub fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '(' | ')' | '\\' => {
                out.push('\\');
                out.push(c);
            }
            ' '..='~' => out.push(c),
            '\t' => out.push(' '),
            '\u{2018}' | '\u{2019}' => out.push('\''),
            '\u{201C}' | '\u{201D}' => out.push('"'),
            '\u{2013}' | '\u{2014}' => out.push('-'),
            '\u{2022}' => out.push_str("\\225"),
            '\u{00A0}'..='\u{00FF}' => {
                let _ = write!(out, "\\{:03o}", c as u32);
            }
            _ => out.push('?'),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_escape_text() {
        assert_eq!(escape_text("a (b) \\ c"), "a \\(b\\) \\\\ c");
        assert_eq!(escape_text("café"), "caf\\351");
        assert_eq!(escape_text("“quoted” – ok"), "\"quoted\" - ok");
        assert_eq!(escape_text("µg 漢"), "\\265g ?");
    }

    #[test]
    fn test_wrap_respects_width() {
        // 10pt regular at 0.55em per glyph: 115pt fits 20 characters.
        let lines = wrap("the quick brown fox jumps over the lazy dog", 115.0, 10.0, Font::Regular);
        assert_eq!(lines, vec!["the quick brown fox", "jumps over the lazy", "dog"]);
        assert!(lines.iter().all(|l| l.chars().count() <= 20));
    }

    #[test]
    fn test_wrap_splits_long_words() {
        let lines = wrap("abcdefghij", 30.0, 10.0, Font::Regular);
        assert_eq!(lines, vec!["abcde", "fghij"]);
    }

    #[test]
    fn test_wrap_blank_is_empty() {
        assert!(wrap("   ", 100.0, 10.0, Font::Regular).is_empty());
    }

    /// Helvetica-Bold advance widths (1/1000 em) for capitals and space.
    fn bold_caps_width(text: &str, size: f32) -> f32 {
        const CAPS: [u16; 26] = [
            722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778, 667, 778,
            722, 667, 611, 722, 667, 944, 667, 667, 611,
        ];
        text.chars()
            .map(|c| match c {
                'A'..='Z' => CAPS[(c as u8 - b'A') as usize],
                _ => 278,
            })
            .map(|w| f32::from(w) / 1000.0 * size)
            .sum()
    }

    #[test]
    fn test_bold_capitals_stay_inside_margin() {
        // Question lines are 12pt bold, indented 20pt.
        let usable = PAGE_WIDTH - MARGIN_LEFT - MARGIN_RIGHT - 20.0;
        let text = "QUESTION ONE: WHAT DOES MICROGRAVITY DO TO BONE MINERAL DENSITY \
                    AND MUSCLE MASS WHEN MICE ARE HOUSED ON THE ORBITING LABORATORY";
        let lines = wrap(text, usable, 12.0, Font::Bold);

        assert!(lines.len() > 1);
        for line in &lines {
            let actual = bold_caps_width(line, 12.0);
            assert!(actual <= usable, "{line:?} is {actual}pt wide");
        }
        assert!(
            wrap(text, usable, 12.0, Font::Regular).len() < lines.len(),
            "bold should wrap sooner than regular"
        );
    }

    #[test]
    fn test_document_structure() {
        let mut pdf = PdfBuilder::new();
        pdf.paragraph("Hello (world)", Style::new(Font::Bold, 12.0));
        let bytes = pdf.finish();
        let text = String::from_utf8(bytes).unwrap();

        assert!(text.starts_with("%PDF-1.4\n"));
        assert!(text.ends_with("%%EOF\n"));
        assert!(text.contains("/BaseFont /Helvetica-Bold"));
        assert!(text.contains("(Hello \\(world\\)) Tj"));
        assert!(text.contains("/Count 1"));
    }

    #[test]
    fn test_xref_offsets_point_at_objects() {
        let mut pdf = PdfBuilder::new();
        pdf.paragraph("x", Style::new(Font::Regular, 11.0));
        let text = String::from_utf8(pdf.finish()).unwrap();

        let xref_start: usize = text
            .rsplit("startxref\n")
            .next()
            .and_then(|tail| tail.lines().next())
            .and_then(|n| n.parse().ok())
            .unwrap();
        assert!(text[xref_start..].starts_with("xref\n"));

        let entries: Vec<usize> = text[xref_start..]
            .lines()
            .skip(3)
            .take_while(|l| l.ends_with(" n "))
            .map(|l| l[..10].parse().unwrap())
            .collect();
        assert!(!entries.is_empty());
        for (i, offset) in entries.iter().enumerate() {
            assert!(text[*offset..].starts_with(&format!("{} 0 obj", i + 1)));
        }
    }

    #[test]
    fn test_long_text_paginates() {
        let mut pdf = PdfBuilder::new();
        let body = "line\n".repeat(200);
        pdf.paragraph(&body, Style::new(Font::Regular, 11.0));
        assert!(pdf.page_count() > 1);
        let text = String::from_utf8(pdf.finish()).unwrap();
        assert!(text.matches("/Type /Page /Parent").count() > 1);
    }

    #[test]
    fn test_empty_document_has_one_page() {
        let pdf = PdfBuilder::new();
        assert_eq!(pdf.page_count(), 1);
        let text = String::from_utf8(pdf.finish()).unwrap();
        assert_eq!(text.matches("/Type /Page /Parent").count(), 1);
    }
}
