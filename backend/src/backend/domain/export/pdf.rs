//! Renders a [`DocumentLayout`] to PDF bytes with `printpdf` and the built-in
//! Helvetica faces.

use anyhow::{anyhow, Result};
use printpdf::{
    BuiltinFont, Color, IndirectFontRef, Line, Mm, PdfDocument, PdfLayerReference, Point,
    Rgb as PdfRgb,
};

use super::layout::{
    Align, DocumentLayout, Element, LineElement, Rgb, TextElement, Weight, PAGE_HEIGHT_MM, PAGE_WIDTH_MM,
};

const PT_TO_MM: f32 = 0.352_778;
const RULE_THICKNESS_PT: f32 = 0.57;

/// Approximate Helvetica advance width, in em
fn glyph_width_em(c: char, weight: Weight) -> f32 {
    match c {
        '0'..='9' | '$' => 0.556,
        ' ' | '.' | ',' | ':' | '|' | 'i' | 'j' | 'l' | 'f' | 't' | 'I' => 0.278,
        'm' | 'w' | 'M' | 'W' => 0.833,
        'A'..='Z' => match weight {
            Weight::Regular => 0.667,
            Weight::Bold => 0.722,
        },
        _ => match weight {
            Weight::Regular => 0.556,
            Weight::Bold => 0.611,
        },
    }
}

/// Estimated rendered width of `text`, in millimetres
pub fn text_width_mm(text: &str, size_pt: f32, weight: Weight) -> f32 {
    let em: f32 = text.chars().map(|c| glyph_width_em(c, weight)).sum();
    em * size_pt * PT_TO_MM
}

/// Left edge of the text once its alignment anchor is applied
fn resolve_x(text: &TextElement) -> f32 {
    let width = text_width_mm(&text.text, text.size_pt, text.weight);
    match text.align {
        Align::Left => text.x,
        Align::Center => text.x - width / 2.0,
        Align::Right => text.x - width,
    }
}

fn pdf_color(color: Rgb) -> Color {
    Color::Rgb(PdfRgb::new(
        f32::from(color.r) / 255.0,
        f32::from(color.g) / 255.0,
        f32::from(color.b) / 255.0,
        None,
    ))
}

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
}

impl Fonts {
    fn get(&self, weight: Weight) -> &IndirectFontRef {
        match weight {
            Weight::Regular => &self.regular,
            Weight::Bold => &self.bold,
        }
    }
}

fn draw_text(layer: &PdfLayerReference, fonts: &Fonts, text: &TextElement) {
    layer.set_fill_color(pdf_color(text.color));
    layer.use_text(
        text.text.as_str(),
        text.size_pt,
        Mm(resolve_x(text)),
        Mm(PAGE_HEIGHT_MM - text.y),
        fonts.get(text.weight),
    );
}

fn draw_rule(layer: &PdfLayerReference, rule: &LineElement) {
    let y = Mm(PAGE_HEIGHT_MM - rule.y);
    layer.set_outline_color(pdf_color(rule.color));
    layer.set_outline_thickness(RULE_THICKNESS_PT);
    layer.add_line(Line {
        points: vec![
            (Point::new(Mm(rule.x1), y), false),
            (Point::new(Mm(rule.x2), y), false),
        ],
        is_closed: false,
    });
}

pub fn render_pdf(layout: &DocumentLayout) -> Result<Vec<u8>> {
    let (doc, first_page, first_layer) = PdfDocument::new(
        layout.title.as_str(),
        Mm(PAGE_WIDTH_MM),
        Mm(PAGE_HEIGHT_MM),
        "Layer 1",
    );

    let fonts = Fonts {
        regular: doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| anyhow!("Failed to load Helvetica: {e}"))?,
        bold: doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| anyhow!("Failed to load Helvetica-Bold: {e}"))?,
    };

    for (index, page) in layout.pages.iter().enumerate() {
        let (page_index, layer_index) = if index == 0 {
            (first_page, first_layer)
        } else {
            doc.add_page(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "Layer 1")
        };
        let layer = doc.get_page(page_index).get_layer(layer_index);

        for element in &page.elements {
            match element {
                Element::Text(text) => draw_text(&layer, &fonts, text),
                Element::Line(rule) => draw_rule(&layer, rule),
            }
        }
    }

    doc.save_to_bytes()
        .map_err(|e| anyhow!("Failed to encode PDF: {e}"))
}
