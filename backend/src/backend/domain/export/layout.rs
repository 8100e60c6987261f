//! Page layout of a printed transaction, independent of any PDF library.
//!
//! Coordinates are millimetres on an A4 page with the origin at the top-left
//! corner. Text `y` is the baseline.

use std::borrow::Cow;

use chrono::NaiveDateTime;
use shared::TransactionWithItems;

use super::format::{format_currency, format_date, format_quantity, format_timestamp};

pub const PAGE_WIDTH_MM: f32 = 210.0;
pub const PAGE_HEIGHT_MM: f32 = 297.0;

pub const DOCUMENT_TITLE: &str = "Controle Financeiro - Projeto Avalanche";

const CENTER_X: f32 = 105.0;
const LEFT_MARGIN: f32 = 20.0;
const RIGHT_MARGIN: f32 = 190.0;
const VALUE_COLUMN: f32 = 70.0;
const QUANTITY_COLUMN: f32 = 110.0;
const UNIT_VALUE_COLUMN: f32 = 140.0;
const FINAL_VALUE_COLUMN: f32 = 180.0;

const ROW_STEP: f32 = 7.0;
/// An item starting below this line goes to a new page
const PAGE_BREAK_Y: f32 = 270.0;
const CONTINUATION_Y: f32 = 20.0;
const FOOTER_Y: f32 = 290.0;

const MAX_ITEM_NAME_CHARS: usize = 50;
const TRUNCATED_ITEM_NAME_CHARS: usize = 47;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

pub const BLACK: Rgb = Rgb { r: 0, g: 0, b: 0 };
pub const SEPARATOR_GRAY: Rgb = Rgb { r: 200, g: 200, b: 200 };
pub const TOTAL_GREEN: Rgb = Rgb { r: 0, g: 128, b: 0 };

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Weight {
    Regular,
    Bold,
}

/// Which point of the text sits on `x`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextElement {
    pub text: String,
    pub x: f32,
    pub y: f32,
    pub size_pt: f32,
    pub weight: Weight,
    pub align: Align,
    pub color: Rgb,
}

/// Horizontal rule
#[derive(Debug, Clone, PartialEq)]
pub struct LineElement {
    pub x1: f32,
    pub x2: f32,
    pub y: f32,
    pub color: Rgb,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Element {
    Text(TextElement),
    Line(LineElement),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub elements: Vec<Element>,
}

impl Page {
    pub fn texts(&self) -> impl Iterator<Item = &TextElement> {
        self.elements.iter().filter_map(|element| match element {
            Element::Text(text) => Some(text),
            Element::Line(_) => None,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DocumentLayout {
    pub title: String,
    pub pages: Vec<Page>,
}

/// `movimentacao-<number>.pdf`. Characters other than ASCII letters, digits,
/// `-` and `_` become `_`, so the name never leaves the export directory.
pub fn export_file_name(transaction_number: &str) -> String {
    let number: String = transaction_number
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!("movimentacao-{number}.pdf")
}

/// Names longer than 50 characters keep their first 47 plus `...`
pub fn truncate_item_name(name: &str) -> Cow<'_, str> {
    if name.chars().count() <= MAX_ITEM_NAME_CHARS {
        return Cow::Borrowed(name);
    }
    let kept: String = name.chars().take(TRUNCATED_ITEM_NAME_CHARS).collect();
    Cow::Owned(format!("{kept}..."))
}

struct PageWriter {
    pages: Vec<Page>,
}

impl PageWriter {
    fn new() -> Self {
        Self {
            pages: vec![Page::default()],
        }
    }

    fn current(&mut self) -> &mut Page {
        if self.pages.is_empty() {
            self.pages.push(Page::default());
        }
        let last = self.pages.len() - 1;
        &mut self.pages[last]
    }

    fn new_page(&mut self) {
        self.pages.push(Page::default());
    }

    #[allow(clippy::too_many_arguments)]
    fn text(
        &mut self,
        text: impl Into<String>,
        x: f32,
        y: f32,
        size_pt: f32,
        weight: Weight,
        align: Align,
        color: Rgb,
    ) {
        self.current().elements.push(Element::Text(TextElement {
            text: text.into(),
            x,
            y,
            size_pt,
            weight,
            align,
            color,
        }));
    }

    fn rule(&mut self, y: f32) {
        self.current().elements.push(Element::Line(LineElement {
            x1: LEFT_MARGIN,
            x2: RIGHT_MARGIN,
            y,
            color: SEPARATOR_GRAY,
        }));
    }
}

/// Lay out one transaction with its items. `generated_at` goes in every footer.
pub fn layout_transaction(
    transaction: &TransactionWithItems,
    generated_at: NaiveDateTime,
) -> DocumentLayout {
    use Align::{Center, Left, Right};
    use Weight::{Bold, Regular};

    let record = &transaction.transaction.record;
    let mut writer = PageWriter::new();

    writer.text(DOCUMENT_TITLE, CENTER_X, 20.0, 20.0, Bold, Center, BLACK);
    writer.text(
        format!("Movimentação #{}", record.transaction_number),
        CENTER_X,
        30.0,
        16.0,
        Bold,
        Center,
        BLACK,
    );
    writer.rule(35.0);

    writer.text("Dados da Movimentação", LEFT_MARGIN, 45.0, 12.0, Bold, Left, BLACK);

    let metadata = [
        ("Data de Emissão:", format_date(record.header.issue_date)),
        ("Data de Entrada:", format_date(record.header.entry_date)),
        ("Empresa:", record.header.company_name.clone()),
        ("Número da Nota:", record.header.invoice_number.clone()),
    ];
    let mut y = 55.0;
    for (i, (label, value)) in metadata.into_iter().enumerate() {
        if i > 0 {
            y += ROW_STEP;
        }
        writer.text(label, LEFT_MARGIN, y, 10.0, Bold, Left, BLACK);
        writer.text(value, VALUE_COLUMN, y, 10.0, Regular, Left, BLACK);
    }

    y += 15.0;
    writer.text("Itens da Movimentação", LEFT_MARGIN, y, 12.0, Bold, Left, BLACK);

    y += 10.0;
    writer.text("Item", LEFT_MARGIN, y, 9.0, Bold, Left, BLACK);
    writer.text("Qtd", QUANTITY_COLUMN, y, 9.0, Bold, Right, BLACK);
    writer.text("Valor Unit.", UNIT_VALUE_COLUMN, y, 9.0, Bold, Right, BLACK);
    writer.text("Valor Final", FINAL_VALUE_COLUMN, y, 9.0, Bold, Right, BLACK);

    y += 2.0;
    writer.rule(y);
    y += 5.0;

    for item in &transaction.items {
        if y > PAGE_BREAK_Y {
            writer.new_page();
            y = CONTINUATION_Y;
        }

        let line = &item.line;
        writer.text(
            truncate_item_name(&line.item_name),
            LEFT_MARGIN,
            y,
            9.0,
            Regular,
            Left,
            BLACK,
        );
        writer.text(format_quantity(line.quantity()), QUANTITY_COLUMN, y, 9.0, Regular, Right, BLACK);
        writer.text(format_currency(line.unit_value()), UNIT_VALUE_COLUMN, y, 9.0, Regular, Right, BLACK);
        writer.text(format_currency(line.final_value()), FINAL_VALUE_COLUMN, y, 9.0, Regular, Right, BLACK);

        y += ROW_STEP;
    }

    y += 5.0;
    writer.rule(y);

    y += 10.0;
    writer.text("VALOR TOTAL:", QUANTITY_COLUMN, y, 14.0, Bold, Left, BLACK);
    writer.text(
        format_currency(record.total_value),
        FINAL_VALUE_COLUMN,
        y,
        14.0,
        Bold,
        Right,
        TOTAL_GREEN,
    );

    let mut pages = writer.pages;
    let page_count = pages.len();
    let generated = format_timestamp(generated_at);
    for (index, page) in pages.iter_mut().enumerate() {
        page.elements.push(Element::Text(TextElement {
            text: format!("Página {} de {} | Gerado em {}", index + 1, page_count, generated),
            x: CENTER_X,
            y: FOOTER_Y,
            size_pt: 8.0,
            weight: Regular,
            align: Center,
            color: BLACK,
        }));
    }

    DocumentLayout {
        title: format!("Movimentação #{}", record.transaction_number),
        pages,
    }
}
