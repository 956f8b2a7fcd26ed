//! PDF rendering of a transaction subset.
//!
//! Produces an A4 document with a title, a generation date, summary totals
//! over the exported subset, and a paginated table of transactions.

use std::io::BufWriter;

use printpdf::*;
use time::Date;

use crate::{
    Error,
    category::Category,
    export::{category_name_index, resolve_category_name},
    transaction::{Transaction, TransactionKind},
};

// A4 dimensions (mm)
const PAGE_W: f32 = 210.0;
const PAGE_H: f32 = 297.0;
const MARGIN_TOP: f32 = 20.0;
const MARGIN_BOTTOM: f32 = 20.0;
const MARGIN_LEFT: f32 = 14.0;
const MARGIN_RIGHT: f32 = 14.0;
const ROW_H: f32 = 5.0;
const FONT_SIZE: f32 = 10.0;
const TITLE_SIZE: f32 = 18.0;
const SUBTITLE_SIZE: f32 = 11.0;

fn approx_text_width(text: &str, size: f32) -> f32 {
    text.len() as f32 * size * 0.18
}

#[derive(Clone, Copy)]
enum Align {
    Left,
    Right,
}

struct Col {
    width: f32,
    align: Align,
}

struct PdfWriter {
    doc: PdfDocumentReference,
    font: IndirectFontRef,
    font_bold: IndirectFontRef,
    current_page: PdfPageIndex,
    current_layer: PdfLayerIndex,
    y: f32,
}

impl PdfWriter {
    fn new(title: &str) -> Result<Self, Error> {
        let (doc, page, layer) = PdfDocument::new(title, Mm(PAGE_W), Mm(PAGE_H), "Layer 1");
        let font = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| Error::PdfError(format!("{e:?}")))?;
        let font_bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| Error::PdfError(format!("{e:?}")))?;
        Ok(Self {
            doc,
            font,
            font_bold,
            current_page: page,
            current_layer: layer,
            y: MARGIN_TOP,
        })
    }

    fn pdf_y(&self) -> f32 {
        PAGE_H - self.y
    }

    fn new_page(&mut self) {
        let (page, layer) = self.doc.add_page(Mm(PAGE_W), Mm(PAGE_H), "Layer");
        self.current_page = page;
        self.current_layer = layer;
        self.y = MARGIN_TOP;
    }

    fn ensure_space(&mut self, needed: f32) {
        if self.y + needed > PAGE_H - MARGIN_BOTTOM {
            self.new_page();
        }
    }

    fn text(&self, s: &str, x: f32, size: f32, bold: bool) {
        let font = if bold {
            self.font_bold.clone()
        } else {
            self.font.clone()
        };
        let layer = self
            .doc
            .get_page(self.current_page)
            .get_layer(self.current_layer);
        layer.use_text(s, size, Mm(x), Mm(self.pdf_y()), &font);
    }

    fn hline(&self, x1: f32, x2: f32) {
        let layer = self
            .doc
            .get_page(self.current_page)
            .get_layer(self.current_layer);
        layer.set_outline_thickness(0.5);
        let line = Line {
            points: vec![
                (Point::new(Mm(x1), Mm(self.pdf_y())), false),
                (Point::new(Mm(x2), Mm(self.pdf_y())), false),
            ],
            is_closed: false,
        };
        layer.add_line(line);
    }

    fn header(&mut self, title: &str, generated_on: Date) {
        self.text(title, MARGIN_LEFT, TITLE_SIZE, true);
        self.y += 8.0;
        let generated = format!("Generated on: {generated_on}");
        self.text(&generated, MARGIN_LEFT, SUBTITLE_SIZE, false);
        self.y += 6.0;
        self.hline(MARGIN_LEFT, PAGE_W - MARGIN_RIGHT);
        self.y += 5.0;
    }

    fn summary_line(&mut self, label: &str, amount: f64) {
        self.ensure_space(ROW_H);
        let text = format!("{label}: ${amount:.2}");
        self.text(&text, MARGIN_LEFT, SUBTITLE_SIZE, false);
        self.y += ROW_H + 1.0;
    }

    fn table_header(&mut self, cols: &[Col], headers: &[&str]) {
        self.ensure_space(ROW_H * 2.0);
        let mut x = MARGIN_LEFT;
        for (i, col) in cols.iter().enumerate() {
            if i < headers.len() {
                match col.align {
                    Align::Left => self.text(headers[i], x, FONT_SIZE, true),
                    Align::Right => {
                        let tw = approx_text_width(headers[i], FONT_SIZE);
                        self.text(headers[i], x + col.width - tw, FONT_SIZE, true);
                    }
                }
            }
            x += col.width;
        }
        self.y += ROW_H;
        self.hline(MARGIN_LEFT, PAGE_W - MARGIN_RIGHT);
        self.y += 2.0;
    }

    fn table_row(&mut self, cols: &[Col], values: &[&str]) {
        self.ensure_space(ROW_H);
        let mut x = MARGIN_LEFT;
        for (i, col) in cols.iter().enumerate() {
            if i < values.len() {
                match col.align {
                    Align::Left => self.text(values[i], x, FONT_SIZE, false),
                    Align::Right => {
                        let tw = approx_text_width(values[i], FONT_SIZE);
                        self.text(values[i], x + col.width - tw, FONT_SIZE, false);
                    }
                }
            }
            x += col.width;
        }
        self.y += ROW_H;
    }

    fn blank_row(&mut self) {
        self.y += ROW_H;
    }

    fn to_bytes(self) -> Result<Vec<u8>, Error> {
        let mut buf = BufWriter::new(Vec::new());
        self.doc
            .save(&mut buf)
            .map_err(|e| Error::PdfError(format!("{e:?}")))?;
        buf.into_inner().map_err(|e| Error::PdfError(e.to_string()))
    }
}

/// Render `transactions` as an "Expense Report" PDF.
///
/// The summary totals cover exactly the exported subset, not the user's
/// full history. `generated_on` is the date printed under the title; the
/// output is fully determined by the inputs.
///
/// # Errors
/// Returns an [Error::PdfError] if the document cannot be assembled.
pub fn transactions_to_pdf(
    transactions: &[&Transaction],
    categories: &[Category],
    generated_on: Date,
) -> Result<Vec<u8>, Error> {
    let category_names = category_name_index(categories);

    let total_income: f64 = transactions
        .iter()
        .filter(|transaction| transaction.kind == TransactionKind::Income)
        .map(|transaction| transaction.amount)
        .sum();
    let total_expense: f64 = transactions
        .iter()
        .filter(|transaction| transaction.kind == TransactionKind::Expense)
        .map(|transaction| transaction.amount)
        .sum();
    let balance = total_income - total_expense;

    let mut pdf = PdfWriter::new("Expense Report")?;
    pdf.header("Expense Report", generated_on);

    pdf.summary_line("Total Income", total_income);
    pdf.summary_line("Total Expense", total_expense);
    pdf.summary_line("Balance", balance);
    pdf.blank_row();

    let cols = &[
        Col { width: 26.0, align: Align::Left },
        Col { width: 64.0, align: Align::Left },
        Col { width: 40.0, align: Align::Left },
        Col { width: 22.0, align: Align::Left },
        Col { width: 30.0, align: Align::Right },
    ];
    pdf.table_header(cols, &["Date", "Title", "Category", "Type", "Amount"]);

    for transaction in transactions {
        let date = transaction.date.to_string();
        let category = resolve_category_name(transaction.category_id, &category_names);
        let amount = format!("${:.2}", transaction.amount);
        pdf.table_row(
            cols,
            &[
                &date,
                &transaction.title,
                category,
                transaction.kind.as_str(),
                &amount,
            ],
        );
    }

    pdf.to_bytes()
}
