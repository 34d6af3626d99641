//! # PDF Export
//!
//! Renders a [`ReportSummary`] as a paginated document using Typst.
//!
//! - The Typst template is an embedded string constant
//! - Values are injected by placeholder replacement before compilation
//! - Fonts come from `typst-assets`, so no system fonts are needed
//! - Output is raw PDF bytes (`Vec<u8>`)

use chrono::Utc;
use typst::diag::{FileError, FileResult};
use typst::foundations::{Bytes, Datetime};
use typst::syntax::{FileId, Source};
use typst::text::{Font, FontBook};
use typst::utils::LazyHash;
use typst::{Library, LibraryExt, World};
use typst_pdf::PdfOptions;

use crate::errors::{EstimateError, EstimateResult};
use crate::reports::ReportSummary;

/// In-memory Typst world holding a single source file.
struct PdfWorld {
    main: Source,
    book: LazyHash<FontBook>,
    fonts: Vec<Font>,
    library: LazyHash<Library>,
}

impl PdfWorld {
    fn new(source: String) -> Self {
        let fonts = Self::load_fonts();
        let book = FontBook::from_fonts(&fonts);

        PdfWorld {
            main: Source::detached(source),
            book: LazyHash::new(book),
            fonts,
            library: LazyHash::new(Library::default()),
        }
    }

    fn load_fonts() -> Vec<Font> {
        let mut fonts = Vec::new();
        for font_bytes in typst_assets::fonts() {
            let buffer = Bytes::new(font_bytes.to_vec());
            for font in Font::iter(buffer) {
                fonts.push(font);
            }
        }
        fonts
    }
}

impl World for PdfWorld {
    fn library(&self) -> &LazyHash<Library> {
        &self.library
    }

    fn book(&self) -> &LazyHash<FontBook> {
        &self.book
    }

    fn main(&self) -> FileId {
        self.main.id()
    }

    fn source(&self, id: FileId) -> FileResult<Source> {
        if id == self.main.id() {
            Ok(self.main.clone())
        } else {
            Err(FileError::NotFound(id.vpath().as_rootless_path().into()))
        }
    }

    fn file(&self, id: FileId) -> FileResult<Bytes> {
        Err(FileError::NotFound(id.vpath().as_rootless_path().into()))
    }

    fn font(&self, index: usize) -> Option<Font> {
        self.fonts.get(index).cloned()
    }

    fn today(&self, _offset: Option<i64>) -> Option<Datetime> {
        let now = Utc::now();
        Datetime::from_ymd(
            now.format("%Y").to_string().parse().ok()?,
            now.format("%m").to_string().parse().ok()?,
            now.format("%d").to_string().parse().ok()?,
        )
    }
}

const REPORT_TEMPLATE: &str = r##"
#set page(
  paper: "a4",
  margin: (top: 2cm, bottom: 2cm, left: 2cm, right: 2cm),
  footer: context [
    #line(length: 100%, stroke: 0.5pt + gray)
    #v(4pt)
    #grid(
      columns: (1fr, 1fr),
      align(left)[#text(size: 9pt)[{{TITLE}}]],
      align(right)[#text(size: 9pt)[Page #counter(page).display() · {{DATE}}]],
    )
  ]
)

#set text(size: 11pt)

#align(center)[
  #block(width: 100%, fill: rgb("#f0f0f0"), inset: 12pt, radius: 4pt)[
    #text(size: 18pt, weight: "bold")[{{TITLE}}]
    #v(4pt)
    #text(size: 12pt)[{{LOCATION}} · {{YEAR}} · {{METHOD}} method]
  ]
]

#v(12pt)

== Project Summary

#table(
  columns: (1fr, auto),
  inset: 6pt,
  stroke: 0.5pt,
  align: (left, right),
  table.header([*Parameter*], [*Value*]),
{{PARAMETER_ROWS}}
)

#v(12pt)

== Cost Breakdown

#grid(
  columns: (auto, 1fr, auto),
  column-gutter: 8pt,
  row-gutter: 6pt,
  align: (left + horizon, left + horizon, right + horizon),
{{CHART_ROWS}}
)

#v(4pt)
#text(size: 9pt, fill: gray)[Amounts in {{CURRENCY}}.]
{{LINE_ITEMS}}
"##;

const LINE_ITEMS_TEMPLATE: &str = r##"
#pagebreak()

== Line Items

#table(
  columns: (1fr, auto, auto, auto, auto),
  inset: 6pt,
  stroke: 0.5pt,
  align: (left, right, left, right, right),
  table.header([*Item*], [*Quantity*], [*Unit*], [*Unit Price*], [*Cost*]),
{{ITEM_ROWS}}
)
"##;

/// Render the report as PDF bytes.
pub fn render_report_pdf(summary: &ReportSummary) -> EstimateResult<Vec<u8>> {
    let source = build_source(summary);
    let world = PdfWorld::new(source);
    let warned = typst::compile(&world);

    let document = warned.output.map_err(|errors| {
        let error_msgs: Vec<String> = errors.iter().map(|e| e.message.to_string()).collect();
        EstimateError::Pdf {
            reason: format!("Typst compilation failed: {}", error_msgs.join("; ")),
        }
    })?;

    typst_pdf::pdf(&document, &PdfOptions::default()).map_err(|errors| {
        let error_msgs: Vec<String> = errors.iter().map(|e| e.message.to_string()).collect();
        EstimateError::Pdf {
            reason: error_msgs.join("; "),
        }
    })
}

fn build_source(summary: &ReportSummary) -> String {
    let line_items = if summary.line_items.is_empty() {
        String::new()
    } else {
        LINE_ITEMS_TEMPLATE.replace("{{ITEM_ROWS}}", &build_item_rows(summary))
    };

    REPORT_TEMPLATE
        .replace("{{TITLE}}", &escape_typst(&summary.title))
        .replace("{{DATE}}", &summary.generated_at.format("%Y-%m-%d").to_string())
        .replace("{{LOCATION}}", &escape_typst(&summary.location))
        .replace("{{YEAR}}", &summary.year.to_string())
        .replace("{{METHOD}}", &escape_typst(summary.strategy.label()))
        .replace("{{CURRENCY}}", summary.currency.code())
        .replace("{{PARAMETER_ROWS}}", &build_parameter_rows(summary))
        .replace("{{CHART_ROWS}}", &build_chart_rows(summary))
        .replace("{{LINE_ITEMS}}", &line_items)
}

fn build_parameter_rows(summary: &ReportSummary) -> String {
    summary
        .parameter_rows()
        .iter()
        .map(|row| {
            format!(
                "  [{}], [{}],",
                escape_typst(&row.parameter),
                escape_typst(&row.value)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// One row per category: label, a filled box sized to the share of the
/// largest category, and the value annotation.
fn build_chart_rows(summary: &ReportSummary) -> String {
    let chart = summary.chart_data();
    let max = chart.values.iter().copied().fold(0.0_f64, f64::max);
    chart
        .labels
        .iter()
        .zip(&chart.values)
        .zip(chart.annotations.iter().zip(&chart.colors))
        .map(|((label, value), (note, color))| {
            let pct = if max > 0.0 { value / max * 100.0 } else { 0.0 };
            format!(
                "  [{}], box(width: {:.1}%, height: 10pt, fill: rgb(\"{}\")), [{}],",
                escape_typst(label),
                pct,
                color,
                escape_typst(note)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn build_item_rows(summary: &ReportSummary) -> String {
    summary
        .line_items
        .iter()
        .map(|item| {
            format!(
                "  [{}], [{}], [{}], [{}], [{}],",
                escape_typst(&item.item),
                escape_typst(&item.quantity),
                escape_typst(&item.unit),
                escape_typst(&item.unit_price),
                escape_typst(&item.cost)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Escape Typst markup characters in user-provided text.
fn escape_typst(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            '*' => "\\*".to_string(),
            '_' => "\\_".to_string(),
            '#' => "\\#".to_string(),
            '$' => "\\$".to_string(),
            '@' => "\\@".to_string(),
            '<' => "\\<".to_string(),
            '>' => "\\>".to_string(),
            '[' => "\\[".to_string(),
            ']' => "\\]".to_string(),
            '\\' => "\\\\".to_string(),
            '`' => "\\`".to_string(),
            _ => c.to_string(),
        })
        .collect()
}
