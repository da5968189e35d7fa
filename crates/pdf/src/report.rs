use printpdf::{BuiltinFont, Mm, PdfDocument, PdfLayerReference, Pt};
use thiserror::Error;
use wattcompare_core::ApplianceRecord;

pub const REPORT_FILENAME: &str = "WattCompare_Report.pdf";

const TITLE: &str = "WattCompare Report";

// A4, in millimetres.
const PAGE_WIDTH: Mm = Mm(210.0);
const PAGE_HEIGHT: Mm = Mm(297.0);

// Positions below are PDF points from the bottom-left corner.
const TITLE_X: f32 = 200.0;
const TITLE_Y: f32 = 800.0;
const TITLE_SIZE: f32 = 18.0;
const LINE_X: f32 = 40.0;
const FIRST_LINE_Y: f32 = 770.0;
const CONTINUATION_Y: f32 = 800.0;
const LINE_HEIGHT: f32 = 20.0;
const BOTTOM_MARGIN: f32 = 100.0;
const LINE_SIZE: f32 = 12.0;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("PDF rendering failed: {0}")]
    Pdf(String),
}

/// Where one record line lands: zero-based page index and baseline height in points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinePlacement {
    pub page: usize,
    pub y: f32,
}

/// Place `count` record lines. A line that leaves less than the bottom margin
/// pushes the next one onto a fresh page; no page is opened without a line on it.
pub fn layout(count: usize) -> Vec<LinePlacement> {
    let mut placements = Vec::with_capacity(count);
    let mut page = 0;
    let mut y = FIRST_LINE_Y;
    let mut page_full = false;

    for _ in 0..count {
        if page_full {
            page += 1;
            y = CONTINUATION_Y;
            page_full = false;
        }
        placements.push(LinePlacement { page, y });
        y -= LINE_HEIGHT;
        if y < BOTTOM_MARGIN {
            page_full = true;
        }
    }

    placements
}

pub fn format_line(record: &ApplianceRecord) -> String {
    let energy = record
        .energy_kwh
        .map(|kwh| kwh.to_string())
        .unwrap_or_else(|| "n/a".to_string());
    format!(
        "Name: {} | Energy: {} kWh | Price: {} | Rate: {}",
        record.name, energy, record.price, record.energy_rate
    )
}

fn pt(value: f32) -> Mm {
    Mm::from(Pt(value))
}

/// Render every record, in the order given, into a paginated A4 document.
pub fn render_report(records: &[ApplianceRecord]) -> Result<Vec<u8>, ReportError> {
    let (doc, first_page, first_layer) =
        PdfDocument::new(TITLE, PAGE_WIDTH, PAGE_HEIGHT, "Layer 1");
    let title_font = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| ReportError::Pdf(e.to_string()))?;
    let body_font = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| ReportError::Pdf(e.to_string()))?;

    let mut layers: Vec<PdfLayerReference> = vec![doc.get_page(first_page).get_layer(first_layer)];
    layers[0].use_text(TITLE, TITLE_SIZE, pt(TITLE_X), pt(TITLE_Y), &title_font);

    for (record, placement) in records.iter().zip(layout(records.len())) {
        while layers.len() <= placement.page {
            let (page, layer) = doc.add_page(PAGE_WIDTH, PAGE_HEIGHT, "Layer 1");
            layers.push(doc.get_page(page).get_layer(layer));
        }
        layers[placement.page].use_text(
            format_line(record),
            LINE_SIZE,
            pt(LINE_X),
            pt(placement.y),
            &body_font,
        );
    }

    doc.save_to_bytes().map_err(|e| ReportError::Pdf(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use wattcompare_core::ApplianceId;

    fn record(id: i64, energy_kwh: Option<f64>) -> ApplianceRecord {
        ApplianceRecord {
            id: ApplianceId(id),
            name: format!("Appliance {id}"),
            energy_kwh,
            price: 0.25,
            energy_rate: 2.0,
            timestamp: Utc::now(),
        }
    }

    fn page_count(pdf: &[u8]) -> usize {
        lopdf::Document::load_mem(pdf).unwrap().get_pages().len()
    }

    #[test]
    fn format_line_with_energy() {
        assert_eq!(
            format_line(&record(1, Some(250.0))),
            "Name: Appliance 1 | Energy: 250 kWh | Price: 0.25 | Rate: 2"
        );
    }

    #[test]
    fn format_line_without_energy() {
        assert_eq!(
            format_line(&record(2, None)),
            "Name: Appliance 2 | Energy: n/a kWh | Price: 0.25 | Rate: 2"
        );
    }

    #[test]
    fn layout_fills_first_page_then_breaks() {
        let placements = layout(40);
        assert_eq!(placements[0], LinePlacement { page: 0, y: 770.0 });
        assert_eq!(placements[1].y, 750.0);
        // 770 - 33 * 20 = 110 is the last baseline above the margin.
        assert_eq!(placements[33], LinePlacement { page: 0, y: 110.0 });
        assert_eq!(placements[34], LinePlacement { page: 1, y: 800.0 });
        assert_eq!(placements[39].page, 1);
    }

    #[test]
    fn layout_opens_no_trailing_page() {
        let placements = layout(34);
        assert!(placements.iter().all(|p| p.page == 0));
        assert!(layout(0).is_empty());
    }

    #[test]
    fn empty_report_is_single_page() {
        let pdf = render_report(&[]).unwrap();
        assert!(pdf.starts_with(b"%PDF"));
        assert_eq!(page_count(&pdf), 1);
    }

    #[test]
    fn forty_records_span_two_pages() {
        let records: Vec<_> = (1..=40).map(|i| record(i, Some(i as f64 * 10.0))).collect();
        let pdf = render_report(&records).unwrap();
        assert!(page_count(&pdf) >= 2);
    }

    #[test]
    fn full_first_page_does_not_add_blank_page() {
        let records: Vec<_> = (1..=34).map(|i| record(i, None)).collect();
        assert_eq!(page_count(&render_report(&records).unwrap()), 1);
    }
}
