//! PDF materialization of a completed diagnosis record.
//!
//! Layout is fixed: title, report name, dataset and model names, the five
//! metrics, the diagnosis timestamp, and the confusion-matrix image scaled
//! to a fixed width. A missing or unreadable image degrades the document
//! rather than failing it; a write failure is hard and propagates.

use super::{body_lines, REPORT_TITLE};
use crate::model::{DiagnosisRecordRow, MetricSet, ReportRow};
use crate::storage::Store;
use anyhow::{Context, Result};
use printpdf::{BuiltinFont, Image, ImageTransform, Mm, PdfDocument, PdfLayerReference};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use tracing::warn;

const PAGE_WIDTH_MM: f32 = 210.0;
const PAGE_HEIGHT_MM: f32 = 297.0;
const MARGIN_MM: f32 = 15.0;
const LINE_STEP_MM: f32 = 10.0;
const IMAGE_WIDTH_MM: f32 = 180.0;
const IMAGE_DPI: f32 = 300.0;

/// Render the document for `record` at `report.report_path`.
///
/// Dataset and model names are looked up by id at render time; a referent
/// deleted since the run degrades to a placeholder, matching the listing
/// view.
pub fn render_pdf(store: &Store, record: &DiagnosisRecordRow, report: &ReportRow) -> Result<()> {
    let file_name = match store.get_file(record.file_id)? {
        Some(f) => f.file_name,
        None => "Unknown File".to_string(),
    };
    let model_name = match store.get_model(record.model_id)? {
        Some(m) => m.model_name,
        None => "Unknown Model".to_string(),
    };

    let metrics: MetricSet = match serde_json::from_str(&record.diagnosis_result) {
        Ok(m) => m,
        Err(e) => {
            warn!("unreadable diagnosis result payload: {}", e);
            MetricSet::default()
        }
    };

    let (doc, page, layer) = PdfDocument::new(
        REPORT_TITLE,
        Mm(PAGE_WIDTH_MM),
        Mm(PAGE_HEIGHT_MM),
        "Layer 1",
    );
    let layer = doc.get_page(page).get_layer(layer);

    let title_font = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| anyhow::anyhow!("loading title font: {}", e))?;
    let body_font = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| anyhow::anyhow!("loading body font: {}", e))?;

    layer.use_text(REPORT_TITLE, 16.0, Mm(80.0), Mm(270.0), &title_font);

    let mut y = 250.0;
    for line in body_lines(
        &report.report_name,
        &file_name,
        &model_name,
        &metrics,
        record.created_at,
    ) {
        layer.use_text(line, 12.0, Mm(MARGIN_MM), Mm(y), &body_font);
        y -= LINE_STEP_MM;
    }

    let image_path = Path::new(&record.confusion_matrix_path);
    if image_path.exists() {
        if let Err(e) = embed_confusion_matrix(&layer, image_path, y - LINE_STEP_MM) {
            warn!(
                "could not embed confusion matrix image {}: {:#}",
                image_path.display(),
                e
            );
        }
    } else {
        warn!(
            "Confusion matrix image not found: {}",
            image_path.display()
        );
    }

    let out = File::create(&report.report_path)
        .with_context(|| format!("creating report file {}", report.report_path))?;
    doc.save(&mut BufWriter::new(out))
        .map_err(|e| anyhow::anyhow!("writing report pdf: {}", e))?;

    Ok(())
}

fn embed_confusion_matrix(
    layer: &PdfLayerReference,
    path: &Path,
    top_y_mm: f32,
) -> Result<()> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let mut reader = std::io::BufReader::new(file);
    let decoder = printpdf::image_crate::codecs::png::PngDecoder::new(&mut reader)
        .context("decoding png")?;
    let image = Image::try_from(decoder).context("reading image data")?;

    let width_mm: Mm = image.image.width.into_pt(IMAGE_DPI).into();
    let height_mm: Mm = image.image.height.into_pt(IMAGE_DPI).into();
    let scale = IMAGE_WIDTH_MM / width_mm.0;
    let bottom = (top_y_mm - height_mm.0 * scale).max(MARGIN_MM);

    image.add_to_layer(
        layer.clone(),
        ImageTransform {
            translate_x: Some(Mm(MARGIN_MM)),
            translate_y: Some(Mm(bottom)),
            scale_x: Some(scale),
            scale_y: Some(scale),
            ..Default::default()
        },
    );
    Ok(())
}
