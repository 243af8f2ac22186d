use std::io::Cursor;

use anyhow::Context as _;
use resvg::tiny_skia::{IntSize, Pixmap, PixmapPaint, Transform};

use crate::card::layout::{
    CARD_H, CARD_W, EnduranceLayout, FOOTER_BASELINE, MARGIN, StrengthLayout, SUBTITLE_BASELINE,
    TITLE_BASELINE,
};
use crate::card::metrics::{
    endurance_metrics, exercise_volumes, render_metric_tiles, render_volume_bars, strength_metrics,
    TileStyle, VolumeBarStyle,
};
use crate::card::zones::{
    effective_max_hr, render_zone_bars, ZoneBarStyle, ZoneBreakdown,
};
use crate::chart::render::{render_chart, ChartStyle};
use crate::chart::series::{
    cadence_series, elevation_series, heart_rate_series, pace_series, ChartSeries, power_series,
    ValueFormat,
};
use crate::foundation::color::Rgba8;
use crate::foundation::error::{FitcardError, FitcardResult};
use crate::foundation::svg::{self, SvgFragment, TextAnchor};
use crate::geo::mercator::{select_viewport, MapViewport, ViewportConfig};
use crate::geo::tiles::{enumerate_tiles, fetch_tiles, TileSource, MAX_TILES_PER_RENDER};
use crate::route::render::{render_route, RouteStyle};
use crate::source::{ActivityKind, RawRecord, ENDPOINT_DETAILS, ENDPOINT_WORKOUT};
use crate::strength::heatmap::{render_heatmap, HeatmapStyle};
use crate::strength::muscles::aggregate_volumes;
use crate::strength::timeline::{synthesize_timeline, TimelineConfig};
use crate::telemetry::extract::{extract_endurance, extract_strength};
use crate::telemetry::model::{EnduranceTelemetry, StrengthWorkout};

/// Card color scheme. Dark by default, matching a story-format share card.
#[derive(Clone, Debug)]
pub struct CardTheme {
    pub background: Rgba8,
    pub map_backing: Rgba8,
    pub map_border: Rgba8,
    pub title: Rgba8,
    pub subtitle: Rgba8,
    pub section_label: Rgba8,
    pub footer: Rgba8,
    pub pace_color: Rgba8,
    pub hr_color: Rgba8,
    pub elevation_color: Rgba8,
    pub cadence_color: Rgba8,
    pub power_color: Rgba8,
}

impl Default for CardTheme {
    fn default() -> Self {
        Self {
            background: Rgba8::rgb(15, 23, 42),
            map_backing: Rgba8::rgb(30, 41, 59),
            map_border: Rgba8::rgba(148, 163, 184, 70),
            title: Rgba8::rgb(248, 250, 252),
            subtitle: Rgba8::rgb(148, 163, 184),
            section_label: Rgba8::rgba(255, 255, 255, 140),
            footer: Rgba8::rgba(148, 163, 184, 150),
            pace_color: Rgba8::rgb(34, 211, 238),
            hr_color: Rgba8::rgb(239, 68, 68),
            elevation_color: Rgba8::rgb(52, 211, 153),
            cadence_color: Rgba8::rgb(245, 158, 11),
            power_color: Rgba8::rgb(167, 139, 250),
        }
    }
}

/// Per-render options: header text plus the theme.
#[derive(Clone, Debug, Default)]
pub struct CardOptions {
    /// Header title. Strength cards fall back to the workout title,
    /// endurance cards to "Activity".
    pub title: Option<String>,
    /// Second header line, typically the activity date.
    pub subtitle: Option<String>,
}

/// Render one activity record to a finished 1080x1920 PNG.
///
/// Without a tile source the map panel keeps its flat backing and the route
/// still draws; every other section is unaffected. Tile fetch failures
/// degrade the same way per tile.
#[tracing::instrument(skip_all, fields(kind = ?record.kind()))]
pub fn render_card(
    record: &RawRecord,
    tile_source: Option<&dyn TileSource>,
    options: &CardOptions,
) -> FitcardResult<Vec<u8>> {
    let theme = CardTheme::default();
    match record.kind() {
        ActivityKind::Endurance => {
            let details = record
                .payload(ENDPOINT_DETAILS)
                .ok_or_else(|| FitcardError::telemetry("record has no details payload"))?;
            let telemetry = extract_endurance(details);
            compose_endurance(&telemetry, tile_source, options, &theme)
        }
        ActivityKind::Strength => {
            let payload = record
                .payload(ENDPOINT_WORKOUT)
                .ok_or_else(|| FitcardError::telemetry("record has no workout payload"))?;
            let mut workout = extract_strength(payload);
            workout.enrichment = record.enrichment.clone();
            compose_strength(&workout, options, &theme)
        }
    }
}

fn compose_endurance(
    telemetry: &EnduranceTelemetry,
    tile_source: Option<&dyn TileSource>,
    options: &CardOptions,
    theme: &CardTheme,
) -> FitcardResult<Vec<u8>> {
    let layout = EnduranceLayout::default();
    let mut pixmap = new_pixmap(CARD_W, CARD_H)?;

    // Base pass: background and the map panel backing the tiles sit on.
    let mut base = SvgFragment::new();
    base.rect(0.0, 0.0, CARD_W as f64, CARD_H as f64, 0.0, theme.background);
    base.rect(layout.map.x, layout.map.y, layout.map.w, layout.map.h, 0.0, theme.map_backing);
    rasterize_onto(&mut pixmap, &svg::document(CARD_W, CARD_H, &base))?;

    let viewport = select_viewport(&telemetry.gps, layout.map.w, layout.map.h, &ViewportConfig::default());
    if let Some(vp) = &viewport {
        let map_stage = render_map_stage(telemetry, vp, tile_source, theme)?;
        pixmap.draw_pixmap(
            layout.map.x as i32,
            layout.map.y as i32,
            map_stage.as_ref(),
            &PixmapPaint::default(),
            Transform::identity(),
            None,
        );
    }

    // Overlay pass: everything that sits above the basemap.
    let mut overlay = SvgFragment::new();
    render_header(&mut overlay, options.title.as_deref().unwrap_or("Activity"), options, theme);
    overlay.push_raw(&format!(
        r#"<rect x="{:.2}" y="{:.2}" width="{:.2}" height="{:.2}" fill="none" stroke="{}" stroke-opacity="{:.4}" stroke-width="2"/>"#,
        layout.map.x,
        layout.map.y,
        layout.map.w,
        layout.map.h,
        theme.map_border.hex(),
        theme.map_border.opacity(),
    ));
    if viewport.is_none() {
        overlay.text(
            layout.map.x + layout.map.w / 2.0,
            layout.map.y + layout.map.h / 2.0,
            22.0,
            400,
            TextAnchor::Middle,
            theme.section_label,
            "no GPS data",
        );
    }

    let tiles = endurance_metrics(telemetry);
    overlay.push_fragment(&render_metric_tiles(
        &tiles,
        layout.tiles.x,
        layout.tiles.y,
        layout.tiles.w,
        3,
        &TileStyle::default(),
    ));

    let chart_style = ChartStyle::default();
    let samples = &telemetry.samples;
    // Cadence is rarer than the first three; power rarer still. The fourth
    // panel takes whichever of the two has any data, cadence first.
    let fourth = if samples.iter().any(|s| s.cadence.is_some()) {
        cadence_series(samples, theme.cadence_color)
    } else {
        power_series(samples, theme.power_color)
    };
    let series = [
        pace_series(samples, theme.pace_color),
        heart_rate_series(samples, theme.hr_color),
        elevation_series(samples, theme.elevation_color),
        fourth,
    ];
    for (rect, s) in layout.charts.iter().zip(series.iter()) {
        overlay.push_fragment(&render_chart(s, rect.x, rect.y, rect.w, rect.h, &chart_style));
    }

    let observed_peak = samples.iter().filter_map(|s| s.heart_rate).fold(f64::NAN, f64::max);
    let max_hr = effective_max_hr(None, (!observed_peak.is_nan()).then_some(observed_peak));
    let zones = ZoneBreakdown::from_samples(samples, max_hr);
    render_zone_section(&mut overlay, &zones, layout.zones_label_baseline, &layout.zones, theme);

    render_footer(&mut overlay, theme);
    rasterize_onto(&mut pixmap, &svg::document(CARD_W, CARD_H, &overlay))?;
    encode_png(&pixmap)
}

fn compose_strength(
    workout: &StrengthWorkout,
    options: &CardOptions,
    theme: &CardTheme,
) -> FitcardResult<Vec<u8>> {
    let layout = StrengthLayout::default();
    let mut pixmap = new_pixmap(CARD_W, CARD_H)?;

    let mut base = SvgFragment::new();
    base.rect(0.0, 0.0, CARD_W as f64, CARD_H as f64, 0.0, theme.background);
    rasterize_onto(&mut pixmap, &svg::document(CARD_W, CARD_H, &base))?;

    let mut overlay = SvgFragment::new();
    let title = options.title.as_deref().unwrap_or(&workout.title);
    render_header(&mut overlay, title, options, theme);

    overlay.push_fragment(&render_metric_tiles(
        &strength_metrics(workout),
        layout.tiles.x,
        layout.tiles.y,
        layout.tiles.w,
        3,
        &TileStyle::default(),
    ));

    let volumes = aggregate_volumes(&workout.sets);
    overlay.push_fragment(&render_heatmap(
        &volumes,
        layout.heatmap.x,
        layout.heatmap.y,
        layout.heatmap.w,
        layout.heatmap.h,
        &HeatmapStyle::default(),
    ));

    let per_exercise = exercise_volumes(&workout.sets);
    if !per_exercise.is_empty() {
        section_label(&mut overlay, layout.volume_label_baseline, "VOLUME BY EXERCISE", theme);
        overlay.push_fragment(&render_volume_bars(
            &per_exercise,
            layout.volumes.x,
            layout.volumes.y,
            layout.volumes.w,
            &VolumeBarStyle::default(),
        ));
    }

    if let Some(enrichment) = &workout.enrichment {
        let observed = enrichment.hr_samples.iter().copied().fold(f64::NAN, f64::max);
        let max_hr = effective_max_hr(enrichment.max_hr, (!observed.is_nan()).then_some(observed));
        let zones =
            ZoneBreakdown::from_even_samples(&enrichment.hr_samples, enrichment.duration_sec, max_hr);
        render_zone_section(&mut overlay, &zones, layout.zones_label_baseline, &layout.zones, theme);

        // Per-set heart rate off the reconstructed timeline.
        let synth = synthesize_timeline(
            &workout.sets,
            enrichment.duration_sec,
            Some(enrichment),
            &TimelineConfig::default(),
        );
        let hr_series = ChartSeries {
            label: "Heart rate by set".to_string(),
            values: synth.iter().map(|s| s.avg_hr).collect(),
            color: theme.hr_color,
            format: ValueFormat::Integer,
            invert: false,
        };
        overlay.push_fragment(&render_chart(
            &hr_series,
            layout.hr_chart.x,
            layout.hr_chart.y,
            layout.hr_chart.w,
            layout.hr_chart.h,
            &ChartStyle::default(),
        ));
    }

    render_footer(&mut overlay, theme);
    rasterize_onto(&mut pixmap, &svg::document(CARD_W, CARD_H, &overlay))?;
    encode_png(&pixmap)
}

/// Basemap tiles plus the route overlay, composited at map-panel size so
/// tiles hanging past the panel edge are clipped by the stage bounds.
fn render_map_stage(
    telemetry: &EnduranceTelemetry,
    viewport: &MapViewport,
    tile_source: Option<&dyn TileSource>,
    theme: &CardTheme,
) -> FitcardResult<Pixmap> {
    let mut stage = new_pixmap(viewport.width as u32, viewport.height as u32)?;
    stage.fill(resvg::tiny_skia::Color::from_rgba8(
        theme.map_backing.r,
        theme.map_backing.g,
        theme.map_backing.b,
        255,
    ));

    if let Some(source) = tile_source {
        let placements = enumerate_tiles(viewport, MAX_TILES_PER_RENDER);
        for tile in fetch_tiles(&placements, source) {
            let size = IntSize::from_wh(tile.width, tile.height)
                .ok_or_else(|| FitcardError::render("zero-sized tile"))?;
            let tile_pixmap = Pixmap::from_vec(tile.rgba8_premul, size)
                .ok_or_else(|| FitcardError::render("tile buffer size mismatch"))?;
            stage.draw_pixmap(
                tile.placement.offset_x,
                tile.placement.offset_y,
                tile_pixmap.as_ref(),
                &PixmapPaint::default(),
                Transform::identity(),
                None,
            );
        }
    }

    let route = render_route(&telemetry.gps, viewport, &RouteStyle::default());
    if !route.is_empty() {
        rasterize_onto(
            &mut stage,
            &svg::document(viewport.width as u32, viewport.height as u32, &route),
        )?;
    }
    Ok(stage)
}

fn render_header(frag: &mut SvgFragment, title: &str, options: &CardOptions, theme: &CardTheme) {
    frag.text(MARGIN, TITLE_BASELINE, 52.0, 800, TextAnchor::Start, theme.title, title);
    if let Some(subtitle) = &options.subtitle {
        frag.text(MARGIN, SUBTITLE_BASELINE, 24.0, 500, TextAnchor::Start, theme.subtitle, subtitle);
    }
}

fn render_zone_section(
    frag: &mut SvgFragment,
    zones: &ZoneBreakdown,
    label_baseline: f64,
    rect: &crate::card::layout::Rect,
    theme: &CardTheme,
) {
    if zones.is_empty() {
        return;
    }
    section_label(frag, label_baseline, "HEART RATE ZONES", theme);
    frag.push_fragment(&render_zone_bars(zones, rect.x, rect.y, rect.w, &ZoneBarStyle::default()));
}

fn section_label(frag: &mut SvgFragment, baseline: f64, text: &str, theme: &CardTheme) {
    frag.text(MARGIN, baseline, 15.0, 600, TextAnchor::Start, theme.section_label, text);
}

fn render_footer(frag: &mut SvgFragment, theme: &CardTheme) {
    frag.text(
        CARD_W as f64 / 2.0,
        FOOTER_BASELINE,
        16.0,
        500,
        TextAnchor::Middle,
        theme.footer,
        "fitcard",
    );
}

fn new_pixmap(width: u32, height: u32) -> FitcardResult<Pixmap> {
    Pixmap::new(width, height)
        .ok_or_else(|| FitcardError::render(format!("cannot allocate {width}x{height} pixmap")))
}

/// Parse and rasterize an SVG document over the pixmap's current content.
fn rasterize_onto(pixmap: &mut Pixmap, document: &str) -> FitcardResult<()> {
    let mut db = usvg::fontdb::Database::new();
    db.load_system_fonts();
    let opts = usvg::Options {
        fontdb: std::sync::Arc::new(db),
        ..Default::default()
    };
    let tree = usvg::Tree::from_str(document, &opts)
        .map_err(|e| FitcardError::render(format!("parse svg: {e}")))?;
    resvg::render(&tree, Transform::identity(), &mut pixmap.as_mut());
    Ok(())
}

/// Unpremultiply and encode as PNG.
fn encode_png(pixmap: &Pixmap) -> FitcardResult<Vec<u8>> {
    let mut rgba = Vec::with_capacity(pixmap.data().len());
    for px in pixmap.pixels() {
        let c = px.demultiply();
        rgba.extend_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
    }
    let img = image::RgbaImage::from_raw(pixmap.width(), pixmap.height(), rgba)
        .ok_or_else(|| FitcardError::render("pixmap buffer size mismatch"))?;
    let mut bytes = Vec::new();
    img.write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
        .context("encode png")?;
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn endurance_record() -> RawRecord {
        let mut record = RawRecord::default();
        let rows: Vec<serde_json::Value> = (0..60)
            .map(|i| {
                json!({"metrics": [
                    1000.0 + i as f64 * 2000.0,
                    59.91 + i as f64 * 1e-4,
                    10.75 + i as f64 * 1e-4,
                    3.0,
                    120.0 + i as f64,
                ]})
            })
            .collect();
        record.payloads.insert(
            ENDPOINT_DETAILS.to_string(),
            json!({
                "metricDescriptors": [
                    {"metricsIndex": 0, "key": "directTimestamp"},
                    {"metricsIndex": 1, "key": "directLatitude"},
                    {"metricsIndex": 2, "key": "directLongitude"},
                    {"metricsIndex": 3, "key": "directSpeed"},
                    {"metricsIndex": 4, "key": "directHeartRate"},
                ],
                "activityDetailMetrics": rows,
            }),
        );
        record
    }

    fn strength_record() -> RawRecord {
        let mut record = RawRecord::default();
        record.payloads.insert(
            ENDPOINT_WORKOUT.to_string(),
            json!({
                "title": "Push Day",
                "exercises": [
                    {"title": "Bench Press (Barbell)", "sets": [
                        {"type": "warmup", "weight_kg": 60.0, "reps": 10},
                        {"type": "normal", "weight_kg": 100.0, "reps": 5},
                        {"type": "normal", "weight_kg": 100.0, "reps": 5},
                    ]},
                    {"title": "Overhead Press (Barbell)", "sets": [
                        {"type": "normal", "weight_kg": 50.0, "reps": 8},
                    ]},
                ]
            }),
        );
        record.enrichment = Some(crate::telemetry::model::Enrichment {
            avg_hr: Some(128.0),
            max_hr: Some(171.0),
            calories: Some(260.0),
            duration_sec: 1800.0,
            hr_samples: vec![110.0, 130.0, 150.0, 140.0, 120.0],
        });
        record
    }

    fn assert_png(bytes: &[u8]) {
        assert_eq!(&bytes[..8], &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a]);
    }

    #[test]
    fn endurance_card_renders_without_tiles() {
        let png = render_card(&endurance_record(), None, &CardOptions::default()).unwrap();
        assert_png(&png);
    }

    #[test]
    fn strength_card_renders_full_stack() {
        let options = CardOptions {
            title: None,
            subtitle: Some("Aug 28".to_string()),
        };
        let png = render_card(&strength_record(), None, &options).unwrap();
        assert_png(&png);
    }

    #[test]
    fn endurance_without_details_is_an_error() {
        let record = RawRecord::default();
        let err = render_card(&record, None, &CardOptions::default()).unwrap_err();
        assert!(matches!(err, FitcardError::Telemetry(_)));
    }

    #[test]
    fn gpsless_endurance_record_still_renders() {
        let mut record = RawRecord::default();
        record.payloads.insert(
            ENDPOINT_DETAILS.to_string(),
            json!({"metricDescriptors": [], "activityDetailMetrics": []}),
        );
        let png = render_card(&record, None, &CardOptions::default()).unwrap();
        assert_png(&png);
    }
}
