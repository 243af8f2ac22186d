/// Fixed card geometry. The card is a 9:16 story-format image; every
/// section is laid out in absolute card pixels.
pub const CARD_W: u32 = 1080;
pub const CARD_H: u32 = 1920;

pub const MARGIN: f64 = 60.0;
pub const CONTENT_W: f64 = CARD_W as f64 - 2.0 * MARGIN;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.h
    }
}

pub const TITLE_BASELINE: f64 = 118.0;
pub const SUBTITLE_BASELINE: f64 = 162.0;
pub const FOOTER_BASELINE: f64 = CARD_H as f64 - 36.0;

/// Gap between chart panels in the 2x2 grid.
const CHART_GAP: f64 = 28.0;

/// Section placement for an endurance (GPS) card: map on top, headline
/// tiles, a 2x2 chart grid, then the heart-rate zone block.
#[derive(Clone, Copy, Debug)]
pub struct EnduranceLayout {
    pub map: Rect,
    pub tiles: Rect,
    pub charts: [Rect; 4],
    pub zones_label_baseline: f64,
    pub zones: Rect,
}

impl Default for EnduranceLayout {
    fn default() -> Self {
        let map = Rect::new(MARGIN, 200.0, CONTENT_W, 620.0);
        let tiles = Rect::new(MARGIN, 860.0, CONTENT_W, 200.0);
        let chart_w = (CONTENT_W - CHART_GAP) / 2.0;
        let chart_h = 280.0;
        let row0 = 1090.0;
        let row1 = row0 + chart_h + CHART_GAP;
        let charts = [
            Rect::new(MARGIN, row0, chart_w, chart_h),
            Rect::new(MARGIN + chart_w + CHART_GAP, row0, chart_w, chart_h),
            Rect::new(MARGIN, row1, chart_w, chart_h),
            Rect::new(MARGIN + chart_w + CHART_GAP, row1, chart_w, chart_h),
        ];
        Self {
            map,
            tiles,
            charts,
            zones_label_baseline: 1736.0,
            zones: Rect::new(MARGIN, 1756.0, CONTENT_W, 118.0),
        }
    }
}

/// Section placement for a strength card: headline tiles, the two-figure
/// muscle heatmap, per-exercise volume bars, zone block, then the per-set
/// heart-rate panel.
#[derive(Clone, Copy, Debug)]
pub struct StrengthLayout {
    pub tiles: Rect,
    pub heatmap: Rect,
    pub volume_label_baseline: f64,
    pub volumes: Rect,
    pub zones_label_baseline: f64,
    pub zones: Rect,
    pub hr_chart: Rect,
}

impl Default for StrengthLayout {
    fn default() -> Self {
        Self {
            tiles: Rect::new(MARGIN, 210.0, CONTENT_W, 200.0),
            heatmap: Rect::new(MARGIN, 430.0, CONTENT_W, 500.0),
            volume_label_baseline: 986.0,
            volumes: Rect::new(MARGIN, 1006.0, CONTENT_W, 348.0),
            zones_label_baseline: 1400.0,
            zones: Rect::new(MARGIN, 1420.0, CONTENT_W, 118.0),
            hr_chart: Rect::new(MARGIN, 1580.0, CONTENT_W, 280.0),
        }
    }
}
