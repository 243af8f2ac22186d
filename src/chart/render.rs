use kurbo::BezPath;

use crate::chart::series::{CHART_POINT_CAP, ChartSeries, downsample};
use crate::foundation::color::Rgba8;
use crate::foundation::svg::{SvgFragment, TextAnchor};

/// Visual constants shared by every chart panel on a card.
#[derive(Clone, Copy, Debug)]
pub struct ChartStyle {
    pub panel_fill: Rgba8,
    pub panel_radius: f64,
    pub label_color: Rgba8,
    pub caption_color: Rgba8,
    pub area_alpha: u8,
    pub stroke_width: f64,
    pub point_cap: usize,
}

impl Default for ChartStyle {
    fn default() -> Self {
        Self {
            panel_fill: Rgba8::rgba(255, 255, 255, 10),
            panel_radius: 16.0,
            label_color: Rgba8::rgba(255, 255, 255, 140),
            caption_color: Rgba8::rgba(255, 255, 255, 200),
            area_alpha: 56,
            stroke_width: 3.0,
            point_cap: CHART_POINT_CAP,
        }
    }
}

const PAD: f64 = 18.0;
const TITLE_H: f64 = 26.0;

/// Render one sparkline panel at `(x, y, w, h)` in card space.
///
/// A series with fewer than two valid values after downsampling renders as
/// an empty placeholder panel instead of a chart.
pub fn render_chart(
    series: &ChartSeries,
    x: f64,
    y: f64,
    w: f64,
    h: f64,
    style: &ChartStyle,
) -> SvgFragment {
    let mut frag = SvgFragment::new();
    frag.rect(x, y, w, h, style.panel_radius, style.panel_fill);
    frag.text(
        x + PAD,
        y + PAD + 6.0,
        15.0,
        600,
        TextAnchor::Start,
        style.label_color,
        &series.label.to_uppercase(),
    );

    let values = downsample(&series.values, style.point_cap);
    let Some((min, max)) = ChartSeries::scale_bounds(&values) else {
        return render_placeholder(frag, x, y, w, h, style);
    };

    let plot_x = x + PAD;
    let plot_w = w - 2.0 * PAD;
    let plot_y = y + PAD + TITLE_H;
    let plot_h = h - 2.0 * PAD - TITLE_H;
    let span = max - min;
    let n = values.len();

    let y_of = |v: f64| -> f64 {
        let norm = if span > 0.0 { (v - min) / span } else { 0.5 };
        let t = if series.invert { 1.0 - norm } else { norm };
        plot_y + (1.0 - t) * plot_h
    };
    let x_of = |i: usize| -> f64 {
        if n < 2 {
            plot_x
        } else {
            plot_x + plot_w * (i as f64) / ((n - 1) as f64)
        }
    };

    // Contiguous runs of valid values: the stroke breaks at gaps, and each
    // run gets its own filled area down to the baseline.
    let mut line = BezPath::new();
    let mut area = BezPath::new();
    let baseline = plot_y + plot_h;
    let mut run_start: Option<usize> = None;
    for i in 0..=n {
        let value = if i < n { values[i] } else { None };
        match (value, run_start) {
            (Some(v), None) => {
                run_start = Some(i);
                line.move_to((x_of(i), y_of(v)));
            }
            (Some(v), Some(_)) => line.line_to((x_of(i), y_of(v))),
            (None, Some(start)) => {
                let end = i - 1;
                if end > start {
                    area.move_to((x_of(start), baseline));
                    for j in start..=end {
                        if let Some(v) = values[j] {
                            area.line_to((x_of(j), y_of(v)));
                        }
                    }
                    area.line_to((x_of(end), baseline));
                    area.close_path();
                }
                run_start = None;
            }
            (None, None) => {}
        }
    }

    if !area.is_empty() {
        frag.fill_path(&area.to_svg(), series.color.with_alpha(style.area_alpha));
    }
    frag.stroke_path(&line.to_svg(), series.color, style.stroke_width);

    // Scale captions: top and bottom of the scale, swapped when inverted so
    // the label always sits next to the value it describes.
    let (top_value, bottom_value) = if series.invert { (min, max) } else { (max, min) };
    frag.text(
        x + w - PAD,
        y + PAD + 6.0,
        14.0,
        400,
        TextAnchor::End,
        style.caption_color,
        &series.format.format(top_value),
    );
    frag.text(
        x + w - PAD,
        y + h - 8.0,
        14.0,
        400,
        TextAnchor::End,
        style.caption_color,
        &series.format.format(bottom_value),
    );
    frag
}

fn render_placeholder(
    mut frag: SvgFragment,
    x: f64,
    y: f64,
    w: f64,
    h: f64,
    style: &ChartStyle,
) -> SvgFragment {
    frag.text(
        x + w / 2.0,
        y + h / 2.0 + 6.0,
        16.0,
        400,
        TextAnchor::Middle,
        style.label_color,
        "no data",
    );
    frag
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::series::ValueFormat;

    fn series(values: Vec<Option<f64>>, invert: bool) -> ChartSeries {
        ChartSeries {
            label: "Heart rate".to_string(),
            values,
            color: Rgba8::rgb(244, 114, 182),
            format: ValueFormat::Integer,
            invert,
        }
    }

    #[test]
    fn sparse_series_renders_placeholder() {
        let s = series(vec![Some(140.0), None, None], false);
        let frag = render_chart(&s, 0.0, 0.0, 400.0, 200.0, &ChartStyle::default());
        assert!(frag.as_str().contains("no data"));
        assert!(!frag.as_str().contains("<path"));
    }

    #[test]
    fn dense_series_renders_line_and_area() {
        let s = series((0..50).map(|i| Some(100.0 + f64::from(i))).collect(), false);
        let frag = render_chart(&s, 0.0, 0.0, 400.0, 200.0, &ChartStyle::default());
        assert!(frag.as_str().contains("<path"));
        // Max caption above min caption.
        assert!(frag.as_str().contains(">149<"));
        assert!(frag.as_str().contains(">100<"));
    }

    #[test]
    fn inverted_series_swaps_captions() {
        let s = ChartSeries {
            format: ValueFormat::PaceMinPerKm,
            ..series(vec![Some(4.0), Some(6.0), Some(5.0)], true)
        };
        let frag = render_chart(&s, 0.0, 0.0, 400.0, 200.0, &ChartStyle::default());
        let svg = frag.as_str();
        // Fast pace (4:00) is the top caption when inverted.
        let top = svg.find(">4:00<").expect("top caption");
        let bottom = svg.find(">6:00<").expect("bottom caption");
        assert!(top < bottom);
    }

    #[test]
    fn flat_series_does_not_divide_by_zero() {
        let s = series(vec![Some(120.0); 10], false);
        let frag = render_chart(&s, 0.0, 0.0, 400.0, 200.0, &ChartStyle::default());
        assert!(frag.as_str().contains("<path"));
        assert!(!frag.as_str().contains("NaN"));
    }
}
