use crate::foundation::color::Rgba8;
use crate::foundation::svg::{SvgFragment, TextAnchor};
use crate::strength::muscles::{MuscleGroup, MuscleVolumes};

/// Which side of the body a heatmap region belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BodyView {
    Front,
    Back,
}

/// One shaded region of the body diagram, in figure-local coordinates
/// (one figure is `FIGURE_W` x `FIGURE_H`). Paired muscles appear as two
/// mirrored entries.
struct Region {
    group: MuscleGroup,
    view: BodyView,
    cx: f64,
    cy: f64,
    rx: f64,
    ry: f64,
}

const fn region(group: MuscleGroup, view: BodyView, cx: f64, cy: f64, rx: f64, ry: f64) -> Region {
    Region { group, view, cx, cy, rx, ry }
}

pub const FIGURE_W: f64 = 220.0;
pub const FIGURE_H: f64 = 440.0;

use BodyView::{Back, Front};
use MuscleGroup::*;

static REGIONS: &[Region] = &[
    // Front figure.
    region(Chest, Front, 87.0, 128.0, 22.0, 16.0),
    region(Chest, Front, 133.0, 128.0, 22.0, 16.0),
    region(Shoulders, Front, 60.0, 113.0, 14.0, 12.0),
    region(Shoulders, Front, 160.0, 113.0, 14.0, 12.0),
    region(Biceps, Front, 50.0, 155.0, 11.0, 21.0),
    region(Biceps, Front, 170.0, 155.0, 11.0, 21.0),
    region(Forearms, Front, 42.0, 202.0, 9.0, 23.0),
    region(Forearms, Front, 178.0, 202.0, 9.0, 23.0),
    region(Abs, Front, 110.0, 185.0, 21.0, 28.0),
    region(Obliques, Front, 81.0, 182.0, 9.0, 22.0),
    region(Obliques, Front, 139.0, 182.0, 9.0, 22.0),
    region(Quads, Front, 88.0, 282.0, 16.0, 42.0),
    region(Quads, Front, 132.0, 282.0, 16.0, 42.0),
    // Back figure.
    region(Traps, Back, 110.0, 107.0, 26.0, 13.0),
    region(Shoulders, Back, 60.0, 113.0, 14.0, 12.0),
    region(Shoulders, Back, 160.0, 113.0, 14.0, 12.0),
    region(UpperBack, Back, 110.0, 143.0, 28.0, 20.0),
    region(Lats, Back, 80.0, 172.0, 12.0, 26.0),
    region(Lats, Back, 140.0, 172.0, 12.0, 26.0),
    region(LowerBack, Back, 110.0, 205.0, 17.0, 15.0),
    region(Triceps, Back, 50.0, 155.0, 11.0, 21.0),
    region(Triceps, Back, 170.0, 155.0, 11.0, 21.0),
    region(Forearms, Back, 42.0, 202.0, 9.0, 23.0),
    region(Forearms, Back, 178.0, 202.0, 9.0, 23.0),
    region(Glutes, Back, 92.0, 240.0, 17.0, 17.0),
    region(Glutes, Back, 128.0, 240.0, 17.0, 17.0),
    region(Hamstrings, Back, 88.0, 298.0, 15.0, 36.0),
    region(Hamstrings, Back, 132.0, 298.0, 15.0, 36.0),
    region(Calves, Back, 88.0, 368.0, 12.0, 28.0),
    region(Calves, Back, 132.0, 368.0, 12.0, 28.0),
];

/// Style for the two-figure muscle heatmap.
#[derive(Clone, Debug)]
pub struct HeatmapStyle {
    /// Fully trained regions render in this color at full opacity.
    pub heat: Rgba8,
    /// Regions with zero volume.
    pub neutral: Rgba8,
    /// Opacity floor for any region with nonzero volume, so light work
    /// still reads against the neutral shade.
    pub min_heat_opacity: f64,
    pub outline: Rgba8,
    pub outline_width: f64,
    pub caption: Rgba8,
}

impl Default for HeatmapStyle {
    fn default() -> Self {
        Self {
            heat: Rgba8::rgb(249, 115, 22),
            neutral: Rgba8::rgba(148, 163, 184, 46),
            min_heat_opacity: 0.2,
            outline: Rgba8::rgba(148, 163, 184, 90),
            outline_width: 2.0,
            caption: Rgba8::rgb(148, 163, 184),
        }
    }
}

fn region_fill(total: f64, max_total: f64, style: &HeatmapStyle) -> Rgba8 {
    if total <= 0.0 || max_total <= 0.0 {
        return style.neutral;
    }
    let share = (total / max_total).clamp(0.0, 1.0);
    let opacity = style.min_heat_opacity + share * (1.0 - style.min_heat_opacity);
    style.heat.with_alpha((opacity * 255.0).round() as u8)
}

/// Render front and back body figures side by side into the target box,
/// shading each muscle region by its share of the workout's peak volume.
pub fn render_heatmap(
    volumes: &MuscleVolumes,
    x: f64,
    y: f64,
    w: f64,
    h: f64,
    style: &HeatmapStyle,
) -> SvgFragment {
    let mut frag = SvgFragment::new();
    let max_total = volumes.max_total();
    // Uniform scale, two figures packed horizontally with a small gutter.
    let gutter = w * 0.04;
    let scale = ((w - gutter) / (2.0 * FIGURE_W)).min(h / FIGURE_H);
    let used_w = 2.0 * FIGURE_W * scale + gutter;
    let left = x + (w - used_w) / 2.0;
    let top = y + (h - FIGURE_H * scale) / 2.0;

    for (view, fx) in [(Front, left), (Back, left + FIGURE_W * scale + gutter)] {
        frag.open_group(Some(&format!("translate({fx:.2},{top:.2}) scale({scale:.4})")));
        draw_silhouette(&mut frag, style);
        for r in REGIONS.iter().filter(|r| r.view == view) {
            let fill = region_fill(volumes.total_for(r.group), max_total, style);
            frag.ellipse(r.cx, r.cy, r.rx, r.ry, fill);
        }
        let caption = match view {
            Front => "FRONT",
            Back => "BACK",
        };
        frag.text(
            FIGURE_W / 2.0,
            FIGURE_H - 4.0,
            16.0,
            600,
            TextAnchor::Middle,
            style.caption,
            caption,
        );
        frag.close_group();
    }
    frag
}

/// Faint body outline the regions sit on. Head, torso, arms, legs; both
/// views share the same silhouette.
fn draw_silhouette(frag: &mut SvgFragment, style: &HeatmapStyle) {
    let d = concat!(
        // Head.
        "M110,50 m-22,0 a22,22 0 1,0 44,0 a22,22 0 1,0 -44,0 ",
        // Torso.
        "M72,95 L148,95 L156,225 L64,225 Z ",
        // Left arm, right arm.
        "M64,100 L38,160 L34,232 M156,100 L182,160 L186,232 ",
        // Left leg, right leg.
        "M70,225 L80,400 M150,225 L140,400 M110,235 L110,260",
    );
    frag.stroke_path(d, style.outline, style.outline_width);
}
