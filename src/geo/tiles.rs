use std::io::Read as _;
use std::time::Duration;

use anyhow::Context as _;
use rayon::prelude::*;

use crate::foundation::error::FitcardResult;
use crate::geo::mercator::{MapViewport, TILE_SIZE};

/// Address of one basemap tile. `tile_x`/`tile_y` are already wrapped
/// modulo `2^zoom` (tile grids wrap at the antimeridian).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct TileRef {
    pub zoom: u8,
    pub tile_x: u32,
    pub tile_y: u32,
}

/// A tile scheduled for compositing: wrapped fetch address plus the
/// viewport-pixel offset of its top-left corner.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TilePlacement {
    pub tile: TileRef,
    pub offset_x: i32,
    pub offset_y: i32,
}

/// Decoded tile pixels, premultiplied RGBA8, ready for blitting.
#[derive(Clone, Debug)]
pub struct TilePixels {
    pub placement: TilePlacement,
    pub width: u32,
    pub height: u32,
    pub rgba8_premul: Vec<u8>,
}

/// Hard cap on tile fetches per render, independent of viewport size.
pub const MAX_TILES_PER_RENDER: usize = 30;

/// Per-tile fetch timeout.
pub const TILE_FETCH_TIMEOUT: Duration = Duration::from_secs(6);

/// Enumerate the integer tile range covering `[origin, origin + viewport]`,
/// row-major, truncated at `cap`.
pub fn enumerate_tiles(viewport: &MapViewport, cap: usize) -> Vec<TilePlacement> {
    let n = 1i64 << i64::from(viewport.zoom);
    let x0 = (viewport.origin_x / TILE_SIZE).floor() as i64;
    let y0 = (viewport.origin_y / TILE_SIZE).floor() as i64;
    let x1 = ((viewport.origin_x + viewport.width) / TILE_SIZE).floor() as i64;
    let y1 = ((viewport.origin_y + viewport.height) / TILE_SIZE).floor() as i64;

    let mut out = Vec::new();
    'rows: for ty in y0..=y1 {
        for tx in x0..=x1 {
            if out.len() >= cap {
                break 'rows;
            }
            out.push(TilePlacement {
                tile: TileRef {
                    zoom: viewport.zoom,
                    tile_x: tx.rem_euclid(n) as u32,
                    tile_y: ty.rem_euclid(n) as u32,
                },
                offset_x: (tx as f64 * TILE_SIZE - viewport.origin_x).round() as i32,
                offset_y: (ty as f64 * TILE_SIZE - viewport.origin_y).round() as i32,
            });
        }
    }
    out
}

/// Something that can produce encoded tile image bytes for a tile address.
pub trait TileSource: Sync {
    fn fetch(&self, tile: TileRef) -> FitcardResult<Vec<u8>>;
}

/// HTTP basemap source addressed as `{base}/{zoom}/{x}/{y}`.
pub struct HttpTileSource {
    agent: ureq::Agent,
    base_url: String,
}

impl HttpTileSource {
    pub fn new(base_url: impl Into<String>) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(TILE_FETCH_TIMEOUT)
            .build();
        Self {
            agent,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

impl TileSource for HttpTileSource {
    fn fetch(&self, tile: TileRef) -> FitcardResult<Vec<u8>> {
        let url = format!(
            "{}/{}/{}/{}",
            self.base_url, tile.zoom, tile.tile_x, tile.tile_y
        );
        let resp = self
            .agent
            .get(&url)
            .call()
            .with_context(|| format!("fetch tile {url}"))?;
        let mut bytes = Vec::new();
        resp.into_reader()
            .read_to_end(&mut bytes)
            .with_context(|| format!("read tile body {url}"))?;
        Ok(bytes)
    }
}

/// Fetch and decode every scheduled tile concurrently.
///
/// Each fetch fails independently: a failed or timed-out tile logs a warning
/// and leaves its cell blank, it never aborts the render.
#[tracing::instrument(skip(placements, source), fields(tiles = placements.len()))]
pub fn fetch_tiles(placements: &[TilePlacement], source: &dyn TileSource) -> Vec<TilePixels> {
    placements
        .par_iter()
        .filter_map(|p| match fetch_one(p, source) {
            Ok(pixels) => Some(pixels),
            Err(err) => {
                tracing::warn!(
                    zoom = p.tile.zoom,
                    x = p.tile.tile_x,
                    y = p.tile.tile_y,
                    error = %err,
                    "tile fetch failed, leaving cell blank"
                );
                None
            }
        })
        .collect()
}

fn fetch_one(placement: &TilePlacement, source: &dyn TileSource) -> FitcardResult<TilePixels> {
    let bytes = source.fetch(placement.tile)?;
    let dyn_img = image::load_from_memory(&bytes).context("decode tile image")?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();
    let mut rgba8_premul = rgba.into_raw();
    premultiply_rgba8_in_place(&mut rgba8_premul);
    Ok(TilePixels {
        placement: *placement,
        width,
        height,
        rgba8_premul,
    })
}

fn premultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 0 {
            px[0] = 0;
            px[1] = 0;
            px[2] = 0;
            continue;
        }
        px[0] = ((px[0] as u16 * a + 127) / 255) as u8;
        px[1] = ((px[1] as u16 * a + 127) / 255) as u8;
        px[2] = ((px[2] as u16 * a + 127) / 255) as u8;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::error::FitcardError;

    fn viewport(zoom: u8, origin_x: f64, origin_y: f64, w: f64, h: f64) -> MapViewport {
        MapViewport {
            zoom,
            origin_x,
            origin_y,
            width: w,
            height: h,
        }
    }

    #[test]
    fn enumeration_covers_viewport_and_respects_cap() {
        let vp = viewport(14, 1000.0, 2000.0, 900.0, 700.0);
        let tiles = enumerate_tiles(&vp, MAX_TILES_PER_RENDER);
        // 900px spans 5 tile columns from x offset 1000, 700px spans 4 rows.
        assert_eq!(tiles.len(), 20);
        assert!(tiles.len() <= MAX_TILES_PER_RENDER);

        let capped = enumerate_tiles(&vp, 7);
        assert_eq!(capped.len(), 7);
        assert_eq!(&tiles[..7], &capped[..]);
    }

    #[test]
    fn offsets_align_to_tile_grid() {
        let vp = viewport(14, 1000.0, 2048.0, 512.0, 256.0);
        let tiles = enumerate_tiles(&vp, MAX_TILES_PER_RENDER);
        let first = tiles[0];
        // Tile column 3 starts at world x 768, 232px left of the origin.
        assert_eq!(first.offset_x, -232);
        assert_eq!(first.offset_y, 0);
        assert_eq!(first.tile.tile_x, 3);
        assert_eq!(first.tile.tile_y, 8);
    }

    #[test]
    fn negative_and_overflow_indices_wrap() {
        // Origin just west of the antimeridian at zoom 2 (4 tiles per axis).
        let vp = viewport(2, -300.0, 100.0, 600.0, 100.0);
        let tiles = enumerate_tiles(&vp, MAX_TILES_PER_RENDER);
        let xs: Vec<u32> = tiles.iter().map(|t| t.tile.tile_x).collect();
        assert_eq!(xs, vec![2, 3, 0, 1]);
    }

    struct FlakySource;

    impl TileSource for FlakySource {
        fn fetch(&self, tile: TileRef) -> FitcardResult<Vec<u8>> {
            if tile.tile_x % 2 == 0 {
                return Err(FitcardError::render("synthetic fetch failure"));
            }
            // 1x1 white PNG.
            let mut bytes = Vec::new();
            let img = image::RgbaImage::from_pixel(1, 1, image::Rgba([255, 255, 255, 255]));
            img.write_to(
                &mut std::io::Cursor::new(&mut bytes),
                image::ImageFormat::Png,
            )
            .unwrap();
            Ok(bytes)
        }
    }

    #[test]
    fn partial_failure_keeps_surviving_tiles() {
        let vp = viewport(4, 0.0, 0.0, 1023.0, 255.0);
        let placements = enumerate_tiles(&vp, MAX_TILES_PER_RENDER);
        assert_eq!(placements.len(), 4);
        let fetched = fetch_tiles(&placements, &FlakySource);
        assert_eq!(fetched.len(), 2);
        assert!(fetched.iter().all(|t| t.placement.tile.tile_x % 2 == 1));
        assert_eq!(fetched[0].rgba8_premul, vec![255, 255, 255, 255]);
    }
}
