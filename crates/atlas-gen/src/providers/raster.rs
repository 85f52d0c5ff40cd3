//! Raster map renderer
//!
//! Draws the target country in red over its neighbours in light grey on a
//! light blue sea, cropped to the target's padded bounding box.

use crate::config::MapConfig;
use crate::dataset::{GeoDataset, GeoRecord, Polygon};
use crate::provider::MapRenderer;
use atlas_core::{AtlasError, BoundingBox, Result, Rgb};
use image::{ImageFormat, RgbImage};
use std::io::Cursor;

const SEA: Rgb = Rgb::LIGHT_BLUE;
const LAND: Rgb = Rgb::LIGHT_GREY;
const LAND_BORDER: Rgb = Rgb::WHITE;
const TARGET: Rgb = Rgb::RED;
const TARGET_BORDER: Rgb = Rgb::BLACK;

pub struct RasterMapRenderer {
    width: u32,
    height: u32,
    pad_factor: f64,
}

impl RasterMapRenderer {
    pub fn new(width: u32, height: u32, pad_factor: f64) -> Self {
        Self {
            width,
            height,
            pad_factor,
        }
    }

    pub fn from_config(config: &MapConfig) -> Self {
        Self::new(config.width, config.height, config.pad_factor)
    }
}

impl Default for RasterMapRenderer {
    fn default() -> Self {
        Self::from_config(&MapConfig::default())
    }
}

/// Linear lon/lat to pixel mapping with a single scale for both axes
struct Projection {
    view: BoundingBox,
    scale: f64,
    offset_x: f64,
    offset_y: f64,
}

impl Projection {
    fn fit(view: BoundingBox, width: u32, height: u32) -> Self {
        let scale = (width as f64 / view.width()).min(height as f64 / view.height());
        let offset_x = (width as f64 - view.width() * scale) / 2.0;
        let offset_y = (height as f64 - view.height() * scale) / 2.0;
        Self {
            view,
            scale,
            offset_x,
            offset_y,
        }
    }

    fn project(&self, point: &[f64; 2]) -> (f64, f64) {
        let x = self.offset_x + (point[0] - self.view.min_x) * self.scale;
        // Latitude grows upwards
        let y = self.offset_y + (self.view.max_y - point[1]) * self.scale;
        (x, y)
    }
}

impl MapRenderer for RasterMapRenderer {
    fn render(&self, dataset: &GeoDataset, target: &GeoRecord) -> Result<Vec<u8>> {
        let bbox = target.bbox.ok_or_else(|| {
            AtlasError::Render(format!("'{}' has no geometry to draw", target.name))
        })?;
        let view = bbox.padded(self.pad_factor);
        let projection = Projection::fit(view, self.width, self.height);

        let mut img = RgbImage::from_pixel(self.width, self.height, image::Rgb(SEA.to_array()));

        for record in dataset.records() {
            if record.name == target.name {
                continue;
            }
            let visible = record.bbox.map(|b| b.intersects(&view)).unwrap_or(false);
            if !visible {
                continue;
            }
            draw_record(&mut img, &projection, record, LAND, LAND_BORDER);
        }
        draw_record(&mut img, &projection, target, TARGET, TARGET_BORDER);

        encode_png(&img)
    }
}

fn draw_record(img: &mut RgbImage, projection: &Projection, record: &GeoRecord, fill: Rgb, border: Rgb) {
    for polygon in &record.polygons {
        fill_polygon(img, projection, polygon, fill);
    }
    for polygon in &record.polygons {
        for ring in polygon {
            let points: Vec<(f64, f64)> = ring.iter().map(|p| projection.project(p)).collect();
            for pair in points.windows(2) {
                draw_line(img, pair[0], pair[1], border);
            }
            if let (Some(&first), Some(&last)) = (points.first(), points.last()) {
                if first != last {
                    draw_line(img, last, first, border);
                }
            }
        }
    }
}

/// Even-odd scanline fill over every ring of the polygon, so holes stay open
fn fill_polygon(img: &mut RgbImage, projection: &Projection, polygon: &Polygon, color: Rgb) {
    let edges: Vec<((f64, f64), (f64, f64))> = polygon
        .iter()
        .flat_map(|ring| {
            let points: Vec<(f64, f64)> = ring.iter().map(|p| projection.project(p)).collect();
            let n = points.len();
            (0..n).map(move |i| (points[i], points[(i + 1) % n]))
        })
        .filter(|(a, b)| a.1 != b.1)
        .collect();
    if edges.is_empty() {
        return;
    }

    let min_y = edges.iter().map(|(a, b)| a.1.min(b.1)).fold(f64::INFINITY, f64::min);
    let max_y = edges.iter().map(|(a, b)| a.1.max(b.1)).fold(f64::NEG_INFINITY, f64::max);
    let first_row = min_y.floor().max(0.0) as u32;
    let last_row = (max_y.ceil().max(0.0) as u32).min(img.height());

    let pixel = image::Rgb(color.to_array());
    let mut crossings = Vec::new();
    for row in first_row..last_row {
        let scan_y = row as f64 + 0.5;
        crossings.clear();
        for &((x0, y0), (x1, y1)) in &edges {
            if (y0 <= scan_y && y1 > scan_y) || (y1 <= scan_y && y0 > scan_y) {
                crossings.push(x0 + (scan_y - y0) / (y1 - y0) * (x1 - x0));
            }
        }
        crossings.sort_by(|a, b| a.total_cmp(b));

        for span in crossings.chunks_exact(2) {
            let start = (span[0] - 0.5).ceil().max(0.0) as u32;
            let end = ((span[1] - 0.5).floor() + 1.0).max(0.0) as u32;
            for x in start..end.min(img.width()) {
                img.put_pixel(x, row, pixel);
            }
        }
    }
}

/// Bresenham line, clipped per pixel
fn draw_line(img: &mut RgbImage, from: (f64, f64), to: (f64, f64), color: Rgb) {
    let pixel = image::Rgb(color.to_array());
    let (mut x0, mut y0) = (from.0.round() as i64, from.1.round() as i64);
    let (x1, y1) = (to.0.round() as i64, to.1.round() as i64);
    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if x0 >= 0 && y0 >= 0 && (x0 as u32) < img.width() && (y0 as u32) < img.height() {
            img.put_pixel(x0 as u32, y0 as u32, pixel);
        }
        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}

pub(crate) fn encode_png(img: &RgbImage) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .map_err(|e| AtlasError::Render(format!("PNG encoding failed: {}", e)))?;
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(x: f64, y: f64, size: f64) -> Polygon {
        vec![vec![
            [x, y],
            [x + size, y],
            [x + size, y + size],
            [x, y + size],
            [x, y],
        ]]
    }

    fn decode(bytes: &[u8]) -> RgbImage {
        image::load_from_memory(bytes).unwrap().to_rgb8()
    }

    #[test]
    fn test_target_drawn_red_on_sea() {
        let target = GeoRecord::new("Square", "Europe", vec![square(0.0, 0.0, 10.0)]);
        let dataset = GeoDataset::new(vec![target.clone()]);
        let renderer = RasterMapRenderer::new(100, 100, 0.5);

        let img = decode(&renderer.render(&dataset, &target).unwrap());
        assert_eq!(img.dimensions(), (100, 100));
        assert_eq!(img.get_pixel(50, 50).0, TARGET.to_array());
        assert_eq!(img.get_pixel(2, 2).0, SEA.to_array());
    }

    #[test]
    fn test_neighbour_drawn_grey() {
        let target = GeoRecord::new("Left", "Europe", vec![square(0.0, 0.0, 10.0)]);
        let neighbour = GeoRecord::new("Right", "Europe", vec![square(10.0, 0.0, 10.0)]);
        let far_away = GeoRecord::new("Far", "Asia", vec![square(100.0, 100.0, 1.0)]);
        let dataset = GeoDataset::new(vec![target.clone(), neighbour, far_away]);
        let renderer = RasterMapRenderer::new(200, 200, 0.5);

        let img = decode(&renderer.render(&dataset, &target).unwrap());
        // View spans x in [-5, 15]; x = 13 lies inside the neighbour
        assert_eq!(img.get_pixel(180, 100).0, LAND.to_array());
        assert_eq!(img.get_pixel(100, 100).0, TARGET.to_array());
    }

    #[test]
    fn test_hole_stays_unfilled() {
        let mut polygon = square(0.0, 0.0, 10.0);
        polygon.push(vec![[4.0, 4.0], [6.0, 4.0], [6.0, 6.0], [4.0, 6.0], [4.0, 4.0]]);
        let target = GeoRecord::new("Ring", "Europe", vec![polygon]);
        let dataset = GeoDataset::new(vec![target.clone()]);
        let renderer = RasterMapRenderer::new(200, 200, 0.5);

        let img = decode(&renderer.render(&dataset, &target).unwrap());
        assert_eq!(img.get_pixel(100, 100).0, SEA.to_array());
        assert_eq!(img.get_pixel(60, 60).0, TARGET.to_array());
    }

    #[test]
    fn test_point_sized_target_renders() {
        let target = GeoRecord::new("Dot", "Europe", vec![vec![vec![[5.0, 5.0]]]]);
        let dataset = GeoDataset::new(vec![target.clone()]);
        let renderer = RasterMapRenderer::new(50, 50, 0.5);
        let img = decode(&renderer.render(&dataset, &target).unwrap());
        assert_eq!(img.dimensions(), (50, 50));
    }

    #[test]
    fn test_target_without_geometry_fails() {
        let target = GeoRecord::new("Nowhere", "Europe", vec![]);
        let dataset = GeoDataset::new(vec![target.clone()]);
        let renderer = RasterMapRenderer::default();
        assert!(matches!(
            renderer.render(&dataset, &target),
            Err(AtlasError::Render(_))
        ));
    }

    #[test]
    fn test_render_is_deterministic() {
        let target = GeoRecord::new("Square", "Europe", vec![square(3.0, 50.0, 4.0)]);
        let dataset = GeoDataset::new(vec![target.clone()]);
        let renderer = RasterMapRenderer::new(64, 64, 0.5);
        assert_eq!(
            renderer.render(&dataset, &target).unwrap(),
            renderer.render(&dataset, &target).unwrap()
        );
    }
}
