//! PNG rasterizer for calendar descriptors.
//!
//! # Responsibility
//! - Draw the fixed calendar layout into an RGB canvas and encode it as PNG.
//!
//! # Invariants
//! - Output size is always `CANVAS_WIDTH x CANVAS_HEIGHT`.
//! - The highlighted header cell is `request.weekday_index`.
//!
//! Text glyphs are not rasterized here; event and title rows are drawn as
//! bands sized by their text length so the layout stays recognizable.

use crate::render::{Rasterizer, RenderError, RenderRequest};
use image::{ImageFormat, Rgb, RgbImage};
use log::debug;
use std::io::Cursor;

pub const CANVAS_WIDTH: u32 = 800;
pub const CANVAS_HEIGHT: u32 = 600;
const HEADER_HEIGHT: u32 = 50;
const MARKER_WIDTH: u32 = 3;
const EVENT_TOP_OFFSET: u32 = 180;
const EVENT_ROW_STEP: u32 = 30;
const EVENT_BAND_HEIGHT: u32 = 22;
const TITLE_BAND_HEIGHT: u32 = 18;
const TITLE_BOTTOM_MARGIN: u32 = 10;
const CHAR_WIDTH: u32 = 9;

const BACKGROUND: Rgb<u8> = Rgb([30, 30, 30]);
const GRID: Rgb<u8> = Rgb([90, 90, 90]);
const HEADER_TEXT: Rgb<u8> = Rgb([255, 255, 255]);
const MARKER: Rgb<u8> = Rgb([255, 0, 0]);
const EVENT_TEXT: Rgb<u8> = Rgb([200, 200, 100]);
const TITLE_TEXT: Rgb<u8> = Rgb([200, 200, 200]);

/// Rasterizer producing the 800x600 calendar card.
#[derive(Debug, Clone, Copy, Default)]
pub struct PngRasterizer;

impl PngRasterizer {
    pub fn new() -> Self {
        Self
    }

    fn draw(&self, request: &RenderRequest) -> Result<RgbImage, RenderError> {
        let columns = request.weekday_names.len() as u32;
        if columns == 0 {
            return Err(RenderError::InvalidRequest(
                "weekday header has no columns".to_string(),
            ));
        }
        if request.weekday_index >= request.weekday_names.len() {
            return Err(RenderError::InvalidRequest(format!(
                "weekday index {} outside {} header cells",
                request.weekday_index, columns
            )));
        }

        let mut canvas = RgbImage::from_pixel(CANVAS_WIDTH, CANVAS_HEIGHT, BACKGROUND);
        let cell_width = CANVAS_WIDTH / columns;

        for (column, name) in request.weekday_names.iter().enumerate() {
            let x = column as u32 * cell_width;
            fill_rect(&mut canvas, x, HEADER_HEIGHT - 1, cell_width, 1, GRID);
            fill_rect(&mut canvas, x, 0, 1, HEADER_HEIGHT, GRID);
            draw_text_band(
                &mut canvas,
                x,
                cell_width,
                (HEADER_HEIGHT - TITLE_BAND_HEIGHT) / 2,
                TITLE_BAND_HEIGHT,
                name,
                HEADER_TEXT,
            );
        }

        let marker_x = request.weekday_index as u32 * cell_width;
        outline_rect(
            &mut canvas,
            marker_x,
            0,
            cell_width,
            HEADER_HEIGHT,
            MARKER_WIDTH,
            MARKER,
        );

        let mut event_y = CANVAS_HEIGHT - EVENT_TOP_OFFSET;
        for event in &request.events {
            // Leading bullet plus space.
            let label_len = event.chars().count() + 2;
            draw_text_band_len(
                &mut canvas,
                0,
                CANVAS_WIDTH,
                event_y,
                EVENT_BAND_HEIGHT,
                label_len,
                EVENT_TEXT,
            );
            event_y += EVENT_ROW_STEP;
        }

        draw_text_band(
            &mut canvas,
            0,
            CANVAS_WIDTH,
            CANVAS_HEIGHT - TITLE_BAND_HEIGHT - TITLE_BOTTOM_MARGIN,
            TITLE_BAND_HEIGHT,
            &request.title_text,
            TITLE_TEXT,
        );

        Ok(canvas)
    }
}

impl Rasterizer for PngRasterizer {
    fn render(&self, request: &RenderRequest) -> Result<Vec<u8>, RenderError> {
        let canvas = self.draw(request)?;
        let mut bytes = Vec::new();
        canvas.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
        debug!(
            "event=render module=render status=ok date={} events={} bytes={}",
            request.date,
            request.events.len(),
            bytes.len()
        );
        Ok(bytes)
    }
}

fn draw_text_band(
    canvas: &mut RgbImage,
    area_x: u32,
    area_width: u32,
    y: u32,
    height: u32,
    text: &str,
    color: Rgb<u8>,
) {
    draw_text_band_len(
        canvas,
        area_x,
        area_width,
        y,
        height,
        text.chars().count(),
        color,
    );
}

/// Draws a band centered in `[area_x, area_x + area_width)`, as wide as
/// `len` characters would be.
fn draw_text_band_len(
    canvas: &mut RgbImage,
    area_x: u32,
    area_width: u32,
    y: u32,
    height: u32,
    len: usize,
    color: Rgb<u8>,
) {
    let inner = area_width.saturating_sub(8);
    let width = (len as u32).saturating_mul(CHAR_WIDTH).min(inner);
    let x = area_x + (area_width - width) / 2;
    fill_rect(canvas, x, y + height / 3, width, height / 3, color);
}

fn fill_rect(canvas: &mut RgbImage, x: u32, y: u32, width: u32, height: u32, color: Rgb<u8>) {
    let x_end = (x + width).min(canvas.width());
    let y_end = (y + height).min(canvas.height());
    for py in y..y_end {
        for px in x..x_end {
            canvas.put_pixel(px, py, color);
        }
    }
}

fn outline_rect(
    canvas: &mut RgbImage,
    x: u32,
    y: u32,
    width: u32,
    height: u32,
    stroke: u32,
    color: Rgb<u8>,
) {
    fill_rect(canvas, x, y, width, stroke, color);
    fill_rect(canvas, x, y + height - stroke, width, stroke, color);
    fill_rect(canvas, x, y, stroke, height, color);
    fill_rect(canvas, x + width - stroke, y, stroke, height, color);
}

#[cfg(test)]
mod tests {
    use super::{PngRasterizer, CANVAS_HEIGHT, CANVAS_WIDTH, MARKER};
    use crate::model::guild::GuildCalendarState;
    use crate::render::{build_render_request, Rasterizer, RenderError};

    #[test]
    fn renders_png_of_fixed_size() {
        let mut state = GuildCalendarState::new_default();
        state.events.add(state.current, "Festival");
        let request = build_render_request(&state);

        let bytes = PngRasterizer::new().render(&request).unwrap();
        assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");

        let decoded = image::load_from_memory(&bytes).unwrap().to_rgb8();
        assert_eq!(decoded.dimensions(), (CANVAS_WIDTH, CANVAS_HEIGHT));
    }

    #[test]
    fn marker_outlines_current_weekday_cell() {
        let state = GuildCalendarState::new_default();
        let request = build_render_request(&state);
        let canvas = PngRasterizer::new().draw(&request).unwrap();

        let cell_width = CANVAS_WIDTH / 7;
        let marker_x = request.weekday_index as u32 * cell_width;
        assert_eq!(*canvas.get_pixel(marker_x + 1, 1), MARKER);
        assert_ne!(*canvas.get_pixel(1, 1), MARKER);
    }

    #[test]
    fn rejects_weekday_index_outside_header() {
        let state = GuildCalendarState::new_default();
        let mut request = build_render_request(&state);
        request.weekday_index = 7;

        let err = PngRasterizer::new().render(&request).unwrap_err();
        assert!(matches!(err, RenderError::InvalidRequest(_)));
    }
}
