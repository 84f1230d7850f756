//! Rasterization of the report artifacts.
//!
//! There is no plotting toolkit here: both artifacts are composed directly
//! into `RgbImage` buffers, with a small built-in 5x7 font for annotations.

use image::{imageops, Rgb, RgbImage};

use crate::metrics::ConfusionMatrix;

const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
const BLACK: Rgb<u8> = Rgb([0, 0, 0]);
// Endpoint of the heatmap ramp, matching the dark end of a "Blues" palette.
const HEAT_BLUE: Rgb<u8> = Rgb([8, 48, 107]);
const GRID_GRAY: Rgb<u8> = Rgb([190, 190, 190]);
const CORRECT_GREEN: Rgb<u8> = Rgb([0, 140, 0]);
const INCORRECT_RED: Rgb<u8> = Rgb([200, 30, 30]);

const GLYPH_WIDTH: u32 = 5;
const GLYPH_HEIGHT: u32 = 7;
// One blank column between glyphs.
const GLYPH_ADVANCE: u32 = GLYPH_WIDTH + 1;

/// 5x7 glyphs, one byte per row, low five bits used, MSB-side leftmost.
fn glyph(c: char) -> [u8; 7] {
    match c.to_ascii_uppercase() {
        ' ' => [0x00; 7],
        '0' => [0x0E, 0x11, 0x13, 0x15, 0x19, 0x11, 0x0E],
        '1' => [0x04, 0x0C, 0x04, 0x04, 0x04, 0x04, 0x0E],
        '2' => [0x0E, 0x11, 0x01, 0x02, 0x04, 0x08, 0x1F],
        '3' => [0x1F, 0x02, 0x04, 0x02, 0x01, 0x11, 0x0E],
        '4' => [0x02, 0x06, 0x0A, 0x12, 0x1F, 0x02, 0x02],
        '5' => [0x1F, 0x10, 0x1E, 0x01, 0x01, 0x11, 0x0E],
        '6' => [0x06, 0x08, 0x10, 0x1E, 0x11, 0x11, 0x0E],
        '7' => [0x1F, 0x01, 0x02, 0x04, 0x08, 0x08, 0x08],
        '8' => [0x0E, 0x11, 0x11, 0x0E, 0x11, 0x11, 0x0E],
        '9' => [0x0E, 0x11, 0x11, 0x0F, 0x01, 0x02, 0x0C],
        'A' => [0x0E, 0x11, 0x11, 0x1F, 0x11, 0x11, 0x11],
        'B' => [0x1E, 0x11, 0x11, 0x1E, 0x11, 0x11, 0x1E],
        'C' => [0x0E, 0x11, 0x10, 0x10, 0x10, 0x11, 0x0E],
        'D' => [0x1C, 0x12, 0x11, 0x11, 0x11, 0x12, 0x1C],
        'E' => [0x1F, 0x10, 0x10, 0x1E, 0x10, 0x10, 0x1F],
        'F' => [0x1F, 0x10, 0x10, 0x1E, 0x10, 0x10, 0x10],
        'G' => [0x0E, 0x11, 0x10, 0x17, 0x11, 0x11, 0x0F],
        'H' => [0x11, 0x11, 0x11, 0x1F, 0x11, 0x11, 0x11],
        'I' => [0x0E, 0x04, 0x04, 0x04, 0x04, 0x04, 0x0E],
        'J' => [0x07, 0x02, 0x02, 0x02, 0x02, 0x12, 0x0C],
        'K' => [0x11, 0x12, 0x14, 0x18, 0x14, 0x12, 0x11],
        'L' => [0x10, 0x10, 0x10, 0x10, 0x10, 0x10, 0x1F],
        'M' => [0x11, 0x1B, 0x15, 0x15, 0x11, 0x11, 0x11],
        'N' => [0x11, 0x19, 0x15, 0x13, 0x11, 0x11, 0x11],
        'O' => [0x0E, 0x11, 0x11, 0x11, 0x11, 0x11, 0x0E],
        'P' => [0x1E, 0x11, 0x11, 0x1E, 0x10, 0x10, 0x10],
        'Q' => [0x0E, 0x11, 0x11, 0x11, 0x15, 0x12, 0x0D],
        'R' => [0x1E, 0x11, 0x11, 0x1E, 0x14, 0x12, 0x11],
        'S' => [0x0F, 0x10, 0x10, 0x0E, 0x01, 0x01, 0x1E],
        'T' => [0x1F, 0x04, 0x04, 0x04, 0x04, 0x04, 0x04],
        'U' => [0x11, 0x11, 0x11, 0x11, 0x11, 0x11, 0x0E],
        'V' => [0x11, 0x11, 0x11, 0x11, 0x11, 0x0A, 0x04],
        'W' => [0x11, 0x11, 0x11, 0x15, 0x15, 0x15, 0x0A],
        'X' => [0x11, 0x11, 0x0A, 0x04, 0x0A, 0x11, 0x11],
        'Y' => [0x11, 0x11, 0x0A, 0x04, 0x04, 0x04, 0x04],
        'Z' => [0x1F, 0x01, 0x02, 0x04, 0x08, 0x10, 0x1F],
        ':' => [0x00, 0x04, 0x04, 0x00, 0x04, 0x04, 0x00],
        '.' => [0x00, 0x00, 0x00, 0x00, 0x00, 0x0C, 0x0C],
        ',' => [0x00, 0x00, 0x00, 0x00, 0x0C, 0x04, 0x08],
        '-' => [0x00, 0x00, 0x00, 0x0E, 0x00, 0x00, 0x00],
        '_' => [0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x1F],
        '%' => [0x18, 0x19, 0x02, 0x04, 0x08, 0x13, 0x03],
        '/' => [0x01, 0x01, 0x02, 0x04, 0x08, 0x10, 0x10],
        '(' => [0x02, 0x04, 0x08, 0x08, 0x08, 0x04, 0x02],
        ')' => [0x08, 0x04, 0x02, 0x02, 0x02, 0x04, 0x08],
        // Unknown characters render as a hollow box.
        _ => [0x1F, 0x11, 0x11, 0x11, 0x11, 0x11, 0x1F],
    }
}

fn draw_char(img: &mut RgbImage, c: char, x: i64, y: i64, color: Rgb<u8>, scale: u32) {
    let rows = glyph(c);
    let (w, h) = img.dimensions();
    for (row, bits) in rows.iter().enumerate() {
        for col in 0..GLYPH_WIDTH {
            if bits & (1 << (GLYPH_WIDTH - 1 - col)) == 0 {
                continue;
            }
            for dy in 0..scale {
                for dx in 0..scale {
                    let px = x + (col * scale + dx) as i64;
                    let py = y + (row as u32 * scale + dy) as i64;
                    if px >= 0 && py >= 0 && (px as u32) < w && (py as u32) < h {
                        img.put_pixel(px as u32, py as u32, color);
                    }
                }
            }
        }
    }
}

/// Draws `text` with its top-left corner at (x, y). Pixels outside the
/// buffer are clipped.
pub(crate) fn draw_text(
    img: &mut RgbImage,
    text: &str,
    x: i64,
    y: i64,
    color: Rgb<u8>,
    scale: u32,
) {
    let mut cursor = x;
    for c in text.chars() {
        draw_char(img, c, cursor, y, color, scale);
        cursor += (GLYPH_ADVANCE * scale) as i64;
    }
}

/// Draws `text` top-to-bottom, one character per line, for axis titles.
fn draw_text_vertical(img: &mut RgbImage, text: &str, x: i64, y: i64, color: Rgb<u8>, scale: u32) {
    let mut cursor = y;
    for c in text.chars() {
        draw_char(img, c, x, cursor, color, scale);
        cursor += ((GLYPH_HEIGHT + 2) * scale) as i64;
    }
}

pub(crate) fn text_width(text: &str, scale: u32) -> u32 {
    text.chars().count() as u32 * GLYPH_ADVANCE * scale
}

fn fill_rect(img: &mut RgbImage, x: u32, y: u32, width: u32, height: u32, color: Rgb<u8>) {
    let (w, h) = img.dimensions();
    for py in y..(y + height).min(h) {
        for px in x..(x + width).min(w) {
            img.put_pixel(px, py, color);
        }
    }
}

fn outline_rect(img: &mut RgbImage, x: u32, y: u32, width: u32, height: u32, color: Rgb<u8>) {
    if width == 0 || height == 0 {
        return;
    }
    fill_rect(img, x, y, width, 1, color);
    fill_rect(img, x, y + height - 1, width, 1, color);
    fill_rect(img, x, y, 1, height, color);
    fill_rect(img, x + width - 1, y, 1, height, color);
}

fn lerp_channel(from: u8, to: u8, t: f64) -> u8 {
    (from as f64 + (to as f64 - from as f64) * t).round() as u8
}

fn heat_color(t: f64) -> Rgb<u8> {
    Rgb([
        lerp_channel(WHITE.0[0], HEAT_BLUE.0[0], t),
        lerp_channel(WHITE.0[1], HEAT_BLUE.0[1], t),
        lerp_channel(WHITE.0[2], HEAT_BLUE.0[2], t),
    ])
}

fn truncate(name: &str, max_chars: usize) -> String {
    if name.chars().count() <= max_chars {
        name.to_string()
    } else {
        name.chars().take(max_chars.saturating_sub(1)).collect::<String>() + "."
    }
}

const CELL: u32 = 64;
const MARGIN_LEFT: u32 = 130;
const MARGIN_TOP: u32 = 50;
const MARGIN_RIGHT: u32 = 30;
const MARGIN_BOTTOM: u32 = 90;

/// Renders the confusion matrix as an annotated heatmap: white-to-blue cell
/// shading scaled by count, counts printed in each cell, class names along
/// both axes, "Predicted Label" / "True Label" axis titles and a
/// "Confusion Matrix" title.
pub fn render_confusion_matrix(cm: &ConfusionMatrix, class_names: &[String]) -> RgbImage {
    let n = cm.num_classes() as u32;
    let width = MARGIN_LEFT + n * CELL + MARGIN_RIGHT;
    let height = MARGIN_TOP + n * CELL + MARGIN_BOTTOM;
    let mut img = RgbImage::from_pixel(width, height, WHITE);

    let title = "Confusion Matrix";
    draw_text(
        &mut img,
        title,
        (width as i64 - text_width(title, 2) as i64) / 2,
        14,
        BLACK,
        2,
    );

    let max_count = cm.max_count();
    for i in 0..n {
        for j in 0..n {
            let count = cm.get(i as usize, j as usize);
            let t = if max_count > 0 {
                count as f64 / max_count as f64
            } else {
                0.0
            };
            let x = MARGIN_LEFT + j * CELL;
            let y = MARGIN_TOP + i * CELL;
            fill_rect(&mut img, x, y, CELL, CELL, heat_color(t));
            outline_rect(&mut img, x, y, CELL, CELL, GRID_GRAY);

            // Annotate the count, light on dark cells.
            let label = count.to_string();
            let color = if t > 0.5 { WHITE } else { BLACK };
            let tx = x as i64 + (CELL as i64 - text_width(&label, 2) as i64) / 2;
            let ty = y as i64 + (CELL as i64 - (GLYPH_HEIGHT * 2) as i64) / 2;
            draw_text(&mut img, &label, tx, ty, color, 2);
        }
    }

    // Row tick labels (true classes), right-aligned against the matrix.
    for (i, name) in class_names.iter().enumerate() {
        let label = truncate(name, 16);
        let tx = MARGIN_LEFT as i64 - 8 - text_width(&label, 1) as i64;
        let ty = MARGIN_TOP as i64 + i as i64 * CELL as i64 + (CELL - GLYPH_HEIGHT) as i64 / 2;
        draw_text(&mut img, &label, tx, ty, BLACK, 1);
    }

    // Column tick labels (predicted classes), centered under each column.
    let tick_budget = (CELL / GLYPH_ADVANCE) as usize;
    for (j, name) in class_names.iter().enumerate() {
        let label = truncate(name, tick_budget);
        let cx = MARGIN_LEFT as i64 + j as i64 * CELL as i64 + CELL as i64 / 2;
        let tx = cx - text_width(&label, 1) as i64 / 2;
        let ty = (MARGIN_TOP + n * CELL + 10) as i64;
        draw_text(&mut img, &label, tx, ty, BLACK, 1);
    }

    let x_title = "Predicted Label";
    draw_text(
        &mut img,
        x_title,
        MARGIN_LEFT as i64 + (n * CELL) as i64 / 2 - text_width(x_title, 1) as i64 / 2,
        (height - 40) as i64,
        BLACK,
        1,
    );

    let y_title = "True Label";
    let y_title_height = y_title.chars().count() as i64 * (GLYPH_HEIGHT + 2) as i64;
    draw_text_vertical(
        &mut img,
        y_title,
        10,
        MARGIN_TOP as i64 + (n * CELL) as i64 / 2 - y_title_height / 2,
        BLACK,
        1,
    );

    img
}

const TILE: u32 = 150;
const CAPTION_HEIGHT: u32 = 26;
const GRID_PADDING: u32 = 10;
const GRID_COLUMNS: u32 = 5;

/// Renders the sampled predictions as an image grid, five tiles per row.
/// Each tile shows the resized test image with its actual and predicted
/// class names underneath, green when they agree and red when they do not.
pub fn render_sample_grid(
    images: &[RgbImage],
    y_true: &[usize],
    y_pred: &[usize],
    class_names: &[String],
    indices: &[usize],
) -> RgbImage {
    let rows = (indices.len() as u32).div_ceil(GRID_COLUMNS).max(1);
    let width = GRID_PADDING + GRID_COLUMNS * (TILE + GRID_PADDING);
    let height = GRID_PADDING + rows * (TILE + CAPTION_HEIGHT + GRID_PADDING);
    let mut img = RgbImage::from_pixel(width, height, WHITE);

    let caption_budget = (TILE / GLYPH_ADVANCE) as usize;
    for (slot, &index) in indices.iter().enumerate() {
        let col = slot as u32 % GRID_COLUMNS;
        let row = slot as u32 / GRID_COLUMNS;
        let x = GRID_PADDING + col * (TILE + GRID_PADDING);
        let y = GRID_PADDING + row * (TILE + CAPTION_HEIGHT + GRID_PADDING);

        let tile = imageops::resize(&images[index], TILE, TILE, imageops::FilterType::Triangle);
        imageops::replace(&mut img, &tile, x as i64, y as i64);
        outline_rect(&mut img, x, y, TILE, TILE, GRID_GRAY);

        let actual = &class_names[y_true[index]];
        let predicted = &class_names[y_pred[index]];
        let color = if y_true[index] == y_pred[index] {
            CORRECT_GREEN
        } else {
            INCORRECT_RED
        };
        let caption_y = (y + TILE + 3) as i64;
        draw_text(
            &mut img,
            &truncate(&format!("Actual: {}", actual), caption_budget),
            x as i64,
            caption_y,
            color,
            1,
        );
        draw_text(
            &mut img,
            &truncate(&format!("Pred: {}", predicted), caption_budget),
            x as i64,
            caption_y + (GLYPH_HEIGHT + 3) as i64,
            color,
            1,
        );
    }

    img
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::ConfusionMatrix;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_heatmap_dimensions_scale_with_classes() {
        let cm = ConfusionMatrix::from_labels(3, &[0, 1, 2], &[0, 1, 2]).unwrap();
        let img = render_confusion_matrix(&cm, &names(&["a", "b", "c"]));
        assert_eq!(img.width(), MARGIN_LEFT + 3 * CELL + MARGIN_RIGHT);
        assert_eq!(img.height(), MARGIN_TOP + 3 * CELL + MARGIN_BOTTOM);
    }

    #[test]
    fn test_diagonal_cells_are_darker_than_empty_cells() {
        let cm = ConfusionMatrix::from_labels(2, &[0, 0, 1, 1], &[0, 0, 1, 1]).unwrap();
        let img = render_confusion_matrix(&cm, &names(&["a", "b"]));
        // Center of cell (0,0) holds all of class 0; cell (0,1) is empty.
        let hit = img.get_pixel(MARGIN_LEFT + CELL / 4, MARGIN_TOP + CELL / 4);
        let miss = img.get_pixel(MARGIN_LEFT + CELL + CELL / 4, MARGIN_TOP + CELL / 4);
        assert!(hit.0[2] < 255);
        assert_eq!(miss.0, WHITE.0);
    }

    #[test]
    fn test_grid_holds_all_requested_tiles() {
        let images: Vec<RgbImage> = (0..7).map(|_| RgbImage::from_pixel(8, 8, WHITE)).collect();
        let y_true = vec![0, 0, 0, 1, 1, 1, 1];
        let y_pred = vec![0, 1, 0, 1, 1, 0, 1];
        let indices: Vec<usize> = (0..7).collect();
        let img = render_sample_grid(&images, &y_true, &y_pred, &names(&["a", "b"]), &indices);
        // Seven tiles need two rows of five columns.
        assert_eq!(img.width(), GRID_PADDING + GRID_COLUMNS * (TILE + GRID_PADDING));
        assert_eq!(img.height(), GRID_PADDING + 2 * (TILE + CAPTION_HEIGHT + GRID_PADDING));
    }

    #[test]
    fn test_text_width_accounts_for_scale() {
        assert_eq!(text_width("abc", 1), 3 * GLYPH_ADVANCE);
        assert_eq!(text_width("abc", 2), 6 * GLYPH_ADVANCE);
    }
}
