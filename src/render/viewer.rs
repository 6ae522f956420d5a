//! Software viewer producing RGB frames.
//!
//! Layout: nine square boxes centred on the canvas, spaced 1.1 box sizes
//! apart, separated by two vertical and two horizontal black grid lines.
//! Empty boxes are white, player 0 is red, player 1 is green.

use serde::{Deserialize, Serialize};

use crate::core::{Board, Player, BOARD_CELLS};
use crate::error::ConfigError;

const WHITE: [u8; 3] = [255, 255, 255];
const BLACK: [u8; 3] = [0, 0, 0];
const RED: [u8; 3] = [255, 0, 0];
const GREEN: [u8; 3] = [0, 255, 0];

/// Spacing between box centres, in box sizes.
const BOX_SPACING: f32 = 1.1;

/// Grid line offset from the centre, in box sizes.
const LINE_SPACING: f32 = 1.05;

/// Canvas geometry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub width: u32,
    pub height: u32,
    /// Side length of one box in pixels.
    pub cell_size: u32,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            width: 600,
            height: 400,
            cell_size: 50,
        }
    }
}

impl ViewerConfig {
    /// Half the side of the square the grid occupies.
    fn grid_half_extent(&self) -> f32 {
        self.cell_size as f32 * BOX_SPACING * 1.5
    }

    /// The grid must fit on the canvas.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cell_size == 0 {
            return Err(ConfigError::Invalid {
                message: "viewer cell_size must be positive".to_string(),
            });
        }
        let extent = 2.0 * self.grid_half_extent();
        if extent > self.width as f32 || extent > self.height as f32 {
            return Err(ConfigError::Invalid {
                message: format!(
                    "viewer {}x{} too small for cell_size {}",
                    self.width, self.height, self.cell_size
                ),
            });
        }
        Ok(())
    }
}

/// An RGB image, row-major, `y = 0` at the top.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    /// `width * height * 3` bytes.
    pub pixels: Vec<u8>,
}

impl Frame {
    fn filled(width: u32, height: u32, colour: [u8; 3]) -> Self {
        let pixels = colour
            .iter()
            .copied()
            .cycle()
            .take(width as usize * height as usize * 3)
            .collect();
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Colour at `(x, y)`, or `None` outside the frame.
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 3]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 3;
        Some([self.pixels[i], self.pixels[i + 1], self.pixels[i + 2]])
    }

    /// Array shape `(height, width, 3)`.
    #[must_use]
    pub fn shape(&self) -> [usize; 3] {
        [self.height as usize, self.width as usize, 3]
    }

    fn fill_rect(&mut self, rect: &Rect, colour: [u8; 3]) {
        let x0 = rect.left.max(0.0).round() as u32;
        let x1 = (rect.right.round() as u32).min(self.width);
        let y0 = rect.top.max(0.0).round() as u32;
        let y1 = (rect.bottom.round() as u32).min(self.height);
        for y in y0..y1 {
            for x in x0..x1 {
                let i = (y as usize * self.width as usize + x as usize) * 3;
                self.pixels[i..i + 3].copy_from_slice(&colour);
            }
        }
    }
}

/// Axis-aligned rectangle in pixel space.
#[derive(Clone, Copy, Debug, PartialEq)]
struct Rect {
    left: f32,
    right: f32,
    top: f32,
    bottom: f32,
}

/// Precomputed scene; created on first render and dropped on close.
#[derive(Clone, Debug)]
pub struct Viewer {
    config: ViewerConfig,
    boxes: [Rect; BOARD_CELLS],
    lines: Vec<Rect>,
}

impl Viewer {
    pub fn new(config: ViewerConfig) -> Self {
        let size = config.cell_size as f32;
        let cx = (config.width / 2) as f32;
        let cy = (config.height / 2) as f32;

        let boxes = std::array::from_fn(|i| {
            let x = ((i % 3) as f32 - 1.0) * size * BOX_SPACING + cx;
            let y = ((i / 3) as f32 - 1.0) * size * BOX_SPACING + cy;
            Rect {
                left: x - size / 2.0,
                right: x + size / 2.0,
                top: y - size / 2.0,
                bottom: y + size / 2.0,
            }
        });

        let half = config.grid_half_extent();
        let mut lines = Vec::with_capacity(4);
        for i in 0..2 {
            let offset = -(size / 2.0).floor() * LINE_SPACING + i as f32 * size * LINE_SPACING;
            // vertical
            lines.push(Rect {
                left: cx + offset,
                right: cx + offset + 1.0,
                top: cy - half,
                bottom: cy + half,
            });
            // horizontal
            lines.push(Rect {
                left: cx - half,
                right: cx + half,
                top: cy + offset,
                bottom: cy + offset + 1.0,
            });
        }

        Self {
            config,
            boxes,
            lines,
        }
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    /// Pixel centre of box `idx`.
    #[must_use]
    pub fn box_centre(&self, idx: usize) -> Option<(u32, u32)> {
        self.boxes.get(idx).map(|r| {
            (
                ((r.left + r.right) / 2.0).round() as u32,
                ((r.top + r.bottom) / 2.0).round() as u32,
            )
        })
    }

    /// Draw `board` into a fresh frame.
    pub fn draw(&self, board: &Board) -> Frame {
        let mut frame = Frame::filled(self.config.width, self.config.height, WHITE);
        for (i, rect) in self.boxes.iter().enumerate() {
            let colour = match board.get(i) {
                None => WHITE,
                Some(Player::Zero) => RED,
                Some(Player::One) => GREEN,
            };
            frame.fill_rect(rect, colour);
        }
        for line in &self.lines {
            frame.fill_rect(line, BLACK);
        }
        frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_dimensions() {
        let viewer = Viewer::new(ViewerConfig::default());
        let frame = viewer.draw(&Board::new());
        assert_eq!(frame.shape(), [400, 600, 3]);
        assert_eq!(frame.pixels.len(), 600 * 400 * 3);
    }

    #[test]
    fn test_empty_board_is_white_boxes() {
        let viewer = Viewer::new(ViewerConfig::default());
        let frame = viewer.draw(&Board::new());
        for i in 0..9 {
            let (x, y) = viewer.box_centre(i).unwrap();
            assert_eq!(frame.pixel(x, y), Some(WHITE));
        }
    }

    #[test]
    fn test_marks_are_coloured() {
        let viewer = Viewer::new(ViewerConfig::default());
        let board = Board::from_codes([0, 2, 2, 2, 1, 2, 2, 2, 2]).unwrap();
        let frame = viewer.draw(&board);

        let (x, y) = viewer.box_centre(0).unwrap();
        assert_eq!(frame.pixel(x, y), Some(RED));
        let (x, y) = viewer.box_centre(4).unwrap();
        assert_eq!(frame.pixel(x, y), Some(GREEN));
    }

    #[test]
    fn test_box_layout_top_left_first() {
        let viewer = Viewer::new(ViewerConfig::default());
        assert_eq!(viewer.box_centre(4), Some((300, 200)));
        assert_eq!(viewer.box_centre(0), Some((245, 145)));
        assert_eq!(viewer.box_centre(8), Some((355, 255)));
        assert_eq!(viewer.box_centre(9), None);
    }

    #[test]
    fn test_grid_lines_are_black() {
        let viewer = Viewer::new(ViewerConfig::default());
        let frame = viewer.draw(&Board::new());
        // Vertical line left of the centre column, at the centre row.
        assert_eq!(frame.pixel(274, 200), Some(BLACK));
        // Horizontal line above the centre row.
        assert_eq!(frame.pixel(300, 174), Some(BLACK));
        // Outside the grid.
        assert_eq!(frame.pixel(10, 10), Some(WHITE));
    }

    #[test]
    fn test_pixel_out_of_bounds() {
        let frame = Frame::filled(2, 2, BLACK);
        assert_eq!(frame.pixel(2, 0), None);
        assert_eq!(frame.pixel(1, 1), Some(BLACK));
    }

    #[test]
    fn test_viewer_config_validate() {
        assert!(ViewerConfig::default().validate().is_ok());
        let small = ViewerConfig {
            width: 100,
            height: 100,
            cell_size: 50,
        };
        assert!(small.validate().is_err());
        let zero = ViewerConfig {
            cell_size: 0,
            ..ViewerConfig::default()
        };
        assert!(zero.validate().is_err());
    }
}
