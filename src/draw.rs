// Window + software drawing utilities for the demo host.
// Visual effects provided here:
// 1) A resizable window showing the current shape, its paint and the skeleton.
// 2) A crosshair that follows your mouse.
// 3) A tiny 5x7 bitmap font to render the HUD on top.

use minifb::{Key, KeyRepeat, MouseButton, MouseMode, Window, WindowOptions};

use shape_trace::paint::{PaintSurface, RasterSurface};
use shape_trace::types::{FrameBuffer, Point, Silhouette};
use shape_trace::{Error, WorldTransform};

pub const BACKGROUND: u32 = 0x00_20_22_28;
pub const SHAPE_GREY: u32 = 0x00_6A_6E_78;

pub struct Drawer {
    window: Window, // the on-screen window you see
}

impl Drawer {
    /// Visual: a new empty window appears with your chosen title. It can be resized.
    pub fn new(title: &str, width: usize, height: usize) -> Result<Self, Error> {
        let options = WindowOptions { resize: true, ..WindowOptions::default() };
        let mut window =
            Window::new(title, width, height, options).map_err(|e| Error::WindowInit(e.to_string()))?;
        window.set_target_fps(60);
        Ok(Self { window })
    }

    /// Push the pixels for this frame to the screen.
    pub fn present(&mut self, framebuffer: &FrameBuffer) -> Result<(), Error> {
        self.window
            .update_with_buffer(&framebuffer.pixels, framebuffer.width, framebuffer.height)
            .map_err(|e| Error::WindowUpdate(e.to_string()))?;
        Ok(())
    }

    /// Returns false when the user closes the window (so we can stop the loop).
    pub fn is_open(&self) -> bool {
        self.window.is_open()
    }

    /// Current client area in pixels; changes when the user resizes the window.
    pub fn size(&self) -> (usize, usize) {
        self.window.get_size()
    }

    pub fn esc_pressed(&self) -> bool {
        self.window.is_key_down(Key::Escape)
    }

    /// Mouse position in window pixels, None while the cursor is outside.
    pub fn mouse_pos(&self) -> Option<(f64, f64)> {
        self.window.get_mouse_pos(MouseMode::Discard).map(|(x, y)| (x as f64, y as f64))
    }

    pub fn left_mouse_down(&self) -> bool {
        self.window.get_mouse_down(MouseButton::Left)
    }

    /// Visual: the paint disappears and the skeleton turns yellow again.
    pub fn r_pressed_once(&self) -> bool {
        self.window.is_key_pressed(Key::R, KeyRepeat::No)
    }

    // we flip a boolean in main to show/hide the skeleton overlay.
    pub fn s_pressed_once(&self) -> bool {
        self.window.is_key_pressed(Key::S, KeyRepeat::No)
    }
}

/// Mouse button edges between two frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerEdge {
    Pressed,
    Held,
    Released,
    Up,
}

#[derive(Debug, Default)]
pub struct PointerTracker {
    was_down: bool,
}

impl PointerTracker {
    pub fn update(&mut self, down: bool) -> PointerEdge {
        let edge = match (self.was_down, down) {
            (false, true) => PointerEdge::Pressed,
            (true, true) => PointerEdge::Held,
            (true, false) => PointerEdge::Released,
            (false, false) => PointerEdge::Up,
        };
        self.was_down = down;
        edge
    }
}

/* ---------- Software drawing: pixels, lines, crosshair, composition ---------- */

/// Put a pixel on the framebuffer if (x,y) is inside bounds.
#[inline]
fn put_pixel(fb: &mut FrameBuffer, x: i32, y: i32, color: u32) {
    if x < 0 || y < 0 {
        return;
    }
    let (x, y) = (x as usize, y as usize);
    if x >= fb.width || y >= fb.height {
        return;
    }
    let idx = y * fb.width + x;
    fb.pixels[idx] = color;
}

/// Mix `src` over `dst` (both 0x00RRGGBB) with `alpha` in 0..=255.
#[inline]
fn mix(dst: u32, src: u32, alpha: u32) -> u32 {
    let ch = |shift: u32| {
        let d = (dst >> shift) & 0xFF;
        let s = (src >> shift) & 0xFF;
        ((s * alpha + d * (255 - alpha)) / 255) << shift
    };
    ch(16) | ch(8) | ch(0)
}

/// Draw a thin line between (x0,y0) and (x1,y1) using Bresenham.
/// Visual: a straight 1-pixel line appears on top of the shape.
pub fn draw_line(fb: &mut FrameBuffer, x0: i32, y0: i32, x1: i32, y1: i32, color: u32) {
    let (mut x0, mut y0, x1, y1) = (x0, y0, x1, y1);
    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;
    loop {
        put_pixel(fb, x0, y0, color);
        if x0 == x1 && y0 == y1 { break; }
        let e2 = 2 * err;
        if e2 >= dy { err += dy; x0 += sx; }
        if e2 <= dx { err += dx; y0 += sy; }
    }
}

/// Draw a small crosshair centered at (cx,cy).
/// Visual: a "+" shape (with a tiny gap at the center) follows your mouse.
pub fn draw_crosshair(fb: &mut FrameBuffer, cx: i32, cy: i32, size: i32, color: u32) {
    draw_line(fb, cx - size, cy, cx - 2, cy, color);
    draw_line(fb, cx + 2, cy, cx + size, cy, color);
    draw_line(fb, cx, cy - size, cx, cy - 2, color);
    draw_line(fb, cx, cy + 2, cx, cy + size, color);
    put_pixel(fb, cx, cy, color);
}

/// Visual: the whole frame takes on a colour cast (used for the red failure flash).
pub fn tint(fb: &mut FrameBuffer, color: u32, alpha: u32) {
    let alpha = alpha.min(255);
    for px in &mut fb.pixels {
        *px = mix(*px, color, alpha);
    }
}

/// Visual: a darkened strip behind the HUD text.
pub fn shade_rect(fb: &mut FrameBuffer, x: usize, y: usize, w: usize, h: usize, alpha: u32) {
    for yy in y..(y + h).min(fb.height) {
        for xx in x..(x + w).min(fb.width) {
            let idx = yy * fb.width + xx;
            fb.pixels[idx] = mix(fb.pixels[idx], 0, alpha.min(255));
        }
    }
}

/// Darken a full-width band at the top of the frame (HUD backdrop).
pub fn shade_top_bar(fb: &mut FrameBuffer, h: usize, alpha: u32) {
    let width = fb.width;
    shade_rect(fb, 0, 0, width, h, alpha);
}

/// Background, then the silhouette in grey, then the painted raster on top.
/// Each screen pixel samples the nearest silhouette pixel (nearest-neighbour scale).
pub fn compose_shape(
    fb: &mut FrameBuffer,
    silhouette: &Silhouette,
    paint: Option<&PaintSurface>,
    transform: &WorldTransform,
) {
    fb.pixels.fill(BACKGROUND);

    // Only visit the screen rectangle the shape maps onto.
    let top_left = transform.apply_point(Point::new(0.0, 0.0));
    let bottom_right =
        transform.apply_point(Point::new(silhouette.width as f64, silhouette.height as f64));
    let x0 = top_left.x.floor().max(0.0) as usize;
    let y0 = top_left.y.floor().max(0.0) as usize;
    let x1 = (bottom_right.x.ceil().max(0.0) as usize).min(fb.width);
    let y1 = (bottom_right.y.ceil().max(0.0) as usize).min(fb.height);

    for sy in y0..y1 {
        for sx in x0..x1 {
            let local = transform.invert(Point::new(sx as f64 + 0.5, sy as f64 + 0.5));
            if local.x < 0.0 || local.y < 0.0 {
                continue;
            }
            let (lx, ly) = (local.x as usize, local.y as usize);
            if lx >= silhouette.width || ly >= silhouette.height {
                continue;
            }

            let idx = sy * fb.width + sx;
            let a = silhouette.alpha(lx, ly) as u32;
            let mut px = mix(fb.pixels[idx], SHAPE_GREY, a);
            if let Some(surface) = paint {
                let p = surface.get_pixel(lx, ly);
                if p.a > 0 {
                    let rgb = ((p.r as u32) << 16) | ((p.g as u32) << 8) | p.b as u32;
                    px = mix(px, rgb, p.a as u32);
                }
            }
            fb.pixels[idx] = px;
        }
    }
}

/* ---------- 5x7 bitmap font (uppercase ASCII, digits and HUD punctuation) ---------- */

/// Return a 5x7 glyph bitmap for a limited character set.
/// Each u8 is a row; the low 5 bits are the pixels (bit 4 = leftmost).
fn glyph5x7(ch: char) -> Option<[u8; 7]> {
    // Helper macro to define a glyph quickly
    macro_rules! g { ($a:expr,$b:expr,$c:expr,$d:expr,$e:expr,$f:expr,$g:expr) => {
        Some([$a,$b,$c,$d,$e,$f,$g])
    }; }

    match ch.to_ascii_uppercase() {
        '0' => g!(0b01110,0b10001,0b10011,0b10101,0b11001,0b10001,0b01110),
        '1' => g!(0b00100,0b01100,0b00100,0b00100,0b00100,0b00100,0b01110),
        '2' => g!(0b01110,0b10001,0b00001,0b00010,0b00100,0b01000,0b11111),
        '3' => g!(0b11110,0b00001,0b00001,0b01110,0b00001,0b00001,0b11110),
        '4' => g!(0b00010,0b00110,0b01010,0b10010,0b11111,0b00010,0b00010),
        '5' => g!(0b11111,0b10000,0b11110,0b00001,0b00001,0b10001,0b01110),
        '6' => g!(0b00110,0b01000,0b10000,0b11110,0b10001,0b10001,0b01110),
        '7' => g!(0b11111,0b00001,0b00010,0b00100,0b01000,0b01000,0b01000),
        '8' => g!(0b01110,0b10001,0b10001,0b01110,0b10001,0b10001,0b01110),
        '9' => g!(0b01110,0b10001,0b10001,0b01111,0b00001,0b00010,0b01100),

        'A' => g!(0b01110,0b10001,0b10001,0b11111,0b10001,0b10001,0b10001),
        'B' => g!(0b11110,0b10001,0b10001,0b11110,0b10001,0b10001,0b11110),
        'C' => g!(0b01110,0b10001,0b10000,0b10000,0b10000,0b10001,0b01110),
        'D' => g!(0b11100,0b10010,0b10001,0b10001,0b10001,0b10010,0b11100),
        'E' => g!(0b11111,0b10000,0b10000,0b11110,0b10000,0b10000,0b11111),
        'F' => g!(0b11111,0b10000,0b10000,0b11110,0b10000,0b10000,0b10000),
        'G' => g!(0b01110,0b10001,0b10000,0b10111,0b10001,0b10001,0b01111),
        'H' => g!(0b10001,0b10001,0b10001,0b11111,0b10001,0b10001,0b10001),
        'I' => g!(0b01110,0b00100,0b00100,0b00100,0b00100,0b00100,0b01110),
        'J' => g!(0b00111,0b00010,0b00010,0b00010,0b00010,0b10010,0b01100),
        'K' => g!(0b10001,0b10010,0b10100,0b11000,0b10100,0b10010,0b10001),
        'L' => g!(0b10000,0b10000,0b10000,0b10000,0b10000,0b10000,0b11111),
        'M' => g!(0b10001,0b11011,0b10101,0b10101,0b10001,0b10001,0b10001),
        'N' => g!(0b10001,0b10001,0b11001,0b10101,0b10011,0b10001,0b10001),
        'O' => g!(0b01110,0b10001,0b10001,0b10001,0b10001,0b10001,0b01110),
        'P' => g!(0b11110,0b10001,0b10001,0b11110,0b10000,0b10000,0b10000),
        'Q' => g!(0b01110,0b10001,0b10001,0b10001,0b10101,0b10010,0b01101),
        'R' => g!(0b11110,0b10001,0b10001,0b11110,0b10100,0b10010,0b10001),
        'S' => g!(0b01111,0b10000,0b10000,0b01110,0b00001,0b00001,0b11110),
        'T' => g!(0b11111,0b00100,0b00100,0b00100,0b00100,0b00100,0b00100),
        'U' => g!(0b10001,0b10001,0b10001,0b10001,0b10001,0b10001,0b01110),
        'V' => g!(0b10001,0b10001,0b10001,0b10001,0b10001,0b01010,0b00100),
        'W' => g!(0b10001,0b10001,0b10001,0b10101,0b10101,0b10101,0b01010),
        'X' => g!(0b10001,0b10001,0b01010,0b00100,0b01010,0b10001,0b10001),
        'Y' => g!(0b10001,0b10001,0b01010,0b00100,0b00100,0b00100,0b00100),
        'Z' => g!(0b11111,0b00001,0b00010,0b00100,0b01000,0b10000,0b11111),

        ' ' => g!(0b00000,0b00000,0b00000,0b00000,0b00000,0b00000,0b00000),
        '|' => g!(0b00100,0b00100,0b00100,0b00100,0b00100,0b00100,0b00100),
        ':' => g!(0b00000,0b00100,0b00000,0b00000,0b00100,0b00000,0b00000),
        '.' => g!(0b00000,0b00000,0b00000,0b00000,0b00000,0b00100,0b00000),
        '%' => g!(0b11000,0b11001,0b00010,0b00100,0b01000,0b10011,0b00011),
        '-' => g!(0b00000,0b00000,0b00000,0b11111,0b00000,0b00000,0b00000),
        '/' => g!(0b00000,0b00001,0b00010,0b00100,0b01000,0b10000,0b00000),
        '!' => g!(0b00100,0b00100,0b00100,0b00100,0b00100,0b00000,0b00100),
        '_' => g!(0b00000,0b00000,0b00000,0b00000,0b00000,0b00000,0b11111),
        ',' => g!(0b00000,0b00000,0b00000,0b00000,0b00000,0b00100,0b01000),
        '\'' => g!(0b00100,0b00100,0b01000,0b00000,0b00000,0b00000,0b00000),
        '(' => g!(0b00010,0b00100,0b01000,0b01000,0b01000,0b00100,0b00010),
        ')' => g!(0b01000,0b00100,0b00010,0b00010,0b00010,0b00100,0b01000),
        '+' => g!(0b00000,0b00100,0b00100,0b11111,0b00100,0b00100,0b00000),
        '?' => g!(0b01110,0b10001,0b00001,0b00010,0b00100,0b00000,0b00100),

        _ => None,
    }
}

/// Draw a single 5x7 character at (x,y); characters without a glyph draw as '?'.
/// Visual: a tiny glyph appears with a 1-pixel black shadow for contrast.
fn draw_char_5x7(fb: &mut FrameBuffer, x: i32, y: i32, ch: char, color: u32) {
    if let Some(rows) = glyph5x7(ch).or_else(|| glyph5x7('?')) {
        // Shadow pass first, then the glyph in the chosen color
        for (offset, c) in [(1, 0x00000000), (0, color)] {
            for (ry, rowbits) in rows.iter().enumerate() {
                for rx in 0..5 {
                    if (rowbits & (1 << (4 - rx))) != 0 {
                        put_pixel(fb, x + rx as i32 + offset, y + ry as i32 + offset, c);
                    }
                }
            }
        }
    }
}

/// Draw a text string using 5x7 glyphs; lowercase renders as uppercase.
pub fn draw_text_5x7(fb: &mut FrameBuffer, mut x: i32, y: i32, text: &str, color: u32) {
    for ch in text.chars() {
        draw_char_5x7(fb, x, y, ch, color);
        x += 6; // 5 pixels glyph width + 1 pixel spacing
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pointer_edges_follow_button_state() {
        let mut t = PointerTracker::default();
        assert_eq!(t.update(false), PointerEdge::Up);
        assert_eq!(t.update(true), PointerEdge::Pressed);
        assert_eq!(t.update(true), PointerEdge::Held);
        assert_eq!(t.update(false), PointerEdge::Released);
    }

    #[test]
    fn mix_endpoints() {
        assert_eq!(mix(0x00_10_20_30, 0x00_FF_FF_FF, 0), 0x00_10_20_30);
        assert_eq!(mix(0x00_10_20_30, 0x00_FF_00_FF, 255), 0x00_FF_00_FF);
    }

    #[test]
    fn every_hud_character_has_a_glyph() {
        for ch in "PROGRESS: 99.5% | R: RESET S: SKELETON ESC: QUIT - done/again!".chars() {
            assert!(glyph5x7(ch).is_some(), "missing glyph for {ch:?}");
        }
    }

    #[test]
    fn top_bar_spans_the_frame_width() {
        let mut fb = FrameBuffer::new(20, 10);
        fb.pixels.fill(0x00_FF_FF_FF);
        shade_top_bar(&mut fb, 4, 255);
        assert!(fb.pixels[..20 * 4].iter().all(|&p| p == 0));
        assert!(fb.pixels[20 * 4..].iter().all(|&p| p == 0x00_FF_FF_FF));
    }

    #[test]
    fn file_stem_characters_render() {
        for ch in "potion_bottle (2), v1+final's".chars() {
            assert!(glyph5x7(ch).is_some(), "missing glyph for {ch:?}");
        }
    }

    #[test]
    fn unknown_characters_draw_a_placeholder() {
        let mut fb = FrameBuffer::new(16, 16);
        draw_text_5x7(&mut fb, 2, 2, "\u{e9}", 0x00_FF_FF_FF);
        assert!(fb.pixels.iter().any(|&p| p == 0x00_FF_FF_FF));
    }
}
