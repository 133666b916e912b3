use crate::surface::{Image, Quad, Rect, Rgb, Surface};
use crossterm::{
    cursor,
    event::{
        DisableFocusChange, EnableFocusChange, KeyboardEnhancementFlags,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    execute, queue,
    style::{Attribute, Color, Print, ResetColor, SetAttribute, SetBackgroundColor, SetForegroundColor},
    terminal::{
        self, BeginSynchronizedUpdate, Clear, ClearType, DisableLineWrap, EnableLineWrap,
        EndSynchronizedUpdate, EnterAlternateScreen, LeaveAlternateScreen,
    },
};
use std::collections::HashMap;
use std::io::{self, Write};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cell {
    pub ch: char,
    pub fg: Color,
    pub bg: Color,
    pub bold: bool,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            ch: ' ',
            fg: Color::White,
            bg: Color::Black,
            bold: false,
        }
    }
}

pub struct CellBuffer {
    pub w: u16,
    pub h: u16,
    pub cells: Vec<Cell>,
}

impl CellBuffer {
    pub fn new(w: u16, h: u16) -> Self {
        Self {
            w,
            h,
            cells: vec![Cell::default(); (w as usize) * (h as usize)],
        }
    }
    pub fn idx(&self, x: u16, y: u16) -> usize {
        (y as usize) * (self.w as usize) + (x as usize)
    }
    pub fn get(&self, x: u16, y: u16) -> Option<Cell> {
        (x < self.w && y < self.h).then(|| self.cells[self.idx(x, y)])
    }
    pub fn set(&mut self, x: u16, y: u16, c: Cell) {
        if x < self.w && y < self.h {
            let i = self.idx(x, y);
            self.cells[i] = c;
        }
    }
}

/// Pixel grid the road is painted on. `None` is unpainted and shows
/// whatever backdrop is filled in behind it.
pub struct PixelCanvas {
    pub w: u32,
    pub h: u32,
    pub px: Vec<Option<Rgb>>,
}

impl PixelCanvas {
    pub fn new(w: u32, h: u32) -> Self {
        Self {
            w,
            h,
            px: vec![None; (w as usize) * (h as usize)],
        }
    }
    pub fn idx(&self, x: u32, y: u32) -> usize {
        (y as usize) * (self.w as usize) + (x as usize)
    }
    pub fn get(&self, x: u32, y: u32) -> Option<Rgb> {
        if x >= self.w || y >= self.h {
            return None;
        }
        self.px[self.idx(x, y)]
    }
    pub fn put(&mut self, x: i32, y: i32, c: Rgb) {
        if x < 0 || y < 0 || x as u32 >= self.w || y as u32 >= self.h {
            return;
        }
        let i = self.idx(x as u32, y as u32);
        self.px[i] = Some(c);
    }
    /// Paint every still-unpainted pixel with `f(x, y)`.
    pub fn fill_behind(&mut self, mut f: impl FnMut(u32, u32) -> Rgb) {
        for y in 0..self.h {
            for x in 0..self.w {
                let i = self.idx(x, y);
                if self.px[i].is_none() {
                    self.px[i] = Some(f(x, y));
                }
            }
        }
    }
}

impl Surface for PixelCanvas {
    fn clear(&mut self) {
        self.px.fill(None);
    }

    /// Scanline fill, sampling each row at its pixel center.
    fn fill_quad(&mut self, color: Rgb, quad: &Quad) {
        let top = quad.y1.min(quad.y2).max(0.0).floor() as i32;
        let bottom = quad.y1.max(quad.y2).min(self.h as f32).ceil() as i32;
        for y in top..bottom {
            let (cx, hw) = quad.span_at(y as f32 + 0.5);
            let x0 = (cx - hw).max(0.0).round() as i32;
            let x1 = (cx + hw).min(self.w as f32).round() as i32;
            for x in x0..x1 {
                self.put(x, y, color);
            }
        }
    }

    /// Nearest-neighbor scaled blit; transparent source pixels are skipped.
    fn draw_image(&mut self, image: &Image, dest: Rect) {
        if dest.w < 1.0 || dest.h < 1.0 || image.w == 0 || image.h == 0 {
            return;
        }
        let x0 = dest.x.max(0.0).floor() as i32;
        let y0 = dest.y.max(0.0).floor() as i32;
        let x1 = (dest.x + dest.w).min(self.w as f32).ceil() as i32;
        let y1 = (dest.y + dest.h).min(self.h as f32).ceil() as i32;
        for y in y0..y1 {
            let v = (y as f32 + 0.5 - dest.y) / dest.h;
            if !(0.0..1.0).contains(&v) {
                continue;
            }
            let sy = (v * image.h as f32) as u32;
            for x in x0..x1 {
                let u = (x as f32 + 0.5 - dest.x) / dest.w;
                if !(0.0..1.0).contains(&u) {
                    continue;
                }
                if let Some(c) = image.get((u * image.w as f32) as u32, sy) {
                    self.put(x, y, c);
                }
            }
        }
    }
}

pub struct Terminal {
    pub out: io::Stdout,
    pub cols: u16,
    pub rows: u16,
    pub prev: CellBuffer,
    pub cur: CellBuffer,
    pub canvas: PixelCanvas,
    /// Key release events are reported.
    pub enhanced: bool,
}

impl Terminal {
    pub fn begin() -> anyhow::Result<Self> {
        let mut out = io::stdout();
        execute!(
            out,
            EnterAlternateScreen,
            cursor::Hide,
            DisableLineWrap,
            EnableFocusChange,
            terminal::Clear(ClearType::All)
        )?;
        terminal::enable_raw_mode()?;

        let enhanced = terminal::supports_keyboard_enhancement().unwrap_or(false);
        if enhanced {
            execute!(
                out,
                PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
            )?;
        }
        log::info!("keyboard release events: {enhanced}");

        let (cols, rows) = terminal::size()?;
        Ok(Self {
            out,
            cols,
            rows,
            prev: CellBuffer::new(cols, rows),
            cur: CellBuffer::new(cols, rows),
            // Braille: 2×4 pixels per cell
            canvas: PixelCanvas::new(cols as u32 * 2, rows as u32 * 4),
            enhanced,
        })
    }

    pub fn end(&mut self) -> anyhow::Result<()> {
        if self.enhanced {
            queue!(self.out, PopKeyboardEnhancementFlags)?;
        }
        queue!(
            self.out,
            BeginSynchronizedUpdate,
            ResetColor,
            Clear(ClearType::All),
            DisableFocusChange,
            cursor::Show,
            EnableLineWrap,
            EndSynchronizedUpdate,
            LeaveAlternateScreen
        )?;
        self.out.flush()?;
        terminal::disable_raw_mode()?;
        Ok(())
    }

    pub fn resize_if_needed(&mut self) -> anyhow::Result<bool> {
        let (c, r) = terminal::size()?;
        if c == self.cols && r == self.rows {
            return Ok(false);
        }
        log::debug!("resized to {c}x{r}");
        self.cols = c;
        self.rows = r;
        self.prev = CellBuffer::new(c, r);
        self.cur = CellBuffer::new(c, r);
        self.canvas = PixelCanvas::new(c as u32 * 2, r as u32 * 4);
        queue!(self.out, Clear(ClearType::All))?;
        Ok(true)
    }

    pub fn present(&mut self, diff_only: bool) -> anyhow::Result<()> {
        queue!(self.out, BeginSynchronizedUpdate)?;

        let mut last_fg = None;
        let mut last_bg = None;
        let mut last_bold = false;

        for y in 0..self.rows {
            for x in 0..self.cols {
                let i = self.cur.idx(x, y);
                let c = self.cur.cells[i];
                if diff_only && c == self.prev.cells[i] {
                    continue;
                }

                queue!(self.out, cursor::MoveTo(x, y))?;

                if c.bold != last_bold {
                    let attr = if c.bold { Attribute::Bold } else { Attribute::NormalIntensity };
                    queue!(self.out, SetAttribute(attr))?;
                    last_bold = c.bold;
                    // Some terminals reset colors with intensity.
                    last_fg = None;
                    last_bg = None;
                }
                if last_fg != Some(c.fg) {
                    queue!(self.out, SetForegroundColor(c.fg))?;
                    last_fg = Some(c.fg);
                }
                if last_bg != Some(c.bg) {
                    queue!(self.out, SetBackgroundColor(c.bg))?;
                    last_bg = Some(c.bg);
                }

                queue!(self.out, Print(c.ch))?;
            }
        }

        queue!(
            self.out,
            SetAttribute(Attribute::Reset),
            ResetColor,
            EndSynchronizedUpdate
        )?;
        self.out.flush()?;
        self.prev.cells.copy_from_slice(&self.cur.cells);
        Ok(())
    }
}

/* -----------------------------
   Braille encoding: 2×4 pixels -> U+2800..U+28FF
------------------------------ */

fn braille_bit(dx: u32, dy: u32) -> u8 {
    // Dot mapping:
    // (0,0)=1 (0,1)=2 (0,2)=4 (0,3)=64
    // (1,0)=8 (1,1)=16 (1,2)=32 (1,3)=128
    match (dx, dy) {
        (0, 0) => 0x01,
        (0, 1) => 0x02,
        (0, 2) => 0x04,
        (0, 3) => 0x40,
        (1, 0) => 0x08,
        (1, 1) => 0x10,
        (1, 2) => 0x20,
        (1, 3) => 0x80,
        _ => 0x00,
    }
}

pub fn rgb(c: Rgb) -> Color {
    Color::Rgb {
        r: c.r,
        g: c.g,
        b: c.b,
    }
}

fn luma(c: Rgb) -> u32 {
    (c.r as u32 * 299 + c.g as u32 * 587 + c.b as u32 * 114) / 1000
}

/// Two colors per cell: the most frequent pixel color becomes the cell
/// background, the rest are averaged into the dot color. Without color the
/// dots mark pixels brighter than the cell's darkest tone.
pub fn canvas_to_cells(canvas: &PixelCanvas, out: &mut CellBuffer, enable_color: bool) {
    let cols = out.w as u32;
    let rows = out.h as u32;
    let mut counts: HashMap<Rgb, u8> = HashMap::with_capacity(8);

    for cy in 0..rows {
        for cx in 0..cols {
            let px0 = cx * 2;
            let py0 = cy * 4;

            let mut block = [(0u32, 0u32, Rgb::default()); 8];
            let mut len = 0;
            counts.clear();
            for dy in 0..4 {
                for dx in 0..2 {
                    let Some(p) = canvas.get(px0 + dx, py0 + dy) else {
                        continue;
                    };
                    block[len] = (dx, dy, p);
                    len += 1;
                    *counts.entry(p).or_default() += 1;
                }
            }
            let block = &block[..len];

            // Ties go to the darker color so thin bright details stay dots.
            let bg = counts
                .iter()
                .max_by_key(|(c, n)| (**n, u32::MAX - luma(**c)))
                .map(|(c, _)| *c)
                .unwrap_or_default();

            let mut mask: u8 = 0;
            let (mut sum_r, mut sum_g, mut sum_b, mut ink) = (0u32, 0u32, 0u32, 0u32);
            for &(dx, dy, p) in block {
                let lit = if enable_color { p != bg } else { luma(p) > luma(bg) };
                if lit {
                    mask |= braille_bit(dx, dy);
                    sum_r += p.r as u32;
                    sum_g += p.g as u32;
                    sum_b += p.b as u32;
                    ink += 1;
                }
            }

            let ch = char::from_u32(0x2800 + (mask as u32)).unwrap_or(' ');
            let (fg, bg) = if !enable_color {
                (Color::White, Color::Black)
            } else if ink > 0 {
                let fg = Rgb::new((sum_r / ink) as u8, (sum_g / ink) as u8, (sum_b / ink) as u8);
                (rgb(fg), rgb(bg))
            } else {
                (rgb(bg), rgb(bg))
            };

            out.set(
                cx as u16,
                cy as u16,
                Cell {
                    ch,
                    fg,
                    bg,
                    bold: false,
                },
            );
        }
    }
}

/// Text keeps the background already under each cell.
pub fn draw_text(buf: &mut CellBuffer, x: u16, y: u16, s: &str, fg: Color, bold: bool) {
    for (i, ch) in s.chars().enumerate() {
        let xx = x.saturating_add(i as u16);
        if xx >= buf.w || y >= buf.h {
            break;
        }
        let bg = buf.get(xx, y).map_or(Color::Black, |c| c.bg);
        buf.set(xx, y, Cell { ch, fg, bg, bold });
    }
}

pub fn draw_text_centered(buf: &mut CellBuffer, y: u16, s: &str, fg: Color, bold: bool) {
    let len = s.chars().count() as u16;
    let x = buf.w.saturating_sub(len) / 2;
    draw_text(buf, x, y, s, fg, bold);
}
