//! The drawing boundary: three primitives, nothing else.

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub const fn hex(v: u32) -> Self {
        Self {
            r: (v >> 16) as u8,
            g: (v >> 8) as u8,
            b: v as u8,
        }
    }
}

/// Trapezoid with horizontal top and bottom edges, each given as a center
/// and half-width: `(x1 ± w1, y1)` and `(x2 ± w2, y2)`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Quad {
    pub x1: f32,
    pub y1: f32,
    pub w1: f32,
    pub x2: f32,
    pub y2: f32,
    pub w2: f32,
}

impl Quad {
    pub fn new(x1: f32, y1: f32, w1: f32, x2: f32, y2: f32, w2: f32) -> Self {
        Self {
            x1,
            y1,
            w1,
            x2,
            y2,
            w2,
        }
    }

    /// Center and half-width of the horizontal span at row `y`.
    pub fn span_at(&self, y: f32) -> (f32, f32) {
        let dy = self.y2 - self.y1;
        if dy.abs() < f32::EPSILON {
            return (self.x1, self.w1.max(self.w2));
        }
        let t = ((y - self.y1) / dy).clamp(0.0, 1.0);
        (
            self.x1 + (self.x2 - self.x1) * t,
            self.w1 + (self.w2 - self.w1) * t,
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

/// Small RGB bitmap; `None` pixels are transparent.
#[derive(Clone, Debug, PartialEq)]
pub struct Image {
    pub w: u32,
    pub h: u32,
    pub px: Vec<Option<Rgb>>,
}

impl Image {
    /// Build from rows of palette keys. Characters missing from the palette
    /// (conventionally `.`) are transparent. Short rows are padded.
    pub fn from_art(rows: &[&str], palette: &[(char, Rgb)]) -> Self {
        let h = rows.len() as u32;
        let w = rows.iter().map(|r| r.chars().count()).max().unwrap_or(0) as u32;
        let mut px = vec![None; (w * h) as usize];
        for (y, row) in rows.iter().enumerate() {
            for (x, ch) in row.chars().enumerate() {
                px[y * w as usize + x] = palette.iter().find(|(k, _)| *k == ch).map(|(_, c)| *c);
            }
        }
        Self { w, h, px }
    }

    pub fn get(&self, x: u32, y: u32) -> Option<Rgb> {
        if x >= self.w || y >= self.h {
            return None;
        }
        self.px[(y * self.w + x) as usize]
    }
}

/// Canvas-like drawing collaborator.
pub trait Surface {
    fn clear(&mut self);
    fn fill_quad(&mut self, color: Rgb, quad: &Quad);
    fn draw_image(&mut self, image: &Image, dest: Rect);
}
