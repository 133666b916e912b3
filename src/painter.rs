//! Road renderer: a front-to-back geometry pass that culls hidden slices,
//! then a back-to-front sprite pass over the slices that survived.

use crate::projection::{project, Camera, Projected, Viewport};
use crate::race::World;
use crate::sprites::{Sprite, SpriteId, SpriteSheet};
use crate::surface::{Quad, Rect, Rgb, Surface};

/// Sprite feet sit this many pixels below the slice line on a screen of
/// [`REFERENCE_HEIGHT`] rows.
const SPRITE_BASELINE: f32 = 4.0;
const REFERENCE_HEIGHT: f32 = 500.0;
/// Road width in projected pixels at which a sprite is drawn at its size.
const SPRITE_UNIT: f32 = 250.0;

const RUMBLE: f32 = 1.15;
const MARKING: f32 = 0.4;
const MARKING_GAP: f32 = 0.35;

/// Two-tone colors, indexed by band parity.
#[derive(Clone, Debug, PartialEq)]
pub struct Palette {
    pub asphalt: [Rgb; 2],
    pub marking: [Rgb; 2],
    pub sand: [Rgb; 2],
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            asphalt: [Rgb::hex(0x585758), Rgb::hex(0x535253)],
            marking: [Rgb::hex(0x959298), Rgb::hex(0xf9fd00)],
            sand: [Rgb::hex(0xeedccd), Rgb::hex(0xe6d4c5)],
        }
    }
}

/// One slice as projected this frame.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SegmentView {
    /// Ring slot.
    pub slot: usize,
    /// Unwrapped index, `start..start + N`.
    pub n: usize,
    pub projected: Projected,
    pub visible: bool,
}

#[derive(Default)]
pub struct Painter {
    palette: Palette,
    views: Vec<SegmentView>,
}

impl Painter {
    pub fn new(palette: Palette) -> Self {
        Self {
            palette,
            views: Vec::new(),
        }
    }

    /// Clear the surface and draw road and sprites for the world's current
    /// window. Returns this frame's projections, nearest first.
    pub fn draw<S: Surface + ?Sized>(
        &mut self,
        world: &World,
        surface: &mut S,
        sprites: &SpriteSheet,
        view: Viewport,
    ) -> &[SegmentView] {
        surface.clear();
        self.geometry(world, surface, view);
        self.sprites(world, surface, sprites, view);
        &self.views
    }

    fn geometry<S: Surface + ?Sized>(&mut self, world: &World, surface: &mut S, view: Viewport) {
        let t = world.tuning();
        let ring = world.ring();
        let count = ring.len();
        let start = world.window().start;
        let lateral = world.player().lateral;
        let cam_y = t.camera_height + ring.get(start).world.y;
        let half = view.half_width();

        self.views.clear();
        let mut max_y = view.height;
        let mut x = 0.0;
        let mut dx = 0.0;

        for n in start..start + count {
            let slot = n % count;
            let seg = ring.get(slot);
            let cam = Camera {
                x: lateral * t.road_width - x,
                y: cam_y,
                z: start as f32 * t.segment_length
                    - if n >= count { ring.circumference() } else { 0.0 },
                depth: t.camera_depth,
            };
            let p = project(seg.world, &cam, &view, t.road_width);
            x += dx;
            dx += seg.curve;

            let visible = p.y < max_y;
            self.views.push(SegmentView {
                slot,
                n,
                projected: p,
                visible,
            });
            if !visible {
                continue;
            }
            max_y = p.y;

            // The nearest slice has nothing in front of it to join to.
            let Some(prev) = self.views.len().checked_sub(2).map(|i| self.views[i].projected) else {
                continue;
            };
            let band = (n / 2) % 2;
            let sand = self.palette.sand[band];
            let asphalt = self.palette.asphalt[band];

            for side in [view.width / 4.0, view.width / 4.0 * 3.0] {
                surface.fill_quad(sand, &Quad::new(side, prev.y, half + 2.0, side, p.y, half));
            }
            surface.fill_quad(self.palette.marking[band], &span(&prev, &p, RUMBLE));
            surface.fill_quad(asphalt, &span(&prev, &p, 1.0));
            if band == 0 {
                surface.fill_quad(self.palette.marking[1], &span(&prev, &p, MARKING));
                surface.fill_quad(asphalt, &span(&prev, &p, MARKING_GAP));
            }
        }
    }

    fn sprites<S: Surface + ?Sized>(
        &self,
        world: &World,
        surface: &mut S,
        sprites: &SpriteSheet,
        view: Viewport,
    ) {
        let baseline = SPRITE_BASELINE * view.height / REFERENCE_HEIGHT;
        let tree = sprites.get(SpriteId::Tree);

        for v in self.views.iter().rev().filter(|v| v.visible) {
            if v.n % 10 == 0 {
                place(surface, &v.projected, tree, -2.0, baseline);
            }
            if (v.n + 5) % 10 == 0 {
                place(surface, &v.projected, tree, 1.3, baseline);
            }
            if let Some(id) = world.ring().get(v.slot).special {
                place(surface, &v.projected, sprites.get(id), 0.0, baseline);
            }
            for car in world.traffic().on_slot(v.slot) {
                place(
                    surface,
                    &v.projected,
                    sprites.get(car.sprite),
                    car.lane.offset(),
                    baseline,
                );
            }
        }
    }
}

fn span(near: &Projected, far: &Projected, k: f32) -> Quad {
    Quad::new(near.x, near.y, near.w * k, far.x, far.y, far.w * k)
}

/// Screen rectangle for `sprite` standing on a slice, `offset` road
/// half-widths from its center.
pub fn sprite_rect(p: &Projected, sprite: &Sprite, offset: f32, baseline: f32) -> Rect {
    let w = sprite.width * p.w / SPRITE_UNIT;
    let h = sprite.height * p.w / SPRITE_UNIT;
    Rect {
        x: p.x + p.w * (offset + sprite.offset) - w / 2.0,
        y: p.y + baseline - h,
        w,
        h,
    }
}

fn place<S: Surface + ?Sized>(surface: &mut S, p: &Projected, sprite: &Sprite, offset: f32, baseline: f32) {
    if let Some(image) = &sprite.image {
        surface.draw_image(image, sprite_rect(p, sprite, offset, baseline));
    }
}
