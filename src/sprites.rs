//! Sprite metadata and the built-in pixel art.
//!
//! Sizes are in reference pixels; the painter scales them by the projected
//! road width. A sprite without an image is valid and simply not drawn.

use serde::{Deserialize, Serialize};

use crate::surface::{Image, Rgb};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpriteId {
    Tree,
    Car,
    Finish,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HeroPose {
    Left,
    Center,
    Right,
}

#[derive(Clone, Debug)]
pub struct Sprite {
    pub width: f32,
    pub height: f32,
    /// Horizontal bias in road half-widths, added to the placement offset.
    pub offset: f32,
    pub image: Option<Image>,
}

impl Sprite {
    fn new(width: f32, height: f32, offset: f32, image: Option<Image>) -> Self {
        Self {
            width,
            height,
            offset,
            image,
        }
    }
}

pub struct SpriteSheet {
    tree: Sprite,
    car: Sprite,
    finish: Sprite,
    hero: [Sprite; 3],
}

impl SpriteSheet {
    pub fn builtin() -> Self {
        Self {
            tree: Sprite::new(142.0, 200.0, 0.0, Some(tree_art())),
            car: Sprite::new(110.0, 56.0, 0.0, Some(car_art(ENEMY_BODY, 0))),
            finish: Sprite::new(339.0, 180.0, -0.5, Some(finish_art())),
            hero: [
                Sprite::new(110.0, 56.0, 0.0, Some(car_art(HERO_BODY, -1))),
                Sprite::new(110.0, 56.0, 0.0, Some(car_art(HERO_BODY, 0))),
                Sprite::new(110.0, 56.0, 0.0, Some(car_art(HERO_BODY, 1))),
            ],
        }
    }

    /// Same metadata, no images: every draw degrades to a no-op.
    pub fn unloaded() -> Self {
        let mut sheet = Self::builtin();
        sheet.tree.image = None;
        sheet.car.image = None;
        sheet.finish.image = None;
        for h in &mut sheet.hero {
            h.image = None;
        }
        sheet
    }

    pub fn get(&self, id: SpriteId) -> &Sprite {
        match id {
            SpriteId::Tree => &self.tree,
            SpriteId::Car => &self.car,
            SpriteId::Finish => &self.finish,
        }
    }

    pub fn hero(&self, pose: HeroPose) -> &Sprite {
        match pose {
            HeroPose::Left => &self.hero[0],
            HeroPose::Center => &self.hero[1],
            HeroPose::Right => &self.hero[2],
        }
    }
}

const ENEMY_BODY: Rgb = Rgb::new(214, 48, 49);
const HERO_BODY: Rgb = Rgb::new(9, 132, 227);

fn tree_art() -> Image {
    let leaf = Rgb::new(46, 125, 50);
    let light = Rgb::new(102, 187, 106);
    let trunk = Rgb::new(109, 76, 65);
    Image::from_art(
        &[
            "....gg....",
            "...gGGg...",
            "..gGGGGg..",
            "..gGgGGg..",
            ".gGGGGgGg.",
            ".gGgGGGGg.",
            "gGGGGGgGGg",
            "gGGgGGGGGg",
            ".gGGGGGGg.",
            "..ggGGgg..",
            "....tt....",
            "....tt....",
            "....tt....",
            "...tttt...",
        ],
        &[('g', leaf), ('G', light), ('t', trunk)],
    )
}

/// Rear view of a car. `lean` shifts the cabin one pixel toward the turn.
fn car_art(body: Rgb, lean: i32) -> Image {
    let glass = Rgb::new(178, 235, 242);
    let tire = Rgb::new(30, 30, 30);
    let lamp = Rgb::new(255, 214, 0);
    let shade = Rgb::new(body.r / 2, body.g / 2, body.b / 2);

    let cabin = match lean {
        l if l < 0 => ["..bbbbbb....", ".bwwwwwwb..."],
        l if l > 0 => ["....bbbbbb..", "...bwwwwwwb."],
        _ => ["...bbbbbb...", "..bwwwwwwb.."],
    };
    Image::from_art(
        &[
            cabin[0],
            cabin[1],
            ".bbbbbbbbbb.",
            "lbbssbbssbbl",
            "bbbbbbbbbbbb",
            ".kk......kk.",
        ],
        &[
            ('b', body),
            ('s', shade),
            ('w', glass),
            ('k', tire),
            ('l', lamp),
        ],
    )
}

fn finish_art() -> Image {
    let black = Rgb::new(20, 20, 20);
    let white = Rgb::new(245, 245, 245);
    let pole = Rgb::new(120, 120, 130);
    Image::from_art(
        &[
            "pbwbwbwbwbwbwbwbp",
            "pwbwbwbwbwbwbwbwp",
            "pbwbwbwbwbwbwbwbp",
            "p...............p",
            "p...............p",
            "p...............p",
            "p...............p",
            "p...............p",
            "p...............p",
        ],
        &[('b', black), ('w', white), ('p', pole)],
    )
}
