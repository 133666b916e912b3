//! Perspective projection of a road point onto the screen.

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    /// Distance from eye to projection plane.
    pub depth: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn half_width(&self) -> f32 {
        self.width / 2.0
    }
}

/// Screen-space center `x`, row `y` and half-width `w` of a road slice.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Projected {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub scale: f32,
}

/// `p.z` must lie ahead of the camera; the segment ring guarantees it.
pub fn project(p: Point3, cam: &Camera, view: &Viewport, road_width: f32) -> Projected {
    let dz = p.z - cam.z;
    debug_assert!(dz > 0.0, "point behind camera: dz = {dz}");
    let scale = cam.depth / dz;
    let half = view.half_width();
    Projected {
        x: (1.0 + scale * (p.x - cam.x)) * half,
        y: ((1.0 - scale * (p.y - cam.y)) * view.height / 2.0).ceil(),
        w: scale * road_width * half,
        scale,
    }
}
