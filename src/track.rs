//! The segment ring: a fixed window of road slices reused as the camera
//! moves down a much longer logical track.

use crate::map::Map;
use crate::projection::Point3;
use crate::sprites::SpriteId;

#[derive(Clone, Debug, PartialEq)]
pub struct Segment {
    pub world: Point3,
    pub curve: f32,
    pub special: Option<SpriteId>,
}

/// Ring slots of the nearest (`start`) and farthest (`end`) visible segment.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Window {
    pub start: usize,
    pub end: usize,
}

/// Where the player is in the map, in section terms.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SectionCursor {
    pub index: usize,
    pub progress: f32,
}

pub struct SegmentRing {
    segments: Vec<Segment>,
    segment_length: f32,
}

impl SegmentRing {
    /// `near_offset` keeps every slice strictly ahead of the camera.
    pub fn new(count: usize, segment_length: f32, near_offset: f32) -> Self {
        debug_assert!(count > 1, "ring needs at least two segments");
        let segments = (0..count)
            .map(|i| Segment {
                world: Point3 {
                    x: 0.0,
                    y: 0.0,
                    z: i as f32 * segment_length + near_offset,
                },
                curve: 0.0,
                special: None,
            })
            .collect();
        Self {
            segments,
            segment_length,
        }
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn segment_length(&self) -> f32 {
        self.segment_length
    }

    /// Distance covered by one full turn of the ring.
    pub fn circumference(&self) -> f32 {
        self.len() as f32 * self.segment_length
    }

    pub fn wrap(&self, slot: usize) -> usize {
        slot % self.len()
    }

    /// Fold a ring position back into `[0, circumference)`.
    pub fn wrap_position(&self, pos: f32) -> f32 {
        let c = self.circumference();
        if !c.is_finite() || c <= 0.0 {
            return 0.0;
        }
        let wrapped = pos.rem_euclid(c);
        // A tiny negative input can round up to exactly `c`.
        if wrapped >= c {
            0.0
        } else {
            wrapped
        }
    }

    pub fn window(&self, ring_position: f32) -> Window {
        let start = self.wrap((ring_position / self.segment_length) as usize);
        Window {
            start,
            end: (start + self.len() - 1) % self.len(),
        }
    }

    pub fn get(&self, slot: usize) -> &Segment {
        &self.segments[self.wrap(slot)]
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Flatten the whole ring and drop stamped specials; positions and
    /// slot identities are kept.
    pub fn clear_profile(&mut self) {
        for seg in &mut self.segments {
            seg.curve = 0.0;
            seg.world.y = 0.0;
            seg.special = None;
        }
    }

    /// Reparameterize the slot entering the far end of the window from the
    /// section the player is in. `advance` is the distance covered this
    /// frame. Returns true when the cursor moved to the next section.
    pub fn recycle(
        &mut self,
        slot: usize,
        map: &Map,
        cursor: &mut SectionCursor,
        traveled: f32,
        advance: f32,
    ) -> bool {
        let current = map.section(cursor.index);
        let inside = current.contains(traveled);
        if inside {
            cursor.progress += advance;
        }

        let slot = self.wrap(slot);
        let seg = &mut self.segments[slot];
        seg.curve = if inside { current.curve.eval(cursor.progress) } else { 0.0 };
        seg.world.y = if inside { current.height.eval(cursor.progress) } else { 0.0 };
        seg.special = None;

        if current.is_exhausted(traveled) {
            cursor.index = (cursor.index + 1).min(map.sentinel_index());
            cursor.progress = 0.0;
            seg.special = map.section(cursor.index).special;
            log::debug!("entered section {} at {:.0}", cursor.index, traveled);
            return true;
        }
        false
    }
}
