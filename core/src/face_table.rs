use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::constants::MAX_FACE_SIZE;

/// Size of one face image in map tiles, as downloaded with the image set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaceInfo {
    pub id: u16,
    pub width: u8,
    pub height: u8,
}

/// Frame list of one animation plus the shared state used by synchronized
/// animations (every tile showing it advances in lock step).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Animation {
    pub flags: u16,
    pub frames: Vec<u16>,
    pub speed: u8,
    pub speed_left: u8,
    pub phase: u16,
}

impl Animation {
    pub fn new(flags: u16, frames: Vec<u16>) -> Self {
        Self {
            flags,
            frames,
            speed: 0,
            speed_left: 0,
            phase: 0,
        }
    }

    #[inline]
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// Face shown at `phase`, wrapping around the frame list.
    pub fn frame(&self, phase: u16) -> u16 {
        if self.frames.is_empty() {
            return 0;
        }
        self.frames[phase as usize % self.frames.len()]
    }

    fn advance(&mut self) {
        if self.speed == 0 || self.frames.is_empty() {
            return;
        }
        self.speed_left = self.speed_left.saturating_add(1);
        if self.speed_left >= self.speed {
            self.speed_left = 0;
            self.phase = ((self.phase as usize + 1) % self.frames.len()) as u16;
        }
    }
}

/// Face metadata: tile extents of faces and animation frame lists.
#[derive(Debug, Clone, Default)]
pub struct FaceTable {
    sizes: HashMap<u16, (u8, u8)>,
    animations: HashMap<u16, Animation>,
}

impl FaceTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_faces(faces: impl IntoIterator<Item = FaceInfo>) -> Self {
        let mut table = Self::new();
        for info in faces {
            table.set_face_size(info.id, info.width, info.height);
        }
        table
    }

    /// Builds a table from a JSON list of `{ "id", "width", "height" }`.
    pub fn load_json(text: &str) -> Result<Self, serde_json::Error> {
        let faces: Vec<FaceInfo> = serde_json::from_str(text)?;
        Ok(Self::from_faces(faces))
    }

    pub fn set_face_size(&mut self, face: u16, width: u8, height: u8) {
        self.sizes.insert(face, (width, height));
    }

    /// Extent of `face` in tiles, clamped to `1..=MAX_FACE_SIZE`. Faces
    /// without metadata are 1x1.
    pub fn face_size(&self, face: u16) -> (u8, u8) {
        let (w, h) = self.sizes.get(&face).copied().unwrap_or((1, 1));
        (w.clamp(1, MAX_FACE_SIZE), h.clamp(1, MAX_FACE_SIZE))
    }

    #[inline]
    pub fn is_big(&self, face: u16) -> bool {
        face != 0 && self.face_size(face) != (1, 1)
    }

    /// Registers (or replaces) an animation. Any running synchronized state
    /// for the id starts over.
    pub fn register_animation(&mut self, id: u16, flags: u16, frames: Vec<u16>) {
        log::debug!("animation {id}: {} frames, flags {flags:#06x}", frames.len());
        self.animations.insert(id, Animation::new(flags, frames));
    }

    pub fn animation(&self, id: u16) -> Option<&Animation> {
        self.animations.get(&id)
    }

    pub fn animation_mut(&mut self, id: u16) -> Option<&mut Animation> {
        self.animations.get_mut(&id)
    }

    pub fn animation_count(&self) -> usize {
        self.animations.len()
    }

    /// Advances the shared state of every synchronized animation by one tick.
    pub fn advance_sync(&mut self) {
        for animation in self.animations.values_mut() {
            animation.advance();
        }
    }
}
