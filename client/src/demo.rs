//! Synthetic capture used to try the replay tool without a server.

use cfview_core::constants::{
    FACE_IS_ANIM, MAP2_END_OF_CELL, MAP2_LAYER_START, MAP2_TYPE_DARKNESS,
};
use cfview_core::decoder::{extended, legacy};
use cfview_core::FaceInfo;

use crate::capture::Capture;

pub const DEMO_BIG_FACE: u16 = 300;
const DEMO_ANIMATION: u16 = 12;

/// Face sizes the demo capture expects.
pub fn demo_faces() -> Vec<FaceInfo> {
    vec![FaceInfo {
        id: DEMO_BIG_FACE,
        width: 2,
        height: 2,
    }]
}

fn map2_cell(buf: &mut Vec<u8>, x: i32, y: i32, entries: &[(u8, u16)], light: Option<u8>) {
    buf.extend_from_slice(&extended::encode_mask(x, y, false).to_be_bytes());
    for &(layer, value) in entries {
        buf.push(extended::encode_tag(MAP2_LAYER_START + layer, 2));
        buf.extend_from_slice(&value.to_be_bytes());
    }
    if let Some(light) = light {
        buf.push(extended::encode_tag(MAP2_TYPE_DARKNESS, 1));
        buf.push(light);
    }
    buf.push(MAP2_END_OF_CELL);
}

/// A short session: a floor, a big face, an animated tile, a scroll and a
/// legacy update.
pub fn demo_capture(width: usize, height: usize) -> Capture {
    let mut capture = Capture::default();
    capture.push("newmap", Vec::new());

    let mut anim = Vec::new();
    anim.extend_from_slice(&DEMO_ANIMATION.to_be_bytes());
    anim.extend_from_slice(&0u16.to_be_bytes());
    for frame in [20u16, 21, 22, 23] {
        anim.extend_from_slice(&frame.to_be_bytes());
    }
    capture.push("anim", anim);

    let mut floor = Vec::new();
    for y in 0..height as i32 {
        for x in 0..width as i32 {
            map2_cell(&mut floor, x, y, &[(0, 1)], Some(200));
        }
    }
    capture.push("map2", floor);

    let cx = width as i32 / 2;
    let cy = height as i32 / 2;
    let mut objects = Vec::new();
    map2_cell(&mut objects, cx, cy, &[(0, 1), (3, DEMO_BIG_FACE)], None);
    map2_cell(
        &mut objects,
        cx + 2,
        cy,
        &[(0, 1), (5, FACE_IS_ANIM | DEMO_ANIMATION)],
        None,
    );
    capture.push("map2", objects);

    capture.push("map_scroll", b"1 0".to_vec());

    let mut legacy_update = Vec::new();
    let x = (width as u8).saturating_sub(1);
    legacy_update.extend_from_slice(&legacy::encode_mask(x, 0, 0x4 | 0x1).to_be_bytes());
    legacy_update.extend_from_slice(&1u16.to_be_bytes());
    legacy_update.extend_from_slice(&7u16.to_be_bytes());
    capture.push("map1a", legacy_update);

    capture
}
