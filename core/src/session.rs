use crate::animator;
use crate::bigface;
use crate::constants::{CMD_ANIM, CMD_MAP1, CMD_MAP1A, CMD_MAP2, CMD_MAP_SCROLL, CMD_NEWMAP};
use crate::decoder::{self, DecodeSummary};
use crate::error::MapError;
use crate::face_table::FaceTable;
use crate::map_grid::MapGrid;

/// What a handled command did to the view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    Map(DecodeSummary),
    Scrolled { dx: i32, dy: i32 },
    NewMap,
    AnimationRegistered(u16),
    Ignored,
}

/// One client's map view: the grid plus the face metadata needed to keep
/// big faces and animations consistent.
#[derive(Debug, Default)]
pub struct Session {
    grid: MapGrid,
    faces: FaceTable,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_faces(faces: FaceTable) -> Self {
        Self {
            grid: MapGrid::new(),
            faces,
        }
    }

    /// Applies a negotiated viewport size. A different size discards the
    /// current view.
    pub fn set_viewport(&mut self, width: usize, height: usize) -> Result<(), MapError> {
        self.grid.set_size(width, height)?;
        log::info!("viewport set to {width}x{height}");
        Ok(())
    }

    /// Dispatches one complete server command.
    ///
    /// A malformed payload is logged and returned; whatever the command
    /// applied before the bad byte stays in the view.
    pub fn handle_command(
        &mut self,
        name: &str,
        payload: &[u8],
    ) -> Result<CommandOutcome, MapError> {
        let result = match name {
            CMD_MAP1 => {
                decoder::legacy::apply(&mut self.grid, &mut self.faces, CMD_MAP1, payload)
                    .map(CommandOutcome::Map)
            }
            CMD_MAP1A => {
                decoder::legacy::apply(&mut self.grid, &mut self.faces, CMD_MAP1A, payload)
                    .map(CommandOutcome::Map)
            }
            CMD_MAP2 => decoder::extended::apply(&mut self.grid, &mut self.faces, payload)
                .map(CommandOutcome::Map),
            CMD_MAP_SCROLL => parse_scroll(payload).map(|(dx, dy)| {
                self.grid.scroll(dx, dy);
                CommandOutcome::Scrolled { dx, dy }
            }),
            CMD_NEWMAP => {
                self.grid.reset();
                Ok(CommandOutcome::NewMap)
            }
            CMD_ANIM => decoder::decode_anim(payload).map(|def| {
                self.faces.register_animation(def.id, def.flags, def.frames);
                CommandOutcome::AnimationRegistered(def.id)
            }),
            other => {
                log::debug!("ignoring command {other} ({} bytes)", payload.len());
                Ok(CommandOutcome::Ignored)
            }
        };

        match &result {
            Ok(CommandOutcome::Map(summary)) => log::trace!("{name}: {summary:?}"),
            Ok(_) => {}
            Err(e) => log::warn!("{e}"),
        }
        result
    }

    /// Advances client-side animations by one tick. Returns the number of
    /// layers whose face changed.
    pub fn tick(&mut self) -> usize {
        animator::advance(&mut self.grid, &mut self.faces)
    }

    #[inline]
    pub fn is_inside(&self, x: i32, y: i32) -> bool {
        self.grid.is_inside(x, y)
    }

    #[inline]
    pub fn face_at(&self, x: i32, y: i32, layer: usize) -> u16 {
        self.grid.face_at(x, y, layer)
    }

    pub fn resolve_bigface(&mut self, x: i32, y: i32, layer: usize) -> (u16, u8, u8) {
        bigface::resolve_bigface(&mut self.grid, x, y, layer)
    }

    pub fn grid(&self) -> &MapGrid {
        &self.grid
    }

    pub fn grid_mut(&mut self) -> &mut MapGrid {
        &mut self.grid
    }

    pub fn faces(&self) -> &FaceTable {
        &self.faces
    }

    pub fn faces_mut(&mut self) -> &mut FaceTable {
        &mut self.faces
    }
}

/// `map_scroll` carries the offsets as ASCII text: `"<dx> <dy>"`.
fn parse_scroll(payload: &[u8]) -> Result<(i32, i32), MapError> {
    let malformed = MapError::MalformedPayload {
        command: CMD_MAP_SCROLL,
        offset: 0,
        cells_applied: 0,
    };

    let text = std::str::from_utf8(payload).map_err(|_| malformed.clone())?;
    let mut parts = text.split_whitespace();
    let (Some(dx), Some(dy), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(malformed);
    };
    match (dx.parse::<i32>(), dy.parse::<i32>()) {
        (Ok(dx), Ok(dy)) => Ok((dx, dy)),
        _ => Err(malformed),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::CellFlags;
    use crate::decoder::legacy;

    fn session(width: usize, height: usize) -> Session {
        let mut session = Session::new();
        session.set_viewport(width, height).unwrap();
        session
    }

    fn floor_at(x: u8, y: u8, face: u16) -> Vec<u8> {
        let mut buf = legacy::encode_mask(x, y, 0x4).to_be_bytes().to_vec();
        buf.extend_from_slice(&face.to_be_bytes());
        buf
    }

    #[test]
    fn dispatches_legacy_commands() {
        let mut s = session(11, 11);
        let outcome = s.handle_command("map1a", &floor_at(3, 4, 77)).unwrap();

        assert!(matches!(outcome, CommandOutcome::Map(summary) if summary.cells_applied == 1));
        assert_eq!(s.face_at(3, 4, 0), 77);
    }

    #[test]
    fn map_scroll_is_ascii() {
        let mut s = session(11, 11);
        s.handle_command("map1", &floor_at(3, 4, 77)).unwrap();

        let outcome = s.handle_command("map_scroll", b"1 -1").unwrap();

        assert_eq!(outcome, CommandOutcome::Scrolled { dx: 1, dy: -1 });
        assert_eq!(s.face_at(2, 5, 0), 77);
        assert!(s.grid().cell(10, 0).unwrap().flags.contains(CellFlags::CLEARED));
    }

    #[test]
    fn extreme_scroll_clears_view() {
        let mut s = session(11, 11);
        s.handle_command("map1", &floor_at(3, 4, 77)).unwrap();

        let payloads: [&[u8]; 3] = [b"-2147483648 0", b"0 -2147483648", b"2147483647 2147483647"];
        for text in payloads {
            s.handle_command("map_scroll", text).unwrap();
            assert_eq!(s.face_at(3, 4, 0), 0);
            assert!(s.grid().iter_cells().all(|(_, _, c)| c.is_cleared()));
        }
    }

    #[test]
    fn bad_scroll_text_is_malformed() {
        let mut s = session(11, 11);
        let payloads: [&[u8]; 4] = [b"1", b"a b", b"1 2 3", &[0xff, 0x20, 0x31]];
        for payload in payloads {
            assert!(matches!(
                s.handle_command("map_scroll", payload),
                Err(MapError::MalformedPayload {
                    command: "map_scroll",
                    ..
                })
            ));
        }
    }

    #[test]
    fn newmap_resets_view() {
        let mut s = session(11, 11);
        s.handle_command("map1", &floor_at(0, 0, 5)).unwrap();

        assert_eq!(s.handle_command("newmap", &[]).unwrap(), CommandOutcome::NewMap);
        assert_eq!(s.face_at(0, 0, 0), 0);
        assert_eq!(s.grid().width(), 11);
    }

    #[test]
    fn anim_command_registers_animation() {
        let mut s = session(5, 5);
        let payload = [0, 3, 0, 0, 0, 10, 0, 11];
        assert_eq!(
            s.handle_command("anim", &payload).unwrap(),
            CommandOutcome::AnimationRegistered(3)
        );
        assert_eq!(s.faces().animation(3).unwrap().frames, vec![10, 11]);
    }

    #[test]
    fn unknown_command_is_ignored() {
        let mut s = session(5, 5);
        assert_eq!(
            s.handle_command("drawinfo", b"hello").unwrap(),
            CommandOutcome::Ignored
        );
    }

    #[test]
    fn same_viewport_keeps_contents() {
        let mut s = session(11, 11);
        s.handle_command("map1", &floor_at(1, 1, 9)).unwrap();
        s.set_viewport(11, 11).unwrap();
        assert_eq!(s.face_at(1, 1, 0), 9);

        s.set_viewport(9, 9).unwrap();
        assert_eq!(s.face_at(1, 1, 0), 0);
    }

    #[test]
    fn oversized_viewport_is_rejected() {
        let mut s = session(11, 11);
        assert_eq!(
            s.set_viewport(65, 11),
            Err(MapError::ViewportTooLarge {
                width: 65,
                height: 11
            })
        );
        assert_eq!(s.grid().width(), 11);
    }
}
