use cfview_core::constants::MAXLAYERS;
use cfview_core::Session;

/// Text rendering of the current view, one character per tile:
///
/// - `~` fog of war
/// - `0`..`9` topmost visible layer holding a face anchored on this tile
/// - `+` part of a big face anchored elsewhere
/// - `.` nothing
pub fn render_ascii(session: &mut Session) -> String {
    let width = session.grid().width() as i32;
    let height = session.grid().height() as i32;
    let mut out = String::with_capacity(((width + 1) * height) as usize);

    for y in 0..height {
        for x in 0..width {
            out.push(tile_char(session, x, y));
        }
        out.push('\n');
    }
    out
}

fn tile_char(session: &mut Session, x: i32, y: i32) -> char {
    if session.grid().cell(x, y).is_some_and(|c| c.is_cleared()) {
        return '~';
    }

    for layer in (0..MAXLAYERS).rev() {
        match session.resolve_bigface(x, y, layer) {
            (0, _, _) => continue,
            (_, 0, 0) => return char::from(b'0' + layer as u8),
            _ => return '+',
        }
    }
    '.'
}
