// Checked readers for network payloads. All multi-byte values on the map
// protocol are big-endian. Each macro evaluates to `Option<T>` and only
// advances the offset when enough bytes were available.

macro_rules! read_u8 {
    ($bytes:expr, $offset:expr) => {{
        match $bytes.get($offset) {
            Some(&val) => {
                $offset += 1;
                Some(val)
            }
            None => None,
        }
    }};
}

macro_rules! read_u16_be {
    ($bytes:expr, $offset:expr) => {{
        match $bytes.get($offset..$offset + 2) {
            Some(b) => {
                $offset += 2;
                Some(u16::from_be_bytes([b[0], b[1]]))
            }
            None => None,
        }
    }};
}

macro_rules! skip_bytes {
    ($bytes:expr, $offset:expr, $count:expr) => {{
        let count: usize = $count;
        if $offset + count <= $bytes.len() {
            $offset += count;
            Some(())
        } else {
            None
        }
    }};
}
