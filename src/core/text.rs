// ReelMend - core/text.rs
//
// Byte-to-text helpers shared by every `io::Write` adapter that feeds an
// output pane.  Writers may receive a multi-byte UTF-8 sequence split across
// two `write` calls; the incomplete tail is held back until it completes.

/// Remove and return the longest decodable prefix of `pending`.
///
/// An incomplete UTF-8 sequence at the very end stays in `pending` for the
/// next call.  Invalid bytes anywhere else are replaced with U+FFFD.
pub fn take_utf8(pending: &mut Vec<u8>) -> String {
    let mut out = String::new();
    let mut start = 0;

    while start < pending.len() {
        match std::str::from_utf8(&pending[start..]) {
            Ok(valid) => {
                out.push_str(valid);
                start = pending.len();
            }
            Err(e) => {
                let valid_end = start + e.valid_up_to();
                out.push_str(&String::from_utf8_lossy(&pending[start..valid_end]));
                match e.error_len() {
                    Some(bad) => {
                        out.push(char::REPLACEMENT_CHARACTER);
                        start = valid_end + bad;
                    }
                    None => {
                        // Truncated sequence at the end: keep it for later.
                        start = valid_end;
                        break;
                    }
                }
            }
        }
    }

    pending.drain(..start);
    out
}

/// Truncate `text` to at most `max_bytes`, backing off to a char boundary.
pub fn clip_to_boundary(text: &mut String, max_bytes: usize) {
    if text.len() <= max_bytes {
        return;
    }
    let mut cut = max_bytes;
    while !text.is_char_boundary(cut) {
        cut -= 1;
    }
    text.truncate(cut);
}

/// Drop bytes from the front of `text` so that it is at most `max_bytes`
/// long, starting the kept text on a char boundary.
pub fn trim_front_to(text: &mut String, max_bytes: usize) {
    if text.len() <= max_bytes {
        return;
    }
    let mut cut = text.len() - max_bytes;
    while !text.is_char_boundary(cut) {
        cut += 1;
    }
    text.drain(..cut);
}
