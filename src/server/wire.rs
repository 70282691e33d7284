/// One decoded wire command.
///
/// Keys travel as hex text; decoding and width validation happen in the
/// connection layer so malformed keys never reach the store.
#[derive(Debug, PartialEq, Eq)]
pub enum Request<'a> {
    /// `HINCRBY <key> <field-alias> <delta>`: add a delta to one field.
    Increment {
        key: &'a str,
        alias: &'a str,
        delta: i32,
    },
    /// `GET <key>`: JSON snapshot of every counter plus the total.
    Snapshot { key: &'a str },
    /// `DEL <key>`: destructive read; clears the stored counters.
    Reset { key: &'a str },
    /// Anything else; acknowledged and ignored.
    Unrecognized,
}

/// Parses one request frame.
///
/// The protocol is a fixed-shape, line-oriented command subset: tokens are
/// separated by `\r\n`, the leading tokens pin the arity and keyword, and
/// the key token is required to announce exactly `key_hex_width` characters.
/// Command keywords match case-insensitively; an unparseable delta counts
/// as zero. Frames matching none of the shapes decode to
/// [`Request::Unrecognized`].
pub fn parse(frame: &str, key_hex_width: usize) -> Request<'_> {
    let tokens: Vec<&str> = frame.split("\r\n").collect();
    let key_marker = format!("${key_hex_width}");

    if tokens.len() >= 9
        && tokens[0] == "*4"
        && tokens[1] == "$7"
        && tokens[2].eq_ignore_ascii_case("hincrby")
        && tokens[3] == key_marker
    {
        return Request::Increment {
            key: tokens[4],
            alias: tokens[6],
            delta: tokens[8].parse().unwrap_or(0),
        };
    }

    if tokens.len() >= 5 && tokens[0] == "*2" && tokens[1] == "$3" && tokens[3] == key_marker {
        if tokens[2].eq_ignore_ascii_case("get") {
            return Request::Snapshot { key: tokens[4] };
        }
        if tokens[2].eq_ignore_ascii_case("del") {
            return Request::Reset { key: tokens[4] };
        }
    }

    Request::Unrecognized
}
