use tallymap::server::wire::{parse, Request};

const KEY: &str = "00112233445566778899aabb";
const KEY_HEX_WIDTH: usize = 24;

fn hincrby_frame(key: &str, alias: &str, delta: &str) -> String {
    format!(
        "*4\r\n$7\r\nHINCRBY\r\n$24\r\n{key}\r\n${}\r\n{alias}\r\n${}\r\n{delta}\r\n",
        alias.len(),
        delta.len()
    )
}

#[test]
fn parses_increment_frames() {
    let frame = hincrby_frame(KEY, "c", "3");
    assert_eq!(
        parse(&frame, KEY_HEX_WIDTH),
        Request::Increment {
            key: KEY,
            alias: "c",
            delta: 3
        }
    );
}

#[test]
fn command_keywords_are_case_insensitive() {
    let frame = format!("*4\r\n$7\r\nhincrby\r\n$24\r\n{KEY}\r\n$1\r\nv\r\n$2\r\n-4\r\n");
    assert_eq!(
        parse(&frame, KEY_HEX_WIDTH),
        Request::Increment {
            key: KEY,
            alias: "v",
            delta: -4
        }
    );
}

#[test]
fn unparseable_deltas_count_as_zero() {
    let frame = hincrby_frame(KEY, "c", "many");
    assert_eq!(
        parse(&frame, KEY_HEX_WIDTH),
        Request::Increment {
            key: KEY,
            alias: "c",
            delta: 0
        }
    );
}

#[test]
fn parses_snapshot_frames() {
    let frame = format!("*2\r\n$3\r\nGET\r\n$24\r\n{KEY}\r\n");
    assert_eq!(parse(&frame, KEY_HEX_WIDTH), Request::Snapshot { key: KEY });
}

#[test]
fn parses_reset_frames() {
    let frame = format!("*2\r\n$3\r\ndel\r\n$24\r\n{KEY}\r\n");
    assert_eq!(parse(&frame, KEY_HEX_WIDTH), Request::Reset { key: KEY });
}

#[test]
fn rejects_mismatched_key_width_markers() {
    let frame = format!("*2\r\n$3\r\nGET\r\n$10\r\n{KEY}\r\n");
    assert_eq!(parse(&frame, KEY_HEX_WIDTH), Request::Unrecognized);
}

#[test]
fn unknown_frames_are_unrecognized() {
    assert_eq!(parse("PING\r\n", KEY_HEX_WIDTH), Request::Unrecognized);
    assert_eq!(parse("", KEY_HEX_WIDTH), Request::Unrecognized);
    assert_eq!(
        parse("*2\r\n$3\r\nPUT\r\n$24\r\nabc\r\n", KEY_HEX_WIDTH),
        Request::Unrecognized
    );
}
