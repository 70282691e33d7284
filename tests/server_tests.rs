use std::io::{BufRead, BufReader, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::Arc;
use std::thread;
use tempfile::tempdir;

use tallymap::counter_engine::{CounterStore, FieldSchema, Geometry};
use tallymap::server::serve_listener;
use tallymap::utils::encode_hex;

const KEY: [u8; 12] = [
    0x00, 0x11, 0x22, 0x33, 0x44, 0x55, 0x66, 0x77, 0x88, 0x99, 0xAA, 0xBB,
];

fn spawn_server(dir: &tempfile::TempDir) -> (Arc<CounterStore>, std::net::SocketAddr) {
    let geometry = Geometry {
        key_length: 12,
        max_value_length: 16,
        item_max_count: 1024,
        max_search_depth: 8,
    };
    let schema = FieldSchema::new(
        &["clicks".to_string(), "views".to_string()],
        &["c".to_string(), "v".to_string()],
    )
    .unwrap();
    let store = Arc::new(
        CounterStore::open(&dir.path().join("counters.tbl"), geometry, schema).unwrap(),
    );

    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let server_store = Arc::clone(&store);
    thread::spawn(move || {
        let _ = serve_listener(server_store, listener);
    });

    (store, addr)
}

fn send(stream: &mut TcpStream, reader: &mut BufReader<TcpStream>, frame: &str) -> String {
    stream.write_all(frame.as_bytes()).unwrap();
    let mut line = String::new();
    reader.read_line(&mut line).unwrap();
    line
}

fn hincrby_frame(key_hex: &str, alias: &str, delta: i32) -> String {
    let delta = delta.to_string();
    format!(
        "*4\r\n$7\r\nHINCRBY\r\n$24\r\n{key_hex}\r\n${}\r\n{alias}\r\n${}\r\n{delta}\r\n",
        alias.len(),
        delta.len()
    )
}

#[test]
fn serves_increments_snapshots_and_resets() {
    let dir = tempdir().unwrap();
    let (store, addr) = spawn_server(&dir);
    store.put(&KEY, &[0, 0]).unwrap();
    let key_hex = encode_hex(&KEY);

    let mut stream = TcpStream::connect(addr).unwrap();
    let mut reader = BufReader::new(stream.try_clone().unwrap());

    assert_eq!(
        send(&mut stream, &mut reader, &hincrby_frame(&key_hex, "c", 3)),
        "+OK\r\n"
    );
    assert_eq!(
        send(&mut stream, &mut reader, &hincrby_frame(&key_hex, "v", 10)),
        "+OK\r\n"
    );

    // snapshot replies are a bulk string: length line, then the JSON body
    let get_frame = format!("*2\r\n$3\r\nGET\r\n$24\r\n{key_hex}\r\n");
    let length_line = send(&mut stream, &mut reader, &get_frame);
    assert!(length_line.starts_with('$'), "got {length_line:?}");
    let mut body = String::new();
    reader.read_line(&mut body).unwrap();

    let snapshot: serde_json::Value = serde_json::from_str(body.trim_end()).unwrap();
    assert_eq!(snapshot["clicks"], 3);
    assert_eq!(snapshot["views"], 10);
    assert_eq!(snapshot["Total"], 13);

    // DEL is a destructive read: counters clear, the reply is +1
    let del_frame = format!("*2\r\n$3\r\nDEL\r\n$24\r\n{key_hex}\r\n");
    assert_eq!(send(&mut stream, &mut reader, &del_frame), "+1\r\n");

    let length_line = send(&mut stream, &mut reader, &get_frame);
    assert!(length_line.starts_with('$'));
    let mut body = String::new();
    reader.read_line(&mut body).unwrap();
    let snapshot: serde_json::Value = serde_json::from_str(body.trim_end()).unwrap();
    assert_eq!(snapshot["Total"], 0);
}

#[test]
fn unknown_commands_and_bad_keys_are_acknowledged() {
    let dir = tempdir().unwrap();
    let (store, addr) = spawn_server(&dir);

    let mut stream = TcpStream::connect(addr).unwrap();
    let mut reader = BufReader::new(stream.try_clone().unwrap());

    assert_eq!(send(&mut stream, &mut reader, "PING\r\n"), "+OK\r\n");

    // a key that is not valid hex is dropped at the boundary
    let bad_key = "zz112233445566778899aabb";
    assert_eq!(
        send(&mut stream, &mut reader, &hincrby_frame(bad_key, "c", 5)),
        "+OK\r\n"
    );
    assert_eq!(store.count(), 0);

    // snapshots of invalid keys report the all-zero mapping
    let get_frame = format!("*2\r\n$3\r\nGET\r\n$24\r\n{bad_key}\r\n");
    let length_line = send(&mut stream, &mut reader, &get_frame);
    assert!(length_line.starts_with('$'));
    let mut body = String::new();
    reader.read_line(&mut body).unwrap();
    let snapshot: serde_json::Value = serde_json::from_str(body.trim_end()).unwrap();
    assert_eq!(snapshot["Total"], 0);
}

#[test]
fn increments_for_unknown_aliases_are_dropped() {
    let dir = tempdir().unwrap();
    let (store, addr) = spawn_server(&dir);
    store.put(&KEY, &[0, 0]).unwrap();
    let key_hex = encode_hex(&KEY);

    let mut stream = TcpStream::connect(addr).unwrap();
    let mut reader = BufReader::new(stream.try_clone().unwrap());

    assert_eq!(
        send(&mut stream, &mut reader, &hincrby_frame(&key_hex, "x", 5)),
        "+OK\r\n"
    );

    let totals = store.snapshot(&KEY, false).unwrap();
    assert_eq!(totals["Total"], 0);
}
