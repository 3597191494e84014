#![allow(dead_code)]

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;

/// What the stub server saw for one request.
#[derive(Debug, Clone)]
pub struct Captured {
    pub head: String,
    pub body: String,
}

impl Captured {
    /// `GET /path?query` from the request line.
    pub fn request_line(&self) -> &str {
        self.head.lines().next().unwrap_or_default()
    }

    pub fn header(&self, name: &str) -> Option<String> {
        let prefix = format!("{}:", name.to_ascii_lowercase());
        self.head
            .lines()
            .find(|line| line.to_ascii_lowercase().starts_with(&prefix))
            .map(|line| line[prefix.len()..].trim().to_string())
    }
}

/// Serves the canned `(status line, body)` responses in order, one per
/// connection, and reports each request. Returns the server's base url.
pub fn serve_sequence(responses: Vec<(&str, &str)>) -> (String, mpsc::Receiver<Captured>) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind stub server");
    let addr = listener.local_addr().expect("local addr");
    let responses: Vec<String> = responses
        .into_iter()
        .map(|(status_line, body)| {
            format!(
                "HTTP/1.1 {status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            )
        })
        .collect();
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        for response in responses {
            let Ok((mut stream, _)) = listener.accept() else {
                return;
            };
            let captured = read_request(&mut stream);
            let _ = stream.write_all(response.as_bytes());
            let _ = stream.flush();
            if tx.send(captured).is_err() {
                return;
            }
        }
    });
    (format!("http://{addr}"), rx)
}

pub fn serve_once(status_line: &str, body: &str) -> (String, mpsc::Receiver<Captured>) {
    serve_sequence(vec![(status_line, body)])
}

fn read_request(stream: &mut TcpStream) -> Captured {
    let mut raw = Vec::new();
    let mut buf = [0u8; 4096];
    let head_end = loop {
        if let Some(pos) = raw.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
        match stream.read(&mut buf) {
            Ok(0) | Err(_) => break raw.len(),
            Ok(n) => raw.extend_from_slice(&buf[..n]),
        }
    };
    let head = String::from_utf8_lossy(&raw[..head_end]).into_owned();
    let content_length = head
        .lines()
        .find_map(|line| {
            let lower = line.to_ascii_lowercase();
            lower
                .strip_prefix("content-length:")
                .and_then(|v| v.trim().parse::<usize>().ok())
        })
        .unwrap_or(0);
    while raw.len() < head_end + content_length {
        match stream.read(&mut buf) {
            Ok(0) | Err(_) => break,
            Ok(n) => raw.extend_from_slice(&buf[..n]),
        }
    }
    let body_end = raw.len().min(head_end + content_length);
    Captured {
        head,
        body: String::from_utf8_lossy(&raw[head_end..body_end]).into_owned(),
    }
}

/// Fresh path under the temp dir; the file itself does not exist yet.
pub fn temp_db_path(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("ladder_sheet_{}_{name}", std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    dir.join("battles.sqlite")
}

pub const TWO_LADDER_BATTLES: &str = r#"[
    {"battleTime": "T1", "gameMode": {"name": "Ladder"},
     "team": [{"trophyChange": 10, "startingTrophies": 100}]},
    {"battleTime": "TX", "gameMode": {"name": "Friendly"},
     "team": [{"trophyChange": 0, "startingTrophies": 0}]},
    {"battleTime": "T2", "gameMode": {"name": "Ladder"},
     "team": [{"trophyChange": -5, "startingTrophies": 110}]}
]"#;
