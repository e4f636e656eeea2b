// Copyright 2024 FastLabs Developers
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

#![allow(dead_code)]

use std::io::BufRead;
use std::io::BufReader;
use std::io::Read;
use std::io::Write;
use std::net::TcpListener;
use std::net::TcpStream;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;

use logfan::Error;
use logfan::append::Sink;

/// An in-memory sink keeping one entry per record, without the trailing newline.
#[derive(Debug, Default)]
pub struct Capture {
    records: Mutex<Vec<String>>,
}

impl Capture {
    pub fn records(&self) -> Vec<String> {
        self.records.lock().unwrap().clone()
    }
}

impl Sink for Capture {
    fn write(&self, bytes: &[u8]) -> Result<(), Error> {
        let record = String::from_utf8_lossy(bytes);
        let record = record.strip_suffix('\n').unwrap_or(&record).to_string();
        self.records.lock().unwrap().push(record);
        Ok(())
    }
}

/// A sink that rejects every write and counts the attempts.
#[derive(Debug, Default)]
pub struct Failing {
    attempts: AtomicUsize,
    closed: AtomicUsize,
}

impl Failing {
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    pub fn closed(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }
}

impl Sink for Failing {
    fn write(&self, _: &[u8]) -> Result<(), Error> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(Error::new("disk on fire"))
    }

    fn close(&self) -> Result<(), Error> {
        self.closed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// A minimal HTTP/1.1 responder recording every request body.
pub struct Responder {
    pub url: String,
    pub bodies: Arc<Mutex<Vec<String>>>,
}

impl Responder {
    pub fn start(status: u16) -> Responder {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}/ingest", listener.local_addr().unwrap());
        let bodies = Arc::new(Mutex::new(vec![]));

        let recorded = bodies.clone();
        std::thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(stream) = stream else { break };
                let Some((body, stream)) = read_request(stream) else {
                    continue;
                };
                recorded.lock().unwrap().push(body);
                let _ = respond(stream, status);
            }
        });

        Responder { url, bodies }
    }

    pub fn bodies(&self) -> Vec<String> {
        self.bodies.lock().unwrap().clone()
    }
}

fn read_request(stream: TcpStream) -> Option<(String, TcpStream)> {
    let mut reader = BufReader::new(stream.try_clone().ok()?);
    let mut content_length = 0;
    loop {
        let mut line = String::new();
        if reader.read_line(&mut line).ok()? == 0 {
            return None;
        }
        let line = line.trim_end();
        if line.is_empty() {
            break;
        }
        if let Some((name, value)) = line.split_once(':') {
            if name.eq_ignore_ascii_case("content-length") {
                content_length = value.trim().parse().ok()?;
            }
        }
    }

    let mut body = vec![0; content_length];
    reader.read_exact(&mut body).ok()?;
    Some((String::from_utf8(body).ok()?, stream))
}

fn respond(mut stream: TcpStream, status: u16) -> std::io::Result<()> {
    write!(
        stream,
        "HTTP/1.1 {status} Whatever\r\nContent-Length: 2\r\nConnection: close\r\n\r\nok"
    )?;
    stream.flush()
}

/// A URL nothing listens on.
pub fn refused_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}/ingest")
}
