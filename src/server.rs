//! Local HTTP surface for the tracker page.
//!
//! Endpoints:
//!   GET  /               - tracker page
//!   GET  /api/state      - report as JSON
//!   GET  /api/chart      - radar chart payload
//!   GET  /api/health     - health check
//!   POST /api/xp/<slug>  - add one XP step to a category
//!   POST /api/reset      - reset all categories
//!
//! Connections are served one at a time on the calling thread.

use std::io::{BufRead, BufReader, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde_json::json;

use crate::logging::{log, log_request, obj, v_str, Domain, Level};
use crate::present::{radar_payload, render_html};
use crate::registry::Category;
use crate::session::{Intent, Session};
use crate::state::now;
use crate::storage::KvStore;

/// Upper bound on request bodies we are willing to drain.
const MAX_BODY: usize = 64 * 1024;
/// Per-connection read/write deadline; an idle socket must not hold the loop.
const IO_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub content_type: &'static str,
    pub body: String,
}

impl Response {
    fn json(status: u16, body: String) -> Self {
        Self { status, content_type: "application/json", body }
    }

    fn html(body: String) -> Self {
        Self { status: 200, content_type: "text/html; charset=utf-8", body }
    }

    fn not_found(what: &str) -> Self {
        Self::json(404, json!({ "error": what }).to_string())
    }

    fn reason(&self) -> &'static str {
        match self.status {
            200 => "OK",
            400 => "Bad Request",
            404 => "Not Found",
            405 => "Method Not Allowed",
            _ => "Internal Server Error",
        }
    }

    pub fn to_http(&self) -> String {
        format!(
            "HTTP/1.1 {} {}\r\n\
             Content-Type: {}\r\n\
             Content-Length: {}\r\n\
             Cache-Control: no-store\r\n\
             Connection: close\r\n\r\n{}",
            self.status,
            self.reason(),
            self.content_type,
            self.body.len(),
            self.body
        )
    }
}

/// Dispatch one request against the session.
pub fn route<K: KvStore>(
    session: &mut Session<K>,
    method: &str,
    target: &str,
    now: DateTime<Utc>,
) -> Response {
    let path = target.split('?').next().unwrap_or(target);
    match (method, path) {
        ("GET", "/") | ("GET", "/index.html") => {
            Response::html(render_html(&session.report(now), session.xp_step()))
        }
        ("GET", "/api/state") => state_response(session, now),
        ("GET", "/api/chart") => Response::json(200, radar_payload(&session.report(now)).to_string()),
        ("GET", "/api/health") => Response::json(200, r#"{"status":"ok"}"#.to_string()),
        ("POST", "/api/reset") => {
            session.apply(Intent::Reset, now);
            state_response(session, now)
        }
        ("POST", p) if p.starts_with("/api/xp/") => {
            let slug = &p["/api/xp/".len()..];
            match Category::from_name(slug) {
                Some(category) => {
                    session.apply(Intent::AddXp(category), now);
                    state_response(session, now)
                }
                None => Response::not_found("unknown category"),
            }
        }
        (_, "/") | (_, "/api/state") | (_, "/api/chart") | (_, "/api/health") | (_, "/api/reset") => {
            Response::json(405, json!({ "error": "method not allowed" }).to_string())
        }
        _ => Response::not_found("not found"),
    }
}

fn state_response<K: KvStore>(session: &Session<K>, now: DateTime<Utc>) -> Response {
    match serde_json::to_string(&session.report(now)) {
        Ok(body) => Response::json(200, body),
        Err(err) => Response::json(500, json!({ "error": err.to_string() }).to_string()),
    }
}

/// Read the request line, skip headers and drain any body.
fn read_request(stream: &TcpStream) -> Result<(String, String)> {
    let mut reader = BufReader::new(stream);
    let mut request_line = String::new();
    reader.read_line(&mut request_line)?;
    let mut parts = request_line.split_whitespace();
    let method = parts.next().unwrap_or_default().to_string();
    let target = parts.next().unwrap_or_default().to_string();

    let mut content_length = 0usize;
    loop {
        let mut header = String::new();
        if reader.read_line(&mut header)? == 0 {
            break;
        }
        let header = header.trim_end();
        if header.is_empty() {
            break;
        }
        if let Some((name, value)) = header.split_once(':') {
            if name.trim().eq_ignore_ascii_case("content-length") {
                content_length = value.trim().parse().unwrap_or(0);
            }
        }
    }
    if content_length > 0 {
        let mut body = vec![0u8; content_length.min(MAX_BODY)];
        reader.read_exact(&mut body)?;
    }
    Ok((method, target))
}

fn handle<K: KvStore>(session: &mut Session<K>, mut stream: TcpStream, timeout: Duration) -> Result<()> {
    stream.set_read_timeout(Some(timeout))?;
    stream.set_write_timeout(Some(timeout))?;
    let (method, target) = read_request(&stream)?;
    let response = if method.is_empty() {
        Response::json(400, json!({ "error": "bad request" }).to_string())
    } else {
        route(session, &method, &target, now())
    };
    log_request(&method, &target, response.status);
    stream.write_all(response.to_http().as_bytes())?;
    Ok(())
}

pub fn serve<K: KvStore>(session: &mut Session<K>, addr: &str) -> Result<()> {
    let listener = TcpListener::bind(addr).with_context(|| format!("failed to bind {}", addr))?;
    log(
        Level::Info,
        Domain::System,
        "listening",
        obj(&[("addr", v_str(addr)), ("msg", v_str(&format!("open http://{}", addr)))]),
    );

    for stream in listener.incoming() {
        let stream = match stream {
            Ok(s) => s,
            Err(_) => continue,
        };
        if let Err(err) = handle(session, stream, IO_TIMEOUT) {
            log(
                Level::Warn,
                Domain::Http,
                "connection_error",
                obj(&[("error", v_str(&format!("{:#}", err)))]),
            );
        }
    }
    Ok(())
}
