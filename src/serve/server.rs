//! A single-user HTTP front end for the dashboard.
//!
//! Requests are handled one at a time, in the order they arrive: an upload is
//! fully analyzed and rendered before the next request is read.
//!
//! | Method | Path                  | Response                              |
//! |--------|-----------------------|---------------------------------------|
//! | GET    | `/`, `/index.html`    | the upload form                       |
//! | POST   | `/analyze?name=<file>`| the dashboard for the request body    |
//! | GET    | `/health`             | `ok`                                  |

use std::fmt;
use std::io::Cursor;
use std::io::Read;

use anyhow::anyhow;
use tiny_http::Header;
use tiny_http::Method;
use tiny_http::Response;
use tiny_http::Server;
use tracing::error;
use tracing::info;
use tracing::warn;

use crate::dashboard::html;
use crate::dashboard::html::RenderOptions;
use crate::errors::Error;
use crate::pipeline::analyze_upload;
use crate::pipeline::PipelineConfig;

/// Where a request should be sent.
#[derive(Debug, PartialEq, Eq)]
pub enum Route {
    /// The upload form.
    Index,

    /// Liveness check.
    Health,

    /// Analyze the request body, stored under the given file name.
    Analyze {
        /// The file name supplied by the client (possibly empty).
        name: String,
    },

    /// The path exists but not for this method.
    MethodNotAllowed,

    /// Nothing is served at this path.
    NotFound,
}

/// Decodes a `application/x-www-form-urlencoded` value. Malformed escapes are
/// kept as-is.
pub fn percent_decode(value: &str) -> String {
    let bytes = value.as_bytes();
    let mut decoded = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'+' => decoded.push(b' '),
            b'%' if i + 2 < bytes.len() => {
                let hex = std::str::from_utf8(&bytes[i + 1..i + 3])
                    .ok()
                    .and_then(|h| u8::from_str_radix(h, 16).ok());

                match hex {
                    Some(byte) => {
                        decoded.push(byte);
                        i += 2;
                    }
                    None => decoded.push(b'%'),
                }
            }
            byte => decoded.push(byte),
        }
        i += 1;
    }

    String::from_utf8_lossy(&decoded).into_owned()
}

/// Gets a query parameter from a request URL.
pub fn query_param(url: &str, key: &str) -> Option<String> {
    let (_, query) = url.split_once('?')?;

    query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(k, _)| *k == key)
        .map(|(_, v)| percent_decode(v))
}

/// Decides where a request goes.
pub fn route(method: &Method, url: &str) -> Route {
    let path = match url.split_once('?') {
        Some((path, _)) => path,
        None => url,
    };

    match (method, path) {
        (Method::Get, "/") | (Method::Get, "/index.html") => Route::Index,
        (Method::Get, "/health") => Route::Health,
        (Method::Post, "/analyze") => Route::Analyze {
            name: query_param(url, "name").unwrap_or_default(),
        },
        (_, "/") | (_, "/index.html") | (_, "/health") | (_, "/analyze") => {
            Route::MethodNotAllowed
        }
        _ => Route::NotFound,
    }
}

/// Runs the pipeline on an uploaded body and renders the resulting page along
/// with its HTTP status code.
pub fn analyze<R>(
    config: &PipelineConfig,
    name: &str,
    body: &mut R,
) -> Result<(u16, String), fmt::Error>
where
    R: Read + ?Sized,
{
    match analyze_upload(config, name, body) {
        Ok(analysis) => {
            let dashboard = analysis.dashboard(config.seed);
            let page = html::render(&dashboard, RenderOptions { upload_form: true })?;
            Ok((200, page))
        }
        Err(e) if e.is_empty_input() => {
            info!("no file was uploaded; prompting again");
            let page = html::upload_page(Some("Please choose a BAM file before analyzing."))?;
            Ok((200, page))
        }
        Err(e) => {
            error!("analysis failed: {}", e);
            let status = match e {
                Error::MalformedReport { .. } => 422,
                _ => 500,
            };
            Ok((status, html::error_page(&e)?))
        }
    }
}

fn with_content_type(
    mut response: Response<Cursor<Vec<u8>>>,
    value: &str,
) -> Response<Cursor<Vec<u8>>> {
    match Header::from_bytes("Content-Type", value) {
        Ok(header) => response.add_header(header),
        Err(_) => warn!("invalid content type {:?}", value),
    }

    response
}

fn html_response(status: u16, page: Result<String, fmt::Error>) -> Response<Cursor<Vec<u8>>> {
    match page {
        Ok(body) => with_content_type(
            Response::from_string(body).with_status_code(status),
            "text/html; charset=utf-8",
        ),
        Err(e) => {
            error!("failed to render page: {}", e);
            text_response(500, "Failed to render page")
        }
    }
}

fn text_response(status: u16, body: &str) -> Response<Cursor<Vec<u8>>> {
    with_content_type(
        Response::from_string(body).with_status_code(status),
        "text/plain; charset=utf-8",
    )
}

/// The dashboard server.
pub struct DashboardServer {
    server: Server,
    config: PipelineConfig,
}

impl DashboardServer {
    /// Binds the server to `address` (e.g. `127.0.0.1:8501`).
    pub fn bind(address: &str, config: PipelineConfig) -> anyhow::Result<Self> {
        let server = Server::http(address)
            .map_err(|e| anyhow!("failed to start server on {}: {}", address, e))?;

        Ok(Self { server, config })
    }

    /// Serves requests until the process is interrupted.
    pub fn run(&self) -> anyhow::Result<()> {
        for mut request in self.server.incoming_requests() {
            let url = request.url().to_string();
            info!("{} {}", request.method(), url);

            let response = match route(request.method(), &url) {
                Route::Index => html_response(200, html::upload_page(None)),
                Route::Health => text_response(200, "ok"),
                Route::Analyze { name } => {
                    match analyze(&self.config, &name, request.as_reader()) {
                        Ok((status, page)) => html_response(status, Ok(page)),
                        Err(e) => html_response(500, Err(e)),
                    }
                }
                Route::MethodNotAllowed => text_response(405, "Method not allowed"),
                Route::NotFound => text_response(404, "Not found"),
            };

            if let Err(e) = request.respond(response) {
                warn!("failed to send response for {}: {}", url, e);
            }
        }

        Ok(())
    }
}
