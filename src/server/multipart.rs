//! Minimal multipart/form-data parsing.
//!
//! The upload endpoints accept small forms (one audio file plus a few text
//! fields), so a dependency-free parser over the collected body is enough.
//! Not streaming; the whole body is in memory before parsing starts.

use crate::error::{Result, VoxError};

/// One part of a multipart form.
#[derive(Debug, Clone, PartialEq)]
pub struct MultipartField {
    pub name: String,
    pub filename: Option<String>,
    pub data: Vec<u8>,
}

/// A parsed multipart form with lookup by field name.
#[derive(Debug)]
pub struct MultipartForm {
    fields: Vec<MultipartField>,
}

impl MultipartForm {
    /// Parse a request body given its Content-Type header value.
    pub fn parse(body: &[u8], content_type: &str) -> Result<Self> {
        let boundary = extract_boundary(content_type).ok_or_else(|| {
            VoxError::invalid_input("Content-Type is not multipart/form-data with a boundary")
        })?;
        Ok(Self {
            fields: parse_parts(body, &boundary),
        })
    }

    /// First field with the given name.
    pub fn field(&self, name: &str) -> Option<&MultipartField> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// A field's value as trimmed UTF-8 text, if present.
    pub fn text_field(&self, name: &str) -> Option<String> {
        self.field(name)
            .map(|f| String::from_utf8_lossy(&f.data).trim().to_string())
    }

    /// A required field, as an input validation error when missing.
    pub fn require(&self, name: &str) -> Result<&MultipartField> {
        self.field(name)
            .ok_or_else(|| VoxError::invalid_input(format!("missing form field '{}'", name)))
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

fn extract_boundary(content_type: &str) -> Option<String> {
    content_type
        .split(';')
        .map(|s| s.trim())
        .find(|s| s.starts_with("boundary="))
        .map(|s| s["boundary=".len()..].trim_matches('"').to_string())
}

fn parse_parts(body: &[u8], boundary: &str) -> Vec<MultipartField> {
    let delim = format!("--{}", boundary);
    let delim_bytes = delim.as_bytes();
    let mut fields = Vec::new();
    let mut pos = 0;

    loop {
        let boundary_at = match find(&body[pos..], delim_bytes) {
            Some(p) => pos + p,
            None => break,
        };
        pos = boundary_at + delim_bytes.len();

        // Closing boundary carries a trailing "--".
        if body[pos..].starts_with(b"--") {
            break;
        }
        if body[pos..].starts_with(b"\r\n") {
            pos += 2;
        }

        let headers_end = match find(&body[pos..], b"\r\n\r\n") {
            Some(p) => pos + p,
            None => break,
        };
        let headers = String::from_utf8_lossy(&body[pos..headers_end]);
        let data_start = headers_end + 4;

        let data_end = match find(&body[data_start..], delim_bytes) {
            Some(p) => {
                let end = data_start + p;
                // Strip the CRLF that precedes the next boundary.
                if end >= data_start + 2 && &body[end - 2..end] == b"\r\n" {
                    end - 2
                } else {
                    end
                }
            }
            None => body.len(),
        };

        if let Some(name) = disposition_param(&headers, "name") {
            fields.push(MultipartField {
                name,
                filename: disposition_param(&headers, "filename"),
                data: body[data_start..data_end].to_vec(),
            });
        }

        pos = data_start;
    }

    fields
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

fn disposition_param(headers: &str, param: &str) -> Option<String> {
    let search = format!("{}=\"", param);
    let start = headers.find(&search)? + search.len();
    let end = headers[start..].find('"')?;
    Some(headers[start..start + end].to_string())
}
