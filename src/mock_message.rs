use std::error::Error;
use std::fmt::{self, Display};
use std::io::{BufRead, Write};

use anyhow::Context;
use http::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_LENGTH};
use http::{Method, StatusCode};
use url::Url;

use crate::message::{combined_header, MessageLike, StartLine};

/// Generic error returned when the input to `from_reader` does not look like
/// a HTTP message.
#[derive(Debug)]
pub struct ParseError;

impl Error for ParseError {}
impl Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("Malformed HTTP message")
    }
}

#[derive(Debug, Clone, PartialEq)]
enum MockBody {
    Bytes(Vec<u8>),
    Unreadable,
}

/// Headers and body shared by mock requests and responses.
#[derive(Debug, Clone, PartialEq, Default)]
struct MockParts {
    headers: HeaderMap,
    body: Option<MockBody>,
}

impl MockParts {
    fn set_header(&mut self, name: &str, value: &str) {
        self.headers.insert(
            HeaderName::from_bytes(name.as_bytes()).unwrap(),
            HeaderValue::from_bytes(value.as_bytes()).unwrap(),
        );
    }

    fn set_body(&mut self, body: Vec<u8>) {
        let l = body.len();
        self.body = Some(MockBody::Bytes(body));
        self.set_header(CONTENT_LENGTH.as_str(), &l.to_string());
    }

    fn body(&self) -> Option<&[u8]> {
        match &self.body {
            None => Some(&[]),
            Some(MockBody::Bytes(body)) => Some(body),
            Some(MockBody::Unreadable) => None,
        }
    }

    /// Reads header lines up to the blank line, then the body if one follows.
    fn from_reader<R: BufRead>(reader: &mut R) -> Result<Self, Box<dyn Error>> {
        let mut line = String::new();
        let mut headers = HeaderMap::new();
        let has_body = loop {
            line.truncate(0);
            if reader.read_line(&mut line)? == 0 {
                break false;
            }
            if line.trim().is_empty() {
                break true;
            }

            let mut parts = line.splitn(2, ':');

            let name_str = parts.next().ok_or(ParseError)?.trim();
            let header_name: HeaderName = name_str
                .parse()
                .with_context(|| format!("{:?}", name_str))?;
            let value_str = parts.next().ok_or(ParseError)?.trim();
            let header_value: HeaderValue = value_str
                .parse()
                .with_context(|| format!("{:?}", value_str))?;
            headers.append(header_name, header_value);
        };

        let body = if has_body {
            let mut body = Vec::new();
            reader.read_to_end(&mut body)?;
            Some(MockBody::Bytes(body))
        } else {
            None
        };

        Ok(Self { headers, body })
    }

    fn write<W: Write>(&self, writer: &mut W) -> Result<(), Box<dyn Error>> {
        for (header_name, header_value) in &self.headers {
            writeln!(
                writer,
                "{}: {}",
                header_name.as_str(),
                header_value.to_str()?
            )?;
        }

        if let Some(MockBody::Bytes(body)) = &self.body {
            writeln!(writer)?;
            writer.write_all(body)?;
        }

        Ok(())
    }
}

/// A mock request type
#[derive(Debug, Clone, PartialEq)]
pub struct MockRequest {
    method: Method,
    path: String,
    parts: MockParts,
}

impl MockRequest {
    /// Returns the method used by this mock request
    pub fn method(&self) -> Method {
        self.method.clone()
    }
    /// Returns the path used by this mock request
    pub fn path(&self) -> &str {
        &self.path
    }
    /// Returns the headers used by this mock request
    pub fn headers(&self) -> &HeaderMap {
        &self.parts.headers
    }

    /// Constructs a new mock request
    pub fn new(method: Method, url: &str) -> Self {
        let url: Url = url.parse().unwrap();

        let path = if let Some(query) = url.query() {
            format!("{}?{}", url.path(), query)
        } else {
            url.path().into()
        };
        let mut res = Self {
            method,
            path,
            parts: MockParts::default(),
        };
        if let Some(host) = url.host_str().map(ToOwned::to_owned) {
            res = res.with_header("Host", &host)
        }
        res
    }
    /// Convenience method for setting a header
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.parts.set_header(name, value);
        self
    }
    /// Method for setting a request body
    pub fn with_body(mut self, body: Vec<u8>) -> Self {
        self.parts.set_body(body);
        self
    }
    /// Marks the body as present but unreadable, like a streamed body.
    pub fn with_unreadable_body(mut self) -> Self {
        self.parts.body = Some(MockBody::Unreadable);
        self
    }

    /// Parse a HTTP request into this mock request object
    pub fn from_reader<R: BufRead>(reader: &mut R) -> Result<Self, Box<dyn Error>> {
        let mut line = String::new();

        // Read request line
        reader.read_line(&mut line)?;
        let mut parts = line.split_ascii_whitespace();

        // Extract method
        let method: Method = parts.next().ok_or(ParseError)?.parse()?;

        // Extract path
        let path: String = parts.next().ok_or(ParseError)?.parse()?;

        Ok(Self {
            method,
            path,
            parts: MockParts::from_reader(reader)?,
        })
    }

    /// Write out this HTTP request in standard format
    pub fn write<W: Write>(&self, writer: &mut W) -> Result<(), Box<dyn Error>> {
        writeln!(writer, "{} {} HTTP/1.1", self.method.as_str(), self.path)?;
        self.parts.write(writer)
    }
}

impl MessageLike for MockRequest {
    fn header(&self, header: &HeaderName) -> Option<HeaderValue> {
        combined_header(&self.parts.headers, header)
    }
    fn body(&self) -> Option<&[u8]> {
        self.parts.body()
    }
    fn start_line(&self) -> StartLine {
        StartLine::Request {
            method: self.method.clone(),
            target: self.path.clone(),
        }
    }
}

/// A mock response type
#[derive(Debug, Clone, PartialEq)]
pub struct MockResponse {
    status: StatusCode,
    parts: MockParts,
}

impl MockResponse {
    /// Constructs a new mock response
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            parts: MockParts::default(),
        }
    }
    /// Returns the status of this mock response
    pub fn status(&self) -> StatusCode {
        self.status
    }
    /// Returns the headers used by this mock response
    pub fn headers(&self) -> &HeaderMap {
        &self.parts.headers
    }
    /// Convenience method for setting a header
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.parts.set_header(name, value);
        self
    }
    /// Method for setting a response body
    pub fn with_body(mut self, body: Vec<u8>) -> Self {
        self.parts.set_body(body);
        self
    }

    /// Parse a HTTP response into this mock response object
    pub fn from_reader<R: BufRead>(reader: &mut R) -> Result<Self, Box<dyn Error>> {
        let mut line = String::new();

        // Read status line
        reader.read_line(&mut line)?;
        let mut parts = line.split_ascii_whitespace();

        // Skip the version, extract the status code
        parts.next().ok_or(ParseError)?;
        let status: StatusCode = parts.next().ok_or(ParseError)?.parse()?;

        Ok(Self {
            status,
            parts: MockParts::from_reader(reader)?,
        })
    }

    /// Write out this HTTP response in standard format
    pub fn write<W: Write>(&self, writer: &mut W) -> Result<(), Box<dyn Error>> {
        writeln!(writer, "HTTP/1.1 {}", self.status)?;
        self.parts.write(writer)
    }
}

impl MessageLike for MockResponse {
    fn header(&self, header: &HeaderName) -> Option<HeaderValue> {
        combined_header(&self.parts.headers, header)
    }
    fn body(&self) -> Option<&[u8]> {
        self.parts.body()
    }
    fn start_line(&self) -> StartLine {
        StartLine::Response {
            status: self.status,
        }
    }
}
