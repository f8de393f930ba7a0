use http::header::{HeaderMap, HeaderName, HeaderValue};
use http::{Method, StatusCode};

/// The first line of an HTTP message, which decides the direction it travels in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartLine {
    /// A request, with its method and request target (path plus `?query`).
    Request {
        /// The request method.
        method: Method,
        /// The path, followed by `?` and the query string when one is present.
        target: String,
    },
    /// A response, with its status code.
    Response {
        /// The response status.
        status: StatusCode,
    },
}

/// Looks up `name` in `headers`, joining repeated fields with `", "` in the
/// order they appear so that every value takes part in the signature.
pub(crate) fn combined_header(headers: &HeaderMap, name: &HeaderName) -> Option<HeaderValue> {
    let mut values = headers.get_all(name).iter();
    let first = values.next()?;
    let mut rest = values.peekable();
    if rest.peek().is_none() {
        return Some(first.clone());
    }

    let mut combined = first.as_bytes().to_vec();
    for value in rest {
        combined.extend(b", ");
        combined.extend(value.as_bytes());
    }
    HeaderValue::from_bytes(&combined).ok()
}

impl StartLine {
    /// Builds a request start line from a method and a URI-like value.
    pub fn request(method: Method, uri: &http::Uri) -> Self {
        let target = uri
            .path_and_query()
            .map(|pq| pq.as_str().to_owned())
            .unwrap_or_else(|| "/".into());
        StartLine::Request { method, target }
    }
}

/// Read-only view over an HTTP request or response.
///
/// Implementations exist for the `http` crate's request and response types,
/// for the mock messages in [`crate::mock_message`], and (behind the `reqwest`
/// feature) for reqwest requests.
pub trait MessageLike {
    /// Returns an existing header on the message. Lookups must be
    /// case-insensitive, and implementations should never "guess" values for
    /// missing headers.
    fn header(&self, header: &HeaderName) -> Option<HeaderValue>;

    /// Returns true if this message contains a value for the specified header. If this
    /// returns true, following requests to `header()` for the same name must return a
    /// value.
    fn has_header(&self, header: &HeaderName) -> bool {
        self.header(header).is_some()
    }

    /// Returns the complete body of the message. A message without a body
    /// returns an empty slice; `None` means the body exists but cannot be
    /// read without consuming the message (for example a streamed body).
    fn body(&self) -> Option<&[u8]>;

    /// Returns the start line of the message.
    fn start_line(&self) -> StartLine;
}

impl<T: MessageLike + ?Sized> MessageLike for &T {
    fn header(&self, header: &HeaderName) -> Option<HeaderValue> {
        (**self).header(header)
    }
    fn has_header(&self, header: &HeaderName) -> bool {
        (**self).has_header(header)
    }
    fn body(&self) -> Option<&[u8]> {
        (**self).body()
    }
    fn start_line(&self) -> StartLine {
        (**self).start_line()
    }
}

impl<B: AsRef<[u8]>> MessageLike for http::Request<B> {
    fn header(&self, header: &HeaderName) -> Option<HeaderValue> {
        combined_header(self.headers(), header)
    }
    fn body(&self) -> Option<&[u8]> {
        Some(http::Request::body(self).as_ref())
    }
    fn start_line(&self) -> StartLine {
        StartLine::request(self.method().clone(), self.uri())
    }
}

impl<B: AsRef<[u8]>> MessageLike for http::Response<B> {
    fn header(&self, header: &HeaderName) -> Option<HeaderValue> {
        combined_header(self.headers(), header)
    }
    fn body(&self) -> Option<&[u8]> {
        Some(http::Response::body(self).as_ref())
    }
    fn start_line(&self) -> StartLine {
        StartLine::Response {
            status: self.status(),
        }
    }
}

#[cfg(test)]
mod tests {
    use http::header::CONTENT_TYPE;

    use super::*;

    #[test]
    fn http_request_lookup_is_case_insensitive() {
        let req = http::Request::post("http://example.com/resource/1?key=value")
            .header("Content-Type", "text/plain")
            .body(Vec::from(&b"hello"[..]))
            .unwrap();

        let name = HeaderName::from_bytes(b"CONTENT-TYPE").unwrap();
        assert!(req.has_header(&name));
        assert_eq!(req.header(&CONTENT_TYPE).unwrap(), "text/plain");
        assert_eq!(MessageLike::body(&req), Some(&b"hello"[..]));
        assert_eq!(
            req.start_line(),
            StartLine::Request {
                method: Method::POST,
                target: "/resource/1?key=value".into(),
            }
        );
    }

    #[test]
    fn http_response_start_line() {
        let res = http::Response::builder()
            .status(404)
            .body(String::new())
            .unwrap();
        assert_eq!(
            res.start_line(),
            StartLine::Response {
                status: StatusCode::NOT_FOUND
            }
        );
        assert_eq!(MessageLike::body(&res), Some(&b""[..]));
        assert!(!res.has_header(&CONTENT_TYPE));
    }

    #[test]
    fn repeated_headers_are_combined() {
        let mut req = http::Request::get("http://example.com/")
            .header("X-Foo", "a")
            .body(Vec::new())
            .unwrap();
        let name = HeaderName::from_static("x-foo");
        assert_eq!(req.header(&name).unwrap(), "a");

        req.headers_mut()
            .append("X-Foo", HeaderValue::from_static("evil"));
        assert_eq!(req.header(&name).unwrap(), "a, evil");
    }
}
