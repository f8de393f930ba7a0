use http::header::{HeaderName, HeaderValue, AUTHORIZATION};

use super::*;
use crate::message::combined_header;

fn target_from_url(url: &url::Url) -> String {
    match url.query() {
        Some(query) => format!("{}?{}", url.path(), query),
        None => url.path().into(),
    }
}

impl MessageLike for reqwest::Request {
    fn header(&self, header: &HeaderName) -> Option<HeaderValue> {
        combined_header(self.headers(), header)
    }
    fn body(&self) -> Option<&[u8]> {
        match reqwest::Request::body(self) {
            Some(body) => body.as_bytes(),
            None => Some(&[]),
        }
    }
    fn start_line(&self) -> StartLine {
        StartLine::Request {
            method: self.method().clone(),
            target: target_from_url(self.url()),
        }
    }
}

impl MessageLike for reqwest::blocking::Request {
    fn header(&self, header: &HeaderName) -> Option<HeaderValue> {
        combined_header(self.headers(), header)
    }
    fn body(&self) -> Option<&[u8]> {
        match reqwest::blocking::Request::body(self) {
            Some(body) => body.as_bytes(),
            None => Some(&[]),
        }
    }
    fn start_line(&self) -> StartLine {
        StartLine::Request {
            method: self.method().clone(),
            target: target_from_url(self.url()),
        }
    }
}

/// Extension methods attaching an `Authorization` header to outgoing requests.
pub trait SigningExt: Sized {
    /// Consumes the request and returns it signed.
    fn signed(mut self, signer: &Signer, id: &str, secret_key: &[u8]) -> Result<Self> {
        self.sign(signer, id, secret_key)?;
        Ok(self)
    }

    /// Signs the request in place.
    fn sign(&mut self, signer: &Signer, id: &str, secret_key: &[u8]) -> Result<()>;
}

impl SigningExt for reqwest::Request {
    fn sign(&mut self, signer: &Signer, id: &str, secret_key: &[u8]) -> Result<()> {
        let value = signer.authorization_header(&*self, id, secret_key)?;
        self.headers_mut().insert(AUTHORIZATION, value);
        Ok(())
    }
}

impl SigningExt for reqwest::blocking::Request {
    fn sign(&mut self, signer: &Signer, id: &str, secret_key: &[u8]) -> Result<()> {
        let value = signer.authorization_header(&*self, id, secret_key)?;
        self.headers_mut().insert(AUTHORIZATION, value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{offset::TimeZone, Utc};
    use http::header::{CONTENT_TYPE, DATE};

    use super::*;

    fn date() -> String {
        Utc.with_ymd_and_hms(2014, 7, 8, 9, 10, 11)
            .single()
            .expect("valid date")
            .format("%a, %d %b %Y %T GMT")
            .to_string()
    }

    #[test]
    fn it_works() {
        let signer = Signer::default();

        let client = reqwest::Client::new();

        let without_sig = client
            .post("http://test.com/foo/bar?baz=1")
            .header(CONTENT_TYPE, "application/json")
            .header(DATE, date())
            .body(&br#"{ "x": 1, "y": 2}"#[..])
            .build()
            .unwrap();

        assert_eq!(
            without_sig.start_line(),
            StartLine::Request {
                method: http::Method::POST,
                target: "/foo/bar?baz=1".into(),
            }
        );

        let with_sig = without_sig.signed(&signer, "testkey", b"abcdefgh").unwrap();
        let auth = with_sig.headers().get(AUTHORIZATION).unwrap().to_str().unwrap();
        assert!(auth.starts_with("Acquia testkey:"));

        assert_eq!(signer.verify(&with_sig, b"abcdefgh").unwrap().id(), "testkey");
    }

    #[test]
    fn it_works_blocking() {
        let signer = Signer::default();

        let client = reqwest::blocking::Client::new();

        let without_sig = client
            .post("http://test.com/foo/bar?baz=1")
            .header(CONTENT_TYPE, "application/json")
            .header(DATE, date())
            .body(&br#"{ "x": 1, "y": 2}"#[..])
            .build()
            .unwrap();

        let with_sig = without_sig.signed(&signer, "testkey", b"abcdefgh").unwrap();
        assert_eq!(signer.verify(&with_sig, b"abcdefgh").unwrap().id(), "testkey");
    }

    #[test]
    fn async_and_blocking_agree() {
        let signer = Signer::default();

        let req = reqwest::Client::new()
            .get("http://test.com/foo")
            .header(CONTENT_TYPE, "text/plain")
            .header(DATE, date())
            .build()
            .unwrap();
        let blocking_req = reqwest::blocking::Client::new()
            .get("http://test.com/foo")
            .header(CONTENT_TYPE, "text/plain")
            .header(DATE, date())
            .build()
            .unwrap();

        assert_eq!(
            signer.sign_message(&req, b"secret").unwrap(),
            signer.sign_message(&blocking_req, b"secret").unwrap()
        );
    }

    #[test]
    fn missing_date_is_reported() {
        let signer = Signer::default();

        let req = reqwest::Client::new()
            .get("http://test.com/foo")
            .header(CONTENT_TYPE, "text/plain")
            .build()
            .unwrap();

        assert_eq!(
            req.signed(&signer, "testkey", b"secret").unwrap_err(),
            HmacError::MalformedMessage("Date header required".into())
        );
    }
}
