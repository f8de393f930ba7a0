use std::error::Error;
use std::io::{self, BufRead, Write};

use anyhow::anyhow;
use http_hmac::mock_message::{MockRequest, MockResponse};
use http_hmac::{
    keyed_hash_by_name, MessageLike, Signer, SignerConfig, Version1, DEFAULT_PROVIDER,
};
use structopt::StructOpt;

#[derive(Debug, StructOpt)]
enum Mode {
    /// Print the canonical message that would be signed.
    Canonicalize,
    /// Write the message back out with an `Authorization` header attached.
    Sign,
    /// Check the `Authorization` header of the message.
    Verify,
}

#[derive(Debug, StructOpt)]
#[structopt(about = "Signs and verifies HMAC-authenticated HTTP messages read from stdin.")]
struct Opt {
    #[structopt(subcommand)]
    mode: Mode,

    /// The provider label prefixing the Authorization header.
    #[structopt(short, long, global = true, default_value = DEFAULT_PROVIDER)]
    provider: String,

    /// Candidate timestamp headers, in order of preference (defaults to Date).
    #[structopt(short, long = "timestamp-header", global = true, number_of_values = 1)]
    timestamp_headers: Vec<String>,

    /// Additional headers folded into the signature, in order.
    #[structopt(short, long = "custom-header", global = true, number_of_values = 1)]
    custom_headers: Vec<String>,

    /// The credential id to sign with.
    #[structopt(short, long, global = true)]
    id: Option<String>,

    /// The secret key.
    #[structopt(short, long, global = true)]
    secret: Option<String>,

    /// One of: hmac-sha256, hmac-sha512.
    #[structopt(short, long, global = true, default_value = "hmac-sha256")]
    algorithm: String,

    /// Read a response rather than a request.
    #[structopt(short, long, global = true)]
    response: bool,
}

/// A message read from stdin.
enum Message {
    Request(MockRequest),
    Response(MockResponse),
}

impl Message {
    fn from_reader<R: BufRead>(reader: &mut R, response: bool) -> Result<Self, Box<dyn Error>> {
        Ok(if response {
            Message::Response(MockResponse::from_reader(reader)?)
        } else {
            Message::Request(MockRequest::from_reader(reader)?)
        })
    }

    fn as_message(&self) -> &dyn MessageLike {
        match self {
            Message::Request(req) => req,
            Message::Response(res) => res,
        }
    }

    fn with_header(self, name: &str, value: &str) -> Self {
        match self {
            Message::Request(req) => Message::Request(req.with_header(name, value)),
            Message::Response(res) => Message::Response(res.with_header(name, value)),
        }
    }

    fn write<W: Write>(&self, writer: &mut W) -> Result<(), Box<dyn Error>> {
        match self {
            Message::Request(req) => req.write(writer),
            Message::Response(res) => res.write(writer),
        }
    }
}

impl Opt {
    fn signer(&self) -> Result<Signer, Box<dyn Error>> {
        let mut config = SignerConfig::new()
            .with_provider(&self.provider)
            .with_custom_headers(&self.custom_headers)?;
        if !self.timestamp_headers.is_empty() {
            config = config.with_timestamp_headers(&self.timestamp_headers)?;
        }

        let keyed_hash = keyed_hash_by_name(&self.algorithm)
            .ok_or_else(|| anyhow!("Unknown algorithm: {}", self.algorithm))?;

        Ok(Signer::new(config, Version1::with_shared_algorithm(keyed_hash))?)
    }

    fn secret(&self) -> Result<&[u8], Box<dyn Error>> {
        Ok(self
            .secret
            .as_deref()
            .ok_or_else(|| anyhow!("No secret key provided"))?
            .as_bytes())
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let opt = Opt::from_args();
    let signer = opt.signer()?;

    let message = Message::from_reader(&mut io::stdin().lock(), opt.response)?;

    log::info!("{:?}", message.as_message().start_line());

    match opt.mode {
        Mode::Canonicalize => {
            let res = signer
                .digest()
                .canonicalize(&signer, message.as_message())?;
            io::stdout().lock().write_all(res.as_bytes())?;
        }
        Mode::Sign => {
            let id = opt.id.as_deref().ok_or_else(|| anyhow!("No id provided"))?;
            let auth = signer.authorization(message.as_message(), id, opt.secret()?)?;
            message
                .with_header("Authorization", &auth)
                .write(&mut io::stdout().lock())?;
        }
        Mode::Verify => {
            let signature = signer.verify(message.as_message(), opt.secret()?)?;
            println!(
                "id={} timestamp={}",
                signature.id(),
                signature.timestamp().to_rfc3339()
            );
        }
    }

    Ok(())
}
