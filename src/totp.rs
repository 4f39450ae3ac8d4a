//! Time-based one-time passwords (RFC 6238).

use std::io::{BufRead, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use data_encoding::{Encoding, BASE32_NOPAD, HEXLOWER, HEXLOWER_PERMISSIVE};
use hmac::digest::KeyInit;
use hmac::{Hmac, Mac};
use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, CONTROLS};
use rand::rngs::OsRng;
use rand::RngCore;
use sha1::Sha1;
use sha2::{Sha256, Sha512};
use url::Url;

use crate::err::Error;

const URI_PREFIX: &str = "otpauth://";
const SECRET_LEN: usize = 20;
const DEFAULT_DIGITS: u32 = 6;
const DEFAULT_PERIOD: u64 = 30;
const MIN_DIGITS: u32 = 6;
const MAX_DIGITS: u32 = 10;
const WAIT_SLICE: Duration = Duration::from_secs(1);

// Escaped in the label path segment. `%` keeps labels round-tripping and
// `/` keeps them in one segment.
const LABEL_ESCAPE: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecretFormat {
    Uri,
    Base32,
    Hex,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Algorithm {
    #[default]
    Sha1,
    Sha256,
    Sha512,
}

impl Algorithm {
    fn parse(s: &str) -> Result<Algorithm, Error> {
        match s.to_uppercase().as_str() {
            "SHA1" => Ok(Algorithm::Sha1),
            "SHA256" => Ok(Algorithm::Sha256),
            "SHA512" => Ok(Algorithm::Sha512),
            _ => Err(Error::InvalidSecret(format!("unknown algorithm {:?}", s))),
        }
    }

    fn name(self) -> &'static str {
        match self {
            Algorithm::Sha1 => "SHA1",
            Algorithm::Sha256 => "SHA256",
            Algorithm::Sha512 => "SHA512",
        }
    }
}

/// Guess the encoding of a secret read from input.
pub fn classify(source: &str) -> Result<SecretFormat, Error> {
    if source.is_empty() {
        return Err(Error::InvalidSecret("empty secret".to_owned()));
    }

    if source.starts_with(URI_PREFIX) {
        Ok(SecretFormat::Uri)
    } else if source
        .bytes()
        .all(|b| b.is_ascii_uppercase() || (b'2'..=b'7').contains(&b))
    {
        Ok(SecretFormat::Base32)
    } else if source.bytes().all(|b| b.is_ascii_hexdigit()) {
        Ok(SecretFormat::Hex)
    } else {
        Err(Error::InvalidSecret(
            "not an otpauth uri, base32 or hex".to_owned(),
        ))
    }
}

/// Read one secret line. Trailing whitespace is dropped.
pub fn read_secret<R: BufRead>(mut r: R) -> Result<String, Error> {
    let mut line = String::new();
    if r.read_line(&mut line)? == 0 {
        return Err(Error::Eof);
    }
    Ok(line.trim_end().to_owned())
}

/// One generated code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub token: String,
    pub counter: u64,
    /// Unix time at which the next code starts.
    pub expire_time: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Totp {
    key: Vec<u8>,
    digits: u32,
    period: u64,
    algorithm: Algorithm,
    label: Option<String>,
    issuer: Option<String>,
}

impl Totp {
    pub fn from_key(key: Vec<u8>) -> Totp {
        Totp {
            key,
            digits: DEFAULT_DIGITS,
            period: DEFAULT_PERIOD,
            algorithm: Algorithm::default(),
            label: None,
            issuer: None,
        }
    }

    /// A fresh random secret.
    pub fn new(label: Option<&str>) -> Totp {
        let mut key = vec![0u8; SECRET_LEN];
        OsRng.fill_bytes(&mut key);

        let mut totp = Totp::from_key(key);
        totp.label = label.filter(|l| !l.is_empty()).map(str::to_owned);
        totp
    }

    /// Create a secret to be printed as `format`. The uri format needs a label.
    pub fn create(label: Option<&str>, format: SecretFormat) -> Result<(Totp, String), Error> {
        if format == SecretFormat::Uri && label.map_or(true, str::is_empty) {
            return Err(Error::MissingLabel);
        }

        let totp = Totp::new(label);
        let encoded = totp.format(format)?;
        Ok((totp, encoded))
    }

    /// Decode `source`, classifying it unless `format` is given.
    pub fn load(source: &str, format: Option<SecretFormat>) -> Result<Totp, Error> {
        let format = match format {
            Some(format) => format,
            None => classify(source)?,
        };
        tracing::debug!(?format, "loading secret");

        match format {
            SecretFormat::Uri => Totp::from_uri(source),
            SecretFormat::Base32 => decode_base32(source).map(Totp::from_key),
            SecretFormat::Hex => HEXLOWER_PERMISSIVE
                .decode(source.as_bytes())
                .map(Totp::from_key)
                .map_err(|e| Error::InvalidSecret(e.to_string())),
        }
    }

    pub fn from_uri(source: &str) -> Result<Totp, Error> {
        let url = Url::parse(source).map_err(|e| Error::InvalidSecret(e.to_string()))?;
        if url.scheme() != "otpauth" || url.host_str() != Some("totp") {
            return Err(Error::InvalidSecret(
                "only otpauth://totp/ uris are supported".to_owned(),
            ));
        }

        let label = percent_decode_str(url.path().trim_start_matches('/'))
            .decode_utf8()
            .map_err(|e| Error::InvalidSecret(e.to_string()))?;

        let mut key = None;
        let mut totp = Totp::from_key(Vec::new());
        totp.label = Some(label.into_owned()).filter(|l| !l.is_empty());

        for (name, value) in url.query_pairs() {
            match &*name {
                "secret" => key = Some(decode_base32(&value)?),
                "digits" => {
                    totp.digits = value
                        .parse::<u32>()
                        .ok()
                        .filter(|d| (MIN_DIGITS..=MAX_DIGITS).contains(d))
                        .ok_or_else(|| {
                            Error::InvalidSecret(format!("unsupported digits {:?}", value))
                        })?
                }
                "period" => {
                    totp.period = value
                        .parse::<u64>()
                        .ok()
                        .filter(|&p| p > 0)
                        .ok_or_else(|| {
                            Error::InvalidSecret(format!("invalid period {:?}", value))
                        })?
                }
                "algorithm" => totp.algorithm = Algorithm::parse(&value)?,
                "issuer" => totp.issuer = Some(value.into_owned()),
                other => tracing::debug!("ignoring uri parameter {}", other),
            }
        }

        totp.key = key.ok_or_else(|| Error::InvalidSecret("uri has no secret".to_owned()))?;
        Ok(totp)
    }

    pub fn to_uri(&self) -> Result<String, Error> {
        let label = self.label.as_deref().ok_or(Error::MissingLabel)?;

        let mut url =
            Url::parse("otpauth://totp/").map_err(|e| Error::InvalidSecret(e.to_string()))?;
        url.set_path(&format!("/{}", utf8_percent_encode(label, LABEL_ESCAPE)));
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("secret", &BASE32_NOPAD.encode(&self.key));
            if let Some(issuer) = &self.issuer {
                query.append_pair("issuer", issuer);
            }
            if self.algorithm != Algorithm::default() {
                query.append_pair("algorithm", self.algorithm.name());
            }
            if self.digits != DEFAULT_DIGITS {
                query.append_pair("digits", &self.digits.to_string());
            }
            if self.period != DEFAULT_PERIOD {
                query.append_pair("period", &self.period.to_string());
            }
        }
        Ok(url.to_string())
    }

    pub fn format(&self, format: SecretFormat) -> Result<String, Error> {
        match format {
            SecretFormat::Uri => self.to_uri(),
            SecretFormat::Base32 => Ok(BASE32_NOPAD.encode(&self.key)),
            SecretFormat::Hex => Ok(HEXLOWER.encode(&self.key)),
        }
    }

    /// HOTP value for `counter`.
    pub fn hotp(&self, counter: u64) -> Result<String, Error> {
        let msg = counter.to_be_bytes();
        let hash = match self.algorithm {
            Algorithm::Sha1 => mac::<Hmac<Sha1>>(&self.key, &msg)?,
            Algorithm::Sha256 => mac::<Hmac<Sha256>>(&self.key, &msg)?,
            Algorithm::Sha512 => mac::<Hmac<Sha512>>(&self.key, &msg)?,
        };

        let offset = usize::from(hash[hash.len() - 1] & 0x0f);
        let code = u32::from_be_bytes([
            hash[offset] & 0x7f,
            hash[offset + 1],
            hash[offset + 2],
            hash[offset + 3],
        ]);
        let code = u64::from(code) % 10u64.pow(self.digits);
        Ok(format!("{:0width$}", code, width = self.digits as usize))
    }

    /// The token valid at unix time `time`.
    pub fn generate(&self, time: u64) -> Result<Token, Error> {
        let counter = time / self.period;
        Ok(Token {
            token: self.hotp(counter)?,
            counter,
            expire_time: (counter + 1) * self.period,
        })
    }
}

fn mac<M: Mac + KeyInit>(key: &[u8], msg: &[u8]) -> Result<Vec<u8>, Error> {
    let mut m =
        <M as Mac>::new_from_slice(key).map_err(|e| Error::InvalidSecret(e.to_string()))?;
    m.update(msg);
    Ok(m.finalize().into_bytes().to_vec())
}

/// Unpadded base32 that ignores the unused bits of the last character.
fn base32_lenient() -> Result<Encoding, Error> {
    let mut spec = BASE32_NOPAD.specification();
    spec.check_trailing_bits = false;
    spec.encoding().map_err(|e| Error::InvalidSecret(e.to_string()))
}

fn decode_base32(s: &str) -> Result<Vec<u8>, Error> {
    let normalized: String = s
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '=')
        .map(|c| c.to_ascii_uppercase())
        .collect();
    base32_lenient()?
        .decode(normalized.as_bytes())
        .map_err(|e| Error::InvalidSecret(e.to_string()))
}

fn unix_now() -> Result<u64, Error> {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .map_err(|e| Error::Io(std::io::Error::new(std::io::ErrorKind::Other, e)))
}

/// Print tokens to `out`. Without `live` one token is printed. With `live` a
/// new token is printed each time the previous one expires, until `cancel`
/// is set.
pub fn emit<W: Write>(
    totp: &Totp,
    live: bool,
    cancel: &AtomicBool,
    out: &mut W,
) -> Result<(), Error> {
    emit_with(totp, live, cancel, out, unix_now, thread::sleep)
}

fn emit_with<W, N, S>(
    totp: &Totp,
    live: bool,
    cancel: &AtomicBool,
    out: &mut W,
    mut now: N,
    mut sleep: S,
) -> Result<(), Error>
where
    W: Write,
    N: FnMut() -> Result<u64, Error>,
    S: FnMut(Duration),
{
    loop {
        let token = totp.generate(now()?)?;
        writeln!(out, "{}", token.token)?;
        out.flush()?;

        if !live {
            return Ok(());
        }

        tracing::info!(counter = token.counter, expire = token.expire_time, "waiting");
        while now()? < token.expire_time {
            if cancel.load(Ordering::SeqCst) {
                return Err(Error::Interrupted);
            }
            sleep(WAIT_SLICE);
        }
        if cancel.load(Ordering::SeqCst) {
            return Err(Error::Interrupted);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    const RFC_KEY: &[u8] = b"12345678901234567890";

    fn rfc(digits: u32) -> Totp {
        let mut totp = Totp::from_key(RFC_KEY.to_vec());
        totp.digits = digits;
        totp
    }

    #[test]
    fn test_classify() {
        assert_eq!(
            classify("otpauth://totp/x?secret=AA").unwrap(),
            SecretFormat::Uri
        );
        assert_eq!(classify("JBSWY3DPEHPK3PXP").unwrap(), SecretFormat::Base32);
        // digits 2-7 only are base32
        assert_eq!(classify("234567").unwrap(), SecretFormat::Base32);
        assert_eq!(classify("deadbeef01").unwrap(), SecretFormat::Hex);
        assert_eq!(classify("DEADBEEF01").unwrap(), SecretFormat::Hex);
        assert_eq!(
            classify("otpauth://totp/x?secret=AAAA").unwrap(),
            SecretFormat::Uri
        );
        assert_eq!(classify("48656c6c6f").unwrap(), SecretFormat::Hex);
        assert!(matches!(classify("not-a-secret!"), Err(Error::InvalidSecret(_))));
        assert!(matches!(classify(""), Err(Error::InvalidSecret(_))));
        assert!(matches!(classify("not a secret"), Err(Error::InvalidSecret(_))));
    }

    #[test]
    fn test_read_secret() {
        assert_eq!(read_secret(&b"JBSWY3DPEHPK3PXP  \n"[..]).unwrap(), "JBSWY3DPEHPK3PXP");
        assert!(matches!(read_secret(&b""[..]), Err(Error::Eof)));
    }

    #[test]
    fn test_rfc6238() {
        let totp = rfc(8);
        assert_eq!(totp.generate(59).unwrap().token, "94287082");
        assert_eq!(totp.generate(1111111109).unwrap().token, "07081804");

        let token = totp.generate(59).unwrap();
        assert_eq!(token.counter, 1);
        assert_eq!(token.expire_time, 60);
    }

    #[test]
    fn test_hotp() {
        let totp = rfc(6);
        assert_eq!(totp.hotp(0).unwrap(), "755224");
        assert_eq!(totp.hotp(1).unwrap(), "287082");
    }

    #[test]
    fn test_load() {
        let base32 = Totp::load("GEZDGNBVGY3TQOJQGEZDGNBVGY3TQOJQ", None).unwrap();
        assert_eq!(base32, rfc(6));

        let hex = Totp::load("3132333435363738393031323334353637383930", None).unwrap();
        assert_eq!(hex, rfc(6));

        let totp = Totp::load("JBSWY3DPEHPK3PXP", None).unwrap();
        assert_eq!(totp.key, b"Hello!\xde\xad\xbe\xef");
        assert_eq!(totp.generate(59).unwrap().token, "996554");

        // override skips classification
        assert!(matches!(
            Totp::load("JBSWY3DPEHPK3PXP", Some(SecretFormat::Hex)),
            Err(Error::InvalidSecret(_))
        ));
        assert_eq!(
            Totp::load("jbswy3dpehpk3pxp", Some(SecretFormat::Base32)).unwrap(),
            totp
        );
    }

    #[test]
    fn test_load_base32_trailing_bits() {
        // the last character carries two unused set bits
        let totp = Totp::load("ABCDEFGHIJKLMNOPQRSTUVWXYZ", None).unwrap();
        assert_eq!(totp.key.len(), 16);
        assert_eq!(
            totp.key,
            Totp::load("ABCDEFGHIJKLMNOPQRSTUVWXYY", None).unwrap().key
        );
    }

    #[test]
    fn test_uri() {
        let totp = Totp::load(
            "otpauth://totp/ACME%20Co:john?secret=GEZDGNBVGY3TQOJQGEZDGNBVGY3TQOJQ\
             &issuer=ACME&digits=8&algorithm=sha1&period=30",
            None,
        )
        .unwrap();
        assert_eq!(totp.label.as_deref(), Some("ACME Co:john"));
        assert_eq!(totp.issuer.as_deref(), Some("ACME"));
        assert_eq!(totp.generate(59).unwrap().token, "94287082");

        let again = Totp::from_uri(&totp.to_uri().unwrap()).unwrap();
        assert_eq!(again, totp);

        for label in &["a%20b", "dir/name", "who?#x", "100% sure"] {
            let mut totp = rfc(6);
            totp.label = Some(label.to_string());
            let uri = totp.to_uri().unwrap();
            assert_eq!(
                Totp::from_uri(&uri).unwrap().label.as_deref(),
                Some(*label),
                "{}",
                uri
            );
        }

        for bad in &[
            "otpauth://totp/x?secret=GEZDGNBV&digits=5",
            "otpauth://totp/x?secret=GEZDGNBV&algorithm=MD5",
            "otpauth://totp/x?issuer=ACME",
            "otpauth://hotp/x?secret=GEZDGNBV",
        ] {
            assert!(
                matches!(Totp::from_uri(bad), Err(Error::InvalidSecret(_))),
                "{}",
                bad
            );
        }
    }

    #[test]
    fn test_create() {
        assert!(matches!(
            Totp::create(None, SecretFormat::Uri),
            Err(Error::MissingLabel)
        ));
        assert!(matches!(
            Totp::create(Some(""), SecretFormat::Uri),
            Err(Error::MissingLabel)
        ));

        let (totp, encoded) = Totp::create(None, SecretFormat::Hex).unwrap();
        assert_eq!(totp.key.len(), SECRET_LEN);
        assert_eq!(Totp::load(&encoded, None).unwrap().key, totp.key);

        let (totp, encoded) = Totp::create(Some("alice"), SecretFormat::Uri).unwrap();
        assert!(encoded.starts_with("otpauth://totp/alice?secret="));
        assert_eq!(Totp::load(&encoded, None).unwrap(), totp);
    }

    #[test]
    fn test_emit_once() {
        let cancel = AtomicBool::new(false);
        let mut out = Vec::new();
        emit_with(&rfc(8), false, &cancel, &mut out, || Ok(59), |_| {}).unwrap();
        assert_eq!(out, b"94287082\n");
    }

    #[test]
    fn test_emit_live_until_cancelled() {
        let cancel = AtomicBool::new(false);
        let clock = Cell::new(58u64);
        let mut out = Vec::new();

        let result = emit_with(
            &rfc(8),
            true,
            &cancel,
            &mut out,
            || Ok(clock.get()),
            |d| {
                clock.set(clock.get() + d.as_secs());
                if clock.get() >= 95 {
                    cancel.store(true, Ordering::SeqCst);
                }
            },
        );

        assert!(matches!(result, Err(Error::Interrupted)));
        let tokens: Vec<_> = String::from_utf8(out).unwrap().lines().map(str::to_owned).collect();
        let expected: Vec<_> = [58, 60, 90]
            .iter()
            .map(|&t| rfc(8).generate(t).unwrap().token)
            .collect();
        assert_eq!(tokens, expected);
    }
}
