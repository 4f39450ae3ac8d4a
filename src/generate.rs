//! Random password and passphrase generation.

use std::io::Write;

use clap::ValueEnum;

use crate::err::Error;
use crate::symbol::Symbols;

// A GPU rig a single person can put together does roughly 2^21 sha256_crypt
// guesses per second, which exhausts 37 bits in a day and 40 bits in a week.
// Five bits of margin on top of that is the critical threshold.
const ENTROPY_CRITICAL_WARN: f64 = 45.0;

// Eight printable ASCII characters come to about 52.4 bits.
const ENTROPY_WARN: f64 = 55.0;

const PRESETS: &[(&str, u32)] = &[("weak", 24), ("fair", 36), ("strong", 48), ("secure", 56)];

pub const DEFAULT_ENTROPY: u32 = 48;
pub const DEFAULT_SEPARATOR: &str = "-";

const WORDS: &[u8] = include_bytes!("../resources/words.txt");

/// Entropy in bits, as a number or a preset name.
pub fn parse_entropy(s: &str) -> Result<u32, String> {
    if let Some((_, bits)) = PRESETS.iter().find(|(name, _)| name.eq_ignore_ascii_case(s)) {
        return Ok(*bits);
    }

    s.parse().map_err(|_| {
        let names: Vec<_> = PRESETS.iter().map(|(name, _)| *name).collect();
        format!(
            "expected a number of bits or one of {}",
            names.join(", ")
        )
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Charset {
    /// Letters, digits and !@#$%^&*?/
    #[default]
    #[value(name = "ascii_72")]
    Ascii72,
    /// Letters and digits
    #[value(name = "ascii_62")]
    Ascii62,
    /// Letters and digits without look-alikes
    #[value(name = "ascii_50")]
    Ascii50,
    /// Lowercase hexadecimal digits
    #[value(name = "hex")]
    Hex,
}

impl Charset {
    fn chars(self) -> &'static str {
        match self {
            Charset::Ascii72 => {
                "0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz!@#$%^&*?/"
            }
            Charset::Ascii62 => "0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz",
            Charset::Ascii50 => "234679abcdefghjkmnpqrstuvwxyzACDEFGHJKMNPQRTUVWXYZ",
            Charset::Hex => "0123456789abcdef",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    Random { charset: Charset },
    Phrase { separator: String },
}

impl Default for Mode {
    fn default() -> Mode {
        Mode::Random {
            charset: Charset::default(),
        }
    }
}

/// Generate a secret with at least `entropy` bits and at least `length`
/// symbols. With neither given the entropy defaults to 48 bits. Weak
/// settings are reported to `msg`.
pub fn generate<W: Write>(
    mode: &Mode,
    entropy: Option<u32>,
    length: Option<usize>,
    msg: &mut W,
) -> Result<String, Error> {
    if entropy == Some(0) {
        return Err(Error::invalid_parameter("entropy", "must be positive"));
    }
    if length == Some(0) {
        return Err(Error::invalid_parameter("length", "must be positive"));
    }

    let (symbols, sep) = match mode {
        Mode::Random { charset } => (Symbols::from_chars(charset.chars().chars()), ""),
        Mode::Phrase { separator } => (Symbols::from_bufread(WORDS)?, separator.as_str()),
    };

    let length = symbol_count(symbols.bits_per_symbol(), entropy, length);
    warn_entropy(msg, symbols.base_entropy(length))?;

    tracing::info!(
        symbols = symbols.len(),
        length,
        "generating {:.2} bits",
        symbols.base_entropy(length)
    );
    symbols.generate(length, sep)
}

fn symbol_count(bits: f64, entropy: Option<u32>, length: Option<usize>) -> usize {
    let entropy = match (entropy, length) {
        (None, Some(_)) => 0,
        (entropy, _) => entropy.unwrap_or(DEFAULT_ENTROPY),
    };
    let needed = (f64::from(entropy) / bits).ceil() as usize;
    needed.max(length.unwrap_or(0))
}

fn warn_entropy<W: Write>(msg: &mut W, ee: f64) -> Result<(), Error> {
    if ee < ENTROPY_CRITICAL_WARN {
        writeln!(
            msg,
            "CRITICAL WARNING: This setting is too weak ({:.2} bits < {} bits). \
             May be cracked by personal attackers.",
            ee, ENTROPY_CRITICAL_WARN
        )?;
        return Ok(());
    }

    if ee < ENTROPY_WARN {
        writeln!(
            msg,
            "WARNING: This setting is weak ({:.2} bits < {} bits).",
            ee, ENTROPY_WARN
        )?;
    }
    Ok(())
}
