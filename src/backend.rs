//! Hash scheme implementations.
//!
//! Every scheme is a thin adapter over a third-party crate: `pwhash` for the
//! Unix crypt family, the RustCrypto PHC hashers for argon2, scrypt and
//! PBKDF2, and `md-5` for the PostgreSQL scheme. The adapters only turn a
//! validated [`Params`] mapping into the settings each crate expects.

use std::fmt;

use data_encoding::HEXLOWER;
use md5::{Digest, Md5};
use pwhash::bcrypt::{BcryptSetup, BcryptVariant};
use pwhash::HashSetup;
use rand::rngs::OsRng;
use rand::seq::SliceRandom;

use crate::err::Error;
use crate::params::Params;

#[cfg(any(feature = "argon2", feature = "scrypt", feature = "pbkdf2"))]
use password_hash::{PasswordHasher, SaltString};
#[cfg(any(feature = "argon2", feature = "scrypt", feature = "pbkdf2"))]
use rand::RngCore;

const CRYPT_SALT_CHARS: &[u8] = b"./0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

// pwhash leaves the rounds field out of a sha2 hash only when no rounds
// value is passed down, and then uses this count.
const SHA2_CRYPT_IMPLICIT_ROUNDS: u32 = 5000;

const BCRYPT_MAX_PASSWORD: usize = 72;
const BCRYPT_SALT_LEN: usize = 22;
const BCRYPT_DEFAULT_COST: u32 = 12;
const BCRYPT_COST: Bounds<u32> = Bounds { min: 4, max: 31 };
// The last salt character only has two significant bits.
const BCRYPT_SALT_LAST: &[u8] = b".Oeu";

const DES_CRYPT_MAX_PASSWORD: usize = 8;

const BSDI_CRYPT: CryptRules = CryptRules {
    salt_len: Bounds { min: 4, max: 4 },
    rounds: Some(RoundsRule {
        bounds: Bounds {
            min: 1,
            max: (1 << 24) - 1,
        },
        default: 5001,
    }),
    implicit_rounds: false,
};
const DES_CRYPT: CryptRules = CryptRules {
    salt_len: Bounds { min: 2, max: 2 },
    rounds: None,
    implicit_rounds: false,
};
const MD5_CRYPT: CryptRules = CryptRules {
    salt_len: Bounds { min: 1, max: 8 },
    rounds: None,
    implicit_rounds: false,
};
const SHA1_CRYPT: CryptRules = CryptRules {
    salt_len: Bounds { min: 1, max: 64 },
    rounds: Some(RoundsRule {
        bounds: Bounds {
            min: 1,
            max: u32::MAX,
        },
        default: 480_000,
    }),
    implicit_rounds: false,
};
const SHA256_CRYPT: CryptRules = CryptRules {
    salt_len: Bounds { min: 1, max: 16 },
    rounds: Some(RoundsRule {
        bounds: SHA2_CRYPT_ROUNDS,
        default: 535_000,
    }),
    implicit_rounds: true,
};
const SHA512_CRYPT: CryptRules = CryptRules {
    salt_len: Bounds { min: 1, max: 16 },
    rounds: Some(RoundsRule {
        bounds: SHA2_CRYPT_ROUNDS,
        default: 656_000,
    }),
    implicit_rounds: true,
};
const SHA2_CRYPT_ROUNDS: Bounds<u32> = Bounds {
    min: 1000,
    max: 999_999_999,
};

#[cfg(any(feature = "argon2", feature = "scrypt", feature = "pbkdf2"))]
const PHC_DEFAULT_SALT_LEN: usize = 16;

const DEFAULT_DISABLED_MARKER: &str = "!";

/// A concrete hash scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scheme {
    Argon2,
    Bcrypt,
    BsdiCrypt,
    DesCrypt,
    Md5Crypt,
    Sha1Crypt,
    Sha256Crypt,
    Sha512Crypt,
    Pbkdf2Sha256,
    Pbkdf2Sha512,
    Scrypt,
    PostgresMd5,
    Plaintext,
    UnixDisabled,
}

impl Scheme {
    /// Path of the implementation that does the actual work.
    pub fn class_name(self) -> &'static str {
        use Scheme::*;

        match self {
            Argon2 => "argon2::Argon2",
            Bcrypt => "pwhash::bcrypt",
            BsdiCrypt => "pwhash::bsdi_crypt",
            DesCrypt => "pwhash::unix_crypt",
            Md5Crypt => "pwhash::md5_crypt",
            Sha1Crypt => "pwhash::sha1_crypt",
            Sha256Crypt => "pwhash::sha256_crypt",
            Sha512Crypt => "pwhash::sha512_crypt",
            Pbkdf2Sha256 | Pbkdf2Sha512 => "pbkdf2::Pbkdf2",
            Scrypt => "scrypt::Scrypt",
            PostgresMd5 => "md5::Md5",
            Plaintext => "mkcrypt::backend::plaintext",
            UnixDisabled => "mkcrypt::backend::unix_disabled",
        }
    }

    /// Documentation text. The first line is a one-line description.
    pub fn doc(self) -> &'static str {
        use Scheme::*;

        match self {
            Argon2 => {
                "Argon2 memory-hard password hash (PHC string format).\n\
                 \n\
                 Settings:\n\
                 \x20 variant      i, d or id (default: id)\n\
                 \x20 time_cost    number of passes, alias rounds (default: 2)\n\
                 \x20 memory_cost  memory in KiB (default: 19456)\n\
                 \x20 parallelism  number of lanes (default: 1)\n\
                 \x20 digest_size  output length in bytes, alias hash_len (default: 32)\n\
                 \x20 salt         B64 encoded salt\n\
                 \x20 salt_size    random salt length in bytes, alias salt_len (default: 16)\n"
            }
            Bcrypt => {
                "OpenBSD Blowfish-based crypt ($2b$).\n\
                 \n\
                 Settings:\n\
                 \x20 rounds          log2 cost, 4 to 31 (default: 12)\n\
                 \x20 ident           2a, 2b or 2y (default: 2b)\n\
                 \x20 salt            22 character bcrypt-base64 salt\n\
                 \x20 truncate_error  refuse passwords longer than 72 bytes\n"
            }
            BsdiCrypt => {
                "BSDi extended DES crypt (_).\n\
                 \n\
                 Not suitable for new passwords.\n\
                 \n\
                 Settings:\n\
                 \x20 rounds  1 to 16777215 (default: 5001)\n\
                 \x20 salt    4 character salt\n"
            }
            DesCrypt => {
                "Traditional Unix DES crypt.\n\
                 \n\
                 Not suitable for new passwords. Only the first 8 bytes of the\n\
                 password are used.\n\
                 \n\
                 Settings:\n\
                 \x20 salt            2 character salt\n\
                 \x20 truncate_error  refuse passwords longer than 8 bytes\n"
            }
            Md5Crypt => {
                "FreeBSD MD5-based crypt ($1$).\n\
                 \n\
                 Not suitable for new passwords.\n\
                 \n\
                 Settings:\n\
                 \x20 salt       1 to 8 characters\n\
                 \x20 salt_size  random salt length, up to 8 (default: 8)\n"
            }
            Sha1Crypt => {
                "NetBSD SHA1-based crypt ($sha1$).\n\
                 \n\
                 Settings:\n\
                 \x20 rounds     number of HMAC iterations (default: 480000)\n\
                 \x20 salt       1 to 64 characters\n\
                 \x20 salt_size  random salt length, up to 64 (default: 8)\n"
            }
            Sha256Crypt => {
                "SHA256-based Unix crypt ($5$).\n\
                 \n\
                 Settings:\n\
                 \x20 rounds           1000 to 999999999 (default: 535000)\n\
                 \x20 implicit_rounds  omit rounds= when rounds is 5000 (default: yes)\n\
                 \x20 salt             1 to 16 characters\n\
                 \x20 salt_size        random salt length, up to 16 (default: 16)\n"
            }
            Sha512Crypt => {
                "SHA512-based Unix crypt ($6$).\n\
                 \n\
                 Settings:\n\
                 \x20 rounds           1000 to 999999999 (default: 656000)\n\
                 \x20 implicit_rounds  omit rounds= when rounds is 5000 (default: yes)\n\
                 \x20 salt             1 to 16 characters\n\
                 \x20 salt_size        random salt length, up to 16 (default: 16)\n"
            }
            Pbkdf2Sha256 => {
                "PBKDF2 with HMAC-SHA256 (PHC string format).\n\
                 \n\
                 Settings:\n\
                 \x20 rounds       iteration count (default: 600000)\n\
                 \x20 digest_size  output length in bytes (default: 32)\n\
                 \x20 salt         B64 encoded salt\n\
                 \x20 salt_size    random salt length in bytes (default: 16)\n"
            }
            Pbkdf2Sha512 => {
                "PBKDF2 with HMAC-SHA512 (PHC string format).\n\
                 \n\
                 Settings:\n\
                 \x20 rounds       iteration count (default: 600000)\n\
                 \x20 digest_size  output length in bytes (default: 32)\n\
                 \x20 salt         B64 encoded salt\n\
                 \x20 salt_size    random salt length in bytes (default: 16)\n"
            }
            Scrypt => {
                "scrypt memory-hard password hash (PHC string format).\n\
                 \n\
                 Settings:\n\
                 \x20 rounds       log2 of the CPU/memory cost N (default: 16)\n\
                 \x20 block_size   block size r (default: 8)\n\
                 \x20 parallelism  parallelization p (default: 1)\n\
                 \x20 digest_size  output length in bytes (default: 32)\n\
                 \x20 salt         B64 encoded salt\n\
                 \x20 salt_size    random salt length in bytes (default: 16)\n"
            }
            PostgresMd5 => {
                "PostgreSQL MD5 password hash, md5(password + user).\n\
                 \n\
                 Requires the 'user' parameter. Not suitable for new passwords.\n"
            }
            Plaintext => "Stores the password unmodified.\n",
            UnixDisabled => {
                "Disabled account marker for /etc/shadow.\n\
                 \n\
                 Ignores the password and outputs the marker.\n\
                 \n\
                 Settings:\n\
                 \x20 marker  (default: !)\n"
            }
        }
    }

    /// Setting keywords accepted by the scheme. `user` is not listed.
    pub fn setting_kwds(self) -> &'static [&'static str] {
        use Scheme::*;

        match self {
            Argon2 => &[
                "salt",
                "salt_size",
                "salt_len",
                "rounds",
                "time_cost",
                "memory_cost",
                "parallelism",
                "digest_size",
                "hash_len",
                "variant",
            ],
            Bcrypt => &["salt", "rounds", "ident", "truncate_error"],
            BsdiCrypt => &["salt", "rounds"],
            DesCrypt => &["salt", "truncate_error"],
            Md5Crypt => &["salt", "salt_size"],
            Sha1Crypt => &["salt", "salt_size", "rounds"],
            Sha256Crypt | Sha512Crypt => &["salt", "salt_size", "rounds", "implicit_rounds"],
            Pbkdf2Sha256 | Pbkdf2Sha512 => &["salt", "salt_size", "rounds", "digest_size"],
            Scrypt => &[
                "salt",
                "salt_size",
                "rounds",
                "block_size",
                "parallelism",
                "digest_size",
            ],
            PostgresMd5 | Plaintext => &[],
            UnixDisabled => &["marker"],
        }
    }

    /// The scheme mixes a username into the hash.
    pub fn has_user_context(self) -> bool {
        self == Scheme::PostgresMd5
    }

    /// The scheme ignores the password.
    pub fn is_disabled(self) -> bool {
        self == Scheme::UnixDisabled
    }

    /// The backend crate is compiled in.
    pub fn has_backend(self) -> bool {
        match self {
            Scheme::Argon2 => cfg!(feature = "argon2"),
            Scheme::Pbkdf2Sha256 | Scheme::Pbkdf2Sha512 => cfg!(feature = "pbkdf2"),
            Scheme::Scrypt => cfg!(feature = "scrypt"),
            _ => true,
        }
    }

    /// Hash `password`. `params` must already be validated against
    /// [`Scheme::setting_kwds`].
    #[allow(deprecated)]
    pub fn hash(self, password: &str, params: &Params) -> Result<String, Error> {
        use Scheme::*;

        let result = match self {
            Bcrypt => {
                let settings = BcryptSettings::try_from(params)?;
                if settings.truncate_error && password.len() > BCRYPT_MAX_PASSWORD {
                    return Err(too_long(BCRYPT_MAX_PASSWORD));
                }
                pwhash::bcrypt::hash_with(settings.setup(), password)
            }
            BsdiCrypt => {
                let settings = CryptSettings::from_params(params, &BSDI_CRYPT)?;
                pwhash::bsdi_crypt::hash_with(settings.setup(), password)
            }
            DesCrypt => {
                if params.flag("truncate_error")?.unwrap_or(false)
                    && password.len() > DES_CRYPT_MAX_PASSWORD
                {
                    return Err(too_long(DES_CRYPT_MAX_PASSWORD));
                }
                let settings = CryptSettings::from_params(params, &DES_CRYPT)?;
                match settings.salt.as_deref() {
                    Some(salt) => pwhash::unix_crypt::hash_with(salt, password),
                    None => pwhash::unix_crypt::hash(password),
                }
            }
            Md5Crypt => {
                let settings = CryptSettings::from_params(params, &MD5_CRYPT)?;
                pwhash::md5_crypt::hash_with(settings.setup(), password)
            }
            Sha1Crypt => {
                let settings = CryptSettings::from_params(params, &SHA1_CRYPT)?;
                pwhash::sha1_crypt::hash_with(settings.setup(), password)
            }
            Sha256Crypt => {
                let settings = CryptSettings::from_params(params, &SHA256_CRYPT)?;
                pwhash::sha256_crypt::hash_with(settings.setup(), password)
            }
            Sha512Crypt => {
                let settings = CryptSettings::from_params(params, &SHA512_CRYPT)?;
                pwhash::sha512_crypt::hash_with(settings.setup(), password)
            }
            Argon2 => return phc::argon2(password, params),
            Pbkdf2Sha256 | Pbkdf2Sha512 => return phc::pbkdf2(self, password, params),
            Scrypt => return phc::scrypt(password, params),
            PostgresMd5 => return postgres_md5(password, params),
            Plaintext => return Ok(password.to_owned()),
            UnixDisabled => return unix_disabled(params),
        };

        result.map_err(Error::hash_computation)
    }
}

fn too_long(max: usize) -> Error {
    Error::HashComputation(format!(
        "password too long (max {} bytes with truncate_error)",
        max
    ))
}

#[cfg(any(feature = "argon2", feature = "scrypt", feature = "pbkdf2"))]
fn positive_len(name: &str, len: usize) -> Result<usize, Error> {
    if len == 0 {
        return Err(Error::invalid_parameter(name, "must be positive"));
    }
    Ok(len)
}

#[derive(Debug, Clone, Copy)]
struct Bounds<T> {
    min: T,
    max: T,
}

impl<T: Copy + PartialOrd + fmt::Display> Bounds<T> {
    fn check(self, name: &str, value: T) -> Result<T, Error> {
        if value < self.min || value > self.max {
            return Err(Error::invalid_parameter(
                name,
                format!("{} is outside {}..={}", value, self.min, self.max),
            ));
        }
        Ok(value)
    }
}

struct RoundsRule {
    bounds: Bounds<u32>,
    default: u32,
}

/// Salt and rounds limits of one pwhash crypt scheme.
struct CryptRules {
    salt_len: Bounds<usize>,
    rounds: Option<RoundsRule>,
    implicit_rounds: bool,
}

fn check_crypt_salt(salt: &str, len: Bounds<usize>) -> Result<(), Error> {
    if salt.len() < len.min || salt.len() > len.max {
        return Err(Error::invalid_parameter(
            "salt",
            format!("length must be {}..={}", len.min, len.max),
        ));
    }
    if let Some(c) = salt.bytes().find(|b| !CRYPT_SALT_CHARS.contains(b)) {
        return Err(Error::invalid_parameter(
            "salt",
            format!("invalid character {:?}", char::from(c)),
        ));
    }
    Ok(())
}

/// Random salt from the crypt(3) alphabet.
fn crypt_salt(len: usize) -> String {
    (0..len)
        .filter_map(|_| CRYPT_SALT_CHARS.choose(&mut OsRng))
        .map(|&b| char::from(b))
        .collect()
}

/// Settings shared by the pwhash schemes built on `HashSetup`.
struct CryptSettings {
    salt: Option<String>,
    rounds: Option<u32>,
}

impl CryptSettings {
    fn from_params(params: &Params, rules: &CryptRules) -> Result<CryptSettings, Error> {
        let salt = match params.str("salt")? {
            Some(salt) => {
                check_crypt_salt(salt, rules.salt_len)?;
                Some(salt.to_owned())
            }
            None => match params.uint::<usize>("salt_size")? {
                Some(len) => Some(crypt_salt(rules.salt_len.check("salt_size", len)?)),
                None => None,
            },
        };

        let rounds = match &rules.rounds {
            None => None,
            Some(rule) => {
                let rounds = match params.uint("rounds")? {
                    Some(rounds) => rule.bounds.check("rounds", rounds)?,
                    None => rule.default,
                };
                let implicit = rules.implicit_rounds
                    && rounds == SHA2_CRYPT_IMPLICIT_ROUNDS
                    && params.flag("implicit_rounds")?.unwrap_or(true);
                Some(rounds).filter(|_| !implicit)
            }
        };

        Ok(CryptSettings { salt, rounds })
    }

    fn setup(&self) -> HashSetup<'_> {
        HashSetup {
            salt: self.salt.as_deref(),
            rounds: self.rounds,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BcryptIdent {
    V2a,
    V2b,
    V2y,
}

impl BcryptIdent {
    fn parse(ident: &str) -> Result<BcryptIdent, Error> {
        match ident.trim_matches('$') {
            "2a" => Ok(BcryptIdent::V2a),
            "2b" => Ok(BcryptIdent::V2b),
            "2y" => Ok(BcryptIdent::V2y),
            _ => Err(Error::invalid_parameter(
                "ident",
                format!("unknown bcrypt ident {:?}", ident),
            )),
        }
    }

    fn variant(self) -> BcryptVariant {
        match self {
            BcryptIdent::V2a => BcryptVariant::V2a,
            BcryptIdent::V2b => BcryptVariant::V2b,
            BcryptIdent::V2y => BcryptVariant::V2y,
        }
    }
}

struct BcryptSettings<'a> {
    salt: Option<&'a str>,
    cost: u32,
    ident: Option<BcryptIdent>,
    truncate_error: bool,
}

impl<'a> TryFrom<&'a Params> for BcryptSettings<'a> {
    type Error = Error;

    fn try_from(params: &'a Params) -> Result<BcryptSettings<'a>, Error> {
        let salt = params.str("salt")?;
        if let Some(salt) = salt {
            check_crypt_salt(
                salt,
                Bounds {
                    min: BCRYPT_SALT_LEN,
                    max: BCRYPT_SALT_LEN,
                },
            )?;
            if !salt.bytes().last().map_or(false, |b| BCRYPT_SALT_LAST.contains(&b)) {
                return Err(Error::invalid_parameter(
                    "salt",
                    "last character must be one of . O e u",
                ));
            }
        }

        let cost = match params.uint("rounds")? {
            Some(cost) => BCRYPT_COST.check("rounds", cost)?,
            None => BCRYPT_DEFAULT_COST,
        };

        Ok(BcryptSettings {
            salt,
            cost,
            ident: params.str("ident")?.map(BcryptIdent::parse).transpose()?,
            truncate_error: params.flag("truncate_error")?.unwrap_or(false),
        })
    }
}

impl<'a> BcryptSettings<'a> {
    fn setup(&self) -> BcryptSetup<'a> {
        BcryptSetup {
            salt: self.salt,
            cost: Some(self.cost),
            variant: self.ident.map(BcryptIdent::variant),
        }
    }
}

fn postgres_md5(password: &str, params: &Params) -> Result<String, Error> {
    let user = params
        .str("user")?
        .ok_or_else(|| Error::MissingUser("postgres_md5".to_owned()))?;

    let mut md5 = Md5::new();
    md5.update(password.as_bytes());
    md5.update(user.as_bytes());
    Ok(format!("md5{}", HEXLOWER.encode(&md5.finalize())))
}

fn unix_disabled(params: &Params) -> Result<String, Error> {
    Ok(params
        .str("marker")?
        .unwrap_or(DEFAULT_DISABLED_MARKER)
        .to_owned())
}

/// PHC string hashers from the RustCrypto `password-hash` family.
mod phc {
    use super::*;

    #[cfg(any(feature = "argon2", feature = "scrypt", feature = "pbkdf2"))]
    fn salt(params: &Params, size_names: &[&str]) -> Result<SaltString, Error> {
        if let Some(salt) = params.str("salt")? {
            return SaltString::from_b64(salt).map_err(|e| Error::invalid_parameter("salt", e));
        }

        let len = params.first_uint(size_names)?.unwrap_or(PHC_DEFAULT_SALT_LEN);
        let mut bytes = vec![0u8; positive_len("salt_size", len)?];
        OsRng.fill_bytes(&mut bytes);
        SaltString::encode_b64(&bytes).map_err(|e| Error::invalid_parameter("salt_size", e))
    }

    #[cfg(feature = "argon2")]
    struct Argon2Settings {
        algorithm: argon2::Algorithm,
        params: argon2::Params,
        salt: SaltString,
    }

    #[cfg(feature = "argon2")]
    impl TryFrom<&Params> for Argon2Settings {
        type Error = Error;

        fn try_from(params: &Params) -> Result<Argon2Settings, Error> {
            let algorithm = match params.str("variant")?.map(str::to_lowercase) {
                None => argon2::Algorithm::Argon2id,
                Some(v) => match v.trim_start_matches("argon2") {
                    "i" => argon2::Algorithm::Argon2i,
                    "d" => argon2::Algorithm::Argon2d,
                    "id" => argon2::Algorithm::Argon2id,
                    _ => {
                        return Err(Error::invalid_parameter(
                            "variant",
                            format!("unknown argon2 variant {:?}", v),
                        ))
                    }
                },
            };

            let m_cost = params
                .uint("memory_cost")?
                .unwrap_or(argon2::Params::DEFAULT_M_COST);
            let t_cost = params
                .first_uint(&["time_cost", "rounds"])?
                .unwrap_or(argon2::Params::DEFAULT_T_COST);
            let p_cost = params
                .uint("parallelism")?
                .unwrap_or(argon2::Params::DEFAULT_P_COST);
            let output_len = params
                .first_uint(&["digest_size", "hash_len"])?
                .unwrap_or(argon2::Params::DEFAULT_OUTPUT_LEN);

            Ok(Argon2Settings {
                algorithm,
                params: argon2::Params::new(m_cost, t_cost, p_cost, Some(output_len))
                    .map_err(Error::hash_computation)?,
                salt: salt(params, &["salt_size", "salt_len"])?,
            })
        }
    }

    #[cfg(feature = "argon2")]
    pub fn argon2(password: &str, params: &Params) -> Result<String, Error> {
        let settings = Argon2Settings::try_from(params)?;
        let hasher = argon2::Argon2::new(
            settings.algorithm,
            argon2::Version::V0x13,
            settings.params,
        );
        hasher
            .hash_password(password.as_bytes(), &settings.salt)
            .map(|h| h.to_string())
            .map_err(Error::hash_computation)
    }

    #[cfg(not(feature = "argon2"))]
    pub fn argon2(_password: &str, _params: &Params) -> Result<String, Error> {
        Err(missing_backend("argon2"))
    }

    #[cfg(feature = "scrypt")]
    struct ScryptSettings {
        params: scrypt::Params,
        salt: SaltString,
    }

    #[cfg(feature = "scrypt")]
    impl TryFrom<&Params> for ScryptSettings {
        type Error = Error;

        fn try_from(params: &Params) -> Result<ScryptSettings, Error> {
            let log_n = params.uint("rounds")?.unwrap_or(16u8);
            let r = params.uint("block_size")?.unwrap_or(8u32);
            let p = params.uint("parallelism")?.unwrap_or(1u32);
            let len = params.uint("digest_size")?.unwrap_or(32usize);

            Ok(ScryptSettings {
                params: scrypt::Params::new(log_n, r, p, len).map_err(Error::hash_computation)?,
                salt: salt(params, &["salt_size"])?,
            })
        }
    }

    #[cfg(feature = "scrypt")]
    pub fn scrypt(password: &str, params: &Params) -> Result<String, Error> {
        let settings = ScryptSettings::try_from(params)?;
        scrypt::Scrypt
            .hash_password_customized(
                password.as_bytes(),
                None,
                None,
                settings.params,
                &settings.salt,
            )
            .map(|h| h.to_string())
            .map_err(Error::hash_computation)
    }

    #[cfg(not(feature = "scrypt"))]
    pub fn scrypt(_password: &str, _params: &Params) -> Result<String, Error> {
        Err(missing_backend("scrypt"))
    }

    #[cfg(feature = "pbkdf2")]
    struct Pbkdf2Settings {
        algorithm: pbkdf2::Algorithm,
        params: pbkdf2::Params,
        salt: SaltString,
    }

    #[cfg(feature = "pbkdf2")]
    impl Pbkdf2Settings {
        fn from_params(scheme: Scheme, params: &Params) -> Result<Pbkdf2Settings, Error> {
            let algorithm = match scheme {
                Scheme::Pbkdf2Sha512 => pbkdf2::Algorithm::Pbkdf2Sha512,
                _ => pbkdf2::Algorithm::Pbkdf2Sha256,
            };
            let defaults = pbkdf2::Params::default();

            Ok(Pbkdf2Settings {
                algorithm,
                params: pbkdf2::Params {
                    rounds: params.uint("rounds")?.unwrap_or(defaults.rounds),
                    output_length: params
                        .uint("digest_size")?
                        .unwrap_or(defaults.output_length),
                },
                salt: salt(params, &["salt_size"])?,
            })
        }
    }

    #[cfg(feature = "pbkdf2")]
    pub fn pbkdf2(scheme: Scheme, password: &str, params: &Params) -> Result<String, Error> {
        let settings = Pbkdf2Settings::from_params(scheme, params)?;
        pbkdf2::Pbkdf2
            .hash_password_customized(
                password.as_bytes(),
                Some(settings.algorithm.ident()),
                None,
                settings.params,
                &settings.salt,
            )
            .map(|h| h.to_string())
            .map_err(Error::hash_computation)
    }

    #[cfg(not(feature = "pbkdf2"))]
    pub fn pbkdf2(scheme: Scheme, _password: &str, _params: &Params) -> Result<String, Error> {
        Err(missing_backend(scheme.class_name()))
    }

    #[cfg(not(all(feature = "argon2", feature = "scrypt", feature = "pbkdf2")))]
    fn missing_backend(name: &str) -> Error {
        Error::HashComputation(format!("{} support is not compiled in", name))
    }
}
