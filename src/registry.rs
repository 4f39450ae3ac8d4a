//! The table of hash methods known to the program.

use crate::backend::Scheme;
use crate::err::Error;
use crate::method::{Implementation, Method};

const LDAP_CRYPT: &str = "{CRYPT}";

const fn direct(scheme: Scheme) -> Implementation {
    Implementation::Direct(scheme)
}

const BCRYPT: Implementation = direct(Scheme::Bcrypt);
const BSDI_CRYPT: Implementation = direct(Scheme::BsdiCrypt);
const DES_CRYPT: Implementation = direct(Scheme::DesCrypt);
const MD5_CRYPT: Implementation = direct(Scheme::Md5Crypt);
const SHA1_CRYPT: Implementation = direct(Scheme::Sha1Crypt);
const SHA256_CRYPT: Implementation = direct(Scheme::Sha256Crypt);
const SHA512_CRYPT: Implementation = direct(Scheme::Sha512Crypt);

const METHODS: &[(&str, Implementation)] = &[
    ("argon2", direct(Scheme::Argon2)),
    ("bcrypt", BCRYPT),
    ("bsdi_crypt", BSDI_CRYPT),
    ("des_crypt", DES_CRYPT),
    ("md5_crypt", MD5_CRYPT),
    ("sha1_crypt", SHA1_CRYPT),
    ("sha256_crypt", SHA256_CRYPT),
    ("sha512_crypt", SHA512_CRYPT),
    ("pbkdf2_sha256", direct(Scheme::Pbkdf2Sha256)),
    ("pbkdf2_sha512", direct(Scheme::Pbkdf2Sha512)),
    ("scrypt", direct(Scheme::Scrypt)),
    ("ldap_bcrypt", ldap(&BCRYPT)),
    ("ldap_bsdi_crypt", ldap(&BSDI_CRYPT)),
    ("ldap_des_crypt", ldap(&DES_CRYPT)),
    ("ldap_md5_crypt", ldap(&MD5_CRYPT)),
    ("ldap_sha1_crypt", ldap(&SHA1_CRYPT)),
    ("ldap_sha256_crypt", ldap(&SHA256_CRYPT)),
    ("ldap_sha512_crypt", ldap(&SHA512_CRYPT)),
    ("postgres_md5", direct(Scheme::PostgresMd5)),
    ("plaintext", direct(Scheme::Plaintext)),
    ("unix_disabled", direct(Scheme::UnixDisabled)),
];

const fn ldap(inner: &'static Implementation) -> Implementation {
    Implementation::Wrapped {
        prefix: LDAP_CRYPT,
        inner,
    }
}

pub struct Registry {
    methods: Vec<Method>,
}

impl Registry {
    pub fn new() -> Registry {
        Registry {
            methods: METHODS
                .iter()
                .map(|&(name, implementation)| Method::new(name, implementation))
                .collect(),
        }
    }

    /// All methods in registration order.
    pub fn all(&self) -> impl Iterator<Item = &Method> {
        self.methods.iter()
    }

    /// Methods whose backend is compiled in.
    pub fn supported(&self) -> impl Iterator<Item = &Method> {
        self.all().filter(|m| m.is_supported())
    }

    pub fn lookup(&self, name: &str) -> Result<&Method, Error> {
        self.methods
            .iter()
            .find(|m| m.name() == name)
            .ok_or_else(|| Error::NotFound(name.to_owned()))
    }

    pub fn supported_names(&self) -> Vec<&'static str> {
        self.supported().map(Method::name).collect()
    }
}

impl Default for Registry {
    fn default() -> Registry {
        Registry::new()
    }
}
