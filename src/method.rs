//! Hash method descriptors.

use crate::backend::Scheme;
use crate::err::Error;
use crate::params::Params;

const USER: &str = "user";

/// How a method produces its hash.
///
/// `Wrapped` hashes with `inner` and prepends `prefix`. Wrappers can nest;
/// every query follows them down to the `Direct` scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Implementation {
    Direct(Scheme),
    Wrapped {
        prefix: &'static str,
        inner: &'static Implementation,
    },
}

impl Implementation {
    pub fn scheme(&self) -> Scheme {
        match self {
            Implementation::Direct(scheme) => *scheme,
            Implementation::Wrapped { inner, .. } => inner.scheme(),
        }
    }

    fn hash(&self, password: &str, params: &Params) -> Result<String, Error> {
        match self {
            Implementation::Direct(scheme) => scheme.hash(password, params),
            Implementation::Wrapped { prefix, inner } => {
                Ok(format!("{}{}", prefix, inner.hash(password, params)?))
            }
        }
    }
}

/// A registered hash method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Method {
    name: &'static str,
    implementation: Implementation,
    accepted: Vec<&'static str>,
}

impl Method {
    pub fn new(name: &'static str, implementation: Implementation) -> Method {
        let scheme = implementation.scheme();
        let mut accepted = scheme.setting_kwds().to_vec();
        if scheme.has_user_context() {
            accepted.push(USER);
        }

        Method {
            name,
            implementation,
            accepted,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn class_name(&self) -> &'static str {
        self.implementation.scheme().class_name()
    }

    pub fn doc(&self) -> &'static str {
        self.implementation.scheme().doc()
    }

    /// First line of the documentation.
    pub fn description(&self) -> &'static str {
        self.doc().lines().next().unwrap_or("").trim()
    }

    pub fn requires_password(&self) -> bool {
        !self.implementation.scheme().is_disabled()
    }

    pub fn requires_user(&self) -> bool {
        self.implementation.scheme().has_user_context()
    }

    pub fn is_supported(&self) -> bool {
        self.implementation.scheme().has_backend()
    }

    pub fn accepted_params(&self) -> &[&'static str] {
        &self.accepted
    }

    /// Check `params` against the method and compute the hash.
    pub fn hash(&self, password: &str, params: &Params) -> Result<String, Error> {
        if self.requires_user() && !params.contains(USER) {
            return Err(Error::MissingUser(self.name.to_owned()));
        }

        if let Some(param) = params.names().find(|n| !self.accepted.contains(n)) {
            return Err(Error::UnsupportedParameter {
                method: self.name.to_owned(),
                param: param.to_owned(),
            });
        }

        tracing::debug!(method = self.name, class = self.class_name(), "hashing");
        self.implementation.hash(password, params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::ParamValue;

    const NESTED: Implementation = Implementation::Wrapped {
        prefix: "{A}",
        inner: &Implementation::Wrapped {
            prefix: "{B}",
            inner: &Implementation::Direct(Scheme::PostgresMd5),
        },
    };

    fn user(name: &str) -> Params {
        let mut params = Params::new();
        params.insert("user", ParamValue::Str(name.to_owned()));
        params
    }

    #[test]
    fn test_nested_wrapper_resolves_to_leaf() {
        let method = Method::new("nested", NESTED);
        let leaf = Method::new("postgres_md5", Implementation::Direct(Scheme::PostgresMd5));

        assert_eq!(method.class_name(), leaf.class_name());
        assert_eq!(method.doc(), leaf.doc());
        assert_eq!(method.accepted_params(), leaf.accepted_params());
        assert!(method.requires_user());
        assert!(method.requires_password());
        assert!(method.is_supported());

        assert_eq!(
            method.hash("password", &user("admin")).unwrap(),
            "{A}{B}md580a19f669b02edfbc208a5386ab5036b"
        );
    }

    #[test]
    fn test_missing_user() {
        let method = Method::new("nested", NESTED);
        assert!(matches!(
            method.hash("password", &Params::new()),
            Err(Error::MissingUser(ref m)) if m == "nested"
        ));
    }

    #[test]
    fn test_unsupported_parameter() {
        let method = Method::new("plaintext", Implementation::Direct(Scheme::Plaintext));
        let mut params = Params::new();
        params.insert("rounds", ParamValue::Int(10));

        match method.hash("pw", &params) {
            Err(Error::UnsupportedParameter { method, param }) => {
                assert_eq!(method, "plaintext");
                assert_eq!(param, "rounds");
            }
            other => panic!("unexpected result: {:?}", other),
        }

        // user is only accepted where it is required
        assert!(method.hash("pw", &user("admin")).is_err());
    }

    #[test]
    fn test_description() {
        let method = Method::new("bcrypt", Implementation::Direct(Scheme::Bcrypt));
        assert_eq!(method.description(), "OpenBSD Blowfish-based crypt ($2b$).");
        assert!(!method.accepted_params().contains(&"user"));
    }

    #[test]
    fn test_disabled_needs_no_password() {
        let method = Method::new(
            "unix_disabled",
            Implementation::Direct(Scheme::UnixDisabled),
        );
        assert!(!method.requires_password());
        assert_eq!(method.hash("", &Params::new()).unwrap(), "!");
    }
}
