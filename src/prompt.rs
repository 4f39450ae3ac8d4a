//! Interactive password entry.

use std::io::{self, Write};

use crate::err::Error;

const PROMPT: &str = "Password: ";
const PROMPT_VERIFY: &str = "Verify password: ";

/// Read a password without echo. The prompt goes to stderr.
pub fn tty_prompt(prompt: &str) -> io::Result<String> {
    eprint!("{}", prompt);
    io::stderr().flush()?;
    rpassword::read_password()
}

fn eof_to_abort(e: io::Error) -> Error {
    if e.kind() == io::ErrorKind::UnexpectedEof {
        Error::Eof
    } else {
        Error::Io(e)
    }
}

/// Ask for a password until a usable one is given.
///
/// Empty entries are refused unless `allow_empty`. With `verify` the
/// password must be typed twice; a mismatch starts over. Retry messages go
/// to `msg`.
pub fn read_password<F, W>(
    mut read: F,
    msg: &mut W,
    verify: bool,
    allow_empty: bool,
) -> Result<String, Error>
where
    F: FnMut(&str) -> io::Result<String>,
    W: Write,
{
    let mut read = |prompt: &str| read(prompt).map_err(eof_to_abort);

    loop {
        let password = read(PROMPT)?;
        if password.is_empty() && !allow_empty {
            writeln!(msg, "Empty password, try again.")?;
            continue;
        }

        if !verify {
            return Ok(password);
        }

        let again = read(PROMPT_VERIFY)?;
        if password == again {
            return Ok(password);
        }
        writeln!(msg, "Passwords do not match, try again.")?;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scripted(lines: &[&str]) -> impl FnMut(&str) -> io::Result<String> {
        let mut lines: Vec<String> = lines.iter().rev().map(|s| s.to_string()).collect();
        move |_| {
            lines
                .pop()
                .ok_or_else(|| io::Error::new(io::ErrorKind::UnexpectedEof, "eof"))
        }
    }

    #[test]
    fn test_verified() {
        let mut msg = Vec::new();
        let pw = read_password(scripted(&["secret", "secret"]), &mut msg, true, false).unwrap();
        assert_eq!(pw, "secret");
        assert!(msg.is_empty());
    }

    #[test]
    fn test_mismatch_retries() {
        let mut msg = Vec::new();
        let pw = read_password(
            scripted(&["one", "two", "three", "three"]),
            &mut msg,
            true,
            false,
        )
        .unwrap();
        assert_eq!(pw, "three");
        assert_eq!(msg, b"Passwords do not match, try again.\n");
    }

    #[test]
    fn test_empty_retries() {
        let mut msg = Vec::new();
        let pw = read_password(scripted(&["", "pw"]), &mut msg, false, false).unwrap();
        assert_eq!(pw, "pw");
        assert_eq!(msg, b"Empty password, try again.\n");

        let pw = read_password(scripted(&[""]), &mut Vec::new(), false, true).unwrap();
        assert_eq!(pw, "");
    }

    #[test]
    fn test_eof_aborts() {
        assert!(matches!(
            read_password(scripted(&[]), &mut Vec::new(), true, false),
            Err(Error::Eof)
        ));
        assert!(matches!(
            read_password(scripted(&["pw"]), &mut Vec::new(), true, false),
            Err(Error::Eof)
        ));
    }

    #[test]
    fn test_prompts() {
        let mut seen = Vec::new();
        let read = |prompt: &str| -> io::Result<String> {
            seen.push(prompt.to_owned());
            Ok("pw".to_owned())
        };
        read_password(read, &mut Vec::new(), true, false).unwrap();
        assert_eq!(seen, vec![PROMPT, PROMPT_VERIFY]);
    }
}
