//! Plain-text listings of the registered methods.

use std::collections::BTreeSet;
use std::io::Write;

use crate::err::Error;
use crate::method::Method;
use crate::registry::Registry;

/// Left-aligned columns separated by two spaces, with a dashed rule under
/// the header.
pub fn output_columns<W: Write>(
    out: &mut W,
    header: &[&str],
    rows: &[Vec<String>],
) -> Result<(), Error> {
    let mut widths: Vec<usize> = header.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(cell.chars().count());
        }
    }

    let line = |cells: Vec<String>| {
        let padded: Vec<String> = cells
            .iter()
            .zip(&widths)
            .map(|(c, &w)| format!("{:<w$}", c, w = w))
            .collect();
        padded.join("  ").trim_end().to_owned()
    };

    writeln!(out, "{}", line(header.iter().map(|h| h.to_string()).collect()))?;
    writeln!(out, "{}", line(widths.iter().map(|&w| "-".repeat(w)).collect()))?;
    for row in rows {
        writeln!(out, "{}", line(row.clone()))?;
    }
    Ok(())
}

pub fn list_methods<W: Write>(out: &mut W, registry: &Registry) -> Result<(), Error> {
    for method in registry.supported() {
        writeln!(out, "{}", method.name())?;
    }
    Ok(())
}

/// Every parameter accepted by some supported method, sorted.
pub fn list_params<W: Write>(out: &mut W, registry: &Registry) -> Result<(), Error> {
    let params: BTreeSet<&str> = registry
        .supported()
        .flat_map(|m| m.accepted_params().iter().copied())
        .collect();
    for param in params {
        writeln!(out, "{}", param)?;
    }
    Ok(())
}

pub fn list_all<W: Write>(out: &mut W, registry: &Registry) -> Result<(), Error> {
    let rows: Vec<Vec<String>> = registry
        .all()
        .map(|m| {
            vec![
                m.name().to_owned(),
                if m.is_supported() { "yes" } else { "no" }.to_owned(),
                m.class_name().to_owned(),
            ]
        })
        .collect();
    output_columns(out, &["method", "supported", "class"], &rows)
}

pub fn show_params<W: Write>(out: &mut W, method: &Method) -> Result<(), Error> {
    let mut params = method.accepted_params().to_vec();
    params.sort_unstable();
    for param in params {
        writeln!(out, "{}", param)?;
    }
    Ok(())
}

pub fn show_docstring<W: Write>(out: &mut W, method: &Method) -> Result<(), Error> {
    writeln!(out, "{}", method.name())?;
    writeln!(out, "{}", method.class_name())?;
    writeln!(out)?;
    write!(out, "{}", method.doc())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn to_string(buf: Vec<u8>) -> String {
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_output_columns() {
        let mut out = Vec::new();
        output_columns(
            &mut out,
            &["a", "bb"],
            &[
                vec!["long".to_owned(), "x".to_owned()],
                vec!["s".to_owned(), "yyy".to_owned()],
            ],
        )
        .unwrap();
        assert_eq!(
            to_string(out),
            "a     bb\n\
             ----  ---\n\
             long  x\n\
             s     yyy\n"
        );
    }

    #[test]
    fn test_list_all() {
        let registry = Registry::new();
        let mut out = Vec::new();
        list_all(&mut out, &registry).unwrap();
        let out = to_string(out);
        let lines: Vec<_> = out.lines().collect();

        assert!(lines[0].starts_with("method"));
        assert!(lines[1].starts_with("---"));
        assert_eq!(lines.len(), registry.all().count() + 2);
        assert!(lines.iter().any(|l| l.starts_with("bcrypt ")
            && l.contains(" yes ")
            && l.ends_with("pwhash::bcrypt")));
    }

    #[test]
    fn test_list_params() {
        let registry = Registry::new();
        let mut out = Vec::new();
        list_params(&mut out, &registry).unwrap();
        let out = to_string(out);
        let lines: Vec<_> = out.lines().collect();
        assert!(lines.windows(2).all(|w| w[0] < w[1]));
        assert!(lines.contains(&"user"));
        assert!(lines.contains(&"truncate_error"));

        let mut out = Vec::new();
        show_params(&mut out, registry.lookup("postgres_md5").unwrap()).unwrap();
        assert_eq!(to_string(out), "user\n");

        let mut out = Vec::new();
        show_params(&mut out, registry.lookup("bcrypt").unwrap()).unwrap();
        assert_eq!(to_string(out), "ident\nrounds\nsalt\ntruncate_error\n");
    }

    #[test]
    fn test_show_docstring() {
        let registry = Registry::new();
        let mut out = Vec::new();
        show_docstring(&mut out, registry.lookup("ldap_des_crypt").unwrap()).unwrap();
        assert!(to_string(out)
            .starts_with("ldap_des_crypt\npwhash::unix_crypt\n\nTraditional Unix DES crypt.\n"));
    }
}
