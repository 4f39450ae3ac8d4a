use std::collections::BTreeSet;
use std::io::BufRead;

use rand::rngs::OsRng;
use rand::seq::SliceRandom;

use crate::err::Error;

/// A deduplicated set of symbols (characters or words) to draw from.
pub struct Symbols {
    list: Vec<String>,
}

impl Symbols {
    pub fn from_iter(iter: impl Iterator<Item = String>) -> Symbols {
        let mut set: BTreeSet<String> = iter.collect();
        set.remove("");
        Symbols {
            list: set.into_iter().collect(),
        }
    }

    pub fn from_chars(chars: impl Iterator<Item = char>) -> Symbols {
        Symbols::from_iter(chars.map(String::from))
    }

    pub fn from_bufread<R: BufRead>(r: R) -> Result<Symbols, Error> {
        let list = r
            .lines()
            .map(|l| l.map(|l| l.trim().to_owned()))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Symbols::from_iter(list.into_iter()))
    }

    pub fn len(&self) -> usize {
        self.list.len()
    }

    #[cfg(test)]
    pub fn contains(&self, s: &str) -> bool {
        self.list.binary_search_by(|x| x.as_str().cmp(s)).is_ok()
    }

    /// `n` symbols joined by `sep`.
    pub fn generate(&self, n: usize, sep: &str) -> Result<String, Error> {
        let mut res = String::new();

        for i in 0..n {
            if i > 0 {
                res.push_str(sep);
            }
            let s = self
                .list
                .choose(&mut OsRng)
                .ok_or_else(|| Error::invalid_parameter("charset", "no symbols"))?;
            res.push_str(s);
        }

        Ok(res)
    }

    pub fn bits_per_symbol(&self) -> f64 {
        if self.list.is_empty() {
            return 0.0;
        }
        (self.list.len() as f64).log2()
    }

    pub fn base_entropy(&self, n: usize) -> f64 {
        (n as f64) * self.bits_per_symbol()
    }
}
