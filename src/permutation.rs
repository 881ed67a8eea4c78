//! Explicit reversible functions.

use std::fmt::{Display, Formatter};

use crate::error::{Error, Result};

/// Largest number of lines an explicit table may have.
pub const MAX_LINES: usize = 24;

/// A bijection on `{0,1}^n`, stored as the image of every input pattern.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct Permutation {
    lines: usize,
    table: Vec<u64>,
}

impl Permutation {
    /// Create a permutation from its table, checking that it is a bijection.
    pub fn new(lines: usize, table: Vec<u64>) -> Result<Self> {
        if lines > MAX_LINES {
            return Err(Error::Capacity {
                required: lines,
                limit: MAX_LINES,
            });
        }
        let size = 1usize << lines;
        if table.len() != size {
            return Err(Error::Configuration(format!(
                "a permutation on {} lines needs {} rows, got {}",
                lines,
                size,
                table.len()
            )));
        }

        let mut preimage: Vec<Option<u64>> = vec![None; size];
        for (x, &y) in table.iter().enumerate() {
            if y >= size as u64 {
                return Err(Error::Configuration(format!(
                    "output {:#x} of row {:#x} does not fit into {} lines",
                    y, x, lines
                )));
            }
            if let Some(first) = preimage[y as usize] {
                return Err(Error::NotAPermutation {
                    output: y,
                    first,
                    second: x as u64,
                });
            }
            preimage[y as usize] = Some(x as u64);
        }

        Ok(Self { lines, table })
    }

    pub fn identity(lines: usize) -> Self {
        assert!(lines <= MAX_LINES, "too many lines: {}", lines);
        Self {
            lines,
            table: (0..1u64 << lines).collect(),
        }
    }

    pub fn num_lines(&self) -> usize {
        self.lines
    }

    /// Number of rows, `2^lines`.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    pub fn apply(&self, x: u64) -> u64 {
        self.table[x as usize]
    }

    pub fn table(&self) -> &[u64] {
        &self.table
    }

    pub fn inverse(&self) -> Self {
        let mut table = vec![0; self.table.len()];
        for (x, &y) in self.table.iter().enumerate() {
            table[y as usize] = x as u64;
        }
        Self {
            lines: self.lines,
            table,
        }
    }

    /// `other` applied after `self`.
    pub fn then(&self, other: &Permutation) -> Result<Self> {
        if self.lines != other.lines {
            return Err(Error::LineMismatch {
                expected: self.lines,
                found: other.lines,
            });
        }
        Ok(Self {
            lines: self.lines,
            table: self.table.iter().map(|&y| other.apply(y)).collect(),
        })
    }

    pub fn is_identity(&self) -> bool {
        self.table.iter().enumerate().all(|(x, &y)| x as u64 == y)
    }

    /// Rows with their images, in input order.
    pub fn rows(&self) -> impl Iterator<Item = (u64, u64)> + '_ {
        self.table.iter().enumerate().map(|(x, &y)| (x as u64, y))
    }
}

impl Display for Permutation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "[")?;
        for (i, y) in self.table.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{}", y)?;
        }
        write!(f, "]")
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;

    #[test]
    fn test_new_accepts_bijection() {
        let p = Permutation::new(2, vec![0, 2, 1, 3]).unwrap();
        assert_eq!(p.num_lines(), 2);
        assert_eq!(p.apply(1), 2);
        assert_eq!(p.to_string(), "[0 2 1 3]");
        assert!(!p.is_identity());
        assert_eq!(p.inverse(), p);
    }

    #[test]
    fn test_new_rejects_non_bijection() {
        let err = Permutation::new(2, vec![0, 1, 1, 3]).unwrap_err();
        assert_eq!(
            err,
            Error::NotAPermutation {
                output: 1,
                first: 1,
                second: 2
            }
        );
        assert!(matches!(
            Permutation::new(2, vec![0, 1, 2]),
            Err(Error::Configuration(_))
        ));
        assert!(matches!(
            Permutation::new(1, vec![0, 2]),
            Err(Error::Configuration(_))
        ));
    }

    #[test]
    fn test_inverse_and_compose() {
        let p = Permutation::new(2, vec![1, 2, 3, 0]).unwrap();
        let q = p.inverse();
        assert_eq!(q.table(), &[3, 0, 1, 2]);
        assert!(p.then(&q).unwrap().is_identity());
        assert!(Permutation::identity(3).is_identity());
        assert!(matches!(
            p.then(&Permutation::identity(3)),
            Err(Error::LineMismatch { .. })
        ));
    }
}
