//! Programas Intcode
//!
//! Texto de inteiros separados por vírgula, carregado verbatim a partir do
//! endereço 0.

use std::fs;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use crate::error::{IntcodeError, IntcodeResult};

/// Programa imutável, compartilhado entre instâncias
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Program {
    cells: Arc<[i64]>,
}

impl Program {
    /// Cria programa a partir de células
    pub fn new(cells: impl Into<Arc<[i64]>>) -> Self {
        Self { cells: cells.into() }
    }

    /// Parseia texto `1,0,0,3,99`
    pub fn parse(text: &str) -> IntcodeResult<Self> {
        let text = text.trim();
        if text.is_empty() {
            return Err(IntcodeError::EmptyProgram);
        }

        let cells = text
            .split(',')
            .enumerate()
            .map(|(position, token)| {
                let token = token.trim();
                token.parse::<i64>().map_err(|_| IntcodeError::Parse {
                    position,
                    token: token.to_string(),
                })
            })
            .collect::<IntcodeResult<Vec<_>>>()?;

        Ok(Self::new(cells))
    }

    /// Carrega e parseia arquivo de programa
    pub fn from_file(path: impl AsRef<Path>) -> IntcodeResult<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .map_err(|err| IntcodeError::Io(format!("{}: {}", path.display(), err)))?;
        tracing::debug!(path = %path.display(), bytes = text.len(), "loaded program file");
        Self::parse(&text)
    }

    /// Células do programa
    pub fn cells(&self) -> &[i64] {
        &self.cells
    }

    /// Cópia com uma célula alterada
    ///
    /// Returns `None` when `address` lies outside the program text.
    pub fn patched(&self, address: usize, value: i64) -> Option<Self> {
        let mut cells = self.cells.to_vec();
        *cells.get_mut(address)? = value;
        Some(Self::new(cells))
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

impl FromStr for Program {
    type Err = IntcodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<Vec<i64>> for Program {
    fn from(cells: Vec<i64>) -> Self {
        Self::new(cells)
    }
}

impl From<&[i64]> for Program {
    fn from(cells: &[i64]) -> Self {
        Self::new(cells)
    }
}

impl std::fmt::Display for Program {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, cell) in self.cells.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{}", cell)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_simple() {
        let program = Program::parse("1,0,0,0,99").unwrap();
        assert_eq!(program.cells(), &[1, 0, 0, 0, 99]);
    }

    #[test]
    fn test_parse_negative_and_whitespace() {
        let program: Program = " 1101, 100,-1,4,0\n".parse().unwrap();
        assert_eq!(program.cells(), &[1101, 100, -1, 4, 0]);
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(Program::parse("  \n").unwrap_err(), IntcodeError::EmptyProgram);
        assert_eq!(
            Program::parse("1,x,3").unwrap_err(),
            IntcodeError::Parse {
                position: 1,
                token: "x".to_string()
            }
        );
        assert!(Program::parse("1,,3").is_err());
    }

    #[test]
    fn test_display_roundtrip() {
        let text = "3,0,4,0,99";
        assert_eq!(Program::parse(text).unwrap().to_string(), text);
    }

    #[test]
    fn test_patched() {
        let program = Program::parse("1,0,0,3,99").unwrap();
        let patched = program.patched(1, 12).unwrap();
        assert_eq!(patched.cells(), &[1, 12, 0, 3, 99]);
        assert_eq!(program.cells()[1], 0);
        assert!(program.patched(5, 1).is_none());
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "1,9,10,3,2,3,11,0,99,30,40,50").unwrap();

        let program = Program::from_file(file.path()).unwrap();
        assert_eq!(program.len(), 12);
    }

    #[test]
    fn test_from_missing_file() {
        let err = Program::from_file("/definitely/not/here.txt").unwrap_err();
        assert!(matches!(err, IntcodeError::Io(_)));
    }
}
