use flate2::read::MultiGzDecoder;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::error::{PssmError, Result};
use crate::matrix::{Alphabet, Pssm, ScoreMatrix};

/// Open a PSSM file, transparently decompressing `.gz` input
pub fn open_pssm_input<P: AsRef<Path>>(path: P) -> Result<Box<dyn BufRead>> {
    let path = path.as_ref();
    let file = File::open(path)?;

    let is_compressed = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext == "gz")
        .unwrap_or(false);

    if is_compressed {
        Ok(Box::new(BufReader::new(MultiGzDecoder::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

/// Matrix name derived from a file path: `dir/CK2A1.csv.gz` -> `CK2A1`
pub fn pssm_name<P: AsRef<Path>>(path: P) -> String {
    let file_name = path
        .as_ref()
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let stem = file_name.strip_suffix(".gz").unwrap_or(&file_name);
    stem.strip_suffix(".csv").unwrap_or(stem).to_string()
}

/// True for files the loader accepts (`.csv` or `.csv.gz`)
pub fn is_pssm_file<P: AsRef<Path>>(path: P) -> bool {
    let name = path
        .as_ref()
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    name.ends_with(".csv") || name.ends_with(".csv.gz")
}

/// Reader for comma-separated PSSM tables.
///
/// The first line is a header whose first cell labels the symbol column and
/// whose remaining cells label positions. Every other line holds one symbol
/// followed by one score per position.
pub struct PssmReader<R: BufRead> {
    reader: R,
    line_number: usize,
}

impl<R: BufRead> PssmReader<R> {
    pub fn new(reader: R) -> Self {
        PssmReader {
            reader,
            line_number: 0,
        }
    }

    /// Read the whole table into a matrix called `name`
    pub fn read(mut self, name: &str) -> Result<Pssm> {
        let header = loop {
            match self.next_line()? {
                Some(line) if line.trim().is_empty() => continue,
                Some(line) => break line,
                None => {
                    return Err(PssmError::Parse {
                        line: self.line_number,
                        message: "empty PSSM file".to_string(),
                    })
                }
            }
        };

        let positions: Vec<String> = split_cells(&header)
            .skip(1)
            .map(|cell| cell.to_string())
            .collect();
        if positions.is_empty() {
            return Err(self.error("header has no position columns"));
        }

        let mut symbols = Vec::new();
        let mut rows = Vec::new();
        while let Some(line) = self.next_line()? {
            if line.trim().is_empty() {
                continue;
            }
            let (symbol, values) = self.parse_row(&line, positions.len())?;
            symbols.push(symbol);
            rows.push(values);
        }

        if rows.is_empty() {
            return Err(self.error("no matrix rows after header"));
        }

        let alphabet = Alphabet::new(symbols)?;
        let matrix = ScoreMatrix::new(rows)?;
        Pssm::new(name, alphabet, matrix)?.with_positions(positions)
    }

    fn next_line(&mut self) -> Result<Option<String>> {
        let mut line = String::new();
        if self.reader.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        self.line_number += 1;
        Ok(Some(line))
    }

    fn parse_row(&self, line: &str, columns: usize) -> Result<(u8, Vec<f64>)> {
        let cells: Vec<&str> = split_cells(line).collect();
        if cells.len() != columns + 1 {
            return Err(self.error(&format!(
                "expected {} fields, found {}",
                columns + 1,
                cells.len()
            )));
        }

        let symbol = match cells[0].as_bytes() {
            [s] if s.is_ascii_graphic() => *s,
            _ => {
                return Err(self.error(&format!(
                    "symbol '{}' must be a single character",
                    cells[0]
                )))
            }
        };

        let values = cells[1..]
            .iter()
            .map(|cell| {
                cell.parse::<f64>()
                    .map_err(|e| self.error(&format!("invalid score '{cell}': {e}")))
            })
            .collect::<Result<Vec<f64>>>()?;

        Ok((symbol, values))
    }

    fn error(&self, message: &str) -> PssmError {
        PssmError::Parse {
            line: self.line_number,
            message: message.to_string(),
        }
    }
}

fn split_cells(line: &str) -> impl Iterator<Item = &str> {
    line.trim_end_matches(['\r', '\n'])
        .split(',')
        .map(|cell| cell.trim().trim_matches('"'))
}

/// Read a PSSM file, naming the matrix after the file
pub fn read_pssm_file<P: AsRef<Path>>(path: P) -> Result<Pssm> {
    let path = path.as_ref();
    let input = open_pssm_input(path)?;
    PssmReader::new(input).read(&pssm_name(path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const TOY: &str = "aa,-1,0,1\nA,0.5,0.25,0.5\nS,0.5,0.75,0.5\n";

    fn read(text: &str) -> Result<Pssm> {
        PssmReader::new(Cursor::new(text)).read("toy")
    }

    #[test]
    fn test_read_toy_matrix() {
        let pssm = read(TOY).unwrap();
        assert_eq!(pssm.name(), "toy");
        assert_eq!(pssm.positions(), &["-1", "0", "1"]);
        assert_eq!(pssm.alphabet().to_string(), "AS");
        assert_eq!(pssm.matrix().get(1, 1), 0.75);
    }

    #[test]
    fn test_tolerates_crlf_quotes_and_blank_lines() {
        let pssm = read("\"aa\",\"-1\",\"0\"\r\n\r\n\"A\", 0.5, 0.5\r\nS,0.5,0.5\r\n\n").unwrap();
        assert_eq!(pssm.width(), 2);
        assert_eq!(pssm.alphabet().to_string(), "AS");
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(read(""), Err(PssmError::Parse { .. })));
        assert!(matches!(read("aa\nA\n"), Err(PssmError::Parse { line: 1, .. })));
        assert!(matches!(read("aa,0\n"), Err(PssmError::Parse { .. })));
        assert!(matches!(
            read("aa,0,1\nA,0.5\n"),
            Err(PssmError::Parse { line: 2, .. })
        ));
        assert!(matches!(
            read("aa,0\nAB,0.5\n"),
            Err(PssmError::Parse { line: 2, .. })
        ));
        assert!(matches!(
            read("aa,0\nA,abc\n"),
            Err(PssmError::Parse { line: 2, .. })
        ));
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(matches!(
            read("aa,0\nA,0\n"),
            Err(PssmError::NonPositiveEntry { .. })
        ));
        assert!(matches!(
            read("aa,0\nA,0.5\nA,0.5\n"),
            Err(PssmError::DuplicateSymbol('A'))
        ));
    }

    #[test]
    fn test_pssm_name() {
        assert_eq!(pssm_name("kinases/CK2A1.csv"), "CK2A1");
        assert_eq!(pssm_name("kinases/CK2A1.csv.gz"), "CK2A1");
        assert_eq!(pssm_name("PKA"), "PKA");
        assert!(is_pssm_file("a/PKA.csv"));
        assert!(is_pssm_file("a/PKA.csv.gz"));
        assert!(!is_pssm_file("a/PKA.tsv"));
    }
}
