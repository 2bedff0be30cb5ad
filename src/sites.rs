//! Site coordinate tables: one site per line, whitespace separated numbers.

use std::{
    fs::File,
    io::{self, BufRead, BufReader},
    path::Path,
};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoordinateError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("line {line}: cannot read {token:?} as a coordinate")]
    Parse { line: usize, token: String },

    #[error("line {line}: expected {expected} coordinates, found {found}")]
    RaggedRow {
        line: usize,
        expected: usize,
        found: usize,
    },
}

/// Reads one coordinate row per site. Blank lines and `#` comments are skipped.
///
/// ```
/// # use sitesym::sites::read_coordinates;
/// let sites = read_coordinates("0 0 0\n0.5 0.5 0.5 # body centre\n".as_bytes()).unwrap();
/// assert_eq!(sites, vec![vec![0.0; 3], vec![0.5; 3]]);
/// ```
pub fn read_coordinates<R: BufRead>(reader: R) -> Result<Vec<Vec<f64>>, CoordinateError> {
    let mut sites: Vec<Vec<f64>> = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line_number = index + 1;
        let line = line?;
        let row = line
            .split('#')
            .next()
            .unwrap_or_default()
            .split_whitespace()
            .map(|token| {
                token.parse::<f64>().map_err(|_| CoordinateError::Parse {
                    line: line_number,
                    token: token.to_owned(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        if row.is_empty() {
            continue;
        }
        if let Some(first) = sites.first() {
            if first.len() != row.len() {
                return Err(CoordinateError::RaggedRow {
                    line: line_number,
                    expected: first.len(),
                    found: row.len(),
                });
            }
        }
        sites.push(row);
    }
    Ok(sites)
}

pub fn read_coordinates_from_file(path: impl AsRef<Path>) -> Result<Vec<Vec<f64>>, CoordinateError> {
    read_coordinates(BufReader::new(File::open(path)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skips_comments_and_blank_lines() {
        let text = "# spinel fragment\n\n0.0 0.0 0.0\n  0.25 0.25 0.25  \n";
        assert_eq!(
            read_coordinates(text.as_bytes()).unwrap(),
            vec![vec![0.0, 0.0, 0.0], vec![0.25, 0.25, 0.25]]
        );
    }

    #[test]
    fn reports_bad_rows() {
        insta::assert_snapshot!(
            read_coordinates("0 0\n0 1 2\n".as_bytes()).unwrap_err().to_string(),
            @"line 2: expected 2 coordinates, found 3"
        );
        insta::assert_snapshot!(
            read_coordinates("0 a\n".as_bytes()).unwrap_err().to_string(),
            @r#"line 1: cannot read "a" as a coordinate"#
        );
    }
}
