use std::fs;
use std::path::Path;

use ndarray::Array2;
use tracing::debug;

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delimiter {
    Comma,
    Whitespace,
}

impl Delimiter {
    fn split<'a>(self, line: &'a str) -> Box<dyn Iterator<Item = &'a str> + 'a> {
        match self {
            Delimiter::Comma => Box::new(line.split(',').map(str::trim)),
            Delimiter::Whitespace => Box::new(line.split_whitespace()),
        }
    }
}

/// A header row plus a rectangular block of numbers.
#[derive(Debug, Clone)]
pub struct Table {
    pub header: Vec<String>,
    pub data: Array2<f64>,
    pub delimiter: Delimiter,
}

impl Table {
    /// The first line is always taken as the header, whatever it looks like.
    pub fn parse(text: &str) -> Result<Table> {
        let mut lines = text.lines();
        let header = match lines.next() {
            Some(line) => parse_header(line),
            None => return Err(Error::Parse("empty input".to_string())),
        };
        let body: Vec<_> = data_lines(lines, 2).collect();
        let (data, delimiter) = parse_rows(&body)?;
        Ok(Table {
            header,
            data,
            delimiter,
        })
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Table> {
        let path = path.as_ref();
        debug!("reading table from {}", path.display());
        let text = fs::read_to_string(path)?;
        Table::parse(&text)
    }

    pub fn ncols(&self) -> usize {
        self.data.ncols()
    }

    pub fn nrows(&self) -> usize {
        self.data.nrows()
    }
}

/// Strips the line terminator and a leading `#` marker, then splits on commas.
pub fn parse_header(line: &str) -> Vec<String> {
    let line = line.trim_end_matches(|c: char| c == '\n' || c == '\r');
    let line = line.trim_start();
    let line = line.strip_prefix('#').unwrap_or(line);
    line.split(',').map(|name| name.trim().to_string()).collect()
}

/// Numbered, non-blank, non-comment lines. `first_lineno` is the 1-based
/// number of the first line yielded by `lines`.
pub fn data_lines<'a, I>(lines: I, first_lineno: usize) -> impl Iterator<Item = (usize, &'a str)>
where
    I: Iterator<Item = &'a str>,
{
    lines
        .enumerate()
        .map(move |(i, l)| (i + first_lineno, l.trim()))
        .filter(|(_, l)| !l.is_empty() && !l.starts_with('#'))
}

pub fn parse_line(line: &str, delimiter: Delimiter) -> std::result::Result<Vec<f64>, String> {
    delimiter
        .split(line)
        .map(|field| {
            field
                .parse::<f64>()
                .map_err(|_| format!("'{}' is not a number", field))
        })
        .collect()
}

fn parse_rows_with(
    lines: &[(usize, &str)],
    delimiter: Delimiter,
) -> std::result::Result<Array2<f64>, String> {
    let mut ncols = None;
    let mut flat = Vec::new();
    for &(lineno, line) in lines {
        let row = parse_line(line, delimiter).map_err(|e| format!("line {}: {}", lineno, e))?;
        match ncols {
            None => ncols = Some(row.len()),
            Some(n) if n != row.len() => {
                return Err(format!(
                    "line {}: expected {} fields, found {}",
                    lineno,
                    n,
                    row.len()
                ))
            }
            _ => {}
        }
        flat.extend(row);
    }
    let ncols = ncols.ok_or_else(|| "no data rows".to_string())?;
    Array2::from_shape_vec((lines.len(), ncols), flat).map_err(|e| e.to_string())
}

/// Tries a comma delimiter first and falls back to whitespace.
pub fn parse_rows(lines: &[(usize, &str)]) -> Result<(Array2<f64>, Delimiter)> {
    let comma_err = match parse_rows_with(lines, Delimiter::Comma) {
        Ok(data) => return Ok((data, Delimiter::Comma)),
        Err(e) => e,
    };
    debug!("comma delimiter rejected ({}), trying whitespace", comma_err);
    match parse_rows_with(lines, Delimiter::Whitespace) {
        Ok(data) => Ok((data, Delimiter::Whitespace)),
        Err(ws_err) => Err(Error::Parse(format!(
            "neither comma ({}) nor whitespace ({}) delimited",
            comma_err, ws_err
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_header() {
        assert_eq!(
            parse_header("# m, b ,lnlike,step,walker\r\n"),
            vec!["m", "b", "lnlike", "step", "walker"]
        );
        assert_eq!(parse_header("a_1,lnlike"), vec!["a_1", "lnlike"]);
    }

    #[test]
    fn test_comma_table() {
        let t = Table::parse("x,y\n1,2\n3, 4\n\n# comment\n5,6\n").unwrap();
        assert_eq!(t.header, vec!["x", "y"]);
        assert_eq!(t.delimiter, Delimiter::Comma);
        assert_eq!(t.data.shape(), &[3, 2]);
        assert_eq!(t.data[[1, 1]], 4.0);
        assert_eq!(t.data[[2, 0]], 5.0);
    }

    #[test]
    fn test_whitespace_fallback() {
        let t = Table::parse("x,y,z\n1 2 3\n4\t5   6\n").unwrap();
        assert_eq!(t.delimiter, Delimiter::Whitespace);
        assert_eq!(t.data.shape(), &[2, 3]);
        assert_eq!(t.data[[1, 2]], 6.0);
    }

    #[test]
    fn test_ragged_rows() {
        match Table::parse("x,y\n1,2\n3\n") {
            Err(Error::Parse(msg)) => assert!(msg.contains("line 3")),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_not_numeric() {
        assert!(matches!(
            Table::parse("x,y\n1,abc\n"),
            Err(Error::Parse(_))
        ));
        assert!(matches!(Table::parse("x,y\n"), Err(Error::Parse(_))));
        assert!(matches!(Table::parse(""), Err(Error::Parse(_))));
    }

    #[test]
    fn test_from_file() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(f, "a,b").unwrap();
        writeln!(f, "1.5e0 -2").unwrap();
        let t = Table::from_file(f.path()).unwrap();
        assert_eq!(t.nrows(), 1);
        assert_eq!(t.ncols(), 2);
        assert_eq!(t.data[[0, 1]], -2.0);
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            Table::from_file(dir.path().join("nope.txt")),
            Err(Error::Io(_))
        ));
    }
}
