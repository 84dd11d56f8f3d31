use std::{
    fs::File,
    io::{self, BufReader, Read},
    path::Path,
};

use crate::error::Result;

/// Read the whole JSON text from `path`, or from standard input when no path is given.
pub fn read_json(path: Option<&Path>) -> Result<String> {
    let mut text = String::new();
    match path {
        Some(path) => {
            log::debug!("reading {}", path.display());
            let file = File::open(path)?;
            BufReader::new(file).read_to_string(&mut text)?;
        }
        None => {
            log::debug!("reading standard input");
            io::stdin().lock().read_to_string(&mut text)?;
        }
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"points": []}}"#).unwrap();
        let text = read_json(Some(file.path())).unwrap();
        assert_eq!(text, r#"{"points": []}"#);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_json(Some(&dir.path().join("absent.json"))).unwrap_err();
        assert!(matches!(err, crate::error::PlotError::Io(_)));
    }
}
