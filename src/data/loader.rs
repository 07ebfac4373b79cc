use std::io::Read;
use std::path::Path;

use anyhow::{bail, Context, Result};

use super::model::FrequencyDataset;

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a frequency dataset from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.txt` / `.csv` / no extension – one float per line, no header
pub fn load_file(path: &Path) -> Result<FrequencyDataset> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let dataset = match ext.as_str() {
        "txt" | "csv" | "" => {
            let file = std::fs::File::open(path)
                .with_context(|| format!("opening {}", path.display()))?;
            load_frequencies(file).with_context(|| format!("parsing {}", path.display()))?
        }
        other => bail!("Unsupported file extension: .{other}"),
    };

    log::info!("Loaded {} rows from {}", dataset.len(), path.display());
    Ok(dataset)
}

// ---------------------------------------------------------------------------
// Headerless single-column text
// ---------------------------------------------------------------------------

/// Layout: comma separated, no header, the first field of each line is a
/// frequency.  Blank lines are skipped but still counted, so errors name the
/// line as it appears in the file; extra fields are ignored.
pub fn load_frequencies<R: Read>(mut source: R) -> Result<FrequencyDataset> {
    let mut text = String::new();
    source.read_to_string(&mut text).context("reading input")?;

    let mut values = Vec::new();
    let mut warned_extra = false;

    for (idx, raw) in text.lines().enumerate() {
        let line = idx + 1;
        let mut fields = raw.split(',').map(str::trim);
        let Some(field) = fields.next().filter(|f| !f.is_empty()) else {
            continue;
        };
        if fields.next().is_some() && !warned_extra {
            log::warn!("Line {line}: extra fields, only the first is used");
            warned_extra = true;
        }

        let value = field
            .parse::<f64>()
            .with_context(|| format!("Line {line}: '{field}' is not a number"))?;
        values.push(value);
    }

    Ok(FrequencyDataset::from_frequencies(values))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{Series, FREQUENCY_COLUMN};

    #[test]
    fn parses_one_value_per_line() {
        let ds = load_frequencies("0.5\n0.3\n\n0.9\n".as_bytes()).unwrap();
        assert_eq!(
            ds.column(FREQUENCY_COLUMN),
            Some(&Series::Float(vec![0.5, 0.3, 0.9]))
        );
        assert!(ds.index_name.is_none());
    }

    #[test]
    fn ignores_extra_fields() {
        let ds = load_frequencies("1.5,foo\n2.5\n".as_bytes()).unwrap();
        assert_eq!(ds.column(FREQUENCY_COLUMN), Some(&Series::Float(vec![1.5, 2.5])));
    }

    #[test]
    fn rejects_non_numeric_line() {
        let err = load_frequencies("1.0\nabc\n".as_bytes()).unwrap_err();
        assert!(format!("{err:#}").starts_with("Line 2: 'abc' is not a number"));
    }

    #[test]
    fn error_line_counts_blank_lines() {
        let err = load_frequencies("\n1.0\n\nabc\n".as_bytes()).unwrap_err();
        assert!(format!("{err:#}").starts_with("Line 4: 'abc' is not a number"));

        let err = load_frequencies("\r\n2.0\r\nx1\r\n".as_bytes()).unwrap_err();
        assert!(format!("{err:#}").starts_with("Line 3: 'x1' is not a number"));
    }

    #[test]
    fn load_file_checks_extension() {
        let err = load_file(Path::new("frequencies.parquet")).unwrap_err();
        assert!(err.to_string().contains(".parquet"));
    }

    #[test]
    fn load_file_reads_text() {
        let path = std::env::temp_dir().join(format!("mjd-panda-loader-{}.txt", std::process::id()));
        std::fs::write(&path, "12.5\n13.5\n").unwrap();
        let ds = load_file(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(ds.len(), 2);
    }
}
