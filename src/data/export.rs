use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};

use super::model::{FrequencyDataset, TimeRepresentation, TIME_COLUMN};

/// Render a cell, using fixed decimals for an MJD time column.
fn render_cell(dataset: &FrequencyDataset, column: &str, row: usize, precision: usize) -> String {
    let Some(cell) = dataset.column(column).and_then(|s| s.cell(row)) else {
        return String::new();
    };
    if column == TIME_COLUMN && dataset.time_repr == Some(TimeRepresentation::Mjd) {
        cell.render(precision)
    } else {
        cell.to_string()
    }
}

fn header(dataset: &FrequencyDataset) -> Vec<&str> {
    std::iter::once(dataset.index_label())
        .chain(dataset.column_names())
        .collect()
}

fn rows(dataset: &FrequencyDataset, precision: usize) -> impl Iterator<Item = Vec<String>> + '_ {
    (0..dataset.len()).map(move |row| {
        std::iter::once(row.to_string())
            .chain(
                dataset
                    .columns
                    .iter()
                    .map(|c| render_cell(dataset, &c.name, row, precision)),
            )
            .collect()
    })
}

/// Write the dataset as CSV: index column first, then every data column.
pub fn write_csv<W: Write>(dataset: &FrequencyDataset, sink: W, precision: usize) -> Result<()> {
    let mut writer = csv::Writer::from_writer(sink);
    writer.write_record(header(dataset)).context("writing CSV header")?;
    for (row_no, record) in rows(dataset, precision).enumerate() {
        writer
            .write_record(&record)
            .with_context(|| format!("writing CSV row {row_no}"))?;
    }
    writer.flush().context("flushing CSV")?;
    Ok(())
}

/// Write the dataset to `path`, creating parent directories as needed.
pub fn export_file(dataset: &FrequencyDataset, path: &Path, precision: usize) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    let file = std::fs::File::create(path).with_context(|| format!("creating {}", path.display()))?;
    write_csv(dataset, file, precision)?;
    log::info!("Exported {} rows to {}", dataset.len(), path.display());
    Ok(())
}

/// Plain-text table with right-aligned columns, for terminal output.
pub fn render_table(dataset: &FrequencyDataset, precision: usize) -> String {
    let head: Vec<String> = header(dataset).into_iter().map(str::to_string).collect();
    let body: Vec<Vec<String>> = rows(dataset, precision).collect();

    let widths: Vec<usize> = (0..head.len())
        .map(|i| {
            body.iter()
                .map(|r| r[i].len())
                .chain(std::iter::once(head[i].len()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let format_line = |cells: &[String]| {
        cells
            .iter()
            .zip(&widths)
            .map(|(c, w)| format!("{c:>w$}"))
            .collect::<Vec<_>>()
            .join("  ")
    };

    let mut out = format_line(&head);
    for row in &body {
        out.push('\n');
        out.push_str(&format_line(row));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::mjd::TimeConverter;

    fn populated() -> FrequencyDataset {
        let mut ds = FrequencyDataset::from_frequencies(vec![0.5, 0.25]);
        TimeConverter::new().populate(&mut ds).unwrap();
        ds
    }

    fn to_csv(ds: &FrequencyDataset) -> String {
        let mut buf = Vec::new();
        write_csv(ds, &mut buf, 10).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn writes_datetime_rows() {
        assert_eq!(
            to_csv(&populated()),
            "DataPoint,Frequency,time\n\
             0,5.0,1997-01-01 08:00:00\n\
             1,2.5,1997-02-03 08:00:00\n"
        );
    }

    #[test]
    fn writes_mjd_with_fixed_decimals() {
        let mut ds = populated();
        TimeConverter::new().convert_to_mjd(&mut ds).unwrap();
        assert_eq!(
            to_csv(&ds),
            "DataPoint,Frequency,time\n\
             0,5.0,50449.3333333333\n\
             1,2.5,50482.3333333333\n"
        );
    }

    #[test]
    fn unpopulated_dataset_has_blank_index_label() {
        let ds = FrequencyDataset::from_frequencies(vec![1.5]);
        assert_eq!(to_csv(&ds), ",Frequency\n0,1.5\n");
    }

    #[test]
    fn table_aligns_columns() {
        let table = render_table(&populated(), 10);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("DataPoint"));
        assert!(lines[1].ends_with("1997-01-01 08:00:00"));
        assert_eq!(lines[0].len(), lines[1].len());
    }

    #[test]
    fn export_file_creates_parent_dirs() {
        let dir = std::env::temp_dir().join(format!("mjd-panda-export-{}", std::process::id()));
        let path = dir.join("nested").join("out.csv");
        export_file(&populated(), &path, 10).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        std::fs::remove_dir_all(&dir).ok();
        assert!(text.starts_with("DataPoint,Frequency,time"));
    }
}
