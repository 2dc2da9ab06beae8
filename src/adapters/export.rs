use crate::domain::data::DataBundle;
use crate::utils::error::Result;
use serde::Serialize;
use std::io::Write;
use std::path::Path;

#[derive(Debug, Serialize)]
struct DataRow<'a> {
    location: &'a str,
    file_name: &'a str,
    media_type: &'a str,
    created_at: String,
}

/// Writes one CSV row per data reference, in bundle order.
pub fn write_data_listing<W: Write>(bundle: &DataBundle, writer: W) -> Result<usize> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    let references = bundle.references();
    for reference in &references {
        csv_writer.serialize(DataRow {
            location: reference.location(),
            file_name: reference.file_name().unwrap_or_default(),
            media_type: reference.media_type().unwrap_or_default(),
            created_at: reference.created_at().to_rfc3339(),
        })?;
    }
    csv_writer.flush()?;
    Ok(references.len())
}

pub fn export_data_listing<P: AsRef<Path>>(bundle: &DataBundle, path: P) -> Result<usize> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let file = std::fs::File::create(path)?;
    let rows = write_data_listing(bundle, file)?;
    tracing::debug!("Exported {} data references to {}", rows, path.display());
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listing_has_header_and_rows() {
        let bundle = DataBundle::new();
        let t = "2020-03-09T12:00:00Z".parse().unwrap();
        bundle.add("https://example.org/files/survey.csv", t).unwrap();
        bundle.add("s3://bucket/raw/", t).unwrap();

        let mut out = Vec::new();
        assert_eq!(write_data_listing(&bundle, &mut out).unwrap(), 2);
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines[0], "location,file_name,media_type,created_at");
        assert_eq!(
            lines[1],
            "https://example.org/files/survey.csv,survey.csv,text/csv,2020-03-09T12:00:00+00:00"
        );
        assert_eq!(lines[2], "s3://bucket/raw/,,,2020-03-09T12:00:00+00:00");
    }
}
