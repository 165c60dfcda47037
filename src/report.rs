//! Missing-resource report writers.
//!
//! Produces two tabular serializations of the missing list (comma- and
//! tab-delimited) sharing one fixed column order. The `name` column is
//! the version-stripped title, human-readable rather than normalized.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::models::MissingResource;
use crate::normalize::strip_version_suffix;

/// Fixed report columns, in order.
pub const REPORT_HEADER: [&str; 5] = ["name", "source", "kingdom", "tag", "url"];

/// Write the CSV and TSV reports, returning both paths.
///
/// Files share a timestamped basename and differ only by extension.
pub fn write_reports(
    missing: &[MissingResource],
    output_dir: &Path,
    basename: &str,
) -> Result<(PathBuf, PathBuf)> {
    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create {}", output_dir.display()))?;

    let stamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
    let csv_path = output_dir.join(format!("{}_{}.csv", basename, stamp));
    let tsv_path = output_dir.join(format!("{}_{}.tsv", basename, stamp));

    write_delimited(&csv_path, missing, b',')?;
    write_delimited(&tsv_path, missing, b'\t')?;

    Ok((csv_path, tsv_path))
}

fn write_delimited(path: &Path, missing: &[MissingResource], delimiter: u8) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_path(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;

    writer.write_record(REPORT_HEADER)?;

    for entry in missing {
        let resource = &entry.resource;
        let name = strip_version_suffix(&resource.title);
        writer.write_record([
            name.as_str(),
            resource.source_id.as_str(),
            resource.kingdom.as_str(),
            resource.tag.as_str(),
            resource.source_base_url.as_str(),
        ])?;
    }

    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{HarvestedResource, Kingdom, MatchStrategy};

    fn missing(title: &str, tag: &str) -> MissingResource {
        MissingResource {
            resource: HarvestedResource {
                title: title.to_string(),
                link: String::new(),
                guid: String::new(),
                description: String::new(),
                published_at: String::new(),
                tag: tag.to_string(),
                kingdom: Kingdom::Plantae,
                source_id: "jabot".to_string(),
                source_base_url: "https://ipt.jbrj.gov.br/jabot/".to_string(),
            },
            attempted_strategies: MatchStrategy::ALL.to_vec(),
        }
    }

    #[test]
    fn writes_csv_and_tsv_with_shared_basename() {
        let tmp = tempfile::TempDir::new().unwrap();
        let rows = vec![missing("Flora of Rio - Version 1.3", "hhm")];
        let (csv_path, tsv_path) = write_reports(&rows, tmp.path(), "missing").unwrap();

        assert_eq!(csv_path.extension().unwrap(), "csv");
        assert_eq!(tsv_path.extension().unwrap(), "tsv");
        assert_eq!(csv_path.file_stem(), tsv_path.file_stem());

        let csv_text = std::fs::read_to_string(&csv_path).unwrap();
        let tsv_text = std::fs::read_to_string(&tsv_path).unwrap();
        assert!(csv_text.starts_with("name,source,kingdom,tag,url\n"));
        assert!(tsv_text.starts_with("name\tsource\tkingdom\ttag\turl\n"));
        // Version suffix is stripped from the display name.
        assert!(csv_text.contains("Flora of Rio,jabot,Plantae,hhm,"));
    }

    #[test]
    fn empty_missing_list_writes_header_only() {
        let tmp = tempfile::TempDir::new().unwrap();
        let (csv_path, _) = write_reports(&[], tmp.path(), "missing").unwrap();
        let text = std::fs::read_to_string(&csv_path).unwrap();
        assert_eq!(text, "name,source,kingdom,tag,url\n");
    }

    #[test]
    fn fields_with_delimiters_are_quoted() {
        let tmp = tempfile::TempDir::new().unwrap();
        let rows = vec![missing("Mosses, Lichens", "")];
        let (csv_path, _) = write_reports(&rows, tmp.path(), "missing").unwrap();
        let text = std::fs::read_to_string(&csv_path).unwrap();
        assert!(text.contains("\"Mosses, Lichens\""));
    }
}
