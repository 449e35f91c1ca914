use anyhow::Result;
use std::path::{Path, PathBuf};

pub fn validate_csv_file(path: &str) -> Result<()> {
    let pb = PathBuf::from(path);

    let ext = pb
        .extension()
        .and_then(|s| s.to_str())
        .map(|s| s.to_lowercase());
    match ext.as_deref() {
        Some("csv") | Some("tra") | Some("tes") => {}
        _ => anyhow::bail!("File must have a .csv, .tra or .tes extension: {}", path),
    }

    if !pb.exists() {
        anyhow::bail!("File does not exist: {}", path);
    }

    Ok(())
}

/// `dir/cv_results.csv` becomes `dir/cv_results_<tag>.csv`.
pub fn tagged_path(path: &Path, tag: &str) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let file_name = match path.extension() {
        Some(ext) => format!("{}_{}.{}", stem, tag, ext.to_string_lossy()),
        None => format!("{}_{}", stem, tag),
    };
    path.with_file_name(file_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tagged_path() {
        assert_eq!(
            tagged_path(Path::new("out/cv_results.csv"), "recall_macro"),
            PathBuf::from("out/cv_results_recall_macro.csv")
        );
        assert_eq!(tagged_path(Path::new("report"), "f1"), PathBuf::from("report_f1"));
    }
}
