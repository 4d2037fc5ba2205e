//! File naming around one input track.

use std::ffi::OsString;
use std::path::{Component, Path, PathBuf};

/// `data/original/H1.csv` -> `data/output/H1_out.csv`.
///
/// Every `original` directory component becomes `output`; the file stem gets
/// an `_out` suffix and keeps its extension.
pub fn default_output_path(input: &Path) -> PathBuf {
    let mut output: PathBuf = match input.parent() {
        Some(parent) => parent
            .components()
            .map(|component| match component {
                Component::Normal(name) if name == "original" => Component::Normal("output".as_ref()),
                other => other,
            })
            .collect(),
        None => PathBuf::new(),
    };

    let mut file_name = OsString::from(input.file_stem().unwrap_or_default());
    file_name.push("_out");
    if let Some(ext) = input.extension() {
        file_name.push(".");
        file_name.push(ext);
    }
    output.push(file_name);
    output
}

/// Decision trace written next to the input: `H1.csv` -> `H1.csv_logfile.txt`.
pub fn default_trace_path(input: &Path) -> PathBuf {
    let mut name = input.as_os_str().to_owned();
    name.push("_logfile.txt");
    PathBuf::from(name)
}

/// Leading token of the file stem, e.g. `spayed_H12_2019.csv` -> `spayed`.
pub fn group_label_from_filename(input: &Path) -> Option<String> {
    let stem = input.file_stem()?.to_str()?;
    stem.split('_')
        .next()
        .filter(|token| !token.is_empty())
        .map(str::to_owned)
}
