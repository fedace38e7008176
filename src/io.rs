use std::path::Path;

use anyhow::Context;
use plotly::Plot;
use polars::{
    io::{json::JsonReader, SerReader},
    lazy::frame::{IntoLazy, LazyCsvReader, LazyFileListReader, LazyFrame, LazyJsonLineReader},
};
use tracing::{debug, info};

use crate::error::LdvwError;

pub fn read_df_file(
    path: impl AsRef<Path>,
    infer_schema_length: Option<usize>,
) -> anyhow::Result<LazyFrame> {
    let path = path.as_ref();
    let Some(extension) = path.extension() else {
        return Err(LdvwError::UnsupportedInput {
            path: path.to_path_buf(),
        }
        .into());
    };
    debug!(path = %path.display(), "reading data file");
    Ok(match extension.to_string_lossy().as_ref() {
        "csv" => LazyCsvReader::new(path)
            .with_has_header(true)
            .with_infer_schema_length(infer_schema_length)
            .finish()
            .with_context(|| format!("Failed to scan `{}`", path.display()))?,
        "json" => {
            let file = std::fs::File::options()
                .read(true)
                .open(path)
                .with_context(|| format!("Failed to open `{}`", path.display()))?;
            JsonReader::new(file).finish()?.lazy()
        }
        "ndjson" | "jsonl" => LazyJsonLineReader::new(path)
            .finish()
            .with_context(|| format!("Failed to scan `{}`", path.display()))?,
        _ => {
            return Err(LdvwError::UnsupportedInput {
                path: path.to_path_buf(),
            }
            .into())
        }
    })
}

pub fn output_plot(plot: &Plot, output: impl AsRef<Path>) -> anyhow::Result<()> {
    let output = output.as_ref();
    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create `{}`", parent.display()))?;
    }
    plot.write_html(output);
    info!(path = %output.display(), "plot written");
    Ok(())
}
