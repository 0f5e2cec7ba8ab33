//! Cross-reference and call-graph export for PLCopen XML projects.
//!
//! Outputs land in an `Exports` directory beside the XML (or a caller-chosen
//! directory): `cross_reference.csv`, `pou_call_graph.csv`, `call_graph.mmd`,
//! and a `summary.json` describing the run.

use crate::{
    callgraph,
    crossref,
    error::{Error, Result},
    output::write_file_atomic,
    plcopen::Project,
};
use serde::Serialize;
use std::{
    fs,
    path::{Path, PathBuf},
    time::SystemTime,
};
use tracing::{debug, info};
use walkdir::WalkDir;

/// Options for an export run.
#[derive(Debug, Clone)]
pub struct ExportOptions {
    /// Explicit PLCopen XML file; discovery is skipped when set
    pub input: Option<PathBuf>,

    /// Directory searched for the newest `.xml` when no input is given
    pub search_dir: PathBuf,

    /// Output directory; defaults to `Exports` beside the XML
    pub output_dir: Option<PathBuf>,

    /// Keep timestamped backups of outputs being replaced
    pub backup_existing: bool,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            input: None,
            search_dir: PathBuf::from("."),
            output_dir: None,
            backup_existing: true,
        }
    }
}

/// Summary of a completed export run, also written as `summary.json`.
#[derive(Debug, Clone, Serialize)]
pub struct ExportStats {
    /// XML file the export was built from
    pub xml_path: String,

    /// Directory the outputs were written into
    pub output_directory: String,

    /// Number of POUs found
    pub pou_count: usize,

    /// Rows in the cross-reference table
    pub crossref_rows: usize,

    /// Edges in the call graph
    pub call_edges: usize,

    /// Generation timestamp
    pub generated_at: String,
}

/// Finds the most recently modified `.xml` file directly inside any of the
/// given directories.
#[must_use]
pub fn find_latest_xml(search_dirs: &[PathBuf]) -> Option<PathBuf> {
    let mut newest: Option<(SystemTime, PathBuf)> = None;

    for dir in search_dirs {
        if !dir.is_dir() {
            continue;
        }
        for entry in WalkDir::new(dir)
            .max_depth(1)
            .into_iter()
            .filter_map(std::result::Result::ok)
        {
            let path = entry.path();
            if !entry.file_type().is_file() {
                continue;
            }
            let is_xml = path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case("xml"));
            if !is_xml {
                continue;
            }
            let Ok(meta) = entry.metadata() else { continue };
            let Ok(modified) = meta.modified() else { continue };
            let is_newer = newest
                .as_ref()
                .map_or(true, |(best, _)| modified > *best);
            if is_newer {
                newest = Some((modified, path.to_path_buf()));
            }
        }
    }

    newest.map(|(_, path)| path)
}

/// Runs the full export.
///
/// # Errors
///
/// Returns an error if no XML can be located, parsing fails, or any output
/// cannot be written.
pub fn run(options: &ExportOptions) -> Result<ExportStats> {
    let xml_path = match &options.input {
        Some(path) => path.clone(),
        None => {
            let search_dirs = vec![options.search_dir.clone(), options.search_dir.join("Exports")];
            find_latest_xml(&search_dirs).ok_or_else(|| Error::NoXmlFound {
                path: options.search_dir.clone(),
            })?
        }
    };
    info!("Using PLCopen XML: {}", xml_path.display());

    let project = Project::parse_file(&xml_path)?;
    debug!("Parsed {} POUs", project.pous.len());

    let output_dir = options.output_dir.clone().unwrap_or_else(|| {
        xml_path
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .join("Exports")
    });
    fs::create_dir_all(&output_dir).map_err(|e| Error::io(&output_dir, e))?;

    let entries = crossref::build(&project);
    let crossref_path = output_dir.join("cross_reference.csv");
    write_crossref_csv(&crossref_path, &entries, options.backup_existing)?;
    info!("Cross reference exported to: {}", crossref_path.display());

    let edges = callgraph::build(&project);
    let callgraph_path = output_dir.join("pou_call_graph.csv");
    write_callgraph_csv(&callgraph_path, &edges, options.backup_existing)?;
    info!("POU call graph exported to: {}", callgraph_path.display());

    let mermaid_path = output_dir.join("call_graph.mmd");
    write_file_atomic(
        &mermaid_path,
        callgraph::to_mermaid(&edges).as_bytes(),
        options.backup_existing,
    )?;
    info!("Mermaid call graph exported to: {}", mermaid_path.display());

    let stats = ExportStats {
        xml_path: xml_path.display().to_string(),
        output_directory: output_dir.display().to_string(),
        pou_count: project.pous.len(),
        crossref_rows: entries.len(),
        call_edges: edges.len(),
        generated_at: chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
    };

    let summary_path = output_dir.join("summary.json");
    let summary_json = serde_json::to_vec_pretty(&stats)?;
    write_file_atomic(&summary_path, &summary_json, options.backup_existing)?;

    info!("All exports complete. Files are in: {}", output_dir.display());
    Ok(stats)
}

fn write_crossref_csv(
    path: &Path,
    entries: &[crossref::CrossRefEntry],
    backup: bool,
) -> Result<()> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(["Variable", "Location", "Type", "Access", "POU", "Line"])
        .map_err(|e| Error::csv(path, e))?;

    for entry in entries {
        let line = entry.line.map(|l| l.to_string()).unwrap_or_default();
        writer
            .write_record([
                entry.variable.as_str(),
                entry.location.as_str(),
                entry.data_type.as_str(),
                entry.access.as_str(),
                entry.pou.as_str(),
                line.as_str(),
            ])
            .map_err(|e| Error::csv(path, e))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| Error::config(format!("CSV buffer flush failed: {e}")))?;
    write_file_atomic(path, &bytes, backup)
}

fn write_callgraph_csv(path: &Path, edges: &[callgraph::Edge], backup: bool) -> Result<()> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(["Caller", "Callee"])
        .map_err(|e| Error::csv(path, e))?;

    for edge in edges {
        writer
            .write_record([edge.caller.as_str(), edge.callee.as_str()])
            .map_err(|e| Error::csv(path, e))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| Error::config(format!("CSV buffer flush failed: {e}")))?;
    write_file_atomic(path, &bytes, backup)
}
