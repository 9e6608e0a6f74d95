use std::path::Path;

use crate::enrich::EnrichStats;

/// A single entry in the run report.
#[derive(Debug, Clone)]
pub enum ReportEntry {
    Failed {
        id: u64,
        title: String,
        error: String,
    },
    Skipped {
        id: u64,
    },
}

/// Collects per-item outcomes that need operator attention and writes a
/// plain-text report next to the output.
#[derive(Debug, Default)]
pub struct EnrichReport {
    kind: String,
    entries: Vec<ReportEntry>,
}

impl EnrichReport {
    pub fn new(kind: &str) -> Self {
        Self {
            kind: kind.to_string(),
            entries: Vec::new(),
        }
    }

    pub fn add(&mut self, entry: ReportEntry) {
        self.entries.push(entry);
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Write the report to a file.
    pub fn write_to_file(&self, path: &Path, stats: &EnrichStats) -> std::io::Result<()> {
        use std::io::Write;

        let mut file = std::fs::File::create(path)?;

        writeln!(file, "=== Enrichment Report ({}) ===", self.kind)?;
        writeln!(
            file,
            "Date: {}",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
        )?;
        writeln!(file)?;
        writeln!(file, "--- Summary ---")?;
        writeln!(file, "Distinct ids: {}", stats.ids_total)?;
        writeln!(file, "Cache hits:   {}", stats.cache_hits)?;
        writeln!(file, "Fetched:      {}", stats.fetched)?;
        writeln!(file, "Failed:       {}", stats.failed)?;
        writeln!(file, "Skipped:      {}", stats.skipped)?;
        writeln!(file, "Checkpoints:  {}", stats.checkpoints)?;
        writeln!(file)?;
        writeln!(file, "--- Details ---")?;
        writeln!(file)?;

        for entry in &self.entries {
            match entry {
                ReportEntry::Failed { id, title, error } => {
                    writeln!(file, "[FAILED] {} \"{}\": {}", id, title, error)?;
                }
                ReportEntry::Skipped { id } => {
                    writeln!(file, "[SKIPPED] {} (cancelled before dispatch)", id)?;
                }
            }
        }

        Ok(())
    }
}
