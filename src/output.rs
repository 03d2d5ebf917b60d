//! Record output for the command line

use std::io::{self, Write};

use crate::disks::ProfileDisk;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Aligned columns for people
    #[default]
    Table,
    /// JSON array for scripts
    Json,
}

/// Write records to `out` in the chosen format
pub fn write_disks<W: Write>(
    out: &mut W,
    disks: &[ProfileDisk],
    format: OutputFormat,
) -> io::Result<()> {
    match format {
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, disks)?;
            writeln!(out)
        }
        OutputFormat::Table => write_table(out, disks),
    }
}

fn write_table<W: Write>(out: &mut W, disks: &[ProfileDisk]) -> io::Result<()> {
    if disks.is_empty() {
        return Ok(());
    }

    let owners: Vec<String> = disks.iter().map(|d| d.owner()).collect();
    let owner_width = owners.iter().map(|o| o.len()).max().unwrap_or(0).max(5);

    writeln!(
        out,
        "{:<6}  {:<owner_width$}  {:>12}  {:<20}  PATH",
        "LOCKED", "OWNER", "SIZE", "MODIFIED"
    )?;

    for (disk, owner) in disks.iter().zip(&owners) {
        let modified = disk
            .file
            .modified_at
            .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_default();

        writeln!(
            out,
            "{:<6}  {:<owner_width$}  {:>12}  {:<20}  {}",
            if disk.is_locked { "yes" } else { "no" },
            owner,
            disk.file.size,
            modified,
            disk.path().display()
        )?;
    }

    Ok(())
}
