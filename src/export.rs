use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::{KitboardError, Result};
use crate::models::BeneficiarySession;

pub const BENEFICIARY_HEADER: [&str; 6] = ["session_id", "date", "type", "females", "males", "total"];

/// Write sessions as CSV with every field quoted.
pub fn write_beneficiaries_csv<W: Write>(writer: W, sessions: &[BeneficiarySession]) -> Result<()> {
    let mut wtr = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Always)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(writer);

    wtr.write_record(BENEFICIARY_HEADER)?;
    for s in sessions {
        wtr.write_record([
            s.id.as_str(),
            s.date.as_str(),
            s.session_type.as_str(),
            s.females.to_string().as_str(),
            s.males.to_string().as_str(),
            s.total().to_string().as_str(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

/// A session's `file` is only used when it is a bare file name. Anything that
/// could point outside the export directory is refused.
fn plain_file_name(file: &str) -> Option<&str> {
    let file = file.trim();
    if file.is_empty() || file == "." || file == ".." || file.contains(['/', '\\']) {
        return None;
    }
    let name = Path::new(file).file_name()?.to_str()?;
    (name == file).then_some(name)
}

/// `beneficiaries_<project>.csv`, or the session's own file name for a single-session export.
pub fn export_file_name(project_id: &str, session: Option<&BeneficiarySession>) -> String {
    let own = session.and_then(|s| s.file.as_deref());
    match own.and_then(plain_file_name) {
        Some(name) => name.to_string(),
        None => {
            if let Some(file) = own.filter(|f| !f.trim().is_empty()) {
                log::warn!("ignoring unsafe export file name {file:?}");
            }
            format!("beneficiaries_{project_id}.csv")
        }
    }
}

pub fn export_beneficiaries(
    dir: &Path,
    file_name: &str,
    sessions: &[BeneficiarySession],
) -> Result<PathBuf> {
    let file_name = plain_file_name(file_name).ok_or_else(|| {
        KitboardError::InvalidArgument(format!("export file name must be a plain name, got {file_name:?}"))
    })?;
    std::fs::create_dir_all(dir)?;
    let path = dir.join(file_name);
    let file = File::create(&path)?;
    write_beneficiaries_csv(file, sessions)?;
    log::info!("exported {} sessions to {}", sessions.len(), path.display());
    Ok(path)
}
