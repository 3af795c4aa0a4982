use std::fmt;
use std::path::Path;

use crate::ResultRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportRefusal {
    NoDestination,
    Empty,
}

impl fmt::Display for ExportRefusal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportRefusal::NoDestination => write!(f, "no destination"),
            ExportRefusal::Empty => write!(f, "result set is empty"),
        }
    }
}

/// Decides whether an export may proceed. The destination is checked before
/// the records; neither check has side effects.
pub fn export_precheck<'a>(
    destination: Option<&'a Path>,
    records: &[ResultRecord],
) -> Result<&'a Path, ExportRefusal> {
    let destination = destination
        .filter(|path| !path.as_os_str().is_empty())
        .ok_or(ExportRefusal::NoDestination)?;
    if records.is_empty() {
        return Err(ExportRefusal::Empty);
    }
    Ok(destination)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CategoryRecord;

    #[test]
    fn missing_destination_wins_over_empty() {
        assert_eq!(export_precheck(None, &[]), Err(ExportRefusal::NoDestination));
        assert_eq!(
            export_precheck(Some(Path::new("")), &[]),
            Err(ExportRefusal::NoDestination)
        );
    }

    #[test]
    fn empty_records_are_refused() {
        assert_eq!(
            export_precheck(Some(Path::new("out.csv")), &[]),
            Err(ExportRefusal::Empty)
        );
    }

    #[test]
    fn populated_records_pass() {
        let records = vec![ResultRecord::Categories(CategoryRecord::default())];
        assert_eq!(
            export_precheck(Some(Path::new("out.csv")), &records),
            Ok(Path::new("out.csv"))
        );
    }
}
