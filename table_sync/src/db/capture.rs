//! Capture file output
//!
//! Writes the statements a capture-mode session recorded to a timestamped
//! `.sql` file so they can be reviewed or applied by hand.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::utils::naming::create_capture_name;

/// Render captured statements as a SQL script
pub fn render_script(statements: &[String]) -> String {
    statements
        .iter()
        .map(|statement| format!("{};\n", statement.trim_end().trim_end_matches(';')))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Write captured statements for `table_name` into `directory`
///
/// Returns the path of the new file.
pub fn write_capture_file(
    directory: impl AsRef<Path>,
    table_name: &str,
    statements: &[String],
) -> Result<PathBuf> {
    let directory = directory.as_ref();
    fs::create_dir_all(directory)?;

    let filename = format!("{}.sql", create_capture_name(table_name, true));
    let filepath = directory.join(filename);

    let mut file = File::create(&filepath)?;
    file.write_all(render_script(statements).as_bytes())?;

    tracing::info!(
        path = %filepath.display(),
        statements = statements.len(),
        "Captured SQL written"
    );

    Ok(filepath)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_render_script_terminates_statements() {
        let statements = vec![
            "DROP TABLE IF EXISTS `GDN_User`".to_string(),
            "CREATE TABLE `GDN_User` (`UserID` int NOT NULL);".to_string(),
        ];
        assert_eq!(
            render_script(&statements),
            "DROP TABLE IF EXISTS `GDN_User`;\n\nCREATE TABLE `GDN_User` (`UserID` int NOT NULL);\n"
        );
    }

    #[test]
    fn test_write_capture_file() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("captures");

        let path = write_capture_file(&out, "GDN_User", &["SELECT 1".to_string()]).unwrap();

        assert!(path.starts_with(&out));
        assert!(path.to_string_lossy().ends_with("_gdn_user.sql"));
        assert_eq!(fs::read_to_string(path).unwrap(), "SELECT 1;\n");
    }
}
