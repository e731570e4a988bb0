//! Error types of the table-level operations. The clustering and consensus steps themselves never fail.

use definitions::DefinitionError;
use thiserror::Error;

/// Result type alias for the table-level operations.
pub type Result<T> = std::result::Result<T, ReconcileError>;

#[derive(Error, Debug)]
pub enum ReconcileError {
    /// Invalid parameter value provided
    #[error("Invalid parameter '{parameter}': {reason}")]
    InvalidParameter {
        /// The parameter name
        parameter: String,
        /// Explanation of why it's invalid
        reason: String,
    },

    /// The identifier column is not in the header of a table
    #[error("Column '{column}' not found in {path}")]
    MissingColumn {
        /// The column name
        column: String,
        /// Where the table came from
        path: String,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Definition(#[from] DefinitionError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_parameter() {
        let error = ReconcileError::InvalidParameter {
            parameter: "overlap_threshold".to_string(),
            reason: "must be within [0, 1]".to_string(),
        };
        let msg = format!("{error}");
        assert!(msg.contains("Invalid parameter 'overlap_threshold'"));
        assert!(msg.contains("[0, 1]"));
    }

    #[test]
    fn test_missing_column() {
        let error = ReconcileError::MissingColumn {
            column: "seqname".to_string(),
            path: "virsorter2_summary.tsv".to_string(),
        };
        let msg = format!("{error}");
        assert_eq!(msg, "Column 'seqname' not found in virsorter2_summary.tsv");
    }

    #[test]
    fn test_definition_error() {
        let error: ReconcileError = DefinitionError::InvalidTool("checkv".to_string()).into();
        assert!(format!("{error}").contains("checkv"));
    }
}
