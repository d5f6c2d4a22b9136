//! Optimistic-concurrency version guard.
//!
//! A client submits operations together with the document version it last
//! saw (`baseVersion`). The check rejects the batch outright on mismatch;
//! the storage layer's compare-and-swap on the version column is the
//! single atomic point that makes the guard race-free.

use crate::error::CoreError;
use crate::types::Version;

/// Compare the document's current version to the client-supplied base.
///
/// Mismatch turns a would-be lost update into an explicit conflict carrying
/// both versions; no operations are applied.
pub fn check_base_version(current: Version, requested: Version) -> Result<(), CoreError> {
    if current == requested {
        Ok(())
    } else {
        Err(CoreError::VersionConflict { current, requested })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn matching_version_passes() {
        assert!(check_base_version(5, 5).is_ok());
    }

    #[test]
    fn mismatch_carries_both_versions() {
        assert_matches!(
            check_base_version(7, 5),
            Err(CoreError::VersionConflict {
                current: 7,
                requested: 5
            })
        );
    }

    #[test]
    fn stale_and_future_bases_both_conflict() {
        assert!(check_base_version(3, 9).is_err());
        assert!(check_base_version(9, 3).is_err());
    }
}
