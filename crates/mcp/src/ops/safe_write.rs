#![forbid(unsafe_code)]

use super::CardOpError;

/// The dual-source write contract, in one place: the index transaction runs
/// first; only a subsequent file failure triggers the compensator. A failed
/// compensation upgrades to `Compensation`, which carries both errors and
/// signals that the two sources may have diverged.
pub(crate) fn safe_write<T>(
    db_action: impl FnOnce() -> Result<T, CardOpError>,
    file_action: impl FnOnce() -> Result<(), CardOpError>,
    compensate: impl FnOnce(&T) -> Result<(), CardOpError>,
) -> Result<T, CardOpError> {
    let db_result = db_action()?;
    match file_action() {
        Ok(()) => Ok(db_result),
        Err(file_err) => match compensate(&db_result) {
            Ok(()) => Err(file_err),
            Err(comp_err) => Err(CardOpError::Compensation {
                operation: Box::new(file_err),
                compensation: Box::new(comp_err),
            }),
        },
    }
}
