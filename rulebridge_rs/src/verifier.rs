//! Post-generation verification pass.
//!
//! Today this is a pure filter over the generator's records. It stays a
//! separate stage so later semantic checks (deprecated targets,
//! argument-shape validation) can land here without touching the emitter.

use crate::types::TranslationRecord;

/// Select the records the generator could not resolve, preserving source
/// order.
pub fn verify(mapping: &[TranslationRecord]) -> Vec<TranslationRecord> {
    mapping
        .iter()
        .filter(|record| record.target_command.is_none())
        .cloned()
        .collect()
}
