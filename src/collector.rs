/*!
 * Result collection for a backend run.
 *
 * The backend leaves its files in a working directory under its own names
 * (`{base}-mono.pdf`, `{base}-dual.pdf`). Collection resolves each artifact
 * kind independently, renaming native files to the canonical
 * `{base}_{lang}_translated.pdf` / `{base}_{lang}_bilingual.pdf`, and
 * classifies the run. A native file always replaces a canonical file left by
 * an earlier run. Running it again on the same directory yields the same
 * classification.
 */

use log::{debug, warn};
use std::fs;
use std::path::{Path, PathBuf};

use crate::file_utils::{artifact_file_name, native_artifact_file_name};
use crate::translation::{ArtifactKind, TranslationOutcome};

/// Classify the output of one backend run in `working_dir`
pub fn collect(base_name: &str, working_dir: &Path, target_language: &str) -> TranslationOutcome {
    let mono = resolve(base_name, working_dir, target_language, ArtifactKind::Mono);
    let dual = resolve(base_name, working_dir, target_language, ArtifactKind::Dual);
    TranslationOutcome::from_artifacts(mono, dual)
}

/// Locate the artifact of one kind, renaming the native file if needed
///
/// A native file is always fresh backend output and replaces any canonical
/// file left by an earlier run. The canonical file is used as is only when
/// no native file exists.
pub fn resolve(base_name: &str, working_dir: &Path, target_language: &str, kind: ArtifactKind) -> Option<PathBuf> {
    let canonical = working_dir.join(artifact_file_name(base_name, target_language, kind));
    let native = working_dir.join(native_artifact_file_name(base_name, kind));

    if !native.is_file() {
        return Some(canonical).filter(|path| path.is_file());
    }

    if canonical.exists() {
        // rename does not replace an existing target everywhere
        if let Err(e) = fs::remove_file(&canonical) {
            warn!("Could not remove stale {:?}: {}", canonical, e);
        }
    }

    match fs::rename(&native, &canonical) {
        Ok(()) => {
            debug!("Renamed {:?} to {:?}", native, canonical);
            Some(canonical)
        }
        Err(e) => {
            // The native file is still a usable artifact
            warn!("Could not rename {:?} to {:?}: {}", native, canonical, e);
            Some(native)
        }
    }
}
