//! Output Writer Tests for the Entry Point Generator
//!
//! Atomic writes, unchanged-file skipping, stale output reporting and the
//! hash manifest, all against temporary directories.

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use std::fs;
    use std::path::{Path, PathBuf};

    use crate::output::{
        out_of_date, stale_outputs, write_all, write_atomic, HashManifest, OutputSet,
        WriteOutcome,
    };
    use crate::test_fixtures::render;

    const MARKED: &str = "// GENERATED FILE - DO NOT EDIT.\n// Generated by gen.py.\n";

    fn small_set() -> OutputSet {
        let mut outputs = OutputSet::new();
        outputs.insert(PathBuf::from("src/libGLESv2/a_autogen.h"), MARKED.to_string());
        outputs.insert(
            PathBuf::from("src/libGLESv2/libGLESv2_autogen.def"),
            "; GENERATED FILE - DO NOT EDIT.\nEXPORTS\n".to_string(),
        );
        outputs
    }

    #[test]
    fn test_write_atomic_creates_parents_and_skips_identical() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("src").join("common").join("x_autogen.h");

        assert_eq!(write_atomic(&path, "one").unwrap(), WriteOutcome::Written);
        assert_eq!(fs::read_to_string(&path).unwrap(), "one");
        assert_eq!(write_atomic(&path, "one").unwrap(), WriteOutcome::Unchanged);
        assert_eq!(write_atomic(&path, "two").unwrap(), WriteOutcome::Written);
        assert_eq!(fs::read_to_string(&path).unwrap(), "two");

        // No temporary siblings survive a write.
        let names: Vec<String> = fs::read_dir(path.parent().unwrap())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["x_autogen.h".to_string()]);
    }

    #[test]
    fn test_write_all_reports_written_then_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let outputs = small_set();

        let first = write_all(dir.path(), &outputs).unwrap();
        assert_eq!(first.written.len(), 2);
        assert!(first.unchanged.is_empty());

        let second = write_all(dir.path(), &outputs).unwrap();
        assert!(second.written.is_empty());
        assert_eq!(second.unchanged.len(), 2);
        assert!(out_of_date(dir.path(), &outputs).unwrap().is_empty());
    }

    #[test]
    fn test_out_of_date_lists_missing_and_edited_files() {
        let dir = tempfile::tempdir().unwrap();
        let outputs = small_set();
        write_all(dir.path(), &outputs).unwrap();

        fs::write(dir.path().join("src/libGLESv2/a_autogen.h"), "edited").unwrap();
        fs::remove_file(dir.path().join("src/libGLESv2/libGLESv2_autogen.def")).unwrap();

        let differing = out_of_date(dir.path(), &outputs).unwrap();
        assert_eq!(
            differing,
            vec![
                PathBuf::from("src/libGLESv2/a_autogen.h"),
                PathBuf::from("src/libGLESv2/libGLESv2_autogen.def"),
            ]
        );
    }

    #[test]
    fn test_stale_outputs_require_marker() {
        let dir = tempfile::tempdir().unwrap();
        let outputs = small_set();
        write_all(dir.path(), &outputs).unwrap();

        let lib = dir.path().join("src").join("libGLESv2");
        fs::write(lib.join("old_autogen.h"), MARKED).unwrap();
        fs::write(lib.join("handwritten_autogen.h"), "// Not generated.\n").unwrap();
        fs::write(lib.join("notes.h"), MARKED).unwrap();

        let stale = stale_outputs(dir.path(), &outputs);
        assert_eq!(stale, vec![PathBuf::from("src/libGLESv2/old_autogen.h")]);
    }

    #[test]
    fn test_manifest_freshness() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("gl.json");
        fs::write(&input, "{}").unwrap();
        let outputs = small_set();
        write_all(dir.path(), &outputs).unwrap();

        let hashes = HashManifest::hash_inputs(&[input.clone()]).unwrap();
        let manifest = HashManifest::new(hashes.clone(), &outputs);
        let manifest_path = dir.path().join("entry_points_hashes.json");
        manifest.save(&manifest_path).unwrap();

        let loaded = HashManifest::load(&manifest_path).unwrap();
        assert_eq!(loaded, manifest);
        assert!(loaded.is_fresh(&hashes, dir.path()));

        // An edited input invalidates the manifest.
        fs::write(&input, "{ }").unwrap();
        let changed = HashManifest::hash_inputs(&[input]).unwrap();
        assert!(!loaded.is_fresh(&changed, dir.path()));

        // So does a hand-edited output.
        fs::write(dir.path().join("src/libGLESv2/a_autogen.h"), "edited").unwrap();
        assert!(!loaded.is_fresh(&hashes, dir.path()));
    }

    #[test]
    fn test_corrupt_manifest_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("entry_points_hashes.json");
        fs::write(&path, "not json").unwrap();
        assert!(HashManifest::load(&path).is_none());
        assert!(HashManifest::load(Path::new("/nonexistent/entry_points_hashes.json")).is_none());
    }

    #[test]
    fn test_rendered_catalog_round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let outputs = render();
        let report = write_all(dir.path(), &outputs).unwrap();
        assert_eq!(report.written.len(), outputs.len());
        assert!(out_of_date(dir.path(), &outputs).unwrap().is_empty());
        assert!(stale_outputs(dir.path(), &outputs).is_empty());
    }
}
