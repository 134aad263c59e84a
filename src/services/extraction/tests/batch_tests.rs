use super::*;
use std::cell::RefCell;
use std::fs;
use tempfile::TempDir;

/// Scripted collaborator: fails any file whose name contains a marker.
struct ScriptedExtractor {
    fail_marker: Option<&'static str>,
}

impl StructuredExtractor for ScriptedExtractor {
    fn extract_structured_data(&self, image_path: &Path) -> Result<String, String> {
        let name = image_path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        if let Some(marker) = self.fail_marker {
            if name.contains(marker) {
                return Err(format!("model refused {name}"));
            }
        }
        Ok(format!("# Extracted from {name}"))
    }
}

fn write_png(path: &Path) {
    let img = image::RgbImage::from_pixel(4, 4, image::Rgb([90, 90, 90]));
    img.save(path).unwrap();
}

/// Fixture: two valid images plus one corrupt one, in sorted order.
fn mixed_batch(dir: &TempDir) -> Vec<PathBuf> {
    let a = dir.path().join("a.png");
    let bad = dir.path().join("bad.jpg");
    let c = dir.path().join("c.png");
    write_png(&a);
    fs::write(&bad, b"not jpeg data").unwrap();
    write_png(&c);
    vec![a, bad, c]
}

#[test]
fn test_run_batch_skips_corrupt_image() {
    let dir = TempDir::new().unwrap();
    let paths = mixed_batch(&dir);
    let extractor = ScriptedExtractor { fail_marker: None };

    let summary = run_batch(&paths, &extractor, |_| {});

    assert_eq!(summary.total, 3);
    assert_eq!(summary.successful, 2);
    assert_eq!(summary.skipped, 1);
    // Valid entries preserved in traversal order
    assert!(summary.results[0].image_path.ends_with("a.png"));
    assert!(summary.results[1].image_path.ends_with("c.png"));
    assert_eq!(summary.warnings.len(), 1);
    assert!(summary.warnings[0].image_path.ends_with("bad.jpg"));
    assert!(summary.warnings[0].message.contains("bad.jpg"));
}

#[test]
fn test_run_batch_isolates_extractor_failure() {
    let dir = TempDir::new().unwrap();
    let a = dir.path().join("a.png");
    let b = dir.path().join("refuse_b.png");
    let c = dir.path().join("c.png");
    write_png(&a);
    write_png(&b);
    write_png(&c);
    let extractor = ScriptedExtractor {
        fail_marker: Some("refuse"),
    };

    let summary = run_batch(&[a, b, c], &extractor, |_| {});

    assert_eq!(summary.successful, 2);
    assert_eq!(summary.skipped, 1);
    assert!(summary.warnings[0].message.contains("model refused"));
}

#[test]
fn test_run_batch_reports_progress_in_order() {
    let dir = TempDir::new().unwrap();
    let paths = mixed_batch(&dir);
    let extractor = ScriptedExtractor { fail_marker: None };
    let seen: RefCell<Vec<(usize, usize, String)>> = RefCell::new(Vec::new());

    run_batch(&paths, &extractor, |p| {
        seen.borrow_mut().push((p.current, p.total, p.file_name));
    });

    let seen = seen.into_inner();
    assert_eq!(seen.len(), 3);
    assert_eq!(seen[0], (1, 3, "a.png".to_string()));
    // The corrupt item still gets a progress tick before it is skipped
    assert_eq!(seen[1], (2, 3, "bad.jpg".to_string()));
    assert_eq!(seen[2], (3, 3, "c.png".to_string()));
}

#[test]
fn test_run_batch_empty_input() {
    let extractor = ScriptedExtractor { fail_marker: None };

    let summary = run_batch(&[], &extractor, |_| {});

    assert_eq!(summary.total, 0);
    assert_eq!(summary.successful, 0);
    assert_eq!(summary.skipped, 0);
    assert!(!summary.batch_id.is_empty());
}

#[test]
fn test_extract_one_invalid_image() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.png");
    fs::write(&path, b"junk").unwrap();
    let extractor = ScriptedExtractor { fail_marker: None };

    let result = extract_one(&path, &extractor);

    assert!(matches!(result, Err(PipelineError::InvalidImage(_))));
}

#[test]
fn test_extract_one_maps_extractor_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("refuse.png");
    write_png(&path);
    let extractor = ScriptedExtractor {
        fail_marker: Some("refuse"),
    };

    let result = extract_one(&path, &extractor);

    assert!(matches!(result, Err(PipelineError::ExtractionFailure(_))));
}

#[test]
fn test_extract_one_success() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("scan.png");
    write_png(&path);
    let extractor = ScriptedExtractor { fail_marker: None };

    let markdown = extract_one(&path, &extractor).unwrap();

    assert_eq!(markdown, "# Extracted from scan.png");
}
