//! End-to-end conversion runs against scratch directories and archives

use chrome2moz::shim::{HttpShimFetcher, ShimFetcher};
use chrome2moz::{
    convert_extension, ConversionOutcome, ConvertError, ConverterConfig, ConverterEngine,
    NullSink, ShimConfig,
};
use serde_json::{json, Value};
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;
use zip::write::{FileOptions, ZipWriter};
use zip::ZipArchive;

const SHIM_NAME: &str = "browser-polyfill.min.js";
const SHIM_BODY: &str = "/* polyfill */";

/// Stands in for the CDN download
struct LocalShim;

impl ShimFetcher for LocalShim {
    fn fetch(&self, dest_dir: &Path) -> chrome2moz::Result<String> {
        fs::write(dest_dir.join(SHIM_NAME), SHIM_BODY)
            .map_err(|e| ConvertError::ShimFetch(e.to_string()))?;
        Ok(SHIM_NAME.to_string())
    }
}

const MANIFEST: &str = r#"{
  "manifest_version": 3,
  "name": "Pipeline Test",
  "version": "1.0.0",
  "permissions": ["storage", "gcm"],
  "background": {"service_worker": "background.js"},
  "content_scripts": [{"matches": ["<all_urls>"], "js": ["content.js"]}]
}"#;

const SIBLINGS: &[(&str, &[u8])] = &[
    ("background.js", b"chrome.runtime.onInstalled.addListener(() => {});"),
    ("content.js", b"console.log('content');"),
    ("icons/16.png", &[0x89, 0x50, 0x4e, 0x47, 0x0d, 0x0a, 0x1a, 0x0a]),
    ("_locales/en/messages.json", b"{\"appName\": {\"message\": \"Pipeline\"}}"),
];

fn write_extension(root: &Path) {
    fs::create_dir_all(root).unwrap();
    fs::write(root.join("manifest.json"), MANIFEST).unwrap();
    for (name, content) in SIBLINGS {
        let path = root.join(name);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }
}

fn zip_extension(dir: &Path, archive_path: &Path, prefix: &str) {
    let mut zip = ZipWriter::new(File::create(archive_path).unwrap());
    for entry in walkdir::WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.unwrap();
        if !entry.file_type().is_file() {
            continue;
        }
        let rel = entry.path().strip_prefix(dir).unwrap();
        let name = format!("{}{}", prefix, rel.to_string_lossy().replace('\\', "/"));
        zip.start_file(name, FileOptions::default()).unwrap();
        zip.write_all(&fs::read(entry.path()).unwrap()).unwrap();
    }
    zip.finish().unwrap();
}

fn read_entry(archive: &mut ZipArchive<File>, name: &str) -> Vec<u8> {
    let mut buf = Vec::new();
    archive.by_name(name).unwrap().read_to_end(&mut buf).unwrap();
    buf
}

fn is_empty_dir(path: &Path) -> bool {
    fs::read_dir(path).unwrap().next().is_none()
}

struct Fixture {
    _scratch: TempDir,
    work_root: PathBuf,
    out_dir: PathBuf,
}

impl Fixture {
    fn new() -> Self {
        let scratch = TempDir::new().unwrap();
        let work_root = scratch.path().join("work");
        let out_dir = scratch.path().join("out");
        fs::create_dir_all(&work_root).unwrap();
        fs::create_dir_all(&out_dir).unwrap();
        Self {
            _scratch: scratch,
            work_root,
            out_dir,
        }
    }

    fn config(&self) -> ConverterConfig {
        ConverterConfig::default()
            .with_disclaimer_accepted(true)
            .with_work_root(&self.work_root)
    }

    fn engine(&self) -> ConverterEngine {
        ConverterEngine::new(self.config(), NullSink).with_fetcher(LocalShim)
    }
}

fn assert_converted_package(xpi: &Path) {
    let mut archive = ZipArchive::new(File::open(xpi).unwrap()).unwrap();

    for (name, content) in SIBLINGS {
        assert_eq!(read_entry(&mut archive, name), content.to_vec(), "{} changed", name);
    }
    assert_eq!(read_entry(&mut archive, SHIM_NAME), SHIM_BODY.as_bytes());

    let manifest: Value = serde_json::from_slice(&read_entry(&mut archive, "manifest.json")).unwrap();
    assert_eq!(manifest["background"], json!({"scripts": [SHIM_NAME, "background.js"]}));
    assert_eq!(manifest["content_scripts"][0]["js"], json!([SHIM_NAME, "content.js"]));
    assert_eq!(manifest["permissions"], json!(["storage"]));
    assert_eq!(
        manifest["browser_specific_settings"]["gecko"]["id"],
        json!(chrome2moz::gecko_id("Pipeline Test"))
    );
    assert_eq!(archive.len(), SIBLINGS.len() + 2);
}

#[test]
fn test_nested_directory_is_rooted_at_manifest() {
    let fx = Fixture::new();
    let input = TempDir::new().unwrap();
    write_extension(&input.path().join("release").join("my-extension"));

    let dest = fx.out_dir.join("out.xpi");
    let outcome = fx.engine().process(input.path(), |_| Some(dest.clone())).unwrap();

    assert_eq!(outcome, ConversionOutcome::Completed(dest.clone()));
    assert_converted_package(&dest);
    assert!(is_empty_dir(&fx.work_root));
}

#[test]
fn test_input_directory_is_not_modified() {
    let fx = Fixture::new();
    let input = TempDir::new().unwrap();
    write_extension(input.path());

    let dest = fx.out_dir.join("out.xpi");
    fx.engine().process(input.path(), |_| Some(dest.clone())).unwrap();

    assert_eq!(fs::read_to_string(input.path().join("manifest.json")).unwrap(), MANIFEST);
    assert!(!input.path().join(SHIM_NAME).exists());
}

#[test]
fn test_zip_input_with_top_level_folder() {
    let fx = Fixture::new();
    let src = TempDir::new().unwrap();
    write_extension(src.path());
    let archive_path = fx.out_dir.join("pipeline-test.zip");
    zip_extension(src.path(), &archive_path, "pipeline-test/");

    let mut offered = String::new();
    let dest = fx.out_dir.join("from-zip.xpi");
    fx.engine()
        .process(&archive_path, |name| {
            offered = name.to_string();
            Some(dest.clone())
        })
        .unwrap();

    assert_eq!(offered, "pipeline-test_firefox.xpi");
    assert_converted_package(&dest);
    assert!(is_empty_dir(&fx.work_root));
}

#[test]
fn test_crx_input() {
    let fx = Fixture::new();
    let src = TempDir::new().unwrap();
    write_extension(src.path());
    let zip_path = fx.out_dir.join("plain.zip");
    zip_extension(src.path(), &zip_path, "");

    // CRX3: magic, version, header length, header, then the zip payload
    let header = [0u8; 16];
    let mut crx = Vec::new();
    crx.extend_from_slice(b"Cr24");
    crx.extend_from_slice(&3u32.to_le_bytes());
    crx.extend_from_slice(&(header.len() as u32).to_le_bytes());
    crx.extend_from_slice(&header);
    crx.extend_from_slice(&fs::read(&zip_path).unwrap());
    let crx_path = fx.out_dir.join("ext.crx");
    fs::write(&crx_path, crx).unwrap();

    let dest = fx.out_dir.join("from-crx.xpi");
    fx.engine().process(&crx_path, |_| Some(dest.clone())).unwrap();
    assert_converted_package(&dest);
}

#[test]
fn test_shim_fetch_failure_aborts_without_output() {
    let fx = Fixture::new();
    let input = TempDir::new().unwrap();
    write_extension(input.path());

    let unreachable = ShimConfig {
        url: "http://127.0.0.1:9/browser-polyfill.min.js".to_string(),
        timeout: Duration::from_secs(2),
        ..ShimConfig::default()
    };
    let lines = Arc::new(Mutex::new(Vec::<String>::new()));
    let captured = Arc::clone(&lines);
    let engine = ConverterEngine::new(fx.config(), move |line: &str| {
        captured.lock().unwrap().push(line.to_string());
    })
    .with_fetcher(HttpShimFetcher::new(unreachable));

    let mut asked = false;
    let err = engine
        .process(input.path(), |_| {
            asked = true;
            Some(fx.out_dir.join("never.xpi"))
        })
        .unwrap_err();

    assert!(matches!(err, ConvertError::ShimFetch(_)));
    assert!(!asked);
    assert!(is_empty_dir(&fx.out_dir));
    assert!(is_empty_dir(&fx.work_root));
    assert!(lines.lock().unwrap().iter().any(|l| l.starts_with("CRITICAL")));
}

#[test]
fn test_missing_manifest() {
    let fx = Fixture::new();
    let input = TempDir::new().unwrap();
    fs::write(input.path().join("background.js"), "").unwrap();

    let err = fx.engine().process(input.path(), |_| None).unwrap_err();
    assert!(matches!(err, ConvertError::ManifestMissing(_)));
    assert!(is_empty_dir(&fx.work_root));
}

#[test]
fn test_invalid_manifest_json() {
    let fx = Fixture::new();
    let input = TempDir::new().unwrap();
    fs::write(input.path().join("manifest.json"), "{ \"name\": \"broken\", ").unwrap();

    let err = fx.engine().process(input.path(), |_| None).unwrap_err();
    assert!(matches!(err, ConvertError::ManifestParse(_)));
    assert!(is_empty_dir(&fx.work_root));
}

#[test]
fn test_unsupported_input() {
    let fx = Fixture::new();
    let input = fx.out_dir.join("extension.txt");
    fs::write(&input, "not an archive").unwrap();

    let err = fx.engine().process(&input, |_| None).unwrap_err();
    assert!(matches!(err, ConvertError::InputFormat { .. }));
    assert!(is_empty_dir(&fx.work_root));
}

#[test]
fn test_unwritable_destination() {
    let fx = Fixture::new();
    let input = TempDir::new().unwrap();
    write_extension(input.path());

    let dest = fx.out_dir.join("no-such-dir").join("out.xpi");
    let err = fx.engine().process(input.path(), |_| Some(dest.clone())).unwrap_err();
    assert!(matches!(err, ConvertError::Write { .. }));
    assert!(!dest.exists());
    assert!(is_empty_dir(&fx.work_root));
}

#[test]
fn test_cancel_writes_nothing() {
    let fx = Fixture::new();
    let input = TempDir::new().unwrap();
    write_extension(input.path());

    let outcome = fx.engine().process(input.path(), |_| None).unwrap();
    assert_eq!(outcome, ConversionOutcome::Cancelled);
    assert!(is_empty_dir(&fx.out_dir));
    assert!(is_empty_dir(&fx.work_root));
}

#[test]
fn test_convert_without_shim() {
    let fx = Fixture::new();
    let input = TempDir::new().unwrap();
    write_extension(input.path());

    let dest = fx.out_dir.join("offline.xpi");
    let outcome = convert_extension(input.path(), &dest, fx.config().without_shim(), NullSink).unwrap();
    assert_eq!(outcome, ConversionOutcome::Completed(dest.clone()));

    let mut archive = ZipArchive::new(File::open(&dest).unwrap()).unwrap();
    assert!(archive.by_name(SHIM_NAME).is_err());
    let manifest: Value = serde_json::from_slice(&read_entry(&mut archive, "manifest.json")).unwrap();
    assert_eq!(manifest["background"], json!({"scripts": ["background.js"]}));
}
