use super::*;
use tempfile::tempdir;

const SPEC_YAML: &str = r#"--- !ruby/object:Gem::Specification
name: rake
version: !ruby/object:Gem::Version
  version: 0.8.7
date: 2009-05-24 00:00:00.000000000 Z
platform: ruby
dependencies: []
"#;

#[test]
fn test_read_input_from_file() {
    let temp = tempdir().unwrap();
    let path = temp.path().join("input.txt");
    fs::write(&path, "hello").unwrap();
    assert_eq!(read_input(Some(path.as_path())).unwrap(), b"hello");
    assert_eq!(read_input_text(Some(path.as_path())).unwrap(), "hello");
}

#[test]
fn test_read_input_missing_file_is_io_error() {
    let err = read_input(Some(Path::new("/no/such/file"))).unwrap_err();
    assert!(matches!(err, GemdexError::Io { .. }));
}

#[test]
fn test_spec_import_populates_store() {
    let temp = tempdir().unwrap();
    let spec_path = temp.path().join("rake.gemspec");
    fs::write(&spec_path, SPEC_YAML).unwrap();
    let db = temp.path().join("db");

    spec::execute(true, Some(db.as_path()), &[spec_path]).unwrap();

    let dir = db.join("rake").join("0.8.7");
    assert_eq!(fs::read_to_string(dir.join("name")).unwrap(), "rake\n");
    assert_eq!(fs::read_to_string(dir.join("date")).unwrap(), "2009-05-24\n");
    assert_eq!(fs::read_to_string(dir.join("dependencies")).unwrap(), "");
}

#[test]
fn test_spec_import_without_db_fails() {
    let temp = tempdir().unwrap();
    let spec_path = temp.path().join("rake.gemspec");
    fs::write(&spec_path, SPEC_YAML).unwrap();

    let err = spec::execute(true, None, &[spec_path]).unwrap_err();
    assert!(matches!(err, GemdexError::StoreDirectoryUnavailable { .. }));
}

#[test]
fn test_spec_malformed_yaml_is_fatal() {
    let temp = tempdir().unwrap();
    let spec_path = temp.path().join("broken.gemspec");
    fs::write(&spec_path, "{ not yaml").unwrap();

    let err = spec::execute(false, None, &[spec_path.clone()]).unwrap_err();
    assert!(matches!(err, GemdexError::MalformedSpec { .. }));

    // Import mode halts before touching the store.
    let db = temp.path().join("db");
    let err = spec::execute(true, Some(db.as_path()), &[spec_path]).unwrap_err();
    assert!(matches!(err, GemdexError::MalformedSpec { .. }));
    assert!(!db.join("broken").exists());
}

#[test]
fn test_index_rejects_garbage_stream() {
    let temp = tempdir().unwrap();
    let path = temp.path().join("specs.4.8");
    fs::write(&path, b"definitely not marshal").unwrap();

    let err = index::execute(Some(path.as_path())).unwrap_err();
    assert!(matches!(err, GemdexError::IndexDecode { .. }));
}

#[test]
fn test_gemfile_nested_group_is_fatal() {
    let temp = tempdir().unwrap();
    let path = temp.path().join("Gemfile");
    fs::write(&path, "group :a do\ngroup :b do\nend\nend\n").unwrap();

    let err = gemfile::execute(Some(path.as_path())).unwrap_err();
    assert!(matches!(err, GemdexError::NestedGroupingUnsupported { .. }));
}
