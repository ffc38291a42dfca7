use flate2::{Compression, write::GzEncoder};
use modhost_package::{Error, ModuleArchive};

fn tarball(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut builder = tar::Builder::new(GzEncoder::new(Vec::new(), Compression::default()));
    for (name, data) in entries {
        let mut header = tar::Header::new_gnu();
        header.set_size(data.len() as u64);
        header.set_mode(0o644);
        builder.append_data(&mut header, name, *data).unwrap();
    }
    builder.into_inner().unwrap().finish().unwrap()
}

#[test]
fn test_archive_without_manifest_is_no_manifest() {
    let bytes = tarball(&[("bin/core.so", b"artifact")]);
    let err = ModuleArchive::from_bytes("core.mpk", &bytes).unwrap_err();
    assert!(matches!(err, Error::NoManifest { .. }), "{err:?}");
}

#[test]
fn test_corrupt_archive_is_io_error() {
    let err = ModuleArchive::from_bytes("broken.mpk", b"definitely not gzip").unwrap_err();
    assert!(matches!(err, Error::Io { .. }), "{err:?}");
}

#[test]
fn test_archive_with_manifest_only() {
    let bytes = tarball(&[(
        "META-INF/MANIFEST.MF",
        b"symbolicName: org.example.min\nversion: 0.1",
    )]);
    let archive = ModuleArchive::from_bytes("min.mpk", &bytes).unwrap();
    assert_eq!(archive.artifact(), None);
    assert_eq!(archive.extensions(), None);
    assert!(archive.resources().is_empty());
    assert_eq!(archive.descriptor().unwrap().version.to_string(), "0.1.0");
}

#[test]
fn test_archive_with_bad_manifest_reports_manifest_error() {
    let bytes = tarball(&[("META-INF/MANIFEST.MF", b"version 1.0.0")]);
    let archive = ModuleArchive::from_bytes("bad.mpk", &bytes).unwrap();
    assert!(matches!(
        archive.descriptor(),
        Err(Error::Manifest {
            source: modhost_manifest::Error::Parse { .. },
            ..
        })
    ));
}
