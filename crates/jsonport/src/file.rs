// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! File codec: byte I/O and transparent gzip compression on top of the
//! conversion engine.
//!
//! Only codec-level failures (bad JSON, type mismatch) surface as engine
//! errors; byte-level I/O failures keep their native `io::ErrorKind`.

use std::fs;
use std::io::{self, Read, Write};
use std::path::Path;

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use tempfile::NamedTempFile;

use crate::error::{DeserializationError, FileError};
use crate::port::JsonPort;
use crate::schema::TypeExpr;
use crate::value::Value;

/// File suffixes treated as gzip-compressed.
const COMPRESSED_SUFFIXES: &[&str] = &["gz", "gzip"];

fn is_compressed(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| COMPRESSED_SUFFIXES.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

impl JsonPort {
    /// Serialize `value` and write it to `path`.
    ///
    /// The JSON text is gzip-compressed when the file name carries a
    /// compressed suffix (`.gz` / `.gzip`). The write goes through a
    /// temporary file in the target directory and is renamed into place, so
    /// a crash never leaves a half-written file. With `overwrite` false an
    /// existing file is left untouched and the platform's `AlreadyExists`
    /// error kind is returned.
    pub fn dump_file(
        &self,
        value: &Value,
        path: impl AsRef<Path>,
        overwrite: bool,
    ) -> Result<(), FileError> {
        let path = path.as_ref();
        let json = self.dump(value)?;
        let text = serde_json::to_vec(&json).map_err(io::Error::other)?;

        let bytes = if is_compressed(path) {
            let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
            encoder.write_all(&text)?;
            encoder.finish()?
        } else {
            text
        };

        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(&bytes)?;
        if overwrite {
            tmp.persist(path).map_err(|e| FileError::Io(e.error))?;
        } else {
            tmp.persist_noclobber(path).map_err(|e| FileError::Io(e.error))?;
        }
        log::debug!("wrote {} bytes to {}", bytes.len(), path.display());
        Ok(())
    }

    /// Read `path`, transparently decompressing on the compressed suffix,
    /// parse the JSON text and reconstruct a value of the declared type.
    pub fn load_file(
        &self,
        path: impl AsRef<Path>,
        expr: &TypeExpr,
    ) -> Result<Value, FileError> {
        let path = path.as_ref();
        let raw = fs::read(path)?;

        let text = if is_compressed(path) {
            let mut decoder = GzDecoder::new(raw.as_slice());
            let mut out = String::new();
            decoder.read_to_string(&mut out)?;
            out
        } else {
            String::from_utf8(raw)
                .map_err(|e| bad_json(e.to_string()))?
        };

        let json: serde_json::Value =
            serde_json::from_str(&text).map_err(|e| bad_json(e.to_string()))?;
        log::debug!("read {} from {}", expr, path.display());
        Ok(self.load(&json, expr)?)
    }
}

fn bad_json(message: String) -> FileError {
    FileError::from(DeserializationError::InvalidJson(message))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::RecordBuilder;
    use serde_json::json;

    fn port_with_user() -> JsonPort {
        let mut port = JsonPort::new();
        port.register_record(
            RecordBuilder::new("User")
                .field("name", TypeExpr::Str)
                .field("age", TypeExpr::Int)
                .build(),
        )
        .unwrap();
        port
    }

    fn john() -> Value {
        Value::record(
            "User",
            [("name", Value::from("John")), ("age", Value::from(30i64))],
        )
    }

    #[test]
    fn plain_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("user.json");
        let port = port_with_user();

        port.dump_file(&john(), &path, true).unwrap();
        let text = fs::read_to_string(&path).unwrap();
        assert_eq!(text, r#"{"name":"John","age":30}"#);

        let back = port.load_file(&path, &TypeExpr::named("User")).unwrap();
        assert_eq!(back, john());
    }

    #[test]
    fn gzip_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("user.json.gz");
        let port = port_with_user();

        port.dump_file(&john(), &path, true).unwrap();

        // The bytes on disk must actually be gzip, not plain JSON.
        let raw = fs::read(&path).unwrap();
        assert_eq!(&raw[..2], &[0x1f, 0x8b]);

        let back = port.load_file(&path, &TypeExpr::named("User")).unwrap();
        assert_eq!(back, john());
    }

    #[test]
    fn overwrite_false_refuses_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("user.json");
        let port = port_with_user();

        port.dump_file(&john(), &path, true).unwrap();
        let err = port.dump_file(&john(), &path, false).unwrap_err();
        match err {
            FileError::Io(inner) => assert_eq!(inner.kind(), io::ErrorKind::AlreadyExists),
            FileError::Port(_) => panic!("expected an I/O error"),
        }
        // The original content stays intact.
        assert!(port.load_file(&path, &TypeExpr::named("User")).is_ok());
    }

    #[test]
    fn missing_file_keeps_native_error_kind() {
        let port = port_with_user();
        let err = port
            .load_file("/nonexistent/user.json", &TypeExpr::named("User"))
            .unwrap_err();
        match err {
            FileError::Io(inner) => assert_eq!(inner.kind(), io::ErrorKind::NotFound),
            FileError::Port(_) => panic!("expected an I/O error"),
        }
    }

    #[test]
    fn bad_json_is_a_codec_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("user.json");
        fs::write(&path, "{not json").unwrap();

        let port = port_with_user();
        let err = port.load_file(&path, &TypeExpr::named("User")).unwrap_err();
        assert!(matches!(
            err,
            FileError::Port(crate::error::PortError::Deserialization(
                DeserializationError::InvalidJson(_)
            ))
        ));
    }

    #[test]
    fn type_mismatch_in_file_is_a_codec_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("user.json");
        fs::write(&path, json!({"name": "John"}).to_string()).unwrap();

        let port = port_with_user();
        let err = port.load_file(&path, &TypeExpr::named("User")).unwrap_err();
        assert!(matches!(
            err,
            FileError::Port(crate::error::PortError::Deserialization(
                DeserializationError::MissingField { .. }
            ))
        ));
    }
}
