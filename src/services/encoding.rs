use std::borrow::Cow;
use std::fs;
use std::path::Path;

use chardetng::EncodingDetector;
use encoding_rs::{Encoding, UTF_8};
use serde::Serialize;

use crate::error::ServiceError;

const UTF8_BOM: [u8; 3] = [0xEF, 0xBB, 0xBF];

#[derive(Debug, Serialize)]
pub struct EncodingCandidate {
    pub name: String,
    pub confidence: f32,
}

#[derive(Debug, Serialize)]
pub struct EncodingDetectionResult {
    pub best: String,
    pub confidence: f32,
    pub candidates: Vec<EncodingCandidate>,
}

/// Decode uploaded bytes to text, stripping a UTF-8 BOM and falling
/// back to charset detection for legacy-encoded files.
pub fn decode(bytes: &[u8]) -> String {
    let bytes = bytes.strip_prefix(&UTF8_BOM).unwrap_or(bytes);

    if let Cow::Borrowed(text) = UTF_8.decode_without_bom_handling(bytes).0 {
        return text.to_string();
    }

    let encoding = guess_encoding(bytes);
    let (text, _, _) = encoding.decode(bytes);
    text.into_owned()
}

pub fn detect_from_file(path: &Path) -> Result<EncodingDetectionResult, ServiceError> {
    let bytes = fs::read(path).map_err(|source| ServiceError::ReadFile {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(detect(&bytes))
}

pub fn detect(bytes: &[u8]) -> EncodingDetectionResult {
    if bytes.starts_with(&UTF8_BOM) {
        return EncodingDetectionResult {
            best: "utf-8-sig".into(),
            confidence: 0.99,
            candidates: vec![
                EncodingCandidate {
                    name: "utf-8-sig".into(),
                    confidence: 0.99,
                },
                EncodingCandidate {
                    name: "utf-8".into(),
                    confidence: 0.90,
                },
            ],
        };
    }

    let encoding = guess_encoding(bytes);
    let best = encoding.name().to_lowercase();
    let confidence = estimate_confidence(bytes, encoding);

    let mut candidates = vec![EncodingCandidate {
        name: best.clone(),
        confidence,
    }];

    if best == "utf-8" {
        candidates.push(EncodingCandidate {
            name: "utf-8-sig".into(),
            confidence: (confidence - 0.20).max(0.0),
        });
    }

    EncodingDetectionResult {
        best,
        confidence,
        candidates,
    }
}

fn guess_encoding(bytes: &[u8]) -> &'static Encoding {
    let mut detector = EncodingDetector::new();
    detector.feed(bytes, true);
    detector.guess(None, true)
}

fn estimate_confidence(bytes: &[u8], encoding: &'static Encoding) -> f32 {
    let (text, _, had_errors) = encoding.decode(bytes);

    if had_errors {
        return 0.35;
    }

    match text.len() {
        0..=63 => 0.55,
        64..=511 => 0.70,
        512..=4095 => 0.82,
        _ => 0.90,
    }
}
