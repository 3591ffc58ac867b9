// src/transform/sourcemap.rs

use anyhow::Result;
use serde::Serialize;

/// Version-3 source map naming the original file and embedding its content.
///
/// The wrapped libraries do not report positions, so `mappings` stays empty;
/// browsers still show the original source next to the generated file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceMap {
    pub version: u8,
    pub file: String,
    pub sources: Vec<String>,
    pub sources_content: Vec<String>,
    pub names: Vec<String>,
    pub mappings: String,
    pub source_root: String,
}

impl SourceMap {
    pub fn for_source(source_name: &str, content: String) -> Self {
        Self {
            version: 3,
            file: String::new(),
            sources: vec![source_name.to_string()],
            sources_content: vec![content],
            names: Vec::new(),
            mappings: String::new(),
            source_root: "/source/".to_string(),
        }
    }

    /// Serialize for the generated file named `file`.
    pub fn to_json(&self, file: &str) -> Result<Vec<u8>> {
        let mut map = self.clone();
        map.file = file.to_string();
        Ok(serde_json::to_vec(&map)?)
    }
}

/// Trailer pointing a generated file at its map, by output extension.
pub fn reference_comment(ext: &str, map_file_name: &str) -> Option<String> {
    match ext {
        "css" => Some(format!("\n/*# sourceMappingURL={map_file_name} */\n")),
        "js" => Some(format!("\n//# sourceMappingURL={map_file_name}\n")),
        _ => None,
    }
}
