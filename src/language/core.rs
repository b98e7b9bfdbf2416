use include_dir::{include_dir, Dir};
use serde::Deserialize;
use serde_json::from_str;
use thiserror::Error;

static LANG_DIR: Dir = include_dir!("$CARGO_MANIFEST_DIR/src/lang");

#[derive(Debug, Error)]
pub enum LanguageError {
    #[error("language file not found: {0}")]
    NotFound(String),
    #[error("language file is not valid utf-8: {0}")]
    NotUtf8(String),
    #[error("unable to deserialize language json: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Deserialize, Clone, Debug)]
pub struct Language {
    pub name: String,
    pub size: u32,
    pub words: Vec<String>,
}

impl Language {
    /// Loads one of the embedded word lists by file stem, e.g. `english`.
    pub fn load(file_name: &str) -> Result<Self, LanguageError> {
        read_language_from_file(&format!("{file_name}.json"))
    }
}

fn read_language_from_file(file_name: &str) -> Result<Language, LanguageError> {
    let file = LANG_DIR
        .get_file(file_name)
        .ok_or_else(|| LanguageError::NotFound(file_name.to_string()))?;

    let file_as_str = file
        .contents_utf8()
        .ok_or_else(|| LanguageError::NotUtf8(file_name.to_string()))?;

    Ok(from_str(file_as_str)?)
}
