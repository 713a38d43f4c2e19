use std::fmt;

use uuid::Uuid;

const STAGED_AUDIO_PREFIX: &str = "temp_";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoragePath(String);

impl StoragePath {
    /// Staging location for an uploaded recording: `temp_<uuid>_<upload name>`.
    /// Each call yields a fresh location, so concurrent uploads of the same
    /// name never share an object. Directory components are dropped.
    pub fn for_staged_audio(filename: &str) -> Self {
        let base = filename
            .rsplit(['/', '\\'])
            .next()
            .filter(|name| !name.is_empty() && *name != "." && *name != "..")
            .unwrap_or("upload");
        Self(format!("{STAGED_AUDIO_PREFIX}{}_{base}", Uuid::new_v4()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StoragePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
