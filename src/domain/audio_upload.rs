use std::path::Path;

use bytes::Bytes;

/// Recording formats accepted for a customer call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioFormat {
    Mp3,
    Wav,
    M4a,
    Aac,
}

impl AudioFormat {
    pub fn from_filename(filename: &str) -> Option<Self> {
        let extension = Path::new(filename).extension()?.to_str()?;
        match extension.to_ascii_lowercase().as_str() {
            "mp3" => Some(Self::Mp3),
            "wav" => Some(Self::Wav),
            "m4a" => Some(Self::M4a),
            "aac" => Some(Self::Aac),
            _ => None,
        }
    }

    pub fn as_mime(&self) -> &'static str {
        match self {
            Self::Mp3 => "audio/mpeg",
            Self::Wav => "audio/wav",
            Self::M4a => "audio/mp4",
            Self::Aac => "audio/aac",
        }
    }
}

#[derive(Debug, Clone)]
pub struct AudioUpload {
    pub filename: String,
    pub format: AudioFormat,
    pub data: Bytes,
}

impl AudioUpload {
    pub fn new(filename: String, format: AudioFormat, data: Bytes) -> Self {
        Self {
            filename,
            format,
            data,
        }
    }
}
