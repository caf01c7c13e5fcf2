//! Declared container formats.

use std::fmt;

/// Container format an encoded buffer is declared (or guessed) to use.
///
/// The format is only a hint for the demuxer; the bytes are always probed
/// and validity is established by a successful decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContainerFormat {
    Mp3,
    Wav,
    M4a,
    Flac,
    Ogg,
    Aac,
    Wma,
}

/// File extensions accepted by batch callers, lowercase and without the dot.
pub const SUPPORTED_EXTENSIONS: &[&str] = &["wav", "mp3", "m4a", "flac", "ogg", "aac", "wma"];

impl ContainerFormat {
    /// All known formats.
    pub const ALL: [ContainerFormat; 7] = [
        ContainerFormat::Mp3,
        ContainerFormat::Wav,
        ContainerFormat::M4a,
        ContainerFormat::Flac,
        ContainerFormat::Ogg,
        ContainerFormat::Aac,
        ContainerFormat::Wma,
    ];

    /// Maps a file extension (case-insensitive, with or without a leading dot)
    /// to a format.
    pub fn from_extension(ext: &str) -> Option<Self> {
        let ext = ext.trim_start_matches('.').to_ascii_lowercase();
        match ext.as_str() {
            "mp3" => Some(Self::Mp3),
            "wav" | "wave" => Some(Self::Wav),
            "m4a" | "mp4" => Some(Self::M4a),
            "flac" => Some(Self::Flac),
            "ogg" | "oga" => Some(Self::Ogg),
            "aac" | "adts" => Some(Self::Aac),
            "wma" | "asf" => Some(Self::Wma),
            _ => None,
        }
    }

    /// Canonical extension for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Mp3 => "mp3",
            Self::Wav => "wav",
            Self::M4a => "m4a",
            Self::Flac => "flac",
            Self::Ogg => "ogg",
            Self::Aac => "aac",
            Self::Wma => "wma",
        }
    }

    /// Returns false for formats the demuxer has no decoder for.
    pub fn is_decodable(&self) -> bool {
        !matches!(self, Self::Wma)
    }
}

impl fmt::Display for ContainerFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_extension_is_case_insensitive() {
        assert_eq!(ContainerFormat::from_extension("MP3"), Some(ContainerFormat::Mp3));
        assert_eq!(ContainerFormat::from_extension(".wav"), Some(ContainerFormat::Wav));
        assert_eq!(ContainerFormat::from_extension("M4A"), Some(ContainerFormat::M4a));
        assert_eq!(ContainerFormat::from_extension("txt"), None);
    }

    #[test]
    fn supported_extensions_round_trip() {
        for ext in SUPPORTED_EXTENSIONS {
            let fmt = ContainerFormat::from_extension(ext).unwrap();
            assert_eq!(fmt.extension(), *ext);
        }
        assert_eq!(SUPPORTED_EXTENSIONS.len(), ContainerFormat::ALL.len());
    }

    #[test]
    fn wma_is_not_decodable() {
        assert!(!ContainerFormat::Wma.is_decodable());
        assert!(ContainerFormat::Flac.is_decodable());
        assert_eq!(ContainerFormat::Ogg.to_string(), "ogg");
    }
}
