use std::{fmt, str::FromStr};

use anyhow::{anyhow, bail, Result};
use keepsake_core::{SaveInfo, SerializationFormat};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

/// A record the sample application knows how to persist and edit.
pub trait SampleRecord: Serialize + DeserializeOwned + Default + fmt::Debug + 'static {
    const NAME: &'static str;
    const DEFAULT_FILE: &'static str;
    const DEFAULT_FORMAT: SerializationFormat;
    /// Whether the configured secret applies to this record.
    const ENCRYPTED: bool;

    fn save_info(&self) -> &SaveInfo;
    fn save_info_mut(&mut self) -> &mut SaveInfo;
    /// Set one field from its textual form.
    fn assign(&mut self, field: &str, value: &str) -> Result<()>;
    /// Editable fields with their current values, in display order.
    fn fields(&self) -> Vec<(&'static str, String)>;
}

/// Scores carried between play sessions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngameData {
    pub highscore: i32,
    pub last_score: i32,
    pub info: SaveInfo,
}

impl Default for IngameData {
    fn default() -> Self {
        Self {
            highscore: 100,
            last_score: 20,
            info: SaveInfo::default(),
        }
    }
}

impl SampleRecord for IngameData {
    const NAME: &'static str = "ingame";
    const DEFAULT_FILE: &'static str = "data";
    const DEFAULT_FORMAT: SerializationFormat = SerializationFormat::Binary;
    const ENCRYPTED: bool = true;

    fn save_info(&self) -> &SaveInfo {
        &self.info
    }

    fn save_info_mut(&mut self) -> &mut SaveInfo {
        &mut self.info
    }

    fn assign(&mut self, field: &str, value: &str) -> Result<()> {
        match field {
            "highscore" => self.highscore = parse_field(field, value)?,
            "last_score" => {
                self.last_score = parse_field(field, value)?;
                self.highscore = self.highscore.max(self.last_score);
            }
            other => bail!("unknown ingame field: {other}"),
        }
        Ok(())
    }

    fn fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("highscore", self.highscore.to_string()),
            ("last_score", self.last_score.to_string()),
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Language {
    #[default]
    English,
    German,
    French,
    Spanish,
    Japanese,
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

impl FromStr for Language {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "english" | "en" => Ok(Language::English),
            "german" | "de" => Ok(Language::German),
            "french" | "fr" => Ok(Language::French),
            "spanish" | "es" => Ok(Language::Spanish),
            "japanese" | "ja" => Ok(Language::Japanese),
            _ => Err(anyhow!("unknown language: {s}")),
        }
    }
}

/// Audio and language preferences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSettingsData {
    pub music_volume: u8,
    pub sound_volume: u8,
    pub language: Language,
    pub info: SaveInfo,
}

impl Default for UserSettingsData {
    fn default() -> Self {
        Self {
            music_volume: 90,
            sound_volume: 100,
            language: Language::English,
            info: SaveInfo::default(),
        }
    }
}

impl SampleRecord for UserSettingsData {
    const NAME: &'static str = "settings";
    const DEFAULT_FILE: &'static str = "settings";
    const DEFAULT_FORMAT: SerializationFormat = SerializationFormat::Xml;
    const ENCRYPTED: bool = false;

    fn save_info(&self) -> &SaveInfo {
        &self.info
    }

    fn save_info_mut(&mut self) -> &mut SaveInfo {
        &mut self.info
    }

    fn assign(&mut self, field: &str, value: &str) -> Result<()> {
        match field {
            "music_volume" => self.music_volume = parse_volume(field, value)?,
            "sound_volume" => self.sound_volume = parse_volume(field, value)?,
            "language" => self.language = value.parse()?,
            other => bail!("unknown settings field: {other}"),
        }
        Ok(())
    }

    fn fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("music_volume", self.music_volume.to_string()),
            ("sound_volume", self.sound_volume.to_string()),
            ("language", self.language.to_string()),
        ]
    }
}

fn parse_field<V: FromStr>(field: &str, value: &str) -> Result<V>
where
    V::Err: fmt::Display,
{
    value
        .parse()
        .map_err(|e| anyhow!("invalid value for {field}: {value:?} ({e})"))
}

fn parse_volume(field: &str, value: &str) -> Result<u8> {
    let volume: u8 = parse_field(field, value)?;
    if volume > 100 {
        bail!("{field} must be between 0 and 100, got {volume}");
    }
    Ok(volume)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_fresh_install() {
        let ingame = IngameData::default();
        assert_eq!((ingame.highscore, ingame.last_score), (100, 20));

        let settings = UserSettingsData::default();
        assert_eq!(settings.music_volume, 90);
        assert_eq!(settings.sound_volume, 100);
        assert_eq!(settings.language, Language::English);
    }

    #[test]
    fn last_score_can_raise_highscore() {
        let mut data = IngameData::default();
        data.assign("last_score", "250").expect("assign");
        assert_eq!(data.highscore, 250);

        data.assign("last_score", "5").expect("assign");
        assert_eq!((data.highscore, data.last_score), (250, 5));
    }

    #[test]
    fn rejects_unknown_fields_and_bad_values() {
        let mut settings = UserSettingsData::default();
        assert!(settings.assign("brightness", "3").is_err());
        assert!(settings.assign("music_volume", "101").is_err());
        assert!(settings.assign("music_volume", "loud").is_err());
        assert!(settings.assign("language", "klingon").is_err());

        settings.assign("language", "DE").expect("assign");
        assert_eq!(settings.language, Language::German);
        assert_eq!(settings.fields()[2], ("language", "German".to_string()));
    }
}
