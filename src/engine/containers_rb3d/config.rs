use std::fmt::{Debug, Display, Formatter};
use std::io::{Read, Write};
use serde::{Deserialize, Serialize};
use crate::{FieldNames, DEFAULT_MAX_ENTRIES};

// Tree construction settings, usually read from TOML:
//   max_entries = 9
//   format = ["minX", "minY", "minZ", "maxX", "maxY", "maxZ"]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TreeConfig
{
    // floored to 8 when building a tree
    pub max_entries: usize,
    // attribute names for trees over named-field items
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<FieldNames>,
}
impl Default for TreeConfig
{
    fn default() -> Self
    {
        Self
        {
            max_entries: DEFAULT_MAX_ENTRIES,
            format: None,
        }
    }
}
impl TreeConfig
{
    pub fn from_toml_str(toml: &str) -> Result<Self, ConfigError>
    {
        let config: Self = toml::from_str(toml).map_err(ConfigError::Toml)?;
        match config.max_entries
        {
            0 => Err(ConfigError::InvalidMaxEntries(0)),
            _ => Ok(config),
        }
    }

    pub fn load(reader: &mut impl Read) -> Result<Self, ConfigError>
    {
        let mut buf = String::new();
        reader.read_to_string(&mut buf).map_err(ConfigError::Io)?;
        Self::from_toml_str(&buf)
    }

    pub fn save(&self, prettify: bool, writer: &mut impl Write) -> Result<(), ConfigError>
    {
        let toml = match prettify
        {
            true => toml::ser::to_string_pretty(self),
            false => toml::ser::to_string(self),
        }.map_err(ConfigError::Serialize)?;
        writer.write_all(toml.as_bytes()).map_err(ConfigError::Io)
    }
}

pub enum ConfigError
{
    Io(std::io::Error),
    Toml(toml::de::Error),
    Serialize(toml::ser::Error),
    InvalidMaxEntries(usize),
}
impl Debug for ConfigError
{
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result
    {
        match self
        {
            Self::Io(err) => write!(f, "IO error: {err}"),
            Self::Toml(err) => write!(f, "Failed to parse tree config: {err}"),
            Self::Serialize(err) => write!(f, "Failed to serialize tree config: {err}"),
            Self::InvalidMaxEntries(n) => write!(f, "Invalid max_entries {n}, must be at least 1"),
        }
    }
}
impl Display for ConfigError
{
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result { Debug::fmt(self, f) }
}
impl std::error::Error for ConfigError { }
