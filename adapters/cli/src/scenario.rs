#![allow(clippy::missing_errors_doc)]

use std::{error::Error, fmt, fs, path::Path};

use anyhow::Context as _;
use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine as _};
use range_overlay_core::{Command, ObjectId, Tile};
use serde::{Deserialize, Serialize};

const SCENARIO_DOMAIN: &str = "range";
const SCENARIO_VERSION: &str = "v1";

/// Identifier prefix emitted before the encoded scenario payload.
pub(crate) const SCENARIO_HEADER: &str = "range:v1";
/// Delimiter used to separate the prefix, grid dimensions and payload.
const FIELD_DELIMITER: char = ':';

/// Snapshot of a farm layout and player state driven by the CLI.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub(crate) struct Scenario {
    /// Number of tile columns rendered by the ASCII view.
    pub columns: u32,
    /// Number of tile rows rendered by the ASCII view.
    pub rows: u32,
    /// Display name of the held item, if any.
    pub held_item: Option<String>,
    /// Tile targeted by the cursor, if any.
    pub cursor: Option<Tile>,
    /// Objects placed before the driver starts ticking.
    #[serde(default)]
    pub objects: Vec<ScenarioObject>,
    /// Junimo hut anchor tiles placed before the driver starts ticking.
    #[serde(default)]
    pub huts: Vec<Tile>,
}

/// Object description captured within a scenario.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub(crate) struct ScenarioObject {
    /// Display name carried by the object.
    pub name: String,
    /// Tile the object occupies.
    pub tile: Tile,
    /// Display name of the attached item, if any.
    #[serde(default)]
    pub attachment: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
struct SerializableScenario {
    held_item: Option<String>,
    cursor: Option<Tile>,
    objects: Vec<ScenarioObject>,
    huts: Vec<Tile>,
}

impl Scenario {
    /// Built-in scenario used when the caller provides none: a nozzle held
    /// over a sprinkler line, with a scarecrow and a hut to swap to.
    pub(crate) fn demo() -> Self {
        Self {
            columns: 24,
            rows: 14,
            held_item: Some("Pressure Nozzle".to_owned()),
            cursor: Some(Tile::new(6, 6)),
            objects: vec![
                ScenarioObject {
                    name: "Sprinkler".to_owned(),
                    tile: Tile::new(6, 6),
                    attachment: None,
                },
                ScenarioObject {
                    name: "Quality Sprinkler".to_owned(),
                    tile: Tile::new(12, 6),
                    attachment: Some("Pressure Nozzle".to_owned()),
                },
                ScenarioObject {
                    name: "Iridium Sprinkler".to_owned(),
                    tile: Tile::new(18, 6),
                    attachment: None,
                },
                ScenarioObject {
                    name: "Scarecrow".to_owned(),
                    tile: Tile::new(3, 11),
                    attachment: None,
                },
            ],
            huts: vec![Tile::new(15, 10)],
        }
    }

    /// Loads a scenario from the TOML file located at the provided path.
    pub(crate) fn from_toml_path(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read scenario file at {}", path.display()))?;
        toml::from_str(&contents).context("failed to parse scenario toml contents")
    }

    /// Encodes the scenario into a single-line string suitable for clipboard transfer.
    #[must_use]
    pub(crate) fn encode(&self) -> String {
        let payload = SerializableScenario {
            held_item: self.held_item.clone(),
            cursor: self.cursor,
            objects: self.objects.clone(),
            huts: self.huts.clone(),
        };
        let json = serde_json::to_vec(&payload).expect("scenario serialization never fails");
        let encoded = STANDARD_NO_PAD.encode(json);
        format!("{SCENARIO_HEADER}:{}x{}:{encoded}", self.columns, self.rows)
    }

    /// Decodes a scenario from the provided string representation.
    pub(crate) fn decode(value: &str) -> Result<Self, ScenarioTransferError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ScenarioTransferError::EmptyPayload);
        }

        let mut parts = trimmed.split(FIELD_DELIMITER);
        let domain = parts.next().ok_or(ScenarioTransferError::MissingPrefix)?;
        let version = parts.next().ok_or(ScenarioTransferError::MissingVersion)?;
        let dimensions = parts
            .next()
            .ok_or(ScenarioTransferError::MissingDimensions)?;
        let payload = parts.next().ok_or(ScenarioTransferError::MissingPayload)?;

        if domain != SCENARIO_DOMAIN {
            return Err(ScenarioTransferError::InvalidPrefix(domain.to_owned()));
        }
        if version != SCENARIO_VERSION {
            return Err(ScenarioTransferError::UnsupportedVersion(
                version.to_owned(),
            ));
        }

        let (columns, rows) = parse_dimensions(dimensions)?;
        let bytes = STANDARD_NO_PAD
            .decode(payload.as_bytes())
            .map_err(ScenarioTransferError::InvalidEncoding)?;
        let decoded: SerializableScenario =
            serde_json::from_slice(&bytes).map_err(ScenarioTransferError::InvalidPayload)?;

        Ok(Self {
            columns,
            rows,
            held_item: decoded.held_item,
            cursor: decoded.cursor,
            objects: decoded.objects,
            huts: decoded.huts,
        })
    }

    /// Commands that reproduce the scenario inside a fresh farm registry.
    #[must_use]
    pub(crate) fn commands(&self) -> Vec<Command> {
        let mut commands = Vec::new();

        for anchor in &self.huts {
            commands.push(Command::PlaceHut { anchor: *anchor });
        }
        // Object identifiers are allocated sequentially from zero in a fresh
        // registry, so the placement index doubles as the identifier.
        for (index, object) in self.objects.iter().enumerate() {
            commands.push(Command::PlaceObject {
                name: object.name.clone(),
                tile: object.tile,
            });
            if object.attachment.is_some() {
                commands.push(Command::SetAttachment {
                    object: ObjectId::new(index as u32),
                    display_name: object.attachment.clone(),
                });
            }
        }
        if let Some(name) = &self.held_item {
            commands.push(Command::SetHeldItem {
                name: Some(name.clone()),
            });
        }
        if let Some(tile) = self.cursor {
            commands.push(Command::SetCursorTile { tile });
        }

        commands
    }
}

/// Errors that can occur while decoding scenario transfer strings.
#[derive(Debug)]
pub(crate) enum ScenarioTransferError {
    /// The provided string was empty or contained only whitespace.
    EmptyPayload,
    /// The prefix segment was missing from the encoded scenario.
    MissingPrefix,
    /// The encoded scenario did not contain a version segment.
    MissingVersion,
    /// The encoded scenario did not include grid dimensions.
    MissingDimensions,
    /// The encoded scenario did not include the payload segment.
    MissingPayload,
    /// The encoded scenario used an unexpected prefix segment.
    InvalidPrefix(String),
    /// The encoded scenario used an unsupported version identifier.
    UnsupportedVersion(String),
    /// The grid dimensions could not be parsed from the encoded scenario.
    InvalidDimensions(String),
    /// The base64 payload could not be decoded.
    InvalidEncoding(base64::DecodeError),
    /// The decoded payload could not be deserialised.
    InvalidPayload(serde_json::Error),
}

impl fmt::Display for ScenarioTransferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyPayload => write!(f, "scenario payload was empty"),
            Self::MissingPrefix => write!(f, "scenario string is missing the prefix"),
            Self::MissingVersion => write!(f, "scenario string is missing the version"),
            Self::MissingDimensions => write!(f, "scenario string is missing the grid dimensions"),
            Self::MissingPayload => write!(f, "scenario string is missing the payload"),
            Self::InvalidPrefix(prefix) => {
                write!(f, "scenario prefix '{prefix}' is not supported")
            }
            Self::UnsupportedVersion(version) => {
                write!(f, "scenario version '{version}' is not supported")
            }
            Self::InvalidDimensions(dimensions) => {
                write!(f, "could not parse grid dimensions '{dimensions}'")
            }
            Self::InvalidEncoding(error) => {
                write!(f, "could not decode scenario payload: {error}")
            }
            Self::InvalidPayload(error) => {
                write!(f, "could not parse scenario payload: {error}")
            }
        }
    }
}

impl Error for ScenarioTransferError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidEncoding(error) => Some(error),
            Self::InvalidPayload(error) => Some(error),
            _ => None,
        }
    }
}

fn parse_dimensions(dimensions: &str) -> Result<(u32, u32), ScenarioTransferError> {
    let (columns, rows) = dimensions
        .split_once(['x', 'X'])
        .ok_or_else(|| ScenarioTransferError::InvalidDimensions(dimensions.to_owned()))?;

    let columns = columns
        .trim()
        .parse::<u32>()
        .map_err(|_| ScenarioTransferError::InvalidDimensions(dimensions.to_owned()))?;
    let rows = rows
        .trim()
        .parse::<u32>()
        .map_err(|_| ScenarioTransferError::InvalidDimensions(dimensions.to_owned()))?;

    if columns == 0 || rows == 0 {
        return Err(ScenarioTransferError::InvalidDimensions(
            dimensions.to_owned(),
        ));
    }

    Ok((columns, rows))
}
