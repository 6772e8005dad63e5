#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Range Overlay engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative farm registry, and pure systems. Adapters submit [`Command`]
//! values describing desired mutations, the registry executes those commands
//! via its `apply` entry point, and then broadcasts [`Event`] values.
//! Systems consume immutable snapshot views plus a per-pass [`RenderContext`]
//! and respond exclusively by filling caller-owned output buffers.

use serde::{Deserialize, Serialize};

/// Absolute world-grid tile coordinate.
///
/// Coordinates are signed: coverage around an object placed near the map
/// origin legitimately extends into negative tile indices, and the overlay
/// keeps those tiles so the renderer can clip them itself.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Tile {
    x: i32,
    y: i32,
}

impl Tile {
    /// Creates a new tile coordinate.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Horizontal tile index.
    #[must_use]
    pub const fn x(&self) -> i32 {
        self.x
    }

    /// Vertical tile index.
    #[must_use]
    pub const fn y(&self) -> i32 {
        self.y
    }

    /// Returns the tile displaced by the provided offsets.
    #[must_use]
    pub const fn offset_by(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

/// Unique identifier assigned to a placed object.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectId(u32);

impl ObjectId {
    /// Creates a new object identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a placed building.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BuildingId(u32);

impl BuildingId {
    /// Creates a new building identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Kinds of placed things whose effect range can be highlighted.
///
/// The kind fully determines the coverage mask shape; sprinkler tiers
/// additionally react to an attached range booster.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObjectKind {
    /// Junimo hut building whose workers harvest the surrounding plot.
    JunimoHut,
    /// Bee house collecting from flowers in a diamond-shaped area.
    BeeHouse,
    /// Standard scarecrow warding crows away from nearby crops.
    Scarecrow,
    /// Upgraded scarecrow with roughly double the warding radius.
    DeluxeScarecrow,
    /// Base sprinkler watering the four adjacent tiles.
    Sprinkler,
    /// Quality sprinkler watering the surrounding 3×3 square.
    QualitySprinkler,
    /// Iridium sprinkler watering the surrounding 5×5 square.
    IridiumSprinkler,
    /// Prismatic sprinkler watering the surrounding 7×7 square.
    PrismaticSprinkler,
}

impl ObjectKind {
    /// Returns `true` for the sprinkler family of kinds.
    #[must_use]
    pub const fn is_sprinkler(self) -> bool {
        matches!(
            self,
            Self::Sprinkler
                | Self::QualitySprinkler
                | Self::IridiumSprinkler
                | Self::PrismaticSprinkler
        )
    }

    /// Returns `true` for the scarecrow family of kinds.
    #[must_use]
    pub const fn is_scarecrow(self) -> bool {
        matches!(self, Self::Scarecrow | Self::DeluxeScarecrow)
    }
}

/// Inputs that select a coverage mask.
///
/// Masks depend only on these two fields, never on position, so generated
/// masks are freely cacheable and shareable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MaskParameters {
    /// Kind of object whose coverage is requested.
    pub kind: ObjectKind,
    /// Whether a range booster attachment is present. Only the upgradeable
    /// sprinkler tiers react to this flag; every other kind ignores it.
    pub has_range_booster: bool,
}

impl MaskParameters {
    /// Creates a new mask parameter set.
    #[must_use]
    pub const fn new(kind: ObjectKind, has_range_booster: bool) -> Self {
        Self {
            kind,
            has_range_booster,
        }
    }
}

/// Classifies a display name into an [`ObjectKind`].
///
/// Matching is case-insensitive substring search with fixed precedence:
/// "arecrow" (excluding names that also mention "sprinkler") selects the
/// scarecrow family, with "eluxe" upgrading to the deluxe tier; otherwise
/// "sprinkler" selects the sprinkler family with tier precedence iridium >
/// quality > prismatic > plain; otherwise "bee house" selects the bee house.
/// [`ObjectKind::JunimoHut`] is a building and is never produced by name
/// classification. Unrecognized names yield `None`.
#[must_use]
pub fn classify(name: &str) -> Option<ObjectKind> {
    let name = name.to_lowercase();

    if name.contains("arecrow") && !name.contains("sprinkler") {
        if name.contains("eluxe") {
            Some(ObjectKind::DeluxeScarecrow)
        } else {
            Some(ObjectKind::Scarecrow)
        }
    } else if name.contains("sprinkler") {
        if name.contains("iridium") {
            Some(ObjectKind::IridiumSprinkler)
        } else if name.contains("quality") {
            Some(ObjectKind::QualitySprinkler)
        } else if name.contains("prismatic") {
            Some(ObjectKind::PrismaticSprinkler)
        } else {
            Some(ObjectKind::Sprinkler)
        }
    } else if name.contains("bee house") {
        Some(ObjectKind::BeeHouse)
    } else {
        None
    }
}

/// Reports whether a held item is a range booster attachment.
///
/// Matches "nozzle" as a case-insensitive substring of the item name.
#[must_use]
pub fn is_range_booster_item(name: &str) -> bool {
    name.to_lowercase().contains("nozzle")
}

/// Reports whether an attached item's display name marks a boosted sprinkler.
///
/// The display-name check is case-sensitive: attachments advertise the
/// literal token "Nozzle".
#[must_use]
pub fn attachment_boosts_range(display_name: &str) -> bool {
    display_name.contains("Nozzle")
}

/// Commands that express all permissible registry mutations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Requests placement of an object with the provided display name.
    PlaceObject {
        /// Display name carried by the object; kind is derived by
        /// [`classify`] at coverage time, never stored.
        name: String,
        /// Tile the object should occupy.
        tile: Tile,
    },
    /// Requests removal of an existing placed object.
    RemoveObject {
        /// Identifier of the object targeted for removal.
        object: ObjectId,
    },
    /// Requests placement of a Junimo hut anchored at its upper-left tile.
    PlaceHut {
        /// Upper-left tile of the hut's footprint.
        anchor: Tile,
    },
    /// Requests removal of an existing Junimo hut.
    RemoveHut {
        /// Identifier of the hut targeted for removal.
        building: BuildingId,
    },
    /// Updates the item currently held by the player.
    SetHeldItem {
        /// Display name of the held item, or `None` for empty hands.
        name: Option<String>,
    },
    /// Moves the cursor to the provided world tile.
    SetCursorTile {
        /// Tile currently targeted by the cursor.
        tile: Tile,
    },
    /// Stores or clears the attachment held inside a placed object.
    SetAttachment {
        /// Object whose attachment slot is updated.
        object: ObjectId,
        /// Display name of the attached item, or `None` to clear the slot.
        display_name: Option<String>,
    },
    /// Opens or closes the overlay gate (active menu or cutscene).
    SetOverlayGate {
        /// `true` suppresses overlay recomputation entirely.
        blocked: bool,
    },
}

/// Events broadcast by the registry after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Confirms that an object was placed.
    ObjectPlaced {
        /// Identifier assigned to the object by the registry.
        object: ObjectId,
        /// Tile the object occupies.
        tile: Tile,
    },
    /// Confirms that an object was removed.
    ObjectRemoved {
        /// Identifier of the removed object.
        object: ObjectId,
        /// Tile the object previously occupied.
        tile: Tile,
    },
    /// Confirms that a Junimo hut was placed.
    HutPlaced {
        /// Identifier assigned to the hut by the registry.
        building: BuildingId,
        /// Upper-left tile of the hut's footprint.
        anchor: Tile,
    },
    /// Confirms that a Junimo hut was removed.
    HutRemoved {
        /// Identifier of the removed hut.
        building: BuildingId,
        /// Upper-left tile of the hut's former footprint.
        anchor: Tile,
    },
    /// Announces that the held item changed.
    HeldItemChanged {
        /// Display name now held, or `None` for empty hands.
        name: Option<String>,
    },
    /// Announces that the cursor moved to a new tile.
    CursorMoved {
        /// Tile now targeted by the cursor.
        tile: Tile,
    },
    /// Announces that an object's attachment slot changed.
    AttachmentChanged {
        /// Object whose attachment slot was updated.
        object: ObjectId,
    },
    /// Announces that the overlay gate opened or closed.
    OverlayGateChanged {
        /// `true` while overlay recomputation is suppressed.
        blocked: bool,
    },
    /// Reports that an object placement request was rejected.
    ObjectPlacementRejected {
        /// Tile provided in the placement request.
        tile: Tile,
        /// Specific reason the placement failed.
        reason: PlacementError,
    },
    /// Reports that a removal request was rejected.
    ObjectRemovalRejected {
        /// Identifier provided in the removal request.
        object: ObjectId,
        /// Specific reason the removal failed.
        reason: RemovalError,
    },
    /// Reports that a hut placement request was rejected.
    HutPlacementRejected {
        /// Anchor tile provided in the placement request.
        anchor: Tile,
        /// Specific reason the placement failed.
        reason: PlacementError,
    },
    /// Reports that a hut removal request was rejected.
    HutRemovalRejected {
        /// Identifier provided in the removal request.
        building: BuildingId,
        /// Specific reason the removal failed.
        reason: RemovalError,
    },
}

/// Reasons a placement request may be rejected by the registry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlacementError {
    /// The requested tile already holds an object or building footprint.
    Occupied,
}

/// Reasons a removal or attachment request may be rejected by the registry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RemovalError {
    /// No object with the provided identifier exists.
    MissingObject,
    /// No building with the provided identifier exists.
    MissingBuilding,
}

/// Immutable representation of a single placed object used for queries.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ObjectSnapshot {
    /// Identifier allocated to the object by the registry.
    pub id: ObjectId,
    /// Display name carried by the object.
    pub name: String,
    /// Tile the object occupies.
    pub tile: Tile,
    /// Display name of the item held in the attachment slot, if any.
    pub attachment: Option<String>,
}

impl ObjectSnapshot {
    /// Classifies the object's display name into a coverage kind.
    #[must_use]
    pub fn kind(&self) -> Option<ObjectKind> {
        classify(&self.name)
    }

    /// Reports whether the attachment slot holds a range booster.
    #[must_use]
    pub fn has_range_booster(&self) -> bool {
        self.attachment
            .as_deref()
            .is_some_and(attachment_boosts_range)
    }
}

/// Read-only snapshot describing all placed objects in the active area.
#[derive(Clone, Debug, Default)]
pub struct ObjectView {
    snapshots: Vec<ObjectSnapshot>,
}

impl ObjectView {
    /// Creates a new object view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<ObjectSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &ObjectSnapshot> {
        self.snapshots.iter()
    }

    /// Returns the object occupying the provided tile, if any.
    #[must_use]
    pub fn at(&self, tile: Tile) -> Option<&ObjectSnapshot> {
        self.snapshots.iter().find(|snapshot| snapshot.tile == tile)
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<ObjectSnapshot> {
        self.snapshots
    }
}

/// Immutable representation of a single Junimo hut used for queries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HutSnapshot {
    /// Identifier allocated to the hut by the registry.
    pub id: BuildingId,
    /// Upper-left tile of the hut's footprint.
    pub anchor: Tile,
}

impl HutSnapshot {
    /// Width of a hut footprint measured in tiles.
    pub const FOOTPRINT_COLUMNS: i32 = 3;

    /// Height of a hut footprint measured in tiles.
    pub const FOOTPRINT_ROWS: i32 = 2;

    /// Tile the hut's coverage is anchored at: the door one tile in from
    /// the footprint's upper-left corner.
    #[must_use]
    pub const fn door_tile(&self) -> Tile {
        self.anchor.offset_by(1, 1)
    }

    /// Reports whether the provided tile lies inside the hut's footprint.
    #[must_use]
    pub const fn covers(&self, tile: Tile) -> bool {
        tile.x() >= self.anchor.x()
            && tile.x() < self.anchor.x() + Self::FOOTPRINT_COLUMNS
            && tile.y() >= self.anchor.y()
            && tile.y() < self.anchor.y() + Self::FOOTPRINT_ROWS
    }
}

/// Read-only snapshot describing all Junimo huts in the active area.
#[derive(Clone, Debug, Default)]
pub struct HutView {
    snapshots: Vec<HutSnapshot>,
}

impl HutView {
    /// Creates a new hut view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<HutSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &HutSnapshot> {
        self.snapshots.iter()
    }

    /// Returns the hut whose footprint contains the provided tile, if any.
    #[must_use]
    pub fn at(&self, tile: Tile) -> Option<&HutSnapshot> {
        self.snapshots.iter().find(|snapshot| snapshot.covers(tile))
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<HutSnapshot> {
        self.snapshots
    }
}

/// Ambient player state gathered once per recompute pass.
///
/// Systems receive this context explicitly instead of reaching into global
/// game state, keeping the coverage pass a pure function of its inputs.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct RenderContext {
    /// Display name of the currently held item, or `None` for empty hands.
    pub held_item: Option<String>,
    /// Tile currently targeted by the cursor.
    pub cursor: Option<Tile>,
    /// `true` while a menu or cutscene suppresses the overlay.
    pub overlay_blocked: bool,
}

impl RenderContext {
    /// Creates a new render context with explicit field values.
    #[must_use]
    pub fn new(held_item: Option<String>, cursor: Option<Tile>, overlay_blocked: bool) -> Self {
        Self {
            held_item,
            cursor,
            overlay_blocked,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::de::DeserializeOwned;

    #[test]
    fn classify_resolves_scarecrow_family() {
        assert_eq!(classify("Scarecrow"), Some(ObjectKind::Scarecrow));
        assert_eq!(classify("Rarecrow"), Some(ObjectKind::Scarecrow));
        assert_eq!(
            classify("Deluxe Scarecrow"),
            Some(ObjectKind::DeluxeScarecrow)
        );
    }

    #[test]
    fn classify_prefers_sprinkler_when_both_tokens_present() {
        assert_eq!(
            classify("Scarecrow Sprinkler"),
            Some(ObjectKind::Sprinkler),
            "a name mentioning both families must resolve to the sprinkler branch",
        );
    }

    #[test]
    fn classify_resolves_sprinkler_tiers_with_precedence() {
        assert_eq!(classify("Sprinkler"), Some(ObjectKind::Sprinkler));
        assert_eq!(
            classify("Quality Sprinkler"),
            Some(ObjectKind::QualitySprinkler)
        );
        assert_eq!(
            classify("Iridium Sprinkler"),
            Some(ObjectKind::IridiumSprinkler)
        );
        assert_eq!(
            classify("Prismatic Sprinkler"),
            Some(ObjectKind::PrismaticSprinkler)
        );
    }

    #[test]
    fn classify_is_case_insensitive() {
        assert_eq!(
            classify("IRIDIUM SPRINKLER"),
            Some(ObjectKind::IridiumSprinkler)
        );
        assert_eq!(classify("bee house"), Some(ObjectKind::BeeHouse));
        assert_eq!(classify("Bee House"), Some(ObjectKind::BeeHouse));
    }

    #[test]
    fn classify_rejects_unrelated_names() {
        assert_eq!(classify("Chest"), None);
        assert_eq!(classify(""), None);
        assert_eq!(classify("Junimo Hut"), None, "huts are not name-classified");
    }

    #[test]
    fn booster_item_detection_is_case_insensitive() {
        assert!(is_range_booster_item("Pressure Nozzle"));
        assert!(is_range_booster_item("pressure nozzle"));
        assert!(!is_range_booster_item("Enricher"));
    }

    #[test]
    fn attachment_boost_requires_literal_token() {
        assert!(attachment_boosts_range("Pressure Nozzle"));
        assert!(
            !attachment_boosts_range("pressure nozzle"),
            "attachment display names carry the capitalised token",
        );
        assert!(!attachment_boosts_range("Enricher"));
    }

    #[test]
    fn tile_offset_displaces_both_axes() {
        let tile = Tile::new(10, -3);
        assert_eq!(tile.offset_by(-2, 5), Tile::new(8, 2));
    }

    #[test]
    fn hut_footprint_contains_interior_tiles_only() {
        let hut = HutSnapshot {
            id: BuildingId::new(0),
            anchor: Tile::new(4, 4),
        };

        assert!(hut.covers(Tile::new(4, 4)));
        assert!(hut.covers(Tile::new(6, 5)));
        assert!(!hut.covers(Tile::new(7, 4)));
        assert!(!hut.covers(Tile::new(4, 6)));
        assert!(!hut.covers(Tile::new(3, 4)));
        assert_eq!(hut.door_tile(), Tile::new(5, 5));
    }

    #[test]
    fn object_view_sorts_snapshots_and_finds_by_tile() {
        let view = ObjectView::from_snapshots(vec![
            ObjectSnapshot {
                id: ObjectId::new(2),
                name: "Sprinkler".to_owned(),
                tile: Tile::new(1, 1),
                attachment: None,
            },
            ObjectSnapshot {
                id: ObjectId::new(1),
                name: "Scarecrow".to_owned(),
                tile: Tile::new(5, 5),
                attachment: None,
            },
        ]);

        let ids: Vec<u32> = view.iter().map(|snapshot| snapshot.id.get()).collect();
        assert_eq!(ids, vec![1, 2]);
        assert_eq!(
            view.at(Tile::new(5, 5)).map(|snapshot| snapshot.id),
            Some(ObjectId::new(1))
        );
        assert!(view.at(Tile::new(0, 0)).is_none());
    }

    #[test]
    fn snapshot_booster_flag_reads_attachment() {
        let snapshot = ObjectSnapshot {
            id: ObjectId::new(0),
            name: "Quality Sprinkler".to_owned(),
            tile: Tile::new(0, 0),
            attachment: Some("Pressure Nozzle".to_owned()),
        };
        assert!(snapshot.has_range_booster());
        assert_eq!(snapshot.kind(), Some(ObjectKind::QualitySprinkler));

        let bare = ObjectSnapshot {
            attachment: None,
            ..snapshot
        };
        assert!(!bare.has_range_booster());
    }

    fn assert_round_trip<T>(value: &T)
    where
        T: serde::Serialize + DeserializeOwned + PartialEq + std::fmt::Debug,
    {
        let bytes = bincode::serialize(value).expect("serialize");
        let restored: T = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(&restored, value);
    }

    #[test]
    fn tile_round_trips_through_bincode() {
        assert_round_trip(&Tile::new(-7, 42));
    }

    #[test]
    fn identifiers_round_trip_through_bincode() {
        assert_round_trip(&ObjectId::new(9));
        assert_round_trip(&BuildingId::new(3));
    }

    #[test]
    fn object_kind_round_trips_through_bincode() {
        assert_round_trip(&ObjectKind::PrismaticSprinkler);
    }

    #[test]
    fn error_reasons_round_trip_through_bincode() {
        assert_round_trip(&PlacementError::Occupied);
        assert_round_trip(&RemovalError::MissingObject);
    }
}
