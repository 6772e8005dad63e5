#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative farm registry for the Range Overlay engine.
//!
//! The registry owns every placed object and building together with the
//! ambient player state (held item, cursor tile, overlay gate). All
//! mutations flow through [`apply`], which broadcasts [`Event`] values, and
//! all reads flow through the [`query`] module, which hands out immutable
//! snapshot views for the coverage systems.

use std::collections::BTreeMap;

use range_overlay_core::{
    BuildingId, Command, Event, HutSnapshot, ObjectId, PlacementError, RemovalError, Tile,
};

/// Represents the authoritative farm state.
#[derive(Debug)]
pub struct World {
    objects: BTreeMap<ObjectId, ObjectState>,
    huts: BTreeMap<BuildingId, HutState>,
    next_object_id: u32,
    next_building_id: u32,
    held_item: Option<String>,
    cursor: Option<Tile>,
    overlay_blocked: bool,
}

impl World {
    /// Creates an empty farm with no held item and no cursor target.
    #[must_use]
    pub fn new() -> Self {
        Self {
            objects: BTreeMap::new(),
            huts: BTreeMap::new(),
            next_object_id: 0,
            next_building_id: 0,
            held_item: None,
            cursor: None,
            overlay_blocked: false,
        }
    }

    fn allocate_object_id(&mut self) -> ObjectId {
        let id = ObjectId::new(self.next_object_id);
        self.next_object_id = self.next_object_id.saturating_add(1);
        id
    }

    fn allocate_building_id(&mut self) -> BuildingId {
        let id = BuildingId::new(self.next_building_id);
        self.next_building_id = self.next_building_id.saturating_add(1);
        id
    }

    fn tile_occupied(&self, tile: Tile) -> bool {
        self.objects.values().any(|object| object.tile == tile)
            || self.huts.values().any(|hut| hut.snapshot().covers(tile))
    }

    fn footprint_occupied(&self, anchor: Tile) -> bool {
        for dx in 0..HutSnapshot::FOOTPRINT_COLUMNS {
            for dy in 0..HutSnapshot::FOOTPRINT_ROWS {
                let tile = anchor.offset_by(dx, dy);
                if self.objects.values().any(|object| object.tile == tile) {
                    return true;
                }
            }
        }

        self.huts
            .values()
            .any(|hut| footprints_overlap(hut.anchor, anchor))
    }
}

fn footprints_overlap(a: Tile, b: Tile) -> bool {
    a.x() < b.x() + HutSnapshot::FOOTPRINT_COLUMNS
        && b.x() < a.x() + HutSnapshot::FOOTPRINT_COLUMNS
        && a.y() < b.y() + HutSnapshot::FOOTPRINT_ROWS
        && b.y() < a.y() + HutSnapshot::FOOTPRINT_ROWS
}

#[derive(Clone, Debug)]
struct ObjectState {
    id: ObjectId,
    name: String,
    tile: Tile,
    attachment: Option<String>,
}

#[derive(Clone, Copy, Debug)]
struct HutState {
    id: BuildingId,
    anchor: Tile,
}

impl HutState {
    fn snapshot(&self) -> HutSnapshot {
        HutSnapshot {
            id: self.id,
            anchor: self.anchor,
        }
    }
}

/// Applies the provided command to the farm, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::PlaceObject { name, tile } => {
            if world.tile_occupied(tile) {
                out_events.push(Event::ObjectPlacementRejected {
                    tile,
                    reason: PlacementError::Occupied,
                });
                return;
            }

            let id = world.allocate_object_id();
            let _ = world.objects.insert(
                id,
                ObjectState {
                    id,
                    name,
                    tile,
                    attachment: None,
                },
            );
            out_events.push(Event::ObjectPlaced { object: id, tile });
        }
        Command::RemoveObject { object } => match world.objects.remove(&object) {
            Some(state) => out_events.push(Event::ObjectRemoved {
                object,
                tile: state.tile,
            }),
            None => out_events.push(Event::ObjectRemovalRejected {
                object,
                reason: RemovalError::MissingObject,
            }),
        },
        Command::PlaceHut { anchor } => {
            if world.footprint_occupied(anchor) {
                out_events.push(Event::HutPlacementRejected {
                    anchor,
                    reason: PlacementError::Occupied,
                });
                return;
            }

            let id = world.allocate_building_id();
            let _ = world.huts.insert(id, HutState { id, anchor });
            out_events.push(Event::HutPlaced {
                building: id,
                anchor,
            });
        }
        Command::RemoveHut { building } => match world.huts.remove(&building) {
            Some(state) => out_events.push(Event::HutRemoved {
                building,
                anchor: state.anchor,
            }),
            None => out_events.push(Event::HutRemovalRejected {
                building,
                reason: RemovalError::MissingBuilding,
            }),
        },
        Command::SetHeldItem { name } => {
            world.held_item = name.clone();
            out_events.push(Event::HeldItemChanged { name });
        }
        Command::SetCursorTile { tile } => {
            world.cursor = Some(tile);
            out_events.push(Event::CursorMoved { tile });
        }
        Command::SetAttachment {
            object,
            display_name,
        } => match world.objects.get_mut(&object) {
            Some(state) => {
                state.attachment = display_name;
                out_events.push(Event::AttachmentChanged { object });
            }
            None => out_events.push(Event::ObjectRemovalRejected {
                object,
                reason: RemovalError::MissingObject,
            }),
        },
        Command::SetOverlayGate { blocked } => {
            world.overlay_blocked = blocked;
            out_events.push(Event::OverlayGateChanged { blocked });
        }
    }
}

/// Query functions that provide read-only access to the farm state.
pub mod query {
    use super::World;
    use range_overlay_core::{
        BuildingId, HutView, ObjectId, ObjectSnapshot, ObjectView, RenderContext, Tile,
    };

    /// Captures a read-only view of every placed object.
    #[must_use]
    pub fn object_view(world: &World) -> ObjectView {
        let snapshots: Vec<ObjectSnapshot> = world
            .objects
            .values()
            .map(|state| ObjectSnapshot {
                id: state.id,
                name: state.name.clone(),
                tile: state.tile,
                attachment: state.attachment.clone(),
            })
            .collect();
        ObjectView::from_snapshots(snapshots)
    }

    /// Captures a read-only view of every Junimo hut.
    #[must_use]
    pub fn hut_view(world: &World) -> HutView {
        HutView::from_snapshots(world.huts.values().map(super::HutState::snapshot).collect())
    }

    /// Gathers the ambient player state consumed by a recompute pass.
    #[must_use]
    pub fn render_context(world: &World) -> RenderContext {
        RenderContext {
            held_item: world.held_item.clone(),
            cursor: world.cursor,
            overlay_blocked: world.overlay_blocked,
        }
    }

    /// Returns the object occupying the provided tile, if any.
    #[must_use]
    pub fn object_at(world: &World, tile: Tile) -> Option<ObjectId> {
        world
            .objects
            .values()
            .find(|state| state.tile == tile)
            .map(|state| state.id)
    }

    /// Returns the hut whose footprint contains the provided tile, if any.
    #[must_use]
    pub fn hut_at(world: &World, tile: Tile) -> Option<BuildingId> {
        world
            .huts
            .values()
            .find(|state| state.snapshot().covers(tile))
            .map(|state| state.id)
    }
}
