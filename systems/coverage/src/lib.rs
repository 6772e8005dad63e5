#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that merges per-object coverage masks into one highlighted
//! tile set.
//!
//! Each pass inspects the held item and the placed objects visible in the
//! active area, looks up the relative mask for every contributor, translates
//! it to absolute tiles around the contributor's anchor, and appends the
//! results to the caller's buffer. Overlapping coverage from neighbouring
//! objects is kept as repeated tiles; the renderer layers them.

use range_overlay_core::{
    classify, is_range_booster_item, HutView, MaskParameters, ObjectId, ObjectKind, ObjectView,
    RenderContext, Tile,
};
use range_overlay_system_mask::{CoverageMask, MaskCache};

/// Coverage aggregation system that reuses generated masks across passes.
#[derive(Debug, Default)]
pub struct Coverage {
    masks: MaskCache,
}

impl Coverage {
    /// Creates a new coverage system with an empty mask cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds the highlighted-tile set for the provided pass inputs.
    ///
    /// The output buffer is cleared before repopulating it. A blocked
    /// overlay (open menu, running cutscene) leaves the buffer empty, as
    /// does the absence of anything range-relevant: missing held item,
    /// missing cursor, or names no branch recognises.
    pub fn handle(
        &mut self,
        context: &RenderContext,
        objects: &ObjectView,
        huts: &HutView,
        out: &mut Vec<Tile>,
    ) {
        out.clear();

        if context.overlay_blocked {
            return;
        }

        if let Some(cursor) = context.cursor {
            if huts.at(cursor).is_some() {
                for hut in huts.iter() {
                    self.push_mask(
                        MaskParameters::new(ObjectKind::JunimoHut, false),
                        hut.door_tile(),
                        out,
                    );
                }
            }
        }

        let Some(held) = context.held_item.as_deref() else {
            return;
        };

        match classify(held) {
            Some(kind @ (ObjectKind::Scarecrow | ObjectKind::DeluxeScarecrow)) => {
                if let Some(cursor) = context.cursor {
                    self.push_mask(MaskParameters::new(kind, false), cursor, out);
                }
                for object in objects.iter() {
                    let Some(kind) = object.kind() else {
                        continue;
                    };
                    if kind.is_scarecrow() {
                        self.push_mask(MaskParameters::new(kind, false), object.tile, out);
                    }
                }
            }
            Some(
                kind @ (ObjectKind::Sprinkler
                | ObjectKind::QualitySprinkler
                | ObjectKind::IridiumSprinkler
                | ObjectKind::PrismaticSprinkler),
            ) => {
                if let Some(cursor) = context.cursor {
                    self.push_mask(MaskParameters::new(kind, false), cursor, out);
                }
                self.push_placed_sprinklers(objects, None, out);
            }
            Some(ObjectKind::BeeHouse) => {
                if let Some(cursor) = context.cursor {
                    self.push_mask(MaskParameters::new(ObjectKind::BeeHouse, false), cursor, out);
                }
            }
            // Huts are buildings and never resolve from an item name.
            Some(ObjectKind::JunimoHut) => {}
            None => {
                if is_range_booster_item(held) {
                    self.push_boosted_hover(context, objects, out);
                }
            }
        }
    }

    /// Handles a held range booster: the hovered sprinkler previews its
    /// boosted mask, and every other placed sprinkler keeps showing its
    /// current range.
    fn push_boosted_hover(
        &mut self,
        context: &RenderContext,
        objects: &ObjectView,
        out: &mut Vec<Tile>,
    ) {
        let hovered = context.cursor.and_then(|cursor| objects.at(cursor));

        if let (Some(cursor), Some(object)) = (context.cursor, hovered) {
            if let Some(kind) = object.kind() {
                if kind.is_sprinkler() {
                    self.push_mask(MaskParameters::new(kind, true), cursor, out);
                }
            }
        }

        self.push_placed_sprinklers(objects, hovered.map(|object| object.id), out);
    }

    fn push_placed_sprinklers(
        &mut self,
        objects: &ObjectView,
        excluded: Option<ObjectId>,
        out: &mut Vec<Tile>,
    ) {
        for object in objects.iter() {
            if excluded == Some(object.id) {
                continue;
            }
            let Some(kind) = object.kind() else {
                continue;
            };
            if !kind.is_sprinkler() {
                continue;
            }
            self.push_mask(
                MaskParameters::new(kind, object.has_range_booster()),
                object.tile,
                out,
            );
        }
    }

    fn push_mask(&mut self, params: MaskParameters, anchor: Tile, out: &mut Vec<Tile>) {
        translate_into(self.masks.mask(params), anchor, out);
    }
}

/// Appends the absolute tiles covered by a mask anchored at the provided tile.
pub fn translate_into(mask: &CoverageMask, anchor: Tile, out: &mut Vec<Tile>) {
    for (dx, dy) in mask.offsets() {
        out.push(anchor.offset_by(dx, dy));
    }
}

#[cfg(test)]
mod tests {
    use super::translate_into;
    use range_overlay_core::{MaskParameters, ObjectKind, Tile};
    use range_overlay_system_mask::mask_for;

    #[test]
    fn translation_anchors_offsets_at_the_provided_tile() {
        let mask = mask_for(MaskParameters::new(ObjectKind::Sprinkler, false));
        let mut out = Vec::new();
        translate_into(&mask, Tile::new(3, 4), &mut out);

        out.sort_unstable();
        assert_eq!(
            out,
            vec![
                Tile::new(2, 4),
                Tile::new(3, 3),
                Tile::new(3, 5),
                Tile::new(4, 4),
            ]
        );
    }

    #[test]
    fn translation_appends_without_clearing() {
        let mask = mask_for(MaskParameters::new(ObjectKind::Sprinkler, false));
        let mut out = vec![Tile::new(0, 0)];
        translate_into(&mask, Tile::new(3, 4), &mut out);
        assert_eq!(out.len(), 5);
        assert_eq!(out[0], Tile::new(0, 0));
    }
}
