//! Per-block correction of the player box. Block boxes are relative to the
//! block origin; the player box is in world space.

use super::{COLLISION_TOLERANCE, MAX_STEP_HEIGHT};
use crossplay_types::{Axis, BlockPos, BoundingBox, Direction};
use crossplay_world::{CollisionBehavior, SurfaceKind};

/// Scaffolding contact found while correcting.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ScaffoldingContact {
    pub touching: bool,
    pub on: bool,
}

const SHRINK: f64 = 0.0001;
const SNOW_LAYER: f64 = 0.125;
const DIRT_PATH_DROP: f64 = 0.0625;
const DOOR_NEAR_SIDE: f64 = 0.4875;
const DOOR_FAR_SIDE: f64 = 0.5125;

fn min_y(player: &BoundingBox) -> f64 {
    player.middle_y - player.size_y / 2.0
}

/// Push-away tolerance, widened where f32 precision on the client is coarser.
fn push_away_tolerance(player: &BoundingBox, axis: Axis) -> f64 {
    let (middle, size) = match axis {
        Axis::X => (player.middle_x, player.size_x),
        Axis::Y => (player.middle_y, player.size_y),
        Axis::Z => (player.middle_z, player.size_z),
    };
    let extent = (middle.abs() + size / 2.0).max(1.0) as f32;
    let ulp = (f32::from_bits(extent.to_bits() + 1) - extent) as f64;
    (COLLISION_TOLERANCE * 1.1).max(ulp)
}

/// Runs before any block is corrected. Nudges the player onto surfaces
/// whose height differs between editions.
pub(crate) fn before_correct(
    behavior: CollisionBehavior,
    boxes: &[BoundingBox],
    pos: BlockPos,
    player: &mut BoundingBox,
) {
    match behavior {
        CollisionBehavior::SurfaceAdjust(SurfaceKind::DirtPath) => {
            if ((pos.y + 1) as f64 - min_y(player)).abs() <= COLLISION_TOLERANCE {
                player.translate(0.0, -DIRT_PATH_DROP, 0.0);
            }
        }
        CollisionBehavior::StepHazard { layers: 4 | 8 } => {
            // Bedrock stands on the full snow layer, Java sinks one layer in.
            for b in boxes {
                let box_max_y = b.max(Axis::Y) + pos.y as f64;
                let player_min_y = min_y(player);
                if player_min_y > box_max_y && player_min_y <= box_max_y + SNOW_LAYER {
                    player.translate(0.0, box_max_y - player_min_y, 0.0);
                }
            }
        }
        _ => {}
    }
}

/// Corrects the player against one block. Returns false to reject the move.
pub(crate) fn correct(
    behavior: CollisionBehavior,
    boxes: &[BoundingBox],
    pos: BlockPos,
    player: &mut BoundingBox,
    scaffolding: &mut ScaffoldingContact,
) -> bool {
    if boxes.iter().any(BoundingBox::is_degenerate) {
        return true;
    }
    match behavior {
        CollisionBehavior::None => true,
        CollisionBehavior::Plain | CollisionBehavior::SurfaceAdjust(SurfaceKind::DirtPath) => {
            correct_plain(boxes, pos, player, 1.0)
        }
        CollisionBehavior::StepHazard { .. } => correct_snow(boxes, pos, player),
        CollisionBehavior::Directional { facing, open } => correct_door(boxes, pos, player, facing, open),
        CollisionBehavior::SurfaceAdjust(SurfaceKind::Scaffolding) => {
            probe_scaffolding(boxes, pos, player, scaffolding);
            true
        }
    }
}

/// Steps the player up short ledges, then pushes them off faces they are
/// within tolerance of.
fn correct_plain(boxes: &[BoundingBox], pos: BlockPos, player: &mut BoundingBox, push_up_tolerance: f64) -> bool {
    let (x, y, z) = (pos.x as f64, pos.y as f64, pos.z as f64);
    let (size_x, size_z) = (player.size_x, player.size_z);
    let mut player_min_y = min_y(player);

    for b in boxes {
        let box_min_y = b.min(Axis::Y) + y;
        let box_max_y = b.max(Axis::Y) + y;
        if b.intersects_at(x, y, z, player)
            && player_min_y + push_up_tolerance >= box_min_y
            && box_max_y - player_min_y <= MAX_STEP_HEIGHT
        {
            player.translate(0.0, box_max_y - player_min_y, 0.0);
            player_min_y = min_y(player);
        }

        // Widen so boxes resting exactly against a face count as touching.
        player.size_x = size_x + COLLISION_TOLERANCE * 2.0;
        player.size_z = size_z + COLLISION_TOLERANCE * 2.0;

        if b.intersects_at(x, y, z, player) {
            let tolerance_x = push_away_tolerance(player, Axis::X);
            let tolerance_z = push_away_tolerance(player, Axis::Z);
            let rel_x = player.middle_x - x;
            let rel_z = player.middle_z - z;

            let north = b.min(Axis::Z) - rel_z - player.size_z / 2.0;
            if north.abs() < tolerance_z {
                player.translate(0.0, 0.0, north);
            }
            let south = b.max(Axis::Z) - rel_z + player.size_z / 2.0;
            if south.abs() < tolerance_z {
                player.translate(0.0, 0.0, south);
            }
            let east = b.max(Axis::X) - rel_x + player.size_x / 2.0;
            if east.abs() < tolerance_x {
                player.translate(east, 0.0, 0.0);
            }
            let west = b.min(Axis::X) - rel_x - player.size_x / 2.0;
            if west.abs() < tolerance_x {
                player.translate(west, 0.0, 0.0);
            }
        }

        player.size_x = size_x;
        player.size_z = size_z;
    }
    true
}

/// Snow deeper than half a block cannot be walked into.
fn correct_snow(boxes: &[BoundingBox], pos: BlockPos, player: &mut BoundingBox) -> bool {
    let (x, y, z) = (pos.x as f64, pos.y as f64, pos.z as f64);
    let original = *player;
    player.size_x -= SHRINK;
    player.size_y -= SHRINK;
    player.size_z -= SHRINK;
    let player_min_y = min_y(player);
    let rejected = boxes.iter().any(|b| {
        b.intersects_at(x, y, z, player) && (b.max(Axis::Y) + y) - player_min_y > 0.5
    });
    player.size_x = original.size_x;
    player.size_y = original.size_y;
    player.size_z = original.size_z;
    if rejected {
        return false;
    }
    correct_plain(boxes, pos, player, SNOW_LAYER)
}

/// The side of the block a door's slab occupies.
fn door_slab_side(facing: Direction, open: bool) -> Direction {
    if open {
        facing
    } else {
        facing.opposite()
    }
}

/// Doors are thinner on Bedrock. A player caught inside the Java slab is
/// placed where the Bedrock client believes they stand.
fn correct_door(
    boxes: &[BoundingBox],
    pos: BlockPos,
    player: &mut BoundingBox,
    facing: Direction,
    open: bool,
) -> bool {
    correct_plain(boxes, pos, player, 1.0);

    let (x, y, z) = (pos.x as f64, pos.y as f64, pos.z as f64);
    let original = *player;
    player.size_x -= SHRINK;
    player.size_y -= SHRINK;
    player.size_z -= SHRINK;
    if boxes.iter().any(|b| b.intersects_at(x, y, z, player)) {
        match door_slab_side(facing, open) {
            Direction::South => player.middle_z = z + DOOR_NEAR_SIDE,
            Direction::North => player.middle_z = z + DOOR_FAR_SIDE,
            Direction::East => player.middle_x = x + DOOR_NEAR_SIDE,
            Direction::West => player.middle_x = x + DOOR_FAR_SIDE,
        }
    }
    player.size_x = original.size_x;
    player.size_y = original.size_y;
    player.size_z = original.size_z;
    true
}

/// Scaffolding is never pushed against; it only reports contact.
fn probe_scaffolding(
    boxes: &[BoundingBox],
    pos: BlockPos,
    player: &mut BoundingBox,
    contact: &mut ScaffoldingContact,
) {
    let (x, y, z) = (pos.x as f64, pos.y as f64, pos.z as f64);
    let original = *player;

    player.size_y -= 0.001;
    player.middle_y += 0.002;
    if boxes.iter().any(|b| b.intersects_at(x, y, z, player)) {
        contact.touching = true;
        contact.on = true;
    } else {
        *player = original;
        player.size_y += 0.001;
        player.middle_y -= 0.002;
        if boxes.iter().any(|b| b.intersects_at(x, y, z, player)) {
            contact.on = true;
        }
    }
    *player = original;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_door_slab_side() {
        assert_eq!(door_slab_side(Direction::North, false), Direction::South);
        assert_eq!(door_slab_side(Direction::North, true), Direction::North);
        assert_eq!(door_slab_side(Direction::East, false), Direction::West);
    }

    #[test]
    fn test_push_away_tolerance_grows_far_from_origin() {
        let near = BoundingBox::new(0.5, 64.9, 0.5, 0.6, 1.8, 0.6);
        assert_eq!(push_away_tolerance(&near, Axis::X), COLLISION_TOLERANCE * 1.1);
        let far = BoundingBox::new(1_000_000.5, 64.9, 0.5, 0.6, 1.8, 0.6);
        assert!(push_away_tolerance(&far, Axis::X) > 0.01);
    }

    #[test]
    fn test_degenerate_block_is_skipped() {
        let degenerate = [BoundingBox::new(0.5, 0.5, 0.5, 0.0, 1.0, 1.0)];
        let mut player = BoundingBox::new(0.5, 0.9, 0.5, 0.6, 1.8, 0.6);
        let before = player;
        let mut contact = ScaffoldingContact::default();
        assert!(correct(
            CollisionBehavior::Plain,
            &degenerate,
            BlockPos::new(0, 0, 0),
            &mut player,
            &mut contact
        ));
        assert_eq!(player, before);
    }
}
