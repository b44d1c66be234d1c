//! Player collision correction.
//!
//! Bedrock clients move by their own idea of block hitboxes. Before a
//! movement is forwarded, the player box is corrected against the Java
//! hitboxes of the surrounding blocks so server-side movement checks agree.

mod block;

pub use block::ScaffoldingContact;

use crossplay_types::{Axis, BlockPos, BoundingBox, Vec3d, Vec3f};
use crossplay_world::{BlockAccess, BlockRegistry, CollisionBehavior};

/// Largest gap corrected silently.
pub const COLLISION_TOLERANCE: f64 = 0.00001;
/// Tallest ledge a player steps onto without jumping (beds).
pub const MAX_STEP_HEIGHT: f64 = 0.5625;
/// Bedrock positions are reported at eye height.
pub const PLAYER_EYE_HEIGHT: f64 = 1.62;
pub const PLAYER_BOX_WIDTH: f64 = 0.6;
pub const PLAYER_BOX_HEIGHT: f64 = 1.8;

/// Result of correcting one proposed player box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Correction {
    pub bbox: BoundingBox,
    pub accepted: bool,
    pub scaffolding: ScaffoldingContact,
}

/// Blocks whose hitboxes may touch the player box, top layer first.
pub fn collidable_blocks(player: &BoundingBox) -> Vec<BlockPos> {
    let reach_x = player.size_x / 2.0 + COLLISION_TOLERANCE;
    let reach_z = player.size_z / 2.0 + COLLISION_TOLERANCE;
    let min_x = (player.middle_x - reach_x).floor() as i32;
    let max_x = (player.middle_x + reach_x).floor() as i32;
    let min_z = (player.middle_z - reach_z).floor() as i32;
    let max_z = (player.middle_z + reach_z).floor() as i32;
    let bottom = player.min(Axis::Y);
    // Half a block below catches fences and walls reaching into the block above.
    let min_y = (bottom - 0.5).floor() as i32;
    let max_y = (bottom + player.size_y).floor() as i32;

    let mut blocks = Vec::new();
    for y in (min_y..=max_y).rev() {
        for x in min_x..=max_x {
            for z in min_z..=max_z {
                blocks.push(BlockPos::new(x, y, z));
            }
        }
    }
    blocks
}

/// Correct a proposed player box against the given blocks (canonical ids).
///
/// Every block gets its pre-pass before any block is corrected. The first
/// block that rejects the move stops the walk.
pub fn correct(registry: &BlockRegistry, proposed: BoundingBox, blocks: &[(BlockPos, u32)]) -> Correction {
    let mut bbox = proposed;
    let mut scaffolding = ScaffoldingContact::default();

    for &(pos, state) in blocks {
        let boxes = registry.bounding_boxes_for(state);
        if boxes.iter().any(BoundingBox::is_degenerate) {
            continue;
        }
        block::before_correct(registry.collision_behavior(state), boxes, pos, &mut bbox);
    }

    for &(pos, state) in blocks {
        let behavior = registry.collision_behavior(state);
        if behavior == CollisionBehavior::None {
            continue;
        }
        let boxes = registry.bounding_boxes_for(state);
        if !block::correct(behavior, boxes, pos, &mut bbox, &mut scaffolding) {
            return Correction {
                bbox,
                accepted: false,
                scaffolding,
            };
        }
    }

    Correction {
        bbox,
        accepted: true,
        scaffolding,
    }
}

/// Widen a client f32 the way it was typed (0.1f becomes 0.1, not 0.10000000149).
fn widen(value: f32) -> f64 {
    value.to_string().parse().unwrap_or(value as f64)
}

/// Owns the session's player hitbox.
#[derive(Debug)]
pub struct CollisionManager {
    player_box: BoundingBox,
    scaffolding: ScaffoldingContact,
}

impl Default for CollisionManager {
    fn default() -> Self {
        Self::new()
    }
}

impl CollisionManager {
    pub fn new() -> Self {
        Self {
            player_box: BoundingBox::from_bottom_center(Vec3d::ZERO, PLAYER_BOX_WIDTH, PLAYER_BOX_HEIGHT),
            scaffolding: ScaffoldingContact::default(),
        }
    }

    pub fn player_box(&self) -> &BoundingBox {
        &self.player_box
    }

    pub fn scaffolding(&self) -> ScaffoldingContact {
        self.scaffolding
    }

    /// Moves the box so its bottom center sits at `position` (Java feet).
    pub fn update_player_box(&mut self, position: Vec3d) {
        self.player_box.middle_x = position.x;
        self.player_box.middle_y = position.y + self.player_box.size_y / 2.0;
        self.player_box.middle_z = position.z;
    }

    /// Corrects the current player box in place. False means the move must
    /// be rejected.
    pub fn correct_player_position(&mut self, world: &impl BlockAccess, registry: &BlockRegistry) -> bool {
        let blocks: Vec<(BlockPos, u32)> = collidable_blocks(&self.player_box)
            .into_iter()
            .map(|pos| (pos, world.block_at(pos)))
            .collect();
        let result = correct(registry, self.player_box, &blocks);
        self.player_box = result.bbox;
        self.scaffolding = result.scaffolding;
        result.accepted
    }

    /// Turns a Bedrock eye position into the Java feet position to forward.
    /// `None` rejects the movement and keeps the last accepted box; the
    /// caller must resync the client to it.
    ///
    /// Without a block cache there is nothing to collide with, so the
    /// position is only snapped to half blocks when on the ground.
    pub fn adjust_bedrock_position(
        &mut self,
        bedrock_position: Vec3f,
        on_ground: bool,
        world: &impl BlockAccess,
        registry: &BlockRegistry,
        cache_enabled: bool,
    ) -> Option<Vec3d> {
        let mut position = Vec3d::new(
            widen(bedrock_position.x),
            widen(bedrock_position.y) - PLAYER_EYE_HEIGHT,
            widen(bedrock_position.z),
        );

        if cache_enabled {
            let accepted = self.player_box;
            self.update_player_box(position);
            if !self.correct_player_position(world, registry) {
                self.player_box = accepted;
                return None;
            }
            position = self.player_box.bottom_center();
        } else {
            if on_ground {
                position.y = (position.y * 2.0).ceil() / 2.0;
            }
            self.update_player_box(position);
        }
        Some(position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossplay_data::MappingData;
    use std::collections::HashMap;

    fn registry() -> BlockRegistry {
        BlockRegistry::build(&MappingData::bundled().unwrap()).unwrap()
    }

    fn id(registry: &BlockRegistry, name: &str, properties: &[(&str, &str)]) -> u32 {
        registry
            .find(&format!("minecraft:{name}"), properties)
            .unwrap_or_else(|| panic!("{name} {properties:?} missing"))
    }

    fn player_at(x: f64, y: f64, z: f64) -> BoundingBox {
        BoundingBox::from_bottom_center(Vec3d::new(x, y, z), PLAYER_BOX_WIDTH, PLAYER_BOX_HEIGHT)
    }

    #[test]
    fn test_player_box_is_exactly_player_sized() {
        let mut manager = CollisionManager::new();
        manager.update_player_box(Vec3d::new(0.5, 64.0, 0.5));
        let b = manager.player_box();
        assert_eq!(b.size_x, 0.6);
        assert_eq!(b.size_y, 1.8);
        assert_eq!(b.size_z, 0.6);
        assert!((b.middle_y - 64.9).abs() < 1e-12);
        assert!((b.bottom_center().y - 64.0).abs() < 1e-12);
    }

    fn floor(registry: &BlockRegistry, y: i32) -> Vec<(BlockPos, u32)> {
        let stone = id(registry, "stone", &[]);
        let mut blocks = Vec::new();
        for x in -1..=1 {
            for z in -1..=1 {
                blocks.push((BlockPos::new(x, y, z), stone));
            }
        }
        blocks
    }

    #[test]
    fn test_collidable_blocks_cover_the_box_top_down() {
        let blocks = collidable_blocks(&player_at(0.5, 64.0, 0.5));
        assert_eq!(blocks.first().map(|p| p.y), Some(65));
        assert_eq!(blocks.last().map(|p| p.y), Some(63));
        assert!(blocks.contains(&BlockPos::new(0, 64, 0)));
        assert!(!blocks.contains(&BlockPos::new(1, 64, 0)));

        // Straddling a block edge reaches both columns.
        let blocks = collidable_blocks(&player_at(1.0, 64.0, 0.5));
        assert!(blocks.contains(&BlockPos::new(0, 64, 0)));
        assert!(blocks.contains(&BlockPos::new(1, 64, 0)));
    }

    #[test]
    fn test_clear_box_is_unchanged() {
        let registry = registry();
        let proposed = player_at(0.5, 64.0, 0.5);
        let result = correct(&registry, proposed, &floor(&registry, 63));
        assert!(result.accepted);
        assert_eq!(result.bbox, proposed);
        assert_eq!(result.scaffolding, ScaffoldingContact::default());

        let result = correct(&registry, proposed, &[]);
        assert_eq!(result.bbox, proposed);
        assert!(result.accepted);
    }

    #[test]
    fn test_steps_onto_slab() {
        let registry = registry();
        let slab = id(&registry, "oak_slab", &[("type", "bottom")]);
        let result = correct(
            &registry,
            player_at(0.5, 64.3, 0.5),
            &[(BlockPos::new(0, 64, 0), slab)],
        );
        assert!(result.accepted);
        assert!((result.bbox.min(Axis::Y) - 64.5).abs() < 1e-9);
    }

    #[test]
    fn test_too_tall_to_step() {
        let registry = registry();
        let stone = id(&registry, "stone", &[]);
        let proposed = player_at(0.5, 64.2, 0.5);
        let result = correct(&registry, proposed, &[(BlockPos::new(0, 64, 0), stone)]);
        assert!(result.accepted);
        assert_eq!(result.bbox.middle_y, proposed.middle_y);
    }

    #[test]
    fn test_pushed_off_a_nearby_wall() {
        let registry = registry();
        let stone = id(&registry, "stone", &[]);
        // East face of the player 5e-6 short of the wall at x = 1.
        let proposed = player_at(1.0 - 0.3 - 0.000005, 64.0, 0.5);
        let result = correct(&registry, proposed, &[(BlockPos::new(1, 64, 0), stone)]);
        assert!(result.accepted);
        let gap = 1.0 - result.bbox.max(Axis::X);
        assert!((gap - COLLISION_TOLERANCE).abs() < 1e-9, "gap {gap}");
        assert_eq!(result.bbox.size_x, 0.6);
    }

    #[test]
    fn test_deep_overlap_is_not_pushed() {
        let registry = registry();
        let stone = id(&registry, "stone", &[]);
        let proposed = player_at(0.9, 64.0, 0.5);
        let result = correct(&registry, proposed, &[(BlockPos::new(1, 64, 0), stone)]);
        assert!(result.accepted);
        assert_eq!(result.bbox.middle_x, proposed.middle_x);
    }

    #[test]
    fn test_closed_door_places_player_on_the_near_side() {
        let registry = registry();
        let door = id(
            &registry,
            "oak_door",
            &[("facing", "north"), ("half", "lower"), ("open", "false")],
        );
        let mut blocks = floor(&registry, 63);
        blocks.insert(0, (BlockPos::new(0, 64, 0), door));
        let result = correct(&registry, player_at(0.5, 64.0, 0.6), &blocks);
        assert!(result.accepted);
        assert!((result.bbox.middle_z - 0.4875).abs() < 1e-9);
    }

    #[test]
    fn test_open_door_places_player_on_the_far_side() {
        let registry = registry();
        let door = id(
            &registry,
            "oak_door",
            &[("facing", "north"), ("half", "lower"), ("open", "true")],
        );
        let result = correct(
            &registry,
            player_at(0.5, 64.0, 0.4),
            &[(BlockPos::new(0, 64, 0), door)],
        );
        assert!(result.accepted);
        assert!((result.bbox.middle_z - 0.5125).abs() < 1e-9);
    }

    #[test]
    fn test_east_facing_door_moves_along_x() {
        let registry = registry();
        let door = id(
            &registry,
            "oak_door",
            &[("facing", "east"), ("half", "lower"), ("open", "false")],
        );
        // Closed east door: slab on the west side.
        let result = correct(
            &registry,
            player_at(0.4, 64.0, 0.5),
            &[(BlockPos::new(0, 64, 0), door)],
        );
        assert!((result.bbox.middle_x - 0.5125).abs() < 1e-9);
        assert_eq!(result.bbox.middle_z, 0.5);
    }

    #[test]
    fn test_deep_snow_rejects() {
        let registry = registry();
        let snow = id(&registry, "snow", &[("layers", "8")]);
        let result = correct(
            &registry,
            player_at(0.5, 64.2, 0.5),
            &[(BlockPos::new(0, 64, 0), snow)],
        );
        assert!(!result.accepted);
    }

    #[test]
    fn test_shallow_snow_steps_up() {
        let registry = registry();
        let snow = id(&registry, "snow", &[("layers", "8")]);
        let result = correct(
            &registry,
            player_at(0.5, 64.5, 0.5),
            &[(BlockPos::new(0, 64, 0), snow)],
        );
        assert!(result.accepted);
        assert!((result.bbox.min(Axis::Y) - 64.875).abs() < 1e-9);
    }

    #[test]
    fn test_standing_on_full_snow_sinks_one_layer() {
        let registry = registry();
        let snow = id(&registry, "snow", &[("layers", "8")]);
        let result = correct(
            &registry,
            player_at(0.5, 65.0, 0.5),
            &[(BlockPos::new(0, 64, 0), snow)],
        );
        assert!(result.accepted);
        assert!((result.bbox.min(Axis::Y) - 64.875).abs() < 1e-9);
    }

    #[test]
    fn test_single_snow_layer_has_no_collision() {
        let registry = registry();
        let snow = id(&registry, "snow", &[("layers", "1")]);
        let proposed = player_at(0.5, 64.05, 0.5);
        let result = correct(&registry, proposed, &[(BlockPos::new(0, 64, 0), snow)]);
        assert!(result.accepted);
        assert_eq!(result.bbox, proposed);
    }

    #[test]
    fn test_dirt_path_lowers_player() {
        let registry = registry();
        let path = id(&registry, "dirt_path", &[]);
        let result = correct(
            &registry,
            player_at(0.5, 65.0, 0.5),
            &[(BlockPos::new(0, 64, 0), path)],
        );
        assert!(result.accepted);
        assert!((result.bbox.min(Axis::Y) - 64.9375).abs() < 1e-9);
    }

    #[test]
    fn test_scaffolding_contact() {
        let registry = registry();
        let scaffolding = id(&registry, "scaffolding", &[("bottom", "false")]);
        let inside = player_at(0.5, 64.2, 0.5);
        let result = correct(&registry, inside, &[(BlockPos::new(0, 64, 0), scaffolding)]);
        assert!(result.accepted);
        assert_eq!(result.bbox, inside);
        assert_eq!(result.scaffolding, ScaffoldingContact { touching: true, on: true });

        let on_top = player_at(0.5, 65.0, 0.5);
        let result = correct(&registry, on_top, &[(BlockPos::new(0, 64, 0), scaffolding)]);
        assert_eq!(result.bbox, on_top);
        assert_eq!(result.scaffolding, ScaffoldingContact { touching: false, on: true });
    }

    #[test]
    fn test_adjust_bedrock_position_with_cache() {
        let registry = registry();
        let stone = id(&registry, "stone", &[]);
        let world: HashMap<BlockPos, u32> = HashMap::from([(BlockPos::new(0, 63, 0), stone)]);
        let mut manager = CollisionManager::new();
        let position = manager
            .adjust_bedrock_position(Vec3f::new(0.5, 65.62, 0.5), true, &world, &registry, true)
            .unwrap();
        assert!((position.y - 64.0).abs() < 1e-9);
        assert_eq!(position.x, 0.5);
    }

    #[test]
    fn test_adjust_bedrock_position_rejects_deep_snow() {
        let registry = registry();
        let snow = id(&registry, "snow", &[("layers", "8")]);
        let world: HashMap<BlockPos, u32> = HashMap::from([(BlockPos::new(0, 64, 0), snow)]);
        let mut manager = CollisionManager::new();
        manager.update_player_box(Vec3d::new(3.5, 64.0, 0.5));
        assert!(manager
            .adjust_bedrock_position(Vec3f::new(0.5, 65.82, 0.5), true, &world, &registry, true)
            .is_none());
        // The last accepted box is kept for the resync.
        let kept = manager.player_box().bottom_center();
        assert_eq!(kept.x, 3.5);
        assert!((kept.y - 64.0).abs() < 1e-9);
    }

    #[test]
    fn test_adjust_bedrock_position_without_cache_snaps_on_ground() {
        let registry = registry();
        let world: HashMap<BlockPos, u32> = HashMap::new();
        let mut manager = CollisionManager::new();
        let position = manager
            .adjust_bedrock_position(Vec3f::new(0.5, 65.6, 0.5), true, &world, &registry, false)
            .unwrap();
        assert_eq!(position.y, 64.0);
        let position = manager
            .adjust_bedrock_position(Vec3f::new(0.5, 65.6, 0.5), false, &world, &registry, false)
            .unwrap();
        assert!(position.y < 64.0);
    }

    #[test]
    fn test_widen_keeps_typed_digits() {
        assert_eq!(widen(0.1), 0.1);
        assert_eq!(widen(65.62), 65.62);
    }
}
