//! Prebuilt battle setups
//!
//! Each scenario populates an empty world with two armies facing each other
//! across the field midline. Formation helpers place units in packed grids so
//! front ranks engage first and back ranks feed in as the line collapses.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::core::types::{PlayerId, Vec2};
use crate::engine::unit_kind::UnitKind;
use crate::engine::world::World;

/// Field midpoint both armies are anchored around
const MID: Vec2 = Vec2 { x: 30.0, y: 30.0 };
/// Column width used by grid formations
const GRID_COLS: usize = 5;
/// Spacing between grid neighbours, tight enough that collision resolution
/// keeps the block coherent while it advances
const GRID_SPACING: f32 = 0.6;

/// Named battle setups selectable from the CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scenario {
    /// Combined-arms armies with knights, pikemen, crossbowmen, and monks.
    /// Player 1 fields one fewer crossbowman, so the fight is close but not
    /// mirrored.
    Asymmetric,
    /// N knights against 2N knights, packed into adjacent grids so the
    /// engagement starts immediately. Attrition should follow a square-law
    /// shape: the doubled side wins with most of its force intact.
    Lanchester { n: usize },
    /// Mirrored single line of pikemen, the simplest symmetric fight
    Line { per_side: usize },
    /// Knight wedge charging a pikeman line: the classic counter matchup
    Wedge { knights: usize },
    /// Both armies scattered in loose blobs, positions drawn from the seed
    Scatter { per_side: usize },
}

impl Scenario {
    /// Stable tag used by the CLI
    pub fn as_tag(&self) -> &'static str {
        match self {
            Scenario::Asymmetric => "asymmetric",
            Scenario::Lanchester { .. } => "lanchester",
            Scenario::Line { .. } => "line",
            Scenario::Wedge { .. } => "wedge",
            Scenario::Scatter { .. } => "scatter",
        }
    }

    /// Parse a CLI tag into a scenario with default sizes
    pub fn parse_tag(tag: &str) -> Option<Self> {
        match tag {
            "asymmetric" => Some(Scenario::Asymmetric),
            "lanchester" => Some(Scenario::Lanchester { n: 10 }),
            "line" => Some(Scenario::Line { per_side: 8 }),
            "wedge" => Some(Scenario::Wedge { knights: 7 }),
            "scatter" => Some(Scenario::Scatter { per_side: 12 }),
            _ => None,
        }
    }

    /// Populate `world` with this scenario's armies. `seed` only affects
    /// the scatter layout.
    pub fn setup(&self, world: &mut World, seed: u64) {
        match *self {
            Scenario::Asymmetric => setup_asymmetric(world),
            Scenario::Lanchester { n } => setup_lanchester(world, UnitKind::Knight, n),
            Scenario::Line { per_side } => setup_line(world, per_side),
            Scenario::Wedge { knights } => setup_wedge(world, knights),
            Scenario::Scatter { per_side } => setup_scatter(world, per_side, seed),
        }
    }
}

/// Spawn `count` units in a packed grid. `dir` is -1.0 for an army growing
/// leftward, +1.0 for rightward, so the two blocks face each other.
pub fn spawn_grid(
    world: &mut World,
    owner: PlayerId,
    kind: UnitKind,
    anchor: Vec2,
    dir: f32,
    count: usize,
) {
    for i in 0..count {
        let col = (i % GRID_COLS) as f32;
        let row = (i / GRID_COLS) as f32;
        let pos = Vec2::new(anchor.x + dir * col * GRID_SPACING, anchor.y + row * GRID_SPACING);
        world.spawn_default(owner, pos, kind);
    }
}

/// Spawn `count` units in a wedge whose tip is at `anchor` and points along
/// `dir` (+1.0 or -1.0 on the x axis). Rows widen by one unit per rank behind
/// the tip.
pub fn spawn_wedge(
    world: &mut World,
    owner: PlayerId,
    kind: UnitKind,
    anchor: Vec2,
    dir: f32,
    count: usize,
) {
    let mut placed = 0;
    let mut row = 0usize;
    while placed < count {
        let width = row + 1;
        for slot in 0..width {
            if placed == count {
                break;
            }
            let y = anchor.y + (slot as f32 - row as f32 / 2.0) * 1.2;
            let pos = Vec2::new(anchor.x - dir * row as f32 * 1.2, y);
            world.spawn_default(owner, pos, kind);
            placed += 1;
        }
        row += 1;
    }
}

/// Spawn `count` units evenly spaced on a circle around `center`
pub fn spawn_circle(
    world: &mut World,
    owner: PlayerId,
    kind: UnitKind,
    center: Vec2,
    radius: f32,
    count: usize,
) {
    for i in 0..count {
        let angle = std::f32::consts::TAU * i as f32 / count.max(1) as f32;
        let pos = Vec2::new(
            center.x + radius * angle.cos(),
            center.y + radius * angle.sin(),
        );
        world.spawn_default(owner, pos, kind);
    }
}

/// Spawn `count` units in a horizontal rank stepping away from the midline
fn spawn_rank(
    world: &mut World,
    owner: PlayerId,
    kind: UnitKind,
    anchor: Vec2,
    dir: f32,
    step: f32,
    count: usize,
) {
    for i in 0..count {
        let pos = Vec2::new(anchor.x + dir * i as f32 * step, anchor.y);
        world.spawn_default(owner, pos, kind);
    }
}

fn setup_asymmetric(world: &mut World) {
    let offset = 10.0;

    // Player 1, left of the midline, growing further left.
    let anchor = Vec2::new(MID.x - offset, MID.y);
    for i in 0..3 {
        let pos = Vec2::new(anchor.x - i as f32 * 2.0, anchor.y + i as f32);
        world.spawn_default(PlayerId(1), pos, UnitKind::Knight);
    }
    spawn_rank(
        world,
        PlayerId(1),
        UnitKind::Pikeman,
        Vec2::new(anchor.x, anchor.y + 2.0),
        -1.0,
        2.0,
        5,
    );
    spawn_rank(
        world,
        PlayerId(1),
        UnitKind::Crossbowman,
        Vec2::new(anchor.x, anchor.y - 2.0),
        -1.0,
        2.0,
        3,
    );
    for i in 0..2 {
        let pos = Vec2::new(anchor.x - i as f32 * 6.0, anchor.y - 3.0 + i as f32 * 6.0);
        world.spawn_default(PlayerId(1), pos, UnitKind::Monk);
    }

    // Player 2, mirrored on the right, with a fourth crossbowman.
    let anchor = Vec2::new(MID.x + offset, MID.y);
    for i in 0..3 {
        let pos = Vec2::new(anchor.x + i as f32 * 2.0, anchor.y + i as f32);
        world.spawn_default(PlayerId(2), pos, UnitKind::Knight);
    }
    spawn_rank(
        world,
        PlayerId(2),
        UnitKind::Pikeman,
        Vec2::new(anchor.x, anchor.y + 2.0),
        1.0,
        2.0,
        5,
    );
    spawn_rank(
        world,
        PlayerId(2),
        UnitKind::Crossbowman,
        Vec2::new(anchor.x, anchor.y - 2.0),
        1.0,
        2.0,
        4,
    );
    for i in 0..2 {
        let pos = Vec2::new(anchor.x + i as f32 * 6.0, anchor.y - 3.0 + i as f32 * 6.0);
        world.spawn_default(PlayerId(2), pos, UnitKind::Monk);
    }
}

fn setup_lanchester(world: &mut World, kind: UnitKind, n: usize) {
    // Adjacent anchors so the front ranks start within weapon reach.
    spawn_grid(world, PlayerId(1), kind, Vec2::new(MID.x - 10.0, MID.y), -1.0, n);
    spawn_grid(world, PlayerId(2), kind, Vec2::new(MID.x - 8.8, MID.y), 1.0, 2 * n);
}

fn setup_line(world: &mut World, per_side: usize) {
    for i in 0..per_side {
        let y = MID.y + i as f32 * 1.5;
        world.spawn_default(PlayerId(1), Vec2::new(MID.x - 6.0, y), UnitKind::Pikeman);
        world.spawn_default(PlayerId(2), Vec2::new(MID.x + 6.0, y), UnitKind::Pikeman);
    }
}

fn setup_wedge(world: &mut World, knights: usize) {
    spawn_wedge(
        world,
        PlayerId(1),
        UnitKind::Knight,
        Vec2::new(MID.x - 8.0, MID.y),
        1.0,
        knights,
    );
    for i in 0..knights + 3 {
        let y = MID.y - 3.0 + i as f32;
        world.spawn_default(PlayerId(2), Vec2::new(MID.x + 8.0, y), UnitKind::Pikeman);
    }
}

fn setup_scatter(world: &mut World, per_side: usize, seed: u64) {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    for _ in 0..per_side {
        let pos = Vec2::new(
            MID.x - 15.0 + rng.gen_range(-5.0..5.0),
            MID.y + rng.gen_range(-8.0..8.0),
        );
        world.spawn_default(PlayerId(1), pos, UnitKind::Pikeman);
    }
    for _ in 0..per_side {
        let pos = Vec2::new(
            MID.x + 15.0 + rng.gen_range(-5.0..5.0),
            MID.y + rng.gen_range(-8.0..8.0),
        );
        world.spawn_default(PlayerId(2), pos, UnitKind::Pikeman);
    }
}
