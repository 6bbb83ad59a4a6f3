use macroquad::prelude::*;

/// Size of the world every level is laid out in.
pub const WORLD_SIZE: Vec2 = Vec2::new(1280.0, 720.0);

const WALL: f32 = 20.0;
const GROUND: f32 = 660.0;
const PAD_TOP: f32 = 600.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceTag {
    /// Safe to touch (launch pad and its supports).
    Friendly,
    /// Touching it completes the level.
    Finish,
    /// Everything else.
    Hazard,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Block {
    pub rect: Rect,
    pub tag: SurfaceTag,
}

impl Block {
    pub fn new(x: f32, y: f32, w: f32, h: f32, tag: SurfaceTag) -> Self {
        Self {
            rect: Rect::new(x, y, w, h),
            tag,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Level {
    pub name: &'static str,
    /// Where the rocket's centre starts.
    pub spawn: Vec2,
    pub blocks: Vec<Block>,
}

impl Level {
    /// Enclosing walls, launch pad on the left and landing pad at `finish_x`.
    fn framed(name: &'static str, finish_x: f32, mut obstacles: Vec<Block>) -> Self {
        let mut blocks = vec![
            Block::new(0.0, GROUND, WORLD_SIZE.x, WORLD_SIZE.y - GROUND, SurfaceTag::Hazard),
            Block::new(0.0, 0.0, WORLD_SIZE.x, WALL, SurfaceTag::Hazard),
            Block::new(0.0, WALL, WALL, GROUND - WALL, SurfaceTag::Hazard),
            Block::new(WORLD_SIZE.x - WALL, WALL, WALL, GROUND - WALL, SurfaceTag::Hazard),
            // launch pad
            Block::new(80.0, PAD_TOP, 160.0, 20.0, SurfaceTag::Friendly),
            Block::new(140.0, PAD_TOP + 20.0, 40.0, GROUND - PAD_TOP - 20.0, SurfaceTag::Friendly),
            // landing pad; its support is not part of the goal
            Block::new(finish_x, PAD_TOP, 160.0, 20.0, SurfaceTag::Finish),
            Block::new(finish_x + 60.0, PAD_TOP + 20.0, 40.0, GROUND - PAD_TOP - 20.0, SurfaceTag::Hazard),
        ];
        blocks.append(&mut obstacles);

        Self {
            name,
            spawn: Vec2::new(160.0, PAD_TOP - 29.0),
            blocks,
        }
    }
}

// Levels in play order; there is always at least one
#[derive(Debug, Clone)]
pub struct LevelSet {
    first: Level,
    rest: Vec<Level>,
}

impl LevelSet {
    pub fn new(first: Level, rest: Vec<Level>) -> Self {
        Self { first, rest }
    }

    pub fn builtin() -> Self {
        use SurfaceTag::Hazard;

        Self::new(
            Level::framed("Lift Off", 1040.0, Vec::new()),
            vec![
                Level::framed(
                    "The Wall",
                    1040.0,
                    vec![Block::new(600.0, 260.0, 60.0, GROUND - 260.0, Hazard)],
                ),
                Level::framed(
                    "Overhang",
                    1060.0,
                    vec![
                        Block::new(420.0, WALL, 60.0, 360.0, Hazard),
                        Block::new(780.0, 300.0, 60.0, GROUND - 300.0, Hazard),
                        Block::new(900.0, 300.0, 340.0, 30.0, Hazard),
                    ],
                ),
                Level::framed(
                    "Chimney",
                    1060.0,
                    vec![
                        Block::new(360.0, 180.0, 60.0, GROUND - 180.0, Hazard),
                        Block::new(560.0, WALL, 60.0, 460.0, Hazard),
                        Block::new(760.0, 220.0, 60.0, GROUND - 220.0, Hazard),
                        Block::new(940.0, WALL, 60.0, 420.0, Hazard),
                    ],
                ),
            ],
        )
    }

    pub fn len(&self) -> usize {
        1 + self.rest.len()
    }

    pub fn first(&self) -> &Level {
        &self.first
    }

    pub fn get(&self, index: usize) -> Option<&Level> {
        match index {
            0 => Some(&self.first),
            _ => self.rest.get(index - 1),
        }
    }

    /// Index after `current`, wrapping from the last level back to the first.
    pub fn next_index(&self, current: usize) -> usize {
        if current + 1 >= self.len() {
            0
        } else {
            current + 1
        }
    }
}
