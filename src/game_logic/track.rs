use crate::error::ConfigError;
use crate::game_logic::constants::{
    GRID_COLUMN_SPACING, GRID_ROW_SPACING, TRACK_WIDTH, WORLD_HEIGHT, WORLD_WIDTH,
};
use bevy::prelude::*;
use std::f32::consts::TAU;

/// Track feedback consulted by kart physics after every move.
pub trait SurfaceProbe {
    fn on_track(&self, point: Vec2) -> bool;
    fn in_water(&self, point: Vec2) -> bool;
}

/// The built-in layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TrackId {
    #[default]
    Oval,
    Forest,
    Desert,
}

impl TrackId {
    pub const ALL: [TrackId; 3] = [TrackId::Oval, TrackId::Forest, TrackId::Desert];

    /// Map a numeric track selection to a layout. Unknown ids fall back to the oval.
    pub fn from_index(index: u32) -> Self {
        match index {
            0 => TrackId::Oval,
            1 => TrackId::Forest,
            2 => TrackId::Desert,
            other => {
                warn!("Unknown track id {}, falling back to the oval", other);
                TrackId::Oval
            }
        }
    }

    pub fn index(&self) -> u32 {
        match self {
            TrackId::Oval => 0,
            TrackId::Forest => 1,
            TrackId::Desert => 2,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TrackId::Oval => "Oval",
            TrackId::Forest => "Forest",
            TrackId::Desert => "Desert",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WaterHazard {
    pub center: Vec2,
    pub radius: f32,
}

impl WaterHazard {
    pub fn new(x: f32, y: f32, radius: f32) -> Self {
        Self {
            center: Vec2::new(x, y),
            radius,
        }
    }

    pub fn contains(&self, point: Vec2) -> bool {
        point.distance(self.center) <= self.radius
    }
}

/// Analytic description of the drivable area.
#[derive(Clone, Debug, PartialEq)]
pub enum TrackShape {
    /// Ring between two concentric axis-aligned ellipses
    Annulus {
        center: Vec2,
        outer_radii: Vec2,
        inner_radii: Vec2,
    },
    /// Closed polyline driven as a band of constant width
    Corridor { points: Vec<Vec2>, half_width: f32 },
    /// Every in-bounds point is drivable
    Open,
}

impl TrackShape {
    fn contains(&self, point: Vec2) -> bool {
        match self {
            TrackShape::Annulus {
                center,
                outer_radii,
                inner_radii,
            } => {
                let inside = |radii: &Vec2| {
                    let d = (point - *center) / *radii;
                    d.length_squared() <= 1.0
                };
                inside(outer_radii) && !inside(inner_radii)
            }
            TrackShape::Corridor { points, half_width } => {
                (0..points.len()).any(|i| {
                    let a = points[i];
                    let b = points[(i + 1) % points.len()];
                    distance_to_segment(point, a, b) <= *half_width
                })
            }
            TrackShape::Open => true,
        }
    }
}

fn distance_to_segment(point: Vec2, a: Vec2, b: Vec2) -> f32 {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq == 0.0 {
        return point.distance(a);
    }
    let t = ((point - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    point.distance(a + ab * t)
}

/// Read-only track data for one race: checkpoints, hazards and the drivable area.
#[derive(Clone, Debug)]
pub struct TrackSurface {
    pub id: TrackId,
    pub width: f32,
    pub height: f32,
    checkpoints: Vec<Vec2>,
    water_hazards: Vec<WaterHazard>,
    shape: TrackShape,
}

impl TrackSurface {
    pub fn build(id: TrackId) -> Self {
        match id {
            TrackId::Oval => Self::oval(),
            TrackId::Forest => Self::forest(),
            TrackId::Desert => Self::desert(),
        }
    }

    /// Assemble a track from raw parts. There must be at least one checkpoint.
    pub fn from_parts(
        id: TrackId,
        width: f32,
        height: f32,
        checkpoints: Vec<Vec2>,
        water_hazards: Vec<WaterHazard>,
        shape: TrackShape,
    ) -> Result<Self, ConfigError> {
        if checkpoints.is_empty() {
            return Err(ConfigError::Invalid(
                "a track needs at least one checkpoint".into(),
            ));
        }
        Ok(Self {
            id,
            width,
            height,
            checkpoints,
            water_hazards,
            shape,
        })
    }

    // 8 checkpoints on the centerline of an elliptical ring
    fn oval() -> Self {
        let center = Vec2::new(WORLD_WIDTH / 2.0, WORLD_HEIGHT / 2.0);
        let outer_radii = Vec2::new(400.0, 250.0);
        let inner_radii = Vec2::new(280.0, 130.0);
        let centerline = (outer_radii + inner_radii) / 2.0;

        let count = 8;
        let checkpoints = (0..count)
            .map(|i| {
                let angle = i as f32 / count as f32 * TAU;
                center + centerline * Vec2::new(angle.cos(), angle.sin())
            })
            .collect();

        Self {
            id: TrackId::Oval,
            width: WORLD_WIDTH,
            height: WORLD_HEIGHT,
            checkpoints,
            water_hazards: Vec::new(),
            shape: TrackShape::Annulus {
                center,
                outer_radii,
                inner_radii,
            },
        }
    }

    // winding loop, checkpoints are the polyline corners
    fn forest() -> Self {
        let points: Vec<Vec2> = [
            (300.0, 300.0),
            (600.0, 200.0),
            (900.0, 300.0),
            (1200.0, 500.0),
            (1400.0, 800.0),
            (1200.0, 1100.0),
            (800.0, 1200.0),
            (400.0, 1100.0),
            (200.0, 800.0),
            (250.0, 500.0),
        ]
        .into_iter()
        .map(|(x, y)| Vec2::new(x, y))
        .collect();

        Self {
            id: TrackId::Forest,
            width: WORLD_WIDTH,
            height: WORLD_HEIGHT,
            checkpoints: points.clone(),
            water_hazards: vec![
                WaterHazard::new(500.0, 600.0, 80.0),
                WaterHazard::new(1000.0, 400.0, 60.0),
                WaterHazard::new(700.0, 900.0, 70.0),
            ],
            shape: TrackShape::Corridor {
                points,
                half_width: TRACK_WIDTH / 2.0,
            },
        }
    }

    // figure-8 around a central pond
    fn desert() -> Self {
        let center = Vec2::new(WORLD_WIDTH / 2.0, WORLD_HEIGHT / 2.0);
        let points: Vec<Vec2> = [
            (-200.0, -200.0),
            (0.0, -250.0),
            (200.0, -200.0),
            (100.0, 0.0),
            (200.0, 200.0),
            (0.0, 250.0),
            (-200.0, 200.0),
            (-100.0, 0.0),
        ]
        .into_iter()
        .map(|(x, y)| center + Vec2::new(x, y))
        .collect();

        Self {
            id: TrackId::Desert,
            width: WORLD_WIDTH,
            height: WORLD_HEIGHT,
            checkpoints: points.clone(),
            water_hazards: vec![
                WaterHazard::new(center.x, center.y, 40.0),
                WaterHazard::new(center.x - 300.0, center.y - 300.0, 50.0),
                WaterHazard::new(center.x + 300.0, center.y + 300.0, 50.0),
            ],
            shape: TrackShape::Corridor {
                points,
                half_width: TRACK_WIDTH / 2.0,
            },
        }
    }

    pub fn checkpoints(&self) -> &[Vec2] {
        &self.checkpoints
    }

    pub fn checkpoint_count(&self) -> usize {
        self.checkpoints.len()
    }

    /// Checkpoint 0 doubles as the start/finish line.
    pub fn start_line(&self) -> Vec2 {
        self.checkpoints[0]
    }

    pub fn water_hazards(&self) -> &[WaterHazard] {
        &self.water_hazards
    }

    pub fn shape(&self) -> &TrackShape {
        &self.shape
    }

    pub fn in_bounds(&self, point: Vec2) -> bool {
        point.x >= 0.0 && point.y >= 0.0 && point.x < self.width && point.y < self.height
    }

    pub fn nearest_checkpoint(&self, point: Vec2) -> Vec2 {
        self.checkpoints
            .iter()
            .copied()
            .min_by(|a, b| a.distance_squared(point).total_cmp(&b.distance_squared(point)))
            .unwrap_or_else(|| self.start_line())
    }

    /// Starting grid: two karts per row, rows stacked behind the start line.
    pub fn start_positions(&self, kart_count: usize) -> Vec<Vec2> {
        let start = self.start_line();
        (0..kart_count)
            .map(|i| {
                let row = (i / 2) as f32;
                let col = (i % 2) as f32;
                Vec2::new(
                    start.x + (col - 0.5) * GRID_COLUMN_SPACING,
                    start.y - row * GRID_ROW_SPACING - GRID_ROW_SPACING,
                )
            })
            .collect()
    }
}

impl SurfaceProbe for TrackSurface {
    fn on_track(&self, point: Vec2) -> bool {
        self.in_bounds(point) && !self.in_water(point) && self.shape.contains(point)
    }

    fn in_water(&self, point: Vec2) -> bool {
        self.water_hazards.iter().any(|hazard| hazard.contains(point))
    }
}
