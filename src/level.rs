use roxmltree::{Document, Node};

use crate::error::LevelError;
use crate::wall::Wall;

/// Largest number of tiles a level file may declare.
pub const MAX_TILES: usize = 1 << 24;

/// An upright quad standing in the middle of a tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Marker {
    pub x: usize,
    pub y: usize,
    pub lighted: bool,
}

/// A tile-based level.
///
/// Holds the floor height of every tile, the walls around each tile and the
/// markers standing on the floor. The x axis goes from 0 to `width` and the
/// y axis from 0 to `depth`; z is the height in the world.
#[derive(Debug, Clone, PartialEq)]
pub struct Level {
    width: usize,
    depth: usize,
    floor: Vec<f32>,
    walls: Vec<Wall>,
    markers: Vec<Marker>,
}

impl Level {
    /// Creates a flat level where every tile sits at `default_z`.
    pub fn new(width: usize, depth: usize, default_z: f32) -> Self {
        Self {
            width,
            depth,
            floor: vec![default_z; width * depth],
            walls: vec![Wall::none(); width * depth],
            markers: Vec::new(),
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn contains(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.depth
    }

    fn index(&self, x: usize, y: usize) -> usize {
        assert!(
            self.contains(x, y),
            "tile ({x}, {y}) is outside a {}x{} level",
            self.width,
            self.depth
        );
        y * self.width + x
    }

    /// Height of a tile. Panics if the tile is outside the level.
    pub fn z(&self, x: usize, y: usize) -> f32 {
        self.floor[self.index(x, y)]
    }

    /// Sets the height of a tile. Panics if the tile is outside the level.
    pub fn set_z(&mut self, x: usize, y: usize, z: f32) -> &mut Self {
        let i = self.index(x, y);
        self.floor[i] = z;
        self
    }

    pub fn wall(&self, x: usize, y: usize) -> &Wall {
        &self.walls[self.index(x, y)]
    }

    pub fn wall_mut(&mut self, x: usize, y: usize) -> &mut Wall {
        let i = self.index(x, y);
        &mut self.walls[i]
    }

    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    /// Places a marker. Panics if its tile is outside the level.
    pub fn add_marker(&mut self, marker: Marker) -> &mut Self {
        self.index(marker.x, marker.y);
        self.markers.push(marker);
        self
    }

    /// Total number of wall sides set across all tiles.
    pub fn wall_count(&self) -> usize {
        self.walls.iter().map(Wall::count).sum()
    }

    /// Closes the level: bottom walls on `y = 0`, top walls on the last row,
    /// left walls on `x = 0` and right walls on the last column.
    pub fn add_border_walls(&mut self) {
        if self.width == 0 || self.depth == 0 {
            return;
        }
        for x in 0..self.width {
            self.wall_mut(x, 0).bottom = true;
            let last = self.depth - 1;
            self.wall_mut(x, last).top = true;
        }
        for y in 0..self.depth {
            self.wall_mut(0, y).left = true;
            let last = self.width - 1;
            self.wall_mut(last, y).right = true;
        }
    }

    /// Adds a wall between every pair of adjacent tiles whose height
    /// difference is at least `threshold`.
    pub fn add_cliff_walls(&mut self, threshold: f32) {
        for y in 0..self.depth {
            for x in 0..self.width {
                let z = self.z(x, y);
                if x + 1 < self.width && (z - self.z(x + 1, y)).abs() >= threshold {
                    self.wall_mut(x, y).right = true;
                }
                if y + 1 < self.depth && (z - self.z(x, y + 1)).abs() >= threshold {
                    self.wall_mut(x, y).top = true;
                }
            }
        }
    }

    /// Returns true if a character can step from `start` to `end`.
    ///
    /// A move is possible if:
    /// * `end` is inside the level
    /// * `start` and `end` are adjacent (no diagonals)
    /// * neither tile has a wall on the shared side
    pub fn is_move_possible(&self, start: (usize, usize), end: (usize, usize)) -> bool {
        if !self.contains(end.0, end.1) || !self.contains(start.0, start.1) {
            return false;
        }
        let dx = end.0 as isize - start.0 as isize;
        let dy = end.1 as isize - start.1 as isize;
        let from = self.wall(start.0, start.1);
        let to = self.wall(end.0, end.1);
        match (dx, dy) {
            (1, 0) => !from.right && !to.left,
            (-1, 0) => !from.left && !to.right,
            (0, 1) => !from.top && !to.bottom,
            (0, -1) => !from.bottom && !to.top,
            _ => false,
        }
    }

    /// Text rendering of the walls, mostly for debugging.
    pub fn to_ascii(&self) -> String {
        let mut res = String::with_capacity((self.width * 3 + 1) * self.depth);
        for y in 0..self.depth {
            for x in 0..self.width {
                let wall = self.wall(x, y);
                res.push(if wall.left { '|' } else { ' ' });
                // y grows downwards in text but upwards on screen
                res.push(match (wall.top, wall.bottom) {
                    (true, true) => '=',
                    (true, false) => '_',
                    (false, true) => '-',
                    (false, false) => ' ',
                });
                res.push(if wall.right { '|' } else { ' ' });
            }
            res.push('\n');
        }
        res
    }

    /// Parses a level description.
    ///
    /// ```xml
    /// <level width="10" depth="10" default-z="0">
    ///     <tile x="2" y="2" z="5"/>
    ///     <wall x="0" y="0" sides="right top"/>
    ///     <marker x="3" y="4" lighted="true"/>
    ///     <border-walls/>
    ///     <cliff-walls threshold="1.0"/>
    /// </level>
    /// ```
    ///
    /// Border and cliff walls are added after every tile height is known,
    /// wherever they appear in the document.
    pub fn from_xml(xml: &str) -> Result<Self, LevelError> {
        let document = Document::parse(xml)?;
        let root = document.root_element();
        if !root.has_tag_name("level") {
            return Err(LevelError::UnexpectedRoot(
                root.tag_name().name().to_string(),
            ));
        }

        let width = required_usize(&root, "width")?;
        let depth = required_usize(&root, "depth")?;
        if width == 0 || depth == 0 {
            return Err(LevelError::Empty);
        }
        if width.checked_mul(depth).map_or(true, |tiles| tiles > MAX_TILES) {
            return Err(LevelError::TooLarge {
                width,
                depth,
                limit: MAX_TILES,
            });
        }
        let default_z = optional_f32(&root, "default-z")?.unwrap_or(0.0);
        let mut level = Level::new(width, depth, default_z);

        let mut border = false;
        let mut cliff_threshold = None;
        for node in root.children().filter(Node::is_element) {
            match node.tag_name().name() {
                "tile" => {
                    let (x, y) = level.coordinates(&node)?;
                    let z = optional_f32(&node, "z")?.ok_or_else(|| missing(&node, "z"))?;
                    level.set_z(x, y, z);
                }
                "wall" => {
                    let (x, y) = level.coordinates(&node)?;
                    let sides = node.attribute("sides").ok_or_else(|| missing(&node, "sides"))?;
                    let wall = level.wall_mut(x, y);
                    for side in sides.split_whitespace() {
                        if !wall.set_side(side, true) {
                            return Err(LevelError::UnknownSide(side.to_string()));
                        }
                    }
                }
                "marker" => {
                    let (x, y) = level.coordinates(&node)?;
                    let lighted = optional_bool(&node, "lighted")?.unwrap_or(true);
                    level.add_marker(Marker { x, y, lighted });
                }
                "border-walls" => border = true,
                "cliff-walls" => {
                    cliff_threshold = Some(optional_f32(&node, "threshold")?.unwrap_or(1.0));
                }
                other => log::warn!("ignoring unknown level element <{other}>"),
            }
        }

        if border {
            level.add_border_walls();
        }
        if let Some(threshold) = cliff_threshold {
            level.add_cliff_walls(threshold);
        }
        Ok(level)
    }

    fn coordinates(&self, node: &Node<'_, '_>) -> Result<(usize, usize), LevelError> {
        let x = required_usize(node, "x")?;
        let y = required_usize(node, "y")?;
        if !self.contains(x, y) {
            return Err(LevelError::OutOfBounds {
                x,
                y,
                width: self.width,
                depth: self.depth,
            });
        }
        Ok((x, y))
    }
}

fn missing(node: &Node<'_, '_>, attribute: &'static str) -> LevelError {
    LevelError::MissingAttribute {
        element: node.tag_name().name().to_string(),
        attribute,
    }
}

fn invalid_number(node: &Node<'_, '_>, attribute: &'static str, value: &str) -> LevelError {
    LevelError::InvalidNumber {
        element: node.tag_name().name().to_string(),
        attribute,
        value: value.to_string(),
    }
}

fn required_usize(node: &Node<'_, '_>, attribute: &'static str) -> Result<usize, LevelError> {
    let value = node
        .attribute(attribute)
        .ok_or_else(|| missing(node, attribute))?;
    value
        .trim()
        .parse::<usize>()
        .map_err(|_| invalid_number(node, attribute, value))
}

fn optional_f32(node: &Node<'_, '_>, attribute: &'static str) -> Result<Option<f32>, LevelError> {
    match node.attribute(attribute) {
        Some(value) => value
            .trim()
            .parse::<f32>()
            .map(Some)
            .map_err(|_| invalid_number(node, attribute, value)),
        None => Ok(None),
    }
}

fn optional_bool(node: &Node<'_, '_>, attribute: &'static str) -> Result<Option<bool>, LevelError> {
    match node.attribute(attribute).map(str::trim) {
        Some("true") | Some("1") | Some("yes") => Ok(Some(true)),
        Some("false") | Some("0") | Some("no") => Ok(Some(false)),
        Some(value) => Err(LevelError::InvalidBool {
            element: node.tag_name().name().to_string(),
            attribute,
            value: value.to_string(),
        }),
        None => Ok(None),
    }
}
