//! Geometry kernel stand-ins. The evaluator stores, transforms and hands
//! these to the host; it never tessellates or renders them.

use std::f64::consts::PI;
use std::path::PathBuf;

use crate::types::mat::{
    M4, m4_identity, m4_mul, m4_mul_point, m4_rotate_x, m4_rotate_y, m4_rotate_z,
    m4_scale_xyz, m4_translate,
};

// ─── Vector ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vector {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vector {
    pub const ZERO: Vector = Vector { x: 0.0, y: 0.0, z: 0.0 };
    pub const ONE: Vector = Vector { x: 1.0, y: 1.0, z: 1.0 };

    pub fn new(x: f64, y: f64, z: f64) -> Self { Self { x, y, z } }

    /// Position-style construction: missing components are zero.
    pub fn from_components(c: &[f64]) -> Self {
        let at = |i: usize| c.get(i).copied().unwrap_or(0.0);
        Self::new(at(0), at(1), at(2))
    }

    /// Size-style construction: one value is uniform, a missing depth
    /// repeats the width.
    pub fn size_from_components(c: &[f64]) -> Self {
        match c {
            [] => Self::ONE,
            [s] => Self::new(*s, *s, *s),
            [w, h] => Self::new(*w, *h, *w),
            [w, h, d, ..] => Self::new(*w, *h, *d),
        }
    }

    pub fn components(&self) -> [f64; 3] { [self.x, self.y, self.z] }
}

// ─── Color ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

impl Color {
    pub const BLACK: Color = Color::rgba(0.0, 0.0, 0.0, 1.0);
    pub const WHITE: Color = Color::rgba(1.0, 1.0, 1.0, 1.0);
    pub const CLEAR: Color = Color::rgba(0.0, 0.0, 0.0, 0.0);

    pub const fn rgba(r: f64, g: f64, b: f64, a: f64) -> Self { Self { r, g, b, a } }

    /// 1 value = gray, 2 = gray + alpha, 3 = rgb, 4 = rgba.
    pub fn from_components(c: &[f64]) -> Self {
        match c {
            [] => Self::WHITE,
            [l] => Self::rgba(*l, *l, *l, 1.0),
            [l, a] => Self::rgba(*l, *l, *l, *a),
            [r, g, b] => Self::rgba(*r, *g, *b, 1.0),
            [r, g, b, a, ..] => Self::rgba(*r, *g, *b, *a),
        }
    }

    /// Parse the digits of a `#rgb`, `#rgba`, `#rrggbb` or `#rrggbbaa` literal.
    pub fn from_hex(digits: &str) -> Option<Self> {
        let nibble = |i: usize| u8::from_str_radix(digits.get(i..i + 1)?, 16).ok();
        let byte = |i: usize| u8::from_str_radix(digits.get(i..i + 2)?, 16).ok();
        let short = |n: u8| (n * 17) as f64 / 255.0;
        let long = |n: u8| n as f64 / 255.0;
        match digits.len() {
            3 => Some(Self::rgba(short(nibble(0)?), short(nibble(1)?), short(nibble(2)?), 1.0)),
            4 => Some(Self::rgba(short(nibble(0)?), short(nibble(1)?), short(nibble(2)?), short(nibble(3)?))),
            6 => Some(Self::rgba(long(byte(0)?), long(byte(2)?), long(byte(4)?), 1.0)),
            8 => Some(Self::rgba(long(byte(0)?), long(byte(2)?), long(byte(4)?), long(byte(6)?))),
            _ => None,
        }
    }

    pub fn components(&self) -> [f64; 4] { [self.r, self.g, self.b, self.a] }
}

// ─── Material ─────────────────────────────────────────────────────────────────

/// A texture reference, resolved through the delegate but never loaded here.
#[derive(Debug, Clone, PartialEq)]
pub struct Texture {
    pub name: String,
    pub url: PathBuf,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MaterialProperty {
    Color(Color),
    Texture(Texture),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub diffuse: Option<MaterialProperty>,
    pub opacity: f64,
}

impl Default for Material {
    fn default() -> Self { Self { diffuse: None, opacity: 1.0 } }
}

impl Material {
    pub fn color(&self) -> Color {
        match &self.diffuse {
            Some(MaterialProperty::Color(c)) => *c,
            _ => Color::WHITE,
        }
    }

    pub fn texture(&self) -> Option<&Texture> {
        match &self.diffuse {
            Some(MaterialProperty::Texture(t)) => Some(t),
            _ => None,
        }
    }
}

// ─── Transform ────────────────────────────────────────────────────────────────

/// Affine transform. Rotations are expressed in half-turns (1.0 = 180°).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    matrix: M4,
}

impl Default for Transform {
    fn default() -> Self { Self::IDENTITY }
}

impl Transform {
    pub const IDENTITY: Transform = Transform {
        matrix: [1., 0., 0., 0.,
                 0., 1., 0., 0.,
                 0., 0., 1., 0.,
                 0., 0., 0., 1.],
    };

    pub fn translation(v: Vector) -> Self { Self { matrix: m4_translate(v.x, v.y, v.z) } }

    pub fn scaling(v: Vector) -> Self { Self { matrix: m4_scale_xyz(v.x, v.y, v.z) } }

    /// `v` holds roll (z), yaw (y) and pitch (x) in half-turns.
    pub fn rotation(v: Vector) -> Self {
        let m = m4_mul(&m4_rotate_z(v.x * PI), &m4_mul(&m4_rotate_y(v.y * PI), &m4_rotate_x(v.z * PI)));
        Self { matrix: m }
    }

    /// Translate · rotate · scale.
    pub fn from_parts(position: Vector, orientation: Vector, scale: Vector) -> Self {
        Self::translation(position)
            .compose(&Self::rotation(orientation))
            .compose(&Self::scaling(scale))
    }

    /// `self ∘ inner`: `inner` is applied first.
    pub fn compose(&self, inner: &Transform) -> Transform {
        Self { matrix: m4_mul(&self.matrix, &inner.matrix) }
    }

    pub fn apply(&self, v: Vector) -> Vector {
        let (x, y, z) = m4_mul_point(&self.matrix, (v.x, v.y, v.z));
        Vector::new(x, y, z)
    }

    pub fn is_identity(&self) -> bool { self.matrix == m4_identity() }

    pub fn matrix(&self) -> &M4 { &self.matrix }
}

// ─── Paths ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathPoint {
    pub position: Vector,
    pub is_curved: bool,
}

impl PathPoint {
    pub fn point(position: Vector) -> Self { Self { position, is_curved: false } }
    pub fn curve(position: Vector) -> Self { Self { position, is_curved: true } }

    pub fn transformed(&self, t: &Transform) -> Self {
        Self { position: t.apply(self.position), is_curved: self.is_curved }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Path {
    pub points: Vec<PathPoint>,
}

impl Path {
    pub fn new(points: Vec<PathPoint>) -> Self { Self { points } }

    /// Closed polygon approximating a unit-diameter circle.
    pub fn circle(segments: usize) -> Self {
        let segments = segments.max(3);
        let mut points: Vec<PathPoint> = (0..segments)
            .map(|i| {
                let angle = 2.0 * PI * i as f64 / segments as f64;
                PathPoint::curve(Vector::new(0.5 * angle.cos(), 0.5 * angle.sin(), 0.0))
            })
            .collect();
        points.push(points[0]);
        Self { points }
    }

    /// Closed unit square centered on the origin.
    pub fn square() -> Self {
        let corners = [(-0.5, 0.5), (0.5, 0.5), (0.5, -0.5), (-0.5, -0.5), (-0.5, 0.5)];
        Self { points: corners.iter().map(|&(x, y)| PathPoint::point(Vector::new(x, y, 0.0))).collect() }
    }

    pub fn is_closed(&self) -> bool {
        match (self.points.first(), self.points.last()) {
            (Some(a), Some(b)) => self.points.len() > 1 && a.position == b.position,
            _ => false,
        }
    }

    pub fn transformed(&self, t: &Transform) -> Self {
        if t.is_identity() { return self.clone(); }
        Self { points: self.points.iter().map(|p| p.transformed(t)).collect() }
    }
}

// ─── Geometry ─────────────────────────────────────────────────────────────────

/// Polygon soup delivered by an external importer.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Mesh {
    pub polygons: Vec<Vec<Vector>>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum GeometryKind {
    Cube,
    Sphere { segments: usize },
    Cylinder { segments: usize },
    Cone { segments: usize },
    Group,
    Union,
    Difference,
    Intersection,
    Path(Path),
    Fill(Vec<Path>),
    Extrude { shapes: Vec<Path>, along: Vec<Path> },
    Lathe { shapes: Vec<Path>, segments: usize },
    Mesh(Mesh),
}

/// A scene-graph node. `children` is only populated for group-like kinds.
#[derive(Debug, Clone, PartialEq)]
pub struct Geometry {
    pub kind: GeometryKind,
    pub name: Option<String>,
    pub transform: Transform,
    pub material: Material,
    pub children: Vec<Geometry>,
}

impl Geometry {
    pub fn new(kind: GeometryKind) -> Self {
        Self {
            kind,
            name: None,
            transform: Transform::IDENTITY,
            material: Material::default(),
            children: Vec::new(),
        }
    }

    pub fn path(path: Path) -> Self { Self::new(GeometryKind::Path(path)) }

    pub fn transformed(&self, t: &Transform) -> Self {
        if t.is_identity() { return self.clone(); }
        Self { transform: t.compose(&self.transform), ..self.clone() }
    }

    /// Depth-first search for a node carrying `name`.
    pub fn find(&self, name: &str) -> Option<&Geometry> {
        if self.name.as_deref() == Some(name) { return Some(self); }
        self.children.iter().find_map(|c| c.find(name))
    }
}
