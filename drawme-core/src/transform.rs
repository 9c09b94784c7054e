//! 2-D placement transforms and their CSS transform-string form.
//!
//! A [`Transform`] is translate, then rotate, then scale, which is exactly
//! what the canonical string `translate(Xpx, Ypx) rotate(Rdeg) scale(SX, SY)`
//! expresses. Strings produced by interaction toolkits may use any other mix
//! of CSS transform functions (including `matrix(...)`); those are composed
//! into an affine matrix and decomposed back.

use serde::{Deserialize, Serialize};

use crate::geometry::Point;
use crate::{EditorError, EditorResult};

/// Translation, rotation (degrees) and scale of a placement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Transform {
    /// Horizontal offset from the surface origin.
    pub translate_x: f64,
    /// Vertical offset from the surface origin.
    pub translate_y: f64,
    /// Clockwise rotation in degrees.
    pub rotation: f64,
    /// Horizontal scale factor.
    pub scale_x: f64,
    /// Vertical scale factor.
    pub scale_y: f64,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    /// The identity transform.
    pub const IDENTITY: Self = Self {
        translate_x: 0.0,
        translate_y: 0.0,
        rotation: 0.0,
        scale_x: 1.0,
        scale_y: 1.0,
    };

    /// A pure translation to `point`.
    #[must_use]
    pub fn translation(point: Point) -> Self {
        Self {
            translate_x: point.x,
            translate_y: point.y,
            ..Self::IDENTITY
        }
    }

    /// The translated origin.
    #[must_use]
    pub fn origin(&self) -> Point {
        Point::new(self.translate_x, self.translate_y)
    }

    /// Move by an offset.
    #[must_use]
    pub fn translated(self, dx: f64, dy: f64) -> Self {
        Self {
            translate_x: self.translate_x + dx,
            translate_y: self.translate_y + dy,
            ..self
        }
    }

    /// Multiply the scale factors.
    #[must_use]
    pub fn scaled_by(self, fx: f64, fy: f64) -> Self {
        Self {
            scale_x: self.scale_x * fx,
            scale_y: self.scale_y * fy,
            ..self
        }
    }

    /// Add to the rotation, normalized into `(-360, 360)`.
    #[must_use]
    pub fn rotated_by(self, degrees: f64) -> Self {
        Self {
            rotation: (self.rotation + degrees) % 360.0,
            ..self
        }
    }

    /// Canonical CSS transform string.
    #[must_use]
    pub fn to_css(&self) -> String {
        format!(
            "translate({}px, {}px) rotate({}deg) scale({}, {})",
            self.translate_x, self.translate_y, self.rotation, self.scale_x, self.scale_y
        )
    }

    /// Parse a CSS transform string.
    ///
    /// `none` and the empty string are the identity.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::InvalidTransform`] if the string contains an
    /// unknown function, a malformed argument, or a non-finite result.
    pub fn parse_css(input: &str) -> EditorResult<Self> {
        let trimmed = input.trim();
        if trimmed.is_empty() || trimmed == "none" {
            return Ok(Self::IDENTITY);
        }

        let ops = parse_functions(trimmed)?;
        let transform = if is_canonical_order(&ops) {
            let mut t = Self::IDENTITY;
            for op in &ops {
                match *op {
                    Op::Translate(x, y) => t = t.translated(x, y),
                    Op::Rotate(deg) => t.rotation += deg,
                    Op::Scale(sx, sy) => t = t.scaled_by(sx, sy),
                    Op::Matrix(_) => unreachable!("matrix is never canonical"),
                }
            }
            t
        } else {
            let matrix = ops
                .iter()
                .fold(Affine::IDENTITY, |acc, op| acc.then(op.to_affine()));
            matrix.decompose()
        };

        if transform.is_finite() {
            Ok(transform)
        } else {
            Err(EditorError::InvalidTransform(input.to_string()))
        }
    }

    fn is_finite(&self) -> bool {
        self.translate_x.is_finite()
            && self.translate_y.is_finite()
            && self.rotation.is_finite()
            && self.scale_x.is_finite()
            && self.scale_y.is_finite()
    }
}

impl std::fmt::Display for Transform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_css())
    }
}

impl From<Transform> for String {
    fn from(transform: Transform) -> Self {
        transform.to_css()
    }
}

impl TryFrom<String> for Transform {
    type Error = EditorError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse_css(&value)
    }
}

impl std::str::FromStr for Transform {
    type Err = EditorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_css(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Op {
    Translate(f64, f64),
    Rotate(f64),
    Scale(f64, f64),
    Matrix(Affine),
}

impl Op {
    fn rank(&self) -> u8 {
        match self {
            Self::Translate(..) => 0,
            Self::Rotate(_) => 1,
            Self::Scale(..) => 2,
            Self::Matrix(_) => u8::MAX,
        }
    }

    fn to_affine(self) -> Affine {
        match self {
            Self::Translate(x, y) => Affine {
                e: x,
                f: y,
                ..Affine::IDENTITY
            },
            Self::Rotate(deg) => {
                let (sin, cos) = deg.to_radians().sin_cos();
                Affine {
                    a: cos,
                    b: sin,
                    c: -sin,
                    d: cos,
                    e: 0.0,
                    f: 0.0,
                }
            }
            Self::Scale(sx, sy) => Affine {
                a: sx,
                d: sy,
                ..Affine::IDENTITY
            },
            Self::Matrix(m) => m,
        }
    }
}

fn is_canonical_order(ops: &[Op]) -> bool {
    ops.windows(2).all(|pair| pair[0].rank() <= pair[1].rank())
        && ops.iter().all(|op| op.rank() != u8::MAX)
}

/// CSS `matrix(a, b, c, d, e, f)`.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Affine {
    a: f64,
    b: f64,
    c: f64,
    d: f64,
    e: f64,
    f: f64,
}

impl Affine {
    const IDENTITY: Self = Self {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        e: 0.0,
        f: 0.0,
    };

    /// `self * next`, i.e. `next` is applied to points first.
    fn then(self, next: Self) -> Self {
        Self {
            a: self.a * next.a + self.c * next.b,
            b: self.b * next.a + self.d * next.b,
            c: self.a * next.c + self.c * next.d,
            d: self.b * next.c + self.d * next.d,
            e: self.a * next.e + self.c * next.f + self.e,
            f: self.b * next.e + self.d * next.f + self.f,
        }
    }

    /// Split into translate * rotate * scale. Skew is folded into `scale_y`.
    fn decompose(self) -> Transform {
        let scale_x = self.a.hypot(self.b);
        if scale_x == 0.0 {
            return Transform {
                translate_x: self.e,
                translate_y: self.f,
                rotation: 0.0,
                scale_x: 0.0,
                scale_y: self.d,
            };
        }
        let rotation = self.b.atan2(self.a).to_degrees();
        let scale_y = (self.a * self.d - self.b * self.c) / scale_x;
        Transform {
            translate_x: self.e,
            translate_y: self.f,
            rotation,
            scale_x,
            scale_y,
        }
    }
}

fn parse_functions(input: &str) -> EditorResult<Vec<Op>> {
    let invalid = || EditorError::InvalidTransform(input.to_string());
    let mut ops = Vec::new();
    let mut rest = input;

    while !rest.trim_start().is_empty() {
        rest = rest.trim_start();
        let open = rest.find('(').ok_or_else(invalid)?;
        let close = rest[open..].find(')').ok_or_else(invalid)? + open;
        let name = rest[..open].trim();
        let args: Vec<&str> = rest[open + 1..close]
            .split(',')
            .flat_map(str::split_whitespace)
            .collect();
        ops.push(parse_op(name, &args).ok_or_else(invalid)?);
        rest = &rest[close + 1..];
    }

    Ok(ops)
}

fn parse_op(name: &str, args: &[&str]) -> Option<Op> {
    match (name, args) {
        ("translate", [x]) => Some(Op::Translate(length(x)?, 0.0)),
        ("translate", [x, y]) => Some(Op::Translate(length(x)?, length(y)?)),
        ("translateX", [x]) => Some(Op::Translate(length(x)?, 0.0)),
        ("translateY", [y]) => Some(Op::Translate(0.0, length(y)?)),
        ("rotate", [angle]) => Some(Op::Rotate(degrees(angle)?)),
        ("scale", [s]) => {
            let s = number(s)?;
            Some(Op::Scale(s, s))
        }
        ("scale", [sx, sy]) => Some(Op::Scale(number(sx)?, number(sy)?)),
        ("scaleX", [sx]) => Some(Op::Scale(number(sx)?, 1.0)),
        ("scaleY", [sy]) => Some(Op::Scale(1.0, number(sy)?)),
        ("matrix", [a, b, c, d, e, f]) => Some(Op::Matrix(Affine {
            a: number(a)?,
            b: number(b)?,
            c: number(c)?,
            d: number(d)?,
            e: number(e)?,
            f: number(f)?,
        })),
        _ => None,
    }
}

fn number(token: &str) -> Option<f64> {
    token.parse().ok()
}

fn length(token: &str) -> Option<f64> {
    number(token.strip_suffix("px").unwrap_or(token))
}

fn degrees(token: &str) -> Option<f64> {
    if let Some(value) = token.strip_suffix("deg") {
        number(value)
    } else if let Some(value) = token.strip_suffix("grad") {
        number(value).map(|g| g * 0.9)
    } else if let Some(value) = token.strip_suffix("rad") {
        number(value).map(f64::to_degrees)
    } else if let Some(value) = token.strip_suffix("turn") {
        number(value).map(|t| t * 360.0)
    } else {
        // Unitless zero is the only bare angle CSS accepts.
        number(token).filter(|v| *v == 0.0)
    }
}
