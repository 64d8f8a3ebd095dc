use nalgebra::{Matrix2, Vector2};

use crate::{
    datatypes::{NotchParameters, NotchShape, PlateGeometry, SketchPrimitive, Vertex},
    error::NotchplateError,
};

/// Finds the center of the circle through three points
///
/// Solves the 2x2 system formed by the perpendicular bisector equations.
/// Returns None when the points are collinear.
fn circumcenter(a: Vertex, b: Vertex, c: Vertex) -> Option<Vertex> {
    let m = Matrix2::new(
        2.0 * (b.x - a.x),
        2.0 * (b.y - a.y),
        2.0 * (c.x - a.x),
        2.0 * (c.y - a.y),
    );
    let rhs = Vector2::new(
        b.x * b.x - a.x * a.x + b.y * b.y - a.y * a.y,
        c.x * c.x - a.x * a.x + c.y * c.y - a.y * a.y,
    );

    m.lu().solve(&rhs).map(|center| Vertex {
        x: center[0],
        y: center[1],
    })
}

fn invalid(message: String) -> NotchplateError {
    NotchplateError::InvalidGeometry(message)
}

/// Validates raw plate dimensions against the selected notch shape
///
/// Checks run in a fixed order and fail on the first violated constraint.
/// For the radius arc variant, the returned parameters carry `xa` and `ye`
/// overwritten with the radius.
///
/// # Arguments
/// * `plate` - The raw plate dimensions
/// * `shape` - The selected notch shape
///
/// # Returns
/// A validated NotchParameters instance
pub fn validate(
    plate: &PlateGeometry,
    shape: &NotchShape,
) -> Result<NotchParameters, NotchplateError> {
    let PlateGeometry {
        b,
        h,
        b0,
        h0,
        mut xa,
        mut ye,
    } = *plate;

    if b == 0.0 {
        return Err(invalid("enter valid values for b".to_string()));
    }
    if h == 0.0 {
        return Err(invalid("enter valid values for h".to_string()));
    }
    if b0 >= b {
        return Err(invalid("b0 is equal to or bigger than given value b".to_string()));
    }
    if h0 >= h {
        return Err(invalid("h0 is equal to or bigger than given value h".to_string()));
    }

    match shape {
        NotchShape::Spline { .. } => {
            if b - b0 < xa {
                return Err(invalid("b-b0 is too short for given value xa".to_string()));
            }
            if h - h0 < ye {
                return Err(invalid("h-h0 is too short for given value ye".to_string()));
            }
        }
        NotchShape::ArcRadius { r } => {
            if *r < xa {
                return Err(invalid("r is too short for given value xa".to_string()));
            }
            if *r > b - b0 {
                return Err(invalid(
                    "r is too long to fit between given values of b-b0".to_string(),
                ));
            }
            if *r > h - h0 {
                return Err(invalid(
                    "r is too long to fit between given values of h-h0".to_string(),
                ));
            }
            // the arc spans a quarter circle around the notch corner, so the
            // corner itself moves out to the radius
            xa = *r;
            ye = *r;
        }
        NotchShape::ArcThreePoint { mid } => {
            if b - b0 < xa {
                return Err(invalid("b-b0 is too short for given value xa".to_string()));
            }
            if h - h0 < ye {
                return Err(invalid("h-h0 is too short for given value ye".to_string()));
            }
            if mid.x >= xa {
                return Err(invalid("x1 must be smaller than xa".to_string()));
            }
            if mid.y >= ye {
                return Err(invalid("y1 must be smaller than ye".to_string()));
            }
            if circumcenter(Vertex { x: xa, y: 0.0 }, Vertex { x: 0.0, y: ye }, *mid).is_none() {
                return Err(invalid(
                    "arc points are collinear; no arc passes through them".to_string(),
                ));
            }
        }
        NotchShape::Angle { corner } => {
            if b - b0 < xa {
                return Err(invalid("b-b0 is too short for given value xa".to_string()));
            }
            if h - h0 < ye {
                return Err(invalid("h-h0 is too short for given value ye".to_string()));
            }
            if corner.x >= xa {
                return Err(invalid("x1 must be smaller than xa".to_string()));
            }
            if corner.y >= ye {
                return Err(invalid("y1 must be smaller than ye".to_string()));
            }
        }
    }

    Ok(NotchParameters {
        b,
        h,
        b0,
        h0,
        xa,
        ye,
        shape: *shape,
    })
}

/// Builds the plate outline as an ordered list of sketch primitives
///
/// The outer boundary is always six straight segments forming a bracket open
/// at the notch corner; the notch is closed by shape-specific primitives.
///
/// # Arguments
/// * `params` - Validated notch parameters
///
/// # Returns
/// An ordered vector of SketchPrimitive instances
pub fn build_sketch(params: &NotchParameters) -> Vec<SketchPrimitive> {
    let NotchParameters {
        b,
        h,
        b0,
        h0,
        xa,
        ye,
        shape,
    } = *params;

    let notch_start = Vertex { x: xa, y: 0.0 };
    let notch_end = Vertex { x: 0.0, y: ye };

    let corners = [
        notch_start,
        Vertex { x: b - b0, y: 0.0 },
        Vertex { x: b - b0, y: -h0 },
        Vertex { x: -b0, y: -h0 },
        Vertex { x: -b0, y: h - h0 },
        Vertex { x: 0.0, y: h - h0 },
        notch_end,
    ];

    let mut primitives: Vec<SketchPrimitive> = corners
        .windows(2)
        .map(|pair| SketchPrimitive::Line {
            p1: pair[0],
            p2: pair[1],
        })
        .collect();

    match shape {
        NotchShape::Angle { corner } => {
            primitives.push(SketchPrimitive::Line {
                p1: notch_start,
                p2: corner,
            });
            primitives.push(SketchPrimitive::Line {
                p1: corner,
                p2: notch_end,
            });
        }
        NotchShape::ArcThreePoint { mid } => {
            primitives.push(SketchPrimitive::ArcThreePoints {
                start: notch_start,
                end: notch_end,
                mid,
            });
        }
        NotchShape::ArcRadius { .. } => {
            primitives.push(SketchPrimitive::ArcCenterEnds {
                center: Vertex { x: xa, y: ye },
                start: notch_start,
                end: notch_end,
                clockwise: true,
            });
        }
        NotchShape::Spline { c1, c2 } => {
            primitives.push(SketchPrimitive::Spline {
                points: vec![notch_start, c1, c2, notch_end],
            });
        }
    }

    primitives
}
