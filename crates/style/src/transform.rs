//! CSS `transform` values as 2D affine matrices.

use core::f32::consts::{PI, TAU};
use cssparser::{CowRcStr, ParseError, Parser, ParserInput, Token};
use dom::Bounds;
use serde::Serialize;

/// A 2D affine transform `[a, b, c, d, e, f]`, mapping `(x, y)` to
/// `(a*x + c*y + e, b*x + d*y + f)`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Transform {
    pub matrix: [f32; 6],
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

type TransformResult<'input, T> = Result<T, ParseError<'input, ()>>;

impl Transform {
    pub const IDENTITY: Self = Self {
        matrix: [1.0, 0.0, 0.0, 1.0, 0.0, 0.0],
    };

    #[inline]
    #[must_use]
    pub const fn translate(x: f32, y: f32) -> Self {
        Self {
            matrix: [1.0, 0.0, 0.0, 1.0, x, y],
        }
    }

    #[inline]
    #[must_use]
    pub const fn scale(x: f32, y: f32) -> Self {
        Self {
            matrix: [x, 0.0, 0.0, y, 0.0, 0.0],
        }
    }

    #[must_use]
    pub fn rotate(radians: f32) -> Self {
        let (sin, cos) = radians.sin_cos();
        Self {
            matrix: [cos, sin, -sin, cos, 0.0, 0.0],
        }
    }

    #[must_use]
    pub fn skew(x_radians: f32, y_radians: f32) -> Self {
        Self {
            matrix: [1.0, y_radians.tan(), x_radians.tan(), 1.0, 0.0, 0.0],
        }
    }

    /// `self` applied after `other`, the composition order of a CSS transform list.
    #[must_use]
    pub fn multiply(self, other: Self) -> Self {
        let [a1, b1, c1, d1, e1, f1] = self.matrix;
        let [a2, b2, c2, d2, e2, f2] = other.matrix;
        Self {
            matrix: [
                a1.mul_add(a2, c1 * b2),
                b1.mul_add(a2, d1 * b2),
                a1.mul_add(c2, c1 * d2),
                b1.mul_add(c2, d1 * d2),
                a1.mul_add(e2, c1.mul_add(f2, e1)),
                b1.mul_add(e2, d1.mul_add(f2, f1)),
            ],
        }
    }

    #[must_use]
    pub fn apply(self, x: f32, y: f32) -> (f32, f32) {
        let [xx, yx, xy, yy, tx, ty] = self.matrix;
        (xx.mul_add(x, xy.mul_add(y, tx)), yx.mul_add(x, yy.mul_add(y, ty)))
    }

    /// Axis-aligned bounding box of `rect` transformed around its center
    /// (the default `transform-origin: 50% 50%`).
    #[must_use]
    pub fn transform_rect(self, rect: Bounds) -> Bounds {
        let (center_x, center_y) = rect.center();
        let half_width = rect.width / 2.0;
        let half_height = rect.height / 2.0;
        let corners = [
            self.apply(-half_width, -half_height),
            self.apply(half_width, -half_height),
            self.apply(half_width, half_height),
            self.apply(-half_width, half_height),
        ];
        let mut min = (f32::INFINITY, f32::INFINITY);
        let mut max = (f32::NEG_INFINITY, f32::NEG_INFINITY);
        for (x, y) in corners {
            min = (min.0.min(x), min.1.min(y));
            max = (max.0.max(x), max.1.max(y));
        }
        Bounds::new(
            center_x + min.0,
            center_y + min.1,
            max.0 - min.0,
            max.1 - min.1,
        )
    }
}

/// Parse a `transform` value. `Ok(None)` is `none`.
///
/// # Errors
/// Returns the cssparser error (converted to its message) for unsupported functions
/// or malformed arguments.
pub fn parse_transform(value: &str) -> Result<Option<Transform>, String> {
    let mut input = ParserInput::new(value);
    let mut parser = Parser::new(&mut input);
    parse_transform_list(&mut parser).map_err(|err| format!("{:?}", err.kind))
}

fn parse_transform_list<'input>(
    parser: &mut Parser<'input, '_>,
) -> TransformResult<'input, Option<Transform>> {
    if parser
        .try_parse(|input| input.expect_ident_matching("none"))
        .is_ok()
    {
        parser.expect_exhausted()?;
        return Ok(None);
    }
    let mut transform = Transform::IDENTITY;
    loop {
        let name = parser.expect_function()?.clone();
        let step = parser.parse_nested_block(|args| parse_function(&name, args))?;
        transform = transform.multiply(step);
        if parser.is_exhausted() {
            return Ok(Some(transform));
        }
    }
}

fn parse_function<'input>(
    name: &CowRcStr<'input>,
    args: &mut Parser<'input, '_>,
) -> TransformResult<'input, Transform> {
    let lower = name.to_ascii_lowercase();
    let transform = match lower.as_str() {
        "matrix" => {
            let mut matrix = [0.0f32; 6];
            for (index, slot) in matrix.iter_mut().enumerate() {
                if index > 0 {
                    args.expect_comma()?;
                }
                *slot = args.expect_number()?;
            }
            Transform { matrix }
        }
        "translate" => {
            let x = parse_length(args)?;
            let y = if args.try_parse(|input| input.expect_comma()).is_ok() {
                parse_length(args)?
            } else {
                0.0
            };
            Transform::translate(x, y)
        }
        "translatex" => Transform::translate(parse_length(args)?, 0.0),
        "translatey" => Transform::translate(0.0, parse_length(args)?),
        "scale" => {
            let x = args.expect_number()?;
            let y = if args.try_parse(|input| input.expect_comma()).is_ok() {
                args.expect_number()?
            } else {
                x
            };
            Transform::scale(x, y)
        }
        "scalex" => Transform::scale(args.expect_number()?, 1.0),
        "scaley" => Transform::scale(1.0, args.expect_number()?),
        "rotate" => Transform::rotate(parse_angle(args)?),
        "skew" => {
            let x = parse_angle(args)?;
            let y = if args.try_parse(|input| input.expect_comma()).is_ok() {
                parse_angle(args)?
            } else {
                0.0
            };
            Transform::skew(x, y)
        }
        "skewx" => Transform::skew(parse_angle(args)?, 0.0),
        "skewy" => Transform::skew(0.0, parse_angle(args)?),
        _ => return Err(args.new_unexpected_token_error(Token::Function(name.clone()))),
    };
    args.expect_exhausted()?;
    Ok(transform)
}

/// `<length>` in px, or unitless zero.
fn parse_length<'input>(args: &mut Parser<'input, '_>) -> TransformResult<'input, f32> {
    let location = args.current_source_location();
    match *args.next()? {
        Token::Dimension {
            value, ref unit, ..
        } if unit.eq_ignore_ascii_case("px") => Ok(value),
        Token::Number { value: 0.0, .. } => Ok(0.0),
        ref token => Err(location.new_unexpected_token_error(token.clone())),
    }
}

/// `<angle>` converted to radians, or unitless zero.
fn parse_angle<'input>(args: &mut Parser<'input, '_>) -> TransformResult<'input, f32> {
    let location = args.current_source_location();
    match *args.next()? {
        Token::Dimension {
            value, ref unit, ..
        } => {
            let lower = unit.to_ascii_lowercase();
            match lower.as_str() {
                "deg" => Ok(value.to_radians()),
                "rad" => Ok(value),
                "grad" => Ok(value * PI / 200.0),
                "turn" => Ok(value * TAU),
                _ => Err(location.new_unexpected_token_error(Token::Dimension {
                    has_sign: false,
                    value,
                    int_value: None,
                    unit: unit.clone(),
                })),
            }
        }
        Token::Number { value: 0.0, .. } => Ok(0.0),
        ref token => Err(location.new_unexpected_token_error(token.clone())),
    }
}
