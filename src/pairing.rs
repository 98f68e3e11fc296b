//! The Tate pairing on supersingular Type-1 curves.
//!
//! The pairing takes two points of `E(F_p)`: the second argument is pushed
//! into `E(F_p²)` through the distortion map `(x, y) -> (ζ·x, y)`, where ζ is
//! a primitive cube root of unity of F_p². Miller's algorithm then walks the
//! bits of the subgroup order, evaluating tangent, chord, and vertical
//! divisors at the distorted point, and the final exponentiation by
//! `(p² - 1) / q` maps the result into the order-q subgroup of F_p²*.

use num_bigint::BigUint;
use num_traits::Zero;

use crate::arith::{mod_inv, sqrt_mod};
use crate::complex::Complex;
use crate::curve::{AffinePoint, ComplexAffinePoint, EllipticCurve};
use crate::error::{Error, Result};

/// A primitive cube root of unity in F_p²: `ζ = (-1 + √3·i) / 2`.
///
/// For `p = 11 (mod 12)` the element 3 is a quadratic residue while no cube
/// root of unity exists in F_p itself, so ζ always lands in a proper
/// extension element.
fn cube_root_of_unity(p: &BigUint) -> Result<Complex> {
    let sqrt3 = sqrt_mod(&BigUint::from(3u32), p).ok_or(Error::PairingDegenerate)?;
    let half = mod_inv(&BigUint::from(2u32), p)?;
    Ok(Complex::new(
        ((p - 1u32) * &half) % p,
        (sqrt3 * half) % p,
    ))
}

/// The distortion map `(x, y) -> (ζ·x, y)` from `E(F_p)` into `E(F_p²)`.
pub fn distortion_map(point: &AffinePoint, ec: &EllipticCurve) -> Result<ComplexAffinePoint> {
    let (x, y) = match point.xy() {
        None => return Ok(ComplexAffinePoint::Infinity),
        Some(xy) => xy,
    };
    let zeta = cube_root_of_unity(&ec.p)?;
    Ok(ComplexAffinePoint::new(
        zeta.scale(x, &ec.p),
        Complex::from_real(y.clone()),
    ))
}

/// The vertical line through `a`, evaluated at `b`: `b.x - a.x`.
pub fn eval_vertical(
    a: &AffinePoint,
    b: &ComplexAffinePoint,
    ec: &EllipticCurve,
) -> Result<Complex> {
    let (ax, _) = a.xy().ok_or(Error::PairingDegenerate)?;
    let (bx, _) = b.xy().ok_or(Error::PairingDegenerate)?;
    Ok(bx.sub(&Complex::from_real(ax.clone()), &ec.p))
}

/// The tangent at `a`, evaluated at `b`: `b.y - a.y - m·(b.x - a.x)` with
/// `m = (3·a.x² + A) / (2·a.y)`.
pub fn eval_tangent(
    a: &AffinePoint,
    b: &ComplexAffinePoint,
    ec: &EllipticCurve,
) -> Result<Complex> {
    let p = &ec.p;
    let (ax, ay) = a.xy().ok_or(Error::PairingDegenerate)?;
    if ay.is_zero() {
        return Err(Error::PairingDegenerate);
    }
    let (bx, by) = b.xy().ok_or(Error::PairingDegenerate)?;

    let numerator = ((ax * ax) * 3u32 + &ec.a) % p;
    let slope = (numerator * mod_inv(&((ay * 2u32) % p), p)?) % p;

    let dx = bx.sub(&Complex::from_real(ax.clone()), p);
    let dy = by.sub(&Complex::from_real(ay.clone()), p);
    Ok(dy.sub(&dx.scale(&slope, p), p))
}

/// The line through `a` and `a2`, evaluated at `b`.
///
/// Falls back to the tangent when `a = a2` and to the vertical when the two
/// points mirror each other (or one of them is the point at infinity).
pub fn eval_line(
    a: &AffinePoint,
    a2: &AffinePoint,
    b: &ComplexAffinePoint,
    ec: &EllipticCurve,
) -> Result<Complex> {
    let p = &ec.p;
    let (ax, ay) = match a.xy() {
        None => return eval_vertical(a2, b, ec),
        Some(xy) => xy,
    };
    let (a2x, a2y) = match a2.xy() {
        None => return eval_vertical(a, b, ec),
        Some(xy) => xy,
    };
    if a == a2 {
        return eval_tangent(a, b, ec);
    }
    if ax == a2x {
        return eval_vertical(a, b, ec);
    }
    let (bx, by) = b.xy().ok_or(Error::PairingDegenerate)?;

    let numerator = crate::arith::sub_mod(a2y, ay, p);
    let slope = (numerator * mod_inv(&crate::arith::sub_mod(a2x, ax, p), p)?) % p;

    let dx = bx.sub(&Complex::from_real(ax.clone()), p);
    let dy = by.sub(&Complex::from_real(ay.clone()), p);
    Ok(dy.sub(&dx.scale(&slope, p), p))
}

/// `f / v`, where `v` is the vertical through `point` — or `f` unchanged when
/// `point` is the point at infinity, whose vertical divisor is trivial.
fn divide_by_vertical(
    f: &Complex,
    point: &AffinePoint,
    b: &ComplexAffinePoint,
    ec: &EllipticCurve,
) -> Result<Complex> {
    if point.is_infinity() {
        return Ok(f.clone());
    }
    let vertical = eval_vertical(point, b, ec)?;
    let inverse = vertical
        .inverse(&ec.p)
        .map_err(|_| Error::PairingDegenerate)?;
    Ok(f.mul(&inverse, &ec.p))
}

fn miller(
    a: &AffinePoint,
    b: &ComplexAffinePoint,
    subgroup_order: &BigUint,
    ec: &EllipticCurve,
) -> Result<Complex> {
    let p = &ec.p;
    let mut f = Complex::one();
    let mut t = a.clone();

    let bits = subgroup_order.bits();
    for i in (0..bits - 1).rev() {
        let tangent = eval_tangent(&t, b, ec)?;
        let doubled = t.double(ec)?;
        f = f.mul(&f, p).mul(&tangent, p);
        f = divide_by_vertical(&f, &doubled, b, ec)?;
        t = doubled;

        if subgroup_order.bit(i) {
            if t.is_infinity() {
                return Err(Error::PairingDegenerate);
            }
            let line = eval_line(&t, a, b, ec)?;
            let sum = t.add(a, ec)?;
            f = f.mul(&line, p);
            f = divide_by_vertical(&f, &sum, b, ec)?;
            t = sum;
        }

        if t.is_infinity() && i > 0 {
            return Err(Error::PairingDegenerate);
        }
    }
    Ok(f)
}

/// Computes the reduced Tate pairing `e(a, φ(b))` of two points of `E(F_p)`.
///
/// `a` must lie in the order-`subgroup_order` subgroup; `b` is distorted into
/// `E(F_p²)` internally. Degenerate configurations (points at infinity,
/// vanishing divisor denominators, the accumulator collapsing mid-loop)
/// surface as [`Error::PairingDegenerate`].
pub fn pairing(
    a: &AffinePoint,
    b: &AffinePoint,
    subgroup_order: &BigUint,
    ec: &EllipticCurve,
) -> Result<Complex> {
    if a.is_infinity() || b.is_infinity() {
        return Err(Error::PairingDegenerate);
    }
    let distorted = distortion_map(b, ec)?;
    let f = miller(a, &distorted, subgroup_order, ec)?;

    // final exponentiation: f^((p² - 1) / q)
    let p = &ec.p;
    let exponent = (p * p - 1u32) / subgroup_order;
    let result = f.pow(&exponent, p);
    if result.is_zero() {
        return Err(Error::PairingDegenerate);
    }
    Ok(result)
}
