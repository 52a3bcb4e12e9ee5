//! Pure 4×4 affine matrix helpers. No Value types, no errors.
//! Row-major storage: element at (row, col) = data[row * 4 + col].
//!
//! Used by `types/geometry.rs` to compose and apply transforms.

pub type M4 = [f64; 16];

pub fn m4_identity() -> M4 {
    [1., 0., 0., 0.,
     0., 1., 0., 0.,
     0., 0., 1., 0.,
     0., 0., 0., 1.]
}

pub fn m4_mul(a: &M4, b: &M4) -> M4 {
    let mut c = [0.0f64; 16];
    for i in 0..4 {
        for j in 0..4 {
            for k in 0..4 {
                c[i * 4 + j] += a[i * 4 + k] * b[k * 4 + j];
            }
        }
    }
    c
}

/// Transform a point (implicit w = 1).
pub fn m4_mul_point(m: &M4, (x, y, z): (f64, f64, f64)) -> (f64, f64, f64) {
    (
        m[ 0]*x + m[ 1]*y + m[ 2]*z + m[ 3],
        m[ 4]*x + m[ 5]*y + m[ 6]*z + m[ 7],
        m[ 8]*x + m[ 9]*y + m[10]*z + m[11],
    )
}

// ─── Constructors ─────────────────────────────────────────────────────────────

pub fn m4_translate(tx: f64, ty: f64, tz: f64) -> M4 {
    [1., 0., 0., tx,
     0., 1., 0., ty,
     0., 0., 1., tz,
     0., 0., 0., 1.]
}

pub fn m4_scale_xyz(sx: f64, sy: f64, sz: f64) -> M4 {
    [sx,  0.,  0.,  0.,
     0.,  sy,  0.,  0.,
     0.,  0.,  sz,  0.,
     0.,  0.,  0.,  1.]
}

pub fn m4_rotate_x(angle: f64) -> M4 {
    let (s, c) = angle.sin_cos();
    [1., 0.,  0., 0.,
     0., c,  -s,  0.,
     0., s,   c,  0.,
     0., 0.,  0., 1.]
}

pub fn m4_rotate_y(angle: f64) -> M4 {
    let (s, c) = angle.sin_cos();
    [ c,  0., s,  0.,
      0., 1., 0., 0.,
     -s,  0., c,  0.,
      0., 0., 0., 1.]
}

pub fn m4_rotate_z(angle: f64) -> M4 {
    let (s, c) = angle.sin_cos();
    [c, -s,  0., 0.,
     s,  c,  0., 0.,
     0., 0., 1., 0.,
     0., 0., 0., 1.]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn translate_then_scale_applies_scale_first() {
        let m = m4_mul(&m4_translate(1.0, 2.0, 3.0), &m4_scale_xyz(2.0, 2.0, 2.0));
        assert_eq!(m4_mul_point(&m, (1.0, 1.0, 1.0)), (3.0, 4.0, 5.0));
    }

    #[test]
    fn identity_is_neutral() {
        let t = m4_translate(4.0, 5.0, 6.0);
        assert_eq!(m4_mul(&m4_identity(), &t), t);
        assert_eq!(t[3], 4.0);
    }
}
