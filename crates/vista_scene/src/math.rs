// SPDX-License-Identifier: MIT OR Apache-2.0
//! Small vector helpers on plain arrays.

/// Row-major identity rotation
pub(crate) const IDENTITY: [[f32; 3]; 3] = [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]];

/// Default viewing direction (down -Z)
pub(crate) const FORWARD: [f32; 3] = [0.0, 0.0, -1.0];

const EPSILON: f32 = 1.0e-6;

pub(crate) fn sub(a: [f32; 3], b: [f32; 3]) -> [f32; 3] {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

pub(crate) fn length(v: [f32; 3]) -> f32 {
    (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt()
}

/// Unit vector, or `None` for a (near) zero vector
pub(crate) fn normalize(v: [f32; 3]) -> Option<[f32; 3]> {
    let len = length(v);
    if len > EPSILON {
        Some([v[0] / len, v[1] / len, v[2] / len])
    } else {
        None
    }
}

/// Unit vector pointing from `from` towards `to`
pub(crate) fn direction(from: [f32; 3], to: [f32; 3]) -> Option<[f32; 3]> {
    normalize(sub(to, from))
}

pub(crate) fn mat3_mul_vec(m: &[[f32; 3]; 3], v: [f32; 3]) -> [f32; 3] {
    [
        m[0][0] * v[0] + m[0][1] * v[1] + m[0][2] * v[2],
        m[1][0] * v[0] + m[1][1] * v[1] + m[1][2] * v[2],
        m[2][0] * v[0] + m[2][1] * v[1] + m[2][2] * v[2],
    ]
}

fn mat3_mul(a: &[[f32; 3]; 3], b: &[[f32; 3]; 3]) -> [[f32; 3]; 3] {
    let mut result = [[0.0; 3]; 3];
    for i in 0..3 {
        for j in 0..3 {
            for k in 0..3 {
                result[i][j] += a[i][k] * b[k][j];
            }
        }
    }
    result
}

/// Rotation matrix from Euler angles in degrees, applied X then Y then Z
pub(crate) fn euler_degrees(angles: [f32; 3]) -> [[f32; 3]; 3] {
    let (sx, cx) = angles[0].to_radians().sin_cos();
    let (sy, cy) = angles[1].to_radians().sin_cos();
    let (sz, cz) = angles[2].to_radians().sin_cos();

    let rx = [[1.0, 0.0, 0.0], [0.0, cx, -sx], [0.0, sx, cx]];
    let ry = [[cy, 0.0, sy], [0.0, 1.0, 0.0], [-sy, 0.0, cy]];
    let rz = [[cz, -sz, 0.0], [sz, cz, 0.0], [0.0, 0.0, 1.0]];

    mat3_mul(&rz, &mat3_mul(&ry, &rx))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: [f32; 3], b: [f32; 3]) -> bool {
        a.iter().zip(b.iter()).all(|(x, y)| (x - y).abs() < 1.0e-5)
    }

    #[test]
    fn test_direction_is_unit_length() {
        let d = direction([3.0, 2.0, 2.0], [0.0, 0.0, 0.0]).unwrap();
        assert!((length(d) - 1.0).abs() < 1.0e-6);
        assert!(direction([1.0, 1.0, 1.0], [1.0, 1.0, 1.0]).is_none());
    }

    #[test]
    fn test_euler_yaw_turns_forward() {
        let m = euler_degrees([0.0, 90.0, 0.0]);
        assert!(approx(mat3_mul_vec(&m, FORWARD), [-1.0, 0.0, 0.0]));
    }

    #[test]
    fn test_zero_euler_is_identity() {
        assert_eq!(euler_degrees([0.0, 0.0, 0.0]), IDENTITY);
    }
}
