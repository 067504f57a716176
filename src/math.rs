/// Clamps `value` into `[min, max]`.
///
/// Unlike `f64::clamp` this never panics: when `min > max` the upper bound wins,
/// which is what an unbounded `max_radius` of `f64::INFINITY` and friends expect.
pub fn clamp(value: f64, min: f64, max: f64) -> f64 {
    value.max(min).min(max)
}

/// Maps any angle in degrees into `[0, 360)`.
pub fn normalize_angle(deg: f64) -> f64 {
    ((deg % 360.0) + 360.0) % 360.0
}

/// Maps any angle in degrees into `(-180, 180]`.
pub fn wrap_angle_signed(deg: f64) -> f64 {
    let wrapped = normalize_angle(deg + 180.0) - 180.0;
    if wrapped <= -180.0 {
        wrapped + 360.0
    } else {
        wrapped
    }
}

/// Rotation about the X axis, CSS `rotateX` convention (y points down).
pub fn rotation_x(deg: f64) -> [[f64; 3]; 3] {
    let (sin, cos) = deg.to_radians().sin_cos();
    [[1.0, 0.0, 0.0], [0.0, cos, -sin], [0.0, sin, cos]]
}

/// Rotation about the Y axis, CSS `rotateY` convention.
pub fn rotation_y(deg: f64) -> [[f64; 3]; 3] {
    let (sin, cos) = deg.to_radians().sin_cos();
    [[cos, 0.0, sin], [0.0, 1.0, 0.0], [-sin, 0.0, cos]]
}

fn dot(a: &[f64; 3], b: &[f64; 3]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

/// `matrix · vector`, column-vector convention.
pub fn multiply_matrix_vector(matrix: &[[f64; 3]; 3], vector: &[f64; 3]) -> [f64; 3] {
    matrix.map(|row| dot(&row, vector))
}

/// `a · b`; applied to a vector, `b` acts first.
pub fn multiply_matrices(a: &[[f64; 3]; 3], b: &[[f64; 3]; 3]) -> [[f64; 3]; 3] {
    std::array::from_fn(|i| std::array::from_fn(|j| (0..3).map(|k| a[i][k] * b[k][j]).sum()))
}

/// Twice the signed area of `a, b, c`. Zero when `c` lies on the line `ab`;
/// the sign says which side it is on.
pub fn edge_function(a: &[f64; 2], b: &[f64; 2], c: &[f64; 2]) -> f64 {
    (c[0] - a[0]) * (b[1] - a[1]) - (c[1] - a[1]) * (b[0] - a[0])
}

/// Tests whether `p` lies inside triangle `abc`, regardless of winding.
pub fn point_in_triangle(p: [f64; 2], a: [f64; 2], b: [f64; 2], c: [f64; 2]) -> bool {
    let w0 = edge_function(&b, &c, &p);
    let w1 = edge_function(&c, &a, &p);
    let w2 = edge_function(&a, &b, &p);
    (w0 >= 0.0 && w1 >= 0.0 && w2 >= 0.0) || (w0 <= 0.0 && w1 <= 0.0 && w2 <= 0.0)
}

/// Brightness of a surface at `position` facing `normal`, lit from `light_pos`.
///
/// Never drops below an ambient 0.25. A light sitting on the surface counts as full.
pub fn calculate_light_intensity(normal: &[f64; 3], position: &[f64; 3], light_pos: &[f64; 3]) -> f64 {
    let to_light = [
        light_pos[0] - position[0],
        light_pos[1] - position[1],
        light_pos[2] - position[2],
    ];
    let distance = dot(&to_light, &to_light).sqrt();
    if distance == 0.0 {
        return 1.0;
    }
    (dot(normal, &to_light) / distance).max(AMBIENT)
}

const AMBIENT: f64 = 0.25;
