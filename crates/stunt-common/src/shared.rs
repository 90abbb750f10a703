// shared.rs — math and token parsing shared across the workspace

pub const PITCH: usize = 0; // up / down
pub const YAW: usize = 1; // left / right
pub const ROLL: usize = 2; // fall over

pub type Vec3 = [f32; 3];

// ============================================================
// Print levels
// ============================================================

pub const PRINT_LOW: i32 = 0;
pub const PRINT_MEDIUM: i32 = 1;
pub const PRINT_HIGH: i32 = 2;
pub const PRINT_CHAT: i32 = 3;

// ============================================================
// Vector operations
// ============================================================

#[inline]
pub fn vector_subtract(a: &Vec3, b: &Vec3) -> Vec3 {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

#[inline]
pub fn vector_length(v: &Vec3) -> f32 {
    (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt()
}

/// Horizontal length, ignoring the z component.
#[inline]
pub fn vector_length_2d(v: &Vec3) -> f32 {
    (v[0] * v[0] + v[1] * v[1]).sqrt()
}

/// veca + scale * vecb
#[inline]
pub fn vector_ma(veca: &Vec3, scale: f32, vecb: &Vec3) -> Vec3 {
    [
        veca[0] + scale * vecb[0],
        veca[1] + scale * vecb[1],
        veca[2] + scale * vecb[2],
    ]
}

// ============================================================
// Angle functions
// ============================================================

pub fn angle_vectors(
    angles: &Vec3,
    forward: Option<&mut Vec3>,
    right: Option<&mut Vec3>,
    up: Option<&mut Vec3>,
) {
    let angle_yaw = angles[YAW].to_radians();
    let sy = angle_yaw.sin();
    let cy = angle_yaw.cos();

    let angle_pitch = angles[PITCH].to_radians();
    let sp = angle_pitch.sin();
    let cp = angle_pitch.cos();

    let angle_roll = angles[ROLL].to_radians();
    let sr = angle_roll.sin();
    let cr = angle_roll.cos();

    if let Some(fwd) = forward {
        fwd[0] = cp * cy;
        fwd[1] = cp * sy;
        fwd[2] = -sp;
    }
    if let Some(r) = right {
        r[0] = -sr * sp * cy + -cr * -sy;
        r[1] = -sr * sp * sy + -cr * cy;
        r[2] = -sr * cp;
    }
    if let Some(u) = up {
        u[0] = cr * sp * cy + -sr * -sy;
        u[1] = cr * sp * sy + -sr * cy;
        u[2] = cr * cp;
    }
}

/// Folds an angle into the -180..=180 range.
#[inline]
pub fn angle_normalize(angle: f32) -> f32 {
    let mut angle = angle % 360.0;
    if angle > 180.0 {
        angle -= 360.0;
    }
    if angle < -180.0 {
        angle += 360.0;
    }
    angle
}

/// Snaps a yaw angle to the nearest 45 degree step, sign preserved.
pub fn snap_yaw_to(value: f32) -> f32 {
    let sign = if value < 0.0 { -1.0 } else { 1.0 };
    let mag = value.abs();

    let snapped = if mag < 23.0 {
        0.0
    } else if mag < 67.0 {
        45.0
    } else if mag < 113.0 {
        90.0
    } else if mag < 157.0 {
        135.0
    } else {
        180.0
    };

    snapped * sign
}

// ============================================================
// Token parser (COM_Parse equivalent)
// ============================================================

pub const MAX_TOKEN_CHARS: usize = 128;

/// Parse one whitespace-delimited token from `data`, handling // comments
/// and "quoted strings". Returns `(token, remaining)` or `(token, None)`
/// if end of data.
pub fn com_parse(data: &str) -> (String, Option<&str>) {
    let mut chars = data.as_bytes();
    let mut token = String::new();

    // skip whitespace
    loop {
        while !chars.is_empty() && chars[0] <= b' ' {
            if chars[0] == 0 {
                return (String::new(), None);
            }
            chars = &chars[1..];
        }
        if chars.is_empty() {
            return (String::new(), None);
        }

        // skip // comments
        if chars.len() >= 2 && chars[0] == b'/' && chars[1] == b'/' {
            while !chars.is_empty() && chars[0] != b'\n' {
                chars = &chars[1..];
            }
            continue;
        }
        break;
    }

    // handle quoted strings
    if chars[0] == b'"' {
        chars = &chars[1..];
        while !chars.is_empty() && chars[0] != b'"' {
            if token.len() < MAX_TOKEN_CHARS {
                token.push(chars[0] as char);
            }
            chars = &chars[1..];
        }
        if !chars.is_empty() {
            chars = &chars[1..]; // skip closing quote
        }
        let offset = data.len() - chars.len();
        let remaining = if chars.is_empty() {
            None
        } else {
            Some(&data[offset..])
        };
        return (token, remaining);
    }

    // parse regular word
    while !chars.is_empty() && chars[0] > b' ' {
        if token.len() < MAX_TOKEN_CHARS {
            token.push(chars[0] as char);
        }
        chars = &chars[1..];
    }
    if token.len() >= MAX_TOKEN_CHARS {
        token.clear();
    }

    let offset = data.len() - chars.len();
    let remaining = if chars.is_empty() {
        None
    } else {
        Some(&data[offset..])
    };
    (token, remaining)
}

// ============================================================
// Tests
// ============================================================

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 0.0001;

    // ============================================================
    // Vector math tests
    // ============================================================

    #[test]
    fn test_vector_subtract() {
        let a = [5.0, 3.0, 1.0];
        let b = [1.0, 1.0, 1.0];
        assert_eq!(vector_subtract(&a, &b), [4.0, 2.0, 0.0]);
    }

    #[test]
    fn test_vector_length() {
        assert!((vector_length(&[3.0, 4.0, 0.0]) - 5.0).abs() < EPSILON);
        assert!((vector_length(&[0.0, 0.0, 0.0])).abs() < EPSILON);
    }

    #[test]
    fn test_vector_length_2d_ignores_z() {
        assert!((vector_length_2d(&[3.0, 4.0, 100.0]) - 5.0).abs() < EPSILON);
        assert!((vector_length_2d(&[0.0, 0.0, 50.0])).abs() < EPSILON);
    }

    #[test]
    fn test_vector_ma() {
        let start = [1.0, 2.0, 3.0];
        let dir = [0.0, 1.0, 0.0];
        assert_eq!(vector_ma(&start, 64.0, &dir), [1.0, 66.0, 3.0]);
    }

    // ============================================================
    // Angle tests
    // ============================================================

    #[test]
    fn test_angle_vectors_cardinal_yaw() {
        let mut forward = [0.0f32; 3];
        angle_vectors(&[0.0, 90.0, 0.0], Some(&mut forward), None, None);
        assert!((forward[0] - 0.0).abs() < EPSILON);
        assert!((forward[1] - 1.0).abs() < EPSILON);
        assert!((forward[2] - 0.0).abs() < EPSILON);
    }

    #[test]
    fn test_angle_vectors_pitch_up() {
        // negative pitch looks up, forward gains positive z
        let mut forward = [0.0f32; 3];
        angle_vectors(&[-90.0, 0.0, 0.0], Some(&mut forward), None, None);
        assert!((forward[2] - 1.0).abs() < EPSILON);
    }

    #[test]
    fn test_angle_normalize_wraps() {
        assert!((angle_normalize(370.0) - 10.0).abs() < EPSILON);
        assert!((angle_normalize(-190.0) - 170.0).abs() < EPSILON);
        assert!((angle_normalize(540.0) - 180.0).abs() < EPSILON);
        assert!((angle_normalize(180.0) - 180.0).abs() < EPSILON);
        assert!((angle_normalize(-180.0) + 180.0).abs() < EPSILON);
        assert!((angle_normalize(0.0)).abs() < EPSILON);
    }

    #[test]
    fn test_snap_yaw_boundaries() {
        assert_eq!(snap_yaw_to(0.0), 0.0);
        assert_eq!(snap_yaw_to(22.0), 0.0);
        assert_eq!(snap_yaw_to(23.0), 45.0);
        assert_eq!(snap_yaw_to(66.0), 45.0);
        assert_eq!(snap_yaw_to(67.0), 90.0);
        assert_eq!(snap_yaw_to(112.0), 90.0);
        assert_eq!(snap_yaw_to(113.0), 135.0);
        assert_eq!(snap_yaw_to(156.0), 135.0);
        assert_eq!(snap_yaw_to(157.0), 180.0);
        assert_eq!(snap_yaw_to(180.0), 180.0);
    }

    #[test]
    fn test_snap_yaw_preserves_sign() {
        assert_eq!(snap_yaw_to(-90.0), -90.0);
        assert_eq!(snap_yaw_to(-30.0), -45.0);
        assert_eq!(snap_yaw_to(-170.0), -180.0);
    }

    // ============================================================
    // Token parser tests
    // ============================================================

    #[test]
    fn test_com_parse_words() {
        let (token, rest) = com_parse("hello world");
        assert_eq!(token, "hello");
        let (token, rest) = com_parse(rest.unwrap());
        assert_eq!(token, "world");
        assert!(rest.is_none());
    }

    #[test]
    fn test_com_parse_quoted_strings() {
        let (token, rest) = com_parse("\"x y z\" next");
        assert_eq!(token, "x y z");
        let (token, _) = com_parse(rest.unwrap());
        assert_eq!(token, "next");
    }

    #[test]
    fn test_com_parse_skips_comments() {
        let (token, _) = com_parse("// a comment\nreal_token");
        assert_eq!(token, "real_token");
    }

    #[test]
    fn test_com_parse_braces() {
        let data = "{ \"classname\" \"worldspawn\" }";
        let (token, rest) = com_parse(data);
        assert_eq!(token, "{");
        let (token, rest) = com_parse(rest.unwrap());
        assert_eq!(token, "classname");
        let (token, rest) = com_parse(rest.unwrap());
        assert_eq!(token, "worldspawn");
        let (token, _) = com_parse(rest.unwrap());
        assert_eq!(token, "}");
    }

    #[test]
    fn test_com_parse_empty_data() {
        let (token, rest) = com_parse("");
        assert!(token.is_empty());
        assert!(rest.is_none());

        let (token, rest) = com_parse("   \n\t  ");
        assert!(token.is_empty());
        assert!(rest.is_none());
    }
}
