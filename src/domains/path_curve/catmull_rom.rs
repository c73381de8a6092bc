use crate::domains::greenhouse::RobotPosition;

/// Arc-length lookup resolution.
const ARC_LENGTH_DIVISIONS: usize = 200;
/// Parameter offset used for finite-difference tangents.
const TANGENT_DELTA: f64 = 0.0001;
/// Chords shorter than this (after the 0.25 exponent) are treated as unit length.
const MIN_CHORD: f64 = 1e-4;

/// One cubic polynomial `c0 + c1 t + c2 t^2 + c3 t^3`.
#[derive(Debug, Clone, Copy, Default)]
struct Cubic {
    c0: f64,
    c1: f64,
    c2: f64,
    c3: f64,
}

impl Cubic {
    fn hermite(x0: f64, x1: f64, t0: f64, t1: f64) -> Self {
        Self {
            c0: x0,
            c1: t0,
            c2: -3.0 * x0 + 3.0 * x1 - 2.0 * t0 - t1,
            c3: 2.0 * x0 - 2.0 * x1 + t0 + t1,
        }
    }

    /// Non-uniform Catmull-Rom segment between `x1` and `x2`.
    fn nonuniform(x0: f64, x1: f64, x2: f64, x3: f64, dt0: f64, dt1: f64, dt2: f64) -> Self {
        let t1 = ((x1 - x0) / dt0 - (x2 - x0) / (dt0 + dt1) + (x2 - x1) / dt1) * dt1;
        let t2 = ((x2 - x1) / dt1 - (x3 - x1) / (dt1 + dt2) + (x3 - x2) / dt2) * dt1;
        Self::hermite(x1, x2, t1, t2)
    }

    fn calc(&self, t: f64) -> f64 {
        let t2 = t * t;
        let t3 = t2 * t;
        self.c0 + self.c1 * t + self.c2 * t2 + self.c3 * t3
    }
}

/// Centripetal Catmull-Rom spline through a list of control points.
///
/// The curve passes exactly through every control point. The first and last
/// segments use phantom points mirrored about the end points. `t` is the raw
/// curve parameter (equal time per segment); `u` is the normalised arc-length
/// parameter.
#[derive(Debug, Clone)]
pub struct CentripetalCatmullRom {
    points: Vec<RobotPosition>,
    arc_lengths: Vec<f64>,
}

impl CentripetalCatmullRom {
    /// Returns `None` for fewer than two control points.
    pub fn new(points: Vec<RobotPosition>) -> Option<Self> {
        if points.len() < 2 {
            return None;
        }
        let mut curve = Self {
            points,
            arc_lengths: Vec::new(),
        };
        curve.arc_lengths = curve.compute_arc_lengths(ARC_LENGTH_DIVISIONS);
        Some(curve)
    }

    pub fn control_points(&self) -> &[RobotPosition] {
        &self.points
    }

    /// Position at curve parameter `t` in `[0, 1]`.
    pub fn point(&self, t: f64) -> RobotPosition {
        let points = &self.points;
        let l = points.len();

        let p = (l - 1) as f64 * t.clamp(0.0, 1.0);
        let mut int_point = p.floor() as usize;
        let mut weight = p - int_point as f64;

        if int_point >= l - 1 {
            int_point = l - 2;
            weight = 1.0;
        }

        let p1 = points[int_point];
        let p2 = points[int_point + 1];

        let p0 = if int_point > 0 {
            points[int_point - 1]
        } else {
            p1 * 2.0 - p2
        };

        let p3 = if int_point + 2 < l {
            points[int_point + 2]
        } else {
            p2 * 2.0 - p1
        };

        let mut dt0 = p0.distance_squared(&p1).powf(0.25);
        let mut dt1 = p1.distance_squared(&p2).powf(0.25);
        let mut dt2 = p2.distance_squared(&p3).powf(0.25);

        if dt1 < MIN_CHORD {
            dt1 = 1.0;
        }
        if dt0 < MIN_CHORD {
            dt0 = dt1;
        }
        if dt2 < MIN_CHORD {
            dt2 = dt1;
        }

        let px = Cubic::nonuniform(p0.x, p1.x, p2.x, p3.x, dt0, dt1, dt2);
        let py = Cubic::nonuniform(p0.y, p1.y, p2.y, p3.y, dt0, dt1, dt2);
        let pz = Cubic::nonuniform(p0.z, p1.z, p2.z, p3.z, dt0, dt1, dt2);

        RobotPosition::new(px.calc(weight), py.calc(weight), pz.calc(weight))
    }

    /// Position at arc-length fraction `u` in `[0, 1]`.
    pub fn point_at(&self, u: f64) -> RobotPosition {
        self.point(self.u_to_t(u))
    }

    /// Unit tangent at curve parameter `t`, by central-ish finite difference.
    pub fn tangent(&self, t: f64) -> RobotPosition {
        let t1 = (t - TANGENT_DELTA).max(0.0);
        let t2 = (t + TANGENT_DELTA).min(1.0);
        (self.point(t2) - self.point(t1)).normalize()
    }

    pub fn tangent_at(&self, u: f64) -> RobotPosition {
        self.tangent(self.u_to_t(u))
    }

    /// Approximate arc length of the whole curve.
    pub fn length(&self) -> f64 {
        self.arc_lengths.last().copied().unwrap_or(0.0)
    }

    /// `divisions + 1` evenly spaced samples in `t`, both ends included.
    pub fn sample(&self, divisions: usize) -> Vec<RobotPosition> {
        let divisions = divisions.max(1);
        (0..=divisions)
            .map(|d| self.point(d as f64 / divisions as f64))
            .collect()
    }

    /// Map an arc-length fraction to the curve parameter.
    pub fn u_to_t(&self, u: f64) -> f64 {
        let arc_lengths = &self.arc_lengths;
        let il = arc_lengths.len();
        let total = self.length();
        if il < 2 || total <= 0.0 {
            return u.clamp(0.0, 1.0);
        }

        let target = u.clamp(0.0, 1.0) * total;

        // Largest index whose cumulative length does not exceed the target.
        let mut low = 0usize;
        let mut high = il - 1;
        while low <= high {
            let mid = low + (high - low) / 2;
            let comparison = arc_lengths[mid] - target;
            if comparison < 0.0 {
                low = mid + 1;
            } else if comparison > 0.0 {
                if mid == 0 {
                    high = 0;
                    break;
                }
                high = mid - 1;
            } else {
                high = mid;
                break;
            }
        }
        let i = high;

        if arc_lengths[i] == target {
            return i as f64 / (il - 1) as f64;
        }
        if i + 1 >= il {
            return 1.0;
        }

        let before = arc_lengths[i];
        let segment = arc_lengths[i + 1] - before;
        let fraction = if segment > 0.0 { (target - before) / segment } else { 0.0 };

        (i as f64 + fraction) / (il - 1) as f64
    }

    fn compute_arc_lengths(&self, divisions: usize) -> Vec<f64> {
        let mut lengths = Vec::with_capacity(divisions + 1);
        let mut last = self.point(0.0);
        let mut sum = 0.0;
        lengths.push(0.0);
        for d in 1..=divisions {
            let current = self.point(d as f64 / divisions as f64);
            sum += (current - last).length();
            lengths.push(sum);
            last = current;
        }
        lengths
    }
}
