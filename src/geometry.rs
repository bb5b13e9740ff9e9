//! Clipping and dashing in plotted (already axis-projected) coordinates.

pub type Point = (f64, f64);

/// Axis-aligned clip rectangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x0: f64,
    pub x1: f64,
    pub y0: f64,
    pub y1: f64,
}

impl Rect {
    pub fn contains(&self, (x, y): Point) -> bool {
        x >= self.x0 && x <= self.x1 && y >= self.y0 && y <= self.y1
    }
}

fn lerp(a: Point, b: Point, t: f64) -> Point {
    (a.0 + (b.0 - a.0) * t, a.1 + (b.1 - a.1) * t)
}

// ---------------------------------------------------------------------------
// Polygon clipping (Sutherland–Hodgman)
// ---------------------------------------------------------------------------

/// Clip a closed polygon to `rect`. The result may be empty.
pub fn clip_polygon(polygon: &[Point], rect: Rect) -> Vec<Point> {
    type Edge = (fn(Point, Rect) -> bool, fn(Point, Point, Rect) -> Point);

    let edges: [Edge; 4] = [
        (
            |p: Point, r: Rect| p.0 >= r.x0,
            |a: Point, b: Point, r: Rect| lerp(a, b, (r.x0 - a.0) / (b.0 - a.0)),
        ),
        (
            |p: Point, r: Rect| p.0 <= r.x1,
            |a: Point, b: Point, r: Rect| lerp(a, b, (r.x1 - a.0) / (b.0 - a.0)),
        ),
        (
            |p: Point, r: Rect| p.1 >= r.y0,
            |a: Point, b: Point, r: Rect| lerp(a, b, (r.y0 - a.1) / (b.1 - a.1)),
        ),
        (
            |p: Point, r: Rect| p.1 <= r.y1,
            |a: Point, b: Point, r: Rect| lerp(a, b, (r.y1 - a.1) / (b.1 - a.1)),
        ),
    ];

    let mut output = polygon.to_vec();
    for (inside, cross) in edges {
        if output.is_empty() {
            break;
        }
        let input = std::mem::take(&mut output);
        let mut prev = input[input.len() - 1];
        for &cur in &input {
            match (inside(prev, rect), inside(cur, rect)) {
                (true, true) => output.push(cur),
                (true, false) => output.push(cross(prev, cur, rect)),
                (false, true) => {
                    output.push(cross(prev, cur, rect));
                    output.push(cur);
                }
                (false, false) => {}
            }
            prev = cur;
        }
    }
    output
}

// ---------------------------------------------------------------------------
// Polyline clipping (Liang–Barsky per segment)
// ---------------------------------------------------------------------------

fn clip_segment(a: Point, b: Point, rect: Rect) -> Option<(Point, Point)> {
    let (dx, dy) = (b.0 - a.0, b.1 - a.1);
    let mut t0 = 0.0f64;
    let mut t1 = 1.0f64;
    for (p, q) in [
        (-dx, a.0 - rect.x0),
        (dx, rect.x1 - a.0),
        (-dy, a.1 - rect.y0),
        (dy, rect.y1 - a.1),
    ] {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let r = q / p;
        if p < 0.0 {
            t0 = t0.max(r);
        } else {
            t1 = t1.min(r);
        }
        if t0 > t1 {
            return None;
        }
    }
    Some((lerp(a, b, t0), lerp(a, b, t1)))
}

/// Clip an open polyline to `rect`, splitting it into visible runs.
pub fn clip_polyline(points: &[Point], rect: Rect) -> Vec<Vec<Point>> {
    if points.len() == 1 {
        return if rect.contains(points[0]) {
            vec![points.to_vec()]
        } else {
            Vec::new()
        };
    }

    let mut runs: Vec<Vec<Point>> = Vec::new();
    let mut current: Vec<Point> = Vec::new();
    for w in points.windows(2) {
        match clip_segment(w[0], w[1], rect) {
            Some((start, end)) => {
                if current.last() != Some(&start) {
                    if current.len() >= 2 {
                        runs.push(std::mem::take(&mut current));
                    }
                    current = vec![start];
                }
                current.push(end);
            }
            None => {
                if current.len() >= 2 {
                    runs.push(std::mem::take(&mut current));
                }
                current.clear();
            }
        }
    }
    if current.len() >= 2 {
        runs.push(current);
    }
    runs
}

// ---------------------------------------------------------------------------
// Dashing
// ---------------------------------------------------------------------------

/// Split a polyline into the "on" pieces of `pattern`.
///
/// `pattern` alternates on/off lengths in pixels; `scale` converts plotted
/// units to pixels per axis. An empty pattern returns the line unchanged.
pub fn dash_polyline(points: &[Point], pattern: &[f64], scale: (f64, f64)) -> Vec<Vec<Point>> {
    if points.len() < 2 {
        return Vec::new();
    }
    if pattern.is_empty() || pattern.iter().any(|&len| len <= 0.0) {
        return vec![points.to_vec()];
    }

    let mut pieces = Vec::new();
    let mut idx = 0;
    let mut remaining = pattern[0];
    let mut on = true;
    let mut current = vec![points[0]];

    for w in points.windows(2) {
        let (a, b) = (w[0], w[1]);
        let seg_px = (((b.0 - a.0) * scale.0).powi(2) + ((b.1 - a.1) * scale.1).powi(2)).sqrt();
        let mut left = seg_px;
        let mut t = 0.0;
        while left > remaining {
            t += remaining / seg_px;
            left -= remaining;
            let p = lerp(a, b, t);
            if on {
                current.push(p);
                pieces.push(std::mem::take(&mut current));
            } else {
                current = vec![p];
            }
            on = !on;
            idx = (idx + 1) % pattern.len();
            remaining = pattern[idx];
        }
        remaining -= left;
        if on {
            current.push(b);
        }
    }
    if on && current.len() >= 2 {
        pieces.push(current);
    }
    pieces
}
