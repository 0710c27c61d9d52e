//! Shadow rays and wall hulls shared by the field and line scans.
//!
//! Points are in octant-local coordinates where `u` runs outwards from the
//! origin and `v` runs sideways, `0 <= v <= u`. Cell `(u, v)` spans the
//! corner points `(u, v)` to `(u + 1, v + 1)`.

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub(crate) struct Pt {
    pub u: i32,
    pub v: i32,
}

pub(crate) const fn pt(u: i32, v: i32) -> Pt {
    Pt { u, v }
}

/// Positive if `p` is to the left of the line from `a` to `b`, zero if on
/// the line, negative if to the right.
pub(crate) fn side(a: Pt, b: Pt, p: Pt) -> i32 {
    (p.v - a.v) * (b.u - a.u) - (b.v - a.v) * (p.u - a.u)
}

/// A bounding ray, defined by the wall corners it grazes.
#[derive(Copy, Clone, Debug)]
pub(crate) struct Ray {
    pub top_wall: Pt,
    pub bottom_wall: Pt,
}

/// Visible wedge between the bottom and top rays, with the convex hulls of
/// the walls that constrain them.
#[derive(Clone, Debug)]
pub(crate) struct Rays {
    pub bottom: Ray,
    pub top: Ray,
    /// Index of `bottom.top_wall` in `top_walls`.
    pub b_ray_t: usize,
    /// Index of `top.bottom_wall` in `bottom_walls`.
    pub t_ray_b: usize,
    pub top_walls: Vec<Pt>,
    pub bottom_walls: Vec<Pt>,
}

impl Default for Rays {
    fn default() -> Self {
        Rays {
            bottom: Ray {
                top_wall: pt(0, 1),
                bottom_wall: pt(1, -1),
            },
            top: Ray {
                top_wall: pt(1, 2),
                bottom_wall: pt(0, 0),
            },
            b_ray_t: 0,
            t_ray_b: 0,
            top_walls: vec![pt(0, 1)],
            bottom_walls: vec![pt(0, 0)],
        }
    }
}

impl Rays {
    /// Side of `p` relative to the bottom ray, positive is inside the wedge.
    pub fn above_bottom(&self, p: Pt) -> i32 {
        side(self.bottom.top_wall, self.bottom.bottom_wall, p)
    }

    /// Side of `p` relative to the top ray, negative is inside the wedge.
    pub fn below_top(&self, p: Pt) -> i32 {
        side(self.top.bottom_wall, self.top.top_wall, p)
    }

    /// Drop bottom wall corners that are no longer on the convex hull.
    pub fn prune_bottom_walls(&mut self) {
        while self.bottom_walls.len() >= 3 {
            let n = self.bottom_walls.len();
            let w = &self.bottom_walls;
            if side(w[n - 3], w[n - 1], w[n - 2]) > 0 {
                break;
            }
            self.bottom_walls.remove(n - 2);
            if self.t_ray_b == n - 2 {
                self.t_ray_b -= 1;
            }
        }
    }

    /// Drop top wall corners that are no longer on the convex hull.
    pub fn prune_top_walls(&mut self) {
        while self.top_walls.len() >= 3 {
            let n = self.top_walls.len();
            let w = &self.top_walls;
            if side(w[n - 3], w[n - 1], w[n - 2]) < 0 {
                break;
            }
            self.top_walls.remove(n - 2);
            if self.b_ray_t == n - 2 {
                self.b_ray_t -= 1;
            }
        }
    }

    /// Register a floor cell at `(u, v + 1)` whose lower neighbor `(u, v)`
    /// is a wall, raising the bottom ray if needed.
    pub fn add_bottom_wall(&mut self, u: i32, v: i32) {
        let corner = pt(u, v + 1);
        if self.below_top(corner) >= 0 {
            return;
        }

        if self.above_bottom(corner) > 0 {
            self.bottom.bottom_wall = corner;
            while self.b_ray_t + 1 < self.top_walls.len() {
                let w = self.top_walls[self.b_ray_t + 1];
                if w.u >= u || self.above_bottom(w) >= 0 {
                    break;
                }
                self.bottom.top_wall = w;
                self.b_ray_t += 1;
            }
        }

        match self.bottom_walls.last_mut() {
            Some(last) if last.u == u => *last = corner,
            _ => self.bottom_walls.push(corner),
        }
        self.prune_bottom_walls();
    }

    /// Register a wall cell at `(u, v)` with floor below it, lowering the
    /// top ray if needed.
    pub fn add_top_wall(&mut self, u: i32, v: i32) {
        let corner = pt(u, v);
        if self.above_bottom(corner) <= 0 {
            return;
        }

        if self.below_top(corner) < 0 {
            self.top.top_wall = corner;
            while self.t_ray_b + 1 < self.bottom_walls.len() {
                let w = self.bottom_walls[self.t_ray_b + 1];
                if w.u >= u || self.below_top(w) <= 0 {
                    break;
                }
                self.top.bottom_wall = w;
                self.t_ray_b += 1;
            }
        }

        self.top_walls.push(corner);
        self.prune_top_walls();
    }
}
