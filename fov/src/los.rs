use crate::{
    octant,
    rays::{pt, Rays},
    Opacity,
};

/// Whether there is a digital line of sight from `a` to `b`.
///
/// Independent of any field of view buffer. Like the field of view, the end
/// point may be opaque. Points outside the map are never in sight.
pub fn line_of_sight(
    map: &impl Opacity,
    a: impl Into<[i32; 2]>,
    b: impl Into<[i32; 2]>,
) -> bool {
    let ([ax, ay], [bx, by]) = (a.into(), b.into());
    if !map.contains([ax, ay]) || !map.contains([bx, by]) {
        return false;
    }

    let (dx, dy) = (bx - ax, by - ay);
    let (dx_abs, dy_abs) = (dx.abs(), dy.abs());
    if dx_abs <= 1 && dy_abs <= 1 {
        return true;
    }

    let x_major = dx_abs >= dy_abs;
    let dir = match (dx >= 0, dy >= 0, x_major) {
        (true, true, true) => 0,
        (true, true, false) => 1,
        (true, false, true) => 7,
        (true, false, false) => 6,
        (false, true, true) => 3,
        (false, true, false) => 2,
        (false, false, true) => 4,
        (false, false, false) => 5,
    };
    let (du, dv) = if x_major {
        (dx_abs, dy_abs)
    } else {
        (dy_abs, dx_abs)
    };

    let is_wall = |u, v| {
        let [x, y] = octant(dir, u, v);
        let p = [ax + x, ay + y];
        !map.contains(p) || map.is_opaque(p)
    };
    let is_legal = |u, v| {
        let [x, y] = octant(dir, u, v);
        map.contains([ax + x, ay + y])
    };

    let mut rays = Rays::default();
    let (mut v, mut r) = (0, 0);

    for u in 1..=du {
        // v = (u * dv) / du, r = (u * dv) % du
        r += dv;
        if r >= du {
            v += 1;
            r -= du;
        }

        // A ray through cell (u, v) exists between the bounding rays.
        let open = |rays: &Rays, v: i32| {
            is_legal(u, v)
                && rays.above_bottom(pt(u, v + 1)) > 0
                && rays.below_top(pt(u, v)) < 0
        };

        if r == 0 {
            // The line passes exactly through the center of a single cell.
            if !open(&rays, v) {
                return false;
            }
            if is_wall(u, v) {
                return u == du;
            }
            continue;
        }

        // The line passes between cells (u, v) and (u, v + 1).
        if !open(&rays, v) && !open(&rays, v + 1) {
            return false;
        }

        let (wall0, wall1) = (is_wall(u, v), is_wall(u, v + 1));

        if wall0 && rays.above_bottom(pt(u, v + 1)) > 0 {
            rays.bottom.bottom_wall = pt(u, v + 1);
            while rays.b_ray_t + 1 < rays.top_walls.len() {
                let w = rays.top_walls[rays.b_ray_t + 1];
                if rays.above_bottom(w) >= 0 {
                    break;
                }
                rays.bottom.top_wall = w;
                rays.b_ray_t += 1;
            }
        }

        if wall1 && rays.below_top(pt(u, v + 1)) < 0 {
            rays.top.top_wall = pt(u, v + 1);
            while rays.t_ray_b + 1 < rays.bottom_walls.len() {
                let w = rays.bottom_walls[rays.t_ray_b + 1];
                if rays.below_top(w) <= 0 {
                    break;
                }
                rays.top.bottom_wall = w;
                rays.t_ray_b += 1;
            }
        }

        if wall0 {
            if rays.below_top(pt(u, v + 1)) >= 0 {
                return u == du;
            }
            rays.bottom_walls.push(pt(u, v + 1));
            rays.prune_bottom_walls();
        }

        if wall1 {
            if rays.above_bottom(pt(u, v + 1)) <= 0 {
                return u == du;
            }
            rays.top_walls.push(pt(u, v + 1));
            rays.prune_top_walls();
        }
    }

    true
}
