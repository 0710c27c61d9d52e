use crate::{octant, rays::Rays, Error, Opacity};

#[derive(Copy, Clone, Eq, PartialEq, Hash, Default, Debug)]
pub enum Visibility {
    #[default]
    NotVisible,
    Visible,
}

/// Visibility buffer of `(2 * radius + 1)^2` cells centered on an origin.
///
/// Buffer cell `(fx, fy)` corresponds to map cell
/// `(origin_x + fx - radius, origin_y + fy - radius)`.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct FieldOfView {
    radius: i32,
    origin: [i32; 2],
    cells: Vec<Visibility>,
}

impl FieldOfView {
    /// Allocate an empty buffer where nothing is visible.
    pub fn new(radius: i32) -> Result<Self, Error> {
        assert!(radius >= 0, "FieldOfView::new: negative radius {radius}");
        let side = radius
            .checked_mul(2)
            .and_then(|d| d.checked_add(1))
            .ok_or(Error::TooLarge(radius))? as usize;
        let len = side.checked_mul(side).ok_or(Error::TooLarge(radius))?;
        let mut cells = Vec::new();
        cells.try_reserve_exact(len)?;
        cells.resize(len, Visibility::NotVisible);
        Ok(FieldOfView {
            radius,
            origin: [0, 0],
            cells,
        })
    }

    /// Compute the field of view of `radius` at `origin`.
    pub fn compute(
        map: &impl Opacity,
        origin: impl Into<[i32; 2]>,
        radius: i32,
    ) -> Result<Self, Error> {
        let mut ret = FieldOfView::new(radius)?;
        ret.update(map, origin)?;
        Ok(ret)
    }

    /// Recompute the buffer in place for a new origin.
    ///
    /// The radius stays fixed for the lifetime of the buffer.
    pub fn update(
        &mut self,
        map: &impl Opacity,
        origin: impl Into<[i32; 2]>,
    ) -> Result<(), Error> {
        let origin = origin.into();
        self.origin = origin;
        self.cells.fill(Visibility::NotVisible);

        if !map.contains(origin) {
            return Err(Error::OriginOutOfBounds(origin));
        }

        self.set_local(self.radius, self.radius);
        for dir in 0..8 {
            self.scan(map, dir, 1, Rays::default())?;
        }
        Ok(())
    }

    pub fn radius(&self) -> i32 {
        self.radius
    }

    pub fn origin(&self) -> [i32; 2] {
        self.origin
    }

    /// Width and height of the buffer.
    pub fn side(&self) -> i32 {
        2 * self.radius + 1
    }

    /// Look up a buffer cell with buffer-local coordinates.
    pub fn get_local(&self, fx: i32, fy: i32) -> Visibility {
        let side = self.side();
        if fx < 0 || fy < 0 || fx >= side || fy >= side {
            return Visibility::NotVisible;
        }
        self.cells[(fy * side + fx) as usize]
    }

    /// Whether a map cell is visible. Cells outside the buffer never are.
    pub fn is_visible(&self, p: impl Into<[i32; 2]>) -> bool {
        let [x, y] = p.into();
        let [ox, oy] = self.origin;
        self.get_local(x - ox + self.radius, y - oy + self.radius)
            == Visibility::Visible
    }

    /// Iterate the map coordinates of all visible cells.
    pub fn iter(&self) -> impl Iterator<Item = [i32; 2]> + '_ {
        let side = self.side();
        let [ox, oy] = self.origin;
        let r = self.radius;
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, &c)| c == Visibility::Visible)
            .map(move |(i, _)| {
                let i = i as i32;
                [ox + i % side - r, oy + i / side - r]
            })
    }

    fn set_local(&mut self, fx: i32, fy: i32) {
        let side = self.side();
        self.cells[(fy * side + fx) as usize] = Visibility::Visible;
    }

    /// Scan one octant outwards from column `u_start` within the wedge
    /// bounded by `rays`.
    ///
    /// When a wall splits the wedge, the part passing below the wall is
    /// scanned with a recursive call and this call continues above it.
    fn scan(
        &mut self,
        map: &impl Opacity,
        dir: u8,
        u_start: i32,
        mut rays: Rays,
    ) -> Result<(), Error> {
        if rays.bottom.bottom_wall.u == rays.bottom.top_wall.u
            || rays.top.top_wall.u == rays.top.bottom_wall.u
        {
            return Err(Error::DegenerateRay);
        }

        let [cx, cy] = self.origin;
        let r = self.radius;

        for u in u_start..=r {
            let (b_top, b_bottom) =
                (rays.bottom.top_wall, rays.bottom.bottom_wall);
            let mut v_start = (b_bottom.v - b_top.v) * (u - b_top.u);
            // Rounds down when non-negative, negative values get clamped.
            v_start /= b_bottom.u - b_top.u;
            v_start += b_top.v;
            let v_start = v_start.max(0);

            let (t_bottom, t_top) = (rays.top.bottom_wall, rays.top.top_wall);
            let mut v_end = (t_top.v - t_bottom.v) * (u - t_bottom.u);
            // Round up.
            v_end += t_top.u - t_bottom.u - 1;
            v_end /= t_top.u - t_bottom.u;
            v_end += t_bottom.v - 1;
            let v_end = v_end.min(u);

            let mut previous_is_wall = true;
            let mut new_top_wall = None;

            if v_start > v_end {
                break;
            }

            for v in v_start..=v_end {
                let [dx, dy] = octant(dir, u, v);
                let p = [cx + dx, cy + dy];
                let legal = map.contains(p);
                if legal {
                    self.set_local(dx + r, dy + r);
                }

                if !legal || map.is_opaque(p) {
                    if !previous_is_wall {
                        new_top_wall = Some(v);
                    }
                    previous_is_wall = true;
                } else {
                    if previous_is_wall {
                        if let Some(wall_v) = new_top_wall.take() {
                            let mut child = rays.clone();
                            child.add_top_wall(u, wall_v);
                            self.scan(map, dir, u + 1, child)?;
                        }
                        rays.add_bottom_wall(u, v - 1);
                    }
                    previous_is_wall = false;
                }
            }

            if let Some(wall_v) = new_top_wall {
                rays.add_top_wall(u, wall_v);
            } else if previous_is_wall {
                break;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::test_map::TextMap;

    fn render(fov: &FieldOfView, map: &TextMap) -> String {
        let mut s = String::new();
        for y in 0..map.h {
            for x in 0..map.w {
                s.push(if fov.is_visible([x, y]) { '*' } else { '.' });
            }
            s.push('\n');
        }
        s
    }

    #[test]
    fn open_room() {
        let map = TextMap::new(
            "
            #########
            #.......#
            #.......#
            #.......#
            #########
            .........",
        );
        let fov = FieldOfView::compute(&map, [4, 2], 6).unwrap();

        for y in 1..4 {
            for x in 1..8 {
                assert!(fov.is_visible([x, y]), "{x}, {y} not visible");
            }
        }
        // Wall directly below the origin is visible, nothing past it is.
        assert!(fov.is_visible([4, 4]));
        for x in 0..9 {
            assert!(!fov.is_visible([x, 5]), "{}", render(&fov, &map));
        }
    }

    #[test]
    fn wall_casts_shadow() {
        let map = TextMap::new(
            "
            .......
            ...#...
            .......",
        );
        let fov = FieldOfView::compute(&map, [1, 1], 5).unwrap();
        assert!(fov.is_visible([2, 1]));
        assert!(fov.is_visible([3, 1]));
        assert!(!fov.is_visible([4, 1]));
        assert!(!fov.is_visible([6, 1]));
        assert!(fov.is_visible([6, 0]));
        assert!(fov.is_visible([6, 2]));
    }

    #[test]
    fn bounded_buffer() {
        let map = TextMap::new(
            "
            ...........
            ...........
            ...........
            ...........
            ...........",
        );
        let fov = FieldOfView::compute(&map, [5, 2], 2).unwrap();
        assert_eq!(fov.side(), 5);
        assert!(fov.is_visible([7, 4]));
        assert!(!fov.is_visible([8, 2]));
        assert!(!fov.is_visible([2, 2]));
        for [x, y] in fov.iter() {
            assert!((x - 5).abs() <= 2 && (y - 2).abs() <= 2);
        }
        assert_eq!(fov.iter().count(), 25);
    }

    #[test]
    fn deterministic() {
        let map = TextMap::noise(30, 20, 1234, 25);
        let mut fov = FieldOfView::new(8).unwrap();
        let mut origin = [0, 0];
        for y in 0..20 {
            for x in 0..30 {
                if !map.is_opaque([x, y]) {
                    origin = [x, y];
                }
            }
        }
        let a = FieldOfView::compute(&map, origin, 8).unwrap();
        fov.update(&map, origin).unwrap();
        assert_eq!(a, fov);
        fov.update(&map, origin).unwrap();
        assert_eq!(a, fov);
    }

    #[test]
    fn huge_radius() {
        assert!(matches!(
            FieldOfView::new(i32::MAX),
            Err(Error::TooLarge(i32::MAX))
        ));
        assert!(matches!(
            FieldOfView::new(i32::MAX / 2 + 1),
            Err(Error::TooLarge(_))
        ));
    }

    #[test]
    fn origin_outside_map() {
        let map = TextMap::new("...");
        assert!(matches!(
            FieldOfView::compute(&map, [5, 0], 3),
            Err(Error::OriginOutOfBounds([5, 0]))
        ));
    }

    #[test]
    fn symmetric_between_floors() {
        const R: i32 = 7;
        for seed in [1, 77, 4242] {
            let map = TextMap::noise(16, 16, seed, 20);
            let floors: Vec<[i32; 2]> = (0..16)
                .flat_map(|y| (0..16).map(move |x| [x, y]))
                .filter(|&p| !map.is_opaque(p))
                .collect();
            let fovs: Vec<FieldOfView> = floors
                .iter()
                .map(|&p| FieldOfView::compute(&map, p, R).unwrap())
                .collect();

            for (i, a) in floors.iter().enumerate() {
                for (j, b) in floors.iter().enumerate() {
                    if fovs[i].is_visible(*b) {
                        assert!(
                            fovs[j].is_visible(*a),
                            "{b:?} seen from {a:?} but not vice versa"
                        );
                    }
                }
            }
        }
    }
}
