//! Walking precomputed routes.

use util::astar_path;

use crate::prelude::*;

#[derive(Clone, Debug, Eq, PartialEq)]
enum State {
    Planning,
    /// Remaining steps in reverse order.
    Walking(Vec<IVec2>),
    Done,
}

/// Route to a destination that is planned once and then followed without
/// looking around.
///
/// Before each step the next tile is checked. If something has moved into
/// the way, the route is planned again from the current position. The walk
/// ends at the destination or when no route can be found.
#[derive(Clone, Debug)]
pub struct BlindPath {
    pos: IVec2,
    destination: IVec2,
    state: State,
}

impl BlindPath {
    pub fn new(from: IVec2, destination: IVec2) -> Self {
        BlindPath {
            pos: from,
            destination,
            state: State::Planning,
        }
    }

    /// Where the walker is after the steps handed out so far.
    pub fn pos(&self) -> IVec2 {
        self.pos
    }

    pub fn destination(&self) -> IVec2 {
        self.destination
    }

    pub fn is_done(&self) -> bool {
        self.state == State::Done
    }

    /// Produce the next tile to step on, or `None` when the walk is over.
    ///
    /// The walker is assumed to actually take every step handed out.
    pub fn next_step(
        &mut self,
        mut travelable: impl FnMut(IVec2) -> bool,
    ) -> Option<IVec2> {
        loop {
            match &mut self.state {
                State::Done => return None,
                State::Planning => {
                    if self.pos == self.destination {
                        self.state = State::Done;
                        continue;
                    }
                    self.state = match astar_path(
                        self.pos,
                        self.destination,
                        &mut travelable,
                    ) {
                        Some(mut path) => {
                            path.reverse();
                            State::Walking(path)
                        }
                        None => State::Done,
                    };
                }
                State::Walking(steps) => {
                    let Some(&next) = steps.last() else {
                        self.state = State::Done;
                        continue;
                    };
                    if !travelable(next) {
                        // Bumped into something, find a way around.
                        self.state = State::Planning;
                        continue;
                    }
                    steps.pop();
                    if steps.is_empty() {
                        self.state = State::Done;
                    }
                    self.pos = next;
                    return Some(next);
                }
            }
        }
    }
}

#[cfg(test)]
mod test {
    use util::AsciiMap;

    use super::*;

    fn walk(
        path: &mut BlindPath,
        map: &AsciiMap,
        blocked: &[IVec2],
    ) -> Option<IVec2> {
        path.next_step(|p| {
            matches!(map.get(p), Some(c) if c != '#') && !blocked.contains(&p)
        })
    }

    #[test]
    fn reaches_destination() {
        let map = AsciiMap::new(
            "
            ......
            .####.
            ......",
        );
        let mut path = BlindPath::new(ivec2(0, 1), ivec2(5, 1));
        let mut steps = Vec::new();
        while let Some(p) = walk(&mut path, &map, &[]) {
            steps.push(p);
            // Done as soon as the last step is handed out.
            assert_eq!(path.is_done(), p == ivec2(5, 1));
        }
        assert_eq!(steps.len(), 5);
        assert_eq!(steps.last(), Some(&ivec2(5, 1)));
        assert_eq!(path.pos(), ivec2(5, 1));
        assert!(path.is_done());
    }

    #[test]
    fn replans_after_bump() {
        let map = AsciiMap::new(
            "
            ......
            .####.
            ......",
        );
        let mut path = BlindPath::new(ivec2(0, 1), ivec2(5, 1));
        let first = walk(&mut path, &map, &[]).unwrap();
        let mut pos = first;

        // Something steps into the route, the walker goes the other way.
        let ahead = ivec2(pos.x + 1, pos.y);
        let next = walk(&mut path, &map, &[ahead]).unwrap();
        assert_ne!(next, ahead);
        assert!((next - pos).is_adjacent());
        pos = next;

        let mut count = 0;
        while let Some(p) = walk(&mut path, &map, &[ahead]) {
            assert!((p - pos).is_adjacent());
            pos = p;
            count += 1;
            assert!(count < 20);
        }
        assert_eq!(pos, ivec2(5, 1));
    }

    #[test]
    fn gives_up_when_blocked() {
        let map = AsciiMap::new(
            "
            ..#..
            ..#..
            ..#..",
        );
        let mut path = BlindPath::new(ivec2(0, 1), ivec2(4, 1));
        assert_eq!(walk(&mut path, &map, &[]), None);
        assert!(path.is_done());

        // Occupied destination can't be reached either.
        let map = AsciiMap::new("....");
        let mut path = BlindPath::new(ivec2(0, 0), ivec2(3, 0));
        assert_eq!(walk(&mut path, &map, &[ivec2(3, 0)]), None);
    }

    #[test]
    fn already_there() {
        let mut path = BlindPath::new(ivec2(2, 2), ivec2(2, 2));
        assert_eq!(walk(&mut path, &AsciiMap::new("."), &[]), None);
        assert!(path.is_done());
    }
}
