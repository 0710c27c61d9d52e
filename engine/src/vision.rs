//! Entity sight.

use fov::FieldOfView;

use crate::{prelude::*, Error};

/// Capability of seeing the surroundings.
///
/// The visibility buffer is allocated when the capability is created and
/// recomputed lazily when the owner has moved since the last query.
#[derive(Clone, Debug)]
pub struct Vision {
    fov: FieldOfView,
    fov_is_fresh: bool,
}

impl Vision {
    pub fn new(radius: i32) -> Result<Self, Error> {
        Ok(Vision {
            fov: FieldOfView::new(radius)?,
            fov_is_fresh: false,
        })
    }

    pub fn radius(&self) -> i32 {
        self.fov.radius()
    }

    pub(crate) fn invalidate(&mut self) {
        self.fov_is_fresh = false;
    }
}

impl Runtime {
    /// Run a query against an entity's up to date field of view.
    ///
    /// Panics if the entity has no location or no vision, asking for the
    /// sight of something that can't see is a logic error.
    pub fn with_fov<U>(
        &self,
        e: Entity,
        f: impl FnOnce(&FieldOfView) -> U,
    ) -> U {
        let Some(place) = e.place(self) else {
            panic!("Runtime::with_fov: {e} has no location");
        };
        let Some(mut vision) = self.ecs.get_mut::<Vision>(e) else {
            panic!("Runtime::with_fov: {e} can't see");
        };
        if !vision.fov_is_fresh {
            if let Err(err) =
                vision.fov.update(self.level(place.level), place.pos)
            {
                panic!("Runtime::with_fov: {err}");
            }
            vision.fov_is_fresh = true;
        }
        f(&vision.fov)
    }

    /// Whether an entity can see a position on its current level.
    ///
    /// Uses the cached field of view when it is up to date and falls back
    /// to a single line of sight check otherwise, so occasional queries
    /// don't force a full recompute.
    pub fn can_see(&self, e: Entity, p: IVec2) -> bool {
        let Some(place) = e.place(self) else {
            return false;
        };
        let Some(vision) = self.ecs.get::<Vision>(e) else {
            return false;
        };
        if vision.fov_is_fresh {
            vision.fov.is_visible(p)
        } else {
            (p - place.pos).chess_len() <= vision.radius()
                && fov::line_of_sight(self.level(place.level), place.pos, p)
        }
    }

    /// Entities that `e` can currently see, excluding itself, ordered by
    /// distance and then by id.
    pub fn visible_entities(&self, e: Entity) -> Vec<Entity> {
        let Some(place) = e.place(self) else {
            return Vec::new();
        };
        let level = self.level(place.level);
        let mut ret: Vec<(i32, Entity)> = self.with_fov(e, |fov| {
            level
                .occupied_tiles()
                .filter(|&p| fov.is_visible(p))
                .flat_map(|p| {
                    let dist = (p - place.pos).chess_len();
                    level.occupants(p).iter().map(move |&a| (dist, a))
                })
                .filter(|&(_, a)| a != e)
                .collect()
        });
        ret.sort();
        ret.into_iter().map(|(_, a)| a).collect()
    }
}
