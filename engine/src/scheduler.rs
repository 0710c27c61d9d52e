use crate::prelude::*;

/// Round-robin dispatcher of actors in ascending id order.
///
/// The actor set is replaced wholesale with `sync` whenever the set of
/// acting entities changes. A resync keeps the rotation going from where it
/// was, so actors that haven't had their turn in the current round still
/// get it and nobody goes twice.
#[derive(Clone, Default, Debug)]
pub struct ActorDispenser {
    actors: Vec<Entity>,
    cursor: usize,
    last: Option<Entity>,
}

impl ActorDispenser {
    /// Replace the actor set.
    ///
    /// Dispatch continues with the first actor after the previously
    /// dispatched one. If the previous actor was the last in order or every
    /// remaining actor comes after it, a new round starts from the
    /// beginning.
    pub fn sync(&mut self, actors: impl IntoIterator<Item = Entity>) {
        self.actors = actors.into_iter().collect();
        self.actors.sort();
        self.actors.dedup();

        self.cursor = match (self.last, self.actors.first(), self.actors.last())
        {
            (Some(last), Some(&first), Some(&max))
                if last >= first && last < max =>
            {
                self.actors.partition_point(|&a| a <= last)
            }
            _ => 0,
        };
    }

    pub fn actors(&self) -> &[Entity] {
        &self.actors
    }

    pub fn len(&self) -> usize {
        self.actors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actors.is_empty()
    }

    /// The most recently dispatched actor.
    pub fn last_dispatched(&self) -> Option<Entity> {
        self.last
    }
}

impl Iterator for ActorDispenser {
    type Item = Entity;

    /// Dispatch the next actor, cycling forever while there are actors.
    fn next(&mut self) -> Option<Entity> {
        let &actor = self.actors.get(self.cursor)?;
        self.cursor = (self.cursor + 1) % self.actors.len();
        self.last = Some(actor);
        Some(actor)
    }
}
