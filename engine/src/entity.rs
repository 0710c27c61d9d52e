//! Generic entity logic.
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{ecs::*, prelude::*};

/// Game entity identifier datatype. All the actual contents live in the
/// registry.
///
/// Ids are assigned in increasing order and never reused, so sorting by id
/// sorts by age.
#[derive(
    Copy,
    Clone,
    Hash,
    Eq,
    Ord,
    PartialEq,
    PartialOrd,
    Debug,
    Serialize,
    Deserialize,
)]
pub struct Entity(pub(crate) u64);

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl Entity {
    pub fn id(&self) -> u64 {
        self.0
    }

    pub fn exists(&self, r: &impl AsRef<Runtime>) -> bool {
        r.as_ref().ecs.contains(*self)
    }

    pub fn has<C: Capability>(&self, r: &impl AsRef<Runtime>) -> bool {
        r.as_ref().ecs.has::<C>(*self)
    }

    pub fn has_all(&self, r: &impl AsRef<Runtime>, caps: Capabilities) -> bool {
        r.as_ref().ecs.has_all(*self, caps)
    }

    /// Copy out a capability value.
    pub fn get<C: Capability + Clone>(
        &self,
        r: &impl AsRef<Runtime>,
    ) -> Option<C> {
        r.as_ref().ecs.get::<C>(*self).map(|c| (*c).clone())
    }

    /// Access a capability using a closure.
    pub fn with<C: Capability, U>(
        &self,
        r: &impl AsRef<Runtime>,
        f: impl FnOnce(&C) -> U,
    ) -> Option<U> {
        let c = r.as_ref().ecs.get::<C>(*self)?;
        Some(f(&c))
    }

    /// Access and mutate a capability using a closure.
    pub fn with_mut<C: Capability, U>(
        &self,
        r: &mut impl AsMut<Runtime>,
        f: impl FnOnce(&mut C) -> U,
    ) -> Option<U> {
        let mut c = r.as_mut().ecs.get_mut::<C>(*self)?;
        Some(f(&mut c))
    }

    /// Attach a capability. Location is attached only by placing the entity
    /// on a level.
    ///
    /// Returns false if the entity already has a capability of this kind.
    pub fn attach<C: Capability>(
        &self,
        r: &mut impl AsMut<Runtime>,
        c: C,
    ) -> bool {
        assert!(
            C::KIND != Capabilities::LOCATION,
            "Entity::attach: use Runtime::put_entity to place entities"
        );
        r.as_mut().ecs.add(*self, c)
    }

    /// Detach a capability. Location is detached only by removing the
    /// entity from its level.
    pub fn detach<C: Capability>(
        &self,
        r: &mut impl AsMut<Runtime>,
    ) -> Option<C> {
        assert!(
            C::KIND != Capabilities::LOCATION,
            "Entity::detach: use Runtime::remove_entity to unplace entities"
        );
        r.as_mut().ecs.remove::<C>(*self)
    }

    pub fn name(&self, r: &impl AsRef<Runtime>) -> String {
        r.as_ref().ecs.name(*self)
    }

    pub fn icon(&self, r: &impl AsRef<Runtime>) -> char {
        r.as_ref().ecs.icon(*self)
    }

    /// Level and position of a placed entity.
    pub fn place(&self, r: &impl AsRef<Runtime>) -> Option<Place> {
        self.with(r, |loc: &Location| loc.place())
    }

    pub fn pos(&self, r: &impl AsRef<Runtime>) -> Option<IVec2> {
        self.place(r).map(|p| p.pos)
    }

    /// Is this the entity whose point of view the messages are told from.
    pub fn is_tracked(&self, r: &impl AsRef<Runtime>) -> bool {
        r.as_ref().tracked() == Some(*self)
    }
}
