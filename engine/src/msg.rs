//! Emitting messages about instant events to the UI layer

use crate::prelude::*;

/// Interface for receiving game event messages for displaying.
#[derive(Clone, Eq, PartialEq, Debug)]
pub enum Msg {
    /// Text message.
    Message(String),

    /// Entity died.
    Death(Entity),

    /// An input-controlled actor is about to decide, the display should be
    /// brought up to date.
    Redraw,
}

impl Runtime {
    pub fn send_msg(&mut self, msg: Msg) {
        self.msgs.push_back(msg);
    }

    /// Take out all messages sent so far in the order they were sent.
    pub fn drain_msgs(&mut self) -> impl Iterator<Item = Msg> + '_ {
        self.msgs.drain(..)
    }

    /// Log a message about something happening at `place`.
    ///
    /// The message goes to the UI only if the tracked entity is the subject
    /// or can see the place.
    pub fn log_local(&mut self, subject: Entity, place: Place, text: String) {
        log::debug!("{place}: {text}");
        if self.notices(subject, place) {
            self.send_msg(Msg::Message(text));
        }
    }

    fn notices(&self, subject: Entity, place: Place) -> bool {
        let Some(observer) = self.tracked() else {
            return false;
        };
        if observer == subject {
            return true;
        }
        matches!(observer.place(self), Some(p) if p.level == place.level)
            && self.can_see(observer, place.pos)
    }
}

#[macro_export]
macro_rules! msg {
    // NB. Even the simple cases needs to be wrapped in `format!` in case the
    // fmt string is doing named variable capture.
    ($r:expr, $fmt:expr) => {
        $crate::Runtime::send_msg(
            ::std::convert::AsMut::<$crate::Runtime>::as_mut($r),
            $crate::Msg::Message(format!($fmt)),
        )
    };

    ($r:expr, $fmt:expr, $($arg:expr),*) => {
        $crate::Runtime::send_msg(
            ::std::convert::AsMut::<$crate::Runtime>::as_mut($r),
            $crate::Msg::Message(format!($fmt, $($arg),*)),
        )
    };
}
