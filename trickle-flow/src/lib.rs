//! Pull-based dataflow primitives.
//!
//! This crate composes small programs for devices
//! out of three kinds of parts:
//!
//! - Sources produce values on demand: a polled
//!   sensor, a pin announced by an interrupt, a
//!   stored value. Pulling a source gets its value
//!   right now, iterating it gets a flow waiting
//!   for each next value.
//! - Pipelines sit between a source and a sink and
//!   transform the values in transit: debounce,
//!   deduplicate, smooth, filter, map.
//! - Sinks consume values: a display, an actuator,
//!   a log. A sink bound to a source forms a chain,
//!   which is driven until the source is exhausted.
//!
//! Sources never queue. Pushing sources only keep
//! their latest value and wake their consumers, who
//! re-pull it when they get to run, so a slow
//! consumer skips the intermediate values rather
//! than falling behind.
//!
//! Every chain runs as a task of the cooperative
//! scheduler of `trickle-task`, on a single thread.

#[doc(hidden)]
pub mod contract;
#[rustfmt::skip]
pub use contract::{
    Flow, Outcome, Pipeline, PullFlow,
    Sink, Source, TransformFlow,
};

#[doc(hidden)]
pub mod error;
pub use error::{FlowError, Result};

pub mod callback;
pub use callback::{Callback, asynchronize};

#[doc(hidden)]
pub mod compose;
#[rustfmt::skip]
pub use compose::{
    Bound, Piped, Running, SourceExt,
    aconnect, compose, connect, gather,
};

pub mod event;
#[rustfmt::skip]
pub use event::{
    Event, EventFlow, EventSource, Interrupt,
    IrqEvent, IrqTrigger, Signal,
};

#[doc(hidden)]
pub mod poll;
pub use poll::{Poll, PollFlow, apoll, poll};

#[doc(hidden)]
pub mod value;
#[rustfmt::skip]
pub use value::{
    EasedValue, Hold, Value,
    DEFAULT_EASING_DURATION, DEFAULT_EASING_STEP,
};

pub mod easing;
pub use easing::Interpolate;

#[doc(hidden)]
pub mod debounce;
pub use debounce::{DEFAULT_DEBOUNCE, Debounce};

#[doc(hidden)]
pub mod dedup;
pub use dedup::{Dedup, DedupFlow};

#[doc(hidden)]
pub mod ewma;
pub use ewma::{DEFAULT_WEIGHT, Ewma};

#[doc(hidden)]
pub mod filter;
pub use filter::{Apply, Filter, afilter, apipe, filter, pipe};

#[doc(hidden)]
pub mod consumer;
pub use consumer::{Consumer, aconsumer, consumer};

pub mod stream;
pub use stream::{ReadChars, WriteText};

pub mod prelude {
    //! Prelude to making life easy for
    //! [this module](crate) users.
    //!
    //! The prelude will import the traits to make the
    //! trait methods visible to the rust compiler, and
    //! then clobber them immediately. Therefore, user
    //! must explicitly import the type they need.
    pub use crate::EventSource as _;
    pub use crate::Flow as _;
    pub use crate::Pipeline as _;
    pub use crate::Signal as _;
    pub use crate::Sink as _;
    pub use crate::Source as _;
    pub use crate::SourceExt as _;
}

#[doc(hidden)]
#[cfg(test)]
pub(crate) mod testutil;
