//! # Correlator
//!
//! Change-expectation correlation for treewatch.
//!
//! The correlator drives load against a watched tree and measures
//! whether the watcher's notifications keep up: each round picks a
//! random directory, registers an expectation with a deadline, mutates
//! a marker file there, and counts the expectation as received or lost
//! depending on which side of the deadline the notification lands.

pub mod correlator;

pub use correlator::{
    ChangeCorrelator, CorrelatorStats, MARKER_FILE, MAX_DEPTH, MAX_WAIT, RoundOutcome,
};
