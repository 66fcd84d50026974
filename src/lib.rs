//! Log processing core for pod log viewers.
//!
//! This crate turns raw log byte streams into structured, displayable,
//! searchable records:
//!
//! - [`LogItem`] parses one raw line into a timestamp/message record and
//!   renders it as a colorized display line.
//! - [`LogItems`] holds an ordered collection of records and provides bulk
//!   rendering plus [`filter`](LogItems::filter)ing by regular expression
//!   (optionally inverted with a leading `!`) or fuzzy subsequence query
//!   (leading `-f`).
//! - [`LogModifier`]s registered by name post-process rendered lines; the
//!   built-in [`JsonPrettyModifier`] reformats single-line JSON logs.
//!
//! Terminal layout, log collection, and Kubernetes API access live in the
//! embedding application; this crate only transforms already-received lines.

mod color;
mod filter;
mod item;
mod modifier;

pub use color::{TIMESTAMP_COLOR, ansi_colorize, color_for};
pub use filter::{
    FUZZY_SELECTOR, FilterMatches, INVERSE_SELECTOR, is_fuzzy_selector, is_inverse_selector,
};
pub use item::{LogItem, LogItems};
pub use modifier::{JSON_PRETTY, JsonPrettyModifier, LogModifier, register_modifier};
