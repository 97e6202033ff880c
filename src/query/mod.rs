//! Replays governance activity from the node's transaction index.
//!
//! Pipeline for one logical query:
//! [`planner`] builds predicate groups for every historical encoding,
//! [`search`] unions their index pages, [`block_time`] resolves block times
//! once per height, [`format`] decodes the transactions, [`extract`] turns
//! messages into records and [`paginate`] drives index pages lazily until the
//! requested window is filled. [`denom`] is the balance-side counterpart.

pub mod block_time;
pub mod denom;
pub mod extract;
pub mod format;
pub mod paginate;
pub mod planner;
pub mod search;
