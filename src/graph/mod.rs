//! Adjacency-map views of the like and friendship edges.
//!
//! Both graphs are plain value snapshots keyed by integer ids; they never hold
//! references to users or films.

pub mod friends;
pub mod likes;

pub use friends::FriendGraph;
pub use likes::LikeGraph;
