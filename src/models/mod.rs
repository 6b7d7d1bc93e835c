pub mod feed;
pub mod film;
pub mod review;
pub mod user;

pub use feed::{EventId, EventType, FeedEvent, NewFeedEvent, Operation};
pub use film::{
    Director, DirectorDraft, DirectorId, EntityRef, Film, FilmDraft, FilmId, Genre, GenreId,
    RatingClassification, RatingId,
};
pub use review::{Review, ReviewDraft, ReviewEdit, ReviewId};
pub use user::{User, UserDraft, UserId};
