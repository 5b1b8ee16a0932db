mod cast_vote;
mod open_votes;
mod resolve_votes;

pub use cast_vote::CastCinemaVoteUseCase;
pub use open_votes::OpenCinemaVotesUseCase;
pub use resolve_votes::ResolveCinemaVotesUseCase;
