//! Governance domain entities.
//!
//! Each module defines a state type, an [`EntityKind`](crate::EntityKind)
//! marker with the collection's query allow-list and decoder, a type alias
//! for the entity handle and its relation helpers.

pub mod dao;
pub mod event;
pub mod member;
pub mod proposal;
pub mod queue;
pub mod scheme;
pub mod stake;
pub mod token;
pub mod vote;

pub use dao::{Dao, DaoKind, DaoState};
pub use event::{Event, EventKind, EventState};
pub use member::{member_id, Member, MemberKind, MemberState};
pub use proposal::{
    confidence_at, GenericCall, Proposal, ProposalKind, ProposalOutcome, ProposalRewards,
    ProposalStage, ProposalState,
};
pub use queue::{Queue, QueueKind, QueueState};
pub use scheme::{Scheme, SchemeKind, SchemeState};
pub use stake::{Stake, StakeKind, StakeState};
pub use token::{Token, TokenKind, TokenState};
pub use vote::{Vote, VoteKind, VoteState};
