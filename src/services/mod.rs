/// Business logic layer for pulse-service
///
/// - Aggregator: joins posts with comments, reactions, and directory
///   profiles into enriched views
/// - Feed: paginated feed slices over the aggregator
/// - Reactions: strict add/remove ledger for typed reactions
/// - Follows: follower/following edge maintenance and existence queries
/// - Posts: post creation, owner-checked deletion, comment creation
pub mod aggregator;
pub mod feed;
pub mod follows;
pub mod posts;
pub mod reactions;

pub use aggregator::PostAggregator;
pub use feed::{FeedAssembler, FeedScope};
pub use follows::FollowGraph;
pub use posts::PostService;
pub use reactions::ReactionLedger;
