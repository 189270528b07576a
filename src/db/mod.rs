/// Database access layer
///
/// Repository modules over a shared PgPool, one per entity. Feed listings
/// order by (created_at DESC, id DESC) so pagination stays deterministic
/// when timestamps collide. Uniqueness invariants (reaction triples, follow
/// edges) are enforced by database constraints, not application reads.
pub mod comment_repo;
pub mod follow_repo;
pub mod post_repo;
pub mod reaction_repo;
