//! Typed index into the beachline's node arena, grounded on the
//! typed-index idiom used elsewhere in the example pack for arena
//! handles (`TypedIndex<T>`), adapted here to the single concrete type
//! the beachline needs.

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);
