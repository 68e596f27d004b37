use crate::api::VoteDirection;

/// An entity's counts plus the viewer's own vote, exactly as currently
/// displayed. Built from the displayed state held by the thread, never
/// recomputed from the fetched vote records, which go stale as soon as an
/// optimistic update lands.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct VoteSnapshot {
    pub like_count: i64,
    pub dislike_count: i64,
    pub viewer_vote: Option<VoteDirection>,
}

impl VoteSnapshot {
    pub fn score(&self) -> i64 {
        self.like_count - self.dislike_count
    }
}

/// The single store mutation an optimistic vote change still has to be
/// confirmed by
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum VoteOp {
    Create(VoteDirection),
    Update(VoteDirection),
    Delete,
}

/// The three-state toggle: no vote yet creates one, the same direction again
/// undoes it, the opposite direction switches it. Pure; the caller applies
/// the returned snapshot optimistically and issues the returned op.
pub fn apply_vote(snap: &VoteSnapshot, requested: VoteDirection) -> (VoteSnapshot, VoteOp) {
    let mut next = *snap;
    let op = match snap.viewer_vote {
        None => {
            bump(&mut next, requested, 1);
            next.viewer_vote = Some(requested);
            VoteOp::Create(requested)
        }
        Some(current) if current == requested => {
            bump(&mut next, current, -1);
            next.viewer_vote = None;
            VoteOp::Delete
        }
        Some(_) => {
            // switch: the old vote was necessarily in the opposite direction
            bump(&mut next, requested.flip(), -1);
            bump(&mut next, requested, 1);
            next.viewer_vote = Some(requested);
            VoteOp::Update(requested)
        }
    };
    (next, op)
}

fn bump(snap: &mut VoteSnapshot, direction: VoteDirection, by: i64) {
    match direction {
        VoteDirection::Up => snap.like_count += by,
        VoteDirection::Down => snap.dislike_count += by,
    }
}
