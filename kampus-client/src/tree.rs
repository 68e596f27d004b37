use std::collections::HashMap;

use crate::api::{Comment, CommentId, UserId, VoteDirection};

/// A comment plus everything the thread screen derives from the flat rows:
/// its replies in chronological order and the viewer's own vote on it.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CommentNode {
    pub comment: Comment,
    /// The requesting viewer's own vote, if any
    pub viewer_vote: Option<VoteDirection>,
    /// Replies, ascending by creation time
    pub children: Vec<CommentNode>,
}

/// Reconstructs the comment forest for one post from its flat rows.
///
/// Two passes over the list plus an id index, so this stays O(n) however the
/// rows arrive. A comment whose parent_id does not resolve against the
/// fetched set is kept as a root rather than dropped. Sibling lists are
/// sorted ascending by created_at, stably, so ties keep their input order.
pub fn build_tree(flat: Vec<Comment>, viewer: Option<UserId>) -> Vec<CommentNode> {
    // Pass one: index every id so parent links resolve in O(1)
    let mut index = HashMap::with_capacity(flat.len());
    for (i, c) in flat.iter().enumerate() {
        index.insert(c.id, i);
    }

    // Pass two: partition into roots and per-parent child lists
    let mut roots = Vec::new();
    let mut children_of: Vec<Vec<usize>> = vec![Vec::new(); flat.len()];
    for (i, c) in flat.iter().enumerate() {
        match c.parent_id.and_then(|p| index.get(&p).copied()) {
            Some(parent) => children_of[parent].push(i),
            None => {
                if c.parent_id.is_some() {
                    tracing::warn!(
                        comment = ?c.id,
                        parent = ?c.parent_id,
                        "comment replies to a parent that was not fetched, keeping it as a root"
                    );
                }
                roots.push(i);
            }
        }
    }

    // Assembly consumes each slot at most once, so a row whose parent chain
    // loops back on itself (self-reference included) simply never gets
    // assembled instead of recursing forever
    let mut slots: Vec<Option<Comment>> = flat.into_iter().map(Some).collect();
    assemble(&mut slots, &children_of, &roots, viewer)
}

fn assemble(
    slots: &mut [Option<Comment>],
    children_of: &[Vec<usize>],
    ids: &[usize],
    viewer: Option<UserId>,
) -> Vec<CommentNode> {
    let mut nodes = ids
        .iter()
        .filter_map(|&i| {
            let comment = slots[i].take()?;
            let children = assemble(slots, children_of, &children_of[i], viewer);
            let viewer_vote = comment.viewer_vote(viewer);
            Some(CommentNode {
                comment,
                viewer_vote,
                children,
            })
        })
        .collect::<Vec<_>>();
    nodes.sort_by_key(|n| n.comment.created_at);
    nodes
}

pub fn node_count(forest: &[CommentNode]) -> usize {
    forest.iter().map(|n| 1 + node_count(&n.children)).sum()
}

pub fn find(forest: &[CommentNode], id: CommentId) -> Option<&CommentNode> {
    for node in forest.iter() {
        if node.comment.id == id {
            return Some(node);
        }
        if let Some(found) = find(&node.children, id) {
            return Some(found);
        }
    }
    None
}

/// Locates one node anywhere in the (possibly multi-level) forest so the
/// caller can update it in place, leaving siblings and ancestors untouched
pub fn find_mut(forest: &mut [CommentNode], id: CommentId) -> Option<&mut CommentNode> {
    for node in forest.iter_mut() {
        if node.comment.id == id {
            return Some(node);
        }
        if let Some(found) = find_mut(&mut node.children, id) {
            return Some(found);
        }
    }
    None
}

/// Filters the node out of its sibling list, recursing into the survivors.
/// Replies under the removed node go with it instead of being promoted into
/// the parent's sibling list; that is what the production screens have
/// always done, and product has not decided otherwise.
pub fn remove_by_id(forest: &mut Vec<CommentNode>, id: CommentId) -> bool {
    let before = forest.len();
    forest.retain(|n| n.comment.id != id);
    let mut removed = forest.len() != before;
    for node in forest.iter_mut() {
        removed = remove_by_id(&mut node.children, id) || removed;
    }
    removed
}
