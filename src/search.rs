use smallvec::SmallVec;
use typed_arena::Arena;

use crate::problems::eight_puzzle::Board;
use crate::problems::eight_puzzle::Move;
use crate::problems::eight_puzzle::MoveCount;
use crate::problems::eight_puzzle::PuzzleError;
use crate::space::Path;
use crate::space::PathStep;

/// A node of the search tree.
///
/// Nodes point to their parent, never to their children, so the links can't
/// form cycles. Parents live in the same `SearchTree` as their children.
#[derive(Debug)]
pub struct SearchNode<'a> {
    parent: Option<&'a SearchNode<'a>>,
    /// The move that turned the parent's board into this one.
    action: Option<Move>,
    state: Board,
    g: MoveCount,
    f: MoveCount,
}

impl<'a> SearchNode<'a> {
    /// A parentless node with `g = f = 0`.
    #[must_use]
    pub fn root(state: Board) -> Self {
        Self {
            parent: None,
            action: None,
            state,
            g: 0,
            f: 0,
        }
    }

    #[inline(always)]
    pub fn state(&self) -> &Board {
        &self.state
    }
    #[inline(always)]
    pub fn parent(&self) -> Option<&'a SearchNode<'a>> {
        self.parent
    }
    #[inline(always)]
    pub fn action(&self) -> Option<Move> {
        self.action
    }
    #[inline(always)]
    pub fn g(&self) -> MoveCount {
        self.g
    }
    #[inline(always)]
    pub fn f(&self) -> MoveCount {
        self.f
    }

    /// Sets `f = g + h`.
    #[inline(always)]
    pub fn score(&mut self, h: MoveCount) {
        self.f = self.g.saturating_add(h);
    }

    /// Children reached by each valid blank move, in `Move::ALL` order.
    ///
    /// Children start unscored with `f = g`, see `SearchNode::score`.
    pub fn generate_children(&'a self) -> Result<SmallVec<[SearchNode<'a>; 4]>, PuzzleError> {
        let g = self.g + 1;
        Ok(self
            .state
            .neighbours()?
            .into_iter()
            .map(|(state, action)| SearchNode {
                parent: Some(self),
                action: Some(action),
                state,
                g,
                f: g,
            })
            .collect())
    }

    /// Follows the parents back to the root.
    ///
    /// The root comes first and `self` last.
    #[must_use]
    pub fn reconstruct_path(&self) -> Path {
        #[cfg(feature = "coz_profile")]
        coz::scope!("PathReconstruction");

        let mut steps = Vec::<PathStep>::with_capacity(self.g as usize + 1);
        let mut node = Some(self);
        while let Some(n) = node {
            steps.push(PathStep {
                board: n.state,
                action: n.action,
                g: n.g,
            });
            debug_assert!(n.parent.is_none_or(|p| p.g + 1 == n.g));
            node = n.parent;
        }

        steps.reverse();
        Path::from_steps(steps)
    }
}

/// Owns every node created during one search.
///
/// Nodes are never freed individually, they all go away with the tree.
pub(crate) struct SearchTree<'a> {
    nodes: Arena<SearchNode<'a>>,
}

impl<'a> SearchTree<'a> {
    #[inline(always)]
    #[must_use]
    pub(crate) fn new() -> Self {
        Self {
            nodes: Arena::new(),
        }
    }

    #[inline(always)]
    pub(crate) fn push(&'a self, node: SearchNode<'a>) -> &'a SearchNode<'a> {
        self.nodes.alloc(node)
    }

    #[inline(always)]
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }
}

impl std::fmt::Debug for SearchTree<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "SearchTree{{({} nodes)}}", self.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board(s: &str) -> Board {
        s.parse().unwrap()
    }

    #[test]
    fn root() {
        let n = SearchNode::root(Board::solved());
        assert_eq!(n.g(), 0);
        assert_eq!(n.f(), 0);
        assert!(n.parent().is_none());
        assert!(n.action().is_none());
    }

    #[test]
    fn children_count_follows_the_blank() {
        for (s, expected) in [("123456780", 2), ("123456708", 3), ("123405678", 4)] {
            let n = SearchNode::root(board(s));
            let children = n.generate_children().unwrap();
            assert_eq!(children.len(), expected);
            for c in &children {
                assert_eq!(c.g(), 1);
                assert_eq!(c.f(), 1);
                assert_eq!(c.parent().map(|p| *p.state()), Some(board(s)));
                assert!(Board::new(c.state().tiles()).is_ok());
                assert_eq!(board(s).apply_move(c.action().unwrap()), Ok(*c.state()));
            }
        }
    }

    #[test]
    fn score() {
        let root = SearchNode::root(board("123405678"));
        let mut child = root.generate_children().unwrap().remove(0);
        child.score(7);
        assert_eq!(child.g(), 1);
        assert_eq!(child.f(), 8);
    }

    #[test]
    fn reconstruct_path_through_the_tree() {
        let tree = SearchTree::new();
        let root = tree.push(SearchNode::root(board("123804765")));

        let up = root.generate_children().unwrap().remove(0);
        assert_eq!(up.action(), Some(Move::Up));
        let up = tree.push(up);

        let left = up
            .generate_children()
            .unwrap()
            .into_iter()
            .find(|c| c.action() == Some(Move::Left))
            .unwrap();
        let left = tree.push(left);
        assert_eq!(tree.len(), 3);

        let path = left.reconstruct_path();
        assert!(path.is_valid());
        assert_eq!(path.start(), Some(&board("123804765")));
        assert_eq!(path.end(), Some(&board("013824765")));
        assert_eq!(path.cost(), Some(2));

        let root_path = root.reconstruct_path();
        assert_eq!(root_path.len(), 1);
        assert_eq!(root_path.cost(), Some(0));
    }
}
