use std::marker::PhantomData;
use std::time::Duration;

use derive_more::Display;
use hrsw::Stopwatch;
use rustc_hash::FxHashSet;

use crate::data_structures::frontier::Frontier;
use crate::problems::eight_puzzle::Board;
use crate::problems::eight_puzzle::HeuristicKind;
use crate::problems::eight_puzzle::InputError;
use crate::problems::eight_puzzle::ManhattanDistance;
use crate::problems::eight_puzzle::MisplacedTiles;
use crate::problems::eight_puzzle::MoveCount;
use crate::problems::eight_puzzle::PuzzleError;
use crate::problems::eight_puzzle::TILES;
use crate::problems::eight_puzzle::ZeroHeuristic;
use crate::search::SearchNode;
use crate::search::SearchTree;
use crate::space::Heuristic;
use crate::space::Path;

/// The ranking tuple for A*
///
/// We prefer better f-values, tie break for lower h, and then for the node
/// that entered the frontier first.
///
/// ```
/// use eight_puzzle::algorithms::astar::AStarRank;
///
/// assert!(AStarRank::new(2, 0, 1) < AStarRank::new(2, 1, 0));
/// assert!(AStarRank::new(0, 2, 0) < AStarRank::new(2, 0, 1));
/// assert!(AStarRank::new(1, 1, 3) < AStarRank::new(1, 1, 4));
/// ```
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct AStarRank {
    f: MoveCount,
    h: MoveCount,
    /// Insertion order into the frontier.
    order: u64,
}
impl AStarRank {
    pub fn new(g: MoveCount, h: MoveCount, order: u64) -> Self {
        Self {
            f: g.saturating_add(h),
            h,
            order,
        }
    }
    pub fn f(&self) -> MoveCount {
        self.f
    }
    pub fn h(&self) -> MoveCount {
        self.h
    }
}

#[derive(Debug)]
pub struct AStarHeapNode<'a> {
    /// The rank of this node that defines how good it is.
    pub rank: AStarRank,
    /// The node in the Search Tree.
    pub node: &'a SearchNode<'a>,
}

impl PartialEq for AStarHeapNode<'_> {
    #[inline(always)]
    fn eq(&self, other: &Self) -> bool {
        self.rank.eq(&other.rank)
    }
}
impl Eq for AStarHeapNode<'_> {}

impl PartialOrd for AStarHeapNode<'_> {
    #[inline(always)]
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for AStarHeapNode<'_> {
    #[inline(always)]
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.rank.cmp(&other.rank)
    }
}

/// Where an `AStarSearch` is at.
#[derive(Copy, Clone, Debug, Display, PartialEq, Eq)]
pub enum SearchPhase {
    Ready,
    Expanding,
    Found,
    Exhausted,
}

/// Counters of a finished search.
#[derive(Clone, Debug)]
pub struct SearchStats {
    /// Size of the explored set when the search stopped.
    pub nodes_explored: usize,
    /// Nodes placed in the Search Tree, the root included.
    pub nodes_generated: usize,
    /// Largest size of the frontier.
    pub frontier_peak: usize,
    pub elapsed: Duration,
}

impl SearchStats {
    pub fn write_stats<W: std::io::Write>(&self, mut out: W) -> std::io::Result<()> {
        use human_duration::human_duration;
        use size::Size;
        use std::mem::size_of;
        use thousands::Separable;

        writeln!(out, "AStarSearch Stats:")?;
        let s = size_of::<SearchNode<'static>>();
        let l = self.nodes_generated;
        writeln!(
            out,
            "  - |Nodes|:    {} ({})",
            l.separate_with_commas(),
            Size::from_bytes(l * s)
        )?;
        let s = size_of::<AStarHeapNode<'static>>();
        let l = self.frontier_peak;
        writeln!(
            out,
            "  - |Open|*:    {} ({})",
            l.separate_with_commas(),
            Size::from_bytes(l * s)
        )?;
        let s = size_of::<Board>();
        let l = self.nodes_explored;
        writeln!(
            out,
            "  - |Closed|:   {} ({})",
            l.separate_with_commas(),
            Size::from_bytes(l * s)
        )?;
        writeln!(out, "  - Elapsed:    {}", human_duration(&self.elapsed))?;

        Ok(())
    }
    pub fn print_stats(&self) -> std::io::Result<()> {
        self.write_stats(std::io::stdout().lock())
    }
}

/// What a search hands back.
///
/// An empty path means the frontier ran out before reaching the goal.
#[derive(Clone, Debug)]
pub struct SearchOutcome {
    pub path: Path,
    pub stats: SearchStats,
}

impl SearchOutcome {
    #[inline(always)]
    pub fn is_solved(&self) -> bool {
        !self.path.is_empty()
    }
    #[inline(always)]
    pub fn nodes_explored(&self) -> usize {
        self.stats.nodes_explored
    }
    #[inline(always)]
    pub fn elapsed(&self) -> Duration {
        self.stats.elapsed
    }
    #[inline(always)]
    pub fn elapsed_seconds(&self) -> f64 {
        self.stats.elapsed.as_secs_f64()
    }
    /// The final `g(n)`, if the goal was found.
    #[inline(always)]
    pub fn moves(&self) -> Option<MoveCount> {
        self.path.cost()
    }
}

/// A* over the 8-puzzle with the heuristic `H`.
///
/// The frontier, explored set and Search Tree only live during `run`, so a
/// search can be run again and independent searches share nothing.
///
/// Explored states are never re-opened, even when reached again through a
/// cheaper path. This finds optimal paths as long as `H` is consistent.
#[derive(Debug)]
pub struct AStarSearch<H>
where
    H: Heuristic,
{
    start: Board,
    goal: Board,
    phase: SearchPhase,

    _phantom_heuristic: PhantomData<H>,
}

impl<H> AStarSearch<H>
where
    H: Heuristic,
{
    #[must_use]
    pub fn new(start: Board, goal: Board) -> Self {
        Self {
            start,
            goal,
            phase: SearchPhase::Ready,
            _phantom_heuristic: PhantomData,
        }
    }

    #[inline(always)]
    pub fn phase(&self) -> SearchPhase {
        self.phase
    }
    #[inline(always)]
    pub fn start(&self) -> &Board {
        &self.start
    }
    #[inline(always)]
    pub fn goal(&self) -> &Board {
        &self.goal
    }

    #[inline(always)]
    #[must_use]
    pub(crate) fn h(&self, s: &Board) -> MoveCount {
        H::h(s, &self.goal)
    }

    /// Searches from the start until reaching the goal or running out of
    /// nodes.
    ///
    /// Each call starts over from `SearchPhase::Ready`.
    pub fn run(&mut self) -> Result<SearchOutcome, PuzzleError> {
        #[cfg(feature = "coz_profile")]
        coz::scope!("Run");

        self.phase = SearchPhase::Ready;
        log::debug!(
            "A* ({}) from {:?} to {:?}",
            std::any::type_name::<H>(),
            self.start,
            self.goal
        );

        let mut stopwatch = Stopwatch::new_started();
        let search_tree = SearchTree::new();
        let mut open = Frontier::<AStarHeapNode<'_>>::with_capacity(1024);
        let mut closed = FxHashSet::<Board>::default();
        let mut order = 0u64;

        let root = search_tree.push(SearchNode::root(self.start));
        open.push(AStarHeapNode {
            rank: AStarRank::new(root.g(), 0, order),
            node: root,
        });
        self.phase = SearchPhase::Expanding;

        while let Some(AStarHeapNode { node: current, .. }) = open.pop() {
            #[cfg(feature = "coz_profile")]
            coz::scope!("NodeExpansion");

            if *current.state() == self.goal {
                stopwatch.stop();
                self.phase = SearchPhase::Found;
                let path = current.reconstruct_path();
                log::debug!(
                    "Found {path} after exploring {} states",
                    closed.len()
                );

                return Ok(SearchOutcome {
                    path,
                    stats: SearchStats {
                        nodes_explored: closed.len(),
                        nodes_generated: search_tree.len(),
                        frontier_peak: open.peak_len(),
                        elapsed: stopwatch.elapsed(),
                    },
                });
            }

            // Duplicates of explored states may still sit in the frontier.
            // They get expanded again, but only reach unexplored children.
            if closed.insert(*current.state()) {
                log::trace!("Expanding {:?} (g={}, f={})", current.state(), current.g(), current.f());
            } else {
                log::trace!("Re-expanding {:?} (g={})", current.state(), current.g());
            }

            for mut child in current.generate_children()? {
                if closed.contains(child.state()) {
                    continue;
                }

                let h = self.h(child.state());
                child.score(h);
                order += 1;
                let child = search_tree.push(child);
                open.push(AStarHeapNode {
                    rank: AStarRank::new(child.g(), h, order),
                    node: child,
                });
            }
        }

        stopwatch.stop();
        self.phase = SearchPhase::Exhausted;
        log::debug!(
            "Exhausted the frontier after exploring {} states",
            closed.len()
        );

        Ok(SearchOutcome {
            path: Path::empty(),
            stats: SearchStats {
                nodes_explored: closed.len(),
                nodes_generated: search_tree.len(),
                frontier_peak: open.peak_len(),
                elapsed: stopwatch.elapsed(),
            },
        })
    }
}

/// Searches from `start` to `goal` after checking the goal is reachable.
pub fn solve<H: Heuristic>(start: Board, goal: Board) -> Result<SearchOutcome, PuzzleError> {
    if !goal.is_reachable_from(&start) {
        return Err(InputError::UnreachableGoal { start, goal }.into());
    }

    AStarSearch::<H>::new(start, goal).run()
}

/// Searches from `start` to `goal` given as raw tiles.
///
/// ```
/// use eight_puzzle::algorithms::astar::search;
/// use eight_puzzle::problems::eight_puzzle::ManhattanDistance;
///
/// let outcome = search::<ManhattanDistance>(
///     [1, 2, 3, 4, 5, 6, 7, 0, 8],
///     [1, 2, 3, 4, 5, 6, 7, 8, 0],
/// )
/// .unwrap();
/// assert_eq!(outcome.moves(), Some(1));
/// assert_eq!(outcome.nodes_explored(), 1);
/// ```
pub fn search<H: Heuristic>(
    start: [u8; TILES],
    goal: [u8; TILES],
) -> Result<SearchOutcome, PuzzleError> {
    solve::<H>(Board::new(start)?, Board::new(goal)?)
}

/// Dispatch from a heuristic picked at run time to the matching search.
impl HeuristicKind {
    /// Checks `goal` is reachable and searches for it from `start`.
    pub fn solve(self, start: Board, goal: Board) -> Result<SearchOutcome, PuzzleError> {
        match self {
            HeuristicKind::Misplaced => solve::<MisplacedTiles>(start, goal),
            HeuristicKind::Manhattan => solve::<ManhattanDistance>(start, goal),
            HeuristicKind::Zero => solve::<ZeroHeuristic>(start, goal),
        }
    }

    /// Searches from raw tiles, validating them first.
    pub fn search(self, start: [u8; TILES], goal: [u8; TILES]) -> Result<SearchOutcome, PuzzleError> {
        self.solve(Board::new(start)?, Board::new(goal)?)
    }

    /// Searches without the reachability check.
    pub fn run(self, start: Board, goal: Board) -> Result<SearchOutcome, PuzzleError> {
        match self {
            HeuristicKind::Misplaced => AStarSearch::<MisplacedTiles>::new(start, goal).run(),
            HeuristicKind::Manhattan => AStarSearch::<ManhattanDistance>::new(start, goal).run(),
            HeuristicKind::Zero => AStarSearch::<ZeroHeuristic>::new(start, goal).run(),
        }
    }
}
