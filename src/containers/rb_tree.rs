//! Red-black tree over arena-allocated nodes with stable cursors
//!
//! The tree stores its nodes in a slot arena (`Vec` plus a free list) and
//! links them with 32-bit handles instead of pointers. Rotations and
//! rebalancing relink handles; a node never moves in memory and its handle
//! never changes while it is live, so cursors survive arbitrary insertions
//! and erasures elsewhere in the tree. The arena also keeps the whole
//! structure in safe code: a stale cursor dereferences to `None`, never to
//! freed memory.
//!
//! Balancing follows the classical red-black insertion and deletion
//! algorithms. The four mirrored rotation cases of each fixup are folded
//! into two by parameterizing on a [`Side`], which keeps the state machine
//! in one copy.

use crate::compare::{Compare, Natural};
use crate::error::{Result, SequoraError};
use std::borrow::Borrow;
use std::cmp::Ordering;
use std::fmt;
use std::iter::FusedIterator;
use std::mem;

/// Node color for the balancing invariant.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Color {
    Red,
    Black,
}

/// Arena handle. `NIL` plays the role of the null pointer.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
struct NodeId(u32);

impl NodeId {
    const NIL: NodeId = NodeId(u32::MAX);

    #[inline]
    fn index(self) -> usize {
        self.0 as usize
    }

    #[inline]
    fn is_nil(self) -> bool {
        self == Self::NIL
    }
}

/// Which child link of a node, used to fold mirrored rebalancing cases.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Side {
    Left,
    Right,
}

impl Side {
    #[inline]
    fn flip(self) -> Side {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}

#[derive(Clone)]
struct Node<T> {
    parent: NodeId,
    left: NodeId,
    right: NodeId,
    color: Color,
    /// `None` marks a recycled slot awaiting reuse through the free list.
    value: Option<T>,
}

/// A stable position in an [`RbTree`].
///
/// A cursor is a copyable handle naming one tree node (or the past-the-end
/// position). It stays valid across insertions, erasures, and rotations
/// affecting *other* nodes; erasing the node it names invalidates it. All
/// dereferencing goes through the owning tree ([`RbTree::get`]), so even a
/// stale cursor is memory-safe: it yields `None` or, if the slot has been
/// recycled, another live element.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Cursor {
    id: NodeId,
}

impl Cursor {
    #[inline]
    fn new(id: NodeId) -> Self {
        Cursor { id }
    }

    /// Whether this cursor is the past-the-end position.
    #[inline]
    pub fn is_end(self) -> bool {
        self.id.is_nil()
    }
}

enum ProbeResult {
    Found(NodeId),
    /// `parent == NIL` means the tree is empty.
    Vacancy {
        parent: NodeId,
        side: Side,
    },
}

/// A self-balancing binary search tree with unique keys.
///
/// `RbTree<T, C>` keeps values of type `T` ordered by a comparator `C`
/// (the natural `Ord` order by default) and rebalances with red/black
/// coloring, bounding every operation at O(log n). It is the storage engine
/// behind [`OrderedSet`](crate::OrderedSet); use the set unless you need
/// cursor-level control.
///
/// Mutating operations that allocate return [`Result`]: allocation failure
/// is reported as an error value and leaves the tree exactly as it was.
///
/// # Examples
///
/// ```rust
/// use sequora::RbTree;
///
/// let mut tree: RbTree<i32> = RbTree::new();
/// for key in [5, 3, 8] {
///     let (_, inserted) = tree.insert_unique(key)?;
///     assert!(inserted);
/// }
///
/// let (_, inserted) = tree.insert_unique(5)?;
/// assert!(!inserted); // duplicate keys are refused, not an error
/// assert_eq!(tree.len(), 3);
/// assert_eq!(tree.iter().copied().collect::<Vec<_>>(), [3, 5, 8]);
/// # Ok::<(), sequora::SequoraError>(())
/// ```
pub struct RbTree<T, C = Natural> {
    nodes: Vec<Node<T>>,
    free: Vec<NodeId>,
    root: NodeId,
    leftmost: NodeId,
    rightmost: NodeId,
    len: usize,
    cmp: C,
}

impl<T, C: Default> RbTree<T, C> {
    /// Create an empty tree with a default-constructed comparator.
    ///
    /// Does not allocate.
    #[inline]
    pub fn new() -> Self {
        Self::with_comparator(C::default())
    }
}

impl<T, C> RbTree<T, C> {
    /// Create an empty tree ordered by `cmp`.
    pub fn with_comparator(cmp: C) -> Self {
        Self {
            nodes: Vec::new(),
            free: Vec::new(),
            root: NodeId::NIL,
            leftmost: NodeId::NIL,
            rightmost: NodeId::NIL,
            len: 0,
            cmp,
        }
    }

    /// Number of elements in the tree.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the tree holds no elements.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Borrow the comparator ordering this tree.
    #[inline]
    pub fn comparator(&self) -> &C {
        &self.cmp
    }

    /// Remove every element and release all node storage.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.free.clear();
        self.root = NodeId::NIL;
        self.leftmost = NodeId::NIL;
        self.rightmost = NodeId::NIL;
        self.len = 0;
    }

    /// Exchange the contents of two trees.
    pub fn swap(&mut self, other: &mut Self) {
        mem::swap(self, other);
    }

    /// Cursor to the smallest element, or [`end`](Self::end) if empty.
    #[inline]
    pub fn begin(&self) -> Cursor {
        Cursor::new(self.leftmost)
    }

    /// The past-the-end cursor.
    #[inline]
    pub fn end(&self) -> Cursor {
        Cursor::new(NodeId::NIL)
    }

    /// The value a cursor refers to, or `None` for end/stale cursors.
    pub fn get(&self, at: Cursor) -> Option<&T> {
        self.nodes.get(at.id.index()).and_then(|n| n.value.as_ref())
    }

    /// Cursor to the in-order successor of `at`.
    ///
    /// The successor of the largest element is [`end`](Self::end); stepping
    /// past the end saturates there.
    pub fn next(&self, at: Cursor) -> Cursor {
        if at.is_end() || !self.is_live(at.id) {
            return self.end();
        }
        Cursor::new(self.successor(at.id))
    }

    /// Cursor to the in-order predecessor of `at`.
    ///
    /// The predecessor of [`end`](Self::end) is the largest element; the
    /// predecessor of the smallest element saturates at `end`.
    pub fn prev(&self, at: Cursor) -> Cursor {
        if at.is_end() {
            return Cursor::new(self.rightmost);
        }
        if !self.is_live(at.id) {
            return self.end();
        }
        Cursor::new(self.predecessor(at.id))
    }

    /// Ordered iteration over the elements, smallest first.
    ///
    /// The iterator is double-ended; `.rev()` gives largest-first order.
    pub fn iter(&self) -> Iter<'_, T, C> {
        Iter {
            tree: self,
            front: self.leftmost,
            back: self.rightmost,
            remaining: self.len,
        }
    }

    /* arena plumbing */

    #[inline]
    fn node(&self, id: NodeId) -> &Node<T> {
        &self.nodes[id.index()]
    }

    #[inline]
    fn node_mut(&mut self, id: NodeId) -> &mut Node<T> {
        &mut self.nodes[id.index()]
    }

    #[inline]
    fn val(&self, id: NodeId) -> &T {
        match self.node(id).value {
            Some(ref v) => v,
            None => unreachable!("vacant slot reached through a live link"),
        }
    }

    #[inline]
    fn is_live(&self, id: NodeId) -> bool {
        self.nodes.get(id.index()).map_or(false, |n| n.value.is_some())
    }

    #[inline]
    fn child(&self, id: NodeId, side: Side) -> NodeId {
        let n = self.node(id);
        match side {
            Side::Left => n.left,
            Side::Right => n.right,
        }
    }

    #[inline]
    fn set_child(&mut self, id: NodeId, side: Side, to: NodeId) {
        let n = self.node_mut(id);
        match side {
            Side::Left => n.left = to,
            Side::Right => n.right = to,
        }
    }

    /// Color of a node, where NIL counts as black.
    #[inline]
    fn color_of(&self, id: NodeId) -> Color {
        if id.is_nil() {
            Color::Black
        } else {
            self.node(id).color
        }
    }

    #[inline]
    fn set_color(&mut self, id: NodeId, color: Color) {
        self.node_mut(id).color = color;
    }

    /// Which child of its parent `n` is. Precondition: `n` has a parent.
    #[inline]
    fn side_of(&self, n: NodeId) -> Side {
        let p = self.node(n).parent;
        if self.node(p).left == n {
            Side::Left
        } else {
            Side::Right
        }
    }

    fn subtree_min(&self, mut n: NodeId) -> NodeId {
        while !self.node(n).left.is_nil() {
            n = self.node(n).left;
        }
        n
    }

    fn subtree_max(&self, mut n: NodeId) -> NodeId {
        while !self.node(n).right.is_nil() {
            n = self.node(n).right;
        }
        n
    }

    fn successor(&self, n: NodeId) -> NodeId {
        let right = self.node(n).right;
        if !right.is_nil() {
            return self.subtree_min(right);
        }
        let mut cur = n;
        let mut p = self.node(cur).parent;
        while !p.is_nil() && self.node(p).right == cur {
            cur = p;
            p = self.node(cur).parent;
        }
        p
    }

    fn predecessor(&self, n: NodeId) -> NodeId {
        let left = self.node(n).left;
        if !left.is_nil() {
            return self.subtree_max(left);
        }
        let mut cur = n;
        let mut p = self.node(cur).parent;
        while !p.is_nil() && self.node(p).left == cur {
            cur = p;
            p = self.node(cur).parent;
        }
        p
    }

    /// Allocate a red node holding `value`, reusing a free slot when one
    /// exists. Fails without touching the tree structure.
    fn alloc_node(&mut self, value: T, parent: NodeId) -> Result<NodeId> {
        let node = Node {
            parent,
            left: NodeId::NIL,
            right: NodeId::NIL,
            color: Color::Red,
            value: Some(value),
        };
        if let Some(id) = self.free.pop() {
            self.nodes[id.index()] = node;
            return Ok(id);
        }
        if self.nodes.len() >= u32::MAX as usize {
            return Err(SequoraError::capacity_overflow(self.nodes.len() + 1));
        }
        self.nodes
            .try_reserve(1)
            .map_err(|_| SequoraError::out_of_memory(mem::size_of::<Node<T>>()))?;
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        Ok(id)
    }

    /// Unlink `id` from the tree and reclaim its slot, returning the value.
    fn erase_id(&mut self, id: NodeId) -> T {
        self.detach(id);
        self.len -= 1;
        let value = match self.node_mut(id).value.take() {
            Some(v) => v,
            None => unreachable!("erased a vacant slot"),
        };
        self.free.push(id);
        value
    }

    /// Rotate `pivot` downward toward `dir`, promoting its opposite child.
    ///
    /// `rotate(p, Side::Left)` is the classical left rotation. Node identity
    /// is preserved: only links move.
    fn rotate(&mut self, pivot: NodeId, dir: Side) {
        let up = self.child(pivot, dir.flip());
        debug_assert!(!up.is_nil(), "rotation needs a child to promote");
        let transfer = self.child(up, dir);
        self.set_child(pivot, dir.flip(), transfer);
        if !transfer.is_nil() {
            self.node_mut(transfer).parent = pivot;
        }
        let p = self.node(pivot).parent;
        self.node_mut(up).parent = p;
        if pivot == self.root {
            self.root = up;
        } else {
            let side = if self.node(p).left == pivot {
                Side::Left
            } else {
                Side::Right
            };
            self.set_child(p, side, up);
        }
        self.set_child(up, dir, pivot);
        self.node_mut(pivot).parent = up;
    }

    /// Link a freshly allocated node under `parent` on `side`, update the
    /// cached extremes, and restore the coloring invariant.
    fn attach(&mut self, parent: NodeId, side: Side, value: T) -> Result<NodeId> {
        let id = self.alloc_node(value, parent)?;
        if parent.is_nil() {
            self.root = id;
            self.leftmost = id;
            self.rightmost = id;
        } else {
            self.set_child(parent, side, id);
            if side == Side::Left && parent == self.leftmost {
                self.leftmost = id;
            }
            if side == Side::Right && parent == self.rightmost {
                self.rightmost = id;
            }
        }
        self.len += 1;
        self.insert_fixup(id);
        Ok(id)
    }

    /// Restore the red-black invariant after inserting the red node `n`.
    fn insert_fixup(&mut self, mut n: NodeId) {
        while n != self.root && self.color_of(self.node(n).parent) == Color::Red {
            let p = self.node(n).parent;
            // a red parent is never the root, so the grandparent exists
            let g = self.node(p).parent;
            let pside = self.side_of(p);
            let uncle = self.child(g, pside.flip());
            if self.color_of(uncle) == Color::Red {
                // push the violation one level up by recoloring
                self.set_color(p, Color::Black);
                self.set_color(uncle, Color::Black);
                self.set_color(g, Color::Red);
                n = g;
            } else {
                if self.side_of(n) == pside.flip() {
                    // inner grandchild: straighten the line first
                    n = p;
                    self.rotate(n, pside);
                }
                let p = self.node(n).parent;
                let g = self.node(p).parent;
                self.set_color(p, Color::Black);
                self.set_color(g, Color::Red);
                self.rotate(g, pside.flip());
                break;
            }
        }
        let root = self.root;
        self.set_color(root, Color::Black);
    }

    /// Unlink node `n`, rebalancing when a black position was removed.
    ///
    /// When `n` has two children its in-order successor takes over its
    /// position by relinking, never by moving values, so handles to every
    /// other node remain valid.
    fn detach(&mut self, n: NodeId) {
        let left = self.node(n).left;
        let right = self.node(n).right;
        let to_splice = if left.is_nil() || right.is_nil() {
            n
        } else {
            self.subtree_min(right)
        };
        let repl = if !self.node(to_splice).left.is_nil() {
            self.node(to_splice).left
        } else {
            self.node(to_splice).right
        };
        let repl_parent;

        if to_splice == n {
            // at most one child: splice n out directly
            repl_parent = self.node(n).parent;
            if !repl.is_nil() {
                self.node_mut(repl).parent = repl_parent;
            }
            if n == self.root {
                self.root = repl;
            } else {
                let side = self.side_of(n);
                self.set_child(repl_parent, side, repl);
            }
            if self.leftmost == n {
                // a leftmost node has no left child
                self.leftmost = if repl.is_nil() {
                    repl_parent
                } else {
                    self.subtree_min(repl)
                };
            }
            if self.rightmost == n {
                self.rightmost = if repl.is_nil() {
                    repl_parent
                } else {
                    self.subtree_max(repl)
                };
            }
        } else {
            // two children: the successor (minimum of the right subtree,
            // itself without a left child) takes over n's position
            let nl = self.node(n).left;
            let nr = self.node(n).right;
            self.node_mut(to_splice).left = nl;
            self.node_mut(nl).parent = to_splice;
            if to_splice != nr {
                repl_parent = self.node(to_splice).parent;
                if !repl.is_nil() {
                    self.node_mut(repl).parent = repl_parent;
                }
                // the successor is a left child here
                self.node_mut(repl_parent).left = repl;
                self.node_mut(to_splice).right = nr;
                self.node_mut(nr).parent = to_splice;
            } else {
                repl_parent = to_splice;
            }
            let np = self.node(n).parent;
            if n == self.root {
                self.root = to_splice;
            } else {
                let side = self.side_of(n);
                self.set_child(np, side, to_splice);
            }
            self.node_mut(to_splice).parent = np;
            // the position keeps its color, the departing node takes the
            // successor's so the removed color is n's current one below
            let tc = self.node(to_splice).color;
            let nc = self.node(n).color;
            self.node_mut(to_splice).color = nc;
            self.node_mut(n).color = tc;
            // n had two children, so it was neither leftmost nor rightmost
        }

        if self.color_of(n) == Color::Black {
            self.delete_fixup(repl, repl_parent);
        }
    }

    /// Classical delete rebalancing: `x` (possibly NIL) carries a deficit of
    /// one black node and `xp` is its parent.
    fn delete_fixup(&mut self, mut x: NodeId, mut xp: NodeId) {
        while x != self.root && self.color_of(x) == Color::Black {
            let side = if self.node(xp).left == x {
                Side::Left
            } else {
                Side::Right
            };
            let mut w = self.child(xp, side.flip());
            debug_assert!(!w.is_nil(), "deficit node must have a sibling");
            if self.color_of(w) == Color::Red {
                self.set_color(w, Color::Black);
                self.set_color(xp, Color::Red);
                self.rotate(xp, side);
                w = self.child(xp, side.flip());
            }
            let near = self.child(w, side);
            let far = self.child(w, side.flip());
            if self.color_of(near) == Color::Black && self.color_of(far) == Color::Black {
                // sibling can absorb one black: move the deficit upward
                self.set_color(w, Color::Red);
                x = xp;
                xp = self.node(xp).parent;
            } else {
                if self.color_of(far) == Color::Black {
                    // near child is red: straighten toward the far side
                    self.set_color(near, Color::Black);
                    self.set_color(w, Color::Red);
                    self.rotate(w, side.flip());
                    w = self.child(xp, side.flip());
                }
                let pc = self.node(xp).color;
                self.set_color(w, pc);
                self.set_color(xp, Color::Black);
                let far = self.child(w, side.flip());
                if !far.is_nil() {
                    self.set_color(far, Color::Black);
                }
                self.rotate(xp, side);
                break;
            }
        }
        if !x.is_nil() {
            self.set_color(x, Color::Black);
        }
    }

    /* keyed lookups */

    /// Cursor to the element equal to `key`, or [`end`](Self::end).
    pub fn find<Q>(&self, key: &Q) -> Cursor
    where
        T: Borrow<Q>,
        Q: ?Sized,
        C: Compare<Q>,
    {
        let mut cur = self.root;
        while !cur.is_nil() {
            match self.cmp.compare(key, self.val(cur).borrow()) {
                Ordering::Less => cur = self.node(cur).left,
                Ordering::Greater => cur = self.node(cur).right,
                Ordering::Equal => return Cursor::new(cur),
            }
        }
        self.end()
    }

    /// Whether an element equal to `key` is present.
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: ?Sized,
        C: Compare<Q>,
    {
        !self.find(key).is_end()
    }

    /// Cursor to the first element not less than `key`.
    ///
    /// An element equal to `key` is never skipped.
    pub fn lower_bound<Q>(&self, key: &Q) -> Cursor
    where
        T: Borrow<Q>,
        Q: ?Sized,
        C: Compare<Q>,
    {
        let mut result = NodeId::NIL;
        let mut cur = self.root;
        while !cur.is_nil() {
            if self.cmp.compare(self.val(cur).borrow(), key) == Ordering::Less {
                cur = self.node(cur).right;
            } else {
                result = cur;
                cur = self.node(cur).left;
            }
        }
        Cursor::new(result)
    }

    /// Cursor to the first element greater than `key`.
    pub fn upper_bound<Q>(&self, key: &Q) -> Cursor
    where
        T: Borrow<Q>,
        Q: ?Sized,
        C: Compare<Q>,
    {
        let mut result = NodeId::NIL;
        let mut cur = self.root;
        while !cur.is_nil() {
            if self.cmp.compare(self.val(cur).borrow(), key) == Ordering::Greater {
                result = cur;
                cur = self.node(cur).left;
            } else {
                cur = self.node(cur).right;
            }
        }
        Cursor::new(result)
    }

    /// Number of elements equal to `key` (0 or 1 under unique keys).
    pub fn count_unique<Q>(&self, key: &Q) -> usize
    where
        T: Borrow<Q>,
        Q: ?Sized,
        C: Compare<Q>,
    {
        if self.contains(key) {
            1
        } else {
            0
        }
    }

    /// The half-open cursor range of elements equal to `key`.
    pub fn equal_range_unique<Q>(&self, key: &Q) -> (Cursor, Cursor)
    where
        T: Borrow<Q>,
        Q: ?Sized,
        C: Compare<Q>,
    {
        let first = self.find(key);
        if first.is_end() {
            (self.end(), self.end())
        } else {
            (first, self.next(first))
        }
    }

    /// Remove the element equal to `key`, returning it.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<T>
    where
        T: Borrow<Q>,
        Q: ?Sized,
        C: Compare<Q>,
    {
        let at = self.find(key);
        if at.is_end() {
            None
        } else {
            Some(self.erase_id(at.id))
        }
    }
}

impl<T, C: Compare<T>> RbTree<T, C> {
    fn probe(&self, key: &T) -> ProbeResult {
        let mut cur = self.root;
        let mut parent = NodeId::NIL;
        let mut side = Side::Left;
        while !cur.is_nil() {
            parent = cur;
            match self.cmp.compare(key, self.val(cur)) {
                Ordering::Less => {
                    side = Side::Left;
                    cur = self.node(cur).left;
                }
                Ordering::Greater => {
                    side = Side::Right;
                    cur = self.node(cur).right;
                }
                Ordering::Equal => return ProbeResult::Found(cur),
            }
        }
        ProbeResult::Vacancy { parent, side }
    }

    /// Insert `value` if no equivalent element exists.
    ///
    /// Returns the cursor to the inserted element and `true`, or the cursor
    /// to the existing equivalent element and `false`. A duplicate is a
    /// defined outcome, not an error; only allocation failure errors, and it
    /// leaves the tree untouched.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use sequora::RbTree;
    ///
    /// let mut tree: RbTree<&str> = RbTree::new();
    /// assert!(tree.insert_unique("a")?.1);
    /// assert!(!tree.insert_unique("a")?.1);
    /// assert_eq!(tree.len(), 1);
    /// # Ok::<(), sequora::SequoraError>(())
    /// ```
    pub fn insert_unique(&mut self, value: T) -> Result<(Cursor, bool)> {
        match self.probe(&value) {
            ProbeResult::Found(id) => Ok((Cursor::new(id), false)),
            ProbeResult::Vacancy { parent, side } => {
                let id = self.attach(parent, side, value)?;
                Ok((Cursor::new(id), true))
            }
        }
    }

    /// Insert `value` using `hint` as a position hint.
    ///
    /// When `hint` or one of its neighbors is adjacent to the correct
    /// position the insertion point is found in O(1); otherwise this falls
    /// back to a full search. Stale hints are tolerated and trigger the
    /// fallback.
    pub fn insert_unique_at(&mut self, hint: Cursor, value: T) -> Result<(Cursor, bool)> {
        if !hint.is_end() && !self.is_live(hint.id) {
            return self.insert_unique(value);
        }
        if hint.is_end() {
            if !self.rightmost.is_nil()
                && self.cmp.compare(self.val(self.rightmost), &value) == Ordering::Less
            {
                let rm = self.rightmost;
                let id = self.attach(rm, Side::Right, value)?;
                return Ok((Cursor::new(id), true));
            }
            return self.insert_unique(value);
        }
        match self.cmp.compare(&value, self.val(hint.id)) {
            Ordering::Equal => Ok((hint, false)),
            Ordering::Less => {
                if hint.id == self.leftmost {
                    let lm = self.leftmost;
                    let id = self.attach(lm, Side::Left, value)?;
                    return Ok((Cursor::new(id), true));
                }
                let before = self.predecessor(hint.id);
                match self.cmp.compare(self.val(before), &value) {
                    Ordering::Less => {
                        // before < value < hint: exactly one adjacent link is free
                        let id = if self.node(before).right.is_nil() {
                            self.attach(before, Side::Right, value)?
                        } else {
                            self.attach(hint.id, Side::Left, value)?
                        };
                        Ok((Cursor::new(id), true))
                    }
                    Ordering::Equal => Ok((Cursor::new(before), false)),
                    Ordering::Greater => self.insert_unique(value),
                }
            }
            Ordering::Greater => {
                if hint.id == self.rightmost {
                    let rm = self.rightmost;
                    let id = self.attach(rm, Side::Right, value)?;
                    return Ok((Cursor::new(id), true));
                }
                let after = self.successor(hint.id);
                match self.cmp.compare(&value, self.val(after)) {
                    Ordering::Less => {
                        let id = if self.node(after).left.is_nil() {
                            self.attach(after, Side::Left, value)?
                        } else {
                            self.attach(hint.id, Side::Right, value)?
                        };
                        Ok((Cursor::new(id), true))
                    }
                    Ordering::Equal => Ok((Cursor::new(after), false)),
                    Ordering::Greater => self.insert_unique(value),
                }
            }
        }
    }

    /// Erase the element at `at`, returning the cursor to its successor.
    ///
    /// Erasing the end cursor is a precondition violation (debug assertion);
    /// in release builds the call is a no-op returning `end()`.
    pub fn erase(&mut self, at: Cursor) -> Cursor {
        debug_assert!(!at.is_end(), "erase on the end cursor");
        if at.is_end() || !self.is_live(at.id) {
            return self.end();
        }
        let next = self.successor(at.id);
        let _ = self.erase_id(at.id);
        Cursor::new(next)
    }

    /// Erase every element in the half-open cursor range `[first, last)`.
    ///
    /// Returns `last`. Erasing the full range is equivalent to
    /// [`clear`](Self::clear).
    pub fn erase_range(&mut self, first: Cursor, last: Cursor) -> Cursor {
        if first == self.begin() && last.is_end() {
            self.clear();
            return self.end();
        }
        let mut cur = first;
        while cur != last && !cur.is_end() {
            cur = self.erase(cur);
        }
        cur
    }
}

impl<T, C: Default> Default for RbTree<T, C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone, C: Clone> Clone for RbTree<T, C> {
    /// Deep copy preserving the exact node structure and color layout, so
    /// the clone is a valid red-black tree without any rebuilding.
    fn clone(&self) -> Self {
        Self {
            nodes: self.nodes.clone(),
            free: self.free.clone(),
            root: self.root,
            leftmost: self.leftmost,
            rightmost: self.rightmost,
            len: self.len,
            cmp: self.cmp.clone(),
        }
    }
}

impl<T, C: Compare<T> + Default> FromIterator<T> for RbTree<T, C> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut tree = Self::new();
        for value in iter {
            tree.insert_unique(value).unwrap();
        }
        tree
    }
}

impl<T: Ord, const N: usize> From<[T; N]> for RbTree<T> {
    fn from(values: [T; N]) -> Self {
        values.into_iter().collect()
    }
}

impl<T: fmt::Debug, C> fmt::Debug for RbTree<T, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T: PartialEq, C> PartialEq for RbTree<T, C> {
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len && self.iter().zip(other.iter()).all(|(a, b)| a == b)
    }
}

impl<T: Eq, C> Eq for RbTree<T, C> {}

/// Ordered borrowing iterator over an [`RbTree`].
pub struct Iter<'a, T, C = Natural> {
    tree: &'a RbTree<T, C>,
    front: NodeId,
    back: NodeId,
    remaining: usize,
}

impl<'a, T, C> Iterator for Iter<'a, T, C> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        if self.remaining == 0 {
            return None;
        }
        let id = self.front;
        self.remaining -= 1;
        if self.remaining > 0 {
            self.front = self.tree.successor(id);
        }
        Some(self.tree.val(id))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, T, C> DoubleEndedIterator for Iter<'a, T, C> {
    fn next_back(&mut self) -> Option<&'a T> {
        if self.remaining == 0 {
            return None;
        }
        let id = self.back;
        self.remaining -= 1;
        if self.remaining > 0 {
            self.back = self.tree.predecessor(id);
        }
        Some(self.tree.val(id))
    }
}

impl<T, C> ExactSizeIterator for Iter<'_, T, C> {}
impl<T, C> FusedIterator for Iter<'_, T, C> {}

impl<T, C> Clone for Iter<'_, T, C> {
    fn clone(&self) -> Self {
        Iter {
            tree: self.tree,
            front: self.front,
            back: self.back,
            remaining: self.remaining,
        }
    }
}

impl<'a, T, C> IntoIterator for &'a RbTree<T, C> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T, C>;

    fn into_iter(self) -> Iter<'a, T, C> {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compare::Reverse;

    impl<T, C: Compare<T>> RbTree<T, C> {
        /// Validate every structural invariant; panics on violation.
        fn check_invariants(&self) {
            if self.root.is_nil() {
                assert_eq!(self.len, 0);
                assert!(self.leftmost.is_nil());
                assert!(self.rightmost.is_nil());
                return;
            }
            assert_eq!(self.color_of(self.root), Color::Black, "root must be black");
            assert!(self.node(self.root).parent.is_nil());
            let mut count = 0;
            self.check_subtree(self.root, NodeId::NIL, &mut count);
            assert_eq!(count, self.len, "node count must match len");
            assert_eq!(self.leftmost, self.subtree_min(self.root));
            assert_eq!(self.rightmost, self.subtree_max(self.root));
            let mut prev: Option<&T> = None;
            for v in self.iter() {
                if let Some(p) = prev {
                    assert_eq!(
                        self.cmp.compare(p, v),
                        Ordering::Less,
                        "in-order traversal must be strictly increasing"
                    );
                }
                prev = Some(v);
            }
        }

        /// Returns the black-height of the subtree rooted at `n`.
        fn check_subtree(&self, n: NodeId, parent: NodeId, count: &mut usize) -> usize {
            if n.is_nil() {
                return 1;
            }
            let node = self.node(n);
            assert_eq!(node.parent, parent, "parent link mismatch");
            assert!(node.value.is_some(), "linked node must be live");
            if node.color == Color::Red {
                assert_eq!(self.color_of(parent), Color::Black, "red node with red parent");
                assert_eq!(self.color_of(node.left), Color::Black);
                assert_eq!(self.color_of(node.right), Color::Black);
            }
            *count += 1;
            let lh = self.check_subtree(node.left, n, count);
            let rh = self.check_subtree(node.right, n, count);
            assert_eq!(lh, rh, "black-height must be uniform");
            lh + if node.color == Color::Black { 1 } else { 0 }
        }
    }

    fn tree_of(keys: &[i32]) -> RbTree<i32> {
        let mut tree = RbTree::new();
        for &k in keys {
            tree.insert_unique(k).unwrap();
            tree.check_invariants();
        }
        tree
    }

    fn contents(tree: &RbTree<i32>) -> Vec<i32> {
        tree.iter().copied().collect()
    }

    #[test]
    fn test_new() {
        let tree: RbTree<i32> = RbTree::new();
        assert_eq!(tree.len(), 0);
        assert!(tree.is_empty());
        assert!(tree.begin().is_end());
        tree.check_invariants();
    }

    #[test]
    fn test_insert_ordered_traversal() {
        // spec scenario: [5,3,8,1,4,7,9] traverses as [1,3,4,5,7,8,9]
        let tree = tree_of(&[5, 3, 8, 1, 4, 7, 9]);
        assert_eq!(contents(&tree), [1, 3, 4, 5, 7, 8, 9]);
        tree.check_invariants();
    }

    #[test]
    fn test_duplicate_insert_rejected() {
        let mut tree = tree_of(&[5]);
        let (at, inserted) = tree.insert_unique(5).unwrap();
        assert!(!inserted);
        assert_eq!(tree.len(), 1);
        assert_eq!(tree.get(at), Some(&5));
        tree.check_invariants();
    }

    #[test]
    fn test_insert_ascending_descending() {
        let asc = tree_of(&(0..200).collect::<Vec<_>>());
        assert_eq!(asc.len(), 200);
        assert_eq!(contents(&asc), (0..200).collect::<Vec<_>>());

        let desc = tree_of(&(0..200).rev().collect::<Vec<_>>());
        assert_eq!(contents(&desc), (0..200).collect::<Vec<_>>());
    }

    #[test]
    fn test_erase_root() {
        // spec scenario: erase key 5 (the initial root) from the 7-node tree
        let mut tree = tree_of(&[5, 3, 8, 1, 4, 7, 9]);
        let at = tree.find(&5);
        let next = tree.erase(at);
        assert_eq!(tree.get(next), Some(&7));
        assert_eq!(contents(&tree), [1, 3, 4, 7, 8, 9]);
        tree.check_invariants();
    }

    #[test]
    fn test_erase_returns_successor() {
        let mut tree = tree_of(&[2, 4, 6, 8]);
        let at = tree.find(&4);
        let next = tree.erase(at);
        assert_eq!(tree.get(next), Some(&6));
        let next = tree.erase(tree.find(&8));
        assert!(next.is_end());
        tree.check_invariants();
    }

    #[test]
    fn test_erase_all_orders() {
        let keys = [5, 3, 8, 1, 4, 7, 9, 2, 6, 0];
        // erase in insertion order, ascending, and descending
        for order in [
            keys.to_vec(),
            (0..10).collect::<Vec<_>>(),
            (0..10).rev().collect::<Vec<_>>(),
        ] {
            let mut tree = tree_of(&keys);
            for k in order {
                assert_eq!(tree.remove(&k), Some(k));
                tree.check_invariants();
            }
            assert!(tree.is_empty());
        }
    }

    #[test]
    fn test_remove_missing() {
        let mut tree = tree_of(&[1, 2, 3]);
        assert_eq!(tree.remove(&7), None);
        assert_eq!(tree.len(), 3);
    }

    #[test]
    fn test_bounds() {
        let tree = tree_of(&[10, 20, 30, 40]);
        assert_eq!(tree.get(tree.lower_bound(&20)), Some(&20));
        assert_eq!(tree.get(tree.lower_bound(&25)), Some(&30));
        assert_eq!(tree.get(tree.upper_bound(&20)), Some(&30));
        assert_eq!(tree.get(tree.upper_bound(&5)), Some(&10));
        assert!(tree.lower_bound(&45).is_end());
        assert!(tree.upper_bound(&40).is_end());
    }

    #[test]
    fn test_find_count_equal_range() {
        let tree = tree_of(&[1, 3, 5]);
        assert_eq!(tree.get(tree.find(&3)), Some(&3));
        assert!(tree.find(&4).is_end());
        assert_eq!(tree.count_unique(&3), 1);
        assert_eq!(tree.count_unique(&4), 0);

        let (lo, hi) = tree.equal_range_unique(&3);
        assert_eq!(tree.get(lo), Some(&3));
        assert_eq!(tree.get(hi), Some(&5));
        let (lo, hi) = tree.equal_range_unique(&4);
        assert!(lo.is_end() && hi.is_end());
    }

    #[test]
    fn test_cursor_stability_across_mutations() {
        let mut tree = tree_of(&[10, 20, 30]);
        let at_twenty = tree.find(&20);
        for k in [5, 15, 25, 35, 1, 40] {
            tree.insert_unique(k).unwrap();
        }
        assert_eq!(tree.get(at_twenty), Some(&20));
        tree.remove(&10);
        tree.remove(&35);
        assert_eq!(tree.get(at_twenty), Some(&20));
        tree.check_invariants();
    }

    #[test]
    fn test_cursor_navigation() {
        let tree = tree_of(&[1, 2, 3]);
        let mut at = tree.begin();
        assert_eq!(tree.get(at), Some(&1));
        at = tree.next(at);
        assert_eq!(tree.get(at), Some(&2));
        at = tree.next(at);
        at = tree.next(at);
        assert!(at.is_end());
        at = tree.prev(at);
        assert_eq!(tree.get(at), Some(&3));
        let before_begin = tree.prev(tree.begin());
        assert!(before_begin.is_end());
    }

    #[test]
    fn test_hint_insert_adjacent() {
        let mut tree = tree_of(&[10, 30]);
        // correct hint: 20 goes right before 30
        let hint = tree.find(&30);
        let (at, inserted) = tree.insert_unique_at(hint, 20).unwrap();
        assert!(inserted);
        assert_eq!(tree.get(at), Some(&20));
        tree.check_invariants();

        // end hint for a new maximum
        let (_, inserted) = tree.insert_unique_at(tree.end(), 40).unwrap();
        assert!(inserted);
        // begin hint for a new minimum
        let (_, inserted) = tree.insert_unique_at(tree.begin(), 5).unwrap();
        assert!(inserted);
        tree.check_invariants();
        assert_eq!(contents(&tree), [5, 10, 20, 30, 40]);
    }

    #[test]
    fn test_hint_insert_wrong_hint_falls_back() {
        let mut tree = tree_of(&[10, 20, 30, 40, 50]);
        // hint far from the right position
        let hint = tree.find(&50);
        let (at, inserted) = tree.insert_unique_at(hint, 15).unwrap();
        assert!(inserted);
        assert_eq!(tree.get(at), Some(&15));
        // duplicate through a hint
        let (at, inserted) = tree.insert_unique_at(tree.find(&20), 20).unwrap();
        assert!(!inserted);
        assert_eq!(tree.get(at), Some(&20));
        tree.check_invariants();
        assert_eq!(tree.len(), 6);
    }

    #[test]
    fn test_hint_insert_sequential_build() {
        // the classic use: pushing sorted input with the previous position
        let mut tree: RbTree<i32> = RbTree::new();
        let mut hint = tree.end();
        for k in 0..100 {
            let (at, inserted) = tree.insert_unique_at(hint, k).unwrap();
            assert!(inserted);
            hint = tree.end();
            let _ = at;
        }
        tree.check_invariants();
        assert_eq!(tree.len(), 100);
    }

    #[test]
    fn test_erase_range() {
        let mut tree = tree_of(&[1, 2, 3, 4, 5, 6]);
        let first = tree.find(&2);
        let last = tree.find(&5);
        let at = tree.erase_range(first, last);
        assert_eq!(tree.get(at), Some(&5));
        assert_eq!(contents(&tree), [1, 5, 6]);
        tree.check_invariants();

        tree.erase_range(tree.begin(), tree.end());
        assert!(tree.is_empty());
        tree.check_invariants();
    }

    #[test]
    fn test_clear_and_reuse() {
        let mut tree = tree_of(&[3, 1, 2]);
        tree.clear();
        assert!(tree.is_empty());
        tree.check_invariants();
        tree.insert_unique(9).unwrap();
        assert_eq!(contents(&tree), [9]);
    }

    #[test]
    fn test_slot_reuse_after_erase() {
        let mut tree = tree_of(&[1, 2, 3, 4, 5]);
        for k in [2, 4] {
            tree.remove(&k);
        }
        // new insertions reuse the freed slots instead of growing the arena
        let before = tree.nodes.len();
        tree.insert_unique(10).unwrap();
        tree.insert_unique(11).unwrap();
        assert_eq!(tree.nodes.len(), before);
        tree.check_invariants();
    }

    #[test]
    fn test_clone_isolation() {
        let mut tree = tree_of(&[1, 2, 3]);
        let snapshot = tree.clone();
        snapshot.check_invariants();
        tree.insert_unique(4).unwrap();
        tree.remove(&1);
        assert_eq!(contents(&snapshot), [1, 2, 3]);
        assert_eq!(contents(&tree), [2, 3, 4]);
    }

    #[test]
    fn test_swap() {
        let mut a = tree_of(&[1, 2]);
        let mut b = tree_of(&[9]);
        a.swap(&mut b);
        assert_eq!(contents(&a), [9]);
        assert_eq!(contents(&b), [1, 2]);
    }

    #[test]
    fn test_reverse_iteration() {
        let tree = tree_of(&[2, 1, 3]);
        let rev: Vec<i32> = tree.iter().rev().copied().collect();
        assert_eq!(rev, [3, 2, 1]);
    }

    #[test]
    fn test_iter_meet_in_middle() {
        let tree = tree_of(&[1, 2, 3, 4]);
        let mut it = tree.iter();
        assert_eq!(it.next(), Some(&1));
        assert_eq!(it.next_back(), Some(&4));
        assert_eq!(it.next(), Some(&2));
        assert_eq!(it.next_back(), Some(&3));
        assert_eq!(it.next(), None);
        assert_eq!(it.next_back(), None);
    }

    #[test]
    fn test_custom_comparator() {
        let mut tree: RbTree<i32, Reverse<Natural>> = RbTree::new();
        for k in [1, 5, 3] {
            tree.insert_unique(k).unwrap();
            tree.check_invariants();
        }
        let order: Vec<i32> = tree.iter().copied().collect();
        assert_eq!(order, [5, 3, 1]);
        assert_eq!(tree.get(tree.lower_bound(&4)), Some(&3));
    }

    #[test]
    fn test_borrowed_key_lookup() {
        let mut tree: RbTree<String> = RbTree::new();
        for s in ["pear", "apple", "plum"] {
            tree.insert_unique(s.to_string()).unwrap();
        }
        assert!(tree.contains("apple"));
        assert_eq!(tree.remove("pear"), Some("pear".to_string()));
        assert!(!tree.contains("pear"));
    }

    #[test]
    fn test_randomized_churn() {
        // deterministic pseudo-random insert/erase mix
        let mut tree: RbTree<u64> = RbTree::new();
        let mut model = std::collections::BTreeSet::new();
        let mut state: u64 = 0x9e3779b97f4a7c15;
        for _ in 0..2000 {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            let key = state % 256;
            if state & (1 << 40) == 0 {
                let (_, inserted) = tree.insert_unique(key).unwrap();
                assert_eq!(inserted, model.insert(key));
            } else {
                assert_eq!(tree.remove(&key), model.take(&key));
            }
        }
        tree.check_invariants();
        assert_eq!(tree.len(), model.len());
        assert!(tree.iter().zip(model.iter()).all(|(a, b)| a == b));
    }

    #[test]
    fn test_construction_forms() {
        let from_iter: RbTree<i32> = (0..10).rev().collect();
        assert_eq!(contents(&from_iter), (0..10).collect::<Vec<_>>());
        from_iter.check_invariants();

        let from_array = RbTree::from([2, 1, 2, 3]);
        assert_eq!(contents(&from_array), [1, 2, 3]);
    }

    #[test]
    fn test_eq_and_debug() {
        let a = tree_of(&[1, 2, 3]);
        let b = tree_of(&[3, 2, 1]);
        assert_eq!(a, b);
        let c = tree_of(&[1, 2]);
        assert_ne!(a, c);
        let dbg = format!("{:?}", a);
        assert_eq!(dbg, "[1, 2, 3]");
    }
}
