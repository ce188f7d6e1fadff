use crate::piece::PieceId;

/// Disjoint-set over piece ids with explicit member lists per root.
#[derive(Clone, Debug)]
pub struct GroupTable {
    parent: Vec<PieceId>,
    members: Vec<Vec<PieceId>>,
}

impl GroupTable {
    pub fn new(total: usize) -> Self {
        Self {
            parent: (0..total).collect(),
            members: (0..total).map(|id| vec![id]).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.parent.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parent.is_empty()
    }

    pub fn find(&mut self, id: PieceId) -> PieceId {
        let mut current = id;
        while self.parent[current] != current {
            let grand = self.parent[self.parent[current]];
            self.parent[current] = grand;
            current = grand;
        }
        current
    }

    /// Root lookup without path compression.
    pub fn root(&self, id: PieceId) -> PieceId {
        let mut current = id;
        while self.parent[current] != current {
            current = self.parent[current];
        }
        current
    }

    pub fn same_group(&self, a: PieceId, b: PieceId) -> bool {
        self.root(a) == self.root(b)
    }

    /// Merges the classes of `a` and `b`; returns the surviving root.
    pub fn union(&mut self, a: PieceId, b: PieceId) -> PieceId {
        let root_a = self.find(a);
        let root_b = self.find(b);
        if root_a == root_b {
            return root_a;
        }
        let (keep, absorb) = if self.members[root_a].len() >= self.members[root_b].len() {
            (root_a, root_b)
        } else {
            (root_b, root_a)
        };
        self.parent[absorb] = keep;
        let moved = std::mem::take(&mut self.members[absorb]);
        self.members[keep].extend(moved);
        keep
    }

    pub fn members(&self, id: PieceId) -> &[PieceId] {
        &self.members[self.root(id)]
    }

    pub fn group_size(&self, id: PieceId) -> usize {
        self.members(id).len()
    }

    /// Splits the class containing `id` back into singletons; returns its former members.
    pub fn dissolve(&mut self, id: PieceId) -> Vec<PieceId> {
        let root = self.find(id);
        let members = std::mem::take(&mut self.members[root]);
        for member in &members {
            self.parent[*member] = *member;
            self.members[*member] = vec![*member];
        }
        members
    }

    pub fn roots(&self) -> impl Iterator<Item = PieceId> + '_ {
        self.parent
            .iter()
            .enumerate()
            .filter(|(id, parent)| *id == **parent)
            .map(|(id, _)| id)
    }

    pub fn group_count(&self) -> usize {
        self.roots().count()
    }
}
