use log::{debug, trace, warn};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::completion::{self, EXACT_POSITION_TOLERANCE_RATIO};
use crate::error::{InvalidOperationError, OccupiedSlotError, PuzzleError};
use crate::geometry::{Point, Polygon, Rect};
use crate::groups::GroupTable;
use crate::partition::PartitionSpec;
use crate::piece::{Piece, PieceId};
use crate::puzzle::Puzzle;
use crate::raster::Rasterizer;
use crate::rules::{EngineRules, PlacementMode};

// Keeps the pool order independent of the partition stream drawn from the same seed.
const POOL_SHUFFLE_SALT: u64 = 0x9e37_79b9_7f4a_7c15;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlacedPiece {
    pub position: Point,
    pub locked: bool,
    /// Slot the piece occupies; exact-slot placement only.
    pub slot: Option<PieceId>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReleaseOutcome {
    ReturnedToPool { pieces: Vec<PieceId> },
    Loose,
    Snapped { group: Vec<PieceId> },
    /// Aligned to the assembled position without meeting a neighbor.
    Framed { group: Vec<PieceId> },
    Slotted { slot: PieceId, correct: bool },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Release {
    pub outcome: ReleaseOutcome,
    pub solved: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum DragOrigin {
    Pool { index: usize },
    Board,
}

#[derive(Clone, Debug)]
struct DragSession {
    /// Anchor first, then the rest of its group.
    members: Vec<PieceId>,
    start_positions: Vec<Point>,
    origin: DragOrigin,
    grab_offset: Point,
    draw_order_before: Vec<PieceId>,
}

impl DragSession {
    fn anchor(&self) -> PieceId {
        self.members[0]
    }

    fn pool_index(&self) -> Option<usize> {
        match self.origin {
            DragOrigin::Pool { index } => Some(index),
            DragOrigin::Board => None,
        }
    }
}

/// One play-through of a [`Puzzle`]: pool, board, groups and the active drag.
///
/// `H` is the per-piece image handle produced by the [`Rasterizer`] the
/// session was initialized with; sessions built without imagery use `()`.
#[derive(Clone, Debug)]
pub struct PuzzleSession<H = ()> {
    puzzle: Puzzle,
    images: Vec<H>,
    rules: EngineRules,
    board: Rect,
    /// Centroid of each outline relative to its position.
    center_offsets: Vec<Point>,
    position_tolerance: f32,
    pool: Vec<PieceId>,
    placed: Vec<Option<PlacedPiece>>,
    groups: GroupTable,
    draw_order: Vec<PieceId>,
    drag: Option<DragSession>,
}

impl PuzzleSession<()> {
    pub fn new(puzzle: Puzzle, rules: EngineRules, seed: u64) -> Self {
        let images = vec![(); puzzle.len()];
        Self::assemble(puzzle, images, rules, seed)
    }
}

impl<H> PuzzleSession<H> {
    /// Cuts `source`, rasterizes every piece and shuffles the pool.
    ///
    /// The same seed always yields the same outlines and pool order.
    pub fn initialize<R>(
        source: &R::Source,
        spec: &PartitionSpec,
        rules: EngineRules,
        rasterizer: &mut R,
        seed: u64,
    ) -> Result<Self, PuzzleError>
    where
        R: Rasterizer<Handle = H>,
    {
        let (width, height) = rasterizer.source_size(source);
        let mut rng = StdRng::seed_from_u64(seed);
        let puzzle = Puzzle::generate(width as f32, height as f32, spec, &mut rng)?;
        let images = puzzle
            .pieces()
            .iter()
            .map(|piece| {
                rasterizer
                    .rasterize(source, &piece.polygon)
                    .map_err(|err| PuzzleError::Rasterize {
                        piece: piece.id,
                        source: err,
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;
        debug!(
            "initialized session: {} pieces, {} shared edges",
            puzzle.len(),
            puzzle.edge_count()
        );
        Ok(Self::assemble(puzzle, images, rules, seed))
    }

    fn assemble(puzzle: Puzzle, images: Vec<H>, rules: EngineRules, seed: u64) -> Self {
        let rules = rules.clamped();
        let margin = rules.board_margin_ratio * puzzle.width().max(puzzle.height());
        let board = puzzle.bounds().expand(margin);
        let center_offsets = puzzle
            .pieces()
            .iter()
            .map(|piece| piece.polygon.centroid() - piece.correct_position)
            .collect();
        let min_dim = puzzle.min_piece_dimension();
        let position_tolerance = if min_dim.is_finite() {
            min_dim * EXACT_POSITION_TOLERANCE_RATIO
        } else {
            0.0
        };
        let mut pool: Vec<PieceId> = (0..puzzle.len()).collect();
        let mut rng = StdRng::seed_from_u64(seed ^ POOL_SHUFFLE_SALT);
        pool.shuffle(&mut rng);
        let total = puzzle.len();
        Self {
            puzzle,
            images,
            rules,
            board,
            center_offsets,
            position_tolerance,
            pool,
            placed: vec![None; total],
            groups: GroupTable::new(total),
            draw_order: Vec::with_capacity(total),
            drag: None,
        }
    }

    pub fn puzzle(&self) -> &Puzzle {
        &self.puzzle
    }

    pub fn rules(&self) -> &EngineRules {
        &self.rules
    }

    pub fn board(&self) -> Rect {
        self.board
    }

    pub fn pieces(&self) -> &[Piece] {
        self.puzzle.pieces()
    }

    pub fn piece(&self, id: PieceId) -> Option<&Piece> {
        self.puzzle.piece(id)
    }

    pub fn polygon(&self, id: PieceId) -> Option<&Polygon> {
        self.puzzle.piece(id).map(|piece| &piece.polygon)
    }

    pub fn image(&self, id: PieceId) -> Option<&H> {
        self.images.get(id)
    }

    pub fn pool(&self) -> &[PieceId] {
        &self.pool
    }

    pub fn placed(&self) -> impl Iterator<Item = (PieceId, &PlacedPiece)> + '_ {
        self.placed
            .iter()
            .enumerate()
            .filter_map(|(id, state)| state.as_ref().map(|state| (id, state)))
    }

    pub fn placed_piece(&self, id: PieceId) -> Option<&PlacedPiece> {
        self.placed.get(id).and_then(|state| state.as_ref())
    }

    /// Sorted ids of the connected group containing `id`; empty for pool pieces.
    pub fn connected_group(&self, id: PieceId) -> Vec<PieceId> {
        if self.placed_piece(id).is_none() {
            return Vec::new();
        }
        let mut members = self.groups.members(id).to_vec();
        members.sort_unstable();
        members
    }

    /// Members of the group containing `id`, in merge order.
    pub fn group_members(&self, id: PieceId) -> &[PieceId] {
        if id >= self.groups.len() {
            return &[];
        }
        self.groups.members(id)
    }

    /// Placed pieces back to front; the most recently grabbed group is last.
    pub fn draw_order(&self) -> &[PieceId] {
        &self.draw_order
    }

    /// Offset from a piece's position to the point used for drop tests.
    pub fn anchor_offset(&self, id: PieceId) -> Option<Point> {
        self.center_offsets.get(id).copied()
    }

    pub fn board_group_count(&self) -> usize {
        self.placed()
            .filter(|(id, _)| self.groups.root(*id) == *id)
            .count()
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    pub fn dragged(&self) -> Option<&[PieceId]> {
        self.drag.as_ref().map(|drag| drag.members.as_slice())
    }

    pub fn is_solved(&self) -> bool {
        completion::is_solved(
            self.rules.completion,
            self.puzzle.pieces(),
            &self.pool,
            &self.placed,
            &self.groups,
            self.rules.placement,
            self.position_tolerance,
        )
    }

    pub fn pick_up_from_pool(&mut self, id: PieceId, at: Point) -> Result<(), InvalidOperationError> {
        self.begin_from_pool(id, at, Point::ZERO)
    }

    pub fn pick_up_from_board(&mut self, id: PieceId) -> Result<(), InvalidOperationError> {
        self.begin_from_board(id, Point::ZERO)
    }

    /// Moves the anchor to `position` and the rest of the group rigidly with it.
    pub fn drag_to(&mut self, position: Point) -> Result<(), InvalidOperationError> {
        let drag = self.drag.as_ref().ok_or(InvalidOperationError::NoActiveDrag)?;
        let delta = position - drag.start_positions[0];
        for (member, start) in drag.members.iter().zip(&drag.start_positions) {
            if let Some(state) = self.placed[*member].as_mut() {
                state.position = *start + delta;
            }
        }
        trace!("drag {} to ({:.1}, {:.1})", drag.anchor(), position.x, position.y);
        Ok(())
    }

    pub fn release(&mut self) -> Result<Release, PuzzleError> {
        let drag = self
            .drag
            .take()
            .ok_or(InvalidOperationError::NoActiveDrag)?;
        let outcome = match self.rules.placement {
            PlacementMode::NeighborSnap => self.release_neighbor_snap(&drag),
            PlacementMode::ExactSlot => self.release_exact_slot(&drag)?,
        };
        let solved = self.is_solved();
        if solved {
            debug!("puzzle solved");
        }
        Ok(Release { outcome, solved })
    }

    pub fn abort_drag(&mut self) -> Result<Release, PuzzleError> {
        self.release()
    }

    pub fn return_to_pool(&mut self, id: PieceId) -> Result<Vec<PieceId>, InvalidOperationError> {
        if self.drag.is_some() {
            return Err(InvalidOperationError::DragInProgress);
        }
        self.check_id(id)?;
        if self.placed[id].is_none() {
            return Err(InvalidOperationError::NotPlaced(id));
        }
        let mut members = self.groups.members(id).to_vec();
        members.sort_unstable();
        if !self.rules.allow_return_locked && members.iter().any(|member| self.is_locked(*member)) {
            return Err(InvalidOperationError::PieceLocked(id));
        }
        self.send_to_pool(&members, None);
        debug!("returned {:?} to the pool", members);
        Ok(members)
    }

    /// Grabs `id` under the pointer. Pool pieces are centred on the pointer by their centroid.
    pub fn pointer_down(&mut self, id: PieceId, pointer: Point) -> Result<(), InvalidOperationError> {
        if self.drag.is_some() {
            return Err(InvalidOperationError::DragInProgress);
        }
        self.check_id(id)?;
        match self.placed[id] {
            Some(state) => self.begin_from_board(id, pointer - state.position),
            None => {
                let half = self.center_offsets[id];
                self.begin_from_pool(id, pointer - half, half)
            }
        }
    }

    pub fn pointer_move(&mut self, pointer: Point) -> Result<(), InvalidOperationError> {
        let offset = self
            .drag
            .as_ref()
            .ok_or(InvalidOperationError::NoActiveDrag)?
            .grab_offset;
        self.drag_to(pointer - offset)
    }

    pub fn pointer_up(&mut self, pointer: Point) -> Result<Release, PuzzleError> {
        self.pointer_move(pointer)?;
        self.release()
    }

    fn check_id(&self, id: PieceId) -> Result<(), InvalidOperationError> {
        if id >= self.puzzle.len() {
            return Err(InvalidOperationError::UnknownPiece(id));
        }
        Ok(())
    }

    fn position_of(&self, id: PieceId) -> Point {
        self.placed_piece(id)
            .map(|state| state.position)
            .unwrap_or(Point::ZERO)
    }

    fn center_of(&self, id: PieceId) -> Point {
        self.position_of(id) + self.center_offsets.get(id).copied().unwrap_or(Point::ZERO)
    }

    fn is_locked(&self, id: PieceId) -> bool {
        self.placed_piece(id).map(|state| state.locked).unwrap_or(false)
    }

    fn begin_from_pool(
        &mut self,
        id: PieceId,
        at: Point,
        grab_offset: Point,
    ) -> Result<(), InvalidOperationError> {
        if self.drag.is_some() {
            return Err(InvalidOperationError::DragInProgress);
        }
        self.check_id(id)?;
        let index = self
            .pool
            .iter()
            .position(|pooled| *pooled == id)
            .ok_or(InvalidOperationError::NotInPool(id))?;
        let draw_order_before = self.draw_order.clone();
        self.pool.remove(index);
        self.placed[id] = Some(PlacedPiece {
            position: at,
            locked: false,
            slot: None,
        });
        self.draw_order.push(id);
        self.drag = Some(DragSession {
            members: vec![id],
            start_positions: vec![at],
            origin: DragOrigin::Pool { index },
            grab_offset,
            draw_order_before,
        });
        trace!("picked {} from the pool", id);
        Ok(())
    }

    fn begin_from_board(&mut self, id: PieceId, grab_offset: Point) -> Result<(), InvalidOperationError> {
        if self.drag.is_some() {
            return Err(InvalidOperationError::DragInProgress);
        }
        self.check_id(id)?;
        let state = self.placed[id].ok_or(InvalidOperationError::NotPlaced(id))?;
        if self.rules.placement == PlacementMode::ExactSlot && state.locked {
            return Err(InvalidOperationError::PieceLocked(id));
        }
        let mut members = vec![id];
        members.extend(
            self.groups
                .members(id)
                .iter()
                .copied()
                .filter(|member| *member != id),
        );
        let start_positions = members.iter().map(|member| self.position_of(*member)).collect();
        let draw_order_before = self.draw_order.clone();
        self.raise(&members);
        trace!("picked group of {} from the board via {}", members.len(), id);
        self.drag = Some(DragSession {
            members,
            start_positions,
            origin: DragOrigin::Board,
            grab_offset,
            draw_order_before,
        });
        Ok(())
    }

    fn raise(&mut self, members: &[PieceId]) {
        let (raised, mut order): (Vec<PieceId>, Vec<PieceId>) = self
            .draw_order
            .iter()
            .copied()
            .partition(|id| members.contains(id));
        order.extend(raised);
        self.draw_order = order;
    }

    fn translate(&mut self, members: &[PieceId], delta: Point) {
        for member in members {
            if let Some(state) = self.placed[*member].as_mut() {
                state.position = state.position + delta;
            }
        }
    }

    fn set_locked(&mut self, members: &[PieceId], locked: bool) {
        for member in members {
            if let Some(state) = self.placed[*member].as_mut() {
                state.locked = locked;
            }
        }
    }

    fn send_to_pool(&mut self, members: &[PieceId], index: Option<usize>) {
        for member in members {
            if self.groups.group_size(*member) > 1 {
                self.groups.dissolve(*member);
            }
            self.placed[*member] = None;
        }
        self.draw_order.retain(|id| !members.contains(id));
        let at = index.unwrap_or(self.pool.len()).min(self.pool.len());
        self.pool.splice(at..at, members.iter().copied());
    }

    fn revert(&mut self, drag: &DragSession) {
        match drag.origin {
            DragOrigin::Pool { index } => {
                for member in &drag.members {
                    self.placed[*member] = None;
                }
                let at = index.min(self.pool.len());
                self.pool.splice(at..at, drag.members.iter().copied());
            }
            DragOrigin::Board => {
                for (member, start) in drag.members.iter().zip(&drag.start_positions) {
                    if let Some(state) = self.placed[*member].as_mut() {
                        state.position = *start;
                    }
                }
            }
        }
        self.draw_order = drag.draw_order_before.clone();
    }

    /// Placed neighbors of `member` outside its group, with the position
    /// `member` would need to sit flush against each.
    fn neighbor_targets(&self, member: PieceId) -> Vec<(PieceId, Point)> {
        let Some(piece) = self.puzzle.piece(member) else {
            return Vec::new();
        };
        piece
            .neighbor_ids()
            .filter(|neighbor| !self.groups.same_group(member, *neighbor))
            .filter_map(|neighbor| {
                let state = self.placed_piece(neighbor)?;
                let other = self.puzzle.piece(neighbor)?;
                let expected = state.position + (piece.correct_position - other.correct_position);
                Some((neighbor, expected))
            })
            .collect()
    }

    /// Shifts a group dropped fully off the board so its nearest member centre is back on it.
    fn keep_on_board(&mut self, members: &[PieceId]) {
        let mut best: Option<Point> = None;
        for member in members {
            let shift = self.board.shift_into(self.center_of(*member));
            if shift == Point::ZERO {
                return;
            }
            if best.map_or(true, |current| shift.length() < current.length()) {
                best = Some(shift);
            }
        }
        if let Some(shift) = best {
            debug!("group dropped off the board, shifting by ({:.1}, {:.1})", shift.x, shift.y);
            self.translate(members, shift);
        }
    }

    fn release_neighbor_snap(&mut self, drag: &DragSession) -> ReleaseOutcome {
        let anchor = drag.anchor();
        if let Some(index) = drag.pool_index() {
            if !self.board.contains(self.center_of(anchor)) {
                self.send_to_pool(&drag.members, Some(index));
                debug!("piece {} dropped outside the board, back to the pool", anchor);
                return ReleaseOutcome::ReturnedToPool {
                    pieces: drag.members.clone(),
                };
            }
        } else {
            self.keep_on_board(&drag.members);
        }

        let threshold = self.rules.snap_threshold;
        let mut best: Option<(PieceId, PieceId, f32, Point)> = None;
        for member in &drag.members {
            let position = self.position_of(*member);
            for (neighbor, expected) in self.neighbor_targets(*member) {
                let dist = position.distance(expected);
                if dist < threshold && best.map_or(true, |(_, _, best_dist, _)| dist < best_dist) {
                    best = Some((*member, neighbor, dist, expected - position));
                }
            }
        }

        let mut merged = false;
        if let Some((member, neighbor, dist, delta)) = best {
            debug!(
                "snapping group of {} via {} onto {} (distance {:.2})",
                drag.members.len(),
                member,
                neighbor,
                dist
            );
            self.translate(&drag.members, delta);
            for member in &drag.members {
                let position = self.position_of(*member);
                for (neighbor, expected) in self.neighbor_targets(*member) {
                    if position.distance(expected) < threshold {
                        self.groups.union(*member, neighbor);
                        merged = true;
                    }
                }
            }
        }

        let group = self.groups.members(anchor).to_vec();
        if merged {
            self.set_locked(&group, true);
        }

        let mut framed = false;
        if self.rules.snap_to_frame {
            let correct = self
                .puzzle
                .piece(anchor)
                .map(|piece| piece.correct_position)
                .unwrap_or(Point::ZERO);
            let offset = self.position_of(anchor) - correct;
            if offset.length() < threshold {
                self.translate(&group, offset * -1.0);
                self.set_locked(&group, true);
                framed = true;
            }
        }

        let mut sorted = group;
        sorted.sort_unstable();
        if merged {
            ReleaseOutcome::Snapped { group: sorted }
        } else if framed {
            debug!("group {:?} aligned to the frame", sorted);
            ReleaseOutcome::Framed { group: sorted }
        } else {
            if sorted.len() == 1 {
                self.set_locked(&sorted, false);
            }
            ReleaseOutcome::Loose
        }
    }

    fn release_exact_slot(&mut self, drag: &DragSession) -> Result<ReleaseOutcome, OccupiedSlotError> {
        let anchor = drag.anchor();
        let Some(slot) = self.puzzle.slot_at(self.center_of(anchor)) else {
            self.send_to_pool(&drag.members, drag.pool_index());
            debug!("piece {} dropped outside every slot, back to the pool", anchor);
            return Ok(ReleaseOutcome::ReturnedToPool {
                pieces: drag.members.clone(),
            });
        };
        let occupant = self
            .placed()
            .find(|(id, state)| *id != anchor && state.slot == Some(slot))
            .map(|(id, _)| id);
        if let Some(occupant) = occupant {
            warn!("slot {} is taken by {}, rejecting drop of {}", slot, occupant, anchor);
            self.revert(drag);
            return Err(OccupiedSlotError { slot, occupant });
        }
        let correct = slot == anchor;
        let position = self
            .puzzle
            .piece(slot)
            .map(|piece| piece.correct_position)
            .unwrap_or(Point::ZERO);
        if let Some(state) = self.placed[anchor].as_mut() {
            state.position = position;
            state.locked = correct;
            state.slot = Some(slot);
        }
        debug!("piece {} dropped into slot {} (correct: {})", anchor, slot, correct);
        Ok(ReleaseOutcome::Slotted { slot, correct })
    }
}
