use jigsaw_core::{PieceId, PlacementMode, Point, PuzzleError, PuzzleSession, ReleaseOutcome};
use rand::rngs::StdRng;
use rand::Rng;

#[derive(clap::Args)]
pub(super) struct BotArgs {
    /// Random offset added to every drop, in pixels.
    #[arg(long, default_value_t = 4.0)]
    jitter_px: f32,
    /// Chance that a pool piece is dropped somewhere random instead.
    #[arg(long, default_value_t = 0.1)]
    fumble_rate: f32,
    /// Intermediate pointer moves per drag.
    #[arg(long, default_value_t = 6)]
    path_steps: usize,
    #[arg(long, default_value_t = 2000)]
    max_moves: usize,
    /// Print every move.
    #[arg(long)]
    verbose: bool,
}

impl BotArgs {
    pub(super) fn config(&self) -> BotConfig {
        BotConfig {
            jitter_px: self.jitter_px.max(0.0),
            fumble_rate: self.fumble_rate.clamp(0.0, 1.0),
            path_steps: self.path_steps,
            max_moves: self.max_moves,
            verbose: self.verbose,
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub(super) struct BotConfig {
    pub jitter_px: f32,
    pub fumble_rate: f32,
    pub path_steps: usize,
    pub max_moves: usize,
    pub verbose: bool,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(super) struct SolveReport {
    pub moves: usize,
    pub rejected: usize,
    pub returned: usize,
    pub solved: bool,
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum BotActionPlan {
    /// Drag `piece` (and its group) so its position ends at `target`.
    Drag { piece: PieceId, target: Point },
    /// Send the group of `piece` back to the pool.
    Return { piece: PieceId },
}

/// Plays until solved or out of moves. Rejected drops are counted, not fatal.
pub(super) fn solve<H>(
    session: &mut PuzzleSession<H>,
    config: &BotConfig,
    rng: &mut StdRng,
) -> Result<SolveReport, Box<dyn std::error::Error>> {
    let mut report = SolveReport::default();
    // The jitter must stay inside the snap radius or the bot never converges.
    let jitter = config
        .jitter_px
        .min(session.rules().snap_threshold * 0.25);
    while !session.is_solved() && report.moves < config.max_moves {
        let Some(plan) = choose_action(session, config, jitter, rng) else {
            break;
        };
        report.moves += 1;
        match plan {
            BotActionPlan::Return { piece } => {
                let returned = session.return_to_pool(piece)?;
                report.returned += returned.len();
                if config.verbose {
                    println!("move {}: returned {:?} to the pool", report.moves, returned);
                }
            }
            BotActionPlan::Drag { piece, target } => match drag(session, piece, target, config) {
                Ok(outcome) => {
                    if matches!(outcome, ReleaseOutcome::ReturnedToPool { .. }) {
                        report.returned += 1;
                    }
                    if config.verbose {
                        println!("move {}: piece {} -> {:?}", report.moves, piece, outcome);
                    }
                }
                Err(PuzzleError::OccupiedSlot(err)) => {
                    report.rejected += 1;
                    if config.verbose {
                        println!("move {}: piece {} rejected: {}", report.moves, piece, err);
                    }
                }
                Err(err) => return Err(err.into()),
            },
        }
    }
    report.solved = session.is_solved();
    Ok(report)
}

fn drag<H>(
    session: &mut PuzzleSession<H>,
    piece: PieceId,
    target: Point,
    config: &BotConfig,
) -> Result<ReleaseOutcome, PuzzleError> {
    let offset = session.anchor_offset(piece).unwrap_or(Point::ZERO);
    let start = match session.placed_piece(piece) {
        Some(state) => state.position + offset,
        // Pool pieces come in from below the board.
        None => {
            let board = session.board();
            Point::new(board.center().x, board.max.y)
        }
    };
    let end = target + offset;
    session.pointer_down(piece, start)?;
    for step in 1..=config.path_steps {
        let t = step as f32 / (config.path_steps + 1) as f32;
        session.pointer_move(start.lerp(end, t))?;
    }
    Ok(session.pointer_up(end)?.outcome)
}

fn jittered(point: Point, jitter: f32, rng: &mut StdRng) -> Point {
    if jitter <= 0.0 {
        return point;
    }
    point
        + Point::new(
            rng.random_range(-jitter..=jitter),
            rng.random_range(-jitter..=jitter),
        )
}

fn random_board_point<H>(session: &PuzzleSession<H>, rng: &mut StdRng) -> Point {
    let board = session.board();
    Point::new(
        rng.random_range(board.min.x..=board.max.x),
        rng.random_range(board.min.y..=board.max.y),
    )
}

fn correct_position<H>(session: &PuzzleSession<H>, piece: PieceId) -> Point {
    session
        .piece(piece)
        .map(|piece| piece.correct_position)
        .unwrap_or(Point::ZERO)
}

fn choose_action<H>(
    session: &PuzzleSession<H>,
    config: &BotConfig,
    jitter: f32,
    rng: &mut StdRng,
) -> Option<BotActionPlan> {
    match session.rules().placement {
        PlacementMode::ExactSlot => choose_slot_action(session, config, jitter, rng),
        PlacementMode::NeighborSnap => choose_snap_action(session, config, jitter, rng),
    }
}

fn choose_slot_action<H>(
    session: &PuzzleSession<H>,
    config: &BotConfig,
    jitter: f32,
    rng: &mut StdRng,
) -> Option<BotActionPlan> {
    let misplaced = session
        .placed()
        .find(|(id, state)| state.slot != Some(*id))
        .map(|(id, _)| id);
    if let Some(piece) = misplaced {
        return Some(BotActionPlan::Return { piece });
    }
    let piece = *session.pool().first()?;
    let target = if rng.random::<f32>() < config.fumble_rate {
        random_board_point(session, rng)
    } else {
        jittered(correct_position(session, piece), jitter, rng)
    };
    Some(BotActionPlan::Drag { piece, target })
}

/// Where `piece` has to sit to line up with the placed `neighbor`.
fn target_beside<H>(session: &PuzzleSession<H>, piece: PieceId, neighbor: PieceId) -> Option<Point> {
    let state = session.placed_piece(neighbor)?;
    Some(state.position + (correct_position(session, piece) - correct_position(session, neighbor)))
}

/// True when a piece moved to `target` keeps its drop point on the board.
fn lands_on_board<H>(session: &PuzzleSession<H>, piece: PieceId, target: Point) -> bool {
    let offset = session.anchor_offset(piece).unwrap_or(Point::ZERO);
    session.board().contains(target + offset)
}

fn choose_snap_action<H>(
    session: &PuzzleSession<H>,
    config: &BotConfig,
    jitter: f32,
    rng: &mut StdRng,
) -> Option<BotActionPlan> {
    let pool = session.pool();
    if !pool.is_empty() {
        if rng.random::<f32>() < config.fumble_rate {
            let piece = pool[rng.random_range(0..pool.len())];
            let target = random_board_point(session, rng);
            return Some(BotActionPlan::Drag { piece, target });
        }
        // Prefer pieces that touch something already on the board.
        for piece in pool {
            let Some(candidate) = session.piece(*piece) else {
                continue;
            };
            for neighbor in candidate.neighbor_ids() {
                let Some(target) = target_beside(session, *piece, neighbor) else {
                    continue;
                };
                if lands_on_board(session, *piece, target) {
                    return Some(BotActionPlan::Drag {
                        piece: *piece,
                        target: jittered(target, jitter, rng),
                    });
                }
            }
        }
        let piece = pool[0];
        let target = jittered(correct_position(session, piece), jitter, rng);
        return Some(BotActionPlan::Drag { piece, target });
    }

    // Everything is on the board: pull the smallest group onto a neighbor outside it.
    let mut best: Option<(usize, PieceId, Point)> = None;
    let mut smallest: Option<(usize, PieceId)> = None;
    for (id, _) in session.placed() {
        let group = session.group_members(id);
        if smallest.map_or(true, |(size, _)| group.len() < size) {
            smallest = Some((group.len(), id));
        }
        let Some(piece) = session.piece(id) else {
            continue;
        };
        for neighbor in piece.neighbor_ids().filter(|neighbor| !group.contains(neighbor)) {
            let Some(target) = target_beside(session, id, neighbor) else {
                continue;
            };
            if !lands_on_board(session, id, target) {
                continue;
            }
            if best.map_or(true, |(size, _, _)| group.len() < size) {
                best = Some((group.len(), id, target));
            }
        }
    }
    if let Some((_, piece, target)) = best {
        return Some(BotActionPlan::Drag {
            piece,
            target: jittered(target, jitter, rng),
        });
    }
    // No neighbor is reachable on the board; move a group home instead.
    let (_, piece) = smallest?;
    let target = jittered(correct_position(session, piece), jitter, rng);
    Some(BotActionPlan::Drag { piece, target })
}
