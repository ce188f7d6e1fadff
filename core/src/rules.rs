use log::debug;
use serde::{Deserialize, Serialize};

pub const SNAP_THRESHOLD_DEFAULT: f32 = 20.0;
pub const SNAP_THRESHOLD_MIN: f32 = 1.0;
pub const SNAP_THRESHOLD_MAX: f32 = 400.0;
pub const BOARD_MARGIN_RATIO_DEFAULT: f32 = 0.5;
pub const BOARD_MARGIN_RATIO_MIN: f32 = 0.0;
pub const BOARD_MARGIN_RATIO_MAX: f32 = 4.0;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlacementMode {
    /// Drops land in the slot under the piece centre; only the correct slot locks.
    ExactSlot,
    /// Pieces attach to matching neighbors and drift freely otherwise.
    #[default]
    NeighborSnap,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionRule {
    /// Every piece sits at its correct position.
    ExactPosition,
    /// All pieces form one connected group.
    #[default]
    Connectivity,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineRules {
    pub placement: PlacementMode,
    pub completion: CompletionRule,
    pub snap_threshold: f32,
    pub snap_to_frame: bool,
    pub allow_return_locked: bool,
    /// Board extends past the image by this fraction of its longest side.
    pub board_margin_ratio: f32,
}

impl Default for EngineRules {
    fn default() -> Self {
        Self::neighbor_snap()
    }
}

impl EngineRules {
    pub fn exact_slot() -> Self {
        Self {
            placement: PlacementMode::ExactSlot,
            completion: CompletionRule::ExactPosition,
            snap_threshold: SNAP_THRESHOLD_DEFAULT,
            snap_to_frame: false,
            allow_return_locked: true,
            board_margin_ratio: BOARD_MARGIN_RATIO_DEFAULT,
        }
    }

    pub fn neighbor_snap() -> Self {
        Self {
            placement: PlacementMode::NeighborSnap,
            completion: CompletionRule::Connectivity,
            snap_threshold: SNAP_THRESHOLD_DEFAULT,
            snap_to_frame: true,
            allow_return_locked: true,
            board_margin_ratio: BOARD_MARGIN_RATIO_DEFAULT,
        }
    }

    /// Copy with numeric fields forced into their supported ranges and the
    /// completion rule made reachable under the placement mode.
    pub fn clamped(mut self) -> Self {
        self.snap_threshold = if self.snap_threshold.is_finite() {
            self.snap_threshold.clamp(SNAP_THRESHOLD_MIN, SNAP_THRESHOLD_MAX)
        } else {
            SNAP_THRESHOLD_DEFAULT
        };
        self.board_margin_ratio = if self.board_margin_ratio.is_finite() {
            self.board_margin_ratio
                .clamp(BOARD_MARGIN_RATIO_MIN, BOARD_MARGIN_RATIO_MAX)
        } else {
            BOARD_MARGIN_RATIO_DEFAULT
        };
        match (self.placement, self.completion) {
            // Slotting never joins groups.
            (PlacementMode::ExactSlot, CompletionRule::Connectivity) => {
                debug!("exact-slot placement completes by position, not connectivity");
                self.completion = CompletionRule::ExactPosition;
            }
            // Only the frame snap lands pieces on exact pixels.
            (PlacementMode::NeighborSnap, CompletionRule::ExactPosition) if !self.snap_to_frame => {
                debug!("exact-position completion needs frame snapping, enabling it");
                self.snap_to_frame = true;
            }
            _ => {}
        }
        self
    }
}
