//! Movement notifications drained by the host after each tick

use serde::{Deserialize, Serialize};

/// Something animation, audio or UI may want to react to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MovementEvent {
    Landed,
    SlideStarted,
    SlideEnded,
    GroundDashStarted,
    GroundDashEnded,
    AirDashStarted,
    AirDashEnded,
    DownwardDashStarted,
    WallRunStarted {
        /// The wall is on the character's right
        right_side: bool,
    },
    WallRunEnded,
    WallJumped,
    GroundJumped,
    AirJumped,
    /// Air and downward dash counters were reset
    DashesRefreshed,
    /// The jump counter was refilled
    AirJumpsRefreshed,
}
