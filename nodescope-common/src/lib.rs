//! # Shared Record Schema (Recorder ↔ Reports)
//!
//! Defines the record types and closed enumerations shared between the
//! in-process recorder and everything that reads its output (report writers,
//! the replay tool, downstream analysis). Adding a timing category is a schema
//! change: bump [`SCHEMA_VERSION`], add a [`TimingCategory`] variant and the
//! matching [`NodeRuntime`] field.
//!
//! ## Key Types
//!
//! - [`NodeIndex`] - Position of a node in the search tree traversal order
//! - [`NodeRuntime`] - Immutable per-node timing snapshot
//! - [`TimingCategory`] - Categories snapshotted per node
//! - [`MamOpcode`] - Matching-machine instructions counted per run

#![cfg_attr(not(test), no_std)]

use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

// ============================================================================
// Schema Constants
// ============================================================================

/// Version of the per-node record layout.
///
/// Written into every summary so that tables produced by older recorders are
/// recognisable when replayed.
pub const SCHEMA_VERSION: u32 = 3;

/// Header of the per-node timing table, in column order.
pub const TIMING_COLUMNS: [&str; 6] = [
    "node",
    "total_time",
    "entered_matching_loop",
    TimingCategory::Matching.column_name(),
    TimingCategory::MatchingQueue.column_name(),
    TimingCategory::Theory.column_name(),
];

/// Header of the backtrack table.
pub const BACKTRACK_COLUMN: &str = "backtracking_node";

// ============================================================================
// Node Index
// ============================================================================

/// Index of a search node
///
/// Starts at 0 and advances by exactly one at every scope boundary (push or
/// backtrack). Shared by [`NodeRuntime::node`] and the backtrack log, which
/// makes it the join key for correlating the two.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(transparent))]
pub struct NodeIndex(pub u32);

impl NodeIndex {
    /// The index following this one.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }

    /// Signed distance `self - other` in node-count units.
    #[must_use]
    pub fn distance_from(self, other: NodeIndex) -> i64 {
        i64::from(self.0) - i64::from(other.0)
    }
}

impl fmt::Display for NodeIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for NodeIndex {
    fn from(node: u32) -> Self {
        NodeIndex(node)
    }
}

// ============================================================================
// Per-Node Timing Categories
// ============================================================================

/// Timing categories snapshotted into every [`NodeRuntime`]
///
/// The recorder never interprets these; it only reads and resets the
/// since-last-reset delta of one timer per category at each node boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(rename_all = "snake_case"))]
pub enum TimingCategory {
    /// Pattern-matching loop (matching abstract machine)
    Matching,
    /// Queue-based quantifier instantiation
    MatchingQueue,
    /// Theory propagation
    Theory,
}

impl TimingCategory {
    /// All categories, in table column order.
    pub const ALL: [TimingCategory; 3] =
        [TimingCategory::Matching, TimingCategory::MatchingQueue, TimingCategory::Theory];

    /// Column name in the per-node timing table.
    #[must_use]
    pub const fn column_name(self) -> &'static str {
        match self {
            TimingCategory::Matching => "matching_time",
            TimingCategory::MatchingQueue => "matching_queue_time",
            TimingCategory::Theory => "theory_time",
        }
    }
}

impl fmt::Display for TimingCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column_name())
    }
}

// ============================================================================
// Node Runtime Record
// ============================================================================

/// Timing snapshot of a single search node
///
/// Created exactly once per scope boundary and never mutated afterwards.
/// All times are in seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NodeRuntime {
    /// Node this record closes out
    pub node: NodeIndex,

    /// Wall time between the previous boundary and this one
    pub time: f64,

    /// Time spent in the matching loop during this node
    pub matching_time: f64,

    /// Time spent in queue-based instantiation during this node
    pub matching_queue_time: f64,

    /// Time spent in theory propagation during this node
    pub theory_time: f64,

    /// Whether the matching loop was entered at all during this node
    ///
    /// A node can enter the loop and still record (near) zero matching time,
    /// so this is tracked separately from [`NodeRuntime::matching_time`].
    pub entered_matching_loop: bool,
}

impl NodeRuntime {
    /// Time recorded for `category`.
    #[must_use]
    pub const fn category_time(&self, category: TimingCategory) -> f64 {
        match category {
            TimingCategory::Matching => self.matching_time,
            TimingCategory::MatchingQueue => self.matching_queue_time,
            TimingCategory::Theory => self.theory_time,
        }
    }
}

// ============================================================================
// Matching Machine Opcodes
// ============================================================================

/// Returned when an integer does not name a [`MamOpcode`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnknownOpcode(pub u32);

impl fmt::Display for UnknownOpcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown matching opcode {} (expected 0..{})", self.0, MamOpcode::COUNT)
    }
}

impl core::error::Error for UnknownOpcode {}

macro_rules! mam_opcodes {
    ($($variant:ident => $name:literal),+ $(,)?) => {
        /// Instructions of the matching abstract machine
        ///
        /// The interpreter reports each executed instruction so the run can be
        /// summarised per opcode. Conversions from raw integers go through
        /// [`TryFrom<u32>`], which rejects anything outside the table.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
        #[repr(u8)]
        pub enum MamOpcode {
            $($variant),+
        }

        impl MamOpcode {
            /// Every opcode, in discriminant order.
            pub const ALL: &'static [MamOpcode] = &[$(MamOpcode::$variant),+];

            /// Number of opcodes.
            pub const COUNT: usize = Self::ALL.len();

            /// Display name of the opcode.
            #[must_use]
            pub const fn name(self) -> &'static str {
                match self {
                    $(MamOpcode::$variant => $name),+
                }
            }
        }
    };
}

mam_opcodes! {
    Init1 => "INIT1",
    Init2 => "INIT2",
    Init3 => "INIT3",
    Init4 => "INIT4",
    Init5 => "INIT5",
    Init6 => "INIT6",
    InitN => "INITN",
    Bind1 => "BIND1",
    Bind2 => "BIND2",
    Bind3 => "BIND3",
    Bind4 => "BIND4",
    Bind5 => "BIND5",
    Bind6 => "BIND6",
    BindN => "BINDN",
    Yield1 => "YIELD1",
    Yield2 => "YIELD2",
    Yield3 => "YIELD3",
    Yield4 => "YIELD4",
    Yield5 => "YIELD5",
    Yield6 => "YIELD6",
    YieldN => "YIELDN",
    Compare => "COMPARE",
    Check => "CHECK",
    Filter => "FILTER",
    CFilter => "CFILTER",
    PFilter => "PFILTER",
    Choose => "CHOOSE",
    Noop => "NOOP",
    Continue => "CONTINUE",
    GetEnode => "GET_ENODE",
    GetCgr1 => "GET_CGR1",
    GetCgr2 => "GET_CGR2",
    GetCgr3 => "GET_CGR3",
    GetCgr4 => "GET_CGR4",
    GetCgr5 => "GET_CGR5",
    GetCgr6 => "GET_CGR6",
    GetCgrN => "GET_CGRN",
    IsCgr => "IS_CGR",
}

impl MamOpcode {
    /// Position of the opcode in [`MamOpcode::ALL`].
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }
}

impl TryFrom<u32> for MamOpcode {
    type Error = UnknownOpcode;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        usize::try_from(value)
            .ok()
            .and_then(|i| MamOpcode::ALL.get(i).copied())
            .ok_or(UnknownOpcode(value))
    }
}

impl fmt::Display for MamOpcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
