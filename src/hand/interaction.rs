//! Interaction mappings: typed input slots with change detection.
//!
//! Each hand has five slots in a fixed order.  Every frame all slots are
//! rewritten and each reports whether its value differs from the last one.

use super::joints::Pose;
use super::pointer::PointerState;

// ── Slot identity ──────────────────────────────────────────

/// Device input a slot represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceInputType {
    SpatialPointer,
    SpatialGrip,
    Select,
    TriggerPress,
    IndexFinger,
}

impl DeviceInputType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SpatialPointer => "spatial-pointer",
            Self::SpatialGrip => "spatial-grip",
            Self::Select => "select",
            Self::TriggerPress => "trigger-press",
            Self::IndexFinger => "index-finger",
        }
    }
}

/// Shape of the data a slot carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AxisKind {
    /// 6-DoF pose.
    SixDof,
    /// Boolean button state.
    Digital,
}

/// Action bound to a slot, reported with every event the slot raises.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InputAction {
    pub id: u32,
    pub description: &'static str,
    pub axis: AxisKind,
}

impl InputAction {
    pub const fn new(id: u32, description: &'static str, axis: AxisKind) -> Self {
        Self {
            id,
            description,
            axis,
        }
    }
}

/// Static description of one slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InteractionMapping {
    pub id: u32,
    pub name: &'static str,
    pub input_type: DeviceInputType,
    pub action: InputAction,
}

/// Default articulated-hand mappings, in emission order.  Both hands use
/// the same set.
pub const DEFAULT_INTERACTIONS: [InteractionMapping; 5] = [
    InteractionMapping {
        id: 0,
        name: "Spatial Pointer",
        input_type: DeviceInputType::SpatialPointer,
        action: InputAction::new(4, "Pointer Pose", AxisKind::SixDof),
    },
    InteractionMapping {
        id: 1,
        name: "Spatial Grip",
        input_type: DeviceInputType::SpatialGrip,
        action: InputAction::new(3, "Grip Pose", AxisKind::SixDof),
    },
    InteractionMapping {
        id: 2,
        name: "Select",
        input_type: DeviceInputType::Select,
        action: InputAction::new(1, "Select", AxisKind::Digital),
    },
    InteractionMapping {
        id: 3,
        name: "Grab",
        input_type: DeviceInputType::TriggerPress,
        action: InputAction::new(7, "Grip Press", AxisKind::Digital),
    },
    InteractionMapping {
        id: 4,
        name: "Index Finger Pose",
        input_type: DeviceInputType::IndexFinger,
        action: InputAction::new(13, "Index Finger Pose", AxisKind::SixDof),
    },
];

// ── Slot values ────────────────────────────────────────────

/// Current value of a slot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SlotValue {
    Pose(Pose),
    Bool(bool),
}

impl SlotValue {
    /// Initial value for a slot of the given kind.
    pub fn initial(axis: AxisKind) -> Self {
        match axis {
            AxisKind::SixDof => Self::Pose(Pose::IDENTITY),
            AxisKind::Digital => Self::Bool(false),
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            Self::Pose(_) => None,
        }
    }
}

/// One slot and its change state.
#[derive(Debug, Clone)]
pub struct InteractionSlot {
    mapping: InteractionMapping,
    value: SlotValue,
    previous: SlotValue,
    changed: bool,
}

impl InteractionSlot {
    pub fn new(mapping: InteractionMapping) -> Self {
        let initial = SlotValue::initial(mapping.action.axis);
        Self {
            mapping,
            value: initial,
            previous: initial,
            changed: false,
        }
    }

    pub fn mapping(&self) -> &InteractionMapping {
        &self.mapping
    }

    pub fn value(&self) -> SlotValue {
        self.value
    }

    /// Whether the last write changed the value.
    pub fn changed(&self) -> bool {
        self.changed
    }

    /// Store `value` and recompute `changed`.
    fn write(&mut self, value: SlotValue) -> SlotUpdate {
        self.previous = self.value;
        self.value = value;
        self.changed = self.previous != self.value;
        SlotUpdate {
            mapping: self.mapping,
            previous: self.previous,
            current: self.value,
            changed: self.changed,
        }
    }
}

/// Outcome of writing one slot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlotUpdate {
    pub mapping: InteractionMapping,
    pub previous: SlotValue,
    pub current: SlotValue,
    pub changed: bool,
}

// ── Table ──────────────────────────────────────────────────

/// Ordered interaction slots for one hand.
#[derive(Debug, Clone)]
pub struct InteractionMappingTable {
    slots: Vec<InteractionSlot>,
}

impl Default for InteractionMappingTable {
    fn default() -> Self {
        Self::new(&DEFAULT_INTERACTIONS)
    }
}

impl InteractionMappingTable {
    pub fn new(mappings: &[InteractionMapping]) -> Self {
        Self {
            slots: mappings.iter().copied().map(InteractionSlot::new).collect(),
        }
    }

    pub fn slots(&self) -> &[InteractionSlot] {
        &self.slots
    }

    pub fn slot(&self, input_type: DeviceInputType) -> Option<&InteractionSlot> {
        self.slots
            .iter()
            .find(|s| s.mapping.input_type == input_type)
    }

    /// Write this frame's values into every slot, in slot order.
    pub fn apply(&mut self, state: &PointerState) -> Vec<SlotUpdate> {
        self.slots
            .iter_mut()
            .map(|slot| {
                let value = match slot.mapping.input_type {
                    DeviceInputType::SpatialPointer => SlotValue::Pose(state.pointer_pose),
                    DeviceInputType::SpatialGrip => SlotValue::Pose(state.grip_pose),
                    DeviceInputType::Select | DeviceInputType::TriggerPress => {
                        SlotValue::Bool(state.is_selecting)
                    }
                    DeviceInputType::IndexFinger => SlotValue::Pose(state.index_tip_pose),
                };
                slot.write(value)
            })
            .collect()
    }
}
