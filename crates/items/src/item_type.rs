//! Item type descriptors

/// Item can be picked up
pub const FLAG_PICKUPABLE: u32 = 1 << 5;

/// Item can be moved by players
pub const FLAG_MOVEABLE: u32 = 1 << 6;

/// Item stacks (carries a count)
pub const FLAG_STACKABLE: u32 = 1 << 7;

/// Item group as stored in items.otb (node type of each item node)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemGroup {
    None,
    Ground,
    Container,
    Weapon,
    Ammunition,
    Armor,
    Charges,
    Teleport,
    MagicField,
    Writeable,
    Key,
    Splash,
    Fluid,
    Door,
    Deprecated,
}

impl ItemGroup {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::None),
            1 => Some(Self::Ground),
            2 => Some(Self::Container),
            3 => Some(Self::Weapon),
            4 => Some(Self::Ammunition),
            5 => Some(Self::Armor),
            6 => Some(Self::Charges),
            7 => Some(Self::Teleport),
            8 => Some(Self::MagicField),
            9 => Some(Self::Writeable),
            10 => Some(Self::Key),
            11 => Some(Self::Splash),
            12 => Some(Self::Fluid),
            13 => Some(Self::Door),
            14 => Some(Self::Deprecated),
            _ => None,
        }
    }
}

/// Structural description of one item id
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemType {
    /// Server-side item id
    pub id: u16,

    /// Client sprite id (0 when unknown)
    pub client_id: u16,

    /// Item group
    pub group: ItemGroup,

    /// items.otb flag bits
    pub flags: u32,
}

impl ItemType {
    /// Create a type with no flags
    pub fn new(id: u16, group: ItemGroup) -> Self {
        Self {
            id,
            client_id: 0,
            group,
            flags: 0,
        }
    }

    /// Ground substrate
    pub fn ground(id: u16) -> Self {
        Self::new(id, ItemGroup::Ground)
    }

    /// Moveable container
    pub fn container(id: u16) -> Self {
        Self::new(id, ItemGroup::Container).with_flags(FLAG_MOVEABLE | FLAG_PICKUPABLE)
    }

    /// Moveable stackable item
    pub fn stackable(id: u16) -> Self {
        Self::new(id, ItemGroup::None).with_flags(FLAG_MOVEABLE | FLAG_PICKUPABLE | FLAG_STACKABLE)
    }

    /// Fixed decoration (walls, doors, signs ...)
    pub fn fixed(id: u16) -> Self {
        Self::new(id, ItemGroup::None)
    }

    /// Add flag bits
    pub fn with_flags(mut self, flags: u32) -> Self {
        self.flags |= flags;
        self
    }

    #[inline]
    pub fn is_ground(&self) -> bool {
        self.group == ItemGroup::Ground
    }

    #[inline]
    pub fn is_container(&self) -> bool {
        self.group == ItemGroup::Container
    }

    #[inline]
    pub fn is_stackable(&self) -> bool {
        self.flags & FLAG_STACKABLE != 0
    }

    #[inline]
    pub fn is_moveable(&self) -> bool {
        self.flags & FLAG_MOVEABLE != 0
    }

    #[inline]
    pub fn is_deprecated(&self) -> bool {
        self.group == ItemGroup::Deprecated
    }
}
