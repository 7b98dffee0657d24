//! Items placed on tiles

use crate::attributes::Attribute;
use otmap_core::Position;
use serde::Serialize;

/// Decay state restored from the file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DecayState {
    /// Not decaying
    Stopped,
    /// Decay was running when the map was saved; restart it on spawn
    Pending,
}

/// Optional per-item attributes
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ItemAttributes {
    pub count: Option<u8>,
    pub charges: Option<u16>,
    pub action_id: Option<u16>,
    pub unique_id: Option<u16>,
    pub text: Option<String>,
    pub description: Option<String>,
    pub written_date: Option<u32>,
    pub written_by: Option<String>,
    pub duration: Option<u32>,
    pub decay_state: Option<DecayState>,
    pub depot_id: Option<u16>,
    pub house_door_id: Option<u8>,
    pub teleport_destination: Option<Position>,
    pub sleeper_guid: Option<u32>,
    pub sleep_start: Option<u32>,
}

impl ItemAttributes {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// A map item, possibly holding nested items
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Item {
    /// Server item id
    pub id: u16,

    pub attributes: ItemAttributes,

    /// Nested items, in file order (containers only)
    pub contents: Vec<Item>,
}

impl Item {
    pub fn new(id: u16) -> Self {
        Self {
            id,
            ..Self::default()
        }
    }

    /// Store an item attribute.
    ///
    /// Attributes that do not belong on items are handed back unchanged.
    pub fn apply_attribute(&mut self, attribute: Attribute) -> Result<(), Attribute> {
        let attrs = &mut self.attributes;
        match attribute {
            Attribute::Count(count) => attrs.count = Some(count),
            Attribute::Charges(charges) => attrs.charges = Some(charges),
            Attribute::RuneCharges(charges) => attrs.charges = Some(charges as u16),
            Attribute::ActionId(id) => attrs.action_id = Some(id),
            Attribute::UniqueId(id) => attrs.unique_id = Some(id),
            Attribute::Text(text) => attrs.text = Some(text),
            Attribute::ItemDescription(desc) => attrs.description = Some(desc),
            Attribute::WrittenDate(date) => attrs.written_date = Some(date),
            Attribute::WrittenBy(name) => attrs.written_by = Some(name),
            Attribute::Duration(duration) => attrs.duration = Some(duration),
            Attribute::DecayingState(state) => {
                attrs.decay_state = Some(if state != 0 {
                    DecayState::Pending
                } else {
                    DecayState::Stopped
                });
            }
            Attribute::DepotId(id) => attrs.depot_id = Some(id),
            Attribute::HouseDoorId(id) => attrs.house_door_id = Some(id),
            Attribute::TeleportDestination(dest) => attrs.teleport_destination = Some(dest),
            Attribute::SleeperGuid(guid) => attrs.sleeper_guid = Some(guid),
            Attribute::SleepStart(start) => attrs.sleep_start = Some(start),
            other => return Err(other),
        }
        Ok(())
    }

    /// Deepest nesting level below this item (0 without contents)
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut pending: Vec<(&Item, usize)> = vec![(self, 0)];
        while let Some((item, level)) = pending.pop() {
            deepest = deepest.max(level);
            pending.extend(item.contents.iter().map(|child| (child, level + 1)));
        }
        deepest
    }

    /// This item plus everything nested in it
    pub fn total_items(&self) -> usize {
        let mut total = 0;
        let mut pending = vec![self];
        while let Some(item) = pending.pop() {
            total += 1;
            pending.extend(item.contents.iter());
        }
        total
    }
}
