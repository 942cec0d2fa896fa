//! The channel catalog. Built once from the host-declared channels followed
//! by the emulated ones; a channel's handle is its index and never changes.
use crate::channel::{ChannelDescriptor, ChannelItem};

#[derive(Debug, Clone, Default)]
pub struct ChannelRegistry {
    items: Vec<ChannelItem>,
}

impl ChannelRegistry {
    pub fn new(host_channels: Vec<ChannelDescriptor>, emu_channels: Vec<ChannelDescriptor>) -> Self {
        let items = host_channels
            .into_iter()
            .chain(emu_channels)
            .map(ChannelItem::new)
            .collect();
        ChannelRegistry { items }
    }

    pub fn count(&self) -> usize {
        self.items.len()
    }

    pub fn get(&self, handle: i32) -> Option<&ChannelItem> {
        usize::try_from(handle).ok().and_then(|i| self.items.get(i))
    }

    pub fn get_mut(&mut self, handle: i32) -> Option<&mut ChannelItem> {
        usize::try_from(handle).ok().and_then(move |i| self.items.get_mut(i))
    }

    /// Exact-name lookup. Duplicate names resolve to the first declaration.
    pub fn match_by_name(&self, name: &str) -> Option<(i32, &ChannelItem)> {
        self.items
            .iter()
            .enumerate()
            .find(|(_, item)| item.name() == name)
            .map(|(i, item)| (i as i32, item))
    }

    pub fn iter(&self) -> impl Iterator<Item = (i32, &ChannelItem)> {
        self.items.iter().enumerate().map(|(i, item)| (i as i32, item))
    }
}
