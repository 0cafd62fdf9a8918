//! # Online Players
//!
//! The slice of server state that plugin commands operate on: who is
//! online, what they hold in their main hand, and which permissions they have.

use crate::host::{ItemStack, Player};
use std::collections::HashSet;

/// A player currently connected to the server.
#[derive(Debug, Clone)]
pub struct OnlinePlayer {
    pub player: Player,
    /// Item in the main hand; air when empty
    pub main_hand: ItemStack,
    pub permissions: HashSet<String>,
    /// Chat messages delivered to this player
    pub inbox: Vec<String>,
}

impl OnlinePlayer {
    pub fn new(player: Player) -> Self {
        Self {
            player,
            main_hand: ItemStack::air(),
            permissions: HashSet::new(),
            inbox: Vec::new(),
        }
    }

    pub fn holding(mut self, item: ItemStack) -> Self {
        self.main_hand = item;
        self
    }

    pub fn with_permission(mut self, permission: impl Into<String>) -> Self {
        self.permissions.insert(permission.into());
        self
    }

    pub fn has_permission(&self, permission: &str) -> bool {
        self.permissions.contains(permission)
    }

    pub fn send_message(&mut self, message: impl Into<String>) {
        self.inbox.push(message.into());
    }
}

/// Everyone currently online.
#[derive(Debug, Clone, Default)]
pub struct OnlinePlayers {
    players: Vec<OnlinePlayer>,
}

impl OnlinePlayers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn join(&mut self, player: OnlinePlayer) {
        self.players.push(player);
    }

    /// Finds a player by exact name, ignoring case.
    pub fn find(&self, name: &str) -> Option<&OnlinePlayer> {
        self.players
            .iter()
            .find(|online| online.player.name.eq_ignore_ascii_case(name))
    }

    pub fn find_mut(&mut self, name: &str) -> Option<&mut OnlinePlayer> {
        self.players
            .iter_mut()
            .find(|online| online.player.name.eq_ignore_ascii_case(name))
    }

    pub fn names(&self) -> Vec<&str> {
        self.players
            .iter()
            .map(|online| online.player.name.as_str())
            .collect()
    }
}
