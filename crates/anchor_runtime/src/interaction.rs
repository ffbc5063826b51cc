//! Player interaction handling.
//!
//! Right-clicking an anchor block with the activation item toggles it; any
//! break of an active anchor block removes it. Each change produces a
//! [`Feedback`] for the acting player.

use anchor_core::{Location, Material};

use crate::service::AnchorService;
use crate::source::ConfigSource;
use crate::ticker::Ticker;

/// The kind of interaction the player performed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    RightClickBlock,
    LeftClickBlock,
    RightClickAir,
    LeftClickAir,
    /// Stepping on a pressure plate and similar.
    Physical,
}

/// Which hand produced the interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hand {
    Main,
    Off,
}

/// The block a player clicked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClickedBlock {
    pub location: Location,
    pub material: Material,
}

/// A player interaction as reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InteractEvent {
    pub action: Action,
    pub hand: Hand,
    pub clicked: Option<ClickedBlock>,
    /// The item in the player's main hand, if any.
    pub held_item: Option<Material>,
}

/// A block broken by a player. `material` is the block before removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BreakEvent {
    pub location: Location,
    pub material: Material,
}

/// The message sent back to the acting player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feedback {
    Activated,
    Deactivated,
    Destroyed,
}

impl Feedback {
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Feedback::Activated => "Chrono Anchor activated!",
            Feedback::Deactivated => "Chrono Anchor deactivated!",
            Feedback::Destroyed => "Chrono Anchor destroyed!",
        }
    }
}

impl std::fmt::Display for Feedback {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}

/// The result of handling an [`InteractEvent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InteractOutcome {
    /// The host should suppress the item's default use.
    pub cancel_default: bool,
    pub feedback: Option<Feedback>,
}

impl<T: Ticker, S: ConfigSource> AnchorService<T, S> {
    /// Toggle an anchor when the activation item is used on an anchor block.
    ///
    /// Only main-hand right clicks on a block count; everything else is
    /// ignored so off-hand echoes cannot toggle twice.
    pub fn handle_interact(&self, event: &InteractEvent) -> InteractOutcome {
        if event.action != Action::RightClickBlock || event.hand != Hand::Main {
            return InteractOutcome::default();
        }
        let Some(clicked) = event.clicked else {
            return InteractOutcome::default();
        };
        let config = self.config();
        if clicked.material != config.anchor_block
            || event.held_item != Some(config.activation_item)
        {
            return InteractOutcome::default();
        }

        let feedback = if self.toggle(clicked.location) {
            Feedback::Activated
        } else {
            Feedback::Deactivated
        };
        InteractOutcome {
            cancel_default: true,
            feedback: Some(feedback),
        }
    }

    /// Drop an anchor whose block was broken.
    pub fn handle_break(&self, event: &BreakEvent) -> Option<Feedback> {
        (event.material == self.config().anchor_block && self.deactivate(&event.location))
            .then_some(Feedback::Destroyed)
    }
}
