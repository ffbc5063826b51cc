//! Console line parsing.
//!
//! Each stdin line is one [`ConsoleCommand`]. Coordinates are block
//! coordinates in the demo world, except for `spawn`, which takes an exact
//! position.

use std::str::FromStr;

use anchor_core::{Material, UnknownKind};
use glam::{DVec3, IVec3};

/// What the player is holding when they click.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Held {
    /// Whatever the current config names as the activation item.
    ActivationItem,
    Nothing,
    Item(Material),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConsoleCommand {
    Place { block: IVec3, material: Material },
    Click { block: IVec3, held: Held },
    Break { block: IVec3 },
    Spawn { position: DVec3, living: bool },
    /// Remove the entities standing in a block.
    Despawn { block: IVec3 },
    /// `chronoanchor <args>`, or the `reload` shorthand.
    Chronoanchor(Vec<String>),
    Status,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParseError {
    #[error("unknown command '{0}' (try 'help')")]
    UnknownCommand(String),

    #[error("usage: {0}")]
    Usage(&'static str),

    #[error("'{value}' is not a valid {what}")]
    InvalidNumber { what: &'static str, value: String },

    #[error(transparent)]
    UnknownKind(#[from] UnknownKind),
}

pub const HELP: &str = "\
commands:
  place <x> <y> <z> <material>     set a block
  click <x> <y> <z> [item|none]    right-click a block (default: activation item)
  break <x> <y> <z>                break a block
  spawn <x> <y> <z> [living|item]  spawn an entity
  despawn <x> <y> <z>              remove the entities in a block
  reload                           same as 'chronoanchor reload'
  chronoanchor <args>              run the plugin command
  status                           print anchors, config and entities as JSON
  quit                             shut down";

impl FromStr for ConsoleCommand {
    type Err = ParseError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let Some(head) = words.next() else {
            return Err(ParseError::Usage("<command> [args...] (try 'help')"));
        };
        let args: Vec<&str> = words.collect();

        match head.to_ascii_lowercase().as_str() {
            "place" => match args.as_slice() {
                [x, y, z, material] => Ok(ConsoleCommand::Place {
                    block: block_coords(x, y, z)?,
                    material: material.parse()?,
                }),
                _ => Err(ParseError::Usage("place <x> <y> <z> <material>")),
            },
            "click" => {
                let (coords, held) = match args.as_slice() {
                    [x, y, z] => ((x, y, z), Held::ActivationItem),
                    [x, y, z, item] if item.eq_ignore_ascii_case("none") => {
                        ((x, y, z), Held::Nothing)
                    }
                    [x, y, z, item] => ((x, y, z), Held::Item(item.parse()?)),
                    _ => return Err(ParseError::Usage("click <x> <y> <z> [item|none]")),
                };
                Ok(ConsoleCommand::Click {
                    block: block_coords(coords.0, coords.1, coords.2)?,
                    held,
                })
            }
            "break" => match args.as_slice() {
                [x, y, z] => Ok(ConsoleCommand::Break {
                    block: block_coords(x, y, z)?,
                }),
                _ => Err(ParseError::Usage("break <x> <y> <z>")),
            },
            "spawn" => {
                let (coords, living) = match args.as_slice() {
                    [x, y, z] => ((x, y, z), true),
                    [x, y, z, kind] if kind.eq_ignore_ascii_case("living") => ((x, y, z), true),
                    [x, y, z, kind] if kind.eq_ignore_ascii_case("item") => ((x, y, z), false),
                    _ => return Err(ParseError::Usage("spawn <x> <y> <z> [living|item]")),
                };
                Ok(ConsoleCommand::Spawn {
                    position: DVec3::new(
                        number(coords.0)?,
                        number(coords.1)?,
                        number(coords.2)?,
                    ),
                    living,
                })
            }
            "despawn" | "kill" => match args.as_slice() {
                [x, y, z] => Ok(ConsoleCommand::Despawn {
                    block: block_coords(x, y, z)?,
                }),
                _ => Err(ParseError::Usage("despawn <x> <y> <z>")),
            },
            "reload" => Ok(ConsoleCommand::Chronoanchor(vec!["reload".to_string()])),
            "chronoanchor" => Ok(ConsoleCommand::Chronoanchor(
                args.into_iter().map(str::to_string).collect(),
            )),
            "status" => Ok(ConsoleCommand::Status),
            "help" | "?" => Ok(ConsoleCommand::Help),
            "quit" | "exit" | "stop" => Ok(ConsoleCommand::Quit),
            other => Err(ParseError::UnknownCommand(other.to_string())),
        }
    }
}

fn block_coords(x: &str, y: &str, z: &str) -> Result<IVec3, ParseError> {
    Ok(IVec3::new(integer(x)?, integer(y)?, integer(z)?))
}

fn integer(value: &str) -> Result<i32, ParseError> {
    value.parse().map_err(|_| ParseError::InvalidNumber {
        what: "block coordinate",
        value: value.to_string(),
    })
}

fn number(value: &str) -> Result<f64, ParseError> {
    value
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| ParseError::InvalidNumber {
            what: "position",
            value: value.to_string(),
        })
}
