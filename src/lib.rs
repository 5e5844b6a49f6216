//! Ports canonical pku Pokémon records to and from game formats.
//!
//! A port is driven through [`porter::Port`]: build it from a format's
//! porter, run the first half, show the user the alerts and choices, then
//! run the second half to get the output.

pub mod alert;
pub mod byte_override;
pub mod choice;
pub mod dex;
pub mod error;
pub mod field;
pub mod gen3;
pub mod pku;
pub mod porter;
pub mod settings;
pub mod showdown;
pub mod tags;
pub mod types;

pub use error::{FieldError, PortError, PortResult};
pub use pku::Pku;
pub use porter::{Phase, Port, Porter};
pub use settings::PortSettings;
