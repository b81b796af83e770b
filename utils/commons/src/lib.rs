//! It exposes the errors, event tags, types and structs shared by the
//! auction contracts.
#![cfg_attr(not(feature = "std"), no_std)]
pub use crate::{constants::*, errors::*, structs::*, types::*};
use concordium_std::*;

mod constants;
mod errors;
mod structs;
mod types;
