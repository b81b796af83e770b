//! Timed auction for CCD deposits. The contract holds the highest bid,
//! refunds every outbid deposit together with a bonus of 10% of the new bid,
//! and pays the proceeds to the owner once the auction has been finalized.
#![cfg_attr(not(feature = "std"), no_std)]
use crate::{clock::*, custodian::*, events::*, ledger::*, structs::*};
use commons::*;
use concordium_std::{collections::BTreeMap, *};
use core::fmt::Debug;

mod clock;
mod contract;
mod custodian;
mod events;
mod impls;
mod ledger;
mod structs;
#[concordium_cfg_test]
mod test;
