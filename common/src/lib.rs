//! Shared protocol definitions for the PartyHub party-game platform.
//!
//! This crate holds the wire-level message unions exchanged between the
//! browser-side clients and the game-coordination server, plus the payload
//! models embedded in them. Every application message is a JSON object with
//! a `type` string discriminator; correlated requests additionally carry a
//! `requestId` merged in by the client's request correlator.

pub mod models;
pub mod protocol;
