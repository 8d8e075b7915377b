// src/lib.rs — Library root for Bio-Astra

pub mod api;
pub mod chat;
pub mod cli;
pub mod corpus;
pub mod export;
pub mod infra;
pub mod provider;
