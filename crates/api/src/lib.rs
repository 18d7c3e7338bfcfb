//! `gasdepot-api` — HTTP surface for the gas-cylinder distribution backend.

pub mod app;
