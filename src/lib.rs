/*
 * BaseSwap - headless client for the Base Sepolia swap pool
 * Core library exports and module declarations
 */

pub mod abi;
pub mod api;
pub mod config;
pub mod contract;
pub mod models;
pub mod refresh;
pub mod registry;
pub mod rpc;
pub mod service;
pub mod session;
pub mod tx;
pub mod units;
pub mod views;

pub use config::Config;
pub use models::*;
pub use service::SwapApp;
