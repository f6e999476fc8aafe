#![deny(warnings)]

//! Economic models for the food-sovereignty simulator.
//!
//! This crate provides validated utilities for:
//! - Splitting a public budget across seed, fertilizer and mechanization
//! - Tonnage gain and foreign-exchange savings of that split
//! - Apportioning national production and execution efficiency by region

pub mod budget;
pub mod regional;

pub use budget::{allocate, BudgetAllocation, BudgetOutcome, LeverImpact};
pub use regional::{apportion, InvestmentScenario, Region, RegionalShare};
