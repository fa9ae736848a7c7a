// Lib file to expose modules for testing and external usage.
// This file serves as the root for the library crate.

/// Module containing the bot definition data model.
/// This includes `Process`, `Activity`, design items and connections.
pub mod model;

/// Module containing the UI-automation model carried by app connectors.
/// This includes screens, screen elements, match rules and locators.
pub mod screens;

/// Module containing the XML parser for serialized bot definitions.
pub mod parser;

/// Module containing the rule configuration layer.
/// This includes the per-checker `ConfigReader` and the combined `Config`.
pub mod config;

/// Module defining the analysis result data structures.
/// This includes `Rule`, `RuleCheckResult`, statuses and category scoring.
pub mod result;

/// Module containing the implementation of the rule checkers.
/// This includes diagnostics, framework and code quality rules.
pub mod rules;

/// Module containing the core analyzer logic.
/// This includes the `BotAnalyzer` struct that drives a full analysis run.
pub mod analyzer;

/// Module containing the CSV report writer.
pub mod report;

/// Module containing utility functions.
/// This includes path sanitizing and file extension helpers.
pub mod utils;
