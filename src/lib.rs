//! nscheck — NativeScript marketplace plugin compatibility harness.
//!
//! Pulls a page of plugins from the marketplace catalog, installs each one
//! into a disposable copy of a pristine scaffold project, drives `tns`
//! through a matrix of build modes and platforms, and writes a JSON report
//! of pass/fail plus timing per mode.

pub mod config;
pub mod demo;
pub mod error;
pub mod exec;
pub mod install;
pub mod marketplace;
pub mod matrix;
pub mod pipeline;
pub mod report;
pub mod scaffold;
