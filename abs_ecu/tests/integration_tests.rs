//! Integration tests for the ABS ECU loop.
//!
//! These drive `EcuCore` end to end against the simulated bus and actuator,
//! mostly on synthetic time: commands, corrupted frames, silence and bus-off
//! are injected and the resulting duty and heartbeats are checked.

mod integration;
