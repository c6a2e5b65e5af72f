//! End-to-end scenarios
//!
//! Each test drives a full engine through the simulator with a scripted
//! voice layer and checks what a viewer would see.
