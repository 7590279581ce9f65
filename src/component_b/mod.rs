// Component B: actuation
// Maps each distance sample to indicator outputs, runs the timed control
// cycle and supervises the session around the link.
pub mod mapping;
pub mod actuator;
pub mod controller;
pub mod supervisor;
