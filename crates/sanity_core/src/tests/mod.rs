//! Integration tests for the sanity-check engine
//!
//! Tests are organized by topic:
//! - `properties` - Unit algebra and runner invariants across many inputs
//! - `scenario` - The torque × angular velocity walkthrough end to end
//! - `documents` - Session documents loaded from JSON and YAML fixtures

mod documents;
