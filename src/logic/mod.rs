//! Logic Module - Core Pipeline
//!
//! - `features/` - canonical schema + feature vector
//! - `intake/`   - clinical answer set + form-to-vector mapper
//! - `model/`    - artifacts, load-once repository, prediction engine
//! - `explain/`  - additive attribution for the top prediction

pub mod explain;
pub mod features;
pub mod intake;
pub mod model;
