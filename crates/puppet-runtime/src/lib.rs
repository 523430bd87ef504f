//! PUPPET Runtime - Director orchestration and main loop
//!
//! The director is a synchronous engine driven by `submit` and `tick`:
//! 1. Decide interrupt vs. queue for each command
//! 2. Run scenes and step lists as resumable sequences
//! 3. Complete executions once their sequence and speech are done
//! 4. Fall back to idle after inactivity
//! 5. Smooth parameters toward targets every frame
//!
//! The async `Driver` connects it to the backend; `puppetd` runs it headless.

pub mod config;
pub mod director;
pub mod driver;
pub mod headless;
pub mod logging;
pub mod queue;
pub mod sequence;

pub use config::*;
pub use director::*;
pub use driver::*;
pub use headless::*;
pub use logging::*;
pub use queue::*;
pub use sequence::*;
