pub mod assertions;
pub mod backend;
pub mod dispatch;
pub mod error;
pub mod errors;
pub mod output;
pub mod scratch;
pub mod session;
pub mod tracker;

pub use backend::{NodeRepl, NodeRunner, TscChecker};
pub use dispatch::{Settings, Verifier};
pub use error::{BackendError, FatalError};
pub use scratch::{SampleDir, Scratch};
pub use tracker::Tracker;
