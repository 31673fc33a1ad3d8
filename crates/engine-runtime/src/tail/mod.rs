pub mod poller;

pub use poller::{PollOutcome, TailPoller};
