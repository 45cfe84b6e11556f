//! Port management collaborator.
//!
//! The manager never moves tokens itself: it registers ports, asks for
//! (re)connections and disconnections, and consumes the replies.

pub mod loopback;
pub mod traits;

pub use loopback::LoopbackPortManager;
pub use traits::PortManager;
