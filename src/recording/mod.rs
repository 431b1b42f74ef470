//! Recording interceptor for capturing traffic into collections

mod capture;
mod handler;
mod recorder;
mod session;

pub use capture::{CaptureWriter, ResponseWriter};
pub use handler::{handler_fn, Handler, HandlerFn};
pub use recorder::{Recorder, RESET_PATH, TERMINATE_PATH};
pub use session::{session_name, Session, SessionState};
