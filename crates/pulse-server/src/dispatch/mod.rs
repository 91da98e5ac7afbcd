//! Path dispatcher.
//!
//! - `Handler`: async handler writing into a [`ResponseSink`](crate::transport::sink::ResponseSink)
//! - `Dispatcher`: literal path -> handler map, 404 for anything else

pub mod dispatcher;

pub use dispatcher::{Dispatcher, Handler, RequestHead};
