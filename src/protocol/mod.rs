//! The message model: heads, headers, bodies and the error taxonomy.

pub mod body;
mod error;
mod headers;
mod message;
mod request;
mod response;

pub use body::{Body, BodyKind, BodyReader, EagerBody, LazyBody};
pub use error::{BodyError, HttpError, ParseError, SendError};
pub use headers::{FieldName, FieldValue, Headers};
pub use message::PayloadItem;
pub use request::{Request, RequestHead};
pub use response::{Response, ResponseHead};
