//! The JSON boundary: input document parsing, catalogue ingestion and
//! stat request handling.

mod dto;
mod handler;
mod ingest;

pub use dto::{
    BaseRequest, BusRequest, BusResponse, InputDocument, MapResponse, NotFoundResponse,
    RouteItem, RouteResponse, SerializationSettings, StatRequest, StatResponse, StopRequest,
    StopResponse,
};
pub use handler::RequestHandler;
pub use ingest::ingest;
