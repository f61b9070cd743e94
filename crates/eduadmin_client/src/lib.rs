//! HTTP implementation of the content API's list-fetch contract.
//!
//! `GET {base}/api/{resource}?page=&perPage=&sort=&order=&filter=<json>`
//! answering either `{ "data": [...], "total": n, "hasMore": b }` or a bare
//! JSON array of records.

mod http;

pub use http::{
    api_url, decode_list_page, error_message_for_response, normalize_server, HttpListSource,
};
